// Boots an isolated server per test so simulation state never leaks between tests.
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

// Start a fresh server on an ephemeral port and return its base URL.
pub fn spawn_server() -> String {
    // One-time slot where the server thread publishes its bound URL.
    let published_url = Arc::new(OnceLock::<String>::new());
    let published_url_thread = Arc::clone(&published_url);

    // An OS thread with its own runtime outlives the `#[tokio::test]` runtime of the caller.
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("test runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral test port");
            let addr = listener.local_addr().expect("get local addr");
            let _ = published_url_thread.set(format!("http://{}", addr));
            atc_sim::run(listener).await.expect("server failed");
        });
    });

    wait_for_readiness(published_url)
}

// Wait for URL publication, then for the socket to accept TCP connections.
fn wait_for_readiness(published_url: Arc<OnceLock<String>>) -> String {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return base_url;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
