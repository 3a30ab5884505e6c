#[tokio::main]
async fn main() -> std::io::Result<()> {
    atc_sim::run_with_config().await
}
