// Network adapter modules split by streaming WebSocket clients vs request/response routes.

pub mod client;
pub mod rest;

pub use client::{update_serializer, ws_handler};
