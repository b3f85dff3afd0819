// georef-api: Async Rust client for the geographic reference-data service

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ReferenceClient;
pub use error::Error;
pub use models::RawNode;
pub use transport::{TlsMode, TransportConfig};
