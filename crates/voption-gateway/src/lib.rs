/*
[INPUT]:  Public API exports for voption-gateway crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod server;
pub mod tools;

// Re-export main types for convenience
pub use config::{ExchangeConfig, GatewayConfig};
pub use server::{AppState, Envelope, create_router, run_server};
