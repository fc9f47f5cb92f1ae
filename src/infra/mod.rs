//! Infrastructure adapters and runtime bootstrap.

pub mod api_client;
pub mod assets;
pub mod error;
pub mod http;
pub mod telemetry;
pub mod token_store;
