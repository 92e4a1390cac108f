pub mod config;

pub use config::{validate_endpoint, ConsoleConfig, DEFAULT_ENDPOINT, DEFAULT_METHOD};
