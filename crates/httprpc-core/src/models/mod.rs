pub mod config;

pub use config::{AuthConfig, ClientConfig, DEFAULT_TIMEOUT_SECS};
