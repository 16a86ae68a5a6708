pub mod config;

pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_TIMEOUT_MS};
