pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod error;
pub mod platform;

pub use api::{ApiClient, Transport};
pub use app::ClientConfig;
pub use chat::ChatApi;
pub use error::{Error, Result};
