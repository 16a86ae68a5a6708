//! HTTP plumbing: the configured client instance and the transport seam the
//! chat facade is written against.

pub mod client;
pub mod transport;

pub use client::ApiClient;
pub use transport::Transport;
