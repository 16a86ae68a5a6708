use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Request/response exchange the chat facade is written against.
///
/// Each call performs exactly one exchange and hands back the decoded
/// response body untouched. Failures are returned as the transport reports
/// them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `path` with no body.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issue a POST for `path` with `body` encoded as JSON.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
}
