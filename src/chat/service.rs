use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::api::{ApiClient, Transport};
use crate::app::ClientConfig;
use crate::chat::types::ChatRequest;
use crate::error::{Error, Result};

pub fn chat_path() -> &'static str {
    "/api/v1/chat"
}

/// History path for `conversation_id`, percent-encoded so the id always
/// stays a single path segment.
pub fn history_path(conversation_id: &str) -> Result<String> {
    if conversation_id.is_empty() {
        return Err(Error::validation("Conversation id must not be empty"));
    }
    // The url crate silently drops dot segments instead of encoding them.
    if conversation_id == "." || conversation_id == ".." {
        return Err(Error::validation(format!(
            "Conversation id {:?} is not a valid path segment",
            conversation_id
        )));
    }

    let mut url = Url::parse("http://localhost/")
        .map_err(|e| Error::validation(format!("Failed to build history path: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::validation("Failed to build history path"))?
        .pop_if_empty()
        .extend(["api", "v1", "conversations", conversation_id, "history"]);

    Ok(url.path().to_string())
}

/// Chat operations of the agent backend.
///
/// Holds no state of its own; every call is one independent exchange on the
/// injected transport, and the response body is returned as received.
#[derive(Clone)]
pub struct ChatApi {
    transport: Arc<dyn Transport>,
}

impl ChatApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Sends `message`, continuing `conversation_id` when given.
    pub async fn send(&self, message: &str, conversation_id: Option<&str>) -> Result<Value> {
        let mut request = ChatRequest::new(message);
        if let Some(id) = conversation_id {
            request = request.with_conversation(id);
        }

        debug!(
            "Sending chat message: conversation={:?}, length={}",
            conversation_id,
            message.len()
        );

        let body = request.to_wire()?;
        self.transport.post(chat_path(), &body).await
    }

    /// Fetches the history of `conversation_id`. An empty id is rejected
    /// before anything is sent.
    pub async fn get_history(&self, conversation_id: &str) -> Result<Value> {
        let path = history_path(conversation_id)?;

        debug!("Fetching history for conversation {}", conversation_id);
        self.transport.get(&path).await
    }
}

impl fmt::Debug for ChatApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatApi").finish_non_exhaustive()
    }
}
