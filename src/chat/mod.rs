pub mod service;
pub mod types;

pub use service::{chat_path, history_path, ChatApi};
pub use types::{ChatReply, ChatRequest, ConversationHistory, HistoryMessage};
