use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::chat::{ChatReply, ConversationHistory};

#[derive(Parser, Debug)]
#[command(name = "agent-client")]
#[command(about = "Talk to the Personal Agent chat API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the agent backend (overrides config and AGENT_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a message to the agent
    Send {
        /// Message text
        message: String,

        /// Continue an existing conversation
        #[arg(short = 'C', long)]
        conversation: Option<String>,

        /// Print the response body as JSON
        #[arg(long)]
        raw: bool,
    },

    /// Show the history of a conversation
    History {
        /// Conversation ID
        conversation: String,

        /// Print the response body as JSON
        #[arg(long)]
        raw: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Reply text when the payload has the usual chat shape, pretty JSON otherwise.
pub fn render_reply(value: &Value) -> String {
    match ChatReply::from_value(value) {
        Ok(reply) => format!("{}\n\n(conversation: {})", reply.message, reply.conversation_id),
        Err(_) => pretty(value),
    }
}

/// One `[time] role: content` line per message, or pretty JSON when the
/// payload does not look like a history.
pub fn render_history(value: &Value) -> String {
    let history = match ConversationHistory::from_value(value) {
        Ok(history) => history,
        Err(_) => return pretty(value),
    };

    if history.messages.is_empty() {
        return format!("No messages in conversation {}", history.conversation_id);
    }

    history
        .messages
        .iter()
        .map(|message| {
            let time = message
                .time()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("[{}] {}: {}", time, message.role, message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
