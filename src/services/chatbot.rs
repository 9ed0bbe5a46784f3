//! Help-desk chatbot routing
//!
//! Sends visitors to the right page by keyword. Free-form answers would need
//! a language model and are not provided; anything unrecognised gets a fixed
//! help message.

use serde::{Deserialize, Serialize};

/// Reply sent back to the chat widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

const HELP_REPLY: &str =
    "I can help you file a complaint or track an existing case. Try \"file a complaint\" or \"track my case\".";

/// Route a chat message to a page
pub fn route_message(message: &str) -> ChatReply {
    let msg = message.to_lowercase();

    if msg.contains("complain") {
        return ChatReply {
            reply: "Taking you to the complaint section...".to_string(),
            redirect: Some("/complaint".to_string()),
        };
    }

    if msg.contains("track") || msg.contains("status") {
        return ChatReply {
            reply: "Taking you to case tracking...".to_string(),
            redirect: Some("/track".to_string()),
        };
    }

    ChatReply {
        reply: HELP_REPLY.to_string(),
        redirect: None,
    }
}
