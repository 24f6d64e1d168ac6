use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::id::Id;

/// Number of messages the chat log keeps.
pub const CHAT_CAPACITY: usize = 200;

/// Longest message accepted, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Id,
    pub user_id: Id,
    pub user_name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewMessage {
    pub text: String,
}
