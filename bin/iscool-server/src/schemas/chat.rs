//! `/chat` request / response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Author of a chat message.
///
/// Unknown role strings are kept rather than rejected; the transformer sends
/// them to the provider as user turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        match r {
            Role::System => "system".into(),
            Role::User => "user".into(),
            Role::Assistant => "assistant".into(),
            Role::Other(s) => s,
        }
    }
}

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// `"system"`, `"user"` or `"assistant"`.
    #[schema(value_type = String, example = "user")]
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Conversation history, oldest first.
    pub messages: Vec<Message>,
    /// Model override; the server default is used when absent or null.
    #[serde(default)]
    pub model: Option<String>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Generated text; empty when the provider returned none.
    pub reply: String,
}
