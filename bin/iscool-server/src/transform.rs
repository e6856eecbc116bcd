//! Chat messages -> provider request shape.

use iscool_gemini::{Turn, TurnRole};

use crate::schemas::chat::{Message, Role};

/// A conversation regrouped the way the provider expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    /// Contents of every `system` message, in order, joined with `\n`.
    /// `None` when the request had no system message.
    pub system_instruction: Option<String>,
    /// Non-system messages in their original order.
    pub turns: Vec<Turn>,
}

/// Split `messages` into a system instruction and provider turns.
///
/// `assistant` becomes `model`; `user` and any unrecognised role become `user`.
pub fn to_conversation(messages: &[Message]) -> Conversation {
    let mut system = Vec::new();
    let mut turns = Vec::with_capacity(messages.len());

    for m in messages {
        let role = match m.role {
            Role::System => {
                system.push(m.content.as_str());
                continue;
            }
            Role::Assistant => TurnRole::Model,
            Role::User | Role::Other(_) => TurnRole::User,
        };
        turns.push(Turn::text(role, m.content.clone()));
    }

    Conversation {
        system_instruction: (!system.is_empty()).then(|| system.join("\n")),
        turns,
    }
}
