//! The conversational event type the prebuilt patterns run against
//!
//! Wire format is an internally tagged JSON object: `{"type": "message",
//! "message_id": 7, "text": "hi"}`. The tags are part of persisted
//! continuation records (watch mode stashes events in node storage), so they
//! are stable.

use serde::{Deserialize, Serialize};

/// A plain text message from the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Transport-assigned identifier, used to correlate later edits
    pub message_id: i64,
    pub text: String,
}

/// The user picked one of the choices attached to an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Identifier of the selection interaction itself
    pub id: String,
    /// The outbound message the choices were attached to
    pub message_id: i64,
    /// Opaque payload of the chosen option
    pub data: String,
}

/// One inbound conversational event
///
/// A closed union: the engine is generic over the event type, but the
/// prebuilt waiting patterns need to distinguish plain input, choice
/// selection, and correction of an earlier message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    /// New text from the user
    Message(IncomingMessage),
    /// A choice attached to an earlier outbound message was picked
    Selection(Selection),
    /// A previously sent message was edited in place
    Edit(IncomingMessage),
}

/// Discriminator for [`ChatEvent`], used to declare which kinds a waiting
/// point accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    Selection,
    Edit,
}

impl ChatEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::Message(_) => EventKind::Message,
            ChatEvent::Selection(_) => EventKind::Selection,
            ChatEvent::Edit(_) => EventKind::Edit,
        }
    }

    /// The transport message id the event refers to
    pub fn message_id(&self) -> i64 {
        match self {
            ChatEvent::Message(m) | ChatEvent::Edit(m) => m.message_id,
            ChatEvent::Selection(s) => s.message_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_format() {
        let event = ChatEvent::Message(IncomingMessage {
            message_id: 7,
            text: "hi".to_string(),
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"type": "message", "message_id": 7, "text": "hi"})
        );
    }

    #[test]
    fn test_selection_round_trip() {
        let event = ChatEvent::Selection(Selection {
            id: "cb-1".to_string(),
            message_id: 3,
            data: "yes".to_string(),
        });
        let text = serde_json::to_string(&event).unwrap();
        let back: ChatEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), EventKind::Selection);
    }

    #[test]
    fn test_kind_and_message_id() {
        let edit = ChatEvent::Edit(IncomingMessage {
            message_id: 12,
            text: "fixed".to_string(),
        });
        assert_eq!(edit.kind(), EventKind::Edit);
        assert_eq!(edit.message_id(), 12);
    }
}
