//! In-memory conversation state.
//!
//! Conversations are the view state the UI renders — a list of
//! canonical messages per conversation id. The store normalizes drafts
//! on append and enforces the one ordering invariant the message model
//! itself cannot: `created_at` never decreases within a conversation.

use std::collections::HashMap;

use parking_lot::RwLock;

use cf_domain::message::{LocalMessage, Message};
use cf_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation store (in-memory)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Vec<Message>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Normalize a draft and append it to the conversation.
    ///
    /// The draft's id is preserved when it carries one. A `created_at`
    /// earlier than the conversation's last message is clamped forward
    /// so the sequence stays non-decreasing.
    pub fn append(&self, conversation_id: &str, draft: LocalMessage) -> Message {
        let mut message = Message::from_local(draft);

        let mut conversations = self.conversations.write();
        let messages = conversations
            .entry(conversation_id.to_owned())
            .or_default();

        if let Some(last) = messages.last() {
            if message.created_at < last.created_at {
                message.created_at = last.created_at;
            }
        }

        TraceEvent::MessageAppended {
            conversation_id: conversation_id.to_owned(),
            role: format!("{:?}", message.role).to_lowercase(),
            requests_tool: message.requests_tool(),
        }
        .emit();

        messages.push(message.clone());
        message
    }

    /// Replace the message with the same id. No-op when the message or
    /// the conversation is gone (e.g. cleared while a tool ran).
    pub fn replace(&self, conversation_id: &str, message: Message) {
        let mut conversations = self.conversations.write();
        if let Some(messages) = conversations.get_mut(conversation_id) {
            if let Some(slot) = messages.iter_mut().find(|m| m.id == message.id) {
                *slot = message;
            }
        }
    }

    /// All messages of a conversation, in append order.
    pub fn messages(&self, conversation_id: &str) -> Vec<Message> {
        self.conversations
            .read()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear(&self, conversation_id: &str) {
        self.conversations.write().remove(conversation_id);
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.read().len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
