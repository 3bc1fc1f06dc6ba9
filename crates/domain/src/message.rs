//! Canonical conversation messages.
//!
//! A [`Message`] is one turn of a conversation as the rest of the
//! system sees it: every field present, id and timestamps assigned.
//! A [`LocalMessage`] is the partially-filled draft a caller hands in;
//! [`Message::from_local`] normalizes it. The adapter is total — any
//! draft with a role and content produces a valid message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentKind;
use crate::task::Task;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Role / status / type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// Where a message is in its lifecycle. Absent for plain completed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Thinking,
    Working,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Error,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Attachments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A file attached to a message (already uploaded; we only carry the URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Attachment {
    /// Whether the attachment is an image, judged by its content type.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A fully-normalized conversation turn.
///
/// Invariants: `id` is assigned once and never changes; `role` is fixed
/// at creation; `created_at` is non-decreasing within a conversation
/// (enforced by the conversation store on append, not here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    pub created_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Which agent produced this message, when it came from an agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_kind: Option<AgentKind>,
    /// Set when the message requests a tool invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_arguments: Option<serde_json::Value>,
    /// Units of work attached to this message (owned by it).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,
}

/// A draft message as produced locally, before normalization.
///
/// Only `role` and `content` are required; everything else is filled
/// with defaults by [`Message::from_local`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalMessage {
    pub role: Option<Role>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_kind: Option<AgentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_arguments: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,
}

impl LocalMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Some(Role::Assistant),
            content: content.into(),
            ..Self::default()
        }
    }
}

impl Message {
    /// Normalize a local draft into a canonical message.
    ///
    /// Total over its input domain and side-effect free apart from id
    /// and clock generation:
    /// - `id`: the provided one, else a fresh UUID;
    /// - `created_at` / `timestamp`: the provided values, else both set
    ///   to the same current instant;
    /// - `type`: defaults to `text`;
    /// - `attachments`: defaults to empty;
    /// - every other optional field passes through unchanged.
    pub fn from_local(local: LocalMessage) -> Self {
        let now = Utc::now();
        Self {
            id: local.id.unwrap_or_else(Uuid::new_v4),
            role: local.role.unwrap_or(Role::User),
            content: local.content,
            message_type: local.message_type.unwrap_or_default(),
            status: local.status,
            created_at: local.created_at.unwrap_or(now),
            timestamp: local.timestamp.or(local.created_at).unwrap_or(now),
            attachments: local.attachments.unwrap_or_default(),
            agent_kind: local.agent_kind,
            tool_name: local.tool_name,
            tool_arguments: local.tool_arguments,
            tasks: local.tasks.unwrap_or_default(),
            structured_output: local.structured_output,
        }
    }

    /// Whether this message requests a tool invocation.
    pub fn requests_tool(&self) -> bool {
        self.tool_name.is_some()
    }

    /// Replace the task with the same id, or append if not present.
    pub fn upsert_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    // ── adapter defaults ────────────────────────────────────────────

    #[test]
    fn from_local_fills_defaults() {
        let before = Utc::now();
        let msg = Message::from_local(LocalMessage::user("hello"));
        let after = Utc::now();

        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
        assert_eq!(msg.message_type, MessageType::Text);
        assert!(msg.attachments.is_empty());
        assert!(!msg.id.is_nil());
        assert!(msg.created_at >= before && msg.created_at <= after);
        assert_eq!(msg.created_at, msg.timestamp);
    }

    #[test]
    fn from_local_is_idempotent_under_fixed_inputs() {
        let id = Uuid::new_v4();
        let at = Utc::now();
        let draft = LocalMessage {
            id: Some(id),
            created_at: Some(at),
            timestamp: Some(at),
            ..LocalMessage::user("same")
        };

        let a = Message::from_local(draft.clone());
        let b = Message::from_local(draft);
        assert_eq!(a.id, b.id);
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.content, b.content);
    }

    #[test]
    fn from_local_generates_unique_ids() {
        let a = Message::from_local(LocalMessage::user("one"));
        let b = Message::from_local(LocalMessage::user("one"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn from_local_timestamp_falls_back_to_created_at() {
        let at = Utc::now();
        let draft = LocalMessage {
            created_at: Some(at),
            ..LocalMessage::assistant("x")
        };
        let msg = Message::from_local(draft);
        assert_eq!(msg.timestamp, at);
    }

    #[test]
    fn from_local_passes_optionals_through() {
        let args = serde_json::json!({"product_description": "red shoe"});
        let draft = LocalMessage {
            tool_name: Some("product_shot".into()),
            tool_arguments: Some(args.clone()),
            status: Some(MessageStatus::Working),
            ..LocalMessage::user("make a shot")
        };
        let msg = Message::from_local(draft);
        assert_eq!(msg.tool_name.as_deref(), Some("product_shot"));
        assert_eq!(msg.tool_arguments, Some(args));
        assert_eq!(msg.status, Some(MessageStatus::Working));
        assert!(msg.requests_tool());
    }

    // ── serde shape ─────────────────────────────────────────────────

    #[test]
    fn message_type_serializes_as_type_field() {
        let msg = Message::from_local(LocalMessage::user("hi"));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn empty_tasks_are_omitted() {
        let msg = Message::from_local(LocalMessage::user("hi"));
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("tasks").is_none());
    }

    // ── tasks ───────────────────────────────────────────────────────

    #[test]
    fn upsert_task_replaces_by_id() {
        let mut msg = Message::from_local(LocalMessage::user("hi"));
        let task = Task::new("generate");
        let task_id = task.id;
        msg.upsert_task(task.clone());
        msg.upsert_task(task.completed("done"));

        assert_eq!(msg.tasks.len(), 1);
        assert_eq!(msg.tasks[0].id, task_id);
        assert_eq!(msg.tasks[0].status, TaskStatus::Completed);
    }

    // ── attachments ─────────────────────────────────────────────────

    #[test]
    fn attachment_image_detection() {
        let img = Attachment {
            id: "a1".into(),
            name: "shot.png".into(),
            url: "https://cdn.example/shot.png".into(),
            content_type: Some("image/png".into()),
            size: None,
        };
        let doc = Attachment {
            content_type: Some("application/pdf".into()),
            ..img.clone()
        };
        assert!(img.is_image());
        assert!(!doc.is_image());
    }
}
