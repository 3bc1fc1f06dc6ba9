//! `cf-domain` — shared types for Clipflow.
//!
//! Everything the other crates agree on lives here: the canonical
//! message/task model of the chat pipeline, tool descriptors and the
//! tool error contract, agent kinds, trace events, the shared error
//! type, and the TOML configuration tree.

pub mod agent;
pub mod config;
pub mod error;
pub mod message;
pub mod task;
pub mod tool;
pub mod trace;

pub use agent::AgentKind;
pub use error::{Error, Result};
pub use message::{Attachment, LocalMessage, Message, MessageStatus, MessageType, Role};
pub use task::{Task, TaskStatus};
pub use tool::{ToolDefinition, ToolError, ToolMetadata, ToolOutput};
