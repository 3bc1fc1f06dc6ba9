//! The message/tool pipeline.
//!
//! One entry point drives a whole turn: a local draft is normalized
//! and appended, and when the message requests a tool the invocation
//! runs through the executor, the outcome lands back on the message as
//! a task, and any backend job the tool spawned is handed to the media
//! poller for reconciliation.

use std::sync::Arc;

use cf_domain::message::{LocalMessage, Message, MessageStatus};
use cf_domain::task::Task;
use cf_jobs::{JobKey, MediaJobPoller};
use cf_store::tables::JobKind;
use cf_store::SessionProvider;
use cf_tools::{ExecutionRequest, ToolExecutor};

use crate::runtime::conversation::ConversationStore;

/// Which media collection a tool's jobs land in. Tools with no media
/// job (browser automation has its own tracker) map to `None`.
fn media_job_kind(tool_name: &str) -> Option<JobKind> {
    match tool_name {
        "product_shot" => Some(JobKind::Image),
        "image_to_video" => Some(JobKind::Video),
        _ => None,
    }
}

pub struct MessagePipeline {
    conversations: Arc<ConversationStore>,
    executor: Arc<ToolExecutor>,
    poller: Arc<MediaJobPoller>,
    session: Arc<SessionProvider>,
}

impl MessagePipeline {
    pub fn new(
        conversations: Arc<ConversationStore>,
        executor: Arc<ToolExecutor>,
        poller: Arc<MediaJobPoller>,
        session: Arc<SessionProvider>,
    ) -> Self {
        Self {
            conversations,
            executor,
            poller,
            session,
        }
    }

    /// Run one turn: normalize, append, and dispatch any requested tool.
    ///
    /// Returns the final message — with a terminal task attached when a
    /// tool ran. Tool failures never bubble out of the pipeline; they
    /// land on the message as an errored task.
    pub async fn submit(
        &self,
        conversation_id: &str,
        draft: LocalMessage,
        user_id: Option<String>,
    ) -> Message {
        let mut message = self.conversations.append(conversation_id, draft);

        let Some(tool_name) = message.tool_name.clone() else {
            return message;
        };

        // Anonymous callers fall back to the signed-in session.
        let user_id = user_id.or_else(|| self.session.current().map(|s| s.user_id));

        let task = Task::new(&tool_name);
        message.upsert_task(task.clone());
        message.status = Some(MessageStatus::Working);
        self.conversations.replace(conversation_id, message.clone());

        let request = ExecutionRequest {
            tool_name: tool_name.clone(),
            parameters: message
                .tool_arguments
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            user_id,
            run_id: message.id.to_string(),
        };

        match self.executor.execute(request).await {
            Ok(output) => {
                if let Some(job_id) = &output.metadata.job_id {
                    if let Some(kind) = media_job_kind(&tool_name) {
                        self.poller.track(JobKey::new(kind, job_id.clone()));
                    }
                }
                message.structured_output = serde_json::to_value(&output.metadata).ok();
                message.upsert_task(task.completed(output.content));
                message.status = Some(MessageStatus::Completed);
            }
            Err(err) => {
                tracing::warn!(
                    conversation_id,
                    tool = %tool_name,
                    error = %err,
                    "tool invocation failed"
                );
                message.upsert_task(task.errored(err.to_string()));
                message.status = Some(MessageStatus::Error);
            }
        }

        self.conversations.replace(conversation_id, message.clone());
        message
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::config::ToolsConfig;
    use cf_domain::task::TaskStatus;
    use cf_tools::builtin::register_builtins;
    use cf_tools::ToolRegistry;

    fn pipeline() -> MessagePipeline {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry).unwrap();
        // No store: credit checks and usage tracking are no-ops, and
        // store-dependent tools fail with a Store error.
        let executor = Arc::new(ToolExecutor::new(
            Arc::new(registry),
            None,
            ToolsConfig::default(),
        ));
        MessagePipeline::new(
            Arc::new(ConversationStore::new()),
            executor,
            Arc::new(MediaJobPoller::new(Arc::new(NoJobs), 12)),
            Arc::new(SessionProvider::new()),
        )
    }

    struct NoJobs;

    #[async_trait::async_trait]
    impl cf_jobs::JobSource for NoJobs {
        async fn fetch_jobs(
            &self,
            _kind: JobKind,
            _ids: &[String],
        ) -> cf_domain::error::Result<Vec<cf_store::tables::MediaJobRow>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn plain_message_passes_through() {
        let pipeline = pipeline();
        let message = pipeline
            .submit("c1", LocalMessage::user("hello"), None)
            .await;
        assert!(message.tasks.is_empty());
        assert!(message.status.is_none());
        assert_eq!(pipeline.conversations.messages("c1").len(), 1);
    }

    #[tokio::test]
    async fn tool_request_attaches_completed_task() {
        let pipeline = pipeline();
        let draft = LocalMessage {
            tool_name: Some("product_shot".into()),
            tool_arguments: Some(serde_json::json!({"product_description": "red shoe"})),
            ..LocalMessage::user("shoot my product")
        };

        let message = pipeline.submit("c1", draft, Some("u1".into())).await;

        assert_eq!(message.status, Some(MessageStatus::Completed));
        assert_eq!(message.tasks.len(), 1);
        assert_eq!(message.tasks[0].status, TaskStatus::Completed);
        assert_eq!(message.tasks[0].name, "product_shot");
        assert!(message.tasks[0].result.as_deref().unwrap().contains("red shoe"));
        assert!(message.structured_output.is_some());

        // The stored copy reflects the final state too.
        let stored = &pipeline.conversations.messages("c1")[0];
        assert_eq!(stored.tasks[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn tool_failure_attaches_errored_task() {
        let pipeline = pipeline();
        let draft = LocalMessage {
            tool_name: Some("product_shot".into()),
            tool_arguments: Some(serde_json::json!({"wrong": "field"})),
            ..LocalMessage::user("shoot my product")
        };

        let message = pipeline.submit("c1", draft, None).await;

        assert_eq!(message.status, Some(MessageStatus::Error));
        assert_eq!(message.tasks[0].status, TaskStatus::Error);
        assert!(message.tasks[0]
            .error
            .as_deref()
            .unwrap()
            .contains("invalid parameters"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_errored_task_not_a_panic() {
        let pipeline = pipeline();
        let draft = LocalMessage {
            tool_name: Some("teleport".into()),
            tool_arguments: None,
            ..LocalMessage::user("beam me up")
        };

        let message = pipeline.submit("c1", draft, None).await;
        assert_eq!(message.tasks[0].status, TaskStatus::Error);
        assert!(message.tasks[0].error.as_deref().unwrap().contains("teleport"));
    }

    #[test]
    fn media_kinds_cover_generation_tools_only() {
        assert_eq!(media_job_kind("product_shot"), Some(JobKind::Image));
        assert_eq!(media_job_kind("image_to_video"), Some(JobKind::Video));
        assert_eq!(media_job_kind("browser_use"), None);
    }
}
