pub mod auth;
pub mod browser;
pub mod catalog;
pub mod credits;
pub mod functions;
pub mod health;
pub mod jobs;
pub mod messages;
pub mod session;
pub mod signature;
pub mod tools;
pub mod uploads;
pub mod webhooks;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (health, the function endpoints
/// with their own CORS preflight contract, and the processor-signed
/// payment webhook) and **protected** (gated behind the bearer-token
/// middleware).
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health::health))
        // Function endpoints: POST does the work, OPTIONS answers the
        // preflight with an empty 200, anything else gets axum's 405.
        .route(
            "/functions/v1/execute-tool",
            post(functions::execute_tool).options(functions::preflight),
        )
        .route(
            "/functions/v1/multi-agent-chat",
            post(functions::multi_agent_chat).options(functions::preflight),
        )
        // Payment webhook: authenticated by the processor's signature,
        // not by the API bearer token.
        .route("/v1/webhooks/payment", post(webhooks::payment_webhook));

    let protected = Router::new()
        // Conversations
        .route("/v1/conversations/:id/messages", post(messages::submit_message))
        .route("/v1/conversations/:id/messages", get(messages::list_messages))
        .route("/v1/conversations/:id", delete(messages::clear_conversation))
        // Jobs
        .route("/v1/jobs", get(jobs::snapshot))
        .route("/v1/jobs/track", post(jobs::track))
        .route("/v1/jobs/:id", get(jobs::get_job))
        // Browser automation
        .route("/v1/browser-tasks", post(browser::create_task))
        .route("/v1/browser-tasks/:id", get(browser::get_task))
        .route("/v1/browser-tasks/:id/status", post(browser::update_status))
        // Uploads
        .route("/v1/uploads", post(uploads::upload_file))
        .route("/v1/uploads/:bucket/*key", delete(uploads::delete_file))
        // Credits
        .route("/v1/credits/:user_id", get(credits::get_credits))
        // Catalog
        .route("/v1/catalog/story-types", get(catalog::story_types))
        .route("/v1/catalog/voice-options", get(catalog::voice_options))
        // Tools (registry + external tool servers)
        .route("/v1/tools", get(tools::list_tools))
        .route("/v1/mcp/call", post(tools::call_mcp_tool))
        // Auth session
        .route("/v1/session", get(session::get_session))
        .route("/v1/session", post(session::set_session))
        .route("/v1/session", delete(session::clear_session))
        // Apply API auth middleware to all protected routes.
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}
