//! Payment-processor webhook.
//!
//! The processor posts a form-encoded callback after a payment
//! settles. The handler verifies the signature (a bool from
//! [`signature::verify_signature`]; trust is decided here), updates
//! the transaction row, and advances any related order. An order
//! update failing does not fail the webhook — the transaction is the
//! record of truth, the order is a convenience.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use chrono::Utc;

use cf_domain::trace::TraceEvent;
use cf_store::tables::PaymentWebhookPatch;

use crate::api::signature;
use crate::state::AppState;

/// `POST /v1/webhooks/payment`
pub async fn payment_webhook(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let transaction_id = params.get("txnid").cloned().unwrap_or_default();
    if transaction_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "missing txnid");
    }

    // Signature check. Without a configured salt every callback is
    // untrusted — better to reject than to accept unverifiable money
    // events.
    let trusted = state
        .payment_salt
        .as_deref()
        .map(|salt| signature::verify_signature(&params, salt))
        .unwrap_or(false);

    TraceEvent::WebhookReceived {
        transaction_id: transaction_id.clone(),
        trusted,
    }
    .emit();

    if !trusted {
        return error_response(StatusCode::UNAUTHORIZED, "invalid webhook signature");
    }

    let payment_status = params.get("status").cloned().unwrap_or_default();
    let succeeded = payment_status == "success";

    // Fetch the transaction first — the related order id is needed
    // after the patch, and a missing row should 404 before any write.
    let transaction = match state.store.get_payment_transaction(&transaction_id).await {
        Ok(Some(row)) => row,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "unknown transaction"),
        Err(e) => {
            tracing::error!(%transaction_id, error = %e, "transaction fetch failed");
            return error_response(StatusCode::BAD_GATEWAY, "failed to fetch transaction");
        }
    };

    let patch = PaymentWebhookPatch {
        payment_status: payment_status.clone(),
        processor_transaction_id: params.get("mihpayid").cloned(),
        status: if succeeded { "completed" } else { "failed" }.into(),
        webhook_received_at: Utc::now(),
    };

    if let Err(e) = state
        .store
        .apply_payment_webhook(&transaction_id, &patch)
        .await
    {
        tracing::error!(%transaction_id, error = %e, "transaction update failed");
        return error_response(StatusCode::BAD_GATEWAY, "failed to update transaction");
    }

    // Advance the related order, if any. Failures are logged and
    // swallowed.
    if let Some(order_id) = transaction.related_order_id {
        let order_status = if succeeded { "pending" } else { "payment_failed" };
        match state.store.update_order_status(order_id, order_status).await {
            Ok(_) => tracing::info!(%transaction_id, %order_id, order_status, "order advanced"),
            Err(e) => {
                tracing::warn!(%transaction_id, %order_id, error = %e, "order update failed")
            }
        }
    }

    Json(serde_json::json!({
        "success": true,
        "txnId": transaction_id,
    }))
    .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
