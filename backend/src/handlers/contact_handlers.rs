use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    error::ContactError,
    handlers::contact_dtos::ContactSuccessResponse,
    models::contact_models::ContactSubmission,
    utils::email_utils::send_contact_notifications,
    utils::sanitize::{is_truthy, is_valid_email},
    AppState,
};

const REQUIRED_FIELDS: [&str; 4] = ["name", "email", "message", "consent"];

/// `POST /contactFormSubmit`
///
/// Validates, sanitizes and stores the submission, then sends the two notification
/// emails. The response only depends on the store write; mail failures are logged.
pub async fn contact_form_submit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ContactSuccessResponse>, ContactError> {
    // An unreadable body has no fields, so it falls through to the missing-field check.
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    if !REQUIRED_FIELDS
        .iter()
        .all(|field| is_truthy(payload.get(*field)))
    {
        return Err(ContactError::MissingFields);
    }

    let email_ok = payload
        .get("email")
        .and_then(Value::as_str)
        .is_some_and(is_valid_email);
    if !email_ok {
        return Err(ContactError::InvalidEmail);
    }

    let submission = ContactSubmission::from_payload(&payload, Utc::now());

    // Diesel blocks; keep it off the async workers.
    let store = state.contact_store.clone();
    let new_contact = submission.to_new_contact();
    let contact_id = tokio::task::spawn_blocking(move || store.insert(&new_contact))
        .await
        .map_err(|e| ContactError::Internal(format!("Store task failed: {}", e)))?
        .map_err(|e| ContactError::Internal(e.to_string()))?;

    match send_contact_notifications(
        state.mailer.as_ref(),
        &state.contact_recipient,
        &submission,
        &contact_id,
    )
    .await
    {
        Ok(()) => tracing::info!(id = %contact_id, "Emails sent successfully"),
        Err(e) => tracing::error!(id = %contact_id, error = %e, "Failed to send emails"),
    }

    Ok(Json(ContactSuccessResponse {
        success: true,
        message: submission.language.thank_you_message().to_string(),
        id: contact_id,
    }))
}

/// Any method other than POST on the contact route.
pub async fn method_not_allowed() -> ContactError {
    ContactError::MethodNotAllowed
}

/// Turns a panic anywhere below the router into the generic 500 body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ContactError::Internal(detail).into_response()
}
