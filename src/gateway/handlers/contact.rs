use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use super::super::{detail, invalid_body, AppState};
use crate::contact::{schedule_notification, ContactForm, ContactSubmission, RECEIVED_MESSAGE};

#[derive(Debug, Serialize)]
pub(crate) struct ContactResponse {
    success: bool,
    message: String,
    message_id: Option<String>,
}

/// `POST /api/contact`: accept a contact-form submission.
///
/// The notification runs on a detached task after the reply is built.
pub(crate) async fn api_contact_submit(
    State(state): State<AppState>,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> Response {
    let form = match body {
        Ok(Json(form)) => form,
        Err(rejection) => return invalid_body(rejection),
    };
    if let Err(reason) = form.validate() {
        warn!(email = %form.email, %reason, "rejected contact form");
        return detail(StatusCode::UNPROCESSABLE_ENTITY, reason);
    }

    info!(from = %form.name, email = %form.email, "new contact form submission");

    let submission = ContactSubmission::new(form);
    let reply = ContactResponse {
        success: true,
        message: RECEIVED_MESSAGE.to_string(),
        message_id: Some(submission.message_id.clone()),
    };
    schedule_notification(state.notifier.clone(), submission);

    (StatusCode::OK, Json(reply)).into_response()
}
