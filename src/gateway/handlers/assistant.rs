use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::super::{detail, invalid_body, AppState};
use crate::assistant::{suggestion_prompt, DISPLAY_MODEL, PROVIDER_LABEL};
use crate::models::ConversationTurn;

const CHAT_UNAVAILABLE: &str =
    "AI Assistant is not available. Please configure GEMINI_API_KEY in environment variables.";

/// Body of `POST /api/assistant/chat`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    message: String,
    #[serde(default)]
    conversation_history: Option<Vec<ConversationTurn>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatResponse {
    response: String,
    success: bool,
    model: Option<String>,
}

/// `description` may arrive in the query string or a JSON body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SuggestParams {
    description: Option<String>,
}

/// `GET /api/assistant/info`
pub(crate) async fn api_assistant_info(State(state): State<AppState>) -> impl IntoResponse {
    let available = state.assistant.is_some();
    let model = if available { DISPLAY_MODEL } else { "Not configured" };
    Json(serde_json::json!({
        "available": available,
        "model": model,
        "description": "AI Assistant powered by Google Gemini",
    }))
}

/// `POST /api/assistant/chat`: forward a message (plus optional history)
/// to the assistant.
///
/// Provider failures arrive as reply text with `success: true`; only a
/// panic inside the assistant produces a 500.
pub(crate) async fn api_assistant_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    let Some(assistant) = state.assistant.clone() else {
        return detail(StatusCode::SERVICE_UNAVAILABLE, CHAT_UNAVAILABLE);
    };

    if body.message.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    info!(
        preview = %crate::utils::truncate_str(&body.message, 50),
        history = body.conversation_history.as_ref().map_or(0, Vec::len),
        "AI chat request"
    );

    let ChatRequest {
        message,
        conversation_history,
    } = body;
    let task = tokio::spawn(async move {
        assistant
            .get_response(&message, conversation_history.as_deref())
            .await
    });

    match task.await {
        Ok(response) => {
            info!("AI response generated");
            (
                StatusCode::OK,
                Json(ChatResponse {
                    response,
                    success: true,
                    model: Some(PROVIDER_LABEL.to_string()),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "error in AI chat");
            detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {e}"),
            )
        }
    }
}

/// `POST /api/assistant/suggest-project`: technology and feature
/// suggestions for a free-text project description.
pub(crate) async fn api_suggest_project(
    State(state): State<AppState>,
    Query(query): Query<SuggestParams>,
    body: Result<Json<SuggestParams>, JsonRejection>,
) -> Response {
    // A body is optional here; only a JSON body that fails to decode, with
    // no query fallback, is reported.
    let from_body = match body {
        Ok(Json(b)) => b.description,
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) if query.description.is_none() => return invalid_body(rejection),
        Err(_) => None,
    };
    let description = query.description.or(from_body);
    let Some(description) = description else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "description is required");
    };

    let Some(assistant) = state.assistant.clone() else {
        return detail(StatusCode::SERVICE_UNAVAILABLE, "AI not available");
    };

    let task = tokio::spawn(async move {
        let prompt = suggestion_prompt(&description);
        assistant.get_response(&prompt, None).await
    });

    match task.await {
        Ok(suggestions) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "suggestions": suggestions,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "error generating project suggestions");
            detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
