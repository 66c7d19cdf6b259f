//! HTTP route handlers for the studio API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::studio::core::conversation::{Conversation, ConversationSummary};
use crate::studio::core::errors::StudioError;
use crate::studio::core::ids::ConversationId;
use crate::studio::core::theme::Theme;
use crate::studio::engine::SendOutcome;
use crate::studio::preview::variables::Preview;

use super::state::AppState;

/// Handler error: status plus a plain-text reason.
type ApiError = (StatusCode, String);

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(get_conversation)
                .patch(rename_conversation)
                .delete(delete_conversation),
        )
        .route("/api/conversations/{id}/select", post(select_conversation))
        .route("/api/conversations/{id}/messages", post(send_message))
        .route("/api/preview", get(get_preview))
        .route("/api/preview/variables", put(set_variable))
        .route("/api/theme", get(get_theme).put(set_theme))
        .with_state(state)
}

fn not_found(id: ConversationId) -> ApiError {
    (StatusCode::NOT_FOUND, format!("conversation not found: {id}"))
}

fn map_studio_error(err: StudioError) -> ApiError {
    let status = match &err {
        StudioError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
        StudioError::SendInProgress(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "alimtalk-studio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Sidebar listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListResponse {
    /// Summaries, most recent first.
    pub conversations: Vec<ConversationSummary>,
    /// Active conversation, if any.
    pub active_id: Option<ConversationId>,
}

async fn list_conversations(State(state): State<Arc<AppState>>) -> Json<ConversationListResponse> {
    let list = state.studio.list().await;
    Json(ConversationListResponse {
        conversations: list.conversations,
        active_id: list.active_id,
    })
}

async fn create_conversation(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let id = state.studio.create_conversation().await;
    let conversation = state.studio.conversation(id).await.ok_or_else(|| not_found(id))?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
) -> Result<Json<Conversation>, ApiError> {
    state
        .studio
        .conversation(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn select_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
) -> Result<StatusCode, ApiError> {
    if state.studio.select_conversation(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// Rename request.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    /// New title; truncated like any other title.
    pub title: String,
}

async fn rename_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<Conversation>, ApiError> {
    if !state.studio.rename_conversation(id, &request.title).await {
        return Err(not_found(id));
    }
    state
        .studio
        .conversation(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
) -> Result<StatusCode, ApiError> {
    if state.studio.delete_conversation(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// Send request.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Message text.
    pub content: String,
}

/// Send response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// `replied`, `ignored` or `dropped`.
    pub status: &'static str,
    /// Conversation after the reply, when there was one.
    pub conversation: Option<Conversation>,
    /// Whether a template was attached by this send.
    pub template_attached: bool,
    /// Whether the attached template was built locally.
    pub used_fallback: bool,
}

impl From<SendOutcome> for SendResponse {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Ignored => Self {
                status: "ignored",
                conversation: None,
                template_attached: false,
                used_fallback: false,
            },
            SendOutcome::Dropped => Self {
                status: "dropped",
                conversation: None,
                template_attached: false,
                used_fallback: false,
            },
            SendOutcome::Replied {
                conversation,
                template_attached,
                used_fallback,
            } => Self {
                status: "replied",
                conversation: Some(conversation),
                template_attached,
                used_fallback,
            },
        }
    }
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let outcome = state
        .studio
        .send_message(id, &request.content)
        .await
        .map_err(map_studio_error)?;
    Ok(Json(SendResponse::from(outcome)))
}

async fn get_preview(State(state): State<Arc<AppState>>) -> Json<Preview> {
    Json(state.studio.preview().await)
}

/// Variable edit request.
#[derive(Debug, Deserialize)]
pub struct VariableRequest {
    /// Variable key without the `#{}` wrapper.
    pub key: String,
    /// New value; empty leaves the token visible.
    pub value: String,
}

async fn set_variable(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VariableRequest>,
) -> Result<Json<Preview>, ApiError> {
    if !state.studio.set_variable(&request.key, &request.value).await {
        return Err((
            StatusCode::NOT_FOUND,
            format!("displayed template has no variable {}", request.key),
        ));
    }
    Ok(Json(state.studio.preview().await))
}

/// Theme payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct ThemeBody {
    /// `default`, `light` or `dark`.
    pub theme: String,
}

/// One entry of the theme menu.
#[derive(Debug, Serialize)]
pub struct ThemeOption {
    /// Stored identifier.
    pub value: &'static str,
    /// Menu label.
    pub label: &'static str,
}

/// Saved theme plus the menu it is chosen from.
#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    /// Saved theme identifier.
    pub theme: &'static str,
    /// Available themes in menu order.
    pub options: Vec<ThemeOption>,
}

async fn get_theme(State(state): State<Arc<AppState>>) -> Json<ThemeResponse> {
    let theme = state.studio.theme().await;
    Json(ThemeResponse {
        theme: theme.as_str(),
        options: Theme::ALL
            .iter()
            .map(|option| ThemeOption {
                value: option.as_str(),
                label: option.label(),
            })
            .collect(),
    })
}

async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, ApiError> {
    let theme: Theme = body
        .theme
        .parse()
        .map_err(|err: String| (StatusCode::BAD_REQUEST, format!("unknown theme: {err}")))?;
    state.studio.set_theme(theme).await;
    Ok(Json(ThemeBody {
        theme: theme.as_str().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::core::config::StudioConfig;
    use crate::studio::engine::Studio;
    use crate::studio::generation::service::TemplateService;
    use crate::studio::storage::kv_store::MemoryKvStore;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn app() -> Router {
        let mut config = StudioConfig::default();
        config.service.base_url = "http://127.0.0.1:1".to_string();
        config.service.fallback_delay_ms = 0;
        let service = TemplateService::http(&config.service).unwrap();
        let studio = Studio::new(config, Arc::new(MemoryKvStore::new()), service)
            .await
            .unwrap();
        create_router(AppState::new(studio))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app().await, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_send_attaches_template_and_updates_preview() {
        let app = app().await;
        let (_, list) = call(&app, "GET", "/api/conversations", None).await;
        let id = list["activeId"].as_i64().unwrap();
        assert_eq!(list["conversations"].as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/conversations/{id}/messages"),
            Some(serde_json::json!({ "content": "카페 주문 완료 알림 만들어줘" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "replied");
        assert_eq!(body["usedFallback"], true);
        assert_eq!(body["conversation"]["template"]["title"], "카페 주문 완료 알림");

        let (status, preview) = call(
            &app,
            "PUT",
            "/api/preview/variables",
            Some(serde_json::json!({ "key": "고객명", "value": "민수" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(preview["rendered"].as_str().unwrap().contains("민수님"));
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_404() {
        let app = app().await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/conversations/42/messages",
            Some(serde_json::json!({ "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "DELETE", "/api/conversations/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rename_delete() {
        let app = app().await;
        let (status, created) = call(&app, "POST", "/api/conversations", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "새 대화");
        let id = created["id"].as_i64().unwrap();

        let (status, renamed) = call(
            &app,
            "PATCH",
            &format!("/api/conversations/{id}"),
            Some(serde_json::json!({ "title": "예약 템플릿" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["title"], "예약 템플릿");

        let (status, _) = call(&app, "DELETE", &format!("/api/conversations/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list) = call(&app, "GET", "/api/conversations", None).await;
        assert!(list["activeId"].is_null());
    }

    #[tokio::test]
    async fn test_theme_round_trip() {
        let app = app().await;
        let (_, body) = call(&app, "GET", "/api/theme", None).await;
        assert_eq!(body["theme"], "default");
        let options = body["options"].as_array().unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[2]["value"], "dark");
        assert_eq!(options[2]["label"], "다크");

        let (status, _) = call(
            &app,
            "PUT",
            "/api/theme",
            Some(serde_json::json!({ "theme": "dark" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, "GET", "/api/theme", None).await;
        assert_eq!(body["theme"], "dark");

        let (status, _) = call(
            &app,
            "PUT",
            "/api/theme",
            Some(serde_json::json!({ "theme": "neon" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
