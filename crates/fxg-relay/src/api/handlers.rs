//! Route handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tracing::debug;

use fxg_types::ApplicantRequest;

use super::auth::authorize;
use crate::error::RelayError;
use crate::service::RelayService;

type ApiState = Arc<RelayService>;
type Body = Result<Json<ApplicantRequest>, JsonRejection>;
type ApiResult = Result<Json<Value>, RelayError>;

/// All routes, without state attached.
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(health))
        .route("/ping", get(ping))
        .route("/send-interview-dm", post(send_interview_dm))
        .route("/send-approval-dm", post(send_approval_dm))
        .route("/send-denial-dm", post(send_denial_dm))
        .route("/send-career-approval-dm", post(send_career_approval_dm))
        .route("/send-career-denial-dm", post(send_career_denial_dm))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn health(State(svc): State<ApiState>) -> Json<Value> {
    let bot = svc
        .bot_tag()
        .await
        .unwrap_or_else(|| "connecting...".to_string());
    Json(json!({
        "status": "online",
        "bot": bot,
        "ready": svc.is_ready(),
        "timestamp": now(),
    }))
}

async fn ping(State(svc): State<ApiState>) -> Json<Value> {
    Json(json!({
        "pong": true,
        "timestamp": now(),
        "botReady": svc.is_ready(),
    }))
}

/// Run the auth and readiness gates, then hand back the body.
///
/// A missing or malformed body is treated as an empty request so that it
/// never masks a 401 or 503.
fn admit(svc: &RelayService, headers: &HeaderMap, body: Body) -> Result<ApplicantRequest, RelayError> {
    authorize(headers, &svc.config().api_secret)?;
    svc.ensure_ready()?;
    Ok(match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable request body, treating as empty");
            ApplicantRequest::default()
        }
    })
}

fn success(message: String) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

async fn send_interview_dm(State(svc): State<ApiState>, headers: HeaderMap, body: Body) -> ApiResult {
    let req = admit(&svc, &headers, body)?;
    Ok(success(svc.send_interview_invite(&req).await?))
}

async fn send_approval_dm(State(svc): State<ApiState>, headers: HeaderMap, body: Body) -> ApiResult {
    let req = admit(&svc, &headers, body)?;
    Ok(success(svc.approve(&req).await?))
}

async fn send_denial_dm(State(svc): State<ApiState>, headers: HeaderMap, body: Body) -> ApiResult {
    let req = admit(&svc, &headers, body)?;
    Ok(success(svc.deny(&req).await?))
}

async fn send_career_approval_dm(
    State(svc): State<ApiState>,
    headers: HeaderMap,
    body: Body,
) -> ApiResult {
    let req = admit(&svc, &headers, body)?;
    Ok(success(svc.approve_career(&req).await?))
}

async fn send_career_denial_dm(
    State(svc): State<ApiState>,
    headers: HeaderMap,
    body: Body,
) -> ApiResult {
    let req = admit(&svc, &headers, body)?;
    Ok(success(svc.deny_career(&req).await?))
}
