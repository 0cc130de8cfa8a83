use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use babelflag_core::{
    errors::InterfaceError,
    pipeline::{EventContext, EventPipeline, PipelineResponse},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const EVENTS_PATH: &str = "/slack/events";
const REQUEST_ID_HEADER: &str = "x-request-id";
const RETRY_NUM_HEADER: &str = "x-slack-retry-num";
const RETRY_REASON_HEADER: &str = "x-slack-retry-reason";

#[derive(Clone)]
pub struct WebhookState {
    pipeline: Arc<EventPipeline>,
}

#[derive(Debug, Serialize)]
struct ChallengeBody {
    challenge: String,
}

#[derive(Debug, Serialize)]
struct ResultBody {
    result: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: &'static str,
    correlation_id: String,
}

/// Events API routes. `/` is kept for deployments that point Slack at the
/// bare function URL.
pub fn router(pipeline: Arc<EventPipeline>) -> Router {
    Router::new()
        .route(EVENTS_PATH, post(receive))
        .route("/", post(receive))
        .with_state(WebhookState { pipeline })
}

pub async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = EventContext::new(correlation_id(&headers));

    let event = match babelflag_slack::decode(&body) {
        Ok(event) => event,
        Err(error) => {
            warn!(
                event_name = "ingress.slack.decode_failed",
                correlation_id = %ctx.correlation_id,
                error = %error,
                "webhook body could not be decoded"
            );
            return error_response(InterfaceError::bad_request(
                error.to_string(),
                ctx.correlation_id,
            ));
        }
    };

    // The first delivery already owns this event; a redelivery must not post again.
    if let Some(retry_num) = header_str(&headers, RETRY_NUM_HEADER) {
        info!(
            event_name = "ingress.slack.retry_acknowledged",
            correlation_id = %ctx.correlation_id,
            event_type = event.event_type(),
            retry_num = %retry_num,
            retry_reason = header_str(&headers, RETRY_REASON_HEADER).unwrap_or("unknown"),
            "slack redelivery acknowledged without reprocessing"
        );
        return (StatusCode::OK, Json(ResultBody { result: "ok" })).into_response();
    }

    info!(
        event_name = "ingress.slack.event_received",
        correlation_id = %ctx.correlation_id,
        event_type = event.event_type(),
        channel_id = event.channel_id().unwrap_or("unknown"),
        "slack event received"
    );

    let response = state.pipeline.handle(&event, &ctx).await;
    into_http(response, ctx)
}

fn into_http(response: PipelineResponse, ctx: EventContext) -> Response {
    if let Some(challenge) = response.challenge {
        return (StatusCode::OK, Json(ChallengeBody { challenge })).into_response();
    }

    match response.outcome.into_error() {
        None => (StatusCode::OK, Json(ResultBody { result: "ok" })).into_response(),
        Some(error) => error_response(error.into_interface(ctx.correlation_id)),
    }
}

fn error_response(error: InterfaceError) -> Response {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = ErrorBody {
        error: error.to_string(),
        message: error.user_message(),
        correlation_id: error.correlation_id().to_owned(),
    };
    (status, Json(body)).into_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn correlation_id(headers: &HeaderMap) -> String {
    header_str(headers, REQUEST_ID_HEADER)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
