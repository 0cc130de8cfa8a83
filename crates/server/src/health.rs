use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use babelflag_core::config::AppConfig;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct HealthState {
    slack_api_base_url: String,
    allowed_channels: usize,
    aws_region: String,
}

impl HealthState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            slack_api_base_url: config.slack.api_base_url.clone(),
            allowed_channels: config.slack.channel_ids.len(),
            aws_region: config.aws.region.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub slack: HealthCheck,
    pub aws: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let channels = match state.allowed_channels {
        0 => "all channels".to_string(),
        1 => "1 channel".to_string(),
        count => format!("{count} channels"),
    };

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "babelflag-server accepting events".to_string(),
        },
        slack: HealthCheck {
            status: "configured",
            detail: format!("{} ({channels})", state.slack_api_base_url),
        },
        aws: HealthCheck { status: "configured", detail: format!("region {}", state.aws_region) },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::State,
        http::{Request, StatusCode},
        Json,
    };
    use tower::ServiceExt;

    use crate::health::{health, router, HealthState};

    fn state(allowed_channels: usize) -> HealthState {
        HealthState {
            slack_api_base_url: "https://slack.com/api".to_string(),
            allowed_channels,
            aws_region: "us-west-2".to_string(),
        }
    }

    #[tokio::test]
    async fn health_reports_ready_with_backend_summary() {
        let (status, Json(payload)) = health(State(state(2))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.slack.detail, "https://slack.com/api (2 channels)");
        assert_eq!(payload.aws.detail, "region us-west-2");
    }

    #[tokio::test]
    async fn health_route_is_served_over_get() {
        let response = router(state(0))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["slack"]["detail"], "https://slack.com/api (all channels)");
    }
}
