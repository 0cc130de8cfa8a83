use std::time::Duration;

use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    provider::{CredentialsError, SharedCredentialsProvider},
    sigv4::{self, SignableRequest, SigningError, SigningParams},
};

pub const JSON_1_1_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Error)]
pub enum AwsError {
    #[error("aws transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("aws credentials unavailable: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("invalid aws endpoint `{endpoint}`")]
    InvalidEndpoint { endpoint: String },
    #[error("aws {service} request could not be encoded: {source}")]
    Encode { service: &'static str, source: serde_json::Error },
    #[error("aws {service} response could not be decoded: {source}")]
    Decode { service: &'static str, source: serde_json::Error },
    #[error("aws {service} returned {code} (HTTP {status}): {message}")]
    Service { service: &'static str, status: u16, code: String, message: String },
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "__type")]
    error_type: String,
    #[serde(default, alias = "Message")]
    message: String,
}

/// Signed client for one AWS service that speaks the JSON 1.1 protocol.
#[derive(Clone, Debug)]
pub struct AwsJsonClient {
    http: reqwest::Client,
    endpoint: Url,
    host: String,
    region: String,
    service: &'static str,
    credentials: SharedCredentialsProvider,
}

impl AwsJsonClient {
    pub fn new(
        service: &'static str,
        endpoint: &str,
        region: impl Into<String>,
        credentials: SharedCredentialsProvider,
        timeout: Duration,
    ) -> Result<Self, AwsError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|_| AwsError::InvalidEndpoint { endpoint: endpoint.to_owned() })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(AwsError::InvalidEndpoint { endpoint: endpoint.to_string() });
            }
        };
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, endpoint, host, region: region.into(), service, credentials })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Invoke `target` (e.g. `Comprehend_20171127.DetectDominantLanguage`).
    pub async fn call<Req, Resp>(&self, target: &str, request: &Req) -> Result<Resp, AwsError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let service = self.service;
        let body = serde_json::to_vec(request)
            .map_err(|source| AwsError::Encode { service, source })?;

        let credentials = self.credentials.provide().await?;
        let headers = [("content-type", JSON_1_1_CONTENT_TYPE), ("x-amz-target", target)];
        let signed = sigv4::sign(
            &SignableRequest {
                method: "POST",
                host: &self.host,
                path: self.endpoint.path(),
                query: "",
                headers: &headers,
                body: &body,
            },
            &SigningParams {
                access_key_id: credentials.access_key_id(),
                secret_access_key: credentials.secret_access_key(),
                session_token: credentials.session_token(),
                region: &self.region,
                service,
                time: Utc::now(),
            },
        )?;

        debug!(event_name = "aws.request.sent", service, amz_target = %target, "calling aws");
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_1_1_CONTENT_TYPE)
            .header("X-Amz-Target", target)
            .header("X-Amz-Date", signed.amz_date)
            .header("Authorization", signed.authorization);
        if let Some(token) = signed.security_token {
            builder = builder.header("X-Amz-Security-Token", token);
        }

        let response = builder.body(body).send().await?;
        let status = response.status();
        let raw = response.bytes().await?;

        if !status.is_success() {
            let error: ErrorBody = serde_json::from_slice(&raw).unwrap_or_default();
            let code = error_code(&error.error_type);
            warn!(
                event_name = "aws.request.failed",
                service,
                amz_target = %target,
                status = status.as_u16(),
                code = %code,
                "aws rejected the call"
            );
            return Err(AwsError::Service {
                service,
                status: status.as_u16(),
                code,
                message: error.message,
            });
        }

        serde_json::from_slice(&raw).map_err(|source| AwsError::Decode { service, source })
    }
}

/// `com.amazonaws.translate#UnsupportedLanguagePairException` → the part after `#`.
fn error_code(error_type: &str) -> String {
    let code = error_type.rsplit('#').next().unwrap_or(error_type);
    if code.is_empty() {
        "UnknownError".to_owned()
    } else {
        code.to_owned()
    }
}
