//! Credential providers.
//!
//! The default chain tries, in order: static keys from config or env, the
//! shared credentials file, the container credentials endpoint, and the EC2
//! instance metadata service. The first provider that yields credentials wins
//! and the result is cached until shortly before it expires.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use babelflag_core::config::AwsConfig;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::credentials::Credentials;

const DEFAULT_PROFILE: &str = "default";
const CONTAINER_ENDPOINT: &str = "http://169.254.170.2";
const INSTANCE_METADATA_ENDPOINT: &str = "http://169.254.169.254";
const IMDS_TOKEN_PATH: &str = "/latest/api/token";
const IMDS_ROLES_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const IMDS_TOKEN_TTL_SECS: &str = "21600";
const METADATA_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("{provider}: {reason}")]
    Unavailable { provider: &'static str, reason: String },
    #[error("{provider} request failed: {source}")]
    Transport { provider: &'static str, source: reqwest::Error },
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider} returned an unparseable body: {source}")]
    Decode { provider: &'static str, source: serde_json::Error },
    #[error("no aws credentials found ({0})")]
    NotFound(String),
}

impl CredentialsError {
    fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable { provider, reason: reason.into() }
    }
}

#[async_trait]
pub trait ProvideCredentials: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    async fn provide(&self) -> Result<Credentials, CredentialsError>;
}

pub type SharedCredentialsProvider = Arc<dyn ProvideCredentials>;

/// Cached default chain for `config`.
pub fn default_provider(config: &AwsConfig) -> SharedCredentialsProvider {
    Arc::new(CachedProvider::new(CredentialsChain::default_for(config)))
}

/// Providers tried in order until one yields credentials.
#[derive(Debug, Default)]
pub struct CredentialsChain {
    providers: Vec<SharedCredentialsProvider>,
}

impl CredentialsChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl ProvideCredentials + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Static keys, shared profile, container endpoint, instance metadata;
    /// each is included only when its environment makes it applicable.
    pub fn default_for(config: &AwsConfig) -> Self {
        let mut chain = Self::new();
        if let Some(credentials) = Credentials::from_config(config) {
            chain = chain.with_provider(credentials);
        }
        if let Some(profile) = ProfileProvider::discover(config.profile.as_deref()) {
            chain = chain.with_provider(profile);
        }
        if let Some(container) = ContainerProvider::from_env() {
            chain = chain.with_provider(container);
        }
        if let Some(metadata) = InstanceMetadataProvider::from_env() {
            chain = chain.with_provider(metadata);
        }
        chain
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }
}

#[async_trait]
impl ProvideCredentials for CredentialsChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.provide().await {
                Ok(credentials) => {
                    debug!(
                        event_name = "aws.credentials.resolved",
                        source = credentials.source(),
                        "aws credentials resolved"
                    );
                    return Ok(credentials);
                }
                Err(error) => {
                    debug!(
                        event_name = "aws.credentials.provider_skipped",
                        provider = provider.name(),
                        error = %error,
                        "credential provider yielded nothing"
                    );
                    failures.push(error.to_string());
                }
            }
        }

        if failures.is_empty() {
            return Err(CredentialsError::NotFound("no credential provider applies".to_owned()));
        }
        Err(CredentialsError::NotFound(failures.join("; ")))
    }
}

/// Holds the last credentials until they come within the refresh buffer of
/// their expiry. Concurrent callers wait for a single refresh.
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    cached: Mutex<Option<Credentials>>,
}

impl<P: ProvideCredentials> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner, cached: Mutex::new(None) }
    }
}

#[async_trait]
impl<P: ProvideCredentials> ProvideCredentials for CachedProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        let mut cached = self.cached.lock().await;
        if let Some(credentials) = cached.as_ref() {
            if !credentials.is_expiring(Utc::now()) {
                return Ok(credentials.clone());
            }
        }

        let fresh = self.inner.provide().await?;
        info!(
            event_name = "aws.credentials.refreshed",
            source = fresh.source(),
            expires_at = ?fresh.expires_at(),
            "aws credentials loaded"
        );
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}

/// `[profile]` section of the shared credentials file.
#[derive(Clone, Debug)]
pub struct ProfileProvider {
    path: PathBuf,
    profile: String,
}

impl ProfileProvider {
    pub fn new(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self { path: path.into(), profile: profile.into() }
    }

    /// `AWS_SHARED_CREDENTIALS_FILE`, else `~/.aws/credentials`. Without an
    /// explicit profile the provider is skipped when the file is absent.
    pub fn discover(profile: Option<&str>) -> Option<Self> {
        let path = env::var_os("AWS_SHARED_CREDENTIALS_FILE")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var_os("HOME")
                    .filter(|value| !value.is_empty())
                    .map(|home| PathBuf::from(home).join(".aws").join("credentials"))
            })?;

        match profile {
            Some(profile) => Some(Self::new(path, profile)),
            None if path.is_file() => Some(Self::new(path, DEFAULT_PROFILE)),
            None => None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

#[async_trait]
impl ProvideCredentials for ProfileProvider {
    fn name(&self) -> &'static str {
        "profile"
    }

    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        let contents = fs::read_to_string(&self.path).map_err(|error| {
            CredentialsError::unavailable("profile", format!("{}: {error}", self.path.display()))
        })?;

        parse_profile(&contents, &self.profile).ok_or_else(|| {
            CredentialsError::unavailable(
                "profile",
                format!(
                    "profile `{}` in {} has no aws_access_key_id/aws_secret_access_key",
                    self.profile,
                    self.path.display()
                ),
            )
        })
    }
}

/// Static keys for `profile` from an INI-style credentials file. Both the
/// `[name]` and `[profile name]` header forms are accepted.
pub fn parse_profile(contents: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let header = header.trim();
            let name = header.strip_prefix("profile ").map(str::trim).unwrap_or(header);
            in_profile = name == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "aws_access_key_id" => access_key_id = Some(value.to_owned()),
            "aws_secret_access_key" => secret_access_key = Some(value.to_owned()),
            "aws_session_token" => session_token = Some(value.to_owned()),
            _ => {}
        }
    }

    let credentials = Credentials::new(access_key_id?, secret_access_key?).with_source("profile");
    Some(match session_token {
        Some(token) => credentials.with_session_token(token),
        None => credentials,
    })
}

/// Response shape shared by the container and instance metadata endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemporaryCredentials {
    #[serde(default)]
    code: Option<String>,
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expiration: Option<DateTime<Utc>>,
}

impl TemporaryCredentials {
    fn into_credentials(self, source: &'static str) -> Result<Credentials, CredentialsError> {
        if let Some(code) = self.code.filter(|code| code != "Success") {
            return Err(CredentialsError::unavailable(source, format!("endpoint reported {code}")));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(CredentialsError::unavailable(source, "endpoint returned empty keys"));
        }

        let mut credentials =
            Credentials::new(self.access_key_id, self.secret_access_key).with_source(source);
        if let Some(token) = self.token.filter(|token| !token.is_empty()) {
            credentials = credentials.with_session_token(token);
        }
        if let Some(expiration) = self.expiration {
            credentials = credentials.with_expiry(expiration);
        }
        Ok(credentials)
    }
}

/// ECS/EKS task role credentials served at a local endpoint.
#[derive(Clone)]
pub struct ContainerProvider {
    http: reqwest::Client,
    uri: String,
    authorization: Option<SecretString>,
}

impl fmt::Debug for ContainerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerProvider")
            .field("uri", &self.uri)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ContainerProvider {
    pub fn new(
        uri: impl Into<String>,
        authorization: Option<String>,
    ) -> Result<Self, CredentialsError> {
        let http = metadata_client("container")?;
        Ok(Self { http, uri: uri.into(), authorization: authorization.map(Into::into) })
    }

    /// `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` or `..._FULL_URI`, with the
    /// optional `AWS_CONTAINER_AUTHORIZATION_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let uri = non_empty_env("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI")
            .map(|relative| format!("{CONTAINER_ENDPOINT}{relative}"))
            .or_else(|| non_empty_env("AWS_CONTAINER_CREDENTIALS_FULL_URI"))?;
        let authorization = non_empty_env("AWS_CONTAINER_AUTHORIZATION_TOKEN");

        match Self::new(uri, authorization) {
            Ok(provider) => Some(provider),
            Err(error) => {
                warn!(
                    event_name = "aws.credentials.provider_unusable",
                    provider = "container",
                    error = %error,
                    "container credential provider could not be built"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ProvideCredentials for ContainerProvider {
    fn name(&self) -> &'static str {
        "container"
    }

    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        let mut request = self.http.get(&self.uri);
        if let Some(authorization) = &self.authorization {
            request = request.header("Authorization", authorization.expose_secret());
        }

        let body = send_for_text("container", request).await?;
        let temporary: TemporaryCredentials = serde_json::from_str(&body)
            .map_err(|source| CredentialsError::Decode { provider: "container", source })?;
        temporary.into_credentials("container")
    }
}

/// EC2 instance role credentials via IMDSv2.
#[derive(Clone, Debug)]
pub struct InstanceMetadataProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl InstanceMetadataProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CredentialsError> {
        let http = metadata_client("instance-metadata")?;
        let endpoint = endpoint.into().trim_end_matches('/').to_owned();
        Ok(Self { http, endpoint })
    }

    /// Skipped when `AWS_EC2_METADATA_DISABLED=true`; the endpoint can be
    /// moved with `AWS_EC2_METADATA_SERVICE_ENDPOINT`.
    pub fn from_env() -> Option<Self> {
        if non_empty_env("AWS_EC2_METADATA_DISABLED")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
        {
            return None;
        }
        let endpoint = non_empty_env("AWS_EC2_METADATA_SERVICE_ENDPOINT")
            .unwrap_or_else(|| INSTANCE_METADATA_ENDPOINT.to_owned());

        match Self::new(endpoint) {
            Ok(provider) => Some(provider),
            Err(error) => {
                warn!(
                    event_name = "aws.credentials.provider_unusable",
                    provider = "instance-metadata",
                    error = %error,
                    "instance metadata credential provider could not be built"
                );
                None
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }
}

#[async_trait]
impl ProvideCredentials for InstanceMetadataProvider {
    fn name(&self) -> &'static str {
        "instance-metadata"
    }

    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        const PROVIDER: &str = "instance-metadata";

        let token = send_for_text(
            PROVIDER,
            self.http
                .put(self.url(IMDS_TOKEN_PATH))
                .header("x-aws-ec2-metadata-token-ttl-seconds", IMDS_TOKEN_TTL_SECS),
        )
        .await?;

        let roles = send_for_text(
            PROVIDER,
            self.http.get(self.url(IMDS_ROLES_PATH)).header("x-aws-ec2-metadata-token", &token),
        )
        .await?;
        let role = roles
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| CredentialsError::unavailable(PROVIDER, "no instance role attached"))?;

        let body = send_for_text(
            PROVIDER,
            self.http
                .get(self.url(&format!("{IMDS_ROLES_PATH}{role}")))
                .header("x-aws-ec2-metadata-token", &token),
        )
        .await?;
        let temporary: TemporaryCredentials = serde_json::from_str(&body)
            .map_err(|source| CredentialsError::Decode { provider: PROVIDER, source })?;
        temporary.into_credentials(PROVIDER)
    }
}

fn metadata_client(provider: &'static str) -> Result<reqwest::Client, CredentialsError> {
    reqwest::Client::builder()
        .timeout(METADATA_TIMEOUT)
        .build()
        .map_err(|source| CredentialsError::Transport { provider, source })
}

async fn send_for_text(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<String, CredentialsError> {
    let response =
        request.send().await.map_err(|source| CredentialsError::Transport { provider, source })?;
    let status = response.status();
    if !status.is_success() {
        return Err(CredentialsError::Status { provider, status: status.as_u16() });
    }
    response.text().await.map_err(|source| CredentialsError::Transport { provider, source })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
}
