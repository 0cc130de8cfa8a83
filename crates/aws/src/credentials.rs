use async_trait::async_trait;
use babelflag_core::config::AwsConfig;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::provider::{CredentialsError, ProvideCredentials};

/// Refresh this long before temporary credentials actually expire.
const EXPIRY_BUFFER_SECS: i64 = 300;

/// AWS credentials. Secret parts never appear in `Debug` output.
#[derive(Clone, Debug)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
    source: &'static str,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into().into(),
            session_token: None,
            expires_at: None,
            source: "static",
        }
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into().into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = source;
        self
    }

    /// `None` when the key id or secret key is not configured.
    pub fn from_config(config: &AwsConfig) -> Option<Self> {
        if !config.has_static_credentials() {
            return None;
        }
        let access_key_id = config.access_key_id.clone()?;
        let secret_access_key = config.secret_access_key.clone()?;
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: config.session_token.clone(),
            expires_at: None,
            source: "static",
        })
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Provider that produced these credentials (`static`, `profile`, ...).
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True once `now` is within the refresh buffer of the expiry.
    pub fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - Duration::seconds(EXPIRY_BUFFER_SECS) <= now)
    }

    pub(crate) fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    pub(crate) fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|token| token.expose_secret())
    }
}

#[async_trait]
impl ProvideCredentials for Credentials {
    fn name(&self) -> &'static str {
        self.source
    }

    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::Credentials;

    #[test]
    fn debug_output_redacts_secret_parts() {
        let credentials =
            Credentials::new("AKIDEXAMPLE", "very-secret-key").with_session_token("session-value");
        let debug = format!("{credentials:?}");

        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("very-secret-key"));
        assert!(!debug.contains("session-value"));
        assert_eq!(credentials.session_token(), Some("session-value"));
    }

    #[test]
    fn expiry_is_reported_ahead_of_the_deadline() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid time");

        let permanent = Credentials::new("AKID", "secret");
        assert!(!permanent.is_expiring(now));

        let fresh = Credentials::new("ASIA", "secret").with_expiry(now + Duration::hours(1));
        assert!(!fresh.is_expiring(now));

        let soon = Credentials::new("ASIA", "secret").with_expiry(now + Duration::minutes(4));
        assert!(soon.is_expiring(now));
    }
}
