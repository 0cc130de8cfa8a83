use std::time::Duration;

use async_trait::async_trait;
use babelflag_core::{config::AwsConfig, errors::CollaboratorError, ports::Translator};
use serde::{Deserialize, Serialize};

use crate::{
    client::{AwsError, AwsJsonClient},
    provider::SharedCredentialsProvider,
};

pub const SERVICE: &str = "translate";
pub const TRANSLATE_TEXT_TARGET: &str = "AWSShineFrontendService_20170701.TranslateText";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextRequest<'a> {
    text: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranslateTextResponse {
    pub translated_text: String,
    #[serde(default)]
    pub source_language_code: String,
    #[serde(default)]
    pub target_language_code: String,
}

/// Text translation backed by Amazon Translate.
#[derive(Clone, Debug)]
pub struct AwsTranslator {
    client: AwsJsonClient,
}

impl AwsTranslator {
    pub fn new(client: AwsJsonClient) -> Self {
        Self { client }
    }

    pub fn from_config(
        config: &AwsConfig,
        credentials: SharedCredentialsProvider,
    ) -> Result<Self, AwsError> {
        let client = AwsJsonClient::new(
            SERVICE,
            &config.translate_endpoint(),
            config.region.clone(),
            credentials,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::new(client))
    }

    pub async fn translate_text(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<TranslateTextResponse, AwsError> {
        self.client
            .call(
                TRANSLATE_TEXT_TARGET,
                &TranslateTextRequest {
                    text,
                    source_language_code: source_code,
                    target_language_code: target_code,
                },
            )
            .await
    }
}

#[async_trait]
impl Translator for AwsTranslator {
    async fn translate(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, CollaboratorError> {
        self.translate_text(text, source_code, target_code)
            .await
            .map(|response| response.translated_text)
            .map_err(|error| CollaboratorError::translate(error.to_string()))
    }
}
