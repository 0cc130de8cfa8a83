use std::time::Duration;

use async_trait::async_trait;
use babelflag_core::{config::AwsConfig, errors::CollaboratorError, ports::LanguageDetector};
use serde::{Deserialize, Serialize};

use crate::{
    client::{AwsError, AwsJsonClient},
    provider::SharedCredentialsProvider,
};

pub const SERVICE: &str = "comprehend";
pub const DETECT_DOMINANT_LANGUAGE_TARGET: &str = "Comprehend_20171127.DetectDominantLanguage";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectDominantLanguageRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectDominantLanguageResponse {
    #[serde(default)]
    pub languages: Vec<DominantLanguage>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DominantLanguage {
    pub language_code: String,
    #[serde(default)]
    pub score: f32,
}

impl DetectDominantLanguageResponse {
    /// Highest-scoring language code; the first listed wins a tie.
    pub fn dominant_code(&self) -> Option<&str> {
        self.languages
            .iter()
            .filter(|language| !language.language_code.is_empty())
            .fold(None::<&DominantLanguage>, |best, candidate| match best {
                Some(best) if best.score >= candidate.score => Some(best),
                _ => Some(candidate),
            })
            .map(|language| language.language_code.as_str())
    }
}

/// Dominant-language detection backed by Amazon Comprehend.
#[derive(Clone, Debug)]
pub struct ComprehendDetector {
    client: AwsJsonClient,
}

impl ComprehendDetector {
    pub fn new(client: AwsJsonClient) -> Self {
        Self { client }
    }

    pub fn from_config(
        config: &AwsConfig,
        credentials: SharedCredentialsProvider,
    ) -> Result<Self, AwsError> {
        let client = AwsJsonClient::new(
            SERVICE,
            &config.comprehend_endpoint(),
            config.region.clone(),
            credentials,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::new(client))
    }

    pub async fn detect_dominant_language(
        &self,
        text: &str,
    ) -> Result<DetectDominantLanguageResponse, AwsError> {
        self.client
            .call(DETECT_DOMINANT_LANGUAGE_TARGET, &DetectDominantLanguageRequest { text })
            .await
    }
}

#[async_trait]
impl LanguageDetector for ComprehendDetector {
    async fn detect(&self, text: &str) -> Result<String, CollaboratorError> {
        let response = self
            .detect_dominant_language(text)
            .await
            .map_err(|error| CollaboratorError::detect(error.to_string()))?;

        response
            .dominant_code()
            .map(str::to_owned)
            .ok_or_else(|| CollaboratorError::detect("comprehend returned no languages"))
    }
}
