use std::sync::Arc;

use babelflag_aws::{
    default_provider, AwsError, AwsTranslator, ComprehendDetector, SharedCredentialsProvider,
};
use babelflag_core::{
    config::{AppConfig, ConfigError},
    pipeline::{Collaborators, EventPipeline, PipelineSettings},
};
use babelflag_slack::{SlackApiError, SlackWebClient};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub pipeline: Arc<EventPipeline>,
    pub credentials: SharedCredentialsProvider,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("slack client setup failed: {0}")]
    Slack(#[from] SlackApiError),
    #[error("aws client setup failed: {0}")]
    Aws(#[from] AwsError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let slack = Arc::new(SlackWebClient::from_config(&config.slack)?);
    let credentials = default_provider(&config.aws);
    let detector = Arc::new(ComprehendDetector::from_config(&config.aws, credentials.clone())?);
    let translator = Arc::new(AwsTranslator::from_config(&config.aws, credentials.clone())?);
    info!(
        event_name = "system.bootstrap.backends_ready",
        correlation_id = "bootstrap",
        aws_region = %config.aws.region,
        allowed_channels = config.slack.channel_ids.len(),
        "slack and aws clients initialized"
    );

    let pipeline = EventPipeline::new(
        PipelineSettings::from_config(&config.slack),
        Collaborators { fetcher: slack.clone(), detector, translator, poster: slack },
    );

    Ok(Application { config, pipeline: Arc::new(pipeline), credentials })
}
