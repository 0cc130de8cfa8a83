use babelflag_aws::{CredentialsChain, ProvideCredentials};
use babelflag_core::{
    config::{AppConfig, LoadOptions},
    languages,
};
use babelflag_slack::SlackWebClient;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CHECK_FAILED};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub overall_status: CheckStatus,
    pub summary: String,
    pub checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 3] = ["slack_token_readiness", "channel_scope", "aws_credentials"];
const BOT_TOKEN_PREFIX: &str = "xoxb-";

/// Whether checks may reach Slack and AWS or only inspect configured values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckMode {
    Live,
    Offline,
}

pub fn run(json_output: bool, offline: bool) -> CommandResult {
    let mode = if offline { CheckMode::Offline } else { CheckMode::Live };
    let report = build_report(AppConfig::load(LoadOptions::default()), mode);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CHECK_FAILED };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult::text(exit_code, output);
    }

    CommandResult::text(exit_code, render_human(&report))
}

pub fn build_report<E: std::fmt::Display>(
    loaded: Result<AppConfig, E>,
    mode: CheckMode,
) -> DoctorReport {
    let mut checks = Vec::new();

    match loaded {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_slack_tokens(&config, mode));
            checks.push(check_channel_scope(&config));
            checks.push(check_aws_credentials(&config, mode));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }
    checks.push(check_language_table());

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_slack_tokens(config: &AppConfig, mode: CheckMode) -> DoctorCheck {
    const NAME: &str = "slack_token_readiness";

    let bot_token = config.slack.bot_token.expose_secret();
    let verification_token = config.slack.verification_token.expose_secret();
    let mut problems = Vec::new();
    match bot_token.strip_prefix(BOT_TOKEN_PREFIX) {
        None => problems.push(format!("bot token does not start with `{BOT_TOKEN_PREFIX}`")),
        Some(rest) if rest.is_empty() => problems.push("bot token has nothing after its prefix".to_string()),
        Some(_) => {}
    }
    if bot_token.chars().any(char::is_whitespace) {
        problems.push("bot token contains whitespace".to_string());
    }
    if verification_token.trim().is_empty() {
        problems.push("verification token is empty".to_string());
    } else if verification_token.chars().any(char::is_whitespace) {
        problems.push("verification token contains whitespace".to_string());
    }
    if !problems.is_empty() {
        return DoctorCheck { name: NAME, status: CheckStatus::Fail, details: problems.join("; ") };
    }

    let shape = format!(
        "bot token has the {BOT_TOKEN_PREFIX} prefix; verification token present ({} chars)",
        verification_token.len()
    );
    if mode == CheckMode::Offline {
        return DoctorCheck {
            name: NAME,
            status: CheckStatus::Pass,
            details: format!("{shape}; auth.test not attempted (offline)"),
        };
    }

    let result = block_on_check(async {
        let client = SlackWebClient::from_config(&config.slack).map_err(|error| error.to_string())?;
        client.auth_test().await.map_err(|error| error.to_string())
    });
    match result {
        Ok(identity) => DoctorCheck {
            name: NAME,
            status: CheckStatus::Pass,
            details: format!(
                "{shape}; auth.test accepted the bot token as {} in {}",
                identity.user, identity.team
            ),
        },
        Err(error) => DoctorCheck {
            name: NAME,
            status: CheckStatus::Fail,
            details: format!("auth.test failed: {error}"),
        },
    }
}

fn check_channel_scope(config: &AppConfig) -> DoctorCheck {
    if config.slack.channel_ids.is_empty() {
        return DoctorCheck {
            name: "channel_scope",
            status: CheckStatus::Pass,
            details: "no allow-list configured; reactions in every channel are translated"
                .to_string(),
        };
    }

    let malformed: Vec<&str> = config
        .slack
        .channel_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !is_channel_id(id))
        .collect();
    if malformed.is_empty() {
        DoctorCheck {
            name: "channel_scope",
            status: CheckStatus::Pass,
            details: format!("translating only in {}", config.slack.channel_ids.join(", ")),
        }
    } else {
        DoctorCheck {
            name: "channel_scope",
            status: CheckStatus::Fail,
            details: format!(
                "not Slack channel ids (expected e.g. C0G9QF9GZ): {}",
                malformed.join(", ")
            ),
        }
    }
}

/// Public (`C`), private (`G`) or direct (`D`) conversation id.
fn is_channel_id(id: &str) -> bool {
    let mut chars = id.chars();
    matches!(chars.next(), Some('C' | 'G' | 'D'))
        && id.len() >= 9
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn check_aws_credentials(config: &AppConfig, mode: CheckMode) -> DoctorCheck {
    const NAME: &str = "aws_credentials";

    let chain = CredentialsChain::default_for(&config.aws);
    let sources = chain.provider_names();
    if sources.is_empty() {
        return DoctorCheck {
            name: NAME,
            status: CheckStatus::Fail,
            details: "no credential source: set aws.access_key_id and aws.secret_access_key, \
                      a shared credentials profile, or container credentials"
                .to_string(),
        };
    }
    let chain_summary = format!("credential chain: {}", sources.join(" -> "));

    if mode == CheckMode::Offline {
        let local = sources.iter().any(|source| *source != "instance-metadata");
        return if local {
            DoctorCheck {
                name: NAME,
                status: CheckStatus::Pass,
                details: format!("{chain_summary}; not resolved (offline)"),
            }
        } else {
            DoctorCheck {
                name: NAME,
                status: CheckStatus::Skipped,
                details: format!("{chain_summary}; only instance metadata remains (offline)"),
            }
        };
    }

    match block_on_check(async { chain.provide().await.map_err(|error| error.to_string()) }) {
        Ok(credentials) => DoctorCheck {
            name: NAME,
            status: CheckStatus::Pass,
            details: format!(
                "{chain_summary}; resolved from {}; comprehend at {}, translate at {}",
                credentials.source(),
                config.aws.comprehend_endpoint(),
                config.aws.translate_endpoint()
            ),
        },
        Err(error) => DoctorCheck {
            name: NAME,
            status: CheckStatus::Fail,
            details: format!("{chain_summary}; {error}"),
        },
    }
}

fn block_on_check<T>(
    check: impl std::future::Future<Output = Result<T, String>>,
) -> Result<T, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| format!("failed to initialize async runtime: {error}"))?;
    runtime.block_on(check)
}

fn check_language_table() -> DoctorCheck {
    let codes = languages::supported_codes().count();
    match languages::resolve_language("jp") {
        Some(resolved) if codes > 0 => DoctorCheck {
            name: "language_table",
            status: CheckStatus::Pass,
            details: format!(
                "{codes} target languages reachable; {} resolves to {} ({})",
                resolved.flag, resolved.language_name, resolved.code
            ),
        },
        _ => DoctorCheck {
            name: "language_table",
            status: CheckStatus::Fail,
            details: "flag table does not resolve the reference reaction `jp`".to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
