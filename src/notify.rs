use crate::cli::config::{Config, Environment};

use serde::Serialize;
use std::time::Duration;

const ERROR_COLOR: &str = "#FF0000";
const PRETEXT: &str = "There was an issue running migrations on this instance.";
const POST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct Attachment {
    pub color: String,
    pub pretext: String,
    pub fallback: String,
    pub text: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize)]
pub struct SlackMessage {
    pub attachments: Vec<Attachment>,
}

/// Collect (name, value) pairs for the configured context variables,
/// keeping flag order and skipping names that are not set.
pub fn context_fields(env: &Environment, names: &[String]) -> Vec<Field> {
    names
        .iter()
        .filter_map(|name| {
            env.get(name).map(|value| Field {
                title: name.clone(),
                value: value.to_string(),
            })
        })
        .collect()
}

pub fn build_payload(error_text: &str, fields: Vec<Field>) -> SlackMessage {
    SlackMessage {
        attachments: vec![Attachment {
            color: ERROR_COLOR.to_string(),
            pretext: PRETEXT.to_string(),
            fallback: format!("Migration had error: {error_text}"),
            text: error_text.to_string(),
            fields,
        }],
    }
}

/// Best-effort failure alert after a failed migrate.
///
/// Never returns an error: a webhook that is not configured is a no-op,
/// and a transport failure is logged and discarded so the original
/// migration error stays the invocation's terminal error.
pub async fn migration_failure(config: &Config, env: &Environment, error_text: &str) {
    let Some(webhook_url) = env.get(&config.slack_webhook_var) else {
        return;
    };

    let payload = build_payload(error_text, context_fields(env, &config.context_env_vars));

    let result = reqwest::Client::new()
        .post(webhook_url)
        .timeout(POST_TIMEOUT)
        .json(&payload)
        .send()
        .await;

    if let Err(e) = result {
        tracing::warn!("Could not send to webhook {webhook_url}: {e}");
    }
}
