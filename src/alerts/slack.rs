use crate::alerts::NotificationSink;
use crate::error::AlertError;
use crate::events::{AlertEvent, Severity};
use chrono::{DateTime, Local};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Maximum characters of a nested detail value rendered into a message
const NESTED_DETAIL_MAX_CHARS: usize = 500;

/// Connection settings for a Slack incoming webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub channel: String,
    pub username: String,
    pub timeout_seconds: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            channel: "#aiops-alerts".to_string(),
            username: "AIOps Bot".to_string(),
            timeout_seconds: 5,
        }
    }
}

/// Request body for a Slack incoming webhook
#[derive(Debug, Serialize)]
struct SlackPayload {
    username: String,
    icon_emoji: String,
    channel: String,
    attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
struct SlackAttachment {
    color: String,
    title: String,
    text: String,
    fields: Vec<SlackField>,
    footer: String,
    ts: i64,
}

#[derive(Debug, Serialize)]
struct SlackField {
    title: String,
    value: String,
    short: bool,
}

/// Sink posting alert events to a Slack channel through a webhook
///
/// The sink owns a small single-threaded runtime so callers can use it from
/// synchronous code. It must not be called from inside another Tokio runtime.
pub struct SlackSink {
    client: Client,
    runtime: Runtime,
    config: SlackConfig,
}

impl SlackSink {
    /// Create a new Slack sink
    ///
    /// # Errors
    ///
    /// Returns `AlertError::HttpError` if the HTTP client cannot be built and
    /// `AlertError::IoError` if the runtime cannot be started.
    pub fn new(config: SlackConfig) -> Result<Self, AlertError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;

        Ok(Self {
            client,
            runtime,
            config,
        })
    }

    /// Attachment color for a severity
    fn color(severity: Severity) -> &'static str {
        match severity {
            Severity::Info => "#36a64f",
            Severity::Success => "#2eb67d",
            Severity::Warning => "#ffcc00",
            Severity::Error => "#ff9900",
            Severity::Critical => "#ff0000",
            Severity::Emergency => "#8b0000",
        }
    }

    /// Title prefix for a severity
    fn emoji(severity: Severity) -> &'static str {
        match severity {
            Severity::Info => "ℹ️",
            Severity::Success => "✅",
            Severity::Warning => "⚠️",
            Severity::Error => "🚨",
            Severity::Critical => "🔥",
            Severity::Emergency => "💀",
        }
    }

    /// Render detail fields as Slack markdown
    ///
    /// Scalars render inline; arrays and objects render as pretty JSON in a
    /// code block, truncated to keep messages readable.
    fn format_details(event: &AlertEvent) -> String {
        let mut text = String::new();

        for field in event.details() {
            match &field.value {
                Value::Array(_) | Value::Object(_) => {
                    let pretty = serde_json::to_string_pretty(&field.value)
                        .unwrap_or_else(|_| field.value.to_string());
                    let truncated: String = pretty.chars().take(NESTED_DETAIL_MAX_CHARS).collect();
                    text.push_str(&format!("*{}:*\n```{}```\n", field.name, truncated));
                }
                Value::String(s) => text.push_str(&format!("*{}:* {}\n", field.name, s)),
                other => text.push_str(&format!("*{}:* {}\n", field.name, other)),
            }
        }

        text
    }

    fn build_payload(&self, event: &AlertEvent, now: DateTime<Local>) -> SlackPayload {
        let severity = event.severity();
        let label = severity.as_str().to_uppercase();

        let title = if event.title().is_empty() {
            label.clone()
        } else {
            event.title().to_string()
        };

        let mut fields = vec![
            SlackField {
                title: "Severity".to_string(),
                value: label,
                short: true,
            },
            SlackField {
                title: "Time".to_string(),
                value: now.format("%H:%M:%S").to_string(),
                short: true,
            },
            SlackField {
                title: "Date".to_string(),
                value: now.format("%Y-%m-%d").to_string(),
                short: true,
            },
        ];

        if !event.details().is_empty() {
            fields.push(SlackField {
                title: "Details".to_string(),
                value: Self::format_details(event),
                short: false,
            });
        }

        SlackPayload {
            username: self.config.username.clone(),
            icon_emoji: ":robot_face:".to_string(),
            channel: self.config.channel.clone(),
            attachments: vec![SlackAttachment {
                color: Self::color(severity).to_string(),
                title: format!("{} {}", Self::emoji(severity), title),
                text: event.message().to_string(),
                fields,
                footer: "AIOps System | logscan".to_string(),
                ts: now.timestamp(),
            }],
        }
    }
}

impl NotificationSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn send(&self, event: &AlertEvent) -> Result<(), AlertError> {
        let payload = self.build_payload(event, Local::now());
        debug!("Posting '{}' to Slack channel {}", event.title(), self.config.channel);

        self.runtime.block_on(async {
            let response = self
                .client
                .post(&self.config.webhook_url)
                .json(&payload)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AlertError::RejectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok::<(), AlertError>(())
        })?;

        let preview: String = event.message().chars().take(50).collect();
        info!("Slack: {} - {}", event.severity().as_str().to_uppercase(), preview);
        Ok(())
    }
}
