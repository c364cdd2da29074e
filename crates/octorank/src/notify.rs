//! Fire-and-forget notifications for pipeline lifecycle events.
//!
//! Best-effort by contract: a failed send is logged and swallowed, never
//! surfaced to the pipeline.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde_json::json;

/// Lifecycle events worth telling a human about.
#[derive(Clone, Debug)]
pub enum Notification {
    /// A brand-new user was registered.
    UserJoined {
        username: String,
        bio: Option<String>,
        company: Option<String>,
        avatar_url: Option<String>,
    },
    /// A batch job started.
    BatchStarted { job: String },
    /// A batch job finished.
    BatchFinished {
        job: String,
        updated: usize,
        elapsed_secs: f64,
    },
    /// A batch was cut short because the rate budget ran out.
    RateLimitAborted { job: String, updated: usize },
}

/// Fire-and-forget sink for structured status messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification);
}

/// Sink that drops everything. Default for tests and headless runs.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _notification: Notification) {}
}

/// Webhook sink posting Slack-style attachment payloads.
pub struct WebhookNotifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }
}

/// Build the attachment payload for one notification.
pub fn attachment_payload(notification: &Notification) -> serde_json::Value {
    match notification {
        Notification::UserJoined {
            username,
            bio,
            company,
            avatar_url,
        } => json!({
            "attachments": [{
                "color": "#36a64f",
                "title": "user registered",
                "pretext": "A new user joined the ranking.",
                "fields": [
                    {"title": "username", "value": username, "short": true},
                    {"title": "bio", "value": bio.clone().unwrap_or_default(), "short": true},
                    {"title": "company", "value": company.clone().unwrap_or_default(), "short": true},
                ],
                "thumb_url": avatar_url.clone().unwrap_or_default(),
            }]
        }),
        Notification::BatchStarted { job } => json!({
            "attachments": [{
                "color": "#36a64f",
                "title": format!("{} started", job),
            }]
        }),
        Notification::BatchFinished {
            job,
            updated,
            elapsed_secs,
        } => json!({
            "attachments": [{
                "color": "#36a64f",
                "title": format!("{} finished", job),
                "pretext": format!("took {:.2}s", elapsed_secs),
                "fields": [
                    {"title": "users updated", "value": format!("{}", updated), "short": true},
                ],
            }]
        }),
        Notification::RateLimitAborted { job, updated } => json!({
            "attachments": [{
                "color": "#ff0000",
                "title": format!("{} aborted: rate budget exhausted", job),
                "pretext": format!("only {} users were updated", updated),
            }]
        }),
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: Notification) {
        let payload = attachment_payload(&notification);

        let post = || async {
            self.http
                .post(&self.webhook_url)
                .json(&payload)
                .send()
                .await?
                .error_for_status()?;
            Ok::<(), reqwest::Error>(())
        };

        let result = post
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(2)
                    .with_jitter(),
            )
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, "notification webhook failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_joined_payload_carries_identity_fields() {
        let payload = attachment_payload(&Notification::UserJoined {
            username: "alice".to_string(),
            bio: Some("systems person".to_string()),
            company: None,
            avatar_url: None,
        });

        let fields = &payload["attachments"][0]["fields"];
        assert_eq!(fields[0]["value"], "alice");
        assert_eq!(fields[1]["value"], "systems person");
        assert_eq!(fields[2]["value"], "");
    }

    #[test]
    fn test_rate_limit_abort_payload_is_red() {
        let payload = attachment_payload(&Notification::RateLimitAborted {
            job: "drain-queue".to_string(),
            updated: 3,
        });
        assert_eq!(payload["attachments"][0]["color"], "#ff0000");
        assert!(payload["attachments"][0]["pretext"]
            .as_str()
            .unwrap()
            .contains("3 users"));
    }

    #[tokio::test]
    async fn test_webhook_send_swallows_failures() {
        // Unroutable address: send must return without erroring.
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/unreachable");
        notifier
            .send(Notification::BatchStarted {
                job: "refresh".to_string(),
            })
            .await;
    }
}
