//! Best-effort "new job" webhook.
//!
//! One POST per job, no retry. Callers record the error and move on; a failed
//! notification never changes the outcome of job creation.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::model::JobId;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded with {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No endpoint configured.
    Disabled,
    Delivered(StatusCode),
}

#[derive(Serialize)]
struct JobCreatedPayload<'a> {
    id: &'a JobId,
}

#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: Option<Url>,
}

impl WebhookNotifier {
    pub fn new(client: Client, endpoint: Option<Url>) -> Self {
        Self { client, endpoint }
    }

    /// Build a notifier with its own client bounded by `timeout`.
    pub fn with_timeout(endpoint: Option<Url>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, endpoint))
    }

    pub fn disabled() -> Self {
        Self::new(Client::new(), None)
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub async fn notify(&self, id: &JobId) -> Result<Delivery, NotificationError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(Delivery::Disabled);
        };
        let response = self
            .client
            .post(endpoint.clone())
            .json(&JobCreatedPayload { id })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status(status));
        }
        Ok(Delivery::Delivered(status))
    }
}
