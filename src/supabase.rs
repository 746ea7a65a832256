//! Shared plumbing for the Supabase REST surfaces (Storage and PostgREST).

use std::fmt;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

/// Project endpoint plus the API key used for both `apikey` and bearer auth.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub key: String,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SupabaseConfig {
    /// Append percent-encoded `segments` to the project URL, keeping any base path.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// A non-success response reduced to its status and a human-readable message.
#[derive(Debug)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

/// Pass successful responses through; turn anything else into a [`Rejection`].
///
/// The message prefers the body's `message` field, then `error`, then the raw
/// body text, then the status line.
pub async fn check_response(response: Response) -> Result<Response, Rejection> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(Rejection {
        status,
        message: rejection_message(status, &text),
    })
}

fn rejection_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        if let Some(message) = body.message.or(body.error).filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_string()
    }
}
