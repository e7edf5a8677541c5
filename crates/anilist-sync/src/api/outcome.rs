//! Classification of a single page request.
//!
//! Nothing here is fatal: every failure is either rate limiting or a
//! transient error, and the retry scheduler decides when to give up.

use super::types::{GraphQlResponse, Media};
use std::time::Duration;

/// One page of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Media>,
    pub has_next_page: bool,
}

/// Result of one page request
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Page(Page),
    /// Upstream quota exhausted; carries the server's retry hint if it sent one
    RateLimited { retry_after: Option<Duration> },
    /// Any other failure: bad status, GraphQL errors, undecodable body, transport
    Transient { message: String },
}

impl FetchOutcome {
    pub fn transient(message: impl Into<String>) -> Self {
        FetchOutcome::Transient {
            message: message.into(),
        }
    }

    /// Short description for logs and fatal error messages
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Page(page) => format!("page with {} records", page.records.len()),
            FetchOutcome::RateLimited {
                retry_after: Some(hint),
            } => format!("rate limited (retry after {}s)", hint.as_secs()),
            FetchOutcome::RateLimited { retry_after: None } => "rate limited".to_string(),
            FetchOutcome::Transient { message } => message.clone(),
        }
    }
}

fn is_too_many_requests(message: &str) -> bool {
    message.to_ascii_lowercase().contains("too many requests")
}

/// Parse a `Retry-After` header given in whole seconds
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Classify an HTTP response from the GraphQL endpoint
pub fn classify_response(status: u16, retry_after: Option<&str>, body: &str) -> FetchOutcome {
    // 429 responses sometimes carry a JSON body, sometimes not
    let parsed: Option<GraphQlResponse> = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str(body).ok()
    };

    let error_messages: Vec<String> = parsed
        .as_ref()
        .and_then(|r| r.errors.as_ref())
        .map(|errs| {
            errs.iter()
                .map(|e| e.message.clone().unwrap_or_else(|| "unknown error".to_string()))
                .collect()
        })
        .unwrap_or_default();

    if status == 429 || error_messages.iter().any(|m| is_too_many_requests(m)) {
        return FetchOutcome::RateLimited {
            retry_after: parse_retry_after(retry_after),
        };
    }

    if !(200..300).contains(&status) {
        let detail = error_messages
            .first()
            .cloned()
            .unwrap_or_else(|| truncate(body, 200));
        return FetchOutcome::transient(format!("AniList HTTP {}: {}", status, detail));
    }

    let response = match parsed {
        Some(r) => r,
        None => {
            return FetchOutcome::transient(format!(
                "Undecodable response body: {}",
                truncate(body, 200)
            ))
        }
    };

    if let Some(message) = error_messages.first() {
        return FetchOutcome::transient(format!("AniList GraphQL error: {}", message));
    }

    match response.data.and_then(|d| d.page) {
        Some(page) => FetchOutcome::Page(Page {
            records: page.media.unwrap_or_default(),
            has_next_page: page
                .page_info
                .and_then(|info| info.has_next_page)
                .unwrap_or(false),
        }),
        None => FetchOutcome::transient("Response is missing data.Page"),
    }
}
