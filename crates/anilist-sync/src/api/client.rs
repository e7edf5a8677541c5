//! reqwest-backed AniList client.

use super::outcome::{classify_response, FetchOutcome};
use super::query;
use super::types::{GraphQlRequest, PageVariables};
use super::PageFetcher;
use crate::partition::Partition;
use crate::projection::Profile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// AniList GraphQL client for one projection profile
pub struct AniListClient {
    /// HTTP client with timeout and user agent applied
    client: Client,
    /// GraphQL endpoint every page request is posted to
    endpoint: String,
    /// Query document selected by the projection profile
    query: &'static str,
}

impl AniListClient {
    pub fn new(
        endpoint: String,
        user_agent: &str,
        timeout: Duration,
        profile: Profile,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            query: query::for_profile(profile),
        })
    }

    pub fn from_config(config: &shared::config::UpstreamConfig, profile: Profile) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            &config.user_agent,
            Duration::from_secs(config.timeout_seconds),
            profile,
        )
    }
}

#[async_trait]
impl PageFetcher for AniListClient {
    async fn fetch_page(&mut self, partition: Partition, page: u32, per_page: u32) -> FetchOutcome {
        let body = GraphQlRequest {
            query: self.query,
            variables: PageVariables {
                page,
                per_page,
                season: partition.season,
                season_year: partition.year,
            },
        };

        debug!(partition = %partition, page = page, "Requesting page");

        let response = match self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchOutcome::transient(format!("Request error: {}", e)),
        };

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return FetchOutcome::transient(format!("Failed to read response body: {}", e)),
        };

        classify_response(status, retry_after.as_deref(), &text)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
