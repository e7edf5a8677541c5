//! Scripted fakes for the fetch and sleep seams.

use crate::api::{FetchOutcome, Media, MediaTitle, Page, PageFetcher};
use crate::partition::Partition;
use crate::throttle::Sleeper;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

/// Replays outcomes in order and records every request
pub struct ScriptedFetcher {
    script: VecDeque<FetchOutcome>,
    pub requests: Vec<(Partition, u32)>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<FetchOutcome>) -> Self {
        Self {
            script: script.into(),
            requests: Vec::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.len()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&mut self, partition: Partition, page: u32, _per_page: u32) -> FetchOutcome {
        self.requests.push((partition, page));
        self.script
            .pop_front()
            .unwrap_or_else(|| FetchOutcome::transient("script exhausted"))
    }

    fn endpoint(&self) -> &str {
        "scripted://anilist"
    }
}

/// Records requested delays without waiting
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub delays: Vec<Duration>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}

pub fn media(id: u64, status: &str) -> Media {
    Media {
        id,
        title: Some(MediaTitle {
            romaji: Some(format!("Title {}", id)),
            ..Default::default()
        }),
        status: Some(status.to_string()),
        ..Default::default()
    }
}

pub fn page_of(ids: &[u64], has_next_page: bool) -> Page {
    Page {
        records: ids.iter().map(|&id| media(id, "FINISHED")).collect(),
        has_next_page,
    }
}
