//! Raw upstream media to canonical snapshot records.
//!
//! Absence policy: upstream nulls, missing keys and blank strings all become
//! `None` and are written as JSON `null`. Lists are never null.

use crate::api::{FuzzyDate, Media};
use chrono::NaiveDate;
use shared::{
    AiringBlock, CanonicalRecord, ExternalLink, Field, ImageBlock, MetaBlock, NextAiring,
    TitleBlock,
};

/// Which record shape a deployment emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Rich records for the current-season listing
    Season,
    /// Lean records for the multi-year catalog
    Database,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Season => "season",
            Profile::Database => "database",
        }
    }
}

/// `YYYY-MM-DD` when all three parts are present and form a real date
pub fn iso_date(date: Option<&FuzzyDate>) -> Option<String> {
    let date = date?;
    let parsed = NaiveDate::from_ymd_opt(date.year?, date.month?, date.day?)?;
    Some(parsed.format("%Y-%m-%d").to_string())
}

fn genres(media: &Media) -> Vec<String> {
    media
        .genres
        .iter()
        .flatten()
        .flatten()
        .cloned()
        .collect()
}

fn studios(media: &Media) -> Vec<String> {
    media
        .studios
        .as_ref()
        .and_then(|s| s.nodes.as_ref())
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|studio| studio.name.clone())
        .collect()
}

fn links(media: &Media) -> Vec<ExternalLink> {
    media
        .external_links
        .iter()
        .flatten()
        .filter_map(|l| {
            Some(ExternalLink {
                site: l.site.clone()?,
                url: l.url.clone()?,
                link_type: l.link_type.clone(),
                language: l.language.clone(),
            })
        })
        .collect()
}

/// Project one raw record under the given profile
pub fn project(profile: Profile, media: &Media) -> CanonicalRecord {
    let title = media.title.clone().unwrap_or_default();
    let cover = media.cover_image.clone().unwrap_or_default();

    let record = match profile {
        Profile::Database => CanonicalRecord {
            id: media.id.to_string(),
            title: TitleBlock {
                romaji: title.romaji,
                english: title.english,
                native: title.native,
            },
            image: ImageBlock {
                cover_large: cover
                    .extra_large
                    .filter(|s| !s.trim().is_empty())
                    .or(cover.large),
                cover_medium: Field::Unrequested,
                banner: media.banner_image.clone(),
            },
            meta: MetaBlock {
                format: media.format.clone(),
                status: media.status.clone(),
                genres: genres(media),
                site_url: media.site_url.clone(),
                ..Default::default()
            },
            airing: AiringBlock {
                start_date: iso_date(media.start_date.as_ref()),
                ..Default::default()
            },
            description: Field::Unrequested,
            links: Field::Unrequested,
        },
        Profile::Season => CanonicalRecord {
            id: media.id.to_string(),
            title: TitleBlock {
                romaji: title.romaji,
                english: title.english,
                native: title.native,
            },
            image: ImageBlock {
                cover_large: cover.large,
                cover_medium: Field::from_option(cover.medium),
                banner: media.banner_image.clone(),
            },
            meta: MetaBlock {
                format: media.format.clone(),
                status: media.status.clone(),
                genres: genres(media),
                episodes: Field::from_option(media.episodes),
                duration_min: Field::from_option(media.duration),
                studios: Field::Present(studios(media)),
                site_url: media.site_url.clone(),
            },
            airing: AiringBlock {
                start_date: iso_date(media.start_date.as_ref()),
                end_date: Field::from_option(iso_date(media.end_date.as_ref())),
                next_airing_episode: Field::from_option(media.next_airing_episode.map(|n| {
                    NextAiring {
                        airing_at_epoch_sec: n.airing_at,
                        episode: n.episode,
                        time_until_airing_sec: n.time_until_airing,
                    }
                })),
            },
            description: Field::from_option(media.description.clone()),
            links: Field::Present(links(media)),
        },
    };

    record.normalized()
}
