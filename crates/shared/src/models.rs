//! Snapshot data model.
//!
//! These are the stable-shaped records and the envelope written to the static
//! JSON documents consumed by the app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Anime season as understood by AniList
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// All seasons in calendar order
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WINTER" => Ok(Season::Winter),
            "SPRING" => Ok(Season::Spring),
            "SUMMER" => Ok(Season::Summer),
            "FALL" => Ok(Season::Fall),
            _ => Err(anyhow::anyhow!("Invalid season: {}", s)),
        }
    }
}

/// Optional field that a projection profile may not populate at all.
///
/// `Unrequested` is skipped on output, `Absent` is written as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Unrequested,
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unrequested
    }
}

impl<T> Field<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }

    pub fn is_unrequested(&self) -> bool {
        matches!(self, Field::Unrequested)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Re-run a cleaning function over a present value; `None` demotes it to `Absent`
    pub fn refine(self, clean: impl FnOnce(T) -> Option<T>) -> Self {
        match self {
            Field::Present(v) => Field::from_option(clean(v)),
            other => other,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Present(v) => v.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Field::from_option(Option::<T>::deserialize(deserializer)?))
    }
}

/// Normalized catalog entry written to a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Upstream id rendered as a string, stable across runs
    pub id: String,
    pub title: TitleBlock,
    pub image: ImageBlock,
    pub meta: MetaBlock,
    pub airing: AiringBlock,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub links: Field<Vec<ExternalLink>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleBlock {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    pub cover_large: Option<String>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub cover_medium: Field<String>,
    pub banner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaBlock {
    pub format: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub episodes: Field<u32>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub duration_min: Field<u32>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub studios: Field<Vec<String>>,
    pub site_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiringBlock {
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub end_date: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unrequested")]
    pub next_airing_episode: Field<NextAiring>,
}

/// Countdown to the next episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAiring {
    pub airing_at_epoch_sec: i64,
    pub episode: u32,
    pub time_until_airing_sec: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub site: String,
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub language: Option<String>,
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn collapse_whitespace(value: String) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| clean_text(Some(v)))
        .collect()
}

impl CanonicalRecord {
    /// Apply the field normalization rules.
    ///
    /// Strings are trimmed and blank ones become absent, lists drop blank
    /// entries, descriptions have whitespace runs collapsed, and links
    /// without both a site and a url are dropped. Running it twice is a no-op.
    pub fn normalized(self) -> Self {
        Self {
            id: self.id.trim().to_string(),
            title: TitleBlock {
                romaji: clean_text(self.title.romaji),
                english: clean_text(self.title.english),
                native: clean_text(self.title.native),
            },
            image: ImageBlock {
                cover_large: clean_text(self.image.cover_large),
                cover_medium: self.image.cover_medium.refine(|s| clean_text(Some(s))),
                banner: clean_text(self.image.banner),
            },
            meta: MetaBlock {
                format: clean_text(self.meta.format),
                status: clean_text(self.meta.status),
                genres: clean_list(self.meta.genres),
                episodes: self.meta.episodes,
                duration_min: self.meta.duration_min,
                studios: self.meta.studios.refine(|v| Some(clean_list(v))),
                site_url: clean_text(self.meta.site_url),
            },
            airing: AiringBlock {
                start_date: clean_text(self.airing.start_date),
                end_date: self.airing.end_date.refine(|s| clean_text(Some(s))),
                next_airing_episode: self.airing.next_airing_episode,
            },
            description: self.description.refine(collapse_whitespace),
            links: self.links.refine(|links| {
                Some(
                    links
                        .into_iter()
                        .filter_map(|l| {
                            let site = clean_text(Some(l.site))?;
                            let url = clean_text(Some(l.url))?;
                            Some(ExternalLink {
                                site,
                                url,
                                link_type: clean_text(l.link_type),
                                language: clean_text(l.language),
                            })
                        })
                        .collect(),
                )
            }),
        }
    }
}

/// Inclusive year range synchronized by a full-database run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRange {
    pub start_year: i32,
    pub end_year: i32,
}

/// Provenance metadata for a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSource {
    pub name: String,
    pub provider: String,
    pub endpoint: String,
    pub sort: String,
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<YearRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The complete document written by one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub source: SnapshotSource,
    pub items: Vec<CanonicalRecord>,
}
