//! AniList GraphQL wire types.
//!
//! Upstream media objects are loosely shaped: nearly every field may be null
//! or missing, so everything except the id is optional here and absence is
//! resolved later by the projection.

use serde::{Deserialize, Serialize};
use shared::Season;

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: PageVariables,
}

/// Variables sent with every page query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVariables {
    pub page: u32,
    pub per_page: u32,
    pub season: Season,
    pub season_year: i32,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<PageData>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: Option<MediaPage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    pub page_info: Option<PageInfo>,
    pub media: Option<Vec<Media>>,
}

/// Pagination metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: Option<bool>,
    pub current_page: Option<u32>,
    pub total: Option<u32>,
    pub per_page: Option<u32>,
}

/// Error entry from a GraphQL response
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: Option<String>,
    pub status: Option<u16>,
}

/// One raw catalog entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: u64,
    pub title: Option<MediaTitle>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<u32>,
    pub duration: Option<u32>,
    pub start_date: Option<FuzzyDate>,
    pub end_date: Option<FuzzyDate>,
    pub cover_image: Option<CoverImage>,
    pub banner_image: Option<String>,
    pub genres: Option<Vec<Option<String>>>,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub studios: Option<StudioConnection>,
    pub next_airing_episode: Option<AiringSchedule>,
    pub external_links: Option<Vec<MediaExternalLink>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

/// Date whose parts may each be unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StudioConnection {
    pub nodes: Option<Vec<Option<Studio>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Studio {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiringSchedule {
    pub airing_at: i64,
    pub time_until_airing: i64,
    pub episode: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaExternalLink {
    pub site: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_wire_names() {
        let vars = PageVariables {
            page: 2,
            per_page: 50,
            season: Season::Spring,
            season_year: 2024,
        };
        let value = serde_json::to_value(vars).unwrap();
        assert_eq!(
            value,
            json!({ "page": 2, "perPage": 50, "season": "SPRING", "seasonYear": 2024 })
        );
    }

    #[test]
    fn test_media_with_nulls() {
        let media: Media = serde_json::from_value(json!({
            "id": 154587,
            "title": { "romaji": "Sousou no Frieren", "english": null },
            "format": "TV",
            "status": null,
            "startDate": { "year": 2023, "month": 9, "day": null },
            "coverImage": null,
            "genres": ["Adventure", null],
            "studios": { "nodes": [{ "name": "Madhouse" }, null] },
            "nextAiringEpisode": null
        }))
        .unwrap();

        assert_eq!(media.id, 154587);
        assert_eq!(media.title.unwrap().native, None);
        assert_eq!(media.status, None);
        assert_eq!(media.start_date.unwrap().day, None);
        assert_eq!(media.genres.unwrap().len(), 2);
        assert!(media.external_links.is_none());
    }
}
