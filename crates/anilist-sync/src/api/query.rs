//! GraphQL documents for the two projection profiles.

use crate::projection::Profile;

/// Rich query used for the current-season listing
pub const SEASON_QUERY: &str = r#"
query ($page: Int, $perPage: Int, $season: MediaSeason, $seasonYear: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { currentPage hasNextPage total perPage }
    media(type: ANIME, season: $season, seasonYear: $seasonYear, sort: POPULARITY_DESC, isAdult: false) {
      id
      title { romaji english native }
      format
      status
      episodes
      duration
      startDate { year month day }
      endDate { year month day }
      coverImage { large medium }
      bannerImage
      genres
      description(asHtml: false)
      siteUrl
      studios(isMain: true) { nodes { name } }
      nextAiringEpisode { airingAt timeUntilAiring episode }
      externalLinks { site url type language }
    }
  }
}
"#;

/// Lean query used for the multi-year catalog
pub const DATABASE_QUERY: &str = r#"
query ($page: Int, $perPage: Int, $season: MediaSeason, $seasonYear: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { hasNextPage }
    media(type: ANIME, season: $season, seasonYear: $seasonYear, sort: POPULARITY_DESC) {
      id
      title { native romaji english }
      format
      status
      siteUrl
      genres
      startDate { year month day }
      coverImage { extraLarge large }
      bannerImage
    }
  }
}
"#;

/// Sort order both queries request, recorded in snapshot provenance
pub const SORT: &str = "POPULARITY_DESC";

pub fn for_profile(profile: Profile) -> &'static str {
    match profile {
        Profile::Season => SEASON_QUERY,
        Profile::Database => DATABASE_QUERY,
    }
}
