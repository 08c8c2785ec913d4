//! Jikan API endpoints known to the gateway.

use super::error::{GatewayError, Result};
use std::fmt;

/// Default page size used by the top listing
pub const DEFAULT_LIMIT: u32 = 25;

/// Largest page size Jikan accepts
pub const MAX_LIMIT: u32 = 25;

/// Shortest search text worth sending upstream
pub const MIN_SEARCH_QUERY_LEN: usize = 3;

/// A logical endpoint plus its query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Top-ranked anime
    TopAnime { page: u32, limit: u32 },
    /// Upcoming season listing
    UpcomingSeason { page: u32 },
    /// Free-text search (safe-for-work results only)
    Search { query: String, page: u32 },
    /// Full details of a single anime
    AnimeFull { id: u32 },
    /// Currently airing season listing
    CurrentSeason { page: u32 },
}

fn check_page(page: u32) -> Result<u32> {
    if page == 0 {
        return Err(GatewayError::InvalidPage);
    }
    Ok(page)
}

impl Endpoint {
    pub fn top_anime(page: u32, limit: u32) -> Result<Self> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(GatewayError::InvalidLimit {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self::TopAnime {
            page: check_page(page)?,
            limit,
        })
    }

    pub fn upcoming_season(page: u32) -> Result<Self> {
        Ok(Self::UpcomingSeason {
            page: check_page(page)?,
        })
    }

    /// Surrounding whitespace is dropped before the length check.
    pub fn search(query: &str, page: u32) -> Result<Self> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Err(GatewayError::InvalidQuery {
                query: query.to_string(),
                min_len: MIN_SEARCH_QUERY_LEN,
            });
        }
        Ok(Self::Search {
            query: query.to_string(),
            page: check_page(page)?,
        })
    }

    pub fn anime_full(id: u32) -> Result<Self> {
        if id == 0 {
            return Err(GatewayError::InvalidId {
                input: id.to_string(),
            });
        }
        Ok(Self::AnimeFull { id })
    }

    /// Parse a raw identifier (e.g. from a route segment) into a detail lookup.
    pub fn anime_full_from_str(raw: &str) -> Result<Self> {
        let id = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| GatewayError::InvalidId {
                input: raw.to_string(),
            })?;
        Self::anime_full(id).map_err(|_| GatewayError::InvalidId {
            input: raw.to_string(),
        })
    }

    pub fn current_season(page: u32) -> Result<Self> {
        Ok(Self::CurrentSeason {
            page: check_page(page)?,
        })
    }

    /// Path relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            Self::TopAnime { .. } => "/top/anime".to_string(),
            Self::UpcomingSeason { .. } => "/seasons/upcoming".to_string(),
            Self::Search { .. } => "/anime".to_string(),
            Self::AnimeFull { id } => format!("/anime/{}/full", id),
            Self::CurrentSeason { .. } => "/seasons/now".to_string(),
        }
    }

    /// Query parameters, unencoded
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::TopAnime { page, limit } => {
                vec![("page", page.to_string()), ("limit", limit.to_string())]
            }
            Self::UpcomingSeason { page } | Self::CurrentSeason { page } => {
                vec![("page", page.to_string())]
            }
            Self::Search { query, page } => vec![
                ("q", query.clone()),
                ("page", page.to_string()),
                ("sfw", "true".to_string()),
            ],
            Self::AnimeFull { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())?;
        let query = self.query();
        for (idx, (key, value)) in query.iter().enumerate() {
            let sep = if idx == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_anime_path_and_query() {
        let endpoint = Endpoint::top_anime(2, 20).unwrap();
        assert_eq!(endpoint.path(), "/top/anime");
        assert_eq!(
            endpoint.query(),
            vec![("page", "2".to_string()), ("limit", "20".to_string())]
        );
        assert_eq!(endpoint.to_string(), "/top/anime?page=2&limit=20");
    }

    #[test]
    fn test_seasons() {
        assert_eq!(
            Endpoint::upcoming_season(1).unwrap().to_string(),
            "/seasons/upcoming?page=1"
        );
        assert_eq!(
            Endpoint::current_season(3).unwrap().to_string(),
            "/seasons/now?page=3"
        );
    }

    #[test]
    fn test_search_is_trimmed_and_sfw() {
        let endpoint = Endpoint::search("  frieren ", 1).unwrap();
        assert_eq!(
            endpoint,
            Endpoint::Search {
                query: "frieren".to_string(),
                page: 1
            }
        );
        assert!(endpoint.query().contains(&("sfw", "true".to_string())));
    }

    #[test]
    fn test_short_search_rejected() {
        let err = Endpoint::search(" ab ", 1).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidQuery { min_len: 3, .. }));
        assert!(Endpoint::search("", 1).is_err());
    }

    #[test]
    fn test_anime_full_from_str() {
        assert_eq!(
            Endpoint::anime_full_from_str("52991").unwrap().path(),
            "/anime/52991/full"
        );
        assert_eq!(
            Endpoint::anime_full_from_str(" 5114 ").unwrap(),
            Endpoint::AnimeFull { id: 5114 }
        );

        for raw in ["abc", "12abc", "-1", "0", "", "1.5"] {
            let err = Endpoint::anime_full_from_str(raw).unwrap_err();
            assert!(err.is_not_found(), "{raw:?} should be rejected");
            assert!(matches!(err, GatewayError::InvalidId { ref input } if input == raw));
        }
    }

    #[test]
    fn test_page_and_limit_bounds() {
        assert!(matches!(
            Endpoint::top_anime(0, 5),
            Err(GatewayError::InvalidPage)
        ));
        assert!(matches!(
            Endpoint::top_anime(1, 0),
            Err(GatewayError::InvalidLimit { limit: 0, max: 25 })
        ));
        assert!(Endpoint::top_anime(1, 26).is_err());
        assert!(Endpoint::top_anime(1, DEFAULT_LIMIT).is_ok());
        assert!(Endpoint::search("naruto", 0).is_err());
    }
}
