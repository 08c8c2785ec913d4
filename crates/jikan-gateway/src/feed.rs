//! Page-level compositions over the gateway.
//!
//! These helpers never fail: a section that cannot be fetched is logged and
//! left empty, and a lookup that cannot be served is reported as absent.

use crate::api::{AnimeData, DataResponse, GatewayError, JikanGateway, PaginatedResponse};
use serde::Serialize;
use tracing::{info, warn};

/// Sections of the home feed; a failed section is left empty
#[derive(Debug, Serialize)]
pub struct HomeFeed {
    pub hero: Vec<AnimeData>,
    pub trending: Vec<AnimeData>,
    pub upcoming: Vec<AnimeData>,
}

/// Fetch the three home sections through the shared gateway.
///
/// The calls overlap; the gateway spaces their dispatches.
pub async fn home_feed(gateway: &JikanGateway) -> HomeFeed {
    let (hero, trending, upcoming) = tokio::join!(
        gateway.top_anime(1, 5),
        gateway.top_anime(1, 20),
        gateway.upcoming_anime(1),
    );

    HomeFeed {
        hero: section_or_empty("hero", hero),
        trending: section_or_empty("trending", trending),
        upcoming: section_or_empty("upcoming", upcoming),
    }
}

fn section_or_empty(
    section: &str,
    result: Result<PaginatedResponse<AnimeData>, GatewayError>,
) -> Vec<AnimeData> {
    match result {
        Ok(response) => response.data,
        Err(e) => {
            warn!(section = section, error = %e, "Section unavailable");
            Vec::new()
        }
    }
}

/// Look up a detail page from an unparsed identifier.
///
/// Returns `None` for malformed ids (no request is made), upstream 404s and
/// any other failure.
pub async fn anime_detail(gateway: &JikanGateway, raw_id: &str) -> Option<DataResponse<AnimeData>> {
    match gateway.lookup_anime(raw_id).await {
        Ok(response) => Some(response),
        Err(e) if e.is_not_found() => {
            info!(id = raw_id, error = %e, "Anime not found");
            None
        }
        Err(e) => {
            warn!(id = raw_id, error = %e, "Anime lookup failed");
            None
        }
    }
}
