//! Auxiliary data fetching: the attribution document and the per-tile
//! schedule JSON. A non-success status or an unparseable body means "render
//! nothing for that overlay"; nothing is retried — the next interaction
//! refetches naturally.

use seed::browser::fetch::{fetch, FetchError};
use serde::de::DeserializeOwned;

use map_model::attribution::Attribution;
use map_model::schedule::{ScheduleTile, TileCoord, SCHEDULE_TILES_BASE_URL};

/// Served next to the site by the webserver; built by the attribution
/// binary from the operator extract.
const ATTRIBUTION_URL: &str = "/data/attribution.json";

pub enum Msg {
    AttributionFetched(Result<Vec<Attribution>, FetchError>),
    TileFetched {
        /// Fetch round this response belongs to; stale rounds are dropped.
        generation: u64,
        coord: TileCoord,
        result: Result<ScheduleTile, FetchError>,
    },
}

pub async fn fetch_attribution() -> Msg {
    Msg::AttributionFetched(fetch_json(ATTRIBUTION_URL.to_string()).await)
}

pub async fn fetch_schedule_tile(generation: u64, coord: TileCoord) -> Msg {
    let result = fetch_json(coord.url(SCHEDULE_TILES_BASE_URL)).await;
    Msg::TileFetched {
        generation,
        coord,
        result,
    }
}

async fn fetch_json<T: DeserializeOwned>(url: String) -> Result<T, FetchError> {
    let response = fetch(url).await?;
    let response = response.check_status()?;
    response.json().await
}
