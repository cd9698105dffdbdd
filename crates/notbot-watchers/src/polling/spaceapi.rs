//! spaceAPI source. Only `sensors.people_now_present[].names[]` matters here;
//! everything else in the document is tolerated and ignored.

use async_trait::async_trait;
use serde::Deserialize;

use super::{normalize_names, SnapshotSource};
use crate::errors::WatchError;
use crate::fetch::HttpFetcher;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpaceApiResponse {
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default)]
    pub sensors: Sensors,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sensors {
    #[serde(default)]
    pub people_now_present: Vec<PeopleNowPresent>,
}

/// One sensor reading; a space may report several (one per room).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeopleNowPresent {
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
}

impl SpaceApiResponse {
    /// Names across every sensor, in document order.
    pub fn present_names(&self) -> Vec<String> {
        normalize_names(
            self.sensors
                .people_now_present
                .iter()
                .flat_map(|sensor| sensor.names.iter().cloned()),
        )
    }
}

/// Fetch a spaceAPI document and return who is present.
pub async fn fetch_present_names(fetcher: &HttpFetcher, url: &str) -> Result<Vec<String>, WatchError> {
    let response: SpaceApiResponse = fetcher.fetch_json(url).await?;
    Ok(response.present_names())
}

pub struct SpaceApiSource {
    fetcher: HttpFetcher,
    url: String,
}

impl SpaceApiSource {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SnapshotSource for SpaceApiSource {
    fn describe(&self) -> String {
        format!("spaceapi {}", self.url)
    }

    async fn snapshot(&self) -> Result<Vec<String>, WatchError> {
        fetch_present_names(&self.fetcher, &self.url).await
    }
}
