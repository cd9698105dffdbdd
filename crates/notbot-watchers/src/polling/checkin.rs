//! Check-in API source: `{ Users: [{Login, ...}], Esps, Kektops, Vms, Unknown }`.

use async_trait::async_trait;
use serde::Deserialize;

use super::{normalize_names, SnapshotSource};
use crate::errors::WatchError;
use crate::fetch::HttpFetcher;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckinUser {
    #[serde(rename = "Login", alias = "login")]
    pub login: String,
    #[serde(rename = "Timestamp", alias = "timestamp", default)]
    pub timestamp: f64,
    #[serde(default)]
    pub pretty_time: Option<String>,
}

/// Device counters are decoded but unused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckinResponse {
    #[serde(rename = "Users", alias = "users", default)]
    pub users: Vec<CheckinUser>,
    #[serde(rename = "Esps", alias = "esps", default)]
    pub esps: u32,
    #[serde(rename = "Kektops", alias = "kektops", default)]
    pub kektops: u32,
    #[serde(rename = "Vms", alias = "vms", default)]
    pub vms: u32,
    #[serde(rename = "Unknown", alias = "unknown", default)]
    pub unknown: u32,
}

impl CheckinResponse {
    pub fn logins(&self) -> Vec<String> {
        normalize_names(self.users.iter().map(|u| u.login.clone()))
    }
}

pub struct CheckinSource {
    fetcher: HttpFetcher,
    url: String,
}

impl CheckinSource {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SnapshotSource for CheckinSource {
    fn describe(&self) -> String {
        format!("checkin {}", self.url)
    }

    async fn snapshot(&self) -> Result<Vec<String>, WatchError> {
        let response: CheckinResponse = self.fetcher.fetch_json(&self.url).await?;
        Ok(response.logins())
    }
}
