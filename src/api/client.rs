use crate::error::AppError;
use governor::{clock::DefaultClock, state::{InMemoryState, NotKeyed}, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints;
use super::models::*;

const USER_AGENT: &str = "aram_dashboard/0.1.0";
const MAX_RETRIES: u32 = 3;

/// Blocking client for the Data Dragon static catalog.
pub struct DataDragonClient {
    base_url: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl DataDragonClient {
    pub fn new(base_url: &str) -> Self {
        // Static CDN, but stay polite: 10 requests per second
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN));
        DataDragonClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(quota),
        }
    }

    fn execute_request(&self, url: &str) -> Result<String, AppError> {
        while self.rate_limiter.check().is_err() {
            thread::sleep(Duration::from_millis(50));
        }

        let mut retry_count = 0;

        loop {
            log::debug!("GET {}", url);
            let response = ureq::get(url).set("User-Agent", USER_AGENT).call();

            match response {
                Ok(resp) => {
                    return resp.into_string().map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(code, _)) if code == 429 || code >= 500 => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::HttpError(format!("{} returned {}", url, code)));
                    }
                    let wait_ms = 1000 * (retry_count + 1) as u64;
                    log::warn!("{} returned {}, retrying in {}ms", url, code, wait_ms);
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let body = self.execute_request(url)?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(format!("{}: {}", url, e)))
    }

    pub fn get_versions(&self) -> Result<Vec<String>, AppError> {
        self.get_json(&endpoints::versions_url(&self.base_url))
    }

    pub fn get_latest_version(&self) -> Result<String, AppError> {
        self.get_versions()?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::JsonError("Data Dragon returned no versions".to_string()))
    }

    pub fn get_champions(&self, version: &str) -> Result<ChampionListDto, AppError> {
        self.get_json(&endpoints::champions_url(&self.base_url, version))
    }

    pub fn get_items(&self, version: &str) -> Result<ItemListDto, AppError> {
        self.get_json(&endpoints::items_url(&self.base_url, version))
    }

    pub fn get_summoner_spells(&self, version: &str) -> Result<SummonerSpellListDto, AppError> {
        self.get_json(&endpoints::summoner_spells_url(&self.base_url, version))
    }

    pub fn get_runes(&self, version: &str) -> Result<Vec<RuneTreeDto>, AppError> {
        self.get_json(&endpoints::runes_url(&self.base_url, version))
    }
}
