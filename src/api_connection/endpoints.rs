use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_BASE_URL: &str = "https://api.dineoncampus.com/v1";
pub const DEFAULT_LOCATION_ID: &str = "66c79443351d5300dddee979";

/// Platform discriminator the upstream API expects on every menu request.
/// Different values occasionally return differently populated payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform(pub u8);

impl Platform {
    pub const PRIMARY: Platform = Platform(2);
    pub const FALLBACK: Platform = Platform(0);
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request templates for one dining location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DineEndpoints {
    pub base_url: String,
    pub location_id: String,
}

impl DineEndpoints {
    pub fn new(base_url: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            location_id: location_id.into(),
        }
    }

    fn location_url(&self) -> String {
        format!("{}/location/{}", self.base_url, self.location_id)
    }

    /// Meal periods served on a date.
    pub fn periods_url(&self) -> String {
        format!("{}/periods", self.location_url())
    }

    /// Categories and items of a single meal period.
    pub fn period_detail_url(&self, period_id: &str) -> String {
        format!("{}/periods/{}", self.location_url(), period_id)
    }

    pub fn menu_query(platform: Platform, date: &str) -> Vec<(&'static str, String)> {
        vec![("platform", platform.to_string()), ("date", date.to_string())]
    }
}

impl Default for DineEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_LOCATION_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_follow_location_layout() {
        let endpoints = DineEndpoints::new("http://localhost:9999/v1/", "loc-1");
        assert_eq!(endpoints.periods_url(), "http://localhost:9999/v1/location/loc-1/periods");
        assert_eq!(
            endpoints.period_detail_url("abc"),
            "http://localhost:9999/v1/location/loc-1/periods/abc"
        );
    }

    #[test]
    fn test_menu_query_carries_platform_and_date() {
        let query = DineEndpoints::menu_query(Platform::PRIMARY, "2025-09-01");
        assert_eq!(
            query,
            vec![("platform", "2".to_string()), ("date", "2025-09-01".to_string())]
        );
        assert_eq!(Platform::FALLBACK.to_string(), "0");
    }
}
