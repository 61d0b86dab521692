use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use crate::api_connection::connection::{DineClient, DEFAULT_USER_AGENT};
use crate::api_connection::endpoints::{
    DineEndpoints, Platform, DEFAULT_API_BASE_URL, DEFAULT_LOCATION_ID,
};
use crate::insights::top_protein::RankingThresholds;
use crate::menu_fetcher::MenuFetcher;

pub const API_BASE_URL_ENV_VAR: &str = "DINE_API_BASE_URL";
pub const LOCATION_ID_ENV_VAR: &str = "DINE_LOCATION_ID";
pub const PRIMARY_PLATFORM_ENV_VAR: &str = "DINE_PRIMARY_PLATFORM";
pub const FALLBACK_PLATFORM_ENV_VAR: &str = "DINE_FALLBACK_PLATFORM";
pub const USER_AGENT_ENV_VAR: &str = "DINE_USER_AGENT";
pub const BIND_ADDR_ENV_VAR: &str = "MENU_BIND_ADDR";
pub const MIN_KCAL_ENV_VAR: &str = "TOP_PROTEIN_MIN_KCAL";
pub const MIN_PER_SERVING_ENV_VAR: &str = "TOP_PROTEIN_MIN_PER_SERVING_G";
pub const MIN_PER_100KCAL_ENV_VAR: &str = "TOP_PROTEIN_MIN_PER_100KCAL_G";
pub const LIMIT_ENV_VAR: &str = "TOP_PROTEIN_LIMIT";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoints: DineEndpoints,
    pub primary_platform: Platform,
    pub fallback_platform: Platform,
    pub user_agent: String,
    pub bind_addr: SocketAddr,
    pub ranking: RankingThresholds,
}

impl AppConfig {
    /// Reads the process environment after loading `.env` if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads a specific dotenv file, then reads the environment. Variables already
    /// set in the process keep their value.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenv::from_path(path)
            .with_context(|| format!("Failed to load env file '{}'", path.display()))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = RankingThresholds::default();
        let base_url = lookup(API_BASE_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let location_id = lookup(LOCATION_ID_ENV_VAR).unwrap_or_else(|| DEFAULT_LOCATION_ID.to_string());

        Ok(Self {
            endpoints: DineEndpoints::new(base_url, location_id),
            primary_platform: Platform(parse_or(&lookup, PRIMARY_PLATFORM_ENV_VAR, Platform::PRIMARY.0)?),
            fallback_platform: Platform(parse_or(&lookup, FALLBACK_PLATFORM_ENV_VAR, Platform::FALLBACK.0)?),
            user_agent: lookup(USER_AGENT_ENV_VAR).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            bind_addr: parse_or(&lookup, BIND_ADDR_ENV_VAR, DEFAULT_BIND_ADDR.parse::<SocketAddr>()?)?,
            ranking: RankingThresholds {
                min_kcal: parse_or(&lookup, MIN_KCAL_ENV_VAR, defaults.min_kcal)?,
                min_protein_per_serving_g: parse_or(&lookup, MIN_PER_SERVING_ENV_VAR, defaults.min_protein_per_serving_g)?,
                min_protein_per_100kcal_g: parse_or(&lookup, MIN_PER_100KCAL_ENV_VAR, defaults.min_protein_per_100kcal_g)?,
                limit: parse_or(&lookup, LIMIT_ENV_VAR, defaults.limit)?,
            },
        })
    }

    pub fn menu_fetcher(&self) -> MenuFetcher {
        MenuFetcher::new(DineClient::new(self.user_agent.clone()), self.endpoints.clone())
            .with_platforms(self.primary_platform, self.fallback_platform)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.endpoints.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.endpoints.location_id, DEFAULT_LOCATION_ID);
        assert_eq!(config.primary_platform, Platform::PRIMARY);
        assert_eq!(config.fallback_platform, Platform::FALLBACK);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.ranking, RankingThresholds::default());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_BASE_URL_ENV_VAR, "http://localhost:8080/v1"),
            (PRIMARY_PLATFORM_ENV_VAR, "1"),
            (MIN_KCAL_ENV_VAR, " 80 "),
            (LIMIT_ENV_VAR, "10"),
            (BIND_ADDR_ENV_VAR, "0.0.0.0:8000"),
        ]))
        .unwrap();
        assert_eq!(config.endpoints.base_url, "http://localhost:8080/v1");
        assert_eq!(config.primary_platform, Platform(1));
        assert_eq!(config.ranking.min_kcal, 80.0);
        assert_eq!(config.ranking.limit, 10);
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn test_env_file_values_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}=file-location", LOCATION_ID_ENV_VAR).unwrap();
        writeln!(file, "{}=3", LIMIT_ENV_VAR).unwrap();

        let config = AppConfig::from_env_file(file.path()).unwrap();
        assert_eq!(config.endpoints.location_id, "file-location");
        assert_eq!(config.ranking.limit, 3);
        assert!(config.endpoints.periods_url().ends_with("/location/file-location/periods"));
    }

    #[test]
    fn test_process_environment_wins_over_env_file() {
        env::set_var(USER_AGENT_ENV_VAR, "MacroCount-process/2.0");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}=MacroCount-file/3.0", USER_AGENT_ENV_VAR).unwrap();

        let config = AppConfig::from_env_file(file.path()).unwrap();
        assert_eq!(config.user_agent, "MacroCount-process/2.0");
    }

    #[test]
    fn test_missing_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_env_file(&dir.path().join("absent.env")).unwrap_err();
        assert!(err.to_string().contains("absent.env"));
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[(LIMIT_ENV_VAR, "five")])).unwrap_err();
        assert!(err.to_string().contains(LIMIT_ENV_VAR));
    }
}
