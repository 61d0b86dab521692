use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "MacroCount/1.0";

#[derive(Debug)]
pub enum ApiConnectionError {
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        url: String,
        error_body: String,
    },
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError {
                status,
                url,
                error_body,
            } => {
                write!(f, "GET {} -> {} {}", url, status, error_body)
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// Thin JSON GET client for the dining API.
#[derive(Clone, Debug)]
pub struct DineClient {
    http: Client,
    user_agent: String,
}

impl DineClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            user_agent: user_agent.into(),
        }
    }

    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ApiConnectionError> {
        debug!(url, ?query, "upstream GET");

        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            Err(ApiConnectionError::ApiError {
                status,
                url: url.to_string(),
                error_body,
            })
        }
    }
}

impl Default for DineClient {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}
