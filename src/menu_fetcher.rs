use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api_connection::connection::{ApiConnectionError, DineClient};
use crate::api_connection::endpoints::{DineEndpoints, Platform};
use crate::menu_normalizer::{normalize_menu, MenuItem};

/// Result of one menu lookup. `periods` is the upstream period list, untouched, so
/// callers can show which meal labels exist when the requested one is missing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MenuFetch {
    pub items: Vec<MenuItem>,
    pub periods: Vec<Value>,
}

#[derive(Clone, Debug)]
pub struct MenuFetcher {
    client: DineClient,
    endpoints: DineEndpoints,
    primary: Platform,
    fallback: Platform,
}

impl MenuFetcher {
    pub fn new(client: DineClient, endpoints: DineEndpoints) -> Self {
        Self {
            client,
            endpoints,
            primary: Platform::PRIMARY,
            fallback: Platform::FALLBACK,
        }
    }

    pub fn with_platforms(mut self, primary: Platform, fallback: Platform) -> Self {
        self.primary = primary;
        self.fallback = fallback;
        self
    }

    /// Fetches the period list for `date`, then the items of the period named `meal`
    /// (case-insensitive).
    ///
    /// Failures of the period list or the primary detail request propagate. If the
    /// primary detail normalizes to nothing, the fallback platform is tried once and
    /// any failure there counts as an empty menu.
    pub async fn fetch_items(&self, date: &str, meal: &str) -> Result<MenuFetch, ApiConnectionError> {
        let periods_payload = self
            .client
            .get_json(
                &self.endpoints.periods_url(),
                &DineEndpoints::menu_query(self.primary, date),
            )
            .await?;
        let periods = period_list(&periods_payload);

        let Some(period_id) = find_period_id(&periods, meal) else {
            info!(date, meal, available = periods.len(), "no matching meal period");
            return Ok(MenuFetch {
                items: Vec::new(),
                periods,
            });
        };

        let detail_url = self.endpoints.period_detail_url(&period_id);
        let detail = self
            .client
            .get_json(&detail_url, &DineEndpoints::menu_query(self.primary, date))
            .await?;
        let mut items = normalize_menu(&detail, Some(&period_id));

        if items.is_empty() {
            info!(
                date,
                period_id = period_id.as_str(),
                platform = %self.fallback,
                "primary platform returned no items, retrying"
            );
            items = match self
                .client
                .get_json(&detail_url, &DineEndpoints::menu_query(self.fallback, date))
                .await
            {
                Ok(detail) => normalize_menu(&detail, Some(&period_id)),
                Err(err) => {
                    warn!(error = %err, "fallback period request failed");
                    Vec::new()
                }
            };
        }

        info!(date, meal, count = items.len(), "menu fetched");
        Ok(MenuFetch { items, periods })
    }
}

fn period_list(payload: &Value) -> Vec<Value> {
    payload
        .get("periods")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn find_period_id(periods: &[Value], meal: &str) -> Option<String> {
    let wanted = meal.to_lowercase();
    let period = periods.iter().find(|period| {
        period
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name.to_lowercase() == wanted)
    })?;
    match period.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_period_is_case_insensitive() {
        let periods = vec![
            json!({ "id": "b1", "name": "Breakfast" }),
            json!({ "id": "l1", "name": "Lunch" }),
            json!({ "id": 77, "name": "Late Night" }),
        ];
        assert_eq!(find_period_id(&periods, "lunch"), Some("l1".to_string()));
        assert_eq!(find_period_id(&periods, "LATE NIGHT"), Some("77".to_string()));
        assert_eq!(find_period_id(&periods, "Dinner"), None);
        assert_eq!(find_period_id(&periods, "Lunc"), None);
    }

    #[test]
    fn test_period_list_defaults_to_empty() {
        assert!(period_list(&json!({ "status": "ok" })).is_empty());
        assert_eq!(period_list(&json!({ "periods": [{ "id": "x" }] })).len(), 1);
    }
}
