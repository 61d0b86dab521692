//! Inbound HTTP surface: `GET /api/menu` and a health probe.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::menu_fetcher::MenuFetcher;
use crate::menu_normalizer::MenuItem;

pub const NO_STORE: &str = "no-store, no-cache, max-age=0, must-revalidate";

#[derive(Clone)]
struct AppState {
    fetcher: Arc<MenuFetcher>,
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub date: Option<String>,
    pub meal: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub date: String,
    pub meal: String,
    pub count: usize,
    pub items: Vec<MenuItem>,
    pub periods: Vec<Value>,
}

pub fn router(fetcher: MenuFetcher) -> Router {
    let state = AppState {
        fetcher: Arc::new(fetcher),
    };
    Router::new()
        .route("/api/menu", get(menu_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn serve(fetcher: MenuFetcher, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Menu API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(fetcher)).await?;
    Ok(())
}

fn no_store(status: StatusCode, body: Value) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn menu_handler(
    State(state): State<AppState>,
    query: Result<Query<MenuQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return no_store(
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Invalid query: {}", rejection.body_text()) }),
            );
        }
    };
    let (Some(date), Some(meal)) = (required(query.date), required(query.meal)) else {
        return no_store(StatusCode::BAD_REQUEST, json!({ "error": "Missing date or meal" }));
    };
    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return no_store(
            StatusCode::BAD_REQUEST,
            json!({ "error": format!("Invalid date '{}', expected YYYY-MM-DD", date) }),
        );
    }

    match state.fetcher.fetch_items(&date, &meal).await {
        Ok(fetch) => {
            let body = MenuResponse {
                count: fetch.items.len(),
                date,
                meal,
                items: fetch.items,
                periods: fetch.periods,
            };
            match serde_json::to_value(&body) {
                Ok(value) => no_store(StatusCode::OK, value),
                Err(err) => no_store(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                ),
            }
        }
        Err(err) => {
            error!(date = date.as_str(), meal = meal.as_str(), error = %err, "menu fetch failed");
            no_store(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            )
        }
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
