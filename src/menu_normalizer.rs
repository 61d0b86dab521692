use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::derived_metrics::{Per100g, Scores};
use crate::nutrient_extractor::{extract_macros, Macros};
use crate::serving_parser::parse_serving_grams;

pub const DEFAULT_STATION: &str = "Uncategorized";
pub const DEFAULT_MEAL_PERIOD: &str = "Unspecified";
pub const DEFAULT_SERVING_NAME: &str = "1 serving";
pub const DEFAULT_ITEM_NAME: &str = "Item";

/// Upstream keys that may carry an item identifier, most trusted first.
const ID_KEYS: &[&str] = &["id", "mrn", "webtrition_id"];

/// Upstream keys that may carry the free-text serving descriptor.
const SERVING_KEYS: &[&str] = &["portion", "servingSize", "serving", "portion_size"];

/// One normalized menu entry. Immutable once built by [`normalize_menu`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub station: String,
    pub meal_period: String,
    pub serving_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub serving_size_g: Option<f64>,

    pub per_serving_kcal: f64,
    pub per_serving_protein_g: f64,
    pub per_serving_carb_g: f64,
    pub per_serving_fat_g: f64,
    pub per_serving_fiber_g: f64,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub per_100g_kcal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub per_100g_protein_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub per_100g_carb_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub per_100g_fat_g: Option<f64>,

    pub protein_density: f64,
    pub fat_efficiency: f64,
    pub fiber_per_100kcal: f64,
}

impl MenuItem {
    pub fn macros(&self) -> Macros {
        Macros {
            kcal: self.per_serving_kcal,
            protein_g: self.per_serving_protein_g,
            carb_g: self.per_serving_carb_g,
            fat_g: self.per_serving_fat_g,
            fiber_g: self.per_serving_fiber_g,
        }
    }

    fn build(
        identity: ItemIdentity,
        serving_name: String,
        serving_size_g: Option<f64>,
        macros: Macros,
    ) -> Self {
        let per_100g = Per100g::compute(&macros, serving_size_g);
        let scores = Scores::compute(&macros);
        MenuItem {
            id: identity.id,
            name: identity.name,
            station: identity.station,
            meal_period: identity.meal_period,
            serving_name,
            serving_size_g,
            per_serving_kcal: macros.kcal,
            per_serving_protein_g: macros.protein_g,
            per_serving_carb_g: macros.carb_g,
            per_serving_fat_g: macros.fat_g,
            per_serving_fiber_g: macros.fiber_g,
            per_100g_kcal: per_100g.map(|p| p.kcal),
            per_100g_protein_g: per_100g.map(|p| p.protein_g),
            per_100g_carb_g: per_100g.map(|p| p.carb_g),
            per_100g_fat_g: per_100g.map(|p| p.fat_g),
            protein_density: scores.protein_density,
            fat_efficiency: scores.fat_efficiency,
            fiber_per_100kcal: scores.fiber_per_100kcal,
        }
    }

    /// Identity used for de-duplication. Unknown weights all share the `None` slot.
    fn dedup_key(&self) -> (String, String, Option<i64>) {
        (
            self.name.to_lowercase(),
            self.station.to_lowercase(),
            self.serving_size_g.map(|grams| (grams * 1000.0).round() as i64),
        )
    }
}

struct ItemIdentity {
    id: String,
    name: String,
    station: String,
    meal_period: String,
}

/// Renders a scalar JSON value as text. Strings are taken verbatim, other values
/// use their JSON rendering. `null` counts as absent.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// First key from `keys` present (non-null) on `node`.
fn first_present(node: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| node.get(*key).and_then(value_text))
}

fn label_or(node: &Value, default: &str) -> String {
    node.get("name")
        .and_then(value_text)
        .unwrap_or_else(|| default.to_string())
}

/// Empty text, zero and `false` count as absent so the next serving key is tried.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::Bool(flag) => !flag,
        _ => false,
    }
}

fn serving_descriptor(raw_item: &Value) -> String {
    SERVING_KEYS
        .iter()
        .filter_map(|key| raw_item.get(*key))
        .filter(|value| !is_blank(value))
        .find_map(value_text)
        .unwrap_or_else(|| DEFAULT_SERVING_NAME.to_string())
}

/// Picks the period block to read: a single object is used as-is; from a list the
/// entry whose `id` matches `wanted_period_id` wins, falling back to the first.
fn select_period<'a>(periods: &'a Value, wanted_period_id: Option<&str>) -> Option<&'a Value> {
    match periods {
        Value::Array(list) => wanted_period_id
            .and_then(|wanted| {
                list.iter().find(|period| {
                    period.get("id").and_then(value_text).as_deref() == Some(wanted)
                })
            })
            .or_else(|| list.first()),
        Value::Object(_) => Some(periods),
        _ => None,
    }
}

fn normalize_item(raw_item: &Value, station: &str, meal_period: &str) -> MenuItem {
    let name = raw_item
        .get("name")
        .and_then(value_text)
        .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
    let id = first_present(raw_item, ID_KEYS).unwrap_or_else(|| name.clone());
    let serving_name = serving_descriptor(raw_item);
    let serving_size_g = parse_serving_grams(Some(&serving_name));
    let macros = extract_macros(raw_item);

    MenuItem::build(
        ItemIdentity {
            id,
            name,
            station: station.to_string(),
            meal_period: meal_period.to_string(),
        },
        serving_name,
        serving_size_g,
        macros,
    )
}

/// Flattens an upstream period-detail payload into de-duplicated menu items.
///
/// Reads `menu.periods` → `categories[]` → `items[]`, keeping upstream order. Malformed
/// input never fails: missing nodes yield no items, missing fields get placeholders
/// or zeros.
pub fn normalize_menu(payload: &Value, wanted_period_id: Option<&str>) -> Vec<MenuItem> {
    let Some(period) = payload
        .pointer("/menu/periods")
        .and_then(|periods| select_period(periods, wanted_period_id))
    else {
        return Vec::new();
    };

    let meal_period = label_or(period, DEFAULT_MEAL_PERIOD);
    let categories = period
        .get("categories")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut candidates = Vec::new();
    for category in categories {
        let station = label_or(category, DEFAULT_STATION);
        let Some(items) = category.get("items").and_then(Value::as_array) else {
            continue;
        };
        candidates.extend(
            items
                .iter()
                .map(|raw_item| normalize_item(raw_item, &station, &meal_period)),
        );
    }

    dedup_items(candidates)
}

/// Keeps the first item for each (name, station, serving grams) key.
pub fn dedup_items(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.dedup_key()))
        .collect()
}
