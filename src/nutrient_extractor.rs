use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const CALORIES_LABEL: &str = "Calories";
pub const PROTEIN_LABEL: &str = "Protein (g)";
pub const CARBS_LABEL: &str = "Total Carbohydrates (g)";
pub const FAT_LABEL: &str = "Total Fat (g)";
pub const FIBER_LABEL: &str = "Dietary Fiber (g)";

static NUMBER_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));

/// Per-serving macronutrients as reported upstream. Every field is finite and >= 0.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Macros {
    pub kcal: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

/// The two nutrient encodings seen in upstream menu items.
#[derive(Debug, Clone, Copy)]
pub enum NutrientShape<'a> {
    /// `{ "nutrition": { "calories": .., "protein": .., "carbs": .., "fat": .. } }`
    Object(&'a Map<String, Value>),
    /// `{ "nutrients": [{ "name": "Calories", "value_numeric": "150" }, ..] }`
    List(&'a [Value]),
    Missing,
}

impl<'a> NutrientShape<'a> {
    pub fn detect(raw_item: &'a Value) -> Self {
        if let Some(nutrition) = raw_item.get("nutrition").and_then(Value::as_object) {
            return NutrientShape::Object(nutrition);
        }
        if let Some(nutrients) = raw_item.get("nutrients").and_then(Value::as_array) {
            return NutrientShape::List(nutrients);
        }
        NutrientShape::Missing
    }
}

/// Lenient numeric coercion used for every upstream nutrient field.
///
/// Finite JSON numbers pass through. Strings, booleans and arrays are rendered as
/// text and the first unsigned digit run (with an optional decimal part) is parsed,
/// so `"-4"` reads as 4 while the number `-4` stays negative. Objects carry no
/// number. Non-finite results are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => first_number_run(text),
        Value::Object(_) => None,
        other => first_number_run(&other.to_string()),
    }
}

fn first_number_run(text: &str) -> Option<f64> {
    let run = NUMBER_RUN_REGEX.find(text)?;
    run.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Missing, unparseable and negative values all become 0.
fn macro_value(value: Option<&Value>) -> f64 {
    value
        .and_then(coerce_number)
        .filter(|n| *n >= 0.0)
        .unwrap_or(0.0)
}

pub fn extract_macros(raw_item: &Value) -> Macros {
    match NutrientShape::detect(raw_item) {
        NutrientShape::Object(nutrition) => Macros {
            kcal: macro_value(nutrition.get("calories")),
            protein_g: macro_value(nutrition.get("protein")),
            carb_g: macro_value(nutrition.get("carbs")),
            fat_g: macro_value(nutrition.get("fat")),
            // The object encoding never reports fiber.
            fiber_g: 0.0,
        },
        NutrientShape::List(nutrients) => {
            let by_name = index_nutrients(nutrients);
            let read = |label: &str| {
                by_name
                    .get(label.to_lowercase().as_str())
                    .map(|entry| nutrient_entry_value(entry))
                    .unwrap_or(0.0)
            };
            Macros {
                kcal: read(CALORIES_LABEL),
                protein_g: read(PROTEIN_LABEL),
                carb_g: read(CARBS_LABEL),
                fat_g: read(FAT_LABEL),
                fiber_g: read(FIBER_LABEL),
            }
        }
        NutrientShape::Missing => Macros::default(),
    }
}

/// Lowercased name -> entry. The first entry carrying a given name wins.
fn index_nutrients(nutrients: &[Value]) -> HashMap<String, &Value> {
    let mut by_name = HashMap::new();
    for entry in nutrients {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        by_name.entry(name.to_lowercase()).or_insert(entry);
    }
    by_name
}

fn nutrient_entry_value(entry: &Value) -> f64 {
    entry
        .get("value_numeric")
        .and_then(coerce_number)
        .or_else(|| entry.get("value").and_then(coerce_number))
        .filter(|n| *n >= 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_shape_reads_named_fields() {
        let item = json!({
            "nutrition": { "calories": 200, "protein": "20", "carbs": 10.5, "fat": "5 g" }
        });
        let macros = extract_macros(&item);
        assert_eq!(
            macros,
            Macros { kcal: 200.0, protein_g: 20.0, carb_g: 10.5, fat_g: 5.0, fiber_g: 0.0 }
        );
    }

    #[test]
    fn test_object_shape_wins_over_list_shape() {
        let item = json!({
            "nutrition": { "calories": 100 },
            "nutrients": [{ "name": "Calories", "value_numeric": "999" }]
        });
        assert_eq!(extract_macros(&item).kcal, 100.0);
    }

    #[test]
    fn test_list_shape_is_case_insensitive_and_reads_fiber() {
        let item = json!({
            "nutrients": [
                { "name": "CALORIES", "value_numeric": "150" },
                { "name": "protein (g)", "value_numeric": 5 },
                { "name": "Total Carbohydrates (g)", "value": "22g" },
                { "name": "Total Fat (G)", "value_numeric": null, "value": "3.5" },
                { "name": "Dietary Fiber (g)", "value_numeric": "4" }
            ]
        });
        let macros = extract_macros(&item);
        assert_eq!(macros.kcal, 150.0);
        assert_eq!(macros.protein_g, 5.0);
        assert_eq!(macros.carb_g, 22.0);
        assert_eq!(macros.fat_g, 3.5);
        assert_eq!(macros.fiber_g, 4.0);
    }

    #[test]
    fn test_list_shape_prefers_numeric_value() {
        let item = json!({
            "nutrients": [{ "name": "Calories", "value_numeric": "120", "value": "80" }]
        });
        assert_eq!(extract_macros(&item).kcal, 120.0);

        let unparseable_numeric = json!({
            "nutrients": [{ "name": "Calories", "value_numeric": "-", "value": "80" }]
        });
        assert_eq!(extract_macros(&unparseable_numeric).kcal, 80.0);
    }

    #[test]
    fn test_list_shape_first_duplicate_wins() {
        let item = json!({
            "nutrients": [
                { "name": "Calories", "value_numeric": "10" },
                { "name": "calories", "value_numeric": "20" }
            ]
        });
        assert_eq!(extract_macros(&item).kcal, 10.0);
    }

    #[test]
    fn test_missing_shapes_default_to_zero() {
        assert_eq!(extract_macros(&json!({ "name": "Water" })), Macros::default());
        assert_eq!(extract_macros(&json!({ "nutrition": "n/a" })), Macros::default());
        assert_eq!(extract_macros(&json!(null)), Macros::default());
    }

    #[test]
    fn test_coerce_number_policy() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!("less than 1g")), Some(1.0));
        assert_eq!(coerce_number(&json!("1,200")), Some(1.0));
        assert_eq!(coerce_number(&json!("-")), None);
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!("9".repeat(400))), None);
        assert_eq!(coerce_number(&json!({ "value": 250 })), None);
        assert_eq!(coerce_number(&json!([250])), Some(250.0));
        assert_eq!(coerce_number(&json!("-4")), Some(4.0));
        assert_eq!(coerce_number(&json!(-4)), Some(-4.0));
    }

    #[test]
    fn test_negative_values_collapse_to_zero() {
        let item = json!({ "nutrition": { "calories": -50, "protein": "-4" } });
        let macros = extract_macros(&item);
        assert_eq!(macros.kcal, 0.0);
        // The digit run ignores the sign for text values.
        assert_eq!(macros.protein_g, 4.0);

        let nested = json!({ "nutrition": { "calories": { "value": 250 } } });
        assert_eq!(extract_macros(&nested).kcal, 0.0);
    }
}
