use serde::Serialize;

use crate::menu_normalizer::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub a: String,
    pub b: String,
    /// Which item does better on this row. `None` for ties and text rows.
    pub better: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemComparison<'a> {
    pub a: &'a MenuItem,
    pub b: &'a MenuItem,
    pub rows: Vec<ComparisonRow>,
}

/// More protein is better; fewer calories, carbs and fat are better.
fn numeric_row(label: &'static str, a: f64, b: f64, higher_is_better: bool) -> ComparisonRow {
    let better = if a == b {
        None
    } else if (a > b) == higher_is_better {
        Some(Side::A)
    } else {
        Some(Side::B)
    };
    ComparisonRow {
        label,
        a: a.to_string(),
        b: b.to_string(),
        better,
    }
}

pub fn compare_items<'a>(a: &'a MenuItem, b: &'a MenuItem) -> ItemComparison<'a> {
    let rows = vec![
        ComparisonRow {
            label: "Serving",
            a: a.serving_name.clone(),
            b: b.serving_name.clone(),
            better: None,
        },
        numeric_row("Calories", a.per_serving_kcal, b.per_serving_kcal, false),
        numeric_row("Protein (g)", a.per_serving_protein_g, b.per_serving_protein_g, true),
        numeric_row("Carbs (g)", a.per_serving_carb_g, b.per_serving_carb_g, false),
        numeric_row("Fat (g)", a.per_serving_fat_g, b.per_serving_fat_g, false),
    ];
    ItemComparison { a, b, rows }
}
