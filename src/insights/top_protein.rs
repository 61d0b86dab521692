use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::menu_normalizer::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProteinMetric {
    /// Grams of protein in one serving.
    PerServing,
    /// Grams of protein per 100 kcal.
    #[value(name = "per-100kcal")]
    #[serde(rename = "per_100kcal")]
    Per100Kcal,
}

/// Gates that keep tiny, technically protein-dense items (leafy greens, broth)
/// out of the ranking. Loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingThresholds {
    pub min_kcal: f64,
    pub min_protein_per_serving_g: f64,
    pub min_protein_per_100kcal_g: f64,
    pub limit: usize,
}

impl Default for RankingThresholds {
    fn default() -> Self {
        Self {
            min_kcal: 60.0,
            min_protein_per_serving_g: 10.0,
            min_protein_per_100kcal_g: 8.0,
            limit: 5,
        }
    }
}

impl RankingThresholds {
    fn min_protein_for(&self, metric: ProteinMetric) -> f64 {
        match metric {
            ProteinMetric::PerServing => self.min_protein_per_serving_g,
            ProteinMetric::Per100Kcal => self.min_protein_per_100kcal_g,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProteinRank<'a> {
    pub item: &'a MenuItem,
    pub per_serving_g: f64,
    pub grams_per_100kcal: f64,
    pub pct_protein_calories: f64,
}

impl ProteinRank<'_> {
    pub fn score(&self, metric: ProteinMetric) -> f64 {
        match metric {
            ProteinMetric::PerServing => self.per_serving_g,
            ProteinMetric::Per100Kcal => self.grams_per_100kcal,
        }
    }
}

fn to_rank(item: &MenuItem) -> ProteinRank<'_> {
    let kcal = item.per_serving_kcal;
    let protein = item.per_serving_protein_g;
    let (grams_per_100kcal, pct_protein_calories) = if kcal > 0.0 {
        ((protein / kcal) * 100.0, (protein * 4.0 / kcal) * 100.0)
    } else {
        (0.0, 0.0)
    };
    ProteinRank {
        item,
        per_serving_g: protein,
        grams_per_100kcal,
        pct_protein_calories,
    }
}

/// Best protein sources, highest first.
///
/// Items below `min_kcal` or below the metric's protein minimum (always measured in
/// grams per serving) are dropped before sorting. Ties keep menu order.
pub fn rank<'a>(
    items: &'a [MenuItem],
    station: Option<&str>,
    metric: ProteinMetric,
    thresholds: &RankingThresholds,
) -> Vec<ProteinRank<'a>> {
    let min_protein = thresholds.min_protein_for(metric);
    let mut ranked: Vec<_> = items
        .iter()
        .filter(|item| station.is_none_or(|wanted| item.station == wanted))
        .map(to_rank)
        .filter(|row| row.item.per_serving_kcal >= thresholds.min_kcal && row.per_serving_g >= min_protein)
        .collect();

    ranked.sort_by(|a, b| {
        b.score(metric)
            .partial_cmp(&a.score(metric))
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(thresholds.limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_support::menu;

    fn names(rows: &[ProteinRank<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.item.name.clone()).collect()
    }

    #[test]
    fn test_rank_per_serving_gates_and_sorts() {
        let items = menu(&[
            ("Spinach", "Salad Bar", 20.0, 3.0, 3.0, 0.0),
            ("Steak", "Grill", 400.0, 40.0, 0.0, 25.0),
            ("Chicken", "Grill", 200.0, 32.0, 0.0, 4.0),
            ("Tofu", "Wok", 150.0, 9.0, 5.0, 8.0),
            ("Turkey Wrap", "Deli", 350.0, 25.0, 30.0, 10.0),
        ]);
        let ranked = rank(&items, None, ProteinMetric::PerServing, &RankingThresholds::default());
        assert_eq!(names(&ranked), vec!["Steak", "Chicken", "Turkey Wrap"]);
        assert_eq!(ranked[1].grams_per_100kcal, 16.0);
        assert_eq!(ranked[1].pct_protein_calories, 64.0);
    }

    #[test]
    fn test_rank_per_100kcal_uses_lower_protein_gate() {
        let items = menu(&[
            ("Steak", "Grill", 400.0, 40.0, 0.0, 25.0),
            ("Chicken", "Grill", 200.0, 32.0, 0.0, 4.0),
            ("Tofu", "Wok", 100.0, 9.0, 5.0, 3.0),
        ]);
        let ranked = rank(&items, None, ProteinMetric::Per100Kcal, &RankingThresholds::default());
        assert_eq!(names(&ranked), vec!["Chicken", "Steak", "Tofu"]);
        assert_eq!(ranked[0].score(ProteinMetric::Per100Kcal), 16.0);
    }

    #[test]
    fn test_rank_respects_station_and_limit() {
        let items = menu(&[
            ("A", "Grill", 100.0, 11.0, 0.0, 0.0),
            ("B", "Grill", 100.0, 12.0, 0.0, 0.0),
            ("C", "Grill", 100.0, 13.0, 0.0, 0.0),
            ("D", "Deli", 100.0, 50.0, 0.0, 0.0),
        ]);
        let thresholds = RankingThresholds { limit: 2, ..Default::default() };
        let ranked = rank(&items, Some("Grill"), ProteinMetric::PerServing, &thresholds);
        assert_eq!(names(&ranked), vec!["C", "B"]);
    }

    #[test]
    fn test_custom_thresholds_admit_low_calorie_items() {
        let items = menu(&[("Egg Whites", "Breakfast Bar", 50.0, 11.0, 0.0, 0.0)]);
        assert!(rank(&items, None, ProteinMetric::PerServing, &RankingThresholds::default()).is_empty());

        let relaxed = RankingThresholds { min_kcal: 0.0, ..Default::default() };
        assert_eq!(rank(&items, None, ProteinMetric::PerServing, &relaxed).len(), 1);
    }
}
