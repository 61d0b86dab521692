use regex::Regex;
use std::sync::LazyLock;

pub const OUNCE_TO_G: f64 = 28.3495;
pub const FLOZ_TO_ML: f64 = 29.5735;
/// Fluid servings are assumed to weigh the same as water.
pub const DENSITY_G_PER_ML: f64 = 1.0;

static FLOZ_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*floz$").expect("valid floz regex"));

static OUNCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*(?:oz|ounce|ounces)$").expect("valid ounce regex")
});

static GRAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*g(?:ram)?$").expect("valid gram regex"));

/// Converts a free-text serving descriptor ("4 oz", "8 floz", "120 g") into grams.
///
/// The whole trimmed, lowercased string must match one of the known patterns.
/// Anything else ("1 each", "1 slice", "", `None`) is an unknown weight, which is
/// `None` rather than zero so that per-100g values can be omitted downstream.
pub fn parse_serving_grams(text: Option<&str>) -> Option<f64> {
    let normalized = text?.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(amount) = leading_amount(&FLOZ_REGEX, &normalized) {
        return Some(amount * FLOZ_TO_ML * DENSITY_G_PER_ML);
    }
    if let Some(amount) = leading_amount(&OUNCE_REGEX, &normalized) {
        return Some(amount * OUNCE_TO_G);
    }
    leading_amount(&GRAM_REGEX, &normalized)
}

fn leading_amount(pattern: &Regex, text: &str) -> Option<f64> {
    let captures = pattern.captures(text)?;
    let amount: f64 = captures.get(1)?.as_str().parse().ok()?;
    amount.is_finite().then_some(amount)
}
