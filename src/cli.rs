use chrono::{Local, NaiveDate, Timelike};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;

use crate::insights::top_protein::ProteinMetric;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dining hall menu macros", long_about = None)]
pub struct Cli {
    /// Load configuration from this dotenv file instead of `.env`
    #[arg(long, global = true)]
    pub env_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP menu API
    Serve {
        /// Address to bind, overrides MENU_BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Fetch one menu and print items, meal totals and the protein ranking
    Menu(MenuArgs),
}

#[derive(clap::Args, Debug)]
pub struct MenuArgs {
    /// Menu date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Meal period label, defaults by time of day
    #[arg(short, long)]
    pub meal: Option<String>,

    /// Only show items from this station
    #[arg(short, long)]
    pub station: Option<String>,

    /// Case-insensitive text filter on item name or station
    #[arg(long, default_value = "")]
    pub search: String,

    /// Add an item (id or name) to the meal, optionally with servings: `Rice=1.5`
    #[arg(long = "select", value_parser = parse_selection)]
    pub selections: Vec<(String, f64)>,

    /// Ranking metric for the top protein list
    #[arg(long, value_enum, default_value_t = ProteinMetric::PerServing)]
    pub metric: ProteinMetric,

    /// Compare two items (ids or names) side by side
    #[arg(long, num_args = 2, value_names = ["ITEM_A", "ITEM_B"])]
    pub compare: Option<Vec<String>>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// `NAME` or `NAME=SERVINGS`.
pub fn parse_selection(raw: &str) -> Result<(String, f64), String> {
    match raw.rsplit_once('=') {
        Some((key, servings)) => {
            let servings: f64 = servings
                .trim()
                .parse()
                .map_err(|_| format!("invalid servings in '{}'", raw))?;
            Ok((key.trim().to_string(), servings))
        }
        None => Ok((raw.trim().to_string(), 1.0)),
    }
}

pub fn default_date() -> NaiveDate {
    Local::now().date_naive()
}

/// Breakfast before 10:00, lunch before 15:00, dinner after.
pub fn default_meal_for_hour(hour: u32) -> &'static str {
    if hour < 10 {
        "Breakfast"
    } else if hour < 15 {
        "Lunch"
    } else {
        "Dinner"
    }
}

pub fn default_meal() -> &'static str {
    default_meal_for_hour(Local::now().hour())
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("Rice=1.5"), Ok(("Rice".to_string(), 1.5)));
        assert_eq!(parse_selection("Grilled Chicken"), Ok(("Grilled Chicken".to_string(), 1.0)));
        assert!(parse_selection("Rice=lots").is_err());
    }

    #[test]
    fn test_default_meal_by_hour() {
        assert_eq!(default_meal_for_hour(7), "Breakfast");
        assert_eq!(default_meal_for_hour(10), "Lunch");
        assert_eq!(default_meal_for_hour(14), "Lunch");
        assert_eq!(default_meal_for_hour(15), "Dinner");
        assert_eq!(default_meal_for_hour(23), "Dinner");
    }

    #[test]
    fn test_menu_command_parses() {
        let cli = Cli::try_parse_from([
            "menu-macros", "menu", "--date", "2025-09-01", "--meal", "lunch", "--select", "Rice=2",
            "--select", "chicken", "--metric", "per-100kcal", "--compare", "Rice", "Chicken",
        ])
        .unwrap();
        let Command::Menu(args) = cli.command else {
            panic!("expected menu command");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(args.selections.len(), 2);
        assert_eq!(args.metric, ProteinMetric::Per100Kcal);
        assert_eq!(args.compare, Some(vec!["Rice".to_string(), "Chicken".to_string()]));
    }
}
