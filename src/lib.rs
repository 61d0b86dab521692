pub mod api_connection;
pub mod cli;
pub mod config;
pub mod derived_metrics;
pub mod insights;
pub mod meal_aggregator;
pub mod menu_fetcher;
pub mod menu_normalizer;
pub mod nutrient_extractor;
pub mod report;
pub mod server;
pub mod serving_parser;
