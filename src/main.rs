use anyhow::{Context, Result};
use menu_macros::cli::{default_date, default_meal, parse_args, Command, MenuArgs};
use menu_macros::config::AppConfig;
use menu_macros::report::{build_report, ReportRequest};
use menu_macros::server;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn print_menu(config: &AppConfig, args: MenuArgs) -> Result<()> {
    let date = args.date.unwrap_or_else(default_date).format("%Y-%m-%d").to_string();
    let meal = args.meal.unwrap_or_else(|| default_meal().to_string());

    let fetch = config
        .menu_fetcher()
        .fetch_items(&date, &meal)
        .await
        .with_context(|| format!("Failed to fetch {} menu for {}", meal, date))?;

    if fetch.items.is_empty() {
        let available: Vec<_> = fetch
            .periods
            .iter()
            .filter_map(|p| p.get("name").and_then(|n| n.as_str()))
            .collect();
        eprintln!("No items for '{}' on {}. Available periods: {}", meal, date, available.join(", "));
    }

    let compare = args
        .compare
        .as_deref()
        .and_then(|pair| match pair {
            [a, b] => Some((a.as_str(), b.as_str())),
            _ => None,
        });
    let report = build_report(
        &fetch.items,
        &ReportRequest {
            date,
            meal,
            station: args.station.as_deref(),
            search: &args.search,
            selections: &args.selections,
            metric: args.metric,
            compare,
            thresholds: &config.ranking,
        },
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_macros=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli_args = parse_args();
    let config = match &cli_args.env_file {
        Some(path) => AppConfig::from_env_file(Path::new(path))?,
        None => AppConfig::from_env()?,
    };

    match cli_args.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind_addr);
            server::serve(config.menu_fetcher(), addr).await
        }
        Command::Menu(args) => print_menu(&config, args).await,
    }
}
