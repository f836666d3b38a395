//! `fournil` operator CLI.
//!
//! # Responsibility
//! - Map operator commands onto `fournil_core` use-cases.
//! - Render working sets, write reports and the dashboard as plain text.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use fournil_core::db::open_db;
use fournil_core::{
    init_logging, BusinessImportance, DashboardService, NewProduct, ProductId, ProductRepository,
    QuantityField, RecommendationBatch, ReconciliationResult, SaleDate, SalesEntrySession,
    SqliteProductRepository, SqliteSalesRepository, WriteReport,
};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

mod config;

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "fournil")]
#[command(about = "Daily sales journal for a small bakery")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FOURNIL_DB_PATH")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "FOURNIL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long, global = true, env = "FOURNIL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
    /// Show or record one day of sales
    Sales {
        #[command(subcommand)]
        command: SalesCommand,
    },
    /// Overview of recent activity
    Dashboard,
    /// Display forecast output for tomorrow
    Recommendations {
        /// JSON file produced by the forecast service
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ProductsCommand {
    Add {
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "core", value_parser = parse_importance)]
        importance: BusinessImportance,
    },
    List {
        /// Include deactivated products
        #[arg(long)]
        all: bool,
    },
    Deactivate {
        id: ProductId,
    },
}

#[derive(Subcommand, Debug)]
enum SalesCommand {
    Show {
        /// Defaults to yesterday
        #[arg(long, value_parser = parse_date)]
        date: Option<SaleDate>,
    },
    Record {
        /// Defaults to yesterday
        #[arg(long, value_parser = parse_date)]
        date: Option<SaleDate>,
        /// `<id>=<sold>[:<unsold>]`, repeatable
        #[arg(long = "entry", required = true, value_parser = parse_entry)]
        entries: Vec<EntryArg>,
    },
}

/// One `--entry` value; quantities stay raw so core validation applies.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryArg {
    product_id: ProductId,
    sold: String,
    unsold: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::resolve(cli.db, cli.log_level.as_deref(), cli.log_dir)?;

    let log_dir = config
        .log_dir
        .to_str()
        .ok_or_else(|| anyhow!("log directory must be valid UTF-8"))?;
    init_logging(config.log_level.as_str(), log_dir).map_err(|err| anyhow!("{err}"))?;

    config.prepare_db_dir()?;
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Command::Products { command } => run_products(&conn, command),
        Command::Sales { command } => run_sales(&conn, command),
        Command::Dashboard => run_dashboard(&conn),
        Command::Recommendations { file } => run_recommendations(&file),
    }
}

fn run_products(conn: &Connection, command: ProductsCommand) -> Result<()> {
    let repo = SqliteProductRepository::try_new(conn)?;
    match command {
        ProductsCommand::Add {
            name,
            category,
            importance,
        } => {
            let mut product = NewProduct::new(name).with_importance(importance);
            if let Some(category) = category {
                product = product.with_category(category);
            }
            let created = repo.create_product(&product)?;
            println!("added product {} ({})", created.id, created.name);
        }
        ProductsCommand::List { all } => {
            let products = repo.list_products(all)?;
            if products.is_empty() {
                println!("no products yet; add one with `fournil products add <name>`");
            }
            for product in products {
                println!(
                    "{:>4}  {:<28} {:<16} {:<13}{}",
                    product.id,
                    product.name,
                    product.category.as_deref().unwrap_or("-"),
                    product.importance.as_str(),
                    if product.active { "" } else { " (inactive)" }
                );
            }
        }
        ProductsCommand::Deactivate { id } => {
            repo.deactivate_product(id)?;
            println!("product {id} deactivated");
        }
    }
    Ok(())
}

fn run_sales(conn: &Connection, command: SalesCommand) -> Result<()> {
    let mut session = SalesEntrySession::new(
        SqliteProductRepository::try_new(conn)?,
        SqliteSalesRepository::try_new(conn)?,
    );

    match command {
        SalesCommand::Show { date } => {
            let date = date.unwrap_or_else(default_sales_date);
            let result = session.select_date(date)?;
            print_working_set(result);
            Ok(())
        }
        SalesCommand::Record { date, entries } => {
            let date = date.unwrap_or_else(default_sales_date);
            let result = session.select_date(date)?;
            if result.is_empty() {
                bail!("no active products; add products before recording sales");
            }

            for entry in &entries {
                session
                    .set_input(entry.product_id, QuantityField::Sold, &entry.sold)
                    .with_context(|| format!("product {}", entry.product_id))?;
                if let Some(unsold) = entry.unsold.as_deref() {
                    session
                        .set_input(entry.product_id, QuantityField::Unsold, unsold)
                        .with_context(|| format!("product {}", entry.product_id))?;
                }
            }

            let report = session.commit()?;
            print_report(&report);
            if !report.is_complete() {
                bail!("{}", report.summary());
            }
            Ok(())
        }
    }
}

fn run_dashboard(conn: &Connection) -> Result<()> {
    let service = DashboardService::new(
        SqliteProductRepository::try_new(conn)?,
        SqliteSalesRepository::try_new(conn)?,
    );
    let overview = service.overview(SaleDate::today_local())?;

    println!("today: {}", overview.today);
    println!(
        "yesterday's sales: {}",
        if overview.yesterday_recorded {
            "recorded"
        } else {
            "to enter"
        }
    );
    println!("active products: {}", overview.active_products);
    if !overview.recent_totals.is_empty() {
        println!("recent days:");
        for total in &overview.recent_totals {
            println!("  {}  {:>6} sold", total.date, total.total_sold);
        }
    }
    Ok(())
}

fn run_recommendations(file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let batch: RecommendationBatch =
        serde_json::from_str(&raw).context("forecast output is not valid JSON")?;
    batch.validate()?;

    let tomorrow = SaleDate::today_local()
        .days_after(1)
        .ok_or_else(|| anyhow!("date overflow"))?;
    println!("recommendations for {tomorrow}");
    for recommendation in &batch.recommendations {
        println!();
        println!(
            "{} (confidence {}%)",
            recommendation.product_name, recommendation.confidence_level
        );
        println!(
            "  standard {:>5}   prudent {:>5}",
            recommendation.quantity_standard, recommendation.quantity_prudent
        );
        println!("  weather: {}", recommendation.weather_condition);
        println!("  {}", recommendation.explanation);
    }
    Ok(())
}

fn print_working_set(result: &ReconciliationResult) {
    if result.is_empty() {
        println!("no active products; add products before entering sales");
        return;
    }

    println!(
        "sales for {} ({})",
        result.date(),
        if result.has_prior_data() {
            "already recorded"
        } else {
            "not yet recorded"
        }
    );
    for record in result.records() {
        println!(
            "{:>4}  {:<28} sold {:>5}  unsold {:>5}",
            record.product_id, record.name, record.quantities.sold, record.quantities.unsold
        );
    }
    for violation in result.violations() {
        println!("warning: {violation}");
    }
}

fn print_report(report: &WriteReport) {
    println!("{}", report.summary());
    for (product_id, reason) in report.failures() {
        println!("  product {product_id}: {reason}");
    }
}

fn default_sales_date() -> SaleDate {
    SaleDate::yesterday_of(SaleDate::today_local())
}

fn parse_date(value: &str) -> Result<SaleDate, String> {
    SaleDate::parse(value).map_err(|err| err.to_string())
}

fn parse_importance(value: &str) -> Result<BusinessImportance, String> {
    BusinessImportance::parse(value)
        .ok_or_else(|| format!("`{value}` is not one of core|secondary|opportunistic"))
}

fn parse_entry(value: &str) -> Result<EntryArg, String> {
    let (id, quantities) = value
        .split_once('=')
        .ok_or_else(|| format!("`{value}` must look like <id>=<sold>[:<unsold>]"))?;
    let product_id = id
        .trim()
        .parse::<ProductId>()
        .map_err(|_| format!("`{id}` is not a product id"))?;
    let (sold, unsold) = match quantities.split_once(':') {
        Some((sold, unsold)) => (sold, Some(unsold.to_string())),
        None => (quantities, None),
    };

    Ok(EntryArg {
        product_id,
        sold: sold.to_string(),
        unsold,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_entry, Cli, EntryArg};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_entry_accepts_sold_and_optional_unsold() {
        assert_eq!(
            parse_entry("1=40:5").unwrap(),
            EntryArg {
                product_id: 1,
                sold: "40".to_string(),
                unsold: Some("5".to_string()),
            }
        );
        assert_eq!(parse_entry("2=12").unwrap().unsold, None);
    }

    #[test]
    fn parse_entry_rejects_missing_separator_and_bad_id() {
        assert!(parse_entry("40").is_err());
        assert!(parse_entry("baguette=40").is_err());
    }
}
