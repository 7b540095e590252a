mod export;
mod pipeline;
mod query;
mod report;
mod resolver;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use carscan_core::AppConfig;
use carscan_scraper::ListingClient;

use crate::pipeline::{scrape_to_csv, SearchRequest};
use crate::query::Condition;
use crate::report::PriceSummary;

#[derive(Debug, Parser)]
#[command(name = "carscan")]
#[command(about = "cars.com listing scraper and price reporter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one maker/model search into a CSV and print its price summary.
    Scrape(ScrapeArgs),
    /// Scrape every "maker: model" pair listed in a file.
    Batch(BatchArgs),
    /// Summarize a previously written listings CSV.
    Report(ReportArgs),
    /// List maker and model ids from the model codes file.
    Codes(CodesArgs),
}

#[derive(Debug, Args)]
struct SearchOpts {
    /// Search origin ZIP code.
    #[arg(long)]
    zip: u32,

    /// Search radius in miles.
    #[arg(long)]
    radius: u32,

    #[arg(long, value_enum, default_value_t = Condition::Used)]
    condition: Condition,

    /// cars.com make/model id table (JSON).
    #[arg(long)]
    codes: PathBuf,

    /// Directory the CSV is written into (created if missing).
    #[arg(long, default_value = "./data")]
    output_dir: PathBuf,
}

#[derive(Debug, Args)]
struct ScrapeArgs {
    maker: String,
    model: String,

    #[command(flatten)]
    search: SearchOpts,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// File of "maker: model" lines, one search per line.
    pairs_file: PathBuf,

    #[command(flatten)]
    search: SearchOpts,
}

#[derive(Debug, Args)]
struct ReportArgs {
    csv: PathBuf,

    /// Lower bound of an optional price filter.
    #[arg(long, requires = "max_price")]
    min_price: Option<f64>,

    /// Upper bound of an optional price filter.
    #[arg(long, requires = "min_price")]
    max_price: Option<f64>,
}

#[derive(Debug, Args)]
struct CodesArgs {
    codes: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = carscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape(args) => run_scrape(&config, args).await,
        Commands::Batch(args) => run_batch(&config, args).await,
        Commands::Report(args) => run_report(&args),
        Commands::Codes(args) => run_codes(&args),
    }
}

async fn run_scrape(config: &AppConfig, args: ScrapeArgs) -> anyhow::Result<()> {
    let catalog = resolver::ModelCatalog::load(&args.search.codes)?;
    let client = ListingClient::new(config.request_timeout_secs, &config.user_agent)?;
    let request = SearchRequest {
        maker: args.maker,
        model: args.model,
        zipcode: args.search.zip,
        radius: args.search.radius,
        condition: args.search.condition,
    };

    let outcome = scrape_to_csv(config, &catalog, &client, &request, &args.search.output_dir).await?;
    println!(
        "wrote {} listings to {}",
        outcome.records.len(),
        outcome.csv_path.display()
    );
    print_summary(&request, outcome.summary.as_ref());
    Ok(())
}

async fn run_batch(config: &AppConfig, args: BatchArgs) -> anyhow::Result<()> {
    let catalog = resolver::ModelCatalog::load(&args.search.codes)?;
    let client = ListingClient::new(config.request_timeout_secs, &config.user_agent)?;
    let pairs = read_pairs(&args.pairs_file)?;
    anyhow::ensure!(
        !pairs.is_empty(),
        "{} lists no maker: model pairs",
        args.pairs_file.display()
    );

    for (maker, model) in pairs {
        let request = SearchRequest {
            maker,
            model,
            zipcode: args.search.zip,
            radius: args.search.radius,
            condition: args.search.condition,
        };
        let outcome =
            scrape_to_csv(config, &catalog, &client, &request, &args.search.output_dir).await?;
        println!(
            "wrote {} listings to {}",
            outcome.records.len(),
            outcome.csv_path.display()
        );
        print_summary(&request, outcome.summary.as_ref());
    }
    Ok(())
}

fn run_report(args: &ReportArgs) -> anyhow::Result<()> {
    let (header, rows) = export::read_csv(&args.csv)
        .with_context(|| format!("reading {}", args.csv.display()))?;

    match report::SearchMeta::from_csv_path(&args.csv) {
        Some(meta) => println!(
            "Price information ({}-{}-{}):",
            meta.maker, meta.model, meta.condition
        ),
        None => println!("Price information ({}):", args.csv.display()),
    }
    match report::summarize(&report::row_prices(&header, &rows)) {
        Some(summary) => println!("{summary}"),
        None => println!("no usable prices in {}", args.csv.display()),
    }

    if let (Some(min), Some(max)) = (args.min_price, args.max_price) {
        let hits = report::rows_in_price_range(&header, &rows, min, max);
        println!();
        println!("{} listings between $ {min:.2} and $ {max:.2}:", hits.len());
        let listing = report::price_sorted_listing(&header, &hits);
        if !listing.is_empty() {
            println!("{listing}");
        }
    }
    Ok(())
}

fn run_codes(args: &CodesArgs) -> anyhow::Result<()> {
    let catalog = resolver::ModelCatalog::load(&args.codes)?;
    for (i, maker) in catalog.makers().iter().enumerate() {
        println!("{:2}. {}\t{}", i + 1, maker.nm, maker.id);
        for (j, model) in maker.md.iter().enumerate() {
            println!("\t{:2}.{} {}\t{}", i + 1, j + 1, model.nm, model.id);
        }
    }
    Ok(())
}

fn print_summary(request: &SearchRequest, summary: Option<&PriceSummary>) {
    match summary {
        Some(summary) => {
            println!(
                "Price information ({}-{}-{}), {} usable prices:",
                request.maker, request.model, request.condition, summary.count
            );
            println!("{summary}");
        }
        None => println!(
            "no usable prices for {} {} ({})",
            request.maker, request.model, request.condition
        ),
    }
}

fn read_pairs(path: &Path) -> anyhow::Result<Vec<(String, String)>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (maker, model) = line.split_once(':').ok_or_else(|| {
            anyhow::anyhow!(
                "{}:{}: expected \"maker: model\"",
                path.display(),
                number + 1
            )
        })?;
        pairs.push((maker.trim().to_owned(), model.trim().to_owned()));
    }
    Ok(pairs)
}
