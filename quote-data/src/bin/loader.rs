use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quote_data::RateLoader;
use quote_db_sqlite::SqliteRepository;

/// Load labour and equipment rates from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - kind: `labour` or `equipment`
/// - code: labour category or equipment kind
/// - tier_2h: labour price for a 2-hour job (labour rows)
/// - tier_8h: labour price for a full 8-hour day (labour rows)
/// - daily_rate: hire per unit per day (equipment rows)
#[derive(Parser, Debug)]
#[command(name = "quote-rates-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing rate data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path or URL, created if missing
    #[arg(short, long, default_value = "quotes.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!("Loading rates from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = RateLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let summary = RateLoader::load(&repo, &records)
        .await
        .context("Failed to load rates into database")?;

    println!(
        "Loaded {} labour rates and {} equipment rates.",
        summary.labour, summary.equipment
    );

    Ok(())
}
