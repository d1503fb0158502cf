use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use quote_cli::app;
use quote_cli::config::{DEFAULT_LOG_LEVEL, Overrides, Settings};
use quote_cli::logging;
use quote_cli::report::EstimateReport;
use quote_core::calculations::LabourHours;
use quote_core::{EquipmentQuantities, ShortJobPolicy};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Mould remediation cost estimator.
///
/// Prices labour hours and equipment hire with the rates held in the
/// configured database, and re-prices stored inspections.
#[derive(Debug, Parser)]
#[command(name = "quote", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `quotes.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Log level or filter directive. `RUST_LOG` takes precedence.
    #[arg(long)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Keep log output off the console.
    #[arg(long, short, default_value_t = false)]
    quiet: bool,

    /// Pricing of blocks of two hours or less: `minimum-charge` or `prorated`.
    #[arg(long, value_parser = ShortJobPolicy::parse)]
    short_job: Option<ShortJobPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price labour hours and equipment without a stored inspection.
    Estimate(EstimateArgs),
    /// Show the stored inspection for a lead, priced as it would load.
    Show {
        /// Lead the inspection belongs to.
        #[arg(long)]
        lead: i64,
    },
    /// Re-price the stored inspection for a lead with current rates and save it.
    Reprice {
        /// Lead the inspection belongs to.
        #[arg(long)]
        lead: i64,

        /// Report the new figures without saving them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
struct EstimateArgs {
    /// Hours of non-demolition work.
    #[arg(long, default_value = "0")]
    non_demo: Decimal,

    /// Hours of demolition work.
    #[arg(long, default_value = "0")]
    demolition: Decimal,

    /// Hours of subfloor work.
    #[arg(long, default_value = "0")]
    subfloor: Decimal,

    #[arg(long, default_value_t = 0)]
    dehumidifiers: u32,

    #[arg(long, default_value_t = 0)]
    air_movers: u32,

    #[arg(long, default_value_t = 0)]
    rcd_boxes: u32,

    /// Fix the subtotal (ex GST) instead of pricing it.
    #[arg(long)]
    manual_subtotal: Option<Decimal>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend.clone(),
            connection: self.db.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
            short_job: self.short_job,
        }
    }
}

// ─── logging ─────────────────────────────────────────────────────────────────

/// Applies the resolved logging settings to the already running subscriber.
fn configure_logging(
    settings: &Settings,
    quiet: bool,
) -> Result<()> {
    if !logging::env_filter_set() {
        logging::set_log_level(&settings.log_level)?;
    }
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    if quiet {
        logging::set_console_enabled(false)?;
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging(DEFAULT_LOG_LEVEL);

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), cli.overrides())?;
    configure_logging(&settings, cli.quiet)?;
    debug!(?settings, "configuration resolved");

    let repository = app::open_repository(&settings.database).await?;
    let config = app::load_pricing_config(
        &*repository,
        settings.short_job,
        settings.max_hours_per_category,
    )
    .await?;

    match cli.command {
        Command::Estimate(args) => {
            let hours = LabourHours {
                non_demo: args.non_demo,
                demolition: args.demolition,
                subfloor: args.subfloor,
            };
            let equipment = EquipmentQuantities {
                dehumidifiers: args.dehumidifiers,
                air_movers: args.air_movers,
                rcd_boxes: args.rcd_boxes,
            };
            let pricing = app::quote_hours(&config, hours, equipment, args.manual_subtotal)
                .context("cannot price estimate")?;
            println!("{}", EstimateReport::new(hours, &pricing));
        }
        Command::Show { lead } => {
            let (session, outcome) = app::open_session(repository, config, lead).await?;
            if !outcome.existing {
                println!("No inspection stored for lead {lead}.");
                return Ok(());
            }
            for area in session.form().areas() {
                println!(
                    "{:<24} {:>6}h  demolition {}",
                    area.name,
                    area.time_without_demo.normalize(),
                    if area.demolition_required {
                        format!("{}h", area.demolition_time.normalize())
                    } else {
                        "no".to_string()
                    }
                );
            }
            let pricing = session.preview()?;
            println!("{}", EstimateReport::new(session.form().hours(), &pricing));

            let held = session.form().pricing().totals();
            if outcome.reconciled {
                println!("Stored figures were stale and have been recomputed (not saved).");
            } else if held != pricing.fields.totals() {
                println!(
                    "Stored: subtotal {:.2}, GST {:.2}, total {:.2} (priced with earlier rates)",
                    held.subtotal_ex_gst, held.gst_amount, held.total_inc_gst
                );
            }
        }
        Command::Reprice { lead, dry_run } => {
            let (mut session, outcome) = app::open_session(repository, config, lead).await?;
            let saved = app::reprice_inspection(&mut session, &outcome, dry_run).await?;
            let pricing = session.preview()?;
            println!("{}", EstimateReport::new(session.form().hours(), &pricing));
            match saved {
                Some(saved) => info!(
                    inspection_id = saved.inspection_id,
                    areas = saved.areas_saved,
                    "inspection re-priced"
                ),
                None => println!("Nothing saved."),
            }
        }
    }

    Ok(())
}
