//! avm-estimate - property value and rent estimates from the RentCast AVM API
//!
//! Usage:
//!   avm-estimate value "5500 Grand Lake Drive, San Antonio, TX, 78244"
//!   avm-estimate rent "5500 Grand Lake Drive, San Antonio, TX, 78244" --save
//!   avm-estimate show rent_estimate.csv

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use real_estate_analytics::pipeline::parse::extract_plot_values;
use real_estate_analytics::pipeline::utils::{cell_text, format_usd};
use real_estate_analytics::pipeline::write::read_record_csv;
use real_estate_analytics::pipeline::PipelineOutput;
use real_estate_analytics::{Config, EstimateKind, Orchestrator, PropertyQuery, PropertyType};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "avm-estimate")]
#[command(about = "Property value and rent estimates from the RentCast AVM API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Property value estimate (/avm/value)
    Value(EstimateArgs),
    /// Long-term rent estimate (/avm/rent/long-term)
    Rent(EstimateArgs),
    /// Print a record saved by --save
    Show {
        /// CSV file written by a previous run
        path: PathBuf,
    },
}

#[derive(Args)]
struct EstimateArgs {
    /// Full property address
    address: String,

    #[arg(long, default_value = "Single Family")]
    property_type: PropertyType,

    #[arg(long, default_value_t = 3)]
    bedrooms: u32,

    #[arg(long, default_value_t = 2.0)]
    bathrooms: f32,

    #[arg(long, default_value_t = 1500)]
    square_footage: u32,

    /// Write <base>.csv and <base>_bar_chart.png
    #[arg(long)]
    save: bool,

    /// Output file base (defaults to OUTPUT_DIR/<kind>_estimate)
    #[arg(long, requires = "save")]
    output_base: Option<PathBuf>,
}

impl EstimateArgs {
    fn to_query(&self) -> PropertyQuery {
        PropertyQuery {
            address: self.address.clone(),
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_footage: self.square_footage,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Value(args) => run_estimate(EstimateKind::Value, &args),
        Commands::Rent(args) => run_estimate(EstimateKind::Rent, &args),
        Commands::Show { path } => show_record(&path),
    }
}

fn run_estimate(kind: EstimateKind, args: &EstimateArgs) -> Result<()> {
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let orchestrator = Orchestrator::from_config(&config).context("Failed to build HTTP client")?;
    let query = args.to_query();

    let result = if args.save {
        let base = args
            .output_base
            .clone()
            .unwrap_or_else(|| orchestrator.default_output_base(kind));
        orchestrator.run_to_files(kind, &query, &base)
    } else {
        orchestrator.run(kind, &query)
    };

    match result {
        Ok(output) => {
            print_report(&output);
            Ok(())
        }
        Err(e) => {
            error!("✗ {} failed: {}", kind, e);
            Err(e.into())
        }
    }
}

fn print_report(output: &PipelineOutput) {
    let kind = output.kind;
    let noun = kind.noun();

    println!("{} for:", kind);
    println!("🏠 {}", output.query.address);
    println!();

    if output.table.is_empty() {
        println!("⚠️  No {} data returned. Try another address.", noun);
    } else {
        for (column, value) in output.table.first_row() {
            println!("  {}: {}", column, cell_text(value));
        }
        println!();

        let (estimate_label, range_label) = summary_labels(kind);
        match extract_plot_values(&output.table, kind) {
            Some(values) => {
                println!("{}: {}", estimate_label, format_usd(values.estimate));
                match (values.low, values.high) {
                    (Some(low), Some(high)) => {
                        println!("{}: {} - {}", range_label, format_usd(low), format_usd(high))
                    }
                    _ => println!("⚠️  {} range missing.", range_label),
                }
            }
            None => println!("⚠️  {} data missing.", capitalize(noun)),
        }
    }

    if output.chart.is_empty() {
        println!("ℹ️  No {} chart available.", noun);
    } else {
        match output.files.as_ref().and_then(|f| f.chart.as_ref()) {
            Some(path) => println!("📊 Chart saved to {}", path.display()),
            None => println!(
                "📊 Chart rendered ({} bytes PNG); pass --save to write it",
                output.chart.len()
            ),
        }
    }

    if let Some(path) = output.files.as_ref().and_then(|f| f.csv.as_ref()) {
        println!("💾 Data saved to {}", path.display());
    }
}

fn summary_labels(kind: EstimateKind) -> (&'static str, &'static str) {
    match kind {
        EstimateKind::Value => ("Estimated Value", "Value Range"),
        EstimateKind::Rent => ("Estimated Rent", "Rent Range"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn show_record(path: &Path) -> Result<()> {
    let record = read_record_csv(path).with_context(|| format!("Failed to read {:?}", path))?;

    if record.is_empty() {
        println!("⚠️  {} holds no data", path.display());
        return Ok(());
    }

    for (column, value) in record.fields() {
        println!("  {}: {}", column, cell_text(value));
    }

    Ok(())
}
