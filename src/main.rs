// Entry point and high-level CLI flow.
//
// - `dashboard` prints the KPI strip, the leaderboards and the on-time
//   trends (or the whole dashboard payload as JSON).
// - `export` writes the scored table for the current filters as CSV.
// - `sample` writes the seeded demo dataset as CSV.
//
// Every command loads its own dataset, either from `--input` or from the
// sample generator, and threads the filter selection through explicitly.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use vendor_kpi::config::{load_config, Config};
use vendor_kpi::dashboard::{build_dashboard, DashboardRequest};
use vendor_kpi::filter::{DateRange, FilterConfig, Selection};
use vendor_kpi::types::Observation;
use vendor_kpi::{loader, logging, output, sample, util};

#[derive(Parser)]
#[command(name = "vendor-kpi")]
#[command(about = "Vendor performance KPIs, rankings and exports", long_about = None)]
struct Cli {
    /// JSON config file (defaults to ./.vendorkpi.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print KPIs, leaderboards and on-time trends
    Dashboard {
        #[command(flatten)]
        data: DataArgs,

        /// Vendor to show an on-time trend for (repeatable)
        #[arg(long = "vendor")]
        vendors: Vec<String>,

        /// Leaderboard size
        #[arg(long)]
        top: Option<usize>,

        /// Emit the full dashboard payload as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Export the scored vendor table as CSV
    Export {
        #[command(flatten)]
        data: DataArgs,

        /// Output path
        #[arg(short, long, default_value = output::EXPORT_FILE_NAME)]
        out: PathBuf,
    },
    /// Write the seeded sample dataset as CSV
    Sample {
        /// Random seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// Output path
        #[arg(short, long, default_value = "vendor_sample.csv")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct DataArgs {
    /// CSV or spreadsheet of observations; the sample dataset is used when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sample seed when no input file is given (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Category to include, or "All"
    #[arg(long, default_value = "All")]
    category: String,

    /// Region to include, or "All"
    #[arg(long, default_value = "All")]
    region: String,
}

impl DataArgs {
    fn load(&self, config: &Config) -> Result<Vec<Observation>> {
        match &self.input {
            Some(path) => {
                let (data, report) = loader::load_csv(path, &config.columns)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                info!(
                    "Processing dataset... ({} rows read, {} loaded)",
                    util::format_int(report.total_rows),
                    util::format_int(report.loaded_rows)
                );
                if report.parse_errors > 0 {
                    warn!(
                        "{} rows skipped due to parse/validation errors",
                        util::format_int(report.parse_errors)
                    );
                }
                Ok(data)
            }
            None => {
                let seed = self.seed.unwrap_or(config.seed);
                info!(seed, "Using generated sample data");
                Ok(sample::generate_sample_data(seed))
            }
        }
    }

    /// A lone `--from` or `--to` is completed with the dataset's own bound.
    fn filters(&self, records: &[Observation]) -> FilterConfig {
        let bounds = (
            records.iter().filter_map(|o| o.date).min(),
            records.iter().filter_map(|o| o.date).max(),
        );
        let date_range = match (self.from.or(bounds.0), self.to.or(bounds.1)) {
            (Some(start), Some(end)) if self.from.is_some() || self.to.is_some() => {
                Some(DateRange::new(start, end))
            }
            _ => None,
        };
        FilterConfig {
            date_range,
            category: Selection::parse(&self.category),
            region: Selection::parse(&self.region),
        }
    }
}

fn handle_dashboard(
    config: &Config,
    data: &DataArgs,
    vendors: Vec<String>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let records = data.load(config)?;
    let request = DashboardRequest {
        filters: data.filters(&records),
        weights: config.weights,
        leaderboard_size: top.unwrap_or(config.leaderboard_size),
        trend_vendors: vendors,
    };
    let dash = build_dashboard(&records, &request);

    if json {
        return output::write_json(&mut io::stdout().lock(), &dash);
    }

    if dash.is_empty() {
        println!("No observations match the current filters.\n");
    }
    println!("Performance Summary Dashboard");
    println!("({} observations after filtering)\n", util::format_int(dash.records.len()));
    println!("{}\n", output::preview_table_rows(&dash.kpis.rows(), 5));

    let n = request.leaderboard_size;
    println!("Leaderboard: Top {} Vendors\n", n);
    println!("{}\n", output::preview_table_rows(&dash.top, n));
    println!("Leaderboard: Bottom {} Vendors\n", n);
    println!("{}\n", output::preview_table_rows(&dash.bottom, n));

    for trend in &dash.charts.trends {
        println!("{} On-Time Deliveries Over Time", trend.vendor);
        for p in &trend.points {
            println!("  {}  {}", p.date, p.on_time_deliveries);
        }
        println!();
    }
    Ok(())
}

fn handle_export(config: &Config, data: &DataArgs, out: &Path) -> Result<()> {
    let records = data.load(config)?;
    let request = DashboardRequest {
        filters: data.filters(&records),
        weights: config.weights,
        ..Default::default()
    };
    let dash = build_dashboard(&records, &request);
    let bytes = output::scores_to_csv(&dash.scores)?;
    output::write_bytes(out, &bytes)?;
    info!(
        path = %out.display(),
        vendors = dash.scores.len(),
        mime = output::EXPORT_MIME,
        "Exported scores"
    );
    println!("(Full table exported to {})", out.display());
    Ok(())
}

fn handle_sample(config: &Config, seed: Option<u64>, out: &Path) -> Result<()> {
    let seed = seed.unwrap_or(config.seed);
    let records = sample::generate_sample_data(seed);
    output::write_bytes(out, &output::observations_to_csv(&records)?)?;
    println!(
        "Wrote {} sample observations (seed {}) to {}",
        util::format_int(records.len()),
        seed,
        out.display()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let config = load_config(&cwd, cli.config.as_deref())?;

    match cli.command {
        Commands::Dashboard {
            data,
            vendors,
            top,
            json,
        } => handle_dashboard(&config, &data, vendors, top, json),
        Commands::Export { data, out } => handle_export(&config, &data, &out),
        Commands::Sample { seed, out } => handle_sample(&config, seed, &out),
    }
}

fn main() {
    logging::init("info");
    if let Err(e) = run(Cli::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
