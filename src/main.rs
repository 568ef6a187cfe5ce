use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

mod charts;
mod filter;
mod loader;
mod metrics;
mod models;
mod report;
#[cfg(test)]
mod test_support;

use models::{DashboardMetrics, FilterOptions, FilterSelection};

#[derive(Parser)]
#[command(name = "help-seeking-dashboard")]
#[command(about = "Descriptive dashboard core for the mental-health help-seeking survey", long_about = None)]
struct Cli {
    /// Zip archive holding the survey CSV
    #[arg(long, default_value = "Final_Data.csv.zip", global = true)]
    archive: PathBuf,
    /// Extraction directory for the archive contents
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Keep only these genders (repeatable)
    #[arg(long = "gender")]
    genders: Vec<String>,
    /// Keep only these occupations (repeatable)
    #[arg(long = "occupation")]
    occupations: Vec<String>,
    /// Keep only these countries (repeatable)
    #[arg(long = "country")]
    countries: Vec<String>,
    /// Keep only these survey years (repeatable)
    #[arg(long = "year")]
    years: Vec<i32>,
}

impl From<FilterArgs> for FilterSelection {
    fn from(args: FilterArgs) -> Self {
        FilterSelection {
            genders: args.genders,
            occupations: args.occupations,
            countries: args.countries,
            years: args.years,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the archive and normalize the base table
    Extract,
    /// List available filter options per attribute
    Options,
    /// Print the three headline metrics for a filter selection
    Metrics {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the seven chart specs as JSON
    Charts {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "charts.json")]
        out: PathBuf,
    },
    /// Generate a markdown dashboard report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    match cli.command {
        Commands::Extract => {
            let base = loader::load_dashboard(&cli.archive, &cli.data_dir)?;
            println!(
                "Dataset ready: {} records after timestamp normalization.",
                base.len()
            );
        }
        Commands::Options => {
            let base = loader::load_dashboard(&cli.archive, &cli.data_dir)?;
            let options = FilterOptions::from_records(&base);
            println!("Gender: {}", options.genders.join(", "));
            println!("Occupation: {}", options.occupations.join(", "));
            println!("Country: {}", options.countries.join(", "));
            let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
            println!("Year: {}", years.join(", "));
        }
        Commands::Metrics { filters } => {
            let base = loader::load_dashboard(&cli.archive, &cli.data_dir)?;
            let selection = FilterSelection::from(filters);
            let filtered = filter::apply(&base, &selection);
            let metrics = DashboardMetrics::compute(&filtered);
            println!("Total Respondents: {}", metrics.total_respondents);
            println!("No. of Countries: {}", metrics.country_count);
            println!("Avg Stress Score: {}", metrics.avg_stress_display());
        }
        Commands::Charts { filters, out } => {
            let base = loader::load_dashboard(&cli.archive, &cli.data_dir)?;
            let selection = FilterSelection::from(filters);
            let filtered = filter::apply(&base, &selection);
            let specs = charts::build_all(&filtered);
            let json = serde_json::to_string_pretty(&specs)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} chart specs to {}.", specs.len(), out.display());
        }
        Commands::Report { filters, out } => {
            let base = loader::load_dashboard(&cli.archive, &cli.data_dir)?;
            let selection = FilterSelection::from(filters);
            let filtered = filter::apply(&base, &selection);
            let metrics = DashboardMetrics::compute(&filtered);
            let specs = charts::build_all(&filtered);
            let report = report::build_report(&selection, &metrics, &specs);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
