use clap::{Args, Parser, Subcommand};

use crate::formats::SiteKind;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape every configured site and write the JSON and CSV exports.
    Run(RunArgs),
    /// Scrape a single site and print (or write) its JSON record.
    Scrape(ScrapeArgs),
    /// Rebuild the CSV summary from an existing JSON export.
    Summary(SummaryArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RequestArgs {
    /// YAML config file (user agent, delay range, timeout, sites).
    #[arg(long)]
    pub config: Option<String>,

    /// Minimum delay before each request, in seconds.
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Maximum delay before each request, in seconds.
    #[arg(long)]
    pub max_delay: Option<f64>,

    /// Per-request timeout, in seconds.
    #[arg(long)]
    pub timeout: Option<f64>,

    /// User-Agent header sent with every request.
    #[arg(long)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Output path for the full JSON export.
    #[arg(long, default_value = "scraped_data.json")]
    pub json_out: String,

    /// Output path for the CSV summary.
    #[arg(long, default_value = "scraped_summary.csv")]
    pub summary_out: String,
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Extractor to apply to the page.
    #[arg(long, value_enum)]
    pub kind: SiteKind,

    /// Page or API URL (must be http/https).
    #[arg(long)]
    pub url: String,

    /// Output path for the JSON record (default: stdout).
    #[arg(long)]
    pub out: Option<String>,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// JSON export written by `run`.
    #[arg(long)]
    pub input: String,

    /// Output path for the CSV summary.
    #[arg(long)]
    pub out: String,
}
