use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    sitescrape::logging::init().context("init logging")?;

    let cli = sitescrape::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        sitescrape::cli::Command::Run(args) => {
            sitescrape::scrape::run(args).context("run")?;
        }
        sitescrape::cli::Command::Scrape(args) => {
            sitescrape::scrape::scrape_one(args).context("scrape")?;
        }
        sitescrape::cli::Command::Summary(args) => {
            sitescrape::export::summarize(args).context("summary")?;
        }
    }

    Ok(())
}
