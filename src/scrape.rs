use std::path::Path;

use anyhow::Context as _;

use crate::cli::{RunArgs, ScrapeArgs};
use crate::config::{ScrapeConfig, SiteConfig};
use crate::extract::Extractors;
use crate::fetch::Fetcher;
use crate::formats::{ErrorStage, ScrapeRun, SiteError, SiteRecord};
use crate::rate_limit::RateLimiter;

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = crate::config::resolve(&args.request).context("resolve config")?;
    let mut scraper = Scraper::new(&config).context("build scraper")?;

    let run = scraper.run_all(&config.sites);

    crate::export::write_json(&run, Path::new(&args.json_out)).context("write json export")?;
    crate::export::write_summary_csv(&run, Path::new(&args.summary_out))
        .context("write summary export")?;

    print!("{}", crate::export::render_summary(&run));
    Ok(())
}

pub fn scrape_one(args: ScrapeArgs) -> anyhow::Result<()> {
    let mut config = crate::config::resolve(&args.request).context("resolve config")?;
    config.sites = vec![SiteConfig::new(args.kind, &args.url)];
    let mut scraper = Scraper::new(&config).context("build scraper")?;

    let run = scraper.run_all(&config.sites);

    match args.out.as_deref() {
        Some(out) => crate::export::write_json(&run, Path::new(out)).context("write json export")?,
        None => {
            let json = serde_json::to_string_pretty(&run).context("serialize scrape run")?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Drives rate limiter, fetcher and extractor for each configured site.
#[derive(Debug)]
pub struct Scraper {
    fetcher: Fetcher,
    limiter: RateLimiter,
    extractors: Extractors,
}

impl Scraper {
    pub fn new(config: &ScrapeConfig) -> anyhow::Result<Self> {
        config.validate().context("validate config")?;
        let fetcher = Fetcher::new(&config.user_agent, config.timeout()?)?;
        let limiter = RateLimiter::new(config.delay_range).context("build rate limiter")?;
        Ok(Self {
            fetcher,
            limiter,
            extractors: Extractors::new(config.api_item_limit),
        })
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Attempts every site exactly once, in the given order. A failing site
    /// only affects its own record.
    pub fn run_all(&mut self, sites: &[SiteConfig]) -> ScrapeRun {
        let mut run = ScrapeRun::new();
        for site in sites {
            run.push(self.scrape_site(site));
        }
        for record in &run.records {
            tracing::info!(
                title = %record.title,
                url = %record.url,
                kind = %record.kind(),
                items = record.item_count(),
                error = record.error().map(|e| e.message.as_str()),
                "site summary"
            );
        }
        tracing::info!(
            sites = run.len(),
            failed = run.failed_count(),
            "scrape run finished"
        );
        run
    }

    pub fn scrape_site(&mut self, site: &SiteConfig) -> SiteRecord {
        tracing::debug!(url = %site.url, kind = %site.kind, "scraping site");
        self.limiter.wait();

        let response = match self.fetcher.fetch(&site.url) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %site.url, kind = %site.kind, %err, "fetch failed");
                return SiteRecord::failed(
                    site.kind,
                    &site.url,
                    SiteError::new(ErrorStage::Fetch, err.to_string()),
                );
            }
        };

        match self.extractors.get(site.kind).extract(&response, &site.url) {
            Ok(record) => {
                tracing::info!(
                    url = %site.url,
                    kind = %site.kind,
                    items = record.item_count(),
                    "scraped site"
                );
                record
            }
            Err(err) => {
                tracing::warn!(url = %site.url, kind = %site.kind, %err, "extraction failed");
                SiteRecord::failed(
                    site.kind,
                    &site.url,
                    SiteError::new(ErrorStage::Extract, err.to_string()),
                )
            }
        }
    }
}
