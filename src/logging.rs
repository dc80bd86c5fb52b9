use std::io::IsTerminal as _;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Our own events at `info`; dependencies (html5ever, reqwest, ...) only
/// surface warnings unless `RUST_LOG` says otherwise.
const DEFAULT_DIRECTIVES: &str = "warn,sitescrape=info";

/// Logs go to stderr so `scrape` can print its JSON record on stdout and
/// `run` its site summary. Colors only when stderr is a terminal.
pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter()?)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))
}

fn filter() -> anyhow::Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("parse {}={directives}", EnvFilter::DEFAULT_ENV)),
        _ => EnvFilter::try_new(DEFAULT_DIRECTIVES).context("build default log filter"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        let filter = EnvFilter::try_new(DEFAULT_DIRECTIVES).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("sitescrape=info"), "{rendered}");
        assert!(rendered.contains("warn"), "{rendered}");
    }
}
