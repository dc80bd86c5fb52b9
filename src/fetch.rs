use std::error::Error as _;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

const ACCEPT_HTML_OR_JSON: &str =
    "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL after redirects.
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// Single-attempt HTTP GET with a fixed header set and a finite timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }

    pub fn fetch(&self, url: &str) -> Result<RawResponse, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::Network(format!("invalid url {url}: {err}")))?;

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, ACCEPT_HTML_OR_JSON)
            .send()
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().map_err(classify)?;

        tracing::debug!(url = %final_url, status = status.as_u16(), bytes = body.len(), "fetched");
        Ok(RawResponse {
            url: final_url,
            content_type,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() || has_timed_out_source(&err) {
        return FetchError::Timeout;
    }
    if let Some(status) = err.status() {
        return FetchError::HttpStatus(status.as_u16());
    }
    FetchError::Network(error_chain(&err))
}

fn has_timed_out_source(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>()
            && io.kind() == std::io::ErrorKind::TimedOut
        {
            return true;
        }
        source = cause.source();
    }
    false
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
