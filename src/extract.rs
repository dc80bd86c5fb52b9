pub mod api;
pub mod books;
pub mod html;
pub mod quotes;

use scraper::{ElementRef, Html, Selector};

use crate::fetch::RawResponse;
use crate::formats::{SiteKind, SiteRecord};

pub use api::ApiExtractor;
pub use books::BooksExtractor;
pub use html::HtmlExtractor;
pub use quotes::QuotesExtractor;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
}

/// Turns one fetched response into a typed record for its site kind.
pub trait Extractor {
    fn kind(&self) -> SiteKind;

    fn extract(&self, response: &RawResponse, url: &str) -> Result<SiteRecord, ExtractError>;
}

/// One extractor per site kind, looked up by the site's `type` tag.
#[derive(Debug, Clone)]
pub struct Extractors {
    html: HtmlExtractor,
    quotes: QuotesExtractor,
    books: BooksExtractor,
    api: ApiExtractor,
}

impl Extractors {
    pub fn new(api_item_limit: Option<usize>) -> Self {
        Self {
            html: HtmlExtractor,
            quotes: QuotesExtractor,
            books: BooksExtractor,
            api: ApiExtractor::new(api_item_limit),
        }
    }

    pub fn get(&self, kind: SiteKind) -> &dyn Extractor {
        match kind {
            SiteKind::HtmlDemo => &self.html,
            SiteKind::QuotesSite => &self.quotes,
            SiteKind::BooksSite => &self.books,
            SiteKind::ApiDemo => &self.api,
        }
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css)
        .map_err(|err| ExtractError::StructuralMismatch(format!("selector `{css}`: {err}")))
}

/// Element text with whitespace runs collapsed to single spaces.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

pub(crate) fn first_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|found| element_text(&found))
        .unwrap_or_default()
}

pub(crate) fn document_title(document: &Html) -> Result<Option<String>, ExtractError> {
    let title = selector("title")?;
    Ok(document
        .select(&title)
        .next()
        .map(|found| element_text(&found))
        .filter(|text| !text.is_empty()))
}

#[cfg(test)]
pub(crate) fn html_response(url: &str, body: &str) -> RawResponse {
    RawResponse {
        url: url.to_owned(),
        content_type: Some("text/html; charset=utf-8".to_owned()),
        body: body.to_owned(),
    }
}
