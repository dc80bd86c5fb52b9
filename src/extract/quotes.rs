use scraper::Html;

use super::{ExtractError, Extractor, document_title, element_text, first_text, selector};
use crate::fetch::RawResponse;
use crate::formats::{QuoteEntry, SiteItems, SiteKind, SiteRecord};

/// Quote listing pages (`div.quote` blocks). Only the fetched page is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotesExtractor;

impl Extractor for QuotesExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::QuotesSite
    }

    fn extract(&self, response: &RawResponse, url: &str) -> Result<SiteRecord, ExtractError> {
        let document = Html::parse_document(&response.body);
        let block = selector("div.quote")?;
        let text = selector("span.text")?;
        let author = selector("small.author")?;
        let tag = selector("a.tag")?;

        let quotes: Vec<QuoteEntry> = document
            .select(&block)
            .map(|quote| QuoteEntry {
                text: first_text(&quote, &text),
                author: first_text(&quote, &author),
                tags: quote
                    .select(&tag)
                    .map(|found| element_text(&found))
                    .filter(|t| !t.is_empty())
                    .collect(),
            })
            .collect();

        let incomplete = quotes
            .iter()
            .filter(|q| q.text.is_empty() || q.author.is_empty())
            .count();
        if incomplete > 0 {
            tracing::debug!(url, incomplete, "quote blocks with missing text or author");
        }

        let title = document_title(&document)?
            .unwrap_or_else(|| SiteKind::QuotesSite.default_title().to_owned());
        Ok(SiteRecord::new(url, title, SiteItems::QuotesSite(quotes)))
    }
}
