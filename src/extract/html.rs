use scraper::Html;
use url::Url;

use super::{ExtractError, Extractor, document_title, element_text, selector};
use crate::fetch::RawResponse;
use crate::formats::{PageLink, PageOverview, SiteItems, SiteKind, SiteRecord};

const MAX_LINKS: usize = 10;

/// Title plus a shallow overview of a generic page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl Extractor for HtmlExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::HtmlDemo
    }

    fn extract(&self, response: &RawResponse, url: &str) -> Result<SiteRecord, ExtractError> {
        let document = Html::parse_document(&response.body);
        let title = document_title(&document)?
            .unwrap_or_else(|| SiteKind::HtmlDemo.default_title().to_owned());

        let base = Url::parse(&response.url).or_else(|_| Url::parse(url)).ok();
        let overview = page_overview(&document, base.as_ref())?;

        Ok(SiteRecord::new(
            url,
            title,
            SiteItems::HtmlDemo(vec![overview]),
        ))
    }
}

fn page_overview(document: &Html, base: Option<&Url>) -> Result<PageOverview, ExtractError> {
    let headings = selector("h1, h2, h3")?;
    let paragraphs = selector("p")?;
    let anchors = selector("a[href]")?;
    let body = selector("body")?;

    let text_root = document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element());

    Ok(PageOverview {
        headings: non_empty_texts(document, &headings),
        paragraphs: non_empty_texts(document, &paragraphs),
        links: document
            .select(&anchors)
            .take(MAX_LINKS)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                Some(PageLink {
                    text: element_text(&anchor),
                    url: resolve_href(base, href),
                })
            })
            .collect(),
        text_length: element_text(&text_root).chars().count(),
    })
}

fn non_empty_texts(document: &Html, selector: &scraper::Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|found| element_text(&found))
        .filter(|text| !text.is_empty())
        .collect()
}

fn resolve_href(base: Option<&Url>, href: &str) -> String {
    match base.and_then(|base| base.join(href).ok()) {
        Some(resolved) => resolved.to_string(),
        None => href.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::html_response;

    const MOBY_DICK: &str = r#"<!DOCTYPE html>
<html>
  <head><title> Herman Melville - Moby-Dick </title></head>
  <body>
    <h1>Herman Melville - Moby-Dick</h1>
    <div>
      <p>Availing himself of the mild, summer-cool weather.</p>
      <p>   </p>
      <p>It was not that the old man was sick.</p>
    </div>
    <a href="/chapters/2">Next chapter</a>
    <a href="https://example.org/whales">Whales</a>
  </body>
</html>"#;

    #[test]
    fn extracts_title_and_single_overview_item() -> anyhow::Result<()> {
        let response = html_response("https://httpbin.org/html", MOBY_DICK);
        let record = HtmlExtractor.extract(&response, "https://httpbin.org/html")?;

        assert_eq!(record.title, "Herman Melville - Moby-Dick");
        assert_eq!(record.kind(), SiteKind::HtmlDemo);
        assert_eq!(record.item_count(), 1);

        let SiteItems::HtmlDemo(items) = record.items() else {
            panic!("expected html items");
        };
        let overview = &items[0];
        assert_eq!(overview.headings, vec!["Herman Melville - Moby-Dick"]);
        assert_eq!(overview.paragraphs.len(), 2);
        assert_eq!(
            overview.links,
            vec![
                PageLink {
                    text: "Next chapter".to_owned(),
                    url: "https://httpbin.org/chapters/2".to_owned(),
                },
                PageLink {
                    text: "Whales".to_owned(),
                    url: "https://example.org/whales".to_owned(),
                },
            ]
        );
        assert!(overview.text_length > 0);
        Ok(())
    }

    #[test]
    fn missing_title_falls_back_to_placeholder() -> anyhow::Result<()> {
        let response = html_response("https://example.com/", "<p>untitled</p>");
        let record = HtmlExtractor.extract(&response, "https://example.com/")?;
        assert_eq!(record.title, "No title found");
        assert_eq!(record.item_count(), 1);
        Ok(())
    }

    #[test]
    fn keeps_at_most_ten_links() -> anyhow::Result<()> {
        let anchors: String = (0..25)
            .map(|i| format!(r#"<a href="/p/{i}">page {i}</a>"#))
            .collect();
        let response = html_response(
            "https://example.com/",
            &format!("<html><body>{anchors}</body></html>"),
        );
        let record = HtmlExtractor.extract(&response, "https://example.com/")?;
        let SiteItems::HtmlDemo(items) = record.items() else {
            panic!("expected html items");
        };
        assert_eq!(items[0].links.len(), MAX_LINKS);
        assert_eq!(items[0].links[9].url, "https://example.com/p/9");
        Ok(())
    }
}
