use scraper::{ElementRef, Html};

use super::{ExtractError, Extractor, document_title, element_text, first_text, selector};
use crate::fetch::RawResponse;
use crate::formats::{Availability, BookEntry, SiteItems, SiteKind, SiteRecord};

const RATING_WORDS: [&str; 6] = ["Zero", "One", "Two", "Three", "Four", "Five"];

/// Book grids made of `article.product_pod` entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooksExtractor;

impl Extractor for BooksExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::BooksSite
    }

    fn extract(&self, response: &RawResponse, url: &str) -> Result<SiteRecord, ExtractError> {
        let document = Html::parse_document(&response.body);
        let product = selector("article.product_pod")?;
        let fields = BookSelectors {
            title: selector("h3 a")?,
            price: selector("p.price_color")?,
            rating: selector("p.star-rating")?,
            availability: selector("p.availability")?,
        };

        let books = document
            .select(&product)
            .map(|article| fields.book(&article))
            .collect();

        let title = document_title(&document)?
            .unwrap_or_else(|| SiteKind::BooksSite.default_title().to_owned());
        Ok(SiteRecord::new(url, title, SiteItems::BooksSite(books)))
    }
}

struct BookSelectors {
    title: scraper::Selector,
    price: scraper::Selector,
    rating: scraper::Selector,
    availability: scraper::Selector,
}

impl BookSelectors {
    fn book(&self, article: &ElementRef<'_>) -> BookEntry {
        // Grid anchors carry the full title; their text is often truncated.
        let title = article
            .select(&self.title)
            .next()
            .map(|anchor| match anchor.value().attr("title").map(str::trim) {
                Some(full) if !full.is_empty() => full.to_owned(),
                _ => element_text(&anchor),
            })
            .unwrap_or_default();

        let rating = article
            .select(&self.rating)
            .next()
            .map(|found| parse_rating(found.value().classes()))
            .unwrap_or(0);

        BookEntry {
            title,
            price: parse_price(&first_text(article, &self.price)),
            rating,
            availability: Availability::parse(&first_text(article, &self.availability)),
        }
    }
}

/// Keeps digits and `.` from a currency string; anything unparsable is 0.
pub fn parse_price(raw: &str) -> f64 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}

/// Maps a star-rating class word (`One`..`Five`) to 0..=5.
pub fn parse_rating<'a>(classes: impl IntoIterator<Item = &'a str>) -> u8 {
    classes
        .into_iter()
        .find_map(|class| RATING_WORDS.iter().position(|word| *word == class))
        .and_then(|index| u8::try_from(index).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::html_response;

    const LISTING: &str = r#"<!DOCTYPE html>
<html><head><title>
    All products | Books to Scrape - Sandbox
</title></head>
<body><ol class="row">
<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3">
  <article class="product_pod">
    <div class="image_container"><a href="catalogue/soumission_998/index.html"><img src="x.jpg" alt="Soumission"></a></div>
    <p class="star-rating Three"><i class="icon-star"></i></p>
    <h3><a href="catalogue/soumission_998/index.html" title="Soumission">Soumission</a></h3>
    <div class="product_price">
      <p class="price_color">£51.77</p>
      <p class="instock availability"><i class="icon-ok"></i>
        In stock
      </p>
    </div>
  </article>
</li>
<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3">
  <article class="product_pod">
    <p class="star-rating Five"></p>
    <h3><a href="catalogue/sharp-objects_997/index.html" title="Sharp Objects: A Novel of Suspense">Sharp Objects ...</a></h3>
    <div class="product_price">
      <p class="price_color">not for sale</p>
      <p class="availability">Out of stock</p>
    </div>
  </article>
</li>
<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3">
  <article class="product_pod">
    <h3><a href="catalogue/untitled/index.html">Untitled Zine</a></h3>
    <p class="price_color">Â£10.00</p>
    <p class="availability">Ask the shop</p>
  </article>
</li>
</ol></body></html>"#;

    fn books(record: &SiteRecord) -> &[BookEntry] {
        match record.items() {
            SiteItems::BooksSite(books) => books,
            other => panic!("expected book items, got {other:?}"),
        }
    }

    #[test]
    fn extracts_price_rating_and_availability() -> anyhow::Result<()> {
        let response = html_response("http://books.toscrape.com/", LISTING);
        let record = BooksExtractor.extract(&response, "http://books.toscrape.com/")?;

        assert_eq!(record.title, "All products | Books to Scrape - Sandbox");
        assert_eq!(record.item_count(), 3);
        assert_eq!(
            books(&record)[0],
            BookEntry {
                title: "Soumission".to_owned(),
                price: 51.77,
                rating: 3,
                availability: Availability::InStock,
            }
        );
        Ok(())
    }

    #[test]
    fn tolerates_malformed_fields() -> anyhow::Result<()> {
        let response = html_response("http://books.toscrape.com/", LISTING);
        let record = BooksExtractor.extract(&response, "http://books.toscrape.com/")?;
        let books = books(&record);

        assert_eq!(books[1].title, "Sharp Objects: A Novel of Suspense");
        assert_eq!(books[1].price, 0.0);
        assert_eq!(books[1].rating, 5);
        assert_eq!(books[1].availability, Availability::OutOfStock);

        assert_eq!(books[2].title, "Untitled Zine");
        assert_eq!(books[2].price, 10.0);
        assert_eq!(books[2].rating, 0);
        assert_eq!(books[2].availability, Availability::Unknown);
        Ok(())
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("£51.77"), 51.77);
        assert_eq!(parse_price(" 9 "), 9.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("1.2.3"), 0.0);
    }

    #[test]
    fn rating_parsing() {
        assert_eq!(parse_rating(["star-rating", "Four"]), 4);
        assert_eq!(parse_rating(["Zero", "star-rating"]), 0);
        assert_eq!(parse_rating(["star-rating", "Eleven"]), 0);
    }
}
