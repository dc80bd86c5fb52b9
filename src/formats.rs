use std::collections::BTreeSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SiteKind {
    HtmlDemo,
    QuotesSite,
    BooksSite,
    ApiDemo,
}

impl SiteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HtmlDemo => "html_demo",
            Self::QuotesSite => "quotes_site",
            Self::BooksSite => "books_site",
            Self::ApiDemo => "api_demo",
        }
    }

    /// Title used when the page has none, and for error records.
    pub fn default_title(self) -> &'static str {
        match self {
            Self::HtmlDemo => "No title found",
            Self::QuotesSite => "Quotes to Scrape",
            Self::BooksSite => "Books to Scrape",
            Self::ApiDemo => "JSON API Data",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteEntry {
    pub text: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl QuoteEntry {
    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

// Tags compare as a set; display order is only kept for output.
impl PartialEq for QuoteEntry {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.author == other.author && self.tag_set() == other.tag_set()
    }
}

impl Eq for QuoteEntry {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    pub fn parse(status: &str) -> Self {
        let status = status.to_lowercase();
        if status.contains("out of stock") {
            Self::OutOfStock
        } else if status.contains("in stock") {
            Self::InStock
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub title: String,
    pub price: f64,
    pub rating: u8,
    pub availability: Availability,
}

/// One element of a JSON API response, keys kept in response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiEntry(pub Map<String, Value>);

impl ApiEntry {
    /// Objects are taken as-is; any other value is stored under `value`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_owned(), other);
                Self(map)
            }
        }
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOverview {
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    pub links: Vec<PageLink>,
    pub text_length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SiteItems {
    HtmlDemo(Vec<PageOverview>),
    QuotesSite(Vec<QuoteEntry>),
    BooksSite(Vec<BookEntry>),
    ApiDemo(Vec<ApiEntry>),
}

impl SiteItems {
    pub fn empty(kind: SiteKind) -> Self {
        match kind {
            SiteKind::HtmlDemo => Self::HtmlDemo(Vec::new()),
            SiteKind::QuotesSite => Self::QuotesSite(Vec::new()),
            SiteKind::BooksSite => Self::BooksSite(Vec::new()),
            SiteKind::ApiDemo => Self::ApiDemo(Vec::new()),
        }
    }

    pub fn kind(&self) -> SiteKind {
        match self {
            Self::HtmlDemo(_) => SiteKind::HtmlDemo,
            Self::QuotesSite(_) => SiteKind::QuotesSite,
            Self::BooksSite(_) => SiteKind::BooksSite,
            Self::ApiDemo(_) => SiteKind::ApiDemo,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::HtmlDemo(items) => items.len(),
            Self::QuotesSite(items) => items.len(),
            Self::BooksSite(items) => items.len(),
            Self::ApiDemo(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_values(kind: SiteKind, values: Vec<Value>) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            SiteKind::HtmlDemo => Self::HtmlDemo(typed(values)?),
            SiteKind::QuotesSite => Self::QuotesSite(typed(values)?),
            SiteKind::BooksSite => Self::BooksSite(typed(values)?),
            SiteKind::ApiDemo => Self::ApiDemo(typed(values)?),
        })
    }
}

fn typed<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    values.into_iter().map(serde_json::from_value).collect()
}

impl Serialize for SiteItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::HtmlDemo(items) => items.serialize(serializer),
            Self::QuotesSite(items) => items.serialize(serializer),
            Self::BooksSite(items) => items.serialize(serializer),
            Self::ApiDemo(items) => items.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStage {
    Fetch,
    Extract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteError {
    pub stage: ErrorStage,
    pub message: String,
}

impl SiteError {
    pub fn new(stage: ErrorStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Result of scraping one site.
///
/// `item_count` is never stored: it is computed from `items` when
/// serializing and checked against `items` when deserializing. An error
/// record always carries an empty item list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSiteRecord")]
pub struct SiteRecord {
    pub url: String,
    pub title: String,
    pub retrieved_at: String,
    items: SiteItems,
    error: Option<SiteError>,
}

impl SiteRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, items: SiteItems) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            retrieved_at: chrono::Utc::now().to_rfc3339(),
            items,
            error: None,
        }
    }

    pub fn failed(kind: SiteKind, url: impl Into<String>, error: SiteError) -> Self {
        Self {
            url: url.into(),
            title: kind.default_title().to_owned(),
            retrieved_at: chrono::Utc::now().to_rfc3339(),
            items: SiteItems::empty(kind),
            error: Some(error),
        }
    }

    pub fn kind(&self) -> SiteKind {
        self.items.kind()
    }

    pub fn items(&self) -> &SiteItems {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn error(&self) -> Option<&SiteError> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl Serialize for SiteRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SiteRecord", 7)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("type", &self.kind())?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("item_count", &self.item_count())?;
        state.serialize_field("retrieved_at", &self.retrieved_at)?;
        match &self.error {
            Some(error) => state.serialize_field("error", error)?,
            None => state.skip_field("error")?,
        }
        state.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid items for {kind}: {source}")]
    Items {
        kind: SiteKind,
        source: serde_json::Error,
    },
    #[error("item_count {declared} does not match {actual} items")]
    CountMismatch { declared: usize, actual: usize },
    #[error("error record must not carry items (found {0})")]
    ErrorWithItems(usize),
}

#[derive(Deserialize)]
struct RawSiteRecord {
    url: String,
    title: String,
    #[serde(rename = "type")]
    kind: SiteKind,
    #[serde(default)]
    items: Vec<Value>,
    item_count: usize,
    retrieved_at: String,
    #[serde(default)]
    error: Option<SiteError>,
}

impl TryFrom<RawSiteRecord> for SiteRecord {
    type Error = RecordError;

    fn try_from(raw: RawSiteRecord) -> Result<Self, Self::Error> {
        let actual = raw.items.len();
        if raw.item_count != actual {
            return Err(RecordError::CountMismatch {
                declared: raw.item_count,
                actual,
            });
        }
        if raw.error.is_some() && actual > 0 {
            return Err(RecordError::ErrorWithItems(actual));
        }

        let items = SiteItems::from_values(raw.kind, raw.items).map_err(|source| {
            RecordError::Items {
                kind: raw.kind,
                source,
            }
        })?;

        Ok(Self {
            url: raw.url,
            title: raw.title,
            retrieved_at: raw.retrieved_at,
            items,
            error: raw.error,
        })
    }
}

/// All records of one invocation, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrapeRun {
    pub records: Vec<SiteRecord>,
}

impl ScrapeRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SiteRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub url: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SiteKind,
    pub item_count: usize,
}

impl From<&SiteRecord> for SummaryRow {
    fn from(record: &SiteRecord) -> Self {
        Self {
            url: record.url.clone(),
            title: record.title.clone(),
            kind: record.kind(),
            item_count: record.item_count(),
        }
    }
}
