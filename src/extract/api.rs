use serde_json::Value;

use super::{ExtractError, Extractor};
use crate::fetch::RawResponse;
use crate::formats::{ApiEntry, SiteItems, SiteKind, SiteRecord};

/// JSON API responses: an array becomes one entry per element, an object a
/// single entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiExtractor {
    item_limit: Option<usize>,
}

impl ApiExtractor {
    pub fn new(item_limit: Option<usize>) -> Self {
        Self { item_limit }
    }
}

impl Extractor for ApiExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::ApiDemo
    }

    fn extract(&self, response: &RawResponse, url: &str) -> Result<SiteRecord, ExtractError> {
        let content_type = response.content_type.as_deref();
        if !is_json_content_type(content_type) {
            tracing::debug!(url, content_type, "api response is not labelled as json");
        }
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|err| ExtractError::InvalidFormat(err.to_string()))?;

        let entries = match value {
            Value::Array(elements) => {
                let total = elements.len();
                let limit = self.item_limit.unwrap_or(usize::MAX);
                if total > limit {
                    tracing::debug!(url, total, limit, "truncating api response");
                }
                elements
                    .into_iter()
                    .take(limit)
                    .map(ApiEntry::from_value)
                    .collect()
            }
            Value::Object(map) => vec![ApiEntry(map)],
            other => {
                return Err(ExtractError::StructuralMismatch(format!(
                    "expected a JSON array or object, got {}",
                    json_type(&other)
                )));
            }
        };

        Ok(SiteRecord::new(
            url,
            SiteKind::ApiDemo.default_title(),
            SiteItems::ApiDemo(entries),
        ))
    }
}

/// Matches `application/json` and `+json` suffix types like
/// `application/ld+json`, ignoring parameters.
pub(crate) fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
