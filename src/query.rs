//! Query-string parameters and recognized-option partitioning.

use indexmap::IndexMap;

use crate::url::unquote_plus;

/// Decoded query parameters, in first-occurrence order.
///
/// A key may repeat in a query string; every resolver only consults the
/// first value, so later occurrences are dropped at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, String>,
}

impl QueryParams {
    /// Parse a raw query string.
    ///
    /// Pairs are split on `&`. A pair without `=` or with an empty raw
    /// value is skipped; keys and values are percent+plus decoded.
    pub fn parse(query: &str) -> Self {
        let mut params = IndexMap::new();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            params
                .entry(unquote_plus(key))
                .or_insert_with(|| unquote_plus(value));
        }
        Self { params }
    }

    /// First value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether any parameter was parsed.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Split parameters into promoted and opaque halves.
    ///
    /// Membership in `recognized` is tested on the uppercased key.
    /// Promoted entries carry the uppercased key; opaque entries keep the
    /// key as written, since casing policy differs per family.
    pub fn partition<'a>(
        &'a self,
        recognized: &[&str],
    ) -> (Vec<(String, &'a str)>, Vec<(String, &'a str)>) {
        let mut promoted = Vec::new();
        let mut opaque = Vec::new();
        for (key, value) in self.iter() {
            let upper = key.to_uppercase();
            if recognized.contains(&upper.as_str()) {
                promoted.push((upper, value));
            } else {
                opaque.push((key.to_string(), value));
            }
        }
        (promoted, opaque)
    }
}
