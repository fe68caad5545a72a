//! Parsed request input consumed by the translator.

use url::form_urlencoded;

/// An insertion-ordered multi-map of query parameters.
///
/// A key may appear more than once; WHERE synthesis emits one clause per
/// entry in the order the pairs arrived.
#[derive(Debug, Clone, Default)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// Build from already-decoded pairs. Used by tests and internal
    /// callers.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in insertion order.
    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Keys beginning with an underscore configure the translator instead of
/// filtering rows (`_select`, `_count`, `_order`, `_join`, `_page`,
/// `_page_size`, `_groupby`, `_renderer`, ...).
pub fn is_reserved_param(key: &str) -> bool {
    key.starts_with('_')
}
