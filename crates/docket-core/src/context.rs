//! Request-scoped parameters.
//!
//! [`RequestContext`] is the typed key/value bag a request handler fills in
//! (sorting, paging, field selection). [`QueryParams`] is a parsed URL query
//! string consumed by the filter appenders.

use std::collections::HashMap;

/// Well-known context keys.
pub mod keys {
    pub const ORDER_BY: &str = "order_by";
    pub const ORDER: &str = "order";
    pub const PAGE_INDEX: &str = "page_index";
    pub const COUNT_PER_PAGE: &str = "count_per_page";
    pub const FIELDS: &str = "fields";
    pub const SKIP: &str = "skip";
    pub const LIMIT: &str = "limit";
    pub const PROJECTION: &str = "projection";
}

/// A value stored in a [`RequestContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Str(String),
    Int(i64),
}

/// Typed lookup of request parameters.
///
/// # Example
///
/// ```
/// use docket_core::RequestContext;
///
/// let ctx = RequestContext::new()
///     .with_str("order_by", "created_at")
///     .with_int("limit", 20);
///
/// assert_eq!(ctx.get_str("order_by"), "created_at");
/// assert_eq!(ctx.get_int("limit"), 20);
/// assert_eq!(ctx.get_int("order_by"), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    values: HashMap<String, ContextValue>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_str(key, value);
        self
    }

    pub fn with_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.set_int(key, value);
        self
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), ContextValue::Str(value.into()));
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), ContextValue::Int(value));
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// String value, or `""` when missing or stored as an int.
    pub fn get_str(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(ContextValue::Str(s)) => s,
            _ => "",
        }
    }

    /// Int value, or `0` when missing or stored as a string.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(ContextValue::Int(n)) => *n,
            _ => 0,
        }
    }
}

/// A parsed URL query string. The first occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse `a=1&b=two` (with or without a leading `?`), percent-decoding
    /// keys and values.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value for `key`, or `""`.
    pub fn get(&self, key: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_typed_lookup() {
        let ctx = RequestContext::new()
            .with_str(keys::ORDER, "desc")
            .with_int(keys::SKIP, 5);

        assert_eq!(ctx.get_str(keys::ORDER), "desc");
        assert_eq!(ctx.get_int(keys::SKIP), 5);
        assert_eq!(ctx.get_str(keys::SKIP), "");
        assert_eq!(ctx.get_int(keys::ORDER), 0);
        assert_eq!(ctx.get_str("missing"), "");
        assert_eq!(ctx.get_int("missing"), 0);
    }

    #[test]
    fn query_params_decode_and_first_wins() {
        let params = QueryParams::parse("?title=hello%20world&tag=a&tag=b&empty=");
        assert_eq!(params.get("title"), "hello world");
        assert_eq!(params.get("tag"), "a");
        assert_eq!(params.get("empty"), "");
        assert_eq!(params.get("missing"), "");
    }

    #[test]
    fn query_params_plus_is_space() {
        let params = QueryParams::parse("name=mya+mya");
        assert_eq!(params.get("name"), "mya mya");
    }
}
