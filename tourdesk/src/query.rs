//! Query shaping
//!
//! Translates raw request query parameters into a shaped [`FindQuery`].
//! Four control keys (`page`, `sort`, `limit`, `fields`) steer pagination,
//! ordering and projection; every other parameter is a filter condition.
//! Comparison suffixes in bracket form (`duration[gte]=5`) are rewritten to
//! the store's `$`-prefixed operators.
//!
//! Shaping stages chain on [`QueryShaper`] in any order:
//!
//! ```rust,ignore
//! let query = QueryShaper::new(collection.find(), description)
//!     .filter()
//!     .sort()
//!     .limit_fields()
//!     .paginate()
//!     .into_query();
//! ```

use std::collections::HashMap;

use serde_json::Value;

use crate::store::{FindQuery, JsonMap, Projection, SortSpec, VERSION_FIELD};

/// Parameters consumed by shaping stages, never forwarded as filters
pub const CONTROL_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Comparison suffixes rewritten to `$`-prefixed store operators
pub const COMPARISON_OPERATORS: [&str; 4] = ["gte", "gt", "lte", "lt"];

/// Page number used when `page` is absent, zero or unparsable
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when `limit` is absent, zero or unparsable
pub const DEFAULT_LIMIT: u64 = 100;

/// Ordering applied when `sort` is absent: newest first
pub const DEFAULT_SORT: &str = "-createdAt";

/// A request's query parameters, decoded but not yet interpreted
#[derive(Debug, Clone, Default)]
pub struct QueryDescription {
    params: HashMap<String, String>,
}

impl QueryDescription {
    /// Wrap decoded query parameters
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Set a parameter, replacing any existing value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Look up a raw parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Build the filter predicate: every non-control parameter, with known
    /// comparison suffixes rewritten to `$`-operators.
    ///
    /// Unknown bracket suffixes pass through unrewritten; the store ignores
    /// operators it does not recognize.
    pub fn filter_predicate(&self) -> JsonMap {
        let mut predicate = JsonMap::new();
        for (key, value) in &self.params {
            if CONTROL_KEYS.contains(&key.as_str()) {
                continue;
            }
            match parse_bracket(key) {
                Some((field, op)) => {
                    let op = if COMPARISON_OPERATORS.contains(&op) {
                        format!("${op}")
                    } else {
                        op.to_string()
                    };
                    let entry = predicate
                        .entry(field.to_string())
                        .or_insert_with(|| Value::Object(JsonMap::new()));
                    if let Some(ops) = entry.as_object_mut() {
                        ops.insert(op, Value::String(value.clone()));
                    }
                }
                None => {
                    predicate.insert(key.clone(), Value::String(value.clone()));
                }
            }
        }
        predicate
    }

    /// Sort order: the `sort` parameter, or newest-first when absent
    pub fn sort_spec(&self) -> SortSpec {
        match self.get("sort") {
            Some(sort) if !sort.trim().is_empty() => SortSpec::parse(sort),
            _ => SortSpec::parse(DEFAULT_SORT),
        }
    }

    /// Projection: the `fields` list when given, otherwise everything except
    /// the version marker
    pub fn projection(&self) -> Projection {
        match self.get("fields") {
            Some(fields) if !fields.trim().is_empty() => Projection::include_fields(fields),
            _ => Projection::exclude_fields(VERSION_FIELD),
        }
    }

    /// Requested page, falling back to page 1 for zero or garbage input
    pub fn page(&self) -> u64 {
        self.positive_or("page", DEFAULT_PAGE)
    }

    /// Requested page size, falling back to the default for zero or garbage
    pub fn limit(&self) -> u64 {
        self.positive_or("limit", DEFAULT_LIMIT)
    }

    fn positive_or(&self, key: &str, default: u64) -> u64 {
        self.get(key)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    }
}

/// Applies shaping stages from a [`QueryDescription`] onto a [`FindQuery`]
#[derive(Debug)]
pub struct QueryShaper {
    query: FindQuery,
    description: QueryDescription,
}

impl QueryShaper {
    /// Pair a fresh query with the request's parameters
    pub fn new(query: FindQuery, description: QueryDescription) -> Self {
        Self { query, description }
    }

    /// Apply the filter predicate derived from non-control parameters
    #[must_use]
    pub fn filter(mut self) -> Self {
        self.query = self.query.filter(self.description.filter_predicate());
        self
    }

    /// Apply the requested (or default) sort order
    #[must_use]
    pub fn sort(mut self) -> Self {
        self.query = self.query.sort(self.description.sort_spec());
        self
    }

    /// Apply the requested (or default) field projection
    #[must_use]
    pub fn limit_fields(mut self) -> Self {
        self.query = self.query.select(self.description.projection());
        self
    }

    /// Apply skip and limit from the `page` and `limit` parameters.
    ///
    /// Saturates instead of overflowing: an absurdly large page is just a
    /// page past the end, which yields an empty list.
    #[must_use]
    pub fn paginate(mut self) -> Self {
        let page = self.description.page();
        let limit = self.description.limit();
        let skip = (page - 1).saturating_mul(limit);
        self.query = self
            .query
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .limit(usize::try_from(limit).unwrap_or(usize::MAX));
        self
    }

    /// Finish shaping, yielding the query ready to run
    pub fn into_query(self) -> FindQuery {
        self.query
    }
}

/// Split `duration[gte]` into `("duration", "gte")`
fn parse_bracket(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let inner = key.get(open + 1..)?.strip_suffix(']')?;
    if open == 0 || inner.is_empty() {
        return None;
    }
    Some((&key[..open], inner))
}
