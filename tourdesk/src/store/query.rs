//! Chainable read queries
//!
//! [`FindQuery`] is the store's query handle: a not-yet-executed read
//! operation built up by chaining transformations, consumed exactly once by
//! [`FindQuery::run`].
//!
//! # Example
//!
//! ```rust,ignore
//! let tours = store
//!     .collection("tours")
//!     .find()
//!     .filter(predicate)
//!     .sort(SortSpec::parse("-price"))
//!     .select(Projection::include_fields("name,price"))
//!     .skip(0)
//!     .limit(2)
//!     .run()
//!     .await?;
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use super::filter::{compare, matches};
use super::{Collection, JsonMap, StoreResult, ID_FIELD};

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

/// Ordered list of sort keys with per-field direction
///
/// Parsed from the comma-separated request form where a leading `-` marks a
/// descending field: `"price,-rating"` sorts by ascending price, then
/// descending rating.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    keys: Vec<(String, SortOrder)>,
}

impl SortSpec {
    /// Parse a comma-separated sort expression, preserving field order
    pub fn parse(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|field| match field.strip_prefix('-') {
                Some(name) => (name.to_string(), SortOrder::Descending),
                None => (field.to_string(), SortOrder::Ascending),
            })
            .collect();
        Self { keys }
    }

    /// The parsed sort keys in application order
    pub fn keys(&self) -> &[(String, SortOrder)] {
        &self.keys
    }

    /// True when no sort keys were given
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn compare_docs(&self, a: &JsonMap, b: &JsonMap) -> Ordering {
        for (field, order) in &self.keys {
            let ordering = match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for SortSpec {
    /// Renders the space-separated form: `"price -rating"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .keys
            .iter()
            .map(|(field, order)| match order {
                SortOrder::Ascending => field.clone(),
                SortOrder::Descending => format!("-{field}"),
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// Field projection applied to each returned document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// Return every field
    #[default]
    All,
    /// Return only the named fields; the document identifier is always kept
    Include(Vec<String>),
    /// Return every field except the named ones
    Exclude(Vec<String>),
}

impl Projection {
    /// Build an inclusive projection from a comma-separated field list
    pub fn include_fields(csv: &str) -> Self {
        Self::Include(split_csv(csv))
    }

    /// Build an exclusive projection from a comma-separated field list
    pub fn exclude_fields(csv: &str) -> Self {
        Self::Exclude(split_csv(csv))
    }

    pub(crate) fn apply(&self, doc: &JsonMap) -> JsonMap {
        match self {
            Self::All => doc.clone(),
            Self::Include(fields) => {
                let mut out = JsonMap::new();
                if let Some(id) = doc.get(ID_FIELD) {
                    out.insert(ID_FIELD.to_string(), id.clone());
                }
                for field in fields {
                    if let Some(value) = doc.get(field) {
                        out.insert(field.clone(), value.clone());
                    }
                }
                out
            }
            Self::Exclude(fields) => {
                let mut out = doc.clone();
                for field in fields {
                    out.remove(field);
                }
                out
            }
        }
    }
}

fn split_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A not-yet-executed read operation against one collection
///
/// Every transformation consumes and returns the handle so calls compose
/// left-to-right; `run` executes the query and consumes the handle.
#[derive(Debug, Clone)]
pub struct FindQuery {
    collection: Collection,
    pub(crate) predicate: JsonMap,
    pub(crate) sort_spec: SortSpec,
    pub(crate) projection: Projection,
    pub(crate) skip_count: usize,
    pub(crate) limit_count: Option<usize>,
}

impl FindQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        Self {
            collection,
            predicate: JsonMap::new(),
            sort_spec: SortSpec::default(),
            projection: Projection::default(),
            skip_count: 0,
            limit_count: None,
        }
    }

    /// Merge conditions into the filter predicate
    #[must_use]
    pub fn filter(mut self, predicate: JsonMap) -> Self {
        self.predicate.extend(predicate);
        self
    }

    /// Set the sort order
    #[must_use]
    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort_spec = spec;
        self
    }

    /// Set the field projection
    #[must_use]
    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Skip the first `n` matching documents
    #[must_use]
    pub fn skip(mut self, n: usize) -> Self {
        self.skip_count = n;
        self
    }

    /// Return at most `n` documents
    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit_count = Some(n);
        self
    }

    /// Execute the query.
    ///
    /// A skip past the end of the collection yields an empty result set, not
    /// an error.
    pub async fn run(self) -> StoreResult<Vec<Value>> {
        let docs = self.collection.snapshot().await;

        let mut matched: Vec<JsonMap> = docs
            .into_iter()
            .filter(|doc| matches(doc, &self.predicate))
            .collect();

        if !self.sort_spec.is_empty() {
            matched.sort_by(|a, b| self.sort_spec.compare_docs(a, b));
        }

        let results = matched
            .into_iter()
            .skip(self.skip_count)
            .take(self.limit_count.unwrap_or(usize::MAX))
            .map(|doc| Value::Object(self.projection.apply(&doc)))
            .collect();

        Ok(results)
    }
}
