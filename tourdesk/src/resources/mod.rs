//! Resource definitions
//!
//! A [`Resource`] describes one entity the API exposes: which collection
//! backs it, how its payloads are validated, which fields must stay unique,
//! whether it nests under a parent route, and which related documents get
//! attached on single-document reads. The generic handlers are instantiated
//! per resource; everything entity-specific lives here.

mod review;
mod tour;
mod user;

pub use review::Review;
pub use tour::Tour;
pub use user::User;

use serde_json::Value;

use crate::store::{JsonMap, PopulateSpec, StoreError, StoreResult};

/// Whether a payload creates a document or patches an existing one.
///
/// Required-field checks only apply on create; a patch may legitimately
/// carry any subset of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Nesting of a resource under a parent route segment.
///
/// `path_param` names the parent id in the route path and `filter_field`
/// the document field holding that id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentScope {
    pub path_param: &'static str,
    pub filter_field: &'static str,
}

/// An API entity backed by one store collection
pub trait Resource {
    /// Backing collection name
    const COLLECTION: &'static str;

    /// Singular name, used as the envelope key for single documents
    const SINGULAR: &'static str;

    /// Plural name, used as the envelope key for lists
    const PLURAL: &'static str;

    /// Name of the id path parameter in this resource's routes
    const ID_PARAM: &'static str = "id";

    /// Fill in schema defaults a create payload omits, before validation
    fn apply_defaults(_payload: &mut JsonMap) {}

    /// Validate a payload before it reaches the store
    fn validate(payload: &JsonMap, mode: ValidationMode) -> StoreResult<()>;

    /// Fields that must be unique within the collection
    fn unique_fields() -> &'static [&'static str] {
        &[]
    }

    /// Parent route scope, for resources nested under another
    fn parent_scope() -> Option<ParentScope> {
        None
    }

    /// Related documents attached on single-document reads
    fn populate() -> &'static [PopulateSpec] {
        &[]
    }
}

/// Accumulates constraint violations across a payload.
///
/// Each check records a message and moves on, so one response reports every
/// violated constraint rather than just the first.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// On create, require the field to be present and non-null
    pub fn required(
        &mut self,
        payload: &JsonMap,
        mode: ValidationMode,
        field: &str,
        message: &str,
    ) -> &mut Self {
        if mode == ValidationMode::Create && payload.get(field).is_none_or(Value::is_null) {
            self.errors.push(message.to_string());
        }
        self
    }

    /// When present, the field must be a string of `min..=max` characters
    pub fn string_len(
        &mut self,
        payload: &JsonMap,
        field: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        if let Some(value) = payload.get(field) {
            let ok = value
                .as_str()
                .is_some_and(|s| (min..=max).contains(&s.chars().count()));
            if !ok {
                self.errors.push(message.to_string());
            }
        }
        self
    }

    /// When present, the field must be a number within `min..=max`
    pub fn number_range(
        &mut self,
        payload: &JsonMap,
        field: &str,
        min: f64,
        max: f64,
        message: &str,
    ) -> &mut Self {
        if let Some(value) = payload.get(field) {
            let ok = value.as_f64().is_some_and(|n| n >= min && n <= max);
            if !ok {
                self.errors.push(message.to_string());
            }
        }
        self
    }

    /// When present, the field must be one of the allowed string values
    pub fn one_of(
        &mut self,
        payload: &JsonMap,
        field: &str,
        allowed: &[&str],
        message: &str,
    ) -> &mut Self {
        if let Some(value) = payload.get(field) {
            let ok = value.as_str().is_some_and(|s| allowed.contains(&s));
            if !ok {
                self.errors.push(message.to_string());
            }
        }
        self
    }

    /// Record a violation detected by a caller-side check
    pub fn fail(&mut self, message: &str) -> &mut Self {
        self.errors.push(message.to_string());
        self
    }

    /// Succeed, or collapse the recorded violations into one error
    pub fn finish(self) -> StoreResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::validation(self.errors))
        }
    }
}
