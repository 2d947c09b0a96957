//! The review resource
//!
//! Reviews belong to a tour and are reachable both at `/reviews` and nested
//! under `/tours/{tour_id}/reviews`. The parent scope wires the nested form:
//! listing filters on the owning tour and creation fills in the `tour` field
//! from the path when the body omits it.

use crate::store::{JsonMap, PopulateSpec, StoreResult};

use super::{ParentScope, Resource, ValidationMode, Validator};

/// A rating and write-up left on a tour by a user
pub struct Review;

impl Resource for Review {
    const COLLECTION: &'static str = "reviews";
    const SINGULAR: &'static str = "review";
    const PLURAL: &'static str = "reviews";

    fn validate(payload: &JsonMap, mode: ValidationMode) -> StoreResult<()> {
        let mut v = Validator::new();
        v.required(payload, mode, "review", "Review can not be empty!")
            .required(payload, mode, "rating", "A review must have a rating")
            .required(payload, mode, "tour", "Review must belong to a tour.")
            .required(payload, mode, "user", "Review must belong to a user")
            .number_range(payload, "rating", 1.0, 5.0, "Rating must be between 1 and 5");
        v.finish()
    }

    fn parent_scope() -> Option<ParentScope> {
        Some(ParentScope {
            path_param: "tour_id",
            filter_field: "tour",
        })
    }

    fn populate() -> &'static [PopulateSpec] {
        &[PopulateSpec::Reference {
            field: "user",
            collection: "users",
        }]
    }
}
