//! The tour resource

use serde_json::{json, Value};

use crate::store::{JsonMap, PopulateSpec, StoreResult};

use super::{ParentScope, Resource, ValidationMode, Validator};

const DIFFICULTIES: [&str; 3] = ["easy", "medium", "difficult"];

/// A bookable tour: the API's central entity
pub struct Tour;

impl Resource for Tour {
    const COLLECTION: &'static str = "tours";
    const SINGULAR: &'static str = "tour";
    const PLURAL: &'static str = "tours";

    // Tour routes nest a reviews router at the same path depth as the
    // single-tour route, so both must agree on the parameter name.
    const ID_PARAM: &'static str = "tour_id";

    fn apply_defaults(payload: &mut JsonMap) {
        payload
            .entry("ratingsAverage")
            .or_insert_with(|| json!(4.5));
        payload.entry("ratingsQuantity").or_insert_with(|| json!(0));
        payload
            .entry("images")
            .or_insert_with(|| Value::Array(vec![]));
        payload
            .entry("startDates")
            .or_insert_with(|| Value::Array(vec![]));
    }

    fn validate(payload: &JsonMap, mode: ValidationMode) -> StoreResult<()> {
        let mut v = Validator::new();
        v.required(payload, mode, "name", "A tour must have a name")
            .required(payload, mode, "duration", "A tour must have a duration")
            .required(
                payload,
                mode,
                "maxGroupSize",
                "A tour must have a group size",
            )
            .required(payload, mode, "difficulty", "A tour must have a difficulty")
            .required(payload, mode, "price", "A tour must have a price")
            .required(payload, mode, "summary", "A tour must have a summary")
            .required(
                payload,
                mode,
                "imageCover",
                "A tour must have a cover image",
            )
            .string_len(
                payload,
                "name",
                10,
                40,
                "A tour name must have more or equal then 10 characters and less or equal then 40 characters",
            )
            .one_of(
                payload,
                "difficulty",
                &DIFFICULTIES,
                "Difficulty is either: easy, medium, difficult",
            )
            .number_range(
                payload,
                "ratingsAverage",
                1.0,
                5.0,
                "Rating must be above 1.0 and below 5.0",
            );

        // The discount check needs both fields, so it only fires when the
        // payload carries them together.
        if let (Some(discount), Some(price)) = (
            payload.get("priceDiscount").and_then(|d| d.as_f64()),
            payload.get("price").and_then(|p| p.as_f64()),
        ) {
            if discount >= price {
                v.fail(&format!(
                    "Discount price ({discount}) should be below regular price"
                ));
            }
        }

        v.finish()
    }

    fn unique_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn parent_scope() -> Option<ParentScope> {
        None
    }

    fn populate() -> &'static [PopulateSpec] {
        &[
            PopulateSpec::Reference {
                field: "guides",
                collection: "users",
            },
            PopulateSpec::Virtual {
                attach_as: "reviews",
                collection: "reviews",
                foreign_field: "tour",
            },
        ]
    }
}
