//! The user resource

use serde_json::{json, Value};

use crate::store::{JsonMap, StoreResult};

use super::{Resource, ValidationMode, Validator};

const ROLES: [&str; 4] = ["user", "guide", "lead-guide", "admin"];

/// An account that can author reviews or guide tours
pub struct User;

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";

    fn apply_defaults(payload: &mut JsonMap) {
        payload.entry("role").or_insert_with(|| json!("user"));
        payload
            .entry("photo")
            .or_insert_with(|| json!("default.jpg"));
        payload.entry("active").or_insert(Value::Bool(true));
    }

    fn validate(payload: &JsonMap, mode: ValidationMode) -> StoreResult<()> {
        let mut v = Validator::new();
        v.required(payload, mode, "name", "Please tell us your name!")
            .required(payload, mode, "email", "Please provide your email")
            .one_of(
                payload,
                "role",
                &ROLES,
                "Role is either: user, guide, lead-guide, admin",
            );

        if let Some(email) = payload.get("email") {
            let ok = email
                .as_str()
                .is_some_and(|s| s.contains('@') && !s.starts_with('@') && !s.ends_with('@'));
            if !ok {
                v.fail("Please provide a valid email");
            }
        }

        if payload
            .get("active")
            .is_some_and(|a| !matches!(a, Value::Bool(_)))
        {
            v.fail("Active must be true or false");
        }

        v.finish()
    }

    fn unique_fields() -> &'static [&'static str] {
        &["email"]
    }
}
