//! Generic resource handlers
//!
//! One set of handler functions serves every resource. Each is generic over
//! [`Resource`] and instantiated per entity in the routers, so adding a new
//! resource means writing its `Resource` impl and three router lines, not
//! another CRUD module.
//!
//! Nested routes work through the resource's parent scope: listing under a
//! parent filters on the owning document's id, and creation fills the
//! ownership field from the path when the body leaves it out.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use crate::envelope::{Envelope, NoContent};
use crate::error::{Error, Result};
use crate::query::{QueryDescription, QueryShaper};
use crate::resources::{Resource, ValidationMode};
use crate::state::AppState;
use crate::store::JsonMap;

type PathParams = Path<HashMap<String, String>>;
type RawQuery = Query<HashMap<String, String>>;
type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

/// `GET /{plural}` — shaped listing
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Path(path): PathParams,
    Query(raw): RawQuery,
) -> Result<Envelope> {
    let items = list_shaped::<R>(&state, &path, raw).await?;
    Ok(Envelope::list(R::PLURAL, items))
}

/// Run the full shaping pipeline for a resource, honoring parent scope.
///
/// Shared between the plain list handler and preset-alias routes that seed
/// the parameters before shaping.
pub(crate) async fn list_shaped<R: Resource>(
    state: &AppState,
    path: &HashMap<String, String>,
    raw: HashMap<String, String>,
) -> Result<Vec<Value>> {
    let mut description = QueryDescription::new(raw);
    if let Some(scope) = R::parent_scope() {
        if let Some(parent_id) = path.get(scope.path_param) {
            description.set(scope.filter_field, parent_id.clone());
        }
    }

    let query = state.store().collection(R::COLLECTION).find();
    let items = QueryShaper::new(query, description)
        .filter()
        .sort()
        .limit_fields()
        .paginate()
        .into_query()
        .run()
        .await?;
    Ok(items)
}

/// `GET /{plural}/{id}` — single document with related documents attached
pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    Path(path): PathParams,
) -> Result<Envelope> {
    let id = require_id::<R>(&path)?;
    let mut doc = state
        .store()
        .collection(R::COLLECTION)
        .find_by_id(id)
        .await?
        .ok_or(Error::NotFound)?;
    state.store().populate(&mut doc, R::populate()).await?;
    Ok(Envelope::ok(R::SINGULAR, doc))
}

/// `POST /{plural}` — validate and insert
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Path(path): PathParams,
    body: JsonBody,
) -> Result<Envelope> {
    let mut payload = object_payload(body)?;

    if let Some(scope) = R::parent_scope() {
        if let Some(parent_id) = path.get(scope.path_param) {
            payload
                .entry(scope.filter_field)
                .or_insert_with(|| Value::String(parent_id.clone()));
        }
    }

    R::apply_defaults(&mut payload);
    R::validate(&payload, ValidationMode::Create)?;
    let doc = state
        .store()
        .collection(R::COLLECTION)
        .insert(Value::Object(payload), R::unique_fields())
        .await?;
    Ok(Envelope::created(R::SINGULAR, doc))
}

/// `PATCH /{plural}/{id}` — validate and merge a partial payload
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(path): PathParams,
    body: JsonBody,
) -> Result<Envelope> {
    let id = require_id::<R>(&path)?.to_string();
    let payload = object_payload(body)?;

    R::validate(&payload, ValidationMode::Update)?;
    let doc = state
        .store()
        .collection(R::COLLECTION)
        .update_by_id(&id, Value::Object(payload), R::unique_fields())
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Envelope::ok(R::SINGULAR, doc))
}

/// `DELETE /{plural}/{id}` — remove, or 404 when nothing matched
pub async fn delete_one<R: Resource>(
    State(state): State<AppState>,
    Path(path): PathParams,
) -> Result<NoContent> {
    let id = require_id::<R>(&path)?;
    let deleted = state
        .store()
        .collection(R::COLLECTION)
        .delete_by_id(id)
        .await?;
    if deleted {
        Ok(NoContent)
    } else {
        Err(Error::NotFound)
    }
}

fn require_id<'a, R: Resource>(path: &'a HashMap<String, String>) -> Result<&'a str> {
    path.get(R::ID_PARAM)
        .map(String::as_str)
        .ok_or_else(|| Error::Internal(format!("route missing {} parameter", R::ID_PARAM)))
}

fn object_payload(body: JsonBody) -> Result<JsonMap> {
    let Json(value) = body.map_err(|e| Error::Operational(e.status(), e.body_text()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Validation("Payload must be a JSON object".to_string())),
    }
}
