//! Development data seeding
//!
//! Loads every `{collection}.json` file from a directory into the store at
//! startup. Each file holds a JSON array of documents; the file stem names
//! the collection. Meant for development fixtures, enabled through
//! `store.seed` in the configuration.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::store::Store;

/// Load all seed files from `dir`; returns the number of documents inserted
pub async fn load(store: &Store, dir: &Path) -> Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut inserted = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(collection) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let raw = tokio::fs::read_to_string(&path).await?;
        let docs: Value = serde_json::from_str(&raw)?;
        let Value::Array(docs) = docs else {
            return Err(Error::Internal(format!(
                "seed file {} must hold a JSON array",
                path.display()
            )));
        };

        let handle = store.collection(collection);
        let count = docs.len();
        for doc in docs {
            handle.insert(doc, &[]).await?;
        }
        tracing::info!("Seeded {} documents into {}", count, collection);
        inserted += count;
    }

    Ok(inserted)
}
