//! # tourdesk
//!
//! JSON REST API for managing tours, users and the reviews users leave on
//! tours, backed by an embedded document store.
//!
//! ## Features
//!
//! - **Query shaping**: filtering with comparison operators
//!   (`duration[gte]=5`), multi-key sorting, field projection and
//!   pagination on every list endpoint
//! - **Generic handlers**: one CRUD handler set instantiated per resource
//! - **Nested routes**: reviews reachable under their owning tour
//! - **Derived reads**: top-tours preset, per-difficulty statistics,
//!   monthly start-date plan
//! - **Uniform envelopes**: `status`/`data` success bodies, `fail`/`error`
//!   failure bodies with development-only diagnostics
//! - **Graceful shutdown**: proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tourdesk::config::Config;
//! use tourdesk::observability::init_tracing;
//! use tourdesk::server::Server;
//! use tourdesk::state::AppState;
//! use tourdesk::store::Store;
//!
//! #[tokio::main]
//! async fn main() -> tourdesk::Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config);
//!
//!     let state = AppState::new(config.clone(), Store::new());
//!     let app = tourdesk::routes::router(state);
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod health;
pub mod observability;
pub mod query;
pub mod resources;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;
pub mod store;

pub use error::{Error, Result};
