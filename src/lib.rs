//! Local persistence and nutrition aggregation for the MealMind app.
//!
//! Everything is stored as whole JSON documents in an async key-value store
//! ([`storage::KeyValueStore`]). On top of that sit the account store, the
//! session pointer, per-day activity buckets, food logs and the pure
//! nutrition calculator. [`AppState`] wires them together.

pub mod activity;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod nutrition;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod users;

pub use config::AppConfig;
pub use error::{StoreError, StoreResult};
pub use state::AppState;
