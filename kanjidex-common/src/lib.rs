//! Shared core for the kanjidex services
//!
//! Houses the error taxonomy, configuration resolution, the schema-less
//! document store, the three entity repositories, and the dictionary core
//! (reconciliation, bulk import, denormalized view assembly). The HTTP
//! surface in `kanjidex-api` is a thin layer over this crate.

pub mod config;
pub mod dict;
pub mod error;
pub mod models;
pub mod repo;
pub mod store;

pub use error::{Error, ReconcilePhase, Result};
