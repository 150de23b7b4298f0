//! Traffic simulation engine for the petstore API
//!
//! Keeps a best-effort local mirror of remote pet/user/order existence,
//! maintains configured population minimums, and drives randomized CRUD
//! traffic through a weighted operation table. Local tracking is
//! reconciled lazily: a 404 on an id we believed valid removes it.

pub mod entity;
pub mod error;
pub mod generate;
pub mod metrics;
pub mod ops;
pub mod runner;
pub mod tracker;

pub use entity::{DeletePlan, EntitySet};
pub use error::SimError;
pub use metrics::Metrics;
pub use ops::{OpKind, WeightedTable};
pub use runner::Simulator;
pub use tracker::{TrackedCounts, TrackerHandle, TrackerShortfall};
