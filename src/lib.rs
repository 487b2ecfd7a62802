// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod country;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod readiness;
pub mod reshape;
pub mod snapshot;
pub mod table;
pub mod views;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::{CoreError, CoreResult};
pub use crate::readiness::{ReadinessWeights, RiskLevel};
pub use crate::snapshot::Snapshot;
pub use crate::table::{Table, Value};
