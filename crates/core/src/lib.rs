//! Workout composition core.
//!
//! Pure, synchronous transformations over workout data:
//!
//! - [`composition`]: edit the grouped tree (add, remove, reorder, group,
//!   ungroup, edit fields).
//! - [`flatten`]: tree to persisted rows and back.
//! - [`reconcile`]: create/update/delete plan against previously persisted rows.
//! - [`checklist`]: per-set logging slots for performing a workout.
//! - [`metrics`]: load-over-time series from historical set logs.

pub mod checklist;
pub mod composition;
pub mod config;
pub mod error;
pub mod flatten;
pub mod metrics;
pub mod prescription;
pub mod reconcile;
pub mod session;
pub mod types;
pub mod validation;
