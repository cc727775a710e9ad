//! Single-pallet load planner.
//!
//! Given a pallet standard and a small catalogue of box types, the planner
//! computes a deterministic, physically plausible stacking plan: where every
//! box goes, which boxes did not fit and why, plus utilization and
//! load-balance figures.

pub mod api;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod orientation;
pub mod placement;
pub mod planner;
pub mod stability;
pub mod types;
