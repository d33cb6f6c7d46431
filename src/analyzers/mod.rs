//! Flight delay aggregation.
//!
//! This module groups the cleaned flight table by origin, destination,
//! carrier, weekday and month, computes the delay statistics of one report,
//! and wires the loader, normalizer and cleaner into a single run.

pub mod aggregate;
pub mod analyzer;
pub mod group;
pub mod types;
pub mod utility;
