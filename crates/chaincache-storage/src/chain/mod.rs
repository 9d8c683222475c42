//! Multi-tier chain of backends
//!
//! Reads go from the fastest tier to the slowest and warm faster tiers on
//! the way back; writes go through every tier.

mod backend;
mod report;

pub use backend::{ChainCache, Tier};
pub use report::BroadcastReport;
