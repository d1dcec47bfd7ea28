//! Aggregation engine.
//!
//! Flow: normalize input → primary chain (first success wins) and extender
//! fan-out (settle-all) → merge into GeoJSON features.

mod aggregator;
pub mod chain;
pub mod fanout;
pub mod merge;
pub mod normalize;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::Georcoder;
pub use chain::ChainResolver;
pub use fanout::{ExtendOutcome, Extender};
pub use merge::merge;
