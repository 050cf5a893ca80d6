//! specsense-hybrid
//!
//! Hybrid retrieval over a product catalog: BM25 and dense similarity are
//! min-max normalized, fused with a caller-chosen `alpha`, filtered by hard
//! constraints and explained. Indexes are immutable snapshots swapped
//! atomically on rebuild.
pub mod constraints;
pub mod engine;
pub mod explain;
pub mod fusion;
pub mod results;
pub mod snapshot;

pub use constraints::{matched_soft_tags, ConstraintFilter, HardConstraint, Predicate, SoftMatch};
pub use engine::HybridSearchEngine;
pub use explain::explain;
pub use results::SearchResults;
pub use snapshot::{IndexOptions, IndexSnapshot};
