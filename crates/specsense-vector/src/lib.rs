//! specsense-vector
//!
//! Dense side of retrieval. `DenseIndex` owns normalization and result
//! ordering; the nearest-neighbour work is delegated to a `VectorSearch`
//! backend (exact in-memory `FlatIndex` or a LanceDB table).
pub mod dense;
pub mod flat;
pub mod lance;
pub mod normalize;
pub mod schema;

use std::sync::Arc;

use specsense_core::config::{VectorBackendKind, VectorSettings};
use specsense_core::traits::VectorBackend;

pub use dense::DenseIndex;
pub use flat::{FlatBackend, FlatIndex};
pub use lance::{LanceBackend, LanceVectorStore};
pub use normalize::{dot, l2_normalize, rank_hits, NORM_FLOOR};

pub fn backend_from_settings(settings: &VectorSettings, lance_uri: &str) -> Arc<dyn VectorBackend> {
    match settings.backend {
        VectorBackendKind::Flat => Arc::new(FlatBackend),
        VectorBackendKind::Lance => Arc::new(LanceBackend::new(lance_uri, &settings.table)),
    }
}
