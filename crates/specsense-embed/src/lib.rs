//! specsense-embed
//!
//! Embedding collaborators: a candle sentence-transformer and a model-free
//! hashing embedder. Construct one explicitly and hand it to the engine.
pub mod device;
pub mod hashing;
pub mod model;
pub mod pool;
pub mod tokenize;

use std::sync::Arc;

use specsense_core::config::{EmbeddingBackend, EmbeddingSettings};
use specsense_core::traits::Embedder;

pub use device::select_device;
pub use hashing::HashingEmbedder;
pub use model::{resolve_model_dir, SentenceEmbedder};
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

pub fn embedder_from_settings(settings: &EmbeddingSettings) -> anyhow::Result<Arc<dyn Embedder>> {
    match settings.backend {
        EmbeddingBackend::Hashing => {
            tracing::info!(dim = settings.dim, "using hashing embedder");
            Ok(Arc::new(HashingEmbedder::new(settings.dim)))
        }
        EmbeddingBackend::Model => {
            let dir = resolve_model_dir(settings.model_dir.as_deref())?;
            Ok(Arc::new(SentenceEmbedder::load(&dir, settings.max_len)?))
        }
    }
}
