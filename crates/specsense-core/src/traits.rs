use crate::types::Handle;

/// Text to fixed-dimension vector. Implementations may batch internally and
/// must return exactly one vector of `dim()` values per input text.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Stable identifier of the model behind this embedder, used in logs.
    fn name(&self) -> &str { "embedder" }
}

/// Nearest-neighbour oracle over vectors added in handle order: the `i`-th
/// vector ever added answers as handle `i`. Scores are inner products
/// (higher is better); exact or approximate backends are both acceptable.
pub trait VectorSearch: Send + Sync {
    fn add(&mut self, vectors: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<(Handle, f32)>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Creates an empty [`VectorSearch`] for each index generation so a rebuild
/// never touches the store a live snapshot is reading.
pub trait VectorBackend: Send + Sync {
    fn create(&self, generation: u64, dim: usize) -> anyhow::Result<Box<dyn VectorSearch>>;
}
