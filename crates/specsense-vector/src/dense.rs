use anyhow::{bail, Result};

use specsense_core::traits::VectorSearch;
use specsense_core::types::Handle;

use crate::normalize::{l2_normalize, rank_hits};

/// Unit-norm embedding per product handle, fixed dimension, read-only once
/// built. Query vectors are normalized the same way before search.
pub struct DenseIndex {
    dim: usize,
    len: usize,
    store: Box<dyn VectorSearch>,
}

impl DenseIndex {
    pub fn build(mut vectors: Vec<Vec<f32>>, dim: usize, mut store: Box<dyn VectorSearch>) -> Result<Self> {
        for (handle, v) in vectors.iter_mut().enumerate() {
            if v.len() != dim { bail!("vector {handle} has dimension {} (expected {dim})", v.len()); }
            if v.iter().any(|x| !x.is_finite()) { bail!("vector {handle} has non-finite components"); }
            l2_normalize(v);
        }
        if !store.is_empty() { bail!("vector store must start empty, found {} vectors", store.len()); }
        store.add(&vectors)?;
        if store.len() != vectors.len() {
            bail!("vector store holds {} vectors after adding {}", store.len(), vectors.len());
        }
        tracing::info!(vectors = vectors.len(), dim, "built dense index");
        Ok(Self { dim, len: vectors.len(), store })
    }

    /// Top `k` products by cosine similarity, ties broken by ascending handle.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(Handle, f32)>> {
        if query.len() != self.dim { bail!("query has dimension {} (expected {})", query.len(), self.dim); }
        if k == 0 || self.len == 0 { return Ok(Vec::new()); }
        let mut q = query.to_vec();
        l2_normalize(&mut q);
        let mut hits = self.store.search(&q, k.min(self.len))?;
        if let Some((handle, _)) = hits.iter().find(|(h, _)| *h >= self.len) {
            bail!("backend returned handle {handle} outside 0..{}", self.len);
        }
        if hits.iter().any(|(_, s)| !s.is_finite()) { bail!("backend returned a non-finite similarity"); }
        rank_hits(&mut hits, k);
        Ok(hits)
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }
}
