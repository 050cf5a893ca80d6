use anyhow::{bail, Result};
use rayon::prelude::*;

use specsense_core::traits::{VectorBackend, VectorSearch};
use specsense_core::types::Handle;

use crate::normalize::{dot, rank_hits};

/// Exact inner-product search over a contiguous row-major matrix.
pub struct FlatIndex { dim: usize, data: Vec<f32> }

impl FlatIndex {
    pub fn new(dim: usize) -> Self { Self { dim, data: Vec::new() } }

    pub fn dim(&self) -> usize { self.dim }
}

impl VectorSearch for FlatIndex {
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != self.dim) {
            bail!("vector {} has dimension {} (index dimension is {})", self.len() + i, v.len(), self.dim);
        }
        self.data.reserve(vectors.len() * self.dim);
        for v in vectors { self.data.extend_from_slice(v); }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(Handle, f32)>> {
        if query.len() != self.dim { bail!("query has dimension {} (index dimension is {})", query.len(), self.dim); }
        if self.dim == 0 { return Ok(Vec::new()); }
        let mut hits: Vec<(Handle, f32)> = self.data
            .par_chunks_exact(self.dim)
            .enumerate()
            .map(|(handle, row)| (handle, dot(row, query)))
            .collect();
        rank_hits(&mut hits, k);
        Ok(hits)
    }

    fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }
}

/// Fresh in-memory `FlatIndex` per generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBackend;

impl VectorBackend for FlatBackend {
    fn create(&self, _generation: u64, dim: usize) -> Result<Box<dyn VectorSearch>> {
        Ok(Box::new(FlatIndex::new(dim)))
    }
}
