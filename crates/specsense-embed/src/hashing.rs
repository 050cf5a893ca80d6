use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use specsense_core::traits::Embedder;
use specsense_text::tokenize;

/// Signed feature hashing of lexical tokens into `dim` buckets, L2-normalized.
/// Deterministic and model-free: texts sharing tokens get positive cosine
/// similarity. Meant for offline runs and tests.
pub struct HashingEmbedder { dim: usize }

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in tokenize(text) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-12);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) }
    fn name(&self) -> &str { "hashing" }
}
