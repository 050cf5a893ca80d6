#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::bail;
use specsense_core::traits::Embedder;
use specsense_core::types::ProductRecord;
use specsense_core::Catalog;
use specsense_hybrid::{HybridSearchEngine, IndexOptions};
use specsense_text::tokenize;
use specsense_vector::FlatBackend;

pub const VOCABULARY: &[&str] = &[
    "lightweight", "laptop", "coding", "battery", "long", "gaming", "heavy", "rgb", "ultrabook", "16gb", "phone", "camera",
    "mouse", "wireless",
];

/// Bag-of-words over a fixed vocabulary, so cosine similarities in tests can
/// be worked out by hand.
#[derive(Default)]
pub struct VocabEmbedder {
    fail: AtomicBool,
}

impl VocabEmbedder {
    pub fn failing() -> Self { Self { fail: AtomicBool::new(true) } }

    pub fn set_failing(&self, fail: bool) { self.fail.store(fail, Ordering::SeqCst); }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        VOCABULARY.iter().map(|w| tokens.iter().filter(|t| t.as_str() == *w).count() as f32).collect()
    }
}

impl Embedder for VocabEmbedder {
    fn dim(&self) -> usize { VOCABULARY.len() }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) { bail!("embedding service unavailable"); }
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn name(&self) -> &str { "vocab" }
}

/// Drops the last vector of every batch.
pub struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn dim(&self) -> usize { VOCABULARY.len() }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0; VOCABULARY.len()]).collect())
    }
}

pub const LAPTOP_QUERY: &str = "lightweight laptop for coding with long battery";

/// A: light coding laptop, B: heavy gaming laptop, C: ultrabook.
pub fn laptops() -> Catalog {
    Catalog::from_products(vec![
        ProductRecord::new("A", "lightweight coding laptop 16GB battery")
            .with_price(28000.0)
            .with_specs("16GB RAM, 1.2kg, 10h battery"),
        ProductRecord::new("B", "gaming laptop RGB heavy").with_price(90000.0).with_specs("RTX 4070, 2.8kg"),
        ProductRecord::new("C", "ultrabook long battery coding").with_price(32000.0),
    ])
}

pub const ACCESSORY_QUERY: &str = "wireless laptop";

pub fn accessories() -> Catalog {
    Catalog::from_products(vec![
        ProductRecord::new("Raptor", "gaming laptop RGB heavy").with_price(90000.0),
        ProductRecord::new("Glide", "wireless mouse").with_price(900.0),
        ProductRecord::new("Riser", "laptop stand aluminium desk riser adjustable height").with_price(1500.0),
        ProductRecord::new("Volt", "wireless charger phone camera").with_price(1200.0),
        ProductRecord::new("Aero", "lightweight coding laptop 16GB battery").with_price(28000.0),
    ])
}

pub fn options(candidate_factor: usize) -> IndexOptions {
    IndexOptions { candidate_factor, ..IndexOptions::default() }
}

pub fn engine_with(catalog: Catalog, embedder: Arc<VocabEmbedder>, candidate_factor: usize) -> HybridSearchEngine {
    HybridSearchEngine::with_catalog(catalog, embedder, Arc::new(FlatBackend), options(candidate_factor)).unwrap()
}

pub fn engine(catalog: Catalog) -> HybridSearchEngine {
    engine_with(catalog, Arc::new(VocabEmbedder::default()), 5)
}
