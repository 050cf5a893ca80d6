use std::sync::Arc;

use specsense_core::types::{display_score, Handle, Product, RenderedResult, ScoredResult};
use specsense_core::Catalog;

/// Ranked hits plus the catalog generation they were computed against, so
/// handles stay resolvable after the engine has moved on.
#[derive(Debug, Clone)]
pub struct SearchResults {
    generation: u64,
    catalog: Arc<Catalog>,
    items: Vec<ScoredResult>,
}

impl SearchResults {
    pub fn new(generation: u64, catalog: Arc<Catalog>, items: Vec<ScoredResult>) -> Self {
        Self { generation, catalog, items }
    }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn items(&self) -> &[ScoredResult] { &self.items }

    pub fn into_items(self) -> Vec<ScoredResult> { self.items }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn handles(&self) -> Vec<Handle> { self.items.iter().map(|r| r.handle).collect() }

    pub fn product(&self, result: &ScoredResult) -> Option<&Product> { self.catalog.get(result.handle) }

    /// Presentation view; scores rounded to 4 decimals.
    pub fn render(&self) -> Vec<RenderedResult> {
        self.items
            .iter()
            .filter_map(|r| {
                let p = self.catalog.get(r.handle)?;
                Some(RenderedResult {
                    product_name: p.name.clone(),
                    score: display_score(r.score),
                    price: p.price,
                    explanation: r.explanation.clone(),
                })
            })
            .collect()
    }
}
