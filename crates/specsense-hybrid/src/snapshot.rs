//! One immutable index generation: catalog, BM25 index and dense index built
//! together and queried together.

use rayon::prelude::*;
use std::sync::Arc;

use specsense_core::config::{validate_alpha, validate_top_k, Bm25Params, Settings};
use specsense_core::traits::{Embedder, VectorBackend};
use specsense_core::types::{Query, ScoredResult};
use specsense_core::{Catalog, Error, Result};
use specsense_text::{tokenize, LexicalIndex};
use specsense_vector::{DenseIndex, FlatIndex};

use crate::constraints::{matched_soft_tags, ConstraintFilter};
use crate::explain::explain;
use crate::fusion;
use crate::results::SearchResults;

/// Parameters fixed for the lifetime of a snapshot. Changing any of them
/// means building a new generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    pub bm25: Bm25Params,
    /// Dense candidates per query are `top_k * candidate_factor`.
    pub candidate_factor: usize,
    pub batch_size: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { bm25: Bm25Params::default(), candidate_factor: 5, batch_size: 32 }
    }
}

impl IndexOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bm25: settings.retrieval.bm25,
            candidate_factor: settings.retrieval.candidate_factor,
            batch_size: settings.embedding.batch_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bm25.validate()?;
        if self.candidate_factor == 0 {
            return Err(Error::Config("candidate_factor must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

pub struct IndexSnapshot {
    generation: u64,
    catalog: Arc<Catalog>,
    lexical: LexicalIndex,
    dense: DenseIndex,
    embedder: Arc<dyn Embedder>,
    options: IndexOptions,
}

impl std::fmt::Debug for IndexSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSnapshot")
            .field("generation", &self.generation)
            .field("products", &self.catalog.len())
            .field("dim", &self.dense.dim())
            .field("embedder", &self.embedder.name())
            .finish()
    }
}

impl IndexSnapshot {
    /// Generation 0: no products, every search returns nothing.
    pub fn empty(embedder: Arc<dyn Embedder>, options: IndexOptions) -> Result<Self> {
        let catalog = Arc::new(Catalog::from_products(Vec::new()));
        let lexical = LexicalIndex::build(&catalog, options.bm25);
        let dim = embedder.dim();
        let dense = DenseIndex::build(Vec::new(), dim, Box::new(FlatIndex::new(dim)))
            .map_err(|e| Error::collaborator("vector index", e))?;
        Ok(Self { generation: 0, catalog, lexical, dense, embedder, options })
    }

    /// Build both indexes concurrently. Either failing fails the build.
    pub fn build(
        generation: u64,
        catalog: Arc<Catalog>,
        embedder: Arc<dyn Embedder>,
        backend: &dyn VectorBackend,
        options: IndexOptions,
    ) -> Result<Self> {
        options.validate()?;
        let (lexical, dense) = rayon::join(
            || LexicalIndex::build(&catalog, options.bm25),
            || build_dense(generation, &catalog, embedder.as_ref(), backend, options.batch_size),
        );
        let dense = dense?;
        tracing::info!(generation, products = catalog.len(), dim = dense.dim(), embedder = embedder.name(), "built index snapshot");
        Ok(Self { generation, catalog, lexical, dense, embedder, options })
    }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn catalog(&self) -> &Arc<Catalog> { &self.catalog }

    pub fn lexical(&self) -> &LexicalIndex { &self.lexical }

    pub fn dense(&self) -> &DenseIndex { &self.dense }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    pub fn options(&self) -> IndexOptions { self.options }

    /// Score every product on both signals, fuse, filter and keep `top_k`.
    pub fn search(&self, query: &Query) -> Result<SearchResults> {
        validate_alpha(query.alpha)?;
        validate_top_k(query.top_k)?;
        let n = self.catalog.len();
        if n == 0 {
            return Ok(SearchResults::new(self.generation, self.catalog.clone(), Vec::new()));
        }

        let lexical = fusion::normalize(&self.lexical.score(&query.text));
        let dense = fusion::normalize(&self.dense_scores(&query.text, query.top_k)?);
        let fused = fusion::fuse(&dense, &lexical, query.alpha);

        let filter = ConstraintFilter::new(&query.hard_constraints, &self.catalog);
        let terms = tokenize(&query.text);
        let products = self.catalog.products();
        let items: Vec<ScoredResult> = fusion::rank(&fused)
            .into_iter()
            .filter(|&h| filter.admits(&products[h]))
            .take(query.top_k)
            .map(|h| {
                let product = &products[h];
                let soft = matched_soft_tags(product, &query.soft);
                ScoredResult { handle: h, score: fused[h], dense: dense[h], lexical: lexical[h], explanation: explain(product, &terms, &soft) }
            })
            .collect();

        tracing::debug!(
            generation = self.generation,
            alpha = query.alpha,
            constraints = filter.constraints().len(),
            returned = items.len(),
            "search"
        );
        Ok(SearchResults::new(self.generation, self.catalog.clone(), items))
    }

    /// Raw cosine similarity per handle. Handles outside the candidate pool
    /// and blank queries score 0.
    fn dense_scores(&self, text: &str, top_k: usize) -> Result<Vec<f32>> {
        let n = self.catalog.len();
        if text.trim().is_empty() { return Ok(vec![0.0; n]); }

        let mut vectors = self
            .embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::collaborator("embedder", e))?;
        if vectors.len() != 1 {
            return Err(Error::collaborator("embedder", format!("returned {} vectors for 1 query", vectors.len())));
        }
        let query_vec = vectors.remove(0);
        if query_vec.len() != self.dense.dim() {
            return Err(Error::collaborator(
                "embedder",
                format!("query vector has dimension {} (index dimension is {})", query_vec.len(), self.dense.dim()),
            ));
        }
        let k = fusion::candidate_pool(top_k, n, self.options.candidate_factor);
        let hits = self.dense.search(&query_vec, k).map_err(|e| Error::collaborator("vector index", e))?;
        Ok(fusion::densify(&hits, n))
    }
}

fn build_dense(
    generation: u64,
    catalog: &Catalog,
    embedder: &dyn Embedder,
    backend: &dyn VectorBackend,
    batch_size: usize,
) -> Result<DenseIndex> {
    let texts = catalog.descriptions();
    let batches = texts
        .par_chunks(batch_size)
        .map(|chunk| {
            let vectors = embedder.embed_batch(chunk).map_err(|e| Error::collaborator("embedder", e))?;
            if vectors.len() != chunk.len() {
                return Err(Error::collaborator(
                    "embedder",
                    format!("returned {} vectors for {} texts", vectors.len(), chunk.len()),
                ));
            }
            Ok(vectors)
        })
        .collect::<Result<Vec<_>>>()?;
    let vectors: Vec<Vec<f32>> = batches.into_iter().flatten().collect();

    let dim = embedder.dim();
    if let Some((handle, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(Error::collaborator(
            "embedder",
            format!("vector for handle {handle} has dimension {} (expected {dim})", v.len()),
        ));
    }
    let store = backend.create(generation, dim).map_err(|e| Error::collaborator("vector index", e))?;
    DenseIndex::build(vectors, dim, store).map_err(|e| Error::collaborator("vector index", e))
}
