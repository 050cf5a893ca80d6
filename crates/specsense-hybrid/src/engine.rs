//! The query-facing engine: holds the active snapshot and swaps in rebuilt
//! generations without blocking readers.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use specsense_core::traits::{Embedder, VectorBackend};
use specsense_core::types::Query;
use specsense_core::{Catalog, Result};

use crate::results::SearchResults;
use crate::snapshot::{IndexOptions, IndexSnapshot};

pub struct HybridSearchEngine {
    backend: Arc<dyn VectorBackend>,
    active: RwLock<Arc<IndexSnapshot>>,
    generations: AtomicU64,
    rebuild_lock: Mutex<()>,
}

impl std::fmt::Debug for HybridSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearchEngine").field("active", &*self.snapshot()).finish_non_exhaustive()
    }
}

impl HybridSearchEngine {
    /// An engine serving the empty generation 0 until the first rebuild.
    pub fn new(embedder: Arc<dyn Embedder>, backend: Arc<dyn VectorBackend>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        let empty = IndexSnapshot::empty(embedder, options)?;
        Ok(Self {
            backend,
            active: RwLock::new(Arc::new(empty)),
            generations: AtomicU64::new(0),
            rebuild_lock: Mutex::new(()),
        })
    }

    pub fn with_catalog(
        catalog: Catalog,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn VectorBackend>,
        options: IndexOptions,
    ) -> Result<Self> {
        let engine = Self::new(embedder, backend, options)?;
        engine.rebuild(catalog)?;
        Ok(engine)
    }

    /// Rebuild from `catalog` with the active embedder and options.
    pub fn rebuild(&self, catalog: Catalog) -> Result<u64> {
        let current = self.snapshot();
        self.reindex(catalog, current.embedder().clone(), current.options())
    }

    /// Build a new generation out of place and make it active. On failure
    /// the previous generation keeps serving.
    pub fn reindex(&self, catalog: Catalog, embedder: Arc<dyn Embedder>, options: IndexOptions) -> Result<u64> {
        let _guard = self.rebuild_lock.lock();
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = IndexSnapshot::build(generation, Arc::new(catalog), embedder, self.backend.as_ref(), options)
            .inspect_err(|e| tracing::warn!(generation, error = %e, "index build failed; keeping active snapshot"))?;
        let retired = std::mem::replace(&mut *self.active.write(), Arc::new(snapshot));
        tracing::info!(generation, retired = retired.generation(), "activated index generation");
        Ok(generation)
    }

    /// The active snapshot. It stays valid, and answers from its own
    /// catalog, for as long as the caller holds it.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> { self.active.read().clone() }

    pub fn generation(&self) -> u64 { self.snapshot().generation() }

    pub fn search(&self, query: &Query) -> Result<SearchResults> { self.snapshot().search(query) }
}
