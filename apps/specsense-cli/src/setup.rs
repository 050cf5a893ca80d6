use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use specsense_core::config::{Config, Settings};
use specsense_core::Catalog;
use specsense_embed::embedder_from_settings;
use specsense_hybrid::{HybridSearchEngine, IndexOptions};
use specsense_vector::backend_from_settings;

/// Resolved configuration plus the catalog location the engine reads from.
pub struct App {
    pub settings: Settings,
    pub catalog_path: PathBuf,
    pub engine: HybridSearchEngine,
}

impl App {
    pub fn load(config_dir: &Path, catalog_override: Option<&Path>) -> Result<Self> {
        let config = Config::load_from(config_dir).context("loading configuration")?;
        let settings = config.settings()?;
        let catalog_path = match catalog_override {
            Some(p) => p.to_path_buf(),
            None => config.resolve_path(&settings.catalog.path),
        };
        let lance_uri = config.resolve_path(&settings.vector.lance_uri);

        let embedder = embedder_from_settings(&settings.embedding)?;
        let backend = backend_from_settings(&settings.vector, &lance_uri.to_string_lossy());
        let engine = HybridSearchEngine::new(embedder, backend, IndexOptions::from_settings(&settings))?;

        let app = Self { settings, catalog_path, engine };
        app.reload()?;
        Ok(app)
    }

    /// Re-read the catalog and swap in a freshly built index. On failure the
    /// engine keeps serving whatever generation it had.
    pub fn reload(&self) -> Result<u64> {
        let result = self.rebuild_from_disk();
        match &result {
            Ok(generation) => tracing::info!(generation, path = %self.catalog_path.display(), "catalog indexed"),
            Err(e) => tracing::warn!(
                serving = self.engine.generation(),
                path = %self.catalog_path.display(),
                error = %format!("{e:#}"),
                "catalog reload failed"
            ),
        }
        result
    }

    fn rebuild_from_disk(&self) -> Result<u64> {
        let catalog = Catalog::load(&self.catalog_path)?;
        let products = catalog.len();
        let spinner = spinner(format!("Indexing {products} products from {}", self.catalog_path.display()));
        match self.engine.rebuild(catalog) {
            Ok(generation) => {
                spinner.finish_with_message(format!("Indexed {products} products (generation {generation})"));
                Ok(generation)
            }
            Err(e) => {
                spinner.abandon_with_message("Indexing failed");
                Err(e.into())
            }
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}
