use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Load from the current directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Merge built-in defaults, `config.toml`, `config.<env>.toml` and
    /// `SPECSENSE_*` variables, in that order. Files are optional.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("SPECSENSE_").split("__"));

        Ok(Self { figment, base_dir: dir.to_path_buf() })
    }

    /// Typed, validated view of the whole configuration.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Resolve a configured path against the directory the config was loaded from.
    pub fn resolve_path<S: AsRef<str>>(&self, p: S) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub vector: VectorSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        self.embedding.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { path: "data/products.csv".to_string() }
    }
}

/// Query defaults and index-build parameters. Changing any of the index
/// parameters requires a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub alpha: f32,
    pub top_k: usize,
    /// Dense candidate pool is `top_k * candidate_factor`, capped at the
    /// catalog size.
    pub candidate_factor: usize,
    pub bm25: Bm25Params,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { alpha: 0.6, top_k: 5, candidate_factor: 5, bm25: Bm25Params::default() }
    }
}

impl RetrievalSettings {
    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.alpha)?;
        validate_top_k(self.top_k)?;
        if self.candidate_factor == 0 {
            return Err(Error::Config("candidate_factor must be at least 1".into()));
        }
        self.bm25.validate()
    }
}

pub fn validate_alpha(alpha: f32) -> Result<()> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(Error::Config(format!("alpha must be within [0, 1], got {alpha}")))
    }
}

pub fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::Config("top_k must be a positive integer".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    /// Negative IDFs are replaced by `epsilon * mean_idf`.
    pub epsilon: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::Config(format!("bm25.k1 must be non-negative, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::Config(format!("bm25.b must be within [0, 1], got {}", self.b)));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::Config(format!("bm25.epsilon must be non-negative, got {}", self.epsilon)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Sentence-transformer weights loaded with candle.
    Model,
    /// Deterministic feature hashing; no model files needed.
    Hashing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model_dir: Option<String>,
    /// Output dimension of the hashing backend; the model backend reports its own.
    pub dim: usize,
    pub batch_size: usize,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { backend: EmbeddingBackend::Model, model_dir: None, dim: 384, batch_size: 32, max_len: 256 }
    }
}

impl EmbeddingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("embedding.batch_size must be at least 1".into()));
        }
        if self.max_len == 0 {
            return Err(Error::Config("embedding.max_len must be at least 1".into()));
        }
        if self.backend == EmbeddingBackend::Hashing && self.dim == 0 {
            return Err(Error::Config("embedding.dim must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackendKind {
    Flat,
    Lance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    pub backend: VectorBackendKind,
    pub lance_uri: String,
    pub table: String,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self { backend: VectorBackendKind::Flat, lance_uri: "data/indexes/lancedb".to_string(), table: "products".to_string() }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
