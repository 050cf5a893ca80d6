//! Domain types shared by the catalog, the indexes and the hybrid engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dense per-build product identifier (`0..n-1`).
pub type Handle = usize;
pub type Attributes = BTreeMap<String, String>;

/// A catalog entry. Owned by the [`Catalog`](crate::catalog::Catalog) and
/// referenced by handle everywhere else.
///
/// - `price`: `0.0` when the source had no price, `NaN` when it had one that
///   could not be parsed
/// - `attributes`: every extra source column, keyed by lowercase column name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Handle,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub specs: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Product {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A product before it has been assigned a handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub specs: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), ..Self::default() }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_specs(mut self, specs: impl Into<String>) -> Self {
        self.specs = specs.into();
        self
    }

    pub fn with_attribute(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.as_ref().to_lowercase(), value.into());
        self
    }
}

/// Hard constraints as produced by the extractor: attribute name to a required
/// value or a predicate. Untrusted until validated by the constraint filter.
pub type HardConstraints = BTreeMap<String, serde_json::Value>;

/// Output of the constraint-extractor collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub hard: HardConstraints,
    #[serde(default)]
    pub soft: Vec<String>,
}

impl Constraints {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub alpha: f32,
    pub top_k: usize,
    #[serde(default)]
    pub hard_constraints: HardConstraints,
    #[serde(default)]
    pub soft: Vec<String>,
}

impl Query {
    pub const DEFAULT_ALPHA: f32 = 0.6;
    pub const DEFAULT_TOP_K: usize = 5;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alpha: Self::DEFAULT_ALPHA,
            top_k: Self::DEFAULT_TOP_K,
            hard_constraints: HardConstraints::new(),
            soft: Vec::new(),
        }
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn hard(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.hard_constraints.insert(key.into(), value.into());
        self
    }

    pub fn prefer(mut self, tag: impl Into<String>) -> Self {
        self.soft.push(tag.into());
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.hard_constraints.extend(constraints.hard);
        self.soft.extend(constraints.soft);
        self
    }
}

/// One ranked hit. `score` is the unrounded fused score in `[0, 1]`;
/// `dense` and `lexical` are its normalized components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub handle: Handle,
    pub score: f32,
    pub dense: f32,
    pub lexical: f32,
    pub explanation: String,
}

/// Presentation view of a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedResult {
    pub product_name: String,
    pub score: f64,
    pub price: f64,
    pub explanation: String,
}

/// Round a score to 4 decimals for display only.
pub fn display_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}
