use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;

use specsense_core::types::{Constraints, Query};

/// Flags shared by `search` and the shell's defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Dense weight in [0, 1]; 0 is keyword-only, 1 is semantic-only
    #[arg(long)]
    pub alpha: Option<f32>,

    /// Number of results
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Upper price bound, e.g. 30000 or 30k
    #[arg(long)]
    pub max_price: Option<String>,

    /// Lower price bound
    #[arg(long)]
    pub min_price: Option<String>,

    /// Hard constraint as key=value, e.g. brand=Acme or ram=>=16 (repeatable)
    #[arg(long = "require", value_name = "KEY=VALUE")]
    pub require: Vec<String>,

    /// Soft preference tag, e.g. long_battery (repeatable)
    #[arg(long = "prefer", value_name = "TAG")]
    pub prefer: Vec<String>,

    /// Extractor output as JSON: {"hard": {...}, "soft": [...]}
    #[arg(long)]
    pub constraints: Option<String>,
}

impl QueryArgs {
    /// Flags win over `--constraints` for the same key.
    pub fn to_query(&self, text: &str, default_alpha: f32, default_top_k: usize) -> Result<Query> {
        let mut query = Query::new(text)
            .alpha(self.alpha.unwrap_or(default_alpha))
            .top_k(self.top_k.unwrap_or(default_top_k));
        if let Some(raw) = &self.constraints {
            let constraints = Constraints::from_json(raw).context("--constraints is not valid constraint JSON")?;
            query = query.with_constraints(constraints);
        }
        if let Some(max) = &self.max_price { query = query.hard("max_price", max.as_str()); }
        if let Some(min) = &self.min_price { query = query.hard("min_price", min.as_str()); }
        for raw in &self.require {
            let (key, value) = parse_requirement(raw)?;
            query = query.hard(key, value);
        }
        for tag in &self.prefer { query = query.prefer(tag.as_str()); }
        Ok(query)
    }
}

/// `key=value`; the value is read as JSON when it is a number or boolean and
/// kept as text otherwise.
pub fn parse_requirement(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| anyhow!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() { return Err(anyhow!("empty key in '{raw}'")); }
    let value = value.trim();
    let value = match serde_json::from_str::<Value>(value) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}
