//! Hard-constraint filtering and soft-preference matching.
//!
//! Constraint maps come from an untrusted extractor, so nothing here fails:
//! keys or values that cannot be interpreted are dropped with a warning.

use serde_json::Value;
use specsense_core::catalog::parse_amount;
use specsense_core::types::{HardConstraints, Product};
use specsense_core::Catalog;
use specsense_text::tokenize;
use std::collections::HashSet;

/// Numeric comparison against a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    AtMost(f64),
    AtLeast(f64),
    Below(f64),
    Above(f64),
    Equals(f64),
}

impl Predicate {
    /// `<=30000`, `>= 8`, `<2`, `>1.5k`, `=16`. A bare amount is `None`;
    /// the caller picks the default comparison for its key.
    fn parse_with(raw: &str, amount: fn(&str) -> Option<f64>) -> Option<Self> {
        let s = raw.trim();
        let (op, rest): (fn(f64) -> Self, &str) = if let Some(r) = s.strip_prefix("<=") {
            (Self::AtMost, r)
        } else if let Some(r) = s.strip_prefix(">=") {
            (Self::AtLeast, r)
        } else if let Some(r) = s.strip_prefix("==") {
            (Self::Equals, r)
        } else if let Some(r) = s.strip_prefix('<') {
            (Self::Below, r)
        } else if let Some(r) = s.strip_prefix('>') {
            (Self::Above, r)
        } else if let Some(r) = s.strip_prefix('=') {
            (Self::Equals, r)
        } else {
            return None;
        };
        amount(rest).map(op)
    }

    /// NaN never satisfies a predicate.
    pub fn holds(&self, value: f64) -> bool {
        if value.is_nan() { return false; }
        match *self {
            Self::AtMost(t) => value <= t,
            Self::AtLeast(t) => value >= t,
            Self::Below(t) => value < t,
            Self::Above(t) => value > t,
            Self::Equals(t) => (value - t).abs() < 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Description,
    Specs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeTest {
    /// Case-insensitive equality.
    Equals(String),
    Numeric(Predicate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HardConstraint {
    Price(Predicate),
    /// Lowercased value that must appear in name, description or specs.
    Mentions(String),
    FieldContains { field: TextField, value: String },
    Attribute { key: String, test: AttributeTest },
}

impl HardConstraint {
    pub fn holds(&self, product: &Product) -> bool {
        match self {
            Self::Price(p) => p.holds(product.price),
            Self::Mentions(value) => {
                [&product.name, &product.description, &product.specs]
                    .iter()
                    .any(|field| field.to_lowercase().contains(value))
            }
            Self::FieldContains { field, value } => {
                let text = match field {
                    TextField::Name => &product.name,
                    TextField::Description => &product.description,
                    TextField::Specs => &product.specs,
                };
                text.to_lowercase().contains(value)
            }
            Self::Attribute { key, test } => {
                let Some(actual) = product.attribute(key) else { return false };
                match test {
                    AttributeTest::Equals(expected) => actual.trim().eq_ignore_ascii_case(expected),
                    AttributeTest::Numeric(p) => leading_number(actual).is_some_and(|v| p.holds(v)),
                }
            }
        }
    }
}

/// Validated conjunction of hard constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintFilter {
    constraints: Vec<HardConstraint>,
}

impl ConstraintFilter {
    pub fn new(hard: &HardConstraints, catalog: &Catalog) -> Self {
        let mut constraints = Vec::with_capacity(hard.len());
        for (raw_key, value) in hard {
            let key = raw_key.trim().to_lowercase();
            match interpret(&key, value, catalog) {
                Some(c) => constraints.push(c),
                None => tracing::warn!(key = %raw_key, %value, "ignoring hard constraint"),
            }
        }
        Self { constraints }
    }

    pub fn admits(&self, product: &Product) -> bool {
        self.constraints.iter().all(|c| c.holds(product))
    }

    pub fn constraints(&self) -> &[HardConstraint] { &self.constraints }

    pub fn is_empty(&self) -> bool { self.constraints.is_empty() }
}

fn interpret(key: &str, value: &Value, catalog: &Catalog) -> Option<HardConstraint> {
    match key {
        "budget" | "max_price" => price(value, Predicate::AtMost),
        "min_price" => price(value, Predicate::AtLeast),
        "price" => price(value, Predicate::Equals),
        "weight" | "use_case" => text_value(value).map(HardConstraint::Mentions),
        "name" | "title" => contains(TextField::Name, value),
        "description" => contains(TextField::Description, value),
        "specs" => contains(TextField::Specs, value),
        _ if catalog.attribute_names().contains(key) => attribute(key, value),
        _ => None,
    }
}

fn price(value: &Value, default: fn(f64) -> Predicate) -> Option<HardConstraint> {
    let predicate = match value {
        Value::Number(n) => n.as_f64().map(default),
        Value::String(s) => Predicate::parse_with(s, parse_amount).or_else(|| parse_amount(s).map(default)),
        _ => None,
    }?;
    Some(HardConstraint::Price(predicate))
}

fn contains(field: TextField, value: &Value) -> Option<HardConstraint> {
    text_value(value).map(|value| HardConstraint::FieldContains { field, value })
}

fn attribute(key: &str, value: &Value) -> Option<HardConstraint> {
    let test = match value {
        Value::Number(n) => AttributeTest::Numeric(Predicate::Equals(n.as_f64()?)),
        Value::Bool(b) => AttributeTest::Equals(b.to_string()),
        Value::String(s) => match Predicate::parse_with(s, leading_number) {
            Some(p) => AttributeTest::Numeric(p),
            None if s.trim().is_empty() => return None,
            None => AttributeTest::Equals(s.trim().to_string()),
        },
        _ => return None,
    };
    Some(HardConstraint::Attribute { key: key.to_string(), test })
}

/// Lowercased, trimmed, non-empty text of a string or number.
fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_lowercase(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// First decimal number in `raw`, units ignored: `16GB` is 16, `1.2 kg` is 1.2.
fn leading_number(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let rest = &raw[start..];
    let end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// A soft preference the product shows evidence for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftMatch {
    pub tag: String,
    /// e.g. `long battery life requested`
    pub label: String,
    /// The product word that matched, e.g. `battery`.
    pub evidence: String,
}

struct KnownTag {
    aliases: &'static [&'static str],
    label: &'static str,
    keywords: &'static [&'static str],
    /// When set, a stated weight decides the tag and keywords are only
    /// consulted for products without one.
    max_kg: Option<f64>,
}

const KNOWN_TAGS: &[KnownTag] = &[
    KnownTag {
        aliases: &["long_battery", "battery"],
        label: "long battery life requested",
        keywords: &["battery", "mah", "backup"],
        max_kg: None,
    },
    KnownTag {
        aliases: &["good_cpu", "performance", "fast_cpu"],
        label: "strong CPU requested",
        keywords: &["cpu", "processor", "ryzen", "intel", "i5", "i7", "i9", "m1", "m2", "m3", "ghz"],
        max_kg: None,
    },
    KnownTag {
        aliases: &["lightweight", "light", "portable"],
        label: "lightweight build requested",
        keywords: &["lightweight", "ultrabook", "portable", "thin"],
        max_kg: Some(LIGHTWEIGHT_MAX_KG),
    },
    KnownTag {
        aliases: &["good_display", "display", "screen"],
        label: "good display requested",
        keywords: &["display", "screen", "oled", "ips", "fhd", "qhd", "4k", "hz", "nits"],
        max_kg: None,
    },
    KnownTag {
        aliases: &["budget_friendly", "cheap", "affordable"],
        label: "budget-friendly option requested",
        keywords: &["budget", "affordable", "value", "cheap"],
        max_kg: None,
    },
];

const LIGHTWEIGHT_MAX_KG: f64 = 1.5;

/// Soft tags with supporting evidence in the product's name, description or
/// specs. Never filters; duplicate tags are reported once.
pub fn matched_soft_tags(product: &Product, soft: &[String]) -> Vec<SoftMatch> {
    if soft.is_empty() { return Vec::new(); }
    let text = format!("{} {} {}", product.name, product.description, product.specs);
    let tokens = tokenize(&text);
    let weight = stated_weight_kg(&text);
    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for raw in soft {
        let tag = raw.trim().to_lowercase();
        if tag.is_empty() || !seen.insert(tag.clone()) { continue; }
        if let Some(m) = match_tag(&tag, &tokens, weight) { matches.push(m); }
    }
    matches
}

fn match_tag(tag: &str, tokens: &[String], weight: Option<f64>) -> Option<SoftMatch> {
    if let Some(known) = KNOWN_TAGS.iter().find(|k| k.aliases.contains(&tag)) {
        let evidence = match (known.max_kg, weight) {
            (Some(limit), Some(kg)) if kg <= limit => format!("{kg}kg"),
            (Some(_), Some(_)) => return None,
            _ => known.keywords.iter().find(|kw| tokens.iter().any(|t| keyword_matches(t, kw)))?.to_string(),
        };
        return Some(SoftMatch { tag: tag.to_string(), label: known.label.to_string(), evidence });
    }
    let words: Vec<&str> = tag.split(|c: char| c == '_' || c == '-' || c.is_whitespace()).filter(|w| !w.is_empty()).collect();
    if words.is_empty() || !words.iter().all(|w| tokens.iter().any(|t| t.as_str() == *w)) { return None; }
    let phrase = words.join(" ");
    Some(SoftMatch { tag: tag.to_string(), label: format!("{phrase} requested"), evidence: phrase })
}

/// A keyword matches a whole token, or a unit glued to a number
/// (`5000mah`, `144hz`).
fn keyword_matches(token: &str, keyword: &str) -> bool {
    token == keyword
        || token
            .strip_suffix(keyword)
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

/// First `<number> kg` in the text, with or without the space.
fn stated_weight_kg(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    lower.match_indices("kg").find_map(|(at, _)| {
        let after = lower[at + 2..].chars().next();
        if after.is_some_and(|c| c.is_alphanumeric()) { return None; }
        let before = lower[..at].trim_end();
        let start = before.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.').len();
        before[start..].parse().ok()
    })
}
