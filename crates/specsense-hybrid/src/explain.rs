//! Human-readable reasons attached to each result.

use specsense_core::types::Product;
use specsense_text::tokenize;
use std::collections::HashSet;

use crate::constraints::SoftMatch;

const SPEC_SEGMENTS: usize = 4;

/// One line per fact: the product, a compact spec summary, query terms found
/// in the product text, and one line per satisfied soft preference.
pub fn explain(product: &Product, query_terms: &[String], soft: &[SoftMatch]) -> String {
    let mut lines = vec![format!("Matches: {}", product.name), format!("Specs: {}", spec_summary(&product.specs))];

    let matched = matched_terms(product, query_terms);
    if !matched.is_empty() {
        lines.push(format!("Matched terms: {}", matched.join(", ")));
    }
    for m in soft {
        lines.push(format!("{} - {} spec present", m.label, m.evidence));
    }
    lines.join("\n")
}

/// First few `,`, `;` or `|` separated segments with whitespace collapsed.
pub fn spec_summary(specs: &str) -> String {
    specs
        .split([',', ';', '|', '\n'])
        .map(|seg| seg.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|seg| !seg.is_empty())
        .take(SPEC_SEGMENTS)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Distinct query terms, in query order, that occur in the product text.
fn matched_terms(product: &Product, query_terms: &[String]) -> Vec<String> {
    if query_terms.is_empty() { return Vec::new(); }
    let text = format!("{} {} {}", product.name, product.description, product.specs);
    let vocabulary: HashSet<String> = tokenize(&text).into_iter().collect();
    let mut seen = HashSet::new();
    query_terms
        .iter()
        .filter(|t| vocabulary.contains(*t) && seen.insert(t.as_str()))
        .cloned()
        .collect()
}
