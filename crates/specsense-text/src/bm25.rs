//! BM25 scoring over product descriptions.
//!
//! The index is built once from a catalog snapshot and never updated; any
//! catalog change means building a new one.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use specsense_core::config::Bm25Params;
use specsense_core::types::Handle;
use specsense_core::Catalog;

use crate::tokenize::{analyzer, tokenize, tokenize_with};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalStats {
	pub documents: usize,
	pub vocabulary: usize,
	pub avg_doc_len: f32,
}

#[derive(Debug, Clone)]
pub struct LexicalIndex {
	params: Bm25Params,
	doc_lens: Vec<u32>,
	postings: HashMap<String, Vec<(Handle, u32)>>,
	idf: BTreeMap<String, f32>,
	avg_doc_len: f32,
}

impl LexicalIndex {
	/// Tokenize every description in parallel, then reduce corpus statistics
	/// on the calling thread.
	pub fn build(catalog: &Catalog, params: Bm25Params) -> Self {
		let term_freqs: Vec<(u32, BTreeMap<String, u32>)> = catalog
			.products()
			.par_iter()
			.map_init(analyzer, |a, p| {
				let tokens = tokenize_with(a, &p.description);
				let mut tf = BTreeMap::new();
				for t in &tokens { *tf.entry(t.clone()).or_insert(0u32) += 1; }
				(tokens.len() as u32, tf)
			})
			.collect();
		Self::from_term_freqs(term_freqs, params)
	}

	fn from_term_freqs(term_freqs: Vec<(u32, BTreeMap<String, u32>)>, params: Bm25Params) -> Self {
		let n = term_freqs.len();
		let mut doc_lens = Vec::with_capacity(n);
		let mut postings: HashMap<String, Vec<(Handle, u32)>> = HashMap::new();
		let mut doc_freq: BTreeMap<String, u32> = BTreeMap::new();
		let mut total_len = 0u64;
		for (handle, (len, tf)) in term_freqs.into_iter().enumerate() {
			doc_lens.push(len);
			total_len += u64::from(len);
			for (term, f) in tf {
				*doc_freq.entry(term.clone()).or_insert(0) += 1;
				postings.entry(term).or_default().push((handle, f));
			}
		}
		let avg_doc_len = if n == 0 { 0.0 } else { total_len as f32 / n as f32 };
		let idf = okapi_idf(&doc_freq, n, params.epsilon);
		tracing::info!(documents = n, vocabulary = idf.len(), avg_doc_len, "built lexical index");
		Self { params, doc_lens, postings, idf, avg_doc_len }
	}

	/// BM25 score of `query` against every document, indexed by handle.
	/// Repeated query terms count once per occurrence; unknown terms add 0.
	pub fn score(&self, query: &str) -> Vec<f32> {
		let mut scores = vec![0.0f32; self.doc_lens.len()];
		let terms = tokenize(query);
		if terms.is_empty() { return scores; }
		let Bm25Params { k1, b, .. } = self.params;
		for term in &terms {
			let (Some(postings), Some(&idf)) = (self.postings.get(term), self.idf.get(term)) else { continue };
			for &(handle, f) in postings {
				let f = f as f32;
				let dl = self.doc_lens[handle] as f32;
				let norm = k1 * (1.0 - b + b * dl / self.avg_doc_len);
				scores[handle] += idf * (f * (k1 + 1.0)) / (f + norm);
			}
		}
		scores
	}

	pub fn idf(&self, term: &str) -> Option<f32> { self.idf.get(term).copied() }

	pub fn doc_len(&self, handle: Handle) -> Option<u32> { self.doc_lens.get(handle).copied() }

	pub fn len(&self) -> usize { self.doc_lens.len() }

	pub fn is_empty(&self) -> bool { self.doc_lens.is_empty() }

	pub fn params(&self) -> Bm25Params { self.params }

	pub fn stats(&self) -> LexicalStats {
		LexicalStats { documents: self.doc_lens.len(), vocabulary: self.idf.len(), avg_doc_len: self.avg_doc_len }
	}
}

/// `ln((N - df + 0.5) / (df + 0.5))`, with negative values (terms in more
/// than half the corpus) replaced by `epsilon * mean_idf`. The mean is
/// clamped at zero so no term ever lowers a score.
fn okapi_idf(doc_freq: &BTreeMap<String, u32>, n: usize, epsilon: f32) -> BTreeMap<String, f32> {
	let n = n as f32;
	let mut idf = BTreeMap::new();
	let mut sum = 0.0f32;
	let mut negative = Vec::new();
	for (term, &df) in doc_freq {
		let df = df as f32;
		let value = ((n - df + 0.5) / (df + 0.5)).ln();
		sum += value;
		if value < 0.0 { negative.push(term.clone()); }
		idf.insert(term.clone(), value);
	}
	if idf.is_empty() { return idf; }
	let floor = epsilon * (sum / idf.len() as f32).max(0.0);
	for term in negative { idf.insert(term, floor); }
	idf
}
