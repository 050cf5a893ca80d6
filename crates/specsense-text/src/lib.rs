//! specsense-text
//!
//! Lexical side of retrieval: a deterministic tokenizer built from tantivy's
//! analyzer chain and an in-memory BM25 index that scores every product.
pub mod bm25;
pub mod tokenize;

pub use bm25::{LexicalIndex, LexicalStats};
pub use tokenize::{analyzer, tokenize, tokenize_with};
