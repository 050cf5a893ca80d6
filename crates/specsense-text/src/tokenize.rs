use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Lowercase, split on whitespace and punctuation. No stemming and no stop
/// words so scores stay identical across languages and runs.
pub fn analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build()
}

pub fn tokenize(text: &str) -> Vec<String> {
	tokenize_with(&mut analyzer(), text)
}

/// Tokenize with a caller-owned analyzer, so batch builds can reuse one per worker.
pub fn tokenize_with(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut stream = analyzer.token_stream(text);
	let mut tokens = Vec::new();
	while stream.advance() { tokens.push(stream.token().text.clone()); }
	tokens
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_punctuation_and_lowercases() {
		assert_eq!(tokenize("Lightweight, 16GB-RAM laptop!"), vec!["lightweight", "16gb", "ram", "laptop"]);
	}

	#[test]
	fn keeps_stop_words() {
		assert_eq!(tokenize("for the win"), vec!["for", "the", "win"]);
	}

	#[test]
	fn blank_text_has_no_tokens() {
		assert!(tokenize("  \t ").is_empty());
		assert!(tokenize("--- !!").is_empty());
	}
}
