use specsense_core::config::Bm25Params;
use specsense_core::types::ProductRecord;
use specsense_core::Catalog;
use specsense_text::LexicalIndex;

fn laptops() -> Catalog {
    Catalog::from_products(vec![
        ProductRecord::new("A", "lightweight coding laptop 16GB battery").with_price(28000.0),
        ProductRecord::new("B", "gaming laptop RGB heavy").with_price(90000.0),
        ProductRecord::new("C", "ultrabook long battery coding").with_price(32000.0),
    ])
}

#[test]
fn laptop_query_ranks_gaming_laptop_last() {
    let idx = LexicalIndex::build(&laptops(), Bm25Params::default());
    let s = idx.score("lightweight laptop for coding with long battery");
    assert!(s[0] > s[1], "A={} B={}", s[0], s[1]);
    assert!(s[2] > s[1], "C={} B={}", s[2], s[1]);
}

#[test]
fn rebuild_from_same_catalog_is_deterministic() {
    let catalog = laptops();
    let q = "lightweight laptop for coding with long battery";
    let first = LexicalIndex::build(&catalog, Bm25Params::default()).score(q);
    for _ in 0..5 {
        let again = LexicalIndex::build(&catalog, Bm25Params::default()).score(q);
        assert_eq!(first, again);
    }
}

#[test]
fn corpus_statistics() {
    let idx = LexicalIndex::build(&laptops(), Bm25Params::default());
    let stats = idx.stats();
    assert_eq!(stats.documents, 3);
    // lightweight coding laptop 16gb battery gaming rgb heavy ultrabook long
    assert_eq!(stats.vocabulary, 10);
    assert!((stats.avg_doc_len - 13.0 / 3.0).abs() < 1e-6);
}

#[test]
fn custom_parameters_change_length_normalization() {
    let catalog = Catalog::from_products(vec![
        ProductRecord::new("short", "battery"),
        ProductRecord::new("long", "battery pack with extra cells inside"),
        ProductRecord::new("none", "cable"),
        ProductRecord::new("none2", "charger"),
        ProductRecord::new("none3", "mouse"),
        ProductRecord::new("none4", "keyboard"),
    ]);
    let no_len_norm = Bm25Params { b: 0.0, ..Bm25Params::default() };
    let s = LexicalIndex::build(&catalog, no_len_norm).score("battery");
    assert!((s[0] - s[1]).abs() < 1e-6, "b = 0 ignores document length");
    let s = LexicalIndex::build(&catalog, Bm25Params::default()).score("battery");
    assert!(s[0] > s[1]);
}
