mod common;

use std::sync::Arc;

use common::*;
use serde_json::json;
use specsense_core::types::Query;
use specsense_core::{Catalog, Error};
use specsense_hybrid::{fusion, HybridSearchEngine};
use specsense_vector::{dot, l2_normalize, FlatBackend};

fn names(engine: &HybridSearchEngine, query: &Query) -> Vec<String> {
    engine.search(query).unwrap().render().into_iter().map(|r| r.product_name).collect()
}

#[test]
fn laptop_scenario_ranks_gaming_laptop_last() {
    let engine = engine(laptops());
    let results = engine.search(&Query::new(LAPTOP_QUERY).top_k(3)).unwrap();
    assert_eq!(results.handles(), vec![0, 2, 1]);

    let top = &results.items()[0];
    assert!((0.0..=1.0).contains(&top.score));
    assert!(results.items().windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(results.items()[2].score, 0.0, "B is last on both signals");
}

#[test]
fn budget_leaves_only_the_affordable_laptop() {
    let engine = engine(laptops());
    let query = Query::new(LAPTOP_QUERY).top_k(3).hard("budget", json!("<=30000"));
    assert_eq!(names(&engine, &query), vec!["A"]);
}

#[test]
fn explanations_cite_product_terms_and_preferences() {
    let engine = engine(laptops());
    let query = Query::new(LAPTOP_QUERY).top_k(1).prefer("long_battery");
    let rendered = engine.search(&query).unwrap().render();
    let text = &rendered[0].explanation;
    assert!(text.starts_with("Matches: A\nSpecs: 16GB RAM, 1.2kg, 10h battery"), "{text}");
    assert!(text.contains("Matched terms: lightweight, laptop, coding, battery"), "{text}");
    assert!(text.ends_with("long battery life requested - battery spec present"), "{text}");
    assert_eq!(rendered[0].price, 28000.0);
}

#[test]
fn heavy_laptop_is_not_credited_as_lightweight() {
    let engine = engine(laptops());
    let query = Query::new(LAPTOP_QUERY).top_k(3).prefer("lightweight");
    let rendered = engine.search(&query).unwrap().render();
    let by_name = |name: &str| rendered.iter().find(|r| r.product_name == name).unwrap().explanation.clone();

    assert!(by_name("A").ends_with("lightweight build requested - 1.2kg spec present"), "{}", by_name("A"));
    assert!(by_name("C").ends_with("lightweight build requested - ultrabook spec present"), "{}", by_name("C"));
    assert!(!by_name("B").contains("lightweight build requested"), "{}", by_name("B"));
}

#[test]
fn rendered_scores_are_rounded() {
    let engine = engine(laptops());
    let results = engine.search(&Query::new(LAPTOP_QUERY)).unwrap();
    for (item, rendered) in results.items().iter().zip(results.render()) {
        assert!((f64::from(item.score) - rendered.score).abs() <= 0.00005 + 1e-9);
        assert_eq!((rendered.score * 10_000.0).round() / 10_000.0, rendered.score);
    }
}

#[test]
fn alpha_zero_is_lexical_ranking() {
    let engine = engine(accessories());
    let results = engine.search(&Query::new(ACCESSORY_QUERY).alpha(0.0)).unwrap();
    let lexical = engine.snapshot().lexical().score(ACCESSORY_QUERY);
    assert_eq!(results.handles(), fusion::rank(&lexical));
    assert_eq!(results.handles(), vec![1, 3, 0, 4, 2]);
}

#[test]
fn alpha_one_is_dense_ranking() {
    let embedder = Arc::new(VocabEmbedder::default());
    let engine = engine_with(accessories(), embedder.clone(), 5);
    let results = engine.search(&Query::new(ACCESSORY_QUERY).alpha(1.0)).unwrap();

    let mut q = embedder.embed(ACCESSORY_QUERY);
    l2_normalize(&mut q);
    let cosine: Vec<f32> = accessories()
        .iter()
        .map(|p| {
            let mut v = embedder.embed(&p.description);
            l2_normalize(&mut v);
            dot(&q, &v)
        })
        .collect();
    assert_eq!(results.handles(), fusion::rank(&cosine));
    assert_eq!(results.handles(), vec![2, 1, 3, 0, 4]);
}

#[test]
fn alpha_blends_the_two_signals() {
    let engine = engine(accessories());
    let handles = engine.search(&Query::new(ACCESSORY_QUERY).alpha(0.6)).unwrap().handles();
    assert_eq!(handles, vec![1, 2, 3, 0, 4]);
}

#[test]
fn candidate_factor_changes_which_dense_scores_survive() {
    let query = Query::new(ACCESSORY_QUERY).alpha(0.6).top_k(1);
    // pool of 1: only the riser keeps a dense score
    let narrow = engine_with(accessories(), Arc::new(VocabEmbedder::default()), 1);
    assert_eq!(narrow.search(&query).unwrap().handles(), vec![2]);
    // pool covering the catalog reproduces the exact ranking
    let wide = engine_with(accessories(), Arc::new(VocabEmbedder::default()), 5);
    assert_eq!(wide.search(&query).unwrap().handles(), vec![1]);
}

#[test]
fn top_k_beyond_catalog_returns_everything_ranked() {
    let engine = engine(laptops());
    let results = engine.search(&Query::new(LAPTOP_QUERY).top_k(50)).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results.handles(), vec![0, 2, 1]);
}

#[test]
fn constraint_filter_never_pads() {
    let engine = engine(accessories());
    let query = Query::new(ACCESSORY_QUERY).top_k(4).hard("max_price", 1300);
    let results = engine.search(&query).unwrap();
    assert_eq!(results.handles(), vec![1, 3]);
    for item in results.items() {
        assert!(results.product(item).unwrap().price <= 1300.0);
    }

    let nothing = engine.search(&Query::new(ACCESSORY_QUERY).hard("budget", 10)).unwrap();
    assert!(nothing.is_empty());
}

#[test]
fn rebuilding_from_the_same_catalog_is_deterministic() {
    let engine = engine(accessories());
    let query = Query::new(ACCESSORY_QUERY).alpha(0.35);
    let first = engine.search(&query).unwrap().into_items();
    engine.rebuild(accessories()).unwrap();
    let second = engine.search(&query).unwrap();
    assert_eq!(second.generation(), 2);
    assert_eq!(first, second.into_items());
}

#[test]
fn blank_query_is_constraint_only_and_skips_the_embedder() {
    let embedder = Arc::new(VocabEmbedder::default());
    let engine = engine_with(accessories(), embedder.clone(), 5);
    embedder.set_failing(true);

    let results = engine.search(&Query::new("  ").hard("max_price", "2k")).unwrap();
    assert_eq!(results.handles(), vec![1, 2, 3]);
    assert!(results.items().iter().all(|r| r.score == 0.0));
}

#[test]
fn invalid_query_parameters_are_config_errors() {
    let engine = engine(laptops());
    for query in [Query::new("laptop").alpha(1.5), Query::new("laptop").alpha(-0.1), Query::new("laptop").top_k(0)] {
        let err = engine.search(&query).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
        assert!(!err.is_retryable());
    }
}

#[test]
fn embedder_failure_at_query_time_is_retryable() {
    let embedder = Arc::new(VocabEmbedder::default());
    let engine = engine_with(laptops(), embedder.clone(), 5);
    embedder.set_failing(true);
    let err = engine.search(&Query::new(LAPTOP_QUERY)).unwrap_err();
    assert!(matches!(err, Error::Collaborator { collaborator: "embedder", .. }), "{err}");
    assert!(err.is_retryable());

    embedder.set_failing(false);
    assert_eq!(engine.search(&Query::new(LAPTOP_QUERY)).unwrap().len(), 3);
}

#[test]
fn failed_rebuild_keeps_serving_the_previous_generation() {
    let engine = engine(laptops());
    let options = engine.snapshot().options();

    let err = engine.reindex(accessories(), Arc::new(VocabEmbedder::failing()), options).unwrap_err();
    assert!(err.is_retryable());
    let err = engine.reindex(accessories(), Arc::new(ShortEmbedder), options).unwrap_err();
    assert!(matches!(err, Error::Collaborator { collaborator: "embedder", .. }), "{err}");

    assert_eq!(engine.generation(), 1);
    assert_eq!(engine.snapshot().catalog().len(), 3);
    assert_eq!(engine.search(&Query::new(LAPTOP_QUERY)).unwrap().handles(), vec![0, 2, 1]);
}

#[test]
fn invalid_index_options_are_rejected() {
    let err = HybridSearchEngine::new(Arc::new(VocabEmbedder::default()), Arc::new(FlatBackend), options(0)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn empty_engine_and_empty_catalog_return_nothing() {
    let engine = HybridSearchEngine::new(Arc::new(VocabEmbedder::default()), Arc::new(FlatBackend), options(5)).unwrap();
    assert_eq!(engine.generation(), 0);
    assert!(engine.search(&Query::new(LAPTOP_QUERY)).unwrap().is_empty());

    engine.rebuild(Catalog::from_products(Vec::new())).unwrap();
    assert_eq!(engine.generation(), 1);
    assert!(engine.search(&Query::new(LAPTOP_QUERY)).unwrap().is_empty());
}
