use specsense_core::traits::VectorBackend;
use specsense_vector::{DenseIndex, FlatBackend, LanceBackend};

fn vectors() -> Vec<Vec<f32>> {
    vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.7, 0.7, 0.0]]
}

#[test]
fn lance_backend_matches_flat_ranking() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().join("lancedb").to_string_lossy().to_string();

    let lance = DenseIndex::build(vectors(), 3, LanceBackend::new(&uri, "products").create(1, 3)?)?;
    let flat = DenseIndex::build(vectors(), 3, FlatBackend.create(1, 3)?)?;

    let q = [0.9, 0.1, 0.0];
    let from_lance = lance.search(&q, 3)?;
    let from_flat = flat.search(&q, 3)?;
    assert_eq!(from_lance.len(), 3);
    let order = |hits: &[(usize, f32)]| hits.iter().map(|h| h.0).collect::<Vec<_>>();
    assert_eq!(order(&from_lance), order(&from_flat));
    for (a, b) in from_lance.iter().zip(&from_flat) {
        assert!((a.1 - b.1).abs() < 1e-4, "lance={} flat={}", a.1, b.1);
    }
    Ok(())
}

#[test]
fn each_generation_gets_its_own_table() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();
    let backend = LanceBackend::new(&uri, "products");

    let old = DenseIndex::build(vectors(), 3, backend.create(1, 3)?)?;
    let new = DenseIndex::build(vec![vec![0.0, 0.0, 1.0]], 3, backend.create(2, 3)?)?;

    assert_eq!(old.search(&[0.0, 0.0, 1.0], 5)?.len(), 3);
    let hits = new.search(&[0.0, 0.0, 1.0], 5)?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, 0);
    assert!((hits[0].1 - 1.0).abs() < 1e-4);
    Ok(())
}

#[test]
fn retired_generation_tables_stay_on_disk() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();
    let backend = LanceBackend::new(&uri, "products");

    for generation in 1..=2 {
        let index = DenseIndex::build(vectors(), 3, backend.create(generation, 3)?)?;
        drop(index);
    }
    let tables = std::fs::read_dir(tmp.path())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".lance"))
        .count();
    assert_eq!(tables, 2);
    Ok(())
}
