//! Score normalization, linear fusion and ranking.
//!
//! All arrays here are full-catalog and indexed by handle.

use specsense_core::types::Handle;

/// Smallest `max - min` used when normalizing; all-equal inputs map to 0.
pub const RANGE_FLOOR: f32 = 1e-9;

/// Min-max normalize into `[0, 1]`.
pub fn normalize(scores: &[f32]) -> Vec<f32> {
    let Some(&first) = scores.first() else { return Vec::new() };
    let (min, max) = scores.iter().fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let range = (max - min).max(RANGE_FLOOR);
    scores.iter().map(|&s| ((s - min) / range).clamp(0.0, 1.0)).collect()
}

/// Spread sparse `(handle, score)` hits over the catalog; absent handles get 0.
pub fn densify(hits: &[(Handle, f32)], len: usize) -> Vec<f32> {
    let mut dense = vec![0.0; len];
    for &(handle, score) in hits {
        if let Some(slot) = dense.get_mut(handle) { *slot = score; }
    }
    dense
}

/// `alpha * dense + (1 - alpha) * lexical`, both already normalized.
pub fn fuse(dense: &[f32], lexical: &[f32], alpha: f32) -> Vec<f32> {
    debug_assert_eq!(dense.len(), lexical.len());
    dense.iter().zip(lexical).map(|(d, l)| alpha * d + (1.0 - alpha) * l).collect()
}

/// Every handle ordered by score descending, ties by ascending handle.
pub fn rank(scores: &[f32]) -> Vec<Handle> {
    let mut order: Vec<Handle> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order
}

/// Dense candidates to request: `top_k * factor`, never more than the catalog.
pub fn candidate_pool(top_k: usize, catalog_len: usize, factor: usize) -> usize {
    top_k.saturating_mul(factor.max(1)).min(catalog_len)
}
