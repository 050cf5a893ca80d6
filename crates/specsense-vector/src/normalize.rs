use std::cmp::Ordering;

use specsense_core::types::Handle;

/// Norms below this are treated as this value.
pub const NORM_FLOOR: f32 = 1e-12;

pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(NORM_FLOOR);
    for x in v { *x /= norm; }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn by_score_then_handle(a: &(Handle, f32), b: &(Handle, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Keep the best `k` hits, ordered by score descending and handle ascending.
pub fn rank_hits(hits: &mut Vec<(Handle, f32)>, k: usize) {
    if k == 0 { hits.clear(); return; }
    if hits.len() > k {
        hits.select_nth_unstable_by(k - 1, by_score_then_handle);
        hits.truncate(k);
    }
    hits.sort_by(by_score_then_handle);
}
