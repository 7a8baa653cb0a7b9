use scenephys_geom::Aabb;

/// Deterministic 1D SAP along X with full AABB overlap, NaN-safe and stable.
/// Output pairs are `(i, k)` with `i < k`, sorted.
pub fn pairs_sap(aabbs: &[Aabb]) -> Vec<(usize, usize)> {
    #[derive(Copy, Clone)]
    struct Elem { min: f32, idx: usize }

    let mut elems: Vec<Elem> = aabbs
        .iter()
        .enumerate()
        .filter(|(_, a)| a.min.is_finite() && a.max.is_finite())
        .map(|(idx, a)| Elem { min: a.min.x.min(a.max.x), idx })
        .collect();
    elems.sort_by(|a, b| a.min.total_cmp(&b.min).then(a.idx.cmp(&b.idx)));

    let mut active: Vec<usize> = Vec::new();
    let mut out: Vec<(usize, usize)> = Vec::new();
    for e in elems {
        active.retain(|&j| aabbs[j].max.x >= e.min);
        for &j in &active {
            let (i, k) = if j < e.idx { (j, e.idx) } else { (e.idx, j) };
            if aabbs[i].overlaps(&aabbs[k]) { out.push((i, k)); }
        }
        active.push(e.idx);
    }
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenephys_core::vec2;

    fn bb(x: f32, y: f32) -> Aabb { Aabb::from_center_half_extents(vec2(x, y), vec2(1.0, 1.0)) }

    #[test]
    fn finds_only_overlapping_pairs() {
        let boxes = [bb(0.0, 0.0), bb(1.5, 0.0), bb(1.5, 5.0), bb(10.0, 0.0)];
        assert_eq!(pairs_sap(&boxes), vec![(0, 1)]);
    }

    #[test]
    fn skips_non_finite_boxes() {
        let mut bad = bb(0.0, 0.0);
        bad.max.x = f32::NAN;
        assert!(pairs_sap(&[bad, bb(0.5, 0.0)]).is_empty());
    }

    #[test]
    fn touching_edges_count_as_overlap() {
        let a = [bb(0.0, 0.0), bb(1.0, 0.5), bb(2.0, 1.0)];
        assert_eq!(pairs_sap(&a), vec![(0, 1), (0, 2), (1, 2)]);
    }
}
