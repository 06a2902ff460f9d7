/*
 * This source code is licensed under the Business Source License 1.1.
 * Free for evaluation and non-production use.
 */

//! Rough k-medians: weighted-median categorical representatives.
//!
//! The restart/iteration loop, the numeric representative blend and the
//! quality comparison are exactly those of rough k-means; only the
//! categorical representative differs. The weighted median sorts the
//! combined lower and boundary elements by attribute value, walks them
//! accumulating `wl` per lower element and `wu` per boundary element
//! until half the total weight is reached, and interpolates the
//! midpoint of the two straddling values when the walk lands exactly on
//! the half.

use crate::clusterer::{
    cache_rows, nearest, row_values, run_k_style, soft_assign, RoughClusterer, RoughParams,
};
use crate::dataset::Dataset;
use crate::error::ClusterError;
use crate::orthopair::Orthopair;
use crate::orthopartition::Orthopartition;

/// Weighted median of an attribute over an orthopair's upper region.
///
/// Elements with equal attribute values are ordered by row index so the
/// half-weight walk is deterministic.
pub(crate) fn weighted_median<D: Dataset>(
    _data: &D,
    rows: &[Vec<f64>],
    attr: usize,
    o: &Orthopair,
    wu: f64,
    wl: f64,
) -> f64 {
    let total = wl * o.positive().len() as f64 + wu * o.boundary().len() as f64;
    let mut combined: Vec<usize> = o.positive().iter().chain(o.boundary()).copied().collect();
    combined.sort_unstable_by(|&a, &b| {
        rows[a][attr]
            .partial_cmp(&rows[b][attr])
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    if combined.is_empty() {
        return 0.0;
    }

    let half = total / 2.0;
    let mut weight = 0.0;
    let mut ind: Option<usize> = None;
    for (i, &e) in combined.iter().enumerate() {
        if weight >= half {
            break;
        }
        weight += if o.positive().contains(&e) { wl } else { wu };
        ind = Some(i);
    }
    let Some(ind) = ind else {
        // zero total weight: nothing to accumulate, take the smallest
        return rows[combined[0]][attr];
    };
    if weight == half && ind + 1 < combined.len() {
        (rows[combined[ind]][attr] + rows[combined[ind + 1]][attr]) / 2.0
    } else {
        rows[combined[ind]][attr]
    }
}

/// Rough k-medians clusterer.
#[derive(Clone, Debug)]
pub struct RoughKMedians {
    params: RoughParams,
    weights: Vec<f64>,
    representatives: Vec<Vec<f64>>,
    clustering: Option<Orthopartition>,
}

impl RoughKMedians {
    /// Create an unbuilt clusterer from validated parameters.
    pub fn new(params: RoughParams) -> Self {
        Self {
            params,
            weights: Vec::new(),
            representatives: Vec::new(),
            clustering: None,
        }
    }

    /// The configuration this clusterer runs with.
    pub fn params(&self) -> &RoughParams {
        &self.params
    }
}

impl RoughClusterer for RoughKMedians {
    fn build_clusterer<D: Dataset>(&mut self, data: &D) -> Result<(), ClusterError> {
        run_k_style(
            data,
            &self.params,
            weighted_median::<D>,
            &mut self.representatives,
            &mut self.weights,
            &mut self.clustering,
        )
    }

    fn cluster_instance<D: Dataset>(&self, data: &D, row: usize) -> Option<usize> {
        if self.representatives.is_empty() {
            return None;
        }
        let point = row_values(data, row);
        nearest(data, &self.representatives, &self.weights, &point)
    }

    fn cluster_instances<D: Dataset>(&self, data: &D) -> Option<Orthopartition> {
        if self.representatives.is_empty() {
            return None;
        }
        let rows = cache_rows(data);
        let memberships = soft_assign(
            data,
            &rows,
            &self.representatives,
            &self.weights,
            self.params.threshold,
        );
        Some(Orthopartition::from_memberships(&memberships))
    }

    fn clustering(&self) -> Option<&Orthopartition> {
        self.clustering.as_ref()
    }

    fn representatives(&self) -> &[Vec<f64>] {
        &self.representatives
    }

    fn attribute_weights(&self) -> &[f64] {
        &self.weights
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Table};
    use crate::orthopair::ElementSet;

    fn line_table() -> Table {
        Table::new(vec![
            Column::numeric("x", vec![0.0, 0.1, 0.2, 1.0, 0.9, 0.8]),
            Column::numeric("y", vec![0.0, 0.0, 0.1, 1.0, 1.0, 0.9]),
        ])
        .unwrap()
    }

    fn set(xs: &[usize]) -> ElementSet {
        xs.iter().copied().collect()
    }

    #[test]
    fn test_weighted_median_of_odd_crisp_region() {
        let t = line_table();
        let rows = crate::clusterer::cache_rows(&t);
        let o = Orthopair::new(set(&[3, 4, 5]), set(&[0, 1, 2]), set(&[])).unwrap();
        // walk stops past half weight 1.5 at the second element
        let m = weighted_median(&t, &rows, 0, &o, 0.0, 1.0);
        assert_eq!(m, 0.1);
    }

    #[test]
    fn test_weighted_median_interpolates_exact_half() {
        let t = line_table();
        let rows = crate::clusterer::cache_rows(&t);
        let o = Orthopair::new(set(&[2, 3, 4, 5]), set(&[0, 1]), set(&[])).unwrap();
        // total weight 2, the first element lands exactly on half
        let m = weighted_median(&t, &rows, 0, &o, 0.0, 1.0);
        assert!((m - 0.05).abs() < 1e-12, "median = {m}");
    }

    #[test]
    fn test_weighted_median_weights_boundary_differently() {
        let t = line_table();
        let rows = crate::clusterer::cache_rows(&t);
        // lower {0}, boundary {1, 2}; wl = 1, wu = 3: total 7,
        // half 3.5, the walk crosses inside the boundary mass
        let o = Orthopair::new(set(&[3, 4, 5]), set(&[0]), set(&[1, 2])).unwrap();
        let m = weighted_median(&t, &rows, 0, &o, 3.0, 1.0);
        assert_eq!(m, 0.1);
    }

    #[test]
    fn test_two_groups_separate() {
        let data = line_table();
        let p = RoughParams::new(2, 3, 1.0, 0.3, 0.7, 1, 5)
            .unwrap()
            .with_reweight(false);
        let mut km = RoughKMedians::new(p);
        km.build_clusterer(&data).unwrap();
        for row in 0..6 {
            assert!(!km.clustering().unwrap().in_which(row).is_empty());
        }
        assert_ne!(
            km.cluster_instance(&data, 0),
            km.cluster_instance(&data, 3)
        );
    }

    #[test]
    fn test_matches_kmeans_loop_on_zero_iterations() {
        // with no iterations both k-style clusterers stop at the same
        // seeded representatives
        let data = line_table();
        let p = RoughParams::new(2, 0, 0.9, 0.3, 0.7, 1, 21)
            .unwrap()
            .with_reweight(false);
        let mut med = RoughKMedians::new(p.clone());
        let mut mea = crate::kmeans::RoughKMeans::new(p);
        med.build_clusterer(&data).unwrap();
        mea.build_clusterer(&data).unwrap();
        assert_eq!(med.representatives(), mea.representatives());
        assert_eq!(med.clustering(), mea.clustering());
    }
}
