/*
 * This source code is licensed under the Business Source License 1.1.
 * Free for evaluation and non-production use.
 */

//! Rough k-means: mean and weighted-mode cluster representatives.
//!
//! Numeric attributes of a representative are recomputed as the plain
//! mean over the upper region when the cluster has no boundary (or no
//! lower region), and as the blend `wl · mean(lower) + wu · mean(upper)`
//! otherwise. Categorical attributes use the reinforcing weighted mode
//! with region weights matching the same three cases.

use crate::clusterer::{
    cache_rows, nearest, row_values, run_k_style, soft_assign, weighted_mode,
    RoughClusterer, RoughParams,
};
use crate::dataset::Dataset;
use crate::error::ClusterError;
use crate::orthopartition::Orthopartition;

/// Rough k-means clusterer.
///
/// Built once per dataset; the best representatives and orthopartition
/// across all iterations and restarts are retained.
#[derive(Clone, Debug)]
pub struct RoughKMeans {
    params: RoughParams,
    weights: Vec<f64>,
    representatives: Vec<Vec<f64>>,
    clustering: Option<Orthopartition>,
}

impl RoughKMeans {
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

impl RoughClusterer for RoughKMeans {
    fn build_clusterer<D: Dataset>(&mut self, data: &D) -> Result<(), ClusterError> {
        run_k_style(
            data,
            &self.params,
            weighted_mode::<D>,
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

    fn two_group_table() -> Table {
        Table::new(vec![
            Column::numeric("x", vec![0.0, 0.1, 0.2, 1.0, 0.9, 0.8]),
            Column::numeric("y", vec![0.0, 0.0, 0.1, 1.0, 1.0, 0.9]),
            Column::categorical(
                "color",
                vec!["red".into(), "blue".into()],
                vec![0, 0, 0, 1, 1, 1],
            ),
        ])
        .unwrap()
    }

    fn params(iterations: usize) -> RoughParams {
        RoughParams::new(2, iterations, 1.0, 0.3, 0.7, 1, 7)
            .unwrap()
            .with_reweight(false)
    }

    #[test]
    fn test_unbuilt_clusterer_answers_nothing() {
        let km = RoughKMeans::new(params(3));
        let data = two_group_table();
        assert!(km.clustering().is_none());
        assert!(km.cluster_instance(&data, 0).is_none());
        assert!(km.cluster_instances(&data).is_none());
    }

    #[test]
    fn test_zero_iterations_returns_seeded_assignment() {
        let data = two_group_table();
        let mut km = RoughKMeans::new(params(0));
        km.build_clusterer(&data).unwrap();
        // representatives are untouched seeds, and the clustering is
        // exactly their soft assignment
        assert_eq!(km.representatives().len(), 2);
        let at_seeds = km.cluster_instances(&data).unwrap();
        assert_eq!(km.clustering(), Some(&at_seeds));
    }

    #[test]
    fn test_two_groups_separate() {
        let data = two_group_table();
        let mut km = RoughKMeans::new(params(3));
        km.build_clusterer(&data).unwrap();
        let pi = km.clustering().unwrap();
        // every row is claimed by some cluster
        for row in 0..6 {
            assert!(!pi.in_which(row).is_empty(), "row {row} unassigned");
        }
        // the obvious cores end up apart
        let a = km.cluster_instance(&data, 0).unwrap();
        let b = km.cluster_instance(&data, 5).unwrap();
        assert_ne!(a, b);
        // and neighbours stay together
        assert_eq!(a, km.cluster_instance(&data, 1).unwrap());
        assert_eq!(b, km.cluster_instance(&data, 4).unwrap());
    }

    #[test]
    fn test_build_is_deterministic() {
        let data = two_group_table();
        let mut a = RoughKMeans::new(params(4));
        let mut b = RoughKMeans::new(params(4));
        a.build_clusterer(&data).unwrap();
        b.build_clusterer(&data).unwrap();
        assert_eq!(a.clustering(), b.clustering());
        assert_eq!(a.representatives(), b.representatives());
        assert_eq!(a.attribute_weights(), b.attribute_weights());
    }

    #[test]
    fn test_restarts_and_reweighting_still_produce_a_result() {
        let data = two_group_table();
        let p = RoughParams::new(2, 3, 0.9, 0.3, 0.7, 3, 11).unwrap();
        let mut km = RoughKMeans::new(p);
        km.build_clusterer(&data).unwrap();
        let pi = km.clustering().unwrap();
        assert!(!pi.family().is_empty());
        let sum: f64 = km.attribute_weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "weights sum {sum}");
    }

    #[test]
    fn test_k_larger_than_dataset_is_rejected() {
        let data = two_group_table();
        let p = RoughParams::new(7, 2, 0.9, 0.3, 0.7, 1, 0).unwrap();
        let mut km = RoughKMeans::new(p);
        assert!(matches!(
            km.build_clusterer(&data),
            Err(ClusterError::InvalidArgument(_))
        ));
    }
}
