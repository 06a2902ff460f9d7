/*
 * This source code is licensed under the Business Source License 1.1.
 * Free for evaluation and non-production use.
 */

//! Rough agglomerative refinement: clustering without a fixed `k`.
//!
//! Each round builds one orthopair per element, positive on everything
//! within normalised distance `1 − threshold` (self always included),
//! optionally compacts the family with the greedy maximum-coverage
//! heuristic, then merges pairs to a fixed point: `oi` and `oj` fuse
//! into `(P = Pi ∪ Pj, N = Ni − Pj)` whenever `Pj ⊆ Pi` or the overlap
//! ratio `|Pi ∩ Pj| / (|Pi ∪ Pj| − |Pi ∩ Pj|)` reaches the threshold.
//! After merging, every element claimed positive by more than one
//! survivor is demoted to the boundary of all of them, the overlap flag
//! is recomputed and the attributes are reweighted. Orthopairs left
//! with neither positive nor boundary elements are dropped from the
//! final result.
//!
//! There are no fixed representatives, so
//! [`RoughClusterer::cluster_instance`] has no answer here.

use tracing::debug;

use crate::clusterer::{
    cache_rows, distance, family_intersects, greedy_cover, uniform_weights,
    validate_dataset, weight_attributes, RoughClusterer,
};
use crate::dataset::Dataset;
use crate::error::ClusterError;
use crate::orthopair::{ElementSet, Orthopair};
use crate::orthopartition::Orthopartition;

/// Rough refinement clusterer. The number of clusters emerges from the
/// merge process instead of being configured.
#[derive(Clone, Debug)]
pub struct RoughRefinement {
    iterations: usize,
    threshold: f64,
    use_heuristic: bool,
    weights: Vec<f64>,
    representatives: Vec<Vec<f64>>,
    clustering: Option<Orthopartition>,
}

impl RoughRefinement {
    /// Create an unbuilt refinement clusterer.
    ///
    /// `iterations` must be at least one and `threshold` must lie in
    /// `(0, 1]`; the compaction heuristic defaults to enabled.
    pub fn new(iterations: usize, threshold: f64) -> Result<Self, ClusterError> {
        if iterations == 0 {
            return Err(ClusterError::InvalidArgument(
                "iterations must be at least 1".into(),
            ));
        }
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ClusterError::InvalidArgument(format!(
                "threshold must lie in (0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            iterations,
            threshold,
            use_heuristic: true,
            weights: Vec::new(),
            representatives: Vec::new(),
            clustering: None,
        })
    }

    /// Toggle the greedy maximum-coverage compaction.
    pub fn with_heuristic(mut self, on: bool) -> Self {
        self.use_heuristic = on;
        self
    }

    /// One orthopair per element: positive on every element within
    /// normalised distance `1 − threshold`, negative on the rest.
    fn neighbourhood_family<D: Dataset>(
        &self,
        data: &D,
        rows: &[Vec<f64>],
    ) -> Vec<Orthopair> {
        let n = rows.len();
        let mut family = Vec::with_capacity(n);
        for i1 in 0..n {
            let mut pos = ElementSet::new();
            let mut neg = ElementSet::new();
            for i2 in 0..n {
                let d = distance(data, &self.weights, &rows[i1], &rows[i2]);
                if i1 == i2 || d <= 1.0 - self.threshold {
                    pos.insert(i2);
                } else {
                    neg.insert(i2);
                }
            }
            family.push(Orthopair::from_disjoint(neg, pos, ElementSet::new()));
        }
        family
    }

    /// Merge the family to a fixed point.
    fn merge_family(&self, mut family: Vec<Orthopair>) -> Result<Vec<Orthopair>, ClusterError> {
        loop {
            let mut modified = false;
            let mut erased = vec![false; family.len()];
            let mut added: Vec<Orthopair> = Vec::new();
            for i in 0..family.len() {
                if erased[i] {
                    continue;
                }
                for j in 0..family.len() {
                    if i == j || erased[i] || erased[j] {
                        continue;
                    }
                    let (oi, oj) = (&family[i], &family[j]);
                    let subset = oj.positive().iter().all(|x| oi.positive().contains(x));
                    let shared = oi
                        .positive()
                        .iter()
                        .filter(|x| oj.positive().contains(*x))
                        .count();
                    let merged_pos: ElementSet =
                        oi.positive().union(oj.positive()).copied().collect();
                    let ratio = shared as f64 / (merged_pos.len() - shared) as f64;
                    if subset || ratio >= self.threshold {
                        let merged_neg: ElementSet = oi
                            .negative()
                            .iter()
                            .filter(|x| !oj.positive().contains(*x))
                            .copied()
                            .collect();
                        added.push(Orthopair::new(
                            merged_neg,
                            merged_pos,
                            oi.boundary().clone(),
                        )?);
                        erased[i] = true;
                        erased[j] = true;
                        modified = true;
                    }
                }
            }
            let mut next: Vec<Orthopair> = family
                .into_iter()
                .zip(erased)
                .filter(|(_, gone)| !gone)
                .map(|(o, _)| o)
                .collect();
            next.extend(added);
            family = next;
            if !modified {
                return Ok(family);
            }
        }
    }

    /// Demote every element claimed positive by more than one member to
    /// the boundary of all of them.
    fn demote_shared_positives(
        &self,
        family: &mut [Orthopair],
        n: usize,
    ) -> Result<(), ClusterError> {
        for x in 0..n {
            let holders: Vec<usize> = family
                .iter()
                .enumerate()
                .filter(|(_, o)| o.positive().contains(&x))
                .map(|(i, _)| i)
                .collect();
            if holders.len() == 1 {
                continue;
            }
            for &h in &holders {
                let mut pos = family[h].positive().clone();
                pos.remove(&x);
                let mut bnd = family[h].boundary().clone();
                bnd.insert(x);
                family[h] = Orthopair::new(family[h].negative().clone(), pos, bnd)?;
            }
        }
        Ok(())
    }
}

impl RoughClusterer for RoughRefinement {
    fn build_clusterer<D: Dataset>(&mut self, data: &D) -> Result<(), ClusterError> {
        validate_dataset(data)?;
        let rows = cache_rows(data);
        let n = rows.len();
        self.weights = uniform_weights(data.num_attributes());
        self.clustering = None;

        let mut result: Option<Orthopartition> = None;
        for round in 0..self.iterations {
            let mut family = self.neighbourhood_family(data, &rows);
            if self.use_heuristic {
                family = greedy_cover(family);
            }
            let mut family = self.merge_family(family)?;
            self.demote_shared_positives(&mut family, n)?;
            let overlap = family_intersects(&family)?;
            let p = Orthopartition::new(family, overlap)?;
            weight_attributes(
                data,
                &rows,
                self.threshold,
                self.use_heuristic,
                &p,
                &mut self.weights,
            )?;
            debug!(round, clusters = p.family().len(), overlap, "refinement round");
            result = Some(p);
        }

        if let Some(p) = result {
            let overlap = p.overlap();
            let survivors: Vec<Orthopair> = p
                .family()
                .iter()
                .filter(|o| !o.is_empty())
                .cloned()
                .collect();
            self.clustering = Some(Orthopartition::from_parts(survivors, overlap));
        }
        Ok(())
    }

    fn cluster_instance<D: Dataset>(&self, _data: &D, _row: usize) -> Option<usize> {
        // no fixed representative set to measure against
        None
    }

    fn cluster_instances<D: Dataset>(&self, _data: &D) -> Option<Orthopartition> {
        None
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
            Column::numeric("x", vec![0.0, 0.1, 1.0, 0.9]),
            Column::numeric("y", vec![0.0, 0.0, 1.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_construction_validates_arguments() {
        assert!(matches!(
            RoughRefinement::new(0, 0.8),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RoughRefinement::new(2, 0.0),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(RoughRefinement::new(1, 1.0).is_ok());
    }

    #[test]
    fn test_two_tight_groups_emerge() {
        let data = two_group_table();
        let mut rc = RoughRefinement::new(1, 0.8).unwrap();
        rc.build_clusterer(&data).unwrap();
        let pi = rc.clustering().unwrap();
        assert_eq!(pi.family().len(), 2);
        let lowers: Vec<usize> = pi.family().iter().map(Orthopair::lower_size).collect();
        assert_eq!(lowers, vec![2, 2]);
        // 0 with 1, 2 with 3
        assert_eq!(pi.in_which(0), pi.in_which(1));
        assert_eq!(pi.in_which(2), pi.in_which(3));
        assert_ne!(pi.in_which(0), pi.in_which(2));
    }

    #[test]
    fn test_single_blob_merges_to_one_cluster() {
        let data = Table::new(vec![
            Column::numeric("x", vec![0.0, 0.05, 0.1, 0.15]),
            Column::numeric("y", vec![0.0, 0.05, 0.1, 0.15]),
        ])
        .unwrap();
        // adjacent rows sit at normalised distance 2/3, so a loose
        // threshold links the chain and the overlap ratio merges it
        let mut rc = RoughRefinement::new(1, 0.3).unwrap();
        rc.build_clusterer(&data).unwrap();
        let pi = rc.clustering().unwrap();
        assert_eq!(pi.family().len(), 1);
        assert_eq!(pi.family()[0].lower_size(), 4);
    }

    #[test]
    fn test_no_empty_orthopair_survives() {
        let data = two_group_table();
        for threshold in [0.5, 0.7, 0.9, 1.0] {
            let mut rc = RoughRefinement::new(2, threshold).unwrap();
            rc.build_clusterer(&data).unwrap();
            for o in rc.clustering().unwrap().family() {
                assert!(!o.is_empty(), "empty orthopair at threshold {threshold}");
            }
        }
    }

    #[test]
    fn test_cluster_instance_is_unsupported() {
        let data = two_group_table();
        let mut rc = RoughRefinement::new(1, 0.8).unwrap();
        rc.build_clusterer(&data).unwrap();
        assert_eq!(rc.cluster_instance(&data, 0), None);
        assert!(rc.cluster_instances(&data).is_none());
        assert!(rc.representatives().is_empty());
    }
}
