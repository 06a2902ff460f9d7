/*
 * This source code is licensed under the Business Source License 1.1.
 * Free for evaluation and non-production use.
 */

//! Portable snapshot of a built clustering, for persistence and
//! transport. Requires the `serde` feature.
//!
//! The snapshot captures the result state of any [`RoughClusterer`] at
//! the row-index level: representatives, attribute weights and the
//! per-cluster regions as sorted index lists. The dataset itself is not
//! stored; restoring the orthopartition only needs the snapshot, while
//! reusing the representatives needs the original dataset schema.

use crate::clusterer::RoughClusterer;
use crate::error::ClusterError;
use crate::orthopair::Orthopair;
use crate::orthopartition::Orthopartition;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// One cluster's three regions as sorted row-index lists.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClusterRecord {
    /// Sorted positive (lower) region.
    pub positive: Vec<usize>,
    /// Sorted boundary region.
    pub boundary: Vec<usize>,
    /// Sorted negative region.
    pub negative: Vec<usize>,
}

/// A serialisable snapshot of a built clusterer's result state.
///
/// # Example
///
/// ```rust,ignore
/// use orthoclust::snapshot::ClusteringSnapshot;
///
/// let snapshot = ClusteringSnapshot::capture(&clusterer).unwrap();
/// let json = serde_json::to_string(&snapshot)?;
/// let restored: ClusteringSnapshot = serde_json::from_str(&json)?;
/// let partition = restored.to_orthopartition()?;
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ClusteringSnapshot {
    /// Snapshot format version, [`SNAPSHOT_VERSION`].
    pub version: u16,
    /// Whether the captured orthopartition admits overlaps.
    pub overlap: bool,
    /// The representatives, one value vector per cluster. Empty for
    /// clusterers without fixed representatives.
    pub representatives: Vec<Vec<f64>>,
    /// The final attribute weight vector.
    pub attribute_weights: Vec<f64>,
    /// The per-cluster regions, in family order.
    pub clusters: Vec<ClusterRecord>,
}

fn sorted(set: &crate::orthopair::ElementSet) -> Vec<usize> {
    let mut v: Vec<usize> = set.iter().copied().collect();
    v.sort_unstable();
    v
}

impl ClusteringSnapshot {
    /// Capture the result state of a built clusterer. `None` when the
    /// clusterer was never built.
    pub fn capture<C: RoughClusterer>(clusterer: &C) -> Option<Self> {
        let pi = clusterer.clustering()?;
        Some(Self {
            version: SNAPSHOT_VERSION,
            overlap: pi.overlap(),
            representatives: clusterer.representatives().to_vec(),
            attribute_weights: clusterer.attribute_weights().to_vec(),
            clusters: pi
                .family()
                .iter()
                .map(|o| ClusterRecord {
                    positive: sorted(o.positive()),
                    boundary: sorted(o.boundary()),
                    negative: sorted(o.negative()),
                })
                .collect(),
        })
    }

    /// Rebuild the captured orthopartition, re-validating regions,
    /// universes and the overlap flag.
    pub fn to_orthopartition(&self) -> Result<Orthopartition, ClusterError> {
        let family = self
            .clusters
            .iter()
            .map(|c| {
                Orthopair::new(
                    c.negative.iter().copied().collect(),
                    c.positive.iter().copied().collect(),
                    c.boundary.iter().copied().collect(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Orthopartition::new(family, self.overlap)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusterer::RoughParams;
    use crate::dataset::{Column, Table};
    use crate::kmeans::RoughKMeans;

    fn build_clusterer() -> (Table, RoughKMeans) {
        let data = Table::new(vec![
            Column::numeric("x", vec![0.0, 0.1, 1.0, 0.9]),
            Column::numeric("y", vec![0.0, 0.0, 1.0, 1.0]),
        ])
        .unwrap();
        let params = RoughParams::new(2, 2, 1.0, 0.3, 0.7, 1, 3)
            .unwrap()
            .with_reweight(false);
        let mut km = RoughKMeans::new(params);
        km.build_clusterer(&data).unwrap();
        (data, km)
    }

    #[test]
    fn test_capture_requires_a_built_clusterer() {
        let params = RoughParams::new(2, 2, 1.0, 0.3, 0.7, 1, 3).unwrap();
        let km = RoughKMeans::new(params);
        assert!(ClusteringSnapshot::capture(&km).is_none());
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let (_, km) = build_clusterer();
        let snapshot = ClusteringSnapshot::capture(&km).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: ClusteringSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, restored);
        assert_eq!(restored.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn test_restored_orthopartition_matches_the_original() {
        let (_, km) = build_clusterer();
        let snapshot = ClusteringSnapshot::capture(&km).unwrap();
        let restored = snapshot.to_orthopartition().unwrap();
        assert_eq!(&restored, km.clustering().unwrap());
    }

    #[test]
    fn test_tampered_snapshot_fails_validation() {
        let (_, km) = build_clusterer();
        let mut snapshot = ClusteringSnapshot::capture(&km).unwrap();
        // push a positive element into its own negative region
        let first = snapshot.clusters[0].positive[0];
        snapshot.clusters[0].negative.push(first);
        assert!(snapshot.to_orthopartition().is_err());
    }
}
