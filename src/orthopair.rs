//! Orthopairs - the atomic three-region classification of a universe.
//!
//! An orthopair splits a universe of elements (dataset row indices)
//! into a positive region `P` (certainly in the cluster), a boundary
//! region `Bnd` (possibly in the cluster) and a negative region `N`
//! (certainly excluded). The three regions are pairwise disjoint and
//! together cover the universe.
//!
//! The algebra is value-based: [`Orthopair::union`] and
//! [`Orthopair::intersect`] return new orthopairs and never mutate
//! their operands, so shared instances cannot alias each other into an
//! inconsistent state.
//!
//! # Invariants
//!
//! - The regions are pairwise disjoint, enforced on construction and on
//!   every region-replacing mutation.
//! - `universe() == N ∪ P ∪ Bnd`; the universe of an orthopair never
//!   changes under the algebra, only the split of elements between
//!   regions does.
//! - `entropy()` lies in `[0, 1]` and is `0` exactly when the boundary
//!   is empty.

use hashbrown::HashSet;

use crate::error::ClusterError;

/// A set of dataset elements, identified by row index.
pub type ElementSet = HashSet<usize>;

/// Three-region classification of a universe relative to one cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Orthopair {
    neg: ElementSet,
    pos: ElementSet,
    bnd: ElementSet,
}

/// Check that `a` and `b` share no element, naming the pair on failure.
fn ensure_disjoint(
    a: &ElementSet,
    b: &ElementSet,
    regions: &'static str,
) -> Result<(), ClusterError> {
    // Probe the smaller set against the larger one.
    let (probe, other) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if probe.iter().any(|x| other.contains(x)) {
        return Err(ClusterError::NonDisjoint { regions });
    }
    Ok(())
}

impl Orthopair {
    /// Build an orthopair from its negative, positive and boundary
    /// regions, validating pairwise disjointness.
    pub fn new(
        neg: ElementSet,
        pos: ElementSet,
        bnd: ElementSet,
    ) -> Result<Self, ClusterError> {
        ensure_disjoint(&pos, &neg, "positive/negative")?;
        ensure_disjoint(&pos, &bnd, "positive/boundary")?;
        ensure_disjoint(&bnd, &neg, "boundary/negative")?;
        Ok(Self { neg, pos, bnd })
    }

    /// Build without validation. Only for callers that construct the
    /// regions disjoint by construction.
    pub(crate) fn from_disjoint(neg: ElementSet, pos: ElementSet, bnd: ElementSet) -> Self {
        debug_assert!(pos.iter().all(|x| !neg.contains(x) && !bnd.contains(x)));
        debug_assert!(bnd.iter().all(|x| !neg.contains(x)));
        Self { neg, pos, bnd }
    }

    // ── Region access ──────────────────────────────────────────────────────

    /// The negative (excluded) region.
    pub fn negative(&self) -> &ElementSet {
        &self.neg
    }

    /// The positive (lower) region.
    pub fn positive(&self) -> &ElementSet {
        &self.pos
    }

    /// The boundary region.
    pub fn boundary(&self) -> &ElementSet {
        &self.bnd
    }

    /// Replace the negative region, re-validating disjointness against
    /// the positive and boundary regions.
    pub fn set_negative(&mut self, neg: ElementSet) -> Result<(), ClusterError> {
        ensure_disjoint(&self.pos, &neg, "positive/negative")?;
        ensure_disjoint(&self.bnd, &neg, "boundary/negative")?;
        self.neg = neg;
        Ok(())
    }

    /// Replace the positive region, re-validating disjointness against
    /// the negative and boundary regions.
    pub fn set_positive(&mut self, pos: ElementSet) -> Result<(), ClusterError> {
        ensure_disjoint(&pos, &self.neg, "positive/negative")?;
        ensure_disjoint(&pos, &self.bnd, "positive/boundary")?;
        self.pos = pos;
        Ok(())
    }

    /// Replace the boundary region, re-validating disjointness against
    /// the negative and positive regions.
    pub fn set_boundary(&mut self, bnd: ElementSet) -> Result<(), ClusterError> {
        ensure_disjoint(&self.pos, &bnd, "positive/boundary")?;
        ensure_disjoint(&bnd, &self.neg, "boundary/negative")?;
        self.bnd = bnd;
        Ok(())
    }

    // ── Universe queries ───────────────────────────────────────────────────

    /// The universe this orthopair classifies: `N ∪ P ∪ Bnd`.
    pub fn universe(&self) -> ElementSet {
        let mut u = ElementSet::with_capacity(self.universe_size());
        u.extend(self.neg.iter().copied());
        u.extend(self.pos.iter().copied());
        u.extend(self.bnd.iter().copied());
        u
    }

    /// Number of elements in the universe.
    pub fn universe_size(&self) -> usize {
        self.neg.len() + self.pos.len() + self.bnd.len()
    }

    /// Whether `x` belongs to the universe.
    pub fn contains(&self, x: usize) -> bool {
        self.neg.contains(&x) || self.pos.contains(&x) || self.bnd.contains(&x)
    }

    /// Whether `x` belongs to the upper region `P ∪ Bnd`.
    pub fn in_upper(&self, x: usize) -> bool {
        self.pos.contains(&x) || self.bnd.contains(&x)
    }

    /// Whether both orthopairs classify the same universe.
    pub fn same_universe(&self, other: &Orthopair) -> bool {
        self.universe_size() == other.universe_size()
            && self.neg.iter().all(|&x| other.contains(x))
            && self.pos.iter().all(|&x| other.contains(x))
            && self.bnd.iter().all(|&x| other.contains(x))
    }

    // ── Size and uncertainty queries ───────────────────────────────────────

    /// Size of the lower region `P`.
    pub fn lower_size(&self) -> usize {
        self.pos.len()
    }

    /// Size of the upper region `P ∪ Bnd`.
    pub fn upper_size(&self) -> usize {
        self.pos.len() + self.bnd.len()
    }

    /// The boundary-based uncertainty measure `|Bnd| / |universe|`.
    ///
    /// `0` exactly when the orthopair is crisp (empty boundary);
    /// an empty universe is crisp as well.
    pub fn entropy(&self) -> f64 {
        let u = self.universe_size();
        if u == 0 {
            return 0.0;
        }
        self.bnd.len() as f64 / u as f64
    }

    /// Whether the orthopair is empty, i.e. `N == universe`.
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty() && self.bnd.is_empty()
    }

    // ── Truth-ordering algebra ─────────────────────────────────────────────

    /// Join on the truth ordering.
    ///
    /// `N = N1 ∩ N2`, `P = P1 ∪ P2`, `Bnd = (Bnd1 ∪ Bnd2) − N − P`.
    /// Fails with [`ClusterError::UniverseMismatch`] when the operands
    /// classify different universes.
    pub fn union(&self, other: &Orthopair) -> Result<Orthopair, ClusterError> {
        if !self.same_universe(other) {
            return Err(ClusterError::UniverseMismatch);
        }
        let neg: ElementSet = self.neg.intersection(&other.neg).copied().collect();
        let pos: ElementSet = self.pos.union(&other.pos).copied().collect();
        let bnd: ElementSet = self
            .bnd
            .union(&other.bnd)
            .copied()
            .filter(|x| !neg.contains(x) && !pos.contains(x))
            .collect();
        Ok(Orthopair::from_disjoint(neg, pos, bnd))
    }

    /// Meet on the truth ordering.
    ///
    /// `P = P1 ∩ P2`, `N = N1 ∪ N2`, `Bnd = (Bnd1 ∪ Bnd2) − P − N`.
    /// Fails with [`ClusterError::UniverseMismatch`] when the operands
    /// classify different universes.
    pub fn intersect(&self, other: &Orthopair) -> Result<Orthopair, ClusterError> {
        if !self.same_universe(other) {
            return Err(ClusterError::UniverseMismatch);
        }
        let pos: ElementSet = self.pos.intersection(&other.pos).copied().collect();
        let neg: ElementSet = self.neg.union(&other.neg).copied().collect();
        let bnd: ElementSet = self
            .bnd
            .union(&other.bnd)
            .copied()
            .filter(|x| !pos.contains(x) && !neg.contains(x))
            .collect();
        Ok(Orthopair::from_disjoint(neg, pos, bnd))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn set(xs: &[usize]) -> ElementSet {
        xs.iter().copied().collect()
    }

    fn pair(neg: &[usize], pos: &[usize], bnd: &[usize]) -> Orthopair {
        Orthopair::new(set(neg), set(pos), set(bnd)).unwrap()
    }

    #[test]
    fn test_construction_rejects_overlapping_regions() {
        let res = Orthopair::new(set(&[0, 1]), set(&[1, 2]), set(&[]));
        assert_eq!(
            res,
            Err(ClusterError::NonDisjoint { regions: "positive/negative" })
        );
        let res = Orthopair::new(set(&[]), set(&[0]), set(&[0]));
        assert_eq!(
            res,
            Err(ClusterError::NonDisjoint { regions: "positive/boundary" })
        );
        let res = Orthopair::new(set(&[3]), set(&[0]), set(&[3]));
        assert_eq!(
            res,
            Err(ClusterError::NonDisjoint { regions: "boundary/negative" })
        );
    }

    #[test]
    fn test_regions_partition_the_universe() {
        let o = pair(&[2], &[0], &[1]);
        assert_eq!(o.universe(), set(&[0, 1, 2]));
        assert_eq!(o.universe_size(), 3);
        assert_eq!(o.lower_size(), 1);
        assert_eq!(o.upper_size(), 2);
        assert!(o.in_upper(1));
        assert!(!o.in_upper(2));
    }

    #[test]
    fn test_mutators_revalidate() {
        let mut o = pair(&[2], &[0], &[1]);
        assert!(o.set_negative(set(&[0])).is_err());
        assert!(o.set_positive(set(&[1])).is_err());
        assert!(o.set_boundary(set(&[2])).is_err());
        // the failed mutations left the regions unchanged
        assert_eq!(o, pair(&[2], &[0], &[1]));
        o.set_boundary(set(&[])).unwrap();
        o.set_negative(set(&[1, 2])).unwrap();
        assert_eq!(o, pair(&[1, 2], &[0], &[]));
    }

    #[test]
    fn test_union_and_intersect_follow_the_truth_ordering() {
        let a = pair(&[2], &[0], &[1]);
        let b = pair(&[0], &[2], &[1]);
        let join = a.union(&b).unwrap();
        assert_eq!(join, pair(&[], &[0, 2], &[1]));
        let meet = a.intersect(&b).unwrap();
        assert_eq!(meet, pair(&[0, 2], &[], &[1]));
    }

    #[test]
    fn test_union_and_intersect_are_idempotent() {
        let o = pair(&[4], &[0, 1], &[2, 3]);
        assert_eq!(o.union(&o).unwrap(), o);
        assert_eq!(o.intersect(&o).unwrap(), o);
    }

    #[test]
    fn test_algebra_rejects_different_universes() {
        let a = pair(&[1], &[0], &[]);
        let b = pair(&[2], &[0], &[]);
        assert_eq!(a.union(&b), Err(ClusterError::UniverseMismatch));
        assert_eq!(a.intersect(&b), Err(ClusterError::UniverseMismatch));
    }

    #[test]
    fn test_entropy_bounds() {
        let crisp = pair(&[1], &[0], &[]);
        assert_eq!(crisp.entropy(), 0.0);
        let half = pair(&[], &[0], &[1]);
        assert!((half.entropy() - 0.5).abs() < 1e-12);
        let all_bnd = pair(&[], &[], &[0, 1]);
        assert!((all_bnd.entropy() - 1.0).abs() < 1e-12);
        assert!(all_bnd.entropy() <= 1.0 && crisp.entropy() >= 0.0);
    }

    #[test]
    fn test_is_empty_means_negative_equals_universe() {
        let empty = pair(&[0, 1, 2], &[], &[]);
        assert!(empty.is_empty());
        let not_empty = pair(&[0, 1], &[], &[2]);
        assert!(!not_empty.is_empty());
    }
}
