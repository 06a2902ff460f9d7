/*
 * This source code is licensed under the Business Source License 1.1.
 * Free for evaluation and non-production use.
 */

//! Orthopartitions - ordered families of orthopairs over one universe.
//!
//! An orthopartition collects the per-cluster orthopairs of a rough
//! clustering. When `overlap` is `false` no two members may improperly
//! intersect (one member's upper region meeting another's positive
//! region, or positive meeting boundary); when `true` the family is an
//! orthocovering and upper regions may overlap freely.
//!
//! The information-theoretic measures ([`Orthopartition::lower_entropy`],
//! [`Orthopartition::upper_entropy`]) simulate progressive
//! crispification: boundaries are promoted into positive regions step by
//! step, and the final crisp family is scored by the sum of pairwise
//! lower-region size products, normalised by the squared universe size.
//! [`Orthopartition::mutual_information`] and [`Orthopartition::purity`]
//! compare two families over the same universe; mutual information here
//! is a bounded similarity heuristic built from the entropies, not the
//! classical quantity.
//!
//! # Invariants
//!
//! - Every member classifies the same universe, checked at construction.
//! - A family constructed with `overlap == false` holds no improper
//!   pairwise intersection.
//! - Member order is preserved; cluster indices are stable.

use hashbrown::HashSet;

use crate::error::ClusterError;
use crate::orthopair::{ElementSet, Orthopair};

// ─── Membership ─────────────────────────────────────────────────────────────

/// Soft cluster assignment of one element.
///
/// Replaces ad hoc variable-length index lists: an element is either
/// unassigned, certainly in a single cluster, or shared between the
/// boundaries of several clusters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Membership {
    /// The element qualified for no cluster.
    Unassigned,
    /// The element qualified for exactly one cluster (lower region).
    Single(usize),
    /// The element qualified for two or more clusters (boundary of
    /// each). The ids are sorted and unique.
    Multi(Vec<usize>),
}

impl Membership {
    /// Normalise a list of cluster ids into a membership.
    pub fn from_ids(mut ids: Vec<usize>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        match ids.len() {
            0 => Membership::Unassigned,
            1 => Membership::Single(ids[0]),
            _ => Membership::Multi(ids),
        }
    }

    /// Whether this membership references cluster `c`.
    pub fn contains(&self, c: usize) -> bool {
        match self {
            Membership::Unassigned => false,
            Membership::Single(id) => *id == c,
            Membership::Multi(ids) => ids.binary_search(&c).is_ok(),
        }
    }

    /// The referenced cluster ids, in ascending order.
    pub fn ids(&self) -> &[usize] {
        match self {
            Membership::Unassigned => &[],
            Membership::Single(id) => core::slice::from_ref(id),
            Membership::Multi(ids) => ids,
        }
    }

    fn max_id(&self) -> Option<usize> {
        self.ids().last().copied()
    }
}

// ─── Orthopartition ─────────────────────────────────────────────────────────

/// An ordered family of orthopairs sharing one universe.
#[derive(Clone, Debug, PartialEq)]
pub struct Orthopartition {
    family: Vec<Orthopair>,
    overlap: bool,
}

/// True when some ordered pair improperly intersects: one member's
/// upper region meets another's positive region, or one member's
/// positive region meets another's boundary.
fn has_improper_overlap(family: &[Orthopair]) -> bool {
    for (i, a) in family.iter().enumerate() {
        for (j, b) in family.iter().enumerate() {
            if i == j {
                continue;
            }
            let upper_meets_pos = a
                .positive()
                .iter()
                .chain(a.boundary())
                .any(|x| b.positive().contains(x));
            if upper_meets_pos || a.positive().iter().any(|x| b.boundary().contains(x)) {
                return true;
            }
        }
    }
    false
}

/// Every member must classify the same universe as the first.
fn check_shared_universe(family: &[Orthopair]) -> Result<(), ClusterError> {
    if let Some((first, rest)) = family.split_first() {
        for o in rest {
            if !first.same_universe(o) {
                return Err(ClusterError::UniverseMismatch);
            }
        }
    }
    Ok(())
}

impl Orthopartition {
    /// Build from an explicit family and overlap flag.
    ///
    /// Fails with [`ClusterError::UniverseMismatch`] when the members
    /// disagree on the universe, and with [`ClusterError::Overlap`]
    /// when `overlap` is `false` but the family improperly intersects.
    pub fn new(family: Vec<Orthopair>, overlap: bool) -> Result<Self, ClusterError> {
        check_shared_universe(&family)?;
        if !overlap && has_improper_overlap(&family) {
            return Err(ClusterError::Overlap);
        }
        Ok(Self { family, overlap })
    }

    /// Build from an explicit family, auto-detecting the overlap flag
    /// from the first improper pairwise intersection found.
    pub fn from_family(family: Vec<Orthopair>) -> Result<Self, ClusterError> {
        check_shared_universe(&family)?;
        let overlap = has_improper_overlap(&family);
        Ok(Self { family, overlap })
    }

    /// Internal constructor for families whose flag is already known to
    /// be consistent.
    pub(crate) fn from_parts(family: Vec<Orthopair>, overlap: bool) -> Self {
        Self { family, overlap }
    }

    /// Build from per-element memberships over the universe
    /// `0..memberships.len()`.
    ///
    /// Cluster `c` receives: `P` = elements assigned exactly
    /// `Single(c)`, `Bnd` = elements whose `Multi` assignment includes
    /// `c`, `N` = everything else (including unassigned elements). The
    /// family covers ids `0..=max referenced id`; such a family can
    /// never improperly overlap, so the flag is `false`.
    pub fn from_memberships(memberships: &[Membership]) -> Self {
        let clusters = memberships
            .iter()
            .filter_map(Membership::max_id)
            .max()
            .map_or(0, |m| m + 1);
        let mut family = Vec::with_capacity(clusters);
        for c in 0..clusters {
            let mut neg = ElementSet::new();
            let mut pos = ElementSet::new();
            let mut bnd = ElementSet::new();
            for (j, m) in memberships.iter().enumerate() {
                match m {
                    Membership::Single(id) if *id == c => pos.insert(j),
                    Membership::Multi(_) if m.contains(c) => bnd.insert(j),
                    _ => neg.insert(j),
                };
            }
            family.push(Orthopair::from_disjoint(neg, pos, bnd));
        }
        Self { family, overlap: false }
    }

    /// Build from hard integer labels (every element `Single`).
    pub fn from_labels(labels: &[usize]) -> Self {
        let memberships: Vec<Membership> =
            labels.iter().map(|&c| Membership::Single(c)).collect();
        Self::from_memberships(&memberships)
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    /// The member orthopairs, in insertion order.
    pub fn family(&self) -> &[Orthopair] {
        &self.family
    }

    /// Whether the family admits overlapping upper regions
    /// (orthocovering).
    pub fn overlap(&self) -> bool {
        self.overlap
    }

    /// Append an orthopair.
    ///
    /// Returns `false` (family unchanged, no error) when the universe
    /// differs, or when overlap is disallowed and the candidate's upper
    /// region meets a member's positive region or its positive region
    /// meets a member's boundary.
    pub fn add_orthopair(&mut self, o: Orthopair) -> bool {
        if self.family.is_empty() {
            self.family.push(o);
            return true;
        }
        if !self.family[0].same_universe(&o) {
            return false;
        }
        if !self.overlap {
            for p in &self.family {
                let upper_meets_pos = o
                    .positive()
                    .iter()
                    .chain(o.boundary())
                    .any(|x| p.positive().contains(x));
                if upper_meets_pos || o.positive().iter().any(|x| p.boundary().contains(x)) {
                    return false;
                }
            }
        }
        self.family.push(o);
        true
    }

    // ── Boundary queries ───────────────────────────────────────────────────

    /// Number of distinct elements appearing in at least one boundary.
    pub fn total_boundary(&self) -> usize {
        let mut all = HashSet::new();
        for o in &self.family {
            all.extend(o.boundary().iter().copied());
        }
        all.len()
    }

    /// Whether `x` lies in at least one member's boundary.
    pub fn in_boundary(&self, x: usize) -> bool {
        self.family.iter().any(|o| o.boundary().contains(&x))
    }

    /// Number of members whose boundary holds `x`.
    pub fn num_boundaries(&self, x: usize) -> usize {
        self.family
            .iter()
            .filter(|o| o.boundary().contains(&x))
            .count()
    }

    /// Indices of the members whose upper region holds `x`.
    pub fn in_which(&self, x: usize) -> Vec<usize> {
        self.family
            .iter()
            .enumerate()
            .filter(|(_, o)| o.in_upper(x))
            .map(|(i, _)| i)
            .collect()
    }

    // ── Entropies via progressive crispification ───────────────────────────

    /// Lower entropy: crispify by repeatedly promoting the whole
    /// boundary of the largest-upper member among those with a
    /// non-empty boundary (first member wins ties), removing the
    /// promoted elements from every other member's boundary into its
    /// negative region. With overlap every boundary is promoted at
    /// once, ties being unresolvable by exclusivity. The crisp family
    /// is then scored by pairwise lower-size products (overlap variant:
    /// the first operand is reduced by the pairwise lower
    /// intersection), normalised by the squared universe size.
    pub fn lower_entropy(&self) -> f64 {
        let mut tmp = self.working_copy();
        if tmp.is_empty() {
            return 0.0;
        }
        if !self.overlap {
            while any_boundary(&tmp) {
                let Some(m) = pick_largest_upper(&tmp) else { break };
                promote_all(&mut tmp[m]);
                let promoted = tmp[m].pos.clone();
                crispify_others(&mut tmp, m, &promoted);
            }
            pairwise_product(&tmp, false)
        } else {
            while any_boundary(&tmp) {
                for c in tmp.iter_mut() {
                    promote_all(c);
                }
            }
            pairwise_product(&tmp, true)
        }
    }

    /// Upper entropy: crispify by promoting exactly one boundary
    /// element at a time from the smallest-lower member among those
    /// with a non-empty boundary (first member wins ties). The
    /// promotion loop is shared between the overlap settings; only the
    /// final pairwise scoring differs, exactly as in
    /// [`Orthopartition::lower_entropy`].
    pub fn upper_entropy(&self) -> f64 {
        let mut tmp = self.working_copy();
        if tmp.is_empty() {
            return 0.0;
        }
        while any_boundary(&tmp) {
            let Some(m) = pick_smallest_lower(&tmp) else { break };
            promote_one(&mut tmp[m]);
            let promoted = tmp[m].pos.clone();
            crispify_others(&mut tmp, m, &promoted);
        }
        pairwise_product(&tmp, self.overlap)
    }

    /// Clone the family regions into unvalidated working state for the
    /// crispification loops, which transiently break disjointness in
    /// the overlap variants.
    fn working_copy(&self) -> Vec<Regions> {
        self.family
            .iter()
            .map(|o| Regions {
                neg: o.negative().clone(),
                pos: o.positive().clone(),
                bnd: o.boundary().clone(),
            })
            .collect()
    }

    // ── Algebra and comparison measures ────────────────────────────────────

    /// Meet of two orthopartitions: every pairwise member intersection
    /// that is non-empty, with the overlap flags OR-ed.
    pub fn meet(&self, other: &Orthopartition) -> Result<Orthopartition, ClusterError> {
        let mut fam = Vec::new();
        for o in &self.family {
            for p in &other.family {
                let m = o.intersect(p)?;
                if !m.is_empty() {
                    fam.push(m);
                }
            }
        }
        Orthopartition::new(fam, self.overlap || other.overlap)
    }

    /// Bounded similarity between two orthopartitions over the same
    /// universe.
    ///
    /// `avg(self) + avg(other) − avg(meet)`, where `avg` is the mean of
    /// lower and upper entropy, divided by the larger of the two
    /// single-partition averages. A heuristic in the shape of mutual
    /// information, not the classical quantity.
    pub fn mutual_information(&self, other: &Orthopartition) -> Result<f64, ClusterError> {
        let own = (self.lower_entropy() + self.upper_entropy()) / 2.0;
        let theirs = (other.lower_entropy() + other.upper_entropy()) / 2.0;
        let meet = self.meet(other)?;
        let joint = (meet.lower_entropy() + meet.upper_entropy()) / 2.0;
        let mut result = own + theirs - joint;
        if own > theirs {
            result /= own;
        } else {
            result /= theirs;
        }
        Ok(result)
    }

    /// Purity of `other` as a reconstruction of `self`.
    ///
    /// Each member of `self` is matched with its best-scoring candidate
    /// in `other`: the lower-region intersection size plus, for every
    /// boundary element found in the candidate's lower region, a
    /// fractional credit of one over the number of `self` members whose
    /// boundary holds that element. Scores are summed over `self` and
    /// normalised by the universe size.
    pub fn purity(&self, other: &Orthopartition) -> Result<f64, ClusterError> {
        let mut result = 0.0;
        for o in &self.family {
            let mut best = 0.0_f64;
            for p in &other.family {
                let mut size = o.intersect(p)?.lower_size() as f64;
                for &x in o.boundary() {
                    if p.positive().contains(&x) {
                        size += 1.0 / self.num_boundaries(x) as f64;
                    }
                }
                if size > best {
                    best = size;
                }
            }
            result += best;
        }
        let denom = other.family.first().map_or(0, Orthopair::universe_size);
        if denom == 0 {
            return Ok(0.0);
        }
        Ok(result / denom as f64)
    }
}

// ─── Crispification working state ───────────────────────────────────────────

/// Raw region triple used by the entropy loops. Disjointness is not
/// maintained here: the overlap variants transiently push promoted
/// elements into negative regions that may already hold them as
/// positive, and the universe size deliberately counts such elements
/// twice, matching the measure's definition.
struct Regions {
    neg: ElementSet,
    pos: ElementSet,
    bnd: ElementSet,
}

impl Regions {
    fn lower_size(&self) -> usize {
        self.pos.len()
    }

    fn upper_size(&self) -> usize {
        self.pos.len() + self.bnd.len()
    }

    fn universe_size(&self) -> usize {
        self.neg.len() + self.pos.len() + self.bnd.len()
    }
}

fn any_boundary(tmp: &[Regions]) -> bool {
    tmp.iter().any(|c| !c.bnd.is_empty())
}

/// Index of the boundary-carrying member with the largest upper region,
/// first one winning ties.
fn pick_largest_upper(tmp: &[Regions]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in tmp.iter().enumerate() {
        if c.bnd.is_empty() {
            continue;
        }
        match best {
            None => best = Some(i),
            Some(b) => {
                if c.upper_size() > tmp[b].upper_size() {
                    best = Some(i);
                }
            }
        }
    }
    best
}

/// Index of the boundary-carrying member with the smallest lower
/// region, first one winning ties.
fn pick_smallest_lower(tmp: &[Regions]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in tmp.iter().enumerate() {
        if c.bnd.is_empty() {
            continue;
        }
        match best {
            None => best = Some(i),
            Some(b) => {
                if c.lower_size() < tmp[b].lower_size() {
                    best = Some(i);
                }
            }
        }
    }
    best
}

/// Promote the whole boundary into the positive region.
fn promote_all(c: &mut Regions) {
    let drained: Vec<usize> = c.bnd.drain().collect();
    c.pos.extend(drained);
}

/// Promote the single smallest-index boundary element.
fn promote_one(c: &mut Regions) {
    if let Some(&x) = c.bnd.iter().min() {
        c.bnd.remove(&x);
        c.pos.insert(x);
    }
}

/// Remove `promoted` from every other member's boundary and add it to
/// its negative region.
fn crispify_others(tmp: &mut [Regions], skip: usize, promoted: &ElementSet) {
    for (i, c) in tmp.iter_mut().enumerate() {
        if i == skip {
            continue;
        }
        c.bnd.retain(|x| !promoted.contains(x));
        c.neg.extend(promoted.iter().copied());
    }
}

/// Sum of ordered pairwise lower-size products over the crisp family,
/// normalised by the squared universe size of the first member. The
/// overlap variant subtracts the pairwise lower intersection from the
/// first operand to avoid double counting shared elements.
fn pairwise_product(tmp: &[Regions], overlap: bool) -> f64 {
    let mut sum = 0.0;
    for (i, a) in tmp.iter().enumerate() {
        for (j, b) in tmp.iter().enumerate() {
            if i == j {
                continue;
            }
            let lhs = if overlap {
                let shared = a.pos.iter().filter(|x| b.pos.contains(*x)).count();
                (a.lower_size() - shared) as f64
            } else {
                a.lower_size() as f64
            };
            sum += lhs * b.lower_size() as f64;
        }
    }
    let u = tmp[0].universe_size() as f64;
    if u == 0.0 {
        return 0.0;
    }
    sum / (u * u)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
