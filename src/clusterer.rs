/*
 * This source code is licensed under the Business Source License 1.1.
 * Free for evaluation and non-production use.
 */

//! Shared machinery of the rough clusterers.
//!
//! Everything the three concrete clusterers have in common lives here:
//! the validated parameter set ([`RoughParams`]), the build contract
//! ([`RoughClusterer`]), the weighted Gower-style distance, soft
//! assignment, farthest-first seeding, attribute reweighting by mutual
//! information, the Davies-Bouldin quality score and the weighted mode.
//!
//! # Distance
//!
//! `d(x, y) = Σ_a weight[a] · cost_a(x, y)` where a numeric attribute
//! costs `|x_a − y_a| / (max_a − min_a)` and a categorical attribute
//! costs 0 or 1 for equal or unequal codes. A numeric attribute whose
//! range is zero is constant over the dataset and costs nothing.
//! Weights are renormalised to sum to one after every reweighting.
//!
//! # Soft assignment
//!
//! An element joins every cluster whose distance matches the minimum or
//! whose ratio `min / dist` reaches the threshold; an element claimed
//! by several clusters lands in each one's boundary. With at least one
//! representative and finite distances no element is left unassigned.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::dataset::{AttributeKind, Dataset};
use crate::error::ClusterError;
use crate::orthopair::{ElementSet, Orthopair};
use crate::orthopartition::{Membership, Orthopartition};

// ─── Parameters ─────────────────────────────────────────────────────────────

/// Validated configuration shared by the rough clusterers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoughParams {
    /// Number of clusters.
    pub k: usize,
    /// Iterations per restart. Zero is legal for the k-style
    /// clusterers and yields the seeded representatives untouched.
    pub iterations: usize,
    /// Soft-assignment threshold in `(0, 1]`. Higher is stricter: at
    /// `1.0` only exact distance ties share an element.
    pub threshold: f64,
    /// Weight of the upper (boundary) region in representative and
    /// compactness computations.
    pub wu: f64,
    /// Weight of the lower (positive) region.
    pub wl: f64,
    /// Number of restarts; values below one are clamped to one.
    pub restarts: usize,
    /// Compact attribute-induced orthocoverings with the greedy
    /// maximum-coverage heuristic.
    pub use_heuristic: bool,
    /// Recompute attribute weights by mutual information after each
    /// iteration.
    pub reweight: bool,
    /// Seed of the pseudo-random first representative. Restart `r`
    /// seeds with `seed + r`, so restart zero is the externally
    /// visible starting point.
    pub seed: u64,
}

impl RoughParams {
    /// Build a parameter set, validating `k >= 1` and
    /// `threshold ∈ (0, 1]`. `restarts` is clamped to at least one
    /// rather than rejected; the heuristic and reweighting default to
    /// enabled.
    pub fn new(
        k: usize,
        iterations: usize,
        threshold: f64,
        wu: f64,
        wl: f64,
        restarts: usize,
        seed: u64,
    ) -> Result<Self, ClusterError> {
        if k == 0 {
            return Err(ClusterError::InvalidArgument(
                "k must be at least 1".into(),
            ));
        }
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ClusterError::InvalidArgument(format!(
                "threshold must lie in (0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            k,
            iterations,
            threshold,
            wu,
            wl,
            restarts: restarts.max(1),
            use_heuristic: true,
            reweight: true,
            seed,
        })
    }

    /// Toggle the greedy maximum-coverage compaction.
    pub fn with_heuristic(mut self, on: bool) -> Self {
        self.use_heuristic = on;
        self
    }

    /// Toggle mutual-information attribute reweighting.
    pub fn with_reweight(mut self, on: bool) -> Self {
        self.reweight = on;
        self
    }
}

// ─── Build contract ─────────────────────────────────────────────────────────

/// The contract every rough clusterer fulfils.
///
/// A clusterer is built once against a dataset and then queried for its
/// resulting orthopartition, representatives and attribute weights.
/// Building again discards the previous result.
pub trait RoughClusterer {
    /// Run the clustering and populate the result state.
    fn build_clusterer<D: Dataset>(&mut self, data: &D) -> Result<(), ClusterError>;

    /// Hard nearest-representative index for one row, first minimum
    /// winning ties. `None` when the clusterer keeps no fixed
    /// representatives (agglomerative refinement) or was never built.
    fn cluster_instance<D: Dataset>(&self, data: &D, row: usize) -> Option<usize>;

    /// Soft-assign every row against the current representatives and
    /// build the resulting orthopartition. `None` when the clusterer
    /// keeps no fixed representatives.
    fn cluster_instances<D: Dataset>(&self, data: &D) -> Option<Orthopartition>;

    /// The resulting orthopartition, once built.
    fn clustering(&self) -> Option<&Orthopartition>;

    /// The resulting representatives, one value vector per cluster.
    /// Empty for clusterers without fixed representatives.
    fn representatives(&self) -> &[Vec<f64>];

    /// The attribute weight vector of the final state.
    fn attribute_weights(&self) -> &[f64];
}

// ─── Dataset access and validation ──────────────────────────────────────────

/// Materialise one row as a value vector.
pub(crate) fn row_values<D: Dataset>(data: &D, row: usize) -> Vec<f64> {
    (0..data.num_attributes()).map(|a| data.value(row, a)).collect()
}

/// Materialise every row once so the iteration loops stay cheap.
pub(crate) fn cache_rows<D: Dataset>(data: &D) -> Vec<Vec<f64>> {
    (0..data.num_rows()).map(|r| row_values(data, r)).collect()
}

/// Common build preconditions: a non-empty dataset with at least two
/// attributes (the uniform weight `1 / (attributes − 1)` needs the
/// denominator).
pub(crate) fn validate_dataset<D: Dataset>(data: &D) -> Result<(), ClusterError> {
    if data.num_rows() == 0 {
        return Err(ClusterError::InvalidArgument(
            "dataset holds no rows".into(),
        ));
    }
    if data.num_attributes() < 2 {
        return Err(ClusterError::InvalidArgument(
            "dataset must hold at least two attributes".into(),
        ));
    }
    Ok(())
}

/// The uniform starting weight vector `1 / (attributes − 1)`.
pub(crate) fn uniform_weights(num_attributes: usize) -> Vec<f64> {
    vec![1.0 / (num_attributes - 1) as f64; num_attributes]
}

// ─── Distance ───────────────────────────────────────────────────────────────

/// Weighted Gower-style distance between two value vectors.
pub(crate) fn distance<D: Dataset>(
    data: &D,
    weights: &[f64],
    x: &[f64],
    y: &[f64],
) -> f64 {
    let mut dist = 0.0;
    for a in 0..data.num_attributes() {
        let cost = match data.attribute_kind(a) {
            AttributeKind::Numeric => {
                let (min, max) = data.numeric_range(a);
                let range = max - min;
                if range > 0.0 {
                    (x[a] - y[a]).abs() / range
                } else {
                    0.0
                }
            }
            AttributeKind::Categorical => {
                if x[a] == y[a] {
                    0.0
                } else {
                    1.0
                }
            }
        };
        dist += weights[a] * cost;
    }
    dist
}

/// Index of the nearest representative, first minimum winning ties.
pub(crate) fn nearest<D: Dataset>(
    data: &D,
    reps: &[Vec<f64>],
    weights: &[f64],
    point: &[f64],
) -> Option<usize> {
    let mut min = f64::MAX;
    let mut ind = None;
    for (j, rep) in reps.iter().enumerate() {
        let d = distance(data, weights, point, rep);
        if d < min {
            min = d;
            ind = Some(j);
        }
    }
    ind
}

// ─── Seeding ────────────────────────────────────────────────────────────────

/// Seed `k` representatives: a pseudo-random first pick, then greedy
/// farthest-first selection maximising the average distance to the
/// already-chosen set.
pub(crate) fn set_seed<D: Dataset>(
    data: &D,
    rows: &[Vec<f64>],
    weights: &[f64],
    k: usize,
    seed: u64,
) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let first = rng.gen_range(0..n);
    let mut chosen = vec![first];
    let mut reps = vec![rows[first].clone()];
    for _ in 1..k {
        let mut max_dist = 0.0;
        let mut best: Option<usize> = None;
        for inst in 0..n {
            if chosen.contains(&inst) {
                continue;
            }
            let mut dist = 0.0;
            for rep in &reps {
                dist += distance(data, weights, rep, &rows[inst]);
            }
            dist /= reps.len() as f64;
            if dist > max_dist {
                max_dist = dist;
                best = Some(inst);
            }
        }
        // all remaining candidates at distance zero: take the first
        let pick = best
            .or_else(|| (0..n).find(|i| !chosen.contains(i)))
            .unwrap_or(first);
        chosen.push(pick);
        reps.push(rows[pick].clone());
    }
    reps
}

// ─── Soft assignment ────────────────────────────────────────────────────────

/// Soft-assign every row: membership in each cluster whose distance is
/// minimal or within the threshold ratio of the minimum.
pub(crate) fn soft_assign<D: Dataset>(
    data: &D,
    rows: &[Vec<f64>],
    reps: &[Vec<f64>],
    weights: &[f64],
    threshold: f64,
) -> Vec<Membership> {
    rows.iter()
        .map(|row| {
            let dists: Vec<f64> = reps
                .iter()
                .map(|rep| distance(data, weights, row, rep))
                .collect();
            let mut min = f64::MAX;
            for &d in &dists {
                if d < min {
                    min = d;
                }
            }
            let ids: Vec<usize> = dists
                .iter()
                .enumerate()
                .filter(|&(_, &d)| d == min || min / d >= threshold)
                .map(|(j, _)| j)
                .collect();
            Membership::from_ids(ids)
        })
        .collect()
}

// ─── Cluster quality ────────────────────────────────────────────────────────

/// Davies-Bouldin index of an orthopartition against its
/// representatives.
///
/// Per-cluster compactness is the plain average distance to the
/// representative when the lower or the boundary region is empty, and
/// the region-weighted `wl · avg(lower) + wu · avg(boundary)`
/// otherwise. Separation is the representative distance. The score is
/// the mean over clusters of the worst pairwise
/// `(S_j + S_l) / D_jl` coefficient.
pub(crate) fn davies_bouldin<D: Dataset>(
    data: &D,
    pi: &Orthopartition,
    rows: &[Vec<f64>],
    reps: &[Vec<f64>],
    weights: &[f64],
    wu: f64,
    wl: f64,
) -> f64 {
    let k = reps.len();
    let fam = pi.family();
    let m = fam.len();
    debug_assert!(m <= k, "family larger than representative set");
    let mut s = vec![0.0_f64; k];
    let mut d = vec![vec![0.0_f64; k]; k];

    for j in 0..m {
        let pos = fam[j].positive();
        let bnd = fam[j].boundary();
        if bnd.is_empty() || pos.is_empty() {
            let mut sum = 0.0;
            let mut count = 0usize;
            for &i in pos.iter().chain(bnd) {
                sum += distance(data, weights, &rows[i], &reps[j]);
                count += 1;
            }
            s[j] = sum / count as f64;
        } else {
            let mut sp = 0.0;
            for &i in pos {
                sp += wl * distance(data, weights, &rows[i], &reps[j]);
            }
            let mut sb = 0.0;
            for &i in bnd {
                sb += wu * distance(data, weights, &rows[i], &reps[j]);
            }
            s[j] = sp / pos.len() as f64 + sb / bnd.len() as f64;
        }
        for l in (j + 1)..m {
            let v = distance(data, weights, &reps[j], &reps[l]);
            d[j][l] = v;
            d[l][j] = v;
        }
    }

    let mut db = 0.0;
    for j in 0..m {
        let mut max_coeff = 0.0_f64;
        for l in 0..m {
            if l != j {
                let coeff = (s[j] + s[l]) / d[j][l];
                if coeff > max_coeff {
                    max_coeff = coeff;
                }
            }
        }
        db += max_coeff;
    }
    db / k as f64
}

// ─── Weighted mode ──────────────────────────────────────────────────────────

/// Weighted mode of a categorical attribute over an orthopair.
///
/// Per legal value code the tally is updated as
/// `new = old + (contribution + old)` for each contributing element,
/// lower-region elements contributing `wl` and boundary elements `wu`,
/// lower region first. The accumulation is reinforcing, not a plain
/// sum: repeated values snowball. Ties resolve to the lowest code.
pub(crate) fn weighted_mode<D: Dataset>(
    data: &D,
    rows: &[Vec<f64>],
    attr: usize,
    o: &Orthopair,
    wu: f64,
    wl: f64,
) -> f64 {
    let mut tally = vec![0.0_f64; data.categories(attr)];
    let mut lower: Vec<usize> = o.positive().iter().copied().collect();
    lower.sort_unstable();
    for i in lower {
        let v = rows[i][attr] as usize;
        tally[v] += wl + tally[v];
    }
    let mut bound: Vec<usize> = o.boundary().iter().copied().collect();
    bound.sort_unstable();
    for i in bound {
        let v = rows[i][attr] as usize;
        tally[v] += wu + tally[v];
    }

    let mut best = 0usize;
    let mut count = 0.0;
    for (v, &t) in tally.iter().enumerate() {
        if t > count {
            count = t;
            best = v;
        }
    }
    best as f64
}

// ─── Attribute reweighting ──────────────────────────────────────────────────

/// The orthocovering a numeric attribute induces: one orthopair per
/// row, positive on every row whose range-normalised similarity
/// reaches the threshold (self always included), empty boundary.
pub(crate) fn similarity_family<D: Dataset>(
    data: &D,
    rows: &[Vec<f64>],
    attr: usize,
    threshold: f64,
) -> Vec<Orthopair> {
    let (min, max) = data.numeric_range(attr);
    let range = max - min;
    let n = rows.len();
    let mut family = Vec::with_capacity(n);
    for j in 0..n {
        let mut pos = ElementSet::new();
        let mut neg = ElementSet::new();
        for i in 0..n {
            let similar = if range > 0.0 {
                1.0 - (rows[j][attr] - rows[i][attr]).abs() / range >= threshold
            } else {
                true
            };
            if i == j || similar {
                pos.insert(i);
            } else {
                neg.insert(i);
            }
        }
        family.push(Orthopair::from_disjoint(neg, pos, ElementSet::new()));
    }
    family
}

/// Greedy maximum-coverage compaction: repeatedly select the orthopair
/// covering the most still-uncovered elements until the universe is
/// fully covered.
pub(crate) fn greedy_cover(family: Vec<Orthopair>) -> Vec<Orthopair> {
    if family.is_empty() {
        return family;
    }
    let universe_size = family[0].universe_size();
    let mut covered = ElementSet::new();
    let mut result = Vec::new();
    while covered.len() < universe_size {
        let mut max = 0usize;
        let mut best: Option<usize> = None;
        for (io, o) in family.iter().enumerate() {
            let expanded = covered.len()
                + o.positive().iter().filter(|x| !covered.contains(*x)).count();
            if expanded > max {
                max = expanded;
                best = Some(io);
            }
        }
        let Some(im) = best else { break };
        covered.extend(family[im].positive().iter().copied());
        result.push(family[im].clone());
    }
    result
}

/// True when any two distinct members have a non-empty pairwise meet.
pub(crate) fn family_intersects(family: &[Orthopair]) -> Result<bool, ClusterError> {
    for (i, a) in family.iter().enumerate() {
        for (j, b) in family.iter().enumerate() {
            if i != j && !a.intersect(b)?.is_empty() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Recompute each attribute weight as the mutual information between
/// the clustering and the partition the attribute induces, then
/// renormalise the vector to sum to one.
pub(crate) fn weight_attributes<D: Dataset>(
    data: &D,
    rows: &[Vec<f64>],
    threshold: f64,
    use_heuristic: bool,
    clustering: &Orthopartition,
    weights: &mut [f64],
) -> Result<(), ClusterError> {
    for a in 0..weights.len() {
        let induced = match data.attribute_kind(a) {
            AttributeKind::Numeric => {
                let mut family = similarity_family(data, rows, a, threshold);
                if use_heuristic {
                    family = greedy_cover(family);
                }
                let overlap = family_intersects(&family)?;
                Orthopartition::new(family, overlap)?
            }
            AttributeKind::Categorical => {
                let labels: Vec<usize> = rows.iter().map(|r| r[a] as usize).collect();
                Orthopartition::from_labels(&labels)
            }
        };
        weights[a] = clustering.mutual_information(&induced)?;
    }
    let sum: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= sum;
    }
    trace!(weights = ?weights, "attribute weights renormalised");
    Ok(())
}

// ─── Shared restart/iteration loop ──────────────────────────────────────────

/// Categorical representative function: k-means plugs in the weighted
/// mode, k-medians the weighted median.
pub(crate) type CategoricalRep<D> =
    fn(&D, &[Vec<f64>], usize, &Orthopair, f64, f64) -> f64;

/// Arithmetic mean of one attribute over the listed rows.
fn mean(rows: &[Vec<f64>], list: &[usize], attr: usize) -> f64 {
    list.iter().map(|&i| rows[i][attr]).sum::<f64>() / list.len() as f64
}

/// The restart/iteration loop shared by the k-style clusterers.
///
/// Per restart: reset the weights to uniform, seed the representatives
/// (restart zero's seeding is the externally visible starting point).
/// Per iteration: soft-assign, build the orthopartition, recompute each
/// non-empty cluster's representative, optionally reweight attributes,
/// then run the Davies-Bouldin comparison. The comparison direction is
/// deliberate and preserved exactly: the candidate is adopted iff the
/// incumbent representatives score strictly higher on the candidate's
/// orthopartition, or no result exists yet. The adopted state survives
/// across iterations and restarts.
///
/// With zero iterations the seeded representatives are kept untouched
/// and the result is their soft assignment.
pub(crate) fn run_k_style<D: Dataset>(
    data: &D,
    params: &RoughParams,
    categorical_rep: CategoricalRep<D>,
    representatives: &mut Vec<Vec<f64>>,
    weights: &mut Vec<f64>,
    clustering: &mut Option<Orthopartition>,
) -> Result<(), ClusterError> {
    validate_dataset(data)?;
    if params.k > data.num_rows() {
        return Err(ClusterError::InvalidArgument(format!(
            "k = {} exceeds the dataset's {} rows",
            params.k,
            data.num_rows()
        )));
    }
    let rows = cache_rows(data);
    let attrs = data.num_attributes();
    *clustering = None;
    representatives.clear();

    for r in 0..params.restarts {
        *weights = uniform_weights(attrs);
        let mut reps = set_seed(
            data,
            &rows,
            weights,
            params.k,
            params.seed.wrapping_add(r as u64),
        );
        if r == 0 {
            *representatives = reps.clone();
        }
        tracing::debug!(restart = r, k = params.k, "seeded representatives");

        for iteration in 0..params.iterations {
            let memberships = soft_assign(data, &rows, &reps, weights, params.threshold);
            let pi = Orthopartition::from_memberships(&memberships);

            for j in 0..pi.family().len() {
                let member = &pi.family()[j];
                if member.is_empty() {
                    continue;
                }
                let lower: Vec<usize> = memberships
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| **m == Membership::Single(j))
                    .map(|(i, _)| i)
                    .collect();
                let upper: Vec<usize> = memberships
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| m.contains(j))
                    .map(|(i, _)| i)
                    .collect();

                // region weights for the categorical representative:
                // a boundary-free cluster is pure lower, a lower-free
                // cluster pure upper, anything else uses (wu, wl)
                let (cat_wu, cat_wl) = if lower.len() == upper.len() {
                    (0.0, 1.0)
                } else if lower.is_empty() {
                    (1.0, 0.0)
                } else {
                    (params.wu, params.wl)
                };
                let blend = !lower.is_empty() && lower.len() != upper.len();
                for a in 0..attrs {
                    reps[j][a] = match data.attribute_kind(a) {
                        AttributeKind::Numeric if blend => {
                            params.wl * mean(&rows, &lower, a)
                                + params.wu * mean(&rows, &upper, a)
                        }
                        AttributeKind::Numeric => mean(&rows, &upper, a),
                        AttributeKind::Categorical => {
                            categorical_rep(data, &rows, a, member, cat_wu, cat_wl)
                        }
                    };
                }
            }

            if params.reweight {
                let current = Orthopartition::from_memberships(&memberships);
                weight_attributes(
                    data,
                    &rows,
                    params.threshold,
                    params.use_heuristic,
                    &current,
                    weights,
                )?;
            }

            let adopt = match clustering.as_ref() {
                None => true,
                Some(_) => {
                    let incumbent = davies_bouldin(
                        data, &pi, &rows, representatives, weights, params.wu, params.wl,
                    );
                    let candidate =
                        davies_bouldin(data, &pi, &rows, &reps, weights, params.wu, params.wl);
                    trace!(restart = r, iteration, incumbent, candidate, "quality comparison");
                    incumbent > candidate
                }
            };
            if adopt {
                *representatives = reps.clone();
                *clustering = Some(pi);
            }
        }
    }

    if clustering.is_none() {
        let memberships =
            soft_assign(data, &rows, representatives, weights, params.threshold);
        *clustering = Some(Orthopartition::from_memberships(&memberships));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Table};
    use crate::orthopartition::Membership;

    /// Two numeric attributes and one categorical, six rows in two
    /// clear groups.
    fn mixed_table() -> Table {
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

    #[test]
    fn test_distance_mixes_numeric_and_categorical_costs() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let w = vec![1.0, 1.0, 1.0];
        // identical rows cost nothing
        assert_eq!(distance(&t, &w, &rows[0], &rows[0]), 0.0);
        // full numeric spread plus a categorical mismatch
        let d = distance(&t, &w, &rows[0], &rows[3]);
        assert!((d - 3.0).abs() < 1e-12, "d = {d}");
        // weights scale each attribute's cost
        let w = vec![0.5, 0.5, 0.5];
        let d = distance(&t, &w, &rows[0], &rows[3]);
        assert!((d - 1.5).abs() < 1e-12, "d = {d}");
    }

    #[test]
    fn test_constant_numeric_attribute_costs_nothing() {
        let t = Table::new(vec![
            Column::numeric("flat", vec![5.0, 5.0]),
            Column::numeric("x", vec![0.0, 1.0]),
        ])
        .unwrap();
        let rows = cache_rows(&t);
        let d = distance(&t, &[1.0, 1.0], &rows[0], &rows[1]);
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seeding_is_deterministic_and_farthest_first() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let w = uniform_weights(t.num_attributes());
        let a = set_seed(&t, &rows, &w, 2, 7);
        let b = set_seed(&t, &rows, &w, 2, 7);
        assert_eq!(a, b);
        // the two seeds come from opposite groups: their categorical
        // codes differ
        assert_ne!(a[0][2], a[1][2]);
    }

    #[test]
    fn test_soft_assignment_never_leaves_an_element_out() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let w = uniform_weights(t.num_attributes());
        for k in 1..=3 {
            let reps = set_seed(&t, &rows, &w, k, 3);
            let members = soft_assign(&t, &rows, &reps, &w, 0.7);
            assert!(members.iter().all(|m| *m != Membership::Unassigned));
        }
    }

    #[test]
    fn test_soft_assignment_threshold_widens_boundaries() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let w = uniform_weights(t.num_attributes());
        let reps = vec![rows[0].clone(), rows[3].clone()];
        // strict threshold: a clean split, no boundaries
        let strict = soft_assign(&t, &rows, &reps, &w, 1.0);
        assert!(strict.iter().all(|m| matches!(m, Membership::Single(_))));
        // permissive threshold: everything lands in both boundaries,
        // except the representative rows themselves (distance zero to
        // one cluster keeps the ratio at zero for the other)
        let loose = soft_assign(&t, &rows, &reps, &w, f64::MIN_POSITIVE);
        for (i, m) in loose.iter().enumerate() {
            if i == 0 || i == 3 {
                assert!(matches!(m, Membership::Single(_)), "row {i}: {m:?}");
            } else {
                assert!(matches!(m, Membership::Multi(_)), "row {i}: {m:?}");
            }
        }
    }

    #[test]
    fn test_nearest_prefers_first_on_ties() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let w = uniform_weights(t.num_attributes());
        let reps = vec![rows[0].clone(), rows[0].clone()];
        assert_eq!(nearest(&t, &reps, &w, &rows[1]), Some(0));
    }

    #[test]
    fn test_weighted_mode_reinforces_repeated_values() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        // lower {0, 1} both red, boundary {3} blue
        let o = Orthopair::new(
            [2, 4, 5].into_iter().collect(),
            [0, 1].into_iter().collect(),
            [3].into_iter().collect(),
        )
        .unwrap();
        // red tally: 0 -> 0+(1+0)=1 -> 1+(1+1)=3; blue tally with
        // wu=0.5: 0.5
        let mode = weighted_mode(&t, &rows, 2, &o, 0.5, 1.0);
        assert_eq!(mode, 0.0);
        // boundary-only weighting flips the outcome when wl = 0 and a
        // heavier wu backs the single blue element
        let mode = weighted_mode(&t, &rows, 2, &o, 4.0, 0.0);
        assert_eq!(mode, 1.0);
    }

    #[test]
    fn test_davies_bouldin_is_finite_for_clean_split() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let w = uniform_weights(t.num_attributes());
        let reps = vec![rows[0].clone(), rows[3].clone()];
        let members = soft_assign(&t, &rows, &reps, &w, 1.0);
        let pi = Orthopartition::from_memberships(&members);
        let db = davies_bouldin(&t, &pi, &rows, &reps, &w, 0.3, 0.7);
        assert!(db.is_finite() && db >= 0.0, "db = {db}");
    }

    #[test]
    fn test_greedy_cover_spans_the_universe_with_fewer_members() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let family = similarity_family(&t, &rows, 0, 0.75);
        assert_eq!(family.len(), 6);
        let compact = greedy_cover(family);
        assert!(compact.len() < 6);
        let mut covered = ElementSet::new();
        for o in &compact {
            covered.extend(o.positive().iter().copied());
        }
        assert_eq!(covered.len(), 6);
    }

    #[test]
    fn test_weight_attributes_renormalises_to_unit_sum() {
        let t = mixed_table();
        let rows = cache_rows(&t);
        let mut weights = uniform_weights(t.num_attributes());
        let clustering = Orthopartition::from_labels(&[0, 0, 0, 1, 1, 1]);
        weight_attributes(&t, &rows, 0.75, true, &clustering, &mut weights).unwrap();
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
        assert!(weights.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_params_validation() {
        assert!(matches!(
            RoughParams::new(0, 5, 0.7, 0.3, 0.7, 1, 0),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RoughParams::new(2, 5, 0.0, 0.3, 0.7, 1, 0),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RoughParams::new(2, 5, 1.1, 0.3, 0.7, 1, 0),
            Err(ClusterError::InvalidArgument(_))
        ));
        let p = RoughParams::new(2, 5, 0.7, 0.3, 0.7, 0, 0).unwrap();
        assert_eq!(p.restarts, 1);
        assert!(p.use_heuristic && p.reweight);
        let p = p.with_heuristic(false).with_reweight(false);
        assert!(!p.use_heuristic && !p.reweight);
    }
}
