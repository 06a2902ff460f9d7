//! # orthoclust
//!
//! Rough-set clustering for mixed tabular data.
//!
//! ---
//!
//! ## Clusters are regions, not labels
//!
//! Classical clustering forces every element into exactly one cluster.
//! Real data is rarely that cooperative: an element halfway between two
//! groups belongs to neither with certainty. Here every cluster is an
//! *orthopair* over the shared universe of dataset rows:
//!
//! - a **positive** (lower) region of elements certainly in the cluster,
//! - a **boundary** region of elements possibly in the cluster,
//! - a **negative** region of elements certainly excluded.
//!
//! An ambiguous element legitimately sits in the boundary of more than
//! one cluster instead of being forced into a single label. A family of
//! orthopairs over one universe is an *orthopartition* (or, when upper
//! regions may overlap, an *orthocovering*), and the family carries its
//! own information-theoretic measures: boundary-driven entropies
//! computed by progressive crispification, a bounded mutual-information
//! similarity, and purity.
//!
//! ## The pipeline
//!
//! ```text
//! Dataset ──► soft assignment ──► Orthopartition ──► representatives
//!    ▲            (threshold)          │                  + weights
//!    │                                 ▼                      │
//!    └───────── quality check ◄── Davies-Bouldin ◄────────────┘
//! ```
//!
//! Each iteration soft-assigns every row against the current cluster
//! representatives under a weighted Gower-style distance, builds the
//! orthopartition, recomputes representatives and (optionally) the
//! per-attribute weights by mutual information, and keeps the result
//! only if it wins the quality comparison. The best state survives
//! across iterations and restarts.
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`dataset`] | [`dataset::Dataset`], [`dataset::Table`] | The read-only tabular seam: typed columns, ranges, value enumerations |
//! | [`orthopair`] | [`orthopair::Orthopair`] | Three-region values with a validated, immutable set algebra |
//! | [`orthopartition`] | [`orthopartition::Orthopartition`], [`orthopartition::Membership`] | Overlap-aware families, entropies, mutual information, purity |
//! | [`clusterer`] | [`clusterer::RoughParams`], [`clusterer::RoughClusterer`] | Shared engine: distance, seeding, reweighting, Davies-Bouldin |
//! | [`kmeans`] | [`kmeans::RoughKMeans`] | Rough k-means (mean / weighted-mode representatives) |
//! | [`kmedians`] | [`kmedians::RoughKMedians`] | Rough k-medians (weighted-median representatives) |
//! | [`refinement`] | [`refinement::RoughRefinement`] | Agglomerative refinement without a fixed `k` |
//! | [`error`] | [`error::ClusterError`] | Validation failures of the algebra and configuration |
//! | `snapshot` | `snapshot::ClusteringSnapshot` | Serialisable result capture (requires the `serde` feature) |
//!
//! ## Example
//!
//! ```rust,ignore
//! use orthoclust::clusterer::{RoughClusterer, RoughParams};
//! use orthoclust::dataset::{Column, Table};
//! use orthoclust::kmeans::RoughKMeans;
//!
//! let data = Table::new(vec![
//!     Column::numeric("x", vec![0.0, 0.1, 1.0, 0.9]),
//!     Column::numeric("y", vec![0.0, 0.0, 1.0, 1.0]),
//! ])?;
//! let params = RoughParams::new(2, 10, 0.9, 0.3, 0.7, 3, 42)?;
//! let mut clusterer = RoughKMeans::new(params);
//! clusterer.build_clusterer(&data)?;
//! let partition = clusterer.clustering().unwrap();
//! ```
//!
//! ## Scope
//!
//! The crate is single-threaded and CPU-bound; a clusterer's state is
//! mutated in place across iterations and the dataset is read-only
//! throughout. Restarts are self-contained, so callers that want
//! parallelism can run them as independent builds and keep the best
//! result themselves. File loading, persistence engines and any
//! presentation layer live outside this crate.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production
//! use. Commercial production use requires a license from Flout Labs
//! (cbyrne@floutlabs.com).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clusterer;
pub mod dataset;
pub mod error;
pub mod kmeans;
pub mod kmedians;
pub mod orthopair;
pub mod orthopartition;
pub mod refinement;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod snapshot;
