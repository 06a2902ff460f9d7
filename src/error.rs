//! Error types for the orthopair algebra and the clustering pipeline.
//!
//! Every validation failure surfaces synchronously at the point of
//! violation. Nothing is retried or recovered internally: a
//! [`ClusterError`] is a precondition failure, and the caller is
//! responsible for keeping universes consistent across the pipeline.

use thiserror::Error;

/// Errors raised by orthopair construction, orthopartition algebra and
/// clusterer configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// Two regions of an orthopair share at least one element.
    ///
    /// Raised on construction and on any region-replacing mutation.
    #[error("orthopair regions are not pairwise disjoint ({regions})")]
    NonDisjoint {
        /// Which pair of regions collided, e.g. `"positive/negative"`.
        regions: &'static str,
    },

    /// Two orthopairs (or orthopartitions) are defined over different
    /// universes, so their algebra is undefined.
    #[error("orthopairs are defined over different universes")]
    UniverseMismatch,

    /// A family of orthopairs overlaps although the orthopartition was
    /// declared overlap-free.
    #[error("orthopairs overlap in an orthopartition declared overlap-free")]
    Overlap,

    /// A clusterer was configured with an unusable parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
