//! The tabular dataset seam - the trait the clusterers consume, plus a
//! plain in-memory reference implementation.
//!
//! The clustering core never loads files and never owns data. It reads
//! rows through [`Dataset`], a deliberately small read-only surface:
//! row count, attribute count, a per-attribute type tag, raw values,
//! precomputed numeric ranges and categorical cardinalities. Elements
//! are identified by their row index, so set membership and equality
//! are the index's own.
//!
//! [`Table`] is the reference implementation used by the test suite and
//! by callers that already hold their data in memory. Any columnar
//! store can participate by implementing the trait.
//!
//! # Implementing for a new backend
//!
//! ```rust,ignore
//! use orthoclust::dataset::{AttributeKind, Dataset};
//!
//! struct MyStore { /* ... */ }
//!
//! impl Dataset for MyStore {
//!     fn num_rows(&self) -> usize { /* ... */ }
//!     fn num_attributes(&self) -> usize { /* ... */ }
//!     fn attribute_kind(&self, attr: usize) -> AttributeKind { /* ... */ }
//!     fn value(&self, row: usize, attr: usize) -> f64 { /* ... */ }
//!     fn numeric_range(&self, attr: usize) -> (f64, f64) { /* ... */ }
//!     fn categories(&self, attr: usize) -> usize { /* ... */ }
//! }
//! ```

use crate::error::ClusterError;

/// Type tag for one dataset attribute (column).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKind {
    /// Continuous attribute. Distances are range-normalised.
    Numeric,
    /// Discrete attribute. Values are codes into a fixed enumeration;
    /// distances are 0/1 for equal/unequal.
    Categorical,
}

/// Read-only view of a tabular dataset with typed columns.
///
/// Categorical values are exposed as `f64` codes (the index into the
/// attribute's value enumeration), mirroring how numeric values are
/// exposed, so a cluster representative is a plain `Vec<f64>` across
/// both kinds.
///
/// # Contract
///
/// - `value(row, attr)` must be defined for all `row < num_rows()` and
///   `attr < num_attributes()`.
/// - `numeric_range` is only meaningful for [`AttributeKind::Numeric`]
///   attributes and must return the precomputed `(min, max)` over all
///   rows.
/// - `categories` is only meaningful for [`AttributeKind::Categorical`]
///   attributes and must return the size of the legal value
///   enumeration; every stored code must be strictly below it.
pub trait Dataset {
    /// Number of rows (the universe size for clustering).
    fn num_rows(&self) -> usize;

    /// Number of attributes (columns).
    fn num_attributes(&self) -> usize;

    /// Type tag of attribute `attr`.
    fn attribute_kind(&self, attr: usize) -> AttributeKind;

    /// Raw value of attribute `attr` in row `row`. For categorical
    /// attributes this is the value code as `f64`.
    fn value(&self, row: usize, attr: usize) -> f64;

    /// Precomputed `(min, max)` of a numeric attribute.
    fn numeric_range(&self, attr: usize) -> (f64, f64);

    /// Number of legal values of a categorical attribute.
    fn categories(&self, attr: usize) -> usize;
}

// ─── In-memory reference implementation ─────────────────────────────────────

/// One column of a [`Table`].
#[derive(Clone, Debug)]
pub enum Column {
    /// Continuous column with its precomputed range.
    Numeric {
        /// Column name, for diagnostics only.
        name: String,
        /// One value per row.
        values: Vec<f64>,
        /// Smallest value in `values` (0.0 when empty).
        min: f64,
        /// Largest value in `values` (0.0 when empty).
        max: f64,
    },
    /// Discrete column storing codes into a label enumeration.
    Categorical {
        /// Column name, for diagnostics only.
        name: String,
        /// One code per row; each must index into `labels`.
        codes: Vec<usize>,
        /// The legal value enumeration; position is the code.
        labels: Vec<String>,
    },
}

impl Column {
    /// Build a numeric column, computing its range.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &values {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        if values.is_empty() {
            min = 0.0;
            max = 0.0;
        }
        Column::Numeric { name: name.into(), values, min, max }
    }

    /// Build a categorical column from a label enumeration and per-row codes.
    pub fn categorical(
        name: impl Into<String>,
        labels: Vec<String>,
        codes: Vec<usize>,
    ) -> Self {
        Column::Categorical { name: name.into(), codes, labels }
    }

    fn len(&self) -> usize {
        match self {
            Column::Numeric { values, .. } => values.len(),
            Column::Categorical { codes, .. } => codes.len(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Column::Numeric { name, .. } | Column::Categorical { name, .. } => name,
        }
    }
}

/// Plain in-memory dataset: a list of equal-length typed columns.
#[derive(Clone, Debug)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table from columns, validating that every column has the
    /// same length and that every categorical code indexes its label
    /// enumeration.
    pub fn new(columns: Vec<Column>) -> Result<Self, ClusterError> {
        let rows = columns.first().map_or(0, Column::len);
        for col in &columns {
            if col.len() != rows {
                return Err(ClusterError::InvalidArgument(format!(
                    "column '{}' has {} rows, expected {}",
                    col.name(),
                    col.len(),
                    rows
                )));
            }
            if let Column::Categorical { name, codes, labels } = col {
                if let Some(&bad) = codes.iter().find(|&&c| c >= labels.len()) {
                    return Err(ClusterError::InvalidArgument(format!(
                        "column '{}' holds code {} but only {} labels",
                        name,
                        bad,
                        labels.len()
                    )));
                }
            }
        }
        Ok(Self { columns, rows })
    }

    /// Label of categorical attribute `attr` for value code `code`.
    pub fn label_of(&self, attr: usize, code: usize) -> Option<&str> {
        match &self.columns[attr] {
            Column::Categorical { labels, .. } => labels.get(code).map(String::as_str),
            Column::Numeric { .. } => None,
        }
    }

    /// Value code of categorical attribute `attr` for `label`.
    pub fn code_of(&self, attr: usize, label: &str) -> Option<usize> {
        match &self.columns[attr] {
            Column::Categorical { labels, .. } => labels.iter().position(|l| l == label),
            Column::Numeric { .. } => None,
        }
    }
}

impl Dataset for Table {
    fn num_rows(&self) -> usize {
        self.rows
    }

    fn num_attributes(&self) -> usize {
        self.columns.len()
    }

    fn attribute_kind(&self, attr: usize) -> AttributeKind {
        match self.columns[attr] {
            Column::Numeric { .. } => AttributeKind::Numeric,
            Column::Categorical { .. } => AttributeKind::Categorical,
        }
    }

    fn value(&self, row: usize, attr: usize) -> f64 {
        match &self.columns[attr] {
            Column::Numeric { values, .. } => values[row],
            Column::Categorical { codes, .. } => codes[row] as f64,
        }
    }

    fn numeric_range(&self, attr: usize) -> (f64, f64) {
        match self.columns[attr] {
            Column::Numeric { min, max, .. } => (min, max),
            Column::Categorical { .. } => (0.0, 0.0),
        }
    }

    fn categories(&self, attr: usize) -> usize {
        match &self.columns[attr] {
            Column::Numeric { .. } => 0,
            Column::Categorical { labels, .. } => labels.len(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
