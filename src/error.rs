//! Error types for the dataset operations
//!
//! Operations fail for one dataset call at a time. A
//! [MissingAttribute](Error::MissingAttribute) returned for one snapshot
//! never poisons results already derived from
//! other snapshots, so multi-frame batches can simply skip the bad call
//! and continue.
//!
//! Recoverable conditions are deliberately *not* represented here:
//!
//! - An empty dataset is valid input everywhere and produces empty output.
//! - A reversed threshold range is normalised by swapping the bounds.
//! - A per-attribute component mismatch during interpolation skips the
//!   attribute and records it on the
//!   [Alignment](crate::interpolate::Alignment) instead of aborting.

// external crates
use thiserror::Error;

/// Alias to save typing out the full error type everywhere
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a single dataset operation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The operation needs a named per-point array that the dataset does
    /// not carry, e.g. "mask" for classification or the active scalar for
    /// voxelization and thresholding.
    #[error("no attribute named \"{name}\" in dataset")]
    MissingAttribute {
        /// Name of the array that was requested
        name: String,
    },

    /// A per-point array does not have the shape the operation expects,
    /// either the wrong length at construction or the wrong number of
    /// components per point.
    #[error("attribute \"{name}\" has mismatched shape, expected {expected} found {found}")]
    ShapeMismatch {
        /// Name of the offending array
        name: String,
        /// Length or component count the operation expected
        expected: usize,
        /// Length or component count actually found
        found: usize,
    },

    /// A voxel grid was requested with a zero-sized axis.
    #[error("voxel grid resolution must be nonzero on every axis, got {nx}x{ny}x{nz}")]
    InvalidResolution {
        /// Requested lattice vertices along x
        nx: usize,
        /// Requested lattice vertices along y
        ny: usize,
        /// Requested lattice vertices along z
        nz: usize,
    },
}

impl Error {
    /// Shorthand for the common "array is not there" case
    pub fn missing(name: &str) -> Self {
        Self::MissingAttribute {
            name: name.to_string(),
        }
    }
}
