//! Core snapshot data model
//!
//! # Overview
//!
//! Module for storing and deriving particle snapshot data. A loaded
//! timestep arrives as an [AttributeDataset], a structure-of-arrays bundle
//! of positions, named per-point arrays, and the optional species mask and
//! particle id columns.
//!
//! ```rust
//! use cosmopart::snapshot::AttributeDataset;
//!
//! // A loader hands over plain buffers, the dataset just ties them together
//! let snapshot = AttributeDataset::new(vec![[0.0, 0.0, 0.0], [8.0, 4.0, 2.0]])
//!     .with_scalar("rho", vec![0.3, 1.7])
//!     .unwrap();
//!
//! // print a summary of the snapshot (Display trait implemented)
//! println!("{snapshot}");
//! ```
//!
//! Every dataset operation in the crate consumes and produces this one
//! type, so the output of one stage can feed any other. A blended
//! interpolation frame can be classified, thresholded, and voxelized
//! exactly like a snapshot read straight from disk.

// Split into subfiles for development, but anything important is re-exported
mod attribute;
mod dataset;

// inline important the snapshot-related types for a nice public API
#[doc(inline)]
pub use crate::snapshot::attribute::{AttributeArray, Bounds};

#[doc(inline)]
pub use crate::snapshot::dataset::AttributeDataset;
