//! # The Cosmopart crate
//!
//! Dataset processing tools for cosmology-simulation particle snapshots
//!
//! ## Overview
//!
//! The crate turns raw per-particle arrays into the derived datasets a
//! point-cloud viewer actually renders. It owns the algorithmic side of
//! that pipeline and nothing else, no windows, no cameras, no file
//! formats. A loader hands over a structure-of-arrays snapshot and a
//! renderer picks up plain datasets and grids on the other end.
//!
//! | Operation         | Description                                          |
//! | ----------------- | ---------------------------------------------------- |
//! | classification    | decode species bitmasks, partition by particle type  |
//! | range filtering   | threshold points on the active scalar                |
//! | voxelization      | average a scalar onto a regular grid for volumes     |
//! | interpolation     | blend id-matched snapshot pairs into sub-frames      |
//!
//! ## Quickstart
//!
//! Include the [cosmopart](crate) crate in the `Cargo.toml` dependencies
//!
//! ```toml
//! [dependencies]
//! cosmopart = "0.7.1"
//! ```
//!
//! Everything operates on the same
//! [AttributeDataset](crate::snapshot::AttributeDataset) type, so the
//! operations chain in any order:
//!
//! ```rust
//! use cosmopart::classify::{split_by_category, Category, MaskLayout};
//! use cosmopart::filter::filter_range;
//! use cosmopart::voxel::voxelize;
//! use cosmopart::snapshot::AttributeDataset;
//!
//! // a loader would provide this from a snapshot file
//! let snapshot = AttributeDataset::new(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.5, 0.5, 0.5]])
//!     .with_scalar("mass", vec![1.0, 2.0, 4.0]).unwrap()
//!     .with_mask(vec![0b000000000, 0b000000010, 0b000000000]).unwrap();
//!
//! // split the snapshot into its particle species
//! let partition = split_by_category(&snapshot, &MaskLayout::default()).unwrap();
//! assert_eq!(partition.count(Category::Dm), 2);
//!
//! // keep the heavy half and aggregate it onto a coarse grid
//! let heavy = filter_range(&snapshot, "mass", Some(2.0), None).unwrap();
//! let grid = voxelize(&heavy, "mass", snapshot.bounds(), [8, 8, 8]).unwrap();
//! assert_eq!(grid.occupied(), 2);
//! ```
//!
//! As an overview:
//! - The [snapshot] module contains the structure-of-arrays dataset model
//! that every operation consumes and produces.
//! - The [classify] module decodes the species bitmask with one canonical,
//! configurable bit layout and partitions datasets by particle type.
//! - The [filter] module thresholds points on a scalar range.
//! - The [voxel] module aggregates scalars onto dense regular grids for
//! volumetric rendering.
//! - The [interpolate] module matches two snapshots by particle id and
//! blends intermediate frames for animation and export.
//! - The [view] module bundles the active scalar, threshold, and species
//! visibility into one immutable value applied per call.
//!
//! All operations are pure, synchronous transforms over immutable inputs.
//! Datasets run to a few million particles, so the voxelizer also offers a
//! [rayon](https://docs.rs/rayon)-based path that accumulates into
//! per-worker grids and merges them, see
//! [voxelize_par](crate::voxel::voxelize_par).
//!
//! The crate logs through the [log](https://docs.rs/log) facade and never
//! initialises a logger itself; recoverable oddities (reversed threshold
//! bounds, unblendable attributes) are logged and handled rather than
//! returned as errors.

// Public facing modules
pub mod classify;
pub mod error;
pub mod filter;
pub mod interpolate;
pub mod snapshot;
pub mod utils;
pub mod view;
pub mod voxel;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::{Error, Result};

#[doc(inline)]
pub use crate::snapshot::{AttributeArray, AttributeDataset, Bounds};

#[doc(inline)]
pub use crate::classify::{split_by_category, Category, MaskLayout, Partition};

#[doc(inline)]
pub use crate::filter::filter_range;

#[doc(inline)]
pub use crate::interpolate::{align, interpolate, Alignment};

#[doc(inline)]
pub use crate::voxel::{voxelize, voxelize_par, VoxelGrid};

#[doc(inline)]
pub use crate::view::ViewState;
