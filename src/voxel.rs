//! Scalar aggregation onto a regular voxel grid
//!
//! # Overview
//!
//! Volumetric transfer-function rendering wants a dense regular grid, not
//! an unstructured point cloud. This module aggregates a chosen scalar
//! onto the lattice vertices of such a grid: every point deposits its
//! value on the single nearest vertex, and each vertex ends up holding the
//! arithmetic mean of everything deposited on it.
//!
//! ```rust
//! use cosmopart::snapshot::{AttributeDataset, Bounds};
//! use cosmopart::voxel::voxelize;
//!
//! let snapshot = AttributeDataset::new(vec![[0.1, 0.1, 0.1], [0.9, 0.9, 0.9]])
//!     .with_scalar("phi", vec![4.0, 8.0])
//!     .unwrap();
//!
//! let grid = voxelize(&snapshot, "phi", snapshot.bounds(), [2, 2, 2]).unwrap();
//! assert_eq!(grid.value(0, 0, 0), 4.0);
//! assert_eq!(grid.value(1, 1, 1), 8.0);
//! ```
//!
//! Note that this is nearest-*vertex* assignment, not cell binning. A grid
//! of resolution `(nx, ny, nz)` has exactly `nx * ny * nz` sample sites
//! and a point maps to whichever one is closest in Euclidean distance,
//! which is decided axis by axis by rounding.

// internal modules
use crate::error::{Error, Result};
use crate::snapshot::{AttributeDataset, Bounds};
use crate::utils::*;

// external crates
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

/// Dense regular grid of averaged scalar values
///
/// Vertices are stored x-fastest, so the flat index of vertex `(i, j, k)`
/// is `i + nx * (j + ny * k)`. Alongside the finalized means the grid
/// keeps the per-vertex sample counts, which is what makes the
/// mass-conservation check and parallel merging possible after the fact.
#[derive(Debug, Clone, Serialize)]
pub struct VoxelGrid {
    bounds: Bounds,
    origin: [f64; 3],
    spacing: [f64; 3],
    resolution: [usize; 3],
    values: Vec<f64>,
    counts: Vec<u32>,
    skipped: usize,
}

impl VoxelGrid {
    /// Set up an empty accumulator grid over the given domain
    ///
    /// Spacing per axis is `extent / (resolution - 1)` so the first and
    /// last vertices sit exactly on the bounds. A single-vertex axis gets
    /// zero spacing and collapses that axis onto the lower bound.
    fn blank(bounds: Bounds, resolution: [usize; 3]) -> Self {
        let extent = bounds.extent();
        let mut spacing = [0.0; 3];
        for axis in 0..3 {
            if resolution[axis] > 1 {
                spacing[axis] = extent[axis] / (resolution[axis] - 1) as f64;
            }
        }

        let n = resolution[0] * resolution[1] * resolution[2];
        Self {
            bounds,
            origin: bounds.min,
            spacing,
            resolution,
            values: vec![0.0; n],
            counts: vec![0; n],
            skipped: 0,
        }
    }

    /// Nearest lattice vertex of a point, `None` when outside the domain
    fn vertex_of(&self, point: &[f64; 3]) -> Option<usize> {
        if !self.bounds.contains(point) {
            return None;
        }

        let mut index = [0usize; 3];
        for axis in 0..3 {
            if self.spacing[axis] == 0.0 {
                continue; // collapsed axis, everything lands on vertex 0
            }
            let nearest = ((point[axis] - self.origin[axis]) / self.spacing[axis]).round();
            index[axis] = (nearest as usize).min(self.resolution[axis] - 1);
        }

        Some(self.index(index[0], index[1], index[2]))
    }

    /// Deposit one sample, or count it as skipped if unmappable
    fn accumulate(&mut self, point: &[f64; 3], value: f64) {
        match self.vertex_of(point) {
            Some(vertex) => {
                self.values[vertex] += value;
                self.counts[vertex] += 1;
            }
            None => self.skipped += 1,
        }
    }

    /// Fold another accumulator grid of the same domain into this one
    fn merge(&mut self, other: &VoxelGrid) {
        for (value, v) in self.values.iter_mut().zip(&other.values) {
            *value += v;
        }
        for (count, c) in self.counts.iter_mut().zip(&other.counts) {
            *count += c;
        }
        self.skipped += other.skipped;
    }

    /// Turn accumulated sums into means, leaving empty vertices at zero
    fn finalize(&mut self) {
        for (value, count) in self.values.iter_mut().zip(&self.counts) {
            if *count > 0 {
                *value /= *count as f64;
            }
        }
    }
}

/// Read access
impl VoxelGrid {
    /// Lattice vertices per axis
    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    /// Coordinate of vertex `(0, 0, 0)`
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Vertex-to-vertex distance per axis
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Total number of lattice vertices
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check for a grid with no vertices at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat index of vertex `(i, j, k)`, x-fastest
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.resolution[0] * (j + self.resolution[1] * k)
    }

    /// Finalized mean at vertex `(i, j, k)`, zero where nothing mapped
    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[self.index(i, j, k)]
    }

    /// All finalized means in flat x-fastest order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Per-vertex sample counts in flat x-fastest order
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of vertices that received at least one sample
    pub fn occupied(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Number of input points that mapped to no vertex
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Sum of `mean * count` over all vertices
    ///
    /// Up to floating-point rounding this equals the plain sum of every
    /// point value that found a vertex, since averaging and re-weighting
    /// cancel out. Useful as a cheap conservation check after aggregation.
    pub fn weighted_total(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.counts)
            .map(|(value, count)| value * *count as f64)
            .sum()
    }
}

impl std::fmt::Display for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = "VoxelGrid {\n".to_string();
        s += &f!(
            "    vertices: {} ({}x{}x{})\n",
            self.len(),
            self.resolution[0],
            self.resolution[1],
            self.resolution[2]
        );
        s += &f!("    occupied: {} (skipped {} points)\n", self.occupied(), self.skipped);
        s += &f!(
            "    values: {} to {}\n}}",
            slice_min(&self.values).sci(5, 2),
            slice_max(&self.values).sci(5, 2)
        );
        write!(f, "{}", s)
    }
}

/// Aggregate a named scalar onto a regular grid
///
/// Every point inside `bounds` deposits its value on the nearest lattice
/// vertex, and each vertex is finalized to the arithmetic mean of its
/// samples (or left at zero if nothing mapped to it). Points outside the
/// bounds are skipped and counted, mirroring how a probe locator reports
/// "not found" for them.
///
/// - `bounds` - the grid domain; vertex `(0,0,0)` sits on `bounds.min`
///   and the last vertex on `bounds.max`. Usually the dataset's own
///   [bounds](crate::snapshot::AttributeDataset::bounds).
/// - `resolution` - lattice vertices per axis; every axis must be nonzero.
pub fn voxelize(
    dataset: &AttributeDataset,
    name: &str,
    bounds: Bounds,
    resolution: [usize; 3],
) -> Result<VoxelGrid> {
    validate_resolution(resolution)?;

    let mut grid = VoxelGrid::blank(bounds, resolution);
    if dataset.is_empty() {
        return Ok(grid);
    }

    let values = dataset.scalar(name)?;
    for (point, value) in dataset.positions().iter().zip(values) {
        grid.accumulate(point, *value);
    }
    grid.finalize();

    debug!(
        "Voxelized {name}: {} points onto {} vertices, {} skipped",
        dataset.len(),
        grid.len(),
        grid.skipped
    );
    Ok(grid)
}

/// Aggregate a named scalar onto a regular grid, in parallel
///
/// Same contract and result as [voxelize]. Multiple points mapping to one
/// vertex would race on a shared accumulator, so each worker folds its
/// share of points into a private grid and the partial grids are merged by
/// elementwise sums of sums and counts before the single mean pass.
pub fn voxelize_par(
    dataset: &AttributeDataset,
    name: &str,
    bounds: Bounds,
    resolution: [usize; 3],
) -> Result<VoxelGrid> {
    validate_resolution(resolution)?;

    if dataset.is_empty() {
        return Ok(VoxelGrid::blank(bounds, resolution));
    }

    let values = dataset.scalar(name)?;
    let positions = dataset.positions();

    let mut grid = (0..dataset.len())
        .into_par_iter()
        .fold(
            || VoxelGrid::blank(bounds, resolution),
            |mut partial, i| {
                partial.accumulate(&positions[i], values[i]);
                partial
            },
        )
        .reduce(
            || VoxelGrid::blank(bounds, resolution),
            |mut merged, partial| {
                merged.merge(&partial);
                merged
            },
        );
    grid.finalize();
    Ok(grid)
}

fn validate_resolution(resolution: [usize; 3]) -> Result<()> {
    if resolution.contains(&0) {
        return Err(Error::InvalidResolution {
            nx: resolution[0],
            ny: resolution[1],
            nz: resolution[2],
        });
    }
    Ok(())
}
