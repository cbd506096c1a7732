//! Per-point data arrays and coordinate bounds
//!
//! An [AttributeArray] is the unit of per-point data handed over by the
//! loader, a flat float buffer with a fixed number of components per point.
//! Scalar fields like "mass" or "rho" have one component, while packed
//! vector fields carry more. The layout is tuple-major, so point `i` owns
//! the slice `[i * components, (i + 1) * components)`.

// internal modules
use crate::error::{Error, Result};
use crate::utils::*;

// external crates
use serde::{Deserialize, Serialize};

/// A named per-point array with a fixed component count
///
/// The minimum information needed to carry any point-data array without
/// caring what it means physically. Operations that need a plain scalar
/// (thresholding, voxelization) go through [AttributeArray::as_scalar] and
/// reject anything wider.
///
/// ```rust
/// # use cosmopart::snapshot::AttributeArray;
/// let mass = AttributeArray::scalar(vec![1.0, 2.0, 3.0]);
/// assert_eq!(mass.len(), 3);
/// assert_eq!(mass.components(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeArray {
    components: usize,
    data: Vec<f64>,
}

impl AttributeArray {
    /// A single-component array, the common case for simulation fields
    pub fn scalar(data: Vec<f64>) -> Self {
        Self {
            components: 1,
            data,
        }
    }

    /// A multi-component array from a flat tuple-major buffer
    ///
    /// The buffer length must be an exact multiple of `components`.
    ///
    /// ```rust
    /// # use cosmopart::snapshot::AttributeArray;
    /// // two points with 3 components each
    /// let vel = AttributeArray::with_components(3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
    /// assert_eq!(vel.len(), 2);
    /// assert_eq!(vel.tuple(1), &[0.0, 1.0, 0.0]);
    /// ```
    pub fn with_components(components: usize, data: Vec<f64>) -> Result<Self> {
        if components == 0 || data.len() % components != 0 {
            return Err(Error::ShapeMismatch {
                name: "<unnamed>".to_string(),
                expected: components.max(1),
                found: data.len(),
            });
        }
        Ok(Self { components, data })
    }

    /// Number of components per point
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of points covered by the array
    pub fn len(&self) -> usize {
        self.data.len() / self.components
    }

    /// Check for an array with no points at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw tuple-major buffer
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The components belonging to point `index`
    pub fn tuple(&self, index: usize) -> &[f64] {
        &self.data[index * self.components..(index + 1) * self.components]
    }

    /// The flat buffer of a single-component array, `None` for wider ones
    pub fn as_scalar(&self) -> Option<&[f64]> {
        match self.components {
            1 => Some(&self.data),
            _ => None,
        }
    }

    /// Gather a new array holding only the given points, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.components);
        for &index in indices {
            data.extend_from_slice(self.tuple(index));
        }
        Self {
            components: self.components,
            data,
        }
    }

    /// Elementwise blend `(1 - t) * self + t * other`
    ///
    /// Both arrays must have the same shape, which the interpolation
    /// alignment guarantees before ever calling this.
    pub(crate) fn lerp(&self, other: &Self, t: f64) -> Self {
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (1.0 - t) * a + t * b)
            .collect();
        Self {
            components: self.components,
            data,
        }
    }
}

/// Axis-aligned bounding box of a point cloud
///
/// Starts inverted at infinities so that folding points in with
/// [Bounds::update] needs no special first-point case. An empty dataset
/// therefore reports invalid bounds rather than a zero-sized box at the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest coordinate seen per axis
    pub min: [f64; 3],
    /// Largest coordinate seen per axis
    pub max: [f64; 3],
}

impl Bounds {
    /// Fresh bounds covering nothing
    pub fn new() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Grow the box to include one more point
    pub fn update(&mut self, point: &[f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Bounding box of a whole position buffer
    ///
    /// ```rust
    /// # use cosmopart::snapshot::Bounds;
    /// let bounds = Bounds::from_points(&[[0.0, 2.0, -1.0], [4.0, 1.0, 3.0]]);
    /// assert_eq!(bounds.min, [0.0, 1.0, -1.0]);
    /// assert_eq!(bounds.max, [4.0, 2.0, 3.0]);
    /// ```
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let mut bounds = Self::new();
        for point in points {
            bounds.update(point);
        }
        bounds
    }

    /// Box side lengths per axis
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Whether the point lies inside or on the box surface
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// False until at least one point has been folded in
    pub fn is_valid(&self) -> bool {
        (0..3).all(|axis| self.min[axis] <= self.max[axis])
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "min = ({}, {}, {}), max = ({}, {}, {})",
            self.min[0].sci(3, 2),
            self.min[1].sci(3, 2),
            self.min[2].sci(3, 2),
            self.max[0].sci(3, 2),
            self.max[1].sci(3, 2),
            self.max[2].sci(3, 2)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_components_rejects_ragged_buffers() {
        let result = AttributeArray::with_components(3, vec![1.0, 2.0]);
        assert!(result.is_err());
    }

    #[test]
    fn with_components_rejects_zero_width() {
        assert!(AttributeArray::with_components(0, vec![]).is_err());
    }

    #[test]
    fn select_gathers_tuples_in_order() {
        let array = AttributeArray::with_components(2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let picked = array.select(&[2, 0]);
        assert_eq!(picked.data(), &[4.0, 5.0, 0.0, 1.0]);
    }

    #[test]
    fn lerp_midpoint() {
        let a = AttributeArray::scalar(vec![0.0, 10.0]);
        let b = AttributeArray::scalar(vec![2.0, 20.0]);
        assert_eq!(a.lerp(&b, 0.5).data(), &[1.0, 15.0]);
    }

    #[test]
    fn empty_bounds_are_invalid() {
        assert!(!Bounds::from_points(&[]).is_valid());
    }

    #[test]
    fn contains_is_inclusive_of_surface() {
        let bounds = Bounds::from_points(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert!(bounds.contains(&[1.0, 0.0, 0.5]));
        assert!(!bounds.contains(&[1.0, 0.0, 1.5]));
    }
}
