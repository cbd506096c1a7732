//! Structure-of-arrays particle snapshot
//!
//! One simulation timestep as handed over by whatever loader sits upstream.
//! Positions, any number of named per-point arrays, and the optional species
//! mask and particle identifier columns all share a single point count.
//!
//! A dataset is immutable once produced. Every operation in this crate
//! reads one and returns a new dataset or grid, so derived data can always
//! be traced back to the snapshot it came from.

// internal modules
use crate::error::{Error, Result};
use crate::snapshot::attribute::{AttributeArray, Bounds};
use crate::utils::*;

// external crates
use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};

/// A single snapshot in structure-of-arrays form
///
/// Built up from a position buffer with the consuming builder methods, each
/// of which validates the shared-length invariant:
///
/// ```rust
/// # use cosmopart::snapshot::AttributeDataset;
/// let snapshot = AttributeDataset::new(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])
///     .with_scalar("mass", vec![0.5, 0.8])
///     .unwrap()
///     .with_mask(vec![0b10, 0b0])
///     .unwrap()
///     .with_ids(vec![7, 4])
///     .unwrap();
///
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(snapshot.scalar("mass").unwrap(), &[0.5, 0.8]);
/// ```
///
/// The mask and id columns are optional because derived datasets do not
/// always carry them, e.g. a voxelization input projected down to a single
/// scalar. Operations that need them return
/// [MissingAttribute](crate::error::Error::MissingAttribute) when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDataset {
    positions: Vec<[f64; 3]>,
    attributes: IndexMap<String, AttributeArray>,
    mask: Option<Vec<u32>>,
    ids: Option<Vec<u64>>,
}

/// Builder-style construction
impl AttributeDataset {
    /// A bare dataset holding positions only
    pub fn new(positions: Vec<[f64; 3]>) -> Self {
        Self {
            positions,
            attributes: IndexMap::new(),
            mask: None,
            ids: None,
        }
    }

    /// Attach a named per-point array
    ///
    /// The array must cover exactly one tuple per point. Attribute order is
    /// preserved, so derived datasets list arrays the way the loader did.
    pub fn with_attribute(mut self, name: &str, array: AttributeArray) -> Result<Self> {
        if array.len() != self.positions.len() {
            return Err(Error::ShapeMismatch {
                name: name.to_string(),
                expected: self.positions.len(),
                found: array.len(),
            });
        }
        self.attributes.insert(name.to_string(), array);
        Ok(self)
    }

    /// Attach a named scalar, the common case
    pub fn with_scalar(self, name: &str, data: Vec<f64>) -> Result<Self> {
        self.with_attribute(name, AttributeArray::scalar(data))
    }

    /// Attach the per-point species bitfield
    pub fn with_mask(mut self, mask: Vec<u32>) -> Result<Self> {
        if mask.len() != self.positions.len() {
            return Err(Error::ShapeMismatch {
                name: "mask".to_string(),
                expected: self.positions.len(),
                found: mask.len(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    /// Attach the per-point particle identifiers
    ///
    /// Raw snapshots are allowed to contain duplicate ids. Resolving them is
    /// the job of the consuming operation, see
    /// [align](crate::interpolate::align).
    pub fn with_ids(mut self, ids: Vec<u64>) -> Result<Self> {
        if ids.len() != self.positions.len() {
            return Err(Error::ShapeMismatch {
                name: "id".to_string(),
                expected: self.positions.len(),
                found: ids.len(),
            });
        }
        self.ids = Some(ids);
        Ok(self)
    }

    /// Assemble a dataset from already-validated parts
    ///
    /// Internal shortcut for operations that derive every column from an
    /// existing dataset and therefore cannot break the length invariant.
    pub(crate) fn from_parts(
        positions: Vec<[f64; 3]>,
        attributes: IndexMap<String, AttributeArray>,
        mask: Option<Vec<u32>>,
        ids: Option<Vec<u64>>,
    ) -> Self {
        Self {
            positions,
            attributes,
            mask,
            ids,
        }
    }
}

/// Read access
impl AttributeDataset {
    /// Number of particle slots
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check for a snapshot with no particles
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The position buffer
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// All named arrays in loader order
    pub fn attributes(&self) -> &IndexMap<String, AttributeArray> {
        &self.attributes
    }

    /// Names of all attached arrays, in loader order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|name| name.as_str())
    }

    /// A named array, or [MissingAttribute](crate::error::Error) if absent
    pub fn attribute(&self, name: &str) -> Result<&AttributeArray> {
        self.attributes.get(name).ok_or_else(|| Error::missing(name))
    }

    /// A named array, `None` if absent
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeArray> {
        self.attributes.get(name)
    }

    /// A named single-component array as a plain float slice
    ///
    /// Multi-component arrays are rejected with a
    /// [ShapeMismatch](crate::error::Error::ShapeMismatch) since the scalar
    /// operations have no meaningful way to use them.
    pub fn scalar(&self, name: &str) -> Result<&[f64]> {
        let array = self.attribute(name)?;
        array.as_scalar().ok_or_else(|| Error::ShapeMismatch {
            name: name.to_string(),
            expected: 1,
            found: array.components(),
        })
    }

    /// The species bitfield column
    pub fn mask(&self) -> Result<&[u32]> {
        self.mask.as_deref().ok_or_else(|| Error::missing("mask"))
    }

    /// The particle identifier column
    pub fn ids(&self) -> Result<&[u64]> {
        self.ids.as_deref().ok_or_else(|| Error::missing("id"))
    }

    /// Minimum and maximum of a named scalar
    ///
    /// Feeds the default bounds of the range filter and the view plumbing.
    /// An empty dataset reports the inverted infinity pair.
    pub fn attribute_range(&self, name: &str) -> Result<(f64, f64)> {
        let values = self.scalar(name)?;
        Ok((slice_min(values), slice_max(values)))
    }

    /// Axis-aligned bounding box of all positions
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.positions)
    }
}

/// Derivation of new datasets
impl AttributeDataset {
    /// Gather a new dataset holding the given points, in the given order
    ///
    /// Every column comes along, so the result is a self-contained snapshot
    /// of the selected particles. Indices must be in range and may repeat.
    pub fn select(&self, indices: &[usize]) -> AttributeDataset {
        let positions = indices.iter().map(|&i| self.positions[i]).collect();

        let mut attributes = IndexMap::with_capacity(self.attributes.len());
        for (name, array) in &self.attributes {
            attributes.insert(name.clone(), array.select(indices));
        }

        let mask = self
            .mask
            .as_ref()
            .map(|mask| indices.iter().map(|&i| mask[i]).collect());
        let ids = self
            .ids
            .as_ref()
            .map(|ids| indices.iter().map(|&i| ids[i]).collect());

        Self::from_parts(positions, attributes, mask, ids)
    }

    /// Keep only the named arrays, dropping the rest
    ///
    /// The mask and id columns are not attributes and always survive a
    /// projection. Asking for an array the dataset does not have is an
    /// error rather than a silent no-op.
    pub fn project(&self, names: &[&str]) -> Result<AttributeDataset> {
        let mut attributes = IndexMap::with_capacity(names.len());
        for &name in names {
            attributes.insert(name.to_string(), self.attribute(name)?.clone());
        }
        Ok(Self::from_parts(
            self.positions.clone(),
            attributes,
            self.mask.clone(),
            self.ids.clone(),
        ))
    }

    /// Copy of the first `n` points, handy for quick exploration
    ///
    /// Asking for more points than exist just returns the whole snapshot.
    pub fn head(&self, n: usize) -> AttributeDataset {
        let take = n.min(self.len());
        trace!("Slicing dataset to the first {take} points");
        let indices = (0..take).collect::<Vec<usize>>();
        self.select(&indices)
    }
}

impl std::fmt::Display for AttributeDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("AttributeDataset {{\n    points: {}\n", self.len());
        for (name, array) in &self.attributes {
            s += &f!("    array: {:10} {}d\n", name, array.components());
        }
        if self.mask.is_some() {
            s += "    array: mask\n";
        }
        if self.ids.is_some() {
            s += "    array: id\n";
        }
        if !self.is_empty() {
            s += &f!("    bounds: {}\n", self.bounds());
        }
        s += "}";
        write!(f, "{}", s)
    }
}
