//! Particle species classification from mask bitfields
//!
//! # Overview
//!
//! Every particle carries an integer mask tagging its simulation species.
//! This module owns the one canonical decode of that bitfield, replacing
//! the ad hoc bit tests that tend to accumulate at call sites and drift
//! out of sync with each other.
//!
//! ```rust
//! use cosmopart::classify::{Category, MaskLayout};
//!
//! let layout = MaskLayout::default();
//! assert_eq!(layout.classify(0b000000000), Category::Dm);
//! assert_eq!(layout.classify(0b000100010), Category::Star);
//! ```
//!
//! # Bit layout
//!
//! Historical snapshot revisions disagree on where the flag bits live, so
//! the positions are configuration rather than constants. The default
//! [MaskLayout] is the layout of the current snapshot generation:
//!
//! | Flag | Bit | Meaning when set                      |
//! | ---- | --- | ------------------------------------- |
//! | dm   | 1   | clear = dark matter, set = baryonic   |
//! | star | 5   | baryon is a star particle             |
//! | wind | 6   | baryon is a wind particle             |
//! | gas  | 7   | baryon is a gas particle              |
//! | agn  | 8   | dark-matter particle hosting an AGN   |
//!
//! Older revisions (dm on bit 2, agn on bit 2) are handled by constructing
//! a [MaskLayout] with those positions instead.
//!
//! # Decode precedence
//!
//! The flags are resolved in a fixed order so that every mask lands in
//! exactly one [Category]:
//!
//! 1. dark matter when the dm bit is clear, baryonic otherwise
//! 2. star/wind/gas flags only ever apply to baryons
//! 3. the agn flag only ever applies to dark matter
//! 4. an AGN outranks plain dark matter, and any star/wind/gas flag
//!    outranks plain baryon

// internal modules
use crate::error::Result;
use crate::snapshot::AttributeDataset;
use crate::utils::*;

// external crates
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The six mutually exclusive particle species
///
/// Listed in decode priority order. Every mask value resolves to exactly
/// one variant, so counting over a partition always adds back up to the
/// input point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Active galactic nucleus, a dark-matter special case
    Agn,
    /// Dark matter
    Dm,
    /// Star-flagged baryon
    Star,
    /// Wind-flagged baryon
    Wind,
    /// Gas-flagged baryon
    Gas,
    /// Baryon with no further flags
    Baryon,
}

impl Category {
    /// All categories in decode priority order
    pub const ALL: [Category; 6] = [
        Category::Agn,
        Category::Dm,
        Category::Star,
        Category::Wind,
        Category::Gas,
        Category::Baryon,
    ];

    /// Lower-case label, matching the names used in snapshot tooling
    pub const fn name(&self) -> &'static str {
        match self {
            Category::Agn => "agn",
            Category::Dm => "dm",
            Category::Star => "star",
            Category::Wind => "wind",
            Category::Gas => "gas",
            Category::Baryon => "baryon",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Bit positions of the species flags within a mask
///
/// Field values are bit *positions*, not masks, so the default dm entry of
/// `1` tests `mask & (1 << 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskLayout {
    /// Clear = dark matter, set = baryonic
    pub dm: u32,
    /// Star flag on baryons
    pub star: u32,
    /// Wind flag on baryons
    pub wind: u32,
    /// Gas flag on baryons
    pub gas: u32,
    /// AGN flag on dark matter
    pub agn: u32,
}

impl Default for MaskLayout {
    fn default() -> Self {
        Self {
            dm: 1,
            star: 5,
            wind: 6,
            gas: 7,
            agn: 8,
        }
    }
}

impl MaskLayout {
    /// Decode a mask into the full set of species booleans
    ///
    /// The booleans are resolved with the documented precedence, so `dm`
    /// and `agn` never overlap and `baryon` is only set when none of the
    /// star/wind/gas flags are. Star, wind, and gas may overlap here; the
    /// single-category view in [classify](Self::classify) settles that by
    /// priority.
    pub fn flags(&self, mask: u32) -> MaskFlags {
        let dm = mask & (1 << self.dm) == 0;
        let baryon = !dm;
        let star = baryon && mask & (1 << self.star) != 0;
        let wind = baryon && mask & (1 << self.wind) != 0;
        let gas = baryon && mask & (1 << self.gas) != 0;
        let agn = dm && mask & (1 << self.agn) != 0;

        MaskFlags {
            dm: dm && !agn,
            baryon: baryon && !star && !wind && !gas,
            star,
            wind,
            gas,
            agn,
        }
    }

    /// Decode a mask into its single species category
    ///
    /// ```rust
    /// # use cosmopart::classify::{Category, MaskLayout};
    /// let layout = MaskLayout::default();
    /// assert_eq!(layout.classify(0b100000000), Category::Agn);
    /// assert_eq!(layout.classify(0b000000010), Category::Baryon);
    /// ```
    pub fn classify(&self, mask: u32) -> Category {
        let flags = self.flags(mask);
        if flags.agn {
            Category::Agn
        } else if flags.dm {
            Category::Dm
        } else if flags.star {
            Category::Star
        } else if flags.wind {
            Category::Wind
        } else if flags.gas {
            Category::Gas
        } else {
            Category::Baryon
        }
    }
}

/// The fully resolved species booleans of one mask value
///
/// Mostly useful for inspection tooling. Note that a baryon may carry
/// several of the star/wind/gas flags at once; `baryon` itself is only set
/// when it carries none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskFlags {
    /// Dark matter without an AGN flag
    pub dm: bool,
    /// Baryon without star/wind/gas flags
    pub baryon: bool,
    /// Star-flagged baryon
    pub star: bool,
    /// Wind-flagged baryon
    pub wind: bool,
    /// Gas-flagged baryon
    pub gas: bool,
    /// AGN-flagged dark matter
    pub agn: bool,
}

/// Split a snapshot into one sub-dataset per species
///
/// Every point lands in exactly one subset and all columns come along, so
/// the six subsets together are a reordering of the input. The relative
/// order of points within a subset follows the input order.
///
/// An empty dataset yields six empty subsets rather than an error. A
/// non-empty dataset without a mask column cannot be classified and
/// returns [MissingAttribute](crate::error::Error::MissingAttribute).
///
/// ```rust
/// # use cosmopart::classify::{split_by_category, Category, MaskLayout};
/// # use cosmopart::snapshot::AttributeDataset;
/// let snapshot = AttributeDataset::new(vec![[0.0; 3]; 3])
///     .with_mask(vec![0b000000010, 0b000000000, 0b100000000])
///     .unwrap();
///
/// let partition = split_by_category(&snapshot, &MaskLayout::default()).unwrap();
/// assert_eq!(partition.count(Category::Baryon), 1);
/// assert_eq!(partition.count(Category::Dm), 1);
/// assert_eq!(partition.count(Category::Agn), 1);
/// assert_eq!(partition.total(), snapshot.len());
/// ```
pub fn split_by_category(dataset: &AttributeDataset, layout: &MaskLayout) -> Result<Partition> {
    if dataset.is_empty() {
        let subsets = std::array::from_fn(|_| dataset.select(&[]));
        return Ok(Partition { subsets, total: 0 });
    }

    let mask = dataset.mask()?;

    // per-point decode is independent, scatter afterwards to keep the
    // within-subset point order stable
    let categories = mask
        .par_iter()
        .map(|m| layout.classify(*m))
        .collect::<Vec<Category>>();

    let mut rows: [Vec<usize>; 6] = Default::default();
    for (index, category) in categories.iter().enumerate() {
        rows[*category as usize].push(index);
    }

    debug!(
        "Split {} points: {:?}",
        dataset.len(),
        Category::ALL.map(|c| f!("{} {}", c, rows[c as usize].len()))
    );

    let subsets = rows.map(|indices| dataset.select(&indices));
    Ok(Partition {
        subsets,
        total: dataset.len(),
    })
}

/// Split a snapshot per species, keeping only the named arrays
///
/// Same partition as [split_by_category] but each subset carries just the
/// requested attributes, typically the active scalar plus the smoothing
/// length used for point radius scaling. Mask and id columns always come
/// along.
pub fn split_by_category_selected(
    dataset: &AttributeDataset,
    layout: &MaskLayout,
    names: &[&str],
) -> Result<Partition> {
    let projected = dataset.project(names)?;
    split_by_category(&projected, layout)
}

/// Result of partitioning one snapshot by species
///
/// Holds one sub-dataset per [Category]. The Display impl prints the count
/// table that is handy when eyeballing a new snapshot:
///
/// ```text
/// agn             3     0.001 %
/// dm        1048576    49.932 %
/// ...
/// ```
#[derive(Debug, Clone)]
pub struct Partition {
    subsets: [AttributeDataset; 6],
    total: usize,
}

impl Partition {
    /// The sub-dataset of one species
    pub fn get(&self, category: Category) -> &AttributeDataset {
        &self.subsets[category as usize]
    }

    /// Number of points classified into one species
    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    /// Point count of the snapshot that was partitioned
    pub fn total(&self) -> usize {
        self.total
    }

    /// Iterate the subsets in decode priority order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &AttributeDataset)> {
        Category::ALL.iter().map(|c| (*c, self.get(*c)))
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = String::new();
        for (category, subset) in self.iter() {
            let percent = if self.total > 0 {
                100.0 * subset.len() as f64 / self.total as f64
            } else {
                0.0
            };
            s += &f!("{:8} {:8} {:9.3} %\n", category.name(), subset.len(), percent);
        }
        write!(f, "{}", s.trim_end())
    }
}
