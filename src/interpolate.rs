//! ID-matched temporal interpolation between snapshots
//!
//! # Overview
//!
//! Native snapshot cadence is usually too coarse for smooth animation or
//! video export. This module blends two time-adjacent snapshots into
//! intermediate frames by matching particles through their ids rather
//! than trusting any array ordering, since the same particle rarely sits
//! at the same index in consecutive files.
//!
//! ```rust
//! use cosmopart::interpolate::align;
//! use cosmopart::snapshot::AttributeDataset;
//!
//! let early = AttributeDataset::new(vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]])
//!     .with_ids(vec![1, 2])
//!     .unwrap();
//! let late = AttributeDataset::new(vec![[4.0, 0.0, 0.0], [6.0, 0.0, 0.0]])
//!     .with_ids(vec![2, 3])
//!     .unwrap();
//!
//! // only particle 2 exists in both snapshots
//! let pair = align(&early, &late).unwrap();
//! assert_eq!(pair.common_ids(), &[2]);
//!
//! // halfway between its two observed positions
//! let frame = pair.at(0.5);
//! assert_eq!(frame.positions(), &[[3.0, 0.0, 0.0]]);
//! ```
//!
//! # Matching
//!
//! Alignment happens once per snapshot pair and every blended frame reuses
//! it:
//!
//! 1. duplicate ids within each snapshot are resolved to their first
//!    occurrence, in insertion order, so repeated runs give identical
//!    results
//! 2. the id sets are intersected
//! 3. both snapshots are reindexed to the common ids in ascending id
//!    order, after which index `i` refers to the same physical particle
//!    on both sides
//!
//! Attributes that cannot be blended are dropped from the aligned pair and
//! recorded as [SkippedAttribute] entries instead of failing the whole
//! pair, so one malformed array never aborts a video export.

// internal modules
use crate::error::Result;
use crate::snapshot::AttributeDataset;

// external crates
use indexmap::IndexMap;
use itertools::Itertools;
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, warn};

/// Why an attribute was left out of an aligned pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Present in both snapshots but with different component counts
    ComponentMismatch {
        /// Components in the first snapshot
        expected: usize,
        /// Components in the second snapshot
        found: usize,
    },
    /// Present in only one of the two snapshots
    MissingInOther,
}

/// An attribute dropped during alignment, and why
///
/// Collected on the [Alignment] rather than printed and forgotten, so a
/// caller driving a long export can surface every degraded attribute
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAttribute {
    /// Name of the dropped array
    pub name: String,
    /// What disqualified it
    pub reason: SkipReason,
}

/// A pair of snapshots reindexed onto their common particles
///
/// Produced by [align]. Both halves contain exactly the common particles
/// in ascending id order and an identical attribute schema, which makes
/// every per-frame blend a straight elementwise pass.
#[derive(Debug, Clone)]
pub struct Alignment {
    first: AttributeDataset,
    second: AttributeDataset,
    common_ids: Vec<u64>,
    skipped: Vec<SkippedAttribute>,
    disable_progress: bool,
}

/// Match two snapshots by particle id
///
/// Deduplicates ids within each snapshot (first occurrence wins), then
/// intersects and reindexes both onto the common ids in ascending order.
/// Returns [MissingAttribute](crate::error::Error::MissingAttribute) when
/// either snapshot lacks an id column; disjoint id sets are fine and
/// simply produce an empty alignment.
pub fn align(first: &AttributeDataset, second: &AttributeDataset) -> Result<Alignment> {
    let index_first = first_occurrence_index(first.ids()?);
    let index_second = first_occurrence_index(second.ids()?);

    // deterministic shared ordering for both reindexed datasets
    let common_ids = index_first
        .keys()
        .filter(|id| index_second.contains_key(*id))
        .copied()
        .sorted()
        .collect::<Vec<u64>>();

    let rows_first = common_ids
        .iter()
        .map(|id| index_first[id])
        .collect::<Vec<usize>>();
    let rows_second = common_ids
        .iter()
        .map(|id| index_second[id])
        .collect::<Vec<usize>>();

    debug!(
        "Aligned snapshots: {} and {} points share {} ids",
        first.len(),
        second.len(),
        common_ids.len()
    );

    let mut aligned_first = first.select(&rows_first);
    let mut aligned_second = second.select(&rows_second);
    let skipped = reconcile_attributes(&mut aligned_first, &mut aligned_second);

    Ok(Alignment {
        first: aligned_first,
        second: aligned_second,
        common_ids,
        skipped,
        disable_progress: false,
    })
}

/// One-shot blend of two snapshots at fractional time `t`
///
/// Convenience wrapper over [align] for a single frame. When producing
/// several frames from the same pair, align once and call
/// [Alignment::at] per frame instead, the matching is the expensive part.
pub fn interpolate(
    first: &AttributeDataset,
    second: &AttributeDataset,
    t: f64,
) -> Result<AttributeDataset> {
    Ok(align(first, second)?.at(t))
}

impl Alignment {
    /// Number of matched particles
    pub fn len(&self) -> usize {
        self.common_ids.len()
    }

    /// Check whether the snapshots share any particles at all
    pub fn is_empty(&self) -> bool {
        self.common_ids.is_empty()
    }

    /// The matched ids in the shared ascending order
    pub fn common_ids(&self) -> &[u64] {
        &self.common_ids
    }

    /// The first snapshot reindexed onto the common particles
    pub fn first(&self) -> &AttributeDataset {
        &self.first
    }

    /// The second snapshot reindexed onto the common particles
    pub fn second(&self) -> &AttributeDataset {
        &self.second
    }

    /// Attributes dropped during alignment, with reasons
    pub fn skipped(&self) -> &[SkippedAttribute] {
        &self.skipped
    }

    /// Do not print the progress indicator during [frames](Self::frames)
    pub fn disable_progress(&mut self) {
        self.disable_progress = true;
    }

    /// Blend the pair at fractional time `t`
    ///
    /// Positions and every shared attribute are blended elementwise as
    /// `(1 - t) * first + t * second`. The endpoints are returned as exact
    /// copies of the aligned inputs, bit for bit, rather than trusting
    /// `a * 1.0 + b * 0.0` arithmetic to do so. Values of `t` outside
    /// `[0, 1]` are clamped.
    ///
    /// The blended frame carries the common ids and the first snapshot's
    /// mask column, a bitfield has no meaningful halfway point.
    pub fn at(&self, t: f64) -> AttributeDataset {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 {
            return self.first.clone();
        }
        if t == 1.0 {
            return self.second.clone();
        }

        let positions = self
            .first
            .positions()
            .iter()
            .zip(self.second.positions())
            .map(|(a, b)| {
                [
                    (1.0 - t) * a[0] + t * b[0],
                    (1.0 - t) * a[1] + t * b[1],
                    (1.0 - t) * a[2] + t * b[2],
                ]
            })
            .collect::<Vec<[f64; 3]>>();

        // schemas match after alignment, so every attribute blends
        let mut attributes = IndexMap::with_capacity(self.first.attributes().len());
        for (name, array) in self.first.attributes() {
            attributes.insert(name.clone(), array.lerp(&self.second.attributes()[name], t));
        }

        let mask = self.first.mask().ok().map(<[u32]>::to_vec);
        AttributeDataset::from_parts(positions, attributes, mask, Some(self.common_ids.clone()))
    }

    /// Blend a whole sub-frame sequence for export
    ///
    /// Produces frames at [sub_steps]`(steps)`, i.e. equidistant times
    /// covering `[0, 1)` so that chained snapshot pairs do not repeat
    /// their shared endpoint frame. Progress is reported on a bar unless
    /// [disabled](Self::disable_progress).
    pub fn frames(&self, steps: usize) -> Vec<AttributeDataset> {
        let times = sub_steps(steps);
        let mut progress_bar = self.init_progress_bar(times.len());

        times
            .iter()
            .map(|t| {
                progress_bar.update(1).unwrap();
                self.at(*t)
            })
            .collect()
    }

    fn init_progress_bar(&self, total: usize) -> Bar {
        BarBuilder::default()
            .total(total)
            .unit(" frames")
            .disable(self.disable_progress)
            .build()
            .unwrap()
    }
}

/// Equidistant blend times covering `[0, 1)`
///
/// The full closed range is divided into `n - 1` equal intervals and the
/// final endpoint dropped, since the next snapshot pair in a sequence
/// starts with that exact frame.
///
/// ```rust
/// # use cosmopart::interpolate::sub_steps;
/// assert_eq!(sub_steps(5), vec![0.0, 0.25, 0.5, 0.75]);
/// assert_eq!(sub_steps(1), vec![0.0]);
/// ```
pub fn sub_steps(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![0.0];
    }
    let interval = 1.0 / (n - 1) as f64;
    (0..n - 1).map(|i| i as f64 * interval).collect()
}

/// Map each id to the index of its first occurrence, in insertion order
fn first_occurrence_index(ids: &[u64]) -> IndexMap<u64, usize> {
    let mut index = IndexMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        index.entry(*id).or_insert(i);
    }
    index
}

/// Drop attributes the two halves cannot blend, recording each one
///
/// After this both datasets carry exactly the attribute names they share
/// with equal component counts, so the per-frame blend needs no further
/// checks.
fn reconcile_attributes(
    first: &mut AttributeDataset,
    second: &mut AttributeDataset,
) -> Vec<SkippedAttribute> {
    let mut skipped = Vec::new();
    let mut keep = Vec::new();

    for (name, array) in first.attributes() {
        match second.get_attribute(name) {
            Some(other) if other.components() == array.components() => {
                keep.push(name.clone());
            }
            Some(other) => {
                warn!(
                    "Skipping attribute \"{name}\": {} components vs {}",
                    array.components(),
                    other.components()
                );
                skipped.push(SkippedAttribute {
                    name: name.clone(),
                    reason: SkipReason::ComponentMismatch {
                        expected: array.components(),
                        found: other.components(),
                    },
                });
            }
            None => {
                warn!("Skipping attribute \"{name}\": missing in second snapshot");
                skipped.push(SkippedAttribute {
                    name: name.clone(),
                    reason: SkipReason::MissingInOther,
                });
            }
        }
    }

    for name in second.attribute_names() {
        if first.get_attribute(name).is_none() {
            warn!("Skipping attribute \"{name}\": missing in first snapshot");
            skipped.push(SkippedAttribute {
                name: name.to_string(),
                reason: SkipReason::MissingInOther,
            });
        }
    }

    let keep_refs = keep.iter().map(|name| name.as_str()).collect::<Vec<&str>>();
    // names are known present on both sides, projection cannot fail
    *first = first.project(&keep_refs).unwrap();
    *second = second.project(&keep_refs).unwrap();

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::AttributeArray;

    fn snapshot(ids: Vec<u64>, x: Vec<f64>, mass: Vec<f64>) -> AttributeDataset {
        let positions = x.iter().map(|x| [*x, 0.0, 0.0]).collect();
        AttributeDataset::new(positions)
            .with_scalar("mass", mass)
            .unwrap()
            .with_ids(ids)
            .unwrap()
    }

    #[test]
    fn only_common_ids_survive() {
        let a = snapshot(vec![1, 2, 3], vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]);
        let b = snapshot(vec![2, 3, 4], vec![10.0, 20.0, 30.0], vec![2.5, 3.5, 4.5]);

        let pair = align(&a, &b).unwrap();
        assert_eq!(pair.common_ids(), &[2, 3]);
        assert_eq!(pair.len(), 2);

        // any blend keeps exactly the matched particles
        for t in [0.0, 0.3, 1.0] {
            assert_eq!(pair.at(t).len(), 2);
        }
    }

    #[test]
    fn duplicates_resolve_to_first_occurrence() {
        // id 7 appears twice in A, the x=1.0 copy must win
        let a = snapshot(vec![7, 7, 8], vec![1.0, 99.0, 2.0], vec![0.1, 0.2, 0.3]);
        let b = snapshot(vec![8, 7], vec![4.0, 3.0], vec![0.4, 0.5]);

        let pair = align(&a, &b).unwrap();
        assert_eq!(pair.common_ids(), &[7, 8]);
        assert_eq!(pair.first().positions(), &[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(pair.second().positions(), &[[3.0, 0.0, 0.0], [4.0, 0.0, 0.0]]);
    }

    #[test]
    fn alignment_ignores_original_array_order() {
        let a = snapshot(vec![3, 1, 2], vec![30.0, 10.0, 20.0], vec![3.0, 1.0, 2.0]);
        let b = snapshot(vec![2, 3, 1], vec![21.0, 31.0, 11.0], vec![2.0, 3.0, 1.0]);

        let pair = align(&a, &b).unwrap();
        assert_eq!(pair.common_ids(), &[1, 2, 3]);
        // index i refers to the same particle on both sides
        assert_eq!(pair.first().scalar("mass").unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(pair.second().scalar("mass").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn endpoints_are_bit_identical_to_the_aligned_inputs() {
        let a = snapshot(vec![1, 2], vec![0.1, 0.2], vec![1.0, 2.0]);
        let b = snapshot(vec![2, 1], vec![0.4, 0.3], vec![2.1, 1.1]);

        let pair = align(&a, &b).unwrap();
        assert_eq!(pair.at(0.0), *pair.first());
        assert_eq!(pair.at(1.0), *pair.second());
    }

    #[test]
    fn midpoint_blends_positions_and_attributes() {
        let a = snapshot(vec![1, 2], vec![0.0, 2.0], vec![1.0, 3.0]);
        let b = snapshot(vec![1, 2], vec![1.0, 4.0], vec![2.0, 5.0]);

        let frame = align(&a, &b).unwrap().at(0.5);
        assert_eq!(frame.positions(), &[[0.5, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        assert_eq!(frame.scalar("mass").unwrap(), &[1.5, 4.0]);
        assert_eq!(frame.ids().unwrap(), &[1, 2]);
    }

    #[test]
    fn out_of_range_times_are_clamped() {
        let a = snapshot(vec![1], vec![0.0], vec![1.0]);
        let b = snapshot(vec![1], vec![2.0], vec![3.0]);

        let pair = align(&a, &b).unwrap();
        assert_eq!(pair.at(-0.5), *pair.first());
        assert_eq!(pair.at(1.5), *pair.second());
    }

    #[test]
    fn mismatched_attribute_is_skipped_not_fatal() {
        let a = snapshot(vec![1, 2], vec![0.0, 1.0], vec![1.0, 2.0])
            .with_attribute(
                "vel",
                AttributeArray::with_components(3, vec![0.0; 6]).unwrap(),
            )
            .unwrap();
        let b = snapshot(vec![1, 2], vec![2.0, 3.0], vec![3.0, 4.0])
            .with_scalar("vel", vec![0.0, 0.0])
            .unwrap();

        let pair = align(&a, &b).unwrap();
        assert_eq!(
            pair.skipped(),
            &[SkippedAttribute {
                name: "vel".to_string(),
                reason: SkipReason::ComponentMismatch {
                    expected: 3,
                    found: 1
                },
            }]
        );

        // the other attribute still blends
        let frame = pair.at(0.5);
        assert!(frame.get_attribute("vel").is_none());
        assert_eq!(frame.scalar("mass").unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn one_sided_attribute_is_recorded() {
        let a = snapshot(vec![1], vec![0.0], vec![1.0]);
        let b = snapshot(vec![1], vec![1.0], vec![2.0])
            .with_scalar("uu", vec![9.0])
            .unwrap();

        let pair = align(&a, &b).unwrap();
        assert_eq!(
            pair.skipped(),
            &[SkippedAttribute {
                name: "uu".to_string(),
                reason: SkipReason::MissingInOther,
            }]
        );
    }

    #[test]
    fn missing_ids_are_fatal() {
        let a = AttributeDataset::new(vec![[0.0; 3]]);
        let b = snapshot(vec![1], vec![0.0], vec![1.0]);
        assert!(align(&a, &b).is_err());
    }

    #[test]
    fn disjoint_snapshots_align_to_empty() {
        let a = snapshot(vec![1], vec![0.0], vec![1.0]);
        let b = snapshot(vec![2], vec![1.0], vec![2.0]);

        let pair = align(&a, &b).unwrap();
        assert!(pair.is_empty());
        assert!(pair.at(0.5).is_empty());
    }

    #[test]
    fn frames_cover_the_half_open_interval() {
        let a = snapshot(vec![1], vec![0.0], vec![0.0]);
        let b = snapshot(vec![1], vec![3.0], vec![3.0]);

        let mut pair = align(&a, &b).unwrap();
        pair.disable_progress();

        let frames = pair.frames(4);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].positions()[0][0], 0.0);
        assert!((frames[1].positions()[0][0] - 1.0).abs() < 1e-12);
        assert!((frames[2].positions()[0][0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sub_steps_edge_counts() {
        assert_eq!(sub_steps(0), vec![0.0]);
        assert_eq!(sub_steps(2), vec![0.0]);
        assert_eq!(sub_steps(3), vec![0.0, 0.5]);
    }
}
