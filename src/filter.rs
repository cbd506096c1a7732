//! Range thresholding of the active scalar
//!
//! Keeps the points whose value for a named scalar lies inside closed
//! bounds. This is the data side of the viewer's threshold sliders, so
//! unspecified bounds fall back to the full range of the data itself and a
//! reversed pair of sliders is repaired rather than rejected.

// internal modules
use crate::error::Result;
use crate::snapshot::AttributeDataset;
use crate::utils::*;

// external crates
use log::{debug, warn};

/// Keep the points whose `name` value lies within `[min, max]`
///
/// The surviving points keep their original relative order and all of
/// their columns. Bounds are inclusive on both ends.
///
/// - `min`/`max` - threshold bounds; `None` defaults to the dataset's own
///   minimum/maximum for the attribute, so passing `(None, None)` is a
///   no-op that returns the full dataset.
/// - a reversed pair (`min > max`) is normalised by swapping and logged,
///   rather than silently producing an empty result.
///
/// Points whose value is NaN never satisfy the bounds and are dropped.
///
/// ```rust
/// # use cosmopart::filter::filter_range;
/// # use cosmopart::snapshot::AttributeDataset;
/// let snapshot = AttributeDataset::new(vec![[0.0; 3]; 4])
///     .with_scalar("mass", vec![0.1, 0.4, 0.8, 0.3])
///     .unwrap();
///
/// let filtered = filter_range(&snapshot, "mass", Some(0.3), Some(0.5)).unwrap();
/// assert_eq!(filtered.scalar("mass").unwrap(), &[0.4, 0.3]);
///
/// // full range keeps everything
/// let all = filter_range(&snapshot, "mass", None, None).unwrap();
/// assert_eq!(all.len(), 4);
/// ```
pub fn filter_range(
    dataset: &AttributeDataset,
    name: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<AttributeDataset> {
    // nothing to threshold, nothing to complain about
    if dataset.is_empty() {
        return Ok(dataset.clone());
    }

    let values = dataset.scalar(name)?;

    let mut lower = min.unwrap_or_else(|| slice_min(values));
    let mut upper = max.unwrap_or_else(|| slice_max(values));

    if lower > upper {
        warn!("Threshold bounds reversed ({lower} > {upper}), swapping");
        std::mem::swap(&mut lower, &mut upper);
    }

    let indices = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v >= lower && **v <= upper)
        .map(|(i, _)| i)
        .collect::<Vec<usize>>();

    debug!(
        "Threshold {name} in [{lower}, {upper}]: kept {} of {} points",
        indices.len(),
        dataset.len()
    );

    Ok(dataset.select(&indices))
}
