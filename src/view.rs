//! Immutable view-state applied to snapshots
//!
//! The viewer's current selections, which scalar drives coloring, where
//! the threshold sliders sit, which species are toggled visible, used to
//! be a pile of process-wide globals that every routine read and wrote at
//! will. Here it is a plain immutable value instead: build a [ViewState],
//! pass it into [apply](ViewState::apply), get a derived dataset back.
//! Two calls with the same state and snapshot always agree, and nothing
//! in this crate reads or writes shared state behind the caller's back.

// internal modules
use crate::classify::{Category, MaskLayout};
use crate::error::Result;
use crate::filter::filter_range;
use crate::snapshot::AttributeDataset;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// One consistent set of viewer selections
///
/// ```rust
/// use cosmopart::classify::{Category, MaskLayout};
/// use cosmopart::snapshot::AttributeDataset;
/// use cosmopart::view::ViewState;
///
/// let snapshot = AttributeDataset::new(vec![[0.0; 3]; 3])
///     .with_scalar("mass", vec![0.2, 0.6, 0.9])
///     .unwrap()
///     .with_mask(vec![0b10, 0b0, 0b10])
///     .unwrap();
///
/// // show baryons only, thresholded to mass <= 0.5
/// let view = ViewState::new("mass")
///     .with_threshold(None, Some(0.5))
///     .hide(Category::Dm);
///
/// let shown = view.apply(&snapshot, &MaskLayout::default()).unwrap();
/// assert_eq!(shown.scalar("mass").unwrap(), &[0.2]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Name of the attribute driving coloring and thresholding
    pub scalar: String,
    /// Lower threshold bound, `None` for the data minimum
    pub threshold_min: Option<f64>,
    /// Upper threshold bound, `None` for the data maximum
    pub threshold_max: Option<f64>,
    /// Species currently toggled off
    pub hidden: Vec<Category>,
}

impl ViewState {
    /// A view of one scalar with no thresholding and everything visible
    pub fn new(scalar: &str) -> Self {
        Self {
            scalar: scalar.to_string(),
            threshold_min: None,
            threshold_max: None,
            hidden: Vec::new(),
        }
    }

    /// Replace the threshold bounds
    pub fn with_threshold(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.threshold_min = min;
        self.threshold_max = max;
        self
    }

    /// Toggle one species off
    pub fn hide(mut self, category: Category) -> Self {
        if !self.hidden.contains(&category) {
            self.hidden.push(category);
        }
        self
    }

    /// Whether a species is currently shown
    pub fn is_visible(&self, category: Category) -> bool {
        !self.hidden.contains(&category)
    }

    /// Derive the dataset this view actually shows
    ///
    /// Drops the points of hidden species first, then thresholds the
    /// active scalar over what is left, matching the order the viewer
    /// pipeline applies them in. With nothing hidden the mask column is
    /// not needed and a maskless dataset passes straight to thresholding.
    pub fn apply(
        &self,
        dataset: &AttributeDataset,
        layout: &MaskLayout,
    ) -> Result<AttributeDataset> {
        let visible = if self.hidden.is_empty() || dataset.is_empty() {
            dataset.clone()
        } else {
            let mask = dataset.mask()?;
            let indices = mask
                .iter()
                .enumerate()
                .filter(|(_, m)| self.is_visible(layout.classify(**m)))
                .map(|(i, _)| i)
                .collect::<Vec<usize>>();
            debug!(
                "View hides {:?}: {} of {} points visible",
                self.hidden,
                indices.len(),
                dataset.len()
            );
            dataset.select(&indices)
        };

        filter_range(
            &visible,
            &self.scalar,
            self.threshold_min,
            self.threshold_max,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AttributeDataset {
        AttributeDataset::new(vec![[0.0; 3]; 4])
            .with_scalar("mass", vec![0.1, 0.9, 0.5, 0.7])
            .unwrap()
            .with_mask(vec![0b000000000, 0b000000010, 0b000000000, 0b100000000])
            .unwrap()
    }

    #[test]
    fn default_view_shows_everything() {
        let view = ViewState::new("mass");
        let shown = view.apply(&snapshot(), &MaskLayout::default()).unwrap();
        assert_eq!(shown.len(), 4);
    }

    #[test]
    fn hidden_species_are_dropped_before_thresholding() {
        let view = ViewState::new("mass").hide(Category::Dm).hide(Category::Agn);
        let shown = view.apply(&snapshot(), &MaskLayout::default()).unwrap();
        // only the single baryon survives
        assert_eq!(shown.scalar("mass").unwrap(), &[0.9]);
    }

    #[test]
    fn threshold_applies_to_the_visible_subset() {
        let view = ViewState::new("mass")
            .hide(Category::Baryon)
            .with_threshold(Some(0.4), Some(0.8));
        let shown = view.apply(&snapshot(), &MaskLayout::default()).unwrap();
        assert_eq!(shown.scalar("mass").unwrap(), &[0.5, 0.7]);
    }

    #[test]
    fn hiding_twice_is_harmless() {
        let view = ViewState::new("mass").hide(Category::Dm).hide(Category::Dm);
        assert_eq!(view.hidden, vec![Category::Dm]);
        assert!(!view.is_visible(Category::Dm));
        assert!(view.is_visible(Category::Gas));
    }

    #[test]
    fn maskless_dataset_is_fine_when_nothing_is_hidden() {
        let dataset = AttributeDataset::new(vec![[0.0; 3]; 2])
            .with_scalar("mass", vec![1.0, 2.0])
            .unwrap();
        let view = ViewState::new("mass");
        assert_eq!(view.apply(&dataset, &MaskLayout::default()).unwrap().len(), 2);

        // but hiding a species on it needs the mask
        let view = view.hide(Category::Dm);
        assert!(view.apply(&dataset, &MaskLayout::default()).is_err());
    }

    #[test]
    fn empty_dataset_passes_through() {
        let view = ViewState::new("mass").hide(Category::Dm);
        let empty = AttributeDataset::new(Vec::new());
        assert!(view
            .apply(&empty, &MaskLayout::default())
            .unwrap()
            .is_empty());
    }
}
