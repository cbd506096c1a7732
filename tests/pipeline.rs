//! End-to-end runs of the dataset operations chained the way the viewer
//! drives them: load, classify, threshold, voxelize, and interpolate
//! between timesteps.

use cosmopart::classify::{split_by_category, Category, MaskLayout};
use cosmopart::filter::filter_range;
use cosmopart::interpolate::{align, interpolate};
use cosmopart::snapshot::AttributeDataset;
use cosmopart::view::ViewState;
use cosmopart::voxel::{voxelize, voxelize_par};

/// A small but fully populated snapshot in the shape a loader produces
fn loaded_snapshot() -> AttributeDataset {
    AttributeDataset::new(vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 1.0],
    ])
    .with_scalar("mass", vec![1.0, 2.0, 3.0, 4.0])
    .unwrap()
    .with_scalar("hh", vec![0.1, 0.1, 0.2, 0.2])
    .unwrap()
    .with_mask(vec![0b000000010, 0b000100010, 0b000000000, 0b100000000])
    .unwrap()
    .with_ids(vec![1, 2, 3, 4])
    .unwrap()
}

#[test]
fn classification_scenario_from_known_masks() {
    // masks chosen to hit baryon, star, dm, and agn exactly once
    let partition = split_by_category(&loaded_snapshot(), &MaskLayout::default()).unwrap();

    assert_eq!(partition.count(Category::Baryon), 1);
    assert_eq!(partition.count(Category::Star), 1);
    assert_eq!(partition.count(Category::Dm), 1);
    assert_eq!(partition.count(Category::Agn), 1);
    assert_eq!(partition.count(Category::Wind), 0);
    assert_eq!(partition.count(Category::Gas), 0);

    // the right points landed in the right subsets
    assert_eq!(partition.get(Category::Baryon).ids().unwrap(), &[1]);
    assert_eq!(partition.get(Category::Star).ids().unwrap(), &[2]);
    assert_eq!(partition.get(Category::Dm).ids().unwrap(), &[3]);
    assert_eq!(partition.get(Category::Agn).ids().unwrap(), &[4]);
}

#[test]
fn partition_subsets_can_be_voxelized_directly() {
    let snapshot = loaded_snapshot();
    let bounds = snapshot.bounds();
    let partition =
        split_by_category(&snapshot, &MaskLayout::default()).unwrap();

    let mut mapped_total = 0.0;
    for (_, subset) in partition.iter() {
        let grid = voxelize(subset, "mass", bounds, [3, 3, 3]).unwrap();
        assert_eq!(grid.skipped(), 0);
        mapped_total += grid.weighted_total();
    }

    // splitting first loses no mass
    assert!((mapped_total - 10.0).abs() < 1e-12);
}

#[test]
fn interpolated_frames_feed_the_same_pipeline() {
    let early = loaded_snapshot();

    // the next timestep: particle 1 is gone, particle 5 appeared, and the
    // survivors moved and gained mass
    let late = AttributeDataset::new(vec![
        [2.0, 0.0, 0.0],
        [0.0, 2.0, 0.0],
        [1.0, 1.0, 3.0],
        [5.0, 5.0, 5.0],
    ])
    .with_scalar("mass", vec![2.5, 3.5, 4.5, 9.0])
    .unwrap()
    .with_scalar("hh", vec![0.1, 0.2, 0.2, 0.3])
    .unwrap()
    .with_mask(vec![0b000100010, 0b000000000, 0b100000000, 0b000000000])
    .unwrap()
    .with_ids(vec![2, 3, 4, 5])
    .unwrap();

    let pair = align(&early, &late).unwrap();
    assert_eq!(pair.common_ids(), &[2, 3, 4]);
    assert!(pair.skipped().is_empty());

    let frame = pair.at(0.5);
    assert_eq!(frame.len(), 3);

    // the blended frame classifies like any loaded snapshot
    let partition = split_by_category(&frame, &MaskLayout::default()).unwrap();
    assert_eq!(partition.total(), 3);

    // and thresholds like one, e.g. particle 2 blends to mass 2.25
    let light = filter_range(&frame, "mass", None, Some(3.0)).unwrap();
    assert_eq!(light.ids().unwrap(), &[2]);

    // and voxelizes like one
    let grid = voxelize(&frame, "mass", frame.bounds(), [4, 4, 4]).unwrap();
    assert_eq!(grid.skipped(), 0);
    let blended_mass = 2.25 + 3.25 + 4.25;
    assert!((grid.weighted_total() - blended_mass).abs() < 1e-12);
}

#[test]
fn frame_count_is_independent_of_ordering_and_duplicates() {
    // ids arrive shuffled and with a duplicate in each snapshot
    let a = AttributeDataset::new(vec![[0.0; 3]; 5])
        .with_ids(vec![3, 1, 3, 2, 9])
        .unwrap();
    let b = AttributeDataset::new(vec![[1.0; 3]; 5])
        .with_ids(vec![2, 2, 7, 3, 1])
        .unwrap();

    for t in [0.0, 0.25, 0.5, 1.0] {
        let frame = interpolate(&a, &b, t).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.ids().unwrap(), &[1, 2, 3]);
    }
}

#[test]
fn view_state_drives_the_whole_derivation() {
    let snapshot = loaded_snapshot();

    let view = ViewState::new("mass")
        .with_threshold(Some(1.5), None)
        .hide(Category::Agn);

    let shown = view.apply(&snapshot, &MaskLayout::default()).unwrap();
    // agn particle 4 is hidden, baryon particle 1 fails the threshold
    assert_eq!(shown.ids().unwrap(), &[2, 3]);

    // the derived dataset voxelizes without further ceremony
    let grid = voxelize_par(&shown, "mass", snapshot.bounds(), [2, 2, 2]).unwrap();
    assert!((grid.weighted_total() - 5.0).abs() < 1e-12);
}

#[test]
fn operations_do_not_mutate_their_inputs() {
    let snapshot = loaded_snapshot();
    let before = snapshot.clone();

    let _ = split_by_category(&snapshot, &MaskLayout::default()).unwrap();
    let _ = filter_range(&snapshot, "mass", Some(2.0), Some(3.0)).unwrap();
    let _ = voxelize(&snapshot, "mass", snapshot.bounds(), [4, 4, 4]).unwrap();
    let _ = interpolate(&snapshot, &snapshot, 0.5).unwrap();

    assert_eq!(snapshot, before);
}

#[test]
fn failed_call_leaves_other_results_usable() {
    let snapshot = loaded_snapshot();

    // a bad attribute name fails that call and nothing else
    assert!(filter_range(&snapshot, "rho", None, None).is_err());

    let partition = split_by_category(&snapshot, &MaskLayout::default()).unwrap();
    assert_eq!(partition.total(), 4);
}
