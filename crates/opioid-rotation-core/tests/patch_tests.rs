//! Fentanyl patch integration tests.

use opioid_rotation_core::convert::{
    combine_patch_sizes, fentanyl_patch_to_ome, ome_to_target_rate, AVAILABLE_PATCH_SIZES,
    FENTANYL_PATCH_TABLE,
};
use opioid_rotation_core::models::PatchCount;

#[test]
fn test_tabulated_rates_return_midpoints() {
    let expected = [(12.0, 37.5), (25.0, 75.0), (50.0, 135.0), (75.0, 202.5), (100.0, 270.0)];
    for (rate, ome) in expected {
        assert_eq!(fentanyl_patch_to_ome(rate).unwrap(), ome, "rate {}", rate);
    }
}

#[test]
fn test_table_midpoints_match_ranges() {
    for entry in FENTANYL_PATCH_TABLE {
        assert!(entry.ome_low < entry.midpoint() && entry.midpoint() < entry.ome_high);
        assert_eq!(entry.breakthrough_low(), entry.ome_low / 6.0);
    }
}

#[test]
fn test_rate_between_rows() {
    let ome = fentanyl_patch_to_ome(37.0).unwrap();
    assert!(ome > 75.0 && ome < 135.0);

    let ome = fentanyl_patch_to_ome(6.0).unwrap();
    assert_eq!(ome, 18.75);
}

#[test]
fn test_reverse_of_every_standard_size() {
    for size in AVAILABLE_PATCH_SIZES {
        let ome = fentanyl_patch_to_ome(f64::from(size)).unwrap();
        assert_eq!(ome_to_target_rate(ome).unwrap(), size);
    }
    assert_eq!(ome_to_target_rate(0.0).unwrap(), 0);
    assert_eq!(ome_to_target_rate(-10.0).unwrap(), 0);
}

#[test]
fn test_every_standard_size_is_one_patch() {
    for size in AVAILABLE_PATCH_SIZES {
        let combination = combine_patch_sizes(size);
        assert_eq!(combination.patches, vec![PatchCount { mcg_per_hr: size, count: 1 }]);
        assert_eq!(combination.total_mcg_per_hr, size);
    }
}

#[test]
fn test_greedy_combinations() {
    // (target, expected total, patch count)
    let cases = [
        (37, 37, 2),
        (150, 150, 2),
        (200, 200, 2),
        (6, 12, 1),
        (5, 0, 0),
        (130, 125, 2),
        (68, 74, 3),
    ];

    for (target, total, count) in cases {
        let combination = combine_patch_sizes(target);
        assert_eq!(combination.total_mcg_per_hr, total, "target {}", target);
        assert_eq!(combination.patch_count(), count, "target {}", target);
    }
}

#[test]
fn test_regimen_patch_pipeline() {
    // 90 OME → 31 mcg/hr → 25 + 12
    let rate = ome_to_target_rate(90.0).unwrap();
    assert_eq!(rate, 31);

    let combination = combine_patch_sizes(rate);
    assert!(combination.includes_strength(25));
    assert!(combination.includes_strength(12));
    assert_eq!(combination.deviation_from(rate), 6);
}
