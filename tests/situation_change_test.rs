mod common;

use common::{FIELD_ELEVATION_FT, window};
use situs::situation::{GroundDetails, GroundState};
use situs::situation_change::{SceneryDeviationHint, SituationChange};
use situs::units::{feet, in_feet, in_meters, meters};

const CG_M: f64 = 2.0;

fn change(situations: &[situs::situation::AircraftSituation]) -> SituationChange {
    SituationChange::new(situations, Some(meters(CG_M)), false, true, true)
        .expect("window has at least two situations")
}

#[test]
fn test_scenery_deviation_when_all_on_ground() {
    // Sender's scenery is 10ft above ours: a parked aircraft floats 10ft high
    let situations = window(4, 5, |_, b| {
        b.altitude_ft(FIELD_ELEVATION_FT + 10.0)
            .elevation_ft(FIELD_ELEVATION_FT)
            .ground_speed_kts(0.0)
            .on_ground(GroundState::OnGround, GroundDetails::InFromNetwork)
    });
    let change = change(&situations);

    assert!(change.const_on_ground);
    assert_eq!(change.scenery_deviation_hint, SceneryDeviationHint::AllOnGround);
    let deviation = change.scenery_deviation.unwrap();
    assert!((in_feet(deviation) - 10.0).abs() < 1e-6);
    let deviation_cg = change.scenery_deviation_cg.unwrap();
    assert!((in_meters(deviation_cg) - (in_meters(feet(10.0)) - CG_M)).abs() < 1e-6);
    assert!(change.has_elevation_dev_within_allowed_range());
}

#[test]
fn test_scenery_deviation_after_airborne_window() {
    // Newest sample not yet classified, the rest airborne at constant AGL
    let situations = window(4, 5, |i, b| {
        let b = b
            .altitude_ft(FIELD_ELEVATION_FT + 300.0)
            .elevation_ft(FIELD_ELEVATION_FT)
            .ground_speed_kts(140.0);
        if i == 3 {
            b
        } else {
            b.on_ground(GroundState::NotOnGround, GroundDetails::InFromNetwork)
        }
    });
    let change = change(&situations);

    assert!(!change.const_on_ground);
    assert!(change.was_not_on_ground);
    assert_eq!(change.scenery_deviation_hint, SceneryDeviationHint::WasOnGround);
    assert!((in_feet(change.scenery_deviation.unwrap()) - 300.0).abs() < 1e-6);
}

#[test]
fn test_scenery_deviation_small_agl_near_ground() {
    // 1ft above ground is within the 2m CG, altitude barely changes
    let situations = window(4, 5, |i, b| {
        let b = b
            .altitude_ft(FIELD_ELEVATION_FT + 1.0 + i as f64 * 0.1)
            .elevation_ft(FIELD_ELEVATION_FT)
            .ground_speed_kts(20.0);
        if i == 3 {
            b
        } else {
            b.on_ground(GroundState::OnGround, GroundDetails::InFromNetwork)
        }
    });
    let change = change(&situations);

    assert!(!change.const_on_ground);
    assert!(change.was_on_ground);
    assert!(change.max_ground_distance.unwrap() < meters(CG_M));
    assert_eq!(
        change.scenery_deviation_hint,
        SceneryDeviationHint::SmallAglDeviationNearGround
    );
    let deviation = in_feet(change.scenery_deviation.unwrap());
    assert!(deviation > 1.0 && deviation < 1.4);
}

#[test]
fn test_no_scenery_deviation_when_agl_varies() {
    let situations = window(5, 5, |i, b| {
        b.altitude_ft(FIELD_ELEVATION_FT + 500.0 * i as f64)
            .elevation_ft(FIELD_ELEVATION_FT)
            .on_ground(GroundState::OnGround, GroundDetails::InFromNetwork)
    });
    let change = change(&situations);

    assert!(change.const_ascending);
    assert!(!change.has_scenery_deviation());
    assert_eq!(change.scenery_deviation_hint, SceneryDeviationHint::NoDeviationInfo);
    assert!(change.scenery_deviation_cg.is_none());
}

#[test]
fn test_no_statistics_without_elevation() {
    let situations = window(3, 5, |i, b| b.altitude_ft(2000.0 + i as f64).ground_speed_kts(200.0));
    let change = change(&situations);

    assert!(change.altitude.is_some());
    assert!(change.elevation.is_none());
    assert!(change.ground_distance.is_none());
    assert!(change.min_ground_distance.is_none());
    assert!(!change.has_scenery_deviation());
    assert!(change.has_altitude_dev_within_allowed_range());
}

#[test]
fn test_statistics_skipped_when_disabled() {
    let situations = window(4, 5, |_, b| {
        b.elevation_ft(FIELD_ELEVATION_FT)
            .on_ground(GroundState::OnGround, GroundDetails::InFromNetwork)
    });
    let change = SituationChange::new(&situations, Some(meters(CG_M)), false, true, false).unwrap();

    assert!(change.const_on_ground);
    assert!(change.altitude.is_none());
    assert!(change.pitch.is_none());
    assert!(!change.has_scenery_deviation());
}

#[test]
fn test_display_mentions_scenery_deviation() {
    let situations = window(3, 5, |_, b| {
        b.altitude_ft(FIELD_ELEVATION_FT + 10.0)
            .elevation_ft(FIELD_ELEVATION_FT)
            .on_ground(GroundState::OnGround, GroundDetails::InFromNetwork)
    });
    let text = change(&situations).to_string();
    assert!(text.starts_with("DLH4 situations: 3"));
    assert!(text.contains("scenery delta: 10.0ft [complete og]"));
}
