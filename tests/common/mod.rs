//! Builders shared by the integration tests
//!
//! Situations and reports default to a spot on the Munich runway at a fixed
//! base time, so a test only spells out what it is about.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};

use situs::aircraft_performance::AircraftPerformance;
use situs::elevation_plane::{ElevationPlane, ElevationProvenance};
use situs::geo::GeoPoint;
use situs::situation::{AircraftSituation, Callsign, GroundDetails, GroundState};
use situs::tracker::PositionReport;
use situs::units::{degrees, feet, knots, meters};

pub const BASE_LAT: f64 = 48.3538;
pub const BASE_LON: f64 = 11.7861;
pub const FIELD_ELEVATION_FT: f64 = 1487.0;

pub fn base_time() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_714_557_600, 0).unwrap()
}

pub fn a320() -> AircraftPerformance {
    AircraftPerformance {
        icao: "A320".to_string(),
        vtol: false,
        cg: Some(meters(2.7)),
        rotate_speed: Some(knots(140.0)),
    }
}

pub fn helicopter() -> AircraftPerformance {
    AircraftPerformance {
        icao: "EC35".to_string(),
        vtol: true,
        cg: Some(meters(1.4)),
        rotate_speed: None,
    }
}

pub struct SituationBuilder {
    situation: AircraftSituation,
    elevation_ft: Option<f64>,
    provenance: ElevationProvenance,
}

impl SituationBuilder {
    pub fn new(callsign: &str) -> Self {
        Self {
            situation: AircraftSituation::new(
                Callsign::new(callsign),
                base_time(),
                Some(GeoPoint::new(BASE_LAT, BASE_LON)),
                Some(feet(FIELD_ELEVATION_FT)),
            ),
            elevation_ft: None,
            provenance: ElevationProvenance::FromProvider,
        }
    }

    pub fn at_seconds(mut self, seconds: i64) -> Self {
        self.situation.timestamp = base_time() + Duration::seconds(seconds);
        self
    }

    pub fn offset_ms(mut self, ms: i64) -> Self {
        self.situation.time_offset = Duration::milliseconds(ms);
        self
    }

    pub fn position(mut self, lat: f64, lon: f64) -> Self {
        self.situation.position = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn altitude_ft(mut self, ft: f64) -> Self {
        self.situation.altitude = Some(feet(ft));
        self
    }

    /// Elevation plane at the situation's final position
    pub fn elevation_ft(mut self, ft: f64) -> Self {
        self.elevation_ft = Some(ft);
        self
    }

    pub fn provenance(mut self, provenance: ElevationProvenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn ground_speed_kts(mut self, kts: f64) -> Self {
        self.situation.ground_speed = Some(knots(kts));
        self
    }

    pub fn pitch_deg(mut self, deg: f64) -> Self {
        self.situation.set_pitch(degrees(deg));
        self
    }

    pub fn bank_deg(mut self, deg: f64) -> Self {
        self.situation.set_bank(degrees(deg));
        self
    }

    pub fn on_ground(mut self, state: GroundState, details: GroundDetails) -> Self {
        self.situation.set_on_ground(state, details);
        self
    }

    pub fn build(self) -> AircraftSituation {
        let mut situation = self.situation;
        if let (Some(ft), Some(position)) = (self.elevation_ft, situation.position) {
            situation.set_ground_elevation(ElevationPlane::single_point(
                position,
                feet(ft),
                self.provenance,
            ));
        }
        situation
    }
}

pub struct ReportBuilder {
    report: PositionReport,
}

impl ReportBuilder {
    pub fn new(callsign: &str, seconds: i64) -> Self {
        Self {
            report: PositionReport {
                callsign: Callsign::new(callsign),
                timestamp: base_time() + Duration::seconds(seconds),
                time_offset_ms: 0,
                position: GeoPoint::new(BASE_LAT, BASE_LON),
                altitude: feet(FIELD_ELEVATION_FT),
                pressure_altitude: None,
                pitch: degrees(0.0),
                bank: degrees(0.0),
                heading: degrees(263.0),
                ground_speed: None,
                on_ground: None,
                ground_elevation: None,
            },
        }
    }

    pub fn position(mut self, lat: f64, lon: f64) -> Self {
        self.report.position = GeoPoint::new(lat, lon);
        self
    }

    pub fn altitude_ft(mut self, ft: f64) -> Self {
        self.report.altitude = feet(ft);
        self
    }

    pub fn altitude_m_above(mut self, elevation_ft: f64, meters_above: f64) -> Self {
        self.report.altitude = feet(elevation_ft) + meters(meters_above);
        self
    }

    pub fn elevation_ft(mut self, ft: f64) -> Self {
        self.report.ground_elevation = Some(feet(ft));
        self
    }

    pub fn ground_speed_kts(mut self, kts: f64) -> Self {
        self.report.ground_speed = Some(knots(kts));
        self
    }

    pub fn pitch_deg(mut self, deg: f64) -> Self {
        self.report.pitch = degrees(deg);
        self
    }

    pub fn on_ground(mut self, on_ground: bool) -> Self {
        self.report.on_ground = Some(on_ground);
        self
    }

    pub fn build(self) -> PositionReport {
        self.report
    }
}

/// Latest-first window of situations `step` seconds apart, built by `f(index)`
/// where index 0 is the oldest.
pub fn window<F>(count: usize, step: i64, f: F) -> Vec<AircraftSituation>
where
    F: Fn(usize, SituationBuilder) -> SituationBuilder,
{
    (0..count)
        .rev()
        .map(|i| f(i, SituationBuilder::new("DLH4").at_seconds(i as i64 * step)).build())
        .collect()
}
