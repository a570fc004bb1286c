//! A single timestamped kinematic sample of a remote aircraft
//!
//! Position, altitude, attitude, speed, ground contact and the ground elevation
//! attached to it. Correction, interpolation and ground flag handling live in the
//! submodules as further `impl AircraftSituation` blocks.

pub mod altitude;
pub mod ground_flag;
pub mod interpolation;
pub mod on_ground;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::elevation_plane::{ElevationPlane, ElevationProvenance, is_better_provenance};
use crate::geo::GeoPoint;
use crate::units::{
    Angle, Length, Velocity, degrees, feet, finite_length, in_degrees, in_feet, in_knots,
    in_meters_per_second, km_per_hour, knots, meters, normalized_degrees,
};

pub use altitude::{AltitudeCorrection, CorrectedAltitude};
pub use on_ground::{GroundDetails, GroundState, OnGroundInfo};

/// Aircraft callsign, stored trimmed and upper case
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Callsign(String);

impl Callsign {
    pub fn new(callsign: impl AsRef<str>) -> Self {
        Self(callsign.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference datum of the altitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeDatum {
    #[default]
    MeanSeaLevel,
    AboveGround,
}

/// Velocity vector in m/s (east, north, up)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityVector {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

/// CG used when the aircraft type does not provide one
pub fn default_cg() -> Length {
    meters(2.5)
}

/// Tolerated deviation when comparing altitudes
pub fn allowed_altitude_deviation() -> Length {
    feet(3.0)
}

/// Ground speed at or above which an aircraft counts as moving
fn moving_speed() -> Velocity {
    km_per_hour(2.5)
}

/// Above this ground speed near ground interpolation is pointless
fn skip_near_ground_speed() -> Velocity {
    knots(225.0)
}

/// Above this height near ground interpolation is pointless
fn skip_near_ground_height() -> Length {
    meters(400.0)
}

static NULL_SITUATION: Lazy<AircraftSituation> =
    Lazy::new(|| AircraftSituation::new(Callsign::default(), DateTime::<Utc>::default(), None, None));

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSituation {
    pub callsign: Callsign,
    /// When the sample was taken (sender time)
    pub timestamp: DateTime<Utc>,
    /// Network time offset, added to the timestamp to get the adjusted time
    pub time_offset: Duration,
    pub position: Option<GeoPoint>,
    pub altitude: Option<Length>,
    pub datum: AltitudeDatum,
    pub pressure_altitude: Option<Length>,
    pub ground_speed: Option<Velocity>,
    pub velocity: Option<VelocityVector>,
    pub cg: Option<Length>,
    pitch: Angle,
    bank: Angle,
    heading: Angle,
    on_ground: OnGroundInfo,
    ground_elevation: Option<ElevationPlane>,
}

impl AircraftSituation {
    /// An invalid (out of range or NaN) position makes the situation null
    pub fn new(
        callsign: Callsign,
        timestamp: DateTime<Utc>,
        position: Option<GeoPoint>,
        altitude: Option<Length>,
    ) -> Self {
        Self {
            callsign,
            timestamp,
            time_offset: Duration::zero(),
            position: position.filter(GeoPoint::is_valid),
            altitude: altitude.and_then(finite_length),
            datum: AltitudeDatum::MeanSeaLevel,
            pressure_altitude: None,
            ground_speed: None,
            velocity: None,
            cg: None,
            pitch: degrees(0.0),
            bank: degrees(0.0),
            heading: degrees(0.0),
            on_ground: OnGroundInfo::default(),
            ground_elevation: None,
        }
    }

    /// Shared empty situation
    pub fn null() -> &'static AircraftSituation {
        &NULL_SITUATION
    }

    /// A situation without position is "null"
    pub fn is_null(&self) -> bool {
        self.position.is_none()
    }

    /// Timestamp plus network time offset, `None` if out of the representable range
    pub fn checked_adjusted_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.checked_add_signed(self.time_offset)
    }

    /// Timestamp plus network time offset. An offset out of range is ignored.
    pub fn adjusted_timestamp(&self) -> DateTime<Utc> {
        self.checked_adjusted_timestamp().unwrap_or(self.timestamp)
    }

    pub fn adjusted_timestamp_ms(&self) -> i64 {
        self.adjusted_timestamp().timestamp_millis()
    }

    pub fn time_offset_ms(&self) -> i64 {
        self.time_offset.num_milliseconds()
    }

    pub fn distance_to(&self, other: &AircraftSituation) -> Option<Length> {
        Some(self.position?.distance_to(&other.position?))
    }

    pub fn equal_normal_vector(&self, other: &AircraftSituation) -> bool {
        match (&self.position, &other.position) {
            (Some(a), Some(b)) => a.equal_normal_vector(b),
            _ => false,
        }
    }

    // Attitude, always normalized to (-180, 180]

    pub fn pitch(&self) -> Angle {
        self.pitch
    }

    pub fn bank(&self) -> Angle {
        self.bank
    }

    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn set_pitch(&mut self, pitch: Angle) {
        self.pitch = normalized_degrees(pitch);
    }

    pub fn set_bank(&mut self, bank: Angle) {
        self.bank = normalized_degrees(bank);
    }

    pub fn set_heading(&mut self, heading: Angle) {
        self.heading = normalized_degrees(heading);
    }

    pub fn with_attitude(mut self, pitch: Angle, bank: Angle, heading: Angle) -> Self {
        self.set_pitch(pitch);
        self.set_bank(bank);
        self.set_heading(heading);
        self
    }

    pub fn set_zero_pbh(&mut self) {
        self.pitch = degrees(0.0);
        self.bank = degrees(0.0);
        self.heading = degrees(0.0);
    }

    pub fn equal_pbh(&self, other: &AircraftSituation) -> bool {
        self.pitch == other.pitch && self.bank == other.bank && self.heading == other.heading
    }

    pub fn equal_pbh_and_vector(&self, other: &AircraftSituation) -> bool {
        self.equal_normal_vector(other) && self.equal_pbh(other)
    }

    // Speed

    /// Ground speed of at least 2.5 km/h. Negative (push back) speed does not count.
    pub fn is_moving(&self) -> bool {
        self.ground_speed.is_some_and(|gs| gs >= moving_speed())
    }

    /// Distance covered in `time` at the current ground speed
    pub fn distance_per_time(&self, time: Duration) -> Option<Length> {
        let gs = in_meters_per_second(self.ground_speed?);
        let seconds = time.num_milliseconds() as f64 / 1000.0;
        finite_length(meters(gs * seconds))
    }

    // Altitude

    pub fn with_altitude_offset(mut self, offset: Length) -> Self {
        self.add_altitude_offset(offset);
        self
    }

    /// Add an offset to the altitude, returns the new altitude
    pub fn add_altitude_offset(&mut self, offset: Length) -> Option<Length> {
        if let Some(altitude) = self.altitude {
            self.altitude = finite_length(altitude + offset).or(Some(altitude));
        }
        self.altitude
    }

    /// CG of this situation, or `fallback`
    pub fn cg_or(&self, fallback: Option<Length>) -> Option<Length> {
        self.cg.or(fallback)
    }

    /// Altitude above the attached ground elevation
    pub fn height_above_ground(&self) -> Option<Length> {
        let altitude = self.altitude?;
        if self.datum == AltitudeDatum::AboveGround {
            return Some(altitude);
        }
        finite_length(altitude - self.ground_elevation?.elevation())
    }

    /// Distance between CG and ground, unknown without CG or elevation
    pub fn ground_distance(&self, cg: Option<Length>) -> Option<Length> {
        let cg = cg?;
        let ground_plus_cg = self.ground_elevation?.elevation() + cg;
        finite_length(self.altitude? - ground_plus_cg)
    }

    /// Fast or high enough that ground handling can be skipped
    pub fn can_likely_skip_near_ground_interpolation(&self) -> bool {
        if self.is_null() {
            return true;
        }
        if self.is_on_ground() && self.has_inbound_ground_details() {
            return false;
        }
        if self
            .ground_speed
            .is_some_and(|gs| gs > skip_near_ground_speed())
        {
            return true;
        }
        self.height_above_ground()
            .is_some_and(|h| h >= skip_near_ground_height())
    }

    // Ground contact

    pub fn on_ground_info(&self) -> &OnGroundInfo {
        &self.on_ground
    }

    pub fn set_on_ground_info(&mut self, info: OnGroundInfo) {
        self.on_ground = info;
    }

    pub fn set_on_ground(&mut self, state: GroundState, details: GroundDetails) {
        self.on_ground.set_state(state, details);
    }

    pub fn set_on_ground_factor(&mut self, factor: f64) {
        self.on_ground.set_factor(factor);
    }

    /// Derive the tri-state from the (interpolated) ground factor
    pub fn set_on_ground_from_ground_factor(&mut self, threshold: f64) -> bool {
        self.on_ground = OnGroundInfo::from_ground_factor(self.on_ground.factor(), threshold);
        self.on_ground.state() != GroundState::Unknown
    }

    /// Set ground contact from elevation and CG, false if that is not possible
    pub fn set_on_ground_by_underflow_detection(&mut self, cg: Option<Length>) -> bool {
        let info = OnGroundInfo::from_ground_distance(cg, self.ground_distance(cg));
        if info.state() == GroundState::Unknown {
            return false;
        }
        self.on_ground = info;
        true
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground.is_on_ground()
    }

    /// Ground flag came from network data (position or parts)
    pub fn has_inbound_ground_details(&self) -> bool {
        self.on_ground.details().is_inbound()
    }

    pub fn should_guess_on_ground(&self) -> bool {
        !self.has_inbound_ground_details()
    }

    // Ground elevation

    pub fn ground_elevation(&self) -> Option<&ElevationPlane> {
        self.ground_elevation.as_ref()
    }

    pub fn has_ground_elevation(&self) -> bool {
        self.ground_elevation.is_some()
    }

    pub fn ground_elevation_provenance(&self) -> ElevationProvenance {
        self.ground_elevation
            .map_or(ElevationProvenance::NoElevation, |p| p.provenance())
    }

    fn ground_elevation_transferred(&self) -> bool {
        self.ground_elevation.is_some_and(|p| p.is_transferred())
    }

    /// Set the elevation unconditionally
    pub fn set_ground_elevation(&mut self, plane: Option<ElevationPlane>) {
        self.ground_elevation = plane;
    }

    pub fn reset_ground_elevation(&mut self) {
        self.ground_elevation = None;
    }

    /// Would `provenance`/`transferred` be better than the current elevation?
    pub fn is_other_elevation_better(
        &self,
        provenance: ElevationProvenance,
        transferred: bool,
    ) -> bool {
        is_better_provenance(
            self.ground_elevation_provenance(),
            self.ground_elevation_transferred(),
            provenance,
            transferred,
        )
    }

    /// Set the elevation if it covers this position and is better than the current one.
    ///
    /// On success the radius is tightened to the actual distance (but never below
    /// the minimum radius).
    pub fn set_ground_elevation_checked(
        &mut self,
        plane: &ElevationPlane,
        provenance: ElevationProvenance,
        transferred: bool,
    ) -> bool {
        let Some(position) = self.position else {
            return false;
        };
        let distance = plane.distance_to(&position);
        // Also rejects a NaN distance
        if !(distance <= plane.radius_or_minimum()) {
            return false;
        }
        if self.has_ground_elevation() && !self.is_other_elevation_better(provenance, transferred) {
            return false;
        }
        let mut plane = plane.with_provenance(provenance, transferred);
        plane.set_radius_or_minimum(distance);
        self.ground_elevation = Some(plane);
        true
    }

    /// Can this situation's elevation be reused for `target`?
    pub fn can_transfer_ground_elevation(&self, target: &AircraftSituation, radius: Length) -> bool {
        let (Some(plane), Some(position)) = (self.ground_elevation.as_ref(), target.position.as_ref())
        else {
            return false;
        };
        plane.can_transfer_to(position, target.ground_elevation_provenance(), radius)
    }

    /// Copy this situation's elevation to `target`, marked as transferred
    pub fn transfer_ground_elevation_from_me(
        &self,
        target: &mut AircraftSituation,
        radius: Length,
    ) -> bool {
        if !self.can_transfer_ground_elevation(target, radius) {
            return false;
        }
        let Some(plane) = self.ground_elevation else {
            return false;
        };
        target.ground_elevation = Some(plane.with_provenance(plane.provenance(), true));
        true
    }

    /// Take the elevation of `source`, marked as transferred
    pub fn transfer_ground_elevation_to_me(
        &mut self,
        source: &AircraftSituation,
        radius: Length,
    ) -> bool {
        source.transfer_ground_elevation_from_me(self, radius)
    }
}

impl fmt::Display for AircraftSituation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.callsign, self.adjusted_timestamp().format("%H:%M:%S%.3f"))?;
        match self.position {
            Some(p) => write!(f, " ({:.6}, {:.6})", p.latitude, p.longitude)?,
            None => f.write_str(" (no position)")?,
        }
        if let Some(altitude) = self.altitude {
            write!(f, " alt {:.1}ft", in_feet(altitude))?;
        }
        if let Some(gs) = self.ground_speed {
            write!(f, " gs {:.1}kts", in_knots(gs))?;
        }
        write!(
            f,
            " pbh {:.1}/{:.1}/{:.1} {}",
            in_degrees(self.pitch),
            in_degrees(self.bank),
            in_degrees(self.heading),
            self.on_ground
        )?;
        if let Some(plane) = &self.ground_elevation {
            write!(f, " elv {}", plane)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation_plane::minimum_radius;
    use crate::units::in_meters;

    fn situation_at(lat: f64, lon: f64, altitude_ft: f64) -> AircraftSituation {
        AircraftSituation::new(
            Callsign::new("DLH123"),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            Some(GeoPoint::new(lat, lon)),
            Some(feet(altitude_ft)),
        )
    }

    fn plane_at(lat: f64, lon: f64, elevation_ft: f64, provenance: ElevationProvenance) -> ElevationPlane {
        ElevationPlane::new(GeoPoint::new(lat, lon), feet(elevation_ft), meters(100.0), provenance)
            .unwrap()
    }

    #[test]
    fn test_null_situation() {
        assert!(AircraftSituation::null().is_null());
        assert!(!situation_at(48.0, 11.0, 1000.0).is_null());
    }

    #[test]
    fn test_callsign_normalized() {
        assert_eq!(Callsign::new("  dlh123 ").as_str(), "DLH123");
    }

    #[test]
    fn test_attitude_is_normalized() {
        let s = situation_at(48.0, 11.0, 1000.0).with_attitude(degrees(370.0), degrees(-200.0), degrees(270.0));
        assert!((in_degrees(s.pitch()) - 10.0).abs() < 1e-9);
        assert!((in_degrees(s.bank()) - 160.0).abs() < 1e-9);
        assert!((in_degrees(s.heading()) - (-90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_is_moving() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        assert!(!s.is_moving());
        s.ground_speed = Some(km_per_hour(2.5));
        assert!(s.is_moving());
        s.ground_speed = Some(knots(-3.0));
        assert!(!s.is_moving());
    }

    #[test]
    fn test_checked_elevation_tightens_radius() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        // ~11m north of the situation
        let plane = plane_at(48.0001, 11.0, 500.0, ElevationProvenance::FromProvider);
        assert!(s.set_ground_elevation_checked(&plane, ElevationProvenance::FromProvider, false));
        let radius = s.ground_elevation().unwrap().radius();
        assert!(in_meters(radius) > 10.0 && in_meters(radius) < 12.0);
    }

    #[test]
    fn test_checked_elevation_rejects_far_plane() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        // ~1.1km away, outside the 100m radius
        let plane = plane_at(48.01, 11.0, 500.0, ElevationProvenance::FromProvider);
        assert!(!s.set_ground_elevation_checked(&plane, ElevationProvenance::FromProvider, false));
        assert!(!s.has_ground_elevation());
    }

    #[test]
    fn test_cache_does_not_overwrite_provider() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        let provider = plane_at(48.0, 11.0, 500.0, ElevationProvenance::FromProvider);
        let cached = plane_at(48.0, 11.0, 520.0, ElevationProvenance::FromCache);
        assert!(s.set_ground_elevation_checked(&provider, ElevationProvenance::FromProvider, false));
        assert!(!s.set_ground_elevation_checked(&cached, ElevationProvenance::FromCache, false));
        assert_eq!(s.ground_elevation_provenance(), ElevationProvenance::FromProvider);
        assert_eq!(s.ground_elevation().unwrap().radius(), minimum_radius());
    }

    #[test]
    fn test_transfer_ground_elevation() {
        let mut source = situation_at(48.0, 11.0, 1000.0);
        source.set_ground_elevation(Some(plane_at(48.0, 11.0, 500.0, ElevationProvenance::FromProvider)));
        let mut target = situation_at(48.0002, 11.0, 1000.0);

        assert!(target.transfer_ground_elevation_to_me(&source, meters(100.0)));
        let plane = target.ground_elevation().unwrap();
        assert!(plane.is_transferred());
        assert_eq!(plane.provenance(), ElevationProvenance::FromProvider);

        // The target now holds a provider value, nothing is transferred onto it
        assert!(!source.can_transfer_ground_elevation(&target, meters(100.0)));
    }

    #[test]
    fn test_ground_distance_and_height() {
        let mut s = situation_at(48.0, 11.0, 1010.0);
        assert!(s.ground_distance(Some(default_cg())).is_none());
        s.set_ground_elevation(Some(plane_at(48.0, 11.0, 1000.0, ElevationProvenance::FromProvider)));
        let height = s.height_above_ground().unwrap();
        assert!((in_feet(height) - 10.0).abs() < 1e-6);
        assert!(s.ground_distance(None).is_none());
        let distance = s.ground_distance(Some(feet(4.0))).unwrap();
        assert!((in_feet(distance) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_can_skip_near_ground_interpolation() {
        let mut s = situation_at(48.0, 11.0, 5000.0);
        s.set_ground_elevation(Some(plane_at(48.0, 11.0, 500.0, ElevationProvenance::FromProvider)));
        assert!(s.can_likely_skip_near_ground_interpolation());

        s.set_on_ground(GroundState::OnGround, GroundDetails::InFromNetwork);
        assert!(!s.can_likely_skip_near_ground_interpolation());

        let mut low = situation_at(48.0, 11.0, 510.0);
        low.set_ground_elevation(Some(plane_at(48.0, 11.0, 500.0, ElevationProvenance::FromProvider)));
        assert!(!low.can_likely_skip_near_ground_interpolation());
        low.ground_speed = Some(knots(250.0));
        assert!(low.can_likely_skip_near_ground_interpolation());
    }

    #[test]
    fn test_distance_per_time() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        s.ground_speed = Some(crate::units::meters_per_second(10.0));
        let d = s.distance_per_time(Duration::seconds(3)).unwrap();
        assert!((in_meters(d) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_position_makes_null_situation() {
        let s = situation_at(f64::NAN, 11.0, 1000.0);
        assert!(s.is_null());
        assert!(situation_at(48.0, 200.0, 1000.0).is_null());

        let mut s = situation_at(48.0, 11.0, 1000.0);
        let nan_plane = plane_at(f64::NAN, 11.0, 500.0, ElevationProvenance::FromProvider);
        assert!(!s.set_ground_elevation_checked(&nan_plane, ElevationProvenance::FromProvider, false));
        assert!(!s.has_ground_elevation());
    }

    #[test]
    fn test_adjusted_timestamp_out_of_range() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        s.time_offset = Duration::milliseconds(5000);
        assert_eq!(s.adjusted_timestamp(), s.timestamp + Duration::seconds(5));

        s.time_offset = Duration::MAX;
        assert!(s.checked_adjusted_timestamp().is_none());
        assert_eq!(s.adjusted_timestamp(), s.timestamp);
    }

    #[test]
    fn test_pbh_helpers() {
        let a = situation_at(48.0, 11.0, 1000.0).with_attitude(degrees(5.0), degrees(10.0), degrees(90.0));
        let mut b = a.clone();
        assert!(a.equal_pbh_and_vector(&b));

        b.position = Some(GeoPoint::new(48.001, 11.0));
        assert!(a.equal_pbh(&b));
        assert!(!a.equal_pbh_and_vector(&b));

        b.set_zero_pbh();
        assert_eq!(in_degrees(b.pitch()), 0.0);
        assert_eq!(in_degrees(b.bank()), 0.0);
        assert_eq!(in_degrees(b.heading()), 0.0);
        assert!(!a.equal_pbh(&b));
    }

    #[test]
    fn test_altitude_offset_and_cg_fallback() {
        let s = situation_at(48.0, 11.0, 1000.0).with_altitude_offset(feet(-12.0));
        assert!((in_feet(s.altitude.unwrap()) - 988.0).abs() < 1e-9);

        let mut no_altitude = situation_at(48.0, 11.0, 1000.0);
        no_altitude.altitude = None;
        assert!(no_altitude.with_altitude_offset(feet(10.0)).altitude.is_none());

        let mut s = situation_at(48.0, 11.0, 1000.0);
        assert_eq!(s.cg_or(Some(default_cg())), Some(default_cg()));
        assert_eq!(s.cg_or(None), None);
        s.cg = Some(meters(1.5));
        assert_eq!(s.cg_or(Some(default_cg())), Some(meters(1.5)));
    }

    #[test]
    fn test_on_ground_from_ground_factor() {
        let mut s = situation_at(48.0, 11.0, 1000.0);
        s.set_on_ground_factor(0.7);
        assert!(s.set_on_ground_from_ground_factor(0.5));
        assert!(s.is_on_ground());
        assert_eq!(s.on_ground_info().details(), GroundDetails::ByInterpolation);
        assert!((s.on_ground_info().factor() - 0.7).abs() < 1e-9);

        s.set_on_ground_factor(0.2);
        assert!(s.set_on_ground_from_ground_factor(0.5));
        assert_eq!(s.on_ground_info().state(), GroundState::NotOnGround);

        s.set_on_ground(GroundState::Unknown, GroundDetails::NotSet);
        assert!(!s.set_on_ground_from_ground_factor(0.5));
    }

    #[test]
    fn test_on_ground_by_underflow_detection() {
        let mut s = situation_at(48.0, 11.0, 995.0);
        // No elevation yet
        assert!(!s.set_on_ground_by_underflow_detection(Some(default_cg())));
        assert_eq!(s.on_ground_info().state(), GroundState::Unknown);

        s.set_ground_elevation(Some(plane_at(48.0, 11.0, 1000.0, ElevationProvenance::FromProvider)));
        assert!(s.set_on_ground_by_underflow_detection(Some(default_cg())));
        assert!(s.is_on_ground());
        assert_eq!(s.on_ground_info().details(), GroundDetails::ByElevationAndCG);

        s.altitude = Some(feet(1500.0));
        assert!(s.set_on_ground_by_underflow_detection(Some(default_cg())));
        assert_eq!(s.on_ground_info().state(), GroundState::NotOnGround);
    }
}
