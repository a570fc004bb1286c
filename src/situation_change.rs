//! Aggregate view over an aircraft's recent situations
//!
//! Built from a latest-first window of at least two situations of one callsign.
//! Carries motion predicates (ascending, on ground, take off, rotating up ...)
//! and, when requested, mean/standard deviation statistics plus a guessed
//! scenery deviation. Recomputed from scratch for every new window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::situation::{AircraftSituation, Callsign, GroundState, allowed_altitude_deviation};
use crate::stats::{mean_std_dev, min_max};
use crate::units::{
    Angle, Length, Velocity, degrees, feet, in_degrees, in_feet, in_knots, in_meters,
    in_meters_per_second, is_negative_speed, meters, meters_per_second,
};

/// Ground distance (and altitude) spread below which AGL is considered constant
fn max_scenery_deviation() -> Length {
    feet(2.0)
}

/// Which condition allowed guessing the scenery deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneryDeviationHint {
    #[default]
    NoDeviationInfo,
    AllOnGround,
    WasOnGround,
    SmallAglDeviationNearGround,
}

impl SceneryDeviationHint {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneryDeviationHint::NoDeviationInfo => "no info",
            SceneryDeviationHint::AllOnGround => "complete og",
            SceneryDeviationHint::WasOnGround => "was og",
            SceneryDeviationHint::SmallAglDeviationNearGround => "small AGL dev. near gnd.",
        }
    }
}

/// Mean and standard deviation of a quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread<Q> {
    pub mean: Q,
    pub std_dev: Q,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SituationChange {
    pub callsign: Callsign,
    pub situations_count: usize,
    pub latest_timestamp: DateTime<Utc>,
    pub latest_time_offset: Duration,
    pub oldest_timestamp: DateTime<Utc>,
    pub latest_adjusted_timestamp: DateTime<Utc>,
    pub oldest_adjusted_timestamp: DateTime<Utc>,

    pub const_ascending: bool,
    pub const_descending: bool,
    pub const_on_ground: bool,
    pub const_not_on_ground: bool,
    /// Window without its newest sample was on ground
    pub was_on_ground: bool,
    /// Window without its newest sample was not on ground
    pub was_not_on_ground: bool,
    pub just_takeoff: bool,
    pub just_touchdown: bool,
    pub const_accelerating: bool,
    pub const_decelerating: bool,
    pub rotating_up: bool,
    pub contains_push_back: bool,

    pub ground_speed: Option<Spread<Velocity>>,
    pub pitch: Option<Spread<Angle>>,
    pub altitude: Option<Spread<Length>>,
    pub elevation: Option<Spread<Length>>,
    /// Altitude minus elevation (CG not subtracted)
    pub ground_distance: Option<Spread<Length>>,
    pub min_ground_distance: Option<Length>,
    pub max_ground_distance: Option<Length>,

    pub scenery_deviation: Option<Length>,
    /// Scenery deviation minus CG
    pub scenery_deviation_cg: Option<Length>,
    pub scenery_deviation_hint: SceneryDeviationHint,
}

impl SituationChange {
    /// Summarize `situations`, `None` for fewer than two situations.
    ///
    /// Statistics (and the scenery deviation) are only computed when
    /// `calc_std_deviations` is set; rotating up then compares the newest pitch
    /// against mean plus standard deviation instead of the cheaper check.
    pub fn new(
        situations: &[AircraftSituation],
        cg: Option<Length>,
        vtol: bool,
        already_sorted_latest_first: bool,
        calc_std_deviations: bool,
    ) -> Option<Self> {
        if situations.len() < 2 {
            return None;
        }

        let mut sorted_storage;
        let sorted: &[AircraftSituation] = if already_sorted_latest_first {
            situations
        } else {
            sorted_storage = situations.to_vec();
            sort_adjusted_latest_first(&mut sorted_storage);
            &sorted_storage
        };

        let latest = sorted.first()?;
        let oldest = sorted.last()?;
        let without_front = &sorted[1..];
        let has_previous_window = sorted.len() >= 3;

        let mut change = Self {
            callsign: latest.callsign.clone(),
            situations_count: sorted.len(),
            latest_timestamp: latest.timestamp,
            latest_time_offset: latest.time_offset,
            oldest_timestamp: oldest.timestamp,
            latest_adjusted_timestamp: latest.adjusted_timestamp(),
            oldest_adjusted_timestamp: oldest.adjusted_timestamp(),
            const_ascending: is_const_ascending(sorted),
            const_descending: is_const_descending(sorted),
            const_on_ground: all_in_state(sorted, GroundState::OnGround),
            const_not_on_ground: all_in_state(sorted, GroundState::NotOnGround),
            was_on_ground: has_previous_window && all_in_state(without_front, GroundState::OnGround),
            was_not_on_ground: has_previous_window
                && all_in_state(without_front, GroundState::NotOnGround),
            just_takeoff: latest.on_ground_info().state() == GroundState::NotOnGround
                && all_in_state(without_front, GroundState::OnGround),
            just_touchdown: latest.on_ground_info().state() == GroundState::OnGround
                && all_in_state(without_front, GroundState::NotOnGround),
            const_accelerating: is_const_accelerating(sorted),
            const_decelerating: is_const_decelerating(sorted),
            rotating_up: false,
            contains_push_back: !vtol
                && sorted
                    .iter()
                    .any(|s| s.ground_speed.is_some_and(is_negative_speed)),
            ground_speed: None,
            pitch: None,
            altitude: None,
            elevation: None,
            ground_distance: None,
            min_ground_distance: None,
            max_ground_distance: None,
            scenery_deviation: None,
            scenery_deviation_cg: None,
            scenery_deviation_hint: SceneryDeviationHint::NoDeviationInfo,
        };

        if calc_std_deviations {
            change.calculate_std_deviations(sorted, cg);
            change.rotating_up = match change.pitch {
                Some(p) => in_degrees(latest.pitch()) > in_degrees(p.mean) + in_degrees(p.std_dev),
                None => false,
            };
        } else {
            change.rotating_up = is_rotating_up(sorted);
        }
        Some(change)
    }

    fn calculate_std_deviations(&mut self, situations: &[AircraftSituation], cg: Option<Length>) {
        let speeds: Option<Vec<f64>> = situations
            .iter()
            .map(|s| s.ground_speed.map(in_meters_per_second))
            .collect();
        self.ground_speed = speeds.as_deref().and_then(mean_std_dev).map(|s| Spread {
            mean: meters_per_second(s.mean),
            std_dev: meters_per_second(s.std_dev),
        });

        let pitches: Vec<f64> = situations.iter().map(|s| in_degrees(s.pitch())).collect();
        self.pitch = mean_std_dev(&pitches).map(|s| Spread {
            mean: degrees(s.mean),
            std_dev: degrees(s.std_dev),
        });

        let altitudes: Option<Vec<f64>> = situations
            .iter()
            .map(|s| s.altitude.map(in_meters))
            .collect();
        self.altitude = altitudes.as_deref().and_then(length_spread);

        let elevations: Option<Vec<f64>> = situations
            .iter()
            .map(|s| s.ground_elevation().map(|p| in_meters(p.elevation())))
            .collect();
        self.elevation = elevations.as_deref().and_then(length_spread);

        let (Some(altitudes), Some(elevations)) = (altitudes, elevations) else {
            return;
        };
        let distances: Vec<f64> = altitudes
            .iter()
            .zip(elevations.iter())
            .map(|(alt, elv)| alt - elv)
            .collect();
        self.ground_distance = length_spread(&distances);
        if let Some((min, max)) = min_max(&distances) {
            self.min_ground_distance = Some(meters(min));
            self.max_ground_distance = Some(meters(max));
        }
        self.guess_scenery_deviation(cg);
    }

    /// Guess the constant vertical offset between the sender's and our scenery.
    ///
    /// Only attempted when the ground distance barely changes over the window.
    fn guess_scenery_deviation(&mut self, cg: Option<Length>) {
        self.scenery_deviation = None;
        self.scenery_deviation_cg = None;
        self.scenery_deviation_hint = SceneryDeviationHint::NoDeviationInfo;

        let Some(ground_distance) = self.ground_distance else {
            return;
        };
        if ground_distance.std_dev > max_scenery_deviation() {
            return;
        }

        let hint = if self.const_on_ground {
            SceneryDeviationHint::AllOnGround
        } else if self.was_not_on_ground {
            SceneryDeviationHint::WasOnGround
        } else if self
            .altitude
            .is_some_and(|alt| alt.std_dev <= max_scenery_deviation())
            && matches!((self.max_ground_distance, cg), (Some(max), Some(cg)) if max < cg)
            && self.was_on_ground
        {
            SceneryDeviationHint::SmallAglDeviationNearGround
        } else {
            return;
        };
        self.set_scenery_deviation(ground_distance.mean, cg, hint);
    }

    fn set_scenery_deviation(&mut self, deviation: Length, cg: Option<Length>, hint: SceneryDeviationHint) {
        self.scenery_deviation = Some(deviation);
        self.scenery_deviation_cg = cg.map(|cg| deviation - cg);
        self.scenery_deviation_hint = hint;
    }

    pub fn has_scenery_deviation(&self) -> bool {
        self.scenery_deviation.is_some()
    }

    pub fn has_elevation_dev_within_allowed_range(&self) -> bool {
        self.elevation
            .is_some_and(|e| e.std_dev < allowed_altitude_deviation())
    }

    pub fn has_altitude_dev_within_allowed_range(&self) -> bool {
        self.altitude
            .is_some_and(|a| a.std_dev < allowed_altitude_deviation())
    }

    /// Time covered by the window (adjusted timestamps)
    pub fn time_span(&self) -> Duration {
        self.latest_adjusted_timestamp - self.oldest_adjusted_timestamp
    }
}

impl fmt::Display for SituationChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        write!(
            f,
            "{} situations: {} | span {}ms | takeoff: {} touchdown: {} | all gnd: {}/{} | all not gnd: {}/{} \
             | ascending: {} descending: {} | accelerating: {} decelerating: {} | rotate up: {} | push back: {}",
            self.callsign,
            self.situations_count,
            self.time_span().num_milliseconds(),
            yes_no(self.just_takeoff),
            yes_no(self.just_touchdown),
            yes_no(self.const_on_ground),
            yes_no(self.was_on_ground),
            yes_no(self.const_not_on_ground),
            yes_no(self.was_not_on_ground),
            yes_no(self.const_ascending),
            yes_no(self.const_descending),
            yes_no(self.const_accelerating),
            yes_no(self.const_decelerating),
            yes_no(self.rotating_up),
            yes_no(self.contains_push_back),
        )?;
        if let Some(deviation) = self.scenery_deviation {
            write!(
                f,
                " | scenery delta: {:.1}ft [{}]",
                in_feet(deviation),
                self.scenery_deviation_hint.as_str()
            )?;
        }
        if let Some(gnd) = self.ground_distance {
            write!(f, " | AGL: {:.1}/{:.1}ft", in_feet(gnd.mean), in_feet(gnd.std_dev))?;
        }
        if let Some(pitch) = self.pitch {
            write!(f, " | pitch: {:.1}/{:.1}", in_degrees(pitch.mean), in_degrees(pitch.std_dev))?;
        }
        if let Some(gs) = self.ground_speed {
            write!(f, " | gs: {:.1}/{:.1}kts", in_knots(gs.mean), in_knots(gs.std_dev))?;
        }
        Ok(())
    }
}

/// Sort by adjusted timestamp, newest first
pub fn sort_adjusted_latest_first(situations: &mut [AircraftSituation]) {
    situations.sort_by(|a, b| b.adjusted_timestamp().cmp(&a.adjusted_timestamp()));
}

pub fn is_sorted_adjusted_latest_first(situations: &[AircraftSituation]) -> bool {
    situations
        .windows(2)
        .all(|w| w[0].adjusted_timestamp() >= w[1].adjusted_timestamp())
}

fn length_spread(values: &[f64]) -> Option<Spread<Length>> {
    mean_std_dev(values).map(|s| Spread {
        mean: meters(s.mean),
        std_dev: meters(s.std_dev),
    })
}

fn all_in_state(situations: &[AircraftSituation], state: GroundState) -> bool {
    !situations.is_empty() && situations.iter().all(|s| s.on_ground_info().state() == state)
}

/// `newer_above` holds for every (newer, older) pair of a latest-first window
fn pairwise<T: PartialOrd>(
    situations: &[AircraftSituation],
    value: impl Fn(&AircraftSituation) -> Option<T>,
    newer_above: bool,
) -> bool {
    situations.len() >= 2
        && situations.windows(2).all(|w| match (value(&w[0]), value(&w[1])) {
            (Some(newer), Some(older)) if newer_above => newer > older,
            (Some(newer), Some(older)) => newer < older,
            _ => false,
        })
}

fn is_const_ascending(situations: &[AircraftSituation]) -> bool {
    pairwise(situations, |s| s.altitude, true)
}

fn is_const_descending(situations: &[AircraftSituation]) -> bool {
    pairwise(situations, |s| s.altitude, false)
}

fn is_const_accelerating(situations: &[AircraftSituation]) -> bool {
    pairwise(situations, |s| s.ground_speed, true)
}

fn is_const_decelerating(situations: &[AircraftSituation]) -> bool {
    pairwise(situations, |s| s.ground_speed, false)
}

/// Newest pitch above every older pitch in the window
fn is_rotating_up(situations: &[AircraftSituation]) -> bool {
    let Some((newest, older)) = situations.split_first() else {
        return false;
    };
    !older.is_empty() && older.iter().all(|s| newest.pitch() > s.pitch())
}
