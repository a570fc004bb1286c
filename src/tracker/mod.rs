//! Per-callsign rolling histories and the processing pipeline for new reports
//!
//! Each callsign's history is owned by one `DashMap` entry. Processing a report
//! holds that entry for the duration of the update, so one callsign has a single
//! writer while other callsigns proceed in parallel. Reads hand out clones.

mod history;

pub use history::{Admission, SituationHistory};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::aircraft_performance::AircraftPerformance;
use crate::config::{SitusConfig, TrackerConfig};
use crate::elevation_plane::{ElevationPlane, ElevationProvenance};
use crate::geo::GeoPoint;
use crate::on_ground_guess::OnGroundGuess;
use crate::situation::interpolation::interpolated_elevation;
use crate::situation::{
    AircraftSituation, AltitudeCorrection, Callsign, GroundDetails, GroundState,
};
use crate::situation_change::SituationChange;
use crate::units::{Angle, Length, Velocity, in_feet};

/// Histories of all tracked callsigns
pub type SituationHistoriesMap = Arc<DashMap<Callsign, SituationHistory>>;

/// One position update as delivered by the network layer
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub callsign: Callsign,
    pub timestamp: DateTime<Utc>,
    pub time_offset_ms: i64,
    pub position: GeoPoint,
    pub altitude: Length,
    pub pressure_altitude: Option<Length>,
    pub pitch: Angle,
    pub bank: Angle,
    pub heading: Angle,
    pub ground_speed: Option<Velocity>,
    /// Ground flag sent with the position, if the protocol has one
    pub on_ground: Option<bool>,
    /// Elevation from the simulator at this position, if it was queried
    pub ground_elevation: Option<Length>,
}

impl PositionReport {
    /// Network time offset, `None` if out of range
    pub fn time_offset(&self) -> Option<Duration> {
        Duration::try_milliseconds(self.time_offset_ms)
    }

    /// Timestamp plus network time offset, `None` if out of range
    pub fn adjusted_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.checked_add_signed(self.time_offset()?)
    }

    /// Situation with the network ground flag and provider elevation attached.
    ///
    /// An invalid position yields a null situation, an unusable time offset is
    /// dropped.
    pub fn to_situation(&self) -> AircraftSituation {
        let mut situation = AircraftSituation::new(
            self.callsign.clone(),
            self.timestamp,
            Some(self.position),
            Some(self.altitude),
        )
        .with_attitude(self.pitch, self.bank, self.heading);
        if self.adjusted_timestamp().is_some() {
            situation.time_offset = self.time_offset().unwrap_or_else(Duration::zero);
        }
        situation.pressure_altitude = self.pressure_altitude;
        situation.ground_speed = self.ground_speed;

        if let Some(on_ground) = self.on_ground {
            situation.set_on_ground(GroundState::from(on_ground), GroundDetails::InFromNetwork);
        }
        let plane = situation.position.zip(self.ground_elevation).and_then(|(position, elevation)| {
            ElevationPlane::single_point(position, elevation, ElevationProvenance::FromProvider)
        });
        if let Some(plane) = plane {
            situation.set_ground_elevation_checked(&plane, ElevationProvenance::FromProvider, false);
        }
        situation
    }
}

/// Result of processing one report
#[derive(Debug, Clone)]
pub struct ProcessedSituation {
    /// The situation with corrected altitude, the history keeps the reported one
    pub situation: AircraftSituation,
    /// Altitude as reported, before correction
    pub reported_altitude: Option<Length>,
    pub correction: AltitudeCorrection,
    pub guess: Option<OnGroundGuess>,
    pub change: Option<SituationChange>,
    /// Scenery deviation (minus CG) taken off the altitude before correcting
    pub scenery_offset: Option<Length>,
    pub elevation_transferred: bool,
    /// The history was discarded because of a time jump
    pub history_reset: bool,
}

#[derive(Clone)]
pub struct SituationTracker {
    config: TrackerConfig,
    max_delta_elevation: Length,
    histories: SituationHistoriesMap,
}

impl SituationTracker {
    pub fn new(config: &SitusConfig) -> Self {
        Self {
            config: config.tracker.clone(),
            max_delta_elevation: config.interpolation.max_delta_elevation(),
            histories: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Process a new report for its callsign.
    ///
    /// Returns `None` if the report is not newer than the last one processed,
    /// has no valid position or a time offset out of range.
    pub fn process(
        &self,
        report: &PositionReport,
        performance: &AircraftPerformance,
    ) -> Option<ProcessedSituation> {
        let start = Instant::now();
        let callsign = report.callsign.clone();
        if report.adjusted_timestamp().is_none() {
            warn!(
                callsign = %callsign,
                "Ignoring report at {} with time offset {}ms out of range",
                report.timestamp,
                report.time_offset_ms
            );
            metrics::counter!("situs.situations.rejected_total", "reason" => "time_offset")
                .increment(1);
            return None;
        }
        let mut situation = report.to_situation();
        if situation.is_null() {
            warn!(
                callsign = %callsign,
                "Ignoring report at {} with invalid position {}, {}",
                report.timestamp,
                report.position.latitude,
                report.position.longitude
            );
            metrics::counter!("situs.situations.rejected_total", "reason" => "position")
                .increment(1);
            return None;
        }
        situation.cg = performance.cg;

        let mut history = self
            .histories
            .entry(callsign.clone())
            .or_insert_with(|| SituationHistory::new(self.config.history_size));

        let history_reset = match history.admission(&situation, self.config.time_jump()) {
            Admission::Accept => false,
            Admission::Stale => {
                debug!(
                    callsign = %callsign,
                    "Ignoring situation at {}, not newer than {}",
                    situation.adjusted_timestamp(),
                    history
                        .latest()
                        .map(|s| s.adjusted_timestamp().to_rfc3339())
                        .unwrap_or_default()
                );
                return None;
            }
            Admission::Reset => {
                info!(
                    callsign = %callsign,
                    "Time jump back to {}, resetting history of {} situations",
                    situation.adjusted_timestamp(),
                    history.len()
                );
                history.clear();
                true
            }
        };

        let elevation_transferred = match history.latest() {
            Some(latest) if !situation.has_ground_elevation() => {
                situation.transfer_ground_elevation_to_me(latest, self.config.transfer_radius())
            }
            _ => false,
        };
        if elevation_transferred {
            metrics::counter!("situs.elevation.transferred_total").increment(1);
            trace!(callsign = %callsign, "Elevation transferred from previous situation");
        }

        let reported_altitude = situation.altitude;
        let cg = situation.cg;
        let scenery_offset = if self.config.fix_scenery_offset && cg.is_some() {
            history.change().and_then(|c| c.scenery_deviation_cg)
        } else {
            None
        };
        let calc_std_deviations = self.config.calc_std_deviations;
        history.push_latest(situation);
        history.recompute_change(cg, performance.vtol, calc_std_deviations);

        let change = history.change().cloned();
        let guess = history
            .latest_mut()?
            .apply_on_ground_guess(change.as_ref(), performance);
        if let Some(guess) = &guess {
            metrics::counter!("situs.on_ground.guessed_total", "result" => guess.state().as_str())
                .increment(1);
            // The summary has to see the guessed state of the newest situation
            history.recompute_change(cg, performance.vtol, calc_std_deviations);
        }
        let change = history.change().cloned();

        // The history keeps reported altitudes, deviations are measured against them
        let mut corrected = history.latest()?.clone();
        if let Some(offset) = scenery_offset {
            corrected = corrected.with_altitude_offset(-offset);
            trace!(
                callsign = %callsign,
                "Scenery offset {:.1}ft taken off the altitude",
                in_feet(offset)
            );
        }
        let correction = corrected.correct_altitude(cg, self.config.drag_to_ground);
        metrics::counter!("situs.altitude.corrected_total", "kind" => correction.as_str())
            .increment(1);
        if correction.is_corrected() {
            trace!(callsign = %callsign, "Altitude corrected: {}", correction);
        }

        let processed = ProcessedSituation {
            situation: corrected,
            reported_altitude,
            correction,
            guess,
            change,
            scenery_offset,
            elevation_transferred,
            history_reset,
        };
        drop(history);

        metrics::counter!("situs.situations.processed_total").increment(1);
        metrics::gauge!("situs.tracker.callsigns").set(self.histories.len() as f64);
        metrics::histogram!("situs.tracker.process_latency_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        Some(processed)
    }

    /// Elevation for `query` interpolated between the situations around its time
    pub fn interpolated_elevation(
        &self,
        callsign: &Callsign,
        query: &AircraftSituation,
    ) -> Option<ElevationPlane> {
        let history = self.histories.get(callsign)?;
        let (older, newer) = history.bracketing(query.adjusted_timestamp())?;
        if !older.has_ground_elevation() || !newer.has_ground_elevation() {
            return None;
        }

        let plane = interpolated_elevation(Some(query), older, newer, None, self.max_delta_elevation);
        match &plane {
            Some(_) => metrics::counter!("situs.elevation.interpolated_total").increment(1),
            None => {
                metrics::counter!("situs.elevation.interpolation_rejected_total").increment(1);
                debug!(
                    callsign = %callsign,
                    "Elevation step too large to interpolate between {} and {}",
                    older.adjusted_timestamp(),
                    newer.adjusted_timestamp()
                );
            }
        }
        plane
    }

    /// Preset the elevation of `target` from the situations around its time
    /// and the latest change summary.
    pub fn preset_ground_elevation(&self, callsign: &Callsign, target: &mut AircraftSituation) -> bool {
        let Some(history) = self.histories.get(callsign) else {
            return false;
        };
        let Some((older, newer)) = history.bracketing(target.adjusted_timestamp()) else {
            return false;
        };
        let preset =
            target.preset_ground_elevation(older, newer, history.change(), self.max_delta_elevation);
        if preset {
            metrics::counter!(
                "situs.elevation.preset_total",
                "provenance" => target.ground_elevation_provenance().as_str()
            )
            .increment(1);
        }
        preset
    }

    /// Drop callsigns without updates since `cutoff` (wall clock), returns how many
    pub fn remove_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.histories.retain(|callsign, history| {
            if history.last_update_time() < cutoff {
                debug!(callsign = %callsign, "Removing idle history of {} situations", history.len());
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed > 0 {
            info!("Removed {} idle callsigns", removed);
            metrics::counter!("situs.tracker.idle_removed_total").increment(removed as u64);
        }
        metrics::gauge!("situs.tracker.callsigns").set(self.histories.len() as f64);
        removed
    }

    /// Copy of a callsign's situations, latest first
    pub fn snapshot(&self, callsign: &Callsign) -> Option<Vec<AircraftSituation>> {
        self.histories.get(callsign).map(|h| h.snapshot())
    }

    pub fn latest_situation(&self, callsign: &Callsign) -> Option<AircraftSituation> {
        self.histories.get(callsign)?.latest().cloned()
    }

    pub fn latest_change(&self, callsign: &Callsign) -> Option<SituationChange> {
        self.histories.get(callsign)?.change().cloned()
    }

    pub fn remove(&self, callsign: &Callsign) -> bool {
        let removed = self.histories.remove(callsign).is_some();
        metrics::gauge!("situs.tracker.callsigns").set(self.histories.len() as f64);
        removed
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    pub fn callsigns(&self) -> Vec<Callsign> {
        self.histories.iter().map(|e| e.key().clone()).collect()
    }
}
