use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AircraftSituation;
use super::on_ground::{GroundDetails, GroundState, OnGroundInfo};

/// Default fraction of a report's time offset by which it may lag the situation
pub const DEFAULT_TIME_DEVIATION_FACTOR: f64 = 0.1;

/// A timestamped ground flag, sent separately from positions (aircraft parts)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundFlagReport {
    pub timestamp: DateTime<Utc>,
    pub time_offset_ms: i64,
    pub on_ground: bool,
}

impl GroundFlagReport {
    pub fn new(timestamp: DateTime<Utc>, time_offset_ms: i64, on_ground: bool) -> Self {
        Self {
            timestamp,
            time_offset_ms,
            on_ground,
        }
    }

    pub fn adjusted_timestamp(&self) -> DateTime<Utc> {
        self.timestamp + Duration::milliseconds(self.time_offset_ms)
    }
}

impl AircraftSituation {
    /// Signed difference (ms) between this situation's adjusted time and `other`
    pub fn adjusted_time_difference_ms(&self, other: DateTime<Utc>) -> i64 {
        (self.adjusted_timestamp() - other).num_milliseconds()
    }

    /// Can `report` be used for this situation, and how far off is it in time?
    fn ground_flag_report_difference(
        &self,
        report: &GroundFlagReport,
        time_deviation_factor: f64,
    ) -> Option<i64> {
        let d = self.adjusted_time_difference_ms(report.adjusted_timestamp());
        // Reports older than the situation, or slightly newer within the deviation range
        let usable = d >= 0 || (d.abs() as f64) < time_deviation_factor * report.time_offset_ms as f64;
        usable.then_some(d)
    }

    /// Take the ground flag from a parts report.
    ///
    /// A flag sent with the position itself is never overridden. Returns the
    /// signed adjusted time difference when the flag was taken.
    pub fn adjust_ground_flag(
        &mut self,
        report: &GroundFlagReport,
        always_set_details: bool,
        time_deviation_factor: f64,
    ) -> Option<i64> {
        if self.on_ground_info().details() == GroundDetails::InFromNetwork {
            return None;
        }
        if always_set_details {
            self.on_ground.set_details(GroundDetails::InFromParts);
        }
        let d = self.ground_flag_report_difference(report, time_deviation_factor)?;
        self.on_ground = OnGroundInfo::new(GroundState::from(report.on_ground), GroundDetails::InFromParts);
        Some(d)
    }

    /// Like [`Self::adjust_ground_flag`], using the report closest in time
    pub fn adjust_ground_flag_from_list(
        &mut self,
        reports: &[GroundFlagReport],
        always_set_details: bool,
        time_deviation_factor: f64,
    ) -> Option<i64> {
        if self.on_ground_info().details() == GroundDetails::InFromNetwork {
            return None;
        }
        if always_set_details {
            self.on_ground.set_details(GroundDetails::InFromParts);
        }

        let (best, d) = reports
            .iter()
            .filter_map(|r| {
                self.ground_flag_report_difference(r, time_deviation_factor)
                    .map(|d| (r, d))
            })
            .min_by_key(|(_, d)| d.abs())?;

        self.on_ground = OnGroundInfo::new(GroundState::from(best.on_ground), GroundDetails::InFromParts);
        Some(d)
    }
}
