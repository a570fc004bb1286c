use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

use crate::situation::AircraftSituation;
use crate::situation_change::SituationChange;
use crate::units::Length;

/// What to do with a new situation, compared to the newest one in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    /// Not newer than the newest situation (duplicate or late arrival)
    Stale,
    /// Behind the newest situation by more than a time jump: start over
    Reset,
}

/// Recent situations of one callsign, latest first, plus the change summary
/// computed over them.
#[derive(Debug, Clone)]
pub struct SituationHistory {
    situations: VecDeque<AircraftSituation>,
    capacity: usize,
    change: Option<SituationChange>,
    /// Wall clock time of last update, for expiring idle callsigns
    last_update_time: DateTime<Utc>,
}

impl SituationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            situations: VecDeque::with_capacity(capacity),
            capacity,
            change: None,
            last_update_time: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.situations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.situations.is_empty()
    }

    pub fn latest(&self) -> Option<&AircraftSituation> {
        self.situations.front()
    }

    pub fn latest_mut(&mut self) -> Option<&mut AircraftSituation> {
        self.situations.front_mut()
    }

    pub fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }

    pub fn change(&self) -> Option<&SituationChange> {
        self.change.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AircraftSituation> {
        self.situations.iter()
    }

    /// Copy of the situations, latest first
    pub fn snapshot(&self) -> Vec<AircraftSituation> {
        self.situations.iter().cloned().collect()
    }

    /// Compare `situation` with the newest situation by adjusted time.
    ///
    /// Samples may only move forward, late ones are dropped and the history is
    /// kept. Being behind by more than `time_jump` (or the sample's own time
    /// offset, if larger) means the stream restarted.
    pub fn admission(&self, situation: &AircraftSituation, time_jump: Duration) -> Admission {
        let Some(latest) = self.latest() else {
            return Admission::Accept;
        };
        let d = situation.adjusted_time_difference_ms(latest.adjusted_timestamp());
        let reset_after_ms = situation
            .time_offset_ms()
            .abs()
            .max(time_jump.num_milliseconds());
        if d > 0 {
            Admission::Accept
        } else if d < -reset_after_ms {
            Admission::Reset
        } else {
            Admission::Stale
        }
    }

    pub fn clear(&mut self) {
        self.situations.clear();
        self.change = None;
    }

    /// Add the newest situation, dropping the oldest beyond capacity
    pub fn push_latest(&mut self, situation: AircraftSituation) {
        self.last_update_time = Utc::now();
        self.situations.push_front(situation);
        self.situations.truncate(self.capacity);
    }

    /// Recompute the change summary over the whole history
    pub fn recompute_change(&mut self, cg: Option<Length>, vtol: bool, calc_std_deviations: bool) {
        let situations = self.situations.make_contiguous();
        self.change = SituationChange::new(situations, cg, vtol, true, calc_std_deviations);
    }

    /// The (older, newer) pair around `time` (adjusted).
    ///
    /// Beyond the newest situation the two newest ones are used.
    pub fn bracketing(&self, time: DateTime<Utc>) -> Option<(&AircraftSituation, &AircraftSituation)> {
        let newest = self.situations.front()?;
        if time >= newest.adjusted_timestamp() {
            return Some((self.situations.get(1)?, newest));
        }
        self.situations
            .iter()
            .zip(self.situations.iter().skip(1))
            .find(|(newer, older)| {
                older.adjusted_timestamp() <= time && time <= newer.adjusted_timestamp()
            })
            .map(|(newer, older)| (older, newer))
    }
}
