//! Best-effort ground contact for situations without a ground flag
//!
//! A chain of rules, first match wins. Direct elevation evidence beats
//! sustained ground contact in the history, which beats the climb trend, which
//! beats the plain speed threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::aircraft_performance::AircraftPerformance;
use crate::situation::{AircraftSituation, GroundDetails, GroundState, OnGroundInfo, default_cg};
use crate::situation_change::SituationChange;
use crate::units::{Length, Velocity, in_degrees, is_negative_speed, knots};

/// Pitch beyond this (degrees) is never on ground. Tail draggers sit at ~11°.
const MAX_GROUND_PITCH_DEG: f64 = 20.0;
const MAX_GROUND_BANK_DEG: f64 = 10.0;

/// Applied to the guessed rotation speed to get a speed that is surely airborne
const SURE_ROTATE_FACTOR: f64 = 1.25;

fn default_sure_rotate_speed() -> Velocity {
    knots(130.0)
}

/// Which rule decided the guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessReason {
    PushBack,
    NotMoving,
    MaxPitch,
    MaxBank,
    AboveRotateSpeed,
    ElevationOnGround,
    RotatingUp,
    WaitingForRotateUp,
    ConstAscending,
    VtolUnknown,
    BelowRotateSpeed,
    FallThrough,
}

impl GuessReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GuessReason::PushBack => "push back",
            GuessReason::NotMoving => "not moving",
            GuessReason::MaxPitch => "max. pitch",
            GuessReason::MaxBank => "max. bank",
            GuessReason::AboveRotateSpeed => "gs above sure rotate speed",
            GuessReason::ElevationOnGround => "elevation on ground",
            GuessReason::RotatingUp => "rotating up detected",
            GuessReason::WaitingForRotateUp => "waiting for rotating up",
            GuessReason::ConstAscending => "const ascending",
            GuessReason::VtolUnknown => "VTOL, no guess",
            GuessReason::BelowRotateSpeed => "gs below guessed rotate speed",
            GuessReason::FallThrough => "fall through",
        }
    }
}

impl fmt::Display for GuessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnGroundGuess {
    pub info: OnGroundInfo,
    pub reason: GuessReason,
}

impl OnGroundGuess {
    fn on_ground(reason: GuessReason) -> Self {
        Self {
            info: OnGroundInfo::new(GroundState::OnGround, GroundDetails::ByGuessing),
            reason,
        }
    }

    fn not_on_ground(reason: GuessReason) -> Self {
        Self {
            info: OnGroundInfo::new(GroundState::NotOnGround, GroundDetails::ByGuessing),
            reason,
        }
    }

    fn unknown(reason: GuessReason) -> Self {
        Self {
            info: OnGroundInfo::new(GroundState::Unknown, GroundDetails::NotSet),
            reason,
        }
    }

    pub fn state(&self) -> GroundState {
        self.info.state()
    }
}

struct Inputs<'a> {
    situation: &'a AircraftSituation,
    change: Option<&'a SituationChange>,
    vtol: bool,
    cg: Length,
    guessed_rotate_speed: Option<Velocity>,
    sure_rotate_speed: Velocity,
}

type Rule = fn(&Inputs<'_>) -> Option<OnGroundGuess>;

/// Evaluated in order, the first rule returning a guess wins
const RULES: &[Rule] = &[
    push_back,
    not_moving,
    extreme_pitch,
    extreme_bank,
    above_sure_rotate_speed,
    elevation_on_ground,
    sticks_to_ground_until_rotation,
    const_ascending,
    vtol_unknown,
    below_guessed_rotate_speed,
];

/// Guess ground contact, `None` if the situation carries an inbound ground flag
pub fn guess_on_ground(
    situation: &AircraftSituation,
    change: Option<&SituationChange>,
    performance: &AircraftPerformance,
) -> Option<OnGroundGuess> {
    if !situation.should_guess_on_ground() {
        return None;
    }

    let guessed_rotate_speed = performance.guessed_rotate_speed();
    let inputs = Inputs {
        situation,
        change,
        vtol: performance.vtol,
        cg: situation.cg_or(performance.cg).unwrap_or_else(default_cg),
        guessed_rotate_speed,
        sure_rotate_speed: guessed_rotate_speed
            .map(|v| v * SURE_ROTATE_FACTOR)
            .unwrap_or_else(default_sure_rotate_speed),
    };

    let guess = RULES
        .iter()
        .find_map(|rule| rule(&inputs))
        .unwrap_or_else(|| OnGroundGuess::not_on_ground(GuessReason::FallThrough));

    trace!(
        callsign = %situation.callsign,
        reason = guess.reason.as_str(),
        "Guessed {}",
        guess.state().as_str()
    );
    Some(guess)
}

impl AircraftSituation {
    /// Guess and store ground contact, see [`guess_on_ground`]
    pub fn apply_on_ground_guess(
        &mut self,
        change: Option<&SituationChange>,
        performance: &AircraftPerformance,
    ) -> Option<OnGroundGuess> {
        let guess = guess_on_ground(self, change, performance)?;
        self.set_on_ground_info(guess.info);
        Some(guess)
    }
}

fn push_back(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    let negative = i.situation.ground_speed.is_some_and(is_negative_speed);
    (!i.vtol && negative).then(|| OnGroundGuess::on_ground(GuessReason::PushBack))
}

fn not_moving(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    (!i.vtol && !i.situation.is_moving()).then(|| OnGroundGuess::on_ground(GuessReason::NotMoving))
}

fn extreme_pitch(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    (in_degrees(i.situation.pitch()).abs() > MAX_GROUND_PITCH_DEG)
        .then(|| OnGroundGuess::not_on_ground(GuessReason::MaxPitch))
}

fn extreme_bank(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    (in_degrees(i.situation.bank()).abs() > MAX_GROUND_BANK_DEG)
        .then(|| OnGroundGuess::not_on_ground(GuessReason::MaxBank))
}

fn above_sure_rotate_speed(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    i.situation
        .ground_speed
        .is_some_and(|gs| gs > i.sure_rotate_speed)
        .then(|| OnGroundGuess::not_on_ground(GuessReason::AboveRotateSpeed))
}

fn elevation_on_ground(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    let cg = Some(i.cg);
    let info = OnGroundInfo::from_ground_distance(cg, i.situation.ground_distance(cg));
    info.is_on_ground()
        .then(|| OnGroundGuess::on_ground(GuessReason::ElevationOnGround))
}

/// On ground over the whole history: stay there until rotation is seen
fn sticks_to_ground_until_rotation(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    let change = i.change?;
    if i.vtol || !change.was_on_ground {
        return None;
    }
    Some(if change.rotating_up {
        OnGroundGuess::not_on_ground(GuessReason::RotatingUp)
    } else {
        OnGroundGuess::on_ground(GuessReason::WaitingForRotateUp)
    })
}

fn const_ascending(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    i.change
        .is_some_and(|c| c.const_ascending)
        .then(|| OnGroundGuess::not_on_ground(GuessReason::ConstAscending))
}

/// Speed based guessing does not work for VTOL
fn vtol_unknown(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    i.vtol.then(|| OnGroundGuess::unknown(GuessReason::VtolUnknown))
}

fn below_guessed_rotate_speed(i: &Inputs<'_>) -> Option<OnGroundGuess> {
    let rotate = i.guessed_rotate_speed?;
    i.situation
        .ground_speed
        .is_some_and(|gs| gs < rotate)
        .then(|| OnGroundGuess::on_ground(GuessReason::BelowRotateSpeed))
}
