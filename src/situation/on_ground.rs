use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::{Length, abs_length, in_meters, is_negative_length, meters};

/// Ground factor for "unknown"
pub const GROUND_FACTOR_UNKNOWN: f64 = -1.0;

/// Tolerance used when comparing ground factors
const GROUND_FACTOR_EPSILON: f64 = 1e-3;

/// Fraction of the CG height below which a ground distance still counts as contact
const CG_CONTACT_FRACTION: f64 = 0.1;

/// Distance from ground that is treated as "on the ground"
pub fn delta_near_ground() -> Length {
    meters(0.5)
}

/// Ground contact tri-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundState {
    OnGround,
    NotOnGround,
    Unknown,
}

impl GroundState {
    pub fn as_str(self) -> &'static str {
        match self {
            GroundState::OnGround => "on_ground",
            GroundState::NotOnGround => "not_on_ground",
            GroundState::Unknown => "unknown",
        }
    }
}

impl From<bool> for GroundState {
    fn from(on_ground: bool) -> Self {
        if on_ground {
            GroundState::OnGround
        } else {
            GroundState::NotOnGround
        }
    }
}

/// How the ground contact state was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundDetails {
    NotSet,
    /// Flag sent with the position report
    InFromNetwork,
    /// Flag from a separate (timestamped) aircraft parts report
    InFromParts,
    ByGuessing,
    ByElevation,
    #[serde(rename = "by_elevation_and_cg")]
    ByElevationAndCG,
    ByInterpolation,
}

impl GroundDetails {
    /// Came in with network data rather than being derived locally
    pub fn is_inbound(self) -> bool {
        matches!(self, GroundDetails::InFromNetwork | GroundDetails::InFromParts)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroundDetails::NotSet => "not_set",
            GroundDetails::InFromNetwork => "from_network",
            GroundDetails::InFromParts => "from_parts",
            GroundDetails::ByGuessing => "guessing",
            GroundDetails::ByElevation => "elevation",
            GroundDetails::ByElevationAndCG => "elevation_and_cg",
            GroundDetails::ByInterpolation => "interpolation",
        }
    }
}

/// Ground contact state, how it was obtained, and the continuous ground factor
/// (1.0 on ground, 0.0 airborne, -1.0 unknown) used while interpolating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnGroundInfo {
    state: GroundState,
    details: GroundDetails,
    factor: f64,
}

impl Default for OnGroundInfo {
    fn default() -> Self {
        Self {
            state: GroundState::Unknown,
            details: GroundDetails::NotSet,
            factor: GROUND_FACTOR_UNKNOWN,
        }
    }
}

impl OnGroundInfo {
    pub fn new(state: GroundState, details: GroundDetails) -> Self {
        let mut info = Self::default();
        info.set_state(state, details);
        info
    }

    /// State derived from an interpolated ground factor.
    ///
    /// The factor is kept as is, only the tri-state is derived from it.
    pub fn from_ground_factor(factor: f64, threshold: f64) -> Self {
        let mut info = Self::default();
        info.set_factor(factor);
        info.details = GroundDetails::ByInterpolation;
        info.state = if info.factor < 0.0 {
            GroundState::Unknown
        } else if info.factor > threshold {
            GroundState::OnGround
        } else {
            GroundState::NotOnGround
        };
        info
    }

    /// Contact derived from the distance between the aircraft's CG and the ground.
    ///
    /// Underflow, a distance within [`delta_near_ground`] or within 10% of the
    /// CG height counts as contact. Unknown distance yields an unknown state.
    pub fn from_ground_distance(cg: Option<Length>, ground_distance: Option<Length>) -> Self {
        let Some(distance) = ground_distance else {
            return Self::default();
        };
        let on_ground = is_negative_length(distance)
            || abs_length(distance) < delta_near_ground()
            || cg.is_some_and(|cg| in_meters(distance) <= in_meters(cg) * CG_CONTACT_FRACTION);
        Self::new(GroundState::from(on_ground), GroundDetails::ByElevationAndCG)
    }

    pub fn state(&self) -> GroundState {
        self.state
    }

    pub fn details(&self) -> GroundDetails {
        self.details
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn is_on_ground(&self) -> bool {
        self.state == GroundState::OnGround
    }

    pub fn is_known(&self) -> bool {
        self.state != GroundState::Unknown && self.details != GroundDetails::NotSet
    }

    /// Set the tri-state and details, the factor follows the state
    pub fn set_state(&mut self, state: GroundState, details: GroundDetails) {
        self.state = state;
        self.details = details;
        self.factor = match state {
            GroundState::OnGround => 1.0,
            GroundState::NotOnGround => 0.0,
            GroundState::Unknown => GROUND_FACTOR_UNKNOWN,
        };
    }

    pub fn set_details(&mut self, details: GroundDetails) {
        self.details = details;
    }

    /// Set the factor, snapping values near 0 and 1 and mapping negatives to unknown
    pub fn set_factor(&mut self, factor: f64) {
        self.factor = if factor.is_nan() || factor < 0.0 {
            GROUND_FACTOR_UNKNOWN
        } else if factor < 0.001 {
            0.0
        } else if factor > 0.999 {
            1.0
        } else {
            factor
        };
    }

    pub fn has_factor(&self) -> bool {
        self.factor >= 0.0
    }
}

impl fmt::Display for OnGroundInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, gf {:.2})",
            self.state.as_str(),
            self.details.as_str(),
            self.factor
        )
    }
}

fn factor_equals(factor: f64, value: f64) -> bool {
    (factor - value).abs() < GROUND_FACTOR_EPSILON
}

/// Both factors are "on ground"
pub fn is_gf_equal_on_ground(older: f64, newer: f64) -> bool {
    factor_equals(older, 1.0) && factor_equals(newer, 1.0)
}

/// Both factors are "airborne"
pub fn is_gf_equal_airborne(older: f64, newer: f64) -> bool {
    factor_equals(older, 0.0) && factor_equals(newer, 0.0)
}

/// Going from airborne to on ground
pub fn is_gf_landing(older: f64, newer: f64) -> bool {
    factor_equals(older, 0.0) && factor_equals(newer, 1.0)
}

/// Going from on ground to airborne
pub fn is_gf_starting(older: f64, newer: f64) -> bool {
    factor_equals(older, 1.0) && factor_equals(newer, 0.0)
}
