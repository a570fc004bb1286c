use serde::{Deserialize, Serialize};
use std::fmt;

use super::on_ground::{GroundDetails, delta_near_ground};
use super::{AircraftSituation, AltitudeDatum};
use crate::units::{Length, abs_length, finite_length, is_negative_length};

/// How a corrected altitude was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeCorrection {
    NoCorrection,
    /// Below ground, lifted up to ground plus CG
    Underflow,
    /// Above ground but on ground by network data or guessing, pulled down
    DraggedToGround,
    NoElevation,
    /// Above ground datum, not supported
    Agl,
}

impl AltitudeCorrection {
    pub fn as_str(self) -> &'static str {
        match self {
            AltitudeCorrection::NoCorrection => "no_correction",
            AltitudeCorrection::Underflow => "underflow",
            AltitudeCorrection::DraggedToGround => "dragged_to_ground",
            AltitudeCorrection::NoElevation => "no_elevation",
            AltitudeCorrection::Agl => "agl",
        }
    }

    /// The altitude was changed by the correction
    pub fn is_corrected(self) -> bool {
        matches!(
            self,
            AltitudeCorrection::Underflow | AltitudeCorrection::DraggedToGround
        )
    }
}

impl fmt::Display for AltitudeCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedAltitude {
    pub altitude: Option<Length>,
    pub correction: AltitudeCorrection,
}

impl CorrectedAltitude {
    fn new(altitude: Option<Length>, correction: AltitudeCorrection) -> Self {
        Self {
            altitude,
            correction,
        }
    }
}

impl AircraftSituation {
    /// Altitude that puts the model on the terrain where that looks right.
    ///
    /// Prefers ground plus CG whenever the aircraft is below it, within the near
    /// ground delta, or (with `drag_to_ground`) on ground by network data or
    /// guessing. A missing CG is treated as zero offset.
    pub fn corrected_altitude(&self, cg: Option<Length>, drag_to_ground: bool) -> CorrectedAltitude {
        let Some(plane) = self.ground_elevation() else {
            return CorrectedAltitude::new(self.altitude, AltitudeCorrection::NoElevation);
        };
        if self.datum == AltitudeDatum::AboveGround {
            return CorrectedAltitude::new(self.altitude, AltitudeCorrection::Agl);
        }

        let ground_plus_cg = match cg {
            Some(cg) => finite_length(plane.elevation() + cg),
            None => Some(plane.elevation()),
        };
        let Some(ground_plus_cg) = ground_plus_cg else {
            return CorrectedAltitude::new(self.altitude, AltitudeCorrection::NoElevation);
        };

        if let Some(delta) = self.altitude.and_then(|alt| finite_length(alt - ground_plus_cg)) {
            if is_negative_length(delta) {
                return CorrectedAltitude::new(Some(ground_plus_cg), AltitudeCorrection::Underflow);
            }
            if abs_length(delta) < delta_near_ground() {
                return CorrectedAltitude::new(Some(ground_plus_cg), AltitudeCorrection::NoCorrection);
            }
        }

        let details = self.on_ground_info().details();
        let drag = drag_to_ground
            && self.is_on_ground()
            && (details.is_inbound() || details == GroundDetails::ByGuessing);
        if drag {
            return CorrectedAltitude::new(Some(ground_plus_cg), AltitudeCorrection::DraggedToGround);
        }

        CorrectedAltitude::new(self.altitude, AltitudeCorrection::NoCorrection)
    }

    /// Apply [`Self::corrected_altitude`] and remember the CG used
    pub fn correct_altitude(&mut self, cg: Option<Length>, drag_to_ground: bool) -> AltitudeCorrection {
        let corrected = self.corrected_altitude(cg, drag_to_ground);
        self.altitude = corrected.altitude;
        self.cg = cg;
        corrected.correction
    }
}
