//! Aircraft performance data needed for ground handling
//!
//! VTOL flag, center of gravity height and a guessed rotation speed per ICAO
//! type designator. A small built-in table covers common types, config entries
//! override or extend it.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::AircraftOverride;
use crate::units::{Length, Velocity, in_km_per_hour, knots, meters};

/// Guessed rotation speeds at or below this (km/h) are considered wrong
const MIN_VALID_ROTATE_KMH: f64 = 5.0;

/// Replacement for an invalid guessed rotation speed
fn fallback_rotate_speed() -> Velocity {
    knots(80.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftPerformance {
    pub icao: String,
    pub vtol: bool,
    pub cg: Option<Length>,
    pub rotate_speed: Option<Velocity>,
}

impl AircraftPerformance {
    /// Unknown type: not VTOL, no CG, no rotation speed
    pub fn unknown(icao: &str) -> Self {
        Self {
            icao: normalize_icao(icao),
            vtol: false,
            cg: None,
            rotate_speed: None,
        }
    }

    /// Rotation speed, with an implausible value replaced by 80 kts
    pub fn guessed_rotate_speed(&self) -> Option<Velocity> {
        let speed = self.rotate_speed?;
        if in_km_per_hour(speed) > MIN_VALID_ROTATE_KMH {
            Some(speed)
        } else {
            tracing::warn!(
                icao = %self.icao,
                "Invalid guessed rotate speed {:.1} km/h, using fallback",
                in_km_per_hour(speed)
            );
            Some(fallback_rotate_speed())
        }
    }
}

impl From<&AircraftOverride> for AircraftPerformance {
    fn from(o: &AircraftOverride) -> Self {
        Self {
            icao: normalize_icao(&o.icao),
            vtol: o.vtol,
            cg: o.cg_m.map(meters),
            rotate_speed: o.rotate_kts.map(knots),
        }
    }
}

/// Source of performance data by ICAO type designator
pub trait PerformanceLookup: Send + Sync {
    fn lookup(&self, icao: &str) -> AircraftPerformance;
}

fn normalize_icao(icao: &str) -> String {
    icao.trim().to_uppercase()
}

/// (icao, vtol, cg meters, rotate kts)
const BUILT_IN: &[(&str, bool, f64, Option<f64>)] = &[
    ("A319", false, 2.6, Some(135.0)),
    ("A320", false, 2.7, Some(140.0)),
    ("A321", false, 2.7, Some(145.0)),
    ("A388", false, 5.3, Some(155.0)),
    ("B738", false, 2.6, Some(145.0)),
    ("B744", false, 4.7, Some(160.0)),
    ("B77W", false, 4.9, Some(165.0)),
    ("B789", false, 4.3, Some(155.0)),
    ("CRJ9", false, 2.2, Some(135.0)),
    ("DH8D", false, 2.4, Some(115.0)),
    ("E190", false, 2.3, Some(130.0)),
    ("AT76", false, 2.2, Some(105.0)),
    ("C172", false, 1.2, Some(55.0)),
    ("PA28", false, 1.1, Some(60.0)),
    ("DA40", false, 1.2, Some(59.0)),
    ("EC35", true, 1.4, None),
    ("H135", true, 1.4, None),
    ("R44", true, 1.1, None),
    ("V22", true, 3.4, None),
];

static BUILT_IN_TABLE: Lazy<HashMap<String, AircraftPerformance>> = Lazy::new(|| {
    BUILT_IN
        .iter()
        .map(|(icao, vtol, cg, rotate)| {
            let performance = AircraftPerformance {
                icao: (*icao).to_string(),
                vtol: *vtol,
                cg: Some(meters(*cg)),
                rotate_speed: rotate.map(knots),
            };
            ((*icao).to_string(), performance)
        })
        .collect()
});

/// Built-in table plus config overrides
#[derive(Debug, Clone, Default)]
pub struct PerformanceTable {
    overrides: HashMap<String, AircraftPerformance>,
}

impl PerformanceTable {
    pub fn new(overrides: &[AircraftOverride]) -> Self {
        let overrides = overrides
            .iter()
            .map(|o| {
                let performance = AircraftPerformance::from(o);
                (performance.icao.clone(), performance)
            })
            .collect();
        Self { overrides }
    }

    pub fn len(&self) -> usize {
        BUILT_IN_TABLE.len()
            + self
                .overrides
                .keys()
                .filter(|k| !BUILT_IN_TABLE.contains_key(*k))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PerformanceLookup for PerformanceTable {
    fn lookup(&self, icao: &str) -> AircraftPerformance {
        let icao = normalize_icao(icao);
        self.overrides
            .get(&icao)
            .or_else(|| BUILT_IN_TABLE.get(&icao))
            .cloned()
            .unwrap_or_else(|| AircraftPerformance::unknown(&icao))
    }
}
