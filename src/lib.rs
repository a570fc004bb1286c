//! SITUS - ground handling for remote aircraft in networked flight simulation
//!
//! Attaches ground elevation to aircraft situations, interpolates it between
//! samples, corrects altitudes against the terrain and guesses ground contact
//! when the network does not send it.

pub mod aircraft_performance;
pub mod config;
pub mod elevation_plane;
pub mod geo;
pub mod log_format;
pub mod on_ground_guess;
pub mod replay;
pub mod situation;
pub mod situation_change;
pub mod stats;
pub mod tracker;
pub mod units;

pub use aircraft_performance::{AircraftPerformance, PerformanceLookup, PerformanceTable};
pub use config::SitusConfig;
pub use elevation_plane::{ElevationPlane, ElevationProvenance};
pub use geo::GeoPoint;
pub use on_ground_guess::{GuessReason, OnGroundGuess, guess_on_ground};
pub use situation::{AircraftSituation, AltitudeCorrection, Callsign, GroundDetails, GroundState, OnGroundInfo};
pub use situation_change::SituationChange;
pub use tracker::{PositionReport, ProcessedSituation, SituationTracker};
