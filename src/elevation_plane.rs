//! Ground elevation estimates and their provenance
//!
//! An [`ElevationPlane`] is an elevation value valid around a geographic point
//! within a radius. Where the value came from ([`ElevationProvenance`]) decides
//! whether a newer estimate may replace an existing one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::GeoPoint;
use crate::units::{Length, finite_length, in_feet, in_meters, meters};

/// Radius of a plane that is only valid at its own point
pub fn single_point_radius() -> Length {
    meters(1.0)
}

/// Smallest radius used when checking whether a plane covers a position
pub fn minimum_radius() -> Length {
    meters(5.0)
}

/// Where a ground elevation value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElevationProvenance {
    NoElevation,
    /// From the simulator/terrain layer, the authoritative source
    FromProvider,
    /// Derived from a situation change summary (scenery deviation)
    FromSituationChange,
    FromCache,
    /// Interpolated between two bracketing situations
    Interpolated,
    Extrapolated,
    /// Average of nearby (non-moving) situations
    Average,
    /// Unit tests only
    Test,
}

/// Reliability order, least reliable first. Position in this table is the rank.
const RELIABILITY_ORDER: [ElevationProvenance; 8] = [
    ElevationProvenance::NoElevation,
    ElevationProvenance::Test,
    ElevationProvenance::FromSituationChange,
    ElevationProvenance::Extrapolated,
    ElevationProvenance::Average,
    ElevationProvenance::Interpolated,
    ElevationProvenance::FromCache,
    ElevationProvenance::FromProvider,
];

impl ElevationProvenance {
    /// Rank in the reliability table, higher is more reliable
    pub fn reliability(self) -> usize {
        RELIABILITY_ORDER
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElevationProvenance::NoElevation => "no details",
            ElevationProvenance::FromProvider => "provider",
            ElevationProvenance::FromSituationChange => "situation change",
            ElevationProvenance::FromCache => "cached",
            ElevationProvenance::Interpolated => "interpolated",
            ElevationProvenance::Extrapolated => "extrapolated",
            ElevationProvenance::Average => "average",
            ElevationProvenance::Test => "test",
        }
    }
}

impl fmt::Display for ElevationProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total order used for overwrite decisions.
///
/// Returns true if `candidate` is strictly better than `current`. Test and
/// NoElevation values never win. At equal provenance a value measured for the
/// situation itself beats one transferred from another situation.
pub fn is_better_provenance(
    current: ElevationProvenance,
    current_transferred: bool,
    candidate: ElevationProvenance,
    candidate_transferred: bool,
) -> bool {
    if matches!(
        candidate,
        ElevationProvenance::NoElevation | ElevationProvenance::Test
    ) {
        return false;
    }
    match candidate.reliability().cmp(&current.reliability()) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => current_transferred && !candidate_transferred,
    }
}

/// Elevation valid around a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationPlane {
    point: GeoPoint,
    elevation: Length,
    radius: Length,
    provenance: ElevationProvenance,
    transferred: bool,
}

impl ElevationPlane {
    /// Create a plane, `None` for a NaN elevation or a `NoElevation` provenance
    pub fn new(
        point: GeoPoint,
        elevation: Length,
        radius: Length,
        provenance: ElevationProvenance,
    ) -> Option<Self> {
        if provenance == ElevationProvenance::NoElevation {
            return None;
        }
        let elevation = finite_length(elevation)?;
        let radius = finite_length(radius)
            .filter(|r| *r >= single_point_radius())
            .unwrap_or_else(single_point_radius);
        Some(Self {
            point,
            elevation,
            radius,
            provenance,
            transferred: false,
        })
    }

    /// Plane only valid at its own point
    pub fn single_point(
        point: GeoPoint,
        elevation: Length,
        provenance: ElevationProvenance,
    ) -> Option<Self> {
        Self::new(point, elevation, single_point_radius(), provenance)
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn elevation(&self) -> Length {
        self.elevation
    }

    pub fn radius(&self) -> Length {
        self.radius
    }

    pub fn provenance(&self) -> ElevationProvenance {
        self.provenance
    }

    pub fn is_transferred(&self) -> bool {
        self.transferred
    }

    /// Radius, but never below [`minimum_radius`]
    pub fn radius_or_minimum(&self) -> Length {
        if self.radius < minimum_radius() {
            minimum_radius()
        } else {
            self.radius
        }
    }

    /// Set radius to `radius`, but never below [`minimum_radius`]
    pub fn set_radius_or_minimum(&mut self, radius: Length) {
        self.radius = match finite_length(radius) {
            Some(r) if r >= minimum_radius() => r,
            _ => minimum_radius(),
        };
    }

    pub fn with_provenance(mut self, provenance: ElevationProvenance, transferred: bool) -> Self {
        if provenance != ElevationProvenance::NoElevation {
            self.provenance = provenance;
        }
        self.transferred = transferred;
        self
    }

    pub fn distance_to(&self, position: &GeoPoint) -> Length {
        self.point.distance_to(position)
    }

    /// Could this elevation be reused for a situation at `target_position`?
    ///
    /// Never overrides a provider value, a cached value is only overridden by a
    /// provider value, and the target has to be within `radius`.
    pub fn can_transfer_to(
        &self,
        target_position: &GeoPoint,
        target_provenance: ElevationProvenance,
        radius: Length,
    ) -> bool {
        if target_provenance == ElevationProvenance::FromProvider {
            return false;
        }
        if self.provenance != ElevationProvenance::FromProvider
            && target_provenance == ElevationProvenance::FromCache
        {
            return false;
        }
        self.distance_to(target_position) <= radius
    }
}

impl fmt::Display for ElevationPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}ft r={:.0}m [{}{}] at ({:.6}, {:.6})",
            in_feet(self.elevation),
            in_meters(self.radius),
            if self.transferred { "tx: " } else { "" },
            self.provenance,
            self.point.latitude,
            self.point.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::feet;

    fn plane(provenance: ElevationProvenance) -> ElevationPlane {
        ElevationPlane::single_point(GeoPoint::new(48.33, -70.99), feet(500.0), provenance).unwrap()
    }

    #[test]
    fn test_reliability_table_is_total() {
        let mut ranks: Vec<usize> = RELIABILITY_ORDER.iter().map(|p| p.reliability()).collect();
        ranks.dedup();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(
            ElevationProvenance::FromProvider.reliability()
                > ElevationProvenance::FromCache.reliability()
        );
    }

    #[test]
    fn test_cache_never_beats_provider() {
        for transferred in [false, true] {
            for current_transferred in [false, true] {
                assert!(!is_better_provenance(
                    ElevationProvenance::FromProvider,
                    current_transferred,
                    ElevationProvenance::FromCache,
                    transferred
                ));
            }
        }
    }

    #[test]
    fn test_non_transferred_beats_transferred_at_equal_provenance() {
        assert!(is_better_provenance(
            ElevationProvenance::Interpolated,
            true,
            ElevationProvenance::Interpolated,
            false
        ));
        assert!(!is_better_provenance(
            ElevationProvenance::Interpolated,
            false,
            ElevationProvenance::Interpolated,
            true
        ));
        assert!(!is_better_provenance(
            ElevationProvenance::Interpolated,
            false,
            ElevationProvenance::Interpolated,
            false
        ));
    }

    #[test]
    fn test_test_provenance_never_wins() {
        assert!(!is_better_provenance(
            ElevationProvenance::NoElevation,
            false,
            ElevationProvenance::Test,
            false
        ));
    }

    #[test]
    fn test_new_rejects_nan_and_no_elevation() {
        let p = GeoPoint::new(1.0, 1.0);
        assert!(ElevationPlane::single_point(p, feet(f64::NAN), ElevationProvenance::Test).is_none());
        assert!(
            ElevationPlane::single_point(p, feet(10.0), ElevationProvenance::NoElevation).is_none()
        );
    }

    #[test]
    fn test_can_transfer_rules() {
        let target = GeoPoint::new(48.33, -70.99);
        let provider = plane(ElevationProvenance::FromProvider);
        let cached = plane(ElevationProvenance::FromCache);
        let r = meters(100.0);

        assert!(!provider.can_transfer_to(&target, ElevationProvenance::FromProvider, r));
        assert!(provider.can_transfer_to(&target, ElevationProvenance::FromCache, r));
        assert!(!cached.can_transfer_to(&target, ElevationProvenance::FromCache, r));
        assert!(cached.can_transfer_to(&target, ElevationProvenance::NoElevation, r));

        let far = GeoPoint::new(48.40, -70.99);
        assert!(!provider.can_transfer_to(&far, ElevationProvenance::NoElevation, r));
    }

    #[test]
    fn test_radius_or_minimum() {
        let mut p = plane(ElevationProvenance::Test);
        assert_eq!(p.radius_or_minimum(), minimum_radius());
        p.set_radius_or_minimum(meters(0.5));
        assert_eq!(p.radius(), minimum_radius());
        p.set_radius_or_minimum(meters(50.0));
        assert_eq!(p.radius(), meters(50.0));
    }
}
