use chrono::Duration;

use super::AircraftSituation;
use crate::elevation_plane::{ElevationPlane, ElevationProvenance, single_point_radius};
use crate::situation_change::SituationChange;
use crate::units::{Length, abs_length, in_meters, meters};

/// Closer than this (meters) two positions are considered the same spot
const SAME_SPOT_DISTANCE_M: f64 = 5.0;

/// Distance ratios outside this window snap to the nearer bracketing elevation
const SNAP_RATIO_NEWER: f64 = 0.05;
const SNAP_RATIO_OLDER: f64 = 0.95;

/// Moving less than the distance covered in this time counts as not moving
fn preset_same_spot_time() -> Duration {
    Duration::milliseconds(250)
}

/// Largest elevation step between two situations that is still interpolated
pub fn default_max_delta_elevation() -> Length {
    meters(4.0)
}

/// Elevation for `query` from two bracketing situations.
///
/// Returns `None` if either bracketing situation lacks an elevation or the
/// elevations differ by more than `max_delta` (a jump between airports, not
/// terrain). Close to one end, that end's plane is returned unchanged. Without a
/// query, the mean elevation centered on `newer` is returned.
pub fn interpolated_elevation(
    query: Option<&AircraftSituation>,
    older: &AircraftSituation,
    newer: &AircraftSituation,
    distance_hint: Option<Length>,
    max_delta: Length,
) -> Option<ElevationPlane> {
    let older_position = older.position?;
    let newer_position = newer.position?;
    let older_plane = *older.ground_elevation()?;
    let newer_plane = *newer.ground_elevation()?;

    if older_position.equal_normal_vector(&newer_position) {
        return Some(newer_plane);
    }

    let older_elevation = older_plane.elevation();
    let newer_elevation = newer_plane.elevation();
    let delta = newer_elevation - older_elevation;
    if abs_length(delta) > max_delta {
        return None;
    }

    let Some(query_position) = query.and_then(|q| q.position) else {
        let mean = (older_elevation + newer_elevation) / 2.0;
        return ElevationPlane::single_point(newer_position, mean, ElevationProvenance::Interpolated);
    };

    let distance_query_newer = in_meters(query_position.distance_to(&newer_position));
    if distance_query_newer < SAME_SPOT_DISTANCE_M {
        return Some(newer_plane);
    }

    let distance_older_newer =
        in_meters(distance_hint.unwrap_or_else(|| older_position.distance_to(&newer_position)));
    if distance_older_newer < SAME_SPOT_DISTANCE_M {
        return Some(older_plane);
    }

    let ratio = distance_query_newer / distance_older_newer;
    if ratio < SNAP_RATIO_NEWER {
        return Some(newer_plane);
    }
    if ratio > SNAP_RATIO_OLDER {
        return Some(older_plane);
    }

    let elevation = newer_elevation - delta * ratio;
    ElevationPlane::single_point(query_position, elevation, ElevationProvenance::Interpolated)
}

impl AircraftSituation {
    /// Attach an elevation interpolated between `older` and `newer`.
    ///
    /// Only replaces an existing elevation with a better one. A plane copied from
    /// one of the bracketing situations is marked transferred.
    pub fn interpolate_elevation(
        &mut self,
        older: &AircraftSituation,
        newer: &AircraftSituation,
        max_delta: Length,
    ) -> bool {
        let Some(plane) = interpolated_elevation(Some(self), older, newer, None, max_delta) else {
            return false;
        };
        let transferred = plane.provenance() != ElevationProvenance::Interpolated;
        if self.has_ground_elevation() && !self.is_other_elevation_better(plane.provenance(), transferred) {
            return false;
        }
        self.set_ground_elevation(Some(plane.with_provenance(plane.provenance(), transferred)));
        true
    }

    /// Replace the elevation with a first estimate for a situation between
    /// `older` and `newer`, before its exact position is known.
    ///
    /// In order of preference: `older`'s elevation (transferred) if the aircraft
    /// has practically not moved, the mean elevation of `change` if it barely
    /// varies, the mean of both ends. Returns whether an elevation was set.
    pub fn preset_ground_elevation(
        &mut self,
        older: &AircraftSituation,
        newer: &AircraftSituation,
        change: Option<&SituationChange>,
        max_delta: Length,
    ) -> bool {
        self.reset_ground_elevation();
        let distance = newer.distance_to(older);

        if let Some(plane) = older.ground_elevation() {
            let same_spot = newer
                .distance_per_time(preset_same_spot_time())
                .unwrap_or_else(single_point_radius);
            let not_moved =
                older.equal_normal_vector(newer) || distance.is_some_and(|d| d < same_spot);
            if not_moved {
                self.set_ground_elevation(Some(plane.with_provenance(plane.provenance(), true)));
                return true;
            }
        }

        let change_mean = change
            .filter(|c| c.has_elevation_dev_within_allowed_range())
            .and_then(|c| c.elevation);
        if let (Some(elevation), Some(point)) = (change_mean, self.position.or(newer.position)) {
            let plane = ElevationPlane::single_point(
                point,
                elevation.mean,
                ElevationProvenance::FromSituationChange,
            );
            if plane.is_some() {
                self.set_ground_elevation(plane);
                return true;
            }
        }

        let plane = interpolated_elevation(None, older, newer, distance, max_delta)
            .map(|p| p.with_provenance(ElevationProvenance::Interpolated, false));
        self.set_ground_elevation(plane);
        self.has_ground_elevation()
    }
}
