//! Nearest-pin resolution
//!
//! Pure planar nearest-neighbor search over the pin catalog. Distances are
//! compared as `(Δlat)² + (Δlon)²` in raw degrees, not a geodesic formula.
//! The approximation holds at the deployment scale this system targets
//! (a single park or venue, tens to low hundreds of pins). Switching to a
//! geodesic distance would also change tie-break behavior.

use crate::model::{Location, NearestResolution, Pin};

/// Planar squared distance between a location and a pin, in degrees².
fn squared_distance(location: &Location, pin: &Pin) -> f64 {
    let d_lat = location.latitude - pin.latitude;
    let d_lon = location.longitude - pin.longitude;
    d_lat * d_lat + d_lon * d_lon
}

/// Resolve the pin nearest to `location`.
///
/// Returns `None` for an empty catalog. Ties resolve to the first pin in
/// iteration order; the track selector's dedup behavior relies on that
/// being deterministic.
///
/// Stateless and O(n) in pin count; safe to call on every location update.
pub fn nearest_pin(location: &Location, pins: &[Pin]) -> Option<NearestResolution> {
    let mut best: Option<NearestResolution> = None;

    for pin in pins {
        let d = squared_distance(location, pin);
        // Strict comparison keeps the earliest pin on equal distance
        let closer = match &best {
            Some(current) => d < current.squared_distance,
            None => true,
        };
        if closer {
            best = Some(NearestResolution {
                pin: pin.clone(),
                squared_distance: d,
            });
        }
    }

    best
}
