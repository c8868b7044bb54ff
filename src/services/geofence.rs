//! # Check-in Geofence
//!
//! Admission check run once before the check-in wizard opens: the device position must lie
//! within the configured radius of the warehouse, unless the operator bypasses the check.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::config::GeofenceSettings;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Great-circle distance in meters
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Result of measuring a device position against the site
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeofenceVerdict {
    Within { distance_meters: f64 },
    OutOfRange { distance_meters: f64 },
    LocationUnavailable,
}

impl GeofenceVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GeofenceVerdict::Within { .. })
    }

    pub fn distance_meters(&self) -> Option<f64> {
        match self {
            GeofenceVerdict::Within { distance_meters } | GeofenceVerdict::OutOfRange { distance_meters } => {
                Some(*distance_meters)
            }
            GeofenceVerdict::LocationUnavailable => None,
        }
    }
}

/// How the check-in session got past the geofence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeofenceClearance {
    Ok { distance_meters: f64 },
    Bypass { distance_meters: Option<f64> },
}

impl GeofenceClearance {
    /// The annotation appended to the check-in notes
    pub fn annotation(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeofenceClearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeofenceClearance::Ok { distance_meters } => {
                write!(f, "[GPS: OK, Dist: {}m]", distance_meters.round() as i64)
            }
            GeofenceClearance::Bypass { distance_meters: Some(d) } => {
                write!(f, "[GPS: BYPASS, Dist: {}m]", d.round() as i64)
            }
            GeofenceClearance::Bypass { distance_meters: None } => f.write_str("[GPS: BYPASS, Dist: ?m]"),
        }
    }
}

/// The site coordinate and admission radius
#[derive(Debug, Clone)]
pub struct Geofence {
    site: GeoPoint,
    max_distance_meters: f64,
}

impl Geofence {
    pub fn new(settings: &GeofenceSettings) -> Self {
        Self {
            site: GeoPoint::new(settings.latitude, settings.longitude),
            max_distance_meters: settings.max_distance_meters,
        }
    }

    pub fn site(&self) -> GeoPoint {
        self.site
    }

    pub fn evaluate(&self, position: Option<GeoPoint>) -> GeofenceVerdict {
        match position {
            None => GeofenceVerdict::LocationUnavailable,
            Some(p) => {
                let distance_meters = haversine_distance(p, self.site);
                if distance_meters <= self.max_distance_meters {
                    GeofenceVerdict::Within { distance_meters }
                } else {
                    GeofenceVerdict::OutOfRange { distance_meters }
                }
            }
        }
    }

    /// Clears a session that is within range; `None` means the session stays blocked
    pub fn clear(&self, verdict: GeofenceVerdict) -> Option<GeofenceClearance> {
        match verdict {
            GeofenceVerdict::Within { distance_meters } => Some(GeofenceClearance::Ok { distance_meters }),
            _ => None,
        }
    }

    /// Operator override for a blocked or unmeasured session
    pub fn bypass(&self, verdict: GeofenceVerdict) -> GeofenceClearance {
        GeofenceClearance::Bypass { distance_meters: verdict.distance_meters() }
    }
}
