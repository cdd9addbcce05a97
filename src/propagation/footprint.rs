//! Visibility footprint of a satellite at its current altitude

use serde::{Deserialize, Serialize};

use super::state::{StateSample, EARTH_RADIUS_KM};

/// Flat conversion used by map circles (meters per degree)
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Footprint circle for the current instant
///
/// Only the altitude matters; nothing here is propagated through time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Circle centre latitude (degrees)
    pub center_latitude: f64,
    /// Circle centre longitude (degrees)
    pub center_longitude: f64,
    /// Earth central angle between sub-satellite point and horizon (rad)
    pub central_angle: f64,
    /// Surface radius (km)
    pub radius_km: f64,
    /// Radius as a degree equivalent
    pub radius_deg: f64,
    /// Radius in meters, through the flat degree conversion
    pub radius_m: f64,
}

impl Footprint {
    /// Footprint at `altitude_km`, centred on (0, 0)
    pub fn from_altitude(altitude_km: f64) -> Self {
        Self::at(altitude_km, 0.0, 0.0)
    }

    /// Footprint centred on the sample's current sub-satellite point
    pub fn for_sample(state: &StateSample) -> Self {
        Self::at(state.altitude, state.latitude, state.longitude)
    }

    /// Footprint at `altitude_km`, centred on the given point
    pub fn at(altitude_km: f64, latitude: f64, longitude: f64) -> Self {
        let central_angle = (EARTH_RADIUS_KM / (EARTH_RADIUS_KM + altitude_km)).acos();
        let radius_km = EARTH_RADIUS_KM * central_angle.sin();
        // Degree equivalent scales by 90°, not the true 180/π
        let radius_deg = (radius_km / EARTH_RADIUS_KM) * 90.0;

        Self {
            center_latitude: latitude,
            center_longitude: longitude,
            central_angle,
            radius_km,
            radius_deg,
            radius_m: radius_deg * METERS_PER_DEGREE,
        }
    }
}

/// Footprint radius in meters for a circle-style map layer
pub fn compute_footprint_radius(altitude_km: f64) -> f64 {
    Footprint::from_altitude(altitude_km).radius_m
}
