//! Satellite state samples and the quantities derived from them
//!
//! A [`StateSample`] is the raw instantaneous state handed to us by the caller
//! (kilometers and km/s, as served by the position API). [`DerivedState`]
//! converts it to SI units once and computes everything propagation needs.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::propagator::PredictionError;
use super::settings::SemiMajorAxisModel;
use super::track_model::OrbitBranch;

// Physical constants
/// Earth's gravitational parameter (GM) in m³/s²
pub const MU_EARTH: f64 = 3.986004418e14;

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Smallest position magnitude (meters) accepted by [`StateSample::validate`]
const MIN_POSITION_M: f64 = 1.0;

/// Instantaneous satellite state as reported by the tracker
///
/// Position and velocity are in an Earth-centered inertial-like frame.
/// Latitude and longitude only place the footprint; propagation ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSample {
    /// Position X (km)
    pub position_x: f64,
    /// Position Y (km)
    pub position_y: f64,
    /// Position Z (km)
    pub position_z: f64,

    /// Velocity X (km/s)
    pub velocity_x: f64,
    /// Velocity Y (km/s)
    pub velocity_y: f64,
    /// Velocity Z (km/s)
    pub velocity_z: f64,

    /// Altitude above the mean Earth radius (km)
    pub altitude: f64,

    /// Geodetic latitude of the current instant (degrees)
    pub latitude: f64,
    /// Geodetic longitude of the current instant (degrees)
    pub longitude: f64,
}

impl StateSample {
    /// Create a sample from km / km/s vectors
    pub fn from_km(
        position_km: Vector3<f64>,
        velocity_km_s: Vector3<f64>,
        altitude_km: f64,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            position_x: position_km.x,
            position_y: position_km.y,
            position_z: position_km.z,
            velocity_x: velocity_km_s.x,
            velocity_y: velocity_km_s.y,
            velocity_z: velocity_km_s.z,
            altitude: altitude_km,
            latitude,
            longitude,
        }
    }

    /// Position in kilometers
    pub fn position_km(&self) -> Vector3<f64> {
        Vector3::new(self.position_x, self.position_y, self.position_z)
    }

    /// Velocity in km/s
    pub fn velocity_km_s(&self) -> Vector3<f64> {
        Vector3::new(self.velocity_x, self.velocity_y, self.velocity_z)
    }

    /// Position in meters
    pub fn position(&self) -> Vector3<f64> {
        self.position_km() * 1000.0
    }

    /// Velocity in m/s
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity_km_s() * 1000.0
    }

    /// Reject samples the closed-form propagation cannot make sense of.
    ///
    /// The numeric core never calls this; it is the opt-in hardening used by
    /// [`GroundTrackPropagator::predict_checked`](super::GroundTrackPropagator::predict_checked).
    pub fn validate(&self) -> Result<(), PredictionError> {
        let fields = [
            ("position_x", self.position_x),
            ("position_y", self.position_y),
            ("position_z", self.position_z),
            ("velocity_x", self.velocity_x),
            ("velocity_y", self.velocity_y),
            ("velocity_z", self.velocity_z),
            ("altitude", self.altitude),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PredictionError::InvalidState {
                    message: format!("{} is not finite ({})", name, value),
                });
            }
        }

        if self.position().norm() < MIN_POSITION_M {
            return Err(PredictionError::InvalidState {
                message: "Position magnitude too small".to_string(),
            });
        }

        Ok(())
    }
}

/// Orbital quantities derived from a single [`StateSample`]
///
/// All vectors are SI (meters, m/s), so `MU_EARTH` applies without any
/// scaling constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedState {
    /// Semi-major axis (m)
    pub semi_major_axis: f64,

    /// Orbital period (s)
    pub period: f64,

    /// Position (m)
    pub position: Vector3<f64>,

    /// Velocity (m/s)
    pub velocity: Vector3<f64>,

    /// |r| (m)
    pub radius: f64,

    /// |v| (m/s)
    pub speed: f64,

    /// Specific angular momentum h = r × v (m²/s)
    pub angular_momentum: Vector3<f64>,

    /// |h| (m²/s)
    pub angular_momentum_mag: f64,

    /// Eccentricity vector e = (v × h)/μ − r/|r|, pointing at perigee
    pub eccentricity_vector: Vector3<f64>,

    /// |e|
    pub eccentricity: f64,
}

/// Derive the propagation state using the altitude-based semi-major axis
pub fn derive(state: &StateSample) -> DerivedState {
    DerivedState::from_sample(state, SemiMajorAxisModel::AltitudeProxy)
}

impl DerivedState {
    /// Derive all quantities from a sample
    pub fn from_sample(state: &StateSample, model: SemiMajorAxisModel) -> Self {
        let position = state.position();
        let velocity = state.velocity();

        let radius = position.norm();
        let speed = velocity.norm();

        let angular_momentum = position.cross(&velocity);
        let angular_momentum_mag = angular_momentum.norm();

        // Zero radius yields NaN here; callers guarantee a non-zero position.
        let eccentricity_vector = velocity.cross(&angular_momentum) / MU_EARTH - position / radius;
        let eccentricity = eccentricity_vector.norm();

        let semi_major_axis = semi_major_axis(state.altitude, radius, speed, model);
        let period = orbital_period(semi_major_axis);

        Self {
            semi_major_axis,
            period,
            position,
            velocity,
            radius,
            speed,
            angular_momentum,
            angular_momentum_mag,
            eccentricity_vector,
            eccentricity,
        }
    }

    /// Specific orbital energy (vis-viva) in J/kg
    pub fn specific_energy(&self) -> f64 {
        specific_energy(self.radius, self.speed)
    }

    /// Mean motion 2π/T (rad/s)
    pub fn mean_motion(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.period
    }

    /// Semi-latus rectum h²/μ (m)
    pub fn semi_latus_rectum(&self) -> f64 {
        self.angular_momentum_mag * self.angular_momentum_mag / MU_EARTH
    }

    /// Propagation branch implied by the eccentricity
    pub fn branch(&self) -> OrbitBranch {
        OrbitBranch::select(self.eccentricity)
    }
}

/// Orbital period T = 2π√(a³/μ) in seconds, `a` in meters
#[inline]
pub fn orbital_period(semi_major_axis_m: f64) -> f64 {
    2.0 * std::f64::consts::PI * (semi_major_axis_m.powi(3) / MU_EARTH).sqrt()
}

/// Semi-major axis assuming a circular orbit at the given altitude (m)
#[inline]
pub fn altitude_semi_major_axis(altitude_km: f64) -> f64 {
    (EARTH_RADIUS_KM + altitude_km) * 1000.0
}

fn specific_energy(radius_m: f64, speed_m_s: f64) -> f64 {
    0.5 * speed_m_s * speed_m_s - MU_EARTH / radius_m
}

fn semi_major_axis(
    altitude_km: f64,
    radius_m: f64,
    speed_m_s: f64,
    model: SemiMajorAxisModel,
) -> f64 {
    let proxy = altitude_semi_major_axis(altitude_km);
    match model {
        SemiMajorAxisModel::AltitudeProxy => proxy,
        SemiMajorAxisModel::VisViva => {
            let a = -MU_EARTH / (2.0 * specific_energy(radius_m, speed_m_s));
            if a.is_finite() && a > 0.0 {
                a
            } else {
                // Parabolic or hyperbolic: no closed orbit to time
                log::warn!(
                    "Non-elliptical state (a = {:.1} m), using altitude-based semi-major axis",
                    a
                );
                proxy
            }
        }
    }
}
