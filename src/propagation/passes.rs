//! Ground-station pass prediction
//!
//! Walks a track model across a time window and reports when the satellite
//! rises above and sets below a station's elevation mask. Positions come from
//! the same Earth-fixed frame as the ground track, so the Earth does not turn
//! under the orbit.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::propagator::PredictionError;
use super::state::EARTH_RADIUS_M;
use super::track_model::TrackModel;

/// Default search window in days
pub const DEFAULT_PASS_DAYS: f64 = 3.0;

/// Default elevation mask in degrees
pub const DEFAULT_MIN_ELEVATION_DEG: f64 = 10.0;

/// Coarsest search step in seconds
pub const MAX_PASS_STEP_SECONDS: f64 = 300.0;

/// Minimum number of search samples per orbital period
const SAMPLES_PER_PERIOD: f64 = 12.0;

/// Observer on a spherical Earth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Height above the mean Earth radius in meters
    pub altitude_m: f64,
}

/// Direction and distance from a station to the satellite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    /// Degrees clockwise from north, [0, 360)
    pub azimuth: f64,
    /// Degrees above the local horizon
    pub elevation: f64,
    /// Slant range in meters
    pub range_m: f64,
}

impl GroundStation {
    pub fn new(latitude: f64, longitude: f64, altitude_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_m,
        }
    }

    /// Station position in the Earth-fixed frame (meters)
    pub fn position(&self) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude.to_radians().sin_cos();
        let r = EARTH_RADIUS_M + self.altitude_m;
        Vector3::new(r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat)
    }

    /// Azimuth, elevation and range to a satellite at `satellite` (meters)
    ///
    /// The line of sight is rotated into the station's East-North-Up frame.
    pub fn look_angles(&self, satellite: &Vector3<f64>) -> LookAngles {
        let rho = satellite - self.position();
        let range_m = rho.norm();

        let (sin_lat, cos_lat) = self.latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude.to_radians().sin_cos();

        let east = -rho.x * sin_lon + rho.y * cos_lon;
        let north = -rho.x * sin_lat * cos_lon - rho.y * sin_lat * sin_lon + rho.z * cos_lat;
        let up = rho.x * cos_lat * cos_lon + rho.y * cos_lat * sin_lon + rho.z * sin_lat;

        LookAngles {
            azimuth: east.atan2(north).to_degrees().rem_euclid(360.0),
            elevation: (up / range_m).asin().to_degrees(),
            range_m,
        }
    }

    pub fn validate(&self) -> Result<(), PredictionError> {
        let invalid = |message: String| -> Result<(), PredictionError> {
            Err(PredictionError::InvalidStation { message })
        };

        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return invalid(format!("latitude {} is outside [-90, 90]", self.latitude));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return invalid(format!("longitude {} is outside [-180, 180]", self.longitude));
        }
        if !self.altitude_m.is_finite() || self.altitude_m <= -EARTH_RADIUS_M {
            return invalid(format!("altitude {} m is below the Earth's center", self.altitude_m));
        }
        Ok(())
    }
}

/// Time window and elevation mask for a pass search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassWindow {
    /// Search length in minutes after the sample instant
    pub duration_minutes: f64,
    /// Elevation mask in degrees
    pub min_elevation: f64,
}

impl Default for PassWindow {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_PASS_DAYS * 1440.0,
            min_elevation: DEFAULT_MIN_ELEVATION_DEG,
        }
    }
}

impl PassWindow {
    pub fn new(days: f64, min_elevation: f64) -> Self {
        Self {
            duration_minutes: days * 1440.0,
            min_elevation,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_minutes * 60.0
    }

    /// Search step for an orbit of the given period
    ///
    /// At least twelve samples per revolution, never coarser than five minutes.
    pub fn step_seconds(&self, period: f64) -> f64 {
        let step = (period / SAMPLES_PER_PERIOD).min(MAX_PASS_STEP_SECONDS);
        if step > 0.0 {
            step
        } else {
            MAX_PASS_STEP_SECONDS
        }
    }

    /// Number of search steps needed to cover the window
    pub fn step_count(&self, step_seconds: f64) -> f64 {
        (self.duration_seconds() / step_seconds).ceil()
    }

    pub fn validate(&self) -> Result<(), PredictionError> {
        if !self.duration_minutes.is_finite() || self.duration_minutes <= 0.0 {
            return Err(PredictionError::InvalidPassWindow {
                message: format!("duration {} min must be positive", self.duration_minutes),
            });
        }
        if !self.min_elevation.is_finite() || self.min_elevation.abs() > 90.0 {
            return Err(PredictionError::InvalidPassWindow {
                message: format!("elevation mask {} is outside [-90, 90]", self.min_elevation),
            });
        }
        Ok(())
    }
}

/// One visibility interval over a station
///
/// Times are seconds after the sample instant. AOS is the first search
/// sample at or above the mask and LOS the first one below it, or the end of
/// the window for a pass still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    pub aos_seconds: f64,
    pub los_seconds: f64,
    pub max_elevation: f64,
    pub max_elevation_seconds: f64,
    pub duration_seconds: f64,
    pub aos_azimuth: f64,
    pub los_azimuth: f64,
}

impl Pass {
    fn open(t: f64, angles: &LookAngles) -> Self {
        Self {
            aos_seconds: t,
            los_seconds: t,
            max_elevation: angles.elevation,
            max_elevation_seconds: t,
            duration_seconds: 0.0,
            aos_azimuth: angles.azimuth,
            los_azimuth: angles.azimuth,
        }
    }

    fn close(mut self, t: f64, angles: &LookAngles) -> Self {
        self.los_seconds = t;
        self.los_azimuth = angles.azimuth;
        self.duration_seconds = t - self.aos_seconds;
        self
    }
}

/// Scan `model` across `window` in steps of `step_seconds`
///
/// The final sample sits exactly on the end of the window. A NaN elevation
/// counts as below the mask.
pub fn find_passes(
    model: &dyn TrackModel,
    step_seconds: f64,
    station: &GroundStation,
    window: &PassWindow,
) -> Vec<Pass> {
    let end = window.duration_seconds();
    let steps = window.step_count(step_seconds) as u64;

    let mut passes = Vec::new();
    let mut current: Option<Pass> = None;
    let mut last = None;

    for i in 0..=steps {
        let t = (i as f64 * step_seconds).min(end);
        let angles = station.look_angles(&model.position_at(t));
        let visible = angles.elevation >= window.min_elevation;

        current = match (current, visible) {
            (None, true) => Some(Pass::open(t, &angles)),
            (Some(mut pass), true) => {
                if angles.elevation > pass.max_elevation {
                    pass.max_elevation = angles.elevation;
                    pass.max_elevation_seconds = t;
                }
                Some(pass)
            }
            (Some(pass), false) => {
                passes.push(pass.close(t, &angles));
                None
            }
            (None, false) => None,
        };
        last = Some((t, angles));
    }

    // Pass still in progress when the window ends
    if let (Some(pass), Some((t, angles))) = (current, last) {
        passes.push(pass.close(t, &angles));
    }

    log::debug!(
        "Pass search: {} steps of {:.1} s, {} pass(es) above {}°",
        steps,
        step_seconds,
        passes.len(),
        window.min_elevation
    );

    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::settings::PlaneModel;
    use crate::propagation::state::{derive, StateSample};

    const ALTITUDE_M: f64 = 400_000.0;

    fn iss_sample() -> StateSample {
        StateSample::from_km(
            Vector3::new(6771.0, 0.0, 0.0),
            Vector3::new(0.0, 7.66, 0.0),
            400.0,
            0.0,
            0.0,
        )
    }

    #[test]
    fn test_look_angles_overhead() {
        let station = GroundStation::new(0.0, 0.0, 0.0);
        let satellite = Vector3::new(EARTH_RADIUS_M + ALTITUDE_M, 0.0, 0.0);
        let angles = station.look_angles(&satellite);
        assert!((angles.elevation - 90.0).abs() < 1e-9);
        assert!((angles.range_m - ALTITUDE_M).abs() < 1e-6);
    }

    #[test]
    fn test_look_angles_azimuth() {
        let station = GroundStation::new(0.0, 0.0, 0.0);
        let r = EARTH_RADIUS_M + ALTITUDE_M;

        let east = station.look_angles(&Vector3::new(r, 500_000.0, 0.0));
        assert!((east.azimuth - 90.0).abs() < 1e-9, "azimuth {}", east.azimuth);
        assert!(east.elevation > 0.0);

        let north = station.look_angles(&Vector3::new(r, 0.0, 500_000.0));
        assert!(north.azimuth.abs() < 1e-9, "azimuth {}", north.azimuth);

        let west = station.look_angles(&Vector3::new(r, -500_000.0, 0.0));
        assert!((west.azimuth - 270.0).abs() < 1e-9, "azimuth {}", west.azimuth);

        let far_side = station.look_angles(&Vector3::new(-r, 0.0, 0.0));
        assert!(far_side.elevation < -80.0);
    }

    #[test]
    fn test_station_position_on_sphere() {
        let station = GroundStation::new(45.0, -90.0, 1000.0);
        let position = station.position();
        assert!((position.norm() - (EARTH_RADIUS_M + 1000.0)).abs() < 1e-6);
        assert!(position.y < 0.0);
        assert!((position.z - position.y.abs()).abs() < 1e-6);
    }

    #[test]
    fn test_step_seconds() {
        let window = PassWindow::default();
        assert_eq!(window.step_seconds(5545.0), MAX_PASS_STEP_SECONDS);
        assert!((window.step_seconds(1200.0) - 100.0).abs() < 1e-12);
        assert_eq!(window.step_seconds(f64::NAN), MAX_PASS_STEP_SECONDS);
        assert_eq!(window.step_seconds(0.0), MAX_PASS_STEP_SECONDS);
        assert_eq!(window.step_count(300.0), 864.0);
    }

    #[test]
    fn test_iss_passes_over_equatorial_station() {
        let derived = derive(&iss_sample());
        let model = derived.branch().create_model(&derived, PlaneModel::Equatorial);
        let station = GroundStation::new(0.0, 0.0, 0.0);
        let window = PassWindow::default();
        let step = window.step_seconds(derived.period);

        let passes = find_passes(model.as_ref(), step, &station, &window);

        // Once per revolution over 3 days
        assert_eq!(passes.len(), 47);

        let first = &passes[0];
        assert_eq!(first.aos_seconds, 0.0);
        assert_eq!(first.max_elevation_seconds, 0.0);
        assert!(first.max_elevation > 89.9);

        for pass in &passes {
            assert!(pass.max_elevation >= window.min_elevation);
            assert!(pass.max_elevation <= 90.0 + 1e-9);
            assert!(pass.duration_seconds > 0.0);
            assert!(pass.duration_seconds < derived.period);
            assert!(pass.los_seconds <= window.duration_seconds());
            assert!(pass.max_elevation_seconds >= pass.aos_seconds);
            assert!(pass.max_elevation_seconds < pass.los_seconds);
        }

        for pair in passes.windows(2) {
            let spacing = pair[1].aos_seconds - pair[0].aos_seconds;
            assert!((spacing - derived.period).abs() <= 2.0 * step, "spacing {}", spacing);
        }
    }

    #[test]
    fn test_pass_open_at_window_end() {
        let derived = derive(&iss_sample());
        let model = derived.branch().create_model(&derived, PlaneModel::Equatorial);
        let station = GroundStation::new(0.0, 0.0, 0.0);
        let window = PassWindow {
            duration_minutes: 1.0,
            min_elevation: DEFAULT_MIN_ELEVATION_DEG,
        };

        let passes = find_passes(model.as_ref(), 300.0, &station, &window);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].aos_seconds, 0.0);
        assert_eq!(passes[0].los_seconds, 60.0);
        assert_eq!(passes[0].duration_seconds, 60.0);
    }

    #[test]
    fn test_polar_station_never_sees_equatorial_orbit() {
        let derived = derive(&iss_sample());
        let model = derived.branch().create_model(&derived, PlaneModel::Equatorial);
        let station = GroundStation::new(90.0, 0.0, 0.0);
        let window = PassWindow::default();

        let passes = find_passes(model.as_ref(), 300.0, &station, &window);
        assert!(passes.is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(GroundStation::new(51.5, -0.1, 30.0).validate().is_ok());
        assert!(matches!(
            GroundStation::new(95.0, 0.0, 0.0).validate(),
            Err(PredictionError::InvalidStation { .. })
        ));
        assert!(GroundStation::new(0.0, f64::NAN, 0.0).validate().is_err());

        assert!(PassWindow::default().validate().is_ok());
        assert!(matches!(
            PassWindow::new(-1.0, 10.0).validate(),
            Err(PredictionError::InvalidPassWindow { .. })
        ));
        assert!(PassWindow::new(1.0, 120.0).validate().is_err());
    }
}
