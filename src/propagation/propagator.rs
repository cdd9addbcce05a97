//! Ground-track propagator
//!
//! Turns a derived state into an ordered sequence of sub-satellite points
//! across the prediction horizon.

use super::footprint::Footprint;
use super::ground_track::GroundTrackPoint;
use super::passes::{find_passes, GroundStation, Pass, PassWindow};
use super::settings::{time_step, PredictionSettings, MAX_STEPS};
use super::state::{DerivedState, StateSample};
use super::track_model::OrbitBranch;

/// Result of a full prediction
#[derive(Debug, Clone)]
pub struct PredictionResult {
    /// Quantities derived from the input sample
    pub derived: DerivedState,

    /// Approximation used for the track
    pub branch: OrbitBranch,

    /// Ordered track, `steps + 1` points starting at t = 0
    pub track: Vec<GroundTrackPoint>,

    /// Footprint at the sample instant
    pub footprint: Footprint,
}

/// Prediction error types
///
/// Only raised by the validating entry points; the numeric core never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Sample cannot be propagated (non-finite field, zero position)
    InvalidState { message: String },

    /// Horizon is not a finite number of minutes
    InvalidHorizon { minutes: f64 },

    /// More propagation steps than a single call will allocate
    TooManySteps { steps: u64, max: u32 },

    /// Ground station outside the valid coordinate ranges
    InvalidStation { message: String },

    /// Pass search window or elevation mask out of range
    InvalidPassWindow { message: String },
}

impl std::fmt::Display for PredictionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState { message } => {
                write!(f, "Invalid state: {}", message)
            }
            Self::InvalidHorizon { minutes } => {
                write!(f, "Invalid prediction horizon: {} minutes", minutes)
            }
            Self::TooManySteps { steps, max } => {
                write!(f, "Too many steps: {} (at most {})", steps, max)
            }
            Self::InvalidStation { message } => {
                write!(f, "Invalid ground station: {}", message)
            }
            Self::InvalidPassWindow { message } => {
                write!(f, "Invalid pass window: {}", message)
            }
        }
    }
}

impl std::error::Error for PredictionError {}

/// Ground-track propagator
///
/// Stateless between calls: every prediction returns a fresh track that
/// replaces whatever the caller held before.
#[derive(Debug, Clone, Default)]
pub struct GroundTrackPropagator {
    settings: PredictionSettings,
}

impl GroundTrackPropagator {
    /// Create a propagator with default settings (120 min, 100 steps)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom settings
    pub fn with_settings(settings: PredictionSettings) -> Self {
        Self { settings }
    }

    /// Get settings reference
    pub fn settings(&self) -> &PredictionSettings {
        &self.settings
    }

    /// Get mutable settings reference
    pub fn settings_mut(&mut self) -> &mut PredictionSettings {
        &mut self.settings
    }

    /// Derive the state for a sample using the configured semi-major axis model
    pub fn derive(&self, state: &StateSample) -> DerivedState {
        DerivedState::from_sample(state, self.settings.semi_major_axis)
    }

    /// Propagate a derived state over `horizon_minutes` in `steps` steps
    ///
    /// Always returns exactly `steps + 1` points in chronological order.
    pub fn propagate(
        &self,
        derived: &DerivedState,
        horizon_minutes: f64,
        steps: u32,
    ) -> Vec<GroundTrackPoint> {
        let branch = derived.branch();
        let model = branch.create_model(derived, self.settings.plane);
        let dt = time_step(horizon_minutes, steps);

        log::debug!(
            "Propagating {} steps over {} min (|e| = {:.5}, {} branch, {})",
            steps,
            horizon_minutes,
            derived.eccentricity,
            branch.name(),
            model.name()
        );

        let mut track = Vec::with_capacity(steps as usize + 1);
        for i in 0..=steps {
            let t = i as f64 * dt;
            let position = model.position_at(t);
            track.push(GroundTrackPoint::from_cartesian(&position, t));
        }

        track
    }

    /// Derive, propagate over the configured horizon and compute the footprint
    pub fn predict(&self, state: &StateSample) -> PredictionResult {
        let derived = self.derive(state);
        let track = self.propagate(&derived, self.settings.horizon_minutes, self.settings.steps);

        PredictionResult {
            branch: derived.branch(),
            derived,
            track,
            footprint: Footprint::for_sample(state),
        }
    }

    /// Like [`predict`](Self::predict), but rejects unusable input first
    pub fn predict_checked(
        &self,
        state: &StateSample,
    ) -> Result<PredictionResult, PredictionError> {
        if !self.settings.horizon_minutes.is_finite() {
            return Err(PredictionError::InvalidHorizon {
                minutes: self.settings.horizon_minutes,
            });
        }
        if self.settings.steps > MAX_STEPS {
            return Err(PredictionError::TooManySteps {
                steps: self.settings.steps as u64,
                max: MAX_STEPS,
            });
        }
        state.validate()?;
        Ok(self.predict(state))
    }

    /// Find passes of `state` over `station` within `window`
    ///
    /// The search follows the same track model as [`predict`](Self::predict)
    /// and steps at most five minutes, at least twelve times per revolution.
    pub fn find_passes(
        &self,
        state: &StateSample,
        station: &GroundStation,
        window: &PassWindow,
    ) -> Result<Vec<Pass>, PredictionError> {
        station.validate()?;
        window.validate()?;

        let derived = self.derive(state);
        let step = window.step_seconds(derived.period);
        let steps = window.step_count(step);
        if steps > MAX_STEPS as f64 {
            return Err(PredictionError::TooManySteps {
                steps: steps as u64,
                max: MAX_STEPS,
            });
        }

        let model = derived.branch().create_model(&derived, self.settings.plane);
        Ok(find_passes(model.as_ref(), step, station, window))
    }
}

/// Predict the ground track of `state` with the default approximations
///
/// `PredictionSettings::default()` carries the customary 120 minutes and
/// 100 steps.
pub fn predict_orbit(
    state: &StateSample,
    horizon_minutes: f64,
    steps: u32,
) -> Vec<GroundTrackPoint> {
    let propagator = GroundTrackPropagator::new();
    let derived = propagator.derive(state);
    propagator.propagate(&derived, horizon_minutes, steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::ground_track::unwrapped_longitude_span;
    use crate::propagation::settings::{PlaneModel, DEFAULT_HORIZON_MINUTES, DEFAULT_STEPS};
    use crate::propagation::state::derive;
    use nalgebra::Vector3;

    fn iss_sample() -> StateSample {
        StateSample::from_km(
            Vector3::new(6771.0, 0.0, 0.0),
            Vector3::new(0.0, 7.66, 0.0),
            400.0,
            0.0,
            0.0,
        )
    }

    fn eccentric_sample() -> StateSample {
        StateSample::from_km(
            Vector3::new(7000.0, 0.0, 0.0),
            Vector3::new(0.0, 8.5, 0.0),
            629.0,
            0.0,
            0.0,
        )
    }

    fn assert_bounded(track: &[GroundTrackPoint]) {
        for point in track {
            assert!(
                (-90.0..=90.0).contains(&point.latitude),
                "latitude {}",
                point.latitude
            );
            assert!(
                point.longitude > -180.0 && point.longitude <= 180.0,
                "longitude {}",
                point.longitude
            );
        }
    }

    #[test]
    fn test_length_is_steps_plus_one() {
        for steps in [0, 1, 2, 7, 100, 1000] {
            let circular = predict_orbit(&iss_sample(), 120.0, steps);
            assert_eq!(circular.len(), steps as usize + 1);

            let elliptical = predict_orbit(&eccentric_sample(), 120.0, steps);
            assert_eq!(elliptical.len(), steps as usize + 1);
        }
    }

    #[test]
    fn test_zero_steps_single_sample_at_epoch() {
        let track = predict_orbit(&iss_sample(), 120.0, 0);
        assert_eq!(track.len(), 1);
        assert_eq!(track[0].elapsed_seconds, 0.0);
        assert!(track[0].latitude.is_finite());
    }

    #[test]
    fn test_iss_scenario() {
        let state = iss_sample();
        let derived = derive(&state);
        assert!((derived.period - 5550.0).abs() < 20.0, "{}", derived.period);
        assert!(derived.eccentricity < 0.01);
        assert_eq!(derived.branch(), OrbitBranch::Circular);

        let track = predict_orbit(&state, DEFAULT_HORIZON_MINUTES, DEFAULT_STEPS);
        assert_eq!(track.len(), 101);

        // 7200 s over a ~5545 s period: more than one full revolution
        let span = unwrapped_longitude_span(&track);
        assert!(span > 360.0, "longitude span {}", span);
        assert!((span - 7200.0 / derived.period * 360.0).abs() < 1e-6);
        assert_bounded(&track);
    }

    #[test]
    fn test_circular_first_point_is_input_position() {
        // Circular speed, perpendicular to an off-axis position
        let position: Vector3<f64> = Vector3::new(-3000.0, 5200.0, 3100.0);
        let v_circ = (398600.4418 / position.norm()).sqrt();
        let direction: Vector3<f64> = Vector3::new(5200.0, 3000.0, 0.0);
        let velocity = direction.normalize() * v_circ;
        let state = StateSample::from_km(position, velocity, 385.0, 0.0, 0.0);
        let derived = derive(&state);
        assert_eq!(derived.branch(), OrbitBranch::Circular);

        let track = predict_orbit(&state, 120.0, 50);
        let expected = GroundTrackPoint::from_cartesian(&state.position(), 0.0);
        assert_eq!(track[0], expected);
    }

    #[test]
    fn test_branch_flip_is_deterministic() {
        // Radial velocity sets |e| directly on a circular-speed orbit
        let r = 6771.0;
        let v_circ = (398600.4418_f64 / r).sqrt();
        let state_with = |radial: f64| {
            StateSample::from_km(
                Vector3::new(r, 0.0, 0.0),
                Vector3::new(radial, v_circ, 0.0),
                400.0,
                0.0,
                0.0,
            )
        };

        let below = state_with(0.009 * v_circ);
        let above = state_with(0.011 * v_circ);
        for _ in 0..3 {
            assert_eq!(derive(&below).branch(), OrbitBranch::Circular);
            assert_eq!(derive(&above).branch(), OrbitBranch::Elliptical);
        }
        // Going back below the threshold after an elliptical call flips it back
        assert_eq!(derive(&below).branch(), OrbitBranch::Circular);
    }

    #[test]
    fn test_elliptical_equatorial_track_on_equator() {
        let track = predict_orbit(&eccentric_sample(), 120.0, 100);
        assert_eq!(track[0].latitude, 0.0);
        assert_eq!(track[0].longitude, 0.0);
        assert!(track.iter().all(|p| p.latitude == 0.0));
        assert_bounded(&track);
    }

    #[test]
    fn test_chronological_order() {
        let track = predict_orbit(&iss_sample(), 90.0, 30);
        for pair in track.windows(2) {
            assert!(pair[1].elapsed_seconds > pair[0].elapsed_seconds);
        }
        assert!((track[30].elapsed_seconds - 5400.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_horizon_runs_backwards() {
        let forward = predict_orbit(&iss_sample(), 30.0, 10);
        let backward = predict_orbit(&iss_sample(), -30.0, 10);
        assert_eq!(backward.len(), 11);
        assert!(backward[10].elapsed_seconds < 0.0);
        assert!((forward[10].longitude + backward[10].longitude).abs() < 1e-9);
    }

    #[test]
    fn test_orbital_plane_keeps_inclination() {
        let inclination = 51.6_f64.to_radians();
        let state = StateSample::from_km(
            Vector3::new(6771.0, 0.0, 0.0),
            Vector3::new(0.0, 7.66 * inclination.cos(), 7.66 * inclination.sin()),
            400.0,
            0.0,
            0.0,
        );

        let flat = GroundTrackPropagator::new().predict(&state);
        assert!(flat.track.iter().all(|p| p.latitude.abs() < 1e-9));

        let settings = PredictionSettings::default().with_plane(PlaneModel::Orbital);
        let result = GroundTrackPropagator::with_settings(settings).predict(&state);
        let max_lat = result
            .track
            .iter()
            .map(|p| p.latitude.abs())
            .fold(0.0_f64, f64::max);
        assert!(max_lat > 50.0 && max_lat <= 51.7, "max latitude {}", max_lat);
        assert_bounded(&result.track);
    }

    #[test]
    fn test_predict_bundles_footprint_and_branch() {
        let propagator = GroundTrackPropagator::new();
        let result = propagator.predict(&iss_sample());
        assert_eq!(result.branch, OrbitBranch::Circular);
        assert_eq!(result.track.len(), DEFAULT_STEPS as usize + 1);
        assert!(result.footprint.radius_m > 3.0e6);
    }

    #[test]
    fn test_predict_replaces_previous_output() {
        let propagator = GroundTrackPropagator::new();
        let first = propagator.predict(&iss_sample());
        let second = propagator.predict(&eccentric_sample());
        let again = propagator.predict(&iss_sample());
        assert_ne!(first.track, second.track);
        assert_eq!(first.track, again.track);
    }

    #[test]
    fn test_predict_checked() {
        let propagator = GroundTrackPropagator::new();
        assert!(propagator.predict_checked(&iss_sample()).is_ok());

        let mut zero = iss_sample();
        zero.position_x = 0.0;
        assert!(matches!(
            propagator.predict_checked(&zero),
            Err(PredictionError::InvalidState { .. })
        ));

        let mut bad_horizon = GroundTrackPropagator::new();
        bad_horizon.settings_mut().horizon_minutes = f64::INFINITY;
        let err = bad_horizon.predict_checked(&iss_sample()).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidHorizon { .. }));
        assert!(err.to_string().contains("horizon"));
    }

    #[test]
    fn test_predict_checked_rejects_huge_step_count() {
        let mut propagator = GroundTrackPropagator::new();
        propagator.settings_mut().steps = MAX_STEPS;
        assert!(propagator.predict_checked(&iss_sample()).is_ok());

        propagator.settings_mut().steps = u32::MAX;
        let err = propagator.predict_checked(&iss_sample()).unwrap_err();
        assert_eq!(
            err,
            PredictionError::TooManySteps {
                steps: u32::MAX as u64,
                max: MAX_STEPS
            }
        );
    }

    #[test]
    fn test_find_passes_over_station() {
        let propagator = GroundTrackPropagator::new();
        let station = GroundStation::new(0.0, 0.0, 0.0);
        let window = PassWindow::new(1.0, 10.0);

        let passes = propagator
            .find_passes(&iss_sample(), &station, &window)
            .unwrap();
        // One day over a ~92 minute orbit
        assert_eq!(passes.len(), 16);
        assert_eq!(passes[0].aos_seconds, 0.0);

        let inclined = GroundTrackPropagator::with_settings(PredictionSettings::physical());
        let passes = inclined
            .find_passes(&iss_sample(), &station, &window)
            .unwrap();
        assert_eq!(passes.len(), 16);
    }

    #[test]
    fn test_find_passes_validates_inputs() {
        let propagator = GroundTrackPropagator::new();
        let station = GroundStation::new(0.0, 0.0, 0.0);

        let south_of_pole = GroundStation::new(-91.0, 0.0, 0.0);
        let err = propagator
            .find_passes(&iss_sample(), &south_of_pole, &PassWindow::default())
            .unwrap_err();
        assert!(matches!(err, PredictionError::InvalidStation { .. }));

        let err = propagator
            .find_passes(&iss_sample(), &station, &PassWindow::new(0.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, PredictionError::InvalidPassWindow { .. }));

        let err = propagator
            .find_passes(&iss_sample(), &station, &PassWindow::new(1.0e6, 10.0))
            .unwrap_err();
        assert!(matches!(err, PredictionError::TooManySteps { .. }));
    }
}
