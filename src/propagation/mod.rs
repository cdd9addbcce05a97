//! Ground-track prediction
//!
//! Predicts where a satellite will pass over the Earth from a single state
//! vector, using closed-form approximations instead of numerical integration.
//!
//! ## Pipeline
//!
//! - `state`: raw [`StateSample`] → SI [`DerivedState`] (period, h, e)
//! - `track_model`: circular or elliptical approximation, picked by |e|
//! - `propagator`: samples the model into an ordered [`GroundTrackPoint`] list
//! - `footprint`: visibility radius at the current altitude
//! - `passes`: rise and set times over a ground station
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use orbitcast::propagation::{compute_footprint_radius, predict_orbit, StateSample};
//!
//! let iss = StateSample::from_km(
//!     Vector3::new(6771.0, 0.0, 0.0),
//!     Vector3::new(0.0, 7.66, 0.0),
//!     400.0,
//!     0.0,
//!     0.0,
//! );
//!
//! let track = predict_orbit(&iss, 120.0, 100);
//! assert_eq!(track.len(), 101);
//!
//! let radius_m = compute_footprint_radius(iss.altitude);
//! assert!(radius_m > 3.0e6);
//! ```

mod footprint;
mod ground_track;
mod passes;
mod propagator;
mod settings;
mod state;
mod track_model;

pub use footprint::{compute_footprint_radius, Footprint, METERS_PER_DEGREE};
pub use ground_track::{normalize_longitude, unwrapped_longitude_span, GroundTrackPoint};
pub use passes::{
    find_passes, GroundStation, LookAngles, Pass, PassWindow, DEFAULT_MIN_ELEVATION_DEG,
    DEFAULT_PASS_DAYS, MAX_PASS_STEP_SECONDS,
};
pub use propagator::{predict_orbit, GroundTrackPropagator, PredictionError, PredictionResult};
pub use settings::{
    PlaneModel, PredictionSettings, SemiMajorAxisModel, DEFAULT_HORIZON_MINUTES, DEFAULT_STEPS,
    MAX_STEPS,
};
pub use state::{
    altitude_semi_major_axis, derive, orbital_period, DerivedState, StateSample, EARTH_RADIUS_KM,
    EARTH_RADIUS_M, MU_EARTH,
};
pub use track_model::{
    CircularTrack, EllipticalTrack, OrbitBranch, TrackModel, CIRCULAR_ECCENTRICITY_THRESHOLD,
};
