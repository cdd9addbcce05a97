//! orbitcast - satellite ground-track prediction
//!
//! Predicts a satellite's future sub-satellite points and its visibility
//! footprint from a single position/velocity sample, for drawing a projected
//! orbit path and sensor circle on a map.

pub mod data;
pub mod propagation;
pub mod report;

pub use propagation::{
    compute_footprint_radius, derive, predict_orbit, DerivedState, Footprint, GroundTrackPoint,
    GroundStation, GroundTrackPropagator, Pass, PassWindow, PredictionError, PredictionSettings,
    StateSample,
};
