//! Configuration for ground-track prediction
//!
//! The defaults are the cheap approximations a map overlay needs. The two
//! model selectors switch on the physically better alternatives individually.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default prediction horizon in minutes
pub const DEFAULT_HORIZON_MINUTES: f64 = 120.0;

/// Default number of propagation steps (the track holds `steps + 1` points)
pub const DEFAULT_STEPS: u32 = 100;

/// Largest step count the validating entry points accept
pub const MAX_STEPS: u32 = 1_000_000;

/// How the semi-major axis (and therefore the period) is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SemiMajorAxisModel {
    /// `a = R_earth + altitude`, exact only for circular orbits
    AltitudeProxy,
    /// `a = -μ / 2ε` from the specific orbital energy
    VisViva,
}

impl SemiMajorAxisModel {
    /// Display name for the model
    pub fn name(&self) -> &'static str {
        match self {
            Self::AltitudeProxy => "Altitude proxy",
            Self::VisViva => "Vis-viva energy",
        }
    }

    /// Short description of when to use this model
    pub fn description(&self) -> &'static str {
        match self {
            Self::AltitudeProxy => "Treats the current altitude as a circular radius. Cheap, fine for near-circular orbits.",
            Self::VisViva => "Derives the semi-major axis from position and speed. Correct period for eccentric orbits.",
        }
    }

    /// All available models
    pub fn all() -> &'static [SemiMajorAxisModel] {
        &[SemiMajorAxisModel::AltitudeProxy, SemiMajorAxisModel::VisViva]
    }
}

/// Orientation assumed for the orbital plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlaneModel {
    /// Orbit lies in the frame's xy-plane (drops inclination)
    Equatorial,
    /// Orbit lies in the plane normal to the angular momentum vector
    Orbital,
}

impl PlaneModel {
    /// Display name for the model
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equatorial => "Equatorial plane",
            Self::Orbital => "True orbital plane",
        }
    }

    /// Short description of when to use this model
    pub fn description(&self) -> &'static str {
        match self {
            Self::Equatorial => "Rotates about the frame z axis. Cheap, but every track hugs the equator.",
            Self::Orbital => "Rotates about h and maps perifocal coordinates through the PQW basis. Keeps inclination.",
        }
    }

    /// All available plane models
    pub fn all() -> &'static [PlaneModel] {
        &[PlaneModel::Equatorial, PlaneModel::Orbital]
    }
}

/// Prediction settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSettings {
    /// How far ahead to predict, in minutes (negative runs backwards)
    pub horizon_minutes: f64,

    /// Number of steps across the horizon
    pub steps: u32,

    pub semi_major_axis: SemiMajorAxisModel,

    pub plane: PlaneModel,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            horizon_minutes: DEFAULT_HORIZON_MINUTES,
            steps: DEFAULT_STEPS,
            semi_major_axis: SemiMajorAxisModel::AltitudeProxy,
            plane: PlaneModel::Equatorial,
        }
    }
}

impl PredictionSettings {
    /// Cheapest approximations (same as `Default`)
    pub fn fast() -> Self {
        Self::default()
    }

    /// Energy-based period and true orbital plane
    pub fn physical() -> Self {
        Self {
            semi_major_axis: SemiMajorAxisModel::VisViva,
            plane: PlaneModel::Orbital,
            ..Default::default()
        }
    }

    /// With a different horizon and step count
    pub fn with_horizon(mut self, horizon_minutes: f64, steps: u32) -> Self {
        self.horizon_minutes = horizon_minutes;
        self.steps = steps;
        self
    }

    pub fn with_semi_major_axis(mut self, model: SemiMajorAxisModel) -> Self {
        self.semi_major_axis = model;
        self
    }

    pub fn with_plane(mut self, plane: PlaneModel) -> Self {
        self.plane = plane;
        self
    }

    /// Seconds between consecutive samples
    ///
    /// Zero steps means a single sample at t = 0.
    pub fn time_step(&self) -> f64 {
        time_step(self.horizon_minutes, self.steps)
    }

    /// Horizon in seconds
    pub fn horizon_seconds(&self) -> f64 {
        self.horizon_minutes * 60.0
    }
}

pub(crate) fn time_step(horizon_minutes: f64, steps: u32) -> f64 {
    if steps == 0 {
        0.0
    } else {
        horizon_minutes * 60.0 / steps as f64
    }
}
