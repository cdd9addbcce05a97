//! Closed-form orbit models used to place the satellite along its track
//!
//! Propagation picks one of two approximations from the eccentricity:
//!
//! - **CircularTrack**: rigid rotation of the current position vector
//! - **EllipticalTrack**: conic radius with a first-order equation of center
//!
//! Neither integrates the equations of motion. Both are cheap enough to
//! evaluate a few hundred times per frame.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::settings::PlaneModel;
use super::state::DerivedState;

/// Eccentricity below which the orbit is treated as circular
pub const CIRCULAR_ECCENTRICITY_THRESHOLD: f64 = 0.01;

/// Smallest vector norm treated as a usable direction
const MIN_AXIS_NORM: f64 = 1e-9;

/// Which approximation a prediction used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbitBranch {
    Circular,
    Elliptical,
}

impl OrbitBranch {
    /// Hard threshold on |e|, no hysteresis
    ///
    /// A NaN eccentricity fails the comparison and selects `Elliptical`.
    pub fn select(eccentricity: f64) -> Self {
        if eccentricity < CIRCULAR_ECCENTRICITY_THRESHOLD {
            Self::Circular
        } else {
            Self::Elliptical
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Circular => "Circular",
            Self::Elliptical => "Elliptical",
        }
    }

    pub fn all() -> &'static [OrbitBranch] {
        &[OrbitBranch::Circular, OrbitBranch::Elliptical]
    }

    /// Build the track model for this branch
    pub fn create_model(&self, derived: &DerivedState, plane: PlaneModel) -> Box<dyn TrackModel> {
        match self {
            Self::Circular => Box::new(CircularTrack::new(derived, plane)),
            Self::Elliptical => Box::new(EllipticalTrack::new(derived, plane)),
        }
    }
}

/// Trait for closed-form track models
pub trait TrackModel: Send + Sync {
    /// Cartesian position (meters) `elapsed` seconds after the sample
    fn position_at(&self, elapsed: f64) -> Vector3<f64>;

    /// Branch this model implements
    fn branch(&self) -> OrbitBranch;

    /// Model name
    fn name(&self) -> &'static str;
}

/// Rigid rotation of the current position at a uniform angular rate
pub struct CircularTrack {
    position: Vector3<f64>,
    period: f64,
    /// Rotation axis; `None` means the frame z axis (xy rotation)
    axis: Option<Unit<Vector3<f64>>>,
}

impl CircularTrack {
    pub fn new(derived: &DerivedState, plane: PlaneModel) -> Self {
        let axis = match plane {
            PlaneModel::Equatorial => None,
            PlaneModel::Orbital => {
                let axis = Unit::try_new(derived.angular_momentum, MIN_AXIS_NORM);
                if axis.is_none() {
                    log::debug!("Angular momentum is degenerate, rotating about the z axis");
                }
                axis
            }
        };

        Self {
            position: derived.position,
            period: derived.period,
            axis,
        }
    }

    /// Rotation angle after `elapsed` seconds
    pub fn angle_at(&self, elapsed: f64) -> f64 {
        (elapsed / self.period) * 2.0 * PI
    }
}

impl TrackModel for CircularTrack {
    fn position_at(&self, elapsed: f64) -> Vector3<f64> {
        let angle = self.angle_at(elapsed);
        match &self.axis {
            Some(axis) => Rotation3::from_axis_angle(axis, angle) * self.position,
            None => {
                // x/y rotate, z is held
                let (sin, cos) = angle.sin_cos();
                Vector3::new(
                    self.position.x * cos - self.position.y * sin,
                    self.position.x * sin + self.position.y * cos,
                    self.position.z,
                )
            }
        }
    }

    fn branch(&self) -> OrbitBranch {
        OrbitBranch::Circular
    }

    fn name(&self) -> &'static str {
        "Circular rotation"
    }
}

/// Conic-section track with an approximate true anomaly
///
/// True anomaly uses the first-order equation of center
/// `ν ≈ M + 2e·sin M` rather than solving Kepler's equation.
pub struct EllipticalTrack {
    eccentricity: f64,
    semi_latus_rectum: f64,
    mean_motion: f64,
    /// Mean anomaly at the sample instant
    mean_anomaly_epoch: f64,
    /// Perifocal (PQW) to inertial; `None` keeps perifocal coordinates as-is
    perifocal_to_inertial: Option<Matrix3<f64>>,
}

impl EllipticalTrack {
    pub fn new(derived: &DerivedState, plane: PlaneModel) -> Self {
        let eccentricity = derived.eccentricity;

        let (perifocal_to_inertial, mean_anomaly_epoch) = match plane {
            // Perigee on the x axis at t = 0, orbit in the xy-plane
            PlaneModel::Equatorial => (None, 0.0),
            PlaneModel::Orbital => match perifocal_basis(derived) {
                Some(basis) => {
                    let nu0 = current_true_anomaly(derived);
                    (Some(basis), mean_anomaly_from_true(nu0, eccentricity))
                }
                None => {
                    log::debug!("Perifocal basis is degenerate, keeping the xy-plane");
                    (None, 0.0)
                }
            },
        };

        Self {
            eccentricity,
            semi_latus_rectum: derived.semi_latus_rectum(),
            mean_motion: derived.mean_motion(),
            mean_anomaly_epoch,
            perifocal_to_inertial,
        }
    }

    /// Mean anomaly after `elapsed` seconds
    pub fn mean_anomaly_at(&self, elapsed: f64) -> f64 {
        self.mean_anomaly_epoch + self.mean_motion * elapsed
    }

    /// Approximate true anomaly after `elapsed` seconds
    pub fn true_anomaly_at(&self, elapsed: f64) -> f64 {
        let mean_anomaly = self.mean_anomaly_at(elapsed);
        mean_anomaly + 2.0 * self.eccentricity * mean_anomaly.sin()
    }

    /// Orbital radius (meters) at true anomaly `nu`
    pub fn radius_at(&self, nu: f64) -> f64 {
        self.semi_latus_rectum * (1.0 / (1.0 + self.eccentricity * nu.cos()))
    }
}

impl TrackModel for EllipticalTrack {
    fn position_at(&self, elapsed: f64) -> Vector3<f64> {
        let nu = self.true_anomaly_at(elapsed);
        let r = self.radius_at(nu);
        let (sin_nu, cos_nu) = nu.sin_cos();
        let perifocal = Vector3::new(r * cos_nu, r * sin_nu, 0.0);

        match &self.perifocal_to_inertial {
            Some(basis) => basis * perifocal,
            None => perifocal,
        }
    }

    fn branch(&self) -> OrbitBranch {
        OrbitBranch::Elliptical
    }

    fn name(&self) -> &'static str {
        "Elliptical equation of center"
    }
}

/// PQW basis as matrix columns: P toward perigee, W along h, Q = W × P
fn perifocal_basis(derived: &DerivedState) -> Option<Matrix3<f64>> {
    let p = Unit::try_new(derived.eccentricity_vector, MIN_AXIS_NORM)?.into_inner();
    let w = Unit::try_new(derived.angular_momentum, MIN_AXIS_NORM)?.into_inner();
    let q = w.cross(&p);
    Some(Matrix3::from_columns(&[p, q, w]))
}

/// True anomaly of the sample itself, in [0, 2π)
fn current_true_anomaly(derived: &DerivedState) -> f64 {
    let e_hat = derived.eccentricity_vector / derived.eccentricity;
    let r_hat = derived.position / derived.radius;
    let nu = e_hat.dot(&r_hat).clamp(-1.0, 1.0).acos();

    // Moving away from perigee when r · v > 0
    if derived.position.dot(&derived.velocity) < 0.0 {
        2.0 * PI - nu
    } else {
        nu
    }
}

/// Invert `ν = M + 2e·sin M` with a few Newton iterations
fn mean_anomaly_from_true(nu: f64, eccentricity: f64) -> f64 {
    let mut m = nu;
    for _ in 0..20 {
        let f = m + 2.0 * eccentricity * m.sin() - nu;
        let df = 1.0 + 2.0 * eccentricity * m.cos();
        if df.abs() < 1e-12 {
            break;
        }
        let delta = f / df;
        m -= delta;
        if delta.abs() < 1e-14 {
            break;
        }
    }
    m
}
