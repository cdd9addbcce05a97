//! Ground track points and geodetic conversion

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One predicted sub-satellite point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTrackPoint {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, (-180, 180]
    pub longitude: f64,
    /// Seconds after the sample instant
    pub elapsed_seconds: f64,
}

impl GroundTrackPoint {
    /// Convert a Cartesian position to a sub-satellite point
    ///
    /// Spherical conversion: `lat = asin(z/r)`, `lon = atan2(y, x)`. No Earth
    /// rotation or flattening is applied.
    pub fn from_cartesian(position: &Vector3<f64>, elapsed_seconds: f64) -> Self {
        let r = position.norm();
        let latitude = (position.z / r).asin().to_degrees();
        let longitude = normalize_longitude(position.y.atan2(position.x).to_degrees());

        Self {
            latitude,
            longitude,
            elapsed_seconds,
        }
    }

    /// `[lat, lon]` pair, the order map polylines expect
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Fold a longitude in [-180, 180] into (-180, 180]
#[inline]
pub fn normalize_longitude(longitude: f64) -> f64 {
    if longitude <= -180.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

/// Total longitude travelled along a track, ignoring the ±180° seam
///
/// Each step is taken as the shortest signed difference, so the result keeps
/// counting past one full revolution.
pub fn unwrapped_longitude_span(track: &[GroundTrackPoint]) -> f64 {
    track
        .windows(2)
        .map(|pair| {
            let mut delta = pair[1].longitude - pair[0].longitude;
            if delta > 180.0 {
                delta -= 360.0;
            } else if delta <= -180.0 {
                delta += 360.0;
            }
            delta
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_directions() {
        let east = GroundTrackPoint::from_cartesian(&Vector3::new(0.0, 7e6, 0.0), 0.0);
        assert!(east.latitude.abs() < 1e-12);
        assert!((east.longitude - 90.0).abs() < 1e-12);

        let pole = GroundTrackPoint::from_cartesian(&Vector3::new(0.0, 0.0, 7e6), 0.0);
        assert!((pole.latitude - 90.0).abs() < 1e-12);

        let south = GroundTrackPoint::from_cartesian(&Vector3::new(1.0, 0.0, -1.0), 0.0);
        assert!((south.latitude + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_is_positive() {
        let west = GroundTrackPoint::from_cartesian(&Vector3::new(-7e6, -0.0, 0.0), 0.0);
        assert_eq!(west.longitude, 180.0);

        let also_west = GroundTrackPoint::from_cartesian(&Vector3::new(-7e6, 0.0, 0.0), 0.0);
        assert_eq!(also_west.longitude, 180.0);
    }

    #[test]
    fn test_lat_lon_order() {
        let point = GroundTrackPoint {
            latitude: 12.5,
            longitude: -45.0,
            elapsed_seconds: 60.0,
        };
        assert_eq!(point.lat_lon(), [12.5, -45.0]);
    }

    #[test]
    fn test_unwrapped_span_crosses_seam() {
        let track: Vec<GroundTrackPoint> = [170.0, 179.0, -172.0, -160.0]
            .iter()
            .enumerate()
            .map(|(i, &lon)| GroundTrackPoint {
                latitude: 0.0,
                longitude: lon,
                elapsed_seconds: i as f64,
            })
            .collect();
        assert!((unwrapped_longitude_span(&track) - 30.0).abs() < 1e-9);
        assert_eq!(unwrapped_longitude_span(&track[..1]), 0.0);
    }
}
