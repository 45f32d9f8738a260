//! Geographic primitives: coordinates, great-circle distance and map bounds.

use serde::{Deserialize, Serialize};

use crate::CafeFinderError;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Builds a point without range checks.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a point, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// - `CafeFinderError::InvalidCoordinates` - Latitude outside [-90, 90],
    ///   longitude outside [-180, 180], or either value NaN/infinite
    pub fn validated(lat: f64, lng: f64) -> Result<Self, CafeFinderError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CafeFinderError::InvalidCoordinates {
                reason: format!("non-finite value ({lat}, {lng})"),
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CafeFinderError::InvalidCoordinates {
                reason: format!("latitude {lat} outside [-90, 90]"),
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CafeFinderError::InvalidCoordinates {
                reason: format!("longitude {lng} outside [-180, 180]"),
            });
        }
        Ok(Self { lat, lng })
    }

    /// Haversine distance to `other` in metres.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_distance(*self, *other)
    }

    /// Point shifted by the given number of degrees on each axis.
    ///
    /// Latitude stops at the poles; longitude wraps across the antimeridian
    /// into `[-180, 180)`.
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        Self {
            lat: (self.lat + dlat).clamp(-90.0, 90.0),
            lng: (self.lng + dlng + 180.0).rem_euclid(360.0) - 180.0,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Great-circle distance between two points in metres.
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Rectangular map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Inclusive containment test.
    pub fn contains(&self, point: Coordinates) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng <= self.east
            && point.lng >= self.west
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);
    const LONDON: Coordinates = Coordinates::new(51.5074, -0.1278);

    #[test]
    fn test_known_distance() {
        let d = haversine_distance(PARIS, LONDON);
        // ~343.5 km
        assert!((d - 343_500.0).abs() < 1_000.0, "got {d}");
    }

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_distance(PARIS, PARIS), 0.0);
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        assert!(Coordinates::validated(91.0, 0.0).is_err());
        assert!(Coordinates::validated(0.0, -180.5).is_err());
        assert!(Coordinates::validated(f64::NAN, 0.0).is_err());
        assert!(Coordinates::validated(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_offset_stays_on_the_globe() {
        let corner = Coordinates::new(89.999, 179.999).offset(0.004, 0.004);
        assert_eq!(corner.lat, 90.0);
        assert!((corner.lng + 179.997).abs() < 1e-9, "{}", corner.lng);
        assert!(Coordinates::validated(corner.lat, corner.lng).is_ok());

        let south_west = Coordinates::new(-89.999, -179.999).offset(-0.004, -0.004);
        assert_eq!(south_west.lat, -90.0);
        assert!((south_west.lng - 179.997).abs() < 1e-9, "{}", south_west.lng);

        let paris = Coordinates::new(48.8566, 2.3522).offset(0.001, -0.001);
        assert!((paris.lat - 48.8576).abs() < 1e-9);
        assert!((paris.lng - 2.3512).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = Bounds {
            north: 49.0,
            south: 48.0,
            east: 3.0,
            west: 2.0,
        };
        assert!(bounds.contains(PARIS));
        assert!(bounds.contains(Coordinates::new(49.0, 2.0)));
        assert!(!bounds.contains(LONDON));
    }

    fn coordinates() -> impl Strategy<Value = Coordinates> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in coordinates(), b in coordinates()) {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_is_bounded(a in coordinates(), b in coordinates()) {
            let d = haversine_distance(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }

        #[test]
        fn prop_offset_is_valid(
            from in coordinates(),
            dlat in -1.0f64..1.0,
            dlng in -1.0f64..1.0,
        ) {
            let to = from.offset(dlat, dlng);
            prop_assert!(Coordinates::validated(to.lat, to.lng).is_ok());
        }
    }
}
