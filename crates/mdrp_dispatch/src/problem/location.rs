use geo::{Distance, Euclidean};

use crate::define_index_newtype;

define_index_newtype!(LocationIdx, Location);

/// A point of the shared coordinate table. Orders, restaurants and couriers
/// all register their position here under their external id.
#[derive(Debug, Clone)]
pub struct Location {
    external_id: String,
    point: geo::Point,
}

impl Location {
    pub fn from_cartesian(external_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            external_id: external_id.into(),
            point: geo::Point::new(x, y),
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    /// Straight-line distance in meters.
    pub fn euclidean_distance(&self, to: &Location) -> f64 {
        Euclidean.distance(self.point, to.point)
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance() {
        let a = Location::from_cartesian("a", 0.0, 0.0);
        let b = Location::from_cartesian("b", 30.0, 40.0);

        assert_eq!(a.euclidean_distance(&b), 50.0);
        assert_eq!(b.euclidean_distance(&a), 50.0);
    }
}
