use fxhash::FxHashMap;

use crate::{
    error::DispatchError,
    problem::location::{Location, LocationIdx},
};

/// Time in minutes since the start of the day.
pub type Minutes = f64;
pub type Cost = f64;

/// Travel-time service over the shared coordinate table.
///
/// Travel time is the euclidean distance divided by the courier speed,
/// rounded up to the next whole minute. The table is read-only once built.
#[derive(Debug, Clone)]
pub struct TravelTimes {
    locations: Vec<Location>,
    index_by_external_id: FxHashMap<String, LocationIdx>,
    meters_per_minute: f64,
}

impl TravelTimes {
    pub(crate) fn new(
        locations: Vec<Location>,
        meters_per_minute: f64,
    ) -> Result<Self, DispatchError> {
        if meters_per_minute.is_nan() || meters_per_minute <= 0.0 {
            return Err(DispatchError::InvalidConfiguration(format!(
                "meters_per_minute must be positive, got {meters_per_minute}"
            )));
        }

        let mut index_by_external_id =
            FxHashMap::with_capacity_and_hasher(locations.len(), Default::default());

        for (index, location) in locations.iter().enumerate() {
            let previous = index_by_external_id
                .insert(location.external_id().to_owned(), LocationIdx::new(index));
            if previous.is_some() {
                return Err(DispatchError::DuplicateId(location.external_id().to_owned()));
            }
        }

        Ok(Self {
            locations,
            index_by_external_id,
            meters_per_minute,
        })
    }

    #[inline]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> Minutes {
        if from == to {
            return 0.0;
        }

        let distance = self.locations[from].euclidean_distance(&self.locations[to]);
        (distance / self.meters_per_minute).ceil()
    }

    /// Travel time between two external location ids.
    pub fn travel_time_between(&self, from: &str, to: &str) -> Result<Minutes, DispatchError> {
        let from = self.location_idx(from)?;
        let to = self.location_idx(to)?;
        Ok(self.travel_time(from, to))
    }

    pub fn location_idx(&self, external_id: &str) -> Result<LocationIdx, DispatchError> {
        self.index_by_external_id
            .get(external_id)
            .copied()
            .ok_or_else(|| DispatchError::UnknownLocation(external_id.to_owned()))
    }

    pub fn location(&self, location_id: LocationIdx) -> &Location {
        &self.locations[location_id]
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn meters_per_minute(&self) -> f64 {
        self.meters_per_minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn travel_times() -> TravelTimes {
        TravelTimes::new(
            vec![
                Location::from_cartesian("r1", 0.0, 0.0),
                Location::from_cartesian("o1", 0.0, 10.0),
                Location::from_cartesian("o2", 3.0, 24.0),
                Location::from_cartesian("c1", 0.0, 0.0),
            ],
            10.0,
        )
        .unwrap()
    }

    #[test]
    fn test_travel_time_rounds_up() {
        let travel_times = travel_times();

        assert_eq!(travel_times.travel_time_between("r1", "o1").unwrap(), 1.0);
        // sqrt(9 + 576) / 10 = 2.418...
        assert_eq!(travel_times.travel_time_between("r1", "o2").unwrap(), 3.0);
        assert_eq!(travel_times.travel_time_between("r1", "c1").unwrap(), 0.0);
    }

    #[test]
    fn test_travel_time_is_symmetric() {
        let travel_times = travel_times();
        let ids = ["r1", "o1", "o2", "c1"];

        for from in ids {
            for to in ids {
                assert_eq!(
                    travel_times.travel_time_between(from, to).unwrap(),
                    travel_times.travel_time_between(to, from).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_unknown_location() {
        let travel_times = travel_times();

        assert_eq!(
            travel_times.travel_time_between("r1", "o9"),
            Err(DispatchError::UnknownLocation("o9".to_owned()))
        );
    }

    #[test]
    fn test_duplicate_location() {
        let result = TravelTimes::new(
            vec![
                Location::from_cartesian("x", 0.0, 0.0),
                Location::from_cartesian("x", 1.0, 0.0),
            ],
            10.0,
        );

        assert_eq!(result.unwrap_err(), DispatchError::DuplicateId("x".to_owned()));
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let result = TravelTimes::new(vec![Location::from_cartesian("x", 0.0, 0.0)], 0.0);

        assert!(matches!(
            result,
            Err(DispatchError::InvalidConfiguration(_))
        ));
    }
}
