use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{location::LocationIdx, restaurant::RestaurantIdx, travel_times::Minutes},
};

define_index_newtype!(OrderIdx, Order);

#[derive(Serialize, Debug, Clone)]
pub struct Order {
    external_id: String,
    location_id: LocationIdx,
    restaurant_id: RestaurantIdx,
    placement_time: Minutes,
    ready_time: Minutes,
}

impl Order {
    pub fn new(
        external_id: impl Into<String>,
        location_id: LocationIdx,
        restaurant_id: RestaurantIdx,
        placement_time: Minutes,
        ready_time: Minutes,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            location_id,
            restaurant_id,
            placement_time,
            ready_time,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// The delivery destination.
    pub fn location_id(&self) -> LocationIdx {
        self.location_id
    }

    pub fn restaurant_id(&self) -> RestaurantIdx {
        self.restaurant_id
    }

    pub fn placement_time(&self) -> Minutes {
        self.placement_time
    }

    /// When the food is prepared and can be picked up.
    pub fn ready_time(&self) -> Minutes {
        self.ready_time
    }
}
