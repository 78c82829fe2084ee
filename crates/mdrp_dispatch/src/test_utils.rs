use crate::problem::{
    dispatch_problem::{
        CourierRecord, DispatchProblem, DispatchProblemBuilder, OrderRecord, RestaurantRecord,
    },
    instance_parameters::InstanceParameters,
    travel_times::Minutes,
};

pub const TEST_METERS_PER_MINUTE: f64 = 10.0;

#[derive(Clone, Copy)]
pub struct TestOrder {
    x: f64,
    y: f64,
    placement_time: Minutes,
    ready_time: Minutes,
    restaurant: usize,
}

impl TestOrder {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            placement_time: 0.0,
            ready_time: 0.0,
            restaurant: 0,
        }
    }

    pub fn placed(mut self, placement_time: Minutes) -> Self {
        self.placement_time = placement_time;
        self
    }

    pub fn ready(mut self, ready_time: Minutes) -> Self {
        self.ready_time = ready_time;
        self
    }

    pub fn restaurant(mut self, restaurant: usize) -> Self {
        self.restaurant = restaurant;
        self
    }
}

pub fn test_parameters() -> InstanceParameters {
    InstanceParameters {
        meters_per_minute: TEST_METERS_PER_MINUTE,
        ..InstanceParameters::default()
    }
}

/// Builds a problem whose entities are named `r000`, `o000`, `c000`, ... in
/// the given order, so indices match the slice positions.
pub fn create_test_problem(
    restaurants: &[(f64, f64)],
    orders: &[TestOrder],
    couriers: &[(f64, f64, Minutes, Minutes)],
) -> DispatchProblem {
    let mut builder = DispatchProblemBuilder::default();

    for (index, &(x, y)) in restaurants.iter().enumerate() {
        builder.add_restaurant(RestaurantRecord {
            id: format!("r{index:03}"),
            x,
            y,
        });
    }

    for (index, order) in orders.iter().enumerate() {
        builder.add_order(OrderRecord {
            id: format!("o{index:03}"),
            x: order.x,
            y: order.y,
            placement_time: order.placement_time,
            restaurant: format!("r{:03}", order.restaurant),
            ready_time: order.ready_time,
        });
    }

    for (index, &(x, y, on_time, off_time)) in couriers.iter().enumerate() {
        builder.add_courier(CourierRecord {
            id: format!("c{index:03}"),
            x,
            y,
            on_time,
            off_time,
        });
    }

    builder.set_parameters(test_parameters());
    builder.build().unwrap()
}
