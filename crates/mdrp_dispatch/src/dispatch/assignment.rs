use crate::{
    dispatch::{params::CostWeights, route::Route},
    error::DispatchError,
    problem::{
        courier::CourierIdx, dispatch_problem::DispatchProblem, location::LocationIdx,
        restaurant::RestaurantIdx, travel_times::Minutes,
    },
};

/// A bundle handed to a courier. Tentative assignments can still absorb
/// bundles of the same restaurant; once final they never change again.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    courier_id: CourierIdx,
    route: Route,
    assign_time: Minutes,
    pickup_time: Minutes,
    departure_time: Minutes,
    departure_location: LocationIdx,
    is_final: bool,
    update_count: usize,
}

impl Assignment {
    pub fn new(
        courier_id: CourierIdx,
        route: Route,
        assign_time: Minutes,
        pickup_time: Minutes,
        departure_time: Minutes,
        departure_location: LocationIdx,
        is_final: bool,
    ) -> Self {
        Self {
            courier_id,
            route,
            assign_time,
            pickup_time,
            departure_time,
            departure_location,
            is_final,
            update_count: 0,
        }
    }

    pub fn courier_id(&self) -> CourierIdx {
        self.courier_id
    }

    pub fn restaurant_id(&self) -> RestaurantIdx {
        self.route.restaurant_id()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn assign_time(&self) -> Minutes {
        self.assign_time
    }

    pub fn pickup_time(&self) -> Minutes {
        self.pickup_time
    }

    pub(crate) fn set_pickup_time(&mut self, pickup_time: Minutes) {
        self.pickup_time = pickup_time;
    }

    /// Time the courier left the previous position to serve this assignment.
    pub fn departure_time(&self) -> Minutes {
        self.departure_time
    }

    pub fn departure_location(&self) -> LocationIdx {
        self.departure_location
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    pub(crate) fn finalize(&mut self) {
        self.is_final = true;
    }

    /// Absorbs the orders of `other` one by one at their cheapest position.
    ///
    /// The result is final when `other` is final or when one of the orders
    /// has been ready for at least `staleness_threshold` minutes before the
    /// merged route is ready.
    pub fn merge(
        &mut self,
        problem: &DispatchProblem,
        weights: &CostWeights,
        staleness_threshold: Minutes,
        other: Assignment,
    ) -> Result<(), DispatchError> {
        if self.is_final {
            return Err(DispatchError::AssignmentFinalized {
                courier: problem.courier(self.courier_id).external_id().to_owned(),
            });
        }
        if other.restaurant_id() != self.restaurant_id() {
            return Err(DispatchError::RestaurantMismatch {
                existing: problem
                    .restaurant(self.restaurant_id())
                    .external_id()
                    .to_owned(),
                incoming: problem
                    .restaurant(other.restaurant_id())
                    .external_id()
                    .to_owned(),
            });
        }

        for &order_id in other.route.orders() {
            self.route.insert_best(problem, weights, order_id);
        }

        let stale = !self.has_no_long_ready_order(problem, staleness_threshold);
        self.is_final = other.is_final || stale;
        self.update_count += 1;
        self.assign_time = other.assign_time;

        Ok(())
    }

    /// True when no order of the route has been ready `threshold` minutes or
    /// more before the route itself.
    pub fn has_no_long_ready_order(&self, problem: &DispatchProblem, threshold: Minutes) -> bool {
        let Some(route_ready_time) = self.route.ready_time(problem) else {
            return true;
        };

        self.route
            .orders()
            .iter()
            .all(|&order_id| route_ready_time - problem.order(order_id).ready_time() < threshold)
    }
}
