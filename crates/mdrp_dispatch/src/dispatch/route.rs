use smallvec::SmallVec;

use crate::{
    dispatch::params::CostWeights,
    problem::{
        dispatch_problem::DispatchProblem,
        location::LocationIdx,
        order::OrderIdx,
        restaurant::RestaurantIdx,
        travel_times::{Cost, Minutes},
    },
};

/// A bundle: orders of a single restaurant visited in sequence after one
/// pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    restaurant_id: RestaurantIdx,
    orders: SmallVec<[OrderIdx; 4]>,
}

impl Route {
    pub fn empty(restaurant_id: RestaurantIdx) -> Self {
        Self {
            restaurant_id,
            orders: SmallVec::new(),
        }
    }

    pub fn new(restaurant_id: RestaurantIdx, orders: impl IntoIterator<Item = OrderIdx>) -> Self {
        Self {
            restaurant_id,
            orders: orders.into_iter().collect(),
        }
    }

    pub fn restaurant_id(&self) -> RestaurantIdx {
        self.restaurant_id
    }

    pub fn orders(&self) -> &[OrderIdx] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn contains(&self, order_id: OrderIdx) -> bool {
        self.orders.contains(&order_id)
    }

    pub fn insert(&mut self, position: usize, order_id: OrderIdx) {
        self.orders.insert(position, order_id);
    }

    pub fn remove(&mut self, position: usize) -> OrderIdx {
        self.orders.remove(position)
    }

    pub fn position(&self, order_id: OrderIdx) -> Option<usize> {
        self.orders.iter().position(|&id| id == order_id)
    }

    /// Latest ready time among the orders, `None` for an empty route.
    pub fn ready_time(&self, problem: &DispatchProblem) -> Option<Minutes> {
        self.orders
            .iter()
            .map(|&order_id| problem.order(order_id).ready_time())
            .reduce(f64::max)
    }

    /// Location of the last stop.
    pub fn end_position(&self, problem: &DispatchProblem) -> Option<LocationIdx> {
        self.orders
            .last()
            .map(|&order_id| problem.order(order_id).location_id())
    }

    /// Iterates over `(order, travel time from the previous stop)`, the first
    /// leg starting at the restaurant.
    fn legs<'a>(
        &'a self,
        problem: &'a DispatchProblem,
    ) -> impl Iterator<Item = (OrderIdx, Minutes)> + 'a {
        let mut previous = problem.restaurant_location(self.restaurant_id);
        self.orders.iter().map(move |&order_id| {
            let location = problem.order(order_id).location_id();
            let travel_time = problem.travel_time(previous, location);
            previous = location;
            (order_id, travel_time)
        })
    }

    pub fn total_travel_time(&self, problem: &DispatchProblem) -> Minutes {
        self.legs(problem).map(|(_, travel_time)| travel_time).sum()
    }

    /// Walks the route from its ready time and sums `arrival - reference(order)`.
    fn accumulated_lateness<F>(&self, problem: &DispatchProblem, reference: F) -> Minutes
    where
        F: Fn(OrderIdx) -> Minutes,
    {
        let Some(ready_time) = self.ready_time(problem) else {
            return 0.0;
        };

        let mut arrival = ready_time;
        let mut total = 0.0;
        for (order_id, travel_time) in self.legs(problem) {
            arrival += travel_time;
            total += arrival - reference(order_id);
        }
        total
    }

    pub fn total_service_delay(&self, problem: &DispatchProblem) -> Minutes {
        self.accumulated_lateness(problem, |order_id| {
            problem.order(order_id).ready_time()
        })
    }

    pub fn total_service_waiting(&self, problem: &DispatchProblem) -> Minutes {
        self.accumulated_lateness(problem, |order_id| {
            problem.order(order_id).placement_time()
        })
    }

    pub fn cost(&self, problem: &DispatchProblem, weights: &CostWeights) -> Cost {
        self.total_travel_time(problem)
            + weights.beta * self.total_service_delay(problem)
            + weights.gamma * self.total_service_waiting(problem)
    }

    /// Orders delivered per minute of travel, infinite when the route does not
    /// travel at all.
    pub fn efficiency(&self, problem: &DispatchProblem) -> f64 {
        let travel_time = self.total_travel_time(problem);
        if travel_time == 0.0 {
            f64::INFINITY
        } else {
            self.orders.len() as f64 / travel_time
        }
    }

    /// Evaluates the full route cost with `order_id` inserted at every position
    /// and returns the cheapest `(position, cost)`. The route is left unchanged
    /// and the earliest position wins ties.
    pub fn best_insertion(
        &mut self,
        problem: &DispatchProblem,
        weights: &CostWeights,
        order_id: OrderIdx,
    ) -> (usize, Cost) {
        let mut best_position = 0;
        let mut best_cost = f64::INFINITY;

        for position in 0..=self.orders.len() {
            self.orders.insert(position, order_id);
            let cost = self.cost(problem, weights);
            self.orders.remove(position);

            if cost < best_cost {
                best_cost = cost;
                best_position = position;
            }
        }

        (best_position, best_cost)
    }

    /// Inserts `order_id` permanently at its cheapest position.
    pub fn insert_best(
        &mut self,
        problem: &DispatchProblem,
        weights: &CostWeights,
        order_id: OrderIdx,
    ) -> usize {
        let (position, _) = self.best_insertion(problem, weights, order_id);
        self.orders.insert(position, order_id);
        position
    }

    /// Dropoff time of every stop when the bundle is picked up at `pickup_time`.
    pub fn dropoff_times(
        &self,
        problem: &DispatchProblem,
        pickup_time: Minutes,
    ) -> SmallVec<[(OrderIdx, Minutes); 4]> {
        let parameters = problem.parameters();
        let half_pickup = parameters.half_pickup_service();
        let half_dropoff = parameters.half_dropoff_service();

        let mut times = SmallVec::with_capacity(self.orders.len());
        let mut clock = pickup_time + half_pickup;
        for (index, (order_id, travel_time)) in self.legs(problem).enumerate() {
            if index > 0 {
                clock += half_dropoff;
            }
            clock += travel_time + half_dropoff;
            times.push((order_id, clock));
        }
        times
    }

    /// Time the courier is free again after delivering the bundle.
    pub fn completion_time(&self, problem: &DispatchProblem, pickup_time: Minutes) -> Minutes {
        let parameters = problem.parameters();
        let stops = self.orders.len().saturating_sub(1) as Minutes;

        pickup_time
            + parameters.half_pickup_service()
            + self.total_travel_time(problem)
            + parameters.dropoff_service_minutes * stops
            + parameters.half_dropoff_service()
    }

    pub fn is_homogeneous(&self, problem: &DispatchProblem) -> bool {
        self.orders
            .iter()
            .all(|&order_id| problem.order(order_id).restaurant_id() == self.restaurant_id)
    }
}
