use tracing::debug;

use crate::{
    dispatch::{assignment::Assignment, params::DispatchParams, route::Route},
    error::DispatchError,
    problem::{
        courier::CourierIdx, dispatch_problem::DispatchProblem, location::LocationIdx,
        order::OrderIdx, restaurant::RestaurantIdx, travel_times::Minutes,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct CourierState {
    next_available_time: Minutes,
    position: LocationIdx,
    assignments: Vec<Assignment>,
}

impl CourierState {
    pub fn next_available_time(&self) -> Minutes {
        self.next_available_time
    }

    /// Where the courier is after its last final assignment.
    pub fn position(&self) -> LocationIdx {
        self.position
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn last_assignment(&self) -> Option<&Assignment> {
        self.assignments.last()
    }

    /// The last assignment when it can still absorb bundles.
    pub fn open_assignment(&self) -> Option<&Assignment> {
        self.assignments
            .last()
            .filter(|assignment| !assignment.is_final())
    }
}

/// Stamped on an order once its bundle is committed final.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSchedule {
    pub courier_id: CourierIdx,
    pub assign_time: Minutes,
    pub pickup_time: Minutes,
    pub dropoff_time: Minutes,
}

/// Mutable side of a dispatch run, indexed like the problem arena.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchState {
    couriers: Vec<CourierState>,
    orders: Vec<Option<OrderSchedule>>,
}

impl DispatchState {
    pub fn new(problem: &DispatchProblem) -> Self {
        Self {
            couriers: problem
                .couriers()
                .iter()
                .map(|courier| CourierState {
                    next_available_time: courier.on_time(),
                    position: courier.location_id(),
                    assignments: Vec::new(),
                })
                .collect(),
            orders: vec![None; problem.orders().len()],
        }
    }

    pub fn courier(&self, courier_id: CourierIdx) -> &CourierState {
        &self.couriers[courier_id.get()]
    }

    pub fn couriers(&self) -> &[CourierState] {
        &self.couriers
    }

    pub fn order_schedule(&self, order_id: OrderIdx) -> Option<&OrderSchedule> {
        self.orders[order_id.get()].as_ref()
    }

    pub fn order_schedules(&self) -> impl Iterator<Item = (OrderIdx, Option<&OrderSchedule>)> {
        self.orders
            .iter()
            .enumerate()
            .map(|(index, schedule)| (OrderIdx::new(index), schedule.as_ref()))
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.couriers
            .iter()
            .flat_map(|courier| courier.assignments.iter())
    }

    /// Couriers free before `t + assignment_horizon` and not yet off duty.
    pub fn idle_couriers(
        &self,
        problem: &DispatchProblem,
        t: Minutes,
        assignment_horizon: Minutes,
    ) -> Vec<CourierIdx> {
        CourierIdx::all(problem.couriers().len())
            .filter(|&courier_id| {
                let next_available_time = self.courier(courier_id).next_available_time;
                next_available_time < t + assignment_horizon
                    && next_available_time < problem.courier(courier_id).off_time()
            })
            .collect()
    }

    /// Time the courier reaches `restaurant_id` when dispatched at `t`,
    /// service halves included.
    pub fn arrival_time(
        &self,
        problem: &DispatchProblem,
        t: Minutes,
        courier_id: CourierIdx,
        restaurant_id: RestaurantIdx,
    ) -> Minutes {
        let state = self.courier(courier_id);
        let parameters = problem.parameters();

        state.next_available_time.max(t)
            + parameters.half_dropoff_service()
            + problem.travel_time(state.position, problem.restaurant_location(restaurant_id))
            + parameters.half_pickup_service()
    }

    pub fn can_assign(
        &self,
        problem: &DispatchProblem,
        t: Minutes,
        courier_id: CourierIdx,
        route: &Route,
    ) -> Result<bool, DispatchError> {
        let courier = problem.courier(courier_id);
        let ready_time = route
            .ready_time(problem)
            .ok_or(DispatchError::EmptyBundle)?;

        if ready_time < courier.on_time() || ready_time > courier.off_time() {
            return Ok(false);
        }

        if self.arrival_time(problem, t, courier_id, route.restaurant_id()) > courier.off_time() {
            return Ok(false);
        }

        let blocked_by_open_assignment = self
            .courier(courier_id)
            .open_assignment()
            .is_some_and(|open| open.restaurant_id() != route.restaurant_id());

        Ok(!blocked_by_open_assignment)
    }

    /// Hands `route` to the courier at epoch `t`.
    ///
    /// A tentative last assignment absorbs the bundle, otherwise a new
    /// assignment is appended. When the resulting assignment is final the
    /// courier is dispatched and its orders are stamped. Returns whether the
    /// courier's assignment is now final.
    pub fn assign_bundle(
        &mut self,
        problem: &DispatchProblem,
        params: &DispatchParams,
        t: Minutes,
        courier_id: CourierIdx,
        route: Route,
    ) -> Result<bool, DispatchError> {
        let ready_time = route
            .ready_time(problem)
            .ok_or(DispatchError::EmptyBundle)?;
        let arrival_time = self.arrival_time(problem, t, courier_id, route.restaurant_id());
        let is_final =
            params
                .commitment
                .should_commit(t + params.epoch_width(), arrival_time, ready_time);

        let state = &mut self.couriers[courier_id.get()];
        let assignment = Assignment::new(
            courier_id,
            route,
            t,
            arrival_time.max(ready_time),
            state.next_available_time.max(t),
            state.position,
            is_final,
        );

        match state.assignments.last_mut() {
            Some(open) if !open.is_final() => {
                open.merge(
                    problem,
                    &params.weights(),
                    params.staleness_threshold,
                    assignment,
                )?;
                let merged_ready_time = open
                    .route()
                    .ready_time(problem)
                    .ok_or(DispatchError::EmptyBundle)?;
                open.set_pickup_time(arrival_time.max(merged_ready_time));
            }
            _ => state.assignments.push(assignment),
        }

        let committed = state
            .assignments
            .last()
            .is_some_and(|assignment| assignment.is_final());
        if committed {
            self.dispatch_last_assignment(problem, courier_id);
        }

        Ok(committed)
    }

    /// Commits every assignment still open at the end of the horizon using
    /// its stored pickup time. Returns how many were closed.
    pub fn close_open_assignments(&mut self, problem: &DispatchProblem) -> usize {
        let mut closed = 0;
        for courier_id in CourierIdx::all(self.couriers.len()) {
            let Some(open) = self.couriers[courier_id.get()].assignments.last_mut() else {
                continue;
            };
            if open.is_final() {
                continue;
            }

            open.finalize();
            self.dispatch_last_assignment(problem, courier_id);
            closed += 1;
        }

        if closed > 0 {
            debug!(closed, "Closed open assignments at the end of the horizon");
        }
        closed
    }

    fn dispatch_last_assignment(&mut self, problem: &DispatchProblem, courier_id: CourierIdx) {
        let state = &mut self.couriers[courier_id.get()];
        let Some(assignment) = state.assignments.last() else {
            return;
        };

        let route = assignment.route();
        let pickup_time = assignment.pickup_time();
        let assign_time = assignment.assign_time();

        for (order_id, dropoff_time) in route.dropoff_times(problem, pickup_time) {
            self.orders[order_id.get()] = Some(OrderSchedule {
                courier_id,
                assign_time,
                pickup_time,
                dropoff_time,
            });
        }

        state.next_available_time = route.completion_time(problem, pickup_time);
        if let Some(end_position) = route.end_position(problem) {
            state.position = end_position;
        }
    }
}
