use serde::Serialize;

use crate::{
    dispatch::{epochs::EpochBins, outcome::DispatchOutcome, params::DispatchParams},
    problem::{courier::CourierIdx, dispatch_problem::DispatchProblem, travel_times::Minutes},
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DispatchStatistics {
    pub orders: usize,
    pub binned_orders: usize,
    pub assigned_orders: usize,
    pub delivered_orders: usize,
    pub unassigned_orders: usize,
    pub epochs: usize,
    pub assignments: usize,
    pub final_assignments: usize,
    /// Assignments that absorbed at least one later bundle.
    pub merged_assignments: usize,
    pub couriers_used: usize,
    pub mean_click_to_door: Option<Minutes>,
    /// Share of delivered orders within the target click-to-door time.
    pub on_time_ratio: Option<f64>,
    pub mean_ready_to_pickup: Option<Minutes>,
    pub total_cost: f64,
    pub courier_compensation: f64,
}

impl DispatchStatistics {
    pub fn from_outcome(
        problem: &DispatchProblem,
        params: &DispatchParams,
        outcome: &DispatchOutcome,
    ) -> Self {
        let parameters = problem.parameters();
        let state = &outcome.state;

        let mut delivered = 0;
        let mut on_time = 0;
        let mut click_to_door = 0.0;
        let mut ready_to_pickup = 0.0;
        let mut delivered_by_courier = vec![0usize; problem.couriers().len()];

        for (order_id, schedule) in state.order_schedules() {
            let Some(schedule) = schedule else {
                continue;
            };
            let order = problem.order(order_id);
            let order_click_to_door = schedule.dropoff_time - order.placement_time();

            delivered += 1;
            click_to_door += order_click_to_door;
            ready_to_pickup += schedule.pickup_time - order.ready_time();
            if order_click_to_door <= parameters.target_click_to_door {
                on_time += 1;
            }
            delivered_by_courier[schedule.courier_id.get()] += 1;
        }

        let courier_compensation = CourierIdx::all(problem.couriers().len())
            .map(|courier_id| {
                let courier = problem.courier(courier_id);
                let per_order =
                    parameters.pay_per_order * delivered_by_courier[courier_id.get()] as f64;
                let guaranteed = parameters.guaranteed_pay_per_hour * courier.duty_hours();
                per_order.max(guaranteed)
            })
            .sum();

        let mean = |total: f64| (delivered > 0).then(|| total / delivered as f64);

        Self {
            orders: problem.orders().len(),
            binned_orders: EpochBins::new(problem, params).binned_count(),
            assigned_orders: outcome.assigned_count(),
            delivered_orders: delivered,
            unassigned_orders: outcome.unassigned.len() + outcome.unbinned.len(),
            epochs: outcome.epochs.len(),
            assignments: state.assignments().count(),
            final_assignments: state
                .assignments()
                .filter(|assignment| assignment.is_final())
                .count(),
            merged_assignments: state
                .assignments()
                .filter(|assignment| assignment.update_count() > 0)
                .count(),
            couriers_used: state
                .couriers()
                .iter()
                .filter(|courier| !courier.assignments().is_empty())
                .count(),
            mean_click_to_door: mean(click_to_door),
            on_time_ratio: mean(on_time as f64),
            mean_ready_to_pickup: mean(ready_to_pickup),
            total_cost: outcome.total_cost(problem, &params.weights()),
            courier_compensation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dispatch::dispatcher::Dispatcher,
        test_utils::{self, TestOrder},
    };

    #[test]
    fn test_statistics_of_two_order_run() {
        let problem = Arc::new(test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[
                TestOrder::new(0.0, 10.0).placed(0.0).ready(2.0),
                TestOrder::new(0.0, 20.0).placed(1.0).ready(3.0),
            ],
            &[(0.0, 0.0, 0.0, 120.0)],
        ));
        let params = DispatchParams::default();
        let outcome = Dispatcher::new(Arc::clone(&problem), params.clone())
            .unwrap()
            .run()
            .unwrap();

        let statistics = DispatchStatistics::from_outcome(&problem, &params, &outcome);

        assert_eq!(statistics.orders, 2);
        assert_eq!(statistics.binned_orders, 2);
        assert_eq!(statistics.delivered_orders, 2);
        assert_eq!(statistics.unassigned_orders, 0);
        assert_eq!(statistics.final_assignments, 1);
        assert_eq!(statistics.couriers_used, 1);
        // pickup at 9, dropoffs at 14 and 19
        assert_eq!(statistics.mean_click_to_door, Some((14.0 + 18.0) / 2.0));
        assert_eq!(statistics.mean_ready_to_pickup, Some((7.0 + 6.0) / 2.0));
        assert_eq!(statistics.on_time_ratio, Some(1.0));
        // two hours on duty at 15 per hour beats 2 orders at 10
        assert_eq!(statistics.courier_compensation, 30.0);
    }
}
