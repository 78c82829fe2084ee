use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    dispatch::{
        assignment::Assignment,
        construction::RestaurantBundles,
        outcome::{BundlePlan, DispatchOutcome, EpochDecision, MatchedBundle},
        params::DispatchParams,
        route::Route,
        statistics::DispatchStatistics,
    },
    error::DispatchError,
    problem::{
        dispatch_problem::{
            CourierRecord, DispatchProblem, DispatchProblemBuilder, OrderRecord, RestaurantRecord,
        },
        instance_parameters::InstanceParameters,
        order::OrderIdx,
        travel_times::{Cost, Minutes},
    },
};

pub trait FromProblem<T> {
    fn from_problem(value: T, problem: &DispatchProblem) -> Self;
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "DispatchInstance")]
pub struct JsonDispatchInstance {
    pub id: Option<String>,
    pub orders: Vec<OrderRecord>,
    pub restaurants: Vec<RestaurantRecord>,
    pub couriers: Vec<CourierRecord>,
    pub parameters: Option<InstanceParameters>,
}

impl JsonDispatchInstance {
    pub fn build_problem(self) -> Result<DispatchProblem, DispatchError> {
        let mut builder = DispatchProblemBuilder::default();
        if let Some(id) = self.id {
            builder.set_id(id);
        }

        builder
            .set_orders(self.orders)
            .set_restaurants(self.restaurants)
            .set_couriers(self.couriers)
            .set_parameters(self.parameters.unwrap_or_default());

        builder.build()
    }
}

fn order_ids(problem: &DispatchProblem, orders: &[OrderIdx]) -> Vec<String> {
    orders
        .iter()
        .map(|&order_id| problem.order(order_id).external_id().to_owned())
        .collect()
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "Bundle")]
pub struct JsonBundle {
    pub restaurant: String,
    pub orders: Vec<String>,
    pub ready_time: Option<Minutes>,
    pub cost: Cost,
}

impl JsonBundle {
    fn from_route(route: &Route, problem: &DispatchProblem, params: &DispatchParams) -> Self {
        JsonBundle {
            restaurant: problem
                .restaurant(route.restaurant_id())
                .external_id()
                .to_owned(),
            orders: order_ids(problem, route.orders()),
            ready_time: route.ready_time(problem),
            cost: route.cost(problem, &params.weights()),
        }
    }
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "Match")]
pub struct JsonMatch {
    pub courier: String,
    pub restaurant: String,
    pub orders: Vec<String>,
    pub is_final: bool,
}

impl FromProblem<&MatchedBundle> for JsonMatch {
    fn from_problem(value: &MatchedBundle, problem: &DispatchProblem) -> Self {
        JsonMatch {
            courier: problem.courier(value.courier_id).external_id().to_owned(),
            restaurant: problem
                .restaurant(value.route.restaurant_id())
                .external_id()
                .to_owned(),
            orders: order_ids(problem, value.route.orders()),
            is_final: value.is_final,
        }
    }
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "Epoch")]
pub struct JsonEpoch {
    pub epoch: u32,
    pub bundles: Vec<JsonBundle>,
    pub matches: Vec<JsonMatch>,
    pub unassigned: Vec<String>,
}

impl JsonEpoch {
    fn new(
        epoch: u32,
        decision: &EpochDecision,
        problem: &DispatchProblem,
        params: &DispatchParams,
    ) -> Self {
        JsonEpoch {
            epoch,
            bundles: decision
                .bundles
                .iter()
                .flat_map(|restaurant| restaurant.bundles.iter())
                .map(|route| JsonBundle::from_route(route, problem, params))
                .collect(),
            matches: decision
                .matches
                .iter()
                .map(|matched| JsonMatch::from_problem(matched, problem))
                .collect(),
            unassigned: order_ids(problem, &decision.unassigned),
        }
    }
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "Assignment")]
pub struct JsonAssignment {
    pub restaurant: String,
    pub orders: Vec<String>,
    pub assign_time: Minutes,
    pub pickup_time: Minutes,
    pub departure_time: Minutes,
    pub departure_location: String,
    pub is_final: bool,
    pub update_count: usize,
}

impl FromProblem<&Assignment> for JsonAssignment {
    fn from_problem(value: &Assignment, problem: &DispatchProblem) -> Self {
        JsonAssignment {
            restaurant: problem
                .restaurant(value.restaurant_id())
                .external_id()
                .to_owned(),
            orders: order_ids(problem, value.route().orders()),
            assign_time: value.assign_time(),
            pickup_time: value.pickup_time(),
            departure_time: value.departure_time(),
            departure_location: problem
                .location(value.departure_location())
                .external_id()
                .to_owned(),
            is_final: value.is_final(),
            update_count: value.update_count(),
        }
    }
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "CourierSchedule")]
pub struct JsonCourierSchedule {
    pub courier: String,
    pub next_available_time: Minutes,
    pub assignments: Vec<JsonAssignment>,
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "OrderSchedule")]
pub struct JsonOrderSchedule {
    pub order: String,
    pub courier: String,
    pub assign_time: Minutes,
    pub pickup_time: Minutes,
    pub dropoff_time: Minutes,
}

#[derive(Serialize)]
#[serde(rename = "DispatchResult")]
pub struct JsonDispatchResult {
    pub id: Option<String>,
    pub statistics: DispatchStatistics,
    pub epochs: Vec<JsonEpoch>,
    pub couriers: Vec<JsonCourierSchedule>,
    pub orders: Vec<JsonOrderSchedule>,
    pub unassigned: Vec<String>,
    pub unbinned: Vec<String>,
}

impl JsonDispatchResult {
    pub fn new(
        problem: &DispatchProblem,
        params: &DispatchParams,
        outcome: &DispatchOutcome,
    ) -> Self {
        let state = &outcome.state;

        let couriers = problem
            .couriers()
            .iter()
            .zip(state.couriers())
            .filter(|(_, courier_state)| !courier_state.assignments().is_empty())
            .map(|(courier, courier_state)| JsonCourierSchedule {
                courier: courier.external_id().to_owned(),
                next_available_time: courier_state.next_available_time(),
                assignments: courier_state
                    .assignments()
                    .iter()
                    .map(|assignment| JsonAssignment::from_problem(assignment, problem))
                    .collect(),
            })
            .collect();

        let orders = state
            .order_schedules()
            .filter_map(|(order_id, schedule)| schedule.map(|schedule| (order_id, schedule)))
            .map(|(order_id, schedule)| JsonOrderSchedule {
                order: problem.order(order_id).external_id().to_owned(),
                courier: problem
                    .courier(schedule.courier_id)
                    .external_id()
                    .to_owned(),
                assign_time: schedule.assign_time,
                pickup_time: schedule.pickup_time,
                dropoff_time: schedule.dropoff_time,
            })
            .collect();

        JsonDispatchResult {
            id: problem.id().map(str::to_owned),
            statistics: DispatchStatistics::from_outcome(problem, params, outcome),
            epochs: outcome
                .epochs
                .iter()
                .map(|(&epoch, decision)| JsonEpoch::new(epoch, decision, problem, params))
                .collect(),
            couriers,
            orders,
            unassigned: order_ids(problem, &outcome.unassigned),
            unbinned: order_ids(problem, &outcome.unbinned),
        }
    }
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "PlanEpoch")]
pub struct JsonPlanEpoch {
    pub epoch: u32,
    pub bundles: Vec<JsonBundle>,
}

#[derive(Serialize, JsonSchema)]
#[serde(rename = "BundlePlan")]
pub struct JsonBundlePlan {
    pub id: Option<String>,
    pub total_cost: Cost,
    pub orders: usize,
    pub bundles: usize,
    pub epochs: Vec<JsonPlanEpoch>,
}

impl JsonBundlePlan {
    pub fn new(problem: &DispatchProblem, params: &DispatchParams, plan: &BundlePlan) -> Self {
        let epochs = plan
            .epochs
            .iter()
            .map(|(&epoch, restaurants)| JsonPlanEpoch {
                epoch,
                bundles: restaurants
                    .iter()
                    .flat_map(|restaurant: &RestaurantBundles| restaurant.bundles.iter())
                    .map(|route| JsonBundle::from_route(route, problem, params))
                    .collect(),
            })
            .collect();

        JsonBundlePlan {
            id: problem.id().map(str::to_owned),
            total_cost: plan.total_cost(problem, &params.weights()),
            orders: plan.order_count(),
            bundles: plan.bundle_count(),
            epochs,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dispatch::dispatcher::Dispatcher;

    const INSTANCE: &str = r#"{
        "id": "tiny",
        "orders": [
            { "id": "o1", "x": 0, "y": 100, "placement_time": 0, "restaurant": "r1", "ready_time": 2 },
            { "id": "o2", "x": 0, "y": 200, "placement_time": 1, "restaurant": "r1", "ready_time": 3 }
        ],
        "restaurants": [ { "id": "r1", "x": 0, "y": 0 } ],
        "couriers": [ { "id": "c1", "x": 0, "y": 0, "on_time": 0, "off_time": 120 } ],
        "parameters": {
            "meters_per_minute": 100,
            "pickup_service_minutes": 4,
            "dropoff_service_minutes": 4,
            "target_click_to_door": 40,
            "pay_per_order": 10,
            "guaranteed_pay_per_hour": 15
        }
    }"#;

    #[test]
    fn test_instance_without_parameters_uses_defaults() {
        let instance: JsonDispatchInstance = serde_json::from_str(
            r#"{
                "id": null,
                "orders": [],
                "restaurants": [ { "id": "r1", "x": 0, "y": 0 } ],
                "couriers": [ { "id": "c1", "x": 0, "y": 0, "on_time": 0, "off_time": 60 } ]
            }"#,
        )
        .unwrap();

        assert!(instance.parameters.is_none());
        let result = instance.build_problem();
        assert!(matches!(result, Err(DispatchError::EmptyInstance(_))));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = serde_json::from_str::<JsonDispatchInstance>(
            r#"{ "orders": [], "restaurants": [], "couriers": [], "depots": [] }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_dispatch_result_uses_external_ids() {
        let instance: JsonDispatchInstance = serde_json::from_str(INSTANCE).unwrap();
        let problem = Arc::new(instance.build_problem().unwrap());
        let params = DispatchParams::default();
        let outcome = Dispatcher::new(Arc::clone(&problem), params.clone())
            .unwrap()
            .run()
            .unwrap();

        let result = JsonDispatchResult::new(&problem, &params, &outcome);

        assert_eq!(result.id.as_deref(), Some("tiny"));
        assert_eq!(result.couriers.len(), 1);
        assert_eq!(result.couriers[0].courier, "c1");
        assert_eq!(result.couriers[0].assignments[0].restaurant, "r1");
        assert_eq!(result.couriers[0].assignments[0].orders, vec!["o1", "o2"]);
        assert_eq!(
            result
                .orders
                .iter()
                .map(|order| order.order.as_str())
                .collect::<Vec<_>>(),
            vec!["o1", "o2"]
        );
        assert!(result.unassigned.is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["statistics"]["delivered_orders"], 2);
    }
}
