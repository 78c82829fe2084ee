use std::sync::Arc;

use crate::{
    dispatch::{outcome::BundlePlan, params::CostWeights},
    improve::destroy::RemovedOrder,
    problem::{dispatch_problem::DispatchProblem, travel_times::Cost},
};

pub trait RepairOperator {
    /// Places the removed order back into `plan`. Returns false when no bundle
    /// could take it, in which case the plan is left unchanged.
    fn repair(
        &self,
        problem: &DispatchProblem,
        weights: &CostWeights,
        plan: &mut BundlePlan,
        removed: RemovedOrder,
    ) -> bool;
}

/// Cheapest insertion into any bundle of the order's restaurant planned at
/// the order's epoch or later.
pub struct GreedyReinsertion;

#[derive(Debug, Clone, Copy)]
struct Slot {
    epoch: u32,
    restaurant: usize,
    bundle: usize,
    position: usize,
    cost_increase: Cost,
}

impl RepairOperator for GreedyReinsertion {
    fn repair(
        &self,
        problem: &DispatchProblem,
        weights: &CostWeights,
        plan: &mut BundlePlan,
        removed: RemovedOrder,
    ) -> bool {
        let restaurant_id = problem.order(removed.order_id).restaurant_id();
        let mut best: Option<Slot> = None;

        for (&epoch, restaurants) in plan.epochs.range(removed.epoch..) {
            for (restaurant, restaurant_bundles) in restaurants.iter().enumerate() {
                if restaurant_bundles.restaurant_id != restaurant_id {
                    continue;
                }

                for (bundle, route) in restaurant_bundles.bundles.iter().enumerate() {
                    let mut trial = route.clone();
                    let (position, cost) = trial.best_insertion(problem, weights, removed.order_id);
                    let cost_increase = cost - route.cost(problem, weights);

                    if best.is_none_or(|slot| cost_increase < slot.cost_increase) {
                        best = Some(Slot {
                            epoch,
                            restaurant,
                            bundle,
                            position,
                            cost_increase,
                        });
                    }
                }
            }
        }

        let Some(slot) = best else {
            return false;
        };
        let Some(restaurants) = plan.epochs.get_mut(&slot.epoch) else {
            return false;
        };

        Arc::make_mut(restaurants)[slot.restaurant].bundles[slot.bundle]
            .insert(slot.position, removed.order_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dispatch::{construction::RestaurantBundles, route::Route},
        problem::{order::OrderIdx, restaurant::RestaurantIdx},
        test_utils::{self, TestOrder},
    };

    fn plan(entries: Vec<(u32, usize, Vec<usize>)>) -> BundlePlan {
        let mut plan = BundlePlan::default();
        for (epoch, restaurant, orders) in entries {
            let restaurant_id = RestaurantIdx::new(restaurant);
            let restaurants = plan.epochs.entry(epoch).or_default();
            Arc::make_mut(restaurants).push(RestaurantBundles {
                restaurant_id,
                bundles: vec![Route::new(
                    restaurant_id,
                    orders.into_iter().map(OrderIdx::new),
                )],
            });
        }
        plan
    }

    #[test]
    fn test_reinsert_into_same_restaurant_not_earlier() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0), (10.0, 0.0)],
            &[
                TestOrder::new(0.0, 10.0).ready(3.0),
                TestOrder::new(0.0, 11.0).ready(3.0),
                TestOrder::new(0.0, 12.0).ready(3.0),
                TestOrder::new(10.0, 11.0).ready(3.0).restaurant(1),
            ],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        // order 1 was removed from epoch 10
        let mut plan = plan(vec![
            (5, 0, vec![0]),
            (10, 1, vec![3]),
            (10, 0, vec![]),
            (15, 0, vec![2]),
        ]);

        let repaired = GreedyReinsertion.repair(
            &problem,
            &CostWeights::default(),
            &mut plan,
            RemovedOrder {
                order_id: OrderIdx::new(1),
                epoch: 10,
            },
        );

        assert!(repaired);
        assert_eq!(plan.epochs[&5][0].bundles[0].orders(), &[OrderIdx::new(0)]);
        assert_eq!(plan.epochs[&10][0].bundles[0].orders(), &[OrderIdx::new(3)]);
        assert_eq!(plan.epochs[&10][1].bundles[0].orders(), &[OrderIdx::new(1)]);
        assert!(plan.routes().all(|route| route.is_homogeneous(&problem)));
        assert_eq!(plan.order_count(), 4);
    }

    #[test]
    fn test_no_bundle_of_restaurant_leaves_plan_unchanged() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0), (10.0, 0.0)],
            &[
                TestOrder::new(0.0, 10.0).ready(3.0),
                TestOrder::new(10.0, 11.0).ready(3.0).restaurant(1),
            ],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        let mut plan = plan(vec![(5, 1, vec![1])]);
        let before = plan.clone();

        let repaired = GreedyReinsertion.repair(
            &problem,
            &CostWeights::default(),
            &mut plan,
            RemovedOrder {
                order_id: OrderIdx::new(0),
                epoch: 5,
            },
        );

        assert!(!repaired);
        assert_eq!(plan, before);
    }
}
