use tracing::{Level, instrument};

use crate::{
    dispatch::{params::CostWeights, route::Route},
    problem::{
        dispatch_problem::DispatchProblem, order::OrderIdx, restaurant::RestaurantIdx,
        travel_times::Cost,
    },
};

/// Bundles built for one restaurant at one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantBundles {
    pub restaurant_id: RestaurantIdx,
    pub bundles: Vec<Route>,
}

impl RestaurantBundles {
    pub fn order_count(&self) -> usize {
        self.bundles.iter().map(Route::len).sum()
    }

    pub fn total_cost(&self, problem: &DispatchProblem, weights: &CostWeights) -> Cost {
        self.bundles
            .iter()
            .map(|bundle| bundle.cost(problem, weights))
            .sum()
    }
}

/// Splits `ready_orders` by restaurant, keeping their relative order.
/// Restaurants come out in instance-table order and those without orders are
/// skipped.
pub fn group_by_restaurant(
    problem: &DispatchProblem,
    ready_orders: &[OrderIdx],
) -> Vec<(RestaurantIdx, Vec<OrderIdx>)> {
    let mut groups = vec![Vec::new(); problem.restaurants().len()];
    for &order_id in ready_orders {
        groups[problem.order(order_id).restaurant_id().get()].push(order_id);
    }

    RestaurantIdx::all(problem.restaurants().len())
        .zip(groups)
        .filter(|(_, orders)| !orders.is_empty())
        .collect()
}

/// Greedy cheapest insertion of the orders of one restaurant into
/// `ceil(len / bundle_size)` bundles.
///
/// A bundle that already holds `bundle_size` orders only takes an order when
/// it strictly improves its efficiency. The order goes to the admitted bundle
/// with the smallest cost increase, the first one on ties.
#[instrument(skip_all, level = Level::DEBUG)]
pub fn construct_restaurant_bundles(
    problem: &DispatchProblem,
    weights: &CostWeights,
    restaurant_id: RestaurantIdx,
    orders: &[OrderIdx],
    bundle_size: usize,
) -> Vec<Route> {
    let bundle_size = bundle_size.max(1);
    let number_of_bundles = orders.len().div_ceil(bundle_size);
    let mut bundles = vec![Route::empty(restaurant_id); number_of_bundles];

    for &order_id in orders {
        let mut best: Option<(usize, usize, Cost)> = None;

        for (index, bundle) in bundles.iter_mut().enumerate() {
            let (position, new_cost) = bundle.best_insertion(problem, weights, order_id);

            if bundle.len() >= bundle_size {
                let current_efficiency = bundle.efficiency(problem);
                bundle.insert(position, order_id);
                let new_efficiency = bundle.efficiency(problem);
                bundle.remove(position);

                if new_efficiency <= current_efficiency {
                    continue;
                }
            }

            let cost_increase = new_cost - bundle.cost(problem, weights);
            if best.is_none_or(|(_, _, best_increase)| cost_increase < best_increase) {
                best = Some((index, position, cost_increase));
            }
        }

        // There is always a bundle with spare room: the bundles can hold
        // `bundle_size * number_of_bundles >= orders.len()` orders.
        let Some((index, position, _)) = best else {
            panic!("Bug: no bundle admitted order {order_id}");
        };
        bundles[index].insert(position, order_id);
    }

    bundles.retain(|bundle| !bundle.is_empty());
    bundles
}
