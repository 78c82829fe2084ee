use tracing::{Level, instrument};

use crate::{
    dispatch::{params::CostWeights, route::Route},
    problem::{dispatch_problem::DispatchProblem, order::OrderIdx, travel_times::Cost},
};

/// **Inter-Bundle Relocate**
///
/// Takes every order of the restaurant once, in the order the bundles held
/// them before the search started, and moves it to the position of any bundle
/// (its own included) that gives the lowest total restaurant cost. An order
/// only moves on a strict improvement. Bundles left empty are dropped.
///
/// ```text
/// BEFORE:
///    B1: [a] -> [x] -> [b]       B2: [c] -> [d]
///
/// AFTER:
///    B1: [a] -> [b]              B2: [c] -> [x] -> [d]
/// ```
#[instrument(skip_all, level = Level::DEBUG)]
pub fn relocate_orders(problem: &DispatchProblem, weights: &CostWeights, bundles: &mut Vec<Route>) {
    let snapshot = bundles
        .iter()
        .flat_map(|bundle| bundle.orders().iter().copied())
        .collect::<Vec<OrderIdx>>();

    let mut costs = bundles
        .iter()
        .map(|bundle| bundle.cost(problem, weights))
        .collect::<Vec<Cost>>();

    for order_id in snapshot {
        let Some((source, source_position)) = locate(bundles, order_id) else {
            continue;
        };

        let mut best_total: Cost = costs.iter().sum();
        let mut best = (source, source_position);

        bundles[source].remove(source_position);
        costs[source] = bundles[source].cost(problem, weights);

        for target in 0..bundles.len() {
            for position in 0..=bundles[target].len() {
                bundles[target].insert(position, order_id);
                let candidate_cost = bundles[target].cost(problem, weights);
                bundles[target].remove(position);

                let total = total_with(&costs, target, candidate_cost);
                if total < best_total {
                    best_total = total;
                    best = (target, position);
                }
            }
        }

        let (target, position) = best;
        bundles[target].insert(position, order_id);
        costs[target] = bundles[target].cost(problem, weights);
        if target != source {
            costs[source] = bundles[source].cost(problem, weights);
        }
    }

    bundles.retain(|bundle| !bundle.is_empty());
}

fn locate(bundles: &[Route], order_id: OrderIdx) -> Option<(usize, usize)> {
    bundles.iter().enumerate().find_map(|(index, bundle)| {
        bundle.position(order_id).map(|position| (index, position))
    })
}

fn total_with(costs: &[Cost], replaced: usize, replacement: Cost) -> Cost {
    costs
        .iter()
        .enumerate()
        .map(|(index, &cost)| if index == replaced { replacement } else { cost })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::restaurant::RestaurantIdx,
        test_utils::{self, TestOrder},
    };

    fn total_cost(problem: &DispatchProblem, bundles: &[Route]) -> Cost {
        bundles
            .iter()
            .map(|bundle| bundle.cost(problem, &CostWeights::default()))
            .sum()
    }

    #[test]
    fn test_relocate_moves_order_to_closer_bundle() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[
                TestOrder::new(0.0, 10.0).ready(2.0),
                TestOrder::new(0.0, 100.0).ready(2.0),
                TestOrder::new(0.0, 110.0).ready(2.0),
                TestOrder::new(0.0, -100.0).ready(2.0),
            ],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        let restaurant_id = RestaurantIdx::new(0);
        let mut bundles = vec![
            Route::new(restaurant_id, [OrderIdx::new(0), OrderIdx::new(1)]),
            Route::new(restaurant_id, [OrderIdx::new(3), OrderIdx::new(2)]),
        ];
        let before = total_cost(&problem, &bundles);

        relocate_orders(&problem, &CostWeights::default(), &mut bundles);

        assert!(total_cost(&problem, &bundles) < before);
        assert!(bundles.iter().all(|bundle| !bundle.is_empty()));
        assert_eq!(bundles.iter().map(Route::len).sum::<usize>(), 4);
    }

    #[test]
    fn test_relocate_keeps_optimal_configuration() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[
                TestOrder::new(0.0, 10.0).placed(0.0).ready(2.0),
                TestOrder::new(0.0, 20.0).placed(1.0).ready(3.0),
            ],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        let route = Route::new(RestaurantIdx::new(0), [OrderIdx::new(0), OrderIdx::new(1)]);
        let mut bundles = vec![route.clone()];

        relocate_orders(&problem, &CostWeights::default(), &mut bundles);

        assert_eq!(bundles, vec![route]);
    }

    #[test]
    fn test_relocate_drops_emptied_bundles() {
        // Two orders at the same drop point are cheaper served together.
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[
                TestOrder::new(0.0, 10.0).ready(2.0),
                TestOrder::new(0.0, 10.0).ready(2.0),
            ],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        let restaurant_id = RestaurantIdx::new(0);
        let mut bundles = vec![
            Route::new(restaurant_id, [OrderIdx::new(0)]),
            Route::new(restaurant_id, [OrderIdx::new(1)]),
        ];
        assert_eq!(total_cost(&problem, &bundles), 41.0 + 41.0);

        relocate_orders(&problem, &CostWeights::default(), &mut bundles);

        assert_eq!(
            bundles,
            vec![Route::new(restaurant_id, [OrderIdx::new(0), OrderIdx::new(1)])]
        );
        assert_eq!(total_cost(&problem, &bundles), 81.0);
    }
}
