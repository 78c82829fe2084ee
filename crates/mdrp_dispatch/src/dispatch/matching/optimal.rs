use pathfinding::kuhn_munkres::{Weights, kuhn_munkres};
use tracing::{Level, instrument};

use crate::{
    dispatch::{
        matching::{BundleMatch, BundleMatcher, candidates},
        route::Route,
        state::DispatchState,
    },
    error::DispatchError,
    problem::{courier::CourierIdx, dispatch_problem::DispatchProblem, travel_times::Minutes},
};

/// Minutes are scaled to integer weights; half-minute service times stay exact.
const SCALE: f64 = 1_000.0;

/// Weight of a forbidden pair. Far below any feasible total but small enough
/// that negating and summing a row never overflows.
const FORBIDDEN: i64 = -1_000_000_000_000_i64;

struct I64Weights {
    rows: usize,
    columns: usize,
    values: Vec<i64>,
}

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.values[row * self.columns + col]
    }

    fn neg(&self) -> Self {
        I64Weights {
            rows: self.rows,
            columns: self.columns,
            values: self.values.iter().map(|&x| x.saturating_neg()).collect(),
        }
    }
}

fn to_weight(cost: Minutes) -> i64 {
    -(cost * SCALE).round() as i64
}

/// Solves the epoch matching exactly as a rectangular assignment problem.
///
/// Rows are bundles. Columns are the idle couriers followed by one pseudo
/// courier per bundle. A real pair costs its pickup delay, a bundle left to
/// its pseudo courier costs `unassigned_penalty`. Pairs rejected by
/// `can_assign` and pseudo couriers of other bundles are forbidden.
#[derive(Debug, Clone, Copy)]
pub struct OptimalMatcher {
    pub unassigned_penalty: Minutes,
}

impl Default for OptimalMatcher {
    fn default() -> Self {
        Self {
            unassigned_penalty: 1.0,
        }
    }
}

impl BundleMatcher for OptimalMatcher {
    #[instrument(skip_all, level = Level::DEBUG)]
    fn match_bundles(
        &self,
        problem: &DispatchProblem,
        state: &DispatchState,
        t: Minutes,
        bundles: &[Route],
        couriers: &[CourierIdx],
    ) -> Result<Vec<BundleMatch>, DispatchError> {
        if bundles.is_empty() || couriers.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = candidates(problem, state, t, bundles, couriers)?;

        let rows = bundles.len();
        let columns = couriers.len() + rows;
        let mut values = vec![FORBIDDEN; rows * columns];

        for (row, feasible) in candidates.iter().enumerate() {
            for candidate in feasible {
                let Some(column) = couriers.iter().position(|&id| id == candidate.courier_id)
                else {
                    continue;
                };
                values[row * columns + column] = to_weight(candidate.pickup_delay);
            }
            values[row * columns + couriers.len() + row] = to_weight(self.unassigned_penalty);
        }

        let weights = I64Weights {
            rows,
            columns,
            values,
        };
        let (_total, assignments) = kuhn_munkres(&weights);

        let matches = assignments
            .iter()
            .enumerate()
            .filter(|&(row, &column)| {
                column < couriers.len() && weights.at(row, column) > FORBIDDEN
            })
            .map(|(bundle, &column)| BundleMatch {
                bundle,
                courier_id: couriers[column],
            })
            .collect();

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dispatch::matching::GreedyMatcher,
        problem::{order::OrderIdx, restaurant::RestaurantIdx},
        test_utils::{self, TestOrder},
    };

    fn patient() -> OptimalMatcher {
        OptimalMatcher {
            unassigned_penalty: 1_000.0,
        }
    }

    #[test]
    fn test_swaps_couriers_to_reduce_total_delay() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0), (0.0, -50.0)],
            &[
                TestOrder::new(10.0, 0.0).ready(19.0),
                TestOrder::new(0.0, -60.0).ready(9.0).restaurant(1),
            ],
            &[(0.0, 100.0, 0.0, 200.0), (0.0, 0.0, 0.0, 200.0)],
        );
        let state = DispatchState::new(&problem);
        let bundles = vec![
            Route::new(RestaurantIdx::new(0), [OrderIdx::new(0)]),
            Route::new(RestaurantIdx::new(1), [OrderIdx::new(1)]),
        ];
        let couriers = [CourierIdx::new(0), CourierIdx::new(1)];

        let optimal = patient()
            .match_bundles(&problem, &state, 5.0, &bundles, &couriers)
            .unwrap();
        let greedy = GreedyMatcher
            .match_bundles(&problem, &state, 5.0, &bundles, &couriers)
            .unwrap();

        // both couriers reach restaurant 0 in time, only courier 1 is close to
        // restaurant 1
        assert_eq!(
            optimal,
            vec![
                BundleMatch {
                    bundle: 0,
                    courier_id: CourierIdx::new(0)
                },
                BundleMatch {
                    bundle: 1,
                    courier_id: CourierIdx::new(1)
                },
            ]
        );
        assert_eq!(greedy[0].courier_id, CourierIdx::new(1));
    }

    #[test]
    fn test_forbidden_pairs_are_never_matched() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[TestOrder::new(0.0, 10.0).ready(50.0)],
            &[(0.0, 0.0, 0.0, 5.0)],
        );
        let state = DispatchState::new(&problem);
        let bundles = vec![Route::new(RestaurantIdx::new(0), [OrderIdx::new(0)])];

        let matches = patient()
            .match_bundles(&problem, &state, 5.0, &bundles, &[CourierIdx::new(0)])
            .unwrap();

        assert!(matches.is_empty());
    }

    #[test]
    fn test_default_penalty_leaves_late_bundles_unassigned() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[TestOrder::new(0.0, 10.0).ready(5.0)],
            &[(0.0, 100.0, 0.0, 200.0)],
        );
        let state = DispatchState::new(&problem);
        let bundles = vec![Route::new(RestaurantIdx::new(0), [OrderIdx::new(0)])];
        let couriers = [CourierIdx::new(0)];

        // arrival at 19 means a pickup delay of 14 minutes
        let matches = OptimalMatcher::default()
            .match_bundles(&problem, &state, 5.0, &bundles, &couriers)
            .unwrap();
        assert!(matches.is_empty());

        let matches = patient()
            .match_bundles(&problem, &state, 5.0, &bundles, &couriers)
            .unwrap();
        assert_eq!(matches.len(), 1);
    }
}
