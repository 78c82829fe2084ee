use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    dispatch::{route::Route, state::DispatchState},
    error::DispatchError,
    problem::{courier::CourierIdx, dispatch_problem::DispatchProblem, travel_times::Minutes},
};

pub mod greedy;
pub mod optimal;

pub use greedy::GreedyMatcher;
pub use optimal::OptimalMatcher;

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Bundles in construction order each take their best free courier.
    #[default]
    Greedy,
    /// Minimum-cost assignment over all bundles of the epoch.
    Optimal,
}

impl MatchingStrategy {
    pub fn matcher(&self, unassigned_penalty: Minutes) -> Matcher {
        match self {
            MatchingStrategy::Greedy => Matcher::Greedy(GreedyMatcher),
            MatchingStrategy::Optimal => Matcher::Optimal(OptimalMatcher { unassigned_penalty }),
        }
    }
}

/// Bundle at `bundle` (index into the epoch's flattened bundle list) goes to
/// `courier_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleMatch {
    pub bundle: usize,
    pub courier_id: CourierIdx,
}

/// A feasible courier for a bundle at the current epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub courier_id: CourierIdx,
    pub arrival_time: Minutes,
    /// `max(0, arrival - ready)`.
    pub pickup_delay: Minutes,
}

pub trait BundleMatcher {
    /// Each bundle is matched to at most one courier and each courier
    /// receives at most one bundle. Only pairs accepted by `can_assign` are
    /// ever returned. Matches come back ordered by bundle index.
    fn match_bundles(
        &self,
        problem: &DispatchProblem,
        state: &DispatchState,
        t: Minutes,
        bundles: &[Route],
        couriers: &[CourierIdx],
    ) -> Result<Vec<BundleMatch>, DispatchError>;
}

pub enum Matcher {
    Greedy(GreedyMatcher),
    Optimal(OptimalMatcher),
}

impl BundleMatcher for Matcher {
    fn match_bundles(
        &self,
        problem: &DispatchProblem,
        state: &DispatchState,
        t: Minutes,
        bundles: &[Route],
        couriers: &[CourierIdx],
    ) -> Result<Vec<BundleMatch>, DispatchError> {
        match self {
            Matcher::Greedy(matcher) => matcher.match_bundles(problem, state, t, bundles, couriers),
            Matcher::Optimal(matcher) => {
                matcher.match_bundles(problem, state, t, bundles, couriers)
            }
        }
    }
}

/// Feasible couriers of every bundle, in the order of `couriers`.
pub fn candidates(
    problem: &DispatchProblem,
    state: &DispatchState,
    t: Minutes,
    bundles: &[Route],
    couriers: &[CourierIdx],
) -> Result<Vec<Vec<Candidate>>, DispatchError> {
    bundles
        .iter()
        .map(|bundle| {
            let ready_time = bundle
                .ready_time(problem)
                .ok_or(DispatchError::EmptyBundle)?;

            let mut feasible = Vec::new();
            for &courier_id in couriers {
                if !state.can_assign(problem, t, courier_id, bundle)? {
                    continue;
                }
                let arrival_time =
                    state.arrival_time(problem, t, courier_id, bundle.restaurant_id());
                feasible.push(Candidate {
                    courier_id,
                    arrival_time,
                    pickup_delay: (arrival_time - ready_time).max(0.0),
                });
            }
            Ok(feasible)
        })
        .collect()
}
