use fxhash::FxHashSet;

use crate::{
    dispatch::{
        matching::{BundleMatch, BundleMatcher, Candidate, candidates},
        route::Route,
        state::DispatchState,
    },
    error::DispatchError,
    problem::{courier::CourierIdx, dispatch_problem::DispatchProblem, travel_times::Minutes},
};

/// Visits bundles in construction order and gives each one the free courier
/// with the smallest pickup delay, then the earliest arrival, then the lowest
/// index.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyMatcher;

impl BundleMatcher for GreedyMatcher {
    fn match_bundles(
        &self,
        problem: &DispatchProblem,
        state: &DispatchState,
        t: Minutes,
        bundles: &[Route],
        couriers: &[CourierIdx],
    ) -> Result<Vec<BundleMatch>, DispatchError> {
        let candidates = candidates(problem, state, t, bundles, couriers)?;
        let mut used = FxHashSet::default();
        let mut matches = Vec::new();

        for (bundle, feasible) in candidates.iter().enumerate() {
            let best = feasible
                .iter()
                .filter(|candidate| !used.contains(&candidate.courier_id))
                .min_by(|a, b| compare(a, b));

            if let Some(candidate) = best {
                used.insert(candidate.courier_id);
                matches.push(BundleMatch {
                    bundle,
                    courier_id: candidate.courier_id,
                });
            }
        }

        Ok(matches)
    }
}

fn compare(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
    a.pickup_delay
        .total_cmp(&b.pickup_delay)
        .then(a.arrival_time.total_cmp(&b.arrival_time))
        .then(a.courier_id.cmp(&b.courier_id))
}
