use std::sync::Arc;

use jiff::Timestamp;
use rand::{SeedableRng, rngs::SmallRng};
use tracing::{Level, debug, info, instrument};

use crate::{
    dispatch::{outcome::BundlePlan, params::CostWeights},
    improve::{
        destroy::{DestroyOperator, RandomOrderRemoval},
        params::{ImprovementParams, Termination},
        repair::{GreedyReinsertion, RepairOperator},
    },
    problem::{dispatch_problem::DispatchProblem, travel_times::Cost},
};

#[derive(Debug, Clone)]
pub struct ImprovementResult {
    pub plan: BundlePlan,
    pub initial_cost: Cost,
    pub cost: Cost,
    pub iterations: usize,
    pub improvements: usize,
}

struct SearchProgress {
    start: Timestamp,
    iteration: usize,
    iterations_without_improvement: usize,
}

/// Destroy/repair hill climbing over a [`BundlePlan`].
///
/// Each iteration removes one random order and reinserts it greedily. The
/// candidate replaces the current plan when it costs no more.
pub struct PlanImprover {
    problem: Arc<DispatchProblem>,
    weights: CostWeights,
    params: ImprovementParams,
}

impl PlanImprover {
    pub fn new(
        problem: Arc<DispatchProblem>,
        weights: CostWeights,
        params: ImprovementParams,
    ) -> Self {
        Self {
            problem,
            weights,
            params,
        }
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn improve(&self, plan: BundlePlan) -> ImprovementResult {
        let problem = self.problem.as_ref();
        let mut rng = SmallRng::seed_from_u64(self.params.seed);

        let initial_cost = plan.total_cost(problem, &self.weights);
        let mut current = plan;
        let mut current_cost = initial_cost;
        let mut improvements = 0;
        let mut progress = SearchProgress {
            start: Timestamp::now(),
            iteration: 0,
            iterations_without_improvement: 0,
        };

        while !self.should_terminate(&progress) {
            let mut candidate = current.clone();

            let Some(removed) = RandomOrderRemoval.destroy(problem, &mut candidate, &mut rng)
            else {
                break;
            };
            progress.iteration += 1;

            if !GreedyReinsertion.repair(problem, &self.weights, &mut candidate, removed) {
                progress.iterations_without_improvement += 1;
                continue;
            }
            candidate.prune_empty();

            let candidate_cost = candidate.total_cost(problem, &self.weights);
            if candidate_cost < current_cost {
                improvements += 1;
                progress.iterations_without_improvement = 0;
                debug!(
                    iteration = progress.iteration,
                    cost = candidate_cost,
                    "Improved bundle plan"
                );
            } else {
                progress.iterations_without_improvement += 1;
            }

            if candidate_cost <= current_cost {
                current = candidate;
                current_cost = candidate_cost;
            }
        }

        info!(
            iterations = progress.iteration,
            improvements,
            initial_cost,
            cost = current_cost,
            "Plan improvement finished"
        );

        ImprovementResult {
            plan: current,
            initial_cost,
            cost: current_cost,
            iterations: progress.iteration,
            improvements,
        }
    }

    fn should_terminate(&self, progress: &SearchProgress) -> bool {
        self.params
            .terminations
            .iter()
            .any(|termination| match *termination {
                Termination::Iterations(max_iterations) => progress.iteration >= max_iterations,
                Termination::IterationsWithoutImprovement(max_iterations) => {
                    progress.iterations_without_improvement >= max_iterations
                }
                Termination::Duration(max_duration) => {
                    Timestamp::now().duration_since(progress.start) > max_duration
                }
            })
    }
}
