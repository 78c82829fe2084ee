use std::{collections::BTreeMap, sync::Arc};

use rayon::prelude::*;
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    dispatch::{
        construction::{RestaurantBundles, construct_restaurant_bundles, group_by_restaurant},
        epochs::EpochBins,
        local_search::relocate_orders,
        matching::BundleMatcher,
        outcome::{BundlePlan, DispatchOutcome, EpochDecision, MatchedBundle},
        params::DispatchParams,
        route::Route,
        state::DispatchState,
    },
    error::DispatchError,
    problem::{dispatch_problem::DispatchProblem, order::OrderIdx, travel_times::Minutes},
    timer_debug,
};

/// Rolling-horizon dispatch over one problem.
pub struct Dispatcher {
    problem: Arc<DispatchProblem>,
    params: DispatchParams,
    thread_pool: rayon::ThreadPool,
}

impl Dispatcher {
    pub fn new(
        problem: Arc<DispatchProblem>,
        params: DispatchParams,
    ) -> Result<Self, DispatchError> {
        params.validate()?;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads.number_of_threads())
            .build()
            .map_err(|error| DispatchError::InvalidConfiguration(error.to_string()))?;

        Ok(Self {
            problem,
            params,
            thread_pool,
        })
    }

    pub fn problem(&self) -> &DispatchProblem {
        &self.problem
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Full dispatch: construction, local search, matching and commitment at
    /// every epoch, strictly in time order.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn run(&self) -> Result<DispatchOutcome, DispatchError> {
        let problem = self.problem.as_ref();
        let params = &self.params;

        let bins = EpochBins::new(problem, params);
        let matcher = params.matching.matcher(params.unassigned_penalty);
        let mut state = DispatchState::new(problem);
        let mut epochs = BTreeMap::new();
        let mut unassigned = Vec::new();

        for epoch in params.epochs() {
            let ready_orders = bins.orders_at(epoch);
            if ready_orders.is_empty() {
                continue;
            }

            let t = epoch as Minutes;
            let idle_couriers = state.idle_couriers(problem, t, params.assignment_horizon);
            let bundle_size = self.bundle_size(ready_orders.len(), idle_couriers.len());

            let bundles =
                self.build_epoch_bundles(ready_orders, bundle_size, params.enable_local_search);
            if bundles.is_empty() {
                continue;
            }

            let routes = bundles
                .iter()
                .flat_map(|restaurant| restaurant.bundles.iter().cloned())
                .collect::<Vec<Route>>();

            let bundle_matches = timer_debug!(
                "Matched bundles",
                matcher.match_bundles(problem, &state, t, &routes, &idle_couriers)?
            );

            let mut is_matched = vec![false; routes.len()];
            let mut matches = Vec::with_capacity(bundle_matches.len());
            for bundle_match in bundle_matches {
                let route = routes[bundle_match.bundle].clone();
                let is_final = state.assign_bundle(
                    problem,
                    params,
                    t,
                    bundle_match.courier_id,
                    route.clone(),
                )?;
                is_matched[bundle_match.bundle] = true;
                matches.push(MatchedBundle {
                    courier_id: bundle_match.courier_id,
                    route,
                    is_final,
                });
            }

            let epoch_unassigned = routes
                .iter()
                .zip(&is_matched)
                .filter(|&(_, &matched)| !matched)
                .flat_map(|(route, _)| route.orders().iter().copied())
                .collect::<Vec<OrderIdx>>();

            if !epoch_unassigned.is_empty() {
                warn!(
                    epoch,
                    orders = epoch_unassigned.len(),
                    "Bundles left without courier"
                );
            }

            debug!(
                epoch,
                ready_orders = ready_orders.len(),
                idle_couriers = idle_couriers.len(),
                bundle_size,
                bundles = routes.len(),
                matched = matches.len(),
                "Epoch dispatched"
            );

            unassigned.extend_from_slice(&epoch_unassigned);
            epochs.insert(
                epoch,
                EpochDecision {
                    bundles,
                    matches,
                    unassigned: epoch_unassigned,
                },
            );
        }

        if params.close_open_assignments {
            state.close_open_assignments(problem);
        }

        let outcome = DispatchOutcome {
            epochs,
            state,
            unassigned,
            unbinned: bins.unbinned().to_vec(),
        };

        info!(
            epochs = outcome.epochs.len(),
            assigned = outcome.assigned_count(),
            unassigned = outcome.unassigned.len(),
            unbinned = outcome.unbinned.len(),
            cost = outcome.total_cost(problem, &params.weights()),
            "Dispatch finished"
        );

        Ok(outcome)
    }

    /// Bundle construction alone at every epoch, assuming every courier stays
    /// at its initial state.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn plan_bundles(&self) -> BundlePlan {
        let problem = self.problem.as_ref();
        let params = &self.params;

        let bins = EpochBins::new(problem, params);
        let state = DispatchState::new(problem);
        let mut plan = BundlePlan::default();

        for (epoch, ready_orders) in bins.iter() {
            let idle_couriers =
                state.idle_couriers(problem, epoch as Minutes, params.assignment_horizon);
            let bundle_size = self.bundle_size(ready_orders.len(), idle_couriers.len());

            let bundles = self.build_epoch_bundles(ready_orders, bundle_size, false);
            if !bundles.is_empty() {
                plan.epochs.insert(epoch, Arc::new(bundles));
            }
        }

        info!(
            epochs = plan.epochs.len(),
            bundles = plan.bundle_count(),
            orders = plan.order_count(),
            "Bundle plan built"
        );

        plan
    }

    fn bundle_size(&self, ready_orders: usize, idle_couriers: usize) -> usize {
        if idle_couriers == 0 {
            self.params.default_bundle_size
        } else {
            ready_orders.div_ceil(idle_couriers)
        }
    }

    /// Restaurants are independent within an epoch, so they are built on the
    /// thread pool and collected back in restaurant order.
    fn build_epoch_bundles(
        &self,
        ready_orders: &[OrderIdx],
        bundle_size: usize,
        local_search: bool,
    ) -> Vec<RestaurantBundles> {
        let problem = self.problem.as_ref();
        let weights = self.params.weights();
        let groups = group_by_restaurant(problem, ready_orders);

        self.thread_pool.install(|| {
            groups
                .par_iter()
                .map(|(restaurant_id, orders)| {
                    let mut bundles = construct_restaurant_bundles(
                        problem,
                        &weights,
                        *restaurant_id,
                        orders,
                        bundle_size,
                    );
                    if local_search {
                        relocate_orders(problem, &weights, &mut bundles);
                    }
                    RestaurantBundles {
                        restaurant_id: *restaurant_id,
                        bundles,
                    }
                })
                .filter(|restaurant| !restaurant.bundles.is_empty())
                .collect()
        })
    }
}
