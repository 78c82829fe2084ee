use std::{collections::BTreeMap, sync::Arc};

use crate::{
    dispatch::{
        construction::RestaurantBundles, params::CostWeights, route::Route, state::DispatchState,
    },
    problem::{
        courier::CourierIdx, dispatch_problem::DispatchProblem, order::OrderIdx, travel_times::Cost,
    },
};

/// A bundle handed to a courier at some epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedBundle {
    pub courier_id: CourierIdx,
    pub route: Route,
    /// Whether the courier's assignment was final right after this bundle.
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochDecision {
    pub bundles: Vec<RestaurantBundles>,
    pub matches: Vec<MatchedBundle>,
    /// Orders of bundles no courier could take at this epoch.
    pub unassigned: Vec<OrderIdx>,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub epochs: BTreeMap<u32, EpochDecision>,
    pub state: DispatchState,
    pub unassigned: Vec<OrderIdx>,
    /// Orders whose epoch lies past the end of the horizon.
    pub unbinned: Vec<OrderIdx>,
}

impl DispatchOutcome {
    /// Sum of the costs of all courier assignments, merged routes included.
    pub fn total_cost(&self, problem: &DispatchProblem, weights: &CostWeights) -> Cost {
        self.state
            .assignments()
            .map(|assignment| assignment.route().cost(problem, weights))
            .sum()
    }

    pub fn assigned_count(&self) -> usize {
        self.state
            .assignments()
            .map(|assignment| assignment.route().len())
            .sum()
    }
}

/// Bundles of every epoch without any courier matching.
///
/// Epochs are shared behind `Arc` so that perturbed copies only clone the
/// epochs they touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundlePlan {
    pub epochs: BTreeMap<u32, Arc<Vec<RestaurantBundles>>>,
}

impl BundlePlan {
    pub fn total_cost(&self, problem: &DispatchProblem, weights: &CostWeights) -> Cost {
        self.routes()
            .map(|route| route.cost(problem, weights))
            .sum()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.epochs
            .values()
            .flat_map(|restaurants| restaurants.iter())
            .flat_map(|restaurant| restaurant.bundles.iter())
    }

    pub fn order_count(&self) -> usize {
        self.routes().map(Route::len).sum()
    }

    pub fn bundle_count(&self) -> usize {
        self.routes().count()
    }

    /// Drops empty bundles, restaurants and epochs. Only epochs holding an
    /// empty bundle are copied.
    pub fn prune_empty(&mut self) {
        for restaurants in self.epochs.values_mut() {
            let has_empty = restaurants
                .iter()
                .any(|restaurant| restaurant.bundles.iter().any(Route::is_empty));
            if !has_empty {
                continue;
            }

            let restaurants = Arc::make_mut(restaurants);
            for restaurant in restaurants.iter_mut() {
                restaurant.bundles.retain(|route| !route.is_empty());
            }
            restaurants.retain(|restaurant| !restaurant.bundles.is_empty());
        }
        self.epochs.retain(|_, restaurants| !restaurants.is_empty());
    }

    /// `(epoch, order)` for every planned order in epoch order.
    pub fn planned_orders(&self) -> Vec<(u32, OrderIdx)> {
        self.epochs
            .iter()
            .flat_map(|(&epoch, restaurants)| {
                restaurants
                    .iter()
                    .flat_map(|restaurant| restaurant.bundles.iter())
                    .flat_map(move |route| route.orders().iter().map(move |&order| (epoch, order)))
            })
            .collect()
    }
}
