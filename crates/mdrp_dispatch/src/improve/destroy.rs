use std::sync::Arc;

use rand::{Rng, seq::IndexedRandom};

use crate::{
    dispatch::outcome::BundlePlan,
    problem::{dispatch_problem::DispatchProblem, order::OrderIdx},
};

/// An order taken out of a plan, waiting to be reinserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedOrder {
    pub order_id: OrderIdx,
    /// Epoch the order was planned at before removal.
    pub epoch: u32,
}

pub trait DestroyOperator {
    fn destroy<R>(
        &self,
        problem: &DispatchProblem,
        plan: &mut BundlePlan,
        rng: &mut R,
    ) -> Option<RemovedOrder>
    where
        R: Rng;
}

/// Removes one order picked uniformly among all planned orders. The bundle it
/// leaves is kept, even when empty, so the order can always go back.
pub struct RandomOrderRemoval;

impl DestroyOperator for RandomOrderRemoval {
    fn destroy<R>(
        &self,
        _problem: &DispatchProblem,
        plan: &mut BundlePlan,
        rng: &mut R,
    ) -> Option<RemovedOrder>
    where
        R: Rng,
    {
        let planned = plan.planned_orders();
        let &(epoch, order_id) = planned.choose(rng)?;

        let restaurants = Arc::make_mut(plan.epochs.get_mut(&epoch)?);
        let route = restaurants
            .iter_mut()
            .flat_map(|restaurant| restaurant.bundles.iter_mut())
            .find(|route| route.contains(order_id))?;
        let position = route.position(order_id)?;
        route.remove(position);

        Some(RemovedOrder { order_id, epoch })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::{
        dispatch::{construction::RestaurantBundles, route::Route},
        problem::restaurant::RestaurantIdx,
        test_utils::{self, TestOrder},
    };

    #[test]
    fn test_removal_only_copies_touched_epoch() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[TestOrder::new(0.0, 10.0), TestOrder::new(0.0, 20.0)],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        let restaurant_id = RestaurantIdx::new(0);
        let mut plan = BundlePlan::default();
        plan.epochs.insert(
            5,
            Arc::new(vec![RestaurantBundles {
                restaurant_id,
                bundles: vec![Route::new(restaurant_id, [OrderIdx::new(0)])],
            }]),
        );
        plan.epochs.insert(
            10,
            Arc::new(vec![RestaurantBundles {
                restaurant_id,
                bundles: vec![Route::new(restaurant_id, [OrderIdx::new(1)])],
            }]),
        );
        let original = plan.clone();
        let mut rng = SmallRng::seed_from_u64(7);

        let removed = RandomOrderRemoval
            .destroy(&problem, &mut plan, &mut rng)
            .unwrap();

        assert_eq!(plan.order_count(), 1);
        assert_eq!(original.order_count(), 2);

        let untouched = if removed.epoch == 5 { 10 } else { 5 };
        assert!(Arc::ptr_eq(&plan.epochs[&untouched], &original.epochs[&untouched]));
        assert!(!Arc::ptr_eq(&plan.epochs[&removed.epoch], &original.epochs[&removed.epoch]));
    }

    #[test]
    fn test_empty_plan_removes_nothing() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0)],
            &[TestOrder::new(0.0, 10.0)],
            &[(0.0, 0.0, 0.0, 100.0)],
        );
        let mut plan = BundlePlan::default();
        let mut rng = SmallRng::seed_from_u64(7);

        assert!(RandomOrderRemoval.destroy(&problem, &mut plan, &mut rng).is_none());
    }
}
