use std::collections::BTreeMap;

use crate::{
    dispatch::params::DispatchParams,
    problem::{dispatch_problem::DispatchProblem, order::OrderIdx, travel_times::Minutes},
};

/// Orders of every decision epoch, computed once before the loop starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpochBins {
    bins: BTreeMap<u32, Vec<OrderIdx>>,
    unbinned: Vec<OrderIdx>,
}

impl EpochBins {
    /// An order placed in `[t - F, t)` belongs to epoch `t` when it is ready
    /// before `t + assignment_horizon`, otherwise to the earliest later epoch
    /// of the grid it is ready for. Orders that fall outside the horizon are
    /// kept aside in [`EpochBins::unbinned`].
    pub fn new(problem: &DispatchProblem, params: &DispatchParams) -> Self {
        let width = params.epoch_minutes;
        let horizon = params.assignment_horizon;

        let mut bins: BTreeMap<u32, Vec<OrderIdx>> = BTreeMap::new();
        let mut unbinned = Vec::new();

        for order_id in OrderIdx::all(problem.orders().len()) {
            let order = problem.order(order_id);
            let placement_time = order.placement_time();

            if placement_time < 0.0 {
                unbinned.push(order_id);
                continue;
            }

            let placement_epoch = ((placement_time / width as Minutes).floor() as u32 + 1) * width;
            let epoch = deferred_epoch(placement_epoch, width, horizon, order.ready_time());

            if epoch > params.horizon_end {
                unbinned.push(order_id);
            } else {
                bins.entry(epoch).or_default().push(order_id);
            }
        }

        Self { bins, unbinned }
    }

    pub fn orders_at(&self, epoch: u32) -> &[OrderIdx] {
        self.bins.get(&epoch).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[OrderIdx])> {
        self.bins
            .iter()
            .map(|(&epoch, orders)| (epoch, orders.as_slice()))
    }

    pub fn binned_count(&self) -> usize {
        self.bins.values().map(Vec::len).sum()
    }

    pub fn unbinned(&self) -> &[OrderIdx] {
        &self.unbinned
    }
}

fn deferred_epoch(placement_epoch: u32, width: u32, horizon: Minutes, ready_time: Minutes) -> u32 {
    let cutoff = placement_epoch as Minutes + horizon;
    if ready_time < cutoff {
        return placement_epoch;
    }

    let steps = ((ready_time - cutoff) / width as Minutes).floor() as u32 + 1;
    placement_epoch + steps * width
}
