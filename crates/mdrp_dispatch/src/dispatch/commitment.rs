use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::travel_times::Minutes;

/// When a courier/bundle pair is committed for good instead of being kept
/// open for consolidation with later bundles of the same restaurant.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentStrategy {
    /// Every assignment is final immediately.
    NoCommitment,
    /// Final when the courier reaches the restaurant and the bundle is ready
    /// before the next epoch.
    ArrivalAndReady,
    /// As [`CommitmentStrategy::ArrivalAndReady`], or when the bundle is ready
    /// before the next epoch and no later than the courier's arrival.
    #[default]
    ArrivalOrEarlyReady,
}

impl CommitmentStrategy {
    pub fn should_commit(
        &self,
        next_epoch: Minutes,
        arrival_time: Minutes,
        ready_time: Minutes,
    ) -> bool {
        let ready_by_next_epoch = ready_time <= next_epoch;
        match self {
            CommitmentStrategy::NoCommitment => true,
            CommitmentStrategy::ArrivalAndReady => {
                arrival_time <= next_epoch && ready_by_next_epoch
            }
            CommitmentStrategy::ArrivalOrEarlyReady => {
                (arrival_time <= next_epoch && ready_by_next_epoch)
                    || (ready_by_next_epoch && ready_time <= arrival_time)
            }
        }
    }
}
