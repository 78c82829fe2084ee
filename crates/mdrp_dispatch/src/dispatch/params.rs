use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    dispatch::{commitment::CommitmentStrategy, matching::MatchingStrategy},
    error::DispatchError,
    problem::travel_times::Minutes,
};

/// Weights of the bundle cost `travel + beta * delay + gamma * waiting`.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq)]
pub struct CostWeights {
    pub beta: f64,
    pub gamma: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            beta: 10.0,
            gamma: 10.0,
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => *num,
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchParams {
    /// Width of a decision epoch.
    pub epoch_minutes: u32,
    /// Orders ready and couriers available within this look-ahead are
    /// considered at an epoch.
    pub assignment_horizon: Minutes,
    pub beta: f64,
    pub gamma: f64,
    /// A tentative assignment becomes final once the spread between the route
    /// ready time and one of its order ready times reaches this value.
    pub staleness_threshold: Minutes,
    /// Target bundle size used when no courier is idle.
    pub default_bundle_size: usize,
    /// Last epoch start.
    pub horizon_end: u32,
    pub commitment: CommitmentStrategy,
    pub matching: MatchingStrategy,
    /// Cost of leaving a bundle unmatched in the optimal matcher, in minutes
    /// of pickup delay.
    pub unassigned_penalty: Minutes,
    pub enable_local_search: bool,
    pub close_open_assignments: bool,
    pub threads: Threads,
}

impl Default for DispatchParams {
    fn default() -> Self {
        let weights = CostWeights::default();
        Self {
            epoch_minutes: 5,
            assignment_horizon: 10.0,
            beta: weights.beta,
            gamma: weights.gamma,
            staleness_threshold: 25.0,
            default_bundle_size: 2,
            horizon_end: 1440,
            commitment: CommitmentStrategy::default(),
            matching: MatchingStrategy::default(),
            unassigned_penalty: 1.0,
            enable_local_search: true,
            close_open_assignments: true,
            threads: Threads::Single,
        }
    }
}

impl DispatchParams {
    #[inline]
    pub fn weights(&self) -> CostWeights {
        CostWeights {
            beta: self.beta,
            gamma: self.gamma,
        }
    }

    #[inline]
    pub fn epoch_width(&self) -> Minutes {
        self.epoch_minutes as Minutes
    }

    /// Epoch start times `F, 2F, ...` up to and including `horizon_end`.
    pub fn epochs(&self) -> impl Iterator<Item = u32> + Clone {
        let step = self.epoch_minutes.max(1);
        (1..=self.horizon_end / step).map(move |i| i * step)
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.epoch_minutes == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "epoch_minutes must be positive".to_owned(),
            ));
        }
        if self.horizon_end < self.epoch_minutes {
            return Err(DispatchError::InvalidConfiguration(format!(
                "horizon_end ({}) is shorter than one epoch ({})",
                self.horizon_end, self.epoch_minutes
            )));
        }
        if self.default_bundle_size == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "default_bundle_size must be at least 1".to_owned(),
            ));
        }

        let non_negative = [
            ("assignment_horizon", self.assignment_horizon),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("staleness_threshold", self.staleness_threshold),
            ("unassigned_penalty", self.unassigned_penalty),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DispatchError::InvalidConfiguration(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if let Threads::Multi(0) = self.threads {
            return Err(DispatchError::InvalidConfiguration(
                "threads must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }
}
