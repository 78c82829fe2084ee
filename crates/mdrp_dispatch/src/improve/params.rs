use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Duration(SignedDuration),
    Iterations(usize),
    IterationsWithoutImprovement(usize),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ImprovementParams {
    /// The search stops as soon as any of these is reached.
    pub terminations: Vec<Termination>,
    pub seed: u64,
}

impl Default for ImprovementParams {
    fn default() -> Self {
        Self {
            terminations: vec![
                Termination::Iterations(10_000),
                Termination::IterationsWithoutImprovement(2_000),
                Termination::Duration(SignedDuration::from_secs(60)),
            ],
            seed: 42,
        }
    }
}
