use std::{fs::File, io::BufReader, path::PathBuf};

use clap::{Args, ValueEnum};
use mdrp_dispatch::dispatch::{
    commitment::CommitmentStrategy,
    matching::MatchingStrategy,
    params::{DispatchParams, Threads},
};

#[derive(ValueEnum, Clone, Copy)]
pub enum MatchingArg {
    Greedy,
    Optimal,
}

impl From<MatchingArg> for MatchingStrategy {
    fn from(value: MatchingArg) -> Self {
        match value {
            MatchingArg::Greedy => MatchingStrategy::Greedy,
            MatchingArg::Optimal => MatchingStrategy::Optimal,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
pub enum CommitmentArg {
    None,
    ArrivalAndReady,
    ArrivalOrEarlyReady,
}

impl From<CommitmentArg> for CommitmentStrategy {
    fn from(value: CommitmentArg) -> Self {
        match value {
            CommitmentArg::None => CommitmentStrategy::NoCommitment,
            CommitmentArg::ArrivalAndReady => CommitmentStrategy::ArrivalAndReady,
            CommitmentArg::ArrivalOrEarlyReady => CommitmentStrategy::ArrivalOrEarlyReady,
        }
    }
}

/// Dispatch parameters shared by the subcommands. Flags override the values
/// read from `--config`.
#[derive(Args)]
pub struct DispatchConfigArgs {
    /// JSON file with dispatch parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 0 runs on all available cores
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(long, value_enum)]
    matching: Option<MatchingArg>,

    #[arg(long, value_enum)]
    commitment: Option<CommitmentArg>,

    #[arg(long)]
    epoch_minutes: Option<u32>,

    #[arg(long)]
    horizon_end: Option<u32>,

    #[arg(long)]
    no_local_search: bool,
}

impl DispatchConfigArgs {
    pub fn load(&self) -> Result<DispatchParams, anyhow::Error> {
        let mut params = match &self.config {
            Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
            None => DispatchParams::default(),
        };

        if let Some(threads) = self.threads {
            params.threads = match threads {
                0 => Threads::Auto,
                1 => Threads::Single,
                n => Threads::Multi(n),
            };
        }
        if let Some(matching) = self.matching {
            params.matching = matching.into();
        }
        if let Some(commitment) = self.commitment {
            params.commitment = commitment.into();
        }
        if let Some(epoch_minutes) = self.epoch_minutes {
            params.epoch_minutes = epoch_minutes;
        }
        if let Some(horizon_end) = self.horizon_end {
            params.horizon_end = horizon_end;
        }
        if self.no_local_search {
            params.enable_local_search = false;
        }

        params.validate()?;

        Ok(params)
    }
}
