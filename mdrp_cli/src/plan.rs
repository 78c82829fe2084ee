use std::{path::PathBuf, sync::Arc};

use clap::Args;
use mdrp_dispatch::{
    dispatch::dispatcher::Dispatcher,
    improve::{
        params::{ImprovementParams, Termination},
        search::PlanImprover,
    },
    json::types::JsonBundlePlan,
};
use tracing::info;

use crate::{config::DispatchConfigArgs, file_utils, parsers};

#[derive(Args)]
pub struct PlanArgs {
    /// Instance directory or JSON instance
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    config: DispatchConfigArgs,

    /// Improves the plan for this long (e.g., "30s", "5m", "PT1M")
    #[arg(long, value_parser = parsers::parse_duration)]
    duration: Option<jiff::SignedDuration>,

    /// Improves the plan for this many iterations
    #[arg(long, short = 'n')]
    iterations: Option<usize>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Writes the bundle plan as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: PlanArgs) -> Result<(), anyhow::Error> {
    let params = args.config.load()?;
    let problem = Arc::new(file_utils::load_problem(&args.input)?);
    let dispatcher = Dispatcher::new(Arc::clone(&problem), params)?;
    let weights = dispatcher.params().weights();

    let mut plan = dispatcher.plan_bundles();

    let terminations = args
        .duration
        .map(Termination::Duration)
        .into_iter()
        .chain(args.iterations.map(Termination::Iterations))
        .collect::<Vec<_>>();

    if !terminations.is_empty() {
        let improver = PlanImprover::new(
            Arc::clone(&problem),
            weights,
            ImprovementParams {
                terminations,
                seed: args.seed,
            },
        );
        let result = improver.improve(plan);
        info!(
            "Improved plan cost {:.2} -> {:.2} in {} iterations ({} improvements)",
            result.initial_cost, result.cost, result.iterations, result.improvements
        );
        plan = result.plan;
    }

    let json_plan = JsonBundlePlan::new(&problem, dispatcher.params(), &plan);
    info!(
        epochs = json_plan.epochs.len(),
        bundles = json_plan.bundles,
        orders = json_plan.orders,
        cost = json_plan.total_cost,
        "Bundle plan"
    );

    if let Some(output) = args.output {
        file_utils::write_json(&output, &json_plan)?;
        info!("Wrote {}", output.display());
    }

    Ok(())
}
