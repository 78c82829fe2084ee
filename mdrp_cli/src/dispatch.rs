use std::{path::PathBuf, sync::Arc};

use clap::Args;
use mdrp_dispatch::{dispatch::dispatcher::Dispatcher, json::types::JsonDispatchResult};
use tracing::info;

use crate::{config::DispatchConfigArgs, file_utils, summary};

#[derive(Args)]
pub struct DispatchArgs {
    /// Instance directory or JSON instance
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    config: DispatchConfigArgs,

    /// Writes the full dispatch result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: DispatchArgs) -> Result<(), anyhow::Error> {
    let params = args.config.load()?;
    let problem = Arc::new(file_utils::load_problem(&args.input)?);
    info!(
        orders = problem.orders().len(),
        restaurants = problem.restaurants().len(),
        couriers = problem.couriers().len(),
        "Loaded {}",
        args.input.display()
    );

    let dispatcher = Dispatcher::new(Arc::clone(&problem), params)?;
    let outcome = dispatcher.run()?;
    let result = JsonDispatchResult::new(&problem, dispatcher.params(), &outcome);

    let name = file_utils::instance_name(&args.input);
    println!(
        "{}",
        summary::statistics_table([(name.as_str(), &result.statistics)])
    );

    if let Some(output) = args.output {
        file_utils::write_json(&output, &result)?;
        info!("Wrote {}", output.display());
    }

    Ok(())
}
