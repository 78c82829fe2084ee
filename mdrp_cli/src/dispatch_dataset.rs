use std::{path::PathBuf, sync::Arc};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mdrp_dispatch::{dispatch::dispatcher::Dispatcher, json::types::JsonDispatchResult};
use tracing::{info, warn};

use crate::{config::DispatchConfigArgs, file_utils, summary};

#[derive(Args)]
pub struct DispatchDatasetArgs {
    /// Folder holding instance directories or JSON instances
    #[arg(short, long)]
    dataset: PathBuf,

    #[command(flatten)]
    config: DispatchConfigArgs,

    /// Output folder for one JSON result per instance
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: DispatchDatasetArgs) -> Result<(), anyhow::Error> {
    info!("Dispatching dataset {:?}", args.dataset);
    let params = args.config.load()?;
    let instances = file_utils::find_instances(&args.dataset)?;

    let bar = ProgressBar::new(instances.len() as u64);
    bar.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}")?);

    let mut rows = Vec::with_capacity(instances.len());
    for path in &instances {
        let name = file_utils::instance_name(path);
        bar.set_message(name.clone());

        let problem = match file_utils::load_problem(path) {
            Ok(problem) => Arc::new(problem),
            Err(error) => {
                warn!("Skipping {}: {error:#}", path.display());
                bar.inc(1);
                continue;
            }
        };

        let dispatcher = Dispatcher::new(Arc::clone(&problem), params.clone())?;
        let outcome = dispatcher.run()?;
        let result = JsonDispatchResult::new(&problem, &params, &outcome);

        if let Some(output) = &args.output {
            file_utils::write_json(&output.join(format!("{name}.json")), &result)?;
        }

        rows.push((name, result.statistics));
        bar.inc(1);
    }

    bar.finish_and_clear();

    println!(
        "{}",
        summary::statistics_table(rows.iter().map(|(name, statistics)| (name.as_str(), statistics)))
    );

    Ok(())
}
