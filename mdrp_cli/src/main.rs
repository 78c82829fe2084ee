use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{
    dispatch::DispatchArgs, dispatch_dataset::DispatchDatasetArgs, generate::GenerateSubcommands,
    plan::PlanArgs,
};

mod config;
mod dispatch;
mod dispatch_dataset;
mod file_utils;
mod generate;
mod parsers;
mod plan;
mod summary;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the rolling-horizon dispatch on one instance
    Dispatch {
        #[command(flatten)]
        args: DispatchArgs,
    },
    /// Builds the bundle plan of every epoch and optionally improves it
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },
    /// Runs the dispatch on every instance found under a folder
    DispatchDataset {
        #[command(flatten)]
        args: DispatchDatasetArgs,
    },
    #[command(visible_alias = "g")]
    Generate {
        #[command(subcommand)]
        commands: GenerateSubcommands,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Dispatch { args }) => dispatch::run(args)?,
        Some(Commands::Plan { args }) => plan::run(args)?,
        Some(Commands::DispatchDataset { args }) => dispatch_dataset::run(args)?,
        Some(Commands::Generate { commands }) => generate::run(commands)?,
        None => {}
    }

    Ok(())
}
