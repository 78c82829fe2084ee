use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum GenerateSubcommands {
    /// Schema of JSON instances
    JsonSchema {
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Schema of the dispatch configuration file
    ParamsSchema {
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
}

pub fn run(subcommand: GenerateSubcommands) -> Result<(), anyhow::Error> {
    let (schema, out) = match subcommand {
        GenerateSubcommands::JsonSchema { out } => {
            (mdrp_dispatch::json::schema::generate_json_schema()?, out)
        }
        GenerateSubcommands::ParamsSchema { out } => {
            (mdrp_dispatch::json::schema::generate_params_json_schema()?, out)
        }
    };

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(out, schema)?;

    Ok(())
}
