use std::path::{Path, PathBuf};

use anyhow::bail;
use mdrp_dispatch::{
    parsers::{
        instance_dir::InstanceDirParser, json_instance::JsonInstanceParser, parser::DatasetParser,
    },
    problem::dispatch_problem::DispatchProblem,
};

/// Loads an instance directory or a JSON instance file.
pub fn load_problem(path: &Path) -> Result<DispatchProblem, anyhow::Error> {
    if path.is_dir() {
        if !InstanceDirParser::is_instance_dir(path) {
            bail!("{} is not an instance directory", path.display());
        }
        return InstanceDirParser.parse(path);
    }

    if path.extension().is_some_and(|extension| extension == "json") {
        return JsonInstanceParser.parse(path);
    }

    bail!("Unsupported instance {}", path.display())
}

/// Instance directories and JSON instances below `folder_path`, sorted.
pub fn find_instances(folder_path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if InstanceDirParser::is_instance_dir(folder_path) {
        return Ok(vec![folder_path.to_path_buf()]);
    }

    let mut instances = Vec::new();
    for entry in std::fs::read_dir(folder_path)? {
        let path = entry?.path();
        if path.is_dir() {
            instances.extend(find_instances(&path)?);
        } else if path.extension().is_some_and(|extension| extension == "json") {
            instances.push(path);
        }
    }

    instances.sort();

    Ok(instances)
}

pub fn instance_name(path: &Path) -> String {
    path.file_stem()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), anyhow::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;

    Ok(())
}
