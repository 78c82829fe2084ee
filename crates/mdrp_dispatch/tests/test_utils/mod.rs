use std::{path::PathBuf, sync::Arc};

use mdrp_dispatch::{
    parsers::{instance_dir::InstanceDirParser, parser::DatasetParser},
    problem::dispatch_problem::DispatchProblem,
};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Arc<DispatchProblem> {
    let problem = InstanceDirParser.parse(fixture_path(name)).unwrap();
    Arc::new(problem)
}
