use std::path::Path;

use crate::problem::dispatch_problem::DispatchProblem;

pub trait DatasetParser {
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<DispatchProblem, anyhow::Error>;
}
