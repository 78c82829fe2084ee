use std::{fs::File, io::BufReader, path::Path};

use crate::{
    json::types::JsonDispatchInstance, parsers::parser::DatasetParser,
    problem::dispatch_problem::DispatchProblem,
};

/// Reads a single JSON file shaped like [`JsonDispatchInstance`].
pub struct JsonInstanceParser;

impl DatasetParser for JsonInstanceParser {
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<DispatchProblem, anyhow::Error> {
        let file = File::open(path)?;
        let instance: JsonDispatchInstance = serde_json::from_reader(BufReader::new(file))?;

        Ok(instance.build_problem()?)
    }
}
