use schemars::schema_for;

use crate::{dispatch::params::DispatchParams, json::types};

pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(types::JsonDispatchInstance))
}

/// Schema of the dispatch configuration file.
pub fn generate_params_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(DispatchParams))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_schema_lists_tables() {
        let schema = generate_json_schema().unwrap();

        assert!(schema.contains("\"orders\""));
        assert!(schema.contains("\"restaurants\""));
        assert!(schema.contains("\"couriers\""));
        assert!(schema.contains("placement_time"));
    }

    #[test]
    fn test_params_schema() {
        let schema = generate_params_json_schema().unwrap();

        assert!(schema.contains("staleness_threshold"));
        assert!(schema.contains("arrival_or_early_ready"));
    }
}
