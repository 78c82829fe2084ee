pub mod instance_dir;
pub mod json_instance;
pub mod parser;
