pub mod dispatch;
pub mod error;
pub mod improve;
pub mod parsers;
pub mod problem;
mod utils;

pub mod json;

#[cfg(test)]
pub(crate) mod test_utils;
