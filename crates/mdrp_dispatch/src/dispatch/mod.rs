pub mod assignment;
pub mod commitment;
pub mod construction;
pub mod dispatcher;
pub mod epochs;
pub mod local_search;
pub mod matching;
pub mod outcome;
pub mod params;
pub mod route;
pub mod state;
pub mod statistics;
