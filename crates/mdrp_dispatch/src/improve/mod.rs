pub mod destroy;
pub mod params;
pub mod repair;
pub mod search;
