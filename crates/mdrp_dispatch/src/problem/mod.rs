pub mod courier;
pub mod dispatch_problem;
pub mod instance_parameters;
pub mod location;
pub mod order;
pub mod restaurant;
pub mod travel_times;
