use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::travel_times::Minutes;

/// Scalar parameters shipped with every instance.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct InstanceParameters {
    pub meters_per_minute: f64,
    pub pickup_service_minutes: Minutes,
    pub dropoff_service_minutes: Minutes,
    pub target_click_to_door: Minutes,
    pub pay_per_order: f64,
    pub guaranteed_pay_per_hour: f64,
}

impl InstanceParameters {
    pub fn half_pickup_service(&self) -> Minutes {
        self.pickup_service_minutes / 2.0
    }

    pub fn half_dropoff_service(&self) -> Minutes {
        self.dropoff_service_minutes / 2.0
    }
}

impl Default for InstanceParameters {
    fn default() -> Self {
        Self {
            meters_per_minute: 320.0,
            pickup_service_minutes: 4.0,
            dropoff_service_minutes: 4.0,
            target_click_to_door: 40.0,
            pay_per_order: 10.0,
            guaranteed_pay_per_hour: 15.0,
        }
    }
}
