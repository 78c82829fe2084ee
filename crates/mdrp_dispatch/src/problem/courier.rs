use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{location::LocationIdx, travel_times::Minutes},
};

define_index_newtype!(CourierIdx, Courier);

#[derive(Serialize, Debug, Clone)]
pub struct Courier {
    external_id: String,
    location_id: LocationIdx,
    on_time: Minutes,
    off_time: Minutes,
}

impl Courier {
    pub fn new(
        external_id: impl Into<String>,
        location_id: LocationIdx,
        on_time: Minutes,
        off_time: Minutes,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            location_id,
            on_time,
            off_time,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Where the courier starts the shift.
    pub fn location_id(&self) -> LocationIdx {
        self.location_id
    }

    pub fn on_time(&self) -> Minutes {
        self.on_time
    }

    pub fn off_time(&self) -> Minutes {
        self.off_time
    }

    pub fn duty_hours(&self) -> f64 {
        ((self.off_time - self.on_time) / 60.0).max(0.0)
    }
}
