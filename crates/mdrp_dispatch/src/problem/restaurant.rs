use serde::Serialize;

use crate::{define_index_newtype, problem::location::LocationIdx};

define_index_newtype!(RestaurantIdx, Restaurant);

#[derive(Serialize, Debug, Clone)]
pub struct Restaurant {
    external_id: String,
    location_id: LocationIdx,
}

impl Restaurant {
    pub fn new(external_id: impl Into<String>, location_id: LocationIdx) -> Self {
        Self {
            external_id: external_id.into(),
            location_id,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn location_id(&self) -> LocationIdx {
        self.location_id
    }
}
