use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Unknown order: {0}")]
    UnknownOrder(String),

    #[error("Unknown courier: {0}")]
    UnknownCourier(String),

    #[error("Unknown restaurant: {0}")]
    UnknownRestaurant(String),

    #[error("Identifier {0} is used by more than one location")]
    DuplicateId(String),

    #[error("Bundle has no orders")]
    EmptyBundle,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Instance has no {0}")]
    EmptyInstance(&'static str),

    #[error("Assignment of courier {courier} is final and cannot accept more orders")]
    AssignmentFinalized { courier: String },

    #[error(
        "Cannot merge a bundle of restaurant {incoming} into an assignment of restaurant {existing}"
    )]
    RestaurantMismatch { existing: String, incoming: String },
}
