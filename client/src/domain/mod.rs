// Domain layer - guessing session rules, value objects, events
// No dependencies on other layers

pub mod errors;
pub mod aggregates;
pub mod value_objects;
pub mod events;

pub use errors::DomainError;
pub use aggregates::*;
pub use value_objects::*;
pub use events::*;
