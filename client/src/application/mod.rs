// Application layer - use cases for the contest participant
// Orchestrates domain logic, depends on domain layer only

pub mod player;
pub mod ports;
