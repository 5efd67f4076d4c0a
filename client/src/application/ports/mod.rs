// Application ports - Driven ports (output ports implemented by infrastructure)

pub mod gateway_error;
pub mod contest_directory;
pub mod participation_registry;
pub mod guess_evaluator;
pub mod outcome_reporter;

pub use gateway_error::GatewayError;
pub use contest_directory::{ContestConfig, ContestDirectory};
pub use participation_registry::ParticipationRegistry;
pub use guess_evaluator::GuessEvaluator;
pub use outcome_reporter::OutcomeReporter;
