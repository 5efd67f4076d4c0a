pub mod game_session;

pub use game_session::{
    AttemptPolicy, GameSession, Outcome, Phase, SessionEffect, SessionSummary,
};
