pub mod email;
pub mod person_name;
pub mod contest_id;
pub mod session_id;
pub mod contest_rules;
pub mod participant;
pub mod evaluation;
pub mod result_message;

pub use email::Email;
pub use person_name::PersonName;
pub use contest_id::ContestId;
pub use session_id::SessionId;
pub use contest_rules::{ContestRules, DEFAULT_MAX_TIME_SECONDS};
pub use participant::Participant;
pub use evaluation::{Evaluation, ParticipationStatus, Verdict};
pub use result_message::{ResultMessage, Severity};
