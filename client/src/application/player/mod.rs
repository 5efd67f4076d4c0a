pub mod enter_contest;
pub mod session_controller;
pub mod timer;

pub use session_controller::{
    ControllerConfig, ControllerStopped, SessionController, SessionHandle, SessionPorts,
};
pub use timer::SessionTimer;
