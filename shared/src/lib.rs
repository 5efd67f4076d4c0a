// Wire types shared between the guessing client and its fake backends

pub mod protocol;

pub use protocol::*;
