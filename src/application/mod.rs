//! Application layer - commands and handlers.
//!
//! Orchestrates the domain engines and the ports for one chat turn.

pub mod handlers;

pub use handlers::{ChatTurnCommand, ChatTurnHandler, ChatTurnResult, TurnEngines, TurnError};
