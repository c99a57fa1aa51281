//! Application handlers.

pub mod chat_turn;

pub use chat_turn::{ChatTurnCommand, ChatTurnHandler, ChatTurnResult, TurnEngines, TurnError};
