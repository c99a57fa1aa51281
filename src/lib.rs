//! Shopguide - Decision core of a conversational shopping assistant.
//!
//! This crate owns the per-turn decisions of the assistant: how much
//! conversation context to expose to the AI backend, whether to ground a
//! reply with live search, how to bound and roll over conversation state,
//! how to score noisy search results for relevance, and how to rotate a
//! pool of upstream API credentials. Transport, storage, and the concrete
//! AI/search clients live behind ports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
