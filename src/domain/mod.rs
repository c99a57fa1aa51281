//! Domain layer - The five decision components and their shared vocabulary.
//!
//! Everything in here is synchronous and side-effect-bounded: the
//! classifiers always produce a value, the state machine is a pure
//! transformation, and nothing performs I/O. The only external call of
//! the whole core (the shared rotation counter) lives in the adapters.

pub mod cycle;
pub mod depth;
pub mod foundation;
pub mod grounding;
pub mod relevance;
pub mod session;
pub mod vocab;
