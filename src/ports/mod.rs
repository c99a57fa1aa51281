//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the decision core and the outside world. Adapters implement them.
//!
//! - `SharedCounter` - atomic rotation counter (the core's one external call)
//! - `AssistantClient` - the generative AI backend, shape only
//! - `ProductSearchClient` - the live search provider, shape only
//! - `SessionStore` - versioned session persistence

mod assistant;
mod counter_store;
mod search;
mod session_store;

pub use assistant::{
    AssistantClient, AssistantError, AssistantReply, AssistantRequest, ResponseType, TurnMessage,
};
pub use counter_store::{CounterError, SharedCounter};
pub use search::{ProductSearchClient, SearchError};
pub use session_store::{SessionStore, SessionStoreError};
