//! Session module - Conversation state per shopper.

mod aggregate;
mod locale;
mod summary;

pub use aggregate::Session;
pub use locale::Locale;
pub use summary::ContextSummary;
