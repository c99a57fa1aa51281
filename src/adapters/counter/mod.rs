//! Shared counter adapters.

mod in_memory;
mod redis;

pub use in_memory::InMemorySharedCounter;
pub use redis::RedisSharedCounter;
