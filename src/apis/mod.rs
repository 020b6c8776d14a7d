//! Vocabulary Resolver implementations.

pub mod cache;
pub mod getty_tgn;

pub use cache::CachedResolver;
pub use getty_tgn::GettyTgnResolver;
