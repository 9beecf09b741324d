//! Concurrent collection of per-platform metrics behind a TTL cache.

pub mod cache;
pub mod collector;

pub use cache::SnapshotCache;
pub use collector::Collector;
