//! Resource clients, one per API group.

pub mod pulls;

// Re-exports
pub use pulls::PullsApi;
