/// Persisted model definitions.
pub mod models;
/// Repository for the outstanding round slot.
pub mod round;
/// Repository for accumulated user points.
pub mod score;
/// Key-value document stores backing the repositories.
pub mod state_store;
/// Storage error types shared by every backend.
pub mod storage;
