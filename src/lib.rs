//! Chat-triggered trivia bot: webhook intake, round lifecycle, and persisted scores.

/// Runtime configuration.
pub mod config;
/// Persistence of round and score state.
pub mod dao;
/// Wire payloads.
pub mod dto;
/// Service-level errors.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Game logic and outbound collaborators.
pub mod services;
/// Shared state and the round state machine.
pub mod state;
