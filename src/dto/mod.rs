/// Health check payloads.
pub mod health;
/// Inbound chat message payloads.
pub mod webhook;
