/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Answer normalization.
pub mod normalizer;
/// Outbound chat messaging.
pub mod notifier;
/// Question providers.
pub mod question_source;
/// Trivia round lifecycle.
pub mod trivia_service;
/// Inbound message parsing and dispatch.
pub mod webhook_service;
