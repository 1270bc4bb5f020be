use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the trivia bot.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::webhook::submit_message,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::webhook::InboundMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "webhook", description = "Inbound chat messages"),
    )
)]
pub struct ApiDoc;
