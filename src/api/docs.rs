//! OpenAPI documentation for the relay endpoints.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the relay API
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::create_session,
        crate::api::handlers::check_api_key,
        crate::api::handlers::health,
    ),
    components(
        schemas(
            crate::api::models::SessionRequest,
            crate::api::models::KeyCheck,
            crate::api::models::SessionErrorResponse,
            crate::api::models::ErrorResponse,
            crate::api::models::HealthResponse,
            crate::core::config::Voice,
        )
    ),
    tags(
        (name = "realtime", description = "Credential-injecting relay to the realtime API"),
        (name = "health", description = "Liveness endpoint")
    ),
    info(
        title = "Realtime Relay API",
        version = "0.1.0",
        description = "Mints ephemeral realtime sessions and checks the server-held API key without exposing it to browsers.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, backed by `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
