use utoipa::OpenApi;

pub mod user;

/// Collects the request and response bodies of the API so they can be merged into the
/// generated OpenAPI document
#[derive(OpenApi)]
#[openapi(components(schemas(user::SignUpRequest, user::RegisteredUser)))]
pub struct OpenApiSchemas;
