use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::openapi::{ObjectBuilder, RefOr, Schema};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::validation::SignUpRejection;

/// Body of every failed API call
#[derive(Serialize, Debug, ToSchema)]
pub struct BasicErrorResponse {
    /// Stable, machine-readable failure kind
    #[schema(example = "invalid_input")]
    pub error_code: String,
    #[schema(example = "Submitted data was invalid.")]
    pub error_description: String,
    /// Field-level violations for `invalid_input`, the parser's complaint for `invalid_json`
    pub extra_info: Option<ExtraInfo>,
}

impl BasicErrorResponse {
    fn new(error_code: &str, error_description: &str) -> Self {
        BasicErrorResponse {
            error_code: error_code.to_owned(),
            error_description: error_description.to_owned(),
            extra_info: None,
        }
    }

    fn with_extra_info(mut self, extra_info: ExtraInfo) -> Self {
        self.extra_info = Some(extra_info);
        self
    }

    fn with_status(self, status: StatusCode) -> Response {
        (status, axum::Json(self)).into_response()
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors], documented as a free-form object keyed by field
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        ("ValidationErrorSchema", ObjectBuilder::new().into())
    }
}

/// Sign-up payloads that never made it to registration are the client's fault
impl IntoResponse for SignUpRejection {
    fn into_response(self) -> Response {
        match self {
            SignUpRejection::MalformedInput(parse_problem) => BasicErrorResponse::new(
                "invalid_json",
                "The passed request body contained malformed or unreadable JSON.",
            )
            .with_extra_info(ExtraInfo::Message(parse_problem)),
            SignUpRejection::ValidationFailed(violations) => {
                BasicErrorResponse::new("invalid_input", "Submitted data was invalid.")
                    .with_extra_info(ExtraInfo::ValidationIssues(ValidationErrorSchema(
                        violations,
                    )))
            }
        }
        .with_status(StatusCode::BAD_REQUEST)
    }
}

/// A write collided with a record that already exists
pub struct ConflictResponse {
    pub error_code: &'static str,
    pub error_description: &'static str,
}

impl IntoResponse for ConflictResponse {
    fn into_response(self) -> Response {
        BasicErrorResponse::new(self.error_code, self.error_description)
            .with_status(StatusCode::CONFLICT)
    }
}

/// A failure the client can do nothing about. The cause is logged, never sent.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);

        BasicErrorResponse::new(
            "internal_error",
            "Could not access data to complete your request",
        )
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Answer for any path or method the API doesn't route
pub async fn not_found() -> Response {
    BasicErrorResponse::new("not_found", "The requested resource could not be found.")
        .with_status(StatusCode::NOT_FOUND)
}

/// Response mapper which labels every response body as JSON
pub async fn json_content_type(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
