use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Body of a sign-up request. [email] and [password] are optional at the wire level so a
/// missing field is reported as a validation failure rather than a parse failure.
/// Unknown fields are ignored.
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize, Clone, Debug, PartialEq, Eq))]
pub struct SignUpRequest {
    #[validate(required, email)]
    #[schema(example = "jane.doe@example.com")]
    pub email: Option<String>,
    #[validate(required, length(min = 8))]
    #[schema(example = "correct horse battery staple", min_length = 8)]
    pub password: Option<String>,
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[schema(example = "Doe")]
    pub surname: Option<String>,
}

/// A freshly registered user. Never carries the password or its hash.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct RegisteredUser {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[schema(example = "Doe")]
    pub surname: Option<String>,
    /// Seconds since the Unix epoch
    #[schema(example = 1718020800)]
    pub created_at: i64,
    /// Seconds since the Unix epoch
    #[schema(example = 1718020800)]
    pub updated_at: i64,
}

impl From<domain::user::User> for RegisteredUser {
    fn from(value: domain::user::User) -> Self {
        RegisteredUser {
            id: value.id,
            email: value.email,
            first_name: value.first_name,
            surname: value.surname,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
