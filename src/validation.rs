use crate::domain::user::NewUser;
use crate::dto::user::SignUpRequest;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Why a sign-up payload could not become a registration candidate
#[derive(Debug, Error)]
pub enum SignUpRejection {
    /// The payload isn't JSON, or a field has the wrong type
    #[error("sign-up payload could not be decoded: {0}")]
    MalformedInput(String),
    /// The payload decoded but one or more field rules were broken
    #[error("sign-up payload failed validation: {0}")]
    ValidationFailed(ValidationErrors),
}

fn malformed(err: serde_json::Error) -> SignUpRejection {
    SignUpRejection::MalformedInput(err.to_string())
}

/// Parses raw bytes into a [SignUpRequest]. The top level must be a JSON object; unknown
/// fields are ignored.
pub fn decode_sign_up(payload: &[u8]) -> Result<SignUpRequest, SignUpRejection> {
    let object: Map<String, Value> = serde_json::from_slice(payload).map_err(malformed)?;
    serde_json::from_value(Value::Object(object)).map_err(malformed)
}

/// Applies the field rules to a decoded request, producing a candidate with its required
/// fields unwrapped
pub fn validate_sign_up(request: SignUpRequest) -> Result<NewUser, SignUpRejection> {
    request.validate().map_err(SignUpRejection::ValidationFailed)?;

    match request {
        SignUpRequest {
            email: Some(email),
            password: Some(password),
            first_name,
            surname,
        } => Ok(NewUser {
            email,
            password,
            first_name,
            surname,
        }),
        // The required rules above already reject these
        _ => Err(SignUpRejection::ValidationFailed(ValidationErrors::new())),
    }
}

/// Runs the whole pipeline: decode, then validate. Decoding failures short-circuit so a
/// malformed payload never reports field-level violations. Pure; touches no shared state.
pub fn sign_up_candidate(payload: &[u8]) -> Result<NewUser, SignUpRejection> {
    let request = decode_sign_up(payload)?;
    validate_sign_up(request)
}
