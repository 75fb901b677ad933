use crate::domain::user::driven_ports::{UserReader, UserWriter};
use crate::domain::user::driving_ports::{RegistrationError, UserPort};
use crate::dto::user::{RegisteredUser, SignUpRequest};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{ConflictResponse, GenericErrorResponse};
use crate::validation::{self, SignUpRejection};
use crate::{AppState, SharedData, domain, persistence};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::post;
use axum::{Json, Router};
use derive_more::Display;
use std::sync::Arc;
use tracing::{Span, debug, field, info, instrument};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(sign_up),
    tags((name = "authentication", description = "Account registration"))
)]
pub struct AuthenticationApi;

/// Builds a router for all the authentication routes
pub fn authentication_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/sign-up",
        post(|State(app_data): AppState, payload: Bytes| async move {
            let user_service = domain::user::UserService {};
            let user_reader = persistence::db_user_driven_ports::DbUserReader {};
            let user_writer = persistence::db_user_driven_ports::DbUserWriter {};
            let ext_cxn = app_data.ext_cxn.clone();

            sign_up(&payload, ext_cxn, &user_service, &user_reader, &user_writer).await
        }),
    )
}

/// Where a sign-up request is in its lifecycle. Rejected and Accepted are terminal.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
enum SignUpStage {
    Received,
    Decoding,
    Validating,
    Rejected,
    Accepted,
}

fn enter(stage: SignUpStage) {
    Span::current().record("stage", field::display(stage));
    debug!(%stage, "sign-up moved to a new stage");
}

fn reject(rejection: &SignUpRejection) {
    enter(SignUpStage::Rejected);
    info!("Sign-up rejected: {rejection}");
}

/// Registers a new user
///
/// The body is decoded, then validated. A valid candidate has its password hashed and is
/// stored; the response holds the created user.
#[utoipa::path(
    post,
    path = "/authentication/sign-up",
    tag = "authentication",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "The user was registered", body = RegisteredUser),
        (status = 400, description = "The body was not JSON (invalid_json) or broke a field rule (invalid_input)", body = crate::routing_utils::BasicErrorResponse),
        (status = 409, description = "The email address is already registered (email_taken)", body = crate::routing_utils::BasicErrorResponse),
        (status = 500, description = "The store could not be reached (internal_error)", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
#[instrument(skip_all, fields(stage = %SignUpStage::Received))]
async fn sign_up(
    payload: &[u8],
    mut ext_cxn: impl ExternalConnectivity,
    user_service: &impl UserPort,
    u_reader: &impl UserReader,
    u_writer: &impl UserWriter,
) -> Result<(StatusCode, Json<RegisteredUser>), ErrorResponse> {
    enter(SignUpStage::Decoding);
    let request = validation::decode_sign_up(payload).inspect_err(reject)?;

    enter(SignUpStage::Validating);
    let candidate = validation::validate_sign_up(request).inspect_err(reject)?;

    enter(SignUpStage::Accepted);
    info!("Registering a new user");
    debug!("Registering user {candidate}");
    let registration = user_service
        .register(&candidate, &mut ext_cxn, u_reader, u_writer)
        .await;

    match registration {
        Ok(user) => Ok((StatusCode::CREATED, Json(RegisteredUser::from(user)))),
        Err(RegistrationError::EmailTaken) => {
            enter(SignUpStage::Rejected);
            info!("Sign-up rejected: email already registered");
            Err(ConflictResponse {
                error_code: "email_taken",
                error_description: "A user with that email address already exists.",
            }
            .into())
        }
        Err(RegistrationError::Credentials(err)) => {
            Err(GenericErrorResponse(anyhow::Error::new(err)).into())
        }
        Err(RegistrationError::PortError(err)) => Err(GenericErrorResponse(err).into()),
    }
}
