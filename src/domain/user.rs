use crate::domain::password::{self, PasswordError};
use crate::domain::user::driving_ports::RegistrationError;
use crate::domain::DrivenPortError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use derive_more::Display;
use thiserror::Error;
use tracing::{error, info, warn};

/// A registered user as held by the store
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A sign-up candidate which has already passed validation. Still holds the raw password.
#[derive(Display)]
#[display("{email}")]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Eq))]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub surname: Option<String>,
}

/// The record handed to storage on insert. Only ever carries a password hash.
#[cfg_attr(test, derive(Clone, Debug))]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub surname: Option<String>,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn user_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;

        async fn user_by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Stores a new user, assigning its ID and timestamps. Must fail with
        /// [DrivenPortError::ConstraintViolation] if the email is already in use.
        async fn insert_user(
            &self,
            user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum RegistrationError {
        #[error("A user with that email address already exists.")]
        EmailTaken,
        #[error(transparent)]
        Credentials(#[from] PasswordError),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait UserPort {
        /// Persists a validated sign-up candidate and returns the stored user
        async fn register(
            &self,
            new_user: &NewUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<User, RegistrationError>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn register(
        &self,
        new_user: &NewUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<User, RegistrationError> {
        let existing_user = u_reader
            .user_by_email(&new_user.email, &mut *ext_cxn)
            .await
            .context("Looking up email during registration")?;
        if existing_user.is_some() {
            info!("Rejected registration for an email that is already taken");
            return Err(RegistrationError::EmailTaken);
        }

        let record = CreateUser {
            email: new_user.email.clone(),
            password_hash: password::hash_password(&new_user.password)?,
            first_name: new_user.first_name.clone(),
            surname: new_user.surname.clone(),
        };

        let insert_result = u_writer
            .insert_user(&record, &mut *ext_cxn)
            .await
            .map_err(|err| err.while_trying_to("Inserting user during registration"));
        match insert_result {
            Ok(user) => Ok(user),
            // users.email is the only unique column besides the generated ID, so losing
            // an insert race on it is the only way to get here
            Err(DrivenPortError::ConstraintViolation { constraint }) => {
                warn!(%constraint, "Store rejected a registration that passed the email check");
                Err(RegistrationError::EmailTaken)
            }
            Err(DrivenPortError::CommsFailure(err)) => {
                error!("User insert failure: {err:#}");
                Err(RegistrationError::PortError(err))
            }
        }
    }
}

#[derive(Debug, Error)]
pub(super) enum OwnerLookupErr {
    #[error("\"{0}\" does not identify an existing user")]
    NoSuchOwner(String),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

/// Resolves the textual owner reference stored on a task to the user it names
pub(super) async fn resolve_owner(
    user_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    u_reader: &impl driven_ports::UserReader,
) -> Result<User, OwnerLookupErr> {
    let Ok(numeric_id) = user_id.parse::<i32>() else {
        return Err(OwnerLookupErr::NoSuchOwner(user_id.to_owned()));
    };

    u_reader
        .user_by_id(numeric_id, ext_cxn)
        .await?
        .ok_or_else(|| OwnerLookupErr::NoSuchOwner(user_id.to_owned()))
}
