use crate::domain;
use crate::domain::user::{CreateUser, User};
use crate::domain::DrivenPortError;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::{query_as, FromRow};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, surname, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: i32,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    surname: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
            first_name: value.first_name,
            surname: value.surname,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

pub struct DbUserReader {}

impl domain::user::driven_ports::UserReader for DbUserReader {
    async fn user_by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let user = query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by id")?;

        Ok(user.map(User::from))
    }

    async fn user_by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let user = query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by email")?;

        Ok(user.map(User::from))
    }
}

pub struct DbUserWriter {}

impl domain::user::driven_ports::UserWriter for DbUserWriter {
    async fn insert_user(
        &self,
        user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<User, DrivenPortError> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Connecting to insert a user")?;

        let created = query_as::<_, UserRow>(&format!(
            "INSERT INTO users(email, password_hash, first_name, surname) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.surname)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .map_err(|err| super::classify_write_error(err, "Inserting new user"))?;

        Ok(created.into())
    }
}
