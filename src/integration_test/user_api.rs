use super::test_util::prepare_db_and_test;
use crate::domain::DrivenPortError;
use crate::domain::user::CreateUser;
use crate::domain::user::driven_ports::{UserReader, UserWriter};
use crate::persistence::db_user_driven_ports::{DbUserReader, DbUserWriter};
use crate::persistence::ExternalConnectivity;
use crate::{SharedData, db, routes};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use speculoos::prelude::*;
use std::sync::Arc;
use tower::ServiceExt;

fn sign_up_request(body: &'static str) -> Request<Body> {
    Request::post("/authentication/sign-up")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn sign_up_persists_user_then_rejects_duplicate() {
    prepare_db_and_test(|db| async move {
        let router = routes::build_router(Arc::new(SharedData {
            ext_cxn: ExternalConnectivity::new(db.clone()),
        }));
        let payload = r#"{"email":"evan@example.com","password":"longenough","first_name":"Evan"}"#;

        let first = router.clone().oneshot(sign_up_request(payload)).await.unwrap();
        assert_that!(first.status()).is_equal_to(StatusCode::CREATED);

        let second = router.oneshot(sign_up_request(payload)).await.unwrap();
        assert_that!(second.status()).is_equal_to(StatusCode::CONFLICT);

        let mut ext_cxn = ExternalConnectivity::new(db);
        let stored = DbUserReader {}
            .user_by_email("evan@example.com", &mut ext_cxn)
            .await
            .unwrap()
            .expect("registered user should be stored");
        assert_that!(stored.first_name).is_equal_to(Some("Evan".to_owned()));
        assert_that!(stored.password_hash.as_str()).starts_with("$argon2id$");
        assert_that!(stored.created_at).is_greater_than(0);
        assert_that!(stored.updated_at).is_equal_to(stored.created_at);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn invalid_sign_up_stores_nothing() {
    prepare_db_and_test(|db| async move {
        let router = routes::build_router(Arc::new(SharedData {
            ext_cxn: ExternalConnectivity::new(db.clone()),
        }));

        let response = router
            .oneshot(sign_up_request(r#"{"email":"a@b.com","password":"short"}"#))
            .await
            .unwrap();
        assert_that!(response.status()).is_equal_to(StatusCode::BAD_REQUEST);

        let mut ext_cxn = ExternalConnectivity::new(db);
        let stored = DbUserReader {}
            .user_by_email("a@b.com", &mut ext_cxn)
            .await
            .unwrap();
        assert_that!(stored).is_none();
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn store_enforces_unique_email() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let record = CreateUser {
            email: "race@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            first_name: None,
            surname: None,
        };

        let first = DbUserWriter {}.insert_user(&record, &mut ext_cxn).await;
        let first = first.unwrap_or_else(|err| panic!("first insert failed: {err}"));
        assert_that!(first.id).is_greater_than(0);

        let second = DbUserWriter {}.insert_user(&record, &mut ext_cxn).await;
        match second {
            Err(DrivenPortError::ConstraintViolation { constraint }) => {
                assert_that!(constraint.as_str()).is_equal_to("users_email_key")
            }
            Err(other) => panic!("Expected a constraint violation, got {other}"),
            Ok(_) => panic!("Duplicate email was stored"),
        }

        let by_id = DbUserReader {}.user_by_id(first.id, &mut ext_cxn).await.unwrap();
        assert_that!(by_id).is_equal_to(Some(first));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn schema_setup_is_idempotent() {
    prepare_db_and_test(|db| async move {
        assert_that!(db::ensure_schema(&db).await).is_ok();
        assert_that!(db::ensure_schema(&db).await).is_ok();
    });
}
