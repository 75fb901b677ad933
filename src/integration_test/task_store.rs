use super::test_util::prepare_db_and_test;
use crate::domain::task::NewTask;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::domain::task::TaskService;
use crate::domain::user::CreateUser;
use crate::domain::user::driven_ports::UserWriter;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::persistence::db_user_driven_ports::{DbUserReader, DbUserWriter};
use crate::persistence::ExternalConnectivity;
use speculoos::prelude::*;

fn new_task(id: Option<&str>, name: &str) -> NewTask {
    NewTask {
        id: id.map(str::to_owned),
        name: name.to_owned(),
        description: Some("from the integration suite".to_owned()),
        is_completed: None,
    }
}

async fn insert_owner(ext_cxn: &mut ExternalConnectivity) -> i32 {
    let owner = DbUserWriter {}
        .insert_user(
            &CreateUser {
                email: "owner@example.com".to_owned(),
                password_hash: "$argon2id$stub".to_owned(),
                first_name: None,
                surname: None,
            },
            ext_cxn,
        )
        .await
        .unwrap_or_else(|err| panic!("could not insert owner: {err}"));
    owner.id
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn tasks_round_trip_with_their_owner() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let owner_id = insert_owner(&mut ext_cxn).await;
        let service = TaskService {};

        let created = service
            .create_task_for_user(
                owner_id,
                &new_task(None, "Water plants"),
                &mut ext_cxn,
                &DbUserReader {},
                &DbTaskWriter {},
            )
            .await
            .unwrap();
        assert_that!(created.is_completed).is_false();
        assert_that!(created.user_id).is_equal_to(owner_id.to_string());

        let owned = service
            .task_with_owner(&created.id, &mut ext_cxn, &DbUserReader {}, &DbTaskReader {})
            .await
            .unwrap()
            .expect("created task should be found");
        assert_that!(owned.user.id).is_equal_to(owner_id);
        assert_that!(owned.task).is_equal_to(created.clone());

        let listed = service
            .tasks_for_user(owner_id, &mut ext_cxn, &DbUserReader {}, &DbTaskReader {})
            .await
            .unwrap();
        assert_that!(listed).is_equal_to(vec![created]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn duplicate_task_id_is_reported() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let owner_id = insert_owner(&mut ext_cxn).await;
        let service = TaskService {};
        let task = new_task(Some("chore-1"), "Sweep");

        service
            .create_task_for_user(owner_id, &task, &mut ext_cxn, &DbUserReader {}, &DbTaskWriter {})
            .await
            .unwrap();
        let second = service
            .create_task_for_user(owner_id, &task, &mut ext_cxn, &DbUserReader {}, &DbTaskWriter {})
            .await;

        assert!(matches!(second, Err(TaskError::DuplicateTaskId(id)) if id == "chore-1"));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn task_with_unknown_owner_is_orphaned() {
    prepare_db_and_test(|db| async move {
        sqlx::query("INSERT INTO tasks(id, name, user_id) VALUES ('stray', 'Nobody owns me', '999')")
            .execute(&db)
            .await
            .unwrap();
        let mut ext_cxn = ExternalConnectivity::new(db);

        let result = TaskService {}
            .task_with_owner("stray", &mut ext_cxn, &DbUserReader {}, &DbTaskReader {})
            .await;

        match result {
            Err(TaskError::Orphaned { task_id, user_id }) => {
                assert_that!(task_id.as_str()).is_equal_to("stray");
                assert_that!(user_id.as_str()).is_equal_to("999");
            }
            other => panic!("Expected an orphaned task, got {other:?}"),
        }
    });
}
