use crate::domain;
use crate::domain::task::{CreateTask, Task};
use crate::domain::DrivenPortError;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::{query_as, FromRow};

#[derive(FromRow)]
struct TaskRow {
    id: String,
    name: String,
    description: Option<String>,
    is_completed: bool,
    user_id: Option<String>,
}

impl From<TaskRow> for Task {
    fn from(value: TaskRow) -> Self {
        Task {
            id: value.id,
            name: value.name,
            description: value.description,
            is_completed: value.is_completed,
            // A NULL owner can never resolve, so it reads back as an orphan
            user_id: value.user_id.unwrap_or_default(),
        }
    }
}

pub struct DbTaskReader {}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn task_by_id(
        &self,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let task = query_as::<_, TaskRow>(
            "SELECT id, name, description, is_completed, user_id FROM tasks t WHERE t.id = $1",
        )
        .bind(task_id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a task by id")?;

        Ok(task.map(Task::from))
    }

    async fn tasks_for_user(
        &self,
        user_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let tasks = query_as::<_, TaskRow>(
            "SELECT id, name, description, is_completed, user_id FROM tasks t \
             WHERE t.user_id = $1 ORDER BY t.id",
        )
        .bind(user_id)
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("Fetching tasks for a user")?
        .into_iter()
        .map(Task::from)
        .collect();

        Ok(tasks)
    }
}

pub struct DbTaskWriter {}

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn insert_task(
        &self,
        task: &CreateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Connecting to insert a task")?;

        let created = query_as::<_, TaskRow>(
            "INSERT INTO tasks(id, name, description, is_completed, user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, description, is_completed, user_id",
        )
        .bind(&task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(&task.user_id)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .map_err(|err| super::classify_write_error(err, "Inserting new task"))?;

        Ok(created.into())
    }
}
