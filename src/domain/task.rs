use crate::domain;
use crate::domain::task::driving_ports::TaskError;
use crate::domain::user::{OwnerLookupErr, User};
use crate::domain::DrivenPortError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// A task as held by the store. [user_id] is the decimal ID of the owning user.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub user_id: String,
}

/// A task whose owner reference resolved to a real user
#[derive(Debug)]
pub struct OwnedTask {
    pub task: Task,
    pub user: User,
}

/// Request to create a task. The ID is generated when not supplied and completion
/// defaults to false.
#[derive(Validate)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTask {
    pub id: Option<String>,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

/// Fully-resolved task record handed to storage on insert
#[cfg_attr(test, derive(Clone, Debug))]
pub struct CreateTask {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub user_id: String,
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        async fn task_by_id(
            &self,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;

        async fn tasks_for_user(
            &self,
            user_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
    }

    pub trait TaskWriter {
        /// Stores a new task. Must fail with [DrivenPortError::ConstraintViolation] if
        /// the task ID is already in use.
        async fn insert_task(
            &self,
            task: &CreateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use validator::ValidationErrors;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("task input was invalid: {0}")]
        Invalid(#[from] ValidationErrors),
        #[error("The specified user did not exist.")]
        UserDoesNotExist,
        #[error("A task with ID {0} already exists.")]
        DuplicateTaskId(String),
        #[error("Task {task_id} refers to owner \"{user_id}\", who does not exist.")]
        Orphaned { task_id: String, user_id: String },
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<OwnerLookupErr> for TaskError {
        fn from(value: OwnerLookupErr) -> Self {
            match value {
                OwnerLookupErr::NoSuchOwner(_) => TaskError::UserDoesNotExist,
                OwnerLookupErr::PortError(err) => TaskError::PortError(err),
            }
        }
    }

    pub trait TaskPort {
        async fn create_task_for_user(
            &self,
            user_id: i32,
            task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl domain::user::driven_ports::UserReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;

        /// Looks up a task together with its owner. Tasks whose owner cannot be resolved
        /// are reported as [TaskError::Orphaned] rather than returned.
        async fn task_with_owner(
            &self,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl domain::user::driven_ports::UserReader,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Option<OwnedTask>, TaskError>;

        async fn tasks_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl domain::user::driven_ports::UserReader,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, TaskError>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn create_task_for_user(
        &self,
        user_id: i32,
        task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl domain::user::driven_ports::UserReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, TaskError> {
        task.validate()?;
        let owner = domain::user::resolve_owner(&user_id.to_string(), &mut *ext_cxn, u_reader)
            .await?;

        let record = CreateTask {
            id: task
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: task.name.clone(),
            description: task.description.clone(),
            is_completed: task.is_completed.unwrap_or(false),
            user_id: owner.id.to_string(),
        };

        let insert_result = task_write
            .insert_task(&record, &mut *ext_cxn)
            .await
            .map_err(|err| err.while_trying_to("Inserting a task for a user"));
        match insert_result {
            Ok(created) => Ok(created),
            Err(DrivenPortError::ConstraintViolation { .. }) => {
                Err(TaskError::DuplicateTaskId(record.id))
            }
            Err(DrivenPortError::CommsFailure(err)) => Err(TaskError::PortError(err)),
        }
    }

    async fn task_with_owner(
        &self,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl domain::user::driven_ports::UserReader,
        task_read: &impl driven_ports::TaskReader,
    ) -> Result<Option<OwnedTask>, TaskError> {
        let Some(task) = task_read
            .task_by_id(task_id, &mut *ext_cxn)
            .await
            .context("Fetching a task by ID")?
        else {
            return Ok(None);
        };

        match domain::user::resolve_owner(&task.user_id, &mut *ext_cxn, u_reader).await {
            Ok(user) => Ok(Some(OwnedTask { task, user })),
            Err(OwnerLookupErr::NoSuchOwner(user_id)) => {
                warn!(task_id, %user_id, "Found orphaned task");
                Err(TaskError::Orphaned {
                    task_id: task.id,
                    user_id,
                })
            }
            Err(OwnerLookupErr::PortError(err)) => {
                Err(TaskError::PortError(err.context("Resolving a task's owner")))
            }
        }
    }

    async fn tasks_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl domain::user::driven_ports::UserReader,
        task_read: &impl driven_ports::TaskReader,
    ) -> Result<Vec<Task>, TaskError> {
        let owner_ref = user_id.to_string();
        domain::user::resolve_owner(&owner_ref, &mut *ext_cxn, u_reader).await?;

        let tasks = task_read
            .tasks_for_user(&owner_ref, &mut *ext_cxn)
            .await
            .context("Fetching tasks for a user")?;
        Ok(tasks)
    }
}
