use crate::entities::task;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

pub mod api;

/// Status assigned to a task created without one.
pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: Uuid,
    name: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: Uuid, name: String, status: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            status,
            created_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the name of the task.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the status of the task.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the time the task was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.name,
            model.status,
            model.created_at.with_timezone(&Utc),
        )
    }
}

/// A validated task waiting to be stored.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct NewTask {
    pub name: String,
    pub status: String,
}

/// Field-level replacements for an existing task. `None` leaves the field untouched.
#[derive(Debug, PartialEq, Clone, Eq, Default)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub status: Option<String>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none()
    }
}

/// Error type for TaskRepository operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskRepositoryError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Storage operations over the task collection.
///
/// The repository owns identity: `insert` assigns the task ID and creation time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns every task, oldest first.
    async fn find_all(&self) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Returns the task with the given ID, if any.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskRepositoryError>;

    /// Stores a new task and returns it with its assigned ID and creation time.
    async fn insert(&self, new_task: NewTask) -> Result<Task, TaskRepositoryError>;

    /// Applies `changes` to the task with the given ID.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if no task has that ID.
    async fn update_by_id(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, TaskRepositoryError>;

    /// Deletes the task with the given ID.
    ///
    /// # Returns
    ///
    /// `true` if a task was deleted, `false` if none existed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, TaskRepositoryError>;
}

/// `TaskRepository` backed by the `tasks` table.
#[derive(Clone, Debug)]
pub struct SeaOrmTaskRepository {
    db: sea_orm::DatabaseConnection,
}

impl SeaOrmTaskRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Task>, TaskRepositoryError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::CreatedAt)
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskRepositoryError> {
        let task = task::Entity::find_by_id(id).one(&self.db).await?;
        Ok(task.map(Task::from))
    }

    /// Inserts a new task row.
    ///
    /// # Arguments
    ///
    /// * `new_task` - The validated name and status of the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    async fn insert(&self, new_task: NewTask) -> Result<Task, TaskRepositoryError> {
        let active_model = task::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(new_task.name),
            status: ActiveValue::Set(new_task.status),
            created_at: ActiveValue::Set(Utc::now().fixed_offset()),
        };
        let created_model = active_model.insert(&self.db).await?;
        tracing::info!("Created task {}", created_model.id);
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_id(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let Some(task_to_update) = task::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active_model: task::ActiveModel = task_to_update.into();
        if let Some(name) = changes.name {
            active_model.name = ActiveValue::Set(name);
        }
        if let Some(status) = changes.status {
            active_model.status = ActiveValue::Set(status);
        }

        match active_model.update(&self.db).await {
            Ok(updated_model) => Ok(Some(Task::from(updated_model))),
            // Deleted between the lookup and the update.
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, TaskRepositoryError> {
        let result = task::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

/// Shared handler state carrying the storage handle.
#[derive(Clone)]
pub struct TaskState {
    pub repository: Arc<dyn TaskRepository>,
}

impl TaskState {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn can_convert_model_to_task() {
        let id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2025, 9, 1, 12, 30, 0).unwrap();
        let model = task::Model {
            id,
            name: "First todo".to_string(),
            status: "pending".to_string(),
            created_at: created_at.fixed_offset(),
        };

        let task = Task::from(model);

        assert_eq!(task.id(), id);
        assert_eq!(task.name(), "First todo");
        assert_eq!(task.status(), "pending");
        assert_eq!(task.created_at(), created_at);
    }

    #[test]
    fn can_detect_empty_changes() {
        assert!(TaskChanges::default().is_empty());
        let changes = TaskChanges {
            name: Some("Updated todo".to_string()),
            status: None,
        };
        assert!(!changes.is_empty());
    }
}
