//! Repository enforcing task identity and immutable fields over a store.

use crate::task::{
    domain::{Task, TaskDetails, TaskId},
    ports::{TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Repository-level errors.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// No live task has the identifier, either because it never existed or
    /// because it was deleted while the operation was in flight.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The underlying store failed.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for TaskRepositoryError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The task existed and was removed.
    Deleted,
    /// No live task had the identifier; nothing changed.
    Absent,
}

/// Task repository.
///
/// Generates identifiers and creation timestamps, and keeps `created_at`
/// fixed across updates, whichever store variant sits underneath.
pub struct TaskRepository<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for TaskRepository<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> TaskRepository<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a repository over the given store and clock.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task with a fresh identifier and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Store`] when the store rejects the
    /// insert.
    pub async fn create(&self, details: TaskDetails) -> TaskRepositoryResult<Task> {
        let task = Task::create(details, &*self.clock);
        self.store.create(&task).await?;
        tracing::debug!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Finds a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Store`] when the lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Returns all live tasks.
    ///
    /// Ordering depends on the store variant and must not be relied upon.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Store`] when the listing fails.
    pub async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        Ok(self.store.list_all().await?)
    }

    /// Overwrites the title, description and completion flag of an existing
    /// task and returns the stored result.
    ///
    /// The creation timestamp always comes from the stored record; whatever
    /// `created_at` the candidate carries is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task has the
    /// candidate's identifier, including when it is deleted between the
    /// read and the write, or [`TaskRepositoryError::Store`] when the store
    /// fails.
    pub async fn update(&self, candidate: &Task) -> TaskRepositoryResult<Task> {
        let task_id = candidate.id();
        let Some(mut stored) = self.store.find_by_id(task_id).await? else {
            return Err(TaskRepositoryError::NotFound(task_id));
        };

        if stored.created_at() != candidate.created_at() {
            tracing::debug!(%task_id, "ignoring caller-supplied created_at");
        }
        stored.apply_details(candidate.details().clone());

        match self.store.update(&stored).await {
            Ok(()) => {
                tracing::debug!(%task_id, "task updated");
                Ok(stored)
            }
            Err(TaskStoreError::NotFound(_)) => {
                tracing::debug!(%task_id, "task disappeared before update was written");
                Err(TaskRepositoryError::NotFound(task_id))
            }
            Err(err) => Err(TaskRepositoryError::Store(err)),
        }
    }

    /// Deletes a task.
    ///
    /// Deleting an absent task is not an error and reports
    /// [`DeleteOutcome::Absent`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Store`] when the store fails.
    pub async fn delete(&self, id: TaskId) -> TaskRepositoryResult<DeleteOutcome> {
        if self.store.delete(id).await? {
            tracing::debug!(task_id = %id, "task deleted");
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::Absent)
        }
    }
}
