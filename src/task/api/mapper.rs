//! Structural conversion between [`Task`] and [`TaskDto`].

use super::TaskDto;
use crate::task::domain::{
    PersistedTaskData, Task, TaskDescription, TaskDetails, TaskDomainError, TaskId, TaskTitle,
};

/// Field-by-field mapper between the entity and its transfer
/// representation.
///
/// The mapper validates field values but does not guard `id` or
/// `created_at`; [`crate::task::services::TaskRepository`] does.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskMapper;

impl TaskMapper {
    /// Projects a task onto its transfer representation.
    #[must_use]
    pub fn to_dto(task: &Task) -> TaskDto {
        TaskDto {
            id: Some(task.id()),
            title: task.title().as_str().to_owned(),
            description: task.description().map(|text| text.as_str().to_owned()),
            completed: task.is_completed(),
            created_at: Some(task.created_at()),
        }
    }

    /// Extracts the caller-controlled fields, discarding `id` and
    /// `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title or description is invalid.
    pub fn to_details(dto: &TaskDto) -> Result<TaskDetails, TaskDomainError> {
        let title = TaskTitle::new(dto.title.as_str())?;
        let description = TaskDescription::optional(dto.description.as_deref())?;
        Ok(TaskDetails::new(title)
            .with_description(description)
            .with_completed(dto.completed))
    }

    /// Builds an update candidate for `id`.
    ///
    /// The candidate carries the payload's `created_at`, or the Unix epoch
    /// when the payload has none.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title or description is invalid.
    pub fn to_entity(dto: &TaskDto, id: TaskId) -> Result<Task, TaskDomainError> {
        let details = Self::to_details(dto)?;
        Ok(Task::from_persisted(PersistedTaskData {
            id,
            details,
            created_at: dto.created_at.unwrap_or_default(),
        }))
    }

    /// Overwrites the title, description and completion flag of `task` from
    /// the payload. On error `task` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title or description is invalid.
    pub fn apply(dto: &TaskDto, task: &mut Task) -> Result<(), TaskDomainError> {
        let details = Self::to_details(dto)?;
        task.apply_details(details);
        Ok(())
    }
}
