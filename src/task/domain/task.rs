//! Task entity and the mutable details it carries.

use super::{TaskDescription, TaskId, TaskTitle};
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use std::fmt;

/// Caller-controlled task fields.
///
/// This is everything a caller may set on create or change on update; it
/// has no room for an identifier or a creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    title: TaskTitle,
    description: Option<TaskDescription>,
    completed: bool,
}

impl TaskDetails {
    /// Creates open task details with the given title and no description.
    #[must_use]
    pub const fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            completed: false,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<TaskDescription>) -> Self {
        self.description = description;
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.description.as_ref()
    }

    /// Returns whether the task is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Task entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    details: TaskDetails,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted caller-controlled fields.
    pub details: TaskDetails,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a fresh identifier and the current time.
    ///
    /// The timestamp is truncated to microseconds, the precision of
    /// `timestamptz`.
    #[must_use]
    pub fn create(details: TaskDetails, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            details,
            created_at: clock.utc().trunc_subsecs(6),
        }
    }

    /// Reconstructs a task from persisted storage or a caller payload.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            created_at: data.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the caller-controlled fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        self.details.title()
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.details.description()
    }

    /// Returns whether the task is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.details.is_completed()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the caller-controlled fields. Identity and creation time are
    /// untouched.
    pub fn apply_details(&mut self, details: TaskDetails) {
        self.details = details;
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Task {}: {}", self.id, self.title())?;
        writeln!(
            f,
            "Description: {}",
            self.description().map_or("", TaskDescription::as_str)
        )?;
        write!(f, "Completed: {}", self.is_completed())
    }
}
