//! Validated text fields carried by a task.
//!
//! Lengths are counted in characters so that a value accepted here is also
//! accepted by the `VARCHAR` columns of the durable store.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required, non-blank task title of at most [`TaskTitle::MAX_CHARS`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Width of the `title` column.
    pub const MAX_CHARS: usize = 200;

    /// Creates a validated title from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank,
    /// [`TaskDomainError::NulCharacter`] when it contains U+0000 and
    /// [`TaskDomainError::TitleTooLong`] when it exceeds
    /// [`TaskTitle::MAX_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        reject_nul("title", normalized)?;

        let length = normalized.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TaskDomainError::TitleTooLong {
                length,
                max: Self::MAX_CHARS,
            });
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskTitle {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskTitle> for String {
    fn from(value: TaskTitle) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text task description of at most [`TaskDescription::MAX_CHARS`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Width of the `description` column.
    pub const MAX_CHARS: usize = 500;

    /// Creates a validated description from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the description is
    /// blank, [`TaskDomainError::NulCharacter`] when it contains U+0000 and
    /// [`TaskDomainError::DescriptionTooLong`] when it exceeds
    /// [`TaskDescription::MAX_CHARS`]. Use [`TaskDescription::optional`] to
    /// treat blank input as absent.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        reject_nul("description", normalized)?;
        let length = normalized.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TaskDomainError::DescriptionTooLong {
                length,
                max: Self::MAX_CHARS,
            });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Validates an optional description, treating blank input as absent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when a present description contains
    /// U+0000 or is too long.
    pub fn optional(value: Option<&str>) -> Result<Option<Self>, TaskDomainError> {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => Self::new(text).map(Some),
            _ => Ok(None),
        }
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskDescription {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskDescription> for String {
    fn from(value: TaskDescription) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn reject_nul(field: &'static str, value: &str) -> Result<(), TaskDomainError> {
    if value.contains('\0') {
        return Err(TaskDomainError::NulCharacter { field });
    }
    Ok(())
}
