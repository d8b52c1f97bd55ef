//! Error types for task domain validation.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a UUID or is the nil UUID.
    #[error("invalid task id '{0}'")]
    InvalidTaskId(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("task title is {length} characters long, maximum is {max}")]
    TitleTooLong {
        /// Character count of the rejected title.
        length: usize,
        /// Maximum accepted character count.
        max: usize,
    },

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// A text field contains U+0000, which `PostgreSQL` text columns reject.
    #[error("task {field} must not contain NUL characters")]
    NulCharacter {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The task description exceeds the persisted column width.
    #[error("task description is {length} characters long, maximum is {max}")]
    DescriptionTooLong {
        /// Character count of the rejected description.
        length: usize,
        /// Maximum accepted character count.
        max: usize,
    },
}
