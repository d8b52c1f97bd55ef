//! Application services for task orchestration.

mod repository;

pub use repository::{DeleteOutcome, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
