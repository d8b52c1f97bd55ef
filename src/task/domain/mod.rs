//! Domain model for task tracking.
//!
//! The domain holds the task entity and its validated fields while keeping
//! persistence and transport concerns outside of the domain boundary.

mod error;
mod fields;
mod ids;
mod task;

pub use error::TaskDomainError;
pub use fields::{TaskDescription, TaskTitle};
pub use ids::TaskId;
pub use task::{PersistedTaskData, Task, TaskDetails};
