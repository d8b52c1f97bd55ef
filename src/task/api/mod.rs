//! Boundary-facing task representation and request handling.
//!
//! [`TaskDto`] is what callers send and receive, [`TaskMapper`] converts it
//! to and from the domain, and [`TaskHandler`] turns requests into
//! repository calls and repository results into [`TaskResponse`] values.
//! Routing and transport are left to the embedding application.

mod dto;
mod error;
mod handler;
mod mapper;

pub use dto::TaskDto;
pub use error::ApiError;
pub use handler::{TaskHandler, TaskResponse};
pub use mapper::TaskMapper;
