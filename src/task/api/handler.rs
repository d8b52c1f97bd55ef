//! Transport-agnostic request handling for task CRUD.

use super::{ApiError, TaskDto, TaskMapper};
use crate::task::{
    domain::TaskId,
    ports::TaskStore,
    services::{DeleteOutcome, TaskRepository},
};
use http::{HeaderValue, StatusCode};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Value, json};

/// Handler response.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResponse {
    /// Response status.
    pub status: StatusCode,
    /// `Location` of a newly created resource, such as `/tasks/{id}`.
    pub location: Option<HeaderValue>,
    /// JSON response body.
    pub body: Value,
}

impl TaskResponse {
    fn message(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            location: None,
            body: json!({ "message": message }),
        }
    }
}

/// Adapts boundary requests into repository calls.
///
/// Path identifiers arrive as strings and request bodies as optional JSON
/// text, so a transport layer can forward them without interpreting them.
pub struct TaskHandler<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    repository: TaskRepository<S, C>,
}

impl<S, C> TaskHandler<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a handler over the given repository.
    #[must_use]
    pub const fn new(repository: TaskRepository<S, C>) -> Self {
        Self { repository }
    }

    /// Lists all tasks: 200 with an array of task representations.
    pub async fn list(&self) -> TaskResponse {
        self.try_list()
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    /// Fetches one task: 200 with its representation, 400 for a malformed
    /// id, 404 when absent.
    pub async fn get(&self, id: &str) -> TaskResponse {
        self.try_get(id)
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    /// Creates a task: 201 with a `Location` and the created representation,
    /// 400 for a missing or invalid payload.
    pub async fn create(&self, body: Option<&str>) -> TaskResponse {
        self.try_create(body)
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    /// Updates a task: 200 with a confirmation, 400 when the payload id
    /// differs from the path id or a field is invalid, 404 when absent.
    ///
    /// A payload without an id adopts the path id.
    pub async fn update(&self, id: &str, body: Option<&str>) -> TaskResponse {
        self.try_update(id, body)
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    /// Deletes a task: 200 with a confirmation, 404 when absent.
    pub async fn delete(&self, id: &str) -> TaskResponse {
        self.try_delete(id)
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    async fn try_list(&self) -> Result<TaskResponse, ApiError> {
        const OPERATION: &str = "list tasks";
        let tasks = self
            .repository
            .list_all()
            .await
            .map_err(|err| ApiError::from_repository(OPERATION, err))?;
        let dtos: Vec<TaskDto> = tasks.iter().map(TaskMapper::to_dto).collect();
        json_response(OPERATION, StatusCode::OK, &dtos)
    }

    async fn try_get(&self, id: &str) -> Result<TaskResponse, ApiError> {
        const OPERATION: &str = "get task";
        let task_id = parse_id(id)?;
        let task = self
            .repository
            .find_by_id(task_id)
            .await
            .map_err(|err| ApiError::from_repository(OPERATION, err))?
            .ok_or(ApiError::NotFound)?;
        json_response(OPERATION, StatusCode::OK, &TaskMapper::to_dto(&task))
    }

    async fn try_create(&self, body: Option<&str>) -> Result<TaskResponse, ApiError> {
        const OPERATION: &str = "create task";
        let dto = parse_body(body)?;
        let details = TaskMapper::to_details(&dto)?;
        let task = self
            .repository
            .create(details)
            .await
            .map_err(|err| ApiError::from_repository(OPERATION, err))?;
        let location = HeaderValue::try_from(format!("/tasks/{}", task.id())).map_err(|err| {
            ApiError::Fault {
                operation: OPERATION,
                detail: err.to_string(),
            }
        })?;
        let mut response =
            json_response(OPERATION, StatusCode::CREATED, &TaskMapper::to_dto(&task))?;
        response.location = Some(location);
        Ok(response)
    }

    async fn try_update(&self, id: &str, body: Option<&str>) -> Result<TaskResponse, ApiError> {
        const OPERATION: &str = "update task";
        let task_id = parse_id(id)?;
        let dto = parse_body(body)?;
        if let Some(body_id) = dto.id
            && body_id != task_id
        {
            return Err(ApiError::InvalidInput(format!(
                "task id {body_id} in body does not match path id {task_id}"
            )));
        }
        let candidate = TaskMapper::to_entity(&dto, task_id)?;
        self.repository
            .update(&candidate)
            .await
            .map_err(|err| ApiError::from_repository(OPERATION, err))?;
        Ok(TaskResponse::message(StatusCode::OK, "task updated"))
    }

    async fn try_delete(&self, id: &str) -> Result<TaskResponse, ApiError> {
        const OPERATION: &str = "delete task";
        let task_id = parse_id(id)?;
        let outcome = self
            .repository
            .delete(task_id)
            .await
            .map_err(|err| ApiError::from_repository(OPERATION, err))?;
        match outcome {
            DeleteOutcome::Deleted => Ok(TaskResponse::message(StatusCode::OK, "task deleted")),
            DeleteOutcome::Absent => Err(ApiError::NotFound),
        }
    }
}

fn parse_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<TaskId>().map_err(ApiError::from)
}

fn parse_body(body: Option<&str>) -> Result<TaskDto, ApiError> {
    let text = body
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("request body is required".to_owned()))?;
    serde_json::from_str::<Option<TaskDto>>(text)
        .map_err(|err| ApiError::InvalidInput(format!("malformed task payload: {err}")))?
        .ok_or_else(|| ApiError::InvalidInput("request body is required".to_owned()))
}

fn json_response<T: Serialize>(
    operation: &'static str,
    status: StatusCode,
    value: &T,
) -> Result<TaskResponse, ApiError> {
    let body = serde_json::to_value(value).map_err(|err| ApiError::Fault {
        operation,
        detail: err.to_string(),
    })?;
    Ok(TaskResponse {
        status,
        location: None,
        body,
    })
}
