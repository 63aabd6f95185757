//! Todo management handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::page::PageRenderer;
use crate::api::state::AppState;
use crate::db::{Database, Todo, TodoPatch, TodoRepository};

// =============================================================================
// DTOs
// =============================================================================

/// Wire representation of a todo.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    #[schema(example = "k3x9a0b2c4d6e8f1g3h5")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[schema(example = "buy milk")]
    pub title: String,
    #[schema(example = false)]
    pub completed: bool,
}

impl From<Todo> for TodoResponse {
    fn from(t: Todo) -> Self {
        Self {
            id: t.id,
            created_at: t.created_at,
            title: t.title,
            completed: t.completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoEnvelope {
    pub data: TodoResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoListEnvelope {
    pub data: Vec<TodoResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "updated")]
    pub message: String,
}

impl MessageResponse {
    fn json(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    /// Missing titles are rejected the same way as empty ones
    #[schema(example = "buy milk")]
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[schema(example = "k3x9a0b2c4d6e8f1g3h5")]
    pub id: Option<String>,
    #[schema(example = "buy oat milk")]
    pub title: Option<String>,
    #[schema(example = true)]
    pub completed: Option<bool>,
}

/// Target of a delete, taken from `?id=` or from the JSON body.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DeleteTodoRequest {
    /// ID of the todo to delete
    pub id: Option<String>,
}

fn require_id(id: Option<String>) -> Result<String, ApiError> {
    id.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::MalformedRequest("missing todo id".to_string()))
}

fn require_title(title: String) -> Result<String, ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::MalformedRequest(
            "title must not be empty".to_string(),
        ));
    }
    Ok(title)
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/todo/",
    tag = "todo",
    responses(
        (status = 200, description = "All todos", body = TodoListEnvelope),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_todos<D: Database, P: PageRenderer + Send + Sync>(
    State(state): State<AppState<D, P>>,
) -> Result<Json<TodoListEnvelope>, ApiError> {
    let todos = state
        .db()
        .todos()
        .list()
        .await
        .map_err(|e| ApiError::from_db("failed to fetch todos", e))?;

    debug!(count = todos.len(), "Listed todos");

    Ok(Json(TodoListEnvelope {
        data: todos.into_iter().map(TodoResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/todo/",
    tag = "todo",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoEnvelope),
        (status = 400, description = "Malformed body or empty title", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, payload))]
pub async fn create_todo<D: Database, P: PageRenderer + Send + Sync>(
    State(state): State<AppState<D, P>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoEnvelope>), ApiError> {
    let Json(req) = payload?;
    let title = require_title(req.title)?;

    let created = state
        .db()
        .todos()
        .create(&title)
        .await
        .map_err(|e| ApiError::from_db("failed to save todo", e))?;

    debug!(id = %created.id, "Created todo");

    Ok((
        StatusCode::CREATED,
        Json(TodoEnvelope {
            data: TodoResponse::from(created),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/todo/",
    tag = "todo",
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = MessageResponse),
        (status = 400, description = "Malformed body, missing id or empty title", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, payload))]
pub async fn update_todo<D: Database, P: PageRenderer + Send + Sync>(
    State(state): State<AppState<D, P>>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let id = require_id(req.id)?;

    let patch = TodoPatch {
        title: req.title.map(require_title).transpose()?,
        completed: req.completed,
    };

    state
        .db()
        .todos()
        .update(&id, &patch)
        .await
        .map_err(|e| ApiError::from_db("failed to update todo", e))?;

    debug!(%id, "Updated todo");

    Ok(MessageResponse::json("updated"))
}

#[utoipa::path(
    delete,
    path = "/todo/",
    tag = "todo",
    params(DeleteTodoRequest),
    request_body(content = DeleteTodoRequest, description = "Alternative to the id query parameter"),
    responses(
        (status = 200, description = "Todo deleted", body = MessageResponse),
        (status = 400, description = "Missing id", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, query, body))]
pub async fn delete_todo<D: Database, P: PageRenderer + Send + Sync>(
    State(state): State<AppState<D, P>>,
    query: Result<Query<DeleteTodoRequest>, QueryRejection>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(query) = query?;

    // The query parameter wins; the body is only parsed when it is absent.
    let id = match query.id {
        Some(id) => Some(id),
        None if body.is_empty() => None,
        None => {
            serde_json::from_slice::<DeleteTodoRequest>(&body)
                .map_err(|e| ApiError::MalformedRequest(e.to_string()))?
                .id
        }
    };
    let id = require_id(id)?;

    state
        .db()
        .todos()
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_db("failed to delete todo", e))?;

    debug!(%id, "Deleted todo");

    Ok(MessageResponse::json("deleted"))
}
