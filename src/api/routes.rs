//! API route configuration.

use std::time::Duration;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::error::{ApiError, ErrorResponse};
use super::handlers::{
    self, CreateTodoRequest, DeleteTodoRequest, MessageResponse, TodoEnvelope, TodoListEnvelope,
    TodoResponse, UpdateTodoRequest,
};
use super::page::PageRenderer;
use super::state::AppState;
use crate::db::Database;

/// Prefix the todo routes are mounted under.
pub const TODO_PREFIX: &str = "/todo";

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todo API",
        version = "0.1.0",
        description = "Create, list, update and delete todo items",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::home,
        handlers::list_todos,
        handlers::create_todo,
        handlers::update_todo,
        handlers::delete_todo,
    ),
    components(
        schemas(
            TodoResponse,
            TodoEnvelope,
            TodoListEnvelope,
            CreateTodoRequest,
            UpdateTodoRequest,
            DeleteTodoRequest,
            MessageResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "Home page"),
        (name = "todo", description = "Todo management endpoints")
    )
)]
pub struct ApiDoc;

/// Router-level settings.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Serve the OpenAPI viewer at /docs
    pub enable_docs: bool,
    /// Longest a single request may run before it is answered with 408
    pub request_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            enable_docs: false,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// All four todo operations share one path, split by method.
fn todo_methods<D, P>() -> MethodRouter<AppState<D, P>>
where
    D: Database + 'static,
    P: PageRenderer + Send + Sync + 'static,
{
    get(handlers::list_todos::<D, P>)
        .post(handlers::create_todo::<D, P>)
        .put(handlers::update_todo::<D, P>)
        .delete(handlers::delete_todo::<D, P>)
}

/// Give the timeout layer's bare 408 the same envelope as every other error.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return ApiError::RequestTimeout.into_response();
    }
    response
}

/// Create the API router with request logging and the request timeout.
pub fn create_router<D, P>(state: AppState<D, P>, options: &RouterOptions) -> Router
where
    D: Database + 'static,
    P: PageRenderer + Send + Sync + 'static,
{
    // Both /todo and /todo/ reach the same handlers
    let todo_routes = Router::new()
        .route(TODO_PREFIX, todo_methods::<D, P>())
        .route(&format!("{TODO_PREFIX}/"), todo_methods::<D, P>());

    let mut router = Router::new()
        .route("/", get(handlers::home::<D, P>))
        .merge(todo_routes);

    if options.enable_docs {
        router = router.merge(Scalar::with_url("/docs", ApiDoc::openapi()));
    }

    router
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            options.request_timeout,
        ))
        .layer(middleware::map_response(timeout_envelope))
        .layer(TraceLayer::new_for_http())
}
