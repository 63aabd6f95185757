//! Home page handler.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::page::PageRenderer;
use crate::api::state::AppState;
use crate::db::Database;

/// Home page
///
/// Returns the static HTML front end for the todo list
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Home page", content_type = "text/html", body = String),
        (status = 500, description = "Page could not be rendered", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn home<D: Database, P: PageRenderer + Send + Sync>(
    State(state): State<AppState<D, P>>,
) -> Result<Html<String>, ApiError> {
    let page = state.pages().render_home()?;
    Ok(Html(page))
}
