//! HTTP layer: handlers, routing, and the server lifecycle.

mod error;
mod handlers;
mod page;
mod routes;
mod server;
mod state;


pub use error::{ApiError, ErrorResponse};
pub use handlers::{
    CreateTodoRequest, DeleteTodoRequest, MessageResponse, TodoEnvelope, TodoListEnvelope,
    TodoResponse, UpdateTodoRequest,
};
pub use page::{EmbeddedPages, HomePage, PageError, PageRenderer, TemplateFile};
pub use routes::{ApiDoc, RouterOptions, TODO_PREFIX, create_router};
pub use server::{ServerError, bind, cancel_on_signal, serve};
pub use state::AppState;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::SurrealDatabase;

/// Initialize tracing subscriber with env filter
///
/// `RUST_LOG` wins when set; otherwise the level follows the -v count.
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "todo_api=info,tower_http=info",
        1 => "todo_api=debug,tower_http=debug",
        _ => "todo_api=trace,tower_http=trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the API server with the given configuration.
///
/// Connects to the database, binds the socket, and serves until SIGINT or
/// SIGTERM. A failure to connect or bind is returned immediately.
pub async fn run(config: Config) -> Result<(), ServerError> {
    init_tracing(config.verbose);

    let db = SurrealDatabase::connect(&config.db).await?;
    let state = AppState::new(db, HomePage::from_config(config.home_template.clone()));

    let app = create_router(
        state,
        &RouterOptions {
            enable_docs: config.enable_docs,
            request_timeout: config.request_timeout(),
        },
    );

    let addr = config.listen_addr();
    let listener = bind(addr).await?;
    info!("API server listening on http://{}", addr);
    if config.enable_docs {
        info!("API docs at http://{}/docs", addr);
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    serve(listener, app, shutdown, config.drain_timeout()).await?;
    info!("Server stopped");
    Ok(())
}
