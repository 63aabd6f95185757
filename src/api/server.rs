//! Server lifecycle: start, serve, drain, stop.

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use miette::Diagnostic;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Errors that stop the server. All of them are fatal.
#[derive(Error, Diagnostic, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    #[diagnostic(code(todo_api::server::database))]
    Database(#[from] crate::db::DbError),

    #[error("Failed to bind {addr}")]
    #[diagnostic(
        code(todo_api::server::bind),
        help("Is another process listening on this port? Try --port.")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(todo_api::server::serve))]
    Serve(#[source] io::Error),

    #[error("Server task failed: {0}")]
    #[diagnostic(code(todo_api::server::task))]
    Task(#[source] JoinError),
}

/// Bind the listening socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `app` until `shutdown` is cancelled, then drain.
///
/// Once `shutdown` fires the listener stops accepting and in-flight requests
/// get `drain_timeout` to finish. After that `serve` returns without waiting
/// for them. Connection tasks still running at that point live on the
/// runtime, so they end when the runtime is dropped as the process exits.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    drain_timeout: Duration,
) -> Result<(), ServerError> {
    let signal = shutdown.clone();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .into_future(),
    );

    tokio::select! {
        result = &mut server => return flatten(result),
        () = shutdown.cancelled() => {}
    }

    info!(
        timeout_secs = drain_timeout.as_secs_f32(),
        "Shutdown requested, draining in-flight requests"
    );

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => {
            flatten(result)?;
            info!("Server shut down gracefully");
        }
        Err(_) => {
            warn!("Drain timeout elapsed, abandoning remaining connections");
            server.abort();
        }
    }
    Ok(())
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> Result<(), ServerError> {
    result
        .map_err(ServerError::Task)?
        .map_err(ServerError::Serve)
}

/// Cancel `shutdown` on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT (Ctrl-C), starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
        () = shutdown.cancelled() => return,
    }

    shutdown.cancel();
}
