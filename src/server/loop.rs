// Server loop module
// Accepts connections until shutdown, then waits for in-flight connections to drain

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop for the document server
///
/// Runs until `shutdown` is notified. After that the listener is closed and
/// active connections get up to the connection timeout to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                logger::log_info("[Shutdown] Stopped accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain_connections(
        &active_connections,
        state.config.performance.connection_timeout(),
    )
    .await;
}

/// Wait until no connections remain or `deadline` elapses
async fn drain_connections(active_connections: &AtomicUsize, deadline: Duration) {
    let started = tokio::time::Instant::now();
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            logger::log_info("[Shutdown] All connections closed");
            return;
        }
        if started.elapsed() >= deadline {
            logger::log_warning(&format!(
                "[Shutdown] {remaining} connections still open after {}s, exiting",
                deadline.as_secs()
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
