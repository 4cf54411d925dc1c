// Signal handling module
//
// Supported signals:
// - SIGHUP:  Reload the document store
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGUSR1: Reopen log files

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Arc<Notify>,
    /// Whether shutdown has been requested
    pub shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Request shutdown once; later calls are ignored
    pub fn request_shutdown(&self, reason: &str) {
        if self.shutdown_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        logger::log_info(&format!("[Signal] {reason} received, shutting down gracefully"));
        // notify_one stores a permit if the accept loop is not currently waiting
        self.shutdown.notify_one();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Register signal handlers and spawn the task that reacts to them
///
/// | Signal  | Action               |
/// |---------|----------------------|
/// | SIGHUP  | Reload documents     |
/// | SIGTERM | Graceful stop        |
/// | SIGINT  | Graceful stop        |
/// | SIGUSR1 | Reopen log files     |
#[cfg(unix)]
pub fn start_signal_handler(
    handler: Arc<SignalHandler>,
    state: Arc<AppState>,
) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    logger::log_info(&format!(
        "[Signal] Handlers registered (HUP reload, TERM/INT stop, USR1 reopen logs), pid {}",
        std::process::id()
    ));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    logger::log_info("[Signal] SIGHUP received, reloading documents");
                    match state.reload_documents().await {
                        Ok(()) => logger::log_info("[Signal] Documents reloaded"),
                        Err(e) => logger::log_error(&format!(
                            "Document reload failed, keeping previous documents: {e}"
                        )),
                    }
                }

                _ = sigterm.recv() => {
                    handler.request_shutdown("SIGTERM");
                    break;
                }

                _ = sigint.recv() => {
                    handler.request_shutdown("SIGINT");
                    break;
                }

                _ = sigusr1.recv() => {
                    match logger::reopen(&state.config) {
                        Ok(()) => logger::log_info("[Signal] Log files reopened"),
                        Err(e) => logger::log_error(&format!("Failed to reopen log files: {e}")),
                    }
                }
            }
        }
    });

    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(
    handler: Arc<SignalHandler>,
    _state: Arc<AppState>,
) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            handler.request_shutdown("Ctrl+C");
        }
    });
    Ok(())
}
