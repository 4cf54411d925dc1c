use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use namespace_server::config::{AppState, Config, DEFAULT_CONFIG_PATH};
use namespace_server::logger;
use namespace_server::server::{self, SignalHandler};
use namespace_server::store::DocumentStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension, e.g. `namespace-server /etc/namespace/config`
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let documents = cfg.documents.clone();
    let store = tokio::task::spawn_blocking(move || DocumentStore::load(&documents)).await??;
    logger::log_store_loaded(&store);

    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg, store));

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals), Arc::clone(&state))?;

    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(
        listener,
        state,
        Arc::new(AtomicUsize::new(0)),
        Arc::clone(&signals.shutdown),
    )
    .await;

    logger::log_info("Server stopped");
    Ok(())
}
