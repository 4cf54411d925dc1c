// Application state module
// Shared runtime state: configuration, document store, cached flags

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::Config;
use crate::logger;
use crate::store::{DocumentStore, StoreError};

/// Application state
pub struct AppState {
    pub config: Config,
    store: RwLock<Arc<DocumentStore>>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config, store: DocumentStore) -> Self {
        Self {
            config: config.clone(),
            store: RwLock::new(Arc::new(store)),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }

    /// Current document store snapshot
    pub async fn store(&self) -> Arc<DocumentStore> {
        Arc::clone(&*self.store.read().await)
    }

    /// Rebuild the document store from disk and swap it in.
    ///
    /// On failure the previous store stays active.
    pub async fn reload_documents(&self) -> Result<(), StoreError> {
        let documents = self.config.documents.clone();
        let store = tokio::task::spawn_blocking(move || DocumentStore::load(&documents)).await??;
        logger::log_store_loaded(&store);
        *self.store.write().await = Arc::new(store);
        Ok(())
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Namespace;

    #[tokio::test]
    async fn test_reload_picks_up_new_documents() {
        let dir = tempfile::tempdir().unwrap();
        let contexts = dir.path().join("contexts");
        let vocab = dir.path().join("vocab");
        std::fs::create_dir_all(&contexts).unwrap();
        std::fs::create_dir_all(&vocab).unwrap();

        let mut cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        cfg.documents.contexts_dir = contexts.to_string_lossy().into_owned();
        cfg.documents.vocab_dir = vocab.to_string_lossy().into_owned();

        let state = AppState::new(&cfg, DocumentStore::load(&cfg.documents).unwrap());
        assert!(!state.store().await.contains(Namespace::Vocab, "term.html").await.unwrap());

        std::fs::write(vocab.join("term.html"), "<p>term</p>").unwrap();
        state.reload_documents().await.unwrap();
        assert!(state.store().await.contains(Namespace::Vocab, "term.html").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_old_store() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab");
        std::fs::create_dir_all(&vocab).unwrap();
        std::fs::write(vocab.join("term.html"), "<p>term</p>").unwrap();

        let mut cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        cfg.documents.contexts_dir = dir.path().join("contexts").to_string_lossy().into_owned();
        cfg.documents.vocab_dir = vocab.to_string_lossy().into_owned();
        let state = AppState::new(&cfg, DocumentStore::load(&cfg.documents).unwrap());

        // Replace the vocab directory with a plain file so the rescan fails
        std::fs::remove_dir_all(&vocab).unwrap();
        std::fs::write(&vocab, "not a directory").unwrap();

        assert!(state.reload_documents().await.is_err());
        assert!(state.store().await.contains(Namespace::Vocab, "term.html").await.unwrap());
    }
}
