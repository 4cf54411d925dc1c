//! Document dispatch module
//!
//! Decides what a request path under one of the two route scopes resolves to:
//! a JSON-LD context, an HTML vocabulary page, a redirect, or nothing.

use crate::logger;
use crate::store::{DocumentStore, Namespace, StoreError};
use hyper::body::Bytes;

const JSONLD_SUFFIX: &str = ".jsonld";

/// Route scope the request path was matched under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `/*`
    Root,
    /// `/contexts/*`
    Contexts,
}

/// Outcome of resolving a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Compact-serialized JSON-LD context document
    Context(Bytes),
    /// HTML vocabulary page, served verbatim
    Vocab(Bytes),
    /// Redirect to the given absolute path
    Redirect(String),
    NotFound,
    /// Unexpected failure, already logged
    Failed,
}

/// Resolve `path` (relative to the scope prefix, percent-decoded) against the store
///
/// `raw_path` is the same path as the client sent it; redirect targets are
/// built from it so the `Location` header stays a valid URI.
pub async fn resolve(
    store: &DocumentStore,
    scope: Scope,
    path: &str,
    raw_path: &str,
) -> Resolution {
    match resolve_inner(store, scope, path, raw_path).await {
        Ok(resolution) => resolution,
        Err(e) => {
            logger::log_error(&format!("Failed to load document '{path}': {e}"));
            Resolution::Failed
        }
    }
}

async fn resolve_inner(
    store: &DocumentStore,
    scope: Scope,
    path: &str,
    raw_path: &str,
) -> Result<Resolution, StoreError> {
    if path.is_empty() {
        return Ok(Resolution::NotFound);
    }

    // Explicit .jsonld requests are only ever served from the contexts scope
    if path.ends_with(JSONLD_SUFFIX) {
        if scope != Scope::Contexts {
            return Ok(Resolution::NotFound);
        }
        return Ok(match store.get(Namespace::Contexts, path).await? {
            Some(raw) => load_context(path, &raw),
            None => Resolution::NotFound,
        });
    }

    let vocab_key = format!("{path}.{}", Namespace::Vocab.extension());
    if let Some(page) = store.get(Namespace::Vocab, &vocab_key).await? {
        return Ok(Resolution::Vocab(page));
    }

    Ok(match scope {
        Scope::Contexts => Resolution::Redirect(format!("/contexts/{raw_path}{JSONLD_SUFFIX}")),
        Scope::Root => Resolution::NotFound,
    })
}

/// Parse a context document and re-serialize it compactly
///
/// A file that is not valid JSON is not a servable context and resolves to
/// `NotFound`.
fn load_context(path: &str, raw: &[u8]) -> Resolution {
    let parsed = serde_json::from_slice::<serde_json::Value>(raw)
        .and_then(|document| serde_json::to_vec(&document));
    match parsed {
        Ok(compact) => Resolution::Context(Bytes::from(compact)),
        Err(e) => {
            logger::log_error(&format!("Invalid JSON in context document '{path}': {e}"));
            Resolution::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DocumentStore {
        DocumentStore::from_documents(
            [
                (
                    "karte_von_morgen-v1.0.0.jsonld".to_string(),
                    Bytes::from_static(b"{\n  \"@context\": {\"name\": \"schema:name\"}\n}\n"),
                ),
                ("broken.jsonld".to_string(), Bytes::from_static(b"{ not json")),
            ],
            [
                (
                    "linkedSchemas.html".to_string(),
                    Bytes::from_static(b"<h1>linkedSchemas</h1>"),
                ),
                (
                    "karte_von_morgen-v1.0.0.html".to_string(),
                    Bytes::from_static(b"<h1>karte</h1>"),
                ),
            ],
        )
    }

    #[tokio::test]
    async fn test_context_found_is_compacted() {
        let path = "karte_von_morgen-v1.0.0.jsonld";
        let resolution = resolve(&store(), Scope::Contexts, path, path).await;
        assert_eq!(
            resolution,
            Resolution::Context(Bytes::from_static(br#"{"@context":{"name":"schema:name"}}"#))
        );
    }

    #[tokio::test]
    async fn test_context_missing() {
        let path = "nope.jsonld";
        let resolution = resolve(&store(), Scope::Contexts, path, path).await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_jsonld_under_root_is_not_found() {
        let path = "karte_von_morgen-v1.0.0.jsonld";
        let resolution = resolve(&store(), Scope::Root, path, path).await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_vocab_page_served_in_both_scopes() {
        for scope in [Scope::Root, Scope::Contexts] {
            let resolution = resolve(&store(), scope, "linkedSchemas", "linkedSchemas").await;
            assert_eq!(
                resolution,
                Resolution::Vocab(Bytes::from_static(b"<h1>linkedSchemas</h1>"))
            );
        }
    }

    #[tokio::test]
    async fn test_vocab_wins_over_context_redirect() {
        let path = "karte_von_morgen-v1.0.0";
        let resolution = resolve(&store(), Scope::Contexts, path, path).await;
        assert_eq!(resolution, Resolution::Vocab(Bytes::from_static(b"<h1>karte</h1>")));
    }

    #[tokio::test]
    async fn test_contexts_scope_redirects_when_vocab_missing() {
        let path = "organizations-v1";
        let resolution = resolve(&store(), Scope::Contexts, path, path).await;
        assert_eq!(
            resolution,
            Resolution::Redirect("/contexts/organizations-v1.jsonld".to_string())
        );
    }

    #[tokio::test]
    async fn test_redirect_keeps_raw_path() {
        let resolution = resolve(&store(), Scope::Contexts, "my term", "my%20term").await;
        assert_eq!(
            resolution,
            Resolution::Redirect("/contexts/my%20term.jsonld".to_string())
        );
    }

    #[tokio::test]
    async fn test_root_scope_not_found_when_vocab_missing() {
        let path = "organizations-v1";
        let resolution = resolve(&store(), Scope::Root, path, path).await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_empty_path_is_not_found() {
        assert_eq!(resolve(&store(), Scope::Contexts, "", "").await, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_context_json_is_not_found() {
        let path = "broken.jsonld";
        let resolution = resolve(&store(), Scope::Contexts, path, path).await;
        assert_eq!(resolution, Resolution::NotFound);
    }
}
