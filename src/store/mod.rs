//! Document store module
//!
//! Maps logical document paths to raw content for the two namespaces the
//! server publishes: JSON-LD contexts and HTML vocabulary pages.
//! Documents are either preloaded into memory at startup or read from disk
//! on every lookup.

mod error;

pub use error::{Result, StoreError};

use crate::config::DocumentsConfig;
use crate::logger;
use hyper::body::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Document namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// JSON-LD `@context` documents
    Contexts,
    /// Pre-rendered HTML vocabulary pages
    Vocab,
}

impl Namespace {
    /// File extension every document in this namespace carries
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Contexts => "jsonld",
            Self::Vocab => "html",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contexts => f.write_str("contexts"),
            Self::Vocab => f.write_str("vocab"),
        }
    }
}

/// How documents reach the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Read every document into memory at startup
    #[default]
    Eager,
    /// Read from disk on each lookup
    OnDemand,
}

/// Backing storage for one namespace
#[derive(Debug)]
enum Collection {
    Memory(HashMap<String, Bytes>),
    Disk(PathBuf),
}

/// Read-only document store for both namespaces
#[derive(Debug)]
pub struct DocumentStore {
    contexts: Collection,
    vocab: Collection,
}

impl DocumentStore {
    /// Build the store from the configured directories
    pub fn load(config: &DocumentsConfig) -> Result<Self> {
        let contexts_root = Path::new(&config.contexts_dir);
        let vocab_root = Path::new(&config.vocab_dir);

        match config.load_mode {
            LoadMode::Eager => Ok(Self {
                contexts: Collection::Memory(scan(contexts_root, Namespace::Contexts)?),
                vocab: Collection::Memory(scan(vocab_root, Namespace::Vocab)?),
            }),
            LoadMode::OnDemand => Ok(Self {
                contexts: Collection::Disk(check_root(contexts_root, Namespace::Contexts)?),
                vocab: Collection::Disk(check_root(vocab_root, Namespace::Vocab)?),
            }),
        }
    }

    /// Build an in-memory store from `(key, content)` pairs
    pub fn from_documents<C, V>(contexts: C, vocab: V) -> Self
    where
        C: IntoIterator<Item = (String, Bytes)>,
        V: IntoIterator<Item = (String, Bytes)>,
    {
        Self {
            contexts: Collection::Memory(contexts.into_iter().collect()),
            vocab: Collection::Memory(vocab.into_iter().collect()),
        }
    }

    /// Look up a document by its path relative to the namespace root
    ///
    /// Returns `Ok(None)` for missing documents and for keys that could not
    /// name a document of this namespace (wrong extension, `..` segments,
    /// absolute paths).
    pub async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Bytes>> {
        if !is_valid_key(key, namespace) {
            return Ok(None);
        }

        match self.collection(namespace) {
            Collection::Memory(documents) => Ok(documents.get(key).cloned()),
            Collection::Disk(root) => read_from_disk(root, key).await,
        }
    }

    pub async fn contains(&self, namespace: Namespace, key: &str) -> Result<bool> {
        Ok(self.get(namespace, key).await?.is_some())
    }

    /// Number of preloaded documents, `None` when reading from disk
    pub fn len(&self, namespace: Namespace) -> Option<usize> {
        match self.collection(namespace) {
            Collection::Memory(documents) => Some(documents.len()),
            Collection::Disk(_) => None,
        }
    }

    const fn collection(&self, namespace: Namespace) -> &Collection {
        match namespace {
            Namespace::Contexts => &self.contexts,
            Namespace::Vocab => &self.vocab,
        }
    }
}

fn is_valid_key(key: &str, namespace: Namespace) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains(['\\', '\0'])
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        && Path::new(key).extension().and_then(|e| e.to_str()) == Some(namespace.extension())
}

/// Missing roots are allowed (empty namespace), non-directories are not
fn check_root(root: &Path, namespace: Namespace) -> Result<PathBuf> {
    if root.exists() && !root.is_dir() {
        return Err(StoreError::InvalidRoot(root.to_path_buf()));
    }
    if !root.exists() {
        logger::log_warning(&format!(
            "{namespace} directory not found: {}",
            root.display()
        ));
    }
    Ok(root.to_path_buf())
}

/// Read every document of `namespace` below `root` into memory
fn scan(root: &Path, namespace: Namespace) -> Result<HashMap<String, Bytes>> {
    let mut documents = HashMap::new();
    if !check_root(root, namespace)?.exists() {
        return Ok(documents);
    }
    let root_canonical = std::fs::canonicalize(root).map_err(|e| StoreError::io(root, e))?;

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                logger::log_warning(&format!("Skipping {namespace} entry: {e}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(namespace.extension()) {
            continue;
        }

        // Symlinks may point outside the document root
        let canonical = std::fs::canonicalize(path).map_err(|e| StoreError::io(path, e))?;
        if !canonical.starts_with(&root_canonical) {
            logger::log_warning(&format!(
                "Skipping {namespace} document outside root: {} -> {}",
                path.display(),
                canonical.display()
            ));
            continue;
        }

        let Some(key) = path.strip_prefix(root).ok().and_then(relative_key) else {
            logger::log_warning(&format!("Skipping unreadable path: {}", path.display()));
            continue;
        };

        let content = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
        logger::log_debug(&format!("Loaded {namespace} document: {key}"));
        documents.insert(key, Bytes::from(content));
    }

    Ok(documents)
}

/// Join path components with `/` regardless of platform separator
fn relative_key(relative: &Path) -> Option<String> {
    let segments = relative
        .components()
        .map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}

async fn read_from_disk(root: &Path, key: &str) -> Result<Option<Bytes>> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) if is_missing(&e) => return Ok(None),
        Err(e) => return Err(StoreError::io(root, e)),
    };

    let candidate = root_canonical.join(key);
    let file_canonical = match fs::canonicalize(&candidate).await {
        Ok(p) => p,
        Err(e) if is_missing(&e) => return Ok(None),
        Err(e) => return Err(StoreError::io(candidate, e)),
    };

    // Symlinks may point outside the document root
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {key} -> {}",
            file_canonical.display()
        ));
        return Ok(None);
    }

    let metadata = fs::metadata(&file_canonical)
        .await
        .map_err(|e| StoreError::io(&file_canonical, e))?;
    if !metadata.is_file() {
        return Ok(None);
    }

    match fs::read(&file_canonical).await {
        Ok(content) => Ok(Some(Bytes::from(content))),
        Err(e) if is_missing(&e) => Ok(None),
        Err(e) => Err(StoreError::io(file_canonical, e)),
    }
}

fn is_missing(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}
