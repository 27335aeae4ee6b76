//! Directory index of OpenAPI v2 documents.
//!
//! The index walks a generated-documents directory once, keeps every
//! `*.swagger.json` it finds, and afterwards answers
//! `(package, service, method)` lookups with a linear scan. Loading is
//! write-once: the document set is immutable after either loader runs, so
//! concurrent calls may resolve against a shared index without locking.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::call_path::CallPath;
use crate::document::{OpenApiDocument, Operation};
use crate::error::{Error, Result};

/// File suffix that marks an OpenAPI v2 document.
const DOCUMENT_SUFFIX: &str = ".swagger.json";

/// Tooling directories skipped during discovery: VCS metadata,
/// package-manager caches, build output, editor state.
const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    ".idea",
    ".vscode",
];

/// Loads and resolves OpenAPI v2 documents from a directory tree.
///
/// Construct with [`OpenApiIndex::new`], then populate with either
/// [`load_sync`](Self::load_sync) (blocking) or [`load`](Self::load)
/// (async). Both produce the identical document set — files are sorted by
/// path before parsing — and the first loader to finish wins; later loads
/// are no-ops. Until a load succeeds, [`is_loaded`](Self::is_loaded) is
/// `false` and every [`resolve`](Self::resolve) returns `None`.
#[derive(Debug)]
pub struct OpenApiIndex {
    dir: PathBuf,
    documents: OnceLock<Vec<OpenApiDocument>>,
}

impl OpenApiIndex {
    /// Create an unloaded index over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            documents: OnceLock::new(),
        }
    }

    /// The directory this index reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a load has completed. Callers must check this before
    /// resolving; an unloaded index resolves nothing.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.documents.get().is_some()
    }

    /// The loaded documents, ordered by file path. Empty until loaded.
    #[must_use]
    pub fn documents(&self) -> &[OpenApiDocument] {
        self.documents.get().map_or(&[], Vec::as_slice)
    }

    /// Walk the directory and parse every document, blocking the caller.
    ///
    /// # Errors
    ///
    /// [`Error::DirectoryMissing`] if the directory does not exist,
    /// [`Error::Io`] on a filesystem failure, [`Error::Json`] if a document
    /// fails to parse. The index stays unloaded on error.
    pub fn load_sync(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        if !self.dir.is_dir() {
            return Err(Error::DirectoryMissing {
                dir: self.dir.clone(),
            });
        }

        let mut files = Vec::new();
        discover_sync(&self.dir, &mut files)?;
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let text = std::fs::read_to_string(&path)?;
            documents.push(OpenApiDocument::from_json(path, &text)?);
        }
        self.install(documents);
        Ok(())
    }

    /// Walk the directory and parse every document without blocking.
    ///
    /// Produces the same document set as [`load_sync`](Self::load_sync).
    ///
    /// # Errors
    ///
    /// Same conditions as [`load_sync`](Self::load_sync).
    pub async fn load(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        if !tokio::fs::metadata(&self.dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
        {
            return Err(Error::DirectoryMissing {
                dir: self.dir.clone(),
            });
        }

        let mut files = Vec::new();
        let mut pending = vec![self.dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    if is_skipped_dir(&path) {
                        tracing::debug!(dir = %path.display(), "skipping tooling directory");
                        continue;
                    }
                    pending.push(path);
                } else if is_document(&path) {
                    files.push(path);
                }
            }
        }
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let text = tokio::fs::read_to_string(&path).await?;
            documents.push(OpenApiDocument::from_json(path, &text)?);
        }
        self.install(documents);
        Ok(())
    }

    /// Resolve a call path to its operation.
    ///
    /// Computes `tag = "{package}.{service}"` and
    /// `operationId = "{service}_{method}"`, then scans documents whose tag
    /// list matches and their operations for an id match. First match wins.
    /// Returns `None` when unloaded or unmatched — the linear scan runs
    /// once per call against a small, static corpus.
    #[must_use]
    pub fn resolve(&self, call_path: &CallPath) -> Option<&Operation> {
        let documents = self.documents.get()?;
        let tag = call_path.tag();
        let operation_id = call_path.operation_id();
        documents
            .iter()
            .filter(|doc| doc.has_tag(&tag))
            .flat_map(|doc| doc.operations().iter())
            .find(|op| op.operation_id == operation_id)
    }

    fn install(&self, documents: Vec<OpenApiDocument>) {
        tracing::debug!(
            dir = %self.dir.display(),
            documents = documents.len(),
            "OpenAPI index loaded",
        );
        // First load wins; a racing second load discards its result.
        let _ = self.documents.set(documents);
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn is_document(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DOCUMENT_SUFFIX))
}

fn discover_sync(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if is_skipped_dir(&path) {
                tracing::debug!(dir = %path.display(), "skipping tooling directory");
                continue;
            }
            discover_sync(&path, files)?;
        } else if is_document(&path) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    const GREETER_DOC: &str = indoc! {r#"
        {
          "swagger": "2.0",
          "tags": [{"name": "a.b.Greeter"}],
          "paths": {
            "/sayhello": {
              "post": {"operationId": "Greeter_SayHello", "parameters": []}
            }
          }
        }
    "#};

    const ITEMS_DOC: &str = indoc! {r#"
        {
          "swagger": "2.0",
          "tags": [{"name": "shop.v1.Items"}],
          "paths": {
            "/v1/items/{id}": {
              "get": {
                "operationId": "Items_GetItem",
                "parameters": [{"name": "id", "in": "path", "required": true}]
              }
            }
          }
        }
    "#};

    /// Build a fresh fixture tree under the OS temp dir.
    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tonic-gateway-openapi-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("greeter.swagger.json"), GREETER_DOC).unwrap();
        std::fs::write(dir.join("nested/items.swagger.json"), ITEMS_DOC).unwrap();
        // Decoys: wrong suffix, and documents inside skipped directories.
        std::fs::write(dir.join("notes.json"), "{}").unwrap();
        for skipped in [".git", "node_modules"] {
            std::fs::create_dir_all(dir.join(skipped)).unwrap();
            std::fs::write(dir.join(skipped).join("decoy.swagger.json"), "{not json").unwrap();
        }
        dir
    }

    fn greeter_path() -> CallPath {
        CallPath::parse("/a.b.Greeter/SayHello").unwrap()
    }

    #[test]
    fn load_sync_discovers_recursively_and_skips_tooling_dirs() {
        let dir = fixture_dir("sync");
        let index = OpenApiIndex::new(&dir);
        assert!(!index.is_loaded());

        index.load_sync().unwrap();
        assert!(index.is_loaded());
        // The decoys in .git/ and node_modules/ are invalid JSON; reaching
        // here proves they were never parsed.
        assert_eq!(index.documents().len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn resolve_finds_exact_match_only() {
        let dir = fixture_dir("resolve");
        let index = OpenApiIndex::new(&dir);
        index.load_sync().unwrap();

        let op = index.resolve(&greeter_path()).unwrap();
        assert_eq!(op.operation_id, "Greeter_SayHello");
        assert_eq!(op.path_template, "/sayhello");

        let nested = index
            .resolve(&CallPath::parse("/shop.v1.Items/GetItem").unwrap())
            .unwrap();
        assert_eq!(nested.operation_id, "Items_GetItem");

        assert!(index
            .resolve(&CallPath::parse("/a.b.Greeter/SayGoodbye").unwrap())
            .is_none());
        assert!(index
            .resolve(&CallPath::parse("/other.Pkg/SayHello").unwrap())
            .is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn resolve_before_load_returns_none() {
        let index = OpenApiIndex::new("/nonexistent");
        assert!(index.resolve(&greeter_path()).is_none());
    }

    #[test]
    fn missing_directory_is_an_error_and_stays_unloaded() {
        let index = OpenApiIndex::new("/nonexistent/openapi");
        let err = index.load_sync().unwrap_err();
        assert!(matches!(err, Error::DirectoryMissing { .. }));
        assert!(!index.is_loaded());
    }

    #[test]
    fn second_load_is_a_noop() {
        let dir = fixture_dir("reload");
        let index = OpenApiIndex::new(&dir);
        index.load_sync().unwrap();
        index.load_sync().unwrap();
        assert_eq!(index.documents().len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_document_fails_the_load() {
        let dir = std::env::temp_dir().join("tonic-gateway-openapi-invalid");
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.swagger.json"), "{not json").unwrap();

        let index = OpenApiIndex::new(&dir);
        let err = index.load_sync().unwrap_err();
        assert!(err.to_string().contains("bad.swagger.json"));
        assert!(!index.is_loaded());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn async_load_matches_sync_load() {
        let dir = fixture_dir("async");
        let sync_index = OpenApiIndex::new(&dir);
        sync_index.load_sync().unwrap();
        let async_index = OpenApiIndex::new(&dir);
        async_index.load().await.unwrap();

        let sync_files: Vec<_> = sync_index
            .documents()
            .iter()
            .map(|doc| doc.file_path().to_path_buf())
            .collect();
        let async_files: Vec<_> = async_index
            .documents()
            .iter()
            .map(|doc| doc.file_path().to_path_buf())
            .collect();
        assert_eq!(sync_files, async_files);

        let op = async_index.resolve(&greeter_path()).unwrap();
        assert_eq!(op.operation_id, "Greeter_SayHello");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn async_load_missing_directory_is_an_error() {
        let index = OpenApiIndex::new("/nonexistent/openapi");
        let err = index.load().await.unwrap_err();
        assert!(matches!(err, Error::DirectoryMissing { .. }));
    }
}
