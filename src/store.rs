//! Manifest loading and document resources.
//!
//! Resources are addressed by the relative paths that appear in the
//! manifest. A [`ResourceSource`] answers with an HTTP-like status so the
//! rest of the viewer can treat "missing" and "unreadable" the same way a
//! static web host would.

use crate::error::FetchError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// One entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub path: String,
}

impl DocumentDescriptor {
    pub fn new(title: Option<&str>, path: &str) -> Self {
        Self {
            title: title.map(str::to_string),
            path: path.to_string(),
        }
    }

    /// Sidebar label: the title, or the path when there is no title.
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.path,
        }
    }
}

/// Ordered list of documents, paths unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    documents: Vec<DocumentDescriptor>,
}

impl Manifest {
    /// Build a manifest, dropping entries with an empty path and repeated
    /// paths (first one wins).
    pub fn new(entries: Vec<DocumentDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let documents = entries
            .into_iter()
            .filter(|doc| {
                if doc.path.trim().is_empty() {
                    warn!("manifest entry {:?} has an empty path, skipping", doc.title);
                    return false;
                }
                if !seen.insert(doc.path.clone()) {
                    warn!("duplicate manifest path '{}', keeping the first", doc.path);
                    return false;
                }
                true
            })
            .collect();
        Self { documents }
    }

    /// Parse the manifest JSON (an array of `{ title?, path }`).
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries: Vec<DocumentDescriptor> = serde_json::from_slice(bytes)?;
        Ok(Self::new(entries))
    }

    pub fn find_by_path(&self, path: &str) -> Option<&DocumentDescriptor> {
        self.documents.iter().find(|doc| doc.path == path)
    }

    pub fn first(&self) -> Option<&DocumentDescriptor> {
        self.documents.first()
    }

    pub fn documents(&self) -> &[DocumentDescriptor] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Raw answer for a resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where manifest and document bytes come from.
pub trait ResourceSource {
    fn fetch(&self, path: &str) -> Result<Response, FetchError>;
}

/// Serves resources from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a resource path onto the root, or `None` if it would leave it.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches("./"));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(resolved)
    }
}

impl ResourceSource for FsSource {
    fn fetch(&self, path: &str) -> Result<Response, FetchError> {
        let Some(file) = self.resolve(path) else {
            return Ok(Response::status(403));
        };
        if file.is_dir() {
            return Ok(Response::status(404));
        }
        match fs::read(&file) {
            Ok(body) => Ok(Response::ok(body)),
            Err(e) => match e.kind() {
                io::ErrorKind::NotFound => Ok(Response::status(404)),
                io::ErrorKind::PermissionDenied => Ok(Response::status(403)),
                _ => Err(FetchError::Io {
                    path: path.to_string(),
                    source: e,
                }),
            },
        }
    }
}

/// Loads the manifest through a source.
pub struct DocumentStore;

impl DocumentStore {
    /// Fetch and parse the manifest.
    ///
    /// Returns `None` on any failure; the reason is logged, never raised.
    pub fn load(source: &dyn ResourceSource, manifest_path: &str) -> Option<Manifest> {
        let response = match source.fetch(manifest_path) {
            Ok(response) => response,
            Err(e) => {
                warn!("manifest unavailable: {}", e);
                return None;
            }
        };
        if !response.is_success() {
            warn!(
                "manifest unavailable: {} answered {}",
                manifest_path, response.status
            );
            return None;
        }
        match Manifest::from_json(&response.body) {
            Ok(manifest) => {
                debug!("loaded {} manifest entries", manifest.len());
                Some(manifest)
            }
            Err(e) => {
                warn!("manifest unavailable: {} is malformed: {}", manifest_path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, Response>);

    impl ResourceSource for MapSource {
        fn fetch(&self, path: &str) -> Result<Response, FetchError> {
            Ok(self
                .0
                .get(path)
                .cloned()
                .unwrap_or_else(|| Response::status(404)))
        }
    }

    #[test]
    fn test_label_prefers_title() {
        assert_eq!(DocumentDescriptor::new(Some("Guide"), "docs/g.md").label(), "Guide");
        assert_eq!(DocumentDescriptor::new(None, "docs/g.md").label(), "docs/g.md");
        assert_eq!(DocumentDescriptor::new(Some(" "), "docs/g.md").label(), "docs/g.md");
    }

    #[test]
    fn test_manifest_from_json() {
        let json = br#"[{"title": "Intro", "path": "docs/intro.md"}, {"path": "docs/api.md"}]"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.first().unwrap().label(), "Intro");
        assert_eq!(manifest.find_by_path("docs/api.md").unwrap().title, None);
        assert!(manifest.find_by_path("docs/nope.md").is_none());
    }

    #[test]
    fn test_manifest_drops_empty_and_duplicate_paths() {
        let json = br#"[{"path": "a.md"}, {"path": ""}, {"title": "again", "path": "a.md"}, {"path": "b.md"}]"#;
        let manifest = Manifest::from_json(json).unwrap();
        let paths: Vec<_> = manifest.documents().iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["a.md", "b.md"]);
        assert_eq!(manifest.first().unwrap().title, None);
    }

    #[test]
    fn test_store_load_failures_return_none() {
        let source = MapSource(HashMap::from([
            ("bad.json", Response::ok(&b"{not json"[..])),
            ("object.json", Response::ok(&br#"{"path": "a.md"}"#[..])),
            ("error.json", Response::status(500)),
        ]));
        assert!(DocumentStore::load(&source, "missing.json").is_none());
        assert!(DocumentStore::load(&source, "bad.json").is_none());
        assert!(DocumentStore::load(&source, "object.json").is_none());
        assert!(DocumentStore::load(&source, "error.json").is_none());
    }

    #[test]
    fn test_store_load_empty_manifest() {
        let source = MapSource(HashMap::from([("list.json", Response::ok(&b"[]"[..]))]));
        let manifest = DocumentStore::load(&source, "list.json").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_fs_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/a.md"), "# A").unwrap();

        let source = FsSource::new(dir.path());
        let response = source.fetch("docs/a.md").unwrap();
        assert!(response.is_success());
        assert_eq!(response.body, b"# A");
        assert_eq!(source.fetch("./docs/a.md").unwrap().status, 200);
        assert_eq!(source.fetch("docs/missing.md").unwrap().status, 404);
        assert_eq!(source.fetch("docs").unwrap().status, 404);
    }

    #[test]
    fn test_fs_source_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(dir.path());
        assert_eq!(source.fetch("../etc/passwd").unwrap().status, 403);
        assert_eq!(source.fetch("docs/../../x.md").unwrap().status, 403);
        assert_eq!(source.fetch("/etc/passwd").unwrap().status, 403);
    }
}
