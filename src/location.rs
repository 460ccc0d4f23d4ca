//! The persisted location token.
//!
//! The selected document is remembered as a fragment (`#docs%2Fguide.md`),
//! the same shape a browser address would carry. Updates always replace the
//! current entry; nothing here ever grows a navigation history.

use crate::error::LocationError;
use log::warn;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Characters escaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a document path as a location fragment, including the `#`.
pub fn encode_token(path: &str) -> String {
    format!("#{}", utf8_percent_encode(path, COMPONENT))
}

/// Decode a location fragment back into a document path.
///
/// Accepts the fragment with or without its leading `#`. Empty fragments and
/// fragments that do not decode to UTF-8 yield `None`.
pub fn decode_token(fragment: &str) -> Option<String> {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    if raw.is_empty() {
        return None;
    }
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|path| path.into_owned())
}

/// Storage for the location fragment.
pub trait LocationStore {
    /// The current fragment, including its `#`.
    fn fragment(&self) -> Option<String>;

    /// Replace the current fragment without creating a history entry.
    fn replace(&mut self, fragment: &str) -> Result<(), LocationError>;

    /// Number of navigable history entries.
    fn history_len(&self) -> usize;
}

/// Location kept in memory only.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    fragment: Option<String>,
    history: Vec<Option<String>>,
}

impl MemoryLocation {
    pub fn new(fragment: Option<&str>) -> Self {
        let fragment = fragment.map(str::to_string);
        Self {
            history: vec![fragment.clone()],
            fragment,
        }
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LocationStore for MemoryLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn replace(&mut self, fragment: &str) -> Result<(), LocationError> {
        self.fragment = Some(fragment.to_string());
        if let Some(current) = self.history.last_mut() {
            *current = self.fragment.clone();
        }
        Ok(())
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    roots: BTreeMap<String, String>,
}

/// Location persisted across runs, one fragment per documentation root.
#[derive(Debug)]
pub struct SessionLocation {
    file: PathBuf,
    root_key: String,
    fragment: Option<String>,
}

impl SessionLocation {
    /// Default session file (`<state dir>/docshelf/location.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("docshelf").join("location.toml"))
    }

    /// Open the session for `root` using the default session file.
    pub fn open(root: &Path) -> Result<Self, LocationError> {
        let file = Self::default_path().ok_or(LocationError::NoStateDir)?;
        Self::at(file, root)
    }

    /// Open the session for `root` stored in `file`.
    ///
    /// A file that cannot be decoded counts as empty and is rewritten on the
    /// next [`LocationStore::replace`].
    pub fn at(file: PathBuf, root: &Path) -> Result<Self, LocationError> {
        let root_key = root
            .canonicalize()
            .unwrap_or_else(|_| root.to_path_buf())
            .display()
            .to_string();
        let session = match read_session(&file) {
            Err(LocationError::Decode(e)) => {
                warn!("ignoring unreadable session file {}: {}", file.display(), e);
                SessionFile::default()
            }
            other => other?,
        };
        let fragment = session.roots.get(&root_key).cloned();
        Ok(Self {
            file,
            root_key,
            fragment,
        })
    }

    /// Use `fragment` for this run instead of the stored value.
    pub fn override_fragment(&mut self, fragment: String) {
        self.fragment = Some(fragment);
    }
}

fn read_session(file: &Path) -> Result<SessionFile, LocationError> {
    match fs::read_to_string(file) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionFile::default()),
        Err(e) => Err(e.into()),
    }
}

impl LocationStore for SessionLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn replace(&mut self, fragment: &str) -> Result<(), LocationError> {
        let mut session = read_session(&self.file).unwrap_or_default();
        session
            .roots
            .insert(self.root_key.clone(), fragment.to_string());

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.file, toml::to_string_pretty(&session)?)?;

        self.fragment = Some(fragment.to_string());
        Ok(())
    }

    fn history_len(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_token() {
        assert_eq!(encode_token("docs/guide.md"), "#docs%2Fguide.md");
        assert_eq!(encode_token("docs/a b(1).md"), "#docs%2Fa%20b(1).md");
        assert_eq!(encode_token("ü.md"), "#%C3%BC.md");
    }

    #[test]
    fn test_decode_token() {
        assert_eq!(decode_token("#docs%2Fguide.md").as_deref(), Some("docs/guide.md"));
        assert_eq!(decode_token("docs%2Fguide.md").as_deref(), Some("docs/guide.md"));
        assert_eq!(decode_token("#"), None);
        assert_eq!(decode_token(""), None);
        assert_eq!(decode_token("#%FF"), None);
    }

    #[test]
    fn test_token_round_trip_for_odd_paths() {
        for path in ["docs/a b.md", "notes/#1.md", "x/100%.md", "ü/ß.md"] {
            assert_eq!(decode_token(&encode_token(path)).as_deref(), Some(path));
        }
    }

    #[test]
    fn test_memory_replace_keeps_history_length() {
        let mut location = MemoryLocation::default();
        location.replace("#a.md").unwrap();
        location.replace("#b.md").unwrap();
        assert_eq!(location.fragment().as_deref(), Some("#b.md"));
        assert_eq!(location.history_len(), 1);
    }

    #[test]
    fn test_session_location_persists_per_root() {
        let state = tempfile::tempdir().unwrap();
        let file = state.path().join("nested").join("location.toml");
        let root_a = tempfile::tempdir().unwrap();
        let root_b = tempfile::tempdir().unwrap();

        let mut a = SessionLocation::at(file.clone(), root_a.path()).unwrap();
        assert_eq!(a.fragment(), None);
        a.replace("#docs%2Fa.md").unwrap();

        let mut b = SessionLocation::at(file.clone(), root_b.path()).unwrap();
        b.replace("#docs%2Fb.md").unwrap();

        let reopened = SessionLocation::at(file.clone(), root_a.path()).unwrap();
        assert_eq!(reopened.fragment().as_deref(), Some("#docs%2Fa.md"));
        let reopened = SessionLocation::at(file, root_b.path()).unwrap();
        assert_eq!(reopened.fragment().as_deref(), Some("#docs%2Fb.md"));
        assert_eq!(reopened.history_len(), 1);
    }

    #[test]
    fn test_session_location_repairs_malformed_file() {
        let state = tempfile::tempdir().unwrap();
        let file = state.path().join("location.toml");
        fs::write(&file, "roots = 5").unwrap();
        let root = tempfile::tempdir().unwrap();

        let mut session = SessionLocation::at(file.clone(), root.path()).unwrap();
        assert_eq!(session.fragment(), None);
        session.replace("#docs%2Fa.md").unwrap();

        let reopened = SessionLocation::at(file.clone(), root.path()).unwrap();
        assert_eq!(reopened.fragment().as_deref(), Some("#docs%2Fa.md"));
        assert!(toml::from_str::<SessionFile>(&fs::read_to_string(file).unwrap()).is_ok());
    }
}
