//! Inputs and outputs of the navigation state machine.

use crate::parser::HeadingRecord;
use crate::store::Response;
use crate::toc::Toc;

/// Identifies one document fetch. Later requests have larger ids.
pub type RequestId = u64;

/// Something that happened to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// The manifest load finished; `None` when it was unavailable.
    ManifestLoaded(Option<crate::store::Manifest>),
    /// A sidebar entry was chosen, by the user or by initial resolution.
    Select(String),
    /// A document fetch completed.
    DocumentFetched {
        request: RequestId,
        path: String,
        result: Result<Response, String>,
    },
    /// The current document changed on disk.
    Reload,
}

/// A sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub label: String,
    pub path: String,
}

/// Work the host performs on behalf of the controller, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the sidebar with these entries.
    ShowSidebar(Vec<SidebarEntry>),
    /// Replace the sidebar with a message.
    ShowNoDocs(String),
    /// Mark the entry for this path active and every other entry inactive.
    MarkActive(String),
    /// Replace (never push) the location fragment.
    ReplaceLocation(String),
    /// Show a loading message for this path in the content area.
    ShowLoading(String),
    /// Release the scroll-sync watch.
    TeardownObserver,
    /// Fetch a document; the host answers with [`NavEvent::DocumentFetched`].
    Fetch { request: RequestId, path: String },
    /// Put a rendered document into the content area.
    ShowDocument {
        path: String,
        html: String,
        source: String,
        headings: Vec<HeadingRecord>,
    },
    /// Replace the table of contents.
    ShowToc(Toc),
    /// Watch these anchors (heading ids in document order).
    InstallObserver(Vec<String>),
    /// Show an inline error in the content area.
    ShowError { path: String, message: String },
    /// Run this event after the current effects have been applied.
    Defer(NavEvent),
}
