//! # docshelf
//!
//! A single-page markdown documentation viewer.
//!
//! A manifest lists the documents; the viewer shows them in a sidebar,
//! renders the selected one with anchored headings, builds a table of
//! contents from those headings and keeps the TOC entry of the heading in
//! view highlighted while the reader scrolls. The selected document is
//! remembered as a location fragment so a later run reopens it.
//!
//! ## Example
//!
//! ```rust
//! use docshelf::parser::{RenderOptions, render_markdown};
//! use docshelf::toc::Toc;
//!
//! let rendered = render_markdown("# Intro\n## Getting started", &RenderOptions::default());
//! assert_eq!(rendered.headings[1].id, "getting-started");
//!
//! let toc = Toc::build(&rendered.headings, 8);
//! assert_eq!(toc.entries()[1].indent, 8);
//! ```

/// Configuration file handling.
///
/// Theme, pane widths, manifest location, scroll-sync and logging settings.
pub mod config;

/// Error types shared by the library.
pub mod error;

/// Location fragments and where they are kept between runs.
pub mod location;

/// The navigation controller and its dispatcher.
pub mod nav;

/// Markdown rendering and heading slugs.
pub mod parser;

/// Manifest and document loading.
pub mod store;

/// Scroll synchronization between the content viewport and the TOC.
pub mod sync;

/// Table of contents built from a document's headings.
pub mod toc;

/// Interactive terminal viewer.
pub mod tui;

pub use config::Config;
pub use error::ViewerError;
pub use parser::{HeadingRecord, RenderedDocument, render_markdown};
pub use store::{DocumentDescriptor, Manifest};
pub use tui::App;
