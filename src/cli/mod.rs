pub mod commands;

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docshelf")]
#[command(version)]
#[command(about = "Browse a folder of markdown docs with a live table of contents")]
#[command(
    long_about = "docshelf - a single-page markdown documentation viewer.\n\n\
    Reads a manifest (docs/list.json by default) listing markdown documents,\n\
    shows them in a sidebar, renders the selected one and keeps a table of\n\
    contents in sync with the scroll position.\n\n\
    Examples:\n  \
    docshelf                         # Browse ./docs interactively\n  \
    docshelf ~/project --list        # List the documents in the manifest\n  \
    docshelf --toc docs/guide.md     # Print the outline of a document\n  \
    docshelf --html docs/guide.md    # Print the rendered HTML"
)]
#[command(group(ArgGroup::new("start").args(["doc", "location"])))]
#[command(group(ArgGroup::new("mode").args(["list", "html", "toc"])))]
pub struct Cli {
    /// Directory that manifest and document paths are relative to
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Manifest path relative to ROOT (overrides the config file)
    #[arg(long = "manifest", value_name = "PATH")]
    pub manifest: Option<String>,

    /// Open this document first instead of the remembered one
    #[arg(long = "doc", value_name = "PATH")]
    pub doc: Option<String>,

    /// Start from a location fragment such as '#docs%2Fguide.md'
    #[arg(long = "location", value_name = "FRAGMENT")]
    pub location: Option<String>,

    /// List the documents in the manifest (non-interactive)
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Print the rendered HTML of a document (non-interactive)
    #[arg(long = "html", value_name = "PATH")]
    pub html: Option<String>,

    /// Print the table of contents of a document (non-interactive)
    #[arg(long = "toc", value_name = "PATH")]
    pub toc: Option<String>,

    /// Output format for --list and --toc
    ///
    ///   plain - Human-readable text (default)
    ///   json  - JSON for scripting
    ///   html  - HTML list
    #[arg(short = 'o', long = "output", default_value = "plain")]
    pub output: OutputFormat,

    /// Theme for the interactive viewer (OceanDark, Nord, Gruvbox)
    #[arg(long = "theme", value_name = "THEME")]
    pub theme: Option<String>,

    /// Give repeated headings distinct anchors (intro, intro-1, ...)
    #[arg(long = "unique-slugs")]
    pub unique_slugs: bool,

    /// Do not reload the document when it changes on disk
    #[arg(long = "no-watch")]
    pub no_watch: bool,
}

impl Cli {
    /// Whether any non-interactive mode was requested.
    pub fn is_batch(&self) -> bool {
        self.list || self.html.is_some() || self.toc.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
    Html,
}
