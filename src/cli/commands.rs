//! Non-interactive commands: `--list`, `--html` and `--toc`.

use super::{Cli, OutputFormat};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use docshelf::location::encode_token;
use docshelf::nav::{Controller, Dispatcher, Effect, Host, NO_DOCS, NavEvent, NavOptions};
use docshelf::parser::HeadingRecord;
use docshelf::store::{
    DocumentDescriptor, DocumentStore, FsSource, Manifest, ResourceSource, Response,
};
use docshelf::toc::Toc;
use docshelf::{Config, ViewerError};
use log::debug;
use std::fmt::Write;

/// A document taken through the same pipeline the viewer uses.
#[derive(Debug)]
pub struct Rendered {
    pub html: String,
    pub headings: Vec<HeadingRecord>,
    pub toc: Toc,
}

/// Collects what the controller would have put on screen.
struct Capture<'a> {
    source: &'a FsSource,
    rendered: Option<Rendered>,
    error: Option<String>,
}

impl Host for Capture<'_> {
    fn fetch(&mut self, path: &str) -> Result<Response, String> {
        self.source.fetch(path).map_err(|e| e.to_string())
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ShowDocument { html, headings, .. } => {
                self.rendered = Some(Rendered {
                    html,
                    headings,
                    toc: Toc::placeholder(),
                });
            }
            Effect::ShowToc(toc) => {
                if let Some(rendered) = self.rendered.as_mut() {
                    rendered.toc = toc;
                }
            }
            Effect::ShowError { message, .. } => self.error = Some(message),
            other => debug!("batch mode ignores {:?}", other),
        }
    }
}

/// Render one document from `source`.
pub fn render(source: &FsSource, path: &str, options: NavOptions) -> Result<Rendered> {
    let manifest = Manifest::new(vec![DocumentDescriptor::new(None, path)]);
    let controller = Controller::new(options, Some(encode_token(path)));
    let mut dispatcher = Dispatcher::new(controller);
    dispatcher.dispatch(NavEvent::ManifestLoaded(Some(manifest)));

    let mut capture = Capture {
        source,
        rendered: None,
        error: None,
    };
    dispatcher.run_until_idle(&mut capture);

    match (capture.rendered, capture.error) {
        (_, Some(message)) => Err(eyre!(message)),
        (Some(rendered), None) => Ok(rendered),
        (None, None) => Err(eyre!("{} was not rendered", path)),
    }
}

pub fn list_output(manifest: &Manifest, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Plain => manifest
            .documents()
            .iter()
            .map(|doc| format!("{}\t{}", doc.label(), doc.path))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(manifest.documents())?,
        OutputFormat::Html => {
            let mut out = String::from("<ul>\n");
            for doc in manifest.documents() {
                writeln!(
                    out,
                    "  <li><a href=\"{}\">{}</a></li>",
                    encode_token(&doc.path),
                    escape_text(doc.label())
                )?;
            }
            out.push_str("</ul>");
            out
        }
    };
    Ok(output)
}

pub fn toc_output(rendered: &Rendered, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Plain => rendered.toc.to_plain(),
        OutputFormat::Json => serde_json::to_string_pretty(&rendered.headings)?,
        OutputFormat::Html => rendered.toc.to_html(),
    };
    Ok(output)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Run whichever non-interactive mode `cli` asks for.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let source = FsSource::new(&cli.root);

    if cli.list {
        let manifest = DocumentStore::load(&source, &config.viewer.manifest)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                eprintln!("{}", NO_DOCS);
                ViewerError::ManifestUnavailable(config.viewer.manifest.clone())
            })?;
        println!("{}", list_output(&manifest, cli.output)?);
    } else if let Some(path) = &cli.html {
        println!("{}", render(&source, path, config.nav_options())?.html);
    } else if let Some(path) = &cli.toc {
        let rendered = render(&source, path, config.nav_options())?;
        println!("{}", toc_output(&rendered, cli.output)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root_with(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, body) in files {
            let file = dir.path().join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, body).unwrap();
        }
        dir
    }

    fn manifest() -> Manifest {
        Manifest::new(vec![
            DocumentDescriptor::new(Some("Guide & Tips"), "docs/guide.md"),
            DocumentDescriptor::new(None, "docs/faq.md"),
        ])
    }

    #[test]
    fn test_list_plain() {
        let output = list_output(&manifest(), OutputFormat::Plain).unwrap();
        assert_eq!(output, "Guide & Tips\tdocs/guide.md\ndocs/faq.md\tdocs/faq.md");
    }

    #[test]
    fn test_list_json() {
        let output = list_output(&manifest(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["title"], "Guide & Tips");
        assert_eq!(parsed[1]["path"], "docs/faq.md");
        assert!(parsed[1].get("title").is_none());
    }

    #[test]
    fn test_list_html_links_to_location_tokens() {
        let output = list_output(&manifest(), OutputFormat::Html).unwrap();
        assert!(output.contains("<a href=\"#docs%2Fguide.md\">Guide &amp; Tips</a>"));
    }

    #[test]
    fn test_render_document() {
        let dir = root_with(&[("docs/a.md", "# Title\n\nBody\n")]);
        let source = FsSource::new(dir.path());
        let rendered = render(&source, "docs/a.md", NavOptions::default()).unwrap();
        assert!(rendered.html.starts_with("<div class=\"markdown\">"));
        assert!(rendered.html.contains("<h1 id=\"title\">Title</h1>"));
        assert_eq!(rendered.headings.len(), 1);
    }

    #[test]
    fn test_render_missing_document() {
        let dir = root_with(&[]);
        let source = FsSource::new(dir.path());
        let err = render(&source, "docs/none.md", NavOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load docs/none.md (404)");
    }

    #[test]
    fn test_render_rejects_traversal() {
        let dir = root_with(&[]);
        let source = FsSource::new(dir.path());
        let err = render(&source, "../secret.md", NavOptions::default()).unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_toc_plain_indents_by_level() {
        let dir = root_with(&[("a.md", "# One\n## Two\n### Three\n## Four\n")]);
        let source = FsSource::new(dir.path());
        let rendered = render(&source, "a.md", NavOptions::default()).unwrap();
        let output = toc_output(&rendered, OutputFormat::Plain).unwrap();
        assert_eq!(output, "One\n  Two\n    Three\n  Four");
    }

    #[test]
    fn test_toc_json_lists_heading_records() {
        let dir = root_with(&[("a.md", "# One\n## Two\n")]);
        let source = FsSource::new(dir.path());
        let rendered = render(&source, "a.md", NavOptions::default()).unwrap();
        let output = toc_output(&rendered, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[1]["id"], "two");
        assert_eq!(parsed[1]["level"], 2);
        assert!(parsed[1].get("offset").is_none());
    }

    #[test]
    fn test_toc_placeholder_without_headings() {
        let dir = root_with(&[("a.md", "just text\n")]);
        let source = FsSource::new(dir.path());
        let rendered = render(&source, "a.md", NavOptions::default()).unwrap();
        assert_eq!(toc_output(&rendered, OutputFormat::Html).unwrap(), "No headings");
    }
}
