//! Markdown rendering with anchored headings.
//!
//! Parsing and HTML serialization are delegated to `pulldown-cmark`. Heading
//! events are intercepted so that every heading gets an `id` attribute and a
//! matching [`HeadingRecord`] is collected in document order.

pub mod layout;
pub mod slug;

pub use layout::{DocumentLayout, SpanKind, StyledLine, StyledSpan, layout_document};
pub use slug::{SlugRegistry, slugify};

use crate::error::RenderError;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};

/// A heading found while rendering a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// Anchor id (slug). Not guaranteed unique unless slug
    /// disambiguation is enabled.
    pub id: String,
    /// Heading level, 1-6.
    pub level: u8,
    /// Plain heading text.
    pub text: String,
    /// Byte offset of the heading in the markdown source.
    #[serde(skip)]
    pub offset: usize,
}

/// Options for [`render_markdown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Suffix repeated slugs (`intro`, `intro-1`) instead of sharing the anchor.
    pub unique_slugs: bool,
}

/// Output of one render: the HTML and its headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    pub headings: Vec<HeadingRecord>,
}

/// Decode a fetched document body.
///
/// A leading byte-order mark is dropped.
pub fn decode_document(body: Vec<u8>) -> Result<String, RenderError> {
    let mut text = String::from_utf8(body).map_err(|e| RenderError::InvalidUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;
    if text.starts_with('\u{feff}') {
        text.remove(0);
    }
    Ok(text)
}

/// Wrap rendered HTML the way the content area displays it.
pub fn wrap_article(html: &str) -> String {
    format!("<div class=\"markdown\">{}</div>", html)
}

fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// A heading whose inline events are still being collected.
struct OpenHeading<'a> {
    level: u8,
    offset: usize,
    raw: String,
    inner: Vec<Event<'a>>,
}

/// Render markdown to HTML, collecting headings.
///
/// Each heading is emitted as `<hN id="slug">…</hN>`. The slug comes from
/// the heading's raw text; when that is empty (a heading made only of
/// inline HTML, say) the rendered text is used instead.
pub fn render_markdown(markdown: &str, options: &RenderOptions) -> RenderedDocument {
    let mut headings = Vec::new();
    let mut registry = options.unique_slugs.then(SlugRegistry::new);
    let mut events: Vec<Event> = Vec::new();
    let mut open: Option<OpenHeading> = None;

    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                open = Some(OpenHeading {
                    level: level as u8,
                    offset: range.start,
                    raw: String::new(),
                    inner: Vec::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some(heading) = open.take() else {
                    continue;
                };
                let (markup, record) = finish_heading(heading, registry.as_mut());
                headings.push(record);
                events.push(Event::Html(CowStr::from(markup)));
            }
            other => match open.as_mut() {
                Some(heading) => {
                    match other {
                        Event::Text(ref t) | Event::Code(ref t) => heading.raw.push_str(t),
                        Event::SoftBreak | Event::HardBreak => heading.raw.push(' '),
                        _ => {}
                    }
                    heading.inner.push(other);
                }
                None => events.push(other),
            },
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    RenderedDocument {
        html: out,
        headings,
    }
}

fn finish_heading(
    heading: OpenHeading<'_>,
    registry: Option<&mut SlugRegistry>,
) -> (String, HeadingRecord) {
    let mut inner_html = String::new();
    html::push_html(&mut inner_html, heading.inner.into_iter());

    let text = if heading.raw.trim().is_empty() {
        strip_tags(&inner_html)
    } else {
        heading.raw
    };
    let text = text.trim().to_string();

    let slug = slugify(&text);
    let id = match registry {
        Some(registry) => registry.claim(slug),
        None => slug,
    };

    let markup = format!(
        "<h{level} id=\"{id}\">{inner}</h{level}>\n",
        level = heading.level,
        id = id,
        inner = inner_html
    );

    let record = HeadingRecord {
        id,
        level: heading.level,
        text,
        offset: heading.offset,
    };
    (markup, record)
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_collects_headings_in_order() {
        let md = r#"# Title
Some content

## Section 1
More content

### Subsection
Details

## Section 2
End"#;

        let doc = render_markdown(md, &RenderOptions::default());
        assert_eq!(doc.headings.len(), 4);
        let ids: Vec<_> = doc.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["title", "section-1", "subsection", "section-2"]);
        let levels: Vec<_> = doc.headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, [1, 2, 3, 2]);

        // The HTML carries the same ids in the same order
        let mut cursor = 0;
        for heading in &doc.headings {
            let needle = format!("<h{} id=\"{}\">", heading.level, heading.id);
            let at = doc.html[cursor..]
                .find(&needle)
                .unwrap_or_else(|| panic!("missing {}", needle));
            cursor += at + needle.len();
        }
        assert_eq!(doc.html.matches(" id=\"").count(), 4);
    }

    #[test]
    fn test_heading_text_strips_inline_markup() {
        let md = "## **Bold** and `code` heading";
        let doc = render_markdown(md, &RenderOptions::default());
        assert_eq!(doc.headings[0].text, "Bold and code heading");
        assert_eq!(doc.headings[0].id, "bold-and-code-heading");
        assert!(doc.html.contains("<strong>Bold</strong>"));
        assert!(doc.html.contains("<code>code</code>"));
    }

    #[test]
    fn test_heading_with_inline_html() {
        let md = "# <span>Inline Html</span>";
        let doc = render_markdown(md, &RenderOptions::default());
        assert_eq!(doc.headings[0].text, "Inline Html");
        assert_eq!(doc.headings[0].id, "inline-html");
    }

    #[test]
    fn test_setext_multiline_heading() {
        let doc = render_markdown("Getting\nStarted\n=======\n", &RenderOptions::default());
        assert_eq!(doc.headings[0].id, "getting-started");
        assert_eq!(doc.headings[0].text, "Getting Started");
        assert_eq!(doc.headings[0].level, 1);
        assert!(doc.html.starts_with("<h1 id=\"getting-started\">Getting"));
    }

    #[test]
    fn test_colliding_slugs_share_anchor_by_default() {
        let md = "# Intro\n\n# Intro\n";
        let doc = render_markdown(md, &RenderOptions::default());
        assert_eq!(doc.headings[0].id, "intro");
        assert_eq!(doc.headings[1].id, "intro");
    }

    #[test]
    fn test_unique_slugs_option() {
        let md = "# Intro\n\n# Intro\n";
        let doc = render_markdown(md, &RenderOptions { unique_slugs: true });
        assert_eq!(doc.headings[0].id, "intro");
        assert_eq!(doc.headings[1].id, "intro-1");
        assert!(doc.html.contains("<h1 id=\"intro-1\">"));
    }

    #[test]
    fn test_no_state_between_calls() {
        let opts = RenderOptions { unique_slugs: true };
        let first = render_markdown("# A\n", &opts);
        let second = render_markdown("# A\n", &opts);
        assert_eq!(first.headings, second.headings);
        assert_eq!(second.headings[0].id, "a");
    }

    #[test]
    fn test_headings_in_code_blocks_are_ignored() {
        let md = "# Real\n\n```\n# not a heading\n```\n";
        let doc = render_markdown(md, &RenderOptions::default());
        assert_eq!(doc.headings.len(), 1);
        assert!(doc.html.contains("# not a heading"));
    }

    #[test]
    fn test_heading_offsets() {
        let md = "# First\nContent here\n\n## Second\nMore content";
        let doc = render_markdown(md, &RenderOptions::default());
        assert_eq!(doc.headings[0].offset, 0);
        assert_eq!(Some(doc.headings[1].offset), md.find("## Second"));
    }

    #[test]
    fn test_decode_document() {
        assert_eq!(decode_document(b"# Hi".to_vec()).unwrap(), "# Hi");
        assert_eq!(
            decode_document("\u{feff}# Hi".as_bytes().to_vec()).unwrap(),
            "# Hi"
        );
        assert_eq!(
            decode_document(vec![b'a', 0xff, b'b']),
            Err(RenderError::InvalidUtf8 { valid_up_to: 1 })
        );
    }

    #[test]
    fn test_wrap_article() {
        assert_eq!(wrap_article("<p>x</p>"), "<div class=\"markdown\"><p>x</p></div>");
    }
}
