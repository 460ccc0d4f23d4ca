//! Table of contents built from a render's heading list.

use crate::parser::HeadingRecord;
use crate::sync::ActiveHeading;
use std::fmt::Write as _;

/// Text shown when a document has no headings.
pub const NO_HEADINGS: &str = "No headings";

/// Indent added per heading level beyond 1.
pub const DEFAULT_INDENT_STEP: u16 = 8;

/// One clickable outline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Link target, `#` followed by the heading id.
    pub href: String,
    pub text: String,
    pub level: u8,
    pub indent: u16,
    pub active: bool,
}

/// How the viewport moves when an entry is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Request to bring a heading's top edge to the top of the content area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub index: usize,
    pub id: String,
    pub behavior: ScrollBehavior,
}

/// The table of contents for the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toc {
    Placeholder(String),
    Outline(Vec<TocEntry>),
}

impl Default for Toc {
    fn default() -> Self {
        Toc::placeholder()
    }
}

impl Toc {
    pub fn placeholder() -> Self {
        Toc::Placeholder(NO_HEADINGS.to_string())
    }

    /// Build an outline with one entry per heading.
    ///
    /// Indentation follows the level alone; an h4 right after an h1 is
    /// simply indented three steps.
    pub fn build(headings: &[HeadingRecord], indent_step: u16) -> Self {
        if headings.is_empty() {
            return Toc::placeholder();
        }
        let entries = headings
            .iter()
            .map(|h| TocEntry {
                href: format!("#{}", h.id),
                text: h.text.clone(),
                level: h.level,
                indent: u16::from(h.level.saturating_sub(1)) * indent_step,
                active: false,
            })
            .collect();
        Toc::Outline(entries)
    }

    pub fn entries(&self) -> &[TocEntry] {
        match self {
            Toc::Outline(entries) => entries,
            Toc::Placeholder(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Index of the active entry, if any.
    pub fn active_index(&self) -> Option<usize> {
        self.entries().iter().position(|e| e.active)
    }

    /// Activate the entry for `active`, clearing every other entry.
    ///
    /// The entry must sit at the heading's index and link to its id; when
    /// nothing matches, no entry stays active.
    pub fn highlight(&mut self, active: &ActiveHeading) {
        let target = format!("#{}", active.id);
        if let Toc::Outline(entries) = self {
            for (i, entry) in entries.iter_mut().enumerate() {
                entry.active = i == active.index && entry.href == target;
            }
        }
    }

    /// Clear any active entry.
    pub fn clear_highlight(&mut self) {
        if let Toc::Outline(entries) = self {
            for entry in entries {
                entry.active = false;
            }
        }
    }

    /// Handle a click on entry `index`.
    pub fn click(&self, index: usize) -> Option<ScrollRequest> {
        let entry = self.entries().get(index)?;
        Some(ScrollRequest {
            index,
            id: entry.href.trim_start_matches('#').to_string(),
            behavior: ScrollBehavior::Smooth,
        })
    }

    /// Render as an HTML list (or the placeholder text).
    pub fn to_html(&self) -> String {
        match self {
            Toc::Placeholder(text) => text.clone(),
            Toc::Outline(entries) => {
                let mut out = String::from("<ul>\n");
                for entry in entries {
                    let class = if entry.active { " class=\"active\"" } else { "" };
                    let _ = writeln!(
                        out,
                        "  <li{} style=\"margin-left: {}px\"><a href=\"{}\">{}</a></li>",
                        class,
                        entry.indent,
                        entry.href,
                        escape_html(&entry.text)
                    );
                }
                out.push_str("</ul>");
                out
            }
        }
    }

    /// Render as indented plain text, one entry per line.
    pub fn to_plain(&self) -> String {
        match self {
            Toc::Placeholder(text) => text.clone(),
            Toc::Outline(entries) => entries
                .iter()
                .map(|e| format!("{}{}", "  ".repeat(usize::from(e.level.saturating_sub(1))), e.text))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str, level: u8, text: &str) -> HeadingRecord {
        HeadingRecord {
            id: id.to_string(),
            level,
            text: text.to_string(),
            offset: 0,
        }
    }

    #[test]
    fn test_empty_headings_give_placeholder() {
        let toc = Toc::build(&[], DEFAULT_INDENT_STEP);
        assert_eq!(toc, Toc::Placeholder("No headings".to_string()));
        assert!(toc.is_empty());
        assert_eq!(toc.to_html(), "No headings");
        assert_eq!(toc.click(0), None);
    }

    #[test]
    fn test_indent_follows_level() {
        let toc = Toc::build(
            &[heading("a", 1, "A"), heading("b", 4, "B"), heading("c", 2, "C")],
            DEFAULT_INDENT_STEP,
        );
        let indents: Vec<_> = toc.entries().iter().map(|e| e.indent).collect();
        assert_eq!(indents, [0, 24, 8]);
        assert_eq!(toc.entries()[1].href, "#b");
        assert_eq!(toc.active_index(), None);
    }

    #[test]
    fn test_highlight_marks_exactly_one() {
        let mut toc = Toc::build(
            &[heading("a", 1, "A"), heading("b", 2, "B")],
            DEFAULT_INDENT_STEP,
        );
        toc.highlight(&ActiveHeading::new(0, "a"));
        assert_eq!(toc.active_index(), Some(0));
        toc.highlight(&ActiveHeading::new(1, "b"));
        assert_eq!(toc.active_index(), Some(1));
        assert_eq!(toc.entries().iter().filter(|e| e.active).count(), 1);
        toc.clear_highlight();
        assert_eq!(toc.active_index(), None);
    }

    #[test]
    fn test_highlight_with_shared_ids() {
        let mut toc = Toc::build(
            &[heading("intro", 1, "Intro"), heading("intro", 1, "Intro")],
            DEFAULT_INDENT_STEP,
        );
        toc.highlight(&ActiveHeading::new(1, "intro"));
        assert_eq!(toc.entries().iter().filter(|e| e.active).count(), 1);
        assert_eq!(toc.active_index(), Some(1));
    }

    #[test]
    fn test_highlight_from_other_document_matches_nothing() {
        let mut toc = Toc::build(&[heading("new", 1, "New")], DEFAULT_INDENT_STEP);
        toc.highlight(&ActiveHeading::new(0, "old"));
        assert_eq!(toc.active_index(), None);
    }

    #[test]
    fn test_click_requests_smooth_scroll() {
        let toc = Toc::build(&[heading("setup", 2, "Setup")], DEFAULT_INDENT_STEP);
        let request = toc.click(0).unwrap();
        assert_eq!(request.id, "setup");
        assert_eq!(request.behavior, ScrollBehavior::Smooth);
        assert_eq!(toc.click(3), None);
    }

    #[test]
    fn test_to_html_and_plain() {
        let mut toc = Toc::build(
            &[heading("a", 1, "A & B"), heading("b", 2, "<B>")],
            DEFAULT_INDENT_STEP,
        );
        toc.highlight(&ActiveHeading::new(1, "b"));
        let html = toc.to_html();
        assert!(html.contains("<li style=\"margin-left: 0px\"><a href=\"#a\">A &amp; B</a></li>"));
        assert!(html.contains("<li class=\"active\" style=\"margin-left: 8px\"><a href=\"#b\">&lt;B&gt;</a></li>"));
        assert_eq!(toc.to_plain(), "A & B\n  <B>");
    }
}
