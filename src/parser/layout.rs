//! Terminal layout of a rendered document.
//!
//! Walks the same `pulldown-cmark` event stream as
//! [`render_markdown`](super::render_markdown) and produces styled lines
//! wrapped to a column width. Heading `n` of a layout is heading `n` of the
//! render, so the row of each heading serves as its anchor position.

use super::parser_options;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

/// Longest horizontal rule drawn.
const RULE_WIDTH: usize = 40;

/// Narrowest text column used when list and quote prefixes eat the width.
const MIN_TEXT_WIDTH: usize = 8;

/// How a span of text is displayed. Colors come from the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Text,
    Strong,
    Emphasis,
    Strikethrough,
    Code,
    Link,
    Heading(u8),
    CodeBlock,
    /// List bullets, quote bars, table separators and rules
    Marker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub kind: SpanKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
}

impl StyledLine {
    fn push(&mut self, text: &str, kind: SpanKind) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(text),
            _ => self.spans.push(StyledSpan {
                text: text.to_string(),
                kind,
            }),
        }
    }

    /// Plain text of the line.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.width()).sum()
    }
}

/// Lines of a document plus the row each heading lands on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLayout {
    pub lines: Vec<StyledLine>,
    /// Row of each heading, in document order
    pub heading_lines: Vec<usize>,
}

/// Lay out `markdown` for a pane `width` columns wide. A width of 0 turns
/// wrapping off. Code blocks are never wrapped.
pub fn layout_document(markdown: &str, width: usize) -> DocumentLayout {
    let width = if width == 0 { usize::MAX } else { width };
    let mut builder = Builder::new(width);
    for event in Parser::new_ext(markdown, parser_options()) {
        builder.event(event);
    }
    builder.flush();
    DocumentLayout {
        lines: builder.lines,
        heading_lines: builder.heading_lines,
    }
}

struct Builder {
    width: usize,
    lines: Vec<StyledLine>,
    heading_lines: Vec<usize>,

    /// Inline text of the block being collected
    pending: Vec<StyledSpan>,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    link: usize,
    heading: Option<u8>,
    code_block: bool,
    quote_depth: usize,

    /// Next number of each open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
    /// Marker width of each open list item
    items: Vec<usize>,
    /// Marker still to be printed on the item's first line
    item_marker: Option<String>,
    table_cell: usize,
}

impl Builder {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            heading_lines: Vec::new(),
            pending: Vec::new(),
            strong: 0,
            emphasis: 0,
            strikethrough: 0,
            link: 0,
            heading: None,
            code_block: false,
            quote_depth: 0,
            lists: Vec::new(),
            items: Vec::new(),
            item_marker: None,
            table_cell: 0,
        }
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.code_block {
                    self.code_text(&text);
                } else {
                    let kind = self.inline_kind();
                    self.inline(&text, kind);
                }
            }
            Event::Code(code) => {
                let kind = match self.heading {
                    Some(level) => SpanKind::Heading(level),
                    None => SpanKind::Code,
                };
                self.inline(&code, kind);
            }
            Event::SoftBreak => {
                let kind = self.inline_kind();
                self.inline(" ", kind);
            }
            Event::HardBreak => self.inline("\n", SpanKind::Text),
            Event::Rule => {
                self.flush();
                self.separate();
                let rule = "─".repeat(self.width.min(RULE_WIDTH));
                let mut line = self.prefix(false);
                line.push(&rule, SpanKind::Marker);
                self.lines.push(line);
            }
            Event::TaskListMarker(checked) => {
                self.inline(if checked { "[x] " } else { "[ ] " }, SpanKind::Marker)
            }
            Event::FootnoteReference(label) => {
                self.inline(&format!("[^{}]", label), SpanKind::Link)
            }
            // Raw HTML has no terminal rendering; its text content still
            // arrives as text events
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush();
                if self.items.is_empty() {
                    self.separate();
                }
            }
            Tag::Heading { level, .. } => {
                self.flush();
                self.separate();
                self.heading = Some(level as u8);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                if self.items.is_empty() {
                    self.separate();
                }
                self.code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                if self.lists.is_empty() {
                    self.separate();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.items.push(marker.width());
                self.item_marker = Some(marker);
            }
            Tag::FootnoteDefinition(label) => {
                self.flush();
                self.separate();
                self.inline(&format!("[^{}]: ", label), SpanKind::Marker);
            }
            Tag::Table(_) => {
                self.flush();
                self.separate();
            }
            Tag::TableHead | Tag::TableRow => {
                self.flush();
                self.table_cell = 0;
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.inline(" │ ", SpanKind::Marker);
                }
                self.table_cell += 1;
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { .. } => self.link += 1,
            Tag::Image { .. } => self.inline("[image: ", SpanKind::Marker),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::TableHead | TagEnd::TableRow => self.flush(),
            TagEnd::Heading(_) => {
                let row = self.lines.len();
                self.heading_lines.push(row);
                self.flush();
                self.heading = None;
                // An empty heading still takes a row so indices line up
                if self.lines.len() == row {
                    self.lines.push(StyledLine::default());
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => self.code_block = false,
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Item => {
                self.flush();
                if self.item_marker.is_some() {
                    let line = self.prefix(true);
                    self.lines.push(line);
                }
                self.items.pop();
            }
            TagEnd::FootnoteDefinition => self.flush(),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => self.link = self.link.saturating_sub(1),
            TagEnd::Image => self.inline("]", SpanKind::Marker),
            _ => {}
        }
    }

    fn inline_kind(&self) -> SpanKind {
        if let Some(level) = self.heading {
            SpanKind::Heading(level)
        } else if self.link > 0 {
            SpanKind::Link
        } else if self.strong > 0 {
            SpanKind::Strong
        } else if self.emphasis > 0 {
            SpanKind::Emphasis
        } else if self.strikethrough > 0 {
            SpanKind::Strikethrough
        } else {
            SpanKind::Text
        }
    }

    fn inline(&mut self, text: &str, kind: SpanKind) {
        self.pending.push(StyledSpan {
            text: text.to_string(),
            kind,
        });
    }

    fn code_text(&mut self, text: &str) {
        for source_line in text.lines() {
            let mut line = self.prefix(true);
            line.push(source_line, SpanKind::CodeBlock);
            self.lines.push(line);
        }
    }

    /// Blank row between top-level blocks.
    fn separate(&mut self) {
        if self.lines.last().is_some_and(|l| l.spans.is_empty()) || self.lines.is_empty() {
            return;
        }
        self.lines.push(StyledLine::default());
    }

    /// Quote bars and list indentation for the next row. `first` prints a
    /// pending list marker.
    fn prefix(&mut self, first: bool) -> StyledLine {
        let mut line = StyledLine::default();
        line.push(&"│ ".repeat(self.quote_depth), SpanKind::Marker);

        let Some((&own, outer)) = self.items.split_last() else {
            return line;
        };
        line.push(&" ".repeat(outer.iter().sum()), SpanKind::Text);
        let marker = if first { self.item_marker.take() } else { None };
        match marker {
            Some(marker) => line.push(&marker, SpanKind::Marker),
            None => line.push(&" ".repeat(own), SpanKind::Text),
        }
        line
    }

    /// Word-wrap the pending inline text into rows.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.pending);

        let mut line = self.prefix(true);
        let indent = self.prefix(false);
        let limit = self.width.max(indent.width() + MIN_TEXT_WIDTH);
        let mut used = line.width();
        let mut at_start = true;
        let mut space: Option<SpanKind> = None;

        for span in spans {
            if span.text == "\n" {
                self.lines.push(std::mem::replace(&mut line, indent.clone()));
                used = indent.width();
                at_start = true;
                space = None;
                continue;
            }
            for word in split_words(&span.text) {
                if word.starts_with(char::is_whitespace) {
                    if !at_start {
                        space = Some(span.kind);
                    }
                    continue;
                }
                let gap = usize::from(space.is_some());
                let word_width = word.width();
                if !at_start && used + gap + word_width > limit {
                    self.lines.push(std::mem::replace(&mut line, indent.clone()));
                    used = indent.width();
                    at_start = true;
                    space = None;
                }
                if let Some(kind) = space.take() {
                    line.push(" ", kind);
                    used += 1;
                }
                line.push(word, span.kind);
                used += word_width;
                at_start = false;
            }
        }
        self.lines.push(line);
    }
}

/// Split text into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let blank = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != blank)
            .map_or(rest.len(), |(i, _)| i);
        let (word, tail) = rest.split_at(end);
        rest = tail;
        Some(word)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RenderOptions, render_markdown};

    fn texts(layout: &DocumentLayout) -> Vec<String> {
        layout.lines.iter().map(StyledLine::text).collect()
    }

    #[test]
    fn test_blocks_are_separated_by_blank_rows() {
        let layout = layout_document("# Title\n\nFirst para\nsame para\n\n## Next\n\nEnd", 0);
        assert_eq!(
            texts(&layout),
            ["Title", "", "First para same para", "", "Next", "", "End"]
        );
        assert_eq!(layout.heading_lines, [0, 4]);
    }

    #[test]
    fn test_heading_rows_match_rendered_headings() {
        let md = "# A\n\ntext\n\n```\n# not a heading\n```\n\nSetext\nHeading\n---\n\n### C";
        let layout = layout_document(md, 0);
        let rendered = render_markdown(md, &RenderOptions::default());
        assert_eq!(layout.heading_lines.len(), rendered.headings.len());
        let rows: Vec<String> = layout
            .heading_lines
            .iter()
            .map(|&i| layout.lines[i].text())
            .collect();
        let headings: Vec<&str> = rendered.headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(rows, headings);
    }

    #[test]
    fn test_inline_styles() {
        let layout = layout_document("Plain **bold** *em* `code` [link](x)", 0);
        let kinds: Vec<(String, SpanKind)> = layout.lines[0]
            .spans
            .iter()
            .map(|s| (s.text.clone(), s.kind))
            .collect();
        assert_eq!(
            kinds,
            [
                ("Plain ".to_string(), SpanKind::Text),
                ("bold".to_string(), SpanKind::Strong),
                (" ".to_string(), SpanKind::Text),
                ("em".to_string(), SpanKind::Emphasis),
                (" ".to_string(), SpanKind::Text),
                ("code".to_string(), SpanKind::Code),
                (" ".to_string(), SpanKind::Text),
                ("link".to_string(), SpanKind::Link),
            ]
        );
    }

    #[test]
    fn test_heading_spans_use_heading_kind() {
        let layout = layout_document("## With `code`", 0);
        assert!(
            layout.lines[0]
                .spans
                .iter()
                .all(|s| s.kind == SpanKind::Heading(2))
        );
    }

    #[test]
    fn test_wraps_to_width() {
        let layout = layout_document("one two three four five six", 10);
        assert_eq!(texts(&layout), ["one two", "three four", "five six"]);
        assert!(layout.lines.iter().all(|l| l.width() <= 10));
    }

    #[test]
    fn test_wrapping_moves_later_headings_down() {
        let md = "intro words that wrap\n\n# Heading";
        assert_eq!(layout_document(md, 0).heading_lines, [2]);
        assert_eq!(layout_document(md, 10).heading_lines, [4]);
    }

    #[test]
    fn test_lists_and_continuation_indent() {
        let layout = layout_document("- alpha beta gamma\n- b\n  1. one\n  2. two\n", 12);
        assert_eq!(
            texts(&layout),
            ["• alpha beta", "  gamma", "• b", "  1. one", "  2. two"]
        );
    }

    #[test]
    fn test_code_block_keeps_lines() {
        let layout = layout_document("```rust\nfn main() {\n    let x = 1;\n}\n```", 8);
        assert_eq!(texts(&layout), ["fn main() {", "    let x = 1;", "}"]);
        assert!(
            layout
                .lines
                .iter()
                .all(|l| l.spans.iter().all(|s| s.kind == SpanKind::CodeBlock))
        );
    }

    #[test]
    fn test_quote_and_rule() {
        let layout = layout_document("> quoted\n\n---\n\nafter", 0);
        assert_eq!(layout.lines[0].text(), "│ quoted");
        assert!(layout.lines[2].text().starts_with("───"));
        assert_eq!(layout.lines[4].text(), "after");
    }

    #[test]
    fn test_hard_break_starts_new_row() {
        let layout = layout_document("first  \nsecond", 0);
        assert_eq!(texts(&layout), ["first", "second"]);
    }

    #[test]
    fn test_table_rows() {
        let layout = layout_document("| a | b |\n|---|---|\n| 1 | 2 |", 0);
        assert_eq!(texts(&layout), ["a │ b", "1 │ 2"]);
    }

    #[test]
    fn test_split_words() {
        let words: Vec<&str> = split_words("a  bc d").collect();
        assert_eq!(words, ["a", "  ", "bc", " ", "d"]);
    }
}
