mod layout;

use layout::{DynamicLayout, Section};

use crate::nav::LOADING;
use crate::toc::Toc;
use crate::tui::action::Action;
use crate::tui::app::{App, Content, Focus};
use ratatui::Frame;
use ratatui::layout::{Constraint, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    Wrap,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Below this width the TOC pane is hidden.
const MIN_WIDTH_FOR_TOC: u16 = 80;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let frame_layout = DynamicLayout::vertical(area)
        .section(Section::Title, Constraint::Length(2))
        .section(Section::Body, Constraint::Min(0))
        .section(Section::Status, Constraint::Length(1))
        .build();

    let ui = &app.config.ui;
    let panes = DynamicLayout::horizontal(frame_layout.area(Section::Body))
        .section(Section::Sidebar, Constraint::Percentage(ui.sidebar_width))
        .section(Section::Content, Constraint::Min(20))
        .section_if(
            area.width >= MIN_WIDTH_FOR_TOC,
            Section::Toc,
            Constraint::Percentage(ui.toc_width),
        )
        .build();

    let content_area = panes.area(Section::Content);
    // The scrollbar is drawn over the right border
    app.view.resize(
        content_area.width.saturating_sub(2),
        content_area.height.saturating_sub(2),
    );

    render_title_bar(frame, app, frame_layout.area(Section::Title));
    render_sidebar(frame, app, panes.area(Section::Sidebar));
    render_content(frame, app, content_area);
    if let Some(toc_area) = panes.get(Section::Toc) {
        render_toc(frame, app, toc_area);
    }
    render_status_bar(frame, app, frame_layout.area(Section::Status));
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let document = app.selected_document().unwrap_or("no document");
    let title_text = format!("docshelf - {} - {}", app.root_label, document);

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title_bar_fg)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(app.focus == Focus::Sidebar))
        .title(" Docs ");

    if let Some(message) = &app.view.sidebar_message {
        let paragraph = Paragraph::new(message.as_str())
            .style(Style::default().fg(theme.muted))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Room for the borders and the highlight symbol
    let label_width = usize::from(area.width.saturating_sub(4));
    let active = app.view.active_path.as_deref();
    let items: Vec<ListItem> = app
        .view
        .sidebar
        .iter()
        .map(|entry| {
            let label = truncate(&entry.label, label_width);
            let style = if active == Some(entry.path.as_str()) {
                theme.active_style()
            } else {
                theme.content_style()
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selection_style())
        .highlight_symbol("► ");
    frame.render_stateful_widget(list, area, &mut app.view.sidebar_state);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let view = &app.view;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(app.focus == Focus::Content));

    match &view.content {
        Content::Empty => frame.render_widget(block, area),
        Content::Loading(path) => {
            let paragraph = Paragraph::new(LOADING)
                .style(Style::default().fg(theme.muted))
                .block(block.title(format!(" {} ", path)));
            frame.render_widget(paragraph, area);
        }
        Content::Error { path, message } => {
            let paragraph = Paragraph::new(message.as_str())
                .style(theme.error_style())
                .wrap(Wrap { trim: true })
                .block(block.title(format!(" {} ", path)));
            frame.render_widget(paragraph, area);
        }
        Content::Document { path, layout, .. } => {
            let text: Text = layout
                .lines
                .iter()
                .map(|line| {
                    line.spans
                        .iter()
                        .map(|span| Span::styled(span.text.as_str(), theme.span_style(span.kind)))
                        .collect::<Line>()
                })
                .collect();

            let paragraph = Paragraph::new(text)
                .block(block.title(format!(" {} ", path)))
                .scroll((view.content_scroll, 0));
            frame.render_widget(paragraph, area);

            let mut scroll_state = ScrollbarState::new(usize::from(view.max_scroll()))
                .position(usize::from(view.content_scroll));
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .style(Style::default().fg(theme.muted));
            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scroll_state,
            );
        }
    }
}

fn render_toc(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(app.focus == Focus::Toc))
        .title(" Contents ");

    let entries = match &app.view.toc {
        Toc::Placeholder(text) => {
            let paragraph = Paragraph::new(text.as_str())
                .style(Style::default().fg(theme.muted))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
        Toc::Outline(entries) => entries,
    };

    let label_width = usize::from(area.width.saturating_sub(4));
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
            let label = truncate(&format!("{}{}", indent, entry.text), label_width);
            let style = if entry.active {
                theme.active_style()
            } else {
                theme.content_style()
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selection_style())
        .highlight_symbol("► ");
    frame.render_stateful_widget(list, area, &mut app.view.toc_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let text = match &app.view.status_message {
        Some(message) => format!(" {}", message),
        None => format!(" {} · {}", app.theme_name, Action::hint_line()),
    };
    let status = Paragraph::new(text).style(
        Style::default()
            .fg(theme.status_bar_fg)
            .bg(theme.status_bar_bg),
    );
    frame.render_widget(status, area);
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
