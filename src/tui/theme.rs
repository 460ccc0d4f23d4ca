//! Color themes for the viewer panes.

use crate::config::CustomThemeConfig;
use crate::parser::SpanKind;
use ratatui::style::{Color, Modifier, Style};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "PascalCase")]
pub enum ThemeName {
    OceanDark,
    Nord,
    Gruvbox,
}

impl ThemeName {
    /// The theme after this one, wrapping around.
    pub fn next(self) -> Self {
        let all: Vec<_> = ThemeName::iter().collect();
        let pos = all.iter().position(|t| *t == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub heading: Color,
    pub muted: Color,
    pub code_fg: Color,
    pub link_fg: Color,
    pub border_focused: Color,
    pub border_unfocused: Color,
    pub active_fg: Color,
    pub active_bg: Color,
    pub selection_bg: Color,
    pub error_fg: Color,
    pub title_bar_fg: Color,
    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::OceanDark => Self {
                foreground: Color::Rgb(192, 197, 206),
                heading: Color::Rgb(102, 217, 239),
                muted: Color::Rgb(101, 115, 126),
                code_fg: Color::Rgb(163, 190, 140),
                link_fg: Color::Rgb(143, 161, 179),
                border_focused: Color::Rgb(102, 217, 239),
                border_unfocused: Color::Rgb(79, 91, 102),
                active_fg: Color::Rgb(43, 48, 59),
                active_bg: Color::Rgb(235, 203, 139),
                selection_bg: Color::Rgb(52, 61, 70),
                error_fg: Color::Rgb(191, 97, 106),
                title_bar_fg: Color::Rgb(102, 217, 239),
                status_bar_fg: Color::Rgb(192, 197, 206),
                status_bar_bg: Color::Rgb(52, 61, 70),
            },
            ThemeName::Nord => Self {
                foreground: Color::Rgb(216, 222, 233),
                heading: Color::Rgb(136, 192, 208),
                muted: Color::Rgb(76, 86, 106),
                code_fg: Color::Rgb(163, 190, 140),
                link_fg: Color::Rgb(129, 161, 193),
                border_focused: Color::Rgb(136, 192, 208),
                border_unfocused: Color::Rgb(67, 76, 94),
                active_fg: Color::Rgb(46, 52, 64),
                active_bg: Color::Rgb(163, 190, 140),
                selection_bg: Color::Rgb(59, 66, 82),
                error_fg: Color::Rgb(191, 97, 106),
                title_bar_fg: Color::Rgb(143, 188, 187),
                status_bar_fg: Color::Rgb(216, 222, 233),
                status_bar_bg: Color::Rgb(59, 66, 82),
            },
            ThemeName::Gruvbox => Self {
                foreground: Color::Rgb(235, 219, 178),
                heading: Color::Rgb(250, 189, 47),
                muted: Color::Rgb(146, 131, 116),
                code_fg: Color::Rgb(142, 192, 124),
                link_fg: Color::Rgb(131, 165, 152),
                border_focused: Color::Rgb(250, 189, 47),
                border_unfocused: Color::Rgb(80, 73, 69),
                active_fg: Color::Rgb(40, 40, 40),
                active_bg: Color::Rgb(184, 187, 38),
                selection_bg: Color::Rgb(60, 56, 54),
                error_fg: Color::Rgb(251, 73, 52),
                title_bar_fg: Color::Rgb(142, 192, 124),
                status_bar_fg: Color::Rgb(235, 219, 178),
                status_bar_bg: Color::Rgb(60, 56, 54),
            },
        }
    }

    /// Apply color overrides from the config file.
    pub fn with_custom_colors(mut self, custom: &CustomThemeConfig) -> Self {
        let overrides = [
            (&custom.foreground, &mut self.foreground),
            (&custom.heading, &mut self.heading),
            (&custom.border_focused, &mut self.border_focused),
            (&custom.active_fg, &mut self.active_fg),
            (&custom.active_bg, &mut self.active_bg),
            (&custom.error_fg, &mut self.error_fg),
        ];
        for (value, slot) in overrides {
            if let Some(color) = value.as_ref().and_then(|v| v.to_color()) {
                *slot = color;
            }
        }
        self
    }

    pub fn content_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    pub fn heading_style(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }

    /// Style of a span in the content pane. Top-level headings are
    /// underlined as well.
    pub fn span_style(&self, kind: SpanKind) -> Style {
        let text = self.content_style();
        match kind {
            SpanKind::Text => text,
            SpanKind::Strong => text.add_modifier(Modifier::BOLD),
            SpanKind::Emphasis => text.add_modifier(Modifier::ITALIC),
            SpanKind::Strikethrough => text.add_modifier(Modifier::CROSSED_OUT),
            SpanKind::Code | SpanKind::CodeBlock => Style::default().fg(self.code_fg),
            SpanKind::Link => Style::default()
                .fg(self.link_fg)
                .add_modifier(Modifier::UNDERLINED),
            SpanKind::Heading(1) => self.heading_style().add_modifier(Modifier::UNDERLINED),
            SpanKind::Heading(_) => self.heading_style(),
            SpanKind::Marker => Style::default().fg(self.muted),
        }
    }

    pub fn active_style(&self) -> Style {
        Style::default()
            .fg(self.active_fg)
            .bg(self.active_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selection_style(&self) -> Style {
        Style::default().bg(self.selection_bg)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border_unfocused)
        }
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error_fg)
            .add_modifier(Modifier::BOLD)
    }
}
