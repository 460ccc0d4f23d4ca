//! Layout builder for the viewer panes.
//!
//! Sections are declared in order and may be hidden; hidden sections take
//! no space and have no area.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    Body,
    Status,
    Sidebar,
    Content,
    Toc,
}

/// Areas assigned to each visible section.
pub struct DynamicLayout {
    areas: HashMap<Section, Rect>,
}

impl DynamicLayout {
    pub fn vertical(area: Rect) -> DynamicLayoutBuilder {
        DynamicLayoutBuilder::new(area, Direction::Vertical)
    }

    pub fn horizontal(area: Rect) -> DynamicLayoutBuilder {
        DynamicLayoutBuilder::new(area, Direction::Horizontal)
    }

    pub fn get(&self, id: Section) -> Option<Rect> {
        self.areas.get(&id).copied()
    }

    /// Area of a section that was added unconditionally.
    pub fn area(&self, id: Section) -> Rect {
        self.get(id).unwrap_or_default()
    }
}

pub struct DynamicLayoutBuilder {
    area: Rect,
    direction: Direction,
    sections: Vec<LayoutSection>,
}

struct LayoutSection {
    id: Section,
    constraint: Constraint,
    visible: bool,
}

impl DynamicLayoutBuilder {
    fn new(area: Rect, direction: Direction) -> Self {
        Self {
            area,
            direction,
            sections: Vec::new(),
        }
    }

    pub fn section(self, id: Section, constraint: Constraint) -> Self {
        self.section_if(true, id, constraint)
    }

    pub fn section_if(mut self, visible: bool, id: Section, constraint: Constraint) -> Self {
        self.sections.push(LayoutSection {
            id,
            constraint,
            visible,
        });
        self
    }

    pub fn build(self) -> DynamicLayout {
        let visible: Vec<&LayoutSection> = self.sections.iter().filter(|s| s.visible).collect();
        let chunks = Layout::default()
            .direction(self.direction)
            .constraints(visible.iter().map(|s| s.constraint))
            .split(self.area);

        let areas = visible
            .iter()
            .zip(chunks.iter())
            .map(|(section, rect)| (section.id, *rect))
            .collect();
        DynamicLayout { areas }
    }
}
