use super::action::Action;
use super::theme::{Theme, ThemeName};
use crate::config::Config;
use crate::error::ViewerError;
use crate::location::LocationStore;
use crate::nav::{Controller, Dispatcher, Effect, Host, NavEvent, SidebarEntry};
use crate::parser::{DocumentLayout, layout_document};
use crate::store::{DocumentStore, FsSource, ResourceSource, Response};
use crate::sync::{AnchorPosition, ObserveOptions, ScrollSync};
use crate::toc::{ScrollBehavior, Toc};
use log::{debug, info, warn};
use ratatui::widgets::ListState;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
    Toc,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Content,
            Focus::Content => Focus::Toc,
            Focus::Toc => Focus::Sidebar,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Toc,
            Focus::Content => Focus::Sidebar,
            Focus::Toc => Focus::Content,
        }
    }
}

/// What the content pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Empty,
    Loading(String),
    Document {
        path: String,
        /// Markdown the layout was built from, kept for re-wrapping
        source: String,
        layout: DocumentLayout,
    },
    Error {
        path: String,
        message: String,
    },
}

/// Pane state the controller's effects are applied to.
pub struct View {
    source: FsSource,
    location: Box<dyn LocationStore>,
    observe_options: ObserveOptions,
    smooth_scroll: bool,

    pub sidebar: Vec<SidebarEntry>,
    pub sidebar_message: Option<String>,
    pub sidebar_state: ListState,
    pub active_path: Option<String>,

    pub content: Content,
    pub content_scroll: u16,
    /// Rows in the content viewport, updated on every draw
    pub viewport_height: u16,
    /// Text columns in the content viewport; 0 until the first draw
    viewport_width: u16,
    scroll_target: Option<u16>,
    restore_scroll: Option<u16>,

    pub toc: Toc,
    pub toc_state: ListState,
    sync: ScrollSync,

    pub status_message: Option<String>,
    /// File the watcher should follow, set when a new document is shown
    pub watch_request: Option<PathBuf>,
}

impl View {
    fn new(source: FsSource, location: Box<dyn LocationStore>, config: &Config) -> Self {
        Self {
            source,
            location,
            observe_options: config.observe_options(),
            smooth_scroll: config.ui.smooth_scroll,
            sidebar: Vec::new(),
            sidebar_message: None,
            sidebar_state: ListState::default(),
            active_path: None,
            content: Content::Empty,
            content_scroll: 0,
            viewport_height: 0,
            viewport_width: 0,
            scroll_target: None,
            restore_scroll: None,
            toc: Toc::placeholder(),
            toc_state: ListState::default(),
            sync: ScrollSync::new(),
            status_message: None,
            watch_request: None,
        }
    }

    pub fn content_len(&self) -> usize {
        match &self.content {
            Content::Document { layout, .. } => layout.lines.len(),
            _ => 0,
        }
    }

    pub fn max_scroll(&self) -> u16 {
        let len = self
            .content_len()
            .saturating_sub(usize::from(self.viewport_height));
        u16::try_from(len).unwrap_or(u16::MAX)
    }

    /// Record the content viewport size, re-wrapping the document when
    /// the width changes.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport_height = height;
        if width == self.viewport_width {
            return;
        }
        self.viewport_width = width;
        if let Content::Document { source, layout, .. } = &mut self.content {
            *layout = layout_document(source, usize::from(width));
        }
        self.content_scroll = self.content_scroll.min(self.max_scroll());
    }

    /// Row of heading `index` in the current layout.
    fn heading_line(&self, index: usize) -> Option<usize> {
        match &self.content {
            Content::Document { layout, .. } => layout.heading_lines.get(index).copied(),
            _ => None,
        }
    }

    fn scroll_by(&mut self, delta: i32) {
        self.scroll_target = None;
        let next = (i32::from(self.content_scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.content_scroll = u16::try_from(next).unwrap_or(0);
    }

    fn scroll_to(&mut self, line: usize, behavior: ScrollBehavior) {
        let target = u16::try_from(line)
            .unwrap_or(u16::MAX)
            .min(self.max_scroll());
        match behavior {
            ScrollBehavior::Instant => {
                self.content_scroll = target;
                self.scroll_target = None;
            }
            ScrollBehavior::Smooth => self.scroll_target = Some(target),
        }
    }

    /// Advance a smooth scroll by one frame. Returns `true` if it moved.
    fn step_scroll(&mut self) -> bool {
        let Some(target) = self.scroll_target else {
            return false;
        };
        let current = self.content_scroll;
        let distance = current.abs_diff(target);
        if distance == 0 {
            self.scroll_target = None;
            return false;
        }
        let step = (distance / 3).max(1);
        self.content_scroll = if target > current {
            current + step
        } else {
            current - step
        };
        true
    }

    pub fn is_animating(&self) -> bool {
        self.scroll_target.is_some()
    }

    fn anchor_positions(&self) -> Vec<AnchorPosition> {
        let Content::Document { layout, .. } = &self.content else {
            return Vec::new();
        };
        let scroll = i64::from(self.content_scroll);
        layout
            .heading_lines
            .iter()
            .enumerate()
            .map(|(index, &line)| AnchorPosition {
                index,
                top: line as i64 - scroll,
                height: 1,
            })
            .collect()
    }

    /// Report anchor positions to the scroll sync and follow its verdict.
    fn observe_scroll(&mut self) {
        let positions = self.anchor_positions();
        if let Some(active) = self.sync.observe(&positions, self.viewport_height) {
            debug!("active heading is now #{}", active.id);
            self.toc.highlight(&active);
        }
    }

    fn select_sidebar(&mut self, path: &str) {
        if let Some(index) = self.sidebar.iter().position(|e| e.path == path) {
            self.sidebar_state.select(Some(index));
        }
    }
}

impl Host for View {
    fn fetch(&mut self, path: &str) -> Result<Response, String> {
        self.source.fetch(path).map_err(|e| e.to_string())
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ShowSidebar(entries) => {
                self.sidebar_state
                    .select(if entries.is_empty() { None } else { Some(0) });
                self.sidebar = entries;
                self.sidebar_message = None;
                self.active_path = None;
            }
            Effect::ShowNoDocs(message) => {
                self.sidebar.clear();
                self.sidebar_state.select(None);
                self.sidebar_message = Some(message);
            }
            Effect::MarkActive(path) => {
                self.select_sidebar(&path);
                self.active_path = Some(path);
            }
            Effect::ReplaceLocation(token) => {
                if let Err(e) = self.location.replace(&token) {
                    warn!("could not save location: {}", e);
                    self.status_message = Some(format!("Could not save location: {}", e));
                }
            }
            Effect::ShowLoading(path) => {
                self.content = Content::Loading(path);
                self.content_scroll = 0;
                self.scroll_target = None;
            }
            Effect::TeardownObserver => {
                self.sync.teardown();
                self.toc.clear_highlight();
            }
            Effect::ShowDocument {
                path,
                source,
                headings,
                ..
            } => {
                let layout = layout_document(&source, usize::from(self.viewport_width));
                if layout.heading_lines.len() != headings.len() {
                    warn!(
                        "{}: laid out {} headings, rendered {}",
                        path,
                        layout.heading_lines.len(),
                        headings.len()
                    );
                }
                self.watch_request = self.source.resolve(&path);
                self.content = Content::Document {
                    path,
                    source,
                    layout,
                };
                if let Some(scroll) = self.restore_scroll.take() {
                    self.content_scroll = scroll.min(self.max_scroll());
                }
            }
            Effect::ShowToc(toc) => {
                self.toc_state
                    .select(if toc.is_empty() { None } else { Some(0) });
                self.toc = toc;
            }
            Effect::InstallObserver(anchors) => {
                let installed =
                    self.sync
                        .install(&anchors, self.observe_options, self.viewport_height);
                if let Err(e) = installed {
                    let error = ViewerError::from(e);
                    warn!("{}", error);
                    self.status_message = Some(error.to_string());
                }
            }
            Effect::ShowError { path, message } => {
                self.restore_scroll = None;
                self.content = Content::Error { path, message };
            }
            // Consumed by the dispatcher
            Effect::Fetch { .. } | Effect::Defer(_) => {}
        }
    }
}

/// The interactive viewer.
pub struct App {
    dispatcher: Dispatcher,
    pub view: View,
    pub config: Config,
    pub theme_name: ThemeName,
    pub theme: Theme,
    pub focus: Focus,
    /// Shown in the title bar
    pub root_label: String,
    pub should_quit: bool,
}

impl App {
    /// Load the manifest from `source` and queue the initial selection.
    ///
    /// Nothing is applied until [`App::pump`] runs, so the first frame can
    /// size the content viewport before scroll sync is installed.
    pub fn new(config: Config, source: FsSource, location: Box<dyn LocationStore>) -> Self {
        let manifest = DocumentStore::load(&source, &config.viewer.manifest);
        let controller = Controller::new(config.nav_options(), location.fragment());
        let mut dispatcher = Dispatcher::new(controller);
        dispatcher.dispatch(NavEvent::ManifestLoaded(manifest));

        let root_label = source.root().display().to_string();
        let theme_name = config.theme_name();
        let theme = Theme::from_name(theme_name).with_custom_colors(&config.theme);
        let view = View::new(source, location, &config);

        Self {
            dispatcher,
            view,
            config,
            theme_name,
            theme,
            focus: Focus::Sidebar,
            root_label,
            should_quit: false,
        }
    }

    /// Apply every queued navigation event, then resync the TOC.
    pub fn pump(&mut self) {
        if !self.dispatcher.is_idle() {
            self.dispatcher.run_until_idle(&mut self.view);
        }
        self.view.observe_scroll();
    }

    /// Advance animations by one frame.
    pub fn tick(&mut self) {
        if self.view.step_scroll() {
            self.view.observe_scroll();
        }
    }

    pub fn selected_document(&self) -> Option<&str> {
        self.dispatcher.controller().selected()
    }

    /// Reload the current document, keeping the scroll offset.
    pub fn reload(&mut self) {
        if self.selected_document().is_none() {
            return;
        }
        info!("reloading {:?}", self.selected_document());
        self.view.restore_scroll = Some(self.view.content_scroll);
        self.dispatcher.dispatch(NavEvent::Reload);
    }

    pub fn handle_action(&mut self, action: Action) {
        self.view.status_message = None;
        match action {
            Action::Quit => self.should_quit = true,
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPrevious => self.focus = self.focus.previous(),
            Action::CycleTheme => self.cycle_theme(),
            Action::Reload => self.reload(),
            Action::PageDown => self.page(1),
            Action::PageUp => self.page(-1),
            Action::Next => self.move_by(1),
            Action::Previous => self.move_by(-1),
            Action::First => self.move_to_edge(false),
            Action::Last => self.move_to_edge(true),
            Action::Activate => self.activate(),
        }
    }

    fn page(&mut self, direction: i32) {
        let rows = i32::from(self.view.viewport_height.max(1));
        self.view.scroll_by(direction * rows);
    }

    fn move_by(&mut self, delta: i32) {
        match self.focus {
            Focus::Sidebar => {
                let len = self.view.sidebar.len();
                step_list(&mut self.view.sidebar_state, len, delta);
            }
            Focus::Content => self.view.scroll_by(delta),
            Focus::Toc => {
                let len = self.view.toc.len();
                step_list(&mut self.view.toc_state, len, delta);
            }
        }
    }

    fn move_to_edge(&mut self, last: bool) {
        match self.focus {
            Focus::Sidebar => {
                let len = self.view.sidebar.len();
                select_edge(&mut self.view.sidebar_state, len, last);
            }
            Focus::Content => {
                let target = if last { self.view.max_scroll() } else { 0 };
                self.view.scroll_by(i32::from(target) - i32::from(self.view.content_scroll));
            }
            Focus::Toc => {
                let len = self.view.toc.len();
                select_edge(&mut self.view.toc_state, len, last);
            }
        }
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Sidebar => {
                let entry = self
                    .view
                    .sidebar_state
                    .selected()
                    .and_then(|i| self.view.sidebar.get(i));
                if let Some(entry) = entry {
                    self.dispatcher.dispatch(NavEvent::Select(entry.path.clone()));
                }
            }
            Focus::Toc => {
                let Some(index) = self.view.toc_state.selected() else {
                    return;
                };
                self.jump_to_heading(index);
            }
            Focus::Content => {}
        }
    }

    /// Scroll so that heading `index` sits at the top of the viewport.
    pub fn jump_to_heading(&mut self, index: usize) {
        let Some(request) = self.view.toc.click(index) else {
            return;
        };
        let Some(line) = self.view.heading_line(request.index) else {
            return;
        };
        let behavior = if self.view.smooth_scroll {
            request.behavior
        } else {
            ScrollBehavior::Instant
        };
        debug!("jumping to #{} at line {}", request.id, line);
        self.view.scroll_to(line, behavior);
        self.view.observe_scroll();
    }

    fn cycle_theme(&mut self) {
        self.theme_name = self.theme_name.next();
        self.theme = Theme::from_name(self.theme_name).with_custom_colors(&self.config.theme);
        if let Err(e) = self.config.set_theme(self.theme_name) {
            warn!("could not save theme: {}", e);
        }
        self.view.status_message = Some(format!("Theme: {}", self.theme_name));
    }
}

fn step_list(state: &mut ListState, len: usize, delta: i32) {
    if len == 0 {
        return;
    }
    let current = state.selected().unwrap_or(0) as i64;
    let next = (current + i64::from(delta)).clamp(0, len as i64 - 1);
    state.select(Some(next as usize));
}

fn select_edge(state: &mut ListState, len: usize, last: bool) {
    if len > 0 {
        state.select(Some(if last { len - 1 } else { 0 }));
    }
}
