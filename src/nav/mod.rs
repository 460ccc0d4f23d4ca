//! Document selection and loading.
//!
//! [`Controller`] is a state machine over the selected document. Each call
//! to [`Controller::handle`] is one transition: it takes an event, updates
//! the phase and returns the effects the host has to perform, in order.
//! [`Dispatcher`] runs that loop against a [`Host`] with a FIFO queue, which
//! is where deferred events and fetch completions wait their turn.

mod event;

pub use event::{Effect, NavEvent, RequestId, SidebarEntry};

use crate::error::ViewerError;
use crate::location::{decode_token, encode_token};
use crate::parser::{RenderOptions, decode_document, render_markdown, wrap_article};
use crate::store::{DocumentDescriptor, Manifest, Response};
use crate::toc::{DEFAULT_INDENT_STEP, Toc};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Sidebar message when there is nothing to show.
pub const NO_DOCS: &str = "No docs found. Add docs/list.json and some .md files in docs/";

/// Content shown while a document is being fetched.
pub const LOADING: &str = "Loading…";

/// Lifecycle of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    ManifestLoaded,
    DocumentLoading,
    DocumentRendered,
    LoadFailed,
}

/// Controller settings.
#[derive(Debug, Clone)]
pub struct NavOptions {
    /// Document rendered when the manifest is unavailable.
    pub sample_path: String,
    /// Fall back to the sample instead of showing [`NO_DOCS`].
    pub fallback_sample: bool,
    pub render: RenderOptions,
    pub toc_indent_step: u16,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            sample_path: "docs/sample.md".to_string(),
            fallback_sample: true,
            render: RenderOptions::default(),
            toc_indent_step: DEFAULT_INDENT_STEP,
        }
    }
}

/// Owns the manifest and the selection.
#[derive(Debug)]
pub struct Controller {
    options: NavOptions,
    phase: Phase,
    manifest: Option<Manifest>,
    selected: Option<String>,
    initial_fragment: Option<String>,
    persist_location: bool,
    last_request: RequestId,
    in_flight: Option<RequestId>,
}

impl Controller {
    /// Create a controller. `initial_fragment` is the location token found
    /// at startup, if any.
    pub fn new(options: NavOptions, initial_fragment: Option<String>) -> Self {
        Self {
            options,
            phase: Phase::Uninitialized,
            manifest: None,
            selected: None,
            initial_fragment,
            persist_location: true,
            last_request: 0,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Apply one event.
    pub fn handle(&mut self, event: NavEvent) -> Vec<Effect> {
        match event {
            NavEvent::ManifestLoaded(manifest) => self.on_manifest(manifest),
            NavEvent::Select(path) => self.on_select(path),
            NavEvent::DocumentFetched {
                request,
                path,
                result,
            } => self.on_fetched(request, path, result),
            NavEvent::Reload => match self.selected.clone() {
                Some(path) if self.phase != Phase::DocumentLoading => self.begin_load(path),
                _ => Vec::new(),
            },
        }
    }

    fn on_manifest(&mut self, manifest: Option<Manifest>) -> Vec<Effect> {
        if self.phase != Phase::Uninitialized {
            warn!("manifest delivered twice, ignoring");
            return Vec::new();
        }

        match manifest.filter(|m| !m.is_empty()) {
            Some(manifest) => {
                let entries = sidebar_entries(&manifest);
                let target = self.resolve_initial(&manifest);
                self.manifest = Some(manifest);
                self.phase = Phase::ManifestLoaded;
                vec![Effect::ShowSidebar(entries), Effect::Defer(NavEvent::Select(target))]
            }
            None if self.options.fallback_sample => {
                let sample = DocumentDescriptor::new(Some("Sample"), &self.options.sample_path);
                info!("no manifest, falling back to {}", sample.path);
                let manifest = Manifest::new(vec![sample.clone()]);
                let mut effects = vec![
                    Effect::ShowSidebar(sidebar_entries(&manifest)),
                    Effect::MarkActive(sample.path.clone()),
                ];
                self.manifest = Some(manifest);
                self.persist_location = false;
                effects.extend(self.begin_load(sample.path));
                effects
            }
            None => {
                self.phase = Phase::ManifestLoaded;
                vec![Effect::ShowNoDocs(NO_DOCS.to_string())]
            }
        }
    }

    /// The location token's document if it is in the manifest, else the
    /// first document.
    fn resolve_initial(&self, manifest: &Manifest) -> String {
        let from_token = self
            .initial_fragment
            .as_deref()
            .and_then(decode_token)
            .and_then(|path| manifest.find_by_path(&path))
            .map(|doc| doc.path.clone());

        match from_token {
            Some(path) => {
                debug!("restoring {} from location", path);
                path
            }
            None => manifest
                .first()
                .map(|doc| doc.path.clone())
                .unwrap_or_default(),
        }
    }

    fn on_select(&mut self, path: String) -> Vec<Effect> {
        let known = self
            .manifest
            .as_ref()
            .is_some_and(|m| m.find_by_path(&path).is_some());
        if !known {
            warn!("ignoring selection of unknown document '{}'", path);
            return Vec::new();
        }

        let mut effects = vec![Effect::MarkActive(path.clone())];
        if self.persist_location {
            effects.push(Effect::ReplaceLocation(encode_token(&path)));
        }
        effects.extend(self.begin_load(path));
        effects
    }

    fn begin_load(&mut self, path: String) -> Vec<Effect> {
        self.last_request += 1;
        let request = self.last_request;
        self.in_flight = Some(request);
        self.selected = Some(path.clone());
        self.phase = Phase::DocumentLoading;
        debug!("request {} for {}", request, path);

        vec![
            Effect::ShowLoading(path.clone()),
            Effect::TeardownObserver,
            Effect::Fetch { request, path },
        ]
    }

    fn on_fetched(
        &mut self,
        request: RequestId,
        path: String,
        result: Result<Response, String>,
    ) -> Vec<Effect> {
        if self.in_flight != Some(request) {
            debug!("discarding stale response {} for {}", request, path);
            return Vec::new();
        }
        self.in_flight = None;

        let response = match result {
            Ok(response) if response.is_success() => response,
            Ok(response) => return self.fail(path, response.status.to_string()),
            Err(reason) => return self.fail(path, reason),
        };
        let source = match decode_document(response.body) {
            Ok(source) => source,
            Err(e) => return self.fail(path, e.to_string()),
        };

        let rendered = render_markdown(&source, &self.options.render);
        let toc = Toc::build(&rendered.headings, self.options.toc_indent_step);
        let anchors = rendered.headings.iter().map(|h| h.id.clone()).collect();
        self.phase = Phase::DocumentRendered;
        info!("rendered {} ({} headings)", path, rendered.headings.len());

        vec![
            Effect::ShowDocument {
                path,
                html: wrap_article(&rendered.html),
                source,
                headings: rendered.headings,
            },
            Effect::ShowToc(toc),
            Effect::InstallObserver(anchors),
        ]
    }

    fn fail(&mut self, path: String, reason: String) -> Vec<Effect> {
        let error = ViewerError::DocumentLoadFailed {
            path: path.clone(),
            reason,
        };
        warn!("{}", error);
        self.phase = Phase::LoadFailed;
        vec![
            Effect::ShowError {
                path,
                message: error.to_string(),
            },
            Effect::ShowToc(Toc::placeholder()),
            Effect::TeardownObserver,
        ]
    }
}

fn sidebar_entries(manifest: &Manifest) -> Vec<SidebarEntry> {
    manifest
        .documents()
        .iter()
        .map(|doc| SidebarEntry {
            label: doc.label().to_string(),
            path: doc.path.clone(),
        })
        .collect()
}

/// What a host provides to the dispatcher.
pub trait Host {
    /// Fetch a document body. The result re-enters the controller as a
    /// queued [`NavEvent::DocumentFetched`].
    fn fetch(&mut self, path: &str) -> Result<Response, String>;

    /// Perform any other effect.
    fn apply(&mut self, effect: Effect);
}

/// Runs the controller against a host, one event at a time.
#[derive(Debug)]
pub struct Dispatcher {
    controller: Controller,
    queue: VecDeque<NavEvent>,
}

impl Dispatcher {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            queue: VecDeque::new(),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Queue an event behind everything already pending.
    pub fn dispatch(&mut self, event: NavEvent) {
        self.queue.push_back(event);
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Process the next queued event. Returns `false` when the queue was empty.
    pub fn step(&mut self, host: &mut dyn Host) -> bool {
        let Some(event) = self.queue.pop_front() else {
            return false;
        };
        for effect in self.controller.handle(event) {
            match effect {
                Effect::Defer(event) => self.queue.push_back(event),
                Effect::Fetch { request, path } => {
                    let result = host.fetch(&path);
                    self.queue.push_back(NavEvent::DocumentFetched {
                        request,
                        path,
                        result,
                    });
                }
                other => host.apply(other),
            }
        }
        true
    }

    /// Process events until the queue is empty.
    pub fn run_until_idle(&mut self, host: &mut dyn Host) {
        while self.step(host) {}
    }
}
