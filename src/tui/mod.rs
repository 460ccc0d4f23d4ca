mod action;
mod app;
pub mod theme;
mod ui;
mod watcher;

pub use action::Action;
pub use app::{App, Content, Focus, View};
pub use theme::{Theme, ThemeName};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, warn};
use ratatui::DefaultTerminal;
use std::time::Duration;
use watcher::DocumentWatcher;

/// Poll interval while idle.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Poll interval while a smooth scroll is running.
const FRAME_POLL: Duration = Duration::from_millis(16);

/// Run the interactive viewer until the user quits.
///
/// Each turn of the loop draws a frame, applies queued navigation events,
/// then waits for input. Idle turns advance animations and check the
/// current document for changes on disk when `watch` is set.
pub fn run(terminal: &mut DefaultTerminal, mut app: App, watch: bool) -> Result<()> {
    let mut watcher = if watch {
        DocumentWatcher::new()
            .inspect_err(|e| warn!("live reload unavailable: {}", e))
            .ok()
    } else {
        None
    };

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;
        app.pump();

        if let Some(path) = app.view.watch_request.take()
            && let Some(watcher) = watcher.as_mut()
            && let Err(e) = watcher.watch(&path)
        {
            warn!("cannot watch {}: {}", path.display(), e);
        }

        let timeout = if app.view.is_animating() {
            FRAME_POLL
        } else {
            IDLE_POLL
        };
        if !event::poll(timeout)? {
            app.tick();
            if let Some(watcher) = watcher.as_mut()
                && watcher.check_for_changes()
            {
                app.reload();
                app.view.status_message = Some("↻ Reloaded (file changed)".to_string());
            }
            continue;
        }

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = Action::from_key(key)
        {
            app.handle_action(action);
        }

        if app.should_quit {
            info!("quitting");
            return Ok(());
        }
    }
}
