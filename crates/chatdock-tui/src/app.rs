//! Application state and update logic for the chatdock TUI.

use crate::event::Action;
use crate::input::TextInputState;
use crate::layout::{hit, launcher_area, panel_area, panel_layout};
use crate::theme::Theme;
use crate::widgets::{ChatPanel, HelpOverlay, Launcher, StatusBarContent, TranscriptContent};
use chatdock_engine::{
    export_transcript, ConfigError, ConversationStore, WidgetConfig, GUEST_USER_ID,
};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};
use std::path::PathBuf;
use tracing::{info, warn};

/// Lines moved per mouse wheel step.
const WHEEL_STEP: usize = 3;

/// Ticks a notification stays visible (~3 seconds at 250ms).
const NOTIFICATION_TICKS: usize = 12;

/// What the transcript auto-scroll follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewKey {
    revision: u64,
    loading: bool,
    open: bool,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Whether the chat panel is open.
    pub open: bool,

    /// Message input.
    pub input: TextInputState,

    /// Conversation state and backend requests.
    pub store: ConversationStore,

    /// Color palette.
    pub theme: Theme,

    /// Tick counter for animations.
    pub tick: usize,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Where transcript exports are written.
    export_dir: PathBuf,

    /// Transcript scroll, in lines up from the newest.
    pub scroll: usize,

    /// Screen area from the last render.
    viewport: Rect,

    view_key: ViewKey,
}

impl App {
    /// Create the app and start loading history.
    ///
    /// Without a configured user the guest identity is used.
    pub fn new(mut config: WidgetConfig, export_dir: PathBuf) -> Result<Self, ConfigError> {
        if config.user_id().is_none() {
            config.user_id = Some(GUEST_USER_ID.to_string());
        }

        let mut store = ConversationStore::new(config)?;
        store.load_history();

        let mut app = Self {
            should_quit: false,
            show_help: false,
            open: false,
            input: TextInputState::new(),
            store,
            theme: Theme::default(),
            tick: 0,
            notification: None,
            notification_ttl: 0,
            export_dir,
            scroll: 0,
            viewport: Rect::default(),
            view_key: ViewKey {
                revision: 0,
                loading: false,
                open: false,
            },
        };
        app.view_key = app.current_view_key();
        Ok(app)
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Global actions
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        if self.open {
            self.handle_open_action(action);
        } else if action == Action::Toggle {
            self.open = true;
        }

        self.sync_scroll();
    }

    fn handle_open_action(&mut self, action: Action) {
        let loading = self.store.is_loading();

        match action {
            Action::Toggle => self.open = false,
            Action::Send => {
                self.submit();
            }
            Action::Insert(c) if !loading => self.input.insert(c),
            Action::Backspace if !loading => self.input.backspace(),
            Action::Delete if !loading => self.input.delete(),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::HistoryPrev if !loading => self.input.history_prev(),
            Action::HistoryNext if !loading => self.input.history_next(),
            Action::ScrollUp => self.scroll_up(WHEEL_STEP),
            Action::ScrollDown => self.scroll_down(WHEEL_STEP),
            Action::PageUp => self.scroll_up(self.page_size()),
            Action::PageDown => self.scroll_down(self.page_size()),
            Action::Clear => {
                self.store.clear();
                self.scroll = 0;
                self.set_notification("Conversation cleared".to_string());
            }
            Action::Export => self.export(),
            _ => {}
        }
    }

    /// Send the input. Ignored while blank or while a request is outstanding.
    /// Returns `true` if a message was sent.
    pub fn submit(&mut self) -> bool {
        if self.store.is_loading() || self.input.is_blank() {
            return false;
        }
        let text = self.input.submit();
        self.store.send_message(&text)
    }

    /// Map a mouse event to an action using the last rendered layout.
    pub fn mouse_to_action(&self, mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::ScrollUp if self.open => Action::ScrollUp,
            MouseEventKind::ScrollDown if self.open => Action::ScrollDown,
            MouseEventKind::Down(MouseButton::Left) => self.click_action(mouse.column, mouse.row),
            _ => Action::None,
        }
    }

    /// Action for a left click at the given cell.
    pub fn click_action(&self, column: u16, row: u16) -> Action {
        if self.show_help {
            return Action::Help;
        }

        if !self.open {
            return if hit(launcher_area(self.viewport), column, row) {
                Action::Toggle
            } else {
                Action::None
            };
        }

        let regions = panel_layout(panel_area(self.viewport));
        if hit(regions.close, column, row) {
            Action::Toggle
        } else if hit(regions.send, column, row) {
            Action::Send
        } else {
            Action::None
        }
    }

    /// Set a temporary notification message.
    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Increment tick counter, apply finished requests and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        // Clear notification after TTL expires
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }

        self.store.poll();
        self.sync_scroll();
    }

    fn current_view_key(&self) -> ViewKey {
        ViewKey {
            revision: self.store.revision(),
            loading: self.store.is_loading(),
            open: self.open,
        }
    }

    /// Pin the transcript to the newest entry whenever the messages, the
    /// loading flag or the open state change while the panel is open.
    pub fn sync_scroll(&mut self) {
        let key = self.current_view_key();
        if key != self.view_key {
            self.view_key = key;
            if self.open {
                self.scroll = 0;
            }
        }
    }

    fn transcript_content(&self) -> TranscriptContent<'_> {
        TranscriptContent {
            messages: self.store.messages(),
            loading: self.store.is_loading(),
            greeting: &self.store.config().text.greeting,
            tick: self.tick,
        }
    }

    fn transcript_area(&self) -> Rect {
        panel_layout(panel_area(self.viewport)).transcript
    }

    fn page_size(&self) -> usize {
        (self.transcript_area().height as usize).saturating_sub(1).max(1)
    }

    fn max_scroll(&self) -> usize {
        let area = self.transcript_area();
        let total = self
            .transcript_content()
            .lines(area.width as usize, &self.theme)
            .len();
        total.saturating_sub(area.height as usize)
    }

    fn scroll_up(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Write the transcript to the export directory.
    fn export(&mut self) {
        if self.store.messages().is_empty() {
            self.set_notification("Nothing to export".to_string());
            return;
        }

        let title = &self.store.config().text.title;
        match export_transcript(&self.export_dir, title, self.store.messages()) {
            Ok(path) => {
                info!(path = %path.display(), "transcript exported");
                self.set_notification(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "transcript export failed");
                self.set_notification(format!("Export failed: {e}"));
            }
        }
    }

    /// Render the whole screen.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.viewport = area;

        let config = self.store.config();
        let backdrop = format!(
            "chatdock · {} · {}",
            config.api_base_url,
            config.resolved_user_id()
        );
        buf.set_stringn(
            area.x,
            area.y,
            backdrop,
            area.width as usize,
            Style::default().fg(self.theme.muted),
        );

        if self.open {
            let status = StatusBarContent {
                status: config.text.status.clone(),
                error: self.store.error().map(String::from),
                notice: self.notification.clone(),
            };
            ChatPanel::new(
                &config.text.title,
                &status,
                self.transcript_content(),
                &self.input,
                &self.theme,
            )
            .scroll(self.scroll)
            .placeholder(&config.text.placeholder)
            .render(panel_area(area), buf);
        } else {
            Launcher::new(&self.theme).render(launcher_area(area), buf);
        }

        if self.show_help {
            HelpOverlay::new(&self.theme).render(area, buf);
        }
    }
}
