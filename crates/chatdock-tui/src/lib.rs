//! chatdock-tui: Terminal chat widget
//!
//! This crate provides the presentation layer for chatdock:
//! - Launcher button anchored to the bottom-right corner
//! - Chat panel with message list, typing indicator and input row
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod input;
mod layout;
#[cfg(test)]
pub mod test_utils;
mod theme;
mod widgets;

pub use app::App;
pub use chatdock_engine;
pub use event::{key_to_action, Action, Event, EventHandler};
pub use input::TextInputState;
pub use theme::Theme;

use chatdock_engine::WidgetConfig;
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::PathBuf;
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    config: WidgetConfig,
    export_dir: PathBuf,
    theme: Theme,
) -> Result<(), Box<dyn std::error::Error>> {
    // Fail on bad configuration before touching the terminal
    let mut app = App::new(config, export_dir)?;
    app.theme = theme;

    info!(
        base_url = %app.store.config().api_base_url,
        user_id = %app.store.config().resolved_user_id(),
        "starting chat widget"
    );

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    // Main loop
    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Abort anything still in flight
    app.store.abort_all();

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            app.render(area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = key_to_action(key, app.open);
                    app.handle_action(action);
                }
                Event::Mouse(mouse) => {
                    let action = app.mouse_to_action(mouse);
                    app.handle_action(action);
                }
                Event::Tick => app.tick(),
                // Terminal will handle resize automatically
                Event::Key(_) | Event::Resize(_, _) => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, render_app_to_string};
    use chatdock_engine::Message;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn press(app: &mut App, code: KeyCode) {
        let action = key_to_action(KeyEvent::new(code, KeyModifiers::NONE), app.open);
        app.handle_action(action);
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[tokio::test]
    async fn test_keyboard_flow() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "reply": "Sure, where to?" })),
            )
            .mount(&server)
            .await;
        let mut app = create_test_app(&server.uri()).await;

        // 'q' quits only while closed; once open it is text
        press(&mut app, KeyCode::Enter);
        assert!(app.open);
        for c in "quick trip".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.input.content(), "quick trip");

        press(&mut app, KeyCode::Enter);
        app.store.settle().await;
        app.sync_scroll();
        assert_eq!(
            app.store.messages(),
            &[Message::user("quick trip"), Message::bot("Sure, where to?")]
        );

        // Recall the sent message
        press(&mut app, KeyCode::Up);
        assert_eq!(app.input.content(), "quick trip");

        let screen = render_app_to_string(&mut app);
        assert!(screen.contains("Sure, where to?"));

        press(&mut app, KeyCode::Esc);
        assert!(!app.open);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_help_closes_before_quit() {
        let server = MockServer::start().await;
        let mut app = create_test_app(&server.uri()).await;

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        let screen = render_app_to_string(&mut app);
        assert!(screen.contains("Help"));

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }
}
