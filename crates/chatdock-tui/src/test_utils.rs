//! Test utilities for chatdock-tui rendering and integration tests.
//!
//! Helpers for creating test terminals and apps, and for rendering to strings.

use crate::app::App;
use chatdock_engine::WidgetConfig;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(TEST_WIDTH, TEST_HEIGHT);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create an app talking to `base_url` with the initial history load settled.
pub async fn create_test_app(base_url: &str) -> App {
    let config = WidgetConfig::new(base_url);
    let mut app = App::new(config, std::env::temp_dir()).expect("valid test config");
    app.store.settle().await;
    app.sync_scroll();
    app
}

/// Render the app at the default size and return the screen as a string.
pub fn render_app_to_string(app: &mut App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    app.render(area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[tokio::test]
    async fn test_create_test_app_is_idle() {
        let server = wiremock::MockServer::start().await;
        let mut app = create_test_app(&server.uri()).await;
        assert!(!app.store.is_loading());

        let screen = render_app_to_string(&mut app);
        assert!(screen.contains("chatdock"));
    }
}
