//! Event handling for the chatdock TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling blocks, so it gets its own thread
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            CrosstermEvent::Key(key) => Some(Event::Key(key)),
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, blocking until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Action the widget can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the panel when closed, close it when open.
    Toggle,
    /// Submit the input.
    Send,
    /// Type a character into the input.
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Recall the previous submitted input.
    HistoryPrev,
    /// Recall the next submitted input.
    HistoryNext,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Clear the conversation.
    Clear,
    /// Export the transcript to a file.
    Export,
    Help,
    Quit,
    None,
}

/// Convert a key event to an action. Bindings depend on whether the panel is open.
pub fn key_to_action(key: KeyEvent, open: bool) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if key.code == KeyCode::F(1) {
        return Action::Help;
    }

    if !open {
        return match key.code {
            KeyCode::Enter | KeyCode::Char(' ' | 'c') => Action::Toggle,
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('?') => Action::Help,
            _ => Action::None,
        };
    }

    if ctrl {
        return match key.code {
            KeyCode::Char('s') => Action::Send,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Char('e') => Action::Export,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Toggle,
        KeyCode::Enter => Action::Send,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Up => Action::HistoryPrev,
        KeyCode::Down => Action::HistoryNext,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_closed_bindings() {
        assert_eq!(key_to_action(key(KeyCode::Enter), false), Action::Toggle);
        assert_eq!(key_to_action(key(KeyCode::Char('c')), false), Action::Toggle);
        assert_eq!(key_to_action(key(KeyCode::Char('q')), false), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('x')), false), Action::None);
    }

    #[test]
    fn test_open_bindings_type_text() {
        assert_eq!(key_to_action(key(KeyCode::Char('q')), true), Action::Insert('q'));
        assert_eq!(key_to_action(key(KeyCode::Enter), true), Action::Send);
        assert_eq!(key_to_action(key(KeyCode::Esc), true), Action::Toggle);
        assert_eq!(key_to_action(key(KeyCode::Up), true), Action::HistoryPrev);
    }

    #[test]
    fn test_control_bindings() {
        assert_eq!(key_to_action(ctrl('c'), true), Action::Quit);
        assert_eq!(key_to_action(ctrl('c'), false), Action::Quit);
        assert_eq!(key_to_action(ctrl('s'), true), Action::Send);
        assert_eq!(key_to_action(ctrl('l'), true), Action::Clear);
        assert_eq!(key_to_action(ctrl('e'), true), Action::Export);
        assert_eq!(key_to_action(key(KeyCode::F(1)), true), Action::Help);
    }
}
