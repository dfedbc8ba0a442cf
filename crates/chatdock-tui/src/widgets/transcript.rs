//! Message list widget.
//!
//! Bot messages sit on the left behind an avatar, user messages are
//! right-aligned. While a reply is pending a typing indicator follows the
//! messages; an empty conversation shows the greeting instead.
//!
//! ```text
//! 🤖 Hi! Where would you like to go?
//!
//!                          Book a flight to Đà Lạt
//!
//! 🤖 ●○○
//! ```

use chatdock_engine::Message;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Avatar shown in front of bot messages.
const BOT_AVATAR: &str = "🤖 ";

/// Indent for wrapped bot lines (avatar width).
const BOT_INDENT: &str = "   ";

/// Typing indicator animation frames.
const TYPING_FRAMES: [&str; 3] = ["●○○", "○●○", "○○●"];

/// Bubbles use at most this share of the width (percent).
const BUBBLE_PERCENT: usize = 85;

/// Everything needed to lay out the message list.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptContent<'a> {
    pub messages: &'a [Message],
    pub loading: bool,
    pub greeting: &'a str,
    pub tick: usize,
}

impl TranscriptContent<'_> {
    /// Build the styled lines for the given width.
    pub fn lines(&self, width: usize, theme: &Theme) -> Vec<Line<'static>> {
        if width == 0 {
            return Vec::new();
        }

        if self.messages.is_empty() && !self.loading {
            return greeting_lines(self.greeting, width, theme);
        }

        let bubble_width = (width * BUBBLE_PERCENT / 100).max(1);
        let mut lines = Vec::new();

        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if message.is_user() {
                push_user_lines(&mut lines, &message.content, bubble_width, width, theme);
            } else {
                push_bot_lines(&mut lines, &message.content, bubble_width, theme);
            }
        }

        if self.loading {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let frame = TYPING_FRAMES[self.tick % TYPING_FRAMES.len()];
            lines.push(Line::from(vec![
                Span::raw(BOT_AVATAR),
                Span::styled(frame, Style::default().fg(theme.muted)),
            ]));
        }

        lines
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        out.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    out
}

fn push_bot_lines(lines: &mut Vec<Line<'static>>, content: &str, width: usize, theme: &Theme) {
    let text_width = width.saturating_sub(BOT_AVATAR.width()).max(1);
    let style = Style::default().fg(theme.bot);

    for (i, text) in wrap(content, text_width).into_iter().enumerate() {
        let lead = if i == 0 { BOT_AVATAR } else { BOT_INDENT };
        lines.push(Line::from(vec![Span::raw(lead), Span::styled(text, style)]));
    }
}

fn push_user_lines(
    lines: &mut Vec<Line<'static>>,
    content: &str,
    bubble_width: usize,
    width: usize,
    theme: &Theme,
) {
    let style = Style::default().fg(theme.user).add_modifier(Modifier::BOLD);

    for text in wrap(content, bubble_width) {
        let pad = width.saturating_sub(text.width());
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(pad)),
            Span::styled(text, style),
        ]));
    }
}

fn greeting_lines(greeting: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let style = Style::default().fg(theme.muted);
    let mut lines = vec![Line::default()];
    for text in wrap(greeting, width) {
        let pad = width.saturating_sub(text.width()) / 2;
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(pad)),
            Span::styled(text, style),
        ]));
    }
    lines
}

/// First visible line for a list of `total` lines in a `height`-line view,
/// scrolled `offset` lines up from the bottom.
fn window_start(total: usize, height: usize, offset: usize) -> usize {
    let max_start = total.saturating_sub(height);
    max_start.saturating_sub(offset)
}

/// Scrollable message list.
pub struct Transcript<'a> {
    content: TranscriptContent<'a>,
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> Transcript<'a> {
    /// Create a new transcript widget.
    pub fn new(content: TranscriptContent<'a>, theme: &'a Theme) -> Self {
        Self {
            content,
            theme,
            scroll: 0,
        }
    }

    /// Lines scrolled up from the newest entry (0 shows the newest).
    #[must_use]
    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll = offset;
        self
    }
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = self.content.lines(area.width as usize, self.theme);
        let height = area.height as usize;
        let start = window_start(lines.len(), height, self.scroll);
        let visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(height).collect();

        Paragraph::new(visible)
            .style(Style::default().bg(self.theme.base))
            .render(area, buf);
    }
}
