//! Message input box.
//!
//! Single line; the view scrolls horizontally to keep the cursor visible.
//! Disabled (dimmed, no cursor) while a reply is pending.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::input::TextInputState;
use crate::theme::Theme;

/// Input box bound to a [`TextInputState`].
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    placeholder: &'a str,
    disabled: bool,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            placeholder: "",
            disabled: false,
        }
    }

    /// Text shown while the input is empty.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set whether the input accepts edits.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Build the visible line for a text area `width` columns wide.
    fn build_line(&self, width: usize) -> Line<'static> {
        if self.input.is_empty() {
            let mut spans = Vec::new();
            if !self.disabled {
                spans.push(Span::raw("█"));
            }
            spans.push(Span::styled(
                self.placeholder.to_string(),
                Style::default().fg(self.theme.muted),
            ));
            return Line::from(spans);
        }

        let chars: Vec<char> = self.input.content().chars().collect();
        let cursor = self.input.cursor().min(chars.len());
        let start = visible_start(&chars, cursor, width);

        let style = if self.disabled {
            Style::default().fg(self.theme.muted)
        } else {
            Style::default().fg(self.theme.text)
        };

        let before: String = chars[start..cursor].iter().collect();
        let after: String = chars[cursor..].iter().collect();

        if self.disabled {
            return Line::from(Span::styled(format!("{before}{after}"), style));
        }

        Line::from(vec![
            Span::styled(before, style),
            Span::raw("█"),
            Span::styled(after, style),
        ])
    }
}

/// First character to show so the cursor (plus its block) fits in `width`.
fn visible_start(chars: &[char], cursor: usize, width: usize) -> usize {
    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut start = cursor;
    while start > 0 {
        let w = chars[start - 1].width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start -= 1;
    }
    start
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.disabled {
            Style::default().fg(self.theme.border)
        } else {
            Style::default().fg(self.theme.border_focused)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let line = self.build_line(inner.width as usize);
        Paragraph::new(line).render(inner, buf);
    }
}
