//! Floating launcher button shown while the panel is closed.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::theme::Theme;

/// Launcher label.
const LABEL: &str = "💬 Chat";

/// Rounded button that opens the chat panel.
pub struct Launcher<'a> {
    theme: &'a Theme,
}

impl<'a> Launcher<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for Launcher<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.primary))
            .style(Style::default().bg(self.theme.surface));

        Paragraph::new(LABEL)
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            )
            .block(block)
            .render(area, buf);
    }
}
