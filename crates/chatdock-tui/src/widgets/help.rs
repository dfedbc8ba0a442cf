//! Key binding reference overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::layout::centered_fixed;
use crate::theme::Theme;

const HELP_TEXT: &str = r"
  Closed
    Enter / Space / c    Open the chat
    q / Esc              Quit

  Open
    Enter / Ctrl+S       Send message
    Esc                  Close the chat
    Up / Down            Recall sent input
    PgUp / PgDn          Scroll messages
    Ctrl+L               Clear conversation
    Ctrl+E               Export transcript
    Ctrl+C               Quit
    F1                   Toggle this help

  [Press any key to close]
";

/// Centered help overlay.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 50.min(area.width.saturating_sub(4));
        let height = 20.min(area.height.saturating_sub(2));
        let overlay_area = centered_fixed(width, height, area);

        Clear.render(overlay_area, buf);

        let block = Block::default()
            .title(" Help ")
            .title_style(
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.base).fg(self.theme.text));

        Paragraph::new(HELP_TEXT).block(block).render(overlay_area, buf);
    }
}
