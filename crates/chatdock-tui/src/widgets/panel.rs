//! Open chat panel: title border with close button, status line, message
//! list and input row.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use super::{InputBar, StatusBar, StatusBarContent, Transcript, TranscriptContent};
use crate::input::TextInputState;
use crate::layout::panel_layout;
use crate::theme::Theme;

/// Close affordance drawn on the top border.
const CLOSE_LABEL: &str = "[✕]";

/// Send button label.
const SEND_LABEL: &str = "➤";

/// Chat panel widget.
pub struct ChatPanel<'a> {
    title: &'a str,
    status: &'a StatusBarContent,
    transcript: TranscriptContent<'a>,
    scroll: usize,
    input: &'a TextInputState,
    placeholder: &'a str,
    theme: &'a Theme,
}

impl<'a> ChatPanel<'a> {
    /// Create a new panel widget.
    pub fn new(
        title: &'a str,
        status: &'a StatusBarContent,
        transcript: TranscriptContent<'a>,
        input: &'a TextInputState,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            status,
            transcript,
            scroll: 0,
            input,
            placeholder: "",
            theme,
        }
    }

    /// Transcript scroll offset from the newest line.
    #[must_use]
    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll = offset;
        self
    }

    /// Input placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_focused))
            .title(format!(" 🤖 {} ", self.title))
            .title_style(
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(self.theme.base));
        block.render(area, buf);

        let regions = panel_layout(area);
        if regions.close.width as usize >= CLOSE_LABEL.chars().count() {
            buf.set_string(
                regions.close.x,
                regions.close.y,
                CLOSE_LABEL,
                Style::default().fg(self.theme.muted),
            );
        }

        StatusBar::new(self.status, self.theme).render(regions.header, buf);

        Transcript::new(self.transcript, self.theme)
            .scroll(self.scroll)
            .render(regions.transcript, buf);

        let loading = self.transcript.loading;
        InputBar::new(self.input, self.theme)
            .placeholder(self.placeholder)
            .disabled(loading)
            .render(regions.input, buf);

        let send_enabled = !loading && !self.input.is_blank();
        let send_color = if send_enabled {
            self.theme.primary
        } else {
            self.theme.muted
        };
        Paragraph::new(SEND_LABEL)
            .alignment(Alignment::Center)
            .style(Style::default().fg(send_color).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(send_color)),
            )
            .render(regions.send, buf);
    }
}
