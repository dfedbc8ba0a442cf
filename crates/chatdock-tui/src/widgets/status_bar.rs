//! Status line under the panel title.
//!
//! Format: `● Online │ Exported to chatdock-20260101_120000.md`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Status line content.
#[derive(Debug, Clone, Default)]
pub struct StatusBarContent {
    /// Presence text (e.g., "Online").
    pub status: String,
    /// Last send error, replaces the presence text while set.
    pub error: Option<String>,
    /// Transient notification (export result, etc.).
    pub notice: Option<String>,
}

/// Status line widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar widget.
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = match self.content.error {
            Some(ref error) => vec![
                Span::styled("● ", Style::default().fg(self.theme.error)),
                Span::styled(error.as_str(), Style::default().fg(self.theme.error)),
            ],
            None => vec![
                Span::styled("● ", Style::default().fg(self.theme.success)),
                Span::styled(
                    self.content.status.as_str(),
                    Style::default().fg(self.theme.text),
                ),
            ],
        };

        if let Some(ref notice) = self.content.notice {
            spans.push(Span::styled(" │ ", Style::default().fg(self.theme.muted)));
            spans.push(Span::styled(notice.as_str(), Style::default().fg(self.theme.muted)));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn render(content: &StatusBarContent) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(content, &theme).render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn test_shows_status() {
        let content = StatusBarContent {
            status: "Online".into(),
            ..Default::default()
        };
        assert_eq!(render(&content), "● Online");
    }

    #[test]
    fn test_error_replaces_status() {
        let content = StatusBarContent {
            status: "Online".into(),
            error: Some("the chat service responded with HTTP 500".into()),
            notice: None,
        };
        let text = render(&content);
        assert!(text.contains("HTTP 500"));
        assert!(!text.contains("Online"));
    }

    #[test]
    fn test_notice_appended() {
        let content = StatusBarContent {
            status: "Online".into(),
            error: None,
            notice: Some("Conversation cleared".into()),
        };
        assert_eq!(render(&content), "● Online │ Conversation cleared");
    }
}
