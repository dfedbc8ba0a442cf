//! Layout helpers for the chatdock widget.
//!
//! The widget floats in the bottom-right corner of the terminal: a small
//! launcher button when closed, a fixed-size panel when open. Both rendering
//! and mouse hit-testing go through these functions so they always agree.

use ratatui::layout::{Position, Rect};

/// Launcher button size.
pub const LAUNCHER_WIDTH: u16 = 10;
pub const LAUNCHER_HEIGHT: u16 = 3;

/// Preferred panel size. Smaller terminals get the whole screen.
pub const PANEL_WIDTH: u16 = 56;
pub const PANEL_HEIGHT: u16 = 24;

/// Gap between the widget and the terminal edge.
const MARGIN_X: u16 = 2;
const MARGIN_Y: u16 = 1;

/// Height of the status line under the panel border.
const HEADER_HEIGHT: u16 = 1;

/// Height of the input row (bordered).
pub const INPUT_HEIGHT: u16 = 3;

/// Width of the send button.
const SEND_WIDTH: u16 = 7;

/// Anchor a `width` x `height` rect to the bottom-right corner of `area`.
pub fn bottom_right(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let margin_x = if area.width >= width + MARGIN_X { MARGIN_X } else { 0 };
    let margin_y = if area.height >= height + MARGIN_Y { MARGIN_Y } else { 0 };
    Rect::new(
        area.x + area.width - width - margin_x,
        area.y + area.height - height - margin_y,
        width,
        height,
    )
}

/// Where the launcher button goes.
pub fn launcher_area(area: Rect) -> Rect {
    bottom_right(LAUNCHER_WIDTH, LAUNCHER_HEIGHT, area)
}

/// Where the open panel goes.
pub fn panel_area(area: Rect) -> Rect {
    bottom_right(PANEL_WIDTH, PANEL_HEIGHT, area)
}

/// Regions inside the open panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    /// Close affordance on the top border.
    pub close: Rect,
    /// Status line.
    pub header: Rect,
    /// Scrollable message list.
    pub transcript: Rect,
    /// Text input box.
    pub input: Rect,
    /// Send button next to the input.
    pub send: Rect,
}

/// Split a panel rect into its regions.
pub fn panel_layout(panel: Rect) -> PanelLayout {
    let close = Rect::new(
        (panel.x + panel.width).saturating_sub(5).max(panel.x),
        panel.y,
        3.min(panel.width),
        1.min(panel.height),
    );

    let inner = Rect::new(
        panel.x.saturating_add(1),
        panel.y.saturating_add(1),
        panel.width.saturating_sub(2),
        panel.height.saturating_sub(2),
    );

    let header_height = HEADER_HEIGHT.min(inner.height);
    let input_height = INPUT_HEIGHT.min(inner.height - header_height);
    let transcript_height = inner.height - header_height - input_height;

    let header = Rect::new(inner.x, inner.y, inner.width, header_height);
    let transcript = Rect::new(inner.x, inner.y + header_height, inner.width, transcript_height);

    let row_y = inner.y + header_height + transcript_height;
    let send_width = SEND_WIDTH.min(inner.width);
    let input = Rect::new(inner.x, row_y, inner.width - send_width, input_height);
    let send = Rect::new(inner.x + input.width, row_y, send_width, input_height);

    PanelLayout {
        close,
        header,
        transcript,
        input,
        send,
    }
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Whether a terminal cell lies inside `rect`.
pub fn hit(rect: Rect, column: u16, row: u16) -> bool {
    rect.contains(Position::new(column, row))
}
