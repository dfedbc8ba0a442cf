//! Catppuccin color palettes for the widget.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub user: Color,
    pub bot: Color,

    // Semantic
    pub success: Color,
    pub error: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Look up a theme by name (`mocha`, `latte`, `high-contrast`).
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "mocha" => Some(Self::mocha()),
            "latte" => Some(Self::latte()),
            "high-contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            text: Color::Rgb(205, 214, 244),  // #cdd6f4
            muted: Color::Rgb(108, 112, 134), // #6c7086

            primary: Color::Rgb(137, 180, 250), // #89b4fa (blue)
            user: Color::Rgb(137, 180, 250),    // #89b4fa (blue)
            bot: Color::Rgb(205, 214, 244),     // #cdd6f4

            success: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
            error: Color::Rgb(243, 139, 168),   // #f38ba8 (red)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(137, 180, 250), // #89b4fa
        }
    }

    /// Catppuccin Latte theme (light theme).
    pub fn latte() -> Self {
        Self {
            base: Color::Rgb(239, 241, 245),    // #eff1f5
            surface: Color::Rgb(230, 233, 239), // #e6e9ef

            text: Color::Rgb(76, 79, 105),    // #4c4f69
            muted: Color::Rgb(140, 143, 161), // #8c8fa1

            primary: Color::Rgb(30, 102, 245), // #1e66f5 (blue)
            user: Color::Rgb(30, 102, 245),    // #1e66f5
            bot: Color::Rgb(76, 79, 105),      // #4c4f69

            success: Color::Rgb(64, 160, 43), // #40a02b (green)
            error: Color::Rgb(210, 15, 57),   // #d20f39 (red)

            border: Color::Rgb(188, 192, 204),        // #bcc0cc
            border_focused: Color::Rgb(30, 102, 245), // #1e66f5
        }
    }

    /// High contrast theme for accessibility.
    pub fn high_contrast() -> Self {
        Self {
            base: Color::Black,
            surface: Color::Rgb(20, 20, 20),

            text: Color::White,
            muted: Color::Rgb(150, 150, 150),

            primary: Color::Cyan,
            user: Color::Cyan,
            bot: Color::White,

            success: Color::Green,
            error: Color::Red,

            border: Color::White,
            border_focused: Color::Cyan,
        }
    }
}
