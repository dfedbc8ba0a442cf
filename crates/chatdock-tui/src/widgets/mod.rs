//! Widgets for the chat dock.
//!
//! This module provides:
//! - [`Launcher`] - Closed-state button
//! - [`ChatPanel`] - Open panel composing the widgets below
//! - [`StatusBar`] - Status line under the panel title
//! - [`Transcript`] - Scrollable message list
//! - [`InputBar`] - Message input box
//! - [`HelpOverlay`] - Key binding reference

mod help;
mod input_bar;
mod launcher;
mod panel;
mod status_bar;
mod transcript;

pub use help::HelpOverlay;
pub use input_bar::InputBar;
pub use launcher::Launcher;
pub use panel::ChatPanel;
pub use status_bar::{StatusBar, StatusBarContent};
pub use transcript::{Transcript, TranscriptContent};
