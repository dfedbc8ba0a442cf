//! Transcript export.

use crate::message::{Message, Role};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

/// Render a transcript as markdown.
pub fn render_transcript(
    title: &str,
    messages: &[Message],
    exported_at: DateTime<Local>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {title}");
    let _ = writeln!(out);
    let _ = writeln!(out, "_Exported {}_", exported_at.format("%Y-%m-%d %H:%M:%S"));

    for message in messages {
        let author = match message.role {
            Role::User => "You",
            Role::Bot => "Bot",
        };
        let _ = write!(out, "\n**{author}:** {}\n", message.content);
    }

    out
}

/// Write the transcript to `chatdock-YYYYMMDD_HHMMSS.md` inside `dir`.
///
/// Existing files are never overwritten: a later export in the same second
/// gets a `-1`, `-2`, ... suffix. Returns the path of the written file.
pub fn export_transcript(
    dir: &Path,
    title: &str,
    messages: &[Message],
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;

    let now = Local::now();
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let body = render_transcript(title, messages, now);

    let mut attempt = 0u32;
    loop {
        let filename = if attempt == 0 {
            format!("chatdock-{stamp}.md")
        } else {
            format!("chatdock-{stamp}-{attempt}.md")
        };
        let path = dir.join(filename);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(body.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Errors that can occur exporting a transcript.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
