use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use epochpeek_core::{Clipboard, HostError};

/// Copies text through the OSC 52 escape sequence, which most terminal
/// emulators forward to the system clipboard.
pub struct OscClipboard;

impl OscClipboard {
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

impl Clipboard for OscClipboard {
    fn write_text(&self, text: &str) -> Result<(), HostError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(Self::sequence(text).as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|err| HostError::Clipboard(err.to_string()))
    }
}

/// One line of input in `watch` mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchInput<'a> {
    Selection(&'a str),
    PointerUp(&'a str),
    Copy,
    Quit,
}

impl<'a> WatchInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim_end() {
            ":quit" | ":q" => WatchInput::Quit,
            ":copy" => WatchInput::Copy,
            other => match other.strip_prefix(":up") {
                Some(rest) if rest.is_empty() || rest.starts_with(' ') => {
                    WatchInput::PointerUp(rest.trim_start())
                }
                _ => WatchInput::Selection(line),
            },
        }
    }
}
