use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::error::Result;

pub const COPIED_NOTICE: &str = "Timestamp copied to clipboard";

/// Receives the outcome of each settled selection.
pub trait DisplaySink: Send + Sync {
    fn display(&self, result: Option<&str>);
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied(String),
    Nothing,
}

impl CopyOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            CopyOutcome::Copied(_) => Some(COPIED_NOTICE),
            CopyOutcome::Nothing => None,
        }
    }
}

type Listener = Box<dyn Fn(&str) + Send + Sync>;

/// A single line of status text. Empty means nothing is shown.
#[derive(Default)]
pub struct StatusBar {
    text: Mutex<String>,
    listener: Option<Listener>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `listener` with the new text whenever it changes.
    pub fn with_listener<F>(listener: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            text: Mutex::new(String::new()),
            listener: Some(Box::new(listener)),
        }
    }

    pub fn text(&self) -> String {
        self.lock().clone()
    }

    pub fn set_text(&self, text: &str) {
        {
            let mut current = self.lock();
            if *current == text {
                return;
            }
            current.clear();
            current.push_str(text);
        }
        if let Some(listener) = &self.listener {
            listener(text);
        }
    }

    pub fn copy(&self, clipboard: &dyn Clipboard) -> Result<CopyOutcome> {
        let text = self.text();
        if text.is_empty() {
            debug!("status bar is empty, nothing to copy");
            return Ok(CopyOutcome::Nothing);
        }
        clipboard.write_text(&text)?;
        info!(%text, "copied status text");
        Ok(CopyOutcome::Copied(text))
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplaySink for StatusBar {
    fn display(&self, result: Option<&str>) {
        self.set_text(result.unwrap_or(""));
    }
}
