pub mod error;
pub mod scheduler;
pub mod settings;
pub mod status_bar;
pub mod watcher;

pub use error::{HostError, Result};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
pub use settings::Settings;
pub use status_bar::{Clipboard, CopyOutcome, DisplaySink, StatusBar};
pub use watcher::{SelectionWatcher, WatchState};
