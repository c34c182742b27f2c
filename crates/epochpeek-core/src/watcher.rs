use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use epochpeek_parser::inspect;
use tracing::{debug, info};

use crate::scheduler::{Scheduler, TimerHandle};
use crate::settings::Settings;
use crate::status_bar::DisplaySink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    /// At least one settle timer is running.
    Pending,
    Displayed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    SelectionChanged,
    PointerUp,
}

struct Armed<H> {
    generation: u64,
    handle: H,
}

struct Inner<H> {
    latest_selection: String,
    displayed: Option<String>,
    generation: u64,
    selection_timer: Option<Armed<H>>,
    pointer_timer: Option<Armed<H>>,
}

impl<H: TimerHandle> Inner<H> {
    fn slot(&mut self, trigger: Trigger) -> &mut Option<Armed<H>> {
        match trigger {
            Trigger::SelectionChanged => &mut self.selection_timer,
            Trigger::PointerUp => &mut self.pointer_timer,
        }
    }

    fn state(&self) -> WatchState {
        if self.selection_timer.is_some() || self.pointer_timer.is_some() {
            return WatchState::Pending;
        }
        match &self.displayed {
            Some(text) => WatchState::Displayed(text.clone()),
            None => WatchState::Idle,
        }
    }
}

/// Turns a stream of selection events into debounced display updates.
///
/// Selection changes and pointer releases each own one timer; a new event
/// of the same kind cancels and replaces the previous timer. When a timer
/// fires, the most recent selection is parsed and the result is sent to the
/// sink. Blank selections leave the display untouched.
///
/// The sink is called with the watcher's lock held and must not call back
/// into the watcher.
pub struct SelectionWatcher<S: Scheduler> {
    scheduler: S,
    sink: Arc<dyn DisplaySink>,
    settings: Settings,
    inner: Arc<Mutex<Inner<S::Handle>>>,
}

impl<S: Scheduler> SelectionWatcher<S> {
    pub fn new(scheduler: S, sink: Arc<dyn DisplaySink>, settings: Settings) -> Self {
        Self {
            scheduler,
            sink,
            settings,
            inner: Arc::new(Mutex::new(Inner {
                latest_selection: String::new(),
                displayed: None,
                generation: 0,
                selection_timer: None,
                pointer_timer: None,
            })),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> WatchState {
        lock(&self.inner).state()
    }

    pub fn on_selection_changed(&self, text: &str) {
        self.arm(Trigger::SelectionChanged, text, self.settings.selection_debounce());
    }

    pub fn on_pointer_up(&self, text: &str) {
        self.arm(Trigger::PointerUp, text, self.settings.pointer_settle());
    }

    /// Cancels outstanding timers and forgets the displayed value.
    pub fn shutdown(&self) {
        let mut inner = lock(&self.inner);
        for trigger in [Trigger::SelectionChanged, Trigger::PointerUp] {
            if let Some(armed) = inner.slot(trigger).take() {
                armed.handle.cancel();
            }
        }
        inner.displayed = None;
        debug!("selection watcher shut down");
    }

    fn arm(&self, trigger: Trigger, text: &str, delay: Duration) {
        let mut inner = lock(&self.inner);
        inner.latest_selection.clear();
        inner.latest_selection.push_str(text);
        inner.generation += 1;
        let generation = inner.generation;

        if let Some(previous) = inner.slot(trigger).take() {
            previous.handle.cancel();
        }

        let weak = Arc::downgrade(&self.inner);
        let sink = Arc::clone(&self.sink);
        let log_selection = self.settings.debug;
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || settle(weak, sink, trigger, generation, log_selection)),
        );
        *inner.slot(trigger) = Some(Armed { generation, handle });
        debug!(?trigger, ?delay, "settle timer armed");
    }
}

impl<S: Scheduler> Drop for SelectionWatcher<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn settle<H: TimerHandle>(
    inner: Weak<Mutex<Inner<H>>>,
    sink: Arc<dyn DisplaySink>,
    trigger: Trigger,
    generation: u64,
    log_selection: bool,
) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let mut inner = lock(&inner);
    let current = inner
        .slot(trigger)
        .as_ref()
        .map(|armed| armed.generation);
    if current != Some(generation) {
        // superseded or cancelled after the callback was already queued
        return;
    }
    *inner.slot(trigger) = None;

    let selection = inner.latest_selection.clone();
    if selection.trim().is_empty() {
        return;
    }

    if log_selection {
        info!(selected = %selection, "Selected text");
    }

    let result = match inspect(&selection) {
        Ok(extraction) => Some(extraction.to_iso8601()),
        Err(rejection) => {
            debug!(reason = %rejection, "no timestamp in selection");
            None
        }
    };

    // Still under the lock, so the sink sees updates in the same order as
    // `displayed` and never after `shutdown`.
    sink.display(result.as_deref());
    inner.displayed = result;
}

fn lock<H>(inner: &Mutex<Inner<H>>) -> MutexGuard<'_, Inner<H>> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
