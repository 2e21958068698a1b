//! Debug output for [`ShouldUpdate`](crate::ShouldUpdate).
//!
//! A [`Debugger`] installed on a reporter logs the outcome of every check, and why:
//!
//! ```text
//! <Search>: should_update => true (cursors have changed)
//! <SearchBox key=query>: should_update => false
//! ```
//!
//! Lines go to the debugger's sink if it has one, or to [`tracing`](https://docs.rs/tracing)
//! at the `DEBUG` level when the `tracing` feature is enabled.
//! Without either, the debugger stays silent.

use crate::Error;
use regex::Regex;
use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

pub(crate) type DebugSlot = Rc<RefCell<Option<Rc<Debugger>>>>;

/// Debug logger for update checks.
#[derive(Default)]
pub struct Debugger {
    pattern: Option<Regex>,
    sink: Option<Box<dyn Fn(&str)>>,
}

impl Debugger {
    /// Create a debugger that logs every label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only log labels matching `pattern`.
    pub fn pattern(self, pattern: &str) -> Result<Self, Error> {
        Ok(self.regex(Regex::new(pattern)?))
    }

    /// Only log labels matching `regex`.
    pub fn regex(mut self, regex: Regex) -> Self {
        self.pattern = Some(regex);
        self
    }

    /// Send lines to `sink`.
    pub fn sink(mut self, sink: impl Fn(&str) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Returns `true` if lines for `label` pass the filter.
    pub fn is_match(&self, label: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(label))
    }

    /// Log `message` for `label`.
    pub fn log(&self, label: &str, message: &str) {
        if !self.is_match(label) {
            return;
        }

        let line = format!("<{label}>: {message}");
        match &self.sink {
            Some(sink) => sink(&line),
            None => emit(&line),
        }
    }
}

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(feature = "tracing")]
fn emit(line: &str) {
    tracing::debug!("{}", line);
}

#[cfg(not(feature = "tracing"))]
fn emit(line: &str) {
    let _ = line;
}

/// Guard for an installed [`Debugger`].
///
/// Dropping it uninstalls the debugger, unless another one was installed in the meantime.
#[must_use = "The debugger is uninstalled when this guard is dropped."]
pub struct DebugGuard {
    slot: Weak<RefCell<Option<Rc<Debugger>>>>,
    debugger: Rc<Debugger>,
}

impl DebugGuard {
    pub(crate) fn install(slot: &DebugSlot, debugger: Debugger) -> Self {
        let debugger = Rc::new(debugger);
        *slot.borrow_mut() = Some(debugger.clone());

        Self {
            slot: Rc::downgrade(slot),
            debugger,
        }
    }
}

impl Drop for DebugGuard {
    fn drop(&mut self) {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };

        let mut slot = slot.borrow_mut();
        if slot
            .as_ref()
            .is_some_and(|installed| Rc::ptr_eq(installed, &self.debugger))
        {
            *slot = None;
        }
    }
}

impl fmt::Debug for DebugGuard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DebugGuard")
            .field("debugger", &self.debugger)
            .finish_non_exhaustive()
    }
}
