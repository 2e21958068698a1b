//! Update checks for views.
//!
//! [`ShouldUpdate`] decides if a view needs to recompute,
//! given its current props and state and the next ones.
//! Checks run in order, stopping at the first difference:
//!
//! 1. Props and state that are the same values as before never need an update.
//! 2. State is compared with [`Equality::is_equal_state`].
//! 3. Props are compared field by field with [`Equality::is_equal`],
//!    leaving out ignorable fields (`statics` and `children` by default).
//!
//! ```
//! use recompute::{props, Instance, ShouldUpdate, Value};
//!
//! let should_update = ShouldUpdate::default();
//! let props = props! { "foo" => 1, "children" => "a" };
//! let instance = Instance::new(&props, &Value::Undefined);
//!
//! assert!(!should_update.should_update(
//!     &instance,
//!     &props! { "foo" => 1, "children" => "b" },
//!     &Value::Undefined,
//! ));
//! assert!(should_update.should_update(&instance, &props! { "foo" => 2 }, &Value::Undefined));
//! ```

use crate::{
    debug::{DebugGuard, DebugSlot, Debugger},
    equality::{self, Equality, Overrides},
    Map, Value,
};
use std::{fmt, rc::Rc};

/// Current inputs of a view.
#[derive(Clone, Copy, Debug)]
pub struct Instance<'a> {
    /// Current props.
    pub props: &'a Value,
    /// Current state.
    pub state: &'a Value,
    /// Display name of the view.
    pub name: Option<&'a str>,
    /// Key of the view.
    pub key: Option<&'a str>,
}

impl<'a> Instance<'a> {
    /// Create an unnamed instance.
    pub fn new(props: &'a Value, state: &'a Value) -> Self {
        Self {
            props,
            state,
            name: None,
            key: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Set the key.
    pub fn with_key(mut self, key: &'a str) -> Self {
        self.key = Some(key);
        self
    }

    /// Label used for debug output, e.g. `Search key=query`.
    pub fn label(&self) -> String {
        match (self.name, self.key) {
            (Some(name), Some(key)) => format!("{name} key={key}"),
            (Some(name), None) => name.to_owned(),
            (None, Some(key)) => format!(" key={key}"),
            (None, None) => String::from("Unknown"),
        }
    }
}

/// Outcome of an update check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Props and state are the same values as before.
    Identical,
    /// State has changed.
    StateChanged,
    /// Props have a different set of fields.
    KeysChanged,
    /// A cursor prop points at a different value.
    CursorsChanged,
    /// A plain prop has changed.
    PropsChanged,
    /// Nothing tracked has changed.
    Unchanged,
}

impl Reason {
    /// Returns `true` if the view needs to recompute.
    pub fn should_update(self) -> bool {
        !matches!(self, Reason::Identical | Reason::Unchanged)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Reason::Identical | Reason::Unchanged => "false",
            Reason::StateChanged => "true (state has changed)",
            Reason::KeysChanged => "true (props have different keys)",
            Reason::CursorsChanged => "true (cursors have changed)",
            Reason::PropsChanged => "true (props have changed)",
        };
        f.write_str(s)
    }
}

/// Update check for views.
///
/// Clones share the same [`Debugger`].
#[derive(Clone, Debug)]
pub struct ShouldUpdate {
    equality: Equality,
    debugger: DebugSlot,
}

impl Default for ShouldUpdate {
    fn default() -> Self {
        Self::with_equality(equality::shared())
    }
}

impl ShouldUpdate {
    /// Create an update check with the default [`Equality`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an update check comparing with `equality`.
    pub fn with_equality(equality: Equality) -> Self {
        Self {
            equality,
            debugger: Rc::default(),
        }
    }

    /// Create a new update check with `overrides` layered over this one's [`Equality`].
    ///
    /// The new check starts without a debugger.
    pub fn with_overrides(&self, overrides: Overrides) -> Self {
        Self::with_equality(self.equality.with_overrides(overrides))
    }

    /// Get the [`Equality`] of this check.
    pub fn equality(&self) -> &Equality {
        &self.equality
    }

    /// Install `debugger` on this check, replacing any other one.
    pub fn debug(&self, debugger: Debugger) -> DebugGuard {
        DebugGuard::install(&self.debugger, debugger)
    }

    /// Returns `true` if a view with the current inputs of `instance` needs to recompute
    /// for `next_props` and `next_state`.
    pub fn should_update(
        &self,
        instance: &Instance,
        next_props: &Value,
        next_state: &Value,
    ) -> bool {
        self.check(instance, next_props, next_state).should_update()
    }

    /// Check if a view needs to recompute, and why.
    pub fn check(&self, instance: &Instance, next_props: &Value, next_state: &Value) -> Reason {
        let reason = self.classify(instance, next_props, next_state);

        // Clone the handle out so a debugger's sink can call back into this check.
        let debugger = self.debugger.borrow().clone();
        if let Some(debugger) = debugger {
            debugger.log(&instance.label(), &format!("should_update => {reason}"));
        }

        reason
    }

    fn classify(&self, instance: &Instance, next_props: &Value, next_state: &Value) -> Reason {
        if instance.props.is_same(next_props) && instance.state.is_same(next_state) {
            return Reason::Identical;
        }

        if !self.equality.is_equal_state(instance.state, next_state) {
            return Reason::StateChanged;
        }

        self.compare_props(&self.tracked(instance.props), &self.tracked(next_props))
    }

    fn compare_props(&self, current: &Map, next: &Map) -> Reason {
        if current.len() != next.len() || current.keys().any(|key| !next.contains_key(key)) {
            return Reason::KeysChanged;
        }

        let mut is_changed = false;
        for (key, current) in current {
            let Some(next) = next.get(key) else {
                continue;
            };

            if self.equality.is_equal(current, next) {
                continue;
            }

            if self.equality.is_cursor(current) || self.equality.is_cursor(next) {
                return Reason::CursorsChanged;
            }
            is_changed = true;
        }

        if is_changed {
            Reason::PropsChanged
        } else {
            Reason::Unchanged
        }
    }

    fn tracked(&self, props: &Value) -> Map {
        props
            .as_map()
            .map(|map| {
                map.iter()
                    .filter(|(key, value)| !self.equality.is_ignorable(key, value))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
