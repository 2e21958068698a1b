//! # Recompute
//! Recompute decides when a view needs to run again.
//!
//! It provides a structural [`Equality`] engine that understands cursors and immutable structures,
//! a single-slot memoizer built on top of it ([`cached`]),
//! and an update check for views that reports why an update is needed ([`ShouldUpdate`]).
//!
//! ```
//! use recompute::prelude::*;
//!
//! let label = cached(|args: &Args| format!("{} items", args[0].as_list().map_or(0, |l| l.len())));
//!
//! let items = Value::list([1, 2, 3]);
//! assert_eq!(label.call((items.clone(),)), "3 items");
//!
//! // An equal list returns the cached label without running the closure.
//! assert_eq!(label.call((Value::list([1, 2, 3]),)), "3 items");
//! ```
//!
//! ## Cursors and immutable structures
//! Values are classified on every comparison.
//! [`Cursor`]s compare by the value they point at, immutable [`Object`]s compare by reference,
//! and everything else compares structurally.
//! See the [`equality`] module for the full algorithm, and [`store`] for the built-in immutable structure.
//!
//! ## Features
//! - `tracing`: Log debug output and cache hits with [`tracing`](https://docs.rs/tracing) (enabled by default).
//! - `serde`: Serialize [`Value`]s with [`serde`](https://docs.rs/serde).

#![deny(missing_docs)]

/// Prelude of commonly-used types, functions and macros.
/// `use recompute::prelude::*;`
pub mod prelude {
    pub use crate::{
        args, cached, cached_method, props, try_cached, Args, Cache, Cached, Cursor, Debugger,
        Equality, Instance, Map, Object, Overrides, Props, Reason, ShouldUpdate, Value,
    };
}

pub mod cached;
pub use self::cached::{cached, cached_method, try_cached, Args, Cache, Cached};

pub mod debug;
pub use self::debug::{DebugGuard, Debugger};

pub mod equality;
pub use self::equality::{Equality, Overrides};

mod error;
pub use self::error::Error;

pub mod should_update;
pub use self::should_update::{Instance, Reason, ShouldUpdate};

pub mod store;

pub mod value;
pub use self::value::{Cursor, Key, Kind, Map, Object, Value};

/// Derive a conversion from a struct into a [`Value::Map`] of its fields.
///
/// Every field type must implement `Into<Value>`.
///
/// ```
/// use recompute::{Props, Value};
///
/// #[derive(Props)]
/// struct Search {
///     query: String,
///     #[recompute(rename = "maxResults")]
///     max_results: u32,
///     #[recompute(skip)]
///     _cache: Vec<u8>,
/// }
///
/// let props = Value::from(Search {
///     query: String::from("rust"),
///     max_results: 10,
///     _cache: Vec::new(),
/// });
/// assert_eq!(props.get("query").and_then(Value::as_str), Some("rust"));
/// assert_eq!(props.get("maxResults").and_then(Value::as_number), Some(10.));
/// assert!(props.get("_cache").is_none());
/// ```
pub use recompute_macros::Props;
