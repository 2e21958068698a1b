//! Single-slot memoization.
//!
//! [`cached`] wraps a computation so that calling it again with equal arguments
//! returns the previous output instead of running the computation.
//! Only the most recent call is remembered, so older arguments are released as soon as they're superseded.
//!
//! ```
//! use recompute::{args, cached, props, Args};
//! use std::cell::Cell;
//!
//! let calls = Cell::new(0);
//! let area = cached(|args: &Args| {
//!     calls.set(calls.get() + 1);
//!     let size = &args[0];
//!     size.get("w").and_then(|w| w.as_number()).unwrap_or(0.)
//!         * size.get("h").and_then(|h| h.as_number()).unwrap_or(0.)
//! });
//!
//! assert_eq!(area.call(args![props! { "w" => 2, "h" => 3 }]), 6.);
//! assert_eq!(area.call(args![props! { "h" => 3, "w" => 2 }]), 6.);
//! assert_eq!(calls.get(), 1);
//! ```

use crate::{
    equality::{self, Equality, Overrides},
    Value,
};
use core::{cell::RefCell, convert::Infallible, ops::Deref};

/// Ordered argument list of one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Convert these arguments into a vector of values.
    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl Deref for Args {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

macro_rules! impl_args_for_tuples {
    ($($t:tt : $idx:tt),*) => {
        impl<$($t: Into<Value>),*> From<($($t,)*)> for Args {
            fn from(args: ($($t,)*)) -> Self {
                Self {
                    values: vec![$(args.$idx.into()),*],
                }
            }
        }
    };
}

impl_args_for_tuples!(T1:0);
impl_args_for_tuples!(T1:0, T2:1);
impl_args_for_tuples!(T1:0, T2:1, T3:2);
impl_args_for_tuples!(T1:0, T2:1, T3:2, T4:3);
impl_args_for_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4);
impl_args_for_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4, T6:5);
impl_args_for_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4, T6:5, T7:6);
impl_args_for_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4, T6:5, T7:6, T8:7);

/// Create an [`Args`] from a list of values.
///
/// ```
/// use recompute::{args, Value};
///
/// let args = args![1, "two", Value::Null];
/// assert_eq!(args.len(), 3);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        $crate::Args::from(::std::vec::Vec::<$crate::Value>::from([$($crate::Value::from($value)),*]))
    };
}

/// Memoizer factory.
///
/// Every [`Cached`] created by the same cache compares arguments with the same [`Equality`],
/// but each one keeps its own cell.
#[derive(Clone, Debug)]
pub struct Cache {
    equality: Equality,
}

impl Default for Cache {
    fn default() -> Self {
        Self::with_equality(equality::shared())
    }
}

impl Cache {
    /// Create a cache with the default [`Equality`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache with `overrides` layered over the default [`Equality`].
    pub fn with_overrides(overrides: Overrides) -> Self {
        Self::with_equality(equality::shared().with_overrides(overrides))
    }

    /// Create a cache comparing arguments with `equality`.
    pub fn with_equality(equality: Equality) -> Self {
        Self { equality }
    }

    /// Get the [`Equality`] of this cache.
    pub fn equality(&self) -> &Equality {
        &self.equality
    }

    /// Memoize a computation, see [`Cached::call`].
    pub fn cached<R, F>(&self, f: F) -> Cached<F, R>
    where
        F: Fn(&Args) -> R,
    {
        Cached::new(f, self.equality.clone())
    }

    /// Memoize a computation that takes a context, see [`Cached::call_with`].
    pub fn cached_method<C, R, F>(&self, f: F) -> Cached<F, R>
    where
        C: ?Sized,
        F: Fn(&C, &Args) -> R,
    {
        Cached::new(f, self.equality.clone())
    }

    /// Memoize a fallible computation, see [`Cached::try_call`].
    pub fn try_cached<R, E, F>(&self, f: F) -> Cached<F, R>
    where
        F: Fn(&Args) -> Result<R, E>,
    {
        Cached::new(f, self.equality.clone())
    }
}

/// Memoize a computation with the default [`Equality`].
pub fn cached<R, F>(f: F) -> Cached<F, R>
where
    F: Fn(&Args) -> R,
{
    Cache::default().cached(f)
}

/// Memoize a computation that takes a context with the default [`Equality`].
pub fn cached_method<C, R, F>(f: F) -> Cached<F, R>
where
    C: ?Sized,
    F: Fn(&C, &Args) -> R,
{
    Cache::default().cached_method(f)
}

/// Memoize a fallible computation with the default [`Equality`].
pub fn try_cached<R, E, F>(f: F) -> Cached<F, R>
where
    F: Fn(&Args) -> Result<R, E>,
{
    Cache::default().try_cached(f)
}

struct Entry<R> {
    args: Args,
    output: R,
}

/// Memoized computation.
///
/// The cell holding the last call is not thread-safe, so a `Cached` can't be shared between threads.
pub struct Cached<F, R> {
    f: F,
    equality: Equality,
    cell: RefCell<Option<Entry<R>>>,
}

impl<F, R> Cached<F, R> {
    fn new(f: F, equality: Equality) -> Self {
        Self {
            f,
            equality,
            cell: RefCell::new(None),
        }
    }

    /// Returns `true` if this computation hasn't completed a call yet (or was cleared).
    pub fn is_empty(&self) -> bool {
        self.cell.borrow().is_none()
    }

    /// Get the arguments of the most recent call.
    pub fn last_args(&self) -> Option<Args> {
        self.cell.borrow().as_ref().map(|entry| entry.args.clone())
    }

    /// Forget the most recent call.
    pub fn clear(&self) {
        self.cell.borrow_mut().take();
    }
}

impl<F, R: Clone> Cached<F, R> {
    /// Call the computation, or return the last output if `args` equal the last arguments.
    pub fn call(&self, args: impl Into<Args>) -> R
    where
        F: Fn(&Args) -> R,
    {
        match self.run(args.into(), |args| Ok::<_, Infallible>((self.f)(args))) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Call the computation with a context, or return the last output if `args` equal the last arguments.
    ///
    /// The context is passed through to the computation and is not part of the comparison.
    pub fn call_with<C>(&self, cx: &C, args: impl Into<Args>) -> R
    where
        C: ?Sized,
        F: Fn(&C, &Args) -> R,
    {
        match self.run(args.into(), |args| Ok::<_, Infallible>((self.f)(cx, args))) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Call a fallible computation, or return the last output if `args` equal the last arguments.
    ///
    /// An error is returned unchanged and leaves the last call in place.
    pub fn try_call<E>(&self, args: impl Into<Args>) -> Result<R, E>
    where
        F: Fn(&Args) -> Result<R, E>,
    {
        self.run(args.into(), |args| (self.f)(args))
    }

    fn run<E>(
        &self,
        args: Args,
        compute: impl FnOnce(&Args) -> Result<R, E>,
    ) -> Result<R, E> {
        if let Some(output) = self.lookup(&args) {
            #[cfg(feature = "tracing")]
            tracing::trace!("Cache hit ({} args)", args.len());

            // The new arguments replace the old ones either way.
            if let Some(entry) = &mut *self.cell.borrow_mut() {
                entry.args = args;
            }
            return Ok(output);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("Cache miss ({} args)", args.len());

        let output = compute(&args)?;

        *self.cell.borrow_mut() = Some(Entry {
            args,
            output: output.clone(),
        });

        Ok(output)
    }

    fn lookup(&self, args: &Args) -> Option<R> {
        let cell = self.cell.borrow();
        let entry = cell.as_ref()?;

        if self.equality.is_equal_args(args, &entry.args) {
            Some(entry.output.clone())
        } else {
            None
        }
    }
}
