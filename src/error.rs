use crate::value::{Key, Kind};
use thiserror::Error;

/// Error type for [`recompute`](crate).
///
/// Comparisons never fail, these only come from configuring a [`Debugger`](crate::Debugger)
/// or updating a [`Frozen`](crate::store::Frozen) structure.
#[derive(Debug, Error)]
pub enum Error {
    /// The debug filter pattern is not a valid regular expression.
    #[error("invalid debug pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An update tried to step into a value that isn't a collection.
    #[error("cannot set `{key}` inside a value of kind {kind}")]
    Path {
        /// Key that couldn't be set.
        key: Key,
        /// Kind of the value found at that point of the path.
        kind: Kind,
    },

    /// A list update pointed past the end of the list.
    #[error("index {index} is out of bounds for a list of length {len}")]
    Index {
        /// Requested index.
        index: usize,
        /// Length of the list.
        len: usize,
    },
}
