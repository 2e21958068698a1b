//! Immutable structures and cursors into them.
//!
//! [`Frozen`] is a persistent value: every update returns a new structure,
//! copying only the path to the changed entry so untouched subtrees keep their identity.
//!
//! [`PathCursor`] points at a path inside a [`Frozen`] root.
//! Dereferencing it yields the value currently at that path:
//!
//! ```
//! use recompute::{props, store::PathCursor, Cursor};
//!
//! let cursor = PathCursor::from_value(props! { "x" => 0, "y" => 0 });
//! let moved = cursor.set("x", 2).unwrap();
//!
//! assert_eq!(cursor.get("x").unwrap().as_number(), Some(0.));
//! assert_eq!(moved.get("x").unwrap().as_number(), Some(2.));
//! assert!(!cursor.deref().is_same(&moved.deref()));
//! ```

use crate::{
    value::{Cursor, Key, Object},
    Error, Map, Value,
};
use std::{any::Any, rc::Rc};

/// Immutable structure.
///
/// Compared by reference by [`Equality`](crate::Equality): a changed structure is always a new value.
/// Clones of an unchanged structure share their contents and stay the same reference,
/// no matter how many times they are wrapped in a [`Value`].
#[derive(Clone, Debug, Default)]
pub struct Frozen {
    value: Value,
}

impl Frozen {
    /// Freeze a value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the underlying value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the entry at `key`.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.value.get_key(&key.into())
    }

    /// Get the entry at `path`.
    pub fn get_in(&self, path: &[Key]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.value, |value, key| value.get_key(key))
    }

    /// Get a frozen view of the collection at `key`.
    pub fn child(&self, key: impl Into<Key>) -> Option<Frozen> {
        self.get(key).cloned().map(Frozen::new)
    }

    /// Return a new structure with `key` set to `value`.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<Frozen, Error> {
        self.set_in(&[key.into()], value)
    }

    /// Return a new structure with the entry at `path` set to `value`.
    ///
    /// Missing maps along the path are created.
    /// Lists may only be replaced in place or extended by one item.
    pub fn set_in(&self, path: &[Key], value: impl Into<Value>) -> Result<Frozen, Error> {
        assoc(&self.value, path, value.into()).map(Frozen::new)
    }

    /// Return a new structure with the entry at `path` replaced by the output of `f`.
    pub fn update_in(
        &self,
        path: &[Key],
        f: impl FnOnce(&Value) -> Value,
    ) -> Result<Frozen, Error> {
        let current = self.get_in(path).cloned().unwrap_or_default();
        self.set_in(path, f(&current))
    }

    /// Wrap this structure in a [`Value`].
    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

fn assoc(target: &Value, path: &[Key], value: Value) -> Result<Value, Error> {
    let Some((key, rest)) = path.split_first() else {
        return Ok(value);
    };

    match (target, key) {
        (Value::Map(map), Key::Field(field)) => {
            let child = map.get(&**field).cloned().unwrap_or_default();
            let child = assoc(&child, rest, value)?;

            let mut map = Map::clone(map);
            map.insert(field.clone(), child);
            Ok(Value::from(map))
        }
        (Value::Undefined, Key::Field(field)) => {
            let child = assoc(&Value::Undefined, rest, value)?;

            let mut map = Map::new();
            map.insert(field.clone(), child);
            Ok(Value::from(map))
        }
        (Value::List(items), Key::Index(index)) => {
            let len = items.len();
            if *index > len {
                return Err(Error::Index { index: *index, len });
            }

            let child = items.get(*index).cloned().unwrap_or_default();
            let child = assoc(&child, rest, value)?;

            let mut items = Vec::clone(items);
            if *index == len {
                items.push(child);
            } else {
                items[*index] = child;
            }
            Ok(Value::List(Rc::new(items)))
        }
        (target, key) => Err(Error::Path {
            key: key.clone(),
            kind: target.kind(),
        }),
    }
}

impl Object for Frozen {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_immutable(&self) -> bool {
        true
    }

    fn is_same_object(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<Frozen>()
            .is_some_and(|other| self.value.is_same(&other.value))
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<Frozen>()
            .is_some_and(|other| self.value == other.value)
    }

    fn to_value(&self) -> Option<Value> {
        Some(self.value.clone())
    }
}

impl From<Frozen> for Value {
    fn from(value: Frozen) -> Self {
        value.into_value()
    }
}

/// Cursor into a [`Frozen`] structure.
///
/// Updating through a cursor never touches the original root,
/// it returns a new cursor over a new root instead.
#[derive(Clone, Debug)]
pub struct PathCursor {
    root: Frozen,
    path: Rc<[Key]>,
}

impl PathCursor {
    /// Create a cursor pointing at the root of `root`.
    pub fn new(root: Frozen) -> Self {
        Self::with_path(root, Vec::<Key>::new())
    }

    /// Freeze `value` and create a cursor pointing at its root.
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self::new(Frozen::new(value))
    }

    /// Create a cursor pointing at `path` inside `root`.
    pub fn with_path<K: Into<Key>>(root: Frozen, path: impl IntoIterator<Item = K>) -> Self {
        Self {
            root,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the root structure of this cursor.
    pub fn root(&self) -> &Frozen {
        &self.root
    }

    /// Get the path of this cursor inside its root.
    pub fn path(&self) -> &[Key] {
        &self.path
    }

    /// Create a cursor pointing at `key` below this cursor.
    pub fn cursor(&self, key: impl Into<Key>) -> PathCursor {
        Self {
            root: self.root.clone(),
            path: self.child_path(key.into()),
        }
    }

    /// Get the entry at `key` below this cursor.
    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        self.root.get_in(&self.child_path(key.into())).cloned()
    }

    /// Return a cursor over a new root with `key` below this cursor set to `value`.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<PathCursor, Error> {
        let root = self.root.set_in(&self.child_path(key.into()), value)?;
        Ok(Self {
            root,
            path: self.path.clone(),
        })
    }

    /// Return a cursor over a new root with the value of this cursor replaced by the output of `f`.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> Result<PathCursor, Error> {
        let root = self.root.update_in(&self.path, f)?;
        Ok(Self {
            root,
            path: self.path.clone(),
        })
    }

    /// Get an immutable view of the value this cursor points at.
    ///
    /// Unlike [`Cursor::deref`], which hands out the raw entry,
    /// the view is compared by reference wherever it is passed on.
    pub fn view(&self) -> Frozen {
        Frozen::new(self.deref())
    }

    /// Wrap this cursor in a [`Value`].
    pub fn into_value(self) -> Value {
        Value::object(self)
    }

    fn child_path(&self, key: Key) -> Rc<[Key]> {
        self.path.iter().cloned().chain([key]).collect()
    }
}

// Entries are returned as stored so dereferencing keeps their identity,
// use `PathCursor::view` to pass them on as immutable structures.
impl Cursor for PathCursor {
    fn deref(&self) -> Value {
        self.root.get_in(&self.path).cloned().unwrap_or_default()
    }
}

impl Object for PathCursor {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_cursor(&self) -> Option<&dyn Cursor> {
        Some(self)
    }
}

impl From<Frozen> for PathCursor {
    fn from(root: Frozen) -> Self {
        Self::new(root)
    }
}

impl From<PathCursor> for Value {
    fn from(value: PathCursor) -> Self {
        value.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::{Frozen, PathCursor};
    use crate::{props, Cursor, Error, Key, Object, Value};

    #[test]
    fn it_shares_untouched_subtrees() {
        let data = Frozen::new(props! {
            "foo" => props! { "value" => "bar" },
            "bar" => vec![1, 2, 3],
        });

        let next = data.set_in(&["foo".into(), "value".into()], "baz").unwrap();

        assert!(data.get("bar").unwrap().is_same(next.get("bar").unwrap()));
        assert!(!data.get("foo").unwrap().is_same(next.get("foo").unwrap()));
        assert_eq!(
            next.get_in(&["foo".into(), "value".into()]).and_then(Value::as_str),
            Some("baz")
        );
        assert_eq!(
            data.get_in(&["foo".into(), "value".into()]).and_then(Value::as_str),
            Some("bar")
        );
    }

    #[test]
    fn it_creates_missing_maps() {
        let data = Frozen::default();
        let next = data.set_in(&["a".into(), "b".into()], 1).unwrap();
        assert_eq!(next.value(), &props! { "a" => props! { "b" => 1 } });
    }

    #[test]
    fn it_rejects_invalid_paths() {
        let data = Frozen::new(props! { "a" => 1, "list" => vec![1] });

        assert!(matches!(
            data.set_in(&["a".into(), "b".into()], 2),
            Err(Error::Path { key: Key::Field(_), .. })
        ));
        assert!(matches!(
            data.set_in(&["list".into(), Key::Index(3)], 2),
            Err(Error::Index { index: 3, len: 1 })
        ));
        assert!(data.set_in(&["list".into(), Key::Index(1)], 2).is_ok());
    }

    #[test]
    fn it_dereferences_cursors() {
        let data = Frozen::new(props! { "foo" => "bar", "bar" => vec![1, 2, 3] });

        let foo = PathCursor::with_path(data.clone(), ["foo"]);
        assert_eq!(foo.deref().as_str(), Some("bar"));

        let other = PathCursor::with_path(data, ["foo"]);
        assert!(foo.deref().is_same(&other.deref()));

        let missing = foo.cursor("nothing");
        assert!(missing.deref().is_undefined());

        let root = PathCursor::from(foo.root().clone());
        assert!(root.path().is_empty());
        assert!(root.deref().is_same(foo.root().value()));
    }

    #[test]
    fn it_updates_through_cursors() {
        let cursor = PathCursor::from_value(props! { "foo" => "bar" }).cursor("foo");
        let changed = cursor.update(|_| Value::from("changed")).unwrap();

        assert_eq!(cursor.deref().as_str(), Some("bar"));
        assert_eq!(changed.deref().as_str(), Some("changed"));
        assert_eq!(changed.path(), cursor.path());
    }

    #[test]
    fn it_keeps_identity_across_wrapping() {
        let data = Frozen::new(props! { "foo" => props! { "x" => 1 }, "bar" => vec![1] });

        assert!(data.clone().into_value().is_same(&data.clone().into_value()));
        assert!(data
            .child("foo")
            .unwrap()
            .into_value()
            .is_same(&data.child("foo").unwrap().into_value()));

        let next = data.set("bar", vec![2]).unwrap();
        assert!(!data.clone().into_value().is_same(&next.clone().into_value()));
        assert!(data
            .child("foo")
            .unwrap()
            .into_value()
            .is_same(&next.child("foo").unwrap().into_value()));
        assert!(!data.into_value().is_same(&PathCursor::new(next).into_value()));
    }

    #[test]
    fn it_views_cursors_as_immutable_structures() {
        let cursor = PathCursor::from_value(props! { "foo" => props! { "x" => 1 } }).cursor("foo");
        let view = cursor.view().into_value();

        assert!(view.as_object().is_some_and(|object| object.is_immutable()));
        assert!(view.is_same(&cursor.view().into_value()));
        assert!(cursor.deref().is_same(cursor.view().value()));

        let changed = cursor.set("x", 2).unwrap();
        assert!(!view.is_same(&changed.view().into_value()));
        assert_eq!(changed.view().get("x").and_then(Value::as_number), Some(2.));
    }

    #[test]
    fn it_compares_frozen_structures_deeply() {
        let a = Frozen::new(props! { "x" => 1 }).into_value();
        let b = Frozen::new(props! { "x" => 1 }).into_value();
        assert!(!a.is_same(&b));
        assert_eq!(a, b);
    }
}
