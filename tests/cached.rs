use recompute::{
    args, cached, props,
    store::{Frozen, PathCursor},
    Args, Cache, Overrides, Value,
};
use std::cell::Cell;

fn counter() -> (impl Fn(&Args) -> i32, std::rc::Rc<Cell<i32>>) {
    let calls = std::rc::Rc::new(Cell::new(0));
    let calls_handle = calls.clone();
    let f = move |_: &Args| {
        calls_handle.set(calls_handle.get() + 1);
        calls_handle.get()
    };
    (f, calls)
}

fn point(value: &Value) -> String {
    let value = match value.as_cursor() {
        Some(cursor) => cursor.deref(),
        None => value.clone(),
    };
    let coord = |key| {
        value
            .get(key)
            .and_then(Value::as_number)
            .unwrap_or_default()
    };
    format!("{}:{}", coord("x"), coord("y"))
}

fn join(value: &Value) -> String {
    value
        .as_map()
        .map(|map| {
            map.iter()
                .map(|(key, value)| format!("{key}={}", value.as_number().unwrap_or_default()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

#[test]
fn it_handles_no_arguments() {
    let (f, calls) = counter();
    let f = cached(f);

    assert_eq!(f.call(()), 1);
    assert_eq!(f.call(()), 1);
    assert_eq!(calls.get(), 1);
}

#[test]
fn it_reuses_output_for_equivalent_structures() {
    let calls = Cell::new(0);
    let f = cached(|args: &Args| {
        calls.set(calls.get() + 1);
        join(&args[0])
    });

    assert_eq!(f.call((props! { "a" => 1, "b" => 2 },)), "a=1,b=2");
    assert_eq!(f.call((props! { "b" => 2, "a" => 1 },)), "a=1,b=2");
    assert_eq!(calls.get(), 1);

    assert_eq!(
        f.call((props! { "a" => 1, "b" => 2, "c" => 3 },)),
        "a=1,b=2,c=3"
    );
    assert_eq!(calls.get(), 2);

    assert_eq!(
        f.call((props! { "a" => 1, "b" => 2, "c" => 3 },)),
        "a=1,b=2,c=3"
    );
    assert_eq!(calls.get(), 2);

    assert_eq!(f.call((props! { "a" => 1, "b" => 2 },)), "a=1,b=2");
    assert_eq!(calls.get(), 3);
}

#[test]
fn it_reuses_output_for_equivalent_args() {
    let calls = Cell::new(0);
    let f = cached(|args: &Args| {
        calls.set(calls.get() + 1);
        args.iter()
            .take(2)
            .filter_map(|arg| arg.get("value").and_then(Value::as_number))
            .sum::<f64>()
    });
    let v = |x: i32| props! { "value" => x };

    assert_eq!(f.call((v(0), v(1))), 1.);
    assert_eq!(f.call((v(0), v(1))), 1.);
    assert_eq!(calls.get(), 1);

    assert_eq!(f.call((v(1), v(0))), 1.);
    assert_eq!(f.call((v(1), v(0))), 1.);
    assert_eq!(calls.get(), 2);

    assert_eq!(f.call((v(1), v(0), v(3))), 1.);
    assert_eq!(calls.get(), 3);
}

#[test]
fn it_handles_a_single_cursor() {
    let calls = Cell::new(0);
    let f = cached(|args: &Args| {
        calls.set(calls.get() + 1);
        point(&args[0])
    });

    let a = PathCursor::from_value(props! { "x" => 0, "y" => 0 });
    assert_eq!(f.call((a.clone(),)), "0:0");
    assert_eq!(f.call((a.clone(),)), "0:0");
    assert_eq!(calls.get(), 1);

    assert_eq!(f.call((a.set("x", 2).unwrap(),)), "2:0");
    assert_eq!(calls.get(), 2);

    let moved = a.set("x", 17).and_then(|a| a.set("y", 14)).unwrap();
    assert_eq!(f.call((moved,)), "17:14");
    assert_eq!(calls.get(), 3);
}

#[test]
fn it_handles_multiple_cursors() {
    let calls = Cell::new(0);
    let line = cached(|args: &Args| {
        calls.set(calls.get() + 1);
        format!("{}-{}", point(&args[0]), point(&args[1]))
    });

    let a = PathCursor::from_value(props! { "x" => 0, "y" => 0 }).into_value();
    let b = PathCursor::from_value(props! { "x" => 1, "y" => 7 }).into_value();

    assert_eq!(line.call((&a, &b)), "0:0-1:7");
    assert_eq!(line.call((&a, &b)), "0:0-1:7");
    assert_eq!(calls.get(), 1);

    assert_eq!(line.call((&a, &b, &a)), "0:0-1:7");
    assert_eq!(calls.get(), 2);

    assert_eq!(line.call((&a, &b)), "0:0-1:7");
    assert_eq!(calls.get(), 3);
}

#[test]
fn it_handles_cursors_inside_structures() {
    let (f, _) = counter();
    let f = cached(f);
    let cursor = PathCursor::from_value(props! { "x" => 1 });
    let c = cursor.clone().into_value();

    assert_eq!(f.call((props! { "a" => &c },)), 1);
    assert_eq!(f.call((props! { "a" => &c },)), 1);

    assert_eq!(f.call((props! { "a" => &c, "b" => &c },)), 2);
    assert_eq!(f.call((props! { "a" => &c, "b" => &c },)), 2);

    assert_eq!(f.call((props! { "a" => &c },)), 3);
    assert_eq!(f.call((props! { "a" => cursor.set("x", 2).unwrap() },)), 4);

    let nested = || props! { "a" => props! { "b" => props! { "c" => &c } } };
    assert_eq!(f.call((nested(),)), 5);
    assert_eq!(f.call((nested(),)), 5);

    let in_list = || props! { "a" => props! { "b" => props! { "c" => vec![&c] } } };
    assert_eq!(f.call((in_list(),)), 6);
    assert_eq!(f.call((in_list(),)), 6);
}

#[test]
fn it_differs_between_cursor_and_immutable_map() {
    let (f, _) = counter();
    let f = cached(f);
    let cursor = PathCursor::from_value(props! { "x" => 1 }).into_value();
    let map = Frozen::new(props! { "x" => 1 }).into_value();

    assert_eq!(f.call((&cursor,)), 1);
    assert_eq!(f.call((&cursor,)), 1);

    assert_eq!(f.call((&map,)), 2);
    assert_eq!(f.call((&map,)), 2);

    assert_eq!(f.call((&cursor,)), 3);
    assert_eq!(f.call((props! { "a" => &cursor },)), 4);
    assert_eq!(f.call((props! { "a" => &map },)), 5);

    let nested = |value: &Value| props! { "a" => props! { "b" => props! { "c" => value } } };
    assert_eq!(f.call((nested(&map),)), 6);
    assert_eq!(f.call((nested(&cursor),)), 7);

    let in_list = |value: &Value| props! { "a" => props! { "b" => props! { "c" => vec![value] } } };
    assert_eq!(f.call((in_list(&cursor),)), 8);
    assert_eq!(f.call((in_list(&map),)), 9);
}

#[test]
fn it_reuses_output_for_unchanged_immutable_structures() {
    let (f, calls) = counter();
    let f = cached(f);
    let data = Frozen::new(props! { "x" => props! { "y" => 1 } });

    assert_eq!(f.call((data.clone(),)), 1);
    assert_eq!(f.call((data.clone(),)), 1);
    assert_eq!(f.call((data.child("x").unwrap(),)), 2);
    assert_eq!(f.call((data.child("x").unwrap(),)), 2);
    assert_eq!(calls.get(), 2);

    let next = data.set_in(&["x".into(), "y".into()], 2).unwrap();
    assert_eq!(f.call((next.clone(),)), 3);
    assert_eq!(f.call((next,)), 3);
    assert_eq!(f.call((data,)), 4);
}

#[test]
fn it_handles_primitives() {
    let (f, _) = counter();
    let f = cached(f);

    assert_eq!(f.call(()), 1);
    assert_eq!(f.call(()), 1);

    assert_eq!(f.call((Value::Undefined,)), 2);
    assert_eq!(f.call((Value::Undefined,)), 2);

    assert_eq!(f.call((Value::Null,)), 3);
    assert_eq!(f.call((Value::Null,)), 3);

    assert_eq!(f.call((1,)), 4);
    assert_eq!(f.call((1,)), 4);

    assert_eq!(f.call((1, 3)), 5);
    assert_eq!(f.call((1, 3)), 5);

    assert_eq!(f.call((1, "3")), 6);
    assert_eq!(f.call((1, "3")), 6);

    assert_eq!(f.call((true,)), 7);
    assert_eq!(f.call((true,)), 7);

    assert_eq!(f.call((false,)), 8);
    assert_eq!(f.call((false,)), 8);
}

#[test]
fn it_handles_mixed_args_and_structures() {
    let (f, _) = counter();
    let f = cached(f);
    let cursor = PathCursor::from_value(props! { "x" => 1 }).into_value();
    let map = Frozen::new(props! { "y" => 1 }).into_value();

    assert_eq!(f.call(args![&cursor, 1, &map, "foo"]), 1);
    assert_eq!(f.call(args![&cursor, 1, &map, "foo"]), 1);

    assert_eq!(f.call(args![&cursor, 1, &map, "bar"]), 2);
    assert_eq!(f.call(args![&cursor, 1, &map, "bar"]), 2);

    assert_eq!(f.call(args![&cursor, 1, &cursor, "bar"]), 3);
    assert_eq!(f.call(args![&cursor, 1, &cursor, "bar"]), 3);

    assert_eq!(f.call(args![&cursor, 1, props! { "y" => 1 }, "bar"]), 4);
    assert_eq!(f.call(args![&cursor, 1, props! { "y" => 1 }, "bar"]), 4);

    assert_eq!(f.call(args![&cursor, 1, &map, "bar"]), 5);
    assert_eq!(f.call(args![props! { "x" => 1 }, 1, &map, "bar"]), 6);

    let list = || Value::list([props! { "x" => 1 }, Value::from(1), map.clone(), Value::from("bar")]);
    assert_eq!(f.call(args![list(), &cursor]), 7);
    assert_eq!(f.call(args![list(), &cursor]), 7);

    let tree = || {
        props! {
            "x" => props! {
                "y" => props! { "cursor" => &cursor, "maps" => vec![&map] },
                "z" => "boom",
            },
        }
    };
    assert_eq!(f.call((tree(),)), 8);
    assert_eq!(f.call((tree(),)), 8);
}

#[test]
fn it_is_customizable() {
    // Compare immutable structures deeply instead of by reference.
    let cache = Cache::with_overrides(Overrides::new().is_equal_immutable(|a, b| a == b));

    let (f, calls) = counter();
    let f = cache.cached(f);

    let a = Frozen::new(props! { "x" => 1 }).into_value();
    let b = Frozen::new(props! { "x" => 1 }).into_value();

    assert_eq!(f.call((&a,)), 1);
    assert_eq!(f.call((&a,)), 1);
    assert_eq!(f.call((&b,)), 1);

    assert_eq!(f.call((props! { "x" => 1 },)), 2);
    assert_eq!(f.call((Frozen::new(props! { "x" => 2 }),)), 3);
    assert_eq!(calls.get(), 3);

    let default = cached(counter().0);
    assert_eq!(default.call((&a,)), 1);
    assert_eq!(default.call((&b,)), 2);
}

#[test]
fn it_creates_independent_cells() {
    let cache = Cache::new();
    let (f, calls) = counter();
    let f = std::rc::Rc::new(f);

    let first = cache.cached({
        let f = f.clone();
        move |args: &Args| f(args)
    });
    let second = cache.cached(move |args: &Args| f(args));

    assert_eq!(first.call((1,)), 1);
    assert_eq!(second.call((1,)), 2);
    assert_eq!(first.call((1,)), 1);
    assert_eq!(calls.get(), 2);
}

#[cfg(feature = "serde")]
#[test]
fn it_serializes_cached_structures() {
    let calls = Cell::new(0);
    let f = cached(|args: &Args| {
        calls.set(calls.get() + 1);
        serde_json::to_string(&args[0]).unwrap()
    });

    assert_eq!(f.call((props! { "a" => 1, "b" => 2 },)), r#"{"a":1,"b":2}"#);
    assert_eq!(f.call((props! { "b" => 2, "a" => 1 },)), r#"{"a":1,"b":2}"#);
    assert_eq!(calls.get(), 1);

    #[derive(serde::Serialize)]
    struct Snapshot {
        args: Vec<Value>,
    }

    let snapshot = Snapshot {
        args: f.last_args().unwrap().into_vec(),
    };
    assert_eq!(
        serde_json::to_string(&snapshot).unwrap(),
        r#"{"args":[{"b":2,"a":1}]}"#
    );
}
