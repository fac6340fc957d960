//! End-to-end behaviour of the public surface, as seen by a dependent crate.

use std::error::Error as _;
use std::io;
use std::thread;

use errstack::{Error, Frame, Metadata, ResultExt};
use serde_json::json;

fn load() -> Error {
    errstack::new(Some("foobar")).unwrap()
}

#[test]
fn stack_survives_repeated_wraps() {
    let err = load();
    let stack = err.stack().to_vec();
    let err = errstack::wrap(Some(err), io::Error::from(io::ErrorKind::UnexpectedEof).to_string())
        .and_then(|e| errstack::wrap(Some(e), "water buffalo"))
        .unwrap();
    assert_eq!(err.stack(), stack.as_slice());
    #[cfg(feature = "capture")]
    assert!(stack[0].function.ends_with("load"), "first frame: {}", stack[0].function);
}

#[test]
fn message_chain_rendering() {
    let err = Error::new("foo").wrap("EOF").wrap("water buffalo");
    assert_eq!(err.to_string(), "foo:EOF:water buffalo");
}

#[test]
fn is_through_the_chain() {
    let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
    let err = Error::new("foobar").wrap(eof.to_string()).wrap("water buffalo");
    assert!(errstack::is(&err, &eof));
    assert!(err.is(&eof));

    let root = Error::plain("root");
    let wrapped = root.clone().wrap("a").wrap("b");
    assert!(errstack::is(&wrapped, &root));
    assert!(!errstack::is(&wrapped, &Error::plain("elsewhere")));
}

#[test]
fn with_meta_never_leaks_backwards() {
    let e1 = Error::new("x").with_meta([("a", 1)]);
    let e2 = e1.with_meta([("b", 2)]);

    let mut expected = Metadata::new();
    expected.insert("a".into(), json!(1));
    assert_eq!(e1.meta(), &expected);
    assert_eq!(e2.meta().len(), 2);
}

#[test]
fn wrap_copies_instead_of_aliasing() {
    let e2 = Error::new("x").with_meta([("a", 1)]).with_meta([("b", 2)]);
    let e3 = e2.with_stack();
    let e4 = e3.clone().wrap("ctx");

    let inner = e4
        .source()
        .and_then(|c| c.downcast_ref::<Error>())
        .unwrap()
        .with_meta([("c", 3)]);
    let e4 = e4.with_meta([("d", 4)]);

    assert_eq!(e3.meta().len(), 2);
    assert_eq!(inner.meta().len(), 3);
    assert_eq!(e4.meta().len(), 3);
    assert!(e3.meta_value("c").is_none());
    assert!(e3.meta_value("d").is_none());
}

#[test]
fn serialization_omits_empty_fields() {
    let bare = serde_json::to_value(Error::plain("bare")).unwrap();
    assert_eq!(bare, json!({ "error": "bare" }));

    let none: Option<Error> = None;
    assert_eq!(serde_json::to_value(none).unwrap(), serde_json::Value::Null);
}

#[test]
fn serialization_full_shape() {
    let json = r#"{"error":"a","stack":[{"function":"app::run","file":"src/app.rs","line":3}]}"#;
    let err = Error::from_json(json).unwrap().wrap("b").with_meta([("k", true)]);
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(
        value,
        json!({
            "error": "a:b",
            "stack": [{ "function": "app::run", "file": "src/app.rs", "line": 3 }],
            "meta": { "k": true },
        })
    );
    assert_eq!(err.stack(), &[Frame::new("app::run", "src/app.rs", 3)]);
}

#[test]
fn derivations_from_shared_ancestor_across_threads() {
    let base = Error::new("base").with_meta([("shared", 0)]);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let base = base.clone();
            thread::spawn(move || base.with_meta([("worker", i)]).wrap(format!("w{}", i)))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let derived = handle.join().unwrap();
        assert_eq!(derived.to_string(), format!("base:w{}", i));
        assert_eq!(derived.meta_value("worker"), Some(&json!(i)));
    }
    assert_eq!(base.meta().len(), 1);
}

#[test]
fn question_mark_from_io() {
    fn read() -> errstack::Result<Vec<u8>> {
        Ok(std::fs::read("/nonexistent/errstack")?)
    }
    let err = read().unwrap_err();
    assert!(err.downcast_ref::<io::Error>().is_none());
    assert!(err.unwrap_cause().is_none());
    #[cfg(feature = "capture")]
    assert!(
        err.stack()[0].function.contains("read"),
        "first frame: {}",
        err.stack()[0].function
    );
}

#[test]
fn result_ext_chain() {
    let res: Result<(), io::Error> = Err(io::Error::other("disk"));
    let err = res
        .with_meta_err([("dev", "sda")])
        .wrap_err("flush")
        .wrap_err("shutdown")
        .unwrap_err();
    assert_eq!(err.to_string(), "disk:flush:shutdown");
    assert_eq!(err.meta_value("dev"), Some(&json!("sda")));
    assert_eq!(errstack::chain::chain(&err).count(), 3);
}
