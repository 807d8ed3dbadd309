use crate::document::pointer::{self, PointerError};
use crate::document::{ParseLimits, SourceId, parse_json};

#[test]
fn escape_roundtrip() {
    assert_eq!(pointer::escape("a/b~c"), "a~1b~0c");
    assert_eq!(pointer::unescape("a~1b~0c").unwrap(), "a/b~c");
    assert!(matches!(pointer::unescape("a~2"), Err(PointerError::Escape(_))));
}

#[test]
fn parse_tokens() {
    assert!(pointer::parse("").unwrap().is_empty());
    assert_eq!(
        pointer::parse("/paths/~1pets~1{id}/get").unwrap(),
        ["paths", "/pets/{id}", "get"]
    );
    assert!(matches!(pointer::parse("paths"), Err(PointerError::Syntax(_))));
}

#[test]
fn join_and_last_token() {
    let p = pointer::join("/paths", "/pets");
    assert_eq!(p, "/paths/~1pets");
    assert_eq!(pointer::last_token(&p), "/pets");
    assert_eq!(pointer::last_token(""), "");
}

#[test]
fn lookup_objects_and_arrays() {
    let root = parse_json(
        r#"{"a": {"b/c": [10, {"d": true}]}}"#,
        SourceId::default(),
        ParseLimits::default(),
    )
    .unwrap();

    let node = pointer::lookup(&root, "/a/b~1c/1/d").unwrap();
    assert_eq!(node.as_bool(), Some(true));
    assert_eq!(pointer::lookup(&root, "").unwrap(), &root);

    let err = pointer::lookup(&root, "/a/missing").unwrap_err();
    assert_eq!(
        err,
        PointerError::Missing {
            at: "/a".to_string(),
            token: "missing".to_string()
        }
    );
    assert!(pointer::lookup(&root, "/a/b~1c/01").is_err());
    assert!(pointer::lookup(&root, "/a/b~1c/2").is_err());
}
