use crate::diagnostics::DiagnosticKind;
use crate::document::{Node, ParseLimits, SourceId, Value, parse_json};

fn parse(src: &str) -> Node {
    parse_json(src, SourceId::default(), ParseLimits::default()).expect("valid JSON")
}

fn parse_err(src: &str, limits: ParseLimits) -> DiagnosticKind {
    parse_json(src, SourceId::default(), limits)
        .expect_err("invalid JSON")
        .kind()
}

#[test]
fn object_keeps_declaration_order_and_key_ranges() {
    let src = r#"{"b": 1, "a": [true, null, "x"]}"#;
    let node = parse(src);
    let object = node.as_object().unwrap();

    assert_eq!(object.keys().collect::<Vec<_>>(), ["b", "a"]);
    let a = object.member("a").unwrap();
    assert_eq!(&src[a.key_range], r#""a""#);
    assert_eq!(&src[a.value.range], r#"[true, null, "x"]"#);
    assert_eq!(a.value.as_array().unwrap().len(), 3);
    assert_eq!(node.range, rowan::TextRange::up_to((src.len() as u32).into()));
}

#[test]
fn strings_are_unescaped() {
    let node = parse(r#""aA\n\/""#);
    assert_eq!(node.as_str(), Some("aA\n/"));
}

#[test]
fn numbers_keep_integer_precision() {
    let node = parse("[12345678901234567890, -3, 2.5]");
    let items = node.as_array().unwrap();
    assert_eq!(items[0].as_u64(), Some(12345678901234567890));
    assert_eq!(items[1].as_number().and_then(|n| n.as_i64()), Some(-3));
    assert_eq!(items[2].as_number().and_then(|n| n.as_f64()), Some(2.5));
}

#[test]
fn empty_collections() {
    let node = parse(r#"{"a": {}, "b": []}"#);
    assert!(node.get("a").unwrap().as_object().unwrap().is_empty());
    assert!(matches!(node.get("b").unwrap().value, Value::Array(ref v) if v.is_empty()));
}

#[test]
fn duplicate_key_points_at_both_keys() {
    let src = r#"{"a": 1, "a": 2}"#;
    let err = parse_json(src, SourceId::default(), ParseLimits::default()).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::DuplicateKey);
    assert_eq!(&src[err.span().range], r#""a""#);
    assert_eq!(u32::from(err.span().range.start()), 9);
    assert_eq!(u32::from(err.related()[0].span().range.start()), 1);
}

#[test]
fn syntax_errors() {
    let limits = ParseLimits::default();
    assert_eq!(parse_err(r#"{"a": "#, limits), DiagnosticKind::JsonSyntax);
    assert_eq!(parse_err(r#"{"a": tru}"#, limits), DiagnosticKind::JsonSyntax);
    assert_eq!(parse_err(r#"{"a": 1,}"#, limits), DiagnosticKind::JsonSyntax);
    assert_eq!(parse_err("[1] [2]", limits), DiagnosticKind::JsonSyntax);
    assert_eq!(parse_err("{a: 1}", limits), DiagnosticKind::JsonSyntax);
}

#[test]
fn garbage_is_reported_once() {
    let err = parse_json(r#"{"a": @@@}"#, SourceId::default(), ParseLimits::default())
        .unwrap_err();
    assert_eq!(err.text(), "invalid JSON: expected a value, found invalid input");
}

#[test]
fn depth_limit() {
    let limits = ParseLimits { fuel: 1000, depth: 3 };
    assert_eq!(parse_err("[[[[1]]]]", limits), DiagnosticKind::ParseLimit);
    assert!(parse_json("[[[1]]]", SourceId::default(), limits).is_ok());
}

#[test]
fn fuel_limit() {
    let limits = ParseLimits { fuel: 4, depth: 10 };
    assert_eq!(parse_err("[1, 2, 3, 4]", limits), DiagnosticKind::ParseLimit);
}

#[test]
fn default_depth_stops_deep_nesting() {
    let src = "[".repeat(600);
    assert_eq!(parse_err(&src, ParseLimits::default()), DiagnosticKind::ParseLimit);

    let nested = format!("{}1{}", "[".repeat(100), "]".repeat(100));
    assert!(parse_json(&nested, SourceId::default(), ParseLimits::default()).is_ok());
}
