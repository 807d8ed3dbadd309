use indoc::indoc;
use url::Url;

use crate::diagnostics::DiagnosticKind;
use crate::document::{Node, SourceId, SourceMap, parse_yaml};

fn load(src: &str) -> (SourceMap, SourceId, Node) {
    let mut sources = SourceMap::new();
    let id = sources.add(Url::parse("file:///spec.yaml").unwrap(), src.to_string());
    let node = parse_yaml(sources.content(id), id).expect("valid YAML");
    (sources, id, node)
}

const PETS: &str = indoc! {r#"
    openapi: 3.1.0
    info:
      title: Pets
      version: "1"
    paths:
      /pets:
        get:
          parameters:
            - name: limit
              in: query
          responses:
            200:
              description: ok
"#};

#[test]
fn values_and_order() {
    let (_, _, root) = load(PETS);
    let object = root.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["openapi", "info", "paths"]);
    assert_eq!(root.get("info").and_then(|i| i.get("version")).and_then(Node::as_str), Some("1"));

    let responses = root
        .get("paths")
        .and_then(|p| p.get("/pets"))
        .and_then(|p| p.get("get"))
        .and_then(|o| o.get("responses"))
        .unwrap();
    assert!(responses.get("200").is_some());
}

#[test]
fn keys_are_located() {
    let (sources, id, root) = load(PETS);
    let paths = root.as_object().unwrap().member("paths").unwrap();
    assert_eq!(sources.line_col(id, paths.key_range.start()), (5, 1));

    let pets = paths.value.as_object().unwrap().member("/pets").unwrap();
    assert_eq!(&PETS[pets.key_range], "/pets");
    assert_eq!(sources.line_col(id, pets.key_range.start()), (6, 3));

    let params = pets.value.get("get").and_then(|g| g.get("parameters")).unwrap();
    let item = &params.as_array().unwrap()[0];
    assert_eq!(sources.line_col(id, item.range.start()), (9, 9));

    let item = item.as_object().unwrap();
    let name = item.member("name").unwrap();
    let location = item.member("in").unwrap();
    assert_eq!(sources.line_col(id, name.key_range.start()), (9, 11));
    assert_eq!(sources.line_col(id, location.key_range.start()), (10, 11));
    assert_eq!(&PETS[name.value.range], "name: limit");
}

#[test]
fn nested_key_does_not_shadow_sibling() {
    let src = indoc! {"
        a:
          name: inner
        name: outer
    "};
    let (sources, id, root) = load(src);
    let object = root.as_object().unwrap();
    let outer = object.member("name").unwrap();
    assert_eq!(sources.line_col(id, outer.key_range.start()), (3, 1));
    let inner = object.get("a").and_then(|a| a.as_object()).unwrap().member("name").unwrap();
    assert_eq!(sources.line_col(id, inner.key_range.start()), (2, 3));
}

#[test]
fn flow_collections_inherit_key_range() {
    let src = "tags: [a, b]\nmeta: {x: 1}\n";
    let (_, _, root) = load(src);
    let tags = root.as_object().unwrap().member("tags").unwrap();
    let items = tags.value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].range, tags.key_range);
    assert_eq!(root.get("meta").and_then(|m| m.get("x")).and_then(Node::as_u64), Some(1));
}

#[test]
fn quoted_keys_and_comments() {
    let src = indoc! {r#"
        # leading comment
        "quoted": 1 # trailing
        'single': two
    "#};
    let (sources, id, root) = load(src);
    let object = root.as_object().unwrap();
    let quoted = object.member("quoted").unwrap();
    assert_eq!(sources.line_col(id, quoted.key_range.start()), (2, 1));
    assert_eq!(&src[quoted.key_range], r#""quoted""#);
    assert_eq!(object.get("single").and_then(Node::as_str), Some("two"));
}

#[test]
fn syntax_error_is_located() {
    let mut sources = SourceMap::new();
    let src = "a: 1\nb: [1, 2\n";
    let id = sources.add(Url::parse("file:///bad.yaml").unwrap(), src.to_string());
    let err = parse_yaml(sources.content(id), id).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::YamlSyntax);
    assert!(!err.text().contains(" at line "));
}

#[test]
fn numeric_and_string_keys_collide() {
    let src = "200: a\n'200': b\n";
    let mut sources = SourceMap::new();
    let id = sources.add(Url::parse("file:///dup.yaml").unwrap(), src.to_string());
    let err = parse_yaml(sources.content(id), id).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::DuplicateKey);
    assert_eq!(sources.line_col(id, err.span().range.start()), (2, 1));
}
