use indoc::indoc;
use url::Url;

use super::{RefKey, RefKeyError, Resolver};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::document::{DocumentStore, ParseLimits, SourceId};

const ROOT: &str = indoc! {r##"
    openapi: 3.1.0
    components:
      schemas:
        A:
          $ref: "#/components/schemas/B"
        B:
          description: forwarded
          $ref: "#/components/schemas/C"
        C:
          type: string
        Loop1:
          $ref: "#/components/schemas/Loop2"
        Loop2:
          $ref: "#/components/schemas/Loop1"
        Ext:
          $ref: "other.yaml#/Thing"
        Sibling:
          $ref: "#/components/schemas/C"
          maxLength: 3
"##};

const OTHER: &str = indoc! {r#"
    Thing:
      type: integer
"#};

fn store() -> (DocumentStore, SourceId) {
    let mut store = DocumentStore::new();
    let mut diagnostics = Diagnostics::new();
    let root = Url::parse("file:///api/root.yaml").unwrap();
    let other = Url::parse("file:///api/other.yaml").unwrap();
    let id = store.insert(&root, ROOT.to_string(), ParseLimits::default(), &mut diagnostics);
    store.insert(&other, OTHER.to_string(), ParseLimits::default(), &mut diagnostics);
    assert!(diagnostics.is_empty());
    (store, id)
}

#[test]
fn keys_are_canonical() {
    let base = Url::parse("file:///api/root.yaml#/ignored").unwrap();

    let key = RefKey::parse("other.yaml#/Thing", &base).unwrap();
    assert_eq!(key.url.as_str(), "file:///api/other.yaml");
    assert_eq!(key.pointer, "/Thing");

    let key = RefKey::parse("#/components/schemas/My%20Pet", &base).unwrap();
    assert_eq!(key.pointer, "/components/schemas/My Pet");
    assert_eq!(key.name(), "My Pet");
    assert!(key.is_component("schemas"));
    assert!(!key.is_component("responses"));
    assert_eq!(key.to_string(), "file:///api/root.yaml#/components/schemas/My Pet");

    let same = RefKey::parse("root.yaml#/components/schemas/My%20Pet", &base).unwrap();
    assert_eq!(key, same);

    let whole = RefKey::parse("other.yaml", &base).unwrap();
    assert_eq!(whole.pointer, "");
    assert_eq!(whole.child("Thing").pointer, "/Thing");

    assert!(matches!(
        RefKey::parse("#anchor", &base),
        Err(RefKeyError::NotPointer(_))
    ));
    assert!(matches!(
        RefKey::parse("#/a~2", &base),
        Err(RefKeyError::Pointer(_))
    ));
}

#[test]
fn follows_plain_ref_chains() {
    let (store, id) = store();
    let resolver = Resolver::new(&store, 1000);

    let resolved = resolver
        .resolve("#/components/schemas/A", Span::document(id))
        .unwrap();
    assert_eq!(resolved.key.pointer, "/components/schemas/C");
    assert_eq!(resolved.node.get("type").and_then(|n| n.as_str()), Some("string"));
}

#[test]
fn ref_with_keywords_is_a_target() {
    let (store, id) = store();
    let resolver = Resolver::new(&store, 1000);

    let resolved = resolver
        .resolve("#/components/schemas/Sibling", Span::document(id))
        .unwrap();
    assert_eq!(resolved.key.pointer, "/components/schemas/Sibling");
}

#[test]
fn crosses_documents() {
    let (store, id) = store();
    let resolver = Resolver::new(&store, 1000);

    let resolved = resolver
        .resolve("#/components/schemas/Ext", Span::document(id))
        .unwrap();
    assert_eq!(resolved.key.url.as_str(), "file:///api/other.yaml");
    assert_ne!(resolved.source, id);
    assert_eq!(resolved.node.get("type").and_then(|n| n.as_str()), Some("integer"));
}

#[test]
fn pure_ref_cycle() {
    let (store, id) = store();
    let resolver = Resolver::new(&store, 1000);

    let err = resolver
        .resolve("#/components/schemas/Loop1", Span::document(id))
        .unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::CycleDetected);
    assert_eq!(
        err.text(),
        "reference cycle through `file:///api/root.yaml#/components/schemas/Loop1`"
    );
    assert_eq!(err.related().len(), 3);
    assert_eq!(
        err.related()[1].message(),
        "refers to `file:///api/root.yaml#/components/schemas/Loop2`"
    );
}

#[test]
fn missing_targets() {
    let (store, id) = store();
    let resolver = Resolver::new(&store, 1000);
    let span = Span::document(id);

    let err = resolver.resolve("#/components/schemas/Missing", span).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::NotFound);
    assert_eq!(
        err.text(),
        "reference target `file:///api/root.yaml#/components/schemas/Missing` not found"
    );

    let err = resolver.resolve("nope.yaml#/x", span).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::NotFound);

    let err = resolver.resolve("#anchor", span).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::InvalidPointer);
}

#[test]
fn chain_depth_limit() {
    let (store, id) = store();
    let resolver = Resolver::new(&store, 1);

    let err = resolver
        .resolve("#/components/schemas/A", Span::document(id))
        .unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::DepthLimit);
    assert_eq!(err.text(), "reference chain too deep: more than 1 references");
}

#[test]
fn frames_detect_cycles_and_depth() {
    let (store, id) = store();
    let mut resolver = Resolver::new(&store, 2);
    let span = Span::document(id);
    let a = resolver.key("#/components/schemas/A", span).unwrap();
    let b = resolver.key("#/components/schemas/B", span).unwrap();
    let c = resolver.key("#/components/schemas/C", span).unwrap();

    resolver.enter(&a, id, span).unwrap();
    assert!(resolver.is_active(&a));

    let err = resolver.enter(&a, id, span).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::CycleDetected);
    assert_eq!(
        err.related()[0].message(),
        "via `file:///api/root.yaml#/components/schemas/A`"
    );

    resolver.enter(&b, id, span).unwrap();
    let err = resolver.enter(&c, id, span).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::DepthLimit);
    assert_eq!(err.related().len(), 2);

    resolver.leave();
    resolver.leave();
    assert_eq!(resolver.depth(), 0);
    resolver.enter(&c, id, span).unwrap();
}
