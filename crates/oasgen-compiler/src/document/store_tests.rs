use indoc::indoc;
use url::Url;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::document::{DocumentStore, Format, Loader, MemoryFs, NoFetcher};

const ROOT: &str = indoc! {r#"
    openapi: 3.0.3
    components:
      schemas:
        Pet:
          $ref: "./common.yaml#/components/schemas/Pet"
        Tag:
          $ref: "https://example.com/tag.json#/Tag"
        Lost:
          $ref: "./missing.yaml#/Lost"
"#};

const COMMON: &str = indoc! {r##"
    components:
      schemas:
        Pet:
          type: object
          properties:
            owner:
              $ref: "#/components/schemas/Owner"
        Owner:
          type: string
"##};

fn fs() -> MemoryFs {
    MemoryFs::new()
        .file("/api/root.yaml", ROOT)
        .file("/api/common.yaml", COMMON)
        .remote("https://example.com/tag.json", r#"{"Tag": {"type": "string"}}"#)
}

#[test]
fn format_detection() {
    let json = Url::parse("file:///a.json").unwrap();
    let yaml = Url::parse("file:///a.yml").unwrap();
    let bare = Url::parse("https://example.com/spec").unwrap();
    assert_eq!(Format::detect(&json, "a: 1"), Format::Json);
    assert_eq!(Format::detect(&yaml, "{}"), Format::Yaml);
    assert_eq!(Format::detect(&bare, "  {\"a\": 1}"), Format::Json);
    assert_eq!(Format::detect(&bare, "a: 1"), Format::Yaml);
}

#[test]
fn load_is_idempotent() {
    let fs = fs();
    let loader = Loader::new(&fs, &NoFetcher);
    let mut store = DocumentStore::new();
    let mut diagnostics = Diagnostics::new();

    let url = Url::parse("file:///api/root.yaml").unwrap();
    let with_fragment = Url::parse("file:///api/root.yaml#/components").unwrap();
    let a = store.load(&url, &loader, &mut diagnostics).unwrap();
    let b = store.load(&with_fragment, &loader, &mut diagnostics).unwrap();
    assert_eq!(a, b);
    assert_eq!(store.len(), 1);
    assert!(diagnostics.is_empty());
}

#[test]
fn preload_follows_refs_across_documents() {
    let fs = fs();
    let loader = Loader::new(&fs, &fs);
    let mut store = DocumentStore::new();
    let mut diagnostics = Diagnostics::new();

    let url = Url::parse("file:///api/root.yaml").unwrap();
    let root = store.load(&url, &loader, &mut diagnostics).unwrap();
    store.preload(root, &loader, &mut diagnostics);

    assert_eq!(store.len(), 3);
    let common = store.by_url(&Url::parse("file:///api/common.yaml").unwrap()).unwrap();
    assert_eq!(common.format, Format::Yaml);
    let tag = store.by_url(&Url::parse("https://example.com/tag.json").unwrap()).unwrap();
    assert_eq!(tag.format, Format::Json);

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::Io]);
    let missing = &diagnostics.as_slice()[0];
    let (line, _) = store.sources().line_col(missing.span().source, missing.span().range.start());
    assert_eq!(line, 9);
}

#[test]
fn remote_refs_fail_without_fetcher() {
    let fs = fs();
    let loader = Loader::new(&fs, &NoFetcher);
    let mut store = DocumentStore::new();
    let mut diagnostics = Diagnostics::new();

    let url = Url::parse("file:///api/root.yaml").unwrap();
    let root = store.load(&url, &loader, &mut diagnostics).unwrap();
    store.preload(root, &loader, &mut diagnostics);

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::Io, DiagnosticKind::Io]);
    assert!(diagnostics.as_slice()[0].text().contains("remote references are disabled"));
}

#[test]
fn unreadable_root_is_a_load_error() {
    let fs = MemoryFs::new();
    let loader = Loader::new(&fs, &NoFetcher);
    let mut store = DocumentStore::new();
    let mut diagnostics = Diagnostics::new();
    let url = Url::parse("file:///nowhere.yaml").unwrap();
    let err = store.load(&url, &loader, &mut diagnostics).unwrap_err();
    assert!(err.to_string().starts_with("cannot read `file:///nowhere.yaml`"));
}
