//! Tests for CLI dispatch logic.

use std::path::PathBuf;

use oasgen_compiler::ir::Method;

use super::*;

fn parse(args: &[&str]) -> Result<GenerateParams, clap::Error> {
    build_cli()
        .try_get_matches_from(args)
        .map(|m| GenerateParams::from_matches(&m))
}

#[test]
fn required_arguments() {
    let params = parse(&["oasgen", "openapi.yaml", "--target", "out", "--package", "api"]).unwrap();

    assert_eq!(params.spec, "openapi.yaml");
    assert_eq!(params.target, PathBuf::from("out"));
    assert_eq!(params.package, "api");
    assert!(!params.clean);
    assert!(!params.infer_types);
    assert!(!params.allow_remote);
    assert!(params.filter_path.is_none());
    assert!(params.filter_methods.is_none());
    assert_eq!(params.color, ColorChoice::Auto);
    assert_eq!(params.verbose, 0);
}

#[test]
fn missing_target_is_rejected() {
    let result = parse(&["oasgen", "openapi.yaml", "--package", "api"]);
    assert!(result.is_err());
}

#[test]
fn all_flags() {
    let params = parse(&[
        "oasgen",
        "https://example.com/openapi.json",
        "--target",
        "gen",
        "--package",
        "petstore",
        "--clean",
        "--infer-types",
        "--filter-path",
        "^/pets",
        "--filter-methods",
        "get,POST",
        "--allow-remote",
        "--color",
        "never",
        "-vv",
    ])
    .unwrap();

    assert_eq!(params.spec, "https://example.com/openapi.json");
    assert!(params.clean);
    assert!(params.infer_types);
    assert!(params.allow_remote);
    assert_eq!(params.filter_path.as_deref(), Some("^/pets"));
    assert_eq!(params.filter_methods, Some(vec![Method::Get, Method::Post]));
    assert_eq!(params.color, ColorChoice::Never);
    assert_eq!(params.verbose, 2);
}

#[test]
fn unknown_method_is_rejected() {
    let result = parse(&[
        "oasgen",
        "openapi.yaml",
        "--target",
        "out",
        "--package",
        "api",
        "--filter-methods",
        "get,fetch",
    ]);
    let err = result.err().unwrap();
    assert!(err.to_string().contains("unknown HTTP method `fetch`"));
}

#[test]
fn package_must_be_an_identifier() {
    let result = parse(&["oasgen", "openapi.yaml", "--target", "out", "--package", "my-api"]);
    let err = result.err().unwrap();
    assert!(err.to_string().contains("`my-api` is not a valid package name"));
}
