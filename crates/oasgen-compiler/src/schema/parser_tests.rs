use indoc::indoc;
use url::Url;

use super::{Additional, RawSchema, SchemaParser};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::document::{ParseLimits, SourceId, parse_json, parse_yaml};
use crate::ir::{JsonType, Literal, Number, SpecVersion};
use crate::resolve::RefKey;

fn parse(version: &str, src: &str) -> Result<RawSchema, Diagnostic> {
    let node = parse_yaml(src, SourceId::default()).unwrap();
    let url = Url::parse("file:///api.yaml").unwrap();
    let key = RefKey::new(&url, "/components/schemas/S");
    SchemaParser::new(SpecVersion::parse(version).unwrap()).parse(&node, SourceId::default(), key)
}

fn error(version: &str, src: &str) -> Diagnostic {
    parse(version, src).unwrap_err()
}

#[test]
fn object_keywords() {
    let raw = parse(
        "3.0.3",
        indoc! {r##"
            type: object
            required: [name, name, id]
            properties:
              name:
                type: string
                x-ogen-extra-tags:
                  db: name
              id:
                $ref: "#/components/schemas/Id"
            additionalProperties:
              type: integer
            x-ogen-properties-type: PetProps
        "##},
    )
    .unwrap();

    assert_eq!(raw.types, [JsonType::Object]);
    assert_eq!(raw.required, ["name", "id"]);
    let names: Vec<&str> = raw.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["name", "id"]);
    assert_eq!(raw.properties[0].schema.key.pointer, "/components/schemas/S/properties/name");
    assert_eq!(raw.properties[0].schema.x_extra_tags["db"], "name");

    let reference = raw.properties[1].schema.reference.as_ref().unwrap();
    assert_eq!(reference.key.pointer, "/components/schemas/Id");
    assert!(matches!(&raw.additional, Some(Additional::Schema(s)) if s.types == [JsonType::Integer]));
    assert_eq!(raw.x_properties_type.as_deref(), Some("PetProps"));
}

#[test]
fn ref_siblings_depend_on_version() {
    let src = indoc! {r##"
        $ref: "#/components/schemas/Base"
        description: documented
        maxLength: 3
    "##};

    let raw = parse("3.0.3", src).unwrap();
    assert!(raw.reference.is_some());
    assert_eq!(raw.max_length, None);
    assert_eq!(raw.description.as_deref(), Some("documented"));

    let raw = parse("3.1.0", src).unwrap();
    assert!(raw.reference.is_some());
    assert_eq!(raw.max_length, Some(3));
    assert!(raw.has_constraints());
}

#[test]
fn nullability_forms() {
    let raw = parse("3.0.3", "type: string\nnullable: true\n").unwrap();
    assert!(raw.is_nullable());
    assert_eq!(raw.non_null_types(), [JsonType::String]);

    let raw = parse("3.1.0", "type: [string, \"null\"]\n").unwrap();
    assert!(raw.is_nullable());
    assert!(!raw.nullable);

    let raw = parse("3.1.0", "type: \"null\"\n").unwrap();
    assert!(raw.is_null_only());

    let err = error("3.1.0", "type: [string, \"null\"]\nnullable: true\n");
    assert_eq!(err.kind(), DiagnosticKind::MixedNullability);
    assert_eq!(err.related().len(), 1);
}

#[test]
fn type_errors() {
    let err = error("3.0.3", "type: [string, integer]\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidType);
    assert_eq!(err.text(), "invalid schema type: type arrays require OpenAPI 3.1");

    let err = error("3.0.3", "type: text\n");
    assert_eq!(err.text(), "invalid schema type: unknown type `text`");

    let err = error("3.1.0", "- a\n");
    assert_eq!(err.text(), "invalid schema type: schema must be an object, found array");
}

#[test]
fn boolean_schemas() {
    let raw = parse("3.1.0", "true\n").unwrap();
    assert_eq!(raw.boolean, Some(true));

    let err = error("3.1.0", "false\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidType);

    let err = error("3.0.3", "true\n");
    assert_eq!(err.text(), "invalid schema type: boolean schemas require OpenAPI 3.1");
}

#[test]
fn constraint_must_match_type() {
    let err = error("3.0.3", "type: integer\nminLength: 1\n");
    assert_eq!(err.kind(), DiagnosticKind::ConstraintMismatch);
    assert_eq!(
        err.text(),
        "constraint does not apply to this type: `minLength` applies to strings, not `integer`"
    );
    assert_eq!(err.pointer(), Some("/components/schemas/S"));

    let err = error("3.0.3", "type: string\nminLength: 5\nmaxLength: 2\n");
    assert_eq!(
        err.text(),
        "constraint does not apply to this type: `minLength` is greater than `maxLength`"
    );

    let err = error("3.0.3", "type: number\nmultipleOf: 0\n");
    assert_eq!(err.kind(), DiagnosticKind::ConstraintMismatch);

    assert!(parse("3.1.0", "type: [string, integer]\nminLength: 1\nminimum: 0\n").is_ok());
    assert!(parse("3.0.3", "minLength: 1\nminimum: 0\n").is_ok());
}

#[test]
fn bounds() {
    let raw = parse("3.0.3", "type: integer\nminimum: 1\nexclusiveMinimum: true\nmaximum: 10\n").unwrap();
    let min = raw.minimum.unwrap();
    assert_eq!(min.value, Number::Int(1));
    assert!(min.exclusive);
    assert!(!raw.maximum.unwrap().exclusive);

    let raw = parse("3.1.0", "type: number\nexclusiveMaximum: 2.5\n").unwrap();
    let max = raw.maximum.unwrap();
    assert!(max.exclusive);
    assert_eq!(max.value.as_f64(), 2.5);
}

#[test]
fn bad_regex() {
    let err = error("3.0.3", "type: string\npattern: \"(\"\n");
    assert_eq!(err.kind(), DiagnosticKind::BadRegex);
    assert!(err.text().starts_with("invalid regular expression: `(`: "));

    let err = error("3.1.0", "type: object\npatternProperties:\n  \"[\": {}\n");
    assert_eq!(err.kind(), DiagnosticKind::BadRegex);
}

#[test]
fn enum_values_must_match_type() {
    let raw = parse("3.0.3", "type: string\nnullable: true\nenum: [a, b, null]\n").unwrap();
    assert_eq!(raw.enum_values.unwrap()[2], Literal::Null);

    let err = error("3.0.3", "type: integer\nenum: [1, \"two\"]\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidEnumValue);
    assert_eq!(
        err.text(),
        "enum value does not match the schema type: \"two\" is not of type `integer`"
    );

    let err = error("3.0.3", "type: string\nenum: []\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidEnumValue);

    assert!(parse("3.0.3", "type: number\nconst: 3\n").is_ok());
}

#[test]
fn unsupported_keywords() {
    let err = error("3.1.0", "type: object\nif:\n  required: [a]\n");
    assert_eq!(err.kind(), DiagnosticKind::UnsupportedKeyword);
    assert_eq!(err.text(), "schema keyword `if` is not supported");

    let err = error("3.1.0", "type: object\npropertyNames:\n  type: integer\n");
    assert_eq!(err.kind(), DiagnosticKind::UnsupportedKeyword);

    let raw = parse("3.1.0", "type: object\npropertyNames:\n  pattern: \"^[a-z]+$\"\n").unwrap();
    assert!(raw.property_names.is_some());

    assert!(parse("3.0.3", "type: string\nexample: x\nxml:\n  name: y\n").is_ok());
}

#[test]
fn composition_and_discriminator() {
    let raw = parse(
        "3.0.3",
        indoc! {r##"
            oneOf:
              - $ref: "#/components/schemas/Dog"
              - $ref: "#/components/schemas/Cat"
            discriminator:
              propertyName: kind
              mapping:
                dog: "#/components/schemas/Dog"
                canine: "#/components/schemas/Dog"
                cat: Cat
        "##},
    )
    .unwrap();

    assert_eq!(raw.one_of.len(), 2);
    assert_eq!(raw.one_of[1].key.pointer, "/components/schemas/S/oneOf/1");
    let discriminator = raw.discriminator.unwrap();
    assert_eq!(discriminator.property, "kind");
    let tags: Vec<&str> = discriminator.mapping.iter().map(|m| m.0.as_str()).collect();
    assert_eq!(tags, ["dog", "canine", "cat"]);

    let err = error("3.0.3", "oneOf: []\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidStructure);

    let err = error("3.0.3", "oneOf: [{}]\ndiscriminator: {}\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidDiscriminator);
}

#[test]
fn tuples() {
    let raw = parse("3.1.0", "type: array\nprefixItems:\n  - type: string\n  - type: integer\nitems: false\n").unwrap();
    assert_eq!(raw.prefix_items.len(), 2);
    assert!(raw.items.is_none());

    let err = error("3.0.3", "type: array\nitems:\n  - type: string\n");
    assert_eq!(err.kind(), DiagnosticKind::InvalidStructure);
}

#[test]
fn nesting_is_bounded() {
    let nested = |levels: usize| {
        format!(
            "{}{{\"type\": \"string\"}}{}",
            "{\"type\": \"array\", \"items\": ".repeat(levels),
            "}".repeat(levels)
        )
    };
    let limits = ParseLimits {
        fuel: 1_000_000,
        depth: 1000,
    };
    let parser = SchemaParser::new(SpecVersion::parse("3.1.0").unwrap());
    let url = Url::parse("file:///api.json").unwrap();
    let key = RefKey::new(&url, "/components/schemas/S");

    let shallow = parse_json(&nested(10), SourceId::default(), limits).unwrap();
    assert!(parser.parse(&shallow, SourceId::default(), key.clone()).is_ok());

    let deep = parse_json(&nested(200), SourceId::default(), limits).unwrap();
    let err = parser.parse(&deep, SourceId::default(), key).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::ParseLimit);
}
