use indoc::indoc;

use crate::Compiler;
use crate::config::CompileConfig;
use crate::diagnostics::DiagnosticKind;
use crate::ir::{Discriminator, Ir, JsonType, Literal, Number, PrimitiveKind, TypeKind, Validation};
use crate::test_utils::kinds;

fn fields(ir: &Ir, name: &str) -> Vec<(String, String, bool)> {
    let Some(ty) = ir.type_by_name(name) else {
        panic!("no type `{}`", name);
    };
    let TypeKind::Struct { fields, .. } = &ty.kind else {
        panic!("`{}` is a {}", name, ty.kind.name());
    };
    fields
        .iter()
        .map(|f| (f.name.clone(), ir.ty(f.ty.id).name.clone(), f.required))
        .collect()
}

fn validation<'a>(ir: &'a Ir, name: &str) -> (&'a PrimitiveKind, &'a Validation) {
    let Some(ty) = ir.type_by_name(name) else {
        panic!("no type `{}`", name);
    };
    let TypeKind::Primitive { kind, validation, .. } = &ty.kind else {
        panic!("`{}` is a {}", name, ty.kind.name());
    };
    (kind, validation)
}

#[test]
fn recursive_component_through_array() {
    let ir = Compiler::expect_valid(indoc! {r##"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Node:
              type: object
              properties:
                children:
                  type: array
                  items:
                    $ref: "#/components/schemas/Node"
    "##});

    let names: Vec<&str> = ir.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["NodeArray", "OptNodeArray", "Node"]);
    assert_eq!(
        fields(&ir, "Node"),
        [("children".to_string(), "OptNodeArray".to_string(), false)]
    );

    let TypeKind::Array { element, .. } = &ir.type_by_name("NodeArray").unwrap().kind else {
        panic!("expected an array");
    };
    assert!(element.indirect);
    assert_eq!(ir.ty(element.id).name, "Node");
    assert_eq!(ir.component("/components/schemas/Node").unwrap().name, "Node");
}

#[test]
fn nullable_optional_property() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.0.3
        info: {title: t, version: "1"}
        paths: {}
        components:
          schemas:
            Pet:
              type: object
              required: [id]
              properties:
                id:
                  type: integer
                  format: int64
                nick:
                  type: string
                  nullable: true
    "#});

    assert_eq!(
        fields(&ir, "Pet"),
        [
            ("id".to_string(), "Int64".to_string(), true),
            ("nick".to_string(), "OptNilString".to_string(), false),
        ]
    );
    let nick = ir.type_by_name("OptNilString").unwrap();
    assert!(nick.is_optional());
    assert!(nick.is_nullable());

    let TypeKind::Struct { fields, .. } = &ir.type_by_name("Pet").unwrap().kind else {
        panic!("expected a struct");
    };
    assert!(fields[1].nullable);
    assert!(!fields[0].nullable);
}

#[test]
fn sum_by_unique_fields() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Shape:
              oneOf:
                - required: [a]
                - required: [b]
    "#});

    let TypeKind::Sum {
        variants,
        discriminator,
    } = &ir.type_by_name("Shape").unwrap().kind
    else {
        panic!("expected a sum");
    };
    assert_eq!(*discriminator, Discriminator::ByUniqueFields);
    let unique: Vec<&[String]> = variants.iter().map(|v| v.unique_fields.as_slice()).collect();
    assert_eq!(unique, [["a".to_string()], ["b".to_string()]]);
}

#[test]
fn sum_by_explicit_mapping() {
    let ir = Compiler::expect_valid(indoc! {r##"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Pet:
              oneOf:
                - $ref: "#/components/schemas/Dog"
                - $ref: "#/components/schemas/Cat"
              discriminator:
                propertyName: kind
                mapping:
                  dog: "#/components/schemas/Dog"
                  canine: "#/components/schemas/Dog"
            Dog:
              type: object
              properties:
                kind: {type: string}
                bark: {type: boolean}
            Cat:
              type: object
              properties:
                kind: {type: string}
                meow: {type: boolean}
    "##});

    let TypeKind::Sum {
        variants,
        discriminator,
    } = &ir.type_by_name("Pet").unwrap().kind
    else {
        panic!("expected a sum");
    };
    assert_eq!(
        *discriminator,
        Discriminator::Explicit {
            property: "kind".to_string()
        }
    );
    let tags: Vec<(String, Vec<String>)> = variants
        .iter()
        .map(|v| (ir.ty(v.ty.id).name.clone(), v.tags.clone()))
        .collect();
    assert_eq!(
        tags,
        [
            ("Dog".to_string(), vec!["dog".to_string(), "canine".to_string()]),
            ("Cat".to_string(), vec!["Cat".to_string()]),
        ]
    );
}

#[test]
fn discriminator_requires_references() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Pet:
                  oneOf:
                    - type: object
                      properties: {kind: {type: string}}
                    - type: object
                      properties: {kind: {type: string}}
                  discriminator:
                    propertyName: kind
        "#},
        CompileConfig::default(),
    );
    assert!(compilation.ir.is_none());
    assert_eq!(kinds(&compilation), [DiagnosticKind::InvalidDiscriminator]);
}

#[test]
fn indistinguishable_variants() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Either:
                  oneOf:
                    - type: string
                      maxLength: 3
                    - type: string
                      minLength: 5
        "#},
        CompileConfig::default(),
    );
    assert_eq!(kinds(&compilation), [DiagnosticKind::AmbiguousSum]);
}

#[test]
fn type_union_is_sum_by_json_type() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Id:
              type: [string, integer]
    "#});

    let TypeKind::Sum {
        variants,
        discriminator,
    } = &ir.type_by_name("Id").unwrap().kind
    else {
        panic!("expected a sum");
    };
    assert_eq!(*discriminator, Discriminator::ByJsonType);
    let wire: Vec<Option<JsonType>> = variants.iter().map(|v| v.json_type).collect();
    // Integers are told apart from other numbers after decoding, not on the wire.
    assert_eq!(wire, [Some(JsonType::String), Some(JsonType::Number)]);
}

#[test]
fn free_form_object_is_map_of_any() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Labels:
              type: object
              additionalProperties:
                type: string
            Bag:
              type: object
    "#});

    let labels = ir.type_by_name("Labels").unwrap();
    let TypeKind::Alias { target } = &labels.kind else {
        panic!("expected an alias, got {}", labels.kind.name());
    };
    assert_eq!(ir.ty(target.id).name, "StringMap");

    let bag = ir.resolve_alias(ir.type_id_by_name("Bag").unwrap());
    let TypeKind::Map { value, closed, .. } = &ir.ty(bag).kind else {
        panic!("expected a map");
    };
    assert!(!closed);
    assert_eq!(ir.ty(value.unwrap().id).kind, TypeKind::Any);
}

#[test]
fn structural_types_are_shared() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            A:
              type: object
              required: [tags]
              properties:
                tags: {type: array, items: {type: string}}
            B:
              type: object
              required: [names]
              properties:
                names: {type: array, items: {type: string}}
    "#});

    assert_eq!(
        fields(&ir, "A"),
        [("tags".to_string(), "StringArray".to_string(), true)]
    );
    assert_eq!(
        fields(&ir, "B"),
        [("names".to_string(), "StringArray".to_string(), true)]
    );
    let arrays = ir
        .types
        .iter()
        .filter(|t| matches!(t.kind, TypeKind::Array { .. }))
        .count();
    assert_eq!(arrays, 1);
}

#[test]
fn enumeration_values() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Status:
              type: string
              enum: [available, sold]
    "#});

    let TypeKind::Enum { base, values } = &ir.type_by_name("Status").unwrap().kind else {
        panic!("expected an enum");
    };
    assert_eq!(*base, PrimitiveKind::String);
    let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["StatusAvailable", "StatusSold"]);
}

#[test]
fn duplicate_enum_value() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Status:
                  type: string
                  enum: [a, b, a]
        "#},
        CompileConfig::default(),
    );
    assert_eq!(kinds(&compilation), [DiagnosticKind::InvalidEnumValue]);
}

#[test]
fn integer_width_follows_bounds() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Small:
              type: object
              required: [n]
              properties:
                n: {type: integer}
            Big:
              type: object
              required: [n]
              properties:
                n: {type: integer, maximum: 10000000000}
    "#});

    let small = fields(&ir, "Small");
    assert_eq!(small[0].1, "Int32");
    let big = ir.type_by_name("Big").unwrap();
    let TypeKind::Struct { fields, .. } = &big.kind else {
        panic!("expected a struct");
    };
    let TypeKind::Primitive { kind, .. } = &ir.ty(fields[0].ty.id).kind else {
        panic!("expected a primitive");
    };
    assert_eq!(*kind, PrimitiveKind::Int64);
}

#[test]
fn unknown_format_is_a_warning() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Code:
                  type: string
                  format: isbn
        "#},
        CompileConfig::default(),
    );
    assert!(compilation.is_success());
    assert_eq!(kinds(&compilation), [DiagnosticKind::UnknownFormat]);
}

#[test]
fn custom_format_is_kept() {
    let config = CompileConfig::default().with_custom_format("string", "isbn");
    let ir = Compiler::expect_valid_with(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Book:
                  type: object
                  required: [code]
                  properties:
                    code: {type: string, format: isbn}
        "#},
        config,
    );

    let TypeKind::Struct { fields, .. } = &ir.type_by_name("Book").unwrap().kind else {
        panic!("expected a struct");
    };
    let TypeKind::Primitive { format, .. } = &ir.ty(fields[0].ty.id).kind else {
        panic!("expected a primitive");
    };
    assert_eq!(format.as_ref().map(|f| f.as_str()), Some("isbn"));
}

#[test]
fn explicit_int32_keeps_its_width() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Count:
              type: integer
              format: int32
              minimum: 0
              maximum: 1000
    "#});

    let (kind, validation) = validation(&ir, "Count");
    assert_eq!(*kind, PrimitiveKind::Int32);
    assert_eq!(validation.maximum.map(|b| b.value), Some(Number::Int(1000)));
}

#[test]
fn int32_bound_out_of_range() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Count:
                  type: integer
                  format: int32
                  maximum: 10000000000
        "#},
        CompileConfig::default(),
    );
    assert!(!compilation.is_success());
    assert_eq!(kinds(&compilation), [DiagnosticKind::ConstraintMismatch]);
}

#[test]
fn narrow_format_bound_out_of_range() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Level:
                  type: integer
                  format: uint8
                  maximum: 300
        "#},
        CompileConfig::default(),
    );
    assert_eq!(kinds(&compilation), [DiagnosticKind::ConstraintMismatch]);
}

#[test]
fn unsupported_integer_format() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Count:
                  type: integer
                  format: weird
        "#},
        CompileConfig::default(),
    );
    assert!(!compilation.is_success());
    assert_eq!(kinds(&compilation), [DiagnosticKind::UnsupportedFormat]);
}

#[test]
fn all_of_nullable_branch() {
    let ir = Compiler::expect_valid(indoc! {r##"
        openapi: 3.0.3
        info: {title: t, version: "1"}
        paths: {}
        components:
          schemas:
            Code:
              allOf:
                - {type: string, nullable: true}
                - {type: string, minLength: 2}
            Holder:
              type: object
              required: [code]
              properties:
                code: {$ref: "#/components/schemas/Code"}
    "##});

    let TypeKind::Struct { fields, .. } = &ir.type_by_name("Holder").unwrap().kind else {
        panic!("expected a struct");
    };
    let TypeKind::Generic {
        optional, nullable, ..
    } = &ir.ty(fields[0].ty.id).kind
    else {
        panic!("expected a generic");
    };
    assert!(!*optional);
    assert!(*nullable);

    let (kind, validation) = validation(&ir, "Code");
    assert_eq!(*kind, PrimitiveKind::String);
    assert_eq!(validation.min_length, Some(2));
}

#[test]
fn all_of_intersects_bounds() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Score:
              allOf:
                - {type: integer, minimum: 1, maximum: 10}
                - {minimum: 5, maximum: 8}
    "#});

    let (kind, validation) = validation(&ir, "Score");
    assert_eq!(*kind, PrimitiveKind::Int32);
    assert_eq!(validation.minimum.map(|b| b.value), Some(Number::Int(5)));
    assert_eq!(validation.maximum.map(|b| b.value), Some(Number::Int(8)));
}

#[test]
fn all_of_type_conflict() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Bad:
                  allOf:
                    - {type: string}
                    - {type: integer}
        "#},
        CompileConfig::default(),
    );
    assert!(!compilation.is_success());
    assert_eq!(kinds(&compilation), [DiagnosticKind::AllOfConflict]);
}

#[test]
fn not_enum_excludes_values() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            Username:
              type: string
              not: {enum: [admin, root]}
    "#});

    let (kind, validation) = validation(&ir, "Username");
    assert_eq!(*kind, PrimitiveKind::String);
    assert_eq!(
        validation.excluded,
        [
            Literal::String("admin".to_string()),
            Literal::String("root".to_string())
        ]
    );
}

#[test]
fn not_with_constraints_is_unsupported() {
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Name:
                  type: string
                  not: {minLength: 3}
        "#},
        CompileConfig::default(),
    );
    assert!(!compilation.is_success());
    assert_eq!(kinds(&compilation), [DiagnosticKind::UnsupportedNot]);
}
