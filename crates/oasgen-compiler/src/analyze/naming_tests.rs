use indoc::indoc;
use oasgen_core::keywords;

use super::{NameAllocator, sanitize};
use crate::Compiler;
use crate::config::{Case, CompileConfig, NamingConfig};
use crate::ir::TypeKind;

#[test]
fn claim_suffixes_taken_names() {
    let mut names = NameAllocator::new(keywords::GO);
    assert_eq!(names.claim("Pet"), "Pet");
    assert_eq!(names.claim("Pet"), "Pet2");
    assert_eq!(names.claim("Pet"), "Pet3");
    assert!(names.is_taken("Pet2"));

    names.release("Pet2");
    assert!(!names.is_taken("Pet2"));
    assert_eq!(names.claim("Pet"), "Pet2");
}

#[test]
fn sanitize_identifiers() {
    assert_eq!(sanitize("pet-store", keywords::GO), "petstore");
    assert_eq!(sanitize("200Response", keywords::GO), "T200Response");
    assert_eq!(sanitize("type", keywords::GO), "type_");
    assert_eq!(sanitize("type", keywords::TYPESCRIPT), "type");
    assert_eq!(sanitize("", keywords::GO), "Unnamed");
    assert_eq!(sanitize("€", keywords::GO), "Unnamed");
}

#[test]
fn colliding_component_names() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            pet-item:
              type: object
              properties:
                name: {type: string}
            PetItem:
              type: object
              properties:
                tag: {type: string}
            Named:
              x-ogen-name: Renamed
              type: object
              properties:
                id: {type: string}
    "#});

    assert_eq!(
        ir.component("/components/schemas/pet-item").unwrap().name,
        "PetItem"
    );
    assert_eq!(
        ir.component("/components/schemas/PetItem").unwrap().name,
        "PetItem2"
    );
    assert_eq!(ir.component("/components/schemas/Named").unwrap().name, "Renamed");
    assert_eq!(
        ir.names.get("file:///api/openapi.yaml#/components/schemas/PetItem"),
        Some(&"PetItem2".to_string())
    );
}

#[test]
fn field_names_are_unique_per_struct() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        components:
          schemas:
            User:
              type: object
              properties:
                user-id: {type: string}
                user_id: {type: string}
                type: {type: string}
    "#});

    let TypeKind::Struct { fields, .. } = &ir.type_by_name("User").unwrap().kind else {
        panic!("expected a struct");
    };
    let names: Vec<(&str, &str)> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.target_name.as_str()))
        .collect();
    assert_eq!(
        names,
        [("user-id", "UserId"), ("user_id", "UserId2"), ("type", "Type")]
    );
}

#[test]
fn snake_case_fields_avoid_keywords() {
    let naming = NamingConfig {
        fields: Case::Snake,
        ..NamingConfig::default()
    };
    let ir = Compiler::expect_valid_with(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            components:
              schemas:
                Item:
                  type: object
                  properties:
                    type: {type: string}
                    petId: {type: string}
        "#},
        CompileConfig::default().with_naming(naming),
    );

    let TypeKind::Struct { fields, .. } = &ir.type_by_name("Item").unwrap().kind else {
        panic!("expected a struct");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.target_name.as_str()).collect();
    assert_eq!(names, ["type_", "pet_id"]);
}

#[test]
fn operation_names() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /pets/{id}:
            parameters:
              - {name: id, in: path, required: true, schema: {type: string}}
            get:
              responses:
                "200": {description: ok}
            delete:
              operationId: remove_pet
              responses:
                "204": {description: gone}
    "#});

    let names: Vec<&str> = ir.operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["GetPetsId", "RemovePet"]);
    assert_eq!(
        ir.operation_by_name("RemovePet").unwrap().operation_id.as_deref(),
        Some("remove_pet")
    );
}
