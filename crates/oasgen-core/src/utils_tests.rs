use crate::keywords::{GO, is_reserved};
use crate::utils::{is_identifier, split_words, to_camel_case, to_pascal_case, to_snake_case};

#[test]
fn pascal_case_from_snake() {
    assert_eq!(to_pascal_case("foo_bar"), "FooBar");
    assert_eq!(to_pascal_case("foo"), "Foo");
    assert_eq!(to_pascal_case("_foo"), "Foo");
    assert_eq!(to_pascal_case("foo_"), "Foo");
}

#[test]
fn pascal_case_normalizes() {
    assert_eq!(to_pascal_case("FOO_BAR"), "FooBar");
    assert_eq!(to_pascal_case("FOO"), "Foo");
    assert_eq!(to_pascal_case("FOOBAR"), "Foobar");
}

#[test]
fn pascal_case_idempotent() {
    assert_eq!(to_pascal_case("FooBar"), "FooBar");
    assert_eq!(to_pascal_case("QRow"), "QRow");
    assert_eq!(to_pascal_case("Q"), "Q");
}

#[test]
fn pascal_case_from_camel() {
    assert_eq!(to_pascal_case("petId"), "PetId");
    assert_eq!(to_pascal_case("listPets"), "ListPets");
}

#[test]
fn pascal_case_from_media_type() {
    assert_eq!(to_pascal_case("application/json"), "ApplicationJson");
    assert_eq!(to_pascal_case("multipart/form-data"), "MultipartFormData");
}

#[test]
fn pascal_case_from_path() {
    assert_eq!(to_pascal_case("/pets/{petId}"), "PetsPetId");
    assert_eq!(to_pascal_case("2XX"), "2xx");
}

#[test]
fn camel_case() {
    assert_eq!(to_camel_case("PetId"), "petId");
    assert_eq!(to_camel_case("pet_id"), "petId");
    assert_eq!(to_camel_case("HTTPServer"), "httpServer");
}

#[test]
fn snake_case_from_pascal() {
    assert_eq!(to_snake_case("FooBar"), "foo_bar");
    assert_eq!(to_snake_case("Foo"), "foo");
}

#[test]
fn snake_case_from_camel() {
    assert_eq!(to_snake_case("fooBar"), "foo_bar");
    assert_eq!(to_snake_case("fooBarBaz"), "foo_bar_baz");
}

#[test]
fn words_split_on_acronyms_and_digits() {
    assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
    assert_eq!(split_words("int32Value"), ["int32", "Value"]);
    assert_eq!(split_words("x-ogen-name"), ["x", "ogen", "name"]);
    assert!(split_words("--").is_empty());
}

#[test]
fn identifiers() {
    assert!(is_identifier("listPets"));
    assert!(is_identifier("_x1"));
    assert!(!is_identifier("1x"));
    assert!(!is_identifier("list-pets"));
    assert!(!is_identifier(""));
}

#[test]
fn reserved_words() {
    assert!(is_reserved(GO, "type"));
    assert!(!is_reserved(GO, "Type"));
}
