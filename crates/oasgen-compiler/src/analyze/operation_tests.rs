use indoc::indoc;

use crate::Compiler;
use crate::config::CompileConfig;
use crate::diagnostics::DiagnosticKind;
use crate::ir::{
    BodyShape, Discriminator, Method, ParameterContent, ParameterIn, ParameterStyle,
    PrimitiveKind, StatusPattern, TypeKind,
};
use crate::router::Match;
use crate::test_utils::kinds;

fn compile_kinds(src: &str) -> Vec<DiagnosticKind> {
    kinds(&Compiler::compile_str(src, CompileConfig::default()))
}

const PETS: &str = indoc! {r##"
    openapi: 3.1.0
    info: {title: Petstore, version: "1"}
    paths:
      /pets:
        get:
          operationId: listPets
          tags: [pets]
          parameters:
            - name: limit
              in: query
              schema: {type: integer, maximum: 100}
          responses:
            "200":
              description: A page of pets.
              headers:
                X-Next:
                  schema: {type: string}
              content:
                application/json:
                  schema:
                    type: array
                    items: {$ref: "#/components/schemas/Pet"}
            default:
              description: Unexpected error.
        post:
          operationId: createPet
          x-ogen-operation-group: admin
          requestBody:
            required: true
            content:
              application/json:
                schema: {$ref: "#/components/schemas/Pet"}
          responses:
            "201": {description: Created.}
      /pets/{petId}:
        parameters:
          - name: petId
            in: path
            required: true
            schema: {type: string}
        get:
          operationId: showPetById
          responses:
            "200":
              description: The pet.
              content:
                application/json:
                  schema: {$ref: "#/components/schemas/Pet"}
    components:
      schemas:
        Pet:
          type: object
          required: [id, name]
          properties:
            id: {type: integer, format: int64}
            name: {type: string}
"##};

#[test]
fn petstore_operations() {
    let ir = Compiler::expect_valid(PETS);

    let names: Vec<(&str, Method)> = ir
        .operations
        .iter()
        .map(|o| (o.name.as_str(), o.method))
        .collect();
    assert_eq!(
        names,
        [
            ("ListPets", Method::Get),
            ("CreatePet", Method::Post),
            ("ShowPetById", Method::Get),
        ]
    );

    let list = ir.operation_by_name("ListPets").unwrap();
    assert_eq!(list.tags, ["pets"]);
    let limit = &list.params[0];
    assert_eq!(limit.name, "limit");
    assert_eq!(limit.target_name, "Limit");
    assert_eq!(limit.in_, ParameterIn::Query);
    assert_eq!(limit.style, ParameterStyle::Form);
    assert!(limit.explode);
    assert!(!limit.required);

    let statuses: Vec<StatusPattern> = list.responses.keys().copied().collect();
    assert_eq!(statuses, [StatusPattern::Exact(200), StatusPattern::Default]);
    let ok = &list.responses[&StatusPattern::Exact(200)];
    assert_eq!(ok.headers.len(), 1);
    assert_eq!(ok.headers[0].target_name, "XNext");
    let Some(BodyShape::Single(page)) = ok.shape else {
        panic!("expected a single content");
    };
    assert_eq!(ir.ty(page.id).name, "PetArray");
    assert!(list.responses[&StatusPattern::Default].shape.is_none());

    let create = ir.operation_by_name("CreatePet").unwrap();
    let body = create.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(ir.ty(body.shape.ty().id).name, "Pet");
    assert_eq!(create.group.as_deref(), Some("admin"));
    assert_eq!(ir.groups.len(), 1);
    assert_eq!(ir.groups[0].name, "admin");

    let show = ir.operation_by_name("ShowPetById").unwrap();
    assert_eq!(show.path_params().count(), 1);
}

#[test]
fn petstore_routes() {
    let ir = Compiler::expect_valid(PETS);

    let Match::Found(route) = ir.find_route(Method::Get, "/pets/42") else {
        panic!("no route");
    };
    assert_eq!(ir.operation(route.operation).name, "ShowPetById");
    assert_eq!(route.arg("petId"), Some("42"));

    let Match::Found(route) = ir.find_route(Method::Post, "/pets") else {
        panic!("no route");
    };
    assert_eq!(ir.operation(route.operation).name, "CreatePet");

    assert_eq!(
        ir.find_route(Method::Delete, "/pets"),
        Match::MethodNotAllowed {
            allow: vec![Method::Get, Method::Post]
        }
    );
    assert_eq!(ir.find_route(Method::Get, "/owners"), Match::NotFound);
}

#[test]
fn same_shape_routes_conflict() {
    let src = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /pets/{id}:
            get:
              parameters:
                - {name: id, in: path, required: true, schema: {type: string}}
              responses: {}
          /pets/{name}:
            get:
              parameters:
                - {name: name, in: path, required: true, schema: {type: string}}
              responses: {}
    "#};
    assert_eq!(compile_kinds(src), [DiagnosticKind::RouteConflict]);

    let diagnostics = Compiler::expect_invalid(src);
    assert!(diagnostics.contains("GET /pets/{}"));
    assert!(diagnostics.contains("first defined here"));
}

#[test]
fn downgraded_conflict_drops_operation() {
    let config = CompileConfig::default().with_downgrade(DiagnosticKind::RouteConflict);
    let compilation = Compiler::compile_str(
        indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            paths:
              /pets/{id}:
                get:
                  operationId: byId
                  parameters:
                    - {name: id, in: path, required: true, schema: {type: string}}
                  responses: {}
              /pets/{name}:
                get:
                  operationId: byName
                  parameters:
                    - {name: name, in: path, required: true, schema: {type: string}}
                  responses: {}
        "#},
        config,
    );

    assert!(compilation.is_success());
    assert_eq!(kinds(&compilation), [DiagnosticKind::RouteConflict]);
    assert_eq!(compilation.diagnostics.warning_count(), 1);
    let ir = compilation.ir.unwrap();
    let names: Vec<&str> = ir.operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["ById"]);
    assert_eq!(ir.router.len(), 1);
}

#[test]
fn missing_path_parameter() {
    let src = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /pets/{id}:
            get:
              responses: {}
    "#};
    assert_eq!(compile_kinds(src), [DiagnosticKind::PathParameterMissing]);
    assert!(Compiler::expect_invalid(src).contains("declare `id` with `in: path`"));
}

#[test]
fn undeclared_template_parameter() {
    assert_eq!(
        compile_kinds(indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            paths:
              /pets:
                get:
                  parameters:
                    - {name: id, in: path, required: true, schema: {type: string}}
                  responses: {}
        "#}),
        [DiagnosticKind::UnknownPathParameter]
    );
}

#[test]
fn optional_path_parameter() {
    let diagnostics = Compiler::expect_invalid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /pets/{id}:
            get:
              parameters:
                - {name: id, in: path, schema: {type: string}}
              responses: {}
    "#});
    assert!(diagnostics.contains("path parameter `id` must be required"));
}

#[test]
fn invalid_path_template() {
    assert_eq!(
        compile_kinds(indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            paths:
              "/pets/{id":
                get:
                  responses: {}
        "#}),
        [DiagnosticKind::InvalidPathTemplate]
    );
}

#[test]
fn duplicate_operation_id() {
    assert_eq!(
        compile_kinds(indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            paths:
              /a:
                get:
                  operationId: fetch
                  responses: {}
              /b:
                get:
                  operationId: fetch
                  responses: {}
        "#}),
        [DiagnosticKind::DuplicateOperationName]
    );
}

#[test]
fn operation_parameters_override_path_parameters() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            parameters:
              - {name: limit, in: query, schema: {type: string}}
              - {name: Accept, in: header, schema: {type: string}}
              - {name: trace, in: header, schema: {type: string}}
            get:
              parameters:
                - {name: limit, in: query, required: true, schema: {type: integer}}
              responses: {}
    "#});

    let op = &ir.operations[0];
    let params: Vec<(&str, ParameterIn, bool)> = op
        .params
        .iter()
        .map(|p| (p.name.as_str(), p.in_, p.required))
        .collect();
    assert_eq!(
        params,
        [
            ("limit", ParameterIn::Query, true),
            ("trace", ParameterIn::Header, false),
        ]
    );
    let ParameterContent::Schema(ty) = &op.params[0].content else {
        panic!("expected a schema parameter");
    };
    let TypeKind::Primitive { kind, .. } = &ir.ty(ty.id).kind else {
        panic!("expected a primitive");
    };
    assert_eq!(*kind, PrimitiveKind::Int32);
}

#[test]
fn parameter_declared_twice() {
    let diagnostics = Compiler::expect_invalid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            get:
              parameters:
                - {name: q, in: query, schema: {type: string}}
                - {name: q, in: query, schema: {type: string}}
              responses: {}
    "#});
    assert!(diagnostics.contains("parameter `q` in query is declared twice"));
}

#[test]
fn unserializable_parameters() {
    let deep_primitive = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            get:
              parameters:
                - name: filter
                  in: query
                  style: deepObject
                  schema: {type: integer}
              responses: {}
    "#};
    assert_eq!(
        compile_kinds(deep_primitive),
        [DiagnosticKind::UnsupportedParameter]
    );

    let nested = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            get:
              parameters:
                - name: grid
                  in: query
                  schema:
                    type: array
                    items: {type: array, items: {type: integer}}
              responses: {}
    "#};
    assert!(Compiler::expect_invalid(nested)
        .contains("nested objects and arrays cannot be serialized"));

    let wrong_location = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items/{id}:
            get:
              parameters:
                - name: id
                  in: path
                  required: true
                  style: form
                  schema: {type: string}
              responses: {}
    "#};
    assert_eq!(
        compile_kinds(wrong_location),
        [DiagnosticKind::UnsupportedParameter]
    );
}

#[test]
fn deep_object_parameter() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            get:
              operationId: search
              parameters:
                - name: filter
                  in: query
                  style: deepObject
                  explode: true
                  schema:
                    type: object
                    properties:
                      color: {type: string}
              responses: {}
    "#});

    let filter = &ir.operations[0].params[0];
    assert_eq!(filter.style, ParameterStyle::DeepObject);
    assert_eq!(ir.ty(filter.content.ty().id).name, "SearchParamsFilter");
}

#[test]
fn body_shapes() {
    let ir = Compiler::expect_valid(indoc! {r##"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /shared:
            post:
              operationId: shared
              requestBody:
                content:
                  application/json:
                    schema: {$ref: "#/components/schemas/Pet"}
                  application/vnd.pet+json:
                    schema: {$ref: "#/components/schemas/Pet"}
              responses: {}
          /split:
            post:
              operationId: split
              requestBody:
                content:
                  application/json:
                    schema: {$ref: "#/components/schemas/Pet"}
                  application/octet-stream: {}
              responses: {}
        components:
          schemas:
            Pet:
              type: object
              properties:
                name: {type: string}
    "##});

    let shared = ir.operation_by_name("Shared").unwrap();
    let Some(body) = &shared.request_body else {
        panic!("expected a body");
    };
    let BodyShape::Shared(ty) = body.shape else {
        panic!("expected a shared body");
    };
    assert_eq!(ir.ty(ty.id).name, "Pet");

    let split = ir.operation_by_name("Split").unwrap();
    let Some(body) = &split.request_body else {
        panic!("expected a body");
    };
    let BodyShape::PerContent(ty) = body.shape else {
        panic!("expected a body per content");
    };
    let sum = ir.ty(ty.id);
    assert_eq!(sum.name, "SplitReq");
    let TypeKind::Sum {
        variants,
        discriminator,
    } = &sum.kind
    else {
        panic!("expected a sum");
    };
    assert_eq!(*discriminator, Discriminator::ByContentType);
    let variants: Vec<(&str, Option<&str>, &str)> = variants
        .iter()
        .map(|v| {
            (
                v.name.as_str(),
                v.content_type.as_deref(),
                ir.ty(v.ty.id).name.as_str(),
            )
        })
        .collect();
    assert_eq!(
        variants,
        [
            ("ApplicationJson", Some("application/json"), "Pet"),
            ("ApplicationOctetStream", Some("application/octet-stream"), "Stream"),
        ]
    );
}

#[test]
fn overlapping_media_types() {
    let src = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            post:
              requestBody:
                content:
                  application/json:
                    schema: {type: string}
                  Application/JSON:
                    schema: {type: string}
              responses: {}
    "#};
    assert_eq!(compile_kinds(src), [DiagnosticKind::MediaPatternOverlap]);
    assert!(Compiler::expect_invalid(src).contains("`Application/JSON` overlaps an earlier entry"));
}

#[test]
fn duplicate_response_status() {
    let diagnostics = Compiler::expect_invalid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /items:
            get:
              responses:
                2XX: {description: a}
                2xx: {description: b}
    "#});
    assert!(diagnostics.contains("is declared twice"));
}

#[test]
fn security_requirements() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        security:
          - api_key: []
        paths:
          /default:
            get:
              responses: {}
          /public:
            get:
              security: []
              responses: {}
          /oauth:
            get:
              security:
                - petstore_auth: ["read:pets"]
              responses: {}
        components:
          securitySchemes:
            api_key:
              type: apiKey
              name: X-API-Key
              in: header
            petstore_auth:
              type: oauth2
              flows:
                implicit:
                  authorizationUrl: https://example.com/auth
                  scopes:
                    "read:pets": read your pets
    "#});

    let schemes: Vec<(&str, &str)> = ir
        .security
        .schemes
        .iter()
        .map(|s| (s.key.as_str(), s.name.as_str()))
        .collect();
    assert_eq!(schemes, [("api_key", "ApiKey"), ("petstore_auth", "PetstoreAuth")]);

    let uses = |path: &str| -> Vec<String> {
        let op = ir
            .operations
            .iter()
            .find(|o| o.path.as_ref().is_some_and(|p| p.raw() == path))
            .unwrap();
        op.security
            .iter()
            .flat_map(|r| &r.schemes)
            .map(|s| format!("{}{:?}", s.scheme, s.scopes))
            .collect()
    };
    assert_eq!(uses("/default"), ["api_key[]"]);
    assert!(uses("/public").is_empty());
    assert_eq!(uses("/oauth"), ["petstore_auth[\"read:pets\"]"]);
}

#[test]
fn unknown_security_scheme() {
    assert_eq!(
        compile_kinds(indoc! {r#"
            openapi: 3.1.0
            info: {title: t, version: "1"}
            paths:
              /items:
                get:
                  security:
                    - missing: []
                  responses: {}
        "#}),
        [DiagnosticKind::UnknownSecurityScheme]
    );
}

#[test]
fn filters_select_operations() {
    let src = indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        paths:
          /pets:
            get:
              operationId: listPets
              responses: {}
            post:
              operationId: createPet
              responses: {}
          /stores:
            get:
              operationId: listStores
              responses: {}
    "#};

    let config = CompileConfig::default().with_filter_methods([Method::Get]);
    let ir = Compiler::expect_valid_with(src, config);
    let names: Vec<&str> = ir.operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["ListPets", "ListStores"]);

    let config = CompileConfig::default().with_filter_path("^/pets").unwrap();
    let ir = Compiler::expect_valid_with(src, config);
    let names: Vec<&str> = ir.operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["ListPets", "CreatePet"]);
}

#[test]
fn webhooks_have_no_route() {
    let ir = Compiler::expect_valid(indoc! {r#"
        openapi: 3.1.0
        info: {title: t, version: "1"}
        webhooks:
          new-pet:
            post:
              requestBody:
                content:
                  application/json:
                    schema: {type: string}
              responses:
                "200": {description: ok}
    "#});

    assert_eq!(ir.webhooks.len(), 1);
    assert_eq!(ir.webhooks[0].name, "NewPet");
    let op = ir.operation(ir.webhooks[0].operations[0]);
    assert!(op.path.is_none());
    assert_eq!(op.name, "PostNewPet");
    assert!(ir.router.is_empty());
}
