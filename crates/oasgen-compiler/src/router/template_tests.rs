use super::percent;
use super::{PathTemplate, Segment, TemplateError};

#[test]
fn segments_and_shape() {
    let t = PathTemplate::parse("/name/{id}/{foo}1234{bar}-{baz}!{kek}").unwrap();
    assert_eq!(t.params().collect::<Vec<_>>(), ["id", "foo", "bar", "baz", "kek"]);
    assert_eq!(t.shape(), "/name/{}/{}1234{}-{}!{}");
    assert_eq!(t.segments()[0], Segment::Literal("/name/".to_string()));
    assert_eq!(t.segments()[1], Segment::Param("id".to_string()));
    assert!(t.has_param("baz"));
    assert_eq!(t.to_string(), "/name/{id}/{foo}1234{bar}-{baz}!{kek}");
}

#[test]
fn same_shape_for_renamed_params() {
    let a = PathTemplate::parse("/pets/{id}").unwrap();
    let b = PathTemplate::parse("/pets/{name}").unwrap();
    assert_ne!(a, b);
    assert_eq!(a.shape(), b.shape());
}

#[test]
fn rejects_malformed_templates() {
    assert_eq!(PathTemplate::parse("pets"), Err(TemplateError::NoLeadingSlash));
    assert_eq!(PathTemplate::parse("/pets/{id"), Err(TemplateError::Unclosed(6)));
    assert_eq!(PathTemplate::parse("/pets/id}"), Err(TemplateError::Unopened(8)));
    assert_eq!(PathTemplate::parse("/pets/{}"), Err(TemplateError::EmptyParam(6)));
    assert_eq!(
        PathTemplate::parse("/{id}/{id}"),
        Err(TemplateError::DuplicateParam("id".to_string()))
    );
    assert_eq!(
        PathTemplate::parse("/{a}{b}"),
        Err(TemplateError::AdjacentParams("a".to_string(), "b".to_string()))
    );
}

#[test]
fn error_messages() {
    let err = PathTemplate::parse("/{a}{b}").unwrap_err();
    assert_eq!(err.to_string(), "parameters `a` and `b` are adjacent");
    let err = PathTemplate::parse("/pets/{id").unwrap_err();
    assert_eq!(err.to_string(), "unclosed `{` at byte 6");
}

#[test]
fn percent_decoding() {
    assert_eq!(percent::decode("a%20b%2Fc"), "a b/c");
    assert_eq!(percent::decode("100%"), "100%");
    assert_eq!(percent::decode("%zz%4"), "%zz%4");
    assert_eq!(percent::decode("caf%C3%A9"), "café");
}

#[test]
fn normalization_keeps_reserved_escapes() {
    assert_eq!(percent::normalize("/f%6Fo/%7e"), "/foo/~");
    assert_eq!(percent::normalize("/a%2Fb"), "/a%2Fb");
    assert_eq!(percent::normalize("/é%41"), "/éA");
}
