use super::{KeyClass, KeyClassifier};

fn props(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn priority_order() {
    let patterns = ["^x-".to_string(), "^x-int".to_string()];
    let c = KeyClassifier::new(props(&["name", "x-id"]), &patterns, true, false).unwrap();

    assert_eq!(c.classify("name"), KeyClass::Property(0));
    assert_eq!(c.classify("x-id"), KeyClass::Property(1));
    assert_eq!(c.classify("x-internal"), KeyClass::Pattern(0));
    assert_eq!(c.classify("other"), KeyClass::Additional);
}

#[test]
fn closed_map_still_accepts_patterns() {
    let patterns = ["^[0-9]+$".to_string()];
    let c = KeyClassifier::new(props(&["total"]), &patterns, false, true).unwrap();

    assert_eq!(c.classify("total"), KeyClass::Property(0));
    assert_eq!(c.classify("42"), KeyClass::Pattern(0));
    assert_eq!(c.classify("4a"), KeyClass::Rejected);
}

#[test]
fn open_struct_ignores_unknown_keys() {
    let c = KeyClassifier::new(props(&["a"]), &[], false, false).unwrap();
    assert_eq!(c.classify("b"), KeyClass::Ignored);
}

#[test]
fn patterns_are_unanchored() {
    let patterns = ["id".to_string()];
    let c = KeyClassifier::new(Vec::new(), &patterns, false, true).unwrap();
    assert_eq!(c.classify("user_id_hash"), KeyClass::Pattern(0));
    assert_eq!(c.classify("name"), KeyClass::Rejected);
}

#[test]
fn invalid_pattern() {
    let patterns = ["(".to_string()];
    let err = KeyClassifier::new(Vec::new(), &patterns, false, false).unwrap_err();
    assert_eq!(err.pattern, "(");
}
