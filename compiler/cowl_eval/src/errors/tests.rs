use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_factory_sets_kind_and_message() {
    let err = immutable_binding("xs");
    assert_eq!(
        err.kind,
        EvalErrorKind::ImmutableBinding {
            name: "xs".to_string()
        }
    );
    assert_eq!(err.message, "cannot mutate immutable binding `xs`");
    assert_eq!(err.code(), "ImmutableBindingError");
}

#[test]
fn test_core_codes() {
    assert_eq!(dangling_reference("r").code(), "DanglingReferenceError");
    assert_eq!(duplicate_type("Point").code(), "DuplicateTypeError");
    assert_eq!(shape_mismatch("x").code(), "ShapeMismatchError");
    assert_eq!(unknown_variant("Shape", "Blob").code(), "UnknownVariantError");
    assert_eq!(payload_arity("Some", 1, 2).code(), "PayloadArityError");
    assert_eq!(redefinition("x").code(), "RedefinitionError");
    assert_eq!(non_exhaustive_match("1").code(), "NonExhaustiveMatchError");
    assert_eq!(type_mismatch("bool", "int").code(), "TypeMismatchError");
}

#[test]
fn test_payload_arity_message_pluralises() {
    assert_eq!(
        payload_arity("Some", 1, 2).message,
        "variant `Some` takes 1 payload field, got 2"
    );
    assert_eq!(
        payload_arity("Pair", 2, 0).message,
        "variant `Pair` takes 2 payload fields, got 0"
    );
}

#[test]
fn test_unknown_variant_without_type() {
    assert_eq!(unknown_variant("", "Blob").message, "unknown variant `Blob`");
    assert_eq!(
        unknown_variant("Shape", "Blob").message,
        "type `Shape` has no variant `Blob`"
    );
}

#[test]
fn test_with_span_if_missing_keeps_innermost() {
    let inner = Span::new(4, 8);
    let outer = Span::new(0, 20);
    let err = division_by_zero()
        .with_span_if_missing(inner)
        .with_span_if_missing(outer);
    assert_eq!(err.span, Some(inner));
}

#[test]
fn test_with_span_if_missing_ignores_dummy() {
    let err = division_by_zero().with_span_if_missing(Span::DUMMY);
    assert_eq!(err.span, None);
}

#[test]
fn test_non_exhaustive_match_has_note() {
    let err = non_exhaustive_match("Err(1)");
    assert_eq!(err.notes.len(), 1);
    assert!(err.notes[0].message.contains("wildcard"));
}

#[test]
fn test_display_includes_code() {
    let err = type_mismatch("bool", "int");
    assert_eq!(
        err.to_string(),
        "TypeMismatchError: type mismatch: expected bool, got int"
    );
}
