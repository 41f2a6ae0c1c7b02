mod common;

use common::{args, compiler};
use msgtmpl::{CompileError, EvalError, ParseError, TraversalReason, Value};

fn compile_err(type_name: &str, text: &str) -> CompileError {
    compiler().compile(type_name, text).unwrap_err()
}

#[test]
fn unknown_field() {
    let err = compile_err("test.Foo", r#"{"foo": "{{baz}}"}"#);
    assert!(matches!(err, CompileError::UnknownField { .. }));
    insta::assert_snapshot!(err, @"unknown field `foo` in test.Foo at <root> (placeholder `baz`)");
}

#[test]
#[cfg(feature = "suggestions")]
fn unknown_field_suggests_close_names() {
    let err = compile_err("test.Kitchen", r#"{"displayNmae": "{{name}}"}"#);
    insta::assert_snapshot!(err, @"unknown field `displayNmae` in test.Kitchen at <root> (placeholder `name`); did you mean `displayName`?");

    let err = compile_err("test.Nested", r#"{"foo": {"bar2": {"kee": "{{k}}"}}}"#);
    insta::assert_snapshot!(err, @"unknown field `kee` in test.Nested.Bar2 at foo.bar2 (placeholder `k`); did you mean `key`?");
}

#[test]
fn descending_through_a_scalar() {
    let err = compile_err("test.Foo", r#"{"two": {"deeper": "{{x}}"}}"#);
    assert!(matches!(
        err,
        CompileError::PathTraversal {
            reason: TraversalReason::ScalarDescent,
            ..
        }
    ));
    insta::assert_snapshot!(err, @"cannot follow `deeper` at two (placeholder `x`): cannot descend into a field that is not a message");
}

#[test]
fn placeholder_for_a_whole_message() {
    let err = compile_err("test.Nested", r#"{"foo": {"bar2": "{{whole}}"}}"#);
    insta::assert_snapshot!(err, @"cannot follow `bar2` at foo (placeholder `whole`): a placeholder must stand for a scalar or enum value, not a message");
}

#[test]
fn placeholder_for_a_whole_list() {
    let err = compile_err("test.StringList", r#"{"foo": "{{all}}"}"#);
    insta::assert_snapshot!(err, @"cannot follow `foo` at <root> (placeholder `all`): a placeholder must stand for one element of a repeated field, not the whole list");
}

#[test]
fn malformed_templates() {
    let err = compile_err("test.Foo", r#"{"two": "{{two}}""#);
    assert!(matches!(err, CompileError::Parse(ParseError::Syntax(_))));

    let err = compile_err("test.Foo", r#"["{{two}}"]"#);
    insta::assert_snapshot!(err, @"template root must be a JSON object, found array");
}

#[test]
fn literal_that_does_not_fit_the_schema() {
    let err = compile_err("test.Foo", r#"{"one": "eleven", "two": "{{two}}"}"#);
    assert!(matches!(err, CompileError::SchemaMismatch(_)));
    insta::assert_snapshot!(err, @r#"template does not match the message type: at one: invalid value: "eleven" is not an integer (in test.Foo)"#);

    let err = compile_err("test.Foo", r#"{"three": 3}"#);
    insta::assert_snapshot!(err, @"template does not match the message type: unknown field `three`, expected one of: one, two (in test.Foo)");
}

#[test]
fn unknown_message_type() {
    let err = compile_err("test.Missing", "{}");
    insta::assert_snapshot!(err, @"unknown message type `test.Missing`");
}

#[test]
fn argument_of_the_wrong_kind() {
    let template = compiler()
        .compile("test.Kitchen", r#"{"total": "{{total}}", "level": "{{level}}"}"#)
        .unwrap();

    let err = template
        .evaluate(&args([("total", Value::U64(1))]))
        .unwrap_err();
    insta::assert_snapshot!(err, @"placeholder `total`: expected int64, got uint64");

    let err = template
        .evaluate(&args([("level", Value::from("LEVEL_EXTREME"))]))
        .unwrap_err();
    insta::assert_snapshot!(err, @"placeholder `level`: expected enum test.Level, got string");
}

#[test]
fn index_past_the_pruned_list() {
    let template = compiler()
        .compile("test.MessageList", r#"{"foo": ["{{gone}}", {"bar": "{{later}}"}]}"#);
    // a whole message element cannot be a placeholder
    assert!(matches!(
        template.unwrap_err(),
        CompileError::PathTraversal {
            reason: TraversalReason::NonScalarLeaf,
            ..
        }
    ));

    let template = compiler()
        .compile("test.MessageList", r#"{"foo": [{"bar": "lit"}, {"bar": "{{later}}"}]}"#)
        .unwrap();
    let message = template
        .evaluate(&args([("later", Value::from("ok"))]))
        .unwrap();
    assert_eq!(
        msgtmpl::schema::json::to_string(&message),
        r#"{"foo":[{"bar":"lit"},{"bar":"ok"}]}"#
    );

    let template = compiler()
        .compile("test.StringList", r#"{"foo": ["{{a}}", "{{b}}"]}"#)
        .unwrap();
    let err = template.evaluate(&args([])).unwrap_err();
    assert_eq!(
        err,
        EvalError::IndexOutOfRange {
            placeholder: "a".into(),
            path: "foo".into(),
            index: 0,
            len: 0,
        }
    );
    insta::assert_snapshot!(err, @"placeholder `a`: index 0 is out of range for `foo` (length 0)");
}
