//! Argument binding tests.
//!
//! Resolve-then-bind scenarios mixing simple and manual converters.

use switchboard_foundation::{PathPattern, UserId};
use switchboard_parser::{
    Args, BindingFailure, CommandSpec, CommandTree, ConversionFailure, Converter, ManualConverter, Param,
    Remainder, Tokenizer, Value, bind,
};

fn remove_user() -> CommandTree<()> {
    let mut tree = CommandTree::new();
    tree.register(
        &["remove", "user"],
        CommandSpec::new(())
            .param(Param::required(
                "users",
                Converter::greedy(Converter::user(), 1),
            ))
            .param(Param::required("limit", Converter::int())),
    )
    .unwrap();
    tree
}

fn resolve_and_bind(tree: &CommandTree<()>, raw: &str) -> Result<Args, BindingFailure> {
    let tokenizer = Tokenizer::new();
    let resolution = tree.resolve(tokenizer.cursor(raw));
    let node = tree.node(resolution.node);
    bind(node.params(), resolution.remainder, node.is_strict())
}

#[test]
fn variadic_users_then_limit() {
    let tree = remove_user();
    let args = resolve_and_bind(&tree, "remove user <@10> <@!20> 50").unwrap();
    assert_eq!(
        args.get::<Vec<UserId>>("users").unwrap(),
        vec![UserId(10), UserId(20)]
    );
    assert_eq!(args.get::<i64>("limit").unwrap(), 50);
}

#[test]
fn missing_variadic_reports_the_parameter() {
    let tree = remove_user();
    let failure = resolve_and_bind(&tree, "remove user 50").unwrap_err();
    match failure {
        BindingFailure::Conversion(inner) => {
            assert_eq!(inner.param, "users");
            assert_eq!(inner.input, "50");
        }
        BindingFailure::MissingArgument { param } => assert_eq!(param, "users"),
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[test]
fn failure_response_prefers_parameter_key() {
    let tree = remove_user();
    let failure = resolve_and_bind(&tree, "remove user <@1> lots").unwrap_err();
    let response = failure.response();
    assert_eq!(
        response.keys(),
        ["limit_INT_RESOLVE_error", "INT_RESOLVE_error", "ARG_ERROR"]
    );
}

#[test]
fn strict_command_rejects_trailing_text() {
    let mut tree = CommandTree::new();
    tree.register(
        &["ping"],
        CommandSpec::new(()).strict(),
    )
    .unwrap();
    let failure = resolve_and_bind(&tree, "ping pong").unwrap_err();
    assert_eq!(
        failure,
        BindingFailure::TrailingText {
            text: "pong".into()
        }
    );
    assert!(resolve_and_bind(&tree, "ping").is_ok());
}

#[test]
fn lenient_command_keeps_trailing_text() {
    let mut tree = CommandTree::new();
    tree.register(
        &["toggle"],
        CommandSpec::new(()).param(Param::required("path", Converter::path_pattern())),
    )
    .unwrap();
    let args = resolve_and_bind(&tree, "toggle example.* and more").unwrap();
    assert_eq!(
        args.get::<PathPattern>("path").unwrap(),
        PathPattern::parse("example.*").unwrap()
    );
    assert_eq!(args.rest(), "and more");
}

/// Takes two words joined by `=`, as `key=value`, without tokenizing.
struct Assignment;

impl ManualConverter for Assignment {
    fn convert(&self, remaining: &mut Remainder<'_>) -> Result<Value, ConversionFailure> {
        let text = remaining.as_str();
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        let word = &text[..end];
        if !word.contains('=') {
            return Err(ConversionFailure::new("ASSIGNMENT_error", word));
        }
        remaining.consume(end);
        Ok(Value::Str(word.to_string()))
    }
}

#[test]
fn failed_manual_converter_leaves_the_text() {
    let tokenizer = Tokenizer::new();
    let converter = Converter::manual(Assignment);

    let mut rest = tokenizer.cursor("plain words");
    assert!(converter.apply(&mut rest).is_err());
    assert_eq!(rest.as_str(), "plain words");

    let mut rest = tokenizer.cursor("a=b tail");
    assert_eq!(converter.apply(&mut rest).unwrap(), Value::Str("a=b".into()));
    assert_eq!(rest.as_str(), "tail");
}

#[test]
fn optional_manual_parameter_falls_back_to_default() {
    let tokenizer = Tokenizer::new();
    let params = vec![
        Param::optional("setting", Converter::manual(Assignment)).with_default("none"),
        Param::required("count", Converter::int()),
    ];
    let args = bind(&params, tokenizer.cursor("3"), false).unwrap();
    assert_eq!(args.get::<String>("setting").unwrap(), "none");
    assert_eq!(args.get::<i64>("count").unwrap(), 3);
}
