//! Command tree resolution tests.
//!
//! Registration rules, resolution through aliases, and toggle pattern
//! coverage of resolved paths.

use proptest::prelude::*;
use switchboard_foundation::{CommandPath, ErrorKind, PathPattern};
use switchboard_parser::{CommandSpec, CommandTree, Tokenizer};

fn tree() -> CommandTree<&'static str> {
    let mut tree = CommandTree::new();
    tree.register(&["example"], CommandSpec::new("example"))
        .unwrap();
    tree.register(
        &["example", "create"],
        CommandSpec::new("create").alias("new"),
    )
    .unwrap();
    tree.register(&["example", "delete"], CommandSpec::new("delete"))
        .unwrap();
    tree.register(&["remove", "user"], CommandSpec::new("remove user"))
        .unwrap();
    tree
}

#[test]
fn resolve_is_case_insensitive() {
    let tree = tree();
    let tokenizer = Tokenizer::new();
    let resolution = tree.resolve(tokenizer.cursor("EXAMPLE New thing"));
    assert_eq!(resolution.path, CommandPath::new(["example", "create"]));
    assert_eq!(resolution.remainder.as_str(), "thing");
}

#[test]
fn unknown_word_stops_resolution() {
    let tree = tree();
    let tokenizer = Tokenizer::new();
    let resolution = tree.resolve(tokenizer.cursor("example frobnicate"));
    assert_eq!(resolution.path, CommandPath::new(["example"]));
    assert_eq!(resolution.remainder.as_str(), "frobnicate");

    let resolution = tree.resolve(tokenizer.cursor("frobnicate"));
    assert!(resolution.is_root());
}

#[test]
fn sibling_alias_collision_is_rejected() {
    let mut tree = tree();
    let error = tree
        .register(&["example", "make"], CommandSpec::new("make").alias("create"))
        .unwrap_err();
    assert!(matches!(error.kind, ErrorKind::DuplicateAlias { .. }));
}

#[test]
fn same_alias_under_different_parents_is_allowed() {
    let mut tree = tree();
    tree.register(&["remove", "new"], CommandSpec::new("remove new"))
        .unwrap();
}

#[test]
fn registering_twice_is_rejected() {
    let mut tree = tree();
    assert!(tree.register(&["example"], CommandSpec::new("again")).is_err());
}

#[test]
fn lookup_accepts_aliases() {
    let tree = tree();
    let id = tree.lookup_segments(["example", "new"]).unwrap();
    assert_eq!(tree.node(id).path(), &CommandPath::new(["example", "create"]));
}

#[test]
fn toggle_patterns_cover_resolved_paths() {
    let tree = tree();
    let tokenizer = Tokenizer::new();
    let create = tree.resolve(tokenizer.cursor("example create")).path;
    let example = tree.resolve(tokenizer.cursor("example")).path;

    let descendants = PathPattern::parse("example.*").unwrap();
    assert!(descendants.covers(&create));
    assert!(!descendants.covers(&example));

    let exact = PathPattern::parse("example").unwrap();
    assert!(exact.covers(&example));
    assert!(!exact.covers(&create));

    assert!(PathPattern::All.covers(&create));
}

fn path_strategy() -> impl Strategy<Value = CommandPath> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4)
        .prop_map(CommandPath::new)
}

proptest! {
    #[test]
    fn exact_pattern_covers_only_itself(p in path_strategy(), q in path_strategy()) {
        let pattern = PathPattern::Exact(p.clone());
        prop_assert_eq!(pattern.covers(&q), p == q);
    }

    #[test]
    fn descendant_pattern_covers_strict_descendants(p in path_strategy(), q in path_strategy()) {
        let pattern = PathPattern::Descendants(p.clone());
        let strict_descendant = q.len() > p.len() && q.segments()[..p.len()] == *p.segments();
        prop_assert_eq!(pattern.covers(&q), strict_descendant);
    }
}
