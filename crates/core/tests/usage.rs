//! Usage rendering tests: flat per-command lines and the condensed smart
//! form.

mod common;

use common::{demo_dispatcher, source, TestSource};

use cmdtree_core::{literal, CommandDispatcher, Gate};

#[test]
fn all_usage_lists_every_executable_path() {
    let dispatcher = demo_dispatcher();
    let usage = dispatcher.all_usage(dispatcher.root(), &source(), true);
    assert_eq!(
        usage,
        vec![
            "e",
            "e 1",
            "f 1",
            "f 2",
            "g",
            "g 1",
            "h",
            "i",
            "j ...",
            "k -> h",
            "user-test <User> <Dummy>",
        ]
    );
}

#[test]
fn all_usage_unrestricted_includes_hidden_subtrees() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(
        literal("admin")
            .requires(|_| Gate::hidden())
            .executes(|_| Ok(None)),
    );
    dispatcher.register(literal("play").executes(|_| Ok(None)));

    assert_eq!(
        dispatcher.all_usage(dispatcher.root(), &source(), true),
        vec!["play"]
    );
    assert_eq!(
        dispatcher.all_usage(dispatcher.root(), &source(), false),
        vec!["admin", "play"]
    );
}

#[test]
fn smart_usage_condenses_alternation_and_optionality() {
    let dispatcher = demo_dispatcher();
    let usage: Vec<String> = dispatcher
        .smart_usage(dispatcher.root(), &source())
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(
        usage,
        vec![
            "a (1|2)",
            "b 1",
            "c",
            "e [1]",
            "f (1|2)",
            "g [1]",
            "h",
            "i [1|2]",
            "j ...",
            "k -> h",
            "user-test <User> <Dummy>",
        ]
    );
}

#[test]
fn smart_usage_keys_are_the_child_nodes() {
    let dispatcher = demo_dispatcher();
    for (node, _) in dispatcher.smart_usage(dispatcher.root(), &source()) {
        let name = dispatcher.node(node).name();
        assert!(!name.is_empty(), "smart usage never includes the root");
        assert_ne!(name, "d", "hidden children are omitted");
    }
}
