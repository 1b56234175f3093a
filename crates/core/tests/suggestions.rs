//! Suggestion engine tests: cursor anchoring, literal and argument
//! completions, visibility filtering, and merge behavior.

mod common;

use common::{demo_dispatcher, source, TestSource};

use cmdtree_core::{
    literal, CommandContext, CommandDispatcher, CommandError, Gate, StringArgument,
    SuggestionKind, SuggestionsBuilder,
};

// ─── Cursor anchoring in the demo grammar ───────────────────────────────────

#[tokio::test]
async fn suggests_children_after_a_completed_literal() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("i ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 2).await;
    assert_eq!(suggestions.texts(), vec!["1", "2"]);
}

#[tokio::test]
async fn suggests_permitted_roots_at_cursor_zero() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("i ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 0).await;
    // `d` is omitted: its requirement denies without a reason.
    assert_eq!(
        suggestions.texts(),
        vec!["a", "b", "c", "e", "f", "g", "h", "i", "j", "k", "user-test"]
    );
}

#[tokio::test]
async fn a_partially_typed_token_is_completed_not_repeated() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("a 1 i ", source()).await;

    // Cursor inside the token `i`: both `i` and `ii` match the prefix, but
    // `i` equals what is already typed and is dropped.
    let suggestions = dispatcher.completion_suggestions_at(&parse, 5).await;
    assert_eq!(suggestions.texts(), vec!["ii"]);

    // Cursor just before the token: nothing is typed yet, both offered.
    let suggestions = dispatcher.completion_suggestions_at(&parse, 4).await;
    assert_eq!(suggestions.texts(), vec!["i", "ii"]);
}

#[tokio::test]
async fn a_failed_argument_suggests_from_its_own_position() {
    let dispatcher = demo_dispatcher();
    // The `User` argument rejected "use" (too short); suggestions at the end
    // of that token still come from the argument's examples.
    let parse = dispatcher.parse("user-test use rule1 ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 13).await;
    assert_eq!(
        suggestions.texts(),
        vec!["user1", "user2", "user3", "user4"]
    );
}

#[tokio::test]
async fn an_accepted_argument_moves_suggestions_to_the_next_one() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("user-test user rule", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 19).await;
    assert_eq!(suggestions.texts(), vec!["rule1", "rule2", "rule3"]);
}

#[tokio::test]
async fn default_cursor_is_the_end_of_input() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("e ", source()).await;
    let suggestions = dispatcher.completion_suggestions(&parse).await;
    assert_eq!(suggestions.texts(), vec!["1"]);
}

// ─── Metadata ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn literal_suggestions_carry_literal_metadata() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("i ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 2).await;
    for entry in suggestions.entries() {
        assert_eq!(entry.kind, Some(SuggestionKind::Literal));
        assert!(entry.node.is_some(), "the originating node is attached");
    }
}

#[tokio::test]
async fn argument_suggestions_carry_argument_metadata() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("user-test user rule", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 19).await;
    for entry in suggestions.entries() {
        assert_eq!(entry.kind, Some(SuggestionKind::Argument));
        assert_eq!(entry.usage.as_deref(), Some("<Dummy>"));
    }
}

#[tokio::test]
async fn aliases_are_suggested_with_a_tooltip() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(literal(["teleport", "tp"]).executes(|_| Ok(None)));

    let parse = dispatcher.parse("", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 0).await;
    assert_eq!(suggestions.texts(), vec!["teleport", "tp"]);
    for entry in suggestions.entries() {
        assert_eq!(entry.tooltip.as_deref(), Some("tp"));
    }
}

// ─── Providers and visibility ───────────────────────────────────────────────

#[tokio::test]
async fn per_node_provider_overrides_the_argument_type() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(literal("go").then_argument(
        "direction",
        StringArgument::word(),
        |b| {
            b.executes(|_| Ok(None)).suggests(
                |_ctx: &CommandContext<TestSource>, builder: &mut SuggestionsBuilder| {
                    builder.suggest("north");
                    builder.suggest("south");
                    Ok(())
                },
            )
        },
    ));

    let parse = dispatcher.parse("go ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 3).await;
    assert_eq!(suggestions.texts(), vec!["north", "south"]);
}

#[tokio::test]
async fn a_failing_provider_does_not_poison_its_siblings() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(
        literal("p")
            .then_argument("bad", StringArgument::word(), |b| {
                b.suggests(
                    |_ctx: &CommandContext<TestSource>, _builder: &mut SuggestionsBuilder| {
                        Err(CommandError::message("provider exploded"))
                    },
                )
            })
            .then_literal("ok", |b| b.executes(|_| Ok(None))),
    );

    let parse = dispatcher.parse("p ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 2).await;
    assert_eq!(suggestions.texts(), vec!["ok"]);
}

#[tokio::test]
async fn denied_with_reason_stays_listed_hidden_does_not() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(
        literal("deploy")
            .requires(|s: &TestSource| {
                if s.admin {
                    Gate::Allow
                } else {
                    Gate::denied("admins only")
                }
            })
            .executes(|_| Ok(None)),
    );
    dispatcher.register(
        literal("secret")
            .requires(|_| Gate::hidden())
            .executes(|_| Ok(None)),
    );

    let parse = dispatcher.parse("", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 0).await;
    assert_eq!(
        suggestions.texts(),
        vec!["deploy"],
        "reasoned denials stay in the tree, hidden ones vanish"
    );
}

#[tokio::test]
async fn suggestions_serialize_for_ui_consumers() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("i ", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 2).await;
    let json = serde_json::to_value(&suggestions).unwrap();
    assert_eq!(json["entries"][0]["text"], "1");
    assert_eq!(json["entries"][0]["kind"], "literal");
    assert_eq!(json["range"]["start"], 2);
}

#[tokio::test]
async fn case_insensitive_prefixes_complete_to_the_canonical_spelling() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("USER", source()).await;
    let suggestions = dispatcher.completion_suggestions_at(&parse, 4).await;
    assert_eq!(suggestions.texts(), vec!["user-test"]);
}
