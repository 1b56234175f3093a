//! Parser tests: literal matching, alternative competition, redirects,
//! backtracking, and the error map of rejected branches.

mod common;

use common::{demo_dispatcher, source, TestSource};

use cmdtree_core::{
    literal, CommandDispatcher, ErrorKind, IntegerArgument, StringArgument,
};

// ─── 1. Straight-line parses ────────────────────────────────────────────────

#[tokio::test]
async fn literal_chain_parses_completely() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("a 1 i", source()).await;
    assert!(parse.is_complete(), "expected a full parse of 'a 1 i'");

    let names: Vec<&str> = parse
        .context
        .nodes()
        .iter()
        .map(|p| dispatcher.node(p.node).name())
        .collect();
    assert_eq!(names, vec!["a", "1", "i"]);
}

#[tokio::test]
async fn node_ranges_are_increasing_and_reparse_to_their_text() {
    let dispatcher = demo_dispatcher();
    let input = "a 1 ii";
    let parse = dispatcher.parse(input, source()).await;
    assert!(parse.is_complete());

    let mut previous_end = 0;
    for parsed in parse.context.nodes() {
        assert!(
            parsed.span.start >= previous_end,
            "node ranges must be non-overlapping and increasing"
        );
        previous_end = parsed.span.end;
        let node = dispatcher.node(parsed.node);
        assert_eq!(
            parsed.span.text(input),
            node.name(),
            "recorded range must cover exactly the matched token"
        );
    }
}

#[tokio::test]
async fn parsing_is_deterministic() {
    let dispatcher = demo_dispatcher();
    let first = dispatcher.parse("a 1 i", source()).await;
    let second = dispatcher.parse("a 1 i", source()).await;

    let spans = |p: &cmdtree_core::ParseResults<TestSource>| {
        p.context
            .nodes()
            .iter()
            .map(|n| (n.node, n.span))
            .collect::<Vec<_>>()
    };
    assert_eq!(spans(&first), spans(&second));
    assert_eq!(first.reader.cursor(), second.reader.cursor());
    assert_eq!(
        first.exceptions.keys().collect::<Vec<_>>(),
        second.exceptions.keys().collect::<Vec<_>>()
    );
}

// ─── 2. Literal matching rules ──────────────────────────────────────────────

#[tokio::test]
async fn literals_match_case_insensitively() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("A 1 II", source()).await;
    assert!(parse.is_complete(), "literal matching is case-insensitive");
}

#[tokio::test]
async fn aliases_match_and_resolve_to_the_canonical_node() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    let id = dispatcher.register(literal(["teleport", "tp"]).executes(|_| Ok(Some(1))));

    let parse = dispatcher.parse("tp", source()).await;
    assert!(parse.is_complete());
    assert_eq!(parse.context.nodes()[0].node, id);
    assert_eq!(dispatcher.node(id).name(), "teleport");
    assert_eq!(dispatcher.node(id).aliases(), ["tp".to_owned()]);
}

#[test]
fn literal_valid_input_requires_a_terminator() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    let id = dispatcher.register(literal(["teleport", "tp"]));
    let node = dispatcher.node(id);

    for name in ["teleport", "tp"] {
        assert!(node.is_valid_input(name), "{name} must match");
        assert!(
            node.is_valid_input(&format!("{name} extra")),
            "{name} followed by the separator must match"
        );
    }
    assert!(!node.is_valid_input("tpx"), "no terminator after 'tp'");
    assert!(!node.is_valid_input("tele"), "prefix alone is not a match");
}

// ─── 3. Alternative competition ─────────────────────────────────────────────

#[tokio::test]
async fn a_matching_literal_shadows_argument_siblings() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(
        literal("x")
            .then_literal("lit", |b| b.executes(|_| Ok(Some(1))))
            .then_argument("any", StringArgument::word(), |b| b.executes(|_| Ok(Some(2)))),
    );

    let records = dispatcher.execute("x lit", source()).await.unwrap();
    assert!(
        matches!(records[..], [cmdtree_core::ExecRecord::Success { value: Some(1) }]),
        "the literal child must win for its own token"
    );

    let records = dispatcher.execute("x other", source()).await.unwrap();
    assert!(
        matches!(records[..], [cmdtree_core::ExecRecord::Success { value: Some(2) }]),
        "non-literal tokens fall through to the argument child"
    );
}

// ─── 4. Redirects ───────────────────────────────────────────────────────────

#[tokio::test]
async fn self_redirect_loops_back_to_the_root() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("j j j a", source()).await;
    assert!(parse.is_complete(), "j redirects to the root, three times");

    // Each redirect opens a child context; the last one holds `a`.
    let mut depth = 0;
    let mut builder = &parse.context;
    let names = loop {
        match builder.child() {
            Some(child) => {
                depth += 1;
                builder = child;
            }
            None => {
                break builder
                    .nodes()
                    .iter()
                    .map(|p| dispatcher.node(p.node).name().to_owned())
                    .collect::<Vec<_>>()
            }
        }
    };
    assert_eq!(depth, 3);
    assert_eq!(names, vec!["a"]);
}

#[tokio::test]
async fn redirect_to_a_named_node_continues_there() {
    let dispatcher = demo_dispatcher();
    // k redirects to h, which is executable.
    let records = dispatcher.execute("k h", source()).await;
    // "k h": after k redirects to h's *children*... h has none, so the parse
    // stops with leftover input.
    assert!(records.is_err(), "k redirects to h, which has no children");

    let parse = dispatcher.parse("j e", source()).await;
    assert!(parse.is_complete(), "redirect to root re-parses 'e'");
    let records = dispatcher.execute("j e", source()).await.unwrap();
    assert!(matches!(
        records[..],
        [cmdtree_core::ExecRecord::Success { value: Some(5) }]
    ));
}

// ─── 5. Rejected branches and the error map ─────────────────────────────────

#[tokio::test]
async fn unknown_command_has_an_empty_error_map() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("z", source()).await;
    assert!(!parse.is_complete());
    assert!(parse.exceptions.is_empty());
    assert_eq!(parse.reader.cursor(), 0);
}

#[tokio::test]
async fn missing_separator_is_reported_for_the_argument_child() {
    let mut dispatcher: CommandDispatcher<TestSource> = CommandDispatcher::new();
    dispatcher.register(literal("t").then_argument("n", IntegerArgument::new(), |b| {
        b.executes(|_| Ok(None))
    }));

    let parse = dispatcher.parse("t 12x", source()).await;
    assert_eq!(parse.exceptions.len(), 1);
    let child = dispatcher.find_node("t n").expect("argument node exists");
    let error = &parse.exceptions[&child];
    assert!(
        matches!(error.kind(), ErrorKind::ExpectedArgumentSeparator),
        "got {:?}",
        error.kind()
    );
    assert_eq!(error.cursor(), Some(4), "pinned right after the integer");
}

#[tokio::test]
async fn failed_argument_parse_lands_in_the_error_map() {
    let dispatcher = demo_dispatcher();
    // "use" is shorter than the 4-character minimum.
    let parse = dispatcher.parse("user-test use rule1 ", source()).await;

    let user_node = dispatcher.find_node("user-test User").expect("node");
    let error = &parse.exceptions[&user_node];
    assert!(matches!(error.kind(), ErrorKind::Range { .. }));
    assert_eq!(error.cursor(), Some(10), "pinned at the argument start");

    // The deepest successful state still covers the matched literal.
    let names: Vec<&str> = parse
        .context
        .nodes()
        .iter()
        .map(|p| dispatcher.node(p.node).name())
        .collect();
    assert_eq!(names, vec!["user-test"]);
}

#[tokio::test]
async fn failed_argument_load_lands_in_the_error_map() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("user-test failuser rule1", source()).await;

    let user_node = dispatcher.find_node("user-test User").expect("node");
    let error = &parse.exceptions[&user_node];
    assert!(
        matches!(error.kind(), ErrorKind::Message(m) if m.contains("failuser")),
        "load failures surface like parse failures"
    );
}

#[tokio::test]
async fn trailing_separator_leaves_input_unconsumed() {
    let dispatcher = demo_dispatcher();
    let parse = dispatcher.parse("i ", source()).await;
    assert!(!parse.is_complete());
    assert!(parse.exceptions.is_empty());
    assert_eq!(parse.reader.remaining(), " ");
}
