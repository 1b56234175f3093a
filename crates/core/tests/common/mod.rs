//! Shared fixtures for `cmdtree_core` integration tests.

#![allow(unreachable_pub)]

use async_trait::async_trait;
use cmdtree_core::{
    literal, ArgumentType, CommandDispatcher, CommandError, ErrorKind, Gate, NodeId, RangeFail,
    SimpleArgumentType, StrReader,
};

/// Acting user handed to every parse and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSource {
    pub name: String,
    pub admin: bool,
}

impl TestSource {
    #[allow(dead_code)]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.into(),
            admin: false,
        }
    }

    #[allow(dead_code)]
    pub fn admin(name: &str) -> Self {
        Self {
            name: name.into(),
            admin: true,
        }
    }
}

/// The default non-admin source.
#[allow(dead_code)]
pub fn source() -> TestSource {
    TestSource::named("tester")
}

/// A resolved user name (the loaded form of [`UserArg`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User(pub String);

/// Argument type accepting 4–16 character names, lowercased at load time.
/// Names containing `fail` parse fine but refuse to load.
pub struct UserArg;

#[async_trait]
impl ArgumentType for UserArg {
    type Parsed = String;
    type Loaded = User;

    fn parse(&self, reader: &mut StrReader) -> Result<String, CommandError> {
        let start = reader.cursor();
        let word = reader.read_unquoted().to_owned();
        if word.len() < 4 || word.len() > 16 {
            let fail = if word.len() < 4 {
                RangeFail::Below
            } else {
                RangeFail::Above
            };
            let mut pinned = reader.clone();
            pinned.set_cursor(start);
            return Err(CommandError::with_reader(
                ErrorKind::Range {
                    fail,
                    what: "Name length".into(),
                    got: word.len().to_string(),
                    min: "4".into(),
                    max: "16".into(),
                },
                pinned,
            ));
        }
        Ok(word)
    }

    async fn load(&self, parsed: String) -> Result<User, CommandError> {
        if parsed.contains("fail") {
            return Err(CommandError::message(format!(
                "user {parsed} is not available"
            )));
        }
        Ok(User(parsed.to_ascii_lowercase()))
    }

    fn examples(&self) -> Vec<String> {
        vec![
            "user1".into(),
            "user2".into(),
            "user3".into(),
            "user4".into(),
        ]
    }
}

/// Word argument suggesting rule names.
pub struct RuleArg;

impl SimpleArgumentType for RuleArg {
    type Value = String;

    fn parse_value(&self, reader: &mut StrReader) -> Result<String, CommandError> {
        Ok(reader.read_unquoted().to_owned())
    }

    fn examples(&self) -> Vec<String> {
        vec!["rule1".into(), "rule2".into(), "rule3".into()]
    }
}

/// The shared demo grammar:
///
/// ```text
/// a 1 {i|ii}    a 2 {i|ii}
/// b 1
/// c
/// d                       (hidden requirement)
/// e*  e 1*  e 1 {i|ii}
/// f 1*  f 2*
/// g*  g 1*
/// h*                      (redirect target of k)
/// i*  i 1  i 2
/// j -> root
/// k -> h
/// user-test <User> <Dummy>*
/// ```
///
/// Starred nodes carry executors returning distinct values.
pub fn demo_dispatcher() -> CommandDispatcher<TestSource> {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register(
        literal("a")
            .then_literal("1", |b| b.then_literal("i", |b| b).then_literal("ii", |b| b))
            .then_literal("2", |b| b.then_literal("i", |b| b).then_literal("ii", |b| b)),
    );
    dispatcher.register(literal("b").then_literal("1", |b| b));
    dispatcher.register(literal("c"));
    dispatcher.register(literal("d").requires(|_| Gate::hidden()));
    dispatcher.register(
        literal("e")
            .executes(|_| Ok(Some(5)))
            .then_literal("1", |b| {
                b.executes(|_| Ok(Some(51)))
                    .then_literal("i", |b| b)
                    .then_literal("ii", |b| b)
            }),
    );
    dispatcher.register(
        literal("f")
            .then_literal("1", |b| b.executes(|_| Ok(Some(61))))
            .then_literal("2", |b| b.executes(|_| Ok(Some(62)))),
    );
    dispatcher.register(
        literal("g")
            .executes(|_| Ok(Some(7)))
            .then_literal("1", |b| b.executes(|_| Ok(Some(71)))),
    );
    let h = dispatcher.register(literal("h").executes(|_| Ok(Some(8))));
    dispatcher.register(
        literal("i")
            .executes(|_| Ok(Some(9)))
            .then_literal("1", |b| b)
            .then_literal("2", |b| b),
    );
    let root = dispatcher.root();
    dispatcher.register(literal("j").redirect(root));
    dispatcher.register(literal("k").redirect(h));
    dispatcher.register(literal("user-test").then_argument("User", UserArg, |b| {
        b.then_argument("Dummy", RuleArg, |b| b.executes(|_| Ok(Some(42))))
    }));
    dispatcher
}

/// Collect `(depth, name)` pairs for the subtree under `node`, in
/// enumeration order.
#[allow(dead_code)]
pub fn shape(dispatcher: &CommandDispatcher<TestSource>, node: NodeId) -> Vec<(usize, String)> {
    fn walk(
        dispatcher: &CommandDispatcher<TestSource>,
        node: NodeId,
        depth: usize,
        out: &mut Vec<(usize, String)>,
    ) {
        for &child in dispatcher.node(node).children() {
            out.push((depth, dispatcher.node(child).name().to_owned()));
            walk(dispatcher, child, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(dispatcher, node, 0, &mut out);
    out
}
