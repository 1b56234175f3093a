//! The built-in demonstration grammar the binary operates on.

use cmdtree_core::{
    literal, CommandDispatcher, Gate, IntegerArgument, ListArgument, StringArgument,
};

/// The acting user for a CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    /// Display name.
    pub name: String,
    /// Whether admin-gated commands are available.
    pub admin: bool,
}

/// Build the demo dispatcher.
///
/// ```text
/// math (add|mul) <a> <b>
/// greet <who>
/// say <message…>
/// sum <numbers,…>
/// admin reload            (admins only)
/// version | ver
/// ```
pub fn dispatcher() -> CommandDispatcher<Invoker> {
    let mut dispatcher = CommandDispatcher::new();

    dispatcher.register(
        literal("math")
            .then_literal("add", |b| {
                b.then_argument("a", IntegerArgument::new(), |b| {
                    b.then_argument("b", IntegerArgument::new(), |b| {
                        b.executes(|ctx| {
                            let a = ctx.argument::<i64>("a")?;
                            let b = ctx.argument::<i64>("b")?;
                            let sum = a + b;
                            println!("{a} + {b} = {sum}");
                            Ok(Some(sum as i32))
                        })
                        .describe("add two integers")
                    })
                })
            })
            .then_literal("mul", |b| {
                b.then_argument("a", IntegerArgument::new(), |b| {
                    b.then_argument("b", IntegerArgument::new(), |b| {
                        b.executes(|ctx| {
                            let a = ctx.argument::<i64>("a")?;
                            let b = ctx.argument::<i64>("b")?;
                            let product = a * b;
                            println!("{a} * {b} = {product}");
                            Ok(Some(product as i32))
                        })
                        .describe("multiply two integers")
                    })
                })
            }),
    );

    dispatcher.register(
        literal("greet").then_argument("who", StringArgument::word(), |b| {
            b.executes(|ctx| {
                println!("Hello, {}!", ctx.argument::<String>("who")?);
                Ok(None)
            })
            .describe("greet someone by name")
        }),
    );

    dispatcher.register(
        literal("say").then_argument("message", StringArgument::greedy(), |b| {
            b.executes(|ctx| {
                println!("{}", ctx.argument::<String>("message")?);
                Ok(None)
            })
            .describe("echo the rest of the line")
        }),
    );

    dispatcher.register(literal("sum").then_argument(
        "numbers",
        ListArgument::new(IntegerArgument::new(), ','),
        |b| {
            b.executes(|ctx| {
                let numbers = ctx.argument::<Vec<i64>>("numbers")?;
                let total: i64 = numbers.iter().sum();
                println!("sum = {total}");
                Ok(Some(total as i32))
            })
            .describe("sum a comma-separated list")
        },
    ));

    dispatcher.register(
        literal("admin")
            .requires(|invoker: &Invoker| {
                if invoker.admin {
                    Gate::Allow
                } else {
                    Gate::denied("admins only")
                }
            })
            .then_literal("reload", |b| {
                b.executes(|ctx| {
                    println!("reloaded by {}", ctx.source().name);
                    Ok(None)
                })
            }),
    );

    dispatcher.register(literal(["version", "ver"]).executes(|_| {
        println!("cmdtree {}", env!("CARGO_PKG_VERSION"));
        Ok(None)
    }));

    dispatcher
}
