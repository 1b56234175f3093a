//! Usage string rendering: flat per-command lines and the condensed "smart"
//! form with `[optional]`, `(required)`, and `|` alternation.

use crate::command::Source;
use crate::tree::{NodeId, Tree, ROOT};

/// Every full command line reachable from `node`, one string each.
pub(crate) fn all_usage<S: Source>(
    tree: &Tree<S>,
    node: NodeId,
    source: &S,
    restricted: bool,
) -> Vec<String> {
    let mut result = Vec::new();
    collect_usage(tree, node, source, &mut result, "", restricted);
    result
}

fn collect_usage<S: Source>(
    tree: &Tree<S>,
    node: NodeId,
    source: &S,
    result: &mut Vec<String>,
    prefix: &str,
    restricted: bool,
) {
    if restricted && !tree.visible(node, source) {
        return;
    }
    if tree[node].command.is_some() {
        result.push(prefix.to_owned());
    }
    if let Some(target) = tree[node].redirect {
        let redirect = if target == ROOT {
            "...".to_owned()
        } else {
            format!("-> {}", tree[target].usage_text())
        };
        if prefix.is_empty() {
            result.push(format!("{} {redirect}", tree[node].usage_text()));
        } else {
            result.push(format!("{prefix} {redirect}"));
        }
    } else {
        for &child in tree[node].children() {
            let child_usage = tree[child].usage_text();
            let next = if prefix.is_empty() {
                child_usage
            } else {
                format!("{prefix} {child_usage}")
            };
            collect_usage(tree, child, source, result, &next, restricted);
        }
    }
}

/// One condensed usage string per visible child of `node`.
pub(crate) fn smart_usage<S: Source>(
    tree: &Tree<S>,
    node: NodeId,
    source: &S,
) -> Vec<(NodeId, String)> {
    let optional = tree[node].command.is_some();
    tree[node]
        .children()
        .iter()
        .filter_map(|&child| {
            smart_usage_inner(tree, child, source, optional, false).map(|usage| (child, usage))
        })
        .collect()
}

fn smart_usage_inner<S: Source>(
    tree: &Tree<S>,
    node: NodeId,
    source: &S,
    optional: bool,
    deep: bool,
) -> Option<String> {
    if !tree.visible(node, source) {
        return None;
    }
    let self_text = if optional {
        format!("[{}]", tree[node].usage_text())
    } else {
        tree[node].usage_text()
    };
    let child_optional = tree[node].command.is_some();
    if !deep {
        if let Some(target) = tree[node].redirect {
            let redirect = if target == ROOT {
                "...".to_owned()
            } else {
                format!("-> {}", tree[target].usage_text())
            };
            return Some(format!("{self_text} {redirect}"));
        }
        let children: Vec<NodeId> = tree[node]
            .children()
            .iter()
            .copied()
            .filter(|&c| tree.visible(c, source))
            .collect();
        if children.len() == 1 {
            if let Some(usage) =
                smart_usage_inner(tree, children[0], source, child_optional, child_optional)
            {
                return Some(format!("{self_text} {usage}"));
            }
        } else if children.len() > 1 {
            let mut child_usage: Vec<String> = Vec::new();
            for &child in &children {
                if let Some(usage) = smart_usage_inner(tree, child, source, child_optional, true) {
                    if !child_usage.contains(&usage) {
                        child_usage.push(usage);
                    }
                }
            }
            if child_usage.len() == 1 {
                let only = child_usage.remove(0);
                let wrapped = if child_optional {
                    format!("[{only}]")
                } else {
                    only
                };
                return Some(format!("{self_text} {wrapped}"));
            } else if child_usage.len() > 1 {
                // Alternation lists the bare usage fragments; the recursive
                // strings above only decided whether there is more than one.
                let (open, close) = if child_optional { ("[", "]") } else { ("(", ")") };
                let alternation = children
                    .iter()
                    .map(|&c| tree[c].usage_text())
                    .collect::<Vec<_>>()
                    .join("|");
                return Some(format!("{self_text} {open}{alternation}{close}"));
            }
        }
    }
    Some(self_text)
}
