//! Declaration tree rendering: Graphviz DOT and a box-drawing text tree.

use std::collections::{HashMap, HashSet};

use crate::types::{DeclarationKind, DeclarationNode};

/// Parameters shown in a DOT function label before `...`
pub const DEFAULT_LABEL_PARAMS: usize = 3;

const ROOT_ID: &str = "Module";
const CLASS_COLOR: &str = "#ffe1f5";
const FUNCTION_COLOR: &str = "#e1ffe1";

pub const EMPTY_TREE_TEXT: &str = "📄 (Simple script - no classes or functions)";

/// DOT description of the tree, `None` when it is empty
pub fn build_graph(tree: &[DeclarationNode]) -> Option<String> {
    build_graph_with_limit(tree, DEFAULT_LABEL_PARAMS)
}

pub fn build_graph_with_limit(tree: &[DeclarationNode], param_limit: usize) -> Option<String> {
    if tree.is_empty() {
        return None;
    }

    let ids = unique_ids(tree);
    let mut lines = vec![
        "digraph CodeTree {".to_string(),
        "    rankdir=TB;".to_string(),
        "    node [shape=box, style=rounded];".to_string(),
        format!(
            "    {} [label=\"📄 Module\", fillcolor=\"#e1f5ff\", style=\"rounded,filled\"];",
            ROOT_ID
        ),
    ];

    for (node, id) in tree.iter().zip(&ids) {
        let (label, color) = match node.kind {
            DeclarationKind::Class => (format!("📦 {}", node.name), CLASS_COLOR),
            DeclarationKind::Function => (function_label(node, param_limit), FUNCTION_COLOR),
        };
        lines.push(format!(
            "    {} [label=\"{}\", fillcolor=\"{}\", style=\"rounded,filled\"];",
            id,
            escape_label(&label),
            color
        ));
    }

    for (index, id) in ids.iter().enumerate() {
        let parent = resolve_parent(tree, index)
            .map(|p| ids[p].as_str())
            .unwrap_or(ROOT_ID);
        lines.push(format!("    {} -> {};", parent, id));
    }

    lines.push("}".to_string());
    Some(lines.join("\n"))
}

fn function_label(node: &DeclarationNode, param_limit: usize) -> String {
    let prefix = if node.is_root() {
        String::new()
    } else {
        format!("{}.", node.parent_name)
    };
    let shown = node.parameter_names.len().min(param_limit);
    let mut params = node.parameter_names[..shown].join(", ");
    if node.parameter_names.len() > param_limit {
        params.push_str("...");
    }
    format!("⚙️ {}{}({})", prefix, node.name, params)
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `<kind>_<name>` per node, suffixed `_2`, `_3`, ... on collision
fn unique_ids(tree: &[DeclarationNode]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    used.insert(ROOT_ID.to_string());

    tree.iter()
        .map(|node| {
            let base = sanitize_id(&format!("{}_{}", node.kind, node.name));
            let mut id = base.clone();
            let mut suffix = 2;
            while used.contains(&id) {
                id = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            used.insert(id.clone());
            id
        })
        .collect()
}

/// Nearest preceding node named like the parent, preferring one level up
fn resolve_parent(tree: &[DeclarationNode], index: usize) -> Option<usize> {
    let node = &tree[index];
    if node.is_root() {
        return None;
    }

    let candidates = || {
        (0..index)
            .rev()
            .filter(|&j| tree[j].name == node.parent_name)
    };

    candidates()
        .find(|&j| tree[j].nesting_level + 1 == node.nesting_level)
        .or_else(|| candidates().next())
}

/// Box-drawing rendering of the tree
pub fn render_text_tree(tree: &[DeclarationNode]) -> String {
    if tree.is_empty() {
        return EMPTY_TREE_TEXT.to_string();
    }

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for index in 0..tree.len() {
        match resolve_parent(tree, index) {
            Some(parent) => children.entry(parent).or_default().push(index),
            None => roots.push(index),
        }
    }

    let mut out = vec!["📄 Module".to_string()];
    let mut visited = HashSet::new();
    for (i, &root) in roots.iter().enumerate() {
        render_node(tree, &children, root, "", i == roots.len() - 1, &mut visited, &mut out);
    }
    out.join("\n")
}

fn render_node(
    tree: &[DeclarationNode],
    children: &HashMap<usize, Vec<usize>>,
    index: usize,
    prefix: &str,
    is_last: bool,
    visited: &mut HashSet<usize>,
    out: &mut Vec<String>,
) {
    if !visited.insert(index) {
        return;
    }

    let node = &tree[index];
    let connector = if is_last { "└─ " } else { "├─ " };
    let line = match node.kind {
        DeclarationKind::Class => format!("{}{}📦 Class: {}", prefix, connector, node.name),
        DeclarationKind::Function => {
            let icon = if node.is_root() { "⚙️" } else { "🔧" };
            let parent = if node.is_root() {
                String::new()
            } else {
                format!("{}.", node.parent_name)
            };
            format!(
                "{}{}{} {}{}({})",
                prefix,
                connector,
                icon,
                parent,
                node.name,
                node.parameter_names.join(", ")
            )
        }
    };
    out.push(line);

    let Some(kids) = children.get(&index) else {
        return;
    };
    let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    for (i, &child) in kids.iter().enumerate() {
        render_node(tree, children, child, &child_prefix, i == kids.len() - 1, visited, out);
    }
}
