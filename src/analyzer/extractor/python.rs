//! Precise Python extraction backed by the tree-sitter grammar.

use tree_sitter::Node;

use super::{Extraction, Extractor, LibrarySet, SourceLines, create_ts_parser, get_node_text};
use crate::analyzer::language::Language;
use crate::types::{DeclarationNode, FunctionRecord, Result, SummarySource, synthesize_summary};

pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Result<Self> {
        // Validate that the grammar loads
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        Ok(Self)
    }
}

impl Extractor for PythonExtractor {
    fn extract(&self, source: &str) -> Extraction {
        let mut parser = match create_ts_parser(tree_sitter_python::LANGUAGE, "Python") {
            Ok(parser) => parser,
            Err(e) => {
                tracing::debug!("Python grammar unavailable: {}", e);
                return Extraction::new();
            }
        };

        let Some(tree) = parser.parse(source, None) else {
            tracing::debug!("tree-sitter returned no tree for Python source");
            return Extraction::new();
        };

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(
                "Python source has syntax errors (first at line {}), skipping extraction",
                first_error_line(root).unwrap_or(0)
            );
            return Extraction::new();
        }

        let content = source.as_bytes();
        let lines = SourceLines::new(source);

        let mut libraries = LibrarySet::new();
        collect_imports(root, content, &mut libraries);

        let mut functions = Vec::new();
        collect_functions(root, content, &lines, &mut functions);

        let mut tree_nodes = Vec::new();
        build_tree(root, content, "", 0, &mut tree_nodes);

        Extraction {
            libraries: libraries.into_sorted(),
            functions,
            tree: tree_nodes,
        }
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error_line)
}

/// Top-level segment of a dotted module path
fn top_level_segment(dotted: &str) -> &str {
    dotted.split('.').next().unwrap_or(dotted).trim()
}

fn collect_imports(node: Node, content: &[u8], libraries: &mut LibrarySet) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let dotted = match name.kind() {
                    "aliased_import" => name.child_by_field_name("name"),
                    _ => Some(name),
                };
                if let Some(dotted) = dotted {
                    libraries.insert(top_level_segment(get_node_text(dotted, content)));
                }
            }
            return;
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                match module.kind() {
                    "dotted_name" => {
                        libraries.insert(top_level_segment(get_node_text(module, content)));
                    }
                    // `from .pkg import x` names `pkg`; `from . import x` names nothing
                    "relative_import" => {
                        let mut cursor = module.walk();
                        let dotted = module
                            .named_children(&mut cursor)
                            .find(|c| c.kind() == "dotted_name");
                        if let Some(dotted) = dotted {
                            libraries.insert(top_level_segment(get_node_text(dotted, content)));
                        }
                    }
                    _ => {}
                }
            }
            return;
        }
        "future_import_statement" => {
            libraries.insert("__future__");
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_imports(child, content, libraries);
    }
}

fn collect_functions(
    node: Node,
    content: &[u8],
    lines: &SourceLines<'_>,
    functions: &mut Vec<FunctionRecord>,
) {
    if node.kind() == "function_definition"
        && let Some(name_node) = node.child_by_field_name("name")
    {
        let name = get_node_text(name_node, content).to_string();
        let (summary, summary_source) = match docstring(node, content) {
            Some(doc) => (doc, SummarySource::DocComment),
            None => {
                let params = node
                    .child_by_field_name("parameters")
                    .map(|p| parameter_names(p, content))
                    .unwrap_or_default();
                (synthesize_summary(&params), SummarySource::Synthesized)
            }
        };

        let start = node.start_position().row;
        let end = code_end_row(node);
        functions.push(FunctionRecord {
            name,
            summary,
            summary_source,
            source_slice: lines.slice(start, end),
            start_line: start + 1,
            end_line: end.min(lines.len().saturating_sub(1)) + 1,
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_functions(child, content, lines, functions);
    }
}

/// Last row holding code, ignoring comments that trail the body
fn code_end_row(node: Node) -> usize {
    let mut cursor = node.walk();
    let last = node
        .children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .last();
    match last {
        Some(child) if child.child_count() > 0 => code_end_row(child),
        Some(child) => child.end_position().row,
        None => node.end_position().row,
    }
}

/// Pre-order walk emitting classes and functions with their parent context
fn build_tree(
    node: Node,
    content: &[u8],
    parent: &str,
    level: usize,
    out: &mut Vec<DeclarationNode>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "class_definition" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| get_node_text(n, content))
                    .unwrap_or_default();
                out.push(DeclarationNode::class(name, parent, level));
                build_tree(child, content, name, level + 1, out);
            }
            "function_definition" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| get_node_text(n, content))
                    .unwrap_or_default();
                let mut params = child
                    .child_by_field_name("parameters")
                    .map(|p| parameter_names(p, content))
                    .unwrap_or_default();
                if params.first().is_some_and(|p| p == "self") {
                    params.remove(0);
                }
                out.push(DeclarationNode::function(name, parent, level, params));
                build_tree(child, content, name, level + 1, out);
            }
            _ => build_tree(child, content, parent, level, out),
        }
    }
}

/// Named parameters in declaration order, after any `/` and up to the first `*` or `*args`
fn parameter_names(params: Node, content: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();

    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(get_node_text(child, content).to_string()),
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = child.child_by_field_name("name")
                    && name.kind() == "identifier"
                {
                    names.push(get_node_text(name, content).to_string());
                }
            }
            "typed_parameter" => {
                let mut inner = child.walk();
                let first = child.named_children(&mut inner).next();
                match first {
                    Some(n) if n.kind() == "identifier" => {
                        names.push(get_node_text(n, content).to_string());
                    }
                    Some(_) => break,
                    None => {}
                }
            }
            // Positional-only parameters are not part of the list
            "positional_separator" => names.clear(),
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
            _ => {}
        }
    }

    names
}

/// First line of the docstring, if the body starts with a plain string literal
fn docstring(function: Node, content: &[u8]) -> Option<String> {
    let body = function.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let mut inner = first.walk();
    let expr = first.named_children(&mut inner).next()?;
    let text = match expr.kind() {
        "string" => string_literal_text(expr, content)?,
        "concatenated_string" => {
            let mut parts = expr.walk();
            let mut joined = String::new();
            for part in expr.named_children(&mut parts) {
                joined.push_str(&string_literal_text(part, content)?);
            }
            joined
        }
        _ => return None,
    };

    let line = text.trim().lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Value of a non-f, non-bytes string literal, escapes decoded unless raw
fn string_literal_text(string: Node, content: &[u8]) -> Option<String> {
    if string.kind() != "string" {
        return None;
    }

    let mut cursor = string.walk();
    let mut raw = false;
    let mut text = String::new();
    for child in string.children(&mut cursor) {
        match child.kind() {
            "string_start" => {
                let prefix = get_node_text(child, content).to_ascii_lowercase();
                if prefix.contains('f') || prefix.contains('b') {
                    return None;
                }
                raw = prefix.contains('r');
            }
            "string_content" => text.push_str(get_node_text(child, content)),
            "interpolation" => return None,
            _ => {}
        }
    }

    if raw {
        Some(text)
    } else {
        Some(decode_escapes(&text))
    }
}

/// Python escape sequences of a non-raw literal; unknown escapes stay as written
fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(next),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width)
                    .map_while(|_| chars.next_if(|d| d.is_ascii_hexdigit()))
                    .collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.next_if(|d| d.is_digit(8)).and_then(|d| d.to_digit(8)) {
                        Some(digit) => value = value * 8 + digit,
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeclarationKind;

    fn extract(source: &str) -> Extraction {
        PythonExtractor::new().unwrap().extract(source)
    }

    #[test]
    fn test_docstring_summary_and_exact_slice() {
        let source = "def noop():\n    \"\"\"computes nothing\"\"\"\n";
        let result = extract(source);

        assert!(result.libraries.is_empty());
        assert_eq!(result.functions.len(), 1);
        let func = &result.functions[0];
        assert_eq!(func.name, "noop");
        assert_eq!(func.summary, "computes nothing");
        assert_eq!(func.summary_source, SummarySource::DocComment);
        assert_eq!(func.source_slice, "def noop():\n    \"\"\"computes nothing\"\"\"");
        assert_eq!((func.start_line, func.end_line), (1, 2));
    }

    #[test]
    fn test_multiline_docstring_uses_first_line() {
        let source = r#"
def load(path):
    """
    Load the configuration file.

    Raises on missing files.
    """
    return open(path)
"#;
        let result = extract(source);
        assert_eq!(result.functions[0].summary, "Load the configuration file.");
    }

    #[test]
    fn test_synthesized_summaries() {
        let source = r#"
def add(a, b: int, c=3, *args, d, **kwargs):
    return a + b

def tick():
    pass

def fmt(value):
    f"""not a {value} docstring"""
"#;
        let result = extract(source);
        let summaries: Vec<&str> = result.functions.iter().map(|f| f.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "Function with parameters: a, b, c",
                "Function with no parameters",
                "Function with parameters: value",
            ]
        );
        assert!(result.functions.iter().all(|f| f.is_synthesized()));
    }

    #[test]
    fn test_positional_only_parameters_skipped() {
        let result = extract("def f(a, /, b, *, c):\n    pass\n");
        assert_eq!(result.functions[0].summary, "Function with parameters: b");
        assert_eq!(result.tree[0].parameter_names, vec!["b"]);

        let result = extract("def g(a, b, /):\n    pass\n");
        assert_eq!(result.functions[0].summary, "Function with no parameters");
    }

    #[test]
    fn test_docstring_escapes_decoded() {
        let source = "def f():\n    \"\"\"Say \\\"hi\\\" now\"\"\"\n\ndef g():\n    \"\"\"a\\tb\\x41\\u00e9\\101\\q\"\"\"\n";
        let result = extract(source);
        assert_eq!(result.functions[0].summary, "Say \"hi\" now");
        assert_eq!(result.functions[1].summary, "a\tbAéA\\q");
    }

    #[test]
    fn test_raw_docstring_kept_verbatim() {
        let result = extract("def f():\n    r\"\"\"a\\tb\"\"\"\n");
        assert_eq!(result.functions[0].summary, "a\\tb");
        assert_eq!(result.functions[0].summary_source, SummarySource::DocComment);
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_escapes(r"line\
continued"), "linecontinued");
        assert_eq!(decode_escapes(r"\\ \' \0"), "\\ ' \0");
        assert_eq!(decode_escapes(r"\xZZ \N{BULLET}"), r"\xZZ \N{BULLET}");
        assert_eq!(decode_escapes("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_trailing_comment_not_in_slice() {
        let result = extract("def f():\n    pass\n    # trailing indented\n\nx = 1\n");
        let func = &result.functions[0];
        assert_eq!(func.source_slice, "def f():\n    pass");
        assert_eq!((func.start_line, func.end_line), (1, 2));
    }

    #[test]
    fn test_libraries_sorted_and_deduplicated() {
        let source = r#"
import os
import os.path
import sys, json as j
from collections import OrderedDict
from collections.abc import Mapping
from . import sibling
from .pkg import helper
import asyncio

def inner():
    import zlib
"#;
        let result = extract(source);
        assert_eq!(
            result.libraries,
            vec!["asyncio", "collections", "json", "os", "pkg", "sys", "zlib"]
        );
    }

    #[test]
    fn test_same_package_via_different_subpaths() {
        let source = "import xml.dom\nfrom xml.etree import ElementTree\n";
        assert_eq!(extract(source).libraries, vec!["xml"]);
    }

    #[test]
    fn test_syntax_error_returns_empty() {
        let result = extract("def broken(:\n    return 1\n");
        assert!(result.is_empty());

        let result = extract("class Thing\n    def __init__(self) pass\n");
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_source() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_method_nested_in_class() {
        let source = r#"
class Greeter:
    def __init__(self, name):
        self.name = name

    def greet(self, loud=False):
        def shout(text):
            return text.upper()
        return shout(self.name) if loud else self.name
"#;
        let result = extract(source);

        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "greet", "shout"]);

        let tree = &result.tree;
        assert_eq!(tree.len(), 4);
        assert_eq!(tree[0], DeclarationNode::class("Greeter", "", 0));
        assert_eq!(tree[1].name, "__init__");
        assert_eq!(tree[1].parent_name, "Greeter");
        assert_eq!(tree[1].nesting_level, tree[0].nesting_level + 1);
        assert_eq!(tree[1].parameter_names, vec!["name"]);
        assert_eq!(tree[2].parameter_names, vec!["loud"]);
        assert_eq!(tree[3].name, "shout");
        assert_eq!(tree[3].parent_name, "greet");
        assert_eq!(tree[3].nesting_level, 2);
        assert_eq!(tree[3].kind, DeclarationKind::Function);
    }

    #[test]
    fn test_decorated_and_async_definitions() {
        let source = r#"
import functools

@functools.cache
def cached(x):
    return x

async def fetch(url):
    """Fetch a URL."""
    return url
"#;
        let result = extract(source);
        assert_eq!(result.functions.len(), 2);
        assert_eq!(result.functions[0].source_slice, "def cached(x):\n    return x");
        assert_eq!(result.functions[1].summary, "Fetch a URL.");
        assert!(result.tree.iter().all(|n| n.is_root()));
    }

    #[test]
    fn test_class_inside_function() {
        let source = "def factory():\n    class Local:\n        pass\n    return Local\n";
        let result = extract(source);
        assert_eq!(result.tree.len(), 2);
        assert_eq!(result.tree[1].kind, DeclarationKind::Class);
        assert_eq!(result.tree[1].parent_name, "factory");
        assert_eq!(result.tree[1].nesting_level, 1);
    }
}
