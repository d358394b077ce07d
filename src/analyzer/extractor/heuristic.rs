//! Line-oriented pattern extraction for languages without a grammar parse.
//!
//! Every class and function match is emitted at the top level; nesting is
//! never inferred. Duplicate names are suppressed on a first-wins basis.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{
    CommentStyle, LanguagePatterns, ParamStyle, STATEMENT_WORDS, is_reserved, library_name,
    patterns_for,
};
use super::{Extraction, Extractor, LibrarySet, SourceLines};
use crate::analyzer::language::Language;
use crate::types::{DeclarationNode, FunctionRecord, SummarySource, synthesize_summary};

static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid identifier pattern"));

static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid xml tag pattern"));

pub struct HeuristicExtractor {
    language: Language,
    window: usize,
}

impl HeuristicExtractor {
    /// `window` is the number of lines captured per function, starting at the match line
    pub fn new(language: Language, window: usize) -> Self {
        Self {
            language,
            window: window.max(1),
        }
    }
}

impl Extractor for HeuristicExtractor {
    fn extract(&self, source: &str) -> Extraction {
        let Some(patterns) = patterns_for(self.language) else {
            tracing::debug!("No heuristic patterns for {}, skipping extraction", self.language);
            return Extraction::new();
        };

        let lines = SourceLines::new(source);
        let mut libraries = LibrarySet::new();
        let mut functions = Vec::new();
        let mut tree = Vec::new();
        let mut seen_functions: HashSet<String> = HashSet::new();
        let mut seen_classes: HashSet<String> = HashSet::new();
        let mut in_import_block = false;

        for (index, line) in lines.iter() {
            if let Some(block) = &patterns.import_block {
                if in_import_block {
                    if block.end.is_match(line) {
                        in_import_block = false;
                    } else if let Some(path) = block.line.captures(line).and_then(|c| c.name("path"))
                        && let Some(name) = library_name(path.as_str())
                    {
                        libraries.insert(&name);
                    }
                    continue;
                }
                if block.start.is_match(line) {
                    in_import_block = true;
                    continue;
                }
            }

            for re in &patterns.imports {
                if let Some(path) = re.captures(line).and_then(|c| c.name("path"))
                    && let Some(name) = library_name(path.as_str())
                {
                    libraries.insert(&name);
                }
            }

            if let Some((name, _)) = match_declaration(&patterns.classes, line)
                && seen_classes.insert(name.to_string())
            {
                tree.push(DeclarationNode::class(name, "", 0));
            }

            if let Some((name, name_end)) = match_declaration(&patterns.functions, line) {
                if !seen_functions.insert(name.to_string()) {
                    continue;
                }

                let last = index.saturating_add(self.window - 1);
                let parameters = parameter_list(&lines, index, name_end, last, patterns.quotes)
                    .map(|raw| parameter_names(&raw, patterns))
                    .unwrap_or_default();

                let (summary, summary_source) = match doc_comment(&lines, index, patterns.comments)
                {
                    Some(doc) => (doc, SummarySource::DocComment),
                    None => (synthesize_summary(&parameters), SummarySource::Synthesized),
                };

                functions.push(FunctionRecord {
                    name: name.to_string(),
                    summary,
                    summary_source,
                    source_slice: lines.slice(index, last),
                    start_line: index + 1,
                    end_line: last.min(lines.len().saturating_sub(1)) + 1,
                });

                let tree_params = parameters.into_iter().filter(|p| !is_receiver(p)).collect();
                tree.push(DeclarationNode::function(name, "", 0, tree_params));
            }
        }

        tracing::debug!(
            "Heuristic {} extraction: {} functions, {} tree nodes",
            self.language,
            functions.len(),
            tree.len()
        );

        Extraction {
            libraries: libraries.into_sorted(),
            functions,
            tree,
        }
    }

    fn language(&self) -> Language {
        self.language
    }
}

/// First pattern match whose name is neither a keyword nor part of a statement.
/// Returns the name and its end offset within the line.
fn match_declaration<'a>(regexes: &[Regex], line: &'a str) -> Option<(&'a str, usize)> {
    regexes.iter().find_map(|re| {
        let name = re.captures(line)?.name("name")?;
        if is_reserved(name.as_str()) {
            return None;
        }
        let first_word = line[..name.start()].split_whitespace().next();
        if first_word.is_some_and(|w| STATEMENT_WORDS.contains(&w)) {
            return None;
        }
        Some((name.as_str(), name.end()))
    })
}

fn is_receiver(name: &str) -> bool {
    matches!(name, "self" | "this")
}

/// Raw text between the parentheses following a declared name.
///
/// The list may continue onto later lines up to `last`; returns `None` when
/// no list follows the name or it is not closed in time.
fn parameter_list(
    lines: &SourceLines<'_>,
    index: usize,
    name_end: usize,
    last: usize,
    quotes: &str,
) -> Option<String> {
    let rest = lines.get(index)?.get(name_end..)?;
    let open = rest.find('(')?;
    if rest[..open].contains(['{', ';']) {
        return None;
    }

    let last = last.min(lines.len().saturating_sub(1));
    let segments = std::iter::once(&rest[open + 1..])
        .chain((index + 1..=last).filter_map(|i| lines.get(i)));

    let mut out = String::new();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (n, segment) in segments.enumerate() {
        if n > 0 {
            out.push('\n');
        }
        for c in segment.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                out.push(c);
                continue;
            }

            if quotes.contains(c) {
                quote = Some(c);
            } else if c == '(' {
                depth += 1;
            } else if c == ')' {
                depth -= 1;
                if depth == 0 {
                    return Some(out);
                }
            }
            out.push(c);
        }
    }

    None
}

/// Split a parameter list on commas outside nested brackets and strings
fn split_parameters<'a>(raw: &'a str, quotes: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = '\0';
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            prev = c;
            continue;
        }

        match c {
            _ if quotes.contains(c) => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            // `->` and `=>` are arrows, not closing brackets
            '>' if prev == '-' || prev == '=' => {}
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = c;
    }
    parts.push(&raw[start..]);
    parts
}

fn parameter_name(param: &str, style: ParamStyle) -> Option<String> {
    let decl = param.split('=').next().unwrap_or_default().trim();
    if decl.is_empty() {
        return None;
    }

    let ident = match style {
        ParamStyle::ColonTyped => {
            let head = decl.split(':').next().unwrap_or_default();
            IDENT.find_iter(head).last()
        }
        ParamStyle::TypeFirst => {
            if decl == "void" {
                return None;
            }
            IDENT.find_iter(decl).last()
        }
        ParamStyle::NameFirst => IDENT.find(decl),
    };
    ident.map(|m| m.as_str().to_string())
}

fn parameter_names(raw: &str, patterns: &LanguagePatterns) -> Vec<String> {
    split_parameters(raw, patterns.quotes)
        .into_iter()
        .filter_map(|p| parameter_name(p, patterns.param_style))
        .collect()
}

/// Decorators and attributes that may sit between a doc comment and its declaration
fn is_attribute(line: &str) -> bool {
    line.starts_with('@')
        || line.starts_with("#[")
        || (line.starts_with('[') && line.ends_with(']'))
}

/// Comment text of a line comment, `None` when the line is not one
fn line_comment<'a>(line: &'a str, style: CommentStyle) -> Option<&'a str> {
    let line = line.trim();
    if line.starts_with("#!") || line.starts_with("#[") {
        return None;
    }
    let marker = style.line.iter().find(|m| line.starts_with(**m))?;
    Some(
        line[marker.len()..]
            .trim_start_matches(['/', '#', '!'])
            .trim(),
    )
}

fn clean_comment_line(line: &str) -> String {
    XML_TAG.replace_all(line, "").trim().to_string()
}

/// First meaningful line of the comment directly above the declaration at `index`
fn doc_comment(lines: &SourceLines<'_>, index: usize, style: CommentStyle) -> Option<String> {
    let mut cursor = index;
    while cursor > 0 && lines.get(cursor - 1).is_some_and(|l| is_attribute(l.trim())) {
        cursor -= 1;
    }
    if cursor == 0 {
        return None;
    }

    let above = lines.get(cursor - 1)?.trim();

    if style.block && above.ends_with("*/") {
        let mut start = cursor - 1;
        while !lines.get(start)?.contains("/*") {
            start = start.checked_sub(1)?;
        }
        let block = lines.slice(start, cursor - 1);
        let body = &block[block.find("/*")? + 2..];
        let body = body.trim_end().strip_suffix("*/").unwrap_or(body);
        return body
            .lines()
            .map(|l| clean_comment_line(l.trim().trim_start_matches('*')))
            .find(|l| !l.is_empty() && !l.starts_with('@'));
    }

    line_comment(above, style)?;
    let mut start = cursor - 1;
    while start > 0
        && lines
            .get(start - 1)
            .is_some_and(|l| line_comment(l, style).is_some())
    {
        start -= 1;
    }

    (start..cursor)
        .filter_map(|i| lines.get(i))
        .filter_map(|l| line_comment(l, style))
        .map(clean_comment_line)
        .find(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeclarationKind;

    fn extract(language: Language, source: &str) -> Extraction {
        HeuristicExtractor::new(language, 20).extract(source)
    }

    fn names(result: &Extraction) -> Vec<&str> {
        result.functions.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_control_flow_keywords_never_emitted() {
        let js = r#"
function process(items) {
  for (const item of items) {
    if (item.ready) {
      while (queue.length) {
        switch (item.kind) {
          case 'a': break;
        }
      }
    }
  }
}
"#;
        let result = extract(Language::JavaScript, js);
        assert_eq!(names(&result), vec!["process"]);

        let c = r#"
int main(void) {
    if (argc > 1) {
        return compute(a,
                       b);
    }
    else if (argc == 0) {
        for (int i = 0; i < n; i++) {}
    }
    while (n--) {}
    return sizeof(int);
}
"#;
        let result = extract(Language::C, c);
        assert_eq!(names(&result), vec!["main"]);
        assert_eq!(result.functions[0].summary, "Function with no parameters");

        let keywords = ["if", "for", "while", "switch", "case"];
        for node in &result.tree {
            assert!(!keywords.contains(&node.name.as_str()));
        }
    }

    #[test]
    fn test_tree_is_flat() {
        let java = r#"
public class Outer {
    public void run() {
    }
    class Inner {
        int depth(int level) {
            return level + 1;
        }
    }
}
"#;
        let result = extract(Language::Java, java);
        let tree: Vec<(DeclarationKind, &str)> =
            result.tree.iter().map(|n| (n.kind, n.name.as_str())).collect();
        assert_eq!(
            tree,
            vec![
                (DeclarationKind::Class, "Outer"),
                (DeclarationKind::Function, "run"),
                (DeclarationKind::Class, "Inner"),
                (DeclarationKind::Function, "depth"),
            ]
        );
        assert!(result.tree.iter().all(|n| n.is_root() && n.nesting_level == 0));
    }

    #[test]
    fn test_source_slice_window() {
        let source = "// header\nfn first() {\n    1\n}\nfn second() {}";
        let result = HeuristicExtractor::new(Language::Rust, 3).extract(source);

        assert_eq!(result.functions.len(), 2);
        let first = &result.functions[0];
        assert_eq!(first.source_slice, "fn first() {\n    1\n}");
        assert_eq!((first.start_line, first.end_line), (2, 4));

        let second = &result.functions[1];
        assert_eq!(second.source_slice, "fn second() {}");
        assert_eq!((second.start_line, second.end_line), (5, 5));
    }

    #[test]
    fn test_huge_window_clips_at_end_of_file() {
        let result = HeuristicExtractor::new(Language::Rust, usize::MAX).extract("\n\nfn a() {}\n");

        assert_eq!(result.functions.len(), 1);
        let a = &result.functions[0];
        assert_eq!(a.source_slice, "fn a() {}\n");
        assert_eq!((a.start_line, a.end_line), (3, 4));
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let source = "function render(a) {}\nclass View {}\nfunction render(b) {}\nclass View {}\n";
        let result = extract(Language::JavaScript, source);

        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].summary, "Function with parameters: a");
        assert_eq!(result.functions[0].start_line, 1);
        assert_eq!(result.tree.len(), 2);
    }

    #[test]
    fn test_rust_doc_comments_and_receivers() {
        let source = r#"use std::collections::HashMap;
use serde::{Deserialize, Serialize};

pub struct Cache {
    items: HashMap<String, String>,
}

impl Cache {
    /// Looks up a cached value.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.items.get(key)
    }

    pub fn insert(
        &mut self,
        key: String,
        value: String,
    ) {
        self.items.insert(key, value);
    }
}
"#;
        let result = extract(Language::Rust, source);

        assert_eq!(result.libraries, vec!["HashMap", "serde"]);
        assert_eq!(names(&result), vec!["get", "insert"]);
        assert_eq!(result.functions[0].summary, "Looks up a cached value.");
        assert_eq!(result.functions[0].summary_source, SummarySource::DocComment);
        assert_eq!(
            result.functions[1].summary,
            "Function with parameters: self, key, value"
        );

        assert_eq!(result.tree[0], DeclarationNode::class("Cache", "", 0));
        assert_eq!(result.tree[1].parameter_names, vec!["key"]);
        assert_eq!(result.tree[2].parameter_names, vec!["key", "value"]);
    }

    #[test]
    fn test_go_imports_and_name_first_params() {
        let source = r#"package main

import (
	"fmt"
	str "strings"
	"net/http"
)

import "os"

// Server handles requests.
type Server struct {
	addr string
}

// Start runs the server.
func (s *Server) Start(host, port string, retries int) error {
	return nil
}
"#;
        let result = extract(Language::Go, source);

        assert_eq!(result.libraries, vec!["fmt", "http", "os", "strings"]);
        assert_eq!(result.tree[0], DeclarationNode::class("Server", "", 0));
        assert_eq!(result.functions[0].summary, "Start runs the server.");
        assert_eq!(result.tree[1].parameter_names, vec!["host", "port", "retries"]);
    }

    #[test]
    fn test_block_and_xml_doc_comments() {
        let java = r#"
/**
 * Computes the total.
 * @param a first
 */
@Override
public int total(Map<String, Integer> counts, int[] extra) {
    return 0;
}
"#;
        let result = extract(Language::Java, java);
        assert_eq!(result.functions[0].summary, "Computes the total.");
        assert_eq!(result.tree[0].parameter_names, vec!["counts", "extra"]);

        let csharp = r#"
using System.Text;

/// <summary>
/// Adds two numbers.
/// </summary>
public static int Add(int a, int b = 2)
{
    return a + b;
}
"#;
        let result = extract(Language::CSharp, csharp);
        assert_eq!(result.libraries, vec!["System.Text"]);
        assert_eq!(result.functions[0].summary, "Adds two numbers.");
        assert_eq!(result.tree[0].parameter_names, vec!["a", "b"]);
    }

    #[test]
    fn test_hash_comments() {
        let ruby = "require 'json'\nrequire_relative './lib/helpers.rb'\n\n# Greets someone\ndef greet(name, greeting = \"hi, there\")\n  puts greeting\nend\n";
        let result = extract(Language::Ruby, ruby);
        assert_eq!(result.libraries, vec!["helpers", "json"]);
        assert_eq!(result.functions[0].summary, "Greets someone");
        assert_eq!(result.tree[0].parameter_names, vec!["name", "greeting"]);

        let shell = "#!/bin/bash\ndeploy() {\n  echo done\n}\n";
        let result = extract(Language::Bash, shell);
        assert_eq!(names(&result), vec!["deploy"]);
        assert_eq!(result.functions[0].summary, "Function with no parameters");
        assert!(result.functions[0].is_synthesized());
    }

    #[test]
    fn test_c_includes_strip_extensions() {
        let source = "#include <stdio.h>\n#include \"util/strings.h\"\n#include <stdio.h>\n";
        let result = extract(Language::C, source);
        assert_eq!(result.libraries, vec!["stdio", "strings"]);
        assert!(result.functions.is_empty());
    }

    #[test]
    fn test_no_patterns_for_data_formats() {
        assert!(extract(Language::Json, "{\"a\": 1}").is_empty());
        assert!(extract(Language::Unknown, "whatever(x) {").is_empty());
    }

    #[test]
    fn test_split_parameters_respects_nesting() {
        let parts = split_parameters("f: impl Fn(i32, i32) -> i32, m: HashMap<K, V>, s = \"a,b\"", "\"");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].trim(), "s = \"a,b\"");
    }

    #[test]
    fn test_parameter_name_styles() {
        assert_eq!(parameter_name("mut count: usize", ParamStyle::ColonTyped).as_deref(), Some("count"));
        assert_eq!(parameter_name("_ name: String", ParamStyle::ColonTyped).as_deref(), Some("name"));
        assert_eq!(parameter_name("&mut self", ParamStyle::ColonTyped).as_deref(), Some("self"));
        assert_eq!(parameter_name("const char *path", ParamStyle::TypeFirst).as_deref(), Some("path"));
        assert_eq!(parameter_name("?int $limit = 10", ParamStyle::TypeFirst).as_deref(), Some("limit"));
        assert_eq!(parameter_name("void", ParamStyle::TypeFirst), None);
        assert_eq!(parameter_name("args ...string", ParamStyle::NameFirst).as_deref(), Some("args"));
        assert_eq!(parameter_name("   ", ParamStyle::NameFirst), None);
    }
}
