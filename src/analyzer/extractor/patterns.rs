//! Per-language line patterns for heuristic extraction.
//!
//! Import patterns capture `path`, function and class patterns capture
//! `name`. Every pattern is matched against a single source line.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::language::Language;

/// How a parameter name is picked out of one parameter declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `name: Type`, `label name: Type`, `name = default` (Rust, TS, Kotlin, Swift, Python)
    ColonTyped,
    /// `Type name`, `const char *name` (C family, Java, C#, PHP)
    TypeFirst,
    /// `name Type`, `a, b int` (Go)
    NameFirst,
}

/// `import (` ... `)` style grouped imports
pub struct ImportBlock {
    pub start: Regex,
    pub line: Regex,
    pub end: Regex,
}

#[derive(Debug, Clone, Copy)]
pub struct CommentStyle {
    pub line: &'static [&'static str],
    pub block: bool,
}

const C_COMMENTS: CommentStyle = CommentStyle {
    line: &["///", "//!", "//"],
    block: true,
};

const HASH_COMMENTS: CommentStyle = CommentStyle {
    line: &["#"],
    block: false,
};

const PHP_COMMENTS: CommentStyle = CommentStyle {
    line: &["//", "#"],
    block: true,
};

pub struct LanguagePatterns {
    pub imports: Vec<Regex>,
    pub import_block: Option<ImportBlock>,
    pub functions: Vec<Regex>,
    pub classes: Vec<Regex>,
    pub param_style: ParamStyle,
    pub comments: CommentStyle,
    /// Characters that open a string literal inside a parameter list
    pub quotes: &'static str,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid heuristic pattern"))
        .collect()
}

fn table(
    imports: &[&str],
    functions: &[&str],
    classes: &[&str],
    param_style: ParamStyle,
    comments: CommentStyle,
) -> LanguagePatterns {
    LanguagePatterns {
        imports: compile(imports),
        import_block: None,
        functions: compile(functions),
        classes: compile(classes),
        param_style,
        comments,
        quotes: "\"'`",
    }
}

const C_INCLUDE: &str = r#"^\s*#\s*include\s*[<"](?P<path>[^>"]+)[>"]"#;
const C_FUNCTION: &str = r"^\s*(?:[A-Za-z_]\w*[\s*&]+)+(?P<name>[A-Za-z_]\w*)\s*\([^;]*$";
const C_STRUCT: &str = r"^\s*(?:typedef\s+)?struct\s+(?P<name>[A-Za-z_]\w*)\s*\{?\s*$";

const CPP_FUNCTION: &str = r"^\s*(?:template\s*<[^>]*>\s*)?(?:[A-Za-z_][\w:]*(?:<[^;()]*>)?[\s*&]+)+(?:[A-Za-z_]\w*::)*(?P<name>~?[A-Za-z_]\w*)\s*\([^;]*$";
const CPP_QUALIFIED: &str = r"^\s*(?:[A-Za-z_]\w*::)+(?P<name>~?[A-Za-z_]\w*)\s*\([^;]*$";
const CPP_CLASS: &str = r"^\s*(?:template\s*<[^>]*>\s*)?(?:class|struct)\s+(?P<name>[A-Za-z_]\w*)(?:\s+final)?\s*(?::[^;{]*)?\{?\s*$";

const JS_IMPORTS: &[&str] = &[
    r#"^\s*import\s+(?:type\s+)?(?:[\w*{}\s,$]+\s+from\s+)?['"](?P<path>[^'"]+)['"]"#,
    r#"^\s*export\s+.*\bfrom\s+['"](?P<path>[^'"]+)['"]"#,
    r#"\brequire\s*\(\s*['"](?P<path>[^'"]+)['"]\s*\)"#,
];
const JS_FUNCTIONS: &[&str] = &[
    r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)\s*\(",
    r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)",
    r"^\s*(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?(?P<name>[A-Za-z_$][\w$]*)\s*\([^)]*\)\s*\{",
];
const JS_CLASSES: &[&str] = &[r"^\s*(?:export\s+)?(?:default\s+)?class\s+(?P<name>[A-Za-z_$][\w$]*)"];

static JAVASCRIPT: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(JS_IMPORTS, JS_FUNCTIONS, JS_CLASSES, ParamStyle::ColonTyped, C_COMMENTS)
});

static TYPESCRIPT: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        JS_IMPORTS,
        &[
            JS_FUNCTIONS[0],
            JS_FUNCTIONS[1],
            r"^\s*(?:(?:public|private|protected|static|async|override|readonly|abstract)\s+)*(?P<name>[A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\([^)]*\)\s*(?::\s*[^={;]+)?\{",
        ],
        &[
            r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(?P<name>[A-Za-z_$][\w$]*)",
            r"^\s*(?:export\s+)?interface\s+(?P<name>[A-Za-z_$][\w$]*)",
        ],
        ParamStyle::ColonTyped,
        C_COMMENTS,
    )
});

static JAVA: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r"^\s*import\s+(?:static\s+)?(?P<path>[\w.]+(?:\.\*)?)\s*;"],
        &[r"^\s*(?:@\w+(?:\([^)]*\))?\s+)*(?:[\w<>\[\].,?]+\s+)+(?P<name>[A-Za-z_$][\w$]*)\s*\([^;]*$"],
        &[r"^\s*(?:(?:public|protected|private|static|abstract|final|sealed|non-sealed|strictfp)\s+)*(?:class|interface|enum|record|@interface)\s+(?P<name>[A-Za-z_$][\w$]*)"],
        ParamStyle::TypeFirst,
        C_COMMENTS,
    )
});

static KOTLIN: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r"^\s*import\s+(?P<path>[\w.]+)"],
        &[r"^\s*(?:(?:public|private|protected|internal|override|open|abstract|final|suspend|inline|operator|infix|tailrec|external)\s+)*fun\s+(?:<[^>]*>\s*)?(?:[\w.]+\.)?(?P<name>[A-Za-z_]\w*)\s*\("],
        &[r"^\s*(?:(?:public|private|protected|internal|open|abstract|sealed|data|enum|inner|annotation|value)\s+)*(?:class|interface|object)\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::ColonTyped,
        C_COMMENTS,
    )
});

static SCALA: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r"^\s*import\s+(?P<path>[\w.]+)"],
        &[r"^\s*(?:(?:override|private|protected|final|implicit|inline)\s+)*def\s+(?P<name>[A-Za-z_]\w*)"],
        &[r"^\s*(?:(?:abstract|final|sealed|case|implicit|private|protected)\s+)*(?:class|trait|object)\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::ColonTyped,
        C_COMMENTS,
    )
});

static C: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[C_INCLUDE],
        &[C_FUNCTION],
        &[C_STRUCT],
        ParamStyle::TypeFirst,
        C_COMMENTS,
    )
});

static CPP: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[C_INCLUDE],
        &[CPP_FUNCTION, CPP_QUALIFIED],
        &[CPP_CLASS],
        ParamStyle::TypeFirst,
        C_COMMENTS,
    )
});

static OBJECTIVE_C: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[
            r#"^\s*#\s*(?:import|include)\s*[<"](?P<path>[^>"]+)[>"]"#,
            r"^\s*@import\s+(?P<path>[\w.]+)",
        ],
        &[r"^\s*[-+]\s*\([^)]*\)\s*(?P<name>[A-Za-z_]\w*)", C_FUNCTION],
        &[r"^\s*@(?:interface|implementation|protocol)\s+(?P<name>[A-Za-z_]\w*)", C_STRUCT],
        ParamStyle::TypeFirst,
        C_COMMENTS,
    )
});

static OBJECTIVE_CPP: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[
            r#"^\s*#\s*(?:import|include)\s*[<"](?P<path>[^>"]+)[>"]"#,
            r"^\s*@import\s+(?P<path>[\w.]+)",
        ],
        &[
            r"^\s*[-+]\s*\([^)]*\)\s*(?P<name>[A-Za-z_]\w*)",
            CPP_FUNCTION,
            CPP_QUALIFIED,
        ],
        &[r"^\s*@(?:interface|implementation|protocol)\s+(?P<name>[A-Za-z_]\w*)", CPP_CLASS],
        ParamStyle::TypeFirst,
        C_COMMENTS,
    )
});

static CSHARP: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r"^\s*(?:global\s+)?using\s+(?:static\s+)?(?P<path>[\w.]+)\s*;"],
        &[r"^\s*(?:\[[^\]]*\]\s*)*(?:[\w<>\[\].,?]+\s+)+(?P<name>[A-Za-z_]\w*)\s*(?:<[^>]*>)?\s*\([^;]*$"],
        &[r"^\s*(?:(?:public|private|protected|internal|static|abstract|sealed|partial|readonly|ref)\s+)*(?:class|struct|interface|record|enum)\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::TypeFirst,
        C_COMMENTS,
    )
});

static GO: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    let mut patterns = table(
        &[r#"^\s*import\s+(?:[\w.]+\s+)?"(?P<path>[^"]+)""#],
        &[r"^\s*func\s+(?:\([^)]*\)\s*)?(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*\("],
        &[r"^\s*type\s+(?P<name>[A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(?:struct|interface)\b"],
        ParamStyle::NameFirst,
        C_COMMENTS,
    );
    patterns.import_block = Some(ImportBlock {
        start: Regex::new(r"^\s*import\s*\(\s*$").expect("valid import block start"),
        line: Regex::new(r#"^\s*(?:[\w.]+\s+)?"(?P<path>[^"]+)""#).expect("valid import block line"),
        end: Regex::new(r"^\s*\)").expect("valid import block end"),
    });
    patterns
});

static RUST: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    let mut patterns = table(
        &[
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+(?:::)?(?P<path>[\w:]+)",
            r"^\s*extern\s+crate\s+(?P<path>\w+)",
        ],
        &[r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:(?:const|async|unsafe|default|extern(?:\s+"[^"]*")?)\s+)*fn\s+(?P<name>[A-Za-z_]\w*)"#],
        &[r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait|union)\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::ColonTyped,
        C_COMMENTS,
    );
    // Lifetimes make `'` unusable as a string delimiter
    patterns.quotes = "\"";
    patterns
});

static SWIFT: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r"^\s*(?:@\w+\s+)?import\s+(?:(?:class|struct|enum|protocol|func|var|let|typealias)\s+)?(?P<path>[\w.]+)"],
        &[r"^\s*(?:@\w+\s+)*(?:(?:public|private|fileprivate|internal|open|static|class|override|final|mutating|nonmutating)\s+)*func\s+(?P<name>[A-Za-z_]\w*)"],
        &[r"^\s*(?:@\w+\s+)*(?:(?:public|private|fileprivate|internal|open|final)\s+)*(?:class|struct|enum|protocol|actor|extension)\s+(?P<name>[A-Za-z_]\w*)\s*(?:[:<{]|where\b|$)"],
        ParamStyle::ColonTyped,
        C_COMMENTS,
    )
});

static PHP: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[
            r#"^\s*(?:require|include)(?:_once)?\s*\(?\s*['"](?P<path>[^'"]+)['"]"#,
            r"^\s*use\s+(?:function\s+|const\s+)?(?P<path>[\w\\]+)",
        ],
        &[r"^\s*(?:(?:public|private|protected|static|abstract|final)\s+)*function\s+&?(?P<name>[A-Za-z_]\w*)\s*\("],
        &[r"^\s*(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::TypeFirst,
        PHP_COMMENTS,
    )
});

static RUBY: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r#"^\s*(?:require|require_relative|load)\s*\(?\s*['"](?P<path>[^'"]+)['"]"#],
        &[r"^\s*def\s+(?:self\.)?(?P<name>[A-Za-z_]\w*[?!=]?)"],
        &[r"^\s*(?:class|module)\s+(?P<name>[A-Z]\w*(?:::[A-Z]\w*)*)"],
        ParamStyle::ColonTyped,
        HASH_COMMENTS,
    )
});

static PYTHON: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[
            r"^\s*import\s+(?P<path>[\w.]+)",
            r"^\s*from\s+(?P<path>[\w.]+)\s+import\b",
        ],
        &[r"^\s*(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)\s*\("],
        &[r"^\s*class\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::ColonTyped,
        HASH_COMMENTS,
    )
});

static SHELL: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[r#"^\s*(?:source|\.)\s+['"]?(?P<path>[^'"\s;]+)"#],
        &[
            r"^\s*function\s+(?P<name>[A-Za-z_][\w-]*)",
            r"^\s*(?P<name>[A-Za-z_][\w-]*)\s*\(\s*\)",
        ],
        &[],
        ParamStyle::NameFirst,
        HASH_COMMENTS,
    )
});

static POWERSHELL: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[
            r"^\s*(?i:import-module)\s+(?P<path>[\w.\-\\/]+)",
            r"^\s*\.\s+(?P<path>\S+\.ps1)",
        ],
        &[r"^\s*(?i:function|filter)\s+(?P<name>[A-Za-z_][\w-]*)"],
        &[r"^\s*(?i:class)\s+(?P<name>[A-Za-z_]\w*)"],
        ParamStyle::TypeFirst,
        HASH_COMMENTS,
    )
});

static R: LazyLock<LanguagePatterns> = LazyLock::new(|| {
    table(
        &[
            r#"^\s*(?:library|require|requireNamespace)\s*\(\s*['"]?(?P<path>[\w.]+)['"]?"#,
            r#"^\s*source\s*\(\s*['"](?P<path>[^'"]+)['"]"#,
        ],
        &[r"^\s*(?P<name>[A-Za-z_.][\w.]*)\s*(?:<-|=)\s*function\s*\("],
        &[r#"^\s*(?:setClass|setRefClass|R6Class)\s*\(\s*['"](?P<name>[\w.]+)['"]"#],
        ParamStyle::ColonTyped,
        HASH_COMMENTS,
    )
});

/// Pattern table for a language, `None` for data and markup formats
pub fn patterns_for(language: Language) -> Option<&'static LanguagePatterns> {
    let patterns: &'static LanguagePatterns = match language {
        Language::JavaScript | Language::Vue => &JAVASCRIPT,
        Language::TypeScript => &TYPESCRIPT,
        Language::Java => &JAVA,
        Language::Kotlin => &KOTLIN,
        Language::Scala => &SCALA,
        Language::C => &C,
        Language::Cpp => &CPP,
        Language::ObjectiveC => &OBJECTIVE_C,
        Language::ObjectiveCpp => &OBJECTIVE_CPP,
        Language::CSharp => &CSHARP,
        Language::Go => &GO,
        Language::Rust => &RUST,
        Language::Swift => &SWIFT,
        Language::Php => &PHP,
        Language::Ruby => &RUBY,
        Language::Python => &PYTHON,
        Language::Shell | Language::Bash | Language::Zsh => &SHELL,
        Language::PowerShell => &POWERSHELL,
        Language::R => &R,
        Language::Html
        | Language::Css
        | Language::Scss
        | Language::Sql
        | Language::Xml
        | Language::Json
        | Language::Yaml
        | Language::Toml
        | Language::Markdown
        | Language::Unknown => return None,
    };
    Some(patterns)
}

/// Names that look like calls but are control flow
pub const RESERVED_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "case", "catch", "foreach", "elseif", "return", "sizeof",
    "else", "elif", "do", "until", "unless", "when", "with", "using", "lock", "synchronized",
    "function", "typeof", "defer", "guard",
];

/// First words that mark a statement rather than a declaration
pub const STATEMENT_WORDS: &[&str] = &[
    "return", "throw", "new", "else", "yield", "await", "goto", "delete", "echo", "print",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name)
}

/// Extensions stripped from the last import path segment
const IMPORT_EXTENSIONS: &[&str] = &[
    "h", "hh", "hpp", "hxx", "inl", "c", "cc", "cpp", "cxx", "m", "mm", "js", "mjs", "cjs", "jsx",
    "ts", "mts", "cts", "tsx", "vue", "py", "rb", "php", "sh", "bash", "zsh", "ps1", "psm1", "r",
    "go", "rs", "swift", "kt", "java", "cs", "scala",
];

/// Library name for an import path: the last `/`, `\` or `::` segment with a
/// known source or header extension removed
pub fn library_name(path: &str) -> Option<String> {
    let segment = path
        .trim()
        .split(['/', '\\'])
        .flat_map(|part| part.split("::"))
        .filter(|part| !part.is_empty())
        .last()?;

    let name = match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && IMPORT_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) =>
        {
            stem
        }
        _ => segment,
    };

    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
