//! Language Classification
//!
//! **Single source of truth** for language detection. A file is classified by
//! its extension first and by content signatures second.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codelens::analyzer::language::{Language, classify};
//!
//! assert_eq!(classify("main.rs", ""), Language::Rust);
//! assert_eq!(classify("script", "<?php echo 1;"), Language::Php);
//! assert_eq!(Language::Cpp.to_string(), "C++");
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Language Metadata Table - Single Source of Truth
// =============================================================================

/// Language metadata entry containing all language-specific information
struct LanguageMeta {
    /// Display name, also the canonical language tag
    display_name: &'static str,
    /// File extensions that map to this language
    extensions: &'static [&'static str],
    /// Alternative names for parsing from string
    aliases: &'static [&'static str],
    /// Whether a full grammar parse is available
    precise: bool,
}

/// Macro to define language metadata concisely
macro_rules! lang_meta {
    ($display:literal, [$($ext:literal),*], [$($alias:literal),*], $precise:literal) => {
        LanguageMeta {
            display_name: $display,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
            precise: $precise,
        }
    };
}

impl Language {
    /// Get metadata for this language variant
    fn meta(&self) -> LanguageMeta {
        match self {
            // Systems Languages
            Language::C => lang_meta!("C", ["c", "h"], ["c"], false),
            Language::Cpp => lang_meta!("C++", ["cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx", "h++"], ["cpp", "c++", "cxx"], false),
            Language::Rust => lang_meta!("Rust", ["rs"], ["rust", "rs"], false),
            Language::Go => lang_meta!("Go", ["go"], ["go", "golang"], false),
            Language::ObjectiveC => lang_meta!("Objective-C", ["m"], ["objectivec", "objective-c", "objc"], false),
            Language::ObjectiveCpp => lang_meta!("Objective-C++", ["mm"], ["objectivec++", "objective-c++", "objcpp"], false),

            // JVM Languages
            Language::Java => lang_meta!("Java", ["java"], ["java"], false),
            Language::Kotlin => lang_meta!("Kotlin", ["kt", "kts"], ["kotlin", "kt"], false),
            Language::Scala => lang_meta!("Scala", ["scala", "sc"], ["scala"], false),

            // .NET
            Language::CSharp => lang_meta!("C#", ["cs"], ["csharp", "c#", "cs"], false),

            // Web Languages
            Language::JavaScript => lang_meta!("JavaScript", ["js", "mjs", "cjs", "jsx"], ["javascript", "js"], false),
            Language::TypeScript => lang_meta!("TypeScript", ["ts", "mts", "cts", "tsx"], ["typescript", "ts"], false),
            Language::Php => lang_meta!("PHP", ["php", "phtml"], ["php"], false),
            Language::Html => lang_meta!("HTML", ["html", "htm"], ["html"], false),
            Language::Css => lang_meta!("CSS", ["css"], ["css"], false),
            Language::Scss => lang_meta!("SCSS", ["scss", "sass"], ["scss", "sass"], false),
            Language::Vue => lang_meta!("Vue", ["vue"], ["vue"], false),

            // Scripting Languages
            Language::Python => lang_meta!("Python", ["py", "pyi", "pyw"], ["python", "py"], true),
            Language::Ruby => lang_meta!("Ruby", ["rb", "rake", "gemspec"], ["ruby", "rb"], false),
            Language::R => lang_meta!("R", ["r"], ["r"], false),

            // Mobile
            Language::Swift => lang_meta!("Swift", ["swift"], ["swift"], false),

            // Shell
            Language::Shell => lang_meta!("Shell", ["sh", "ksh"], ["shell", "sh"], false),
            Language::Bash => lang_meta!("Bash", ["bash"], ["bash"], false),
            Language::Zsh => lang_meta!("Zsh", ["zsh"], ["zsh"], false),
            Language::PowerShell => lang_meta!("PowerShell", ["ps1", "psm1", "psd1"], ["powershell", "ps1"], false),

            // Data/Config
            Language::Sql => lang_meta!("SQL", ["sql"], ["sql"], false),
            Language::Xml => lang_meta!("XML", ["xml", "xsd", "xsl", "xslt"], ["xml"], false),
            Language::Json => lang_meta!("JSON", ["json", "jsonc"], ["json"], false),
            Language::Yaml => lang_meta!("YAML", ["yaml", "yml"], ["yaml", "yml"], false),
            Language::Toml => lang_meta!("TOML", ["toml"], ["toml"], false),
            Language::Markdown => lang_meta!("Markdown", ["md", "markdown"], ["markdown", "md"], false),

            Language::Unknown => lang_meta!("Unknown", [], ["unknown", "text", ""], false),
        }
    }
}

// =============================================================================
// Language Enum Definition
// =============================================================================

/// Language tags produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    // Systems Languages
    C,
    Cpp,
    Rust,
    Go,
    ObjectiveC,
    ObjectiveCpp,

    // JVM Languages
    Java,
    Kotlin,
    Scala,

    // .NET
    CSharp,

    // Web Languages
    JavaScript,
    TypeScript,
    Php,
    Html,
    Css,
    Scss,
    Vue,

    // Scripting Languages
    Python,
    Ruby,
    R,

    // Mobile
    Swift,

    // Shell
    Shell,
    Bash,
    Zsh,
    PowerShell,

    // Data/Config
    Sql,
    Xml,
    Json,
    Yaml,
    Toml,
    Markdown,

    #[default]
    Unknown,
}

// =============================================================================
// Language Methods (using metadata table)
// =============================================================================

impl Language {
    /// Display name, used as the language tag in reports
    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    /// Detect language from a bare file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();

        for lang in Self::all_variants() {
            if lang.meta().extensions.iter().any(|e| *e == ext_lower) {
                return *lang;
            }
        }

        Language::Unknown
    }

    /// Detect language from file path extension only
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Detect language from source text signatures only
    pub fn from_content(source: &str) -> Self {
        for (language, is_match) in CONTENT_SIGNATURES {
            if is_match(source) {
                return *language;
            }
        }
        Language::Unknown
    }

    /// Check if this is a known language (not Unknown)
    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Check if this language is extracted with a full grammar parse
    pub fn has_precise_parser(&self) -> bool {
        self.meta().precise
    }

    /// Every extension the classifier maps, paired with its language
    pub fn extension_table() -> Vec<(&'static str, Language)> {
        Self::all_variants()
            .iter()
            .flat_map(|lang| lang.meta().extensions.iter().map(move |ext| (*ext, *lang)))
            .collect()
    }

    /// Get all language variants for iteration
    pub fn all_variants() -> &'static [Language] {
        &[
            Language::C, Language::Cpp, Language::Rust, Language::Go,
            Language::ObjectiveC, Language::ObjectiveCpp, Language::Java,
            Language::Kotlin, Language::Scala, Language::CSharp,
            Language::JavaScript, Language::TypeScript, Language::Php,
            Language::Html, Language::Css, Language::Scss, Language::Vue,
            Language::Python, Language::Ruby, Language::R, Language::Swift,
            Language::Shell, Language::Bash, Language::Zsh, Language::PowerShell,
            Language::Sql, Language::Xml, Language::Json, Language::Yaml,
            Language::Toml, Language::Markdown,
        ]
    }
}

/// Classify a file: extension lookup, then content signatures, then Unknown.
pub fn classify(filename: &str, source: &str) -> Language {
    let by_extension = Language::from_path(filename);
    if by_extension.is_known() {
        return by_extension;
    }
    Language::from_content(source)
}

// =============================================================================
// Content Signatures
// =============================================================================

static RE_RUST_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfn\s+\w+").expect("valid rust fn signature"));
static RE_RUST_LET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\blet\s+(?:mut\s+)?\w+\s*:").expect("valid rust let signature")
});
static RE_RUST_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*use\s+\w+::").expect("valid rust use signature"));
static RE_GO_PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+\w+").expect("valid go package signature"));
static RE_GO_IMPORT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s*\(").expect("valid go import signature"));
static RE_RUBY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*def\s+\w+").expect("valid ruby def signature"));
static RE_RUBY_REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*require(?:_relative)?\s*\(?\s*['"]"#).expect("valid ruby signature")
});
static RE_PYTHON_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:async\s+)?def\s+\w+\s*\(.*\)\s*(?:->.*)?:\s*$")
        .expect("valid python def signature")
});
static RE_PYTHON_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:import\s+\w+|from\s+[\w.]+\s+import\s+)")
        .expect("valid python import signature")
});
static RE_PUBLIC_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpublic\s+(?:(?:abstract|final|static|open|data)\s+)*class\s+\w+[^{;]*\{")
        .expect("valid class signature")
});
static RE_KOTLIN_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfun\s+\w+|\b(?:val|var)\s+\w+\s*:\s*\w+").expect("valid kotlin signature")
});
static RE_JS_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\b|\b(?:const|let|var)\s+[\w$]+\s*=").expect("valid js signature")
});

type Signature = fn(&str) -> bool;

/// Ordered content rules; the first match wins
const CONTENT_SIGNATURES: &[(Language, Signature)] = &[
    (Language::Cpp, |s| s.contains("#include") || s.contains("using namespace")),
    (Language::Swift, |s| s.contains("func") && s.contains("import Foundation")),
    (Language::Rust, |s| {
        RE_RUST_FN.is_match(s) && (RE_RUST_LET.is_match(s) || RE_RUST_USE.is_match(s))
    }),
    (Language::Go, |s| RE_GO_PACKAGE.is_match(s) && RE_GO_IMPORT_BLOCK.is_match(s)),
    (Language::Ruby, |s| RE_RUBY_DEF.is_match(s) && RE_RUBY_REQUIRE.is_match(s)),
    (Language::Php, |s| s.contains("<?php")),
    (Language::Python, |s| RE_PYTHON_DEF.is_match(s) && RE_PYTHON_IMPORT.is_match(s)),
    (Language::Kotlin, |s| RE_PUBLIC_CLASS.is_match(s) && RE_KOTLIN_SYNTAX.is_match(s)),
    (Language::Java, |s| RE_PUBLIC_CLASS.is_match(s)),
    (Language::JavaScript, |s| RE_JS_BINDING.is_match(s)),
];

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.to_lowercase();

        for lang in Self::all_variants() {
            let meta = lang.meta();
            if meta.display_name.to_lowercase() == s_lower
                || meta.aliases.iter().any(|a| *a == s_lower)
            {
                return Ok(*lang);
            }
        }

        if s_lower.is_empty() || s_lower == "unknown" || s_lower == "text" {
            return Ok(Language::Unknown);
        }

        Err(())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown language tag: {}", tag)))
    }
}
