//! Language Detection
//!
//! Maps file extensions onto display names through one static table.
//! Files with an unrecognised extension are labelled `"Unknown"`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Metadata entry for one language
struct LanguageMeta {
    /// Human-readable name, shown in prompts and file listings
    display_name: &'static str,
    /// Identifier for fenced code blocks
    highlight_str: &'static str,
    /// Lowercase extensions without the dot
    extensions: &'static [&'static str],
}

macro_rules! lang_meta {
    ($display:literal, $highlight:literal, [$($ext:literal),*]) => {
        LanguageMeta {
            display_name: $display,
            highlight_str: $highlight,
            extensions: &[$($ext),*],
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Python,
    Java,
    C,
    Cpp,
    CSharp,
    Go,
    Ruby,
    Php,
    Html,
    Css,
    Json,
    Markdown,
    Yaml,
    Shell,
    Sql,
    Rust,
    Swift,
    Kotlin,
    #[default]
    Unknown,
}

impl Language {
    const ALL: &'static [Language] = &[
        Language::JavaScript,
        Language::TypeScript,
        Language::Jsx,
        Language::Tsx,
        Language::Python,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Go,
        Language::Ruby,
        Language::Php,
        Language::Html,
        Language::Css,
        Language::Json,
        Language::Markdown,
        Language::Yaml,
        Language::Shell,
        Language::Sql,
        Language::Rust,
        Language::Swift,
        Language::Kotlin,
    ];

    #[rustfmt::skip]
    fn meta(&self) -> LanguageMeta {
        match self {
            Language::JavaScript => lang_meta!("JavaScript", "javascript", ["js"]),
            Language::TypeScript => lang_meta!("TypeScript", "typescript", ["ts"]),
            Language::Jsx => lang_meta!("React JSX", "jsx", ["jsx"]),
            Language::Tsx => lang_meta!("React TSX", "tsx", ["tsx"]),
            Language::Python => lang_meta!("Python", "python", ["py"]),
            Language::Java => lang_meta!("Java", "java", ["java"]),
            Language::C => lang_meta!("C", "c", ["c"]),
            Language::Cpp => lang_meta!("C++", "cpp", ["cpp"]),
            Language::CSharp => lang_meta!("C#", "csharp", ["cs"]),
            Language::Go => lang_meta!("Go", "go", ["go"]),
            Language::Ruby => lang_meta!("Ruby", "ruby", ["rb"]),
            Language::Php => lang_meta!("PHP", "php", ["php"]),
            Language::Html => lang_meta!("HTML", "html", ["html"]),
            Language::Css => lang_meta!("CSS", "css", ["css"]),
            Language::Json => lang_meta!("JSON", "json", ["json"]),
            Language::Markdown => lang_meta!("Markdown", "markdown", ["md"]),
            Language::Yaml => lang_meta!("YAML", "yaml", ["yml", "yaml"]),
            Language::Shell => lang_meta!("Shell", "bash", ["sh"]),
            Language::Sql => lang_meta!("SQL", "sql", ["sql"]),
            Language::Rust => lang_meta!("Rust", "rust", ["rs"]),
            Language::Swift => lang_meta!("Swift", "swift", ["swift"]),
            Language::Kotlin => lang_meta!("Kotlin", "kotlin", ["kt"]),
            Language::Unknown => lang_meta!("Unknown", "text", []),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    /// Identifier to use after a ```` ``` ```` fence
    pub fn highlight_str(&self) -> &'static str {
        self.meta().highlight_str
    }

    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.meta().extensions.contains(&ext.as_str()))
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Reverse lookup from a display name, e.g. `"React TSX"`
    pub fn from_display_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == name)
            .unwrap_or(Language::Unknown)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display name for the language of `path`
pub fn detect_language<P: AsRef<Path>>(path: P) -> &'static str {
    Language::from_path(path).as_str()
}
