use std::fmt::Write;

use super::{CONTENTS_HEADING, Renderer};
use crate::types::{Result, Section};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn format_document(&self, title: &str, content: &str) -> Result<String> {
        let mut doc = String::with_capacity(title.len() + content.len() + 4);
        write!(doc, "# {}\n\n{}", title, content)?;
        Ok(doc)
    }

    fn format_index(&self, title: &str, sections: &[Section]) -> Result<String> {
        let mut doc = String::new();
        write!(doc, "# {}\n\n## {}\n\n", title, CONTENTS_HEADING)?;
        for section in sections {
            writeln!(
                doc,
                "- [{}]({})",
                escape_link_text(&section.title),
                link_target(&section.path)
            )?;
        }
        Ok(doc)
    }

    fn file_extension(&self) -> &'static str {
        "md"
    }
}

/// Backslash-escape the characters that would end link text early
fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Targets with spaces or parentheses go in angle brackets
fn link_target(path: &str) -> String {
    if path.contains([' ', '(', ')']) {
        format!("<{}>", path)
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_document() {
        let doc = MarkdownRenderer
            .format_document("Documentation: src", "Body text.")
            .unwrap();
        assert_eq!(doc, "# Documentation: src\n\nBody text.");
    }

    #[test]
    fn test_format_index() {
        let sections = vec![
            Section::new("root", "root.md"),
            Section::new("src/utils", "src_utils.md"),
        ];
        let index = MarkdownRenderer
            .format_index("Documentation: demo", &sections)
            .unwrap();
        assert_eq!(
            index,
            "# Documentation: demo\n\n## Contents\n\n- [root](root.md)\n- [src/utils](src_utils.md)\n"
        );
    }

    #[test]
    fn test_index_link_special_characters() {
        let sections = vec![
            Section::new("docs/[draft]", "docs__draft_.md"),
            Section::new("a\\b", "my notes (old).md"),
        ];
        let index = MarkdownRenderer.format_index("Documentation: x", &sections).unwrap();
        assert!(index.contains("- [docs/\\[draft\\]](docs__draft_.md)\n"));
        assert!(index.contains("- [a\\\\b](<my notes (old).md>)\n"));
    }

    #[test]
    fn test_empty_index() {
        let index = MarkdownRenderer.format_index("Documentation: empty", &[]).unwrap();
        assert!(index.ends_with("## Contents\n\n"));
    }
}
