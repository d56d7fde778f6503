//! Prompt Builder System
//!
//! Structured construction of the overview and directory prompts.
//! Section order is preserved exactly as added, so the same input always
//! produces the same prompt.

use crate::constants::docs::PROMPT_TRUNCATION_SUFFIX;
use crate::types::{ProcessedFile, RepoMetadata};
use crate::walker::Language;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value pairs
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Code block with language
    Code { language: String, content: String },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.to_string()).collect(),
        ));
        self
    }

    /// Add a context item; consecutive items share one context section
    pub fn context_item(mut self, key: &str, value: impl Into<String>) -> Self {
        let entry = (key.to_string(), value.into());
        match self.sections.last_mut() {
            Some(PromptSection::Context(items)) => items.push(entry),
            _ => self.sections.push(PromptSection::Context(vec![entry])),
        }
        self
    }

    pub fn section(mut self, header: &str, content: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.into(),
        });
        self
    }

    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.into(),
        });
        self
    }

    pub fn code(mut self, language: &str, content: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.into(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("- **{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Cut `content` to at most `max_chars` characters, marking the cut
pub fn truncate_for_prompt(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &content[..byte_idx], PROMPT_TRUNCATION_SUFFIX),
        None => content.to_string(),
    }
}

/// Preset prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// Repository-wide overview prompt
    pub fn repository_overview(meta: &RepoMetadata) -> String {
        PromptBuilder::new()
            .role("technical writer", "repository documentation")
            .text("Write a detailed overview of this source-code repository.")
            .context_item("Name", meta.name.as_str())
            .context_item(
                "Description",
                meta.description.as_deref().unwrap_or("Not provided"),
            )
            .context_item(
                "Primary language",
                meta.primary_language.as_deref().unwrap_or("Not specified"),
            )
            .context_item(
                "Statistics",
                format!(
                    "{} stars, {} forks, {} open issues",
                    meta.star_count, meta.fork_count, meta.open_issue_count
                ),
            )
            .context_item("Created", meta.created_at.to_rfc3339())
            .context_item("Last updated", meta.updated_at.to_rfc3339())
            .context_item("License", meta.license.as_str())
            .objectives(&[
                "Introduce the repository and explain its purpose",
                "Describe its main features",
                "Explain how it can be used",
                "Give an overview of the project architecture",
            ])
            .text("Respond in Markdown.")
            .build()
    }

    /// Per-directory documentation prompt
    pub fn directory(dir_name: &str, files: &[ProcessedFile], max_file_chars: usize) -> String {
        let listing = files
            .iter()
            .map(|f| format!("- {} ({}, {} KB)", f.path, f.language, f.size_kb()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut builder = PromptBuilder::new()
            .role("technical writer", "source code documentation")
            .text("Write detailed documentation for this source directory.")
            .context_item("Directory", dir_name)
            .section("Files in this directory", listing)
            .section("File contents", "");

        for file in files {
            builder = builder
                .text(format!("File: {}\nLanguage: {}", file.path, file.language))
                .code(
                    Language::from_display_name(&file.language).highlight_str(),
                    truncate_for_prompt(&file.content, max_file_chars),
                );
        }

        builder
            .objectives(&[
                "An overview of the purpose of this directory",
                "A description of the functionality it implements",
                "How the files relate to each other",
                "The important classes, functions and modules",
                "Design patterns in use",
                "Usage examples, where applicable",
            ])
            .text("Organize the result clearly with headings and subheadings, in Markdown.")
            .build()
    }
}
