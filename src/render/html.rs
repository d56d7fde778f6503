//! HTML rendering
//!
//! Provider output is Markdown and goes through `pulldown-cmark`. Titles and
//! index entries are escaped here.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{Event, Options, Parser, html};

use super::{CONTENTS_HEADING, Renderer};
use crate::types::{Result, Section};

const DOCUMENT_STYLE: &str = r#"    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif;
      line-height: 1.6;
      max-width: 900px;
      margin: 0 auto;
      padding: 20px;
      color: #333;
    }
    h1, h2, h3, h4, h5, h6 {
      margin-top: 1.5em;
      margin-bottom: 0.5em;
      color: #111;
    }
    code {
      background-color: #f5f5f5;
      padding: 0.2em 0.4em;
      border-radius: 3px;
      font-family: Consolas, Monaco, 'Andale Mono', monospace;
      font-size: 0.9em;
    }
    pre {
      background-color: #f5f5f5;
      padding: 1em;
      border-radius: 5px;
      overflow-x: auto;
    }
    pre code {
      background-color: transparent;
      padding: 0;
    }
    a {
      color: #0366d6;
      text-decoration: none;
    }
    a:hover {
      text-decoration: underline;
    }
    table {
      border-collapse: collapse;
      width: 100%;
      margin: 1em 0;
    }
    table, th, td {
      border: 1px solid #ddd;
    }
    th, td {
      padding: 8px 12px;
      text-align: left;
    }
    th {
      background-color: #f5f5f5;
    }
"#;

const INDEX_STYLE: &str = r#"    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif;
      line-height: 1.6;
      max-width: 900px;
      margin: 0 auto;
      padding: 20px;
      color: #333;
    }
    h1 {
      margin-bottom: 0.5em;
      color: #111;
    }
    h2 {
      margin-top: 1.5em;
      color: #333;
    }
    ul {
      padding-left: 20px;
    }
    li {
      margin-bottom: 10px;
    }
    a {
      color: #0366d6;
      text-decoration: none;
    }
"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn page(title: &str, style: &str, body: &str) -> Result<String> {
        let title = encode_text(title);
        let mut page = String::with_capacity(body.len() + style.len() + 512);
        writeln!(page, "<!DOCTYPE html>")?;
        writeln!(page, "<html lang=\"en\">")?;
        writeln!(page, "<head>")?;
        writeln!(page, "  <meta charset=\"UTF-8\">")?;
        writeln!(
            page,
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(page, "  <title>{}</title>", title)?;
        write!(page, "  <style>\n{}  </style>\n", style)?;
        writeln!(page, "</head>")?;
        writeln!(page, "<body>")?;
        writeln!(page, "  <h1>{}</h1>", title)?;
        page.push_str(body);
        writeln!(page, "</body>")?;
        write!(page, "</html>")?;
        Ok(page)
    }
}

impl Renderer for HtmlRenderer {
    fn format_document(&self, title: &str, content: &str) -> Result<String> {
        Self::page(title, DOCUMENT_STYLE, &markdown_to_html(content))
    }

    fn format_index(&self, title: &str, sections: &[Section]) -> Result<String> {
        let mut body = String::new();
        writeln!(body, "  <h2>{}</h2>", CONTENTS_HEADING)?;
        writeln!(body, "  <ul>")?;
        for section in sections {
            writeln!(
                body,
                "    <li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(&section.path),
                encode_text(&section.title)
            )?;
        }
        writeln!(body, "  </ul>")?;
        Self::page(title, INDEX_STYLE, &body)
    }

    fn file_extension(&self) -> &'static str {
        "html"
    }
}

/// Convert provider Markdown into an HTML fragment.
///
/// Raw HTML in the input is emitted as text, so it shows up escaped.
pub fn markdown_to_html(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
