//! Table of contents expansion and GitHub anchor slugs.
//!
//! Each `[TOC]` marker in a rendered class document becomes a bullet list of
//! its `##` sections followed by a one-line summary table of its functions.

use crate::sections::{fenced_lines, function_blocks, ClassDocument, FUNCTIONS};
use crate::text::table_cell;
use regex::Regex;
use std::sync::LazyLock;

pub const TOC_TOKEN: &str = "[TOC]";

static RE_FIRST_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^((?:\*\*.+?\*\*\s*)?.*?\.)(?:\s|$)").unwrap());

/// GitHub heading anchor slug.
///
/// - lowercase
/// - keep alphanumerics, `-` and `_`
/// - spaces become hyphens, everything else is dropped
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match c {
            ' ' => slug.push('-'),
            '-' | '_' => slug.push(c),
            c if c.is_alphanumeric() => slug.push(c),
            _ => {}
        }
    }
    slug
}

/// Link to a heading in the same document.
pub fn render_toc_link(text: &str) -> String {
    format!("[{}](#{})", text, github_slug(text))
}

pub fn render_toc_item(title: &str) -> String {
    format!("- {}", render_toc_link(title))
}

/// The opening sentence of `paragraph`, bold lead-in included.
///
/// Falls back to the first line when no sentence ends in a period.
pub fn first_sentence(paragraph: &str) -> String {
    let sentence = match RE_FIRST_SENTENCE.captures(paragraph) {
        Some(caps) => caps[1].to_string(),
        None => paragraph.lines().next().unwrap_or_default().to_string(),
    };
    sentence.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Description paragraph of a function block, skipping call examples,
/// the static marker, tables and the return line.
fn summary_paragraph(block_body: &str) -> Option<&str> {
    block_body.split("\n\n").map(str::trim).find(|p| {
        !p.is_empty()
            && !p.starts_with("**`")
            && !p.starts_with("_(Static)_")
            && !p.starts_with('|')
            && !p.starts_with("_Returns:_")
    })
}

/// Build the table of contents for a class document.
fn build(doc: &str) -> String {
    let headings: Vec<String> = fenced_lines(doc)
        .filter(|(fenced, _)| !fenced)
        .filter_map(|(_, line)| line.strip_prefix("## "))
        .map(|title| render_toc_item(title.trim()))
        .collect();

    let mut parts = Vec::new();
    if !headings.is_empty() {
        parts.push(headings.join("\n"));
    }

    let parsed = ClassDocument::parse(doc);
    if let Some(functions) = parsed.section(FUNCTIONS) {
        let rows: Vec<String> = function_blocks(&functions.body)
            .iter()
            .map(|block| {
                let name = block.member_name();
                let summary = summary_paragraph(&block.body)
                    .map(first_sentence)
                    .unwrap_or_default();
                format!(
                    "| [`{}`](#{}) | {} |",
                    name,
                    github_slug(&name),
                    table_cell(&summary)
                )
            })
            .collect();
        if !rows.is_empty() {
            parts.push(format!(
                "| Function | Description |\n| --- | --- |\n{}",
                rows.join("\n")
            ));
        }
    }
    parts.join("\n\n")
}

/// Replace every `[TOC]` outside code fences. Documents without one are
/// returned unchanged.
pub fn expand(doc: &str) -> String {
    if !doc.contains(TOC_TOKEN) {
        return doc.to_string();
    }
    let toc = build(doc);
    let mut out = String::with_capacity(doc.len() + toc.len());
    for (fenced, line) in fenced_lines(doc) {
        if fenced {
            out.push_str(line);
        } else {
            out.push_str(&line.replace(TOC_TOKEN, &toc));
        }
        out.push('\n');
    }
    if !doc.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple() {
        assert_eq!(github_slug("Class Variables"), "class-variables");
        assert_eq!(github_slug("__init__"), "__init__");
        assert_eq!(github_slug("get_area()"), "get_area");
    }

    #[test]
    fn toc_item() {
        assert_eq!(render_toc_item("Fields"), "- [Fields](#fields)");
    }

    #[test]
    fn sentence_ends_at_first_period() {
        assert_eq!(first_sentence("Move it. Then stop."), "Move it.");
        assert_eq!(first_sentence("Version 1.2 is out"), "Version 1.2 is out");
        assert_eq!(
            first_sentence("**Deprecated.** Use\nthe other one. Really."),
            "**Deprecated.** Use the other one."
        );
        assert_eq!(first_sentence("No period\nsecond line"), "No period");
    }

    #[test]
    fn expands_token() {
        let doc = "# Shape\n\n`from shapes import Shape`\n\n[TOC]\n\n***\n\n## Fields\n\n- `name` The name.\n\n***\n\n## Functions\n\n#### \\_\\_init\\_\\_\n\n**`Shape()`**\n\nCreate a shape. With details.\n\n#### area\n\n**`self.area()`**\n\n_Returns:_ The area.\n";
        let expanded = expand(doc);
        let expected_toc = "- [Fields](#fields)\n- [Functions](#functions)\n\n| Function | Description |\n| --- | --- |\n| [`__init__`](#__init__) | Create a shape. |\n| [`area`](#area) |  |";
        assert!(expanded.contains(expected_toc), "{}", expanded);
        assert!(!expanded.contains(TOC_TOKEN));
    }

    #[test]
    fn fenced_token_is_left_alone() {
        let doc = "# A\n\n```\n[TOC]\n```\n\n***\n";
        assert_eq!(expand(doc), doc);
    }

    #[test]
    fn every_unfenced_token_expands() {
        let doc = "# A\n\n[TOC]\n\nSee also [TOC]\n\n```\n[TOC]\n```\n\n***\n\n## Fields\n\n- `x` X.\n";
        let expanded = expand(doc);
        assert_eq!(expanded.matches("- [Fields](#fields)").count(), 2);
        assert_eq!(expanded.matches(TOC_TOKEN).count(), 1);
        assert!(expanded.contains("```\n[TOC]\n```"));
        assert!(expanded.ends_with("- `x` X.\n"));
    }
}
