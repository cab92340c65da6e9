//! Small text utilities shared by the parser and the renderers.

use regex::Regex;
use std::sync::LazyLock;

static RE_LIST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *\d+\. *").unwrap());

/// Remove common leading indentation from a multi-line string.
///
/// Leading empty lines are dropped. Lines shorter than the common indent
/// (blank lines) are kept as they are.
pub fn unindent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    // Find first non-empty line
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };

    let min_indent = lines[start..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    lines[start..]
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(min_indent..).unwrap_or_else(|| l.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of leading whitespace bytes.
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Strip an ordered-list marker (`1. `) from the very start of a text.
pub fn strip_list_prefix(text: &str) -> String {
    RE_LIST_PREFIX.replace(text, "").into_owned()
}

/// Collapse runs of blank lines into a single paragraph break and trim.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.trim().split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                out.push('\n');
            }
            continue;
        }
        blank_run = 0;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

/// Escape a value for use inside a Markdown table cell.
pub fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unindent_basic() {
        assert_eq!(unindent("  a\n  b\n  c"), "a\nb\nc");
    }

    #[test]
    fn unindent_mixed() {
        assert_eq!(unindent("  a\n    b\n  c"), "a\n  b\nc");
    }

    #[test]
    fn unindent_empty_first() {
        assert_eq!(unindent("\n  a\n\n  b"), "a\n\nb");
    }

    #[test]
    fn list_prefix_only_at_start() {
        assert_eq!(strip_list_prefix("1. First\n2. Second"), "First\n2. Second");
        assert_eq!(strip_list_prefix("Plain"), "Plain");
    }

    #[test]
    fn blank_lines_collapse() {
        assert_eq!(collapse_blank_lines("\na\n\n\n\nb\n\n"), "a\n\nb");
    }

    #[test]
    fn table_cell_escapes_pipes_and_newlines() {
        assert_eq!(table_cell("int | None"), "int \\| None");
        assert_eq!(table_cell("{\n1}"), "{<br>1}");
    }
}
