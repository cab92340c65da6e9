//! Module-level variable table.
//!
//! A `# comment` line directly above `NAME = value` (or `NAME: type = value`)
//! documents that variable.

use super::scan::find_top_level;
use crate::text::table_cell;
use regex::Regex;
use std::sync::LazyLock;

static RE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)\s*(?::\s*([^=]+?))?\s*=\s*(.+)$").unwrap()
});

/// Render the documented module variables of `source` as a Markdown table.
///
/// Returns an empty string when nothing is documented.
pub fn table(source: &str) -> String {
    let mut rows = Vec::new();
    let mut comment: Option<&str> = None;

    for line in source.lines() {
        if let Some(text) = line.strip_prefix('#') {
            comment = Some(text.trim());
            continue;
        }
        if let (Some(description), Some(caps)) = (comment.take(), RE_ASSIGN.captures(line)) {
            // Skip comparisons that only look like assignments
            if find_top_level(line, &['=']).is_some_and(|i| line[i..].starts_with("==")) {
                continue;
            }
            rows.push(format!(
                "| `{}` | {} | {} | {} |",
                &caps[1],
                caps.get(2).map_or("", |m| m.as_str().trim()),
                table_cell(caps[3].trim()),
                table_cell(description)
            ));
        }
    }

    if rows.is_empty() {
        return String::new();
    }
    format!(
        "| Variable | Type | Value | Description |\n| --- | --- | --- | --- |\n{}\n",
        rows.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_assignments() {
        let src = "import os\n\n# Default timeout in seconds.\nTIMEOUT: int = 30\n\n# Base URL | primary\nBASE = \"http://x\"\nUNDOCUMENTED = 1\n";
        assert_eq!(
            table(src),
            "| Variable | Type | Value | Description |\n\
             | --- | --- | --- | --- |\n\
             | `TIMEOUT` | int | 30 | Default timeout in seconds. |\n\
             | `BASE` |  | \"http://x\" | Base URL \\| primary |\n"
        );
    }

    #[test]
    fn comment_must_be_directly_above() {
        assert_eq!(table("# Lonely.\n\nX = 1\n"), "");
    }

    #[test]
    fn indented_assignments_are_not_module_variables() {
        assert_eq!(table("# Doc.\n    X = 1\n"), "");
    }

    #[test]
    fn no_variables() {
        assert_eq!(table("def f():\n    pass\n"), "");
    }
}
