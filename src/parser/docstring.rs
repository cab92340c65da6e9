//! Docstring section parser: a line-by-line state machine.
//!
//! States: `Seeking` the opening delimiter, `InDocBlock` collecting free text,
//! and `InParamList` while indented continuation lines may still extend the
//! last `:param` or `:return` entry. The block must be the first statement
//! after the signature; anything else means "no docstring".
//!
//! Also hosts the tag scanners for `""":field` and `""":class_var` blocks
//! and the enum member table.

use super::scan::{bracket_balance, find_top_level, strip_comment};
use super::signature::{is_class_line, is_def_line};
use crate::model::{ClassVariable, EnumValue, Field};
use crate::text::{collapse_blank_lines, indent_of, strip_list_prefix, unindent};
use indexmap::IndexMap;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static RE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:param\s+(?:[^:\s]+\s+)?\**([A-Za-z_]\w*)\s*:\s*(.*)$").unwrap()
});

static RE_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:returns?\b:?\s*(.*)$").unwrap());

static RE_SELF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^self\.([A-Za-z_]\w*)").unwrap());

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap());

const DELIMITERS: &[&str] = &["\"\"\"", "'''"];

pub const FIELD_TAG: &str = ":field";
pub const CLASS_VAR_TAG: &str = ":class_var";

/// Parsed content of one docstring block.
#[derive(Debug, Default)]
pub struct Docstring {
    pub description: String,
    /// `:param` descriptions in first-seen order
    pub params: IndexMap<String, String>,
    pub returns: Option<String>,
    /// Line index of the closing delimiter
    pub end: usize,
}

enum Target {
    Param(String),
    Return,
}

enum State {
    Seeking,
    InDocBlock,
    InParamList { target: Target, indent: usize },
}

#[derive(Default)]
struct Collector {
    /// Text found on the opening delimiter line, already stripped
    lead: Option<String>,
    lines: Vec<String>,
    params: IndexMap<String, String>,
    returns: Option<String>,
}

impl Collector {
    /// Handle one line inside the block and return the next state.
    fn line(&mut self, raw: &str, state: State) -> State {
        let trimmed = raw.trim();
        if let Some(caps) = RE_PARAM.captures(trimmed) {
            let name = caps[1].to_string();
            self.params
                .entry(name.clone())
                .or_insert_with(|| caps[2].trim().to_string());
            return State::InParamList {
                target: Target::Param(name),
                indent: indent_of(raw),
            };
        }
        if let Some(caps) = RE_RETURN.captures(trimmed) {
            if self.returns.is_none() {
                self.returns = Some(caps[1].trim().to_string());
                return State::InParamList {
                    target: Target::Return,
                    indent: indent_of(raw),
                };
            }
            return State::InDocBlock;
        }
        if trimmed.is_empty() {
            self.lines.push(String::new());
            return State::InDocBlock;
        }
        if let State::InParamList { target, indent } = state {
            if indent_of(raw) > indent {
                let slot = match &target {
                    Target::Param(name) => self.params.get_mut(name),
                    Target::Return => self.returns.as_mut(),
                };
                if let Some(text) = slot {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(trimmed);
                }
                return State::InParamList { target, indent };
            }
        }
        self.lines.push(raw.trim_end().to_string());
        State::InDocBlock
    }

    fn finish(self, end: usize) -> Docstring {
        let body = unindent(&self.lines.join("\n"));
        let description = match self.lead {
            Some(lead) if body.is_empty() => lead,
            Some(lead) => {
                let paragraph = self.lines.first().is_some_and(|l| l.trim().is_empty());
                format!("{}{}{}", lead, if paragraph { "\n\n" } else { "\n" }, body)
            }
            None => body,
        };
        Docstring {
            description: collapse_blank_lines(&description),
            params: self.params,
            returns: self.returns.filter(|r| !r.is_empty()),
            end,
        }
    }
}

/// Parse the docstring that starts at the first non-blank line at or after `after`.
///
/// Returns `None` when the first statement is not a docstring or the block
/// never closes.
pub fn parse_docstring(lines: &[&str], after: usize) -> Option<Docstring> {
    let mut state = State::Seeking;
    let mut delimiter = DELIMITERS[0];
    let mut collector = Collector::default();

    for (i, raw) in lines.iter().enumerate().skip(after) {
        match state {
            State::Seeking => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let (d, rest) = open_delimiter(trimmed)?;
                if rest.starts_with(FIELD_TAG) || rest.starts_with(CLASS_VAR_TAG) {
                    return None;
                }
                delimiter = d;
                if let Some(close) = rest.find(delimiter) {
                    // One-line docstring
                    collector.lead = Some(rest[..close].trim().to_string());
                    return Some(collector.finish(i));
                }
                let rest = rest.trim();
                if !rest.is_empty() {
                    // Tags may sit on the opening line too
                    if RE_PARAM.is_match(rest) || RE_RETURN.is_match(rest) {
                        state = collector.line(rest, State::InDocBlock);
                        continue;
                    }
                    collector.lead = Some(rest.to_string());
                }
                state = State::InDocBlock;
            }
            _ => {
                if let Some(close) = raw.find(delimiter) {
                    let before = &raw[..close];
                    if !before.trim().is_empty() {
                        collector.line(before, state);
                    }
                    return Some(collector.finish(i));
                }
                state = collector.line(raw, state);
            }
        }
    }
    None
}

/// Split an opening delimiter (with optional string prefix) off a line.
fn open_delimiter(trimmed: &str) -> Option<(&'static str, &str)> {
    let unprefixed = trimmed.trim_start_matches(['r', 'R', 'u', 'U']);
    DELIMITERS
        .iter()
        .find_map(|d| unprefixed.strip_prefix(d).map(|rest| (*d, rest)))
}

/// A `"""<tag> ... """` block and the first statement after it.
struct TagBlock<'a> {
    description: String,
    statement: &'a str,
    /// Index of the statement line
    line: usize,
}

/// Read the tag block opening at `start`, if that line opens one.
fn read_tag_block<'a>(
    lines: &[&'a str],
    start: usize,
    range_end: usize,
    tag: &str,
) -> Option<Result<TagBlock<'a>, usize>> {
    let opening = lines[start].trim_start();
    let (delimiter, rest) = open_delimiter(opening)?;
    let rest = rest.strip_prefix(tag)?;
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let mut text: Vec<&str> = Vec::new();
    let mut close = None;
    if let Some(p) = rest.find(delimiter) {
        text.push(&rest[..p]);
        close = Some(start);
    } else {
        if !rest.trim().is_empty() {
            text.push(rest);
        }
        for (j, line) in lines.iter().enumerate().take(range_end).skip(start + 1) {
            if let Some(p) = line.find(delimiter) {
                text.push(&line[..p]);
                close = Some(j);
                break;
            }
            text.push(line);
        }
    }
    let Some(close) = close else {
        // Unterminated: nothing after it can be trusted
        return Some(Err(range_end));
    };

    let next = (close + 1..range_end).find(|&k| !lines[k].trim().is_empty());
    let Some(line) = next else {
        return Some(Err(close + 1));
    };

    let description = strip_list_prefix(&unindent(&text.join("\n")).trim().to_string());
    Some(Ok(TagBlock {
        description: collapse_blank_lines(&description),
        statement: lines[line].trim(),
        line,
    }))
}

/// Fields documented inside a constructor body.
///
/// Each `""":field` block must be followed by a `self.<name>` statement.
/// Tags are consumed in order so one tag never documents two fields.
pub fn scan_fields(lines: &[&str], body: Range<usize>) -> Vec<Field> {
    let mut fields = Vec::new();
    let end = body.end.min(lines.len());
    let mut i = body.start;
    while i < end {
        match read_tag_block(lines, i, end, FIELD_TAG) {
            None => i += 1,
            Some(Err(next)) => i = next,
            Some(Ok(block)) => {
                if let Some(caps) = RE_SELF_ATTR.captures(block.statement) {
                    fields.push(Field {
                        name: caps[1].to_string(),
                        description: block.description,
                    });
                    i = block.line + 1;
                } else {
                    i = block.line;
                }
            }
        }
    }
    fields
}

/// Class variables documented between the class declaration and the constructor.
///
/// Each `""":class_var` block must be followed by `NAME: type = value` or
/// `NAME = value`. Values with open brackets continue on following lines.
pub fn scan_class_variables(lines: &[&str], body: Range<usize>) -> Vec<ClassVariable> {
    let mut variables = Vec::new();
    let end = body.end.min(lines.len());
    let mut i = body.start;
    while i < end {
        let block = match read_tag_block(lines, i, end, CLASS_VAR_TAG) {
            None => {
                i += 1;
                continue;
            }
            Some(Err(next)) => {
                i = next;
                continue;
            }
            Some(Ok(block)) => block,
        };

        let statement = strip_comment(block.statement).trim();
        let Some(eq) = find_top_level(statement, &['=']) else {
            i = block.line;
            continue;
        };
        let head = &statement[..eq];
        let (name, var_type) = match find_top_level(head, &[':']) {
            Some(c) => (head[..c].trim(), head[c + 1..].trim()),
            None => (head.trim(), ""),
        };
        if !RE_NAME.is_match(name) {
            i = block.line;
            continue;
        }

        let mut value = statement[eq + 1..].trim().to_string();
        let mut last = block.line;
        while bracket_balance(&value) > 0 && last + 1 < end {
            last += 1;
            value.push('\n');
            value.push_str(strip_comment(lines[last]).trim());
        }

        variables.push(ClassVariable {
            name: name.to_string(),
            var_type: var_type.to_string(),
            description: block.description,
            value,
        });
        i = last + 1;
    }
    variables
}

/// Member rows of an enum class body.
///
/// Collection starts once the class docstring has closed (immediately when
/// there is none) and stops at the first method, nested class or dedent.
pub fn scan_enum_values(lines: &[&str], after: usize, class_indent: usize) -> Vec<EnumValue> {
    let start = match parse_docstring(lines, after) {
        Some(doc) => doc.end + 1,
        None => after,
    };

    let mut values = Vec::new();
    for raw in lines.iter().skip(start) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if indent_of(raw) <= class_indent
            || is_def_line(raw)
            || is_class_line(raw)
            || trimmed.starts_with('@')
        {
            break;
        }
        if trimmed.starts_with('#') || open_delimiter(trimmed).is_some() {
            continue;
        }
        let code = strip_comment(trimmed);
        let name = match find_top_level(code, &['=', ':']) {
            Some(i) => code[..i].trim(),
            None => code.trim(),
        };
        if !RE_NAME.is_match(name) {
            continue;
        }
        let description = trimmed
            .get(code.len()..)
            .and_then(|c| c.strip_prefix('#'))
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        values.push(EnumValue {
            name: name.to_string(),
            description,
        });
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<&str> {
        src.lines().collect()
    }

    #[test]
    fn params_and_return() {
        let src = lines(
            r#"    def go(self, x: int) -> bool:
        """
        Move somewhere.

        Second paragraph.

        :param x: How far.
        :return: True if moved.
        """
        pass"#,
        );
        let doc = parse_docstring(&src, 1).unwrap();
        assert_eq!(doc.description, "Move somewhere.\n\nSecond paragraph.");
        assert_eq!(doc.params.get("x").map(String::as_str), Some("How far."));
        assert_eq!(doc.returns.as_deref(), Some("True if moved."));
        assert_eq!(doc.end, 8);
    }

    #[test]
    fn first_return_wins() {
        let src = lines("\"\"\"\n:return first\n:returns: second\n\"\"\"");
        let doc = parse_docstring(&src, 0).unwrap();
        assert_eq!(doc.returns.as_deref(), Some("first"));
    }

    #[test]
    fn param_continuation_lines() {
        let src = lines(
            "    \"\"\"\n    :param mode: The mode,\n        one of a or b.\n    Trailing text.\n    \"\"\"",
        );
        let doc = parse_docstring(&src, 0).unwrap();
        assert_eq!(doc.params["mode"], "The mode, one of a or b.");
        assert_eq!(doc.description, "Trailing text.");
    }

    #[test]
    fn params_keep_first_seen_order() {
        let src = lines("\"\"\"\n:param b: B.\n:param a: A.\n\"\"\"");
        let doc = parse_docstring(&src, 0).unwrap();
        let names: Vec<_> = doc.params.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn one_line_docstring() {
        let src = lines("    \"\"\"Short and sweet.\"\"\"");
        let doc = parse_docstring(&src, 0).unwrap();
        assert_eq!(doc.description, "Short and sweet.");
    }

    #[test]
    fn text_on_delimiter_lines() {
        let src = lines("    \"\"\"Summary line.\n\n    More detail.\"\"\"");
        let doc = parse_docstring(&src, 0).unwrap();
        assert_eq!(doc.description, "Summary line.\n\nMore detail.");
    }

    #[test]
    fn declaration_before_block_means_no_docstring() {
        let src = lines("    def other(self) -> None:\n        \"\"\"\n        Other.\n        \"\"\"");
        assert!(parse_docstring(&src, 0).is_none());
    }

    #[test]
    fn code_before_block_means_no_docstring() {
        let src = lines("        x = 1\n        \"\"\":field\n        X.\n        \"\"\"");
        assert!(parse_docstring(&src, 0).is_none());
    }

    #[test]
    fn tag_block_is_not_a_docstring() {
        let src = lines("    \"\"\":class_var\n    Size.\n    \"\"\"\n    SIZE = 1");
        assert!(parse_docstring(&src, 0).is_none());
    }

    #[test]
    fn unterminated_block() {
        let src = lines("    \"\"\"\n    Never closed.");
        assert!(parse_docstring(&src, 0).is_none());
    }

    #[test]
    fn code_indentation_preserved() {
        let src = lines("        \"\"\"\n        Example:\n\n        ```python\n        if x:\n            go()\n        ```\n        \"\"\"");
        let doc = parse_docstring(&src, 0).unwrap();
        assert_eq!(doc.description, "Example:\n\n```python\nif x:\n    go()\n```");
    }

    #[test]
    fn fields_in_constructor() {
        let src = lines(
            r#"        """:field
        The name.
        """
        self.name: str = name
        # not a field
        self.hidden = 1
        """:field
        1. The size.
        """
        self.size = size
        """:field
        Dangling tag.
        """
        x = 3"#,
        );
        let fields = scan_fields(&src, 0..src.len());
        assert_eq!(
            fields,
            vec![
                Field {
                    name: "name".to_string(),
                    description: "The name.".to_string()
                },
                Field {
                    name: "size".to_string(),
                    description: "The size.".to_string()
                },
            ]
        );
    }

    #[test]
    fn one_line_field_tag() {
        let src = lines("        \"\"\":field The id. \"\"\"\n        self.id = 0");
        let fields = scan_fields(&src, 0..src.len());
        assert_eq!(fields[0].name, "id");
        assert_eq!(fields[0].description, "The id.");
    }

    #[test]
    fn class_variables_typed_and_untyped() {
        let src = lines(
            r#"    """:class_var
    The default size.
    """
    SIZE: int = 4
    """:class_var
    Lookup table.
    """
    TABLE = {"a": 1,
             "b": 2}"#,
        );
        let vars = scan_class_variables(&src, 0..src.len());
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "SIZE");
        assert_eq!(vars[0].var_type, "int");
        assert_eq!(vars[0].value, "4");
        assert_eq!(vars[0].description, "The default size.");
        assert_eq!(vars[1].name, "TABLE");
        assert_eq!(vars[1].var_type, "");
        assert_eq!(vars[1].value, "{\"a\": 1,\n\"b\": 2}");
    }

    #[test]
    fn field_tag_is_not_a_class_var() {
        let src = lines("    \"\"\":field\n    X.\n    \"\"\"\n    X = 1");
        assert!(scan_class_variables(&src, 0..src.len()).is_empty());
    }

    #[test]
    fn enum_members() {
        let src = lines(
            r#"class Color(Enum):
    """
    Colors.
    """

    RED = 1  # warm
    BLUE = 2

    def describe(self) -> str:
        pass"#,
        );
        let values = scan_enum_values(&src, 1, 0);
        assert_eq!(
            values,
            vec![
                EnumValue {
                    name: "RED".to_string(),
                    description: "warm".to_string()
                },
                EnumValue {
                    name: "BLUE".to_string(),
                    description: String::new()
                },
            ]
        );
    }

    #[test]
    fn enum_without_docstring() {
        let src = lines("class Mode(IntEnum):\n    ON = 1\n    OFF = 0\nx = 2");
        let values = scan_enum_values(&src, 1, 0);
        let names: Vec<_> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["ON", "OFF"]);
    }
}
