//! Declaration scanner: rebuilds logical one-line signatures.
//!
//! A signature may be wrapped over any number of physical lines. Lines are
//! stripped, comments dropped, and joined with single spaces until the
//! brackets balance and a block colon appears.

use super::scan::{
    bracket_balance, bracketed, collapse_unquoted, find_top_level, split_top_level, strip_comment,
};
use crate::model::{DeclKind, Declaration};
use crate::text::indent_of;
use regex::Regex;
use std::sync::LazyLock;

/// Base classes that turn a class into an enumeration.
pub const ENUM_BASES: &[&str] = &["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];

static RE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+([A-Za-z_]\w*)").unwrap());

static RE_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)").unwrap());

/// True when the line starts a `class` declaration.
pub fn is_class_line(line: &str) -> bool {
    RE_CLASS.is_match(line.trim_start())
}

/// True when the line starts a `def` or `async def` declaration.
pub fn is_def_line(line: &str) -> bool {
    RE_DEF.is_match(line.trim_start())
}

/// Scan the declaration starting at `start`.
///
/// Returns `None` when the line is not a declaration or the signature never
/// closes before the end of the file.
pub fn scan(lines: &[&str], start: usize) -> Option<Declaration> {
    let first = *lines.get(start)?;
    let is_class = is_class_line(first);
    if !is_class && !is_def_line(first) {
        return None;
    }

    let mut joined = String::new();
    let mut end = None;
    for (i, line) in lines.iter().enumerate().skip(start) {
        let part = strip_comment(line).trim();
        if !part.is_empty() {
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(part);
        }
        if bracket_balance(&joined) <= 0 && find_top_level(&joined, &[':']).is_some() {
            end = Some(i);
            break;
        }
    }
    let end = end?;

    let normalized = collapse_unquoted(&joined);
    // Anything after the block colon (`def f(): pass`) is body, not signature
    let logical = match find_top_level(&normalized, &[':']) {
        Some(i) => normalized[..i].trim_end(),
        None => normalized.as_str(),
    };

    if is_class {
        let name = RE_CLASS.captures(logical)?[1].to_string();
        let bases = class_bases(logical);
        let kind = if bases
            .iter()
            .any(|b| ENUM_BASES.contains(&b.as_str()))
        {
            DeclKind::Enum
        } else {
            DeclKind::Class
        };
        return Some(Declaration {
            kind,
            start,
            end,
            indent: indent_of(first),
            name,
            signature: logical.trim_start_matches("class").trim().to_string(),
            bases,
        });
    }

    let name = RE_DEF.captures(logical)?[1].to_string();
    let signature = logical
        .trim_start_matches("async")
        .trim_start()
        .trim_start_matches("def")
        .trim()
        .to_string();
    let kind = if name == "__init__" {
        DeclKind::Constructor
    } else {
        match decorator_kind(lines, start) {
            Some(kind) => kind,
            None => DeclKind::Function,
        }
    };

    Some(Declaration {
        kind,
        start,
        end,
        indent: indent_of(first),
        name,
        signature,
        bases: Vec::new(),
    })
}

/// Base class names of a `class Name(Base, mod.Other[T], metaclass=M)` line.
///
/// Module qualifiers and generic arguments are dropped, keyword arguments
/// are ignored.
pub fn class_bases(logical: &str) -> Vec<String> {
    let Some(list) = bracketed(logical, '(', ')') else {
        return Vec::new();
    };
    split_top_level(list, ',')
        .into_iter()
        .map(str::trim)
        .filter(|b| !b.is_empty() && !b.contains('='))
        .map(|b| {
            let b = b.split('[').next().unwrap_or(b);
            b.rsplit('.').next().unwrap_or(b).trim().to_string()
        })
        .filter(|b| !b.is_empty())
        .collect()
}

/// Look at the decorators stacked directly above a `def`.
fn decorator_kind(lines: &[&str], start: usize) -> Option<DeclKind> {
    let mut kind = None;
    for line in lines[..start].iter().rev() {
        let t = line.trim();
        if !t.starts_with('@') {
            break;
        }
        match t {
            "@staticmethod" => kind = Some(DeclKind::StaticFunction),
            "@classmethod" => kind = Some(DeclKind::ClassMethod),
            _ => {}
        }
    }
    kind
}
