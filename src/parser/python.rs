//! Python source extraction.
//!
//! Walks a file in two passes: first the top-level `class` spans, then the
//! members of each class. Only classes are documented; module-level
//! functions and private (`_`-prefixed) declarations are skipped.

use super::docstring::{
    parse_docstring, scan_class_variables, scan_enum_values, scan_fields, Docstring,
};
use super::parameter::{extract, split_parameters};
use super::scan::{bracket_balance, strip_comment, triple_quote_state};
use super::signature::{self, is_class_line, is_def_line};
use crate::config::Settings;
use crate::model::{
    ClassDoc, DeclKind, Declaration, FunctionDoc, ModuleDoc, ParameterDoc, SourceUnit,
};
use crate::text::{indent_of, strip_list_prefix};
use indexmap::IndexMap;
use log::debug;

/// Parse `source` (the text of `<stem>.py`) into its documented classes.
pub fn parse(stem: &str, source: &str, settings: &Settings) -> ModuleDoc {
    let unit = SourceUnit::new(source);
    let lines = &unit.lines;

    let mut classes = Vec::new();
    for (start, end) in class_spans(lines) {
        let Some(decl) = signature::scan(lines, start) else {
            debug!("{}: unterminated class declaration at line {}", stem, start + 1);
            continue;
        };
        if decl.is_excluded() {
            debug!("{}: skipping private class {}", stem, decl.name);
            continue;
        }
        classes.push(parse_class(stem, lines, &decl, end, settings));
    }

    debug!(
        "{}: {} class(es), {} function(s)",
        stem,
        classes.len(),
        classes.iter().map(|c| c.functions.len()).sum::<usize>()
    );

    ModuleDoc {
        stem: stem.to_string(),
        classes,
    }
}

/// Every top-level class with its bases, private ones included.
pub fn class_declarations(source: &str) -> Vec<(String, Vec<String>)> {
    let unit = SourceUnit::new(source);
    class_spans(&unit.lines)
        .into_iter()
        .filter_map(|(start, _)| signature::scan(&unit.lines, start))
        .map(|decl| (decl.name, decl.bases))
        .collect()
}

/// `(start, end)` line ranges of top-level classes.
///
/// A class ends at the next top-level statement of any kind.
fn class_spans(lines: &[&str]) -> Vec<(usize, usize)> {
    let starts = top_level_statements(lines);
    starts
        .iter()
        .enumerate()
        .filter(|&(_, &i)| is_class_line(lines[i]))
        .map(|(n, &i)| (i, starts.get(n + 1).copied().unwrap_or(lines.len())))
        .collect()
}

/// Indent-0 lines that begin a statement: not blank, not a comment, and
/// not inside a string literal or an open bracket.
fn top_level_statements(lines: &[&str]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut open_string = None;
    let mut depth = 0isize;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if open_string.is_none()
            && depth == 0
            && indent_of(line) == 0
            && !trimmed.is_empty()
            && !trimmed.starts_with('#')
        {
            starts.push(i);
        }
        let was_open = open_string.is_some();
        open_string = triple_quote_state(line, open_string);
        if !was_open && open_string.is_none() {
            depth = (depth + bracket_balance(strip_comment(line))).max(0);
        }
    }
    starts
}

struct Method {
    decl: Declaration,
    doc: Option<Docstring>,
}

fn parse_class(
    stem: &str,
    lines: &[&str],
    decl: &Declaration,
    span_end: usize,
    settings: &Settings,
) -> ClassDoc {
    let class_doc = parse_docstring(lines, decl.end + 1);
    let body_start = class_doc.as_ref().map_or(decl.end + 1, |d| d.end + 1);
    let methods = methods(lines, decl, body_start, span_end);

    let ctor = methods
        .iter()
        .position(|m| m.decl.kind == DeclKind::Constructor);
    let class_vars_end = ctor
        .or((!methods.is_empty()).then_some(0))
        .map_or(span_end, |i| methods[i].decl.start);
    let fields = match ctor {
        Some(i) => {
            let body_end = methods.get(i + 1).map_or(span_end, |m| m.decl.start);
            scan_fields(lines, methods[i].decl.end + 1..body_end)
        }
        None => Vec::new(),
    };

    let enum_values = (decl.kind == DeclKind::Enum)
        .then(|| scan_enum_values(lines, decl.end + 1, decl.indent));

    let functions = methods
        .into_iter()
        .filter(|m| !m.decl.is_excluded())
        .map(|m| function_doc(&decl.name, &m.decl, m.doc.unwrap_or_default(), settings))
        .collect();

    ClassDoc {
        name: decl.name.clone(),
        import_path: settings.import_path(stem, &decl.name),
        bases: decl.bases.clone(),
        description: class_doc
            .map(|d| strip_list_prefix(d.description.trim()))
            .unwrap_or_default(),
        enum_values,
        class_variables: scan_class_variables(lines, body_start..class_vars_end),
        fields,
        functions,
    }
}

/// Methods declared directly in the class body.
///
/// The body indent is taken from the first non-blank line after the
/// declaration; deeper `def`s are nested functions and are ignored.
fn methods(lines: &[&str], decl: &Declaration, from: usize, to: usize) -> Vec<Method> {
    let body_indent = lines
        .get(decl.end + 1..to)
        .unwrap_or_default()
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| indent_of(l));
    let Some(body_indent) = body_indent.filter(|&i| i > decl.indent) else {
        return Vec::new();
    };

    let mut methods = Vec::new();
    let mut i = from;
    while i < to {
        let line = lines[i];
        if indent_of(line) == body_indent && is_def_line(line) {
            if let Some(decl) = signature::scan(lines, i) {
                let doc = parse_docstring(lines, decl.end + 1);
                // Skip the docstring so code samples inside it are not scanned
                i = doc.as_ref().map_or(decl.end + 1, |d| d.end + 1);
                methods.push(Method { decl, doc });
                continue;
            }
        }
        i += 1;
    }
    methods
}

fn function_doc(
    class_name: &str,
    decl: &Declaration,
    doc: Docstring,
    settings: &Settings,
) -> FunctionDoc {
    let declared = split_parameters(&decl.signature);

    let mut parameters = IndexMap::new();
    for (name, description) in doc.params {
        if name == "self" || name == "cls" {
            continue;
        }
        let parameter = declared
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .unwrap_or_else(|| extract(&name, &decl.signature));
        parameters.insert(name, ParameterDoc { parameter, description });
    }
    for parameter in &declared {
        if !parameters.contains_key(&parameter.name) {
            parameters.insert(
                parameter.name.clone(),
                ParameterDoc {
                    parameter: parameter.clone(),
                    description: String::new(),
                },
            );
        }
    }

    let target = match decl.kind {
        DeclKind::Constructor => class_name.to_string(),
        DeclKind::StaticFunction | DeclKind::ClassMethod => {
            format!("{}.{}", class_name, decl.name)
        }
        _ => format!("self.{}", decl.name),
    };
    let required: Vec<&str> = declared
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name.as_str())
        .collect();
    let all: Vec<String> = declared.iter().map(|p| p.call_form()).collect();
    let short_call = format!("{}({})", target, required.join(", "));
    let long_call = format!("{}({})", target, all.join(", "));

    FunctionDoc {
        name: decl.name.clone(),
        signature: decl.signature.clone(),
        long_call: (long_call != short_call).then_some(long_call),
        short_call,
        is_static: decl.kind == DeclKind::StaticFunction,
        description: doc.description,
        parameters,
        returns: doc.returns,
        category: settings
            .categories
            .category_of(class_name, &decl.name)
            .map(str::to_string),
    }
}
