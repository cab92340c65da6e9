//! Inheritance merge of rendered class documents.
//!
//! Works purely on Markdown: the child document absorbs the class
//! variables, fields and functions of its ancestors, then call examples
//! that name an ancestor are rewritten to name the child.

use crate::sections::{
    bullets, function_blocks, table_rows, ClassDocument, FunctionBlock, Section, BREAK,
    CLASS_VARIABLES, CLASS_VARIABLES_HEADER, CONSTRUCTOR_HEADING, FIELDS, FUNCTIONS,
    SECTION_BREAK,
};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::BTreeSet;

/// Merge `ancestors` (nearest first) into `child`.
///
/// Both sides are expected unsorted, as the renderer writes them.
pub fn merge(child: &str, ancestors: &[String]) -> String {
    let mut doc = ClassDocument::parse(child);
    let child_name = doc.class_name().unwrap_or_default().to_string();
    let parents: Vec<ClassDocument> = ancestors
        .iter()
        .map(|a| ClassDocument::parse(a))
        .collect();

    let mut merged: Vec<Section> = Vec::new();
    if let Some(section) = merge_class_variables(&doc, &parents) {
        merged.push(section);
    }
    if let Some(section) = merge_fields(&doc, &parents) {
        merged.push(section);
    }
    merged.push(merge_functions(&doc, &parents, &child_name));

    let canonical = [CLASS_VARIABLES, FIELDS, FUNCTIONS];
    merged.extend(
        doc.sections
            .drain(..)
            .filter(|s| !canonical.contains(&s.title.as_str())),
    );
    doc.sections = merged;

    let mut text = doc.render();
    for parent in &parents {
        if let Some(parent_name) = parent.class_name() {
            text = rewrite_identity(&text, parent_name, &child_name);
        }
    }
    text = text.replace(&format!("{}(ABC)", child_name), &child_name);
    normalize_breaks(&text)
}

/// Sorted, deduplicated union of every class variable row.
fn merge_class_variables(child: &ClassDocument, parents: &[ClassDocument]) -> Option<Section> {
    let rows: BTreeSet<String> = parents
        .iter()
        .chain(std::iter::once(child))
        .filter_map(|d| d.section(CLASS_VARIABLES))
        .flat_map(|s| table_rows(&s.body))
        .collect();
    if rows.is_empty() {
        return None;
    }
    let rows: Vec<String> = rows.into_iter().collect();
    Some(Section::new(
        CLASS_VARIABLES,
        format!("{}\n{}", CLASS_VARIABLES_HEADER, rows.join("\n")),
    ))
}

/// Child bullets, then each ancestor's bullets nearest first.
fn merge_fields(child: &ClassDocument, parents: &[ClassDocument]) -> Option<Section> {
    let items: Vec<String> = std::iter::once(child)
        .chain(parents.iter())
        .filter_map(|d| d.section(FIELDS))
        .flat_map(|s| bullets(&s.body))
        .collect();
    if items.is_empty() {
        return None;
    }
    Some(Section::new(FIELDS, items.join("\n\n")))
}

fn blocks_of(doc: &ClassDocument) -> Vec<FunctionBlock> {
    doc.section(FUNCTIONS)
        .map(|s| function_blocks(&s.body))
        .unwrap_or_default()
}

fn merge_functions(
    child: &ClassDocument,
    parents: &[ClassDocument],
    child_name: &str,
) -> Section {
    let child_blocks = blocks_of(child);
    let parent_blocks: Vec<Vec<FunctionBlock>> = parents.iter().map(blocks_of).collect();

    let is_ctor = |b: &&FunctionBlock| b.heading == CONSTRUCTOR_HEADING;
    let child_ctor = child_blocks.iter().find(is_ctor);
    let parent_ctors: Vec<&FunctionBlock> = parent_blocks
        .iter()
        .filter_map(|blocks| blocks.iter().find(is_ctor))
        .collect();
    let documented_parent_ctor = parent_ctors.iter().find(|b| !b.is_placeholder()).copied();

    let ctor = match (child_ctor, documented_parent_ctor) {
        (Some(c), Some(p)) if c.is_placeholder() => p.clone(),
        (Some(c), _) => c.clone(),
        (None, Some(p)) => p.clone(),
        (None, None) => match parent_ctors.first() {
            Some(p) => (*p).clone(),
            None => FunctionBlock {
                heading: CONSTRUCTOR_HEADING.to_string(),
                body: format!("**`{}()`**", child_name),
            },
        },
    };

    let mut functions: IndexMap<String, FunctionBlock> = IndexMap::new();
    functions.insert(ctor.heading.clone(), ctor);
    for block in parent_blocks.iter().flatten() {
        if functions.contains_key(&block.heading) || block.is_placeholder() {
            continue;
        }
        functions.insert(block.heading.clone(), block.clone());
    }
    for block in child_blocks.iter().filter(|b| b.heading != CONSTRUCTOR_HEADING) {
        if block.is_placeholder() && functions.contains_key(&block.heading) {
            continue;
        }
        functions.insert(block.heading.clone(), block.clone());
    }

    let body: Vec<String> = functions.values().map(FunctionBlock::render).collect();
    Section::new(FUNCTIONS, body.join("\n\n"))
}

/// `Parent(` becomes `Child(` and `Child(Parent)` becomes `Child`.
fn rewrite_identity(text: &str, parent: &str, child: &str) -> String {
    if parent == child || parent.is_empty() {
        return text.to_string();
    }
    let call = match Regex::new(&format!(r"\b{}\(", regex::escape(parent))) {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };
    let text = call.replace_all(text, format!("{}(", child).as_str());
    text.replace(&format!("{}({})", child, parent), child)
}

/// Collapse doubled breaks left behind by empty sections.
fn normalize_breaks(text: &str) -> String {
    let doubled = format!("{}{}", SECTION_BREAK, BREAK.trim_end());
    let mut out = text.to_string();
    while out.contains(&doubled) {
        out = out.replace(&doubled, SECTION_BREAK);
    }
    out
}
