//! Category sorting of rendered class documents.
//!
//! Function blocks are lifted out of the Functions section and re-emitted
//! grouped by the class's configured categories. Uncategorized functions
//! stay at the top of the section.

use crate::config::{CategoryConfig, CONSTRUCTOR, IGNORE};
use crate::sections::{
    bullet_name, bullets, function_blocks, ClassDocument, FunctionBlock, BREAK, FIELDS, FUNCTIONS,
    SECTION_BREAK,
};
use indexmap::IndexMap;
use log::warn;
use std::collections::HashSet;

/// Reorder `doc` by the categories configured for `class_name`.
///
/// Classes without configuration are returned unchanged.
pub fn sort_document(config: &CategoryConfig, class_name: &str, doc: &str) -> String {
    let Some(categories) = config.categories(class_name) else {
        return doc.to_string();
    };
    let mut parsed = ClassDocument::parse(doc);

    let mut field_names: HashSet<String> = HashSet::new();
    if let Some(fields) = parsed.section_mut(FIELDS) {
        let kept: Vec<String> = bullets(&fields.body)
            .into_iter()
            .filter(|b| {
                let name = bullet_name(b).unwrap_or_default().to_string();
                let ignored = config.is_ignored(class_name, &name);
                field_names.insert(name);
                !ignored
            })
            .collect();
        fields.body = kept.join("\n\n");
    }
    parsed
        .sections
        .retain(|s| s.title != FIELDS || !s.body.is_empty());

    let Some(functions) = parsed.section_mut(FUNCTIONS) else {
        return parsed.render();
    };

    let blocks: IndexMap<String, FunctionBlock> = function_blocks(&functions.body)
        .into_iter()
        .map(|b| (b.member_name(), b))
        .collect();

    let mut groups: Vec<String> = Vec::new();

    let uncategorized: Vec<String> = blocks
        .iter()
        .filter(|(name, _)| config.category_of(class_name, name).is_none())
        .map(|(name, block)| {
            warn!("uncategorized function {}.{}()", class_name, name);
            block.render()
        })
        .collect();
    if !uncategorized.is_empty() {
        groups.push(uncategorized.join("\n\n"));
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    for (category_name, category) in categories {
        if category_name == IGNORE {
            continue;
        }
        let mut parts: Vec<String> = Vec::new();
        if category_name != CONSTRUCTOR {
            parts.push(format!("### {}", category_name));
            if !category.description.is_empty() {
                parts.push(category.description.trim().to_string());
            }
        }
        for member in &category.functions {
            if !emitted.insert(member.as_str()) {
                continue;
            }
            match blocks.get(member) {
                Some(block) => parts.push(block.render()),
                None if field_names.contains(member) => {}
                None => warn!(
                    "{}.{} is listed under \"{}\" but has no documentation",
                    class_name, member, category_name
                ),
            }
        }
        if !parts.is_empty() {
            groups.push(parts.join("\n\n"));
        }
    }

    if groups.is_empty() {
        parsed.sections.retain(|s| s.title != FUNCTIONS);
    } else {
        functions.body = format!("{}\n\n{}", groups.join(BREAK), SECTION_BREAK);
    }
    parsed.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const METADATA: &str = r#"{
        "Shape": {
            "Constructor": {"description": "", "functions": ["__init__"]},
            "Geometry": {"description": "Size helpers.", "functions": ["area", "scale", "missing"]},
            "Ignore": {"description": "", "functions": ["debug", "secret"]}
        }
    }"#;

    const DOC: &str = "# Shape\n\n`from shapes import Shape`\n\n***\n\n## Fields\n\n- `name` The name.\n\n- `secret` Hidden.\n\n***\n\n## Functions\n\n#### \\_\\_init\\_\\_\n\n**`Shape()`**\n\n#### scale\n\n**`self.scale(f)`**\n\n#### debug\n\n**`self.debug()`**\n\n#### draw\n\n**`self.draw()`**\n\n#### area\n\n**`self.area()`**\n";

    fn config() -> CategoryConfig {
        serde_json::from_str(METADATA).unwrap()
    }

    #[test]
    fn groups_by_category() {
        let sorted = sort_document(&config(), "Shape", DOC);
        let expected = "# Shape\n\n`from shapes import Shape`\n\n***\n\n## Fields\n\n- `name` The name.\n\n***\n\n## Functions\n\n#### draw\n\n**`self.draw()`**\n\n***\n\n#### \\_\\_init\\_\\_\n\n**`Shape()`**\n\n***\n\n### Geometry\n\nSize helpers.\n\n#### area\n\n**`self.area()`**\n\n#### scale\n\n**`self.scale(f)`**\n\n***\n";
        assert_eq!(sorted, expected);
    }

    #[test]
    fn unconfigured_class_is_unchanged() {
        assert_eq!(sort_document(&config(), "Other", DOC), DOC);
    }

    #[test]
    fn sorting_is_idempotent() {
        let once = sort_document(&config(), "Shape", DOC);
        assert_eq!(sort_document(&config(), "Shape", &once), once);
    }

    #[test]
    fn all_ignored_functions_remove_the_section() {
        let config: CategoryConfig =
            serde_json::from_str(r#"{"Shape": {"Ignore": {"functions": ["__init__", "scale", "debug", "draw", "area"]}}}"#)
                .unwrap();
        let sorted = sort_document(&config, "Shape", DOC);
        assert_eq!(
            sorted,
            "# Shape\n\n`from shapes import Shape`\n\n***\n\n## Fields\n\n- `name` The name.\n\n- `secret` Hidden.\n"
        );
    }
}
