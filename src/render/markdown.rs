//! GitHub-flavored markdown renderer.
//!
//! One document per class: header, import example, description and enum
//! table, then Class Variables, Fields and Functions sections separated by
//! `***` breaks. Sorting, `[TOC]` expansion and the import prefix are
//! applied afterwards on the rendered text.

use crate::config::Settings;
use crate::error::Result;
use crate::model::*;
use crate::render::Renderer;
use crate::sections::{
    BREAK, CLASS_VARIABLES, CLASS_VARIABLES_HEADER, FIELDS, FUNCTIONS, SECTION_BREAK,
};
use crate::sort::sort_document;
use crate::text::table_cell;
use crate::toc;
use regex::Regex;
use std::sync::LazyLock;

pub struct MarkdownRenderer;

static RE_IMPORT_EXAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^`from \S+ import ([^`]+)`$").unwrap());

impl Renderer for MarkdownRenderer {
    fn render(&self, module: &ModuleDoc, settings: &Settings) -> Result<String> {
        let classes: Vec<String> = module
            .classes
            .iter()
            .map(|class| publish(&class.name, &render_class(class), settings))
            .collect();
        Ok(classes.join("\n"))
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// Render every class of a module without sorting or finalizing.
pub fn render_raw(module: &ModuleDoc) -> Vec<(String, String)> {
    module
        .classes
        .iter()
        .map(|c| (c.name.clone(), render_class(c)))
        .collect()
}

/// Sort by category when configured, then finalize.
pub fn publish(class_name: &str, doc: &str, settings: &Settings) -> String {
    let sorted = sort_document(&settings.categories, class_name, doc);
    finalize(&sorted, settings)
}

/// Expand `[TOC]` and apply the import prefix.
pub fn finalize(doc: &str, settings: &Settings) -> String {
    let expanded = toc::expand(doc);
    match settings.prefix_module() {
        Some(module) => rewrite_import_prefix(&expanded, module),
        None => expanded,
    }
}

/// Point every import example at `prefix` instead of its module path.
pub fn rewrite_import_prefix(doc: &str, prefix: &str) -> String {
    let prefix = prefix.trim();
    let prefix = prefix.strip_prefix("from ").unwrap_or(prefix).trim();
    RE_IMPORT_EXAMPLE
        .replace_all(doc, |caps: &regex::Captures| {
            format!("`from {} import {}`", prefix, &caps[1])
        })
        .into_owned()
}

/// Render a single class document. Always ends with one newline.
pub fn render_class(class: &ClassDoc) -> String {
    let mut head = vec![
        format!("# {}", class.name),
        format!("`from {} import {}`", class.import_path, class.name),
    ];
    if !class.description.is_empty() {
        head.push(class.description.clone());
    }
    if let Some(ref values) = class.enum_values {
        head.push(render_enum_table(values));
    }
    let head = head.join("\n\n");

    let mut sections: Vec<String> = Vec::new();
    if !class.class_variables.is_empty() {
        let rows: Vec<String> = class
            .class_variables
            .iter()
            .map(|v| {
                format!(
                    "| `{}` | {} | {} | {} |",
                    v.name,
                    table_cell(&v.var_type),
                    table_cell(&v.description),
                    table_cell(&v.value)
                )
            })
            .collect();
        sections.push(format!(
            "## {}\n\n{}\n{}",
            CLASS_VARIABLES,
            CLASS_VARIABLES_HEADER,
            rows.join("\n")
        ));
    }
    if !class.fields.is_empty() {
        let bullets: Vec<String> = class
            .fields
            .iter()
            .map(|f| format!("- `{}` {}", f.name, f.description).trim_end().to_string())
            .collect();
        sections.push(format!("## {}\n\n{}", FIELDS, bullets.join("\n\n")));
    }
    if !class.functions.is_empty() {
        let blocks: Vec<String> = class.functions.iter().map(render_function).collect();
        sections.push(format!("## {}\n\n{}", FUNCTIONS, blocks.join("\n\n")));
    }

    if sections.is_empty() {
        format!("{}\n\n{}\n", head, SECTION_BREAK)
    } else {
        format!("{}{}{}\n", head, BREAK, sections.join(BREAK))
    }
}

fn render_enum_table(values: &[EnumValue]) -> String {
    let mut table = String::from("| Value | Description |\n| --- | --- |");
    for value in values {
        table.push_str(&format!(
            "\n| `{}` | {} |",
            value.name,
            table_cell(&value.description)
        ));
    }
    table
}

/// Render a single function block, heading included.
fn render_function(func: &FunctionDoc) -> String {
    let mut parts = vec![
        format!("#### {}", func.name.replace("__", r"\_\_")),
        format!("**`{}`**", func.short_call),
    ];
    if let Some(ref long) = func.long_call {
        parts.push(format!("**`{}`**", long));
    }
    if func.is_static {
        parts.push("_(Static)_".to_string());
    }
    if !func.description.is_empty() {
        parts.push(func.description.clone());
    }
    if !func.parameters.is_empty() {
        let mut table = String::from(
            "| Parameter | Type | Default | Description |\n| --- | --- | --- | --- |",
        );
        for (name, param) in &func.parameters {
            table.push_str(&format!(
                "\n| {} | {} | {} | {} |",
                name,
                table_cell(&param.parameter.param_type),
                table_cell(&param.parameter.default),
                table_cell(&param.description)
            ));
        }
        parts.push(table);
    }
    if let Some(ref returns) = func.returns {
        parts.push(format!("_Returns:_ {}", returns));
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::python;
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings {
            root_import: "pkg".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn simple_class() {
        let src = r#"class Person:
    """
    A person.
    """

    def __init__(self, name: str):
        """
        :param name: The name.
        """
        """:field
        The name.
        """
        self.name = name
"#;
        let module = python::parse("person", src, &settings());
        let expected = "# Person\n\n`from pkg.person import Person`\n\nA person.\n\n***\n\n## Fields\n\n- `name` The name.\n\n***\n\n## Functions\n\n#### \\_\\_init\\_\\_\n\n**`Person(name)`**\n\n| Parameter | Type | Default | Description |\n| --- | --- | --- | --- |\n| name | str |  | The name. |\n";
        assert_eq!(render_class(&module.classes[0]), expected);
    }

    #[test]
    fn enum_class() {
        let src = "class Color(Enum):\n    \"\"\"\n    Colors.\n    \"\"\"\n\n    RED = 1  # warm\n    BLUE = 2\n";
        let module = python::parse("color", src, &settings());
        let expected = "# Color\n\n`from pkg.color import Color`\n\nColors.\n\n| Value | Description |\n| --- | --- |\n| `RED` | warm |\n| `BLUE` |  |\n\n***\n";
        assert_eq!(render_class(&module.classes[0]), expected);
    }

    #[test]
    fn static_and_instance_calls() {
        let src = r#"class Foo:
    @staticmethod
    def do(x: int) -> int:
        """
        Do it.

        :param x: The x.
        :return: Twice x.
        """
        return x * 2

    def go(self, x, fast=True):
        """Go."""
        pass
"#;
        let module = python::parse("foo", src, &settings());
        let doc = render_class(&module.classes[0]);
        assert!(doc.contains(
            "#### do\n\n**`Foo.do(x)`**\n\n_(Static)_\n\nDo it.\n\n| Parameter | Type | Default | Description |\n| --- | --- | --- | --- |\n| x | int |  | The x. |\n\n_Returns:_ Twice x."
        ));
        assert!(doc.contains("#### go\n\n**`self.go(x)`**\n\n**`self.go(x, fast=True)`**\n\nGo."));
    }

    #[test]
    fn class_variables_table_escapes_cells() {
        let src = "class Limits:\n    \"\"\":class_var\n    Pipe | separated.\n    \"\"\"\n    TABLE = {\"a\": 1,\n             \"b\": 2}\n";
        let module = python::parse("limits", src, &settings());
        let doc = render_class(&module.classes[0]);
        assert!(doc.contains(
            "## Class Variables\n\n| Variable | Type | Description | Value |\n| --- | --- | --- | --- |\n| `TABLE` |  | Pipe \\| separated. | {\"a\": 1,<br>\"b\": 2} |"
        ));
    }

    #[test]
    fn import_prefix_rewrite() {
        let doc = "# A\n\n`from pkg.a import A`\n\ntext `from x import y` inline\n";
        assert_eq!(
            rewrite_import_prefix(doc, "from lib.public"),
            "# A\n\n`from lib.public import A`\n\ntext `from x import y` inline\n"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let src = "class A:\n    def b(self):\n        \"\"\"B.\"\"\"\n";
        let module = python::parse("a", src, &settings());
        let first = MarkdownRenderer.render(&module, &settings()).unwrap();
        let second = MarkdownRenderer.render(&module, &settings()).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("B.\n"));
    }
}
