//! Section recovery from rendered class documents.
//!
//! Sorting and inheritance both operate on Markdown that has already been
//! rendered, so they need the document back in pieces. Only the layout the
//! renderer writes is understood: a `# Name` preamble, `***` breaks on
//! their own line and `## ` section headings. Fenced code blocks are opaque.

pub const SECTION_BREAK: &str = "***";
/// A section break framed by blank lines.
pub const BREAK: &str = "\n\n***\n\n";

pub const CLASS_VARIABLES: &str = "Class Variables";
pub const FIELDS: &str = "Fields";
pub const FUNCTIONS: &str = "Functions";

pub const CLASS_VARIABLES_HEADER: &str =
    "| Variable | Type | Description | Value |\n| --- | --- | --- | --- |";

/// Heading text of the constructor block.
pub const CONSTRUCTOR_HEADING: &str = r"\_\_init\_\_";

/// Pair each line with whether it sits inside a fenced code block.
///
/// Fence delimiter lines themselves count as fenced.
pub fn fenced_lines(doc: &str) -> impl Iterator<Item = (bool, &str)> {
    let mut in_fence = false;
    doc.lines().map(move |line| {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            return (true, line);
        }
        (in_fence, line)
    })
}

/// One `## Title` section; `body` excludes the heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
        }
    }

    fn render(&self) -> String {
        if self.body.is_empty() {
            format!("## {}", self.title)
        } else {
            format!("## {}\n\n{}", self.title, self.body)
        }
    }
}

/// A rendered class document split into its preamble and sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDocument {
    /// Heading, import example, description and enum table
    pub preamble: String,
    pub sections: Vec<Section>,
}

impl ClassDocument {
    pub fn parse(doc: &str) -> Self {
        let mut result = Self::default();
        for chunk in split_breaks(doc) {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            if let Some(rest) = chunk.strip_prefix("## ") {
                let (title, body) = rest.split_once('\n').unwrap_or((rest, ""));
                result.sections.push(Section::new(title.trim(), body.trim()));
            } else if let Some(last) = result.sections.last_mut() {
                // Category groups of a sorted Functions section
                last.body = format!("{}{}{}", last.body, BREAK, chunk);
            } else if result.preamble.is_empty() {
                result.preamble = chunk.to_string();
            } else {
                result.preamble = format!("{}{}{}", result.preamble, BREAK, chunk);
            }
        }
        result
    }

    /// Class name from the `# Name` heading.
    pub fn class_name(&self) -> Option<&str> {
        self.preamble
            .lines()
            .find_map(|l| l.strip_prefix("# "))
            .map(str::trim)
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn section_mut(&mut self, title: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.title == title)
    }

    /// Reassemble with the renderer's layout.
    pub fn render(&self) -> String {
        if self.sections.is_empty() {
            return format!("{}\n\n{}\n", self.preamble, SECTION_BREAK);
        }
        let sections: Vec<String> = self.sections.iter().map(Section::render).collect();
        format!("{}{}{}\n", self.preamble, BREAK, sections.join(BREAK))
    }
}

/// Split at `***` lines outside code fences.
fn split_breaks(doc: &str) -> Vec<String> {
    let mut chunks = vec![String::new()];
    for (fenced, line) in fenced_lines(doc) {
        if !fenced && line.trim() == SECTION_BREAK {
            chunks.push(String::new());
            continue;
        }
        if let Some(current) = chunks.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    chunks
}

/// Data rows of the first table in `body`, header and separator excluded.
pub fn table_rows(body: &str) -> Vec<String> {
    body.lines()
        .skip_while(|l| !l.starts_with('|'))
        .take_while(|l| l.starts_with('|'))
        .skip(2)
        .map(str::to_string)
        .collect()
}

/// Field bullets of a Fields section body.
///
/// A bullet continues until the next bullet, so multi-paragraph field
/// descriptions stay whole.
pub fn bullets(body: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for (fenced, line) in fenced_lines(body) {
        if !fenced && line.starts_with("- `") {
            items.push(line.to_string());
        } else if let Some(item) = items.last_mut() {
            item.push('\n');
            item.push_str(line);
        }
    }
    items.into_iter().map(|i| i.trim_end().to_string()).collect()
}

/// Name of a bullet written as ``- `name` description``.
pub fn bullet_name(bullet: &str) -> Option<&str> {
    let rest = bullet.strip_prefix("- `")?;
    rest.split_once('`').map(|(name, _)| name)
}

/// A `#### name` block of a Functions section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBlock {
    /// Heading text, escaped as rendered (`\_\_init\_\_`)
    pub heading: String,
    /// Everything after the heading line, trimmed
    pub body: String,
}

impl FunctionBlock {
    pub fn render(&self) -> String {
        if self.body.is_empty() {
            format!("#### {}", self.heading)
        } else {
            format!("#### {}\n\n{}", self.heading, self.body)
        }
    }

    /// Unescaped member name, e.g. `__init__`.
    pub fn member_name(&self) -> String {
        self.heading.replace(r"\_", "_")
    }

    /// True when the block only holds call examples and the static marker.
    pub fn is_placeholder(&self) -> bool {
        self.body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .all(|l| (l.starts_with("**`") && l.ends_with("`**")) || l == "_(Static)_")
    }
}

/// Every `#### ` block in `body`.
///
/// A block ends at the next heading of level 2 to 4 or at a section break.
pub fn function_blocks(body: &str) -> Vec<FunctionBlock> {
    let mut blocks: Vec<FunctionBlock> = Vec::new();
    let mut open = false;
    for (fenced, line) in fenced_lines(body) {
        if !fenced {
            if let Some(heading) = line.strip_prefix("#### ") {
                blocks.push(FunctionBlock {
                    heading: heading.trim().to_string(),
                    body: String::new(),
                });
                open = true;
                continue;
            }
            if line.starts_with("## ") || line.starts_with("### ") || line.trim() == SECTION_BREAK
            {
                open = false;
                continue;
            }
        }
        if open {
            if let Some(block) = blocks.last_mut() {
                block.body.push_str(line);
                block.body.push('\n');
            }
        }
    }
    for block in &mut blocks {
        block.body = block.body.trim().to_string();
    }
    blocks
}

/// Split a multi-class document at its `# ` headings.
pub fn split_classes(doc: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for (fenced, line) in fenced_lines(doc) {
        if !fenced && line.starts_with("# ") {
            classes.push(String::new());
        }
        if let Some(class) = classes.last_mut() {
            class.push_str(line);
            class.push('\n');
        }
    }
    classes
        .into_iter()
        .map(|c| format!("{}\n", c.trim_end()))
        .collect()
}
