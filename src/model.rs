//! Format-agnostic data model for extracted documentation.

use indexmap::IndexMap;
use serde::Serialize;

/// One source file's text plus its line sequence.
pub struct SourceUnit<'a> {
    pub lines: Vec<&'a str>,
}

impl<'a> SourceUnit<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
        }
    }
}

/// What a declaration site declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Enum,
    Function,
    StaticFunction,
    ClassMethod,
    Constructor,
}

/// A located class or function signature.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Line index of the keyword
    pub start: usize,
    /// Line index of the last physical line of the signature
    pub end: usize,
    pub indent: usize,
    pub name: String,
    /// Logical one-line signature, e.g. `go(self, x: int) -> None`
    pub signature: String,
    /// Base class names (classes only)
    pub bases: Vec<String>,
}

impl Declaration {
    /// Private classes and functions are never documented; the constructor always is.
    pub fn is_excluded(&self) -> bool {
        self.name.starts_with('_') && self.kind != DeclKind::Constructor
    }
}

/// One function parameter as declared in a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type, empty without annotation
    #[serde(rename = "type")]
    pub param_type: String,
    /// Default value literal, empty when the parameter is required
    pub default: String,
    /// 1 for `*args`, 2 for `**kwargs`
    #[serde(skip_serializing_if = "is_zero")]
    pub stars: usize,
}

impl Parameter {
    pub fn is_required(&self) -> bool {
        self.default.is_empty() && self.stars == 0
    }

    /// How the parameter reads in a call example that spells out defaults.
    pub fn call_form(&self) -> String {
        if self.stars > 0 {
            format!("{}{}", "*".repeat(self.stars), self.name)
        } else if self.default.is_empty() {
            self.name.clone()
        } else {
            format!("{}={}", self.name, self.default)
        }
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParameterDoc {
    #[serde(flatten)]
    pub parameter: Parameter,
    pub description: String,
}

/// A documented function or method.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FunctionDoc {
    /// `__init__` for constructors
    pub name: String,
    pub signature: String,
    /// Call example with required arguments only
    pub short_call: String,
    /// Call example with every argument; absent when equal to `short_call`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_call: Option<String>,
    pub is_static: bool,
    pub description: String,
    pub parameters: IndexMap<String, ParameterDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    pub description: String,
    /// Literal value text, possibly spanning lines
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub description: String,
}

/// Everything documented about one class.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassDoc {
    pub name: String,
    /// Dotted module path used in the import example
    pub import_path: String,
    pub bases: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    pub class_variables: Vec<ClassVariable>,
    pub fields: Vec<Field>,
    pub functions: Vec<FunctionDoc>,
}

/// The documented classes of one source file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleDoc {
    /// File stem, e.g. `my_thing` for `my_thing.py`
    pub stem: String,
    pub classes: Vec<ClassDoc>,
}
