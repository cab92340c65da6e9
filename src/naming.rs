//! File-name and class-name conventions of the inheritance driver.
//!
//! A file `my_shape.py` is expected to hold `MyShape`; an ancestor `MyShape`
//! is expected to be documented in `my_shape.md`. Overrides cover the
//! exceptions in both directions.

use crate::error::{DocError, Result};
use std::collections::HashMap;

/// `MyShape` → `my_shape`. Every uppercase letter after the first starts a word.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// `my_shape` → `MyShape`. An empty part (double underscore) becomes `_`.
pub fn camel_case(stem: &str) -> String {
    stem.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => "_".to_string(),
            }
        })
        .collect()
}

/// Explicit `expected=actual` replacements for derived names.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    map: HashMap<String, String>,
}

impl Overrides {
    /// Parse `--override` values of the form `EXPECTED=ACTUAL`.
    pub fn parse(pairs: &[String]) -> Result<Self> {
        let mut map = HashMap::new();
        for pair in pairs {
            let (expected, actual) = pair
                .split_once('=')
                .filter(|(k, v)| !k.trim().is_empty() && !v.trim().is_empty())
                .ok_or_else(|| DocError::InvalidOverride(pair.clone()))?;
            map.insert(expected.trim().to_string(), actual.trim().to_string());
        }
        Ok(Self { map })
    }

    /// The override for `name`, or `name` itself.
    pub fn apply(&self, name: String) -> String {
        match self.map.get(&name) {
            Some(actual) => actual.clone(),
            None => name,
        }
    }

    /// Class documented by the file with this stem.
    pub fn class_for_stem(&self, stem: &str) -> String {
        self.apply(camel_case(stem))
    }

    /// Document stem holding this class.
    pub fn stem_for_class(&self, class_name: &str) -> String {
        self.apply(snake_case(class_name))
    }
}
