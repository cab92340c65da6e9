//! Ancestor resolution from class declarations.
//!
//! Classes are registered with their direct bases as written in source.
//! The ancestor chain is the C3 linearization (Python's method resolution
//! order) minus the class itself. Bases that were never registered are
//! treated as roots.

use crate::parser::python::class_declarations;
use std::collections::HashMap;

/// Source of a class's ancestors, nearest first.
pub trait AncestorResolver {
    fn ancestors(&self, class_name: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    bases: HashMap<String, Vec<String>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class_name: impl Into<String>, bases: Vec<String>) {
        self.bases.insert(class_name.into(), bases);
    }

    /// Register every top-level class declared in `source`.
    pub fn register_source(&mut self, source: &str) {
        for (name, bases) in class_declarations(source) {
            self.register(name, bases);
        }
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.bases.contains_key(class_name)
    }

    fn direct_bases(&self, class_name: &str) -> &[String] {
        self.bases
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// C3 linearization, `None` on cycles or inconsistent orderings.
    fn linearize(&self, class_name: &str, stack: &mut Vec<String>) -> Option<Vec<String>> {
        if stack.iter().any(|c| c == class_name) {
            return None;
        }
        stack.push(class_name.to_string());

        let bases = self.direct_bases(class_name);
        let mut sequences = Vec::with_capacity(bases.len() + 1);
        for base in bases {
            sequences.push(self.linearize(base, stack)?);
        }
        sequences.push(bases.to_vec());
        stack.pop();

        let mut result = vec![class_name.to_string()];
        result.extend(c3_merge(sequences)?);
        Some(result)
    }

    /// Depth-first, left-to-right walk with duplicates and cycles dropped.
    fn depth_first(&self, class_name: &str, seen: &mut Vec<String>) {
        for base in self.direct_bases(class_name) {
            if seen.iter().any(|s| s == base) {
                continue;
            }
            seen.push(base.clone());
            self.depth_first(base, seen);
        }
    }
}

impl AncestorResolver for ClassRegistry {
    fn ancestors(&self, class_name: &str) -> Vec<String> {
        match self.linearize(class_name, &mut Vec::new()) {
            Some(mut order) => {
                order.remove(0);
                order
            }
            None => {
                log::warn!(
                    "inconsistent class hierarchy for {}, using depth-first order",
                    class_name
                );
                let mut seen = vec![class_name.to_string()];
                self.depth_first(class_name, &mut seen);
                seen.remove(0);
                seen
            }
        }
    }
}

fn c3_merge(mut sequences: Vec<Vec<String>>) -> Option<Vec<String>> {
    let mut result = Vec::new();
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }
        let head = sequences
            .iter()
            .map(|s| &s[0])
            .find(|candidate| !sequences.iter().any(|s| s[1..].contains(*candidate)))?
            .clone();
        for sequence in &mut sequences {
            if sequence[0] == head {
                sequence.remove(0);
            }
        }
        result.push(head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_chain() {
        let mut registry = ClassRegistry::new();
        registry.register("Shape", names(&["ABC"]));
        registry.register("Circle", names(&["Shape"]));
        registry.register("Ring", names(&["Circle"]));
        assert_eq!(registry.ancestors("Ring"), names(&["Circle", "Shape", "ABC"]));
    }

    #[test]
    fn diamond_follows_c3() {
        let mut registry = ClassRegistry::new();
        registry.register("A", vec![]);
        registry.register("B", names(&["A"]));
        registry.register("C", names(&["A"]));
        registry.register("D", names(&["B", "C"]));
        assert_eq!(registry.ancestors("D"), names(&["B", "C", "A"]));
    }

    #[test]
    fn cycle_falls_back_to_depth_first() {
        let mut registry = ClassRegistry::new();
        registry.register("A", names(&["B"]));
        registry.register("B", names(&["A"]));
        assert_eq!(registry.ancestors("A"), names(&["B"]));
    }

    #[test]
    fn unknown_class_has_no_ancestors() {
        assert!(ClassRegistry::new().ancestors("Nope").is_empty());
    }

    #[test]
    fn registered_from_source() {
        let mut registry = ClassRegistry::new();
        registry.register_source("class Base:\n    pass\n\n\nclass Child(mod.Base):\n    pass\n");
        assert!(registry.contains("Base"));
        assert_eq!(registry.ancestors("Child"), names(&["Base"]));
    }
}
