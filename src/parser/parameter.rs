//! Parameter extraction from a reconstructed signature string.
//!
//! Types end at the first `:`, `=`, `,` or `)` at nesting depth 0, so
//! bracketed generics such as `Dict[str, int]` survive intact. Malformed
//! input never fails; missing pieces come back as empty strings.

use super::scan::{bracketed, find_top_level, split_top_level};
use crate::model::Parameter;

/// Names that never appear in parameter tables or call examples.
const IMPLICIT: &[&str] = &["self", "cls"];

/// Extract the declared type and default of `name` from `signature`.
pub fn extract(name: &str, signature: &str) -> Parameter {
    segments(signature)
        .into_iter()
        .filter_map(parse_segment)
        .find(|p| p.name == name)
        .unwrap_or_else(|| Parameter {
            name: name.to_string(),
            ..Default::default()
        })
}

/// Every explicit parameter in signature order.
///
/// `self`, `cls`, the bare `*` keyword-only marker and `/` are dropped.
pub fn split_parameters(signature: &str) -> Vec<Parameter> {
    segments(signature)
        .into_iter()
        .filter_map(parse_segment)
        .filter(|p| !IMPLICIT.contains(&p.name.as_str()))
        .collect()
}

fn segments(signature: &str) -> Vec<&str> {
    match bracketed(signature, '(', ')') {
        Some(list) => split_top_level(list, ','),
        None => Vec::new(),
    }
}

fn parse_segment(segment: &str) -> Option<Parameter> {
    let segment = segment.trim();
    let (head, default) = match find_top_level(segment, &['=']) {
        Some(i) => (&segment[..i], Some(&segment[i + 1..])),
        None => (segment, None),
    };
    let (name, param_type) = match find_top_level(head, &[':']) {
        Some(i) => (&head[..i], Some(&head[i + 1..])),
        None => (head, None),
    };

    let name = name.trim();
    let stars = name.len() - name.trim_start_matches('*').len();
    let name = name.trim_start_matches('*').trim();
    if name.is_empty() || name == "/" {
        return None;
    }

    Some(Parameter {
        name: name.to_string(),
        param_type: param_type
            .map(|t| clip_type(t).trim().to_string())
            .unwrap_or_default(),
        default: default.map(|d| d.trim().to_string()).unwrap_or_default(),
        stars,
    })
}

/// Cut an annotation at any stray top-level delimiter.
fn clip_type(annotation: &str) -> &str {
    match find_top_level(annotation, &[':', ',', ')']) {
        Some(i) => &annotation[..i],
        None => annotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_type_with_default() {
        let sig = "f(x: List[int] = None, y=3)";
        let x = extract("x", sig);
        assert_eq!(x.param_type, "List[int]");
        assert_eq!(x.default, "None");
        let y = extract("y", sig);
        assert_eq!(y.param_type, "");
        assert_eq!(y.default, "3");
    }

    #[test]
    fn commas_inside_brackets() {
        let p = extract("m", "f(self, m: Dict[str, int], n: int) -> None");
        assert_eq!(p.param_type, "Dict[str, int]");
        assert_eq!(p.default, "");
    }

    #[test]
    fn quoted_default_with_delimiters() {
        let p = extract("sep", "f(sep: str = ', ', end=':')");
        assert_eq!(p.param_type, "str");
        assert_eq!(p.default, "', '");
    }

    #[test]
    fn name_must_match_exactly() {
        // `x` must not pick up the annotation of `max`
        let p = extract("x", "f(max: int, x=1)");
        assert_eq!(p.param_type, "");
        assert_eq!(p.default, "1");
    }

    #[test]
    fn missing_parameter_is_empty() {
        let p = extract("z", "f(a)");
        assert_eq!(p.name, "z");
        assert_eq!(p.param_type, "");
        assert_eq!(p.default, "");
    }

    #[test]
    fn malformed_signature_does_not_panic() {
        assert_eq!(extract("a", "f(a: int = ").default, "");
        assert!(split_parameters("no parens here").is_empty());
    }

    #[test]
    fn split_drops_implicit_and_markers() {
        let params = split_parameters("f(self, a, *, b: int = 2, *args, **kwargs) -> None");
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "args", "kwargs"]);
        assert_eq!(params[2].stars, 1);
        assert_eq!(params[3].stars, 2);
        assert_eq!(params[1].call_form(), "b=2");
        assert_eq!(params[3].call_form(), "**kwargs");
    }

    #[test]
    fn lambda_default_keeps_colon() {
        let p = extract("key", "f(key=lambda v: v)");
        assert_eq!(p.param_type, "");
        assert_eq!(p.default, "lambda v: v");
    }
}
