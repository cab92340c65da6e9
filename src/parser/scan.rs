//! Bracket- and quote-aware scanning over Python source fragments.
//!
//! Signatures and literal values are never tokenized; these helpers only
//! answer "where is the next delimiter that is not nested or quoted".

/// Tracks string literals so delimiters inside them are skipped.
#[derive(Default)]
struct QuoteState {
    quote: Option<char>,
    escaped: bool,
}

impl QuoteState {
    /// Feed one char; returns true when the char belongs to a string literal.
    fn consume(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == q {
                self.quote = None;
            }
            return true;
        }
        if c == '\'' || c == '"' {
            self.quote = Some(c);
            return true;
        }
        false
    }
}

/// Byte index of the first char in `stops` found at bracket depth 0 and
/// outside string literals. A closing bracket with no opener counts as depth 0.
pub fn find_top_level(text: &str, stops: &[char]) -> Option<usize> {
    let mut depth = 0usize;
    let mut quotes = QuoteState::default();
    for (i, c) in text.char_indices() {
        if quotes.consume(c) {
            continue;
        }
        if depth == 0 && stops.contains(&c) {
            return Some(i);
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Split at every depth-0 occurrence of `sep`.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(i) = find_top_level(rest, &[sep]) {
        parts.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// Text between the first `open` bracket and its matching close.
/// An unclosed bracket yields everything after it.
pub fn bracketed(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)? + open.len_utf8();
    let inner = &text[start..];
    match find_top_level(inner, &[close]) {
        Some(end) => Some(&inner[..end]),
        None => Some(inner),
    }
}

/// Net number of unclosed brackets outside string literals.
pub fn bracket_balance(text: &str) -> isize {
    let mut balance = 0isize;
    let mut quotes = QuoteState::default();
    for c in text.chars() {
        if quotes.consume(c) {
            continue;
        }
        match c {
            '(' | '[' | '{' => balance += 1,
            ')' | ']' | '}' => balance -= 1,
            _ => {}
        }
    }
    balance
}

/// Drop a trailing `# comment` that is not inside a string literal.
pub fn strip_comment(line: &str) -> &str {
    let mut quotes = QuoteState::default();
    for (i, c) in line.char_indices() {
        if quotes.consume(c) {
            continue;
        }
        if c == '#' {
            return &line[..i];
        }
    }
    line
}

/// Collapse whitespace runs to one space outside string literals, and
/// drop the `( `, ` )` and `, )` left behind by joining wrapped lines.
pub fn collapse_unquoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quotes = QuoteState::default();
    let mut space = false;
    for c in text.trim().chars() {
        let quoted = quotes.consume(c);
        if !quoted && c.is_whitespace() {
            space = true;
            continue;
        }
        let closing = !quoted && c == ')';
        if space {
            if closing && out.ends_with(',') {
                out.pop();
            } else if !closing && !out.ends_with('(') {
                out.push(' ');
            }
            space = false;
        }
        out.push(c);
    }
    out
}

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// Triple-quoted string still open after `line`, given the one open before it.
pub fn triple_quote_state(line: &str, open: Option<&'static str>) -> Option<&'static str> {
    let mut open = open;
    let mut rest = line;
    loop {
        match open {
            Some(delimiter) => match rest.find(delimiter) {
                Some(p) => {
                    rest = &rest[p + delimiter.len()..];
                    open = None;
                }
                None => return open,
            },
            None => {
                let code = strip_comment(rest);
                let (p, delimiter) = TRIPLE_QUOTES
                    .iter()
                    .filter_map(|d| code.find(d).map(|p| (p, *d)))
                    .min_by_key(|(p, _)| *p)?;
                rest = &rest[p + delimiter.len()..];
                open = Some(delimiter);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_skips_nested_and_quoted() {
        assert_eq!(find_top_level("Dict[str, int], b", &[',']), Some(14));
        assert_eq!(find_top_level("x='a,b', y", &[',']), Some(7));
        assert_eq!(find_top_level("a) -> int", &[')']), Some(1));
        assert_eq!(find_top_level("abc", &[',']), None);
    }

    #[test]
    fn split_keeps_generics_whole() {
        assert_eq!(
            split_top_level("self, x: Dict[str, int] = {}, y=(1, 2)", ','),
            vec!["self", " x: Dict[str, int] = {}", " y=(1, 2)"]
        );
    }

    #[test]
    fn bracketed_finds_matching_close() {
        assert_eq!(bracketed("f(a, g(b)) -> int", '(', ')'), Some("a, g(b)"));
        assert_eq!(bracketed("f(a, b", '(', ')'), Some("a, b"));
        assert_eq!(bracketed("f", '(', ')'), None);
    }

    #[test]
    fn balance_counts_open_brackets() {
        assert_eq!(bracket_balance("def f(a,"), 1);
        assert_eq!(bracket_balance("{'(': 1}"), 0);
    }

    #[test]
    fn comment_outside_strings_only() {
        assert_eq!(strip_comment("RED = 1  # warm"), "RED = 1  ");
        assert_eq!(strip_comment("X = '#fff'"), "X = '#fff'");
    }

    #[test]
    fn collapse_keeps_string_literals() {
        assert_eq!(
            collapse_unquoted("f( self,\n   sep='a  ( b )',\n )"),
            "f(self, sep='a  ( b )')"
        );
        assert_eq!(collapse_unquoted("f(x=(1,))"), "f(x=(1,))");
    }

    #[test]
    fn triple_quotes_across_lines() {
        let dq = "\"\"\"";
        assert_eq!(triple_quote_state("    \"\"\"", None), Some(dq));
        assert_eq!(triple_quote_state("text '''", Some(dq)), Some(dq));
        assert_eq!(triple_quote_state("end\"\"\"", Some(dq)), None);
        assert_eq!(triple_quote_state("    \"\"\"One line.\"\"\"", None), None);
        assert_eq!(triple_quote_state("x = 1  # '''", None), None);
    }
}
