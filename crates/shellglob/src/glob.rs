//! Single-component wildcard matching and brace expansion.
//!
//! Implements shell-style wildcards within one path component:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//! - `[abc]` matches any character in the set
//! - `[a-z]` matches any character in the range
//! - `[!abc]` or `[^abc]` matches any character NOT in the set
//! - `\x` escapes the next character
//!
//! Brace alternation (`{a,b}`) is handled by [`expand_braces`]: the
//! translator expands braces into whole alternative patterns before any
//! matcher is compiled, so a [`Matcher`] never sees a `{`.

use std::cell::Cell;

/// Maximum number of recursive calls for one match. Protects against
/// adversarial patterns like `*a*a*a*...*a` that cause O(n^k) backtracking.
/// Counted as total work (calls), not stack depth, to bound actual CPU cost.
const MAX_MATCH_CALLS: usize = 100_000;

/// One compiled element of a wildcard pattern.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A literal character (including escaped metacharacters).
    Char(char),
    /// `*` matches zero or more characters.
    Any,
    /// `?` matches exactly one character.
    One,
    /// `[...]` matches a character class, stored as inclusive ranges.
    Class { negated: bool, ranges: Vec<(char, char)> },
}

/// A wildcard pattern compiled for matching a single path component.
///
/// Matching is full-string: the pattern must consume the entire input.
///
/// # Examples
/// ```
/// use shellglob::Matcher;
///
/// let m = Matcher::new("*.rs");
/// assert!(m.matches("main.rs"));
/// assert!(!m.matches("main.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    source: String,
    tokens: Vec<Token>,
}

impl Matcher {
    /// Compile a wildcard pattern.
    ///
    /// Compilation never fails: malformed constructs degrade to literals
    /// (an unclosed `[` matches a literal `[`, a trailing `\` matches a
    /// literal backslash).
    pub fn new(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '*' => {
                    // Consecutive stars collapse to one
                    if tokens.last() != Some(&Token::Any) {
                        tokens.push(Token::Any);
                    }
                    i += 1;
                }
                '?' => {
                    tokens.push(Token::One);
                    i += 1;
                }
                '\\' => {
                    if i + 1 < chars.len() {
                        tokens.push(Token::Char(chars[i + 1]));
                        i += 2;
                    } else {
                        tokens.push(Token::Char('\\'));
                        i += 1;
                    }
                }
                '[' => match parse_class(&chars[i..]) {
                    Some((token, consumed)) => {
                        tokens.push(token);
                        i += consumed;
                    }
                    // Unclosed bracket - treat as literal
                    None => {
                        tokens.push(Token::Char('['));
                        i += 1;
                    }
                },
                c => {
                    tokens.push(Token::Char(c));
                    i += 1;
                }
            }
        }

        Matcher {
            source: pattern.to_string(),
            tokens,
        }
    }

    /// The pattern text this matcher was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match the entire input string against this pattern.
    ///
    /// Returns `false` (non-match) if total recursive calls exceed
    /// `MAX_MATCH_CALLS`, preventing ReDoS from adversarial patterns.
    pub fn matches(&self, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        let calls = Cell::new(0usize);
        match_tokens(&self.tokens, 0, &chars, 0, &calls)
    }
}

/// Parse a character class starting at `[`.
///
/// Returns the compiled token and the number of pattern chars consumed, or
/// `None` if the class is unclosed.
fn parse_class(pattern: &[char]) -> Option<(Token, usize)> {
    debug_assert_eq!(pattern.first(), Some(&'['));

    let mut idx = 1;
    let mut negated = false;

    if idx < pattern.len() && (pattern[idx] == '!' || pattern[idx] == '^') {
        negated = true;
        idx += 1;
    }

    // `]` as the first class character is a literal (POSIX behavior)
    let first = idx;
    let mut ranges = Vec::new();
    let mut closed = false;

    while idx < pattern.len() {
        let c = pattern[idx];

        if c == ']' && idx > first {
            idx += 1;
            closed = true;
            break;
        }

        // Range a-z: dash must sit between two members, not before `]`
        if idx + 2 < pattern.len() && pattern[idx + 1] == '-' && pattern[idx + 2] != ']' {
            ranges.push((c, pattern[idx + 2]));
            idx += 3;
            continue;
        }

        ranges.push((c, c));
        idx += 1;
    }

    if !closed {
        return None;
    }

    Some((Token::Class { negated, ranges }, idx))
}

/// Work-bounded recursive matching with backtracking for `*`.
fn match_tokens(tokens: &[Token], ti: usize, input: &[char], ii: usize, calls: &Cell<usize>) -> bool {
    let count = calls.get() + 1;
    calls.set(count);
    if count > MAX_MATCH_CALLS {
        return false;
    }

    let Some(token) = tokens.get(ti) else {
        // Pattern exhausted - match iff input is too
        return ii >= input.len();
    };

    match token {
        Token::Any => {
            // Star at the end matches everything remaining
            if ti + 1 >= tokens.len() {
                return true;
            }
            // Try consuming 0, 1, 2, ... characters
            for skip in 0..=(input.len() - ii) {
                if match_tokens(tokens, ti + 1, input, ii + skip, calls) {
                    return true;
                }
            }
            false
        }

        Token::One => {
            ii < input.len() && match_tokens(tokens, ti + 1, input, ii + 1, calls)
        }

        Token::Class { negated, ranges } => {
            let Some(&c) = input.get(ii) else {
                return false;
            };
            let in_set = ranges.iter().any(|&(lo, hi)| c >= lo && c <= hi);
            if in_set != *negated {
                match_tokens(tokens, ti + 1, input, ii + 1, calls)
            } else {
                false
            }
        }

        Token::Char(expected) => {
            input.get(ii) == Some(expected) && match_tokens(tokens, ti + 1, input, ii + 1, calls)
        }
    }
}

/// Check if a string contains glob metacharacters (`*`, `?`, `[`).
///
/// Components without metacharacters become literal segments and are
/// compared by plain string equality instead of compiling a matcher.
///
/// ```
/// use shellglob::contains_glob;
/// assert!(contains_glob("*.rs"));
/// assert!(contains_glob("src/[ab]*.txt"));
/// assert!(!contains_glob("src/main.rs"));
/// ```
pub fn contains_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[')
}

/// Match a string against a glob pattern, including brace alternation.
///
/// Convenience wrapper: expands braces, compiles each alternative, and
/// returns true if any alternative matches the entire input.
///
/// # Examples
/// ```
/// use shellglob::glob_match;
///
/// assert!(glob_match("*.rs", "main.rs"));
/// assert!(glob_match("test?", "test1"));
/// assert!(glob_match("[abc]", "b"));
/// assert!(glob_match("*.{rs,go}", "main.go"));
/// assert!(!glob_match("*.txt", "main.rs"));
/// ```
pub fn glob_match(pattern: &str, input: &str) -> bool {
    expand_braces(pattern)
        .iter()
        .any(|alt| Matcher::new(alt).matches(input))
}

/// Expand brace expressions in a pattern.
///
/// `{a,b,c}` expands to multiple patterns. Supports nested braces and empty
/// alternatives (`{,s}`). Returns all fully expanded patterns; a pattern
/// without braces expands to itself.
///
/// # Examples
/// ```
/// use shellglob::expand_braces;
///
/// assert_eq!(expand_braces("simple"), vec!["simple"]);
/// assert_eq!(expand_braces("x{a,b}y"), vec!["xay", "xby"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((start, end)) = first_brace_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..start];
    let suffix = &pattern[end + 1..];
    let body = &pattern[start + 1..end];

    let mut results = Vec::new();
    for alt in split_alternatives(body) {
        // Re-expand: the alternative or the suffix may contain more braces
        results.extend(expand_braces(&format!("{prefix}{alt}{suffix}")));
    }
    results
}

/// Locate the first top-level `{...}` group, returning byte offsets of the
/// braces. Returns `None` for unbalanced or absent braces (the pattern is
/// then taken literally).
fn first_brace_group(pattern: &str) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in pattern.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        return start.map(|s| (s, i));
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Split brace content by commas, respecting nested braces.
fn split_alternatives(body: &str) -> Vec<&str> {
    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut piece_start = 0;

    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                alternatives.push(&body[piece_start..i]);
                piece_start = i + 1;
            }
            _ => {}
        }
    }

    alternatives.push(&body[piece_start..]);
    alternatives
}
