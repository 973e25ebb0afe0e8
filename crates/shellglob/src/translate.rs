//! Pattern translation: glob strings into segment-sequences.
//!
//! A glob string is brace-expanded into one or more alternatives; each
//! alternative is split on `/` into an ordered sequence of [`Segment`]s.
//! The resolver consumes one segment per directory level.

use thiserror::Error;

use crate::glob::{contains_glob, expand_braces, Matcher};
use crate::GlobOptions;

/// Errors when translating glob patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,
}

/// One path-component-sized piece of a translated pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal directory or file name: "src", "main.rs". The empty literal
    /// appears only at the ends of a sequence: leading for an absolute
    /// pattern, trailing for a pattern that ends in `/` (directories only).
    Literal(String),
    /// Compiled wildcard: "*.rs", "test_?", "[ab]c".
    Wildcard(Matcher),
    /// `**` matches zero or more path components, recursively.
    Globstar,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Wildcard(a), Segment::Wildcard(b)) => a.source() == b.source(),
            (Segment::Globstar, Segment::Globstar) => true,
            _ => false,
        }
    }
}

impl Segment {
    /// The empty literal encodes an absolute-path root or a trailing slash.
    pub(crate) fn is_empty_literal(&self) -> bool {
        matches!(self, Segment::Literal(text) if text.is_empty())
    }

    /// Whether a directory entry name satisfies this segment at one level.
    ///
    /// Wildcards refuse names starting with `.` unless `dot` is set or the
    /// pattern itself spells a leading literal dot. Literals always compare
    /// exactly, dotted or not.
    pub(crate) fn matches_name(&self, name: &str, dot: bool) -> bool {
        match self {
            Segment::Literal(text) => text == name,
            Segment::Wildcard(matcher) => {
                if name.starts_with('.') && !dot && !matcher.source().starts_with('.') {
                    return false;
                }
                matcher.matches(name)
            }
            // `**` consuming one component behaves like `*`
            Segment::Globstar => dot || !name.starts_with('.'),
        }
    }
}

/// The result of translating one glob string.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// One segment-sequence per brace alternative.
    pub sequences: Vec<Vec<Segment>>,
    /// Parity of leading `!` characters. Observed but never applied: pattern
    /// negation is a documented non-feature; callers use the ignore option.
    pub is_negated: bool,
}

/// Translate a glob string into segment-sequences.
///
/// Fails fast on an empty pattern, before any filesystem access.
pub fn translate(pattern: &str, options: &GlobOptions) -> Result<Translation, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut rest = pattern;
    let mut is_negated = false;
    while let Some(stripped) = rest.strip_prefix('!') {
        is_negated = !is_negated;
        rest = stripped;
    }
    if rest.is_empty() {
        return Err(PatternError::Empty);
    }

    let sequences = expand_braces(rest)
        .iter()
        .map(|alternative| split_segments(alternative, options))
        .collect();

    Ok(Translation {
        sequences,
        is_negated,
    })
}

/// Split one fully brace-expanded alternative into segments.
fn split_segments(alternative: &str, options: &GlobOptions) -> Vec<Segment> {
    let parts: Vec<&str> = alternative.split('/').collect();
    let last = parts.len() - 1;
    let mut segments = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            // Keep a leading empty component (absolute pattern) and a
            // trailing one (directory-only constraint); `a//b` collapses.
            if i == 0 || i == last {
                segments.push(Segment::Literal(String::new()));
            }
        } else if *part == "**" {
            if options.globstar {
                // Consecutive globstars collapse to one
                if !matches!(segments.last(), Some(Segment::Globstar)) {
                    segments.push(Segment::Globstar);
                }
            } else {
                // Degraded globstar: two ordinary one-level wildcards
                segments.push(Segment::Wildcard(Matcher::new("*")));
                segments.push(Segment::Wildcard(Matcher::new("*")));
            }
        } else if contains_glob(part) {
            segments.push(Segment::Wildcard(Matcher::new(part)));
        } else {
            segments.push(Segment::Literal((*part).to_string()));
        }
    }

    segments
}

/// Match an already-split path against a segment-sequence.
///
/// Backtracks over `Globstar` as "zero or more components"; each skipped
/// component still obeys the dot rule. Used by the ignore post-filter; the
/// walk itself consumes segments incrementally.
pub(crate) fn sequence_matches(segments: &[Segment], components: &[&str], dot: bool) -> bool {
    match segments.split_first() {
        None => components.is_empty(),
        Some((head @ Segment::Globstar, rest)) => (0..=components.len()).any(|skip| {
            components[..skip].iter().all(|name| head.matches_name(name, dot))
                && sequence_matches(rest, &components[skip..], dot)
        }),
        Some((segment, rest)) => {
            let Some((first, tail)) = components.split_first() else {
                // A trailing empty literal (the pattern ended in `/`) is
                // satisfied once the components run out.
                return rest.is_empty() && segment.is_empty_literal();
            };
            segment.matches_name(first, dot) && sequence_matches(rest, tail, dot)
        }
    }
}
