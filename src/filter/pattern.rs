//! Anchored extended-syntax path patterns
//!
//! Hook configurations describe their file filters as regular expressions
//! written in verbose syntax: whitespace is insignificant and `#` starts a
//! comment that runs to the end of the line. Inside a bracket expression
//! whitespace and `#` are literal, so `my[ ]file\.py` names a file with a
//! space in it. A pattern only matches a path when it covers the whole string.
//!
//! A comment running to the end of the pattern is dropped before compiling.
//! `(?-x)` turns verbose mode off for the rest of the pattern as usual, but
//! a trailing `#` is still read as a comment.

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// A compiled file filter pattern
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern in extended mode, anchored at both ends.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let prepared = prepare(source);
        // Checked on its own so the anchoring group cannot balance or finish
        // a broken source.
        verbose(&prepared)?;
        let regex = verbose(&format!("^(?:{prepared})$"))?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Compile an optional pattern, treating blank sources as absent.
    pub fn optional(source: Option<&str>) -> Result<Option<Self>, regex::Error> {
        match source {
            Some(s) if !s.trim().is_empty() => Self::new(s).map(Some),
            _ => Ok(None),
        }
    }

    /// The pattern as written in the configuration
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the whole of `path` matches.
    pub fn is_full_match(&self, path: &str) -> bool {
        self.regex.is_match(&normalize_path(path))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

fn verbose(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).ignore_whitespace(true).build()
}

/// Rewrite a verbose source for the regex crate: whitespace and `#` inside
/// bracket expressions become hex escapes, and a comment that runs to the
/// end of the source is removed.
fn prepare(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut depth = 0usize;
    // Directly after `[` or `[^` a `]` is a literal
    let mut class_start = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                class_start = false;
            }
            '#' if depth == 0 => {
                let mut comment = String::from(c);
                let mut terminated = false;
                for next in chars.by_ref() {
                    comment.push(next);
                    if next == '\n' {
                        terminated = true;
                        break;
                    }
                }
                if terminated {
                    out.push_str(&comment);
                }
            }
            '[' => {
                out.push(c);
                depth += 1;
                class_start = true;
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
            }
            ']' if depth > 0 && !class_start => {
                out.push(c);
                depth -= 1;
            }
            c if depth > 0 && (c.is_whitespace() || c == '#') => {
                out.push_str(&format!("\\x{{{:X}}}", u32::from(c)));
                class_start = false;
            }
            c => {
                out.push(c);
                class_start = false;
            }
        }
    }

    out
}

/// Bring a candidate path into the form patterns are written against:
/// forward slashes, no leading `./`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let mut path: Cow<'_, str> = if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    };

    while path.starts_with("./") {
        path = match path {
            Cow::Borrowed(p) => Cow::Borrowed(&p[2..]),
            Cow::Owned(p) => Cow::Owned(p[2..].to_string()),
        };
    }

    path
}
