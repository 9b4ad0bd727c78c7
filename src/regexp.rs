//! Compiled regular expressions and the search API.
//!
//! The matcher works in code points; everything public here reports byte
//! offsets into the original `&str`, converting at the boundary.

use std::fmt;
use std::ops::Range;

use itertools::Itertools;

use crate::ast::Flags;
use crate::compiler;
use crate::matcher::Matcher;
use crate::parser::{self, PatternError};
use crate::program::Program;

/// A compiled regular expression.
///
/// A `Regex` is immutable; searches create their own matcher state, so a
/// single compiled value can be shared freely.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    prog: Program,
}

impl Regex {
    /// Compile `pattern` with default flags.
    pub fn new(pattern: &str) -> Result<Regex, PatternError> {
        Regex::with_flags(pattern, Flags::default())
    }

    /// Compile `pattern`. `flags` OR with any flags set inside the
    /// pattern itself.
    pub fn with_flags(pattern: &str, flags: Flags) -> Result<Regex, PatternError> {
        let ast = parser::parse(pattern, flags)?;
        let prog = compiler::compile(&ast);
        Ok(Regex {
            pattern: pattern.to_string(),
            prog,
        })
    }

    /// Like [`Regex::new`], but panics on an invalid pattern. For patterns
    /// known to be valid ahead of time.
    pub fn must_compile(pattern: &str) -> Regex {
        match Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => panic!("regex: compile({pattern:?}): {err}"),
        }
    }

    /// The source pattern text.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Number of capturing groups, not counting the whole match.
    pub fn num_captures(&self) -> usize {
        self.prog.num_captures
    }

    /// Capture-group names by index. Index 0 and unnamed groups hold the
    /// empty string.
    pub fn capture_names(&self) -> &[String] {
        &self.prog.capture_names
    }

    // ─── Searching ──────────────────────────────────────────────────────────

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        self.search(&chars, 0).is_some()
    }

    /// The leftmost match in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let chars: Vec<char> = text.chars().collect();
        let offsets = byte_offsets(text);
        let slots = self.search(&chars, 0)?;
        let (start, end) = group_span(&slots, 0)?;
        Some(Match {
            text,
            start: offsets[start],
            end: offsets[end],
        })
    }

    /// The leftmost match with its capture groups.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'_, 't>> {
        let chars: Vec<char> = text.chars().collect();
        let offsets = byte_offsets(text);
        let slots = self.search(&chars, 0)?;
        Some(Captures::from_slots(self, text, &slots, &offsets))
    }

    /// All non-overlapping matches, leftmost first. `limit` caps the
    /// count: negative means unlimited, zero returns nothing.
    pub fn find_all<'t>(&self, text: &'t str, limit: isize) -> Vec<Match<'t>> {
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        let chars: Vec<char> = text.chars().collect();
        let offsets = byte_offsets(text);
        let mut from = 0;
        while from <= chars.len() {
            let slots = match self.search(&chars, from) {
                Some(slots) => slots,
                None => break,
            };
            let (start, end) = match group_span(&slots, 0) {
                Some(span) => span,
                None => break,
            };
            out.push(Match {
                text,
                start: offsets[start],
                end: offsets[end],
            });
            if limit > 0 && out.len() == limit as usize {
                break;
            }
            // an empty match must advance the scan by one code point
            from = if end == start { end + 1 } else { end };
        }
        out
    }

    /// The substrings around matches. A positive `limit` yields at most
    /// `limit` pieces; zero yields none; negative splits everywhere.
    pub fn split<'t>(&self, text: &'t str, limit: isize) -> Vec<&'t str> {
        if limit == 0 {
            return Vec::new();
        }
        let matches = self.find_all(text, if limit < 0 { -1 } else { limit - 1 });
        let mut out = Vec::with_capacity(matches.len() + 1);
        let mut last = 0;
        for m in &matches {
            out.push(&text[last..m.start()]);
            last = m.end();
        }
        out.push(&text[last..]);
        out
    }

    // ─── Replacing ──────────────────────────────────────────────────────────

    /// Replace every match with `template`, expanding `$0`–`$99` to the
    /// corresponding capture and `$$` to a literal `$`. A `$` followed by
    /// anything else is emitted as-is.
    pub fn replace_all(&self, text: &str, template: &str) -> String {
        self.replace_matches(text, |caps, out| expand(template, caps, out))
    }

    /// Replace every match with `replacement`, verbatim.
    pub fn replace_all_literal(&self, text: &str, replacement: &str) -> String {
        self.replace_matches(text, |_, out| out.push_str(replacement))
    }

    fn replace_matches(
        &self,
        text: &str,
        mut write: impl FnMut(&Captures<'_, '_>, &mut String),
    ) -> String {
        let chars: Vec<char> = text.chars().collect();
        let offsets = byte_offsets(text);
        let mut out = String::with_capacity(text.len());
        let mut from = 0;
        let mut copied = 0; // byte offset copied so far
        while from <= chars.len() {
            let slots = match self.search(&chars, from) {
                Some(slots) => slots,
                None => break,
            };
            let (start, end) = match group_span(&slots, 0) {
                Some(span) => span,
                None => break,
            };
            out.push_str(&text[copied..offsets[start]]);
            let caps = Captures::from_slots(self, text, &slots, &offsets);
            write(&caps, &mut out);
            copied = offsets[end];
            from = if end == start { end + 1 } else { end };
        }
        out.push_str(&text[copied..]);
        out
    }

    /// Run the matcher at successive start positions; first hit wins.
    fn search(&self, chars: &[char], from: usize) -> Option<Vec<Option<usize>>> {
        let mut matcher = Matcher::new(&self.prog, chars);
        for start in from..=chars.len() {
            if matcher.match_at(start) {
                return Some(matcher.slots().to_vec());
            }
        }
        None
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// A single match: a located slice of the searched text. Offsets are in
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    /// Byte offset of the start of the match.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the end of the match.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The matched text.
    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Capture groups of a single match. Group 0 is the whole match; groups
/// the match never traversed are `None`.
pub struct Captures<'r, 't> {
    re: &'r Regex,
    text: &'t str,
    spans: Vec<Option<(usize, usize)>>,
}

impl<'r, 't> Captures<'r, 't> {
    fn from_slots(
        re: &'r Regex,
        text: &'t str,
        slots: &[Option<usize>],
        offsets: &[usize],
    ) -> Self {
        let spans = (0..slots.len() / 2)
            .map(|i| match (slots[2 * i], slots[2 * i + 1]) {
                (Some(begin), Some(end)) => Some((offsets[begin], offsets[end])),
                _ => None,
            })
            .collect();
        Captures { re, text, spans }
    }

    /// A group by index; 0 is the whole match.
    pub fn get(&self, index: usize) -> Option<Match<'t>> {
        let (start, end) = (*self.spans.get(index)?)?;
        Some(Match {
            text: self.text,
            start,
            end,
        })
    }

    /// A group by its `(?P<name>…)` name.
    pub fn name(&self, name: &str) -> Option<Match<'t>> {
        if name.is_empty() {
            return None;
        }
        let index = self.re.capture_names().iter().position(|n| n == name)?;
        self.get(index)
    }

    /// Number of groups, including the whole match.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Escape every metacharacter in `text` so the result matches it
/// literally.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '.' | '*' | '+' | '?' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '\\' | '^' | '$'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Whole-match or group span from a slot array, in code-point indices.
fn group_span(slots: &[Option<usize>], group: usize) -> Option<(usize, usize)> {
    match (slots.get(2 * group)?, slots.get(2 * group + 1)?) {
        (Some(begin), Some(end)) => Some((*begin, *end)),
        _ => None,
    }
}

/// Byte offset of every code point in `text`, plus the end offset.
fn byte_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());
    offsets
}

/// Expand `$`-references in a replacement template.
fn expand(template: &str, caps: &Captures<'_, '_>, out: &mut String) {
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some(d) if d.is_ascii_digit() => {
                // up to two digits: $0..$99
                let digits: String = chars
                    .peeking_take_while(|c| c.is_ascii_digit())
                    .take(2)
                    .collect();
                let index = digits
                    .chars()
                    .fold(0, |n, d| n * 10 + (d as usize - '0' as usize));
                if let Some(m) = caps.get(index) {
                    out.push_str(m.as_str());
                }
            }
            _ => out.push('$'),
        }
    }
}
