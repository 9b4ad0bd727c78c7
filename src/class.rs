//! Character class membership tests.

use phf::{Map, phf_map};

use crate::ast::{ClassKind, ClassRange};

/// Runtime form of a character class, carried by a `Class` instruction.
///
/// The compiler builds one from a parsed [`ClassSpec`](crate::ast::ClassSpec),
/// attaching the case-folding state that was active at emission time.
#[derive(Debug, Clone)]
pub struct CharClass {
    pub kind: ClassKind,
    pub negate: bool,
    /// Case-insensitive membership (ASCII folding).
    pub fold: bool,
}

impl CharClass {
    /// Test whether `ch` is a member of the class.
    pub fn matches(&self, ch: char) -> bool {
        let base = self.kind_matches(ch);
        if self.negate { !base } else { base }
    }

    fn kind_matches(&self, ch: char) -> bool {
        match &self.kind {
            ClassKind::Digit => ch.is_ascii_digit(),
            ClassKind::Word => is_word_char(ch),
            ClassKind::Space => ch.is_whitespace(),
            ClassKind::Property(name) => match PROPERTIES.get(name.as_str()) {
                Some(test) => test(ch),
                None => false,
            },
            ClassKind::Ranges(ranges) => ranges.iter().any(|r| self.in_range(r, ch)),
        }
    }

    fn in_range(&self, range: &ClassRange, ch: char) -> bool {
        if range.lo <= ch && ch <= range.hi {
            return true;
        }
        if self.fold {
            let folded = ch.to_ascii_lowercase();
            let lo = range.lo.to_ascii_lowercase();
            let hi = range.hi.to_ascii_lowercase();
            if lo <= folded && folded <= hi {
                return true;
            }
        }
        false
    }
}

/// Supported `\p{…}` property names. Unknown names match nothing, so a
/// negated unknown property matches everything.
static PROPERTIES: Map<&'static str, fn(char) -> bool> = phf_map! {
    "L" => char::is_alphabetic,
    "Lu" => char::is_uppercase,
    "Ll" => char::is_lowercase,
    "N" => char::is_numeric,
};

/// Word character predicate for `\w` and `\b`: `[A-Za-z0-9_]`.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
