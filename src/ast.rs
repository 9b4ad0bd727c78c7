//! AST types for regular expression patterns.

/// A single node in the pattern AST.
///
/// Flag-sensitive nodes carry the flag state that was lexically active
/// when they were parsed, so `(?i:…)` and friends need no scope node.
#[derive(Debug, Clone)]
pub enum Ast {
    /// One literal character. `fold` is set when the literal was parsed
    /// under the `i` flag; it then matches case-insensitively.
    Literal { ch: char, fold: bool },
    /// `.` — any character. Matches newlines only when parsed under `s`.
    Any { dot_matches_nl: bool },
    /// A character class: `[…]`, `\d`, `\w`, `\s`, `\p{…}`.
    Class(ClassSpec),
    /// Concatenation of nodes (implicit in `ab`). May be empty.
    Concat(Vec<Ast>),
    /// Alternation (`a|b`).
    Alt(Box<Ast>, Box<Ast>),
    /// Quantified sub-expression: `*`, `+`, `?`, `{n,m}`.
    Repeat {
        node: Box<Ast>,
        min: usize,
        /// `None` means unbounded.
        max: Option<usize>,
        policy: RepeatPolicy,
    },
    /// Capturing group `(…)` or `(?P<name>…)`. Indices are 1-based in
    /// left-paren order.
    Capture {
        index: usize,
        name: Option<String>,
        node: Box<Ast>,
    },
    /// Non-capturing group `(?:…)`.
    Group(Box<Ast>),
    /// Backreference `\1`..`\9` or `\k<name>`.
    Backref { index: usize, name: Option<String> },
    /// Anchor or zero-width assertion.
    Boundary(BoundaryKind),
}

/// Backtracking policy of a quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// Match as much as possible, giving back on failure.
    Greedy,
    /// Match as little as possible, taking more on failure.
    Lazy,
    /// Match as much as possible, never giving back (`*+`, `++`, `?+`).
    Possessive,
}

/// A parsed character class.
#[derive(Debug, Clone)]
pub struct ClassSpec {
    pub kind: ClassKind,
    /// `[^…]`, `\D`, `\W`, `\S`, `\P{…}`.
    pub negate: bool,
    /// Parsed under the `i` flag; membership is then case-folded.
    pub fold: bool,
}

/// Kind of character class.
#[derive(Debug, Clone)]
pub enum ClassKind {
    /// `\d` — ASCII digits.
    Digit,
    /// `\w` — `[A-Za-z0-9_]`.
    Word,
    /// `\s` — whitespace.
    Space,
    /// `\p{name}` — Unicode property.
    Property(String),
    /// `[…]` — explicit inclusive ranges.
    Ranges(Vec<ClassRange>),
}

/// An inclusive character range inside a custom class. A single character
/// is the degenerate range `lo == hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRange {
    pub lo: char,
    pub hi: char,
}

/// Anchors and zero-width assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// `^` — start of text or just after a newline. Never fails when
    /// parsed under the `m` flag.
    BeginLine { multiline: bool },
    /// `$` — end of text or just before a newline.
    EndLine,
    /// `\A` — start of text only.
    BeginText,
    /// `\z` — end of text only.
    EndText,
    /// `\b` — word boundary.
    WordBoundary,
    /// `\B` — not a word boundary.
    NonWordBoundary,
}

/// Pattern-wide matching flags. Flags passed at compile time seed the
/// parser's lexical flag state, so they OR with flags appearing in the
/// pattern itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `i` — case-insensitive matching (ASCII folding).
    pub case_insensitive: bool,
    /// `m` — multiline mode for `^`.
    pub multiline: bool,
    /// `s` — `.` also matches `\n` and `\r`.
    pub dot_matches_nl: bool,
    /// `U` — quantifiers are lazy by default and `?` makes them greedy.
    pub ungreedy: bool,
}
