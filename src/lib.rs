//! A backtracking regular-expression engine.
//!
//! Patterns are parsed into an AST, compiled to a flat instruction
//! program, and executed by a depth-first backtracking interpreter with
//! an explicit backtrack stack. Capturing groups (numbered and named),
//! backreferences, and greedy/lazy/possessive quantifiers are supported;
//! a step budget bounds pathological patterns.
//!
//! # Pattern syntax
//!
//! | Syntax           | Meaning                                        |
//! |------------------|------------------------------------------------|
//! | `x`              | Literal character                              |
//! | `.`              | Any character except newline (`s`: any)        |
//! | `[a-z]`, `[^…]`  | Character class, negated class                 |
//! | `\d` `\w` `\s`   | Digit, word, whitespace (capitals negate)      |
//! | `\p{L}`          | Unicode property class                         |
//! | `xy`, `x\|y`     | Concatenation, alternation                     |
//! | `x*` `x+` `x?`   | Zero-or-more, one-or-more, zero-or-one         |
//! | `x{n,m}`         | Range repeat (also `{n}` and `{n,}`)           |
//! | `x*?` `x+?` …    | Lazy quantifier                                |
//! | `x*+` `x++` …    | Possessive quantifier                          |
//! | `(x)`            | Capturing group, numbered left to right        |
//! | `(?P<name>x)`    | Named capturing group                          |
//! | `(?:x)`          | Non-capturing group                            |
//! | `(?i)` `(?i:x)`  | Flags `i` `m` `s` `U`; a `-` sublist disables  |
//! | `\1`, `\k<name>` | Backreference by number or name                |
//! | `^` `$`          | Line start, line end                           |
//! | `\A` `\z`        | Text start, text end                           |
//! | `\b` `\B`        | Word boundary, non-boundary                    |
//!
//! # Example
//!
//! ```rust
//! use btregex::Regex;
//!
//! let re = Regex::must_compile(r"(?P<key>\w+)=(?P<value>\d+)");
//! let caps = re.captures("retries=5").unwrap();
//! assert_eq!(caps.name("key").unwrap().as_str(), "retries");
//! assert_eq!(caps.name("value").unwrap().as_str(), "5");
//!
//! let re = Regex::must_compile("a");
//! assert_eq!(re.split("banana", -1), ["b", "n", "n", ""]);
//! ```

mod ast;
mod class;
mod compiler;
mod matcher;
mod parser;
mod program;
mod regexp;

pub use ast::Flags;
pub use parser::{PatternError, PatternErrorKind};
pub use regexp::{Captures, Match, Regex, quote};
