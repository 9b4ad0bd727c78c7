//! Backtracking interpreter for compiled programs.
//!
//! Execution is depth-first: a non-possessive `Split` registers the branch
//! it does not take on an explicit stack, together with a snapshot of the
//! input position and the capture slots, and any failure pops the stack
//! and resumes there.

use crate::class::is_word_char;
use crate::program::{Op, Program};

/// Maximum number of interpreter steps per match attempt. Pathological
/// patterns can go exponential; the budget turns them into a plain
/// failure.
const MAX_STEPS: usize = 1_000_000;

/// One entry on the backtrack stack: enough state to resume execution
/// along an alternative branch.
struct Snapshot {
    pc: usize,
    pos: usize,
    slots: Vec<Option<usize>>,
}

/// Match state for one attempt over a code-point view of the input.
///
/// A matcher borrows its program read-only and owns the program counter,
/// input position, capture slots, backtrack stack and step counter. It can
/// be reset and reused across start positions.
pub struct Matcher<'p, 't> {
    prog: &'p Program,
    input: &'t [char],
    pos: usize,
    slots: Vec<Option<usize>>,
    stack: Vec<Snapshot>,
    steps: usize,
}

impl<'p, 't> Matcher<'p, 't> {
    pub fn new(prog: &'p Program, input: &'t [char]) -> Self {
        Matcher {
            prog,
            input,
            pos: 0,
            slots: vec![None; prog.num_slots()],
            stack: Vec::new(),
            steps: 0,
        }
    }

    /// Attempt a match beginning exactly at `start` (a code-point index).
    /// On success the slot array holds the final capture state, with the
    /// whole-match span in slots 0 and 1.
    pub fn match_at(&mut self, start: usize) -> bool {
        self.pos = start;
        self.slots.fill(None);
        self.stack.clear();
        self.steps = 0;
        self.slots[0] = Some(start);
        if self.run(0, None, None) {
            self.slots[1] = Some(self.pos);
            return true;
        }
        false
    }

    /// Capture slots of the last successful [`Matcher::match_at`].
    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Run the program from `pc`. Reaching the `stop` PC counts as
    /// success; that is how a committed possessive sub-run terminates.
    /// `atomic` names the possessive split currently being run as a
    /// sub-match, which behaves as an ordinary split inside it.
    fn run(&mut self, mut pc: usize, stop: Option<usize>, atomic: Option<usize>) -> bool {
        loop {
            self.steps += 1;
            if self.steps > MAX_STEPS {
                return false;
            }
            if stop == Some(pc) {
                return true;
            }

            let prog = self.prog;
            let instr = &prog.instrs[pc];
            let next = match &instr.op {
                Op::Match => return true,

                Op::Char { ch, fold } => match self.current() {
                    Some(c) if char_eq(c, *ch, *fold) => {
                        self.pos += 1;
                        Some(instr.next)
                    }
                    _ => None,
                },

                Op::Any { dot_matches_nl } => match self.current() {
                    Some(c) if *dot_matches_nl || (c != '\n' && c != '\r') => {
                        self.pos += 1;
                        Some(instr.next)
                    }
                    _ => None,
                },

                Op::Class(class) => match self.current() {
                    Some(c) if class.matches(c) => {
                        self.pos += 1;
                        Some(instr.next)
                    }
                    _ => None,
                },

                Op::Jump => Some(instr.next),

                Op::Split {
                    alt,
                    greedy,
                    possessive,
                } => {
                    if *possessive && atomic != Some(pc) {
                        // Run the whole construct as a sub-match with its
                        // own stack. Once the construct commits, the
                        // branch points its body registered are gone, so
                        // later failures cannot reopen it.
                        let join = *alt;
                        let outer = std::mem::take(&mut self.stack);
                        let ok = self.run(pc, Some(join), Some(pc));
                        self.stack = outer;
                        if ok { Some(join) } else { None }
                    } else {
                        let (taken, registered) = if *greedy {
                            (instr.next, *alt)
                        } else {
                            (*alt, instr.next)
                        };
                        self.stack.push(Snapshot {
                            pc: registered,
                            pos: self.pos,
                            slots: self.slots.clone(),
                        });
                        Some(taken)
                    }
                }

                Op::Save { slot, .. } => {
                    self.slots[*slot] = Some(self.pos);
                    Some(instr.next)
                }

                Op::Backref(group) => self.match_backref(*group, instr.next),

                Op::WordBoundary => {
                    if self.at_word_boundary() {
                        Some(instr.next)
                    } else {
                        None
                    }
                }

                Op::NonWordBoundary => {
                    if self.at_word_boundary() {
                        None
                    } else {
                        Some(instr.next)
                    }
                }

                Op::BeginLine { multiline } => {
                    if self.pos == 0
                        || *multiline
                        || matches!(self.input[self.pos - 1], '\n' | '\r')
                    {
                        Some(instr.next)
                    } else {
                        None
                    }
                }

                Op::EndLine => {
                    if self.pos == self.input.len()
                        || matches!(self.input[self.pos], '\n' | '\r')
                    {
                        Some(instr.next)
                    } else {
                        None
                    }
                }

                Op::BeginText => {
                    if self.pos == 0 {
                        Some(instr.next)
                    } else {
                        None
                    }
                }

                Op::EndText => {
                    if self.pos == self.input.len() {
                        Some(instr.next)
                    } else {
                        None
                    }
                }
            };

            match next {
                Some(target) => pc = target,
                // failure: resume at the most recent branch point, or give
                // up when there is none
                None => match self.stack.pop() {
                    Some(snapshot) => {
                        pc = snapshot.pc;
                        self.pos = snapshot.pos;
                        self.slots = snapshot.slots;
                    }
                    None => return false,
                },
            }
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Compare the input at the current position against the text the
    /// group captured. An unset group fails the comparison.
    fn match_backref(&mut self, group: usize, next: usize) -> Option<usize> {
        let begin_slot = 2 * group;
        let end_slot = begin_slot + 1;
        if end_slot >= self.slots.len() {
            return None;
        }
        let (begin, end) = match (self.slots[begin_slot], self.slots[end_slot]) {
            (Some(begin), Some(end)) => (begin, end),
            _ => return None,
        };
        let len = end - begin;
        if self.pos + len > self.input.len() {
            return None;
        }
        if self.input[begin..end] != self.input[self.pos..self.pos + len] {
            return None;
        }
        self.pos += len;
        Some(next)
    }

    /// Exactly one neighbour of the current position is a word character;
    /// positions beyond the text count as non-word.
    fn at_word_boundary(&self) -> bool {
        let left = self.pos > 0 && is_word_char(self.input[self.pos - 1]);
        let right = self.pos < self.input.len() && is_word_char(self.input[self.pos]);
        left != right
    }
}

fn char_eq(input: char, expected: char, fold: bool) -> bool {
    if fold {
        input.to_ascii_lowercase() == expected
    } else {
        input == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Flags;
    use crate::compiler::compile;
    use crate::parser::parse;

    fn program(pattern: &str) -> Program {
        compile(&parse(pattern, Flags::default()).expect("parse should succeed"))
    }

    /// Leftmost match as a (start, end) code-point span.
    fn search(pattern: &str, input: &str) -> Option<(usize, usize)> {
        let prog = program(pattern);
        let chars: Vec<char> = input.chars().collect();
        let mut matcher = Matcher::new(&prog, &chars);
        for start in 0..=chars.len() {
            if matcher.match_at(start) {
                let slots = matcher.slots();
                return Some((slots[0].unwrap(), slots[1].unwrap()));
            }
        }
        None
    }

    fn matches(pattern: &str, input: &str) -> bool {
        search(pattern, input).is_some()
    }

    /// Slot array of the leftmost match.
    fn search_slots(pattern: &str, input: &str) -> Option<Vec<Option<usize>>> {
        let prog = program(pattern);
        let chars: Vec<char> = input.chars().collect();
        let mut matcher = Matcher::new(&prog, &chars);
        for start in 0..=chars.len() {
            if matcher.match_at(start) {
                return Some(matcher.slots().to_vec());
            }
        }
        None
    }

    // --- Literals and dot ---

    #[test]
    fn literal_sequences() {
        assert!(matches("abc", "abc"));
        assert!(matches("abc", "xxabcyy"));
        assert!(!matches("abc", "ab"));
        assert!(!matches("abc", "axc"));
    }

    #[test]
    fn dot_skips_newlines() {
        assert!(matches("a.c", "abc"));
        assert!(!matches("a.c", "a\nc"));
        assert!(!matches("a.c", "a\rc"));
        assert!(matches("(?s)a.c", "a\nc"));
    }

    #[test]
    fn leftmost_match_wins() {
        assert_eq!(search("a.", "xayaz"), Some((1, 3)));
    }

    // --- Quantifiers ---

    #[test]
    fn greedy_star_backs_off() {
        assert_eq!(search("a.*c", "xxabyczy"), Some((2, 6)));
        assert!(matches("a.*c", "ac"));
        assert!(!matches("a.+c", "ac"));
    }

    #[test]
    fn lazy_quantifier_takes_minimum() {
        assert_eq!(search("a+?", "aaa"), Some((0, 1)));
        assert_eq!(search("a+", "aaa"), Some((0, 3)));
        assert_eq!(search("a.*?c", "abcbc"), Some((0, 3)));
    }

    #[test]
    fn bounded_repeat() {
        assert!(matches("a{2,3}", "aa"));
        assert!(!matches("^a{2,3}$", "a"));
        assert!(!matches("^a{2,3}$", "aaaa"));
        assert_eq!(search("a{2,3}", "aaaa"), Some((0, 3)));
    }

    #[test]
    fn lazy_bounded_repeat_takes_minimum() {
        assert_eq!(search("a{2,3}?", "aaaa"), Some((0, 2)));
    }

    // --- Possessive quantifiers ---

    #[test]
    fn possessive_plus_matches_when_no_giveback_needed() {
        assert_eq!(search("a++b", "aaab"), Some((0, 4)));
        assert_eq!(search("a++b", "aaabc"), Some((0, 4)));
        assert_eq!(search("a+b", "aaabc"), Some((0, 4)));
    }

    #[test]
    fn possessive_refuses_to_give_back() {
        // a++ eats every a, so the trailing a can never match
        assert!(matches("a+a", "aaa"));
        assert!(!matches("a++a", "aaa"));
        assert!(matches("a*ab", "aab"));
        assert!(!matches("a*+ab", "aab"));
        assert!(matches("a?a", "a"));
        assert!(!matches("a?+a", "a"));
    }

    #[test]
    fn possessive_bounded_repeat() {
        assert!(matches("a{1,3}a", "aaa"));
        assert!(!matches("^a{1,3}+a", "aaa"));
    }

    #[test]
    fn possessive_interior_backtracking_still_works() {
        // within one iteration the body may still choose alternatives
        assert!(matches("(?:ab|a)*+c", "abac"));
        // but a committed iteration is never re-opened
        assert!(matches("(?:ab|a)*b", "abab"));
        assert!(!matches("^(?:ab|a)*+b$", "abab"));
    }

    // --- Alternation ---

    #[test]
    fn alternation_prefers_left() {
        assert_eq!(search("ab|a", "ab"), Some((0, 2)));
        assert_eq!(search("a|ab", "ab"), Some((0, 1)));
    }

    // --- Captures ---

    #[test]
    fn capture_slots_record_spans() {
        let slots = search_slots("a(b+)c", "abbbc").unwrap();
        assert_eq!(slots[0], Some(0));
        assert_eq!(slots[1], Some(5));
        assert_eq!(slots[2], Some(1));
        assert_eq!(slots[3], Some(4));
    }

    #[test]
    fn untraversed_group_stays_unset() {
        let slots = search_slots("(a)|(b)", "b").unwrap();
        assert_eq!(slots[2], None);
        assert_eq!(slots[3], None);
        assert_eq!(slots[4], Some(0));
        assert_eq!(slots[5], Some(1));
    }

    #[test]
    fn backtracking_restores_capture_state() {
        // the first alternative captures into group 1, then fails on `c`;
        // the second must not see its leftovers
        let slots = search_slots("(?:(a)c|a(b))", "ab").unwrap();
        assert_eq!(slots[2], None);
        assert_eq!(slots[3], None);
        assert_eq!(slots[4], Some(1));
        assert_eq!(slots[5], Some(2));
    }

    #[test]
    fn group_spans_nest_inside_whole_match() {
        let slots = search_slots("x((a)(b))y", "xaby").unwrap();
        let whole = (slots[0].unwrap(), slots[1].unwrap());
        for group in 1..=3 {
            let begin = slots[2 * group].unwrap();
            let end = slots[2 * group + 1].unwrap();
            assert!(begin <= end);
            assert!(whole.0 <= begin && end <= whole.1);
        }
    }

    // --- Backreferences ---

    #[test]
    fn backref_matches_captured_text() {
        assert!(matches(r"(a+)b\1", "aabaa"));
        assert!(!matches(r"(a+)b\1", "abba"));
        assert_eq!(search(r"(a+)b\1", "aabaa"), Some((0, 5)));
    }

    #[test]
    fn backref_to_unset_group_fails() {
        assert!(!matches(r"(?:(a)|b)\1", "bb"));
        assert!(matches(r"(?:(a)|b)\1", "aa"));
    }

    #[test]
    fn named_backref_matches() {
        assert!(matches(r"(?P<x>ab)\k<x>", "abab"));
        assert!(!matches(r"(?P<x>ab)\k<x>", "abba"));
    }

    // --- Anchors and boundaries ---

    #[test]
    fn text_anchors() {
        assert!(matches(r"\Aabc\z", "abc"));
        assert!(!matches(r"\Aabc", "xabc"));
        assert!(!matches(r"abc\z", "abcx"));
    }

    #[test]
    fn line_anchors() {
        assert!(matches("^abc", "abc"));
        assert!(!matches("^abc", "xabc"));
        assert!(matches("abc$", "abc"));
        assert!(!matches("abc$", "abcx"));
        // even without m, ^ and $ accept newline neighbours
        assert!(matches("^b", "a\nb"));
        assert!(matches("a$", "a\nb"));
    }

    #[test]
    fn multiline_begin_line() {
        assert!(matches("(?m)^a", "a"));
        assert!(matches("(?m)^a", "\na"));
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(search(r"\bcat\b", "a cat sat"), Some((2, 5)));
        assert!(!matches(r"\bcat\b", "concatenate"));
        assert!(matches(r"\Bcat\B", "concatenate"));
        assert!(matches(r"\bcat", "cat"));
    }

    // --- Case folding ---

    #[test]
    fn folded_literal_comparison() {
        assert!(matches("(?i)abc", "AbC"));
        assert!(!matches("abc", "AbC"));
    }

    #[test]
    fn fold_scope_is_lexical() {
        assert!(matches("(?i:a)(?-i:b)", "Ab"));
        assert!(!matches("(?i:a)(?-i:b)", "AB"));
    }

    #[test]
    fn folded_class() {
        assert!(matches("(?i)[a-z]+", "ABC"));
        assert!(!matches("[a-z]+", "ABC"));
    }

    // --- Empty matches ---

    #[test]
    fn empty_pattern_matches_empty_span() {
        assert_eq!(search("", "abc"), Some((0, 0)));
        assert_eq!(search("x*", "abc"), Some((0, 0)));
    }

    // --- Step budget ---

    #[test]
    fn step_budget_cuts_off_exponential_blowup() {
        // (a+)+c on a long run of a with no c is exponential; the budget
        // turns it into a timely failure
        let input: String = std::iter::repeat('a').take(28).collect();
        assert!(!matches("^(a+)+c", &input));
    }
}
