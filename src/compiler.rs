//! Compiles the pattern AST into a flat instruction program.
//!
//! Instructions are appended to an arena vector; branch targets that are
//! not known yet are patched in once the code they point at exists.

use crate::ast::{Ast, BoundaryKind, RepeatPolicy};
use crate::class::CharClass;
use crate::program::{Instr, Op, Program, SaveKind};

/// Compile a parsed pattern into an executable [`Program`].
///
/// Compilation is total: every well-formed AST lowers to a program.
pub fn compile(ast: &Ast) -> Program {
    let mut compiler = Compiler {
        instrs: Vec::with_capacity(16),
        num_captures: 0,
        capture_names: vec![String::new()],
    };
    compiler.compile_node(ast);
    compiler.emit(Op::Match);
    Program {
        instrs: compiler.instrs,
        num_captures: compiler.num_captures,
        capture_names: compiler.capture_names,
    }
}

struct Compiler {
    instrs: Vec<Instr>,
    num_captures: usize,
    capture_names: Vec<String>,
}

impl Compiler {
    /// Append an instruction falling through to the one after it.
    /// Returns its PC.
    fn emit(&mut self, op: Op) -> usize {
        let pc = self.instrs.len();
        self.instrs.push(Instr { op, next: pc + 1 });
        pc
    }

    /// PC the next emitted instruction will get.
    fn pc(&self) -> usize {
        self.instrs.len()
    }

    fn patch_next(&mut self, pc: usize, target: usize) {
        self.instrs[pc].next = target;
    }

    fn patch_alt(&mut self, pc: usize, target: usize) {
        if let Op::Split { alt, .. } = &mut self.instrs[pc].op {
            *alt = target;
        }
    }

    fn split(&mut self, policy: RepeatPolicy) -> usize {
        self.emit(Op::Split {
            alt: 0, // patched once the skip target exists
            greedy: policy != RepeatPolicy::Lazy,
            possessive: policy == RepeatPolicy::Possessive,
        })
    }

    fn compile_node(&mut self, node: &Ast) {
        match node {
            Ast::Literal { ch, fold } => {
                let ch = if *fold { ch.to_ascii_lowercase() } else { *ch };
                self.emit(Op::Char { ch, fold: *fold });
            }
            Ast::Any { dot_matches_nl } => {
                self.emit(Op::Any {
                    dot_matches_nl: *dot_matches_nl,
                });
            }
            Ast::Class(spec) => {
                self.emit(Op::Class(CharClass {
                    kind: spec.kind.clone(),
                    negate: spec.negate,
                    fold: spec.fold,
                }));
            }
            Ast::Concat(nodes) => {
                for child in nodes {
                    self.compile_node(child);
                }
            }
            Ast::Alt(left, right) => self.compile_alt(left, right),
            Ast::Repeat {
                node,
                min,
                max,
                policy,
            } => self.compile_repeat(node, *min, *max, *policy),
            Ast::Capture { index, name, node } => {
                self.compile_capture(*index, name.as_deref(), node)
            }
            Ast::Group(node) => self.compile_node(node),
            Ast::Backref { index, .. } => {
                self.emit(Op::Backref(*index));
            }
            Ast::Boundary(kind) => {
                self.emit(match kind {
                    BoundaryKind::BeginLine { multiline } => Op::BeginLine {
                        multiline: *multiline,
                    },
                    BoundaryKind::EndLine => Op::EndLine,
                    BoundaryKind::BeginText => Op::BeginText,
                    BoundaryKind::EndText => Op::EndText,
                    BoundaryKind::WordBoundary => Op::WordBoundary,
                    BoundaryKind::NonWordBoundary => Op::NonWordBoundary,
                });
            }
        }
    }

    /// `L|R`:
    /// ```text
    ///     split →left, →right
    /// left:  … ; jump →end
    /// right: …
    /// end:
    /// ```
    fn compile_alt(&mut self, left: &Ast, right: &Ast) {
        let split = self.split(RepeatPolicy::Greedy);
        self.compile_node(left);
        let jump = self.emit(Op::Jump);
        let right_start = self.pc();
        self.compile_node(right);
        let end = self.pc();
        self.patch_alt(split, right_start);
        self.patch_next(jump, end);
    }

    fn compile_repeat(&mut self, node: &Ast, min: usize, max: Option<usize>, policy: RepeatPolicy) {
        match (min, max) {
            (0, None) => self.compile_star(node, policy),
            (1, None) => self.compile_plus(node, policy),
            (0, Some(1)) => self.compile_quest(node, policy),
            (n, None) => {
                // {n,}: n mandatory copies, then a star
                for _ in 0..n {
                    self.compile_node(node);
                }
                self.compile_star(node, policy);
            }
            (n, Some(m)) => {
                for _ in 0..n {
                    self.compile_node(node);
                }
                // m−n optional copies; every skip edge goes to the tail
                let mut splits = Vec::with_capacity(m - n);
                for _ in n..m {
                    splits.push(self.split(policy));
                    self.compile_node(node);
                }
                let tail = self.pc();
                for split in splits {
                    self.patch_alt(split, tail);
                }
            }
        }
    }

    /// `x*`:
    /// ```text
    /// L:  split →body, →after
    ///     …body… ; jump →L
    /// after:
    /// ```
    fn compile_star(&mut self, node: &Ast, policy: RepeatPolicy) {
        let split = self.split(policy);
        self.compile_node(node);
        let jump = self.emit(Op::Jump);
        self.patch_next(jump, split);
        let after = self.pc();
        self.patch_alt(split, after);
    }

    /// `x+`:
    /// ```text
    /// body: …
    ///       split →body, →after
    /// after:
    /// ```
    fn compile_plus(&mut self, node: &Ast, policy: RepeatPolicy) {
        let body = self.pc();
        self.compile_node(node);
        let split = self.split(policy);
        self.patch_next(split, body);
        let after = self.pc();
        self.patch_alt(split, after);
    }

    /// `x?`:
    /// ```text
    ///     split →body, →after
    /// body: …
    /// after:
    /// ```
    fn compile_quest(&mut self, node: &Ast, policy: RepeatPolicy) {
        let split = self.split(policy);
        self.compile_node(node);
        let after = self.pc();
        self.patch_alt(split, after);
    }

    fn compile_capture(&mut self, index: usize, name: Option<&str>, node: &Ast) {
        self.emit(Op::Save {
            slot: 2 * index,
            kind: SaveKind::Begin,
        });
        self.compile_node(node);
        self.emit(Op::Save {
            slot: 2 * index + 1,
            kind: SaveKind::End,
        });
        if index > self.num_captures {
            self.num_captures = index;
        }
        while self.capture_names.len() <= index {
            self.capture_names.push(String::new());
        }
        if let Some(name) = name {
            self.capture_names[index] = name.to_string();
        }
    }
}
