//! Pushdown automaton over a [`Grammar`].
//!
//! Each stack frame is one rule in progress: which DFA, which state, and
//! the node being built for it. A finished frame's node is moved into its
//! parent when the frame pops; the last frame to pop is the tree.

use knot_ir::{Automaton, FutureFlags, Node, Reject, Step, Symbol, Token, TokenKind};
use tracing::{trace, warn};

use crate::grammar::{Action, Dfa, Grammar};

/// Nesting depth at which the parser gives up with an out-of-memory
/// rejection.
pub const MAX_STACK_DEPTH: usize = 1500;

struct Frame<'g> {
    dfa: &'g Dfa,
    state: u16,
    node: Node,
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    stack: Vec<Frame<'g>>,
    future: FutureFlags,
    max_depth: usize,
    started: bool,
}

impl<'g> Parser<'g> {
    /// Start parsing `start`. Returns `None` if the grammar has no rule
    /// for it.
    pub fn new(grammar: &'g Grammar, start: Symbol) -> Option<Self> {
        let dfa = grammar.dfa(start)?;
        Some(Parser {
            grammar,
            stack: vec![Frame {
                dfa,
                state: 0,
                node: Node::branch(start, 0, None),
            }],
            future: FutureFlags::empty(),
            max_depth: MAX_STACK_DEPTH,
            started: false,
        })
    }

    /// Cap the number of rules in progress; deeper nesting is rejected as
    /// out of memory.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Rules currently in progress.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, symbol: Symbol, token: &Token) -> Result<(), Reject> {
        if self.stack.len() >= self.max_depth {
            warn!(depth = self.stack.len(), "parser stack overflow");
            return Err(Reject::OutOfMemory);
        }
        let dfa = self
            .grammar
            .dfa(symbol)
            .ok_or(Reject::Syntax { expected: None })?;
        self.stack.try_reserve(1).map_err(|_| Reject::OutOfMemory)?;
        trace!(rule = %symbol, line = token.line, "push");
        self.stack.push(Frame {
            dfa,
            state: 0,
            node: Node::branch(symbol, token.line, token.col),
        });
        Ok(())
    }

    /// Pop the top frame into its parent. Returns the tree when the stack
    /// empties.
    fn pop(&mut self) -> Result<Option<Node>, Reject> {
        let Some(frame) = self.stack.pop() else {
            return Ok(None);
        };
        trace!(rule = %frame.dfa.symbol, "pop");
        if frame.dfa.symbol == Symbol::ImportFrom && imports_barry_as_flufl(&frame.node) {
            self.future |= FutureFlags::BARRY_AS_FLUFL;
        }
        match self.stack.last_mut() {
            Some(parent) => {
                parent
                    .node
                    .try_push_child(frame.node)
                    .map_err(|_| Reject::OutOfMemory)?;
                Ok(None)
            }
            None => Ok(Some(frame.node)),
        }
    }
}

impl Automaton for Parser<'_> {
    fn add_token(&mut self, token: Token) -> Result<Step, Reject> {
        let Some(label) = self.grammar.classify(token.kind, &token.text) else {
            return Err(Reject::Syntax { expected: None });
        };
        if !self.started {
            self.started = true;
            if let Some(root) = self.stack.first_mut() {
                root.node.line = token.line;
                root.node.col = token.col;
            }
        }

        loop {
            let Some(top) = self.stack.last_mut() else {
                return Err(Reject::Syntax { expected: None });
            };
            let dfa: &Dfa = top.dfa;
            let Some(state) = dfa.state(top.state) else {
                return Err(Reject::Syntax { expected: None });
            };
            match state.action(label) {
                Some(Action::Push { symbol, next }) => {
                    top.state = next;
                    self.push(symbol, &token)?;
                }
                Some(Action::Shift(next)) => {
                    top.state = next;
                    top.node
                        .try_push_child(Node::leaf(token))
                        .map_err(|_| Reject::OutOfMemory)?;
                    return self.unwind_finished();
                }
                None if state.accepting => {
                    if self.pop()?.is_some() {
                        // The start rule finished but the token is left over.
                        return Err(Reject::Syntax { expected: None });
                    }
                }
                None => {
                    let expected = self.grammar.single_expected(state);
                    trace!(kind = %token.kind, ?expected, "reject");
                    return Err(Reject::Syntax { expected });
                }
            }
        }
    }

    fn future_flags(&self) -> FutureFlags {
        self.future
    }

    fn set_future_flags(&mut self, flags: FutureFlags) {
        self.future = flags;
    }
}

impl Parser<'_> {
    /// After a shift, pop every rule that cannot go any further.
    fn unwind_finished(&mut self) -> Result<Step, Reject> {
        loop {
            let finished = self
                .stack
                .last()
                .and_then(|top| top.dfa.state(top.state))
                .is_some_and(|state| state.is_final());
            if !finished {
                return Ok(Step::Continue);
            }
            if let Some(tree) = self.pop()? {
                return Ok(Step::Accept(tree));
            }
        }
    }
}

/// Whether an `import_from` node reads `from __future__ import ...` and
/// names `barry_as_FLUFL` among the imports.
fn imports_barry_as_flufl(node: &Node) -> bool {
    let from_future = node.child(1).is_some_and(|module| {
        module.is_symbol(Symbol::DottedName)
            && module.children.len() == 1
            && module.child(0).and_then(Node::text) == Some("__future__")
    });
    if !from_future {
        return false;
    }
    let names = node
        .children
        .iter()
        .rev()
        .find(|child| child.is_symbol(Symbol::ImportAsNames));
    names.is_some_and(|names| {
        names
            .children
            .iter()
            .filter(|child| child.is_symbol(Symbol::ImportAsName))
            .filter_map(|child| child.child(0))
            .any(|name| name.is_token(TokenKind::Name) && name.text() == Some("barry_as_FLUFL"))
    })
}
