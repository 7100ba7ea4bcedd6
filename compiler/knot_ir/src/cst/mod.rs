//! Concrete syntax tree.
//!
//! A [`Node`] is either a token leaf (kind, text, position) or a nonterminal
//! whose children appear in source order. Nodes own their children and their
//! text outright; there is no sharing between trees.
//!
//! # Shape of a module
//!
//! A `file_input` root always ends with exactly one `ENDMARKER` leaf. The
//! driver hangs `TYPE_IGNORE` annotation nodes off that leaf, in the order the
//! pragmas appeared in the source.

use std::collections::TryReserveError;
use std::fmt::Write as _;

use knot_stack::with_stack_headroom;

use crate::{Symbol, Token, TokenKind};

/// What a node represents.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    Token(TokenKind),
    Symbol(Symbol),
}

impl NodeKind {
    /// Terminals keep their token number; nonterminals start at [`Symbol::OFFSET`].
    pub fn number(self) -> u16 {
        match self {
            NodeKind::Token(kind) => kind as u16,
            NodeKind::Symbol(sym) => sym.number(),
        }
    }
}

/// A concrete syntax tree node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Token text for leaves; the encoding name for `encoding_decl`.
    pub text: Option<String>,
    pub line: u32,
    pub col: Option<u32>,
    pub children: Vec<Node>,
}

impl Node {
    /// Leaf built from a token, taking ownership of its text.
    pub fn leaf(token: Token) -> Self {
        Node {
            kind: NodeKind::Token(token.kind),
            text: Some(token.text),
            line: token.line,
            col: token.col,
            children: Vec::new(),
        }
    }

    /// Empty nonterminal.
    pub fn branch(sym: Symbol, line: u32, col: Option<u32>) -> Self {
        Node {
            kind: NodeKind::Symbol(sym),
            text: None,
            line,
            col,
            children: Vec::new(),
        }
    }

    /// The nonterminal, if this is one.
    #[inline]
    pub fn symbol(&self) -> Option<Symbol> {
        match self.kind {
            NodeKind::Symbol(sym) => Some(sym),
            NodeKind::Token(_) => None,
        }
    }

    /// The token kind, if this is a leaf.
    #[inline]
    pub fn token_kind(&self) -> Option<TokenKind> {
        match self.kind {
            NodeKind::Token(kind) => Some(kind),
            NodeKind::Symbol(_) => None,
        }
    }

    #[inline]
    pub fn is_symbol(&self, sym: Symbol) -> bool {
        self.kind == NodeKind::Symbol(sym)
    }

    #[inline]
    pub fn is_token(&self, kind: TokenKind) -> bool {
        self.kind == NodeKind::Token(kind)
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    #[inline]
    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }

    #[inline]
    pub fn last_child_mut(&mut self) -> Option<&mut Node> {
        self.children.last_mut()
    }

    /// Append a child, reporting allocation failure instead of aborting.
    ///
    /// On failure `child` is dropped and `self` is unchanged.
    pub fn try_push_child(&mut self, child: Node) -> Result<(), TryReserveError> {
        self.children.try_reserve(1)?;
        self.children.push(child);
        Ok(())
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        with_stack_headroom(|| 1 + self.children.iter().map(Node::node_count).sum::<usize>())
    }

    /// Indented, one-node-per-line dump.
    ///
    /// ```text
    /// file_input
    ///   stmt
    ///     ...
    ///   ENDMARKER "" @2
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        with_stack_headroom(|| {
            for _ in 0..depth {
                out.push_str("  ");
            }
            match self.kind {
                NodeKind::Token(kind) => {
                    let _ = write!(out, "{} {:?} @{}", kind.name(), self.text().unwrap_or(""), self.line);
                    if let Some(col) = self.col {
                        let _ = write!(out, ":{col}");
                    }
                }
                NodeKind::Symbol(sym) => {
                    out.push_str(sym.name());
                    if let Some(text) = self.text() {
                        let _ = write!(out, " {text:?}");
                    }
                }
            }
            out.push('\n');
            for child in &self.children {
                child.render_into(out, depth + 1);
            }
        });
    }
}
