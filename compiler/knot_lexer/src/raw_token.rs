//! `logos` scanner for everything on a line that is not layout.
//!
//! Indentation, newlines, comments and string literals need context the
//! scanner does not have (bracket depth, line starts, multi-line strings),
//! so [`Lexer`](crate::Lexer) handles those itself and only asks this
//! scanner for names, numbers and operators.

use knot_ir::TokenKind;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\x0C]+")]
pub(crate) enum RawToken {
    #[regex(r"[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*")]
    Name,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[oO][0-7_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?[jJ]?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?[jJ]?")]
    Number,

    #[token("(")]
    LPar,
    #[token(")")]
    RPar,
    #[token("[")]
    LSqb,
    #[token("]")]
    RSqb,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("|")]
    VBar,
    #[token("&")]
    Amper,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Equal,
    #[token(".")]
    Dot,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEqual,
    #[token("!=")]
    #[token("<>")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("~")]
    Tilde,
    #[token("^")]
    Circumflex,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("**")]
    DoubleStar,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("//")]
    DoubleSlash,
    #[token("@")]
    At,
    #[token("->")]
    RArrow,
    #[token("...")]
    Ellipsis,
}

impl RawToken {
    pub(crate) fn kind(self) -> TokenKind {
        match self {
            RawToken::Name => TokenKind::Name,
            RawToken::Number => TokenKind::Number,
            RawToken::LPar => TokenKind::LPar,
            RawToken::RPar => TokenKind::RPar,
            RawToken::LSqb => TokenKind::LSqb,
            RawToken::RSqb => TokenKind::RSqb,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::VBar => TokenKind::VBar,
            RawToken::Amper => TokenKind::Amper,
            RawToken::Less => TokenKind::Less,
            RawToken::Greater => TokenKind::Greater,
            RawToken::Equal => TokenKind::Equal,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Percent => TokenKind::Percent,
            RawToken::EqEqual => TokenKind::EqEqual,
            RawToken::NotEqual => TokenKind::NotEqual,
            RawToken::LessEqual => TokenKind::LessEqual,
            RawToken::GreaterEqual => TokenKind::GreaterEqual,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Circumflex => TokenKind::Circumflex,
            RawToken::LeftShift => TokenKind::LeftShift,
            RawToken::RightShift => TokenKind::RightShift,
            RawToken::DoubleStar => TokenKind::DoubleStar,
            RawToken::PlusEqual => TokenKind::PlusEqual,
            RawToken::MinEqual => TokenKind::MinEqual,
            RawToken::StarEqual => TokenKind::StarEqual,
            RawToken::SlashEqual => TokenKind::SlashEqual,
            RawToken::DoubleSlash => TokenKind::DoubleSlash,
            RawToken::At => TokenKind::At,
            RawToken::RArrow => TokenKind::RArrow,
            RawToken::Ellipsis => TokenKind::Ellipsis,
        }
    }

    /// Change in bracket nesting caused by this token.
    pub(crate) fn nesting(self) -> isize {
        match self {
            RawToken::LPar | RawToken::LSqb | RawToken::LBrace => 1,
            RawToken::RPar | RawToken::RSqb | RawToken::RBrace => -1,
            _ => 0,
        }
    }
}

/// Scan one raw token at the start of `input`.
///
/// Returns the token (or `None` for a character no rule matches) and the
/// byte range it covers, relative to `input`. `None` overall means `input`
/// held only skippable whitespace.
pub(crate) fn scan(input: &str) -> Option<(Option<RawToken>, std::ops::Range<usize>)> {
    let mut lex = RawToken::lexer(input);
    let result = lex.next()?;
    Some((result.ok(), lex.span()))
}
