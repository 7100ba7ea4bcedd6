//! Token kinds and owned tokens.
//!
//! `TokenKind` is the terminal alphabet shared by the lexer, the grammar
//! tables and the driver. A [`Token`] is the owned form handed to an
//! automaton: once the driver builds one, its text belongs to whoever
//! receives it.

use std::fmt;

/// Terminal token kinds.
///
/// Keywords are not listed here: they arrive as [`TokenKind::Name`] and the
/// grammar automaton classifies them by text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum TokenKind {
    EndMarker,
    Name,
    Number,
    String,
    Newline,
    Indent,
    Dedent,
    LPar,
    RPar,
    LSqb,
    RSqb,
    Colon,
    Comma,
    Semi,
    Plus,
    Minus,
    Star,
    Slash,
    VBar,
    Amper,
    Less,
    Greater,
    Equal,
    Dot,
    Percent,
    LBrace,
    RBrace,
    EqEqual,
    /// `!=`, or `<>` under the `barry_as_FLUFL` future.
    NotEqual,
    LessEqual,
    GreaterEqual,
    Tilde,
    Circumflex,
    LeftShift,
    RightShift,
    DoubleStar,
    PlusEqual,
    MinEqual,
    StarEqual,
    SlashEqual,
    DoubleSlash,
    At,
    RArrow,
    Ellipsis,
    Async,
    Await,
    /// `# type: ignore` pragma. Never reaches the grammar automaton.
    TypeIgnore,
    ErrorToken,
}

impl TokenKind {
    /// Every kind, in declaration order.
    pub const ALL: [TokenKind; 48] = [
        TokenKind::EndMarker,
        TokenKind::Name,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Newline,
        TokenKind::Indent,
        TokenKind::Dedent,
        TokenKind::LPar,
        TokenKind::RPar,
        TokenKind::LSqb,
        TokenKind::RSqb,
        TokenKind::Colon,
        TokenKind::Comma,
        TokenKind::Semi,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::VBar,
        TokenKind::Amper,
        TokenKind::Less,
        TokenKind::Greater,
        TokenKind::Equal,
        TokenKind::Dot,
        TokenKind::Percent,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::EqEqual,
        TokenKind::NotEqual,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
        TokenKind::Tilde,
        TokenKind::Circumflex,
        TokenKind::LeftShift,
        TokenKind::RightShift,
        TokenKind::DoubleStar,
        TokenKind::PlusEqual,
        TokenKind::MinEqual,
        TokenKind::StarEqual,
        TokenKind::SlashEqual,
        TokenKind::DoubleSlash,
        TokenKind::At,
        TokenKind::RArrow,
        TokenKind::Ellipsis,
        TokenKind::Async,
        TokenKind::Await,
        TokenKind::TypeIgnore,
        TokenKind::ErrorToken,
    ];

    /// Upper-case name as written in grammar files (`NAME`, `NEWLINE`, ...).
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::EndMarker => "ENDMARKER",
            TokenKind::Name => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::LPar => "LPAR",
            TokenKind::RPar => "RPAR",
            TokenKind::LSqb => "LSQB",
            TokenKind::RSqb => "RSQB",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Semi => "SEMI",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::VBar => "VBAR",
            TokenKind::Amper => "AMPER",
            TokenKind::Less => "LESS",
            TokenKind::Greater => "GREATER",
            TokenKind::Equal => "EQUAL",
            TokenKind::Dot => "DOT",
            TokenKind::Percent => "PERCENT",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::EqEqual => "EQEQUAL",
            TokenKind::NotEqual => "NOTEQUAL",
            TokenKind::LessEqual => "LESSEQUAL",
            TokenKind::GreaterEqual => "GREATEREQUAL",
            TokenKind::Tilde => "TILDE",
            TokenKind::Circumflex => "CIRCUMFLEX",
            TokenKind::LeftShift => "LEFTSHIFT",
            TokenKind::RightShift => "RIGHTSHIFT",
            TokenKind::DoubleStar => "DOUBLESTAR",
            TokenKind::PlusEqual => "PLUSEQUAL",
            TokenKind::MinEqual => "MINEQUAL",
            TokenKind::StarEqual => "STAREQUAL",
            TokenKind::SlashEqual => "SLASHEQUAL",
            TokenKind::DoubleSlash => "DOUBLESLASH",
            TokenKind::At => "AT",
            TokenKind::RArrow => "RARROW",
            TokenKind::Ellipsis => "ELLIPSIS",
            TokenKind::Async => "ASYNC",
            TokenKind::Await => "AWAIT",
            TokenKind::TypeIgnore => "TYPE_IGNORE",
            TokenKind::ErrorToken => "ERRORTOKEN",
        }
    }

    /// Look up a kind by its grammar-file name.
    pub fn from_name(name: &str) -> Option<TokenKind> {
        TokenKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Canonical spelling of an operator or delimiter kind.
    pub fn operator_text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::LPar => "(",
            TokenKind::RPar => ")",
            TokenKind::LSqb => "[",
            TokenKind::RSqb => "]",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::VBar => "|",
            TokenKind::Amper => "&",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Equal => "=",
            TokenKind::Dot => ".",
            TokenKind::Percent => "%",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::EqEqual => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Tilde => "~",
            TokenKind::Circumflex => "^",
            TokenKind::LeftShift => "<<",
            TokenKind::RightShift => ">>",
            TokenKind::DoubleStar => "**",
            TokenKind::PlusEqual => "+=",
            TokenKind::MinEqual => "-=",
            TokenKind::StarEqual => "*=",
            TokenKind::SlashEqual => "/=",
            TokenKind::DoubleSlash => "//",
            TokenKind::At => "@",
            TokenKind::RArrow => "->",
            TokenKind::Ellipsis => "...",
            _ => return None,
        };
        Some(text)
    }

    /// Map operator text to its kind. `<>` is accepted as [`TokenKind::NotEqual`].
    pub fn from_operator(text: &str) -> Option<TokenKind> {
        if text == "<>" {
            return Some(TokenKind::NotEqual);
        }
        TokenKind::ALL
            .into_iter()
            .find(|kind| kind.operator_text() == Some(text))
    }

    /// Human-readable form for diagnostics: quoted spelling for operators,
    /// the upper-case name otherwise.
    pub fn display_name(self) -> String {
        match self.operator_text() {
            Some(text) => format!("'{text}'"),
            None => self.name().to_string(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An owned token as forwarded to the grammar automaton.
///
/// `col` is the 0-based byte offset from the start of the token's line, or
/// `None` when the lexer could not place the token (synthesized dedents and
/// end markers).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub col: Option<u32>,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, col: Option<u32>) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}
