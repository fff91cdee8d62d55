use std::fmt;

/// A source position: 1-based line and column of a token's first character.
///
/// Every AST node and every diagnostic carries one of these, so error
/// reporting stays reproducible across phases.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Pos {
        debug_assert!(line >= 1 && column >= 1);
        Pos { line, column }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({self})")
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The token's text. For string literals this is the *decoded* content
    /// (escape sequences already resolved); for everything else it is the
    /// source text verbatim. The `Eof` literal is empty.
    pub literal: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, pos: Pos) -> Token {
        Token {
            kind,
            literal: literal.into(),
            pos,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {:?}, {})", self.kind, self.literal, self.pos)
    }
}

// This is not the most compact way of representing a token kind, but it
// suffices for this simple compiler implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// An unrecognized character, or an unterminated block comment. The
    /// token's literal carries the offending text or a diagnostic message.
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,

    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Package,
    Func,
    Return,
    If,
    Else,
    For,
    Var,
    IntType,
    StringType,
    BoolType,
    True,
    False,
}

impl TokenKind {
    /// Whether a token of this kind can legally end a statement. A newline
    /// after such a token triggers automatic semicolon insertion.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::String
                | TokenKind::Int
                | TokenKind::RParen
                | TokenKind::RBrace
        )
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "package" => TokenKind::Package,
    "func" => TokenKind::Func,
    "return" => TokenKind::Return,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "for" => TokenKind::For,
    "var" => TokenKind::Var,
    "int" => TokenKind::IntType,
    "string" => TokenKind::StringType,
    "bool" => TokenKind::BoolType,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};
