use crate::{
    error::Error,
    token::{Pos, Token, TokenKind, KEYWORDS},
};

/// The minigo lexer.
///
/// Produces tokens one at a time through [`Lexer::next_token`]. The sequence
/// is finite and ends with an [`TokenKind::Eof`] token, which is then
/// returned on every subsequent call. The lexer has no knowledge of the
/// grammar; it only recognizes keywords and literal shapes.
pub struct Lexer {
    chars: Vec<char>,
    cursor: usize,
    line: u32,
    column: u32,
    /// Kind of the most recently produced token, consulted by automatic
    /// semicolon insertion when a newline is skipped.
    prev: Option<TokenKind>,
}

impl Lexer {
    pub fn new(src: &str) -> Lexer {
        Lexer {
            chars: src.chars().collect(),
            cursor: 0,
            line: 1,
            column: 1,
            prev: None,
        }
    }

    /// Drains the token sequence into an ordered list, stopping after the
    /// `Eof` token (which is included).
    pub fn scan(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// Scans the next token.
    ///
    /// Unrecognized characters and unterminated block comments are reported
    /// in-band as `Illegal` tokens. Malformed string literals (bad escape,
    /// unterminated) fail with a located lexical error instead: unlike stray
    /// punctuation, string content cannot be recovered meaningfully.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        if let Some(token) = self.skip_trivia() {
            self.prev = Some(token.kind);
            return Ok(token);
        }

        let pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", pos));
        };

        use TokenKind::*;
        let token = match c {
            '=' => self.operator(pos, Assign, '=', Eq),
            '!' => self.operator(pos, Bang, '=', NotEq),
            '<' => self.operator(pos, Lt, '=', LtEq),
            '>' => self.operator(pos, Gt, '=', GtEq),
            '+' => self.single(pos, Plus),
            '-' => self.single(pos, Minus),
            '*' => self.single(pos, Star),
            '/' => self.single(pos, Slash),
            ',' => self.single(pos, Comma),
            ';' => self.single(pos, Semicolon),
            '(' => self.single(pos, LParen),
            ')' => self.single(pos, RParen),
            '{' => self.single(pos, LBrace),
            '}' => self.single(pos, RBrace),
            '"' => self.string(pos)?,
            c if c.is_ascii_digit() => self.number(pos),
            c if is_ident_start(c) => self.ident_or_keyword(pos),
            c => {
                self.advance();
                Token::new(Illegal, c, pos)
            }
        };

        self.prev = Some(token.kind);
        Ok(token)
    }

    /// Skips whitespace and comments. Two token-producing cases live here:
    /// a synthesized semicolon when a newline follows a statement-ending
    /// token, and an `Illegal` token for an unterminated block comment.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            match self.peek()? {
                '\n' => {
                    let pos = self.pos();
                    self.advance();
                    if self.prev.is_some_and(TokenKind::ends_statement) {
                        return Some(Token::new(TokenKind::Semicolon, ";", pos));
                    }
                }
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    // Leave the newline in place so semicolon insertion
                    // still sees it.
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    let pos = self.pos();
                    self.advance();
                    self.advance();
                    if !self.skip_block_comment() {
                        return Some(Token::new(
                            TokenKind::Illegal,
                            "unterminated block comment",
                            pos,
                        ));
                    }
                }
                _ => return None,
            }
        }
    }

    /// Consumes up to and including the closing `*/`. Returns false if the
    /// input ends first.
    fn skip_block_comment(&mut self) -> bool {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return true;
                }
                Some(_) => continue,
                None => return false,
            }
        }
    }

    fn string(&mut self, pos: Pos) -> Result<Token, Error> {
        self.advance(); // opening quote

        let mut decoded = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::String, decoded, pos));
                }
                // A raw newline never belongs to a string literal.
                Some('\n') | None => {
                    return Err(Error::lexical(pos, "unterminated string literal"));
                }
                Some('\\') => {
                    let escape_pos = self.pos();
                    self.advance();
                    match self.advance() {
                        Some('n') => decoded.push('\n'),
                        Some('t') => decoded.push('\t'),
                        Some('r') => decoded.push('\r'),
                        Some('"') => decoded.push('"'),
                        Some('\\') => decoded.push('\\'),
                        Some('0') => decoded.push('\0'),
                        Some(other) => {
                            let message = format!("invalid escape sequence '\\{other}'");
                            return Err(Error::lexical(escape_pos, message));
                        }
                        None => {
                            return Err(Error::lexical(pos, "unterminated string literal"));
                        }
                    }
                }
                Some(c) => {
                    decoded.push(c);
                    self.advance();
                }
            }
        }
    }

    fn number(&mut self, pos: Pos) -> Token {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            literal.push(c);
            self.advance();
        }
        // The literal is kept as text; the parser turns it into a value.
        Token::new(TokenKind::Int, literal, pos)
    }

    fn ident_or_keyword(&mut self, pos: Pos) -> Token {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_start(c) {
                break;
            }
            literal.push(c);
            self.advance();
        }
        let kind = KEYWORDS
            .get(literal.as_str())
            .copied()
            .unwrap_or(TokenKind::Ident);
        Token::new(kind, literal, pos)
    }

    /// A single-character token, or `two` when the next character is
    /// `second` (covers `==`, `!=`, `<=` and `>=`).
    fn operator(&mut self, pos: Pos, one: TokenKind, second: char, two: TokenKind) -> Token {
        let first = self.advance().unwrap();
        if self.peek() == Some(second) {
            self.advance();
            Token::new(two, format!("{first}{second}"), pos)
        } else {
            Token::new(one, first, pos)
        }
    }

    fn single(&mut self, pos: Pos, kind: TokenKind) -> Token {
        let c = self.advance().unwrap();
        Token::new(kind, c, pos)
    }
}

impl Lexer {
    fn pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.cursor + 1).copied()
    }

    /// Returns the current character and advances past it, tracking the
    /// line/column counters.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds_and_literals(src: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(src)
            .scan()
            .expect("lexing should succeed")
            .into_iter()
            .map(|t| (t.kind, t.literal))
            .collect()
    }

    fn assert_tokens(src: &str, expected: &[(TokenKind, &str)]) {
        let expected: Vec<_> = expected
            .iter()
            .map(|&(kind, lit)| (kind, lit.to_string()))
            .collect();
        assert_eq!(kinds_and_literals(src), expected);
    }

    #[test]
    fn special_characters() {
        use TokenKind::*;
        assert_tokens(
            "=+(){},;",
            &[
                (Assign, "="),
                (Plus, "+"),
                (LParen, "("),
                (RParen, ")"),
                (LBrace, "{"),
                (RBrace, "}"),
                (Comma, ","),
                (Semicolon, ";"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn operators() {
        use TokenKind::*;
        assert_tokens(
            "= == ! != < <= > >= + - * /",
            &[
                (Assign, "="),
                (Eq, "=="),
                (Bang, "!"),
                (NotEq, "!="),
                (Lt, "<"),
                (LtEq, "<="),
                (Gt, ">"),
                (GtEq, ">="),
                (Plus, "+"),
                (Minus, "-"),
                (Star, "*"),
                (Slash, "/"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_tokens(
            "package func return if else for var int string bool true false foo _bar",
            &[
                (Package, "package"),
                (Func, "func"),
                (Return, "return"),
                (If, "if"),
                (Else, "else"),
                (For, "for"),
                (Var, "var"),
                (IntType, "int"),
                (StringType, "string"),
                (BoolType, "bool"),
                (True, "true"),
                (False, "false"),
                (Ident, "foo"),
                (Ident, "_bar"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn semicolon_insertion_after_identifier() {
        use TokenKind::*;
        assert_tokens(
            "foo\nbar",
            &[
                (Ident, "foo"),
                (Semicolon, ";"),
                (Ident, "bar"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn semicolon_insertion_after_statement_enders_only() {
        use TokenKind::*;
        // After ')', '}', an integer and a string the semicolon is inserted;
        // after an operator it is not.
        assert_tokens(
            "f()\n}\n1\n\"s\"\n+\nx",
            &[
                (Ident, "f"),
                (LParen, "("),
                (RParen, ")"),
                (Semicolon, ";"),
                (RBrace, "}"),
                (Semicolon, ";"),
                (Int, "1"),
                (Semicolon, ";"),
                (String, "s"),
                (Semicolon, ";"),
                (Plus, "+"),
                (Ident, "x"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn consecutive_newlines_insert_one_semicolon() {
        use TokenKind::*;
        assert_tokens(
            "foo\n\n\nbar",
            &[
                (Ident, "foo"),
                (Semicolon, ";"),
                (Ident, "bar"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn comments_are_skipped() {
        use TokenKind::*;
        assert_tokens(
            "a // trailing comment\nb /* inline */ c /* spans\nlines */ d",
            &[
                (Ident, "a"),
                (Semicolon, ";"), // the newline after the line comment
                (Ident, "b"),
                (Ident, "c"),
                (Ident, "d"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn unterminated_block_comment_is_illegal() {
        use TokenKind::*;
        assert_tokens(
            "a /* never closed",
            &[
                (Ident, "a"),
                (Illegal, "unterminated block comment"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn string_escapes_decode() {
        let tokens = Lexer::new(r#""hello\nworld""#).scan().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "hello\nworld");
        assert_eq!(tokens[0].literal.len(), 11);

        let tokens = Lexer::new(r#""\t\r\"\\\0""#).scan().unwrap();
        assert_eq!(tokens[0].literal, "\t\r\"\\\0");
    }

    #[test]
    fn invalid_escape_fails() {
        let err = Lexer::new(r#""oops\q""#).scan().unwrap_err();
        assert_eq!(
            err,
            Error::lexical(Pos::new(1, 6), "invalid escape sequence '\\q'")
        );
    }

    #[test]
    fn unterminated_string_fails() {
        let err = Lexer::new("\"no end").scan().unwrap_err();
        assert_eq!(
            err,
            Error::lexical(Pos::new(1, 1), "unterminated string literal")
        );

        let err = Lexer::new("\"line\nbreak\"").scan().unwrap_err();
        assert_eq!(
            err,
            Error::lexical(Pos::new(1, 1), "unterminated string literal")
        );
    }

    #[test]
    fn unrecognized_character_is_illegal() {
        use TokenKind::*;
        assert_tokens("a @ b", &[(Ident, "a"), (Illegal, "@"), (Ident, "b"), (Eof, "")]);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = Lexer::new("ab cd\n  ef").scan().unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.kind, t.pos)).collect();
        use TokenKind::*;
        assert_eq!(
            positions,
            vec![
                (Ident, Pos::new(1, 1)),
                (Ident, Pos::new(1, 4)),
                (Semicolon, Pos::new(1, 6)),
                (Ident, Pos::new(2, 3)),
                (Eof, Pos::new(2, 5)),
            ]
        );
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}
