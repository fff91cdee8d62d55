use crate::{
    ast::{BinaryOp, Block, Decl, Expr, ExprKind, FunctionDecl, Param, Program, Stmt, TypeNode},
    error::Error,
    lexer::Lexer,
    token::{Token, TokenKind},
    types::Type,
};

type Result<T> = std::result::Result<T, Error>;

/// Lexes and parses a whole compilation unit.
pub fn parse_program(src: &str) -> Result<Program> {
    let tokens = Lexer::new(src).scan()?;
    Parser::new(tokens).parse_program()
}

/// Recursive-descent parser over the scanned token list.
///
/// The cursor always points at the current token with one token of
/// lookahead available; the list ends with `Eof`, which the accessors
/// saturate on. The parser is not resumable: the first syntax error aborts
/// and no partial AST is returned.
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        assert!(
            tokens.last().is_some_and(Token::is_eof),
            "token list must end with Eof"
        );
        Parser { tokens, cursor: 0 }
    }

    pub fn parse_program(mut self) -> Result<Program> {
        let package = self.consume(TokenKind::Package)?;
        let name = self.consume(TokenKind::Ident)?;
        let mut decls = Vec::new();

        loop {
            // Statement terminators between declarations (explicit or
            // auto-inserted) carry no meaning.
            while self.take(TokenKind::Semicolon) {}
            if self.is(TokenKind::Eof) {
                break;
            }
            decls.push(Decl::Function(self.parse_function()?));
        }

        Ok(Program {
            package: name.literal,
            decls,
            pos: package.pos,
        })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl> {
        let func = self.consume(TokenKind::Func)?;
        let name = self.consume(TokenKind::Ident)?;

        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.is(TokenKind::RParen) {
            loop {
                let name = self.consume(TokenKind::Ident)?;
                let ty = self.parse_type()?;
                params.push(Param {
                    pos: name.pos,
                    name: name.literal,
                    ty,
                });
                if !self.take(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen)?;

        let return_ty = if self.peek_type().is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;

        Ok(FunctionDecl {
            name: name.literal,
            params,
            return_ty,
            body,
            pos: func.pos,
        })
    }

    fn parse_type(&mut self) -> Result<TypeNode> {
        let token = self.advance();
        match Self::type_of(token.kind) {
            Some(ty) => Ok(TypeNode { ty, pos: token.pos }),
            None => Err(Error::syntax(
                token.pos,
                format!("expected type, found {}", describe(&token)),
            )),
        }
    }

    fn parse_block(&mut self) -> Result<Block> {
        let lbrace = self.consume(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        loop {
            while self.take(TokenKind::Semicolon) {}
            if self.is(TokenKind::RBrace) {
                break;
            }
            stmts.push(self.parse_statement()?);

            // A statement must be followed by a terminator or the closing
            // brace.
            if !self.is(TokenKind::Semicolon) && !self.is(TokenKind::RBrace) {
                let c = self.peek();
                return Err(Error::syntax(
                    c.pos,
                    format!("expected ';' or '}}', found {}", describe(c)),
                ));
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(Block {
            stmts,
            pos: lbrace.pos,
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        if self.is(TokenKind::Return) {
            let ret = self.advance();
            let value = if self.is(TokenKind::Semicolon) || self.is(TokenKind::RBrace) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            return Ok(Stmt::Return {
                value,
                pos: ret.pos,
            });
        }
        Ok(Stmt::Expr(self.parse_expr()?))
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    /// Precedence climbing: repeatedly folds `operator, next-higher-level
    /// operand` pairs into a left-deepening infix tree.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_primary()?;

        loop {
            let Some((op, lbp, rbp)) = Self::infix_binding_power(self.peek().kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance(); // operator
            let rhs = self.parse_expr_bp(rbp)?;

            let pos = lhs.pos;
            lhs = Expr {
                kind: ExprKind::Infix {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                pos,
            };
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        let kind = match token.kind {
            TokenKind::Int => {
                let Ok(value) = token.literal.parse::<i64>() else {
                    return Err(Error::syntax(
                        token.pos,
                        format!("invalid integer literal '{}'", token.literal),
                    ));
                };
                ExprKind::Int(value)
            }
            TokenKind::String => ExprKind::Str(token.literal),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),

            // Grouping: '(' expr ')'
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                return Ok(expr);
            }

            // Identifier, or a call when '(' follows immediately.
            TokenKind::Ident => {
                if self.take(TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.is(TokenKind::RParen) {
                        loop {
                            // Arguments are parsed at full precedence.
                            args.push(self.parse_expr()?);
                            if !self.take(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.consume(TokenKind::RParen)?;
                    ExprKind::Call {
                        callee: token.literal,
                        args,
                    }
                } else {
                    ExprKind::Ident(token.literal)
                }
            }

            TokenKind::Illegal => {
                return Err(Error::syntax(token.pos, illegal_message(&token)));
            }

            _ => {
                return Err(Error::syntax(
                    token.pos,
                    format!("expected expression, found {}", describe(&token)),
                ));
            }
        };

        Ok(Expr {
            kind,
            pos: token.pos,
        })
    }

    fn infix_binding_power(kind: TokenKind) -> Option<(BinaryOp, u8, u8)> {
        let bp = match kind {
            // Additive (left-associative)
            TokenKind::Plus => (BinaryOp::Add, 1, 2),
            TokenKind::Minus => (BinaryOp::Sub, 1, 2),

            // Multiplicative (left-associative)
            TokenKind::Star => (BinaryOp::Mul, 3, 4),
            TokenKind::Slash => (BinaryOp::Div, 3, 4),

            _ => return None,
        };
        Some(bp)
    }

    fn type_of(kind: TokenKind) -> Option<Type> {
        match kind {
            TokenKind::IntType => Some(Type::Int),
            TokenKind::StringType => Some(Type::String),
            TokenKind::BoolType => Some(Type::Bool),
            _ => None,
        }
    }

    fn peek_type(&self) -> Option<Type> {
        Self::type_of(self.peek().kind)
    }
}

/// Cursor plumbing.
impl Parser {
    /// Returns the current token without advancing.
    fn peek(&self) -> &Token {
        // The list always ends with Eof, so saturate there.
        let index = self.cursor.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Returns the current token and advances the cursor.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances past the current token if it matches, returning true.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances past the current token if it matches; fails with a located
    /// syntax error otherwise.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        if self.is(expect) {
            Ok(self.advance())
        } else {
            let c = self.peek();
            Err(Error::syntax(
                c.pos,
                format!("expected {}, found {}", describe_kind(expect), describe(c)),
            ))
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Illegal => format!("illegal token '{}'", token.literal),
        TokenKind::Ident => format!("identifier '{}'", token.literal),
        TokenKind::Int => format!("integer literal '{}'", token.literal),
        TokenKind::String => "string literal".to_string(),
        _ => describe_kind(token.kind),
    }
}

fn describe_kind(kind: TokenKind) -> String {
    use TokenKind::*;
    let text = match kind {
        Illegal => "illegal token",
        Eof => "end of file",
        Ident => "identifier",
        Int => "integer literal",
        String => "string literal",
        Assign => "'='",
        Plus => "'+'",
        Minus => "'-'",
        Star => "'*'",
        Slash => "'/'",
        Bang => "'!'",
        Eq => "'=='",
        NotEq => "'!='",
        Lt => "'<'",
        Gt => "'>'",
        LtEq => "'<='",
        GtEq => "'>='",
        Comma => "','",
        Semicolon => "';'",
        LParen => "'('",
        RParen => "')'",
        LBrace => "'{'",
        RBrace => "'}'",
        Package => "'package'",
        Func => "'func'",
        Return => "'return'",
        If => "'if'",
        Else => "'else'",
        For => "'for'",
        Var => "'var'",
        IntType => "'int'",
        StringType => "'string'",
        BoolType => "'bool'",
        True => "'true'",
        False => "'false'",
    };
    text.to_string()
}

fn illegal_message(token: &Token) -> String {
    // Unterminated block comments arrive as Illegal tokens whose literal
    // already is the diagnostic message.
    if token.literal.chars().count() == 1 {
        format!("unexpected character '{}'", token.literal)
    } else {
        token.literal.clone()
    }
}
