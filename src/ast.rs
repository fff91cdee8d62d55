// program  ::= 'package' IDENT ';' funcdecl* EOF
// funcdecl ::= 'func' IDENT '(' [param (',' param)*] ')' [type] block
// param    ::= IDENT type
// type     ::= 'int' | 'string' | 'bool'
// block    ::= '{' (stmt ';')* '}'
// stmt     ::= 'return' [expr]
//            | expr
// expr     ::= expr ('+' | '-') expr
//            | expr ('*' | '/') expr
//            | IDENT '(' [expr (',' expr)*] ')'
//            | '(' expr ')'
//            | IDENT | INT | STRING | 'true' | 'false'
//
// Precedence, lowest to highest: additive, multiplicative, primary. Both
// binary levels are left-associative.
//
// If/for/var statements and prefix expressions are representable AST shapes
// but are not wired into the surface grammar yet.

use std::fmt;

use crate::{token::Pos, types::Type};

/// Root node. Owns the top-level declarations in source order and the
/// package name (which the type checker requires to be `"main"`).
#[derive(Debug, PartialEq)]
pub struct Program {
    pub package: String,
    pub decls: Vec<Decl>,
    pub pos: Pos,
}

#[derive(Debug, PartialEq)]
pub enum Decl {
    Function(FunctionDecl),
}

impl Decl {
    pub fn pos(&self) -> Pos {
        match self {
            Decl::Function(f) => f.pos,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// Absent means the function returns no value.
    pub return_ty: Option<TypeNode>,
    pub body: Block,
    pub pos: Pos,
}

#[derive(Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeNode,
    pub pos: Pos,
}

#[derive(Debug, PartialEq)]
pub struct TypeNode {
    pub ty: Type,
    pub pos: Pos,
}

#[derive(Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub pos: Pos,
}

#[derive(Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Return {
        value: Option<Expr>,
        pos: Pos,
    },
    If {
        cond: Expr,
        then: Block,
        alt: Option<Block>,
        pos: Pos,
    },
    For {
        cond: Expr,
        body: Block,
        pos: Pos,
    },
    Var {
        name: String,
        /// Declared type, if the source spells one out.
        ty: Option<TypeNode>,
        value: Expr,
        pos: Pos,
    },
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Expr(e) => e.pos,
            Stmt::Return { pos, .. }
            | Stmt::If { pos, .. }
            | Stmt::For { pos, .. }
            | Stmt::Var { pos, .. } => *pos,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Ident(String),
    Int(i64),
    Str(String),
    Bool(bool),
    Prefix {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Infix {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        })
    }
}
