use std::collections::HashMap;

use crate::{
    ast::{BinaryOp, Block, Decl, Expr, ExprKind, FunctionDecl, Program, Stmt, UnaryOp},
    error::Error,
    types::{builtins, Type},
};

type Result<T> = std::result::Result<T, Error>;

/// Type-checks a whole program. Completes silently or fails with the first
/// located semantic error; the AST is never mutated.
pub fn analyze(program: &Program) -> Result<()> {
    Checker::default().analyze(program)
}

/// The semantic analyzer.
///
/// Owns the lexical scope stack: a scope is pushed on entering a function
/// body (and each nested block shape) and popped on leaving it, on every
/// exit path. An unbalanced pop is a programming error, not a user-facing
/// diagnostic, and panics.
#[derive(Default)]
pub struct Checker {
    scopes: Vec<HashMap<String, Type>>,
}

impl Checker {
    pub fn analyze(&mut self, program: &Program) -> Result<()> {
        if program.package != "main" {
            let message = format!(
                "package name must be \"main\", found \"{}\"",
                program.package
            );
            return Err(Error::semantic(program.pos, message));
        }

        for decl in &program.decls {
            let Decl::Function(function) = decl;
            self.check_function(function)?;
        }
        Ok(())
    }

    fn check_function(&mut self, function: &FunctionDecl) -> Result<()> {
        // The entry point has a fixed shape.
        if function.name == "main" {
            if !function.params.is_empty() {
                return Err(Error::semantic(
                    function.pos,
                    "main function cannot have parameters",
                ));
            }
            if let Some(return_ty) = &function.return_ty {
                return Err(Error::semantic(
                    return_ty.pos,
                    "main function cannot have a return type",
                ));
            }
        }

        self.scopes.push(HashMap::new());
        let result = self.check_function_scoped(function);
        self.scopes.pop().expect("scope stack underflow");
        result
    }

    /// Body of [`Self::check_function`]; runs inside the function's scope so
    /// the caller can guarantee the matching pop.
    fn check_function_scoped(&mut self, function: &FunctionDecl) -> Result<()> {
        for param in &function.params {
            if !self.declare(&param.name, param.ty.ty) {
                let message = format!("parameter '{}' redeclared", param.name);
                return Err(Error::semantic(param.pos, message));
            }
        }

        let return_ty = function.return_ty.as_ref().map_or(Type::Void, |t| t.ty);
        for stmt in &function.body.stmts {
            self.check_stmt(stmt, return_ty)?;
        }
        Ok(())
    }

    fn check_block(&mut self, block: &Block, return_ty: Type) -> Result<()> {
        self.scopes.push(HashMap::new());
        let result = block
            .stmts
            .iter()
            .try_for_each(|stmt| self.check_stmt(stmt, return_ty));
        self.scopes.pop().expect("scope stack underflow");
        result
    }

    fn check_stmt(&mut self, stmt: &Stmt, return_ty: Type) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.infer_type(expr)?;
                Ok(())
            }
            Stmt::Return { value, pos } => match (value, return_ty) {
                (None, Type::Void) => Ok(()),
                (None, expected) => Err(Error::semantic(
                    *pos,
                    format!("missing return value, expected {expected}"),
                )),
                (Some(expr), Type::Void) => Err(Error::semantic(
                    expr.pos,
                    "unexpected return value in function without return type",
                )),
                (Some(expr), expected) => {
                    let actual = self.infer_type(expr)?;
                    if actual == expected {
                        Ok(())
                    } else {
                        let message =
                            format!("cannot return {actual} from function returning {expected}");
                        Err(Error::semantic(expr.pos, message))
                    }
                }
            },
            Stmt::If {
                cond, then, alt, ..
            } => {
                self.expect_bool(cond, "if condition")?;
                self.check_block(then, return_ty)?;
                if let Some(alt) = alt {
                    self.check_block(alt, return_ty)?;
                }
                Ok(())
            }
            Stmt::For { cond, body, .. } => {
                self.expect_bool(cond, "for condition")?;
                self.check_block(body, return_ty)
            }
            Stmt::Var {
                name,
                ty,
                value,
                pos,
            } => {
                let inferred = self.infer_type(value)?;
                if let Some(declared) = ty {
                    if declared.ty != inferred {
                        let message = format!(
                            "cannot assign {inferred} to variable of type {}",
                            declared.ty
                        );
                        return Err(Error::semantic(value.pos, message));
                    }
                }
                if !self.declare(name, inferred) {
                    let message = format!("variable '{name}' redeclared in this scope");
                    return Err(Error::semantic(*pos, message));
                }
                Ok(())
            }
        }
    }

    fn expect_bool(&self, cond: &Expr, what: &str) -> Result<()> {
        let ty = self.infer_type(cond)?;
        if ty == Type::Bool {
            Ok(())
        } else {
            Err(Error::semantic(
                cond.pos,
                format!("{what} must be bool, found {ty}"),
            ))
        }
    }

    /// Infers an expression's type from the node and the current scope
    /// stack. Read-only: inference never binds names.
    fn infer_type(&self, expr: &Expr) -> Result<Type> {
        match &expr.kind {
            ExprKind::Int(_) => Ok(Type::Int),
            ExprKind::Str(_) => Ok(Type::String),
            ExprKind::Bool(_) => Ok(Type::Bool),

            ExprKind::Ident(name) => self.lookup(name).ok_or_else(|| {
                Error::semantic(expr.pos, format!("undefined identifier '{name}'"))
            }),

            ExprKind::Prefix { op, expr: operand } => {
                let ty = self.infer_type(operand)?;
                let expected = match op {
                    UnaryOp::Neg => Type::Int,
                    UnaryOp::Not => Type::Bool,
                };
                if ty == expected {
                    Ok(ty)
                } else {
                    let message = format!("cannot apply operator '{op}' to type {ty}");
                    Err(Error::semantic(operand.pos, message))
                }
            }

            ExprKind::Infix { op, lhs, rhs } => {
                let lhs_ty = self.infer_type(lhs)?;
                let rhs_ty = self.infer_type(rhs)?;
                match op {
                    // Every infix operator is arithmetic over ints; the
                    // closed enum rules out silent fallthrough for new ones.
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                        if lhs_ty == Type::Int && rhs_ty == Type::Int {
                            Ok(Type::Int)
                        } else {
                            let message = format!(
                                "Cannot perform arithmetic operation '{op}' on types {lhs_ty} and {rhs_ty}"
                            );
                            Err(Error::semantic(expr.pos, message))
                        }
                    }
                }
            }

            ExprKind::Call { callee, args } => {
                let Some(builtin) = builtins::lookup(callee) else {
                    return Err(Error::semantic(
                        expr.pos,
                        format!("unknown function '{callee}'"),
                    ));
                };

                if args.len() != builtin.params.len() {
                    let message = format!(
                        "{callee} expects {} argument(s), found {}",
                        builtin.params.len(),
                        args.len()
                    );
                    return Err(Error::semantic(expr.pos, message));
                }

                for (arg, accepted) in args.iter().zip(builtin.params) {
                    let ty = self.infer_type(arg)?;
                    if !accepted.contains(&ty) {
                        let wanted = accepted
                            .iter()
                            .map(Type::to_string)
                            .collect::<Vec<_>>()
                            .join(" or ");
                        let message = format!("{callee} argument must be {wanted}, found {ty}");
                        return Err(Error::semantic(arg.pos, message));
                    }
                }

                Ok(builtin.return_ty)
            }
        }
    }

    /// Binds a name in the innermost scope. Returns false if the name is
    /// already bound there (shadowing an *outer* scope is fine).
    fn declare(&mut self, name: &str, ty: Type) -> bool {
        let scope = self.scopes.last_mut().expect("scope stack underflow");
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), ty);
        true
    }

    /// Resolves a name through the scope stack, innermost first.
    fn lookup(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }
}
