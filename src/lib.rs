//! A compiler front end for minigo, a small Go-flavored language, lowering
//! `package main` programs to textual LLVM IR.
//!
//! The pipeline runs in four phases, each a separate module:
//!
//! 1. [`lexer`] turns source text into tokens, inserting semicolons at line
//!    breaks the way Go does.
//! 2. [`parser`] builds the [`ast`] with a recursive-descent,
//!    binding-power expression parser.
//! 3. [`type_checker`] validates the program against the [`types`] rules.
//! 4. [`codegen`] emits deterministic textual IR for the `main` function.
//!
//! [`compile`] chains all four; the phase modules stay public so callers can
//! stop at any intermediate stage.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod type_checker;
pub mod types;

pub use error::Error;

/// Compiles minigo source text to textual LLVM IR.
///
/// Stops at the first error; the returned [`Error`] carries the phase and
/// source position.
pub fn compile(source: &str) -> Result<String, Error> {
    let program = parser::parse_program(source)?;
    type_checker::analyze(&program)?;
    codegen::generate(&program)
}
