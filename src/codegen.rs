use std::fmt;

use crate::{
    ast::{BinaryOp, Decl, Expr, ExprKind, FunctionDecl, Program, Stmt, UnaryOp},
    error::Error,
};

type Result<T> = std::result::Result<T, Error>;

/// Lowers a type-checked program to textual IR.
///
/// Assumes the input already passed semantic analysis and does not
/// re-validate; failures here are plain (unlocated) messages because they
/// indicate a pipeline-ordering bug, not a user error.
pub fn generate(program: &Program) -> Result<String> {
    Generator::default().generate(program)
}

/// The IR emitter. Counters are local to one instance and start at zero, so
/// a fresh generator over the same AST always produces byte-identical text.
#[derive(Default)]
pub struct Generator {
    /// Next `%tN` temporary.
    temps: usize,
    /// One `@.strN` global constant line per string literal, in order of
    /// first appearance.
    globals: Vec<String>,
    /// Instruction lines of the `main` body, in source order.
    body: Vec<String>,
}

impl Generator {
    pub fn generate(mut self, program: &Program) -> Result<String> {
        let main = find_main(program)
            .ok_or_else(|| Error::Codegen("no main function to emit".to_string()))?;

        for stmt in &main.body.stmts {
            self.lower_stmt(stmt)?;
        }

        // Module header, global constants, then the single function block.
        let mut out = String::new();
        out.push_str("declare i32 @printf(i8*, ...)\n");
        out.push('\n');
        out.push_str("@.fmt_str = private unnamed_addr constant [3 x i8] c\"%s\\00\"\n");
        out.push_str("@.fmt_int = private unnamed_addr constant [4 x i8] c\"%d\\0A\\00\"\n");
        for global in &self.globals {
            out.push_str(global);
            out.push('\n');
        }
        out.push('\n');
        out.push_str("define i32 @main() {\n");
        out.push_str("entry:\n");
        for line in &self.body {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("  ret i32 0\n");
        out.push_str("}\n");
        Ok(out)
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => self.lower_expr_stmt(expr),
            // main returns zero implicitly; a bare return simply falls
            // through to the fixed epilogue.
            Stmt::Return { value: None, .. } => Ok(()),
            _ => Err(Error::Codegen(
                "statement kind not supported in IR emission".to_string(),
            )),
        }
    }

    fn lower_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Call { callee, args } if callee == "print" => self.lower_print(args),
            ExprKind::Int(_) | ExprKind::Infix { .. } | ExprKind::Prefix { .. } => {
                self.lower_int(expr)?;
                Ok(())
            }
            _ => Err(Error::Codegen(
                "expression statement not supported in IR emission".to_string(),
            )),
        }
    }

    fn lower_print(&mut self, args: &[Expr]) -> Result<()> {
        let [arg] = args else {
            return Err(Error::Codegen(
                "print takes exactly one argument in IR emission".to_string(),
            ));
        };

        if let ExprKind::Str(s) = &arg.kind {
            let global = self.intern_string(s);
            let len = s.len() + 1;

            let fmt = self.temp();
            self.body.push(format!(
                "{fmt} = getelementptr inbounds [3 x i8], [3 x i8]* @.fmt_str, i32 0, i32 0"
            ));
            let str_ptr = self.temp();
            self.body.push(format!(
                "{str_ptr} = getelementptr inbounds [{len} x i8], [{len} x i8]* {global}, i32 0, i32 0"
            ));
            let call = self.temp();
            self.body.push(format!(
                "{call} = call i32 (i8*, ...) @printf(i8* {fmt}, i8* {str_ptr})"
            ));
            return Ok(());
        }

        // Integer path: evaluate, then a single call against the integer
        // format constant.
        let value = self.lower_int(arg)?;
        let call = self.temp();
        self.body.push(format!(
            "{call} = call i32 (i8*, ...) @printf(i8* getelementptr inbounds \
             ([4 x i8], [4 x i8]* @.fmt_int, i32 0, i32 0), i32 {value})"
        ));
        Ok(())
    }

    /// Lowers an integer expression. Operands lower left before right,
    /// preserving source evaluation order.
    fn lower_int(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Int(v) => Ok(Value::Const(*v)),
            ExprKind::Infix { op, lhs, rhs } => {
                let lhs = self.lower_int(lhs)?;
                let rhs = self.lower_int(rhs)?;
                let instruction = match op {
                    BinaryOp::Add => "add",
                    BinaryOp::Sub => "sub",
                    BinaryOp::Mul => "mul",
                    BinaryOp::Div => "sdiv",
                };
                let result = self.temp();
                self.body
                    .push(format!("{result} = {instruction} i32 {lhs}, {rhs}"));
                Ok(Value::Temp(result))
            }
            ExprKind::Prefix {
                op: UnaryOp::Neg,
                expr,
            } => {
                let value = self.lower_int(expr)?;
                let result = self.temp();
                self.body.push(format!("{result} = sub i32 0, {value}"));
                Ok(Value::Temp(result))
            }
            _ => Err(Error::Codegen(
                "expression not supported in integer IR emission".to_string(),
            )),
        }
    }

    /// Declares a global byte-array constant for a decoded string literal
    /// and returns its `@.strN` name.
    fn intern_string(&mut self, s: &str) -> String {
        let name = format!("@.str{}", self.globals.len());
        let len = s.len() + 1;
        self.globals.push(format!(
            "{name} = private unnamed_addr constant [{len} x i8] c\"{}\\00\"",
            escape_ir(s)
        ));
        name
    }

    fn temp(&mut self) -> Temp {
        let t = Temp(self.temps);
        self.temps += 1;
        t
    }
}

fn find_main(program: &Program) -> Option<&FunctionDecl> {
    program
        .decls
        .iter()
        .map(|Decl::Function(f)| f)
        .find(|f| f.name == "main")
}

/// Re-escapes a decoded string into the IR's hexadecimal notation: every
/// byte outside printable ASCII (and the two quoting characters) becomes
/// `\XX`.
fn escape_ir(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'"' | b'\\' => out.push_str(&format!("\\{byte:02X}")),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:02X}")),
        }
    }
    out
}

/// An operand: either a numbered temporary or an inline decimal constant.
#[derive(Copy, Clone)]
enum Value {
    Temp(Temp),
    Const(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp(t) => write!(f, "{t}"),
            Value::Const(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Copy, Clone)]
struct Temp(usize);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_program, type_checker};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn generate_checked(src: &str) -> String {
        let program = parse_program(src).expect("program should parse");
        type_checker::analyze(&program).expect("program should type-check");
        generate(&program).expect("generation should succeed")
    }

    #[test]
    fn hello_program() {
        let src = indoc! {r#"
            package main
            func main() {
                print("hi")
            }
        "#};
        let expected = indoc! {r#"
            declare i32 @printf(i8*, ...)

            @.fmt_str = private unnamed_addr constant [3 x i8] c"%s\00"
            @.fmt_int = private unnamed_addr constant [4 x i8] c"%d\0A\00"
            @.str0 = private unnamed_addr constant [3 x i8] c"hi\00"

            define i32 @main() {
            entry:
              %t0 = getelementptr inbounds [3 x i8], [3 x i8]* @.fmt_str, i32 0, i32 0
              %t1 = getelementptr inbounds [3 x i8], [3 x i8]* @.str0, i32 0, i32 0
              %t2 = call i32 (i8*, ...) @printf(i8* %t0, i8* %t1)
              ret i32 0
            }
        "#};
        assert_eq!(generate_checked(src), expected);
    }

    #[test]
    fn integer_print_evaluates_then_calls_once() {
        let src = indoc! {"
            package main
            func main() {
                print(1 + 2 * 3)
            }
        "};
        let ir = generate_checked(src);
        assert!(ir.contains("%t0 = mul i32 2, 3"), "{ir}");
        assert!(ir.contains("%t1 = add i32 1, %t0"), "{ir}");
        assert!(
            ir.contains(
                "%t2 = call i32 (i8*, ...) @printf(i8* getelementptr inbounds \
                 ([4 x i8], [4 x i8]* @.fmt_int, i32 0, i32 0), i32 %t1)"
            ),
            "{ir}"
        );
    }

    #[test]
    fn operands_lower_left_before_right() {
        let src = indoc! {"
            package main
            func main() {
                print(1 * 2 + 3 * 4)
            }
        "};
        let ir = generate_checked(src);
        let body: Vec<_> = ir
            .lines()
            .filter(|l| l.starts_with("  %"))
            .map(str::trim)
            .collect();
        assert_eq!(body[0], "%t0 = mul i32 1, 2");
        assert_eq!(body[1], "%t1 = mul i32 3, 4");
        assert_eq!(body[2], "%t2 = add i32 %t0, %t1");
    }

    #[test]
    fn division_lowers_to_sdiv() {
        let src = "package main\nfunc main() {\nprint(8 / 2 - 1)\n}\n";
        let ir = generate_checked(src);
        assert!(ir.contains("%t0 = sdiv i32 8, 2"), "{ir}");
        assert!(ir.contains("%t1 = sub i32 %t0, 1"), "{ir}");
    }

    #[test]
    fn string_constants_are_escaped_and_length_counted() {
        let src = "package main\nfunc main() {\nprint(\"a\\nb\\\"\\\\\")\n}\n";
        let ir = generate_checked(src);
        // 5 decoded bytes plus the terminator.
        assert!(
            ir.contains("@.str0 = private unnamed_addr constant [6 x i8] c\"a\\0Ab\\22\\5C\\00\""),
            "{ir}"
        );
    }

    #[test]
    fn each_string_literal_gets_its_own_global() {
        let src = indoc! {r#"
            package main
            func main() {
                print("x")
                print("x")
            }
        "#};
        let ir = generate_checked(src);
        assert!(ir.contains("@.str0"), "{ir}");
        assert!(ir.contains("@.str1"), "{ir}");
    }

    #[test]
    fn generation_is_deterministic() {
        let src = indoc! {r#"
            package main
            func main() {
                print("a")
                print(1 + 2)
                print("b")
            }
        "#};
        let program = parse_program(src).unwrap();
        type_checker::analyze(&program).unwrap();
        let first = Generator::default().generate(&program).unwrap();
        let second = Generator::default().generate(&program).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_main_is_a_plain_error() {
        let program = parse_program("package main\nfunc helper() {\n}\n").unwrap();
        type_checker::analyze(&program).unwrap();
        let err = generate(&program).unwrap_err();
        assert_eq!(err, Error::Codegen("no main function to emit".to_string()));
        // Plain message: no phase prefix, no position.
        assert_eq!(err.to_string(), "no main function to emit");
    }
}
