use std::fmt;

/// The closed set of minigo types.
///
/// `Unknown` is an internal sentinel for a name whose type has not been
/// resolved yet; the type checker either replaces it with a concrete type or
/// fails, so it must never reach the IR emitter (and is never user-visible).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Void,
    Int,
    String,
    Bool,
    Unknown,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Type::Void => "void",
            Type::Int => "int",
            Type::String => "string",
            Type::Bool => "bool",
            Type::Unknown => "unknown",
        })
    }
}

/// Built-in functions: callables the type checker recognizes without a
/// corresponding user declaration.
pub mod builtins {
    use super::Type;

    pub struct Builtin {
        pub name: &'static str,
        /// Accepted types per parameter position. The outer slice length is
        /// the builtin's arity.
        pub params: &'static [&'static [Type]],
        pub return_ty: Type,
    }

    pub const PRINT: Builtin = Builtin {
        name: "print",
        params: &[&[Type::String, Type::Int]],
        return_ty: Type::Void,
    };

    pub const ALL: &[&Builtin] = &[&PRINT];

    pub fn lookup(name: &str) -> Option<&'static Builtin> {
        ALL.iter().copied().find(|b| b.name == name)
    }
}
