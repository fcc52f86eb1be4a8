//! Type representation for the Lambdawg type system.
//!
//! Defines the core `Ty` enum, type constructors (`TyCon`), type variables
//! (`TyVar`), and polymorphic type schemes (`Scheme`). These form the
//! foundation of Hindley-Milner type inference with row-open records.

use std::collections::BTreeMap;
use std::fmt;

/// A type variable, identified by a `u32` index into the unification table.
///
/// Type variables are created during inference and unified with concrete
/// types or other variables. The `ena` crate handles the union-find
/// mechanics. Ids are unique within one compilation; the counter starts
/// from zero for each inference run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// A type constructor -- a named type like `Int`, `Bool`, `Option`, or a
/// user-defined sum type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyCon {
    pub name: String,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into() }
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A Lambdawg type.
///
/// - `Var`: an inference variable (to be resolved by unification)
/// - `Con`: a concrete constant type (Int, Float, String, Char, Bool, Unit)
/// - `Fun`: a function type (params -> return)
/// - `Record`: a field map; `open` records tolerate extra fields during
///   unification and express "has at least these fields"
/// - `List`: a homogeneous list
/// - `App`: a type constructor applied to arguments (`Option a`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Var(TyVar),
    Con(TyCon),
    Fun(Vec<Ty>, Box<Ty>),
    Record {
        fields: BTreeMap<String, Ty>,
        open: bool,
    },
    List(Box<Ty>),
    App(TyCon, Vec<Ty>),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Con(TyCon::new("Int"))
    }

    pub fn float() -> Ty {
        Ty::Con(TyCon::new("Float"))
    }

    pub fn string() -> Ty {
        Ty::Con(TyCon::new("String"))
    }

    pub fn char() -> Ty {
        Ty::Con(TyCon::new("Char"))
    }

    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("Bool"))
    }

    pub fn unit() -> Ty {
        Ty::Con(TyCon::new("Unit"))
    }

    /// Create a `List elem` type.
    pub fn list(elem: Ty) -> Ty {
        Ty::List(Box::new(elem))
    }

    /// Create an `Option inner` type.
    pub fn option(inner: Ty) -> Ty {
        Ty::App(TyCon::new("Option"), vec![inner])
    }

    /// Create a `Result ok err` type.
    pub fn result(ok: Ty, err: Ty) -> Ty {
        Ty::App(TyCon::new("Result"), vec![ok, err])
    }

    /// Create a function type.
    pub fn fun(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fun(params, Box::new(ret))
    }

    /// Create a record type from field pairs.
    pub fn record(fields: impl IntoIterator<Item = (String, Ty)>, open: bool) -> Ty {
        Ty::Record {
            fields: fields.into_iter().collect(),
            open,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Con(c) => write!(f, "{}", c),
            Ty::Fun(params, ret) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Ty::Record { fields, open } => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                if *open {
                    if !fields.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "..")?;
                }
                write!(f, "}}")
            }
            Ty::List(elem) => {
                write!(f, "List ")?;
                fmt_atom(elem, f)
            }
            Ty::App(con, args) => {
                write!(f, "{}", con)?;
                for arg in args {
                    write!(f, " ")?;
                    fmt_atom(arg, f)?;
                }
                Ok(())
            }
        }
    }
}

/// Display a type as an application argument, parenthesizing compound
/// shapes so `List (Option Int)` reads unambiguously.
fn fmt_atom(ty: &Ty, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        Ty::List(_) | Ty::Fun(..) => write!(f, "({})", ty),
        Ty::App(_, args) if !args.is_empty() => write!(f, "({})", ty),
        _ => write!(f, "{}", ty),
    }
}

/// A polymorphic type scheme: a type with universally quantified variables.
///
/// The type of `identity` is `forall a. (a) -> a`, represented as
/// `Scheme { vars: [a], ty: Fun([Var(a)], Var(a)) }`. A scheme's
/// quantified set only contains variables that are not free in the
/// environment at generalization time.
#[derive(Clone, Debug)]
pub struct Scheme {
    /// The quantified (generic) type variables.
    pub vars: Vec<TyVar>,
    /// The underlying type (may reference vars).
    pub ty: Ty,
}

impl Scheme {
    /// Create a monomorphic scheme (no quantified variables).
    pub fn mono(ty: Ty) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ty_display() {
        assert_eq!(format!("{}", Ty::int()), "Int");
        assert_eq!(
            format!("{}", Ty::fun(vec![Ty::int(), Ty::string()], Ty::bool())),
            "(Int, String) -> Bool"
        );
        assert_eq!(format!("{}", Ty::list(Ty::int())), "List Int");
        assert_eq!(
            format!("{}", Ty::list(Ty::option(Ty::int()))),
            "List (Option Int)"
        );
        assert_eq!(
            format!("{}", Ty::result(Ty::string(), Ty::int())),
            "Result String Int"
        );
    }

    #[test]
    fn record_display() {
        let closed = Ty::record(
            [("x".to_string(), Ty::int()), ("y".to_string(), Ty::int())],
            false,
        );
        assert_eq!(format!("{closed}"), "{x: Int, y: Int}");

        let open = Ty::record([("name".to_string(), Ty::string())], true);
        assert_eq!(format!("{open}"), "{name: String, ..}");

        let empty_open = Ty::record([], true);
        assert_eq!(format!("{empty_open}"), "{..}");
    }

    #[test]
    fn scheme_mono_has_no_vars() {
        let scheme = Scheme::mono(Ty::int());
        assert!(scheme.vars.is_empty());
    }
}
