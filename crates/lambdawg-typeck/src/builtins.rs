//! Built-in combinator and type registration.
//!
//! Populates the global scope with the list combinators and helpers every
//! Lambdawg program can use unqualified, and seeds the type table with the
//! constant types and the generic constructors `List`, `Option`, and
//! `Result`. The emitted runtime prelude defines the matching values.

use rustc_hash::FxHashMap;

use crate::env::TypeEnv;
use crate::ty::{Scheme, Ty};
use crate::unify::InferCtx;

/// What the type table knows about a named type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Number of type parameters.
    pub arity: usize,
}

/// Named types visible to annotation resolution and type definitions.
pub type TypeTable = FxHashMap<String, TypeInfo>;

/// Register all built-in combinators into the environment.
///
/// Each polymorphic scheme is built from variables created one level down
/// and generalized on the way out, so every use site instantiates fresh
/// copies.
pub fn register_builtins(ctx: &mut InferCtx, env: &mut TypeEnv) {
    // map : (a -> b, List a) -> List b
    polymorphic(ctx, env, "map", |ctx| {
        let a = ctx.fresh_var();
        let b = ctx.fresh_var();
        Ty::fun(
            vec![Ty::fun(vec![a.clone()], b.clone()), Ty::list(a)],
            Ty::list(b),
        )
    });

    // filter : (a -> Bool, List a) -> List a
    polymorphic(ctx, env, "filter", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(
            vec![Ty::fun(vec![a.clone()], Ty::bool()), Ty::list(a.clone())],
            Ty::list(a),
        )
    });

    // fold : ((b, a) -> b, b, List a) -> b
    polymorphic(ctx, env, "fold", |ctx| {
        let a = ctx.fresh_var();
        let b = ctx.fresh_var();
        Ty::fun(
            vec![
                Ty::fun(vec![b.clone(), a.clone()], b.clone()),
                b.clone(),
                Ty::list(a),
            ],
            b,
        )
    });

    // sum : (List Int) -> Int
    env.bind(
        "sum",
        Scheme::mono(Ty::fun(vec![Ty::list(Ty::int())], Ty::int())),
    );

    // length : (List a) -> Int
    polymorphic(ctx, env, "length", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(vec![Ty::list(a)], Ty::int())
    });

    // show : (a) -> String
    polymorphic(ctx, env, "show", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(vec![a], Ty::string())
    });

    // identity : (a) -> a
    polymorphic(ctx, env, "identity", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(vec![a.clone()], a)
    });

    // head : (List a) -> Option a
    polymorphic(ctx, env, "head", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(vec![Ty::list(a.clone())], Ty::option(a))
    });

    // tail : (List a) -> Option (List a)
    polymorphic(ctx, env, "tail", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(vec![Ty::list(a.clone())], Ty::option(Ty::list(a)))
    });

    // tap : ((a) -> Unit, a) -> a
    polymorphic(ctx, env, "tap", |ctx| {
        let a = ctx.fresh_var();
        Ty::fun(
            vec![Ty::fun(vec![a.clone()], Ty::unit()), a.clone()],
            a,
        )
    });
}

/// Build a polymorphic builtin: create its variables one level down, then
/// generalize so they quantify.
fn polymorphic(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    name: &str,
    build: impl FnOnce(&mut InferCtx) -> Ty,
) {
    ctx.enter_level();
    let ty = build(ctx);
    ctx.leave_level();
    let scheme = ctx.generalize(ty);
    env.bind(name, scheme);
}

/// Seed the type table with the constant types and generic constructors.
pub fn builtin_type_table() -> TypeTable {
    let mut table = TypeTable::default();
    for name in ["Int", "Float", "String", "Char", "Bool", "Unit"] {
        table.insert(name.to_string(), TypeInfo { arity: 0 });
    }
    table.insert("List".to_string(), TypeInfo { arity: 1 });
    table.insert("Option".to_string(), TypeInfo { arity: 1 });
    table.insert("Result".to_string(), TypeInfo { arity: 2 });
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        register_builtins(&mut ctx, &mut env);

        for name in [
            "map", "filter", "fold", "sum", "length", "show", "identity", "head", "tail", "tap",
        ] {
            assert!(env.lookup(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn map_scheme_is_polymorphic() {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        register_builtins(&mut ctx, &mut env);

        let scheme = env.lookup("map").unwrap();
        assert_eq!(scheme.vars.len(), 2, "map quantifies a and b");
    }

    #[test]
    fn type_table_has_generic_constructors() {
        let table = builtin_type_table();
        assert_eq!(table.get("Option").unwrap().arity, 1);
        assert_eq!(table.get("Result").unwrap().arity, 2);
        assert_eq!(table.get("Int").unwrap().arity, 0);
    }
}
