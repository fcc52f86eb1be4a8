//! Unification engine for Hindley-Milner type inference.
//!
//! Implements the core unification algorithm using `ena`'s union-find
//! table. Supports the occurs check (infinite type detection), level-based
//! generalization, scheme instantiation, and row-open record unification:
//! the intersection of two records' fields is unified, and a field missing
//! on a closed side is an error while an open side tolerates extras.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use lambdawg_common::span::Span;

use crate::error::TypeError;
use crate::ty::{Scheme, Ty, TyVar};

/// The inference context -- owns the unification table, level state, and
/// the accumulated type errors.
pub struct InferCtx {
    /// The union-find unification table (ena).
    table: InPlaceUnificationTable<TyVar>,
    /// Current let-nesting level for generalization.
    current_level: u32,
    /// Level at which each type variable was created, indexed by `TyVar.0`.
    var_levels: Vec<u32>,
    /// Type errors accumulated during inference, in production order.
    pub errors: Vec<TypeError>,
}

impl InferCtx {
    /// Create a new, empty inference context. The variable counter starts
    /// at zero; a fresh context is created for every check run.
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            current_level: 0,
            var_levels: Vec::new(),
            errors: Vec::new(),
        }
    }

    // ── Type Variable Creation ──────────────────────────────────────────

    /// Create a fresh type variable at the current level.
    pub fn fresh_var(&mut self) -> Ty {
        let var = self.table.new_key(None);
        while self.var_levels.len() <= var.0 as usize {
            self.var_levels.push(0);
        }
        self.var_levels[var.0 as usize] = self.current_level;
        Ty::Var(var)
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Resolve a type by following union-find indirection.
    ///
    /// If the type is a variable with a known value, recursively resolve
    /// that value. Unbound variables normalize to their root key so that
    /// unified-but-unbound variables resolve to the same representative,
    /// which generalization depends on.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Fun(params, ret) => {
                let params = params.into_iter().map(|p| self.resolve(p)).collect();
                let ret = Box::new(self.resolve(*ret));
                Ty::Fun(params, ret)
            }
            Ty::Record { fields, open } => Ty::Record {
                fields: fields
                    .into_iter()
                    .map(|(name, ty)| (name, self.resolve(ty)))
                    .collect(),
                open,
            },
            Ty::List(elem) => Ty::List(Box::new(self.resolve(*elem))),
            Ty::App(con, args) => {
                let args = args.into_iter().map(|a| self.resolve(a)).collect();
                Ty::App(con, args)
            }
            other => other,
        }
    }

    // ── Occurs Check ────────────────────────────────────────────────────

    /// Check if a type variable occurs anywhere within a type.
    ///
    /// This prevents infinite types like `a ~ (a) -> Int`; without it, the
    /// instance chain would cycle and resolution would never terminate.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if self.table.unioned(*v, var) {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Con(_) => false,
            Ty::Fun(params, ret) => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, ret)
            }
            Ty::Record { fields, .. } => fields.values().any(|t| self.occurs_in(var, t)),
            Ty::List(elem) => self.occurs_in(var, elem),
            Ty::App(_, args) => args.iter().any(|a| self.occurs_in(var, a)),
        }
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, making them equal.
    ///
    /// Both types are first resolved through the union-find table, then
    /// structurally compared. On failure the error is recorded (tagged
    /// with the caller-provided span) and returned; unification is never
    /// reverted, and callers continue with a fresh variable.
    pub fn unify(&mut self, a: Ty, b: Ty, span: Span) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            // Two identical variables -- already unified.
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            // Variable meets variable -- union them.
            (Ty::Var(v1), Ty::Var(v2)) => {
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars should not fail");
                Ok(())
            }

            // Variable meets concrete type -- bind it (with occurs check).
            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    let err = TypeError::InfiniteType { var: v, ty, span };
                    self.errors.push(err.clone());
                    Err(err)
                } else {
                    self.table
                        .unify_var_value(v, Some(ty))
                        .expect("binding a var after the occurs check should not fail");
                    Ok(())
                }
            }

            // Constants must carry the same name.
            (Ty::Con(c1), Ty::Con(c2)) => {
                if c1 == c2 {
                    Ok(())
                } else {
                    let err = TypeError::Mismatch {
                        expected: Ty::Con(c1),
                        found: Ty::Con(c2),
                        span,
                    };
                    self.errors.push(err.clone());
                    Err(err)
                }
            }

            // Functions: equal arity, params and returns unified pairwise.
            (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
                if p1.len() != p2.len() {
                    let err = TypeError::ArityMismatch {
                        expected: p1.len(),
                        found: p2.len(),
                        span,
                    };
                    self.errors.push(err.clone());
                    Err(err)
                } else {
                    for (a, b) in p1.into_iter().zip(p2.into_iter()) {
                        self.unify(a, b, span)?;
                    }
                    self.unify(*r1, *r2, span)
                }
            }

            // Records: unify the intersection of fields; a field missing on
            // a closed side is an error, an open side tolerates extras.
            (
                Ty::Record {
                    fields: f1,
                    open: o1,
                },
                Ty::Record {
                    fields: f2,
                    open: o2,
                },
            ) => {
                for (name, t1) in &f1 {
                    match f2.get(name) {
                        Some(t2) => self.unify(t1.clone(), t2.clone(), span)?,
                        None if o2 => {}
                        None => {
                            let err = TypeError::MissingField {
                                field: name.clone(),
                                record: Ty::Record {
                                    fields: f2.clone(),
                                    open: o2,
                                },
                                span,
                            };
                            self.errors.push(err.clone());
                            return Err(err);
                        }
                    }
                }
                for name in f2.keys() {
                    if !f1.contains_key(name) && !o1 {
                        let err = TypeError::MissingField {
                            field: name.clone(),
                            record: Ty::Record {
                                fields: f1.clone(),
                                open: o1,
                            },
                            span,
                        };
                        self.errors.push(err.clone());
                        return Err(err);
                    }
                }
                Ok(())
            }

            // Lists unify their elements.
            (Ty::List(e1), Ty::List(e2)) => self.unify(*e1, *e2, span),

            // Applications must share a constructor and arity.
            (Ty::App(c1, a1), Ty::App(c2, a2)) => {
                if c1 != c2 {
                    let err = TypeError::Mismatch {
                        expected: Ty::App(c1, a1),
                        found: Ty::App(c2, a2),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                if a1.len() != a2.len() {
                    let err = TypeError::ArityMismatch {
                        expected: a1.len(),
                        found: a2.len(),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                for (a, b) in a1.into_iter().zip(a2.into_iter()) {
                    self.unify(a, b, span)?;
                }
                Ok(())
            }

            // Any other shape combination is a mismatch.
            (a, b) => {
                let err = TypeError::Mismatch {
                    expected: a,
                    found: b,
                    span,
                };
                self.errors.push(err.clone());
                Err(err)
            }
        }
    }

    // ── Level Management ────────────────────────────────────────────────

    /// Enter a new let-binding level (increases nesting depth).
    pub fn enter_level(&mut self) {
        self.current_level += 1;
    }

    /// Leave the current let-binding level (decreases nesting depth).
    pub fn leave_level(&mut self) {
        debug_assert!(self.current_level > 0, "cannot leave level 0");
        self.current_level -= 1;
    }

    // ── Generalization ──────────────────────────────────────────────────

    /// Generalize a type into a polymorphic scheme.
    ///
    /// Quantifies the type variables whose creation level is strictly
    /// deeper than the current level. Such variables cannot appear free in
    /// the surrounding environment, which keeps the scheme invariant: only
    /// env-free variables get quantified.
    pub fn generalize(&mut self, ty: Ty) -> Scheme {
        let resolved = self.resolve(ty);
        let mut free_vars = Vec::new();
        self.collect_generalizable_vars(&resolved, &mut free_vars);
        let mut seen = std::collections::HashSet::new();
        free_vars.retain(|v| seen.insert(*v));
        Scheme {
            vars: free_vars,
            ty: resolved,
        }
    }

    /// Collect type variables that can be generalized (level > current).
    fn collect_generalizable_vars(&mut self, ty: &Ty, out: &mut Vec<TyVar>) {
        match ty {
            Ty::Var(v) => match self.table.probe_value(*v) {
                Some(inner) => self.collect_generalizable_vars(&inner, out),
                None => {
                    let root = self.table.find(*v);
                    let level = self.var_levels.get(root.0 as usize).copied().unwrap_or(0);
                    if level > self.current_level {
                        out.push(root);
                    }
                }
            },
            Ty::Con(_) => {}
            Ty::Fun(params, ret) => {
                for p in params {
                    self.collect_generalizable_vars(p, out);
                }
                self.collect_generalizable_vars(ret, out);
            }
            Ty::Record { fields, .. } => {
                for ty in fields.values() {
                    self.collect_generalizable_vars(ty, out);
                }
            }
            Ty::List(elem) => self.collect_generalizable_vars(elem, out),
            Ty::App(_, args) => {
                for a in args {
                    self.collect_generalizable_vars(a, out);
                }
            }
        }
    }

    // ── Instantiation ───────────────────────────────────────────────────

    /// Instantiate a polymorphic scheme with fresh type variables.
    ///
    /// Creates a fresh variable for each quantified variable in the
    /// scheme, then substitutes them throughout the type.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }

        let substitution: FxHashMap<TyVar, Ty> = scheme
            .vars
            .iter()
            .map(|v| (*v, self.fresh_var()))
            .collect();

        self.apply_substitution(&scheme.ty, &substitution)
    }

    /// Apply a substitution map to a type.
    fn apply_substitution(&mut self, ty: &Ty, subst: &FxHashMap<TyVar, Ty>) -> Ty {
        match ty {
            Ty::Var(v) => {
                if let Some(replacement) = subst.get(v) {
                    replacement.clone()
                } else {
                    match self.table.probe_value(*v) {
                        Some(inner) => self.apply_substitution(&inner, subst),
                        None => {
                            // The scheme may reference the var through a
                            // different key of the same class.
                            let root = self.table.find(*v);
                            subst.get(&root).cloned().unwrap_or_else(|| ty.clone())
                        }
                    }
                }
            }
            Ty::Con(_) => ty.clone(),
            Ty::Fun(params, ret) => {
                let params = params
                    .iter()
                    .map(|p| self.apply_substitution(p, subst))
                    .collect();
                let ret = Box::new(self.apply_substitution(ret, subst));
                Ty::Fun(params, ret)
            }
            Ty::Record { fields, open } => Ty::Record {
                fields: fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), self.apply_substitution(ty, subst)))
                    .collect(),
                open: *open,
            },
            Ty::List(elem) => Ty::List(Box::new(self.apply_substitution(elem, subst))),
            Ty::App(con, args) => {
                let args = args
                    .iter()
                    .map(|a| self.apply_substitution(a, subst))
                    .collect();
                Ty::App(con.clone(), args)
            }
        }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn unify_two_fresh_vars() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var();
        let b = ctx.fresh_var();

        assert!(ctx.unify(a.clone(), b.clone(), span()).is_ok());
        assert!(ctx.unify(a.clone(), Ty::int(), span()).is_ok());
        assert_eq!(ctx.resolve(a), Ty::int());
        assert_eq!(ctx.resolve(b), Ty::int());
    }

    #[test]
    fn unify_mismatch_records_error() {
        let mut ctx = InferCtx::new();
        let result = ctx.unify(Ty::int(), Ty::string(), span());
        assert!(result.is_err());
        assert_eq!(ctx.errors.len(), 1);
    }

    #[test]
    fn unify_is_idempotent_on_equal_types() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var();
        ctx.unify(a.clone(), Ty::int(), span()).unwrap();
        let before = ctx.resolve(a.clone());

        // Unifying already-equal types adds no errors and changes nothing.
        ctx.unify(a.clone(), Ty::int(), span()).unwrap();
        ctx.unify(Ty::int(), Ty::int(), span()).unwrap();
        assert!(ctx.errors.is_empty());
        assert_eq!(ctx.resolve(a), before);
    }

    #[test]
    fn occurs_check_infinite_type() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var();
        let fun = Ty::fun(vec![a.clone()], Ty::int());
        let result = ctx.unify(a, fun, span());
        assert!(matches!(result, Err(TypeError::InfiniteType { .. })));
    }

    #[test]
    fn unify_function_arity_mismatch() {
        let mut ctx = InferCtx::new();
        let f1 = Ty::fun(vec![Ty::int()], Ty::string());
        let f2 = Ty::fun(vec![Ty::int(), Ty::int()], Ty::string());
        assert!(matches!(
            ctx.unify(f1, f2, span()),
            Err(TypeError::ArityMismatch {
                expected: 1,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn unify_closed_records_equal_fields() {
        let mut ctx = InferCtx::new();
        let a = Ty::record([("x".to_string(), Ty::int())], false);
        let b = Ty::record([("x".to_string(), Ty::int())], false);
        assert!(ctx.unify(a, b, span()).is_ok());
    }

    #[test]
    fn unify_closed_record_missing_field_errors() {
        let mut ctx = InferCtx::new();
        let a = Ty::record(
            [("x".to_string(), Ty::int()), ("y".to_string(), Ty::int())],
            false,
        );
        let b = Ty::record([("x".to_string(), Ty::int())], false);
        assert!(matches!(
            ctx.unify(a, b, span()),
            Err(TypeError::MissingField { .. })
        ));
    }

    #[test]
    fn unify_open_record_tolerates_extras() {
        let mut ctx = InferCtx::new();
        // A closed record with extra fields satisfies an open constraint.
        let closed = Ty::record(
            [
                ("x".to_string(), Ty::int()),
                ("y".to_string(), Ty::string()),
            ],
            false,
        );
        let open = Ty::record([("x".to_string(), Ty::int())], true);
        assert!(ctx.unify(open, closed, span()).is_ok());
    }

    #[test]
    fn unify_open_record_field_type_still_checked() {
        let mut ctx = InferCtx::new();
        let closed = Ty::record([("x".to_string(), Ty::string())], false);
        let open = Ty::record([("x".to_string(), Ty::int())], true);
        assert!(ctx.unify(open, closed, span()).is_err());
    }

    #[test]
    fn var_bound_to_open_record_via_unification() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_var();
        let open = Ty::record([("name".to_string(), Ty::string())], true);
        ctx.unify(v.clone(), open.clone(), span()).unwrap();
        assert_eq!(ctx.resolve(v), open);
    }

    #[test]
    fn unify_lists() {
        let mut ctx = InferCtx::new();
        let elem = ctx.fresh_var();
        let l1 = Ty::list(elem.clone());
        let l2 = Ty::list(Ty::int());
        assert!(ctx.unify(l1, l2, span()).is_ok());
        assert_eq!(ctx.resolve(elem), Ty::int());
    }

    #[test]
    fn unify_apps_require_same_constructor() {
        let mut ctx = InferCtx::new();
        assert!(ctx
            .unify(Ty::option(Ty::int()), Ty::option(Ty::int()), span())
            .is_ok());
        assert!(ctx
            .unify(
                Ty::option(Ty::int()),
                Ty::result(Ty::int(), Ty::string()),
                span()
            )
            .is_err());
    }

    #[test]
    fn generalize_and_instantiate_round_trip() {
        let mut ctx = InferCtx::new();

        ctx.enter_level();
        let a = ctx.fresh_var();
        let identity_ty = Ty::fun(vec![a.clone()], a);
        ctx.leave_level();

        let scheme = ctx.generalize(identity_ty.clone());
        assert_eq!(scheme.vars.len(), 1, "should quantify one var");

        // Two instantiations yield distinct fresh variables.
        let inst1 = ctx.instantiate(&scheme);
        let inst2 = ctx.instantiate(&scheme);
        match (&inst1, &inst2) {
            (Ty::Fun(p1, _), Ty::Fun(p2, _)) => assert_ne!(p1[0], p2[0]),
            _ => panic!("expected function types"),
        }

        // The instantiation still unifies with the original type.
        assert!(ctx.unify(inst1, identity_ty, span()).is_ok());
    }

    #[test]
    fn vars_created_at_outer_level_not_generalized() {
        let mut ctx = InferCtx::new();
        let outer = ctx.fresh_var();

        ctx.enter_level();
        let inner = ctx.fresh_var();
        let ty = Ty::fun(vec![outer.clone()], inner);
        ctx.leave_level();

        let scheme = ctx.generalize(ty);
        // Only the inner variable is quantified.
        assert_eq!(scheme.vars.len(), 1);
    }
}
