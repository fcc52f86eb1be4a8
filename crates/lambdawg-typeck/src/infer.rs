//! Hindley-Milner inference engine for Lambdawg.
//!
//! Walks the AST, generates constraints, and solves them through the
//! unification context. Implements:
//! - Let-polymorphism (generalize at `let` boundaries, instantiate at use)
//! - Fix-point recursion (the binder is in scope monomorphically while its
//!   own value is inferred)
//! - Occurs check (rejects infinite types)
//! - Row-open records for member access on partially known values
//! - Placeholder partial application: `f(_, x)` types as a fresh function
//!   of the placeholder positions
//! - Pipeline application: the left type unifies with the right's last
//!   parameter
//!
//! Inference never aborts: a failed constraint is recorded and the
//! offending site continues with a fresh type variable.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use lambdawg_common::diagnostic::Diagnostic;
use lambdawg_common::span::Span;
use lambdawg_parser::ast::{
    DoStatement, Expr, ExprKind, Import, ImportItems, LetStatement, Module, NodeId, Pattern,
    PatternKind, PatternLiteral, Program, Statement, TypeDef, TypeDefBody, TypeExpr, TypeExprKind,
};

use crate::builtins::{self, TypeInfo, TypeTable};
use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::ty::{Scheme, Ty, TyCon};
use crate::unify::InferCtx;

/// The products of one inference run: the external node-to-type map plus
/// the diagnostics.
#[derive(Debug)]
pub struct TypeckResult {
    pub types: FxHashMap<NodeId, Ty>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeckResult {
    /// Whether inference completed without errors.
    pub fn ok(&self) -> bool {
        self.diagnostics.iter().all(|d| !d.is_error())
    }
}

/// Infer types for a parsed program.
///
/// Creates a fresh inference context (the type-variable counter restarts
/// at zero), registers builtins, then walks modules and top-level
/// statements in source order.
pub fn infer(program: &Program) -> TypeckResult {
    let mut inferencer = Inferencer::new();
    inferencer.infer_program(program);
    inferencer.finish()
}

struct Inferencer {
    ctx: InferCtx,
    env: TypeEnv,
    /// Named types visible to annotations, seeded with the builtins.
    table: TypeTable,
    /// Alias definitions: name -> (params, body).
    aliases: FxHashMap<String, (Vec<String>, TypeExpr)>,
    /// The external node-to-type annotation map.
    types: FxHashMap<NodeId, Ty>,
}

impl Inferencer {
    fn new() -> Self {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        builtins::register_builtins(&mut ctx, &mut env);
        Inferencer {
            ctx,
            env,
            table: builtins::builtin_type_table(),
            aliases: FxHashMap::default(),
            types: FxHashMap::default(),
        }
    }

    fn infer_program(&mut self, program: &Program) {
        // Top-level type definitions are declarations: register them first
        // so module bodies can reference their constructors.
        for stmt in &program.statements {
            if let Statement::TypeDef(def) = stmt {
                self.register_type_def(def);
            }
        }
        for module in &program.modules {
            self.infer_module(module);
        }
        for stmt in &program.statements {
            if matches!(stmt, Statement::TypeDef(_)) {
                continue;
            }
            self.infer_statement(stmt);
        }
    }

    fn finish(self) -> TypeckResult {
        let Inferencer {
            mut ctx, types, ..
        } = self;
        let types = types
            .into_iter()
            .map(|(id, ty)| (id, ctx.resolve(ty)))
            .collect();
        let diagnostics = ctx.errors.iter().map(TypeError::to_diagnostic).collect();
        TypeckResult { types, diagnostics }
    }

    // ── Statements ─────────────────────────────────────────────────────

    /// Infer a statement; expression statements report their type so block
    /// inference can use the trailing one.
    fn infer_statement(&mut self, stmt: &Statement) -> Option<Ty> {
        match stmt {
            Statement::Let(l) => {
                self.infer_let(l);
                None
            }
            Statement::TypeDef(def) => {
                self.register_type_def(def);
                None
            }
            Statement::Import(import) => {
                self.infer_import(import);
                None
            }
            Statement::Expression(e) => Some(self.infer_expr(e)),
        }
    }

    /// Infer a `let` statement.
    ///
    /// The binder is pre-bound monomorphically so the value can refer to
    /// itself; generalization happens on exit. Ambient dependencies are in
    /// scope while the value is inferred, typed by their annotations or
    /// fresh variables.
    fn infer_let(&mut self, l: &LetStatement) {
        self.ctx.enter_level();
        self.env.enter_scope();

        let binder = self.ctx.fresh_var();
        self.env
            .bind(l.name.clone(), Scheme::mono(binder.clone()));

        for ambient in &l.ambients {
            let ty = match &ambient.annotation {
                Some(te) => {
                    let mut vars = FxHashMap::default();
                    self.resolve_type_expr(te, &mut vars)
                }
                None => self.ctx.fresh_var(),
            };
            self.env.bind(ambient.name.clone(), Scheme::mono(ty));
        }

        let value_ty = self.infer_expr(&l.value);
        let _ = self.ctx.unify(binder, value_ty.clone(), l.value.span);

        if let Some(ann) = &l.annotation {
            let mut vars = FxHashMap::default();
            let ann_ty = self.resolve_type_expr(ann, &mut vars);
            let _ = self.ctx.unify(value_ty.clone(), ann_ty, ann.span);
        }

        self.env.leave_scope();
        self.ctx.leave_level();

        let scheme = self.ctx.generalize(value_ty);
        self.env.bind(l.name.clone(), scheme);
    }

    /// Infer a module body in a child scope and bind the module name to a
    /// closed record of its non-private declarations.
    fn infer_module(&mut self, module: &Module) {
        self.env.enter_scope();
        for stmt in &module.statements {
            self.infer_statement(stmt);
        }

        let mut fields = BTreeMap::new();
        for stmt in &module.statements {
            if let Statement::Let(l) = stmt {
                if !l.private {
                    if let Some(scheme) = self.env.lookup(&l.name).cloned() {
                        let ty = self.ctx.instantiate(&scheme);
                        fields.insert(l.name.clone(), ty);
                    }
                }
            }
        }
        self.env.leave_scope();

        let record = Ty::Record {
            fields,
            open: false,
        };
        self.env.bind(module.name.clone(), Scheme::mono(record));
    }

    /// Register a type definition: sum types bind a constructor scheme per
    /// variant, aliases are expanded at annotation-resolution time.
    fn register_type_def(&mut self, def: &TypeDef) {
        self.table.insert(
            def.name.clone(),
            TypeInfo {
                arity: def.params.len(),
            },
        );

        match &def.body {
            TypeDefBody::Alias(body) => {
                self.aliases
                    .insert(def.name.clone(), (def.params.clone(), body.clone()));
            }
            TypeDefBody::Sum(variants) => {
                for variant in variants {
                    self.ctx.enter_level();
                    let mut vars: FxHashMap<String, Ty> = FxHashMap::default();
                    for param in &def.params {
                        let v = self.ctx.fresh_var();
                        vars.insert(param.clone(), v);
                    }
                    let result_ty = if def.params.is_empty() {
                        Ty::Con(TyCon::new(def.name.clone()))
                    } else {
                        Ty::App(
                            TyCon::new(def.name.clone()),
                            def.params.iter().map(|p| vars[p].clone()).collect(),
                        )
                    };
                    let ctor_ty = match &variant.fields {
                        // A field-less variant is a plain value of the type.
                        None => result_ty,
                        // A record variant constructs from its field record.
                        Some(fields) => {
                            let mut map = BTreeMap::new();
                            for field in fields {
                                let ty = self.resolve_type_expr(&field.ty, &mut vars);
                                map.insert(field.name.clone(), ty);
                            }
                            Ty::fun(
                                vec![Ty::Record {
                                    fields: map,
                                    open: false,
                                }],
                                result_ty,
                            )
                        }
                    };
                    self.ctx.leave_level();
                    let scheme = self.ctx.generalize(ctor_ty);
                    self.env.bind(variant.name.clone(), scheme);
                }
            }
        }
    }

    /// Bind imported names. Imports from in-artifact modules take the
    /// module record's field types; `js` and unknown imports bind fresh
    /// variables so uses type-check.
    fn infer_import(&mut self, import: &Import) {
        let module_ty = if import.js {
            None
        } else {
            self.env.lookup(&import.module).map(|s| s.ty.clone())
        };
        let module_fields = match module_ty.map(|t| self.ctx.resolve(t)) {
            Some(Ty::Record { fields, .. }) => Some(fields),
            _ => None,
        };

        match &import.items {
            None => {}
            Some(ImportItems::All) => {
                if let Some(fields) = module_fields {
                    for (name, ty) in fields {
                        self.env.bind(name, Scheme::mono(ty));
                    }
                }
            }
            Some(ImportItems::Named(items)) => {
                for item in items {
                    let ty = module_fields
                        .as_ref()
                        .and_then(|fields| fields.get(&item.name).cloned())
                        .unwrap_or_else(|| self.ctx.fresh_var());
                    let bound = item.alias.clone().unwrap_or_else(|| item.name.clone());
                    self.env.bind(bound, Scheme::mono(ty));
                }
            }
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    /// Infer an expression and record its type in the node map.
    fn infer_expr(&mut self, expr: &Expr) -> Ty {
        let ty = self.infer_expr_kind(expr);
        self.types.insert(expr.id, ty.clone());
        ty
    }

    fn infer_expr_kind(&mut self, expr: &Expr) -> Ty {
        match &expr.kind {
            ExprKind::Int(_) => Ty::int(),
            ExprKind::Float(_) => Ty::float(),
            ExprKind::Str(_) => Ty::string(),
            ExprKind::Char(_) => Ty::char(),
            ExprKind::Bool(_) => Ty::bool(),

            ExprKind::Identifier(name) => match self.env.lookup(name).cloned() {
                Some(scheme) => self.ctx.instantiate(&scheme),
                None => {
                    self.ctx.errors.push(TypeError::UnboundVariable {
                        name: name.clone(),
                        span: expr.span,
                    });
                    self.ctx.fresh_var()
                }
            },

            ExprKind::List(elements) => {
                let elem = self.ctx.fresh_var();
                for el in elements {
                    let t = self.infer_expr(el);
                    if matches!(el.kind, ExprKind::Spread(_)) {
                        // A spread contributes a whole list of elements.
                        let _ = self.ctx.unify(t, Ty::list(elem.clone()), el.span);
                    } else {
                        let _ = self.ctx.unify(t, elem.clone(), el.span);
                    }
                }
                Ty::list(elem)
            }

            ExprKind::Record { spread, fields } => {
                let mut map = BTreeMap::new();
                let mut open = false;
                if let Some(sp) = spread {
                    let t = self.infer_expr(sp);
                    match self.ctx.resolve(t.clone()) {
                        // A known record's fields merge in first, then the
                        // explicit fields override.
                        Ty::Record { fields, .. } => map.extend(fields),
                        _ => {
                            // Unknown spread: require record-ness and keep
                            // the result open to its fields.
                            let _ = self.ctx.unify(t, Ty::record([], true), sp.span);
                            open = true;
                        }
                    }
                }
                let mut seen = FxHashSet::default();
                for field in fields {
                    if !seen.insert(field.name.clone()) {
                        self.ctx.errors.push(TypeError::DuplicateField {
                            name: field.name.clone(),
                            span: field.span,
                        });
                    }
                    let t = self.infer_expr(&field.value);
                    map.insert(field.name.clone(), t);
                }
                Ty::Record { fields: map, open }
            }

            ExprKind::Function { params, body } => {
                self.env.enter_scope();
                let mut param_tys = Vec::new();
                for param in params {
                    let v = self.ctx.fresh_var();
                    self.bind_pattern(param, v.clone());
                    param_tys.push(v);
                }
                let body_ty = self.infer_expr(body);
                self.env.leave_scope();
                Ty::Fun(param_tys, Box::new(body_ty))
            }

            ExprKind::Call { callee, args } => self.infer_call(expr.span, callee, args),

            ExprKind::Member {
                object,
                field,
                field_span,
            } => {
                let obj_ty = self.infer_expr(object);
                let resolved = self.ctx.resolve(obj_ty.clone());
                match resolved {
                    Ty::Record { ref fields, open } => match fields.get(field) {
                        Some(t) => t.clone(),
                        None if open => self.ctx.fresh_var(),
                        None => {
                            self.ctx.errors.push(TypeError::MissingField {
                                field: field.clone(),
                                record: resolved.clone(),
                                span: *field_span,
                            });
                            self.ctx.fresh_var()
                        }
                    },
                    // A variable (or anything else) is constrained to "has
                    // at least this field" via an open record.
                    other => {
                        let rho = self.ctx.fresh_var();
                        let constraint = Ty::record([(field.clone(), rho.clone())], true);
                        let _ = self.ctx.unify(other, constraint, *field_span);
                        rho
                    }
                }
            }

            ExprKind::Index { object, index } => {
                let obj_ty = self.infer_expr(object);
                let idx_ty = self.infer_expr(index);
                let elem = self.ctx.fresh_var();
                let _ = self.ctx.unify(obj_ty, Ty::list(elem.clone()), object.span);
                let _ = self.ctx.unify(idx_ty, Ty::int(), index.span);
                elem
            }

            ExprKind::Unary { op, operand } => {
                let t = self.infer_expr(operand);
                match op {
                    lambdawg_parser::ast::UnaryOp::Neg => t,
                    lambdawg_parser::ast::UnaryOp::Not => {
                        let _ = self.ctx.unify(t, Ty::bool(), operand.span);
                        Ty::bool()
                    }
                }
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.infer_expr(lhs);
                let r = self.infer_expr(rhs);
                if op.is_logical() {
                    let _ = self.ctx.unify(l, Ty::bool(), lhs.span);
                    let _ = self.ctx.unify(r, Ty::bool(), rhs.span);
                    Ty::bool()
                } else if op.is_comparison() {
                    let _ = self.ctx.unify(l, r, expr.span);
                    Ty::bool()
                } else {
                    let _ = self.ctx.unify(l.clone(), r, expr.span);
                    l
                }
            }

            ExprKind::Pipeline { left, right, .. } => {
                let left_ty = self.infer_expr(left);
                let right_ty = self.infer_expr(right);
                match self.ctx.resolve(right_ty.clone()) {
                    Ty::Fun(params, ret) => match params.last() {
                        Some(last) => {
                            let _ = self.ctx.unify(left_ty, last.clone(), left.span);
                            *ret
                        }
                        None => {
                            self.ctx.errors.push(TypeError::ArityMismatch {
                                expected: 1,
                                found: 0,
                                span: right.span,
                            });
                            self.ctx.fresh_var()
                        }
                    },
                    Ty::Var(_) => {
                        let ret = self.ctx.fresh_var();
                        let expected = Ty::fun(vec![left_ty], ret.clone());
                        let _ = self.ctx.unify(right_ty, expected, expr.span);
                        ret
                    }
                    other => {
                        self.ctx.errors.push(TypeError::NotAFunction {
                            ty: other,
                            span: right.span,
                        });
                        self.ctx.fresh_var()
                    }
                }
            }

            // The operand's type passes through unchanged; see the design
            // notes on constraining this to `Result a e` in the future.
            ExprKind::Try(operand) => self.infer_expr(operand),

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let c = self.infer_expr(condition);
                let _ = self.ctx.unify(c, Ty::bool(), condition.span);
                let t = self.infer_expr(then_branch);
                let e = self.infer_expr(else_branch);
                let _ = self.ctx.unify(t.clone(), e, else_branch.span);
                t
            }

            ExprKind::Match { subject, arms } => {
                let subject_ty = self.infer_expr(subject);
                let mut result: Option<Ty> = None;
                for arm in arms {
                    self.env.enter_scope();
                    self.bind_pattern(&arm.pattern, subject_ty.clone());
                    if let Some(guard) = &arm.guard {
                        let g = self.infer_expr(guard);
                        let _ = self.ctx.unify(g, Ty::bool(), guard.span);
                    }
                    let body_ty = self.infer_expr(&arm.body);
                    self.env.leave_scope();
                    match &result {
                        // The first arm seeds the running result type.
                        None => result = Some(body_ty),
                        Some(r) => {
                            let _ = self.ctx.unify(r.clone(), body_ty, arm.body.span);
                        }
                    }
                }
                result.unwrap_or_else(|| self.ctx.fresh_var())
            }

            ExprKind::Do { statements, .. } => {
                self.env.enter_scope();
                let mut last = Ty::unit();
                for stmt in statements {
                    last = match stmt {
                        DoStatement::Let { pattern, value, .. } => {
                            let vty = self.infer_expr(value);
                            self.bind_pattern(pattern, vty.clone());
                            vty
                        }
                        DoStatement::Effect { value, .. } => self.infer_expr(value),
                        DoStatement::Expr(e) => self.infer_expr(e),
                    };
                }
                self.env.leave_scope();
                last
            }

            ExprKind::Provide { provisions, body } => {
                // Provision values are evaluated in the enclosing scope.
                let bound: Vec<(String, Ty)> = provisions
                    .iter()
                    .map(|p| (p.name.clone(), self.infer_expr(&p.value)))
                    .collect();
                self.env.enter_scope();
                for (name, ty) in bound {
                    self.env.bind(name, Scheme::mono(ty));
                }
                let body_ty = self.infer_expr(body);
                self.env.leave_scope();
                body_ty
            }

            ExprKind::Block(statements) => {
                self.env.enter_scope();
                let mut last = None;
                for stmt in statements {
                    last = self.infer_statement(stmt);
                }
                self.env.leave_scope();
                last.unwrap_or_else(Ty::unit)
            }

            // A placeholder outside an argument list constrains nothing.
            ExprKind::Placeholder => self.ctx.fresh_var(),

            ExprKind::Spread(operand) => self.infer_expr(operand),
        }
    }

    /// Infer a call expression.
    ///
    /// A call with placeholder arguments *is* a partial application: fresh
    /// variables stand in for the holes, the callee unifies against the
    /// expected shape, and the whole call types as a function of the
    /// holes. An ordinary call unifies the callee with `(args) -> rho`.
    fn infer_call(&mut self, span: Span, callee: &Expr, args: &[Expr]) -> Ty {
        let has_placeholder = args
            .iter()
            .any(|a| matches!(a.kind, ExprKind::Placeholder));

        if has_placeholder {
            let ret = self.ctx.fresh_var();
            let mut expected_params = Vec::new();
            let mut holes = Vec::new();
            for arg in args {
                if matches!(arg.kind, ExprKind::Placeholder) {
                    let v = self.ctx.fresh_var();
                    self.types.insert(arg.id, v.clone());
                    holes.push(v.clone());
                    expected_params.push(v);
                } else {
                    expected_params.push(self.infer_expr(arg));
                }
            }
            let callee_ty = self.infer_expr(callee);
            let expected = Ty::Fun(expected_params, Box::new(ret.clone()));
            let _ = self.ctx.unify(callee_ty, expected, span);
            return Ty::Fun(holes, Box::new(ret));
        }

        let arg_tys: Vec<Ty> = args.iter().map(|a| self.infer_expr(a)).collect();
        let callee_ty = self.infer_expr(callee);
        let ret = self.ctx.fresh_var();

        let resolved = self.ctx.resolve(callee_ty.clone());
        match resolved {
            Ty::Fun(ref params, _) if params.len() != arg_tys.len() => {
                self.ctx.errors.push(TypeError::ArityMismatch {
                    expected: params.len(),
                    found: arg_tys.len(),
                    span,
                });
                ret
            }
            Ty::Con(_) | Ty::Record { .. } | Ty::List(_) | Ty::App(..) => {
                self.ctx.errors.push(TypeError::NotAFunction {
                    ty: resolved,
                    span: callee.span,
                });
                ret
            }
            _ => {
                let expected = Ty::Fun(arg_tys, Box::new(ret.clone()));
                match self.ctx.unify(callee_ty, expected, span) {
                    Ok(()) => ret,
                    Err(_) => self.ctx.fresh_var(),
                }
            }
        }
    }

    // ── Patterns ───────────────────────────────────────────────────────

    /// Bind a pattern against an expected type, adding monomorphic schemes
    /// for every captured name.
    fn bind_pattern(&mut self, pattern: &Pattern, expected: Ty) {
        match &pattern.kind {
            PatternKind::Identifier(name) => {
                self.env.bind(name.clone(), Scheme::mono(expected));
            }

            PatternKind::Literal(lit) => {
                let lit_ty = match lit {
                    PatternLiteral::Int(_) => Ty::int(),
                    PatternLiteral::Float(_) => Ty::float(),
                    PatternLiteral::Str(_) => Ty::string(),
                    PatternLiteral::Char(_) => Ty::char(),
                    PatternLiteral::Bool(_) => Ty::bool(),
                };
                let _ = self.ctx.unify(expected, lit_ty, pattern.span);
            }

            PatternKind::Wildcard => {}

            PatternKind::List { elements, rest } => {
                let elem = self.ctx.fresh_var();
                let _ = self
                    .ctx
                    .unify(expected, Ty::list(elem.clone()), pattern.span);
                for el in elements {
                    self.bind_pattern(el, elem.clone());
                }
                if let Some(rest) = rest {
                    if let Some(name) = &rest.name {
                        self.env
                            .bind(name.clone(), Scheme::mono(Ty::list(elem)));
                    }
                }
            }

            PatternKind::Record { fields, .. } => {
                let mut map = BTreeMap::new();
                for field in fields {
                    let v = self.ctx.fresh_var();
                    match &field.pattern {
                        Some(sub) => self.bind_pattern(sub, v.clone()),
                        None => self
                            .env
                            .bind(field.name.clone(), Scheme::mono(v.clone())),
                    }
                    map.insert(field.name.clone(), v);
                }
                let constraint = Ty::Record {
                    fields: map,
                    open: true,
                };
                let _ = self.ctx.unify(expected, constraint, pattern.span);
            }

            PatternKind::Constructor { name, arg } => {
                match self.env.lookup(name).cloned() {
                    Some(scheme) => {
                        let inst = self.ctx.instantiate(&scheme);
                        match self.ctx.resolve(inst) {
                            Ty::Fun(params, ret) => {
                                let _ = self.ctx.unify(expected, *ret, pattern.span);
                                let param = params
                                    .into_iter()
                                    .next()
                                    .unwrap_or_else(|| self.ctx.fresh_var());
                                if let Some(sub) = arg {
                                    self.bind_pattern(sub, param);
                                }
                            }
                            other => {
                                let _ = self.ctx.unify(expected, other, pattern.span);
                                if let Some(sub) = arg {
                                    let v = self.ctx.fresh_var();
                                    self.bind_pattern(sub, v);
                                }
                            }
                        }
                    }
                    None => {
                        self.ctx.errors.push(TypeError::UnboundVariable {
                            name: name.clone(),
                            span: pattern.span,
                        });
                        if let Some(sub) = arg {
                            let v = self.ctx.fresh_var();
                            self.bind_pattern(sub, v);
                        }
                    }
                }
            }

            PatternKind::Rest(rest) => {
                if let Some(name) = &rest.name {
                    self.env.bind(name.clone(), Scheme::mono(expected));
                }
            }
        }
    }

    // ── Type annotations ───────────────────────────────────────────────

    /// Resolve a surface type expression to a type. Lowercase names are
    /// annotation-scoped type variables, shared through `vars`.
    fn resolve_type_expr(&mut self, te: &TypeExpr, vars: &mut FxHashMap<String, Ty>) -> Ty {
        match &te.kind {
            TypeExprKind::Named(name) => {
                if name
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_lowercase() || c == '_')
                {
                    return vars
                        .entry(name.clone())
                        .or_insert_with(|| self.ctx.fresh_var())
                        .clone();
                }
                self.resolve_named(name, Vec::new(), te.span)
            }
            TypeExprKind::App(name, args) => {
                let arg_tys: Vec<Ty> = args
                    .iter()
                    .map(|a| self.resolve_type_expr(a, vars))
                    .collect();
                self.resolve_named(name, arg_tys, te.span)
            }
            TypeExprKind::Fun(params, ret) => {
                let param_tys = params
                    .iter()
                    .map(|p| self.resolve_type_expr(p, vars))
                    .collect();
                let ret_ty = self.resolve_type_expr(ret, vars);
                Ty::Fun(param_tys, Box::new(ret_ty))
            }
            TypeExprKind::Record(fields) => {
                let mut map = BTreeMap::new();
                for field in fields {
                    if map.contains_key(&field.name) {
                        self.ctx.errors.push(TypeError::DuplicateField {
                            name: field.name.clone(),
                            span: te.span,
                        });
                    }
                    let ty = self.resolve_type_expr(&field.ty, vars);
                    map.insert(field.name.clone(), ty);
                }
                Ty::Record {
                    fields: map,
                    open: false,
                }
            }
            TypeExprKind::List(inner) => Ty::list(self.resolve_type_expr(inner, vars)),
            TypeExprKind::Paren(inner) => self.resolve_type_expr(inner, vars),
        }
    }

    /// Resolve a named type applied to arguments: alias expansion, builtin
    /// constants, `List`, and registered sum types.
    fn resolve_named(&mut self, name: &str, args: Vec<Ty>, span: Span) -> Ty {
        if let Some((params, body)) = self.aliases.get(name).cloned() {
            if params.len() != args.len() {
                self.ctx.errors.push(TypeError::ArityMismatch {
                    expected: params.len(),
                    found: args.len(),
                    span,
                });
                return self.ctx.fresh_var();
            }
            let mut vars: FxHashMap<String, Ty> = params.into_iter().zip(args).collect();
            return self.resolve_type_expr(&body, &mut vars);
        }

        match self.table.get(name).cloned() {
            Some(info) => {
                if info.arity != args.len() {
                    self.ctx.errors.push(TypeError::ArityMismatch {
                        expected: info.arity,
                        found: args.len(),
                        span,
                    });
                    return self.ctx.fresh_var();
                }
                if name == "List" {
                    let elem = args.into_iter().next().expect("List has arity 1");
                    return Ty::list(elem);
                }
                if args.is_empty() {
                    Ty::Con(TyCon::new(name))
                } else {
                    Ty::App(TyCon::new(name), args)
                }
            }
            None => {
                self.ctx.errors.push(TypeError::UndefinedType {
                    name: name.to_string(),
                    span,
                });
                self.ctx.fresh_var()
            }
        }
    }
}
