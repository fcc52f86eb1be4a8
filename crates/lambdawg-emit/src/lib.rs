//! Lambdawg JavaScript emitter.
//!
//! Lowers the AST to JavaScript source text. Emission is purely
//! syntax-directed: it never consults inferred types, preserves source
//! order, and prepends the fixed runtime prelude from [`prelude`].
//!
//! Lowering contracts:
//! - modules become self-executing scopes yielding a record of their
//!   non-private names
//! - `with` ambients become a curried parameter list
//! - binders colliding with JavaScript reserved words are renamed with an
//!   underscore prefix at definition and every use site
//! - placeholder calls become fresh closures with the holes substituted at
//!   their original indices
//! - pipelines become `pipe(left, right)` calls
//! - matches become subject-bound IIFEs with structural tests in source
//!   order and a non-exhaustive failure after the last arm
//! - do blocks become async IIFEs; `do!` statements are awaited
//! - `?` becomes `unwrap(...)`

pub mod prelude;

use lambdawg_parser::ast::{
    DoStatement, Expr, ExprKind, Import, ImportItems, MatchArm, Module, Pattern, PatternKind,
    PatternLiteral, Program, Statement, TypeDef, TypeDefBody,
};

/// Options controlling emission.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Whether to prepend the runtime prelude. On by default; hosts that
    /// concatenate several artifacts disable it for all but the first.
    pub include_prelude: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            include_prelude: true,
        }
    }
}

/// Emit a program as JavaScript source text.
pub fn emit(program: &Program, options: &EmitOptions) -> String {
    let mut emitter = Emitter::new();
    let mut out = String::new();
    if options.include_prelude {
        out.push_str(prelude::PRELUDE);
        out.push('\n');
    }
    out.push_str(&emitter.program(program));
    out
}

/// JavaScript reserved words (plus standing globals the artifact relies
/// on). A source binder with one of these names is emitted with a single
/// underscore prefix, applied uniformly at definition and use sites.
const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "finally", "for", "function", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "new", "null", "of",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
];

/// Rewrite an identifier that collides with a target reserved word.
fn js_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Render a string as a JavaScript double-quoted literal.
fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\u0000"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a pattern literal for an equality test.
fn literal_js(lit: &PatternLiteral) -> String {
    match lit {
        PatternLiteral::Int(v) => v.to_string(),
        PatternLiteral::Float(v) => format!("{v}"),
        PatternLiteral::Str(s) => js_string(s),
        PatternLiteral::Char(c) => js_string(&c.to_string()),
        PatternLiteral::Bool(b) => b.to_string(),
    }
}

struct Emitter {
    /// Current indentation depth (two spaces per level).
    indent: usize,
    /// Fresh-name counter, reset per emission run so output is
    /// deterministic.
    tmp: u32,
}

impl Emitter {
    fn new() -> Self {
        Emitter { indent: 0, tmp: 0 }
    }

    fn pad(&self) -> String {
        "  ".repeat(self.indent)
    }

    fn fresh(&mut self, prefix: &str) -> String {
        let n = self.tmp;
        self.tmp += 1;
        format!("{prefix}{n}")
    }

    // ── Top level ──────────────────────────────────────────────────────

    fn program(&mut self, program: &Program) -> String {
        let mut out = String::new();
        for module in &program.modules {
            out.push_str(&self.module(module));
            out.push('\n');
        }
        for stmt in &program.statements {
            let rendered = self.statement(stmt);
            // Aliases and bare imports emit nothing.
            if !rendered.is_empty() {
                out.push_str(&rendered);
                out.push('\n');
            }
        }
        out
    }

    /// A module becomes a self-executing scope binding all declarations
    /// and yielding a record of the non-private ones.
    fn module(&mut self, module: &Module) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}const {} = (() => {{\n",
            self.pad(),
            js_ident(&module.name)
        ));
        self.indent += 1;
        for stmt in &module.statements {
            let rendered = self.statement(stmt);
            if !rendered.is_empty() {
                out.push_str(&rendered);
                out.push('\n');
            }
        }
        let exports: Vec<String> = module
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::Let(l) if !l.private => Some(js_ident(&l.name)),
                _ => None,
            })
            .collect();
        if exports.is_empty() {
            out.push_str(&format!("{}return {{}};\n", self.pad()));
        } else {
            out.push_str(&format!(
                "{}return {{ {} }};\n",
                self.pad(),
                exports.join(", ")
            ));
        }
        self.indent -= 1;
        out.push_str(&format!("{}}})();", self.pad()));
        out
    }

    fn statement(&mut self, stmt: &Statement) -> String {
        match stmt {
            Statement::Let(l) => {
                let value = self.expr(&l.value);
                // An ambient list curries into a leading parameter list.
                let value = if l.ambients.is_empty() {
                    value
                } else {
                    let params: Vec<String> =
                        l.ambients.iter().map(|a| js_ident(&a.name)).collect();
                    format!("({}) => {}", params.join(", "), value)
                };
                format!("{}const {} = {};", self.pad(), js_ident(&l.name), value)
            }
            Statement::TypeDef(def) => self.type_def(def),
            Statement::Import(import) => self.import(import),
            Statement::Expression(e) => {
                let rendered = self.expr(e);
                // A leading brace would parse as a block statement.
                if rendered.starts_with('{') {
                    format!("{}({});", self.pad(), rendered)
                } else {
                    format!("{}{};", self.pad(), rendered)
                }
            }
        }
    }

    /// Sum types emit one tagging constructor per variant; aliases emit
    /// nothing.
    fn type_def(&mut self, def: &TypeDef) -> String {
        match &def.body {
            TypeDefBody::Alias(_) => String::new(),
            TypeDefBody::Sum(variants) => {
                let mut lines = Vec::new();
                for variant in variants {
                    let line = if variant.fields.is_some() {
                        format!(
                            "{}const {} = (fields) => ({{ __tag: {}, ...fields }});",
                            self.pad(),
                            js_ident(&variant.name),
                            js_string(&variant.name)
                        )
                    } else {
                        format!(
                            "{}const {} = {{ __tag: {} }};",
                            self.pad(),
                            js_ident(&variant.name),
                            js_string(&variant.name)
                        )
                    };
                    lines.push(line);
                }
                lines.join("\n")
            }
        }
    }

    /// Named imports lower to a destructuring binding over the module
    /// value; `*` and bare imports bind nothing.
    fn import(&mut self, import: &Import) -> String {
        match &import.items {
            Some(ImportItems::Named(items)) if !items.is_empty() => {
                let binds: Vec<String> = items
                    .iter()
                    .map(|item| match &item.alias {
                        Some(alias) => format!("{}: {}", item.name, js_ident(alias)),
                        None => js_ident(&item.name),
                    })
                    .collect();
                format!(
                    "{}const {{ {} }} = {};",
                    self.pad(),
                    binds.join(", "),
                    js_ident(&import.module)
                )
            }
            _ => String::new(),
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn expr(&mut self, e: &Expr) -> String {
        match &e.kind {
            ExprKind::Int(v) => v.to_string(),
            ExprKind::Float(v) => format!("{v}"),
            ExprKind::Str(s) => js_string(s),
            ExprKind::Char(c) => js_string(&c.to_string()),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Identifier(name) => js_ident(name),

            ExprKind::List(elements) => {
                let rendered: Vec<String> = elements.iter().map(|el| self.expr(el)).collect();
                format!("[{}]", rendered.join(", "))
            }

            ExprKind::Record { spread, fields } => {
                let mut parts = Vec::new();
                // The spread expands before explicit fields so later
                // field writes win.
                if let Some(sp) = spread {
                    parts.push(format!("...{}", self.atom(sp)));
                }
                for field in fields {
                    parts.push(format!("{}: {}", field.name, self.expr(&field.value)));
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join(", "))
                }
            }

            ExprKind::Function { params, body } => {
                let rendered: Vec<String> = params.iter().map(|p| self.param(p)).collect();
                let body = self.expr(body);
                format!("({}) => {}", rendered.join(", "), body)
            }

            ExprKind::Call { callee, args } => self.call(callee, args),

            ExprKind::Member { object, field, .. } => {
                format!("{}.{}", self.atom(object), field)
            }

            ExprKind::Index { object, index } => {
                let idx = self.expr(index);
                format!("{}[{}]", self.atom(object), idx)
            }

            ExprKind::Unary { op, operand } => {
                let symbol = match op {
                    lambdawg_parser::ast::UnaryOp::Neg => "-",
                    lambdawg_parser::ast::UnaryOp::Not => "!",
                };
                format!("({}{})", symbol, self.atom(operand))
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.expr(lhs);
                let r = self.expr(rhs);
                let symbol = match op {
                    lambdawg_parser::ast::BinaryOp::Eq => "===",
                    lambdawg_parser::ast::BinaryOp::NotEq => "!==",
                    other => other.symbol(),
                };
                format!("({l} {symbol} {r})")
            }

            // The seq flag and parallel hints are recorded in the AST but
            // do not alter emission.
            ExprKind::Pipeline { left, right, .. } => {
                let l = self.expr(left);
                let r = self.expr(right);
                format!("pipe({l}, {r})")
            }

            ExprKind::Try(operand) => {
                let inner = self.expr(operand);
                format!("unwrap({inner})")
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let c = self.expr(condition);
                let t = self.expr(then_branch);
                let e = self.expr(else_branch);
                format!("({c} ? {t} : {e})")
            }

            ExprKind::Match { subject, arms } => self.match_expr(subject, arms),

            ExprKind::Do { statements, .. } => self.do_expr(statements),

            ExprKind::Provide { provisions, body } => {
                let mut out = String::new();
                out.push_str("(() => {\n");
                self.indent += 1;
                for provision in provisions {
                    let value = self.expr(&provision.value);
                    out.push_str(&format!(
                        "{}const {} = {};\n",
                        self.pad(),
                        js_ident(&provision.name),
                        value
                    ));
                }
                let body = self.expr(body);
                out.push_str(&format!("{}return {};\n", self.pad(), body));
                self.indent -= 1;
                out.push_str(&format!("{}}})()", self.pad()));
                out
            }

            ExprKind::Block(statements) => self.block_expr(statements),

            // A stray placeholder outside an argument list has no value.
            ExprKind::Placeholder => "undefined".to_string(),

            ExprKind::Spread(inner) => format!("...{}", self.atom(inner)),
        }
    }

    /// Render an expression, parenthesizing shapes that would not bind as
    /// a call/member/index base.
    fn atom(&mut self, e: &Expr) -> String {
        let rendered = self.expr(e);
        match &e.kind {
            ExprKind::Function { .. }
            | ExprKind::Binary { .. }
            | ExprKind::Unary { .. }
            | ExprKind::If { .. } => format!("({rendered})"),
            _ => rendered,
        }
    }

    /// A call with placeholders lowers to a fresh closure whose parameters
    /// fill the holes at their original indices; an ordinary call lowers
    /// directly.
    fn call(&mut self, callee: &Expr, args: &[Expr]) -> String {
        let has_placeholder = args
            .iter()
            .any(|a| matches!(a.kind, ExprKind::Placeholder));
        let callee_str = self.atom(callee);

        if has_placeholder {
            let mut holes = Vec::new();
            let rendered: Vec<String> = args
                .iter()
                .map(|arg| {
                    if matches!(arg.kind, ExprKind::Placeholder) {
                        let name = self.fresh("__ph");
                        holes.push(name.clone());
                        name
                    } else {
                        self.expr(arg)
                    }
                })
                .collect();
            format!(
                "(({}) => {}({}))",
                holes.join(", "),
                callee_str,
                rendered.join(", ")
            )
        } else {
            let rendered: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
            format!("{}({})", callee_str, rendered.join(", "))
        }
    }

    /// A match lowers to an immediately-invoked block: bind the subject,
    /// then guarded conditionals in source order, then a non-exhaustive
    /// failure.
    fn match_expr(&mut self, subject: &Expr, arms: &[MatchArm]) -> String {
        let subject_str = self.expr(subject);
        let var = self.fresh("__match");

        let mut out = String::new();
        out.push_str("(() => {\n");
        self.indent += 1;
        out.push_str(&format!("{}const {} = {};\n", self.pad(), var, subject_str));

        for arm in arms {
            let test = self.pattern_test(&arm.pattern, &var);
            let mut binds = Vec::new();
            self.pattern_bindings(&arm.pattern, &var, &mut binds);

            let head = match &test {
                Some(t) => format!("{}if ({}) {{\n", self.pad(), t),
                None => format!("{}{{\n", self.pad()),
            };
            out.push_str(&head);
            self.indent += 1;
            for bind in &binds {
                out.push_str(&format!("{}{}\n", self.pad(), bind));
            }
            match &arm.guard {
                Some(guard) => {
                    let g = self.expr(guard);
                    out.push_str(&format!("{}if ({}) {{\n", self.pad(), g));
                    self.indent += 1;
                    let body = self.expr(&arm.body);
                    out.push_str(&format!("{}return {};\n", self.pad(), body));
                    self.indent -= 1;
                    out.push_str(&format!("{}}}\n", self.pad()));
                }
                None => {
                    let body = self.expr(&arm.body);
                    out.push_str(&format!("{}return {};\n", self.pad(), body));
                }
            }
            self.indent -= 1;
            out.push_str(&format!("{}}}\n", self.pad()));
        }

        out.push_str(&format!(
            "{}return __lambdawg.fail(\"non-exhaustive pattern match\");\n",
            self.pad()
        ));
        self.indent -= 1;
        out.push_str(&format!("{}}})()", self.pad()));
        out
    }

    /// A do block lowers to an async IIFE; `do!` right-hand sides are
    /// awaited and the last statement yields the block's value. The `do?`
    /// variant currently shares this lowering.
    fn do_expr(&mut self, statements: &[DoStatement]) -> String {
        let mut out = String::new();
        out.push_str("(async () => {\n");
        self.indent += 1;

        for (i, stmt) in statements.iter().enumerate() {
            let last = i + 1 == statements.len();
            match stmt {
                DoStatement::Let {
                    pattern,
                    value,
                    effectful,
                    ..
                } => {
                    let v = self.expr(value);
                    let rhs = if *effectful { format!("await {v}") } else { v };
                    match &pattern.kind {
                        PatternKind::Identifier(name) => {
                            let name = js_ident(name);
                            out.push_str(&format!("{}const {} = {};\n", self.pad(), name, rhs));
                            if last {
                                out.push_str(&format!("{}return {};\n", self.pad(), name));
                            }
                        }
                        PatternKind::Wildcard => {
                            if last {
                                out.push_str(&format!("{}return {};\n", self.pad(), rhs));
                            } else {
                                out.push_str(&format!("{}{};\n", self.pad(), rhs));
                            }
                        }
                        _ => {
                            let tmp = self.fresh("__do");
                            out.push_str(&format!("{}const {} = {};\n", self.pad(), tmp, rhs));
                            let mut binds = Vec::new();
                            self.pattern_bindings(pattern, &tmp, &mut binds);
                            for bind in binds {
                                out.push_str(&format!("{}{}\n", self.pad(), bind));
                            }
                            if last {
                                out.push_str(&format!("{}return {};\n", self.pad(), tmp));
                            }
                        }
                    }
                }
                DoStatement::Effect { value, .. } => {
                    let v = self.expr(value);
                    if last {
                        out.push_str(&format!("{}return await {};\n", self.pad(), v));
                    } else {
                        out.push_str(&format!("{}await {};\n", self.pad(), v));
                    }
                }
                DoStatement::Expr(e) => {
                    let v = self.expr(e);
                    if last {
                        out.push_str(&format!("{}return {};\n", self.pad(), v));
                    } else {
                        out.push_str(&format!("{}{};\n", self.pad(), v));
                    }
                }
            }
        }

        self.indent -= 1;
        out.push_str(&format!("{}}})()", self.pad()));
        out
    }

    /// A block lowers to an IIFE whose trailing expression statement is
    /// returned.
    fn block_expr(&mut self, statements: &[Statement]) -> String {
        let mut out = String::new();
        out.push_str("(() => {\n");
        self.indent += 1;
        for (i, stmt) in statements.iter().enumerate() {
            let last = i + 1 == statements.len();
            if last {
                if let Statement::Expression(e) = stmt {
                    let v = self.expr(e);
                    out.push_str(&format!("{}return {};\n", self.pad(), v));
                    continue;
                }
            }
            out.push_str(&self.statement(stmt));
            out.push('\n');
        }
        self.indent -= 1;
        out.push_str(&format!("{}}})()", self.pad()));
        out
    }

    // ── Patterns ───────────────────────────────────────────────────────

    /// Render a function parameter from a pattern, using JavaScript
    /// destructuring where the pattern shape allows it.
    fn param(&mut self, pattern: &Pattern) -> String {
        self.binding_target(pattern)
            .unwrap_or_else(|| self.fresh("__p"))
    }

    /// A JavaScript destructuring target for a pattern, when one exists.
    fn binding_target(&mut self, pattern: &Pattern) -> Option<String> {
        match &pattern.kind {
            PatternKind::Identifier(name) => Some(js_ident(name)),
            PatternKind::Record { fields, .. } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|field| match &field.pattern {
                        None => {
                            let bound = js_ident(&field.name);
                            if bound == field.name {
                                bound
                            } else {
                                format!("{}: {}", field.name, bound)
                            }
                        }
                        Some(sub) => match self.binding_target(sub) {
                            Some(target) => format!("{}: {}", field.name, target),
                            None => field.name.clone(),
                        },
                    })
                    .collect();
                Some(format!("{{ {} }}", parts.join(", ")))
            }
            PatternKind::List { elements, rest } => {
                let mut parts: Vec<String> = elements
                    .iter()
                    .map(|el| {
                        self.binding_target(el)
                            .unwrap_or_else(|| self.fresh("__p"))
                    })
                    .collect();
                if let Some(rest) = rest {
                    if let Some(name) = &rest.name {
                        parts.push(format!("...{}", js_ident(name)));
                    }
                }
                Some(format!("[{}]", parts.join(", ")))
            }
            _ => None,
        }
    }

    /// The structural test for a pattern against a bound subject path.
    /// `None` means always true (identifier, wildcard, record, rest).
    fn pattern_test(&mut self, pattern: &Pattern, path: &str) -> Option<String> {
        match &pattern.kind {
            PatternKind::Identifier(_)
            | PatternKind::Wildcard
            | PatternKind::Record { .. }
            | PatternKind::Rest(_) => None,

            PatternKind::Literal(lit) => Some(format!("{path} === {}", literal_js(lit))),

            PatternKind::List { elements, rest } => {
                let mut parts = vec![format!("Array.isArray({path})")];
                if rest.is_some() {
                    parts.push(format!("{path}.length >= {}", elements.len()));
                } else {
                    parts.push(format!("{path}.length === {}", elements.len()));
                }
                for (i, el) in elements.iter().enumerate() {
                    if let Some(test) = self.pattern_test(el, &format!("{path}[{i}]")) {
                        parts.push(test);
                    }
                }
                Some(parts.join(" && "))
            }

            PatternKind::Constructor { name, arg } => {
                let mut parts = vec![format!("{path}.__tag === {}", js_string(name))];
                if let Some(sub) = arg {
                    if let Some(test) = self.pattern_test(sub, path) {
                        parts.push(test);
                    }
                }
                Some(parts.join(" && "))
            }
        }
    }

    /// Emit `const` bindings for every name a pattern captures, reading
    /// from the bound subject path.
    fn pattern_bindings(&mut self, pattern: &Pattern, path: &str, out: &mut Vec<String>) {
        match &pattern.kind {
            PatternKind::Identifier(name) => {
                out.push(format!("const {} = {};", js_ident(name), path));
            }
            PatternKind::Literal(_) | PatternKind::Wildcard => {}
            PatternKind::List { elements, rest } => {
                for (i, el) in elements.iter().enumerate() {
                    self.pattern_bindings(el, &format!("{path}[{i}]"), out);
                }
                if let Some(rest) = rest {
                    if let Some(name) = &rest.name {
                        out.push(format!(
                            "const {} = {}.slice({});",
                            js_ident(name),
                            path,
                            elements.len()
                        ));
                    }
                }
            }
            PatternKind::Record { fields, .. } => {
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match &field.pattern {
                        None => out.push(format!(
                            "const {} = {};",
                            js_ident(&field.name),
                            field_path
                        )),
                        Some(sub) => self.pattern_bindings(sub, &field_path, out),
                    }
                }
            }
            // The constructor payload's fields live on the tagged object
            // itself.
            PatternKind::Constructor { arg, .. } => {
                if let Some(sub) = arg {
                    self.pattern_bindings(sub, path, out);
                }
            }
            PatternKind::Rest(rest) => {
                if let Some(name) = &rest.name {
                    out.push(format!("const {} = {};", js_ident(name), path));
                }
            }
        }
    }
}
