//! Parser shape tests: one test per syntactic form, asserting on the AST
//! structure rather than on rendered output.

use lambdawg_parser::ast::{
    BinaryOp, DoStatement, ExprKind, ImportItems, PatternKind, Statement, TypeDefBody,
    TypeExprKind, UnaryOp,
};
use lambdawg_parser::parse_source;

/// Parse a source string that must produce no diagnostics, returning the
/// top-level statements.
fn statements(source: &str) -> Vec<Statement> {
    let result = parse_source(source);
    assert!(
        result.ok(),
        "unexpected diagnostics for {source:?}: {:?}",
        result.diagnostics
    );
    result.program.statements
}

/// Parse a single expression statement.
fn expr_kind(source: &str) -> ExprKind {
    let stmts = statements(source);
    assert_eq!(stmts.len(), 1, "expected one statement for {source:?}");
    match stmts.into_iter().next().unwrap() {
        Statement::Expression(e) => e.kind,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn parse_let_statement() {
    let stmts = statements("let x = 42");
    match &stmts[0] {
        Statement::Let(l) => {
            assert_eq!(l.name, "x");
            assert!(!l.private);
            assert!(l.ambients.is_empty());
            assert!(l.annotation.is_none());
            assert_eq!(l.value.kind, ExprKind::Int(42));
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn parse_private_let_with_annotation() {
    let stmts = statements("private let count : Int = 0");
    match &stmts[0] {
        Statement::Let(l) => {
            assert!(l.private);
            let ann = l.annotation.as_ref().unwrap();
            assert_eq!(ann.kind, TypeExprKind::Named("Int".to_string()));
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn parse_let_with_ambients() {
    let stmts = statements("let fetch with http, log: Logger = (url) => http.get(url)");
    match &stmts[0] {
        Statement::Let(l) => {
            assert_eq!(l.ambients.len(), 2);
            assert_eq!(l.ambients[0].name, "http");
            assert!(l.ambients[0].annotation.is_none());
            assert_eq!(l.ambients[1].name, "log");
            assert!(l.ambients[1].annotation.is_some());
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn parse_function_literal() {
    match expr_kind("(a, b) => a + b") {
        ExprKind::Function { params, body } => {
            assert_eq!(params.len(), 2);
            assert!(matches!(params[0].kind, PatternKind::Identifier(ref n) if n == "a"));
            assert!(matches!(body.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn parse_paren_expr_is_not_function() {
    match expr_kind("(1 + 2) * 3") {
        ExprKind::Binary { op, lhs, .. } => {
            assert_eq!(op, BinaryOp::Mul);
            assert!(matches!(lhs.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn parse_single_param_function() {
    match expr_kind("(x) => x") {
        ExprKind::Function { params, .. } => {
            assert_eq!(params.len(), 1);
            assert!(matches!(params[0].kind, PatternKind::Identifier(ref n) if n == "x"));
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn parse_precedence_mul_over_add() {
    match expr_kind("1 + 2 * 3") {
        ExprKind::Binary { op, rhs, .. } => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn parse_pipeline_left_associative() {
    match expr_kind("x |> f |> g") {
        ExprKind::Pipeline { left, right, .. } => {
            assert!(matches!(left.kind, ExprKind::Pipeline { .. }));
            assert!(matches!(right.kind, ExprKind::Identifier(ref n) if n == "g"));
        }
        other => panic!("expected pipeline, got {other:?}"),
    }
}

#[test]
fn parse_pipeline_binds_tighter_than_add() {
    // `a + b |> f` is `a + (b |> f)`.
    match expr_kind("a + b |> f") {
        ExprKind::Binary { op, rhs, .. } => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(rhs.kind, ExprKind::Pipeline { .. }));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn parse_pipeline_seq_and_hints() {
    match expr_kind("xs |> seq @parallel(workers: 4) f") {
        ExprKind::Pipeline {
            sequential, hints, ..
        } => {
            assert!(sequential);
            assert_eq!(hints.len(), 1);
            assert_eq!(hints[0].key, "workers");
        }
        other => panic!("expected pipeline, got {other:?}"),
    }
}

#[test]
fn parse_placeholder_call() {
    match expr_kind("map(f, _)") {
        ExprKind::Call { args, .. } => {
            assert_eq!(args.len(), 2);
            assert_eq!(args[1].kind, ExprKind::Placeholder);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn parse_unary_and_try() {
    match expr_kind("!ready") {
        ExprKind::Unary { op, .. } => assert_eq!(op, UnaryOp::Not),
        other => panic!("expected unary, got {other:?}"),
    }
    match expr_kind("fetch(url)?") {
        ExprKind::Try(inner) => {
            assert!(matches!(inner.kind, ExprKind::Call { .. }));
        }
        other => panic!("expected try, got {other:?}"),
    }
}

#[test]
fn parse_member_and_index() {
    match expr_kind("user.name") {
        ExprKind::Member { field, .. } => assert_eq!(field, "name"),
        other => panic!("expected member, got {other:?}"),
    }
    match expr_kind("xs[0]") {
        ExprKind::Index { index, .. } => assert_eq!(index.kind, ExprKind::Int(0)),
        other => panic!("expected index, got {other:?}"),
    }
}

#[test]
fn parse_if_then_else() {
    match expr_kind("if true then 1 else 2") {
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            assert_eq!(condition.kind, ExprKind::Bool(true));
            assert_eq!(then_branch.kind, ExprKind::Int(1));
            assert_eq!(else_branch.kind, ExprKind::Int(2));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn parse_record_vs_block() {
    match expr_kind("{ x: 1, y: 2 }") {
        ExprKind::Record { fields, spread } => {
            assert!(spread.is_none());
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "x");
        }
        other => panic!("expected record, got {other:?}"),
    }
    match expr_kind("{ f(1) }") {
        ExprKind::Block(stmts) => assert_eq!(stmts.len(), 1),
        other => panic!("expected block, got {other:?}"),
    }
    match expr_kind("{}") {
        ExprKind::Record { fields, .. } => assert!(fields.is_empty()),
        other => panic!("expected empty record, got {other:?}"),
    }
}

#[test]
fn parse_record_spread() {
    match expr_kind("{ ...base, x: 1 }") {
        ExprKind::Record { spread, fields } => {
            assert!(spread.is_some());
            assert_eq!(fields.len(), 1);
        }
        other => panic!("expected record, got {other:?}"),
    }
}

#[test]
fn parse_constructor_literal_is_call() {
    match expr_kind("Circle { radius: 1.5 }") {
        ExprKind::Call { callee, args } => {
            assert!(matches!(callee.kind, ExprKind::Identifier(ref n) if n == "Circle"));
            assert_eq!(args.len(), 1);
            assert!(matches!(args[0].kind, ExprKind::Record { .. }));
        }
        other => panic!("expected constructor call, got {other:?}"),
    }
}

#[test]
fn parse_match_with_guard() {
    match expr_kind("match n { 0 => \"zero\" x if x > 0 => \"pos\" _ => \"neg\" }") {
        ExprKind::Match { arms, .. } => {
            assert_eq!(arms.len(), 3);
            assert!(arms[0].guard.is_none());
            assert!(arms[1].guard.is_some());
            assert!(matches!(arms[2].pattern.kind, PatternKind::Wildcard));
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn parse_list_pattern_with_rest() {
    match expr_kind("match xs { [first, ...rest] => first _ => 0 }") {
        ExprKind::Match { arms, .. } => match &arms[0].pattern.kind {
            PatternKind::List { elements, rest } => {
                assert_eq!(elements.len(), 1);
                assert_eq!(rest.as_ref().unwrap().name.as_deref(), Some("rest"));
            }
            other => panic!("expected list pattern, got {other:?}"),
        },
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn parse_constructor_pattern_with_record() {
    match expr_kind("match s { Circle { radius } => radius _ => 0.0 }") {
        ExprKind::Match { arms, .. } => match &arms[0].pattern.kind {
            PatternKind::Constructor { name, arg } => {
                assert_eq!(name, "Circle");
                assert!(matches!(
                    arg.as_deref().map(|a| &a.kind),
                    Some(PatternKind::Record { .. })
                ));
            }
            other => panic!("expected constructor pattern, got {other:?}"),
        },
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn parse_do_block() {
    let kind = expr_kind("do { let user = do! fetchUser(1) do! log(user) user }");
    match kind {
        ExprKind::Do {
            result_context,
            statements,
        } => {
            assert!(!result_context);
            assert_eq!(statements.len(), 3);
            assert!(matches!(
                statements[0],
                DoStatement::Let { effectful: true, .. }
            ));
            assert!(matches!(statements[1], DoStatement::Effect { .. }));
            assert!(matches!(statements[2], DoStatement::Expr(_)));
        }
        other => panic!("expected do block, got {other:?}"),
    }
}

#[test]
fn parse_do_result_context() {
    match expr_kind("do? { do! step() }") {
        ExprKind::Do { result_context, .. } => assert!(result_context),
        other => panic!("expected do block, got {other:?}"),
    }
}

#[test]
fn parse_provide_in_block() {
    match expr_kind("provide log = consoleLog in { run() }") {
        ExprKind::Provide { provisions, body } => {
            assert_eq!(provisions.len(), 1);
            assert_eq!(provisions[0].name, "log");
            assert!(matches!(body.kind, ExprKind::Block(_)));
        }
        other => panic!("expected provide, got {other:?}"),
    }
}

#[test]
fn parse_module_declaration() {
    let result = parse_source("module math { let add = (a, b) => a + b\nlet mul = (a, b) => a * b }");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(result.program.modules.len(), 1);
    let module = &result.program.modules[0];
    assert_eq!(module.name, "math");
    assert_eq!(module.statements.len(), 2);
}

#[test]
fn parse_type_def_sum() {
    let stmts = statements("type Shape = Circle { radius: Float } | Square { side: Float }");
    match &stmts[0] {
        Statement::TypeDef(def) => {
            assert_eq!(def.name, "Shape");
            match &def.body {
                TypeDefBody::Sum(variants) => {
                    assert_eq!(variants.len(), 2);
                    assert_eq!(variants[0].name, "Circle");
                    assert_eq!(variants[0].fields.as_ref().unwrap().len(), 1);
                }
                other => panic!("expected sum, got {other:?}"),
            }
        }
        other => panic!("expected type def, got {other:?}"),
    }
}

#[test]
fn parse_type_def_alias_and_params() {
    let stmts = statements("type Pair a = { first: a, second: a }");
    match &stmts[0] {
        Statement::TypeDef(def) => {
            assert_eq!(def.params, vec!["a".to_string()]);
            assert!(matches!(def.body, TypeDefBody::Alias(_)));
        }
        other => panic!("expected type def, got {other:?}"),
    }
}

#[test]
fn parse_import_variants() {
    let stmts = statements("import js console { log, warn as warning }\nimport math { * }\nimport util");
    match &stmts[0] {
        Statement::Import(i) => {
            assert!(i.js);
            assert_eq!(i.module, "console");
            match i.items.as_ref().unwrap() {
                ImportItems::Named(items) => {
                    assert_eq!(items.len(), 2);
                    assert_eq!(items[1].alias.as_deref(), Some("warning"));
                }
                other => panic!("expected named imports, got {other:?}"),
            }
        }
        other => panic!("expected import, got {other:?}"),
    }
    match &stmts[1] {
        Statement::Import(i) => {
            assert!(!i.js);
            assert!(matches!(i.items, Some(ImportItems::All)));
        }
        other => panic!("expected import, got {other:?}"),
    }
    match &stmts[2] {
        Statement::Import(i) => assert!(i.items.is_none()),
        other => panic!("expected import, got {other:?}"),
    }
}

#[test]
fn parse_error_recovers_at_next_let() {
    let result = parse_source("let x = @ let y = 2");
    assert!(!result.ok());
    // The second let survived recovery.
    assert!(result
        .program
        .statements
        .iter()
        .any(|s| matches!(s, Statement::Let(l) if l.name == "y")));
}

#[test]
fn parse_invalid_assignment_reports_p009() {
    let result = parse_source("x = 1");
    assert!(result.diagnostics.iter().any(|d| d.code == "P009"));
}

#[test]
fn parse_unclosed_paren_reports_p005() {
    let result = parse_source("let x = (1 + 2");
    assert!(result.diagnostics.iter().any(|d| d.code == "P005"));
}

#[test]
fn parse_expected_expression_reports_p002() {
    let result = parse_source("let x = |");
    assert!(result.diagnostics.iter().any(|d| d.code == "P002"));
}

#[test]
fn parse_statements_preserve_source_order() {
    let stmts = statements("let a = 1\nlet b = 2\nlet c = 3");
    let names: Vec<_> = stmts
        .iter()
        .map(|s| match s {
            Statement::Let(l) => l.name.clone(),
            _ => panic!("expected let"),
        })
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn parse_function_type_annotation() {
    let stmts = statements("let f : (Int, Int) -> Int = (a, b) => a + b");
    match &stmts[0] {
        Statement::Let(l) => match &l.annotation.as_ref().unwrap().kind {
            TypeExprKind::Fun(params, ret) => {
                assert_eq!(params.len(), 2);
                assert_eq!(ret.kind, TypeExprKind::Named("Int".to_string()));
            }
            other => panic!("expected function type, got {other:?}"),
        },
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn parse_generic_type_application() {
    let stmts = statements("let xs : List Int = [1, 2]");
    match &stmts[0] {
        Statement::Let(l) => match &l.annotation.as_ref().unwrap().kind {
            TypeExprKind::App(name, args) => {
                assert_eq!(name, "List");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected type application, got {other:?}"),
        },
        other => panic!("expected let, got {other:?}"),
    }
}
