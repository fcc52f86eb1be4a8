//! End-to-end inference tests: parse a program, run inference, and assert
//! on the node-to-type map.

use lambdawg_parser::ast::{Statement, Program};
use lambdawg_parser::parse_source;
use lambdawg_typeck::ty::Ty;
use lambdawg_typeck::{infer, TypeckResult};

fn check(source: &str) -> (Program, TypeckResult) {
    let parsed = parse_source(source);
    assert!(
        parsed.ok(),
        "parse diagnostics for {source:?}: {:?}",
        parsed.diagnostics
    );
    let result = infer(&parsed.program);
    (parsed.program, result)
}

/// The inferred type of the value of the `index`-th top-level statement
/// (which must be a let).
fn let_value_ty(program: &Program, result: &TypeckResult, index: usize) -> Ty {
    match &program.statements[index] {
        Statement::Let(l) => result.types[&l.value.id].clone(),
        other => panic!("expected let statement, got {other:?}"),
    }
}

#[test]
fn infer_int_literal() {
    let (program, result) = check("let x = 42");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::int());
}

#[test]
fn infer_function_with_arithmetic() {
    let (program, result) = check("let add = (a, b) => a + b");
    assert!(result.ok(), "{:?}", result.diagnostics);
    match let_value_ty(&program, &result, 0) {
        Ty::Fun(params, _) => assert_eq!(params.len(), 2),
        other => panic!("expected function type, got {other}"),
    }
}

#[test]
fn infer_list_unifies_elements() {
    let (program, result) = check("let xs = [1, 2, 3]");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::list(Ty::int()));
}

#[test]
fn let_generalization_allows_polymorphic_reuse() {
    let (_, result) = check("let id = (x) => x\nlet a = id(1)\nlet b = id(\"s\")");
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn generalization_round_trip() {
    // After `let id = (x) => x`, using `id` at Int instantiates a type
    // that unifies with the original inferred value type.
    let (program, result) = check("let id = (x) => x\nlet a = id(1)");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 1), Ty::int());
}

#[test]
fn infer_recursive_function() {
    let (_, result) =
        check("let fact = (n) => if n < 1 then 1 else n * fact(n - 1)");
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn infer_pipeline_with_partial_application() {
    let (program, result) =
        check("let nums = [1, 2, 3]\nlet doubled = nums |> map((x) => x * 2, _)");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(
        let_value_ty(&program, &result, 1),
        Ty::list(Ty::int()),
        "pipeline through a placeholder call yields List Int"
    );
}

#[test]
fn placeholder_call_types_as_function_of_holes() {
    let (program, result) = check("let add = (a, b) => a + b\nlet inc = add(_, 1)");
    assert!(result.ok(), "{:?}", result.diagnostics);
    match let_value_ty(&program, &result, 1) {
        Ty::Fun(params, ret) => {
            assert_eq!(params.len(), 1, "one hole, one parameter");
            assert_eq!(*ret, Ty::int());
        }
        other => panic!("expected function type, got {other}"),
    }
}

#[test]
fn infer_pipeline_into_known_combinator() {
    let (program, result) = check("let total = [1, 2] |> sum");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::int());
}

#[test]
fn infer_member_on_record() {
    let (program, result) = check("let r = { x: 1, y: \"s\" }\nlet v = r.x");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 1), Ty::int());
}

#[test]
fn open_record_tolerates_extra_fields_at_call() {
    let (_, result) =
        check("let getx = (r) => r.x\nlet v = getx({ x: 1, y: 2 })");
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn infer_index_forces_list_and_int() {
    let (program, result) = check("let xs = [1, 2]\nlet v = xs[0]");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 1), Ty::int());
}

#[test]
fn infer_if_unifies_branches() {
    let (program, result) = check("let x = if true then 1 else 2");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::int());
}

#[test]
fn infer_match_unifies_arm_bodies() {
    let (program, result) =
        check("let f = (n) => match n { 0 => \"zero\" 1 => \"one\" _ => \"other\" }");
    assert!(result.ok(), "{:?}", result.diagnostics);
    match let_value_ty(&program, &result, 0) {
        Ty::Fun(params, ret) => {
            assert_eq!(params, vec![Ty::int()]);
            assert_eq!(*ret, Ty::string());
        }
        other => panic!("expected function type, got {other}"),
    }
}

#[test]
fn infer_do_block_yields_last_statement() {
    let (program, result) = check("let r = do { let x = 1\nx + 1 }");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::int());
}

#[test]
fn infer_block_trailing_expression() {
    let (program, result) = check("let v = { let a = 1\na + 1 }");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::int());
}

#[test]
fn infer_provide_scopes_provisions() {
    let (_, result) = check(
        "let greet with log = (name) => log(name)\nlet r = provide log = (s) => s in { greet(\"hi\") }",
    );
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn sum_type_constructor_and_match() {
    let source = "type Shape = Circle { radius: Float } | Square { side: Float }\n\
                  let c = Circle { radius: 1.5 }\n\
                  let area = match c { Circle { radius } => radius Square { side } => side }";
    let (program, result) = check(source);
    assert!(result.ok(), "{:?}", result.diagnostics);
    match let_value_ty(&program, &result, 0) {
        Ty::Con(con) => assert_eq!(con.name, "Shape"),
        other => panic!("expected Shape, got {other}"),
    }
    assert_eq!(let_value_ty(&program, &result, 1), Ty::float());
}

#[test]
fn generic_sum_type_applies_parameters() {
    let source = "type Box a = Full { value: a } | Empty\n\
                  let b = Full { value: 1 }";
    let (program, result) = check(source);
    assert!(result.ok(), "{:?}", result.diagnostics);
    match let_value_ty(&program, &result, 0) {
        Ty::App(con, args) => {
            assert_eq!(con.name, "Box");
            assert_eq!(args, vec![Ty::int()]);
        }
        other => panic!("expected Box Int, got {other}"),
    }
}

#[test]
fn type_alias_expands_in_annotations() {
    let (_, result) = check("type Name = String\nlet n : Name = \"dawg\"");
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn annotation_checks_value() {
    let (_, result) = check("let xs : List Int = [1, 2, 3]");
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn module_binds_record_of_exports() {
    let source = "module math { let add = (a, b) => a + b }\nlet s = math.add(1, 2)";
    let (program, result) = check(source);
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 0), Ty::int());
}

#[test]
fn import_from_module_binds_names() {
    let source = "module math { let add = (a, b) => a + b }\nimport math { add }\nlet s = add(1, 2)";
    let (program, result) = check(source);
    assert!(result.ok(), "{:?}", result.diagnostics);
}

#[test]
fn try_passes_operand_type_through() {
    let (program, result) = check("let f = (r) => r?\nlet x = 1?");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(let_value_ty(&program, &result, 1), Ty::int());
}

#[test]
fn builtin_head_yields_option() {
    let (program, result) = check("let h = head([1, 2])");
    assert!(result.ok(), "{:?}", result.diagnostics);
    assert_eq!(
        let_value_ty(&program, &result, 0),
        Ty::option(Ty::int())
    );
}

#[test]
fn type_variable_counter_resets_between_runs() {
    // Identical programs infer identical (resolved) types on every run.
    let source = "let id = (x) => x\nlet a = id(1)";
    let (p1, r1) = check(source);
    let (_, r2) = check(source);
    assert_eq!(
        let_value_ty(&p1, &r1, 1),
        let_value_ty(&p1, &r2, 1)
    );
}
