//! Emitter lowering tests: parse source and assert on the emitted
//! JavaScript text. The prelude is suppressed so assertions see only the
//! program's own lowering.

use lambdawg_emit::{emit, EmitOptions};
use lambdawg_parser::parse_source;

fn emit_bare(source: &str) -> String {
    let parsed = parse_source(source);
    assert!(
        parsed.ok(),
        "parse diagnostics for {source:?}: {:?}",
        parsed.diagnostics
    );
    emit(
        &parsed.program,
        &EmitOptions {
            include_prelude: false,
        },
    )
}

#[test]
fn emit_let_binding() {
    assert_eq!(emit_bare("let x = 42"), "const x = 42;\n");
}

#[test]
fn emit_function_literal() {
    assert_eq!(
        emit_bare("let add = (a, b) => a + b"),
        "const add = (a, b) => (a + b);\n"
    );
}

#[test]
fn emit_if_as_ternary() {
    let code = emit_bare("let x = if true then 1 else 2");
    assert!(code.contains("true ? 1 : 2"), "{code}");
}

#[test]
fn emit_pipeline_as_pipe_call() {
    let code = emit_bare("let d = nums |> double");
    assert_eq!(code, "const d = pipe(nums, double);\n");
}

#[test]
fn emit_placeholder_call_as_closure() {
    let code = emit_bare("let d = nums |> map((x) => x * 2, _)");
    assert!(code.contains("pipe"), "{code}");
    assert!(
        code.contains("((__ph0) => map((x) => (x * 2), __ph0))"),
        "{code}"
    );
}

#[test]
fn emit_placeholder_keeps_original_indices() {
    let code = emit_bare("let inc = add(_, 1)");
    assert!(code.contains("((__ph0) => add(__ph0, 1))"), "{code}");
}

#[test]
fn emit_try_as_unwrap() {
    let code = emit_bare("let v = fetch(url)?");
    assert!(code.contains("unwrap(fetch(url))"), "{code}");
}

#[test]
fn emit_match_binds_subject_and_orders_branches() {
    let code = emit_bare("let f = (n) => match n { 0 => \"zero\" 1 => \"one\" _ => \"other\" }");
    assert!(code.contains("const __match0 = n;"), "{code}");
    let zero = code.find("=== 0").unwrap();
    let one = code.find("=== 1").unwrap();
    let other = code.find("\"other\"").unwrap();
    assert!(zero < one && one < other, "branches in source order: {code}");
    assert!(
        code.contains("non-exhaustive pattern match"),
        "fallback failure present: {code}"
    );
}

#[test]
fn emit_match_constructor_tests_tag() {
    let code = emit_bare(
        "type Shape = Circle { radius: Float } | Square { side: Float }\n\
         let area = (s) => match s { Circle { radius } => radius Square { side } => side }",
    );
    assert!(code.contains("__tag === \"Circle\""), "{code}");
    assert!(code.contains("const radius = "), "{code}");
}

#[test]
fn emit_match_guard_nests_inside_structural_test() {
    let code = emit_bare("let f = (n) => match n { x if x > 0 => 1 _ => 0 }");
    assert!(code.contains("if ((x > 0))"), "{code}");
    // The binding is introduced before the guard runs.
    let bind = code.find("const x = ").unwrap();
    let guard = code.find("if ((x > 0))").unwrap();
    assert!(bind < guard, "{code}");
}

#[test]
fn emit_match_list_pattern_checks_length() {
    let code = emit_bare("let f = (xs) => match xs { [a, b] => a [x, ...rest] => x _ => 0 }");
    assert!(code.contains(".length === 2"), "{code}");
    assert!(code.contains(".length >= 1"), "{code}");
    assert!(code.contains(".slice(1)"), "{code}");
}

#[test]
fn emit_do_block_as_async_iife() {
    let code = emit_bare("let r = do { let user = do! fetchUser(1) do! log(user) user }");
    assert!(code.contains("(async () => {"), "{code}");
    assert!(code.contains("const user = await fetchUser(1);"), "{code}");
    assert!(code.contains("await log(user);"), "{code}");
    assert!(code.contains("return user;"), "{code}");
}

#[test]
fn emit_provide_binds_locally() {
    let code = emit_bare("let r = provide log = consoleLog in { run() }");
    assert!(code.contains("const log = consoleLog;"), "{code}");
    assert!(code.contains("return"), "{code}");
}

#[test]
fn emit_with_ambients_curries() {
    let code = emit_bare("let fetch with http = (url) => http.get(url)");
    assert!(
        code.contains("const fetch = (http) => (url) => http.get(url);"),
        "{code}"
    );
}

#[test]
fn emit_module_yields_export_record() {
    let code = emit_bare(
        "module math { let add = (a, b) => a + b\nprivate let hidden = 1\nlet mul = (a, b) => a * b }",
    );
    assert!(code.contains("const math = (() => {"), "{code}");
    assert!(code.contains("const hidden = 1;"), "{code}");
    assert!(code.contains("return { add, mul };"), "{code}");
}

#[test]
fn emit_reserved_word_binder_renamed_at_all_sites() {
    let code = emit_bare("let class = 1\nlet x = class + 1");
    assert!(code.contains("const _class = 1;"), "{code}");
    assert!(code.contains("(_class + 1)"), "{code}");
    assert!(!code.contains("const class"), "{code}");
}

#[test]
fn emit_record_spread_before_fields() {
    let code = emit_bare("let r = { ...base, x: 1 }");
    assert_eq!(code, "const r = { ...base, x: 1 };\n");
}

#[test]
fn emit_constructor_literal_as_call() {
    let code = emit_bare(
        "type Shape = Circle { radius: Float }\nlet c = Circle { radius: 1.5 }",
    );
    assert!(
        code.contains("const Circle = (fields) => ({ __tag: \"Circle\", ...fields });"),
        "{code}"
    );
    assert!(code.contains("const c = Circle({ radius: 1.5 });"), "{code}");
}

#[test]
fn emit_nullary_variant_as_value() {
    let code = emit_bare("type Light = Red | Green");
    assert!(code.contains("const Red = { __tag: \"Red\" };"), "{code}");
    assert!(code.contains("const Green = { __tag: \"Green\" };"), "{code}");
}

#[test]
fn emit_import_destructures() {
    let code = emit_bare("import js console { log, warn as warning }");
    assert_eq!(code, "const { log, warn: warning } = console;\n");
}

#[test]
fn emit_equality_as_strict() {
    let code = emit_bare("let b = a == 1");
    assert!(code.contains("(a === 1)"), "{code}");
}

#[test]
fn emit_string_escapes() {
    let code = emit_bare("let s = \"line\\nbreak \\\"quoted\\\"\"");
    assert!(code.contains(r#""line\nbreak \"quoted\"""#), "{code}");
}

#[test]
fn emit_radix_literals_decoded() {
    let code = emit_bare("let a = 0xFF\nlet b = 0b1010\nlet c = 0o755");
    assert!(code.contains("const a = 255;"), "{code}");
    assert!(code.contains("const b = 10;"), "{code}");
    assert!(code.contains("const c = 493;"), "{code}");
}

#[test]
fn emit_preserves_source_order() {
    let code = emit_bare("let a = 1\nlet b = 2\nlet c = 3");
    let a = code.find("const a").unwrap();
    let b = code.find("const b").unwrap();
    let c = code.find("const c").unwrap();
    assert!(a < b && b < c);
}

#[test]
fn emit_is_deterministic() {
    let source = "let f = (n) => match n { 0 => \"z\" _ => show(n) }\nlet g = add(_, 1)";
    assert_eq!(emit_bare(source), emit_bare(source));
}

#[test]
fn emit_includes_prelude_by_default() {
    let parsed = parse_source("let x = 1");
    let code = emit(&parsed.program, &EmitOptions::default());
    assert!(code.contains("const __lambdawg = {"));
    assert!(code.contains("const x = 1;"));
}

#[test]
fn emit_block_returns_trailing_expression() {
    let code = emit_bare("let v = { let a = 1\na + 1 }");
    assert!(code.contains("const a = 1;"), "{code}");
    assert!(code.contains("return (a + 1);"), "{code}");
}

#[test]
fn emit_list_with_spread() {
    let code = emit_bare("let xs = [1, ...rest, 2]");
    assert_eq!(code, "const xs = [1, ...rest, 2];\n");
}
