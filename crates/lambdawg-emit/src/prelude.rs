//! The fixed runtime prelude prepended to every emitted artifact.
//!
//! Defines the `__lambdawg` namespace object (result/option constructors,
//! list operations, `show`, `identity`, `tap`, `pipe`, and the
//! non-exhaustive-match failure helper), then destructures it into the
//! artifact's scope so unqualified use compiles.
//!
//! The destructure shadows the global `Error` constructor inside the
//! artifact, so the prelude captures it as `__jsError` first.

/// The runtime prelude source text.
pub const PRELUDE: &str = r#"// Lambdawg runtime prelude
const __jsError = Error;
const __lambdawg = {
  Ok: (value) => ({ __tag: "Ok", value }),
  Error: (error) => ({ __tag: "Error", error }),
  Some: (value) => ({ __tag: "Some", value }),
  None: { __tag: "None" },
  isOk: (r) => r.__tag === "Ok",
  isError: (r) => r.__tag === "Error",
  isSome: (o) => o.__tag === "Some",
  isNone: (o) => o.__tag === "None",
  unwrap: (r) => {
    if (r && r.__tag === "Error") throw r.error;
    if (r && r.__tag === "None") throw new __jsError("unwrapped None");
    if (r && (r.__tag === "Ok" || r.__tag === "Some")) return r.value;
    return r;
  },
  match: (value, arms) => {
    for (const [test, body] of arms) {
      if (test(value)) return body(value);
    }
    return __lambdawg.fail("non-exhaustive pattern match");
  },
  map: (f, xs) => xs.map((x) => f(x)),
  filter: (f, xs) => xs.filter((x) => f(x)),
  fold: (f, init, xs) => xs.reduce((acc, x) => f(acc, x), init),
  sum: (xs) => xs.reduce((a, b) => a + b, 0),
  length: (xs) => xs.length,
  head: (xs) => (xs.length === 0 ? __lambdawg.None : __lambdawg.Some(xs[0])),
  tail: (xs) => (xs.length === 0 ? __lambdawg.None : __lambdawg.Some(xs.slice(1))),
  show: (x) => (typeof x === "string" ? x : JSON.stringify(x)),
  identity: (x) => x,
  tap: (f, x) => { f(x); return x; },
  pipe: (value, fn) => fn(value),
  fail: (message) => { throw new __jsError(message); },
};
const { Ok, Error, Some, None, isOk, isError, isSome, isNone, unwrap, match, map, filter, fold, sum, length, head, tail, show, identity, tap, pipe } = __lambdawg;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_defines_namespace_and_destructures() {
        assert!(PRELUDE.contains("const __lambdawg = {"));
        assert!(PRELUDE.contains("} = __lambdawg;"));
    }

    #[test]
    fn prelude_covers_required_interface() {
        for name in [
            "Ok", "Error", "Some", "None", "isOk", "isError", "isSome", "isNone", "unwrap",
            "match", "map", "filter", "fold", "sum", "length", "head", "tail", "show",
            "identity", "tap", "pipe",
        ] {
            assert!(
                PRELUDE.contains(&format!("{name}:")),
                "prelude missing {name}"
            );
        }
    }

    #[test]
    fn prelude_captures_global_error_before_shadowing() {
        let capture = PRELUDE.find("const __jsError = Error;").unwrap();
        let shadow = PRELUDE.find("} = __lambdawg;").unwrap();
        assert!(capture < shadow);
    }
}
