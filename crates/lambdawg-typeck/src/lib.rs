//! Lambdawg type checker: Hindley-Milner inference with row-open records.
//!
//! This crate assigns a type to every expression of a parsed program,
//! detects type errors, and supports:
//!
//! - Let-polymorphism with level-based generalization
//! - Unification with occurs check
//! - Row-open records ("has at least these fields")
//! - Placeholder partial application and pipeline typing
//!
//! # Architecture
//!
//! - [`ty`]: Core type representation (Ty, TyCon, TyVar, Scheme)
//! - [`unify`]: Unification engine with occurs check and levels
//! - [`env`]: Type environment with scope stack
//! - [`builtins`]: Built-in combinator and type registration
//! - [`error`]: Type errors with spans and stable codes
//! - [`infer`]: The inference walk over the AST

pub mod builtins;
pub mod env;
pub mod error;
pub mod infer;
pub mod ty;
pub mod unify;

pub use infer::{infer, TypeckResult};
