//! Pratt expression parser for Lambdawg.
//!
//! Implements operator precedence parsing using binding power tables.
//! Handles all Lambdawg expression forms: literals, identifiers,
//! constructor literals, binary/unary operators, calls, member access,
//! indexing, pipelines with `seq`/`@parallel` markers, the postfix `?`,
//! function literals, record-vs-block disambiguation, `if`/`match`/`do`/
//! `provide` compounds, placeholders, and spreads.

use lambdawg_common::diagnostic::codes;
use lambdawg_common::token::{LiteralValue, TokenKind};

use crate::ast::{
    DoStatement, Expr, ExprKind, MatchArm, Pattern, PatternKind, PatternLiteral, PipelineHint,
    Provision, RecordField, UnaryOp,
};

use super::{items, patterns, Parser};

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for infix operators.
///
/// Left < right means left-associative. Note the unusual placement of the
/// pipeline: `|>` binds tighter than every arithmetic and logical operator,
/// so `a + b |> f` reads as `a + (b |> f)`.
fn infix_binding_power(op: TokenKind) -> Option<(u8, u8)> {
    use crate::ast::BinaryOp::*;
    binary_op(op).map(|op| match op {
        Or => (1, 2),
        And => (3, 4),
        Eq | NotEq => (5, 6),
        Lt | Gt | LtEq | GtEq => (7, 8),
        Add | Sub => (9, 10),
        Mul | Div | Rem => (11, 12),
    })
}

/// The pipeline's binding powers: above unary, below the postfix tier.
const PIPE_BP: (u8, u8) = (15, 16);

/// Returns ((), right_bp) for prefix operators.
fn prefix_binding_power(op: TokenKind) -> Option<((), u8)> {
    match op {
        TokenKind::Minus | TokenKind::Bang => Some(((), 13)),
        _ => None,
    }
}

/// Postfix `?` error propagation.
const QUESTION_BP: u8 = 17;

/// Call, member access, and indexing bind tighter than everything else.
const POSTFIX_BP: u8 = 19;

/// Map an operator token to its AST binary operator.
fn binary_op(op: TokenKind) -> Option<crate::ast::BinaryOp> {
    use crate::ast::BinaryOp;
    match op {
        TokenKind::PipePipe => Some(BinaryOp::Or),
        TokenKind::AmpAmp => Some(BinaryOp::And),
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Rem),
        _ => None,
    }
}

// ── Expression Entry Point ─────────────────────────────────────────────

/// Parse an expression at the default (lowest) binding power.
pub(crate) fn expr(p: &mut Parser) -> Option<Expr> {
    expr_bp(p, 0)
}

/// Parse an expression with the given minimum binding power.
///
/// This is the core Pratt parsing loop. It first parses an atom or prefix
/// expression (the LHS), then loops over postfix and infix operators,
/// consuming them as long as their binding power exceeds `min_bp`.
fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<Expr> {
    let mut lhs = lhs(p)?;

    loop {
        let current = p.kind();

        // ── Postfix: function call ──
        if current == TokenKind::LParen && POSTFIX_BP >= min_bp {
            let open = p.span();
            p.advance(); // (
            let mut args = Vec::new();
            if !p.at(TokenKind::RParen) {
                loop {
                    match expr_bp(p, 0) {
                        Some(arg) => args.push(arg),
                        None => break,
                    }
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let end = p.span();
            p.expect_closing(TokenKind::RParen, open);
            let span = lhs.span.merge(end);
            lhs = p.mk_expr(
                ExprKind::Call {
                    callee: Box::new(lhs),
                    args,
                },
                span,
            );
            continue;
        }

        // ── Postfix: member access ──
        if current == TokenKind::Dot && POSTFIX_BP >= min_bp {
            p.advance(); // .
            let Some((field, field_span)) = p.expect_ident() else {
                return Some(lhs);
            };
            let span = lhs.span.merge(field_span);
            lhs = p.mk_expr(
                ExprKind::Member {
                    object: Box::new(lhs),
                    field,
                    field_span,
                },
                span,
            );
            continue;
        }

        // ── Postfix: index access ──
        if current == TokenKind::LBracket && POSTFIX_BP >= min_bp {
            let open = p.span();
            p.advance(); // [
            let index = expr_bp(p, 0)?;
            let end = p.span();
            p.expect_closing(TokenKind::RBracket, open);
            let span = lhs.span.merge(end);
            lhs = p.mk_expr(
                ExprKind::Index {
                    object: Box::new(lhs),
                    index: Box::new(index),
                },
                span,
            );
            continue;
        }

        // ── Postfix: `?` error propagation ──
        if current == TokenKind::Question && QUESTION_BP >= min_bp {
            let q = p.advance();
            let span = lhs.span.merge(q.span);
            lhs = p.mk_expr(ExprKind::Try(Box::new(lhs)), span);
            continue;
        }

        // ── Pipeline ──
        if current == TokenKind::Pipe {
            let (l_bp, r_bp) = PIPE_BP;
            if l_bp < min_bp {
                break;
            }
            p.advance(); // |>

            // Optional `seq` marker and `@parallel(key: expr, ...)` hints
            // on the right-hand stage; recorded verbatim.
            let sequential = p.eat(TokenKind::Seq);
            let hints = if p.at(TokenKind::At) {
                parallel_hints(p)
            } else {
                Vec::new()
            };

            let right = expr_bp(p, r_bp)?;
            let span = lhs.span.merge(right.span);
            lhs = p.mk_expr(
                ExprKind::Pipeline {
                    left: Box::new(lhs),
                    right: Box::new(right),
                    sequential,
                    hints,
                },
                span,
            );
            continue;
        }

        // ── Infix operators ──
        if let Some((l_bp, r_bp)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }
            let op = binary_op(current).expect("infix_binding_power implies binary_op");
            p.advance(); // operator

            let rhs = expr_bp(p, r_bp)?;
            let span = lhs.span.merge(rhs.span);
            lhs = p.mk_expr(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
            continue;
        }

        break;
    }

    Some(lhs)
}

/// Parse the `@parallel(key: expr, ...)` hint record after a pipeline.
fn parallel_hints(p: &mut Parser) -> Vec<PipelineHint> {
    p.advance(); // @
    let mut hints = Vec::new();

    if !p.at(TokenKind::Ident) || p.current().text != "parallel" {
        let span = p.span();
        p.error(
            codes::UNEXPECTED_TOKEN,
            "expected `parallel` after `@`",
            span,
        );
        return hints;
    }
    p.advance(); // parallel

    let open = p.span();
    if p.expect(TokenKind::LParen).is_none() {
        return hints;
    }
    while !p.at(TokenKind::RParen) && !p.at_eof() {
        let Some((key, _)) = p.expect_ident() else { break };
        if p.expect(TokenKind::Colon).is_none() {
            break;
        }
        let Some(value) = expr_bp(p, 0) else { break };
        hints.push(PipelineHint { key, value });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect_closing(TokenKind::RParen, open);
    hints
}

// ── Atom / Prefix Parsing (LHS) ───────────────────────────────────────

/// Parse the left-hand side of an expression: an atom or a prefix operator.
fn lhs(p: &mut Parser) -> Option<Expr> {
    let start = p.span();

    // ── Prefix operators ──
    if let Some(((), r_bp)) = prefix_binding_power(p.kind()) {
        let op = match p.kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => unreachable!(),
        };
        p.advance();
        let operand = expr_bp(p, r_bp)?;
        let span = start.merge(operand.span);
        return Some(p.mk_expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ));
    }

    match p.kind() {
        // ── Literals ──
        TokenKind::Int => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Int(v)) => v,
                _ => 0,
            };
            Some(p.mk_expr(ExprKind::Int(value), tok.span))
        }
        TokenKind::Float => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Float(v)) => v,
                _ => 0.0,
            };
            Some(p.mk_expr(ExprKind::Float(value), tok.span))
        }
        TokenKind::Str => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Str(s)) => s,
                _ => String::new(),
            };
            Some(p.mk_expr(ExprKind::Str(value), tok.span))
        }
        TokenKind::Char => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Char(c)) => c,
                _ => '\0',
            };
            Some(p.mk_expr(ExprKind::Char(value), tok.span))
        }
        TokenKind::True | TokenKind::False => {
            let tok = p.advance();
            Some(p.mk_expr(ExprKind::Bool(tok.kind == TokenKind::True), tok.span))
        }

        // ── Identifier ──
        TokenKind::Ident => {
            let tok = p.advance();
            Some(p.mk_expr(ExprKind::Identifier(tok.text), tok.span))
        }

        // ── Constructor or plain type identifier ──
        // `Name { field: ... }` is a constructor literal, lowered as a call
        // whose single argument is the record. A bare type identifier is an
        // ordinary identifier reference.
        TokenKind::TypeIdent => {
            let tok = p.advance();
            let callee = p.mk_expr(ExprKind::Identifier(tok.text), tok.span);
            if brace_starts_record(p) {
                let record = record_literal(p)?;
                let span = tok.span.merge(record.span);
                return Some(p.mk_expr(
                    ExprKind::Call {
                        callee: Box::new(callee),
                        args: vec![record],
                    },
                    span,
                ));
            }
            Some(callee)
        }

        // ── Function literal or parenthesized expression ──
        TokenKind::LParen => function_or_paren(p),

        // ── List literal ──
        TokenKind::LBracket => {
            let open = p.span();
            p.advance(); // [
            let mut elements = Vec::new();
            if !p.at(TokenKind::RBracket) {
                loop {
                    match expr_bp(p, 0) {
                        Some(e) => elements.push(e),
                        None => break,
                    }
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let end = p.span();
            p.expect_closing(TokenKind::RBracket, open);
            Some(p.mk_expr(ExprKind::List(elements), start.merge(end)))
        }

        // ── Record literal or block ──
        TokenKind::LBrace => {
            if brace_starts_record(p) {
                record_literal(p)
            } else {
                block_expr(p)
            }
        }

        // ── Compounds ──
        TokenKind::If => if_expr(p),
        TokenKind::Match => match_expr(p),
        TokenKind::Do => do_expr(p),
        TokenKind::Provide | TokenKind::Providing => provide_expr(p),

        // ── Placeholder ──
        TokenKind::Underscore => {
            let tok = p.advance();
            Some(p.mk_expr(ExprKind::Placeholder, tok.span))
        }

        // ── Spread ──
        TokenKind::DotDotDot => {
            p.advance();
            let operand = expr_bp(p, 0)?;
            let span = start.merge(operand.span);
            Some(p.mk_expr(ExprKind::Spread(Box::new(operand)), span))
        }

        _ => {
            let span = p.span();
            p.error(
                codes::EXPECTED_EXPRESSION,
                format!("expected expression, found {}", p.kind().describe()),
                span,
            );
            None
        }
    }
}

/// Whether the token stream at a `{` begins a record rather than a block:
/// immediately empty, a leading spread, or an `ident :` field.
fn brace_starts_record(p: &Parser) -> bool {
    p.at(TokenKind::LBrace)
        && matches!(
            (p.nth_kind(1), p.nth_kind(2)),
            (TokenKind::RBrace, _)
                | (TokenKind::DotDotDot, _)
                | (TokenKind::Ident, TokenKind::Colon)
        )
}

/// Parse a record literal `{ ...spread?, name: expr, ... }`.
fn record_literal(p: &mut Parser) -> Option<Expr> {
    let open = p.span();
    p.advance(); // {

    let mut spread = None;
    let mut fields = Vec::new();

    while !p.at(TokenKind::RBrace) && !p.at_eof() {
        if p.at(TokenKind::DotDotDot) {
            let dots = p.span();
            p.advance();
            let value = expr_bp(p, 0)?;
            if spread.is_some() {
                p.error(
                    codes::UNEXPECTED_TOKEN,
                    "a record literal takes at most one spread",
                    dots,
                );
            } else {
                spread = Some(Box::new(value));
            }
        } else {
            let Some((name, name_span)) = p.expect_ident() else {
                break;
            };
            if p.expect(TokenKind::Colon).is_none() {
                break;
            }
            let value = expr_bp(p, 0)?;
            let span = name_span.merge(value.span);
            fields.push(RecordField { name, value, span });
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    let end = p.span();
    p.expect_closing(TokenKind::RBrace, open);
    Some(p.mk_expr(ExprKind::Record { spread, fields }, open.merge(end)))
}

/// Parse a block `{ statements }`. A trailing expression statement is the
/// block's value.
fn block_expr(p: &mut Parser) -> Option<Expr> {
    let open = p.span();
    p.advance(); // {

    let mut statements = Vec::new();
    while !p.at(TokenKind::RBrace) && !p.at_eof() {
        let before = p.position();
        if let Some(stmt) = items::statement(p) {
            statements.push(stmt);
        } else if p.position() == before {
            p.synchronize();
        }
    }

    let end = p.span();
    p.expect_closing(TokenKind::RBrace, open);
    Some(p.mk_expr(ExprKind::Block(statements), open.merge(end)))
}

/// Parse `( ... )`: either a function literal or a parenthesized
/// expression.
///
/// First attempt a parameter list followed by `) =>`; on failure, rewind
/// to the saved cursor and parse a parenthesized expression. If that
/// expression is itself followed by `=>`, it is converted into a
/// single-parameter pattern.
fn function_or_paren(p: &mut Parser) -> Option<Expr> {
    let start = p.span();
    let checkpoint = p.save();

    p.advance(); // (

    // ── Attempt: parameter list ──
    let mut params = Vec::new();
    let mut params_ok = true;
    if !p.at(TokenKind::RParen) {
        loop {
            match patterns::pattern(p) {
                Some(pat) => params.push(pat),
                None => {
                    params_ok = false;
                    break;
                }
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    if params_ok && p.eat(TokenKind::RParen) && p.eat(TokenKind::FatArrow) {
        let body = expr_bp(p, 0)?;
        let span = start.merge(body.span);
        return Some(p.mk_expr(
            ExprKind::Function {
                params,
                body: Box::new(body),
            },
            span,
        ));
    }

    // ── Fallback: parenthesized expression ──
    p.restore(checkpoint);
    p.advance(); // (
    let inner = expr_bp(p, 0)?;
    p.expect_closing(TokenKind::RParen, start);

    if p.eat(TokenKind::FatArrow) {
        let param = expr_to_pattern(p, &inner);
        let body = expr_bp(p, 0)?;
        let span = start.merge(body.span);
        return Some(p.mk_expr(
            ExprKind::Function {
                params: vec![param],
                body: Box::new(body),
            },
            span,
        ));
    }

    Some(inner)
}

/// Structurally convert an expression into a pattern for the
/// `(expr) => body` single-parameter form: identifier to identifier
/// pattern, literal to literal pattern, placeholder to wildcard.
fn expr_to_pattern(p: &mut Parser, expr: &Expr) -> Pattern {
    let kind = match &expr.kind {
        ExprKind::Identifier(name) => PatternKind::Identifier(name.clone()),
        ExprKind::Int(v) => PatternKind::Literal(PatternLiteral::Int(*v)),
        ExprKind::Float(v) => PatternKind::Literal(PatternLiteral::Float(*v)),
        ExprKind::Str(s) => PatternKind::Literal(PatternLiteral::Str(s.clone())),
        ExprKind::Char(c) => PatternKind::Literal(PatternLiteral::Char(*c)),
        ExprKind::Bool(b) => PatternKind::Literal(PatternLiteral::Bool(*b)),
        ExprKind::Placeholder => PatternKind::Wildcard,
        _ => {
            p.error(
                codes::INVALID_PATTERN,
                "this expression cannot be used as a function parameter",
                expr.span,
            );
            PatternKind::Wildcard
        }
    };
    Pattern {
        span: expr.span,
        kind,
    }
}

/// `if cond then a else b`
fn if_expr(p: &mut Parser) -> Option<Expr> {
    let start = p.span();
    p.advance(); // if

    let condition = expr_bp(p, 0)?;
    p.expect(TokenKind::Then)?;
    let then_branch = expr_bp(p, 0)?;
    p.expect(TokenKind::Else)?;
    let else_branch = expr_bp(p, 0)?;

    let span = start.merge(else_branch.span);
    Some(p.mk_expr(
        ExprKind::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        span,
    ))
}

/// `match subject { pattern [if guard] => body ... }`
fn match_expr(p: &mut Parser) -> Option<Expr> {
    let start = p.span();
    p.advance(); // match

    let subject = expr_bp(p, 0)?;

    let open = p.span();
    p.expect(TokenKind::LBrace)?;

    let mut arms = Vec::new();
    while !p.at(TokenKind::RBrace) && !p.at_eof() {
        let before = p.position();
        let Some(pattern) = patterns::pattern(p) else {
            if p.position() == before {
                p.synchronize();
            }
            continue;
        };
        let guard = if p.eat(TokenKind::If) {
            expr_bp(p, 0)
        } else {
            None
        };
        if p.expect(TokenKind::FatArrow).is_none() {
            p.synchronize();
            continue;
        }
        let Some(body) = expr_bp(p, 0) else {
            continue;
        };
        let span = pattern.span.merge(body.span);
        arms.push(MatchArm {
            pattern,
            guard,
            body,
            span,
        });
        p.eat(TokenKind::Comma);
    }

    let end = p.span();
    p.expect_closing(TokenKind::RBrace, open);

    let span = start.merge(end);
    Some(p.mk_expr(
        ExprKind::Match {
            subject: Box::new(subject),
            arms,
        },
        span,
    ))
}

/// `do [?] { do-statements }`
fn do_expr(p: &mut Parser) -> Option<Expr> {
    let start = p.span();
    p.advance(); // do

    let result_context = p.eat(TokenKind::Question);

    let open = p.span();
    p.expect(TokenKind::LBrace)?;

    let mut statements = Vec::new();
    while !p.at(TokenKind::RBrace) && !p.at_eof() {
        let before = p.position();
        if let Some(stmt) = do_statement(p) {
            statements.push(stmt);
        } else if p.position() == before {
            p.synchronize();
        }
    }

    let end = p.span();
    p.expect_closing(TokenKind::RBrace, open);

    Some(p.mk_expr(
        ExprKind::Do {
            result_context,
            statements,
        },
        start.merge(end),
    ))
}

/// One statement of a do block: `let pattern = [do!] expr`, `do! expr`,
/// or a bare expression.
fn do_statement(p: &mut Parser) -> Option<DoStatement> {
    let start = p.span();

    if p.at(TokenKind::Let) {
        p.advance(); // let
        let pattern = patterns::pattern(p)?;
        p.expect(TokenKind::Eq)?;
        let effectful = eat_do_bang(p);
        let value = expr(p)?;
        let span = start.merge(value.span);
        return Some(DoStatement::Let {
            pattern,
            value,
            effectful,
            span,
        });
    }

    if p.at(TokenKind::Do) && p.nth_kind(1) == TokenKind::Bang {
        p.advance(); // do
        p.advance(); // !
        let value = expr(p)?;
        let span = start.merge(value.span);
        return Some(DoStatement::Effect { value, span });
    }

    expr(p).map(DoStatement::Expr)
}

/// Recognize the `do!` marker: the `do` keyword immediately followed by
/// `!` (the lexer emits the two tokens separately).
fn eat_do_bang(p: &mut Parser) -> bool {
    if p.at(TokenKind::Do) && p.nth_kind(1) == TokenKind::Bang {
        p.advance();
        p.advance();
        true
    } else {
        false
    }
}

/// `provide name = expr, ... in body` (`providing` is accepted as a
/// synonym).
fn provide_expr(p: &mut Parser) -> Option<Expr> {
    let start = p.span();
    p.advance(); // provide / providing

    let mut provisions = Vec::new();
    loop {
        let Some((name, name_span)) = p.expect_ident() else {
            break;
        };
        if p.expect(TokenKind::Eq).is_none() {
            break;
        }
        let Some(value) = expr_bp(p, 0) else { break };
        let span = name_span.merge(value.span);
        provisions.push(Provision { name, value, span });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    p.expect(TokenKind::In)?;
    let body = expr_bp(p, 0)?;

    let span = start.merge(body.span);
    Some(p.mk_expr(
        ExprKind::Provide {
            provisions,
            body: Box::new(body),
        },
        span,
    ))
}
