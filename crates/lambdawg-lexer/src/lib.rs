// Lambdawg lexer -- tokenizer for the Lambdawg language.

mod cursor;

use cursor::Cursor;
use lambdawg_common::diagnostic::{codes, Diagnostic};
use lambdawg_common::span::Span;
use lambdawg_common::token::{keyword_from_str, LiteralValue, Token, TokenKind};

/// The result of tokenizing a source file: the token stream (always
/// terminated by an `Eof` token) plus any diagnostics raised along the way.
///
/// Lexing never aborts. A bad character, an unterminated string, or an
/// invalid escape raises a diagnostic and scanning continues.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LexResult {
    /// Whether lexing completed without errors.
    pub fn ok(&self) -> bool {
        self.diagnostics.iter().all(|d| !d.is_error())
    }
}

/// Tokenize an entire source file.
pub fn lex(source: &str) -> LexResult {
    Lexer::new(source).run()
}

/// The Lambdawg lexer. Converts source text into a stream of tokens.
///
/// Wraps a [`Cursor`] for byte-level iteration. A single forward scan with
/// one- and two-character lookahead; every emitted token's span is computed
/// from the cursor position at the start and end of the token.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize everything, consuming the lexer.
    pub fn run(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult {
            tokens,
            diagnostics: self.diagnostics,
        }
    }

    /// Produce the next token, skipping whitespace and comments first.
    fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let start = self.cursor.pos();
            let Some(c) = self.cursor.peek() else {
                return Token::new(TokenKind::Eof, "", start, start);
            };

            return match c {
                // ── Delimiters ─────────────────────────────────────────
                '(' => self.single(TokenKind::LParen, start),
                ')' => self.single(TokenKind::RParen, start),
                '{' => self.single(TokenKind::LBrace, start),
                '}' => self.single(TokenKind::RBrace, start),
                '[' => self.single(TokenKind::LBracket, start),
                ']' => self.single(TokenKind::RBracket, start),

                // ── Punctuation and simple operators ───────────────────
                ',' => self.single(TokenKind::Comma, start),
                ':' => self.single(TokenKind::Colon, start),
                '@' => self.single(TokenKind::At, start),
                '+' => self.single(TokenKind::Plus, start),
                '*' => self.single(TokenKind::Star, start),
                '/' => self.single(TokenKind::Slash, start),
                '%' => self.single(TokenKind::Percent, start),
                '?' => self.single(TokenKind::Question, start),

                // ── Maximal-munch operators ────────────────────────────
                '=' => self.lex_eq(start),
                '!' => self.lex_bang(start),
                '<' => self.lex_lt(start),
                '>' => self.lex_gt(start),
                '&' => self.lex_amp(start),
                '|' => self.lex_pipe(start),
                '-' => self.lex_minus(start),
                '.' => self.lex_dot(start),

                // ── Literals ───────────────────────────────────────────
                '0'..='9' => self.lex_number(start),
                '"' => self.lex_string(start),
                '\'' => self.lex_char(start),

                // ── Identifiers, keywords, placeholder ─────────────────
                c if is_ident_start(c) => self.lex_ident(start),

                // ── Unknown character (error recovery) ─────────────────
                _ => {
                    self.cursor.advance();
                    self.diagnostics.push(Diagnostic::error(
                        codes::UNEXPECTED_CHAR,
                        format!("unexpected character: {c:?}"),
                        Span::new(start, self.cursor.pos()),
                    ));
                    continue;
                }
            };
        }
    }

    // ── Trivia ─────────────────────────────────────────────────────────

    /// Skip whitespace, `--` line comments, and nesting `{- -}` block
    /// comments. Runs until the cursor rests on a non-trivia character.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());

            match (self.cursor.peek(), self.cursor.peek_next()) {
                (Some('-'), Some('-')) => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                (Some('{'), Some('-')) => {
                    self.skip_block_comment();
                }
                _ => return,
            }
        }
    }

    /// Skip a nesting block comment `{- ... -}`. The nesting depth must
    /// return to zero before end of input.
    fn skip_block_comment(&mut self) {
        let start = self.cursor.pos();
        self.cursor.advance(); // '{'
        self.cursor.advance(); // '-'
        let mut depth: u32 = 1;

        while depth > 0 {
            if self.cursor.is_eof() {
                self.diagnostics.push(Diagnostic::error(
                    codes::UNTERMINATED_BLOCK_COMMENT,
                    "unterminated block comment",
                    Span::new(start, self.cursor.pos()),
                ));
                return;
            }
            if self.cursor.eat('{') {
                if self.cursor.eat('-') {
                    depth += 1;
                }
            } else if self.cursor.eat('-') {
                if self.cursor.eat('}') {
                    depth -= 1;
                }
            } else {
                self.cursor.advance();
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Consume one character and return a token of the given kind.
    fn single(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        self.token(kind, start)
    }

    /// Build a token ending at the current cursor position.
    fn token(&mut self, kind: TokenKind, start: u32) -> Token {
        let end = self.cursor.pos();
        Token::new(kind, self.cursor.slice(start, end), start, end)
    }

    // ── Operator lexing ────────────────────────────────────────────────

    /// One of `=`, `==`, `=>`.
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('=') {
            self.token(TokenKind::EqEq, start)
        } else if self.cursor.eat('>') {
            self.token(TokenKind::FatArrow, start)
        } else {
            self.token(TokenKind::Eq, start)
        }
    }

    /// One of `!`, `!=`.
    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('=') {
            self.token(TokenKind::NotEq, start)
        } else {
            self.token(TokenKind::Bang, start)
        }
    }

    /// One of `<`, `<=`.
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('=') {
            self.token(TokenKind::LtEq, start)
        } else {
            self.token(TokenKind::Lt, start)
        }
    }

    /// One of `>`, `>=`.
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('=') {
            self.token(TokenKind::GtEq, start)
        } else {
            self.token(TokenKind::Gt, start)
        }
    }

    /// `&&`; a lone `&` is an error.
    fn lex_amp(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('&') {
            return self.token(TokenKind::AmpAmp, start);
        }
        self.diagnostics.push(Diagnostic::error(
            codes::UNEXPECTED_CHAR,
            "unexpected character: '&' (did you mean `&&`?)",
            Span::new(start, self.cursor.pos()),
        ));
        self.next_token()
    }

    /// One of `||`, `|>`, or the variant separator `|`.
    fn lex_pipe(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('|') {
            self.token(TokenKind::PipePipe, start)
        } else if self.cursor.eat('>') {
            self.token(TokenKind::Pipe, start)
        } else {
            self.token(TokenKind::Bar, start)
        }
    }

    /// One of `-`, `->`. A `--` line comment never reaches here; it is
    /// consumed by [`Lexer::skip_trivia`].
    fn lex_minus(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.eat('>') {
            self.token(TokenKind::Arrow, start)
        } else {
            self.token(TokenKind::Minus, start)
        }
    }

    /// One of `.`, `...`. Two dots lex as two member dots, since `..` is
    /// not an operator of this language.
    fn lex_dot(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
            self.cursor.advance();
            self.cursor.advance();
            self.token(TokenKind::DotDotDot, start)
        } else {
            self.token(TokenKind::Dot, start)
        }
    }

    // ── Number literals ────────────────────────────────────────────────

    /// Lex a number literal starting with a digit.
    ///
    /// Handles decimal, hex (`0x`), binary (`0b`), octal (`0o`), floats,
    /// and scientific notation. Underscore separators are allowed and
    /// ignored in the decoded value. Radix prefixes force integer kind.
    fn lex_number(&mut self, start: u32) -> Token {
        let first = self.cursor.advance().unwrap();

        if first == '0' {
            match self.cursor.peek() {
                Some('x' | 'X') => return self.lex_radix(start, 16, |c| c.is_ascii_hexdigit()),
                Some('b' | 'B') => return self.lex_radix(start, 2, |c| c == '0' || c == '1'),
                Some('o' | 'O') => return self.lex_radix(start, 8, |c| ('0'..='7').contains(&c)),
                _ => {}
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        let mut is_float = false;

        // `.` followed by a digit extends into a float.
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }

        // `e`/`E` with optional sign extends the exponent. A bare `e` with
        // neither a sign nor a digit after it belongs to the next token.
        if matches!(self.cursor.peek(), Some('e' | 'E'))
            && matches!(self.cursor.peek_next(), Some('+' | '-') | Some('0'..='9'))
        {
            self.cursor.advance(); // e/E
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            } else {
                // `1e+` with no digits following the sign.
                self.diagnostics.push(Diagnostic::error(
                    codes::INVALID_NUMBER,
                    "invalid number literal: exponent has no digits",
                    Span::new(start, self.cursor.pos()),
                ));
                let end = self.cursor.pos();
                let text = self.cursor.slice(start, end).to_string();
                return Token::literal(TokenKind::Float, text, start, end, LiteralValue::Float(0.0));
            }
        }

        self.finish_number(start, is_float)
    }

    /// Decode and emit a decimal number token ending at the cursor.
    fn finish_number(&mut self, start: u32, is_float: bool) -> Token {
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end).to_string();
        let digits: String = text.chars().filter(|&c| c != '_').collect();

        if is_float {
            let value = digits.parse::<f64>().unwrap_or_else(|_| {
                self.diagnostics.push(Diagnostic::error(
                    codes::INVALID_NUMBER,
                    format!("invalid number literal: {text}"),
                    Span::new(start, end),
                ));
                0.0
            });
            Token::literal(TokenKind::Float, text, start, end, LiteralValue::Float(value))
        } else {
            let value = digits.parse::<i64>().unwrap_or_else(|_| {
                self.diagnostics.push(Diagnostic::error(
                    codes::INVALID_NUMBER,
                    format!("invalid number literal: {text}"),
                    Span::new(start, end),
                ));
                0
            });
            Token::literal(TokenKind::Int, text, start, end, LiteralValue::Int(value))
        }
    }

    /// Lex the digits of a radix-prefixed integer (`0x`, `0b`, `0o`).
    fn lex_radix(&mut self, start: u32, radix: u32, is_digit: impl Fn(char) -> bool) -> Token {
        self.cursor.advance(); // the radix letter
        let digits_start = self.cursor.pos();
        self.cursor.eat_while(|c| is_digit(c) || c == '_');
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end).to_string();
        let digits: String = self
            .cursor
            .slice(digits_start, end)
            .chars()
            .filter(|&c| c != '_')
            .collect();

        let value = if digits.is_empty() {
            self.diagnostics.push(Diagnostic::error(
                codes::INVALID_NUMBER,
                format!("invalid number literal: {text}"),
                Span::new(start, end),
            ));
            0
        } else {
            i64::from_str_radix(&digits, radix).unwrap_or_else(|_| {
                self.diagnostics.push(Diagnostic::error(
                    codes::INVALID_NUMBER,
                    format!("invalid number literal: {text}"),
                    Span::new(start, end),
                ));
                0
            })
        };

        Token::literal(TokenKind::Int, text, start, end, LiteralValue::Int(value))
    }

    // ── String and char literals ───────────────────────────────────────

    /// Lex a string literal, decoding escape sequences into the value.
    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening '"'
        let mut decoded = String::new();

        loop {
            match self.cursor.peek() {
                None => {
                    self.diagnostics.push(Diagnostic::error(
                        codes::UNTERMINATED_STRING,
                        "unterminated string literal",
                        Span::new(start, self.cursor.pos()),
                    ));
                    break;
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    if let Some(c) = self.lex_escape() {
                        decoded.push(c);
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    decoded.push(c);
                }
            }
        }

        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end).to_string();
        Token::literal(TokenKind::Str, text, start, end, LiteralValue::Str(decoded))
    }

    /// Lex a character literal of exactly one (possibly escaped) code point.
    fn lex_char(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening '\''
        let decoded = match self.cursor.peek() {
            None | Some('\'') => {
                self.cursor.advance(); // closing quote, if any
                self.diagnostics.push(Diagnostic::error(
                    codes::UNTERMINATED_STRING,
                    "empty or unterminated character literal",
                    Span::new(start, self.cursor.pos()),
                ));
                let end = self.cursor.pos();
                let text = self.cursor.slice(start, end).to_string();
                return Token::literal(TokenKind::Char, text, start, end, LiteralValue::Char('\0'));
            }
            Some('\\') => self.lex_escape().unwrap_or('\0'),
            Some(c) => {
                self.cursor.advance();
                c
            }
        };

        if self.cursor.peek() == Some('\'') {
            self.cursor.advance();
        } else {
            self.diagnostics.push(Diagnostic::error(
                codes::UNTERMINATED_STRING,
                "unterminated character literal",
                Span::new(start, self.cursor.pos()),
            ));
        }

        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end).to_string();
        Token::literal(TokenKind::Char, text, start, end, LiteralValue::Char(decoded))
    }

    /// Decode one escape sequence. The cursor rests on the backslash.
    ///
    /// Unknown escapes raise a diagnostic and yield the raw character so
    /// lexing can continue.
    fn lex_escape(&mut self) -> Option<char> {
        let esc_start = self.cursor.pos();
        self.cursor.advance(); // '\\'
        let c = self.cursor.advance()?;
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '0' => Some('\0'),
            other => {
                self.diagnostics.push(Diagnostic::error(
                    codes::INVALID_ESCAPE,
                    format!("invalid escape sequence: \\{other}"),
                    Span::new(esc_start, self.cursor.pos()),
                ));
                Some(other)
            }
        }
    }

    // ── Identifiers and keywords ───────────────────────────────────────

    /// Lex an identifier, keyword, or the `_` placeholder.
    ///
    /// Leading-letter case decides the identifier kind: lowercase (or `_`)
    /// yields a value identifier, uppercase a type identifier. A bare `_`
    /// not followed by an identifier character is the placeholder token.
    fn lex_ident(&mut self, start: u32) -> Token {
        let first = self.cursor.advance().unwrap();

        if first == '_' && !self.cursor.peek().is_some_and(is_ident_continue) {
            return self.token(TokenKind::Underscore, start);
        }

        self.cursor.eat_while(is_ident_continue);
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);

        let kind = keyword_from_str(text).unwrap_or(if first.is_uppercase() {
            TokenKind::TypeIdent
        } else {
            TokenKind::Ident
        });
        Token::new(kind, text, start, end)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
