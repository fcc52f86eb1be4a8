use serde::Serialize;

/// A half-open byte range into source text.
///
/// Spans travel with every token, AST node, and diagnostic the compiler
/// produces. They are pairs of offsets into the original UTF-8 source;
/// line and column numbers are never stored, only derived on demand
/// through a [`LineIndex`] when a diagnostic is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// A span covering `start..end`.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "backwards span: {start}..{end}");
        Self { start, end }
    }

    /// A zero-length span at the given offset (used for end-of-input).
    pub fn point(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// Length of the spanned text in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The smallest span covering both operands. Merging is associative
    /// and commutative, so a multi-token node can fold its pieces in any
    /// order.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Cut the spanned text back out of the source it was produced from.
    ///
    /// # Panics
    ///
    /// Panics if the span does not lie on UTF-8 boundaries of `source`,
    /// i.e. when it was produced from different text.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start as usize..self.end as usize]
    }
}

/// A human-readable source position: 1-based line and column plus the
/// 0-based byte offset it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

/// Byte offsets of every newline in a source file, for converting span
/// offsets into positions when diagnostics are shown.
///
/// Built once per file; each conversion is a binary search over the
/// newline table. A newline byte counts as the last column of the line it
/// terminates.
#[derive(Debug)]
pub struct LineIndex {
    newlines: Vec<u32>,
}

impl LineIndex {
    /// Record the newline offsets of the source text.
    pub fn new(source: &str) -> Self {
        let newlines = source
            .bytes()
            .enumerate()
            .filter(|&(_, byte)| byte == b'\n')
            .map(|(offset, _)| offset as u32)
            .collect();
        Self { newlines }
    }

    /// The full [`Position`] of a byte offset.
    pub fn position(&self, offset: u32) -> Position {
        // Newlines strictly before the offset determine the line; the
        // nearest one also marks where that line begins.
        let preceding = match self.newlines.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };
        let line_start = if preceding == 0 {
            0
        } else {
            self.newlines[preceding - 1] + 1
        };
        Position {
            line: preceding as u32 + 1,
            column: offset - line_start + 1,
            offset,
        }
    }

    /// Just the 1-based (line, column) pair of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let position = self.position(offset);
        (position.line, position.column)
    }

    /// Number of lines in the source. A trailing newline opens a final
    /// empty line.
    pub fn line_count(&self) -> usize {
        self.newlines.len() + 1
    }
}
