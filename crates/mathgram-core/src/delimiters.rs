//! Splitting text into plain runs and math spans.
//!
//! The scanner walks the input greedily from left to right. At the earliest position where any
//! opening delimiter of [`DELIMITERS`] matches, the first entry of the table that matches there
//! wins. The matching closing delimiter is then searched the same way KaTeX's auto-render does it:
//! a backslash skips the character after it, and braces must be balanced before a closing
//! delimiter is accepted.
//!
//! Scanning never fails. An opening delimiter without a partner turns the rest of the input into
//! a [`Segment::Unterminated`] span, which is shown literally.
use std::ops::Range;

use strum_macros::IntoStaticStr;

/// Display mode of a math span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum MathDisplay {
    /// For inline equations, like those in `$...$`.
    #[strum(serialize = "inline")]
    Inline,
    /// For block equations (or "display style" equations), like those in `$$...$$`.
    #[strum(serialize = "display")]
    Block,
}

impl MathDisplay {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A pair of opening and closing delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub open: &'static str,
    pub close: &'static str,
    pub display: MathDisplay,
}

/// The delimiter table, in priority order.
///
/// `$$` has to come before `$`, otherwise every display equation would be read as an empty inline
/// equation followed by garbage.
pub static DELIMITERS: [Delimiter; 4] = [
    Delimiter {
        open: "$$",
        close: "$$",
        display: MathDisplay::Block,
    },
    Delimiter {
        open: r"\[",
        close: r"\]",
        display: MathDisplay::Block,
    },
    Delimiter {
        open: "$",
        close: "$",
        display: MathDisplay::Inline,
    },
    Delimiter {
        open: r"\(",
        close: r"\)",
        display: MathDisplay::Inline,
    },
];

/// A piece of scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'source> {
    /// Text outside of any math delimiters.
    Text(&'source str),
    /// A complete math span. `tex` excludes the delimiters, `span` includes them.
    Math {
        delimiter: Delimiter,
        tex: &'source str,
        span: Range<usize>,
    },
    /// An opening delimiter that was never closed, together with everything after it.
    Unterminated {
        delimiter: Delimiter,
        raw: &'source str,
        span: Range<usize>,
    },
}

impl<'source> Segment<'source> {
    /// The segment's text as it appeared in the input, delimiters included.
    pub fn source(&self, input: &'source str) -> &'source str {
        match self {
            Segment::Text(text) => text,
            Segment::Math { span, .. } => &input[span.clone()],
            Segment::Unterminated { raw, .. } => raw,
        }
    }
}

/// An iterator over the [`Segment`]s of a string.
#[derive(Debug, Clone)]
pub struct Scanner<'source> {
    input: &'source str,
    pos: usize,
}

impl<'source> Scanner<'source> {
    pub fn new(input: &'source str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'source> Iterator for Scanner<'source> {
    type Item = Segment<'source>;

    fn next(&mut self) -> Option<Segment<'source>> {
        let input = self.input;
        if self.pos >= input.len() {
            return None;
        }
        let remaining = &input[self.pos..];

        // Find the next occurrence of any opening delimiter
        let Some((offset, delimiter)) = find_opening(remaining) else {
            // No more opening delimiters found
            self.pos = input.len();
            return Some(Segment::Text(remaining));
        };

        if offset > 0 {
            // Emit the text before the delimiter; the next call starts right at the delimiter.
            self.pos += offset;
            return Some(Segment::Text(&remaining[..offset]));
        }

        let open_pos = self.pos;
        let start = open_pos + delimiter.open.len();

        match find_closing(&input[start..], delimiter.close) {
            Some(idx) => {
                let end = start + idx;
                self.pos = end + delimiter.close.len();
                Some(Segment::Math {
                    delimiter,
                    tex: &input[start..end],
                    span: open_pos..self.pos,
                })
            }
            None => {
                self.pos = input.len();
                Some(Segment::Unterminated {
                    delimiter,
                    raw: &input[open_pos..],
                    span: open_pos..input.len(),
                })
            }
        }
    }
}

/// Splits `input` into segments.
///
/// ```rust
/// use mathgram_core::delimiters::{scan, Segment};
///
/// let segments = scan("area $\\pi r^2$");
/// assert_eq!(segments.len(), 2);
/// assert!(matches!(segments[1], Segment::Math { tex: "\\pi r^2", .. }));
/// ```
pub fn scan(input: &str) -> Vec<Segment<'_>> {
    Scanner::new(input).collect()
}

/// Finds the leftmost opening delimiter. Ties are resolved by table order.
fn find_opening(input: &str) -> Option<(usize, Delimiter)> {
    let bytes = input.as_bytes();
    let mut offset = 0;

    // Every opening delimiter starts with either `$` or `\`.
    while let Some(relative_pos) = memchr::memchr2(b'$', b'\\', &bytes[offset..]) {
        let pos = offset + relative_pos;
        let candidate = &bytes[pos..];
        if let Some(delimiter) = DELIMITERS
            .iter()
            .find(|d| candidate.starts_with(d.open.as_bytes()))
        {
            return Some((pos, *delimiter));
        }
        offset = pos + 1;
    }

    None
}

/// Finds `close` in `input`, skipping escaped characters and nested brace groups.
fn find_closing(input: &str, close: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let close = close.as_bytes();
    let mut brace_level: i32 = 0;
    let mut index = 0;

    while index < bytes.len() {
        if brace_level <= 0 && bytes[index..].starts_with(close) {
            return Some(index);
        }
        match bytes[index] {
            b'\\' => index += 1,
            b'{' => brace_level += 1,
            b'}' => brace_level -= 1,
            _ => {}
        }
        index += 1;
    }

    None
}
