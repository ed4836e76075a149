use std::fmt;
use std::ops::Range;

use crate::delimiters::{Delimiter, Scanner, Segment};

/// An opening math delimiter that is never closed.
///
/// Such input still renders (the rest of the text is shown literally), so this is a warning for
/// the author rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Byte range from the opening delimiter to the end of the input.
    pub span: Range<usize>,
    pub delimiter: Delimiter,
}

impl Diagnostic {
    /// Byte range of the opening delimiter alone.
    pub fn opener(&self) -> Range<usize> {
        self.span.start..self.span.start + self.delimiter.open.len()
    }

    pub fn message(&self) -> String {
        "Unclosed delimiter \"".to_string()
            + self.delimiter.open
            + "\": expected \""
            + self.delimiter.close
            + "\", but not found."
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span.start, self.message())
    }
}

#[cfg(feature = "ariadne")]
impl Diagnostic {
    /// Convert this diagnostic into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Warning, (source_name, self.opener()))
            .with_config(config)
            .with_message(self.message())
            .with_label(
                Label::new((source_name, self.opener()))
                    .with_message("this delimiter is never closed"),
            )
            .with_note("the rest of the text is shown as it was typed")
            .finish()
    }
}

/// Lists the unclosed delimiters in `content`.
///
/// Escaping never introduces or removes `$`, `\`, `{` or `}`, so raw text and its sanitized form
/// segment identically; only the byte offsets differ. Run this on whichever text the offsets
/// should refer to.
pub fn check(content: &str) -> Vec<Diagnostic> {
    Scanner::new(content)
        .filter_map(|segment| match segment {
            Segment::Unterminated {
                delimiter, span, ..
            } => Some(Diagnostic { span, delimiter }),
            _ => None,
        })
        .collect()
}
