//! LaTeX export of posts.
use std::fmt::Write;

use crate::html_utils::{Sanitized, escape};
use crate::time::CalendarDate;

/// MIME type of exported files.
pub const EXPORT_MIME: &str = "text/plain";

/// The fixed preamble of every exported document.
const PREAMBLE: &str = "\\documentclass{article}
\\usepackage[utf8]{inputenc}
\\usepackage[T1]{fontenc}
\\usepackage{amsmath}
\\usepackage{amsfonts}
\\usepackage{amssymb}
\\usepackage{mhchem}
\\usepackage[portuguese]{babel}
";

/// A post prepared for export.
///
/// Title and author are escaped exactly like in the rendered view. The content is LaTeX source in
/// its own right and is written out verbatim: escaping it for HTML would break commands such as
/// `\frac{1}{2}` as soon as they contain one of the reserved characters, e.g. `a < b` or `&` in an
/// `align` environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexDocument<'a> {
    pub title: Sanitized,
    pub author: Sanitized,
    pub content: &'a str,
    pub date: CalendarDate,
}

impl<'a> TexDocument<'a> {
    pub fn new(title: &str, content: &'a str, author: &str, date: CalendarDate) -> Self {
        Self {
            title: escape(title),
            author: escape(author),
            content,
            date,
        }
    }

    /// Writes the complete, compilable source.
    pub fn to_source(&self) -> String {
        let mut tex = String::with_capacity(PREAMBLE.len() + self.content.len() + 160);
        tex.push_str(PREAMBLE);
        tex.push('\n');
        let _ = writeln!(tex, "\\title{{{}}}", self.title);
        let _ = writeln!(tex, "\\author{{{}}}", self.author);
        let _ = writeln!(tex, "\\date{{{}}}", self.date);
        tex.push('\n');
        tex.push_str("\\begin{document}\n\n");
        tex.push_str("\\maketitle\n\n");
        tex.push_str(self.content);
        tex.push_str("\n\n");
        tex.push_str("\\end{document}\n");
        tex
    }
}

/// Generates the LaTeX source of a post, dated `date`.
///
/// ```rust
/// use mathgram_core::{CalendarDate, export_document};
///
/// let tex = export_document("Frações", r"$\frac{1}{2}$", "Ana & Cia", CalendarDate::new(2024, 5, 1));
/// assert!(tex.contains(r"\author{Ana &amp; Cia}"));
/// assert!(tex.contains(r"$\frac{1}{2}$"));
/// assert!(tex.contains(r"\date{01/05/2024}"));
/// ```
pub fn export_document(title: &str, content: &str, author: &str, date: CalendarDate) -> String {
    TexDocument::new(title, content, author, date).to_source()
}

/// Generates the LaTeX source of a post, dated today.
pub fn export_document_today(title: &str, content: &str, author: &str) -> String {
    export_document(title, content, author, CalendarDate::today())
}

/// Derives the download filename from a post title.
///
/// Spaces and path separators become underscores, so the name cannot leave the target directory.
pub fn export_filename(title: &str) -> String {
    let mut name: String = title
        .chars()
        .map(|ch| match ch {
            ' ' | '/' | '\\' => '_',
            _ => ch,
        })
        .collect();
    name.push_str(".tex");
    name
}

/// A ready-to-download export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub contents: String,
}

impl ExportFile {
    pub fn new(title: &str, content: &str, author: &str, date: CalendarDate) -> Self {
        Self {
            filename: export_filename(title),
            mime: EXPORT_MIME,
            contents: export_document(title, content, author, date),
        }
    }
}
