//! Display fragments for user content.
//!
//! A fragment is a complete HTML sub-document that loads KaTeX and typesets the math found in
//! the (sanitized) content. It is meant to be shown in a sandboxed `<iframe>`, so every fragment
//! runs the math engine in its own context and the page's own theme cannot leak in.
use std::fmt::Write;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::delimiters::{DELIMITERS, MathDisplay, Scanner, Segment};
use crate::diagnostic::Diagnostic;
use crate::element_id::sanitize_id;
use crate::html_utils::{Sanitized, escape, escape_double_quoted_html_attribute};

/// Background colour of every fragment.
pub const BACKGROUND: &str = "#0e1117";
/// Text colour of every fragment, including all math.
pub const FOREGROUND: &str = "#fafafa";
/// Colour of unterminated math, which is shown as typed.
pub const ERROR_COLOR: &str = "#ff4444";

/// Script for the host page, which resizes each fragment frame to the height its content reports.
pub const HOST_SCRIPT: &str = r#"<script>
window.addEventListener("message", function (event) {
    var data = event.data;
    if (!data || typeof data.mathgramFrame !== "string") return;
    var frame = document.getElementById(data.mathgramFrame + "-frame");
    if (frame) frame.style.height = data.height + "px";
});
</script>"#;

/// Configuration of the renderer.
///
/// The colours are not configurable on purpose; see [`BACKGROUND`] and [`FOREGROUND`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct RenderConfig {
    /// Base URL of the KaTeX distribution, without trailing slash.
    pub katex_url: String,
    /// Maximum height of a fragment container, in pixels. Taller content scrolls.
    pub max_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            katex_url: "https://cdnjs.cloudflare.com/ajax/libs/KaTeX/0.16.8".to_string(),
            max_height: 300,
        }
    }
}

/// A located math span of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub display: MathDisplay,
    /// The TeX source between the delimiters, as sanitized text.
    pub tex: String,
    /// Byte range in [`Fragment::sanitized`], delimiters included.
    pub span: Range<usize>,
}

/// A rendered piece of user content.
#[derive(Debug, Clone)]
pub struct Fragment {
    element_id: String,
    sanitized: Sanitized,
    body: String,
    document: String,
    math: Vec<MathSpan>,
    diagnostics: Vec<Diagnostic>,
    max_height: u32,
}

impl Fragment {
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// The escaped content the fragment was built from.
    pub fn sanitized(&self) -> &Sanitized {
        &self.sanitized
    }

    /// The `<div>` holding the content, with math spans marked up.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The complete sub-document.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn math_spans(&self) -> &[MathSpan] {
        &self.math
    }

    /// Unclosed delimiters. Offsets refer to [`Fragment::sanitized`].
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The fragment embedded in a sandboxed, auto-sizing frame inside a scroll container.
    ///
    /// The page showing the frame should include [`HOST_SCRIPT`] once.
    pub fn to_iframe_html(&self) -> String {
        let mut out = String::with_capacity(self.document.len() + 256);
        let _ = write!(
            out,
            "<div class=\"math-frame\" style=\"max-height: {}px; overflow-y: auto;\">",
            self.max_height
        );
        let _ = write!(
            out,
            "<iframe id=\"{0}-frame\" title=\"{0}\" sandbox=\"allow-scripts\" scrolling=\"no\" \
             style=\"width: 100%; border: 0; display: block;\" srcdoc=\"",
            self.element_id
        );
        escape_double_quoted_html_attribute(&mut out, &self.document);
        out.push_str("\"></iframe></div>");
        out
    }
}

/// Turns raw user text into display fragments.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `content` into a fragment tagged with `element_id`.
    ///
    /// The content is escaped first; nothing the user typed can open a tag or a script. Rendering
    /// cannot fail: math with a missing closing delimiter is shown literally in the error colour.
    ///
    /// ```rust
    /// use mathgram_core::Renderer;
    ///
    /// let fragment = Renderer::default().render("<b>bold</b> $x^2$", "post-1");
    /// assert_eq!(fragment.math_spans().len(), 1);
    /// assert!(fragment.body().contains("&lt;b&gt;bold&lt;/b&gt;"));
    /// ```
    pub fn render(&self, content: &str, element_id: &str) -> Fragment {
        let element_id = sanitize_id(element_id);
        let sanitized = escape(content);

        let mut body = String::with_capacity(sanitized.len() + 64);
        let mut math = Vec::new();
        let mut diagnostics = Vec::new();

        let _ = write!(body, "<div id=\"{element_id}\" class=\"math-content\">");
        for segment in Scanner::new(&sanitized) {
            match segment {
                Segment::Text(text) => body.push_str(text),
                Segment::Math {
                    delimiter,
                    tex,
                    span,
                } => {
                    let _ = write!(
                        body,
                        "<span class=\"math {}\">{}{}{}</span>",
                        delimiter.display.as_str(),
                        delimiter.open,
                        tex,
                        delimiter.close
                    );
                    math.push(MathSpan {
                        display: delimiter.display,
                        tex: tex.to_string(),
                        span,
                    });
                }
                Segment::Unterminated {
                    delimiter,
                    raw,
                    span,
                } => {
                    body.push_str("<span class=\"math-error\">");
                    body.push_str(raw);
                    body.push_str("</span>");
                    diagnostics.push(Diagnostic { span, delimiter });
                }
            }
        }
        body.push_str("</div>");

        let document = self.document(&element_id, &body);

        Fragment {
            element_id,
            sanitized,
            body,
            document,
            math,
            diagnostics,
            max_height: self.config.max_height,
        }
    }

    fn document(&self, element_id: &str, body: &str) -> String {
        let mut katex = String::new();
        escape_double_quoted_html_attribute(
            &mut katex,
            self.config.katex_url.trim_end_matches('/'),
        );
        let mut doc = String::with_capacity(body.len() + 3072);

        doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(
            doc,
            "<link rel=\"stylesheet\" href=\"{katex}/katex.min.css\">"
        );
        for script in ["katex.min.js", "contrib/auto-render.min.js", "contrib/mhchem.min.js"] {
            let _ = writeln!(doc, "<script defer src=\"{katex}/{script}\"></script>");
        }

        doc.push_str("<style>\n");
        let _ = writeln!(
            doc,
            "body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif; \
             line-height: 1.6; margin: 0; padding: 10px; background: {BACKGROUND}; color: {FOREGROUND}; }}"
        );
        let _ = writeln!(
            doc,
            ".katex, .katex * {{ color: {FOREGROUND} !important; }}"
        );
        let _ = writeln!(
            doc,
            ".math-content {{ word-wrap: break-word; overflow-wrap: break-word; color: {FOREGROUND}; }}"
        );
        let _ = writeln!(
            doc,
            ".math-error {{ color: {ERROR_COLOR}; white-space: pre-wrap; }}"
        );
        doc.push_str("</style>\n</head>\n<body>\n");

        doc.push_str(body);
        doc.push('\n');

        doc.push_str("<script>\ndocument.addEventListener(\"DOMContentLoaded\", function () {\n");
        let _ = writeln!(
            doc,
            "    document.body.style.background = \"{BACKGROUND}\";\n    document.body.style.color = \"{FOREGROUND}\";"
        );
        let _ = writeln!(
            doc,
            "    renderMathInElement(document.getElementById(\"{element_id}\"), {{"
        );
        doc.push_str("        delimiters: [\n");
        for delimiter in &DELIMITERS {
            let _ = writeln!(
                doc,
                "            {{left: {}, right: {}, display: {}}},",
                js_string(delimiter.open),
                js_string(delimiter.close),
                matches!(delimiter.display, MathDisplay::Block)
            );
        }
        doc.push_str("        ],\n");
        doc.push_str("        ignoredClasses: [\"math-error\"],\n");
        // `\ce` comes from the mhchem extension loaded above.
        doc.push_str("        throwOnError: false,\n        trust: true\n    });\n");
        let _ = writeln!(
            doc,
            "    parent.postMessage({{mathgramFrame: \"{element_id}\", height: document.documentElement.scrollHeight}}, \"*\");"
        );
        doc.push_str("});\n</script>\n</body>\n</html>\n");
        doc
    }
}

/// Quotes `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
