//! Render and export user-authored posts that mix text with LaTeX math.
//!
//! Everything a user types is untrusted. It goes through [`escape`] before it is shown anywhere,
//! and both consumers of user text build on that:
//!
//! - [`Renderer`] turns content into a display [`Fragment`]: a sandboxed HTML sub-document in
//!   which KaTeX typesets the math spans found by the [`delimiters`] scanner.
//! - [`export_document`] turns a post into a standalone LaTeX source file.
//!
//! # Usage
//!
//! ```rust
//! use mathgram_core::{CalendarDate, ElementIds, Renderer, export_document, export_filename};
//!
//! let renderer = Renderer::default();
//! let mut ids = ElementIds::new();
//!
//! let content = r"Em todo triângulo retângulo, $a^2+b^2=c^2$.";
//! let fragment = renderer.render(content, &ids.keyed("post", 1));
//! assert_eq!(fragment.math_spans().len(), 1);
//!
//! let tex = export_document("Pitágoras", content, "Ana", CalendarDate::new(2024, 5, 1));
//! assert!(tex.contains(content));
//! assert_eq!(export_filename("Pitágoras"), "Pitágoras.tex");
//! ```
//!
//! # Features
//!
//! - `serde`: [`RenderConfig`] implements `Deserialize` and [`Timestamp`] implements
//!   `Serialize` and `Deserialize`.
//! - `ariadne`: [`Diagnostic::to_report`] for pretty-printing unclosed delimiters.
//!
pub mod delimiters;
mod diagnostic;
mod element_id;
mod export;
mod html_utils;
mod render;
mod time;

use static_assertions::assert_impl_all;

pub use self::diagnostic::{Diagnostic, check};
pub use self::element_id::ElementIds;
pub use self::export::{
    EXPORT_MIME, ExportFile, TexDocument, export_document, export_document_today, export_filename,
};
pub use self::html_utils::{Sanitized, escape, escape_html_into};
pub use self::render::{
    BACKGROUND, ERROR_COLOR, FOREGROUND, Fragment, HOST_SCRIPT, MathSpan, RenderConfig, Renderer,
};
pub use self::time::{CalendarDate, Timestamp};

// Rendering and exporting hold no shared state, so they can run on any thread.
assert_impl_all!(Renderer: Send, Sync);
assert_impl_all!(Fragment: Send, Sync);
assert_impl_all!(TexDocument<'static>: Send, Sync);
