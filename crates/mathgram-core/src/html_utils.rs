use std::fmt;
use std::ops::Deref;

/// Text that went through [`escape`] and can be embedded in HTML content or attributes.
///
/// The only way to obtain a `Sanitized` value is by escaping raw text, so holding one is proof
/// that none of the reserved characters `&`, `<`, `>`, `"` and `'` appear unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sanitized(String);

impl Sanitized {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Sanitized {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Sanitized {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sanitized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes raw user text for safe inclusion in HTML.
///
/// The replacement behaves exactly like replacing, in this order:
/// - `&` with `&amp;`
/// - `<` with `&lt;`
/// - `>` with `&gt;`
/// - `"` with `&quot;`
/// - `'` with `&#x27;`
///
/// Everything else, including math delimiters and backslashes, is left untouched.
///
/// ```rust
/// use mathgram_core::escape;
///
/// assert_eq!(escape("Ana & Cia").as_str(), "Ana &amp; Cia");
/// assert_eq!(escape(r"$\frac{a}{b}$").as_str(), r"$\frac{a}{b}$");
/// ```
pub fn escape(text: &str) -> Sanitized {
    let mut output = String::with_capacity(text.len());
    escape_html_into(&mut output, text);
    Sanitized(output)
}

/// Appends the escaped version of `input` to `output`.
///
/// This is done in a single pass, so ampersands that are part of an inserted entity are never
/// escaped a second time. `memchr` is used to skip quickly over runs of ordinary text.
pub fn escape_html_into(output: &mut String, input: &str) {
    let mut rest = input;

    while let Some(index) = next_reserved(rest.as_bytes()) {
        let (before, after) = rest.split_at(index);
        // Copy everything before the reserved character
        output.push_str(before);

        let Some(&special_char) = after.as_bytes().first() else {
            break;
        };
        output.push_str(entity(special_char));

        // All reserved characters are ASCII, so the next byte is a char boundary.
        rest = &after[1..];
    }

    // Copy any remaining text after the last reserved character
    output.push_str(rest);
}

/// Escapes special characters in `input` for safe inclusion in HTML attributes
/// which are enclosed in double quotes.
///
/// Specifically, it replaces:
/// - `&` with `&amp;`
/// - `"` with `&quot;`
///
/// This is used to embed a complete sub-document (which is already escaped at the content level)
/// into a `srcdoc` attribute.
pub fn escape_double_quoted_html_attribute(output: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            _ => output.push(ch),
        }
    }
}

#[inline]
fn entity(byte: u8) -> &'static str {
    match byte {
        b'&' => "&amp;",
        b'<' => "&lt;",
        b'>' => "&gt;",
        b'"' => "&quot;",
        b'\'' => "&#x27;",
        _ => "",
    }
}

/// Position of the next reserved character.
#[inline]
fn next_reserved(haystack: &[u8]) -> Option<usize> {
    let markup = memchr::memchr3(b'&', b'<', b'>', haystack);
    let quotes = memchr::memchr2(b'"', b'\'', haystack);
    match (markup, quotes) {
        (Some(m), Some(q)) => Some(m.min(q)),
        (m, q) => m.or(q),
    }
}
