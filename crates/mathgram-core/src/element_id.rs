use rustc_hash::FxHashSet;

/// Hands out element ids that are unique within one rendering pass.
///
/// The math engine targets fragments by id, so two fragments on the same page must never share
/// one. Create a fresh generator per page (or per response) and route every fragment through it.
///
/// ```rust
/// use mathgram_core::ElementIds;
///
/// let mut ids = ElementIds::new();
/// assert_eq!(ids.keyed("post", 7), "post-7");
/// assert_eq!(ids.keyed("post", 7), "post-7-1");
/// assert_eq!(ids.next("preview"), "preview-2");
/// ```
#[derive(Debug, Default)]
pub struct ElementIds {
    issued: FxHashSet<String>,
    counter: u32,
}

impl ElementIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh id of the form `{prefix}-{n}`, with `n` taken from a monotonic counter.
    pub fn next(&mut self, prefix: &str) -> String {
        loop {
            let id = format!("{}-{}", sanitize_id(prefix), self.bump());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// An id derived from a stable key, like a post id.
    ///
    /// If the derived id was already issued during this pass, the counter is appended to it.
    pub fn keyed(&mut self, prefix: &str, key: impl std::fmt::Display) -> String {
        let base = sanitize_id(&format!("{prefix}-{key}"));
        if self.issued.insert(base.clone()) {
            return base;
        }
        loop {
            let id = format!("{base}-{}", self.bump());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Number of ids issued so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn bump(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }
}

/// Restricts an id to characters that are safe both in an HTML attribute and in a JavaScript
/// string literal.
pub(crate) fn sanitize_id(raw: &str) -> String {
    let id: String = raw
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if id.is_empty() { "math".to_string() } else { id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_ids_are_distinct() {
        let mut ids = ElementIds::new();
        let a = ids.next("preview");
        let b = ids.next("preview");
        assert_ne!(a, b);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_keyed_collision_falls_back_to_counter() {
        let mut ids = ElementIds::new();
        assert_eq!(ids.keyed("comment", 3), "comment-3");
        assert_eq!(ids.keyed("comment", 3), "comment-3-1");
        assert_eq!(ids.keyed("comment", 3), "comment-3-2");
    }

    #[test]
    fn test_counter_skips_ids_taken_by_keys() {
        let mut ids = ElementIds::new();
        assert_eq!(ids.keyed("x", 1), "x-1");
        assert_eq!(ids.next("x"), "x-2");
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        let mut ids = ElementIds::new();
        assert_eq!(ids.keyed("post", "a'b\"<c>"), "post-a_b__c_");
        assert_eq!(ids.next(""), "math-1");
    }

    #[test]
    fn test_empty_id_gets_a_name() {
        assert_eq!(sanitize_id(""), "math");
    }
}
