//! Shared handle to the page's document.

use std::sync::{Arc, Mutex, PoisonError};

use crate::dom::Document;

/// Cheaply cloneable handle to a [`Document`].
///
/// Timer tasks hold their own clone. The lock is only taken for synchronous
/// mutations and is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct Page {
    doc: Arc<Mutex<Document>>,
}

impl Page {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Arc::new(Mutex::new(doc)),
        }
    }

    /// Runs `f` with shared access to the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let guard = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Runs `f` with exclusive access to the document.
    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut guard = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(Document::is_authenticated)
    }

    /// Copies the current document out of the handle.
    pub fn snapshot(&self) -> Document {
        self.read(Document::clone)
    }
}

/// Interprets the page-level "authenticated" flag.
///
/// Templates inject either a boolean or its string form; only `true` and
/// `"true"` count as signed in.
pub fn parse_auth_flag(raw: &str) -> bool {
    raw.trim() == "true"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    #[test]
    fn test_parse_auth_flag() {
        assert!(parse_auth_flag("true"));
        assert!(parse_auth_flag(" true "));
        assert!(!parse_auth_flag("True"));
        assert!(!parse_auth_flag("1"));
        assert!(!parse_auth_flag(""));
        assert!(!parse_auth_flag("false"));
    }

    #[test]
    fn test_clones_share_document() {
        let page = Page::default();
        let other = page.clone();
        let id = other.write(|doc| {
            let body = doc.body();
            doc.append(body, Element::new("div").with_attr("id", "x"))
        });
        assert_eq!(page.read(|doc| doc.element_by_id("x")), id);

        page.write(|doc| doc.set_authenticated(true));
        assert!(other.is_authenticated());
    }
}
