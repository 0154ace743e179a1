//! Core page primitives shared by sources and the loader.
//!
//! A remote collection is consumed one [`Page`] at a time. Each page carries
//! an optional continuation [`PageToken`]; a missing token marks the end of
//! the collection. Records stay opaque to the loader apart from the stable
//! identifier exposed through [`Keyed`].

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Opaque continuation token identifying the next unfetched page.
///
/// Sources decide what the token encodes. Offset- and page-number-based
/// backends can use the numeric helpers; cursor-based backends store the
/// cursor string verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// Creates a token from an arbitrary cursor value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates a token encoding a numeric position (offset or page number).
    pub fn from_index(index: usize) -> Self {
        Self(index.to_string())
    }

    /// Returns the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the token as a numeric position, if it is one.
    pub fn index(&self) -> Option<usize> {
        self.0.parse().ok()
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PageToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One bounded batch of records plus the continuation token for the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Records in collection order.
    pub records: Vec<R>,
    /// Token for the page after this one; `None` ends the collection.
    pub next: Option<PageToken>,
}

impl<R> Page<R> {
    /// Creates a page with a continuation token.
    pub fn new(records: Vec<R>, next: Option<PageToken>) -> Self {
        Self { records, next }
    }

    /// Creates the final page of a collection.
    pub fn last(records: Vec<R>) -> Self {
        Self {
            records,
            next: None,
        }
    }

    /// Returns whether this is the final page.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }

    /// Number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the page carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record with a stable unique identifier.
///
/// The loader uses the key for deduplication across page boundaries and for
/// the local mutation helpers; it never inspects the rest of the record.
pub trait Keyed {
    /// Identifier type. Must be stable for the lifetime of the record.
    type Key: Eq + Hash + Clone;

    /// Returns the record's identifier.
    fn key(&self) -> Self::Key;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn numeric_token_round_trip() {
        let token = PageToken::from_index(40);
        assert_eq!(token.as_str(), "40");
        assert_eq!(token.index(), Some(40));
    }

    #[test]
    fn cursor_token_has_no_index() {
        let token = PageToken::new("eyJpZCI6MTIzfQ");
        assert_eq!(token.index(), None);
        assert_eq!(token.to_string(), "eyJpZCI6MTIzfQ");
    }

    #[test]
    fn last_page_terminates() {
        let page = Page::last(vec![1, 2, 3]);
        assert!(page.is_last());
        assert_eq!(page.len(), 3);

        let page = Page::new(vec![1], Some(PageToken::from_index(1)));
        assert!(!page.is_last());
    }

    #[test]
    fn empty_final_page() {
        let page: Page<u32> = Page::last(Vec::new());
        assert!(page.is_empty());
        assert!(page.is_last());
    }
}
