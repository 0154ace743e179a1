//! Page sources: the collaborators that actually fetch collection pages.
//!
//! The loader talks to a remote collection exclusively through the
//! [`PageSource`] trait, so the same loading contract works over HTTP,
//! an in-memory fixture, or anything else that can produce [`Page`]s.

mod memory;
mod rest;

pub use memory::VecSource;
pub use rest::RestSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Page, PageToken};

/// Failure while fetching one page.
///
/// Deliberately coarse: the loader records the error and leaves retry
/// policy to the caller, so distinguishing retryable from fatal causes
/// happens there, not here. Cloneable so it can live in state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The collection endpoint could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("request rejected with status {status}: {detail}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        detail: String,
    },
    /// The response did not match the expected page shape.
    #[error("malformed page payload: {0}")]
    Decode(String),
}

impl SourceError {
    /// Creates a transport error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }

    /// Creates a decode error from any displayable cause.
    pub fn decode(cause: impl std::fmt::Display) -> Self {
        Self::Decode(cause.to_string())
    }
}

/// A remote collection that can be read one page at a time.
///
/// `token` is `None` for the first page and otherwise the `next` token
/// from the previously fetched page. Implementations must return a page
/// with `next == None` once the collection is exhausted, including when
/// `page_size` exceeds the number of remaining records.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type served by this source.
    type Record;

    /// Fetches one page of at most `page_size` records.
    async fn fetch_page(
        &self,
        token: Option<&PageToken>,
        page_size: usize,
    ) -> Result<Page<Self::Record>, SourceError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn error_messages() {
        let err = SourceError::transport("connection refused");
        assert_eq!(err.to_string(), "transport failure: connection refused");

        let err = SourceError::Rejected {
            status: 500,
            detail: "internal error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request rejected with status 500: internal error"
        );
    }
}
