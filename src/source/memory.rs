//! In-memory page source.
//!
//! Serves offset-tokenized pages out of a `Vec`. Useful as a fixture in
//! tests and as the reference implementation of the [`PageSource`]
//! termination contract.

use async_trait::async_trait;

use crate::domain::{Page, PageToken};
use crate::source::{PageSource, SourceError};

/// Page source backed by an in-memory collection.
#[derive(Debug, Clone)]
pub struct VecSource<R> {
    records: Vec<R>,
}

impl<R> VecSource<R> {
    /// Creates a source over the given records, served in order.
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    /// Total number of records in the collection.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl<R> PageSource for VecSource<R>
where
    R: Clone + Send + Sync,
{
    type Record = R;

    async fn fetch_page(
        &self,
        token: Option<&PageToken>,
        page_size: usize,
    ) -> Result<Page<R>, SourceError> {
        let offset = match token {
            Some(token) => token
                .index()
                .ok_or_else(|| SourceError::decode(format!("not an offset token: {token}")))?,
            None => 0,
        };

        if offset >= self.records.len() {
            return Ok(Page::last(Vec::new()));
        }

        let end = (offset + page_size).min(self.records.len());
        let records = self.records[offset..end].to_vec();
        let next = (end < self.records.len()).then(|| PageToken::from_index(end));

        Ok(Page::new(records, next))
    }
}
