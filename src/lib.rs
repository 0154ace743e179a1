//! Incremental, deduplicating page loading for remote list views.
//!
//! List views in an admin application all fetch the same way: one page at a
//! time, appending records as the user scrolls, while guarding against
//! duplicate fetches, overlapping pages, and responses that arrive after the
//! view was reset. This crate packages that contract once:
//!
//! - [`ListLoader`] is the loading state machine: `items`, `loading`,
//!   `has_more`, `error`, plus `load_more()` and `reset()`. At most one
//!   fetch is in flight; records are deduplicated by key; a failed fetch is
//!   recorded and replayed on the next call instead of thrown.
//! - [`PageSource`] is the seam to the remote collection. [`RestSource`]
//!   speaks the JSON list-endpoint dialect of the surrounding admin API;
//!   [`VecSource`] serves an in-memory collection for tests and fixtures.
//! - [`ListSnapshot`] is the read-only state a view renders from, delivered
//!   through a watch subscription after every change.

pub mod domain;
pub mod loader;
pub mod source;

pub use domain::{Keyed, Page, PageToken};
pub use loader::{ListLoader, ListSnapshot, LoadOutcome, LoaderConfig};
pub use source::{PageSource, RestSource, SourceError, VecSource};
