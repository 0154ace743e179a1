//! Incremental list loading.
//!
//! [`ListLoader`] is a small state machine over a [`PageSource`]: it fetches
//! one page at a time, appends records while deduplicating by key, and
//! publishes a [`ListSnapshot`] to subscribers after every state change.
//! The `loading` flag, checked and set under one lock, is the sole dispatch
//! guard, so rapid repeated `load_more` calls collapse to a single fetch.

mod config;
mod snapshot;

pub use config::LoaderConfig;
pub use snapshot::ListSnapshot;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{Keyed, Page, PageToken};
use crate::source::{PageSource, SourceError};

/// How one `load_more` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and applied.
    Loaded {
        /// Records appended to the list.
        appended: usize,
        /// Records dropped because their key was already present.
        duplicates: usize,
    },
    /// Nothing was dispatched: a fetch was already in flight, or the
    /// collection is exhausted.
    Skipped,
    /// The fetch resolved after a reset and its page was discarded.
    Stale,
    /// The fetch failed; the error is also recorded in the snapshot.
    Failed(SourceError),
}

/// Internal loader state. All mutation goes through the mutex in
/// [`ListLoader`]; snapshots are cloned out for consumers.
struct State<R: Keyed> {
    items: Vec<R>,
    /// Keys of every record in `items`.
    seen: HashSet<R::Key>,
    cursor: Option<PageToken>,
    loading: bool,
    has_more: bool,
    error: Option<SourceError>,
    /// Bumped on reset; fetches dispatched under an older generation are
    /// discarded when they resolve.
    generation: u64,
}

impl<R: Keyed> State<R> {
    fn initial() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            loading: false,
            has_more: true,
            error: None,
            generation: 0,
        }
    }

    fn snapshot(&self) -> ListSnapshot<R>
    where
        R: Clone,
    {
        ListSnapshot {
            items: self.items.clone(),
            loading: self.loading,
            has_more: self.has_more,
            cursor: self.cursor.clone(),
            error: self.error.clone(),
        }
    }
}

/// A dispatched fetch: the request parameters plus the generation it was
/// dispatched under.
struct FetchTicket {
    generation: u64,
    cursor: Option<PageToken>,
    page_size: usize,
}

/// Incremental loader over a paged remote collection.
///
/// ```
/// use pagefeed::{Keyed, ListLoader, LoaderConfig, VecSource};
///
/// #[derive(Clone)]
/// struct Customer {
///     id: u32,
///     name: String,
/// }
///
/// impl Keyed for Customer {
///     type Key = u32;
///     fn key(&self) -> u32 {
///         self.id
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let customers = vec![
///     Customer { id: 1, name: "Acme".into() },
///     Customer { id: 2, name: "Globex".into() },
/// ];
/// let loader = ListLoader::new(
///     LoaderConfig::new().with_page_size(1).with_auto_load(false),
///     VecSource::new(customers),
/// );
///
/// while loader.snapshot().has_more {
///     loader.load_more().await;
/// }
/// assert_eq!(loader.snapshot().len(), 2);
/// # }
/// ```
pub struct ListLoader<S>
where
    S: PageSource,
    S::Record: Keyed,
{
    config: LoaderConfig,
    source: S,
    state: Mutex<State<S::Record>>,
    tx: watch::Sender<ListSnapshot<S::Record>>,
}

impl<S> ListLoader<S>
where
    S: PageSource,
    S::Record: Keyed + Clone,
{
    /// Creates a loader without fetching anything.
    pub fn new(config: LoaderConfig, source: S) -> Arc<Self> {
        let (tx, _) = watch::channel(ListSnapshot::initial());
        Arc::new(Self {
            config,
            source,
            state: Mutex::new(State::initial()),
            tx,
        })
    }

    /// Creates a loader and, when `auto_load_first_page` is set, dispatches
    /// the first fetch on the current runtime.
    pub fn start(config: LoaderConfig, source: S) -> Arc<Self>
    where
        S: 'static,
        S::Record: Send + Sync + 'static,
        <S::Record as Keyed>::Key: Send + 'static,
    {
        let loader = Self::new(config, source);
        if loader.config.auto_load_first_page {
            loader.spawn_load_more();
        }
        loader
    }

    /// Fetches the next page, unless a fetch is already in flight or the
    /// collection is exhausted (then the call is a no-op).
    ///
    /// Failures never propagate out of the loader: they are recorded in
    /// the snapshot's `error` field, and the next call replays the same
    /// page token.
    pub async fn load_more(&self) -> LoadOutcome {
        let Some(ticket) = self.begin() else {
            return LoadOutcome::Skipped;
        };
        self.run(ticket).await
    }

    /// Dispatches `load_more` as a background task.
    ///
    /// The loading flag is claimed before the task is spawned, so calling
    /// this from rapid UI events still produces at most one fetch.
    pub fn spawn_load_more(self: &Arc<Self>)
    where
        S: 'static,
        S::Record: Send + Sync + 'static,
        <S::Record as Keyed>::Key: Send + 'static,
    {
        let Some(ticket) = self.begin() else {
            return;
        };
        let loader = Arc::clone(self);
        tokio::spawn(async move {
            loader.run(ticket).await;
        });
    }

    /// Restores the initial state and invalidates any in-flight fetch.
    ///
    /// When `auto_load_first_page` is set, the first page is re-dispatched
    /// in the background.
    pub fn reset(self: &Arc<Self>)
    where
        S: 'static,
        S::Record: Send + Sync + 'static,
        <S::Record as Keyed>::Key: Send + 'static,
    {
        self.reset_state();
        if self.config.auto_load_first_page {
            self.spawn_load_more();
        }
    }

    /// Restores the initial state, then loads the first page inline.
    ///
    /// Resolves when the first page has landed (or failed), regardless of
    /// the auto-load policy.
    pub async fn refresh(&self) -> LoadOutcome {
        self.reset_state();
        self.load_more().await
    }

    /// Current consumer-facing state.
    pub fn snapshot(&self) -> ListSnapshot<S::Record> {
        self.state_lock().snapshot()
    }

    /// Subscribes to state changes. The receiver observes a fresh snapshot
    /// after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<S::Record>> {
        self.tx.subscribe()
    }

    /// Returns whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state_lock().loading
    }

    /// Returns whether unfetched pages remain.
    pub fn has_more(&self) -> bool {
        self.state_lock().has_more
    }

    /// Inserts a record at the front of the list, as after a create.
    ///
    /// If the key is already present the existing record is replaced in
    /// place instead, keeping the no-duplicate invariant.
    pub fn prepend(&self, record: S::Record) {
        let mut state = self.state_lock();
        let key = record.key();
        if state.seen.insert(key.clone()) {
            state.items.insert(0, record);
        } else if let Some(slot) = state.items.iter_mut().find(|item| item.key() == key) {
            *slot = record;
        }
        self.publish(&state);
    }

    /// Replaces the record with the same key, as after an edit.
    ///
    /// Returns false (without inserting) when no such record is loaded.
    pub fn replace(&self, record: S::Record) -> bool {
        let mut state = self.state_lock();
        let key = record.key();
        match state.items.iter_mut().find(|item| item.key() == key) {
            Some(slot) => {
                *slot = record;
                self.publish(&state);
                true
            }
            None => false,
        }
    }

    /// Removes the record with the given key, as after a delete.
    ///
    /// The key is freed, so a later page may legitimately re-introduce it.
    pub fn remove(&self, key: &<S::Record as Keyed>::Key) -> Option<S::Record> {
        let mut state = self.state_lock();
        let index = state.items.iter().position(|item| item.key() == *key)?;
        let record = state.items.remove(index);
        state.seen.remove(key);
        self.publish(&state);
        Some(record)
    }

    /// Claims the loading flag and captures the fetch parameters, or
    /// returns `None` when the guard rejects the dispatch.
    fn begin(&self) -> Option<FetchTicket> {
        let mut state = self.state_lock();
        if state.loading || !state.has_more {
            return None;
        }
        state.loading = true;
        let ticket = FetchTicket {
            generation: state.generation,
            cursor: state.cursor.clone(),
            page_size: self.config.page_size,
        };
        debug!(cursor = ?ticket.cursor, page_size = ticket.page_size, "dispatching page fetch");
        self.publish(&state);
        Some(ticket)
    }

    /// Runs a claimed fetch to completion and applies its result.
    async fn run(&self, ticket: FetchTicket) -> LoadOutcome {
        let result = self
            .source
            .fetch_page(ticket.cursor.as_ref(), ticket.page_size)
            .await;
        self.complete(ticket, result)
    }

    fn complete(
        &self,
        ticket: FetchTicket,
        result: Result<Page<S::Record>, SourceError>,
    ) -> LoadOutcome {
        let mut state = self.state_lock();
        if state.generation != ticket.generation {
            debug!(
                generation = ticket.generation,
                "discarding stale page response"
            );
            return LoadOutcome::Stale;
        }

        let outcome = match result {
            Ok(page) => {
                let Page { records, next } = page;
                state.has_more = next.is_some();
                state.cursor = next;

                let mut appended = 0;
                let mut duplicates = 0;
                for record in records {
                    if state.seen.insert(record.key()) {
                        state.items.push(record);
                        appended += 1;
                    } else {
                        duplicates += 1;
                    }
                }
                state.error = None;
                debug!(appended, duplicates, has_more = state.has_more, "applied page");
                LoadOutcome::Loaded {
                    appended,
                    duplicates,
                }
            }
            Err(err) => {
                // Cursor and items stay put; the next call retries this page.
                warn!(error = %err, "page fetch failed");
                state.error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        };

        state.loading = false;
        self.publish(&state);
        outcome
    }

    fn reset_state(&self) {
        let mut state = self.state_lock();
        state.generation += 1;
        state.items.clear();
        state.seen.clear();
        state.cursor = None;
        state.loading = false;
        state.has_more = true;
        state.error = None;
        self.publish(&state);
    }

    fn state_lock(&self) -> MutexGuard<'_, State<S::Record>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State<S::Record>) {
        self.tx.send_replace(state.snapshot());
    }
}
