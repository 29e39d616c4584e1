//! Pagination controller - incremental list loading over the catalog.
//!
//! # Design
//!
//! Each controller owns one pagination session: a page cache, a table of
//! in-flight fetches and the observed total count. All state lives on a
//! single owner task; the cheap-to-clone [`PaginationController`] handle
//! sends it commands, and fetch completions come back over an internal
//! channel. No locks, no shared mutation.
//!
//! # Flow
//!
//! 1. The consumer calls `load_if_needed(page)`
//! 2. The session checks the may-fetch preconditions (deduplication,
//!    drift freeze, known end of collection)
//! 3. A fetch task is spawned; its completion is merged back on the owner
//!    task, whatever order completions arrive in
//! 4. Every completed fetch publishes exactly one update: the reassembled
//!    display list, or a pagination error
//!
//! The reported total can change between fetches when the backing
//! collection mutates upstream. Continuing to paginate against a moving
//! total would silently duplicate or drop items, so the first completion
//! that observes a mismatch freezes the session ([`TotalResults::TotalChanged`])
//! and every later completion is discarded until the consumer calls
//! `reset()` and reloads from page zero.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

use crate::error::{GatewayError, PaginationError};
use crate::metrics::{
    FetchTimer, record_fetch_error, record_page_fetched, record_session_reset, record_total_drift,
};
use crate::models::{CharacterModel, DisplayItem, DisplayList, TotalResults};
use crate::ports::{CatalogSource, EntryMapper, PageEnvelope, PageProcessor, PageQuery, ProcessedPage};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for one pagination session.
///
/// The filter is fixed for the lifetime of the session: the unfiltered
/// catalog and a search each get their own controller instance.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// Number of items per page.
    pub page_size: usize,
    /// Optional name-prefix filter (search sessions).
    pub filter: Option<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            filter: None,
        }
    }
}

/// One emission on a session's update stream.
pub type ListUpdate = Result<DisplayList, PaginationError>;

// =============================================================================
// Controller handle
// =============================================================================

enum Command {
    Load { page: u32 },
    Reset,
    CanLoadMore { current: usize, reply: oneshot::Sender<bool> },
}

/// Handle to a pagination session.
///
/// Cloneable; all clones drive the same session. When the last handle is
/// dropped the session task stops and cancels its in-flight fetches.
#[derive(Clone)]
pub struct PaginationController {
    commands: mpsc::UnboundedSender<Command>,
}

impl PaginationController {
    /// Spawn a new pagination session.
    ///
    /// Returns the command handle and the update stream. The stream emits
    /// one [`ListUpdate`] per completed fetch, success or failure.
    pub fn spawn<S, P, M>(
        config: PaginationConfig,
        source: Arc<S>,
        processor: Arc<P>,
        mapper: Arc<M>,
    ) -> (Self, mpsc::UnboundedReceiver<ListUpdate>)
    where
        S: CatalogSource + 'static,
        P: PageProcessor + 'static,
        M: EntryMapper + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let session = Session {
            config,
            source,
            processor,
            mapper,
            pages: BTreeMap::new(),
            in_flight: HashMap::new(),
            total: TotalResults::NotFetched,
            next_request_id: 0,
            updates: update_tx,
        };
        tokio::spawn(session.run(command_rx));

        (
            Self {
                commands: command_tx,
            },
            update_rx,
        )
    }

    /// Request a page load. No-op if the page is cached, already in
    /// flight, past the known end of the collection, or the session is
    /// frozen after total drift.
    pub fn load_if_needed(&self, page: u32) {
        let _ = self.commands.send(Command::Load { page });
    }

    /// Clear the session: cancel in-flight fetches, drop all cached pages
    /// and forget the observed total.
    pub fn reset(&self) {
        let _ = self.commands.send(Command::Reset);
    }

    /// Whether more items than `current_items` exist in the collection.
    ///
    /// `false` before the first fetch and after total drift. Returns
    /// `false` too if the session task is gone.
    pub async fn can_load_more(&self, current_items: usize) -> bool {
        let (reply, answer) = oneshot::channel();
        if self
            .commands
            .send(Command::CanLoadMore {
                current: current_items,
                reply,
            })
            .is_err()
        {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

// =============================================================================
// Session task
// =============================================================================

/// Outcome of one fetch task, marshaled back onto the session task.
struct Completion {
    page: u32,
    request_id: u64,
    outcome: Result<PageEnvelope, GatewayError>,
}

struct InFlightFetch {
    /// Distinguishes a pre-reset completion from a refetch of the same page.
    request_id: u64,
    abort: AbortHandle,
}

struct Session<S, P, M> {
    config: PaginationConfig,
    source: Arc<S>,
    processor: Arc<P>,
    mapper: Arc<M>,
    /// Cached pages in ascending index order.
    pages: BTreeMap<u32, Vec<CharacterModel>>,
    /// At most one entry per page index.
    in_flight: HashMap<u32, InFlightFetch>,
    total: TotalResults,
    next_request_id: u64,
    updates: mpsc::UnboundedSender<ListUpdate>,
}

impl<S, P, M> Session<S, P, M>
where
    S: CatalogSource + 'static,
    P: PageProcessor,
    M: EntryMapper,
{
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let (completion_tx, mut completions) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Load { page }) => self.load_if_needed(page, &completion_tx),
                    Some(Command::Reset) => self.reset(),
                    Some(Command::CanLoadMore { current, reply }) => {
                        let _ = reply.send(self.can_load_more(current));
                    }
                    None => break,
                },
                Some(completion) = completions.recv() => self.on_completion(completion),
            }
        }

        trace!("Session handle dropped, cancelling in-flight fetches");
        self.cancel_all();
    }

    /// May-fetch precondition. A page already satisfied or pending is never
    /// fetched twice; a frozen session never fetches at all.
    fn may_fetch(&self, page: u32) -> bool {
        if self.in_flight.contains_key(&page) || self.pages.contains_key(&page) {
            return false;
        }
        match self.total {
            TotalResults::NotFetched => true,
            TotalResults::Fetched(total) => ((page as usize * self.config.page_size) as i64) < total,
            TotalResults::TotalChanged => false,
        }
    }

    fn load_if_needed(&mut self, page: u32, completions: &mpsc::UnboundedSender<Completion>) {
        if !self.may_fetch(page) {
            trace!(page, "Load skipped");
            return;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let query = PageQuery {
            offset: page as usize * self.config.page_size,
            limit: self.config.page_size,
            name_starts_with: self.config.filter.clone(),
        };
        debug!(page, offset = query.offset, limit = query.limit, "Fetching page");

        let source = Arc::clone(&self.source);
        let completions = completions.clone();
        let task = tokio::spawn(async move {
            let _timer = FetchTimer::new();
            let outcome = source.character_page(query).await;
            let _ = completions.send(Completion {
                page,
                request_id,
                outcome,
            });
        });

        self.in_flight.insert(
            page,
            InFlightFetch {
                request_id,
                abort: task.abort_handle(),
            },
        );
    }

    fn on_completion(&mut self, completion: Completion) {
        match self.in_flight.get(&completion.page) {
            Some(tracked) if tracked.request_id == completion.request_id => {
                self.in_flight.remove(&completion.page);
            }
            // Untracked page or superseded request id: a reset happened
            // after this fetch was issued. Drop the result.
            _ => {
                trace!(page = completion.page, "Stale completion ignored");
                return;
            }
        }

        match completion.outcome {
            Ok(envelope) => match self.processor.process(envelope) {
                Ok(processed) => self.merge_page(completion.page, processed),
                Err(error) => {
                    warn!(page = completion.page, error = %error, "Page processing failed");
                    self.publish_fetch_error(completion.page);
                }
            },
            Err(error) => {
                warn!(page = completion.page, error = %error, "Page fetch failed");
                self.publish_fetch_error(completion.page);
            }
        }
    }

    /// Normalize transport and processing failures into one page-scoped
    /// error. The first page failing with nothing on display is surfaced
    /// distinctly so the consumer can offer a full-screen retry.
    fn publish_fetch_error(&mut self, page: u32) {
        record_fetch_error();
        let error = if page == 0 && self.pages.is_empty() {
            PaginationError::InitialFetchError
        } else {
            PaginationError::FetchError { page }
        };
        self.publish(Err(error));
    }

    fn merge_page(&mut self, page: u32, processed: ProcessedPage) {
        match self.total {
            // The session froze while this fetch was in flight.
            TotalResults::TotalChanged => {
                trace!(page, "Completion after total drift discarded");
                return;
            }
            TotalResults::Fetched(previous) if previous != processed.total => {
                warn!(
                    page,
                    previous,
                    reported = processed.total,
                    "Total count drift detected, freezing session"
                );
                record_total_drift();
                self.total = TotalResults::TotalChanged;
                self.publish(Err(PaginationError::TotalChanged));
                return;
            }
            _ => {}
        }

        if processed.total <= 0 {
            debug!(page, "Catalog reported no results");
            self.publish(Err(PaginationError::NoResults));
        }

        self.total = TotalResults::Fetched(processed.total);
        let models: Vec<CharacterModel> = processed
            .entries
            .iter()
            .map(|raw| self.mapper.map(raw))
            .collect();
        debug!(page, items = models.len(), total = processed.total, "Page merged");
        self.pages.insert(page, models);
        record_page_fetched();

        self.publish(Ok(self.assemble()));
    }

    /// Flatten the cached pages, ascending by page index, tagging each item
    /// with its origin page. Recomputed from scratch on every merge; page
    /// counts are small relative to fetch latency.
    fn assemble(&self) -> DisplayList {
        let entries = self
            .pages
            .iter()
            .flat_map(|(page, models)| {
                models.iter().map(|model| DisplayItem::Loaded {
                    model: model.clone(),
                    page: *page,
                })
            })
            .collect();
        DisplayList { entries }
    }

    fn can_load_more(&self, current_items: usize) -> bool {
        match self.total {
            TotalResults::NotFetched | TotalResults::TotalChanged => false,
            TotalResults::Fetched(total) => (current_items as i64) < total,
        }
    }

    fn reset(&mut self) {
        debug!(
            pages = self.pages.len(),
            in_flight = self.in_flight.len(),
            "Resetting pagination session"
        );
        record_session_reset();
        self.cancel_all();
        self.pages.clear();
        self.total = TotalResults::NotFetched;
    }

    fn cancel_all(&mut self) {
        for (_, fetch) in self.in_flight.drain() {
            fetch.abort.abort();
        }
    }

    fn publish(&self, update: ListUpdate) {
        // The consumer may have dropped its receiver; nothing to do then.
        let _ = self.updates.send(update);
    }
}
