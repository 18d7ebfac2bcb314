use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::domain::{FilterField, FilterSet};
use crate::error::{AppError, AppResult};
use crate::services::SupportApi;
use crate::workflow::TicketListCallback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched list was handed to the store.
    Applied(usize),
    /// A newer change was made before this one finished; nothing was applied.
    Superseded,
    /// The value did not change and the list already reflects it, so no
    /// fetch was made.
    Unchanged,
}

/// Owns the filter set and refetches the list whenever it changes. Each
/// fetch is numbered, and a response is applied only if no newer fetch has
/// been started since. Search edits are debounced, which merges edits only
/// when the caller keeps issuing them while earlier ones are still pending.
#[derive(Clone)]
pub struct FilterController {
    api: Arc<dyn SupportApi>,
    on_loaded: TicketListCallback,
    filters: Arc<RwLock<FilterSet>>,
    /// Filter set behind the list currently in the store; `None` until the
    /// first successful fetch.
    applied: Arc<RwLock<Option<FilterSet>>>,
    issued: Arc<AtomicU64>,
    search_debounce: Duration,
}

impl FilterController {
    pub fn new(
        api: Arc<dyn SupportApi>,
        on_loaded: TicketListCallback,
        search_debounce: Duration,
    ) -> Self {
        Self {
            api,
            on_loaded,
            filters: Arc::default(),
            applied: Arc::default(),
            issued: Arc::default(),
            search_debounce,
        }
    }

    pub fn filters(&self) -> FilterSet {
        self.filters.read().clone()
    }

    pub async fn set(&self, field: FilterField, value: &str) -> AppResult<RefreshOutcome> {
        let seq = {
            let mut filters = self.filters.write();
            let before = filters.clone();
            if !filters.set(field, value) {
                return Err(AppError::InvalidInput(format!(
                    "'{}' is not a valid {field:?} filter",
                    value.trim()
                )));
            }
            if *filters == before && self.applied.read().as_ref() == Some(&before) {
                return Ok(RefreshOutcome::Unchanged);
            }
            self.next_seq()
        };

        if field == FilterField::Search && !self.search_debounce.is_zero() {
            tokio::time::sleep(self.search_debounce).await;
            if self.issued.load(Ordering::SeqCst) != seq {
                return Ok(RefreshOutcome::Superseded);
            }
        }

        self.fetch(seq).await
    }

    /// Swaps in a whole filter set with a single fetch.
    pub async fn replace(&self, filters: FilterSet) -> AppResult<RefreshOutcome> {
        let seq = {
            *self.filters.write() = filters;
            self.next_seq()
        };
        self.fetch(seq).await
    }

    pub async fn clear(&self) -> AppResult<RefreshOutcome> {
        self.replace(FilterSet::default()).await
    }

    /// Refetches with the current filters, e.g. on startup.
    pub async fn refresh(&self) -> AppResult<RefreshOutcome> {
        let seq = self.next_seq();
        self.fetch(seq).await
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn fetch(&self, seq: u64) -> AppResult<RefreshOutcome> {
        let filters = self.filters();
        debug!(seq, query = ?filters.query_pairs(), "fetching ticket list");
        let result = self.api.list_tickets(&filters).await;

        if self.issued.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding superseded ticket list");
            return Ok(RefreshOutcome::Superseded);
        }

        let tickets = result.inspect_err(|err| warn!(error = %err, "ticket list fetch failed"))?;
        let count = tickets.len();
        (self.on_loaded)(tickets);
        *self.applied.write() = Some(filters);
        Ok(RefreshOutcome::Applied(count))
    }
}
