//! List view-model: the local snapshot behind every list screen.
//!
//! The snapshot is only ever replaced wholesale by a fresh fetch; a
//! successful mutation elsewhere triggers a full refetch instead of patching
//! rows in place. Search and filters are applied locally on top of the
//! snapshot and never hit the network.
//!
//! A refresh can be driven in one step with [`ListViewModel::refresh`], or in
//! two with [`ListViewModel::begin_refresh`] / [`ListViewModel::finish_refresh`]
//! when the caller wants to render the loading state while the request is in
//! flight. A [`PendingRefresh`] that is dropped, or whose result is never
//! handed back, leaves the view untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{RemoteError, ValidationError};
use crate::notify::{Notification, NotificationSink};
use crate::query::ListQuery;
use crate::remote::{Entity, RemoteCollection};

/// Filter value meaning "no filter", as offered by the status drop-down.
pub const FILTER_ALL: &str = "all";

/// A list request detached from the view-model that issued it.
pub struct PendingRefresh<T: Entity> {
    remote: Arc<dyn RemoteCollection<T>>,
    query: ListQuery,
}

impl<T: Entity> PendingRefresh<T> {
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub async fn run(self) -> Result<Vec<T>, RemoteError> {
        self.remote.list(&self.query).await
    }
}

pub struct ListViewModel<T: Entity> {
    remote: Arc<dyn RemoteCollection<T>>,
    sink: Arc<dyn NotificationSink>,
    snapshot: Vec<T>,
    is_loading: bool,
    in_flight: usize,
    last_error: Option<RemoteError>,
    search_text: String,
    active_filters: BTreeMap<String, String>,
    refresh_count: u64,
}

impl<T: Entity> ListViewModel<T> {
    pub fn new(remote: Arc<dyn RemoteCollection<T>>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            remote,
            sink,
            snapshot: Vec::new(),
            is_loading: false,
            in_flight: 0,
            last_error: None,
            search_text: String::new(),
            active_filters: BTreeMap::new(),
            refresh_count: 0,
        }
    }

    // -- State ----------------------------------------------------------------

    pub fn snapshot(&self) -> &[T] {
        &self.snapshot
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&RemoteError> {
        self.last_error.as_ref()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn active_filters(&self) -> &BTreeMap<String, String> {
        &self.active_filters
    }

    /// Number of refreshes issued since construction.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    // -- Remote ---------------------------------------------------------------

    /// The list request for the current filters: newest first, capped at the
    /// entity's list limit.
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::new(T::SELECT);
        for (name, value) in &self.active_filters {
            if let Some(column) = T::filter_column(name) {
                query = query.eq(column, value.clone());
            }
        }
        query.newest_first().limit(T::LIST_LIMIT)
    }

    /// Mark the view as loading and hand out the request to run.
    pub fn begin_refresh(&mut self) -> PendingRefresh<T> {
        self.in_flight += 1;
        self.is_loading = true;
        self.refresh_count += 1;
        let query = self.query();
        debug!(
            table = T::TABLE,
            filters = query.filters().len(),
            "refreshing collection"
        );
        PendingRefresh {
            remote: Arc::clone(&self.remote),
            query,
        }
    }

    /// Apply the result of a request from [`begin_refresh`](Self::begin_refresh).
    ///
    /// Success replaces the snapshot and clears the last error. Failure keeps
    /// the previous snapshot visible, records the error and reports it.
    pub fn finish_refresh(
        &mut self,
        outcome: Result<Vec<T>, RemoteError>,
    ) -> Result<usize, RemoteError> {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_loading = self.in_flight > 0;

        match outcome {
            Ok(rows) => {
                let count = rows.len();
                self.snapshot = rows;
                self.last_error = None;
                Ok(count)
            }
            Err(err) => {
                warn!(table = T::TABLE, error = %err, "refresh failed, keeping previous snapshot");
                let fallback = format!("Failed to fetch {}", T::PLURAL);
                self.sink
                    .notify(Notification::error(err.user_message(&fallback)));
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Fetch the collection and replace the snapshot. Returns the row count.
    pub async fn refresh(&mut self) -> Result<usize, RemoteError> {
        let pending = self.begin_refresh();
        let outcome = pending.run().await;
        self.finish_refresh(outcome)
    }

    /// Called after a successful create, update or delete.
    pub async fn notify_mutation_completed(&mut self) {
        // Failures are already recorded and reported by `finish_refresh`.
        let _ = self.refresh().await;
    }

    // -- Local search and filters --------------------------------------------

    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    /// Set a named filter. Blank or [`FILTER_ALL`] removes it. Values are
    /// stored in their lower-case wire form, so "Completed" matches
    /// `completed`.
    pub fn set_filter(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        if !T::FILTERS.contains(&name) {
            return Err(ValidationError::UnknownField(name.to_string()));
        }
        let value = value.trim().to_ascii_lowercase();
        if value.is_empty() || value == FILTER_ALL {
            self.active_filters.remove(name);
        } else {
            self.active_filters.insert(name.to_string(), value);
        }
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.active_filters.clear();
    }

    /// Snapshot rows matching the search text and every active filter.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> + '_ {
        let needle = self.search_text.trim().to_lowercase();
        self.snapshot
            .iter()
            .filter(move |item| matches_search(*item, &needle) && self.matches_filters(item))
    }

    pub fn visible_count(&self) -> usize {
        self.visible_items().count()
    }

    pub fn empty_message(&self) -> String {
        if self.search_text.trim().is_empty() && self.active_filters.is_empty() {
            format!("No {} yet.", T::PLURAL)
        } else {
            format!("No {} found matching your search.", T::PLURAL)
        }
    }

    fn matches_filters(&self, item: &T) -> bool {
        self.active_filters
            .iter()
            .all(|(name, value)| item.filter_value(name).as_deref() == Some(value.as_str()))
    }
}

fn matches_search<T: Entity>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}
