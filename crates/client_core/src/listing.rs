//! Result-set state for the moderation queue.

use shared::{
    domain::ListingSummary,
    protocol::{ListPage, ListQuery},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    commands::{BackendCommand, PageTicket, Settlement},
    error::FetchError,
    query_state::QueryStateController,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Idle,
    Loading,
    Ready {
        items: Vec<ListingSummary>,
        total_items: u64,
    },
    Failed(FetchError),
}

/// What the shell should render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedView<'a> {
    Loading,
    Empty,
    Items(&'a [ListingSummary]),
    Failed(&'a FetchError),
}

/// Issues one page fetch per distinct effective query and keeps only the
/// response belonging to the latest one.
pub struct ListingFeed {
    queries: watch::Receiver<ListQuery>,
    state: FeedState,
    in_flight: Option<ListQuery>,
    primed: bool,
}

impl ListingFeed {
    pub fn new(controller: &QueryStateController) -> Self {
        Self {
            queries: controller.subscribe(),
            state: FeedState::Idle,
            in_flight: None,
            primed: false,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FeedState::Loading)
    }

    pub fn view(&self) -> FeedView<'_> {
        match &self.state {
            FeedState::Idle | FeedState::Loading => FeedView::Loading,
            FeedState::Ready { items, total_items } => {
                if items.is_empty() || *total_items == 0 {
                    FeedView::Empty
                } else {
                    FeedView::Items(items)
                }
            }
            FeedState::Failed(err) => FeedView::Failed(err),
        }
    }

    /// Returns a fetch command when the effective query changed since the
    /// last one issued, or on first use.
    pub fn poll(&mut self) -> Option<BackendCommand> {
        let changed = self.queries.has_changed().unwrap_or(false);
        if self.primed && !changed {
            return None;
        }
        self.primed = true;
        let query = self.queries.borrow_and_update().clone();
        Some(self.issue(query))
    }

    /// Re-issues the current query, e.g. after a failure.
    pub fn refresh(&mut self) -> BackendCommand {
        self.primed = true;
        let query = self.queries.borrow_and_update().clone();
        self.issue(query)
    }

    fn issue(&mut self, query: ListQuery) -> BackendCommand {
        debug!(page = query.page, search = %query.search, "issuing page fetch");
        self.state = FeedState::Loading;
        self.in_flight = Some(query.clone());
        BackendCommand::FetchPage(PageTicket { query })
    }

    pub fn on_settled(
        &mut self,
        ticket: PageTicket,
        result: Result<ListPage, FetchError>,
        controller: &mut QueryStateController,
    ) -> Settlement {
        let current = controller.effective_query();
        if self.in_flight.as_ref() != Some(&ticket.query) || ticket.query != current {
            debug!(page = ticket.query.page, "discarding page for superseded query");
            return Settlement::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let total_items = page.total_items();
                controller.set_total_items(total_items);
                self.state = FeedState::Ready {
                    items: page.ads,
                    total_items,
                };
            }
            Err(err) => {
                warn!(page = ticket.query.page, error = %err, "page fetch failed");
                self.state = FeedState::Failed(err);
            }
        }
        Settlement::Applied
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
