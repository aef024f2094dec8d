//! Runs backend commands and routes their settlements back to the owning
//! controller.

use shared::{domain::AdId, protocol::StatsPeriod};
use tracing::debug;

use crate::{
    backend::ModerationBackend,
    commands::{BackendCommand, ModerationEvent, Settlement},
    error::WorkflowError,
    item_workflow::ItemWorkflowController,
    listing::ListingFeed,
    query_state::QueryStateController,
    stats::{StatsBoard, StatsBundle},
    validation::DecisionForm,
};

/// Performs the I/O a command describes. Never touches controller state.
pub async fn execute<B>(backend: &B, command: BackendCommand) -> ModerationEvent
where
    B: ModerationBackend + ?Sized,
{
    debug!(command = command.name(), "executing backend command");
    match command {
        BackendCommand::FetchPage(ticket) => {
            let result = backend.fetch_page(&ticket.query).await;
            ModerationEvent::PageSettled { ticket, result }
        }
        BackendCommand::FetchItem(ticket) => {
            let result = backend.fetch_item(ticket.id).await;
            ModerationEvent::ItemSettled { ticket, result }
        }
        BackendCommand::SubmitDecision { ticket, request } => {
            let result = backend.submit(ticket.id, &request).await;
            ModerationEvent::DecisionSettled { ticket, result }
        }
        BackendCommand::FetchStats(ticket) => {
            let period = ticket.period;
            let result = futures::try_join!(
                backend.summary(period),
                backend.activity(period),
                backend.decisions(period),
                backend.categories(period),
            )
            .map(|(summary, activity, decisions, categories)| StatsBundle {
                summary,
                activity,
                decisions,
                categories,
            });
            ModerationEvent::StatsSettled { ticket, result }
        }
    }
}

/// One moderator's view state over a backend: the queue, the open listing
/// and the stats board.
pub struct ModerationSession<B> {
    backend: B,
    query: QueryStateController,
    feed: ListingFeed,
    item: Option<ItemWorkflowController>,
    stats: StatsBoard,
}

impl<B: ModerationBackend> ModerationSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_stats_period(backend, StatsPeriod::default())
    }

    pub fn with_stats_period(backend: B, period: StatsPeriod) -> Self {
        let query = QueryStateController::new();
        let feed = ListingFeed::new(&query);
        Self {
            backend,
            query,
            feed,
            item: None,
            stats: StatsBoard::new(period),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn query(&self) -> &QueryStateController {
        &self.query
    }

    /// Mutations here take effect on the next [`Self::sync_listing`].
    pub fn query_mut(&mut self) -> &mut QueryStateController {
        &mut self.query
    }

    pub fn feed(&self) -> &ListingFeed {
        &self.feed
    }

    pub fn item(&self) -> Option<&ItemWorkflowController> {
        self.item.as_ref()
    }

    pub fn stats(&self) -> &StatsBoard {
        &self.stats
    }

    /// Executes `command`, routes its settlement and drains any follow-up
    /// commands the settlement produced. Returns the first settlement.
    pub async fn dispatch(&mut self, command: BackendCommand) -> Settlement {
        let event = execute(&self.backend, command).await;
        let (settlement, mut follow_up) = self.route(event);
        while let Some(command) = follow_up.take() {
            let event = execute(&self.backend, command).await;
            follow_up = self.route(event).1;
        }
        settlement
    }

    /// Hands a settled event to its controller. Exposed for shells that run
    /// [`execute`] themselves and may settle events out of order.
    pub fn route(&mut self, event: ModerationEvent) -> (Settlement, Option<BackendCommand>) {
        match event {
            ModerationEvent::PageSettled { ticket, result } => {
                (self.feed.on_settled(ticket, result, &mut self.query), None)
            }
            ModerationEvent::ItemSettled { ticket, result } => match self.item.as_mut() {
                Some(item) => (item.on_item_settled(ticket, result), None),
                None => (Settlement::Discarded, None),
            },
            ModerationEvent::DecisionSettled { ticket, result } => match self.item.as_mut() {
                Some(item) => (Settlement::Applied, item.on_decision_settled(ticket, result)),
                None => (Settlement::Discarded, None),
            },
            ModerationEvent::StatsSettled { ticket, result } => {
                (self.stats.on_settled(ticket, result), None)
            }
        }
    }

    /// Fetches the queue if the effective query changed since the last fetch.
    pub async fn sync_listing(&mut self) -> Option<Settlement> {
        let command = self.feed.poll()?;
        Some(self.dispatch(command).await)
    }

    pub async fn refresh_listing(&mut self) -> Settlement {
        let command = self.feed.refresh();
        self.dispatch(command).await
    }

    pub async fn open_item(&mut self, id: AdId) -> Settlement {
        let command = match self.item.as_mut() {
            Some(item) => item.navigate(id),
            None => {
                let (item, command) = ItemWorkflowController::open(id);
                self.item = Some(item);
                command
            }
        };
        self.dispatch(command).await
    }

    pub async fn next_item(&mut self) -> Option<Settlement> {
        let command = self.item.as_mut()?.next();
        Some(self.dispatch(command).await)
    }

    /// `None` when no listing is open or the open one is the first.
    pub async fn prev_item(&mut self) -> Option<Settlement> {
        let command = self.item.as_mut()?.prev()?;
        Some(self.dispatch(command).await)
    }

    pub async fn approve(&mut self) -> Result<Settlement, WorkflowError> {
        let command = self.item_mut()?.approve()?;
        Ok(self.dispatch(command).await)
    }

    pub async fn reject(&mut self, form: &DecisionForm) -> Result<Settlement, WorkflowError> {
        let command = self.item_mut()?.reject(form)?;
        Ok(self.dispatch(command).await)
    }

    pub async fn request_changes(
        &mut self,
        form: &DecisionForm,
    ) -> Result<Settlement, WorkflowError> {
        let command = self.item_mut()?.request_changes(form)?;
        Ok(self.dispatch(command).await)
    }

    pub async fn select_stats_period(&mut self, period: StatsPeriod) -> Settlement {
        let command = self.stats.select_period(period);
        self.dispatch(command).await
    }

    pub async fn refresh_stats(&mut self) -> Settlement {
        let command = self.stats.refresh();
        self.dispatch(command).await
    }

    fn item_mut(&mut self) -> Result<&mut ItemWorkflowController, WorkflowError> {
        self.item.as_mut().ok_or(WorkflowError::NotLoaded)
    }
}
