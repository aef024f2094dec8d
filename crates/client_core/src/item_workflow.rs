//! Fetch lifecycle, decisions and sequential navigation for a single listing.

use shared::{
    domain::{AdId, AdvertisementDetail},
    protocol::{DecisionKind, DecisionRequest},
};
use tracing::{debug, info, warn};

use crate::{
    commands::{BackendCommand, DecisionTicket, ItemTicket, Settlement},
    error::{DecisionWriteError, FetchError, WorkflowError},
    validation::{build_request, DecisionForm},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    Loading,
    Loaded(Box<AdvertisementDetail>),
    NotFound,
    Error(FetchError),
}

/// Owns the current listing id. Every read is tagged with a fresh generation
/// and only the most recently issued one may settle.
#[derive(Debug)]
pub struct ItemWorkflowController {
    current_id: AdId,
    state: ItemState,
    generation: u64,
    decision_sequence: u64,
    pending_decisions: usize,
    last_decision_error: Option<DecisionWriteError>,
}

impl ItemWorkflowController {
    pub fn open(id: AdId) -> (Self, BackendCommand) {
        let mut controller = Self {
            current_id: id,
            state: ItemState::Loading,
            generation: 0,
            decision_sequence: 0,
            pending_decisions: 0,
            last_decision_error: None,
        };
        let command = controller.issue_read();
        (controller, command)
    }

    pub fn current_id(&self) -> AdId {
        self.current_id
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn detail(&self) -> Option<&AdvertisementDetail> {
        match &self.state {
            ItemState::Loaded(detail) => Some(detail.as_ref()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ItemState::Loading)
    }

    pub fn navigate(&mut self, id: AdId) -> BackendCommand {
        if id != self.current_id {
            debug!(from = %self.current_id, to = %id, "navigating");
        }
        self.current_id = id;
        self.last_decision_error = None;
        self.issue_read()
    }

    /// Always moves to `current + 1`; an id past the end settles as `NotFound`.
    pub fn next(&mut self) -> BackendCommand {
        self.navigate(self.current_id.next())
    }

    pub fn can_prev(&self) -> bool {
        self.current_id.prev().is_some()
    }

    /// `None` at the first id. Nothing is fetched in that case.
    pub fn prev(&mut self) -> Option<BackendCommand> {
        let target = self.current_id.prev()?;
        Some(self.navigate(target))
    }

    pub fn reload(&mut self) -> BackendCommand {
        self.issue_read()
    }

    fn issue_read(&mut self) -> BackendCommand {
        self.generation += 1;
        self.state = ItemState::Loading;
        BackendCommand::FetchItem(ItemTicket {
            id: self.current_id,
            generation: self.generation,
        })
    }

    pub fn can_decide(&self) -> bool {
        matches!(self.state, ItemState::Loaded(_))
    }

    pub fn approve(&mut self) -> Result<BackendCommand, WorkflowError> {
        self.decide(DecisionKind::Approve, &DecisionForm::default())
    }

    pub fn reject(&mut self, form: &DecisionForm) -> Result<BackendCommand, WorkflowError> {
        self.decide(DecisionKind::Reject, form)
    }

    pub fn request_changes(&mut self, form: &DecisionForm) -> Result<BackendCommand, WorkflowError> {
        self.decide(DecisionKind::RequestChanges, form)
    }

    fn decide(
        &mut self,
        kind: DecisionKind,
        form: &DecisionForm,
    ) -> Result<BackendCommand, WorkflowError> {
        if !self.can_decide() {
            return Err(WorkflowError::NotLoaded);
        }
        let request = build_request(kind, form).map_err(WorkflowError::Incomplete)?;
        Ok(self.dispatch_decision(request))
    }

    fn dispatch_decision(&mut self, request: DecisionRequest) -> BackendCommand {
        if self.pending_decisions > 0 {
            warn!(
                ad_id = %self.current_id,
                pending = self.pending_decisions,
                "dispatching decision while another is unsettled"
            );
        }
        self.decision_sequence += 1;
        self.pending_decisions += 1;
        self.last_decision_error = None;
        BackendCommand::SubmitDecision {
            ticket: DecisionTicket {
                id: self.current_id,
                kind: request.kind(),
                sequence: self.decision_sequence,
            },
            request,
        }
    }

    pub fn on_item_settled(
        &mut self,
        ticket: ItemTicket,
        result: Result<Option<AdvertisementDetail>, FetchError>,
    ) -> Settlement {
        if ticket.generation != self.generation || ticket.id != self.current_id {
            debug!(ad_id = %ticket.id, generation = ticket.generation, "discarding superseded item read");
            return Settlement::Discarded;
        }

        self.state = match result {
            Ok(Some(detail)) => ItemState::Loaded(Box::new(detail)),
            Ok(None) => {
                debug!(ad_id = %ticket.id, "listing not found");
                ItemState::NotFound
            }
            Err(err) => {
                warn!(ad_id = %ticket.id, error = %err, "item read failed");
                ItemState::Error(err)
            }
        };
        Settlement::Applied
    }

    /// Returns the re-read to dispatch once a write is confirmed for the
    /// item still on screen.
    pub fn on_decision_settled(
        &mut self,
        ticket: DecisionTicket,
        result: Result<(), FetchError>,
    ) -> Option<BackendCommand> {
        self.pending_decisions = self.pending_decisions.saturating_sub(1);
        let still_current = ticket.id == self.current_id;

        match result {
            Ok(()) => {
                info!(ad_id = %ticket.id, kind = ?ticket.kind, "decision confirmed");
                if still_current {
                    Some(self.issue_read())
                } else {
                    debug!(ad_id = %ticket.id, "skipping re-read for item no longer shown");
                    None
                }
            }
            Err(source) => {
                warn!(ad_id = %ticket.id, kind = ?ticket.kind, error = %source, "decision write failed");
                if still_current {
                    self.last_decision_error = Some(DecisionWriteError {
                        id: ticket.id,
                        kind: ticket.kind,
                        source,
                    });
                }
                None
            }
        }
    }

    pub fn pending_decisions(&self) -> usize {
        self.pending_decisions
    }

    pub fn last_decision_error(&self) -> Option<&DecisionWriteError> {
        self.last_decision_error.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/item_workflow_tests.rs"]
mod tests;
