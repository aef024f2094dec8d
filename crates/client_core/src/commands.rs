//! I/O requests emitted by the controllers and the settlements routed back.
//!
//! Every command carries a ticket naming what originated it. On settlement the
//! owning controller compares the ticket with its current state and discards
//! anything that has been superseded.

use shared::{
    domain::{AdId, AdvertisementDetail},
    protocol::{DecisionKind, DecisionRequest, ListPage, ListQuery, StatsPeriod},
};

use crate::{error::FetchError, stats::StatsBundle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub query: ListQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTicket {
    pub id: AdId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionTicket {
    pub id: AdId,
    pub kind: DecisionKind,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsTicket {
    pub period: StatsPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    FetchPage(PageTicket),
    FetchItem(ItemTicket),
    SubmitDecision {
        ticket: DecisionTicket,
        request: DecisionRequest,
    },
    FetchStats(StatsTicket),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchPage(_) => "fetch_page",
            BackendCommand::FetchItem(_) => "fetch_item",
            BackendCommand::SubmitDecision { .. } => "submit_decision",
            BackendCommand::FetchStats(_) => "fetch_stats",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ModerationEvent {
    PageSettled {
        ticket: PageTicket,
        result: Result<ListPage, FetchError>,
    },
    ItemSettled {
        ticket: ItemTicket,
        result: Result<Option<AdvertisementDetail>, FetchError>,
    },
    DecisionSettled {
        ticket: DecisionTicket,
        result: Result<(), FetchError>,
    },
    StatsSettled {
        ticket: StatsTicket,
        result: Result<StatsBundle, FetchError>,
    },
}

/// What a controller did with a settled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    Discarded,
}
