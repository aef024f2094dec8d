//! Collaborators owned by the network layer. The controllers never call these
//! directly; [`crate::session::execute`] does, on their behalf.

use async_trait::async_trait;
use shared::{
    domain::{AdId, AdvertisementDetail},
    protocol::{
        ActivityPoint, CategoryCounts, DecisionCounts, DecisionRequest, ListPage, ListQuery,
        StatsPeriod, StatsSummary,
    },
};

use crate::error::FetchError;

#[async_trait]
pub trait ListingDataSource: Send + Sync {
    async fn fetch_page(&self, query: &ListQuery) -> Result<ListPage, FetchError>;
}

#[async_trait]
pub trait ItemReader: Send + Sync {
    /// `Ok(None)` is the absence signal: the read succeeded but no record exists.
    async fn fetch_item(&self, id: AdId) -> Result<Option<AdvertisementDetail>, FetchError>;
}

#[async_trait]
pub trait DecisionGateway: Send + Sync {
    /// Success or failure only; callers re-read the item afterwards.
    async fn submit(&self, id: AdId, decision: &DecisionRequest) -> Result<(), FetchError>;
}

#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn summary(&self, period: StatsPeriod) -> Result<StatsSummary, FetchError>;
    async fn activity(&self, period: StatsPeriod) -> Result<Vec<ActivityPoint>, FetchError>;
    async fn decisions(&self, period: StatsPeriod) -> Result<DecisionCounts, FetchError>;
    async fn categories(&self, period: StatsPeriod) -> Result<CategoryCounts, FetchError>;
}

pub trait ModerationBackend: ListingDataSource + ItemReader + DecisionGateway + StatsSource {}

impl<T> ModerationBackend for T where
    T: ListingDataSource + ItemReader + DecisionGateway + StatsSource
{
}
