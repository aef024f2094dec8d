use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, ListingStatus, ListingSummary, ModerationAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    Priority,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Price => "price",
            SortField::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Read request for one page of the moderation queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<ListingStatus>,
    pub min_price: u32,
    pub max_price: u32,
    pub sort_by: SortField,
    pub sort_order: SortDirection,
}

impl ListQuery {
    /// Flattens the query into URL pairs. Status values repeat under `status[]`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("search", self.search.clone()),
        ];
        if let Some(category_id) = self.category_id {
            pairs.push(("categoryId", category_id.0.to_string()));
        }
        for status in &self.status {
            pairs.push(("status[]", status.label().to_string()));
        }
        pairs.push(("minPrice", self.min_price.to_string()));
        pairs.push(("maxPrice", self.max_price.to_string()));
        pairs.push(("sortBy", self.sort_by.as_str().to_string()));
        pairs.push(("sortOrder", self.sort_order.as_str().to_string()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_items: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub ads: Vec<ListingSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

impl ListPage {
    /// Server total when it reports a non-zero one, otherwise the page length.
    pub fn total_items(&self) -> u64 {
        match &self.pagination {
            Some(pagination) if pagination.total_items > 0 => pagination.total_items,
            _ => self.ads.len() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    Reject,
    RequestChanges,
}

impl DecisionKind {
    pub const fn path_segment(self) -> &'static str {
        match self {
            DecisionKind::Approve => "approve",
            DecisionKind::Reject => "reject",
            DecisionKind::RequestChanges => "request-changes",
        }
    }

    /// History action the server records for this decision.
    pub const fn recorded_action(self) -> ModerationAction {
        match self {
            DecisionKind::Approve => ModerationAction::Approved,
            DecisionKind::Reject => ModerationAction::Rejected,
            DecisionKind::RequestChanges => ModerationAction::RequestChanges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionBody {
    pub reason: String,
    pub comment: String,
}

/// Write request for a single listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionRequest {
    Approve,
    Reject(DecisionBody),
    RequestChanges(DecisionBody),
}

impl DecisionRequest {
    pub fn kind(&self) -> DecisionKind {
        match self {
            DecisionRequest::Approve => DecisionKind::Approve,
            DecisionRequest::Reject(_) => DecisionKind::Reject,
            DecisionRequest::RequestChanges(_) => DecisionKind::RequestChanges,
        }
    }

    pub fn body(&self) -> Option<&DecisionBody> {
        match self {
            DecisionRequest::Approve => None,
            DecisionRequest::Reject(body) | DecisionRequest::RequestChanges(body) => Some(body),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Today,
    #[default]
    Week,
    Month,
}

impl StatsPeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            StatsPeriod::Today => "today",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSummary {
    pub total_reviewed: u64,
    pub approved_percentage: f64,
    pub rejected_percentage: f64,
    pub request_changes_percentage: f64,
    /// Seconds.
    pub average_review_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub date: String,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default)]
    pub request_changes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecisionCounts {
    pub approved: u64,
    pub rejected: u64,
    pub request_changes: u64,
}

pub type CategoryCounts = BTreeMap<String, u64>;

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
