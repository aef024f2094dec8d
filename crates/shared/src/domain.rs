use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(AdId);
id_newtype!(CategoryId);

impl AdId {
    /// Identifier exactly one greater. Existence is not checked.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Identifier exactly one smaller, or `None` at the lower bound of 1.
    pub fn prev(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
    Draft,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 4] = [
        ListingStatus::Pending,
        ListingStatus::Approved,
        ListingStatus::Rejected,
        ListingStatus::Draft,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
            ListingStatus::Draft => "draft",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    Urgent,
}

/// One row of the moderation queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: AdId,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub status: ListingStatus,
    pub priority: Priority,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ListingSummary {
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approved,
    Rejected,
    RequestChanges,
}

impl ModerationAction {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationAction::Approved => "approved",
            ModerationAction::Rejected => "rejected",
            ModerationAction::RequestChanges => "request_changes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub moderator_name: String,
    pub timestamp: DateTime<Utc>,
    pub action: ModerationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub name: String,
    pub total_ads: u32,
    pub registered_at: DateTime<Utc>,
    pub rating: String,
}

impl SellerInfo {
    /// Whole calendar years between registration and `now`.
    pub fn years_on_site(&self, now: DateTime<Utc>) -> i32 {
        (now.year() - self.registered_at.year()).max(0)
    }
}

/// Full record for a single listing, replaced wholesale on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementDetail {
    pub id: AdId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub characteristics: BTreeMap<String, String>,
    pub seller: SellerInfo,
    #[serde(default)]
    pub moderation_history: Vec<HistoryEntry>,
}

impl AdvertisementDetail {
    pub fn latest_decision(&self) -> Option<&HistoryEntry> {
        self.moderation_history.last()
    }

    /// History must be oldest first; equal timestamps are allowed.
    pub fn history_is_chronological(&self) -> bool {
        self.moderation_history
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
