//! Moderator statistics for a selected period.

use shared::{
    domain::ModerationAction,
    protocol::{ActivityPoint, CategoryCounts, DecisionCounts, StatsPeriod, StatsSummary},
};
use tracing::{debug, warn};

use crate::{
    commands::{BackendCommand, Settlement, StatsTicket},
    error::FetchError,
};

pub const TOP_CATEGORIES: usize = 10;

/// The four payloads read together for one period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsBundle {
    pub summary: StatsSummary,
    pub activity: Vec<ActivityPoint>,
    pub decisions: DecisionCounts,
    pub categories: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub date: String,
    pub approved: u64,
    pub rejected: u64,
    pub request_changes: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionShare {
    pub action: ModerationAction,
    pub count: u64,
    /// Fraction of all decisions, in `0.0..=1.0`.
    pub share: f64,
}

impl DecisionShare {
    pub fn percent(&self) -> f64 {
        self.share * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    pub period: StatsPeriod,
    pub total_reviewed: u64,
    pub approved_percentage: f64,
    pub rejected_percentage: f64,
    pub request_changes_percentage: f64,
    pub average_review_minutes: u64,
    pub activity: Vec<ActivityRow>,
    pub decisions: Vec<DecisionShare>,
    pub top_categories: Vec<CategoryRow>,
}

impl StatsReport {
    pub fn from_bundle(period: StatsPeriod, bundle: &StatsBundle) -> Self {
        let activity = bundle
            .activity
            .iter()
            .map(|point| ActivityRow {
                date: point.date.clone(),
                approved: point.approved,
                rejected: point.rejected,
                request_changes: point.request_changes,
                total: point.approved + point.rejected + point.request_changes,
            })
            .collect();

        let counts = bundle.decisions;
        let total = counts.approved + counts.rejected + counts.request_changes;
        let decisions = [
            (ModerationAction::Approved, counts.approved),
            (ModerationAction::Rejected, counts.rejected),
            (ModerationAction::RequestChanges, counts.request_changes),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(action, count)| DecisionShare {
            action,
            count,
            share: count as f64 / total as f64,
        })
        .collect();

        let mut top_categories: Vec<CategoryRow> = bundle
            .categories
            .iter()
            .map(|(name, count)| CategoryRow {
                name: name.clone(),
                count: *count,
            })
            .collect();
        // Stable sort keeps the map's name order among equal counts.
        top_categories.sort_by(|a, b| b.count.cmp(&a.count));
        top_categories.truncate(TOP_CATEGORIES);

        let seconds = bundle.summary.average_review_time.max(0.0);
        Self {
            period,
            total_reviewed: bundle.summary.total_reviewed,
            approved_percentage: bundle.summary.approved_percentage,
            rejected_percentage: bundle.summary.rejected_percentage,
            request_changes_percentage: bundle.summary.request_changes_percentage,
            average_review_minutes: (seconds / 60.0).round() as u64,
            activity,
            decisions,
            top_categories,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.activity.is_empty() || !self.decisions.is_empty() || !self.top_categories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsState {
    Idle,
    Loading,
    Ready(StatsReport),
    Failed(FetchError),
}

pub struct StatsBoard {
    period: StatsPeriod,
    state: StatsState,
}

impl StatsBoard {
    pub fn new(period: StatsPeriod) -> Self {
        Self {
            period,
            state: StatsState::Idle,
        }
    }

    pub fn period(&self) -> StatsPeriod {
        self.period
    }

    pub fn state(&self) -> &StatsState {
        &self.state
    }

    pub fn report(&self) -> Option<&StatsReport> {
        match &self.state {
            StatsState::Ready(report) => Some(report),
            _ => None,
        }
    }

    pub fn select_period(&mut self, period: StatsPeriod) -> BackendCommand {
        self.period = period;
        self.refresh()
    }

    pub fn refresh(&mut self) -> BackendCommand {
        self.state = StatsState::Loading;
        BackendCommand::FetchStats(StatsTicket {
            period: self.period,
        })
    }

    pub fn on_settled(
        &mut self,
        ticket: StatsTicket,
        result: Result<StatsBundle, FetchError>,
    ) -> Settlement {
        if ticket.period != self.period || !matches!(self.state, StatsState::Loading) {
            debug!(period = ticket.period.as_str(), "discarding stats for superseded period");
            return Settlement::Discarded;
        }
        self.state = match result {
            Ok(bundle) => StatsState::Ready(StatsReport::from_bundle(ticket.period, &bundle)),
            Err(err) => {
                warn!(period = ticket.period.as_str(), error = %err, "stats fetch failed");
                StatsState::Failed(err)
            }
        };
        Settlement::Applied
    }
}

impl Default for StatsBoard {
    fn default() -> Self {
        Self::new(StatsPeriod::default())
    }
}

#[cfg(test)]
#[path = "tests/stats_tests.rs"]
mod tests;
