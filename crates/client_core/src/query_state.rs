//! Draft vs. applied filter/sort/page state for the moderation queue.
//!
//! The draft is freely editable and never drives a fetch. The applied state
//! changes only through [`QueryStateController::apply`], [`reset`],
//! [`set_sort`] and [`set_page`]; each change republishes the effective
//! [`ListQuery`] on a watch channel, which only wakes subscribers when the
//! value actually differs.
//!
//! [`reset`]: QueryStateController::reset
//! [`set_sort`]: QueryStateController::set_sort
//! [`set_page`]: QueryStateController::set_page

use std::collections::BTreeSet;

use shared::{
    domain::{CategoryId, ListingStatus},
    protocol::{ListQuery, SortDirection, SortField},
};
use tokio::sync::watch;
use tracing::debug;

use crate::error::QueryError;

pub const PAGE_SIZE: u32 = 10;
pub const PRICE_CEILING: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceRange {
    min: u32,
    max: u32,
}

impl PriceRange {
    pub fn new(min: u32, max: u32) -> Result<Self, QueryError> {
        if min > max || max > PRICE_CEILING {
            return Err(QueryError::InvalidPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub const fn full() -> Self {
        Self {
            min: 0,
            max: PRICE_CEILING,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::full()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub category_id: Option<CategoryId>,
    pub status: BTreeSet<ListingStatus>,
    pub price: PriceRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Partial draft edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub status: Option<BTreeSet<ListingStatus>>,
    pub price: Option<PriceRange>,
}

impl FilterPatch {
    /// Builds a patch from `key=value` style input. Only the four filter keys
    /// are accepted: `search`, `categoryId`, `status` (comma separated) and
    /// `price` (`min,max`). An empty `categoryId` clears the category.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut patch = FilterPatch::default();
        for (key, value) in pairs {
            match key.trim() {
                "search" => patch.search = Some(value.to_string()),
                "categoryId" => {
                    let value = value.trim();
                    patch.category_id = if value.is_empty() {
                        Some(None)
                    } else {
                        let parsed = value
                            .parse::<i64>()
                            .ok()
                            .filter(|id| *id > 0)
                            .ok_or_else(|| QueryError::InvalidFilterValue {
                                key: "categoryId",
                                value: value.to_string(),
                            })?;
                        Some(Some(CategoryId(parsed)))
                    };
                }
                "status" => {
                    let mut statuses = BTreeSet::new();
                    for raw in value.split(',').filter(|raw| !raw.trim().is_empty()) {
                        let status = ListingStatus::from_label(raw).ok_or_else(|| {
                            QueryError::InvalidFilterValue {
                                key: "status",
                                value: raw.trim().to_string(),
                            }
                        })?;
                        statuses.insert(status);
                    }
                    patch.status = Some(statuses);
                }
                "price" => {
                    let invalid = || QueryError::InvalidFilterValue {
                        key: "price",
                        value: value.to_string(),
                    };
                    let (min, max) = value.split_once(',').ok_or_else(invalid)?;
                    let min = min.trim().parse::<u32>().map_err(|_| invalid())?;
                    let max = max.trim().parse::<u32>().map_err(|_| invalid())?;
                    patch.price = Some(PriceRange::new(min, max)?);
                }
                other => return Err(QueryError::UnknownFilterKey(other.to_string())),
            }
        }
        Ok(patch)
    }

    fn merge_into(self, criteria: &mut FilterCriteria) {
        if let Some(search) = self.search {
            criteria.search = search;
        }
        if let Some(category_id) = self.category_id {
            criteria.category_id = category_id;
        }
        if let Some(status) = self.status {
            criteria.status = status;
        }
        if let Some(price) = self.price {
            criteria.price = price;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AppliedState {
    filters: FilterCriteria,
    sort: SortSpec,
    page: u32,
}

impl Default for AppliedState {
    fn default() -> Self {
        Self {
            filters: FilterCriteria::default(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl AppliedState {
    fn to_query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            limit: PAGE_SIZE,
            search: self.filters.search.clone(),
            category_id: self.filters.category_id,
            status: self.filters.status.iter().copied().collect(),
            min_price: self.filters.price.min(),
            max_price: self.filters.price.max(),
            sort_by: self.sort.field,
            sort_order: self.sort.direction,
        }
    }
}

pub struct QueryStateController {
    draft: FilterCriteria,
    applied: AppliedState,
    total_items: Option<u64>,
    notifier: watch::Sender<ListQuery>,
}

impl Default for QueryStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStateController {
    pub fn new() -> Self {
        let applied = AppliedState::default();
        let (notifier, _) = watch::channel(applied.to_query());
        Self {
            draft: FilterCriteria::default(),
            applied,
            total_items: None,
            notifier,
        }
    }

    pub fn draft(&self) -> &FilterCriteria {
        &self.draft
    }

    pub fn applied_filters(&self) -> &FilterCriteria {
        &self.applied.filters
    }

    pub fn sort(&self) -> SortSpec {
        self.applied.sort
    }

    pub fn page(&self) -> u32 {
        self.applied.page
    }

    pub fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_items
            .map(|total| total.div_ceil(u64::from(PAGE_SIZE)) as u32)
    }

    /// True while the draft holds edits that `apply` has not committed.
    pub fn is_draft_dirty(&self) -> bool {
        self.draft != self.applied.filters
    }

    pub fn effective_query(&self) -> ListQuery {
        self.applied.to_query()
    }

    /// Receiver woken once per distinct effective query value.
    pub fn subscribe(&self) -> watch::Receiver<ListQuery> {
        self.notifier.subscribe()
    }

    pub fn edit_draft(&mut self, patch: FilterPatch) {
        patch.merge_into(&mut self.draft);
    }

    pub fn apply(&mut self) {
        self.applied.filters = self.draft.clone();
        self.applied.page = 1;
        self.publish();
    }

    pub fn reset(&mut self) {
        self.draft = FilterCriteria::default();
        self.applied.filters = FilterCriteria::default();
        self.applied.page = 1;
        self.publish();
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.applied.sort = SortSpec { field, direction };
        self.applied.page = 1;
        self.publish();
    }

    /// Moves to page `page`. Pages past the known end are not clamped.
    pub fn set_page(&mut self, page: u32) -> Result<(), QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }
        if let Some(total_pages) = self.total_pages() {
            if page > total_pages {
                debug!(page, total_pages, "page requested past the last known page");
            }
        }
        self.applied.page = page;
        self.publish();
        Ok(())
    }

    /// Records the authoritative total from the last successful list fetch.
    pub fn set_total_items(&mut self, total_items: u64) {
        self.total_items = Some(total_items);
    }

    fn publish(&self) {
        let next = self.applied.to_query();
        self.notifier.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/query_state_tests.rs"]
mod tests;
