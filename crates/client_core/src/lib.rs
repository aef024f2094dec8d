//! Client-side state for the listing moderation tool: the query controller,
//! the listing feed, the per-item workflow, decision validation, the stats
//! board, and an HTTP transport for all of them.

pub mod backend;
pub mod commands;
pub mod error;
pub mod http;
pub mod item_workflow;
pub mod listing;
pub mod query_state;
pub mod session;
pub mod stats;
pub mod validation;

pub use backend::{DecisionGateway, ItemReader, ListingDataSource, ModerationBackend, StatsSource};
pub use commands::{BackendCommand, ModerationEvent, Settlement};
pub use error::{ClientBuildError, DecisionWriteError, FetchError, QueryError, WorkflowError};
pub use http::HttpModerationClient;
pub use item_workflow::{ItemState, ItemWorkflowController};
pub use listing::{FeedState, FeedView, ListingFeed};
pub use query_state::{FilterCriteria, FilterPatch, PriceRange, QueryStateController, SortSpec};
pub use session::{execute, ModerationSession};
pub use stats::{StatsBoard, StatsBundle, StatsReport, StatsState};
pub use validation::{DecisionForm, Reason, ValidationIssue};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod test_fixtures;
