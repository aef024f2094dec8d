use super::*;
use crate::test_fixtures::{page, summary};
use shared::protocol::{SortDirection, SortField};

fn fetch_ticket(command: Option<BackendCommand>) -> PageTicket {
    match command {
        Some(BackendCommand::FetchPage(ticket)) => ticket,
        other => panic!("expected page fetch, got {other:?}"),
    }
}

#[test]
fn first_poll_fetches_current_query_and_then_waits_for_changes() {
    let controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    assert_eq!(feed.view(), FeedView::Loading);

    let ticket = fetch_ticket(feed.poll());
    assert_eq!(ticket.query, controller.effective_query());
    assert!(feed.is_loading());
    assert!(feed.poll().is_none(), "no change, no second fetch");
}

#[test]
fn draft_edits_do_not_trigger_fetches() {
    let mut controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    let _ = feed.poll();

    controller.edit_draft(crate::query_state::FilterPatch {
        search: Some("bike".to_string()),
        ..Default::default()
    });
    assert!(feed.poll().is_none());

    controller.apply();
    let ticket = fetch_ticket(feed.poll());
    assert_eq!(ticket.query.search, "bike");
}

#[test]
fn settled_page_updates_items_and_total() {
    let mut controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    let ticket = fetch_ticket(feed.poll());

    let outcome = feed.on_settled(ticket, Ok(page(&[1, 2, 3], 23)), &mut controller);

    assert_eq!(outcome, Settlement::Applied);
    assert_eq!(controller.total_items(), Some(23));
    assert_eq!(controller.total_pages(), Some(3));
    match feed.view() {
        FeedView::Items(items) => assert_eq!(items.len(), 3),
        other => panic!("expected items, got {other:?}"),
    }
}

#[test]
fn late_response_for_superseded_query_is_discarded() {
    let mut controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    let first = fetch_ticket(feed.poll());

    controller.set_sort(SortField::Price, SortDirection::Asc);
    let second = fetch_ticket(feed.poll());
    assert_ne!(first.query, second.query);

    assert_eq!(
        feed.on_settled(second, Ok(page(&[7, 8], 2)), &mut controller),
        Settlement::Applied
    );
    assert_eq!(
        feed.on_settled(first, Ok(page(&[1, 2, 3, 4], 40)), &mut controller),
        Settlement::Discarded
    );

    match feed.view() {
        FeedView::Items(items) => {
            assert_eq!(items, &[summary(7), summary(8)]);
        }
        other => panic!("expected second result set, got {other:?}"),
    }
    assert_eq!(controller.total_items(), Some(2));
}

#[test]
fn response_is_discarded_when_query_changed_before_poll() {
    let mut controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    let ticket = fetch_ticket(feed.poll());

    controller.set_page(2).expect("valid page");
    assert_eq!(
        feed.on_settled(ticket, Ok(page(&[1], 1)), &mut controller),
        Settlement::Discarded
    );
    assert!(feed.is_loading());
}

#[test]
fn zero_total_renders_empty_not_loading_or_error() {
    let mut controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    let ticket = fetch_ticket(feed.poll());

    feed.on_settled(ticket, Ok(page(&[], 0)), &mut controller);

    assert_eq!(feed.view(), FeedView::Empty);
    assert!(!feed.is_loading());
    assert_eq!(controller.total_items(), Some(0));
}

#[test]
fn failure_is_reported_and_refresh_reissues_same_query() {
    let mut controller = QueryStateController::new();
    let mut feed = ListingFeed::new(&controller);
    let ticket = fetch_ticket(feed.poll());
    let error = FetchError::Server {
        status: 500,
        message: "boom".to_string(),
    };

    feed.on_settled(ticket.clone(), Err(error.clone()), &mut controller);
    assert_eq!(feed.view(), FeedView::Failed(&error));
    assert_eq!(controller.total_items(), None);

    let retry = match feed.refresh() {
        BackendCommand::FetchPage(retry) => retry,
        other => panic!("expected page fetch, got {other:?}"),
    };
    assert_eq!(retry, ticket);
    assert!(feed.is_loading());
}
