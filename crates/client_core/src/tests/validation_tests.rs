use super::*;

#[test]
fn approve_needs_no_fields() {
    assert!(can_confirm(DecisionKind::Approve, &DecisionForm::new()));
    assert_eq!(
        build_request(DecisionKind::Approve, &DecisionForm::new()),
        Ok(DecisionRequest::Approve)
    );
}

#[test]
fn confirm_disabled_without_reasons() {
    let form = DecisionForm::new().with_comment("test");
    assert_eq!(
        evaluate(DecisionKind::Reject, &form),
        Err(ValidationIssue::NoReasonSelected)
    );
    assert!(!can_confirm(DecisionKind::RequestChanges, &form));
}

#[test]
fn confirm_disabled_when_other_text_is_blank() {
    let form = DecisionForm::new()
        .with_reason(Reason::Other)
        .with_other_text("   ")
        .with_comment("test");
    assert_eq!(
        evaluate(DecisionKind::Reject, &form),
        Err(ValidationIssue::MissingOtherReason)
    );
}

#[test]
fn confirm_disabled_when_comment_is_empty() {
    let form = DecisionForm::new().with_reason(Reason::PhotoIssue);
    assert_eq!(
        evaluate(DecisionKind::RequestChanges, &form),
        Err(ValidationIssue::MissingComment)
    );
}

#[test]
fn confirm_enabled_for_photo_issue_with_comment() {
    let form = DecisionForm::new()
        .with_reason(Reason::PhotoIssue)
        .with_comment("test");
    assert!(can_confirm(DecisionKind::Reject, &form));

    let request = build_request(DecisionKind::Reject, &form).expect("valid form");
    assert_eq!(
        request,
        DecisionRequest::Reject(DecisionBody {
            reason: "photo_issue".to_string(),
            comment: "test".to_string(),
        })
    );
}

#[test]
fn reason_text_replaces_sentinel_with_free_text() {
    let form = DecisionForm::new()
        .with_reason(Reason::WrongCategory)
        .with_reason(Reason::Other)
        .with_reason(Reason::FraudSuspicion)
        .with_other_text("  duplicate listing ")
        .with_comment("see history");

    assert_eq!(
        form.reason_text(),
        "wrong_category, fraud_suspicion, duplicate listing"
    );
    let request = build_request(DecisionKind::RequestChanges, &form).expect("valid");
    assert_eq!(request.kind(), DecisionKind::RequestChanges);
    assert_eq!(
        request.body().map(|body| body.reason.as_str()),
        Some("wrong_category, fraud_suspicion, duplicate listing")
    );
}

#[test]
fn toggling_keeps_order_and_ignores_duplicates() {
    let mut form = DecisionForm::new();
    form.toggle(Reason::PhotoIssue, true);
    form.toggle(Reason::ProhibitedItem, true);
    form.toggle(Reason::PhotoIssue, true);
    assert_eq!(form.selected(), &[Reason::PhotoIssue, Reason::ProhibitedItem]);

    form.toggle(Reason::PhotoIssue, false);
    assert_eq!(form.selected(), &[Reason::ProhibitedItem]);

    form.set_comment("x");
    form.clear();
    assert_eq!(form, DecisionForm::new());
}

#[test]
fn invalid_form_never_builds_a_request() {
    let form = DecisionForm::new().with_comment("only a comment");
    assert_eq!(
        build_request(DecisionKind::Reject, &form),
        Err(ValidationIssue::NoReasonSelected)
    );
}

#[test]
fn labels_round_trip_through_catalog() {
    for reason in Reason::CATALOG {
        assert_eq!(Reason::from_label(reason.label()), Some(reason));
    }
    assert_eq!(Reason::from_label("PHOTO_ISSUE"), Some(Reason::PhotoIssue));
    assert_eq!(Reason::from_label("spam"), None);
}

#[test]
fn confirm_yields_request_only_when_valid() {
    let mut form = DecisionForm::new().with_reason(Reason::WrongCategory);
    assert_eq!(form.confirm(DecisionKind::Reject), None);

    form.set_comment("  move to Electronics ");
    let request = form.confirm(DecisionKind::Reject).expect("valid form");
    assert_eq!(
        request.body().map(|body| body.comment.as_str()),
        Some("move to Electronics")
    );
    assert_eq!(form.confirm(DecisionKind::Approve), Some(DecisionRequest::Approve));
}
