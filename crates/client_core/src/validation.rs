//! Gatekeeping for reject / request-changes submissions.
//!
//! A confirm action is enabled only while [`evaluate`] returns `Ok`. Invalid
//! forms never produce a [`DecisionRequest`], so nothing downstream has to
//! report validation failures after the fact.

use shared::protocol::{DecisionBody, DecisionKind, DecisionRequest};
use thiserror::Error;

/// Fixed reason catalog. `Other` is the sentinel paired with free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    ProhibitedItem,
    WrongCategory,
    IncorrectDescription,
    PhotoIssue,
    FraudSuspicion,
    Other,
}

impl Reason {
    pub const CATALOG: [Reason; 6] = [
        Reason::ProhibitedItem,
        Reason::WrongCategory,
        Reason::IncorrectDescription,
        Reason::PhotoIssue,
        Reason::FraudSuspicion,
        Reason::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Reason::ProhibitedItem => "prohibited_item",
            Reason::WrongCategory => "wrong_category",
            Reason::IncorrectDescription => "incorrect_description",
            Reason::PhotoIssue => "photo_issue",
            Reason::FraudSuspicion => "fraud_suspicion",
            Reason::Other => "other",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::CATALOG
            .into_iter()
            .find(|reason| reason.label().eq_ignore_ascii_case(raw))
    }

    pub const fn is_sentinel(self) -> bool {
        matches!(self, Reason::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("select at least one reason")]
    NoReasonSelected,
    #[error("describe the 'other' reason")]
    MissingOtherReason,
    #[error("a comment is required")]
    MissingComment,
}

/// Dialog state for a reasoned decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionForm {
    selected: Vec<Reason>,
    other_text: String,
    comment: String,
}

impl DecisionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks or unchecks a reason. Selection order is kept; duplicates are ignored.
    pub fn toggle(&mut self, reason: Reason, checked: bool) {
        if checked {
            if !self.selected.contains(&reason) {
                self.selected.push(reason);
            }
        } else {
            self.selected.retain(|selected| *selected != reason);
        }
    }

    pub fn with_reason(mut self, reason: Reason) -> Self {
        self.toggle(reason, true);
        self
    }

    pub fn with_other_text(mut self, text: impl Into<String>) -> Self {
        self.other_text = text.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn set_other_text(&mut self, text: impl Into<String>) {
        self.other_text = text.into();
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn selected(&self) -> &[Reason] {
        &self.selected
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.other_text.clear();
        self.comment.clear();
    }

    pub fn issue(&self) -> Option<ValidationIssue> {
        if self.selected.is_empty() {
            return Some(ValidationIssue::NoReasonSelected);
        }
        if self.selected.contains(&Reason::Other) && self.other_text.trim().is_empty() {
            return Some(ValidationIssue::MissingOtherReason);
        }
        if self.comment.trim().is_empty() {
            return Some(ValidationIssue::MissingComment);
        }
        None
    }

    pub fn can_confirm(&self) -> bool {
        self.issue().is_none()
    }

    /// Canonical labels joined by ", ", the sentinel replaced by its free text.
    pub fn reason_text(&self) -> String {
        let mut parts: Vec<&str> = self
            .selected
            .iter()
            .filter(|reason| !reason.is_sentinel())
            .map(|reason| reason.label())
            .collect();
        let other = self.other_text.trim();
        if self.selected.contains(&Reason::Other) && !other.is_empty() {
            parts.push(other);
        }
        parts.join(", ")
    }

    /// The request this form confirms to, or `None` while confirm is disabled.
    pub fn confirm(&self, kind: DecisionKind) -> Option<DecisionRequest> {
        build_request(kind, self).ok()
    }
}

/// Whether a decision of `kind` may be confirmed with `form`.
pub fn evaluate(kind: DecisionKind, form: &DecisionForm) -> Result<(), ValidationIssue> {
    match kind {
        DecisionKind::Approve => Ok(()),
        DecisionKind::Reject | DecisionKind::RequestChanges => match form.issue() {
            Some(issue) => Err(issue),
            None => Ok(()),
        },
    }
}

pub fn can_confirm(kind: DecisionKind, form: &DecisionForm) -> bool {
    evaluate(kind, form).is_ok()
}

/// Builds the write request once the form passes [`evaluate`].
pub fn build_request(
    kind: DecisionKind,
    form: &DecisionForm,
) -> Result<DecisionRequest, ValidationIssue> {
    evaluate(kind, form)?;
    let body = || DecisionBody {
        reason: form.reason_text(),
        comment: form.comment.trim().to_string(),
    };
    Ok(match kind {
        DecisionKind::Approve => DecisionRequest::Approve,
        DecisionKind::Reject => DecisionRequest::Reject(body()),
        DecisionKind::RequestChanges => DecisionRequest::RequestChanges(body()),
    })
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
