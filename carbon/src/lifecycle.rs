//! Status transition tables for projects and issuances.
//!
//! ```text
//! draft ─> submitted ─> under_review ─┬─> approved ─> suspended
//!                            ^        └─> rejected        │
//!                            └────────────────────────────┘
//!
//! pending ─┬─> issued ─> retired
//!          └─> rejected
//! ```

use shamba_types::{IssuanceStatus, ProjectStatus};

use crate::CarbonError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectAction {
    /// Owner hands the draft in for review.
    Submit,
    StartReview,
    Approve,
    Reject,
    Suspend,
    /// Put a suspended project back under review.
    Reinstate,
}

impl ProjectAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::StartReview => "start review of",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Suspend => "suspend",
            Self::Reinstate => "reinstate",
        }
    }

    /// Only submission is an owner action; the rest belong to staff.
    pub fn requires_staff(&self) -> bool {
        !matches!(self, Self::Submit)
    }

    /// The status `self` leads to from `current`.
    pub fn apply(&self, current: ProjectStatus) -> Result<ProjectStatus, CarbonError> {
        use ProjectStatus::*;
        let next = match (self, current) {
            (Self::Submit, Draft) => Submitted,
            (Self::StartReview, Submitted) => UnderReview,
            (Self::Approve, UnderReview) => Approved,
            (Self::Reject, UnderReview) => Rejected,
            (Self::Suspend, Approved) => Suspended,
            (Self::Reinstate, Suspended) => UnderReview,
            _ => {
                return Err(CarbonError::InvalidProjectTransition {
                    action: self.as_str(),
                    status: current,
                })
            }
        };
        Ok(next)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssuanceAction {
    Issue,
    Reject,
    Retire,
}

impl IssuanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Reject => "reject",
            Self::Retire => "retire",
        }
    }

    pub fn apply(&self, current: IssuanceStatus) -> Result<IssuanceStatus, CarbonError> {
        use IssuanceStatus::*;
        match (self, current) {
            (Self::Issue, Pending) => Ok(Issued),
            (Self::Reject, Pending) => Ok(Rejected),
            (Self::Retire, Issued) => Ok(Retired),
            _ => Err(CarbonError::InvalidIssuanceTransition {
                action: self.as_str(),
                status: current,
            }),
        }
    }
}
