//! Verification coordinator: connects method selection, strategy execution,
//! acceptance policy and the parcel state transition into one workflow.
//!
//! ```text
//! unverified ─┐
//!             ├─> pending ─> verified
//! rejected  ──┘          └─> rejected
//! ```
//!
//! An attempt marks the parcel `pending` before the strategy runs. The
//! audit record and the final transition are committed together, so an
//! audit trail never claims a success the parcel does not show. An attempt
//! that errors (as opposed to a well-formed rejection) puts the parcel
//! back where it was, and so does a commit that fails.

use std::sync::Arc;

use shamba_store::{ParcelStore, StoreError, VerificationRequestStore};
use shamba_types::{
    LandParcel, ParcelId, RequestStatus, Requester, StatusTransition, Timestamp,
    VerificationMethod, VerificationOutcome, VerificationRequest, VerificationStatus,
};
use tracing::{error, info, warn};

use crate::{Evidence, StrategyKind, StrategySet, VerificationError, VerificationPolicy};

/// What a caller gets back from one attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationReport {
    pub request: VerificationRequest,
    pub outcome: VerificationOutcome,
    /// The parcel as stored after the attempt.
    pub parcel: LandParcel,
}

pub struct VerificationCoordinator<S: ?Sized> {
    store: Arc<S>,
    strategies: StrategySet,
    policy: VerificationPolicy,
}

impl<S> VerificationCoordinator<S>
where
    S: ParcelStore + VerificationRequestStore + ?Sized,
{
    pub fn new(store: Arc<S>, strategies: StrategySet, policy: VerificationPolicy) -> Self {
        Self {
            store,
            strategies,
            policy,
        }
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Run one verification attempt.
    ///
    /// Workflow misuse (unsupported method, unknown parcel, foreign parcel,
    /// already verified) is an error. A failed or rejected check is not: it
    /// comes back as a report with the outcome embedded.
    pub async fn request_verification(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
        method: VerificationMethod,
        evidence: &Evidence,
    ) -> Result<VerificationReport, VerificationError> {
        let kind = StrategyKind::try_from(method)?;

        let parcel = self.store.get_parcel(parcel_id).map_err(|e| match e {
            StoreError::NotFound(_) => VerificationError::ParcelNotFound(parcel_id),
            other => VerificationError::Store(other),
        })?;
        if !requester.may_act_for(parcel.farmer) {
            return Err(VerificationError::NotAuthorized(parcel_id));
        }
        if parcel.is_verified() {
            return Err(VerificationError::AlreadyVerified(parcel_id));
        }

        let request_id = self.store.next_request_id()?;
        let requested_at = Timestamp::now();
        let previous = self.store.begin_verification(parcel_id, requested_at)?;
        if previous == VerificationStatus::Verified {
            return Err(VerificationError::AlreadyVerified(parcel_id));
        }

        let mut outcome = self
            .strategies
            .verify(kind, &parcel, evidence, requested_at)
            .await;
        if kind == StrategyKind::Satellite {
            outcome = self.policy.apply_satellite_threshold(outcome);
        }

        let completed_at = Timestamp::now();
        let (status, transition) = if outcome.is_accepted() {
            (
                RequestStatus::Completed,
                StatusTransition::Verified {
                    method,
                    verifier: requester.user,
                    at: completed_at,
                },
            )
        } else if outcome.has_error() {
            (RequestStatus::Failed, StatusTransition::Restore(previous))
        } else {
            (RequestStatus::Failed, StatusTransition::Rejected)
        };

        let request = VerificationRequest {
            id: request_id,
            parcel: parcel_id,
            requested_by: requester.user,
            method,
            status,
            notes: outcome.to_notes(),
            requested_at,
            completed_at: Some(completed_at),
        };

        let parcel = match self.store.commit_verification(&request, transition) {
            Ok(parcel) => parcel,
            Err(e) => {
                warn!(
                    parcel_id = %parcel_id,
                    %method,
                    error = %e,
                    "verification commit failed, restoring previous status"
                );
                let restored = self
                    .store
                    .abandon_verification(parcel_id, previous, Timestamp::now());
                if let Err(undo) = restored {
                    error!(
                        parcel_id = %parcel_id,
                        previous = %previous,
                        error = %undo,
                        "could not restore status, parcel left pending"
                    );
                }
                return Err(e.into());
            }
        };

        if outcome.is_accepted() {
            info!(parcel_id = %parcel_id, %method, request_id = %request.id, "parcel verified");
        } else {
            warn!(
                parcel_id = %parcel_id,
                %method,
                request_id = %request.id,
                error = outcome.error.as_deref().unwrap_or(""),
                "verification attempt did not succeed"
            );
        }

        Ok(VerificationReport {
            request,
            outcome,
            parcel,
        })
    }

    /// The audit trail for a parcel, oldest first.
    pub fn requests_for_parcel(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
    ) -> Result<Vec<VerificationRequest>, VerificationError> {
        let parcel = self.store.get_parcel(parcel_id).map_err(|e| match e {
            StoreError::NotFound(_) => VerificationError::ParcelNotFound(parcel_id),
            other => VerificationError::Store(other),
        })?;
        if !requester.may_act_for(parcel.farmer) {
            return Err(VerificationError::NotAuthorized(parcel_id));
        }
        Ok(self.store.requests_for_parcel(parcel_id)?)
    }
}
