//! Nullable store: thread-safe in-memory storage for testing.
//!
//! Multi-record operations run against a staged copy of the state that only
//! replaces the live state once every write succeeded. Injected failures
//! therefore roll back the whole operation, exactly as a dropped LMDB write
//! transaction would.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use shamba_store::{
    CarbonStore, FarmerStore, LandTokenStore, ParcelStore, Sequence, SequenceStore, StoreError,
    TokenSlot, VerificationRequestStore,
};
use shamba_types::{
    CarbonCreditIssuance, CarbonCreditProject, FarmerId, FarmerProfile, IssuanceId, LandParcel,
    LandToken, LedgerAccountRecord, ParcelId, PracticeVerification, PracticeVerificationId,
    ProjectId, SensorReading, StatusTransition, Timestamp, VerificationEvidence,
    VerificationRequest, VerificationStatus,
};

#[derive(Clone, Default)]
struct State {
    sequences: HashMap<Sequence, u64>,
    parcels: BTreeMap<u64, LandParcel>,
    requests: BTreeMap<(u64, u64), VerificationRequest>,
    tokens: HashMap<u64, TokenSlot>,
    farmers: BTreeMap<u64, FarmerProfile>,
    emails: HashMap<String, u64>,
    accounts: HashMap<u64, LedgerAccountRecord>,
    projects: BTreeMap<u64, CarbonCreditProject>,
    issuances: BTreeMap<u64, CarbonCreditIssuance>,
    batches: HashMap<String, u64>,
    practice: BTreeMap<u64, PracticeVerification>,
    evidence: BTreeMap<(u64, u64), VerificationEvidence>,
    sensors: BTreeMap<u64, SensorReading>,
}

#[derive(Default)]
struct FailPoints {
    verification_commit: bool,
    token_completions: usize,
}

/// An in-memory implementation of every `shamba-store` trait.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
    fail: Mutex<FailPoints>,
    commits: Mutex<usize>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next verification commit fail with a backend error once
    /// its audit record has been staged but before the parcel is written.
    pub fn fail_next_verification_commit(&self) {
        self.fail.lock().unwrap().verification_commit = true;
    }

    /// Make the next `count` token completions fail with a backend error.
    pub fn fail_token_completions(&self, count: usize) {
        self.fail.lock().unwrap().token_completions = count;
    }

    /// Number of operations that committed.
    pub fn commit_count(&self) -> usize {
        *self.commits.lock().unwrap()
    }

    /// Run `f` against a staged copy; publish it only if `f` succeeds.
    fn transact<T>(
        &self,
        f: impl FnOnce(&mut State, &mut Staging<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut live = self.state.lock().unwrap();
        let mut staged = live.clone();
        let mut fail = self.fail.lock().unwrap();
        let result = f(&mut staged, &mut Staging { fail: &mut *fail })?;
        *live = staged;
        *self.commits.lock().unwrap() += 1;
        Ok(result)
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

/// Access to the fail points from inside a staged operation.
struct Staging<'a> {
    fail: &'a mut FailPoints,
}

impl Staging<'_> {
    fn check_verification_commit(&mut self) -> Result<(), StoreError> {
        if std::mem::take(&mut self.fail.verification_commit) {
            return Err(StoreError::Backend("injected verification commit failure".into()));
        }
        Ok(())
    }

    fn check_token_completion(&mut self) -> Result<(), StoreError> {
        if self.fail.token_completions > 0 {
            self.fail.token_completions -= 1;
            return Err(StoreError::Backend("injected token completion failure".into()));
        }
        Ok(())
    }
}

impl SequenceStore for NullStore {
    fn next_id(&self, seq: Sequence) -> Result<u64, StoreError> {
        self.transact(|state, _| {
            let counter = state.sequences.entry(seq).or_insert(0);
            *counter += 1;
            Ok(*counter)
        })
    }
}

impl ParcelStore for NullStore {
    fn put_parcel(&self, parcel: &LandParcel) -> Result<(), StoreError> {
        self.transact(|state, _| {
            state.parcels.insert(parcel.id.get(), parcel.clone());
            Ok(())
        })
    }

    fn get_parcel(&self, id: ParcelId) -> Result<LandParcel, StoreError> {
        self.read(|s| s.parcels.get(&id.get()).cloned())
            .ok_or_else(|| StoreError::NotFound(format!("parcel {id}")))
    }

    fn parcels_for_farmer(&self, farmer: FarmerId) -> Result<Vec<LandParcel>, StoreError> {
        Ok(self.read(|s| {
            s.parcels
                .values()
                .filter(|p| p.farmer == farmer)
                .cloned()
                .collect()
        }))
    }
}

impl VerificationRequestStore for NullStore {
    fn begin_verification(
        &self,
        parcel_id: ParcelId,
        now: Timestamp,
    ) -> Result<VerificationStatus, StoreError> {
        self.transact(|state, _| {
            let parcel = state
                .parcels
                .get_mut(&parcel_id.get())
                .ok_or_else(|| StoreError::NotFound(format!("parcel {parcel_id}")))?;
            let previous = parcel.verification_status;
            StatusTransition::Pending.apply(parcel, now);
            Ok(previous)
        })
    }

    fn commit_verification(
        &self,
        record: &VerificationRequest,
        transition: StatusTransition,
    ) -> Result<LandParcel, StoreError> {
        self.transact(|state, staging| {
            let mut parcel = state
                .parcels
                .get(&record.parcel.get())
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("parcel {}", record.parcel)))?;
            let key = (record.parcel.get(), record.id.get());
            if state.requests.contains_key(&key) {
                return Err(StoreError::Duplicate(format!(
                    "verification request {}",
                    record.id
                )));
            }
            state.requests.insert(key, record.clone());

            staging.check_verification_commit()?;
            let at = record.completed_at.unwrap_or(record.requested_at);
            if transition.apply(&mut parcel, at) {
                state.parcels.insert(parcel.id.get(), parcel.clone());
            }
            Ok(parcel)
        })
    }

    fn abandon_verification(
        &self,
        parcel_id: ParcelId,
        previous: VerificationStatus,
        now: Timestamp,
    ) -> Result<LandParcel, StoreError> {
        self.transact(|state, _| {
            let parcel = state
                .parcels
                .get_mut(&parcel_id.get())
                .ok_or_else(|| StoreError::NotFound(format!("parcel {parcel_id}")))?;
            StatusTransition::Restore(previous).apply(parcel, now);
            Ok(parcel.clone())
        })
    }

    fn requests_for_parcel(
        &self,
        parcel: ParcelId,
    ) -> Result<Vec<VerificationRequest>, StoreError> {
        Ok(self.read(|s| {
            s.requests
                .range((parcel.get(), 0)..=(parcel.get(), u64::MAX))
                .map(|(_, r)| r.clone())
                .collect()
        }))
    }
}

impl LandTokenStore for NullStore {
    fn reserve_token(&self, parcel: ParcelId) -> Result<(), StoreError> {
        self.transact(|state, _| {
            if state.tokens.contains_key(&parcel.get()) {
                return Err(StoreError::Duplicate(format!("land token for parcel {parcel}")));
            }
            state.tokens.insert(parcel.get(), TokenSlot::Reserved);
            Ok(())
        })
    }

    fn complete_token(&self, token: &LandToken) -> Result<(), StoreError> {
        self.transact(|state, staging| match state.tokens.get(&token.parcel.get()) {
            Some(TokenSlot::Reserved) => {
                staging.check_token_completion()?;
                state
                    .tokens
                    .insert(token.parcel.get(), TokenSlot::Minted(token.clone()));
                Ok(())
            }
            Some(TokenSlot::Minted(_)) => Err(StoreError::Duplicate(format!(
                "land token for parcel {}",
                token.parcel
            ))),
            None => Err(StoreError::NotFound(format!(
                "token reservation for parcel {}",
                token.parcel
            ))),
        })
    }

    fn release_token_reservation(&self, parcel: ParcelId) -> Result<(), StoreError> {
        self.transact(|state, _| {
            if let Some(TokenSlot::Reserved) = state.tokens.get(&parcel.get()) {
                state.tokens.remove(&parcel.get());
            }
            Ok(())
        })
    }

    fn get_land_token(&self, parcel: ParcelId) -> Result<Option<LandToken>, StoreError> {
        Ok(self.read(|s| match s.tokens.get(&parcel.get()) {
            Some(TokenSlot::Minted(token)) => Some(token.clone()),
            _ => None,
        }))
    }
}

impl FarmerStore for NullStore {
    fn put_farmer_with_account(
        &self,
        farmer: &FarmerProfile,
        account: &LedgerAccountRecord,
    ) -> Result<(), StoreError> {
        self.transact(|state, _| {
            let email = email_key(&farmer.email);
            if state.emails.contains_key(&email) {
                return Err(StoreError::Duplicate(format!("farmer email {}", farmer.email)));
            }
            if state.farmers.contains_key(&farmer.id.get()) {
                return Err(StoreError::Duplicate(format!("farmer {}", farmer.id)));
            }
            state.farmers.insert(farmer.id.get(), farmer.clone());
            state.emails.insert(email, farmer.id.get());
            state.accounts.insert(account.farmer.get(), account.clone());
            Ok(())
        })
    }

    fn get_farmer(&self, id: FarmerId) -> Result<FarmerProfile, StoreError> {
        self.read(|s| s.farmers.get(&id.get()).cloned())
            .ok_or_else(|| StoreError::NotFound(format!("farmer {id}")))
    }

    fn find_farmer_by_email(&self, email: &str) -> Result<Option<FarmerProfile>, StoreError> {
        Ok(self.read(|s| {
            s.emails
                .get(&email_key(email))
                .and_then(|id| s.farmers.get(id))
                .cloned()
        }))
    }

    fn get_ledger_account(
        &self,
        farmer: FarmerId,
    ) -> Result<Option<LedgerAccountRecord>, StoreError> {
        Ok(self.read(|s| s.accounts.get(&farmer.get()).cloned()))
    }

    fn put_ledger_account(&self, account: &LedgerAccountRecord) -> Result<(), StoreError> {
        self.transact(|state, _| {
            if !state.farmers.contains_key(&account.farmer.get()) {
                return Err(StoreError::NotFound(format!("farmer {}", account.farmer)));
            }
            state.accounts.insert(account.farmer.get(), account.clone());
            Ok(())
        })
    }
}

impl CarbonStore for NullStore {
    fn put_project(&self, project: &CarbonCreditProject) -> Result<(), StoreError> {
        self.transact(|state, _| {
            state.projects.insert(project.id.get(), project.clone());
            Ok(())
        })
    }

    fn get_project(&self, id: ProjectId) -> Result<CarbonCreditProject, StoreError> {
        self.read(|s| s.projects.get(&id.get()).cloned())
            .ok_or_else(|| StoreError::NotFound(format!("carbon project {id}")))
    }

    fn list_projects(&self) -> Result<Vec<CarbonCreditProject>, StoreError> {
        Ok(self.read(|s| s.projects.values().cloned().collect()))
    }

    fn insert_issuance(&self, issuance: &CarbonCreditIssuance) -> Result<(), StoreError> {
        self.transact(|state, _| {
            if state.batches.contains_key(&issuance.batch_number) {
                return Err(StoreError::Duplicate(format!(
                    "issuance batch number {}",
                    issuance.batch_number
                )));
            }
            if state.issuances.contains_key(&issuance.id.get()) {
                return Err(StoreError::Duplicate(format!("issuance {}", issuance.id)));
            }
            state
                .batches
                .insert(issuance.batch_number.clone(), issuance.id.get());
            state.issuances.insert(issuance.id.get(), issuance.clone());
            Ok(())
        })
    }

    fn update_issuance(&self, issuance: &CarbonCreditIssuance) -> Result<(), StoreError> {
        self.transact(|state, _| {
            if state.batches.get(&issuance.batch_number) != Some(&issuance.id.get()) {
                return Err(StoreError::NotFound(format!(
                    "issuance {} with batch number {}",
                    issuance.id, issuance.batch_number
                )));
            }
            state.issuances.insert(issuance.id.get(), issuance.clone());
            Ok(())
        })
    }

    fn get_issuance(&self, id: IssuanceId) -> Result<CarbonCreditIssuance, StoreError> {
        self.read(|s| s.issuances.get(&id.get()).cloned())
            .ok_or_else(|| StoreError::NotFound(format!("issuance {id}")))
    }

    fn list_issuances(&self) -> Result<Vec<CarbonCreditIssuance>, StoreError> {
        Ok(self.read(|s| s.issuances.values().cloned().collect()))
    }

    fn put_practice_verification(&self, record: &PracticeVerification) -> Result<(), StoreError> {
        self.transact(|state, _| {
            state.practice.insert(record.id.get(), record.clone());
            Ok(())
        })
    }

    fn get_practice_verification(
        &self,
        id: PracticeVerificationId,
    ) -> Result<PracticeVerification, StoreError> {
        self.read(|s| s.practice.get(&id.get()).cloned())
            .ok_or_else(|| StoreError::NotFound(format!("practice verification {id}")))
    }

    fn practice_verifications_for_project(
        &self,
        project: ProjectId,
    ) -> Result<Vec<PracticeVerification>, StoreError> {
        Ok(self.read(|s| {
            s.practice
                .values()
                .filter(|p| p.project == project)
                .cloned()
                .collect()
        }))
    }

    fn put_evidence(&self, evidence: &VerificationEvidence) -> Result<(), StoreError> {
        self.transact(|state, _| {
            state.evidence.insert(
                (evidence.verification.get(), evidence.id.get()),
                evidence.clone(),
            );
            Ok(())
        })
    }

    fn evidence_for_verification(
        &self,
        verification: PracticeVerificationId,
    ) -> Result<Vec<VerificationEvidence>, StoreError> {
        Ok(self.read(|s| {
            s.evidence
                .range((verification.get(), 0)..=(verification.get(), u64::MAX))
                .map(|(_, e)| e.clone())
                .collect()
        }))
    }

    fn put_sensor_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        self.transact(|state, _| {
            state.sensors.insert(reading.id.get(), reading.clone());
            Ok(())
        })
    }

    fn list_sensor_readings(&self) -> Result<Vec<SensorReading>, StoreError> {
        Ok(self.read(|s| s.sensors.values().cloned().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_types::{Hectares, RequestId, RequestStatus, UserId, VerificationMethod};

    fn parcel(id: u64) -> LandParcel {
        LandParcel {
            id: ParcelId::new(id),
            farmer: FarmerId::new(1),
            title_deed_number: None,
            total_area: Hectares::from_centi(100),
            gps_coordinates: "[[0,0],[0,1],[1,1]]".into(),
            address: String::new(),
            country: "Kenya".into(),
            region: "Embu".into(),
            verification_status: VerificationStatus::Unverified,
            verification_method: None,
            verified_by: None,
            verification_date: None,
            document_hash: None,
            created_at: Timestamp::EPOCH,
            updated_at: Timestamp::EPOCH,
        }
    }

    #[test]
    fn injected_failure_rolls_back_audit_record() {
        let store = NullStore::new();
        store.put_parcel(&parcel(1)).unwrap();
        store.fail_next_verification_commit();

        let record = VerificationRequest {
            id: RequestId::new(1),
            parcel: ParcelId::new(1),
            requested_by: UserId::new(1),
            method: VerificationMethod::Gps,
            status: RequestStatus::Completed,
            notes: "{}".into(),
            requested_at: Timestamp::new(10),
            completed_at: Some(Timestamp::new(11)),
        };
        let transition = StatusTransition::Verified {
            method: VerificationMethod::Gps,
            verifier: UserId::new(1),
            at: Timestamp::new(11),
        };
        assert!(store.commit_verification(&record, transition).is_err());
        assert!(store.requests_for_parcel(ParcelId::new(1)).unwrap().is_empty());
        assert!(!store.get_parcel(ParcelId::new(1)).unwrap().is_verified());

        // The fail point is one-shot.
        store.commit_verification(&record, transition).unwrap();
        assert!(store.get_parcel(ParcelId::new(1)).unwrap().is_verified());
    }

    #[test]
    fn sequences_start_at_one() {
        let store = NullStore::new();
        assert_eq!(store.next_parcel_id().unwrap(), ParcelId::new(1));
        assert_eq!(store.next_parcel_id().unwrap(), ParcelId::new(2));
        assert_eq!(store.next_farmer_id().unwrap(), FarmerId::new(1));
    }
}
