//! Carbon-credit record storage.

use shamba_types::{
    CarbonCreditIssuance, CarbonCreditProject, IssuanceId, PracticeVerification,
    PracticeVerificationId, ProjectId, SensorReading, VerificationEvidence,
};

use crate::{SequenceStore, StoreError};

pub trait CarbonStore: SequenceStore {
    fn put_project(&self, project: &CarbonCreditProject) -> Result<(), StoreError>;
    fn get_project(&self, id: ProjectId) -> Result<CarbonCreditProject, StoreError>;
    fn list_projects(&self) -> Result<Vec<CarbonCreditProject>, StoreError>;

    /// Insert a new issuance. Fails with [`StoreError::Duplicate`] if the
    /// batch number is already used.
    fn insert_issuance(&self, issuance: &CarbonCreditIssuance) -> Result<(), StoreError>;
    /// Overwrite an existing issuance; the batch number must not change.
    fn update_issuance(&self, issuance: &CarbonCreditIssuance) -> Result<(), StoreError>;
    fn get_issuance(&self, id: IssuanceId) -> Result<CarbonCreditIssuance, StoreError>;
    fn list_issuances(&self) -> Result<Vec<CarbonCreditIssuance>, StoreError>;

    fn put_practice_verification(&self, record: &PracticeVerification) -> Result<(), StoreError>;
    fn get_practice_verification(
        &self,
        id: PracticeVerificationId,
    ) -> Result<PracticeVerification, StoreError>;
    fn practice_verifications_for_project(
        &self,
        project: ProjectId,
    ) -> Result<Vec<PracticeVerification>, StoreError>;

    fn put_evidence(&self, evidence: &VerificationEvidence) -> Result<(), StoreError>;
    fn evidence_for_verification(
        &self,
        verification: PracticeVerificationId,
    ) -> Result<Vec<VerificationEvidence>, StoreError>;

    fn put_sensor_reading(&self, reading: &SensorReading) -> Result<(), StoreError>;
    fn list_sensor_readings(&self) -> Result<Vec<SensorReading>, StoreError>;
}
