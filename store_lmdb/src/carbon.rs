//! LMDB implementation of CarbonStore.

use shamba_store::{CarbonStore, StoreError};
use shamba_types::{
    CarbonCreditIssuance, CarbonCreditProject, IssuanceId, PracticeVerification,
    PracticeVerificationId, ProjectId, SensorReading, VerificationEvidence,
};

use crate::codec::{get_record, pair_key, read_u64, scan_all, scan_prefix_keys, scan_prefix_values};
use crate::{LmdbEnvironment, LmdbError};

impl CarbonStore for LmdbEnvironment {
    fn put_project(&self, project: &CarbonCreditProject) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put(self.projects_db, &project.id.to_key(), project)?;
        batch.commit()?;
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> Result<CarbonCreditProject, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        get_record(&self.projects_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("carbon project {id}")))
    }

    fn list_projects(&self) -> Result<Vec<CarbonCreditProject>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(scan_all(&self.projects_db, &rtxn)?)
    }

    fn insert_issuance(&self, issuance: &CarbonCreditIssuance) -> Result<(), StoreError> {
        let batch_key = issuance.batch_number.as_bytes();
        let mut batch = self.write_batch()?;
        if batch.contains(self.issuance_batches_db, batch_key)? {
            return Err(StoreError::Duplicate(format!(
                "issuance batch number {}",
                issuance.batch_number
            )));
        }
        if batch.contains(self.issuances_db, &issuance.id.to_key())? {
            return Err(StoreError::Duplicate(format!("issuance {}", issuance.id)));
        }
        batch.put(self.issuances_db, &issuance.id.to_key(), issuance)?;
        batch.put_raw(self.issuance_batches_db, batch_key, &issuance.id.to_key())?;
        batch.commit()?;
        Ok(())
    }

    fn update_issuance(&self, issuance: &CarbonCreditIssuance) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        let owner = batch.get_u64(self.issuance_batches_db, issuance.batch_number.as_bytes())?;
        if owner != Some(issuance.id.get()) {
            return Err(StoreError::NotFound(format!(
                "issuance {} with batch number {}",
                issuance.id, issuance.batch_number
            )));
        }
        batch.put(self.issuances_db, &issuance.id.to_key(), issuance)?;
        batch.commit()?;
        Ok(())
    }

    fn get_issuance(&self, id: IssuanceId) -> Result<CarbonCreditIssuance, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        get_record(&self.issuances_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("issuance {id}")))
    }

    fn list_issuances(&self) -> Result<Vec<CarbonCreditIssuance>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(scan_all(&self.issuances_db, &rtxn)?)
    }

    fn put_practice_verification(&self, record: &PracticeVerification) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put(self.practice_db, &record.id.to_key(), record)?;
        batch.put_raw(
            self.project_practice_db,
            &pair_key(record.project.to_key(), record.id.to_key()),
            &[],
        )?;
        batch.commit()?;
        Ok(())
    }

    fn get_practice_verification(
        &self,
        id: PracticeVerificationId,
    ) -> Result<PracticeVerification, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        get_record(&self.practice_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("practice verification {id}")))
    }

    fn practice_verifications_for_project(
        &self,
        project: ProjectId,
    ) -> Result<Vec<PracticeVerification>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for id in scan_prefix_keys(&self.project_practice_db, &rtxn, project.to_key())? {
            let record = get_record(&self.practice_db, &rtxn, &id)?.ok_or_else(|| {
                StoreError::Corruption(format!(
                    "project {project} indexes missing practice verification {}",
                    read_u64(&id).unwrap_or_default()
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn put_evidence(&self, evidence: &VerificationEvidence) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put(
            self.evidence_db,
            &pair_key(evidence.verification.to_key(), evidence.id.to_key()),
            evidence,
        )?;
        batch.commit()?;
        Ok(())
    }

    fn evidence_for_verification(
        &self,
        verification: PracticeVerificationId,
    ) -> Result<Vec<VerificationEvidence>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(scan_prefix_values(&self.evidence_db, &rtxn, verification.to_key())?)
    }

    fn put_sensor_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put(self.sensor_db, &reading.id.to_key(), reading)?;
        batch.commit()?;
        Ok(())
    }

    fn list_sensor_readings(&self) -> Result<Vec<SensorReading>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(scan_all(&self.sensor_db, &rtxn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::temp_env;
    use chrono::NaiveDate;
    use shamba_types::{Co2eTonnes, IssuanceStatus, Timestamp};

    fn issuance(id: u64, batch: &str) -> CarbonCreditIssuance {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        CarbonCreditIssuance {
            id: IssuanceId::new(id),
            project: ProjectId::new(1),
            issuance_date: day,
            amount: Co2eTonnes::from_centi(1_250),
            status: IssuanceStatus::Pending,
            batch_number: batch.into(),
            verification_report: "reports/v1.pdf".into(),
            verification_body: "SCS Global".into(),
            verification_date: day,
            token_id: None,
            transaction_id: None,
            retired_at: None,
            retirement_reason: None,
            created_at: Timestamp::new(1_700_000_000),
            updated_at: Timestamp::new(1_700_000_000),
        }
    }

    #[test]
    fn batch_numbers_are_unique() {
        let (_dir, env) = temp_env();
        env.insert_issuance(&issuance(1, "KE-2024-001")).unwrap();
        assert!(env
            .insert_issuance(&issuance(2, "KE-2024-001"))
            .unwrap_err()
            .is_duplicate());
        assert!(env.get_issuance(IssuanceId::new(2)).unwrap_err().is_not_found());

        let mut issued = issuance(1, "KE-2024-001");
        issued.status = IssuanceStatus::Issued;
        env.update_issuance(&issued).unwrap();
        assert_eq!(env.list_issuances().unwrap(), vec![issued]);

        let renamed = issuance(1, "KE-2024-999");
        assert!(env.update_issuance(&renamed).unwrap_err().is_not_found());
    }
}
