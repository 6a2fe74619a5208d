use std::sync::Arc;

use shamba_store::{CarbonStore, ParcelStore, Sequence, StoreError};
use shamba_types::{
    CarbonCreditIssuance, CarbonCreditProject, Co2eTonnes, EvidenceId, IssuanceId, ParcelId,
    PracticeVerification, PracticeVerificationId, ProjectId, ProjectStatus, Requester,
    SensorReading, SensorReadingId, Timestamp, VerificationEvidence,
};
use tracing::info;

use crate::{
    CarbonError, IssuanceAction, NewEvidence, NewIssuance, NewPracticeVerification, NewProject,
    NewSensorReading, ProjectAction,
};

const MIN_ISSUANCE: Co2eTonnes = Co2eTonnes::from_centi(1);
const MAX_COMPLIANCE_SCORE: u8 = 100;

pub struct CarbonRegistry<S: ?Sized> {
    store: Arc<S>,
}

impl<S> CarbonRegistry<S>
where
    S: CarbonStore + ParcelStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // Projects

    /// Propose a project on one of the requester's own parcels. The project
    /// starts as a draft owned by the parcel's farmer.
    pub fn create_project(
        &self,
        requester: &Requester,
        new: NewProject,
    ) -> Result<CarbonCreditProject, CarbonError> {
        let parcel = self.store.get_parcel(new.parcel).map_err(|e| match e {
            StoreError::NotFound(_) => CarbonError::ParcelNotFound(new.parcel),
            other => CarbonError::Store(other),
        })?;
        if requester.is_staff() || !requester.may_act_for(parcel.farmer) {
            return Err(CarbonError::NotAuthorized("create a project on this parcel"));
        }
        if new.name.trim().is_empty() {
            return Err(CarbonError::invalid("name", "must not be empty"));
        }

        let now = Timestamp::now();
        let project = CarbonCreditProject {
            id: ProjectId::new(self.store.next_id(Sequence::Project)?),
            farmer: parcel.farmer,
            parcel: parcel.id,
            name: new.name.trim().to_string(),
            description: new.description,
            methodology: new.methodology,
            start_date: new.start_date,
            expected_credits_per_year: new.expected_credits_per_year,
            standard: new.standard,
            status: ProjectStatus::Draft,
            is_approved: false,
            approved_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.store.put_project(&project)?;
        info!(project_id = %project.id, parcel_id = %project.parcel, "carbon project created");
        Ok(project)
    }

    pub fn project(
        &self,
        id: ProjectId,
        requester: &Requester,
    ) -> Result<CarbonCreditProject, CarbonError> {
        let project = self.load_project(id)?;
        if !requester.may_act_for(project.farmer) {
            return Err(CarbonError::NotAuthorized("view this project"));
        }
        Ok(project)
    }

    /// Staff see every project; farmers see their own.
    pub fn projects(&self, requester: &Requester) -> Result<Vec<CarbonCreditProject>, CarbonError> {
        Ok(self
            .store
            .list_projects()?
            .into_iter()
            .filter(|p| requester.may_act_for(p.farmer))
            .collect())
    }

    pub fn parcel_projects(
        &self,
        parcel: ParcelId,
        requester: &Requester,
    ) -> Result<Vec<CarbonCreditProject>, CarbonError> {
        Ok(self
            .projects(requester)?
            .into_iter()
            .filter(|p| p.parcel == parcel)
            .collect())
    }

    /// Move a project through its review lifecycle.
    ///
    /// `reason` is required when rejecting and ignored otherwise.
    pub fn transition_project(
        &self,
        id: ProjectId,
        requester: &Requester,
        action: ProjectAction,
        reason: Option<String>,
    ) -> Result<CarbonCreditProject, CarbonError> {
        let mut project = self.load_project(id)?;
        if action.requires_staff() {
            if !requester.is_staff() {
                return Err(CarbonError::NotAuthorized("review carbon projects"));
            }
        } else if !requester.may_act_for(project.farmer) {
            return Err(CarbonError::NotAuthorized("submit this project"));
        }

        let next = match action.apply(project.status) {
            Err(_) if action == ProjectAction::Submit => {
                return Err(CarbonError::AlreadySubmitted(id))
            }
            other => other?,
        };

        let now = Timestamp::now();
        match action {
            ProjectAction::Approve => {
                project.is_approved = true;
                project.approved_at = Some(now);
                project.rejection_reason = None;
            }
            ProjectAction::Reject => {
                let reason = reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| CarbonError::invalid("reason", "a rejection needs a reason"))?;
                project.rejection_reason = Some(reason);
                project.is_approved = false;
            }
            ProjectAction::Suspend => project.is_approved = false,
            _ => {}
        }
        let previous = project.status;
        project.status = next;
        project.updated_at = now;
        self.store.put_project(&project)?;
        info!(project_id = %id, from = %previous, to = %next, "carbon project status changed");
        Ok(project)
    }

    // Issuances

    /// Record a pending issuance for an approved project. Staff only.
    pub fn create_issuance(
        &self,
        requester: &Requester,
        new: NewIssuance,
    ) -> Result<CarbonCreditIssuance, CarbonError> {
        if !requester.is_staff() {
            return Err(CarbonError::NotAuthorized("record issuances"));
        }
        let project = self.load_project(new.project)?;
        if project.status != ProjectStatus::Approved {
            return Err(CarbonError::ProjectNotApproved(project.id));
        }
        if new.amount < MIN_ISSUANCE {
            return Err(CarbonError::invalid(
                "amount",
                format!("must be at least {MIN_ISSUANCE}"),
            ));
        }
        let batch_number = new.batch_number.trim().to_string();
        if batch_number.is_empty() {
            return Err(CarbonError::invalid("batch_number", "must not be empty"));
        }

        let now = Timestamp::now();
        let issuance = CarbonCreditIssuance {
            id: IssuanceId::new(self.store.next_id(Sequence::Issuance)?),
            project: project.id,
            issuance_date: new.issuance_date,
            amount: new.amount,
            status: NewIssuance::INITIAL_STATUS,
            batch_number,
            verification_report: new.verification_report,
            verification_body: new.verification_body,
            verification_date: new.verification_date,
            token_id: None,
            transaction_id: None,
            retired_at: None,
            retirement_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_issuance(&issuance).map_err(|e| match e {
            StoreError::Duplicate(_) => CarbonError::DuplicateBatch(issuance.batch_number.clone()),
            other => CarbonError::Store(other),
        })?;
        info!(issuance_id = %issuance.id, project_id = %project.id, amount = %issuance.amount, "issuance recorded");
        Ok(issuance)
    }

    /// Mark a pending issuance as issued on the ledger. Staff only.
    pub fn issue(
        &self,
        id: IssuanceId,
        requester: &Requester,
        token_id: String,
        transaction_id: String,
    ) -> Result<CarbonCreditIssuance, CarbonError> {
        if !requester.is_staff() {
            return Err(CarbonError::NotAuthorized("issue credits"));
        }
        let mut issuance = self.load_issuance(id)?;
        issuance.status = IssuanceAction::Issue.apply(issuance.status)?;
        issuance.token_id = Some(token_id);
        issuance.transaction_id = Some(transaction_id);
        self.save_issuance(issuance)
    }

    pub fn reject_issuance(
        &self,
        id: IssuanceId,
        requester: &Requester,
    ) -> Result<CarbonCreditIssuance, CarbonError> {
        if !requester.is_staff() {
            return Err(CarbonError::NotAuthorized("reject issuances"));
        }
        let mut issuance = self.load_issuance(id)?;
        issuance.status = IssuanceAction::Reject.apply(issuance.status)?;
        self.save_issuance(issuance)
    }

    /// Retire issued credits. The project's farmer or staff.
    pub fn retire(
        &self,
        id: IssuanceId,
        requester: &Requester,
        reason: String,
    ) -> Result<CarbonCreditIssuance, CarbonError> {
        let mut issuance = self.load_issuance(id)?;
        let project = self.load_project(issuance.project)?;
        if !requester.may_act_for(project.farmer) {
            return Err(CarbonError::NotAuthorized("retire these credits"));
        }
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(CarbonError::invalid("reason", "a retirement needs a reason"));
        }
        issuance.status = IssuanceAction::Retire.apply(issuance.status)?;
        issuance.retired_at = Some(Timestamp::now());
        issuance.retirement_reason = Some(reason);
        self.save_issuance(issuance)
    }

    /// Staff see every issuance; farmers see those of their own projects.
    pub fn issuances(&self, requester: &Requester) -> Result<Vec<CarbonCreditIssuance>, CarbonError> {
        let all = self.store.list_issuances()?;
        if requester.is_staff() {
            return Ok(all);
        }
        let own: Vec<ProjectId> = self.projects(requester)?.into_iter().map(|p| p.id).collect();
        Ok(all.into_iter().filter(|i| own.contains(&i.project)).collect())
    }

    // Practice verifications and evidence

    pub fn record_practice_verification(
        &self,
        requester: &Requester,
        new: NewPracticeVerification,
    ) -> Result<PracticeVerification, CarbonError> {
        let project = self.load_project(new.project)?;
        if !requester.may_act_for(project.farmer) {
            return Err(CarbonError::NotAuthorized("record practice verifications for this project"));
        }
        if let Some(score) = new.compliance_score {
            if score > MAX_COMPLIANCE_SCORE {
                return Err(CarbonError::invalid(
                    "compliance_score",
                    format!("{score} is outside 0-{MAX_COMPLIANCE_SCORE}"),
                ));
            }
        }

        let record = PracticeVerification {
            id: PracticeVerificationId::new(self.store.next_id(Sequence::PracticeVerification)?),
            project: project.id,
            verification_date: new.verification_date,
            verification_type: new.verification_type,
            verified_by: Some(requester.user),
            status: new.status,
            findings: new.findings,
            is_compliant: new.is_compliant,
            compliance_score: new.compliance_score,
            notes: new.notes,
            next_verification_date: new.next_verification_date,
            created_at: Timestamp::now(),
        };
        self.store.put_practice_verification(&record)?;
        Ok(record)
    }

    pub fn practice_verifications(
        &self,
        project: ProjectId,
        requester: &Requester,
    ) -> Result<Vec<PracticeVerification>, CarbonError> {
        self.project(project, requester)?;
        Ok(self.store.practice_verifications_for_project(project)?)
    }

    /// Attach evidence to a practice verification. Staff or the project's
    /// farmer.
    pub fn attach_evidence(
        &self,
        requester: &Requester,
        new: NewEvidence,
    ) -> Result<VerificationEvidence, CarbonError> {
        let verification = self.load_practice_verification(new.verification)?;
        let project = self.load_project(verification.project)?;
        if !requester.may_act_for(project.farmer) {
            return Err(CarbonError::NotAuthorized("attach evidence to this verification"));
        }
        if new.file.trim().is_empty() {
            return Err(CarbonError::invalid("file", "must not be empty"));
        }
        check_range("latitude", new.latitude, 90.0)?;
        check_range("longitude", new.longitude, 180.0)?;

        let evidence = VerificationEvidence {
            id: EvidenceId::new(self.store.next_id(Sequence::Evidence)?),
            verification: verification.id,
            file: new.file,
            file_type: new.file_type,
            description: new.description,
            latitude: new.latitude,
            longitude: new.longitude,
            recorded_at: Timestamp::now(),
        };
        self.store.put_evidence(&evidence)?;
        Ok(evidence)
    }

    pub fn evidence(
        &self,
        verification: PracticeVerificationId,
        requester: &Requester,
    ) -> Result<Vec<VerificationEvidence>, CarbonError> {
        let record = self.load_practice_verification(verification)?;
        self.project(record.project, requester)?;
        Ok(self.store.evidence_for_verification(verification)?)
    }

    // Sensor data

    pub fn record_sensor_reading(
        &self,
        requester: &Requester,
        new: NewSensorReading,
    ) -> Result<SensorReading, CarbonError> {
        let project = self.load_project(new.project)?;
        if !requester.may_act_for(project.farmer) {
            return Err(CarbonError::NotAuthorized("record readings for this project"));
        }
        if !new.value.is_finite() {
            return Err(CarbonError::invalid("value", "must be a finite number"));
        }
        if new.unit.trim().is_empty() {
            return Err(CarbonError::invalid("unit", "must not be empty"));
        }

        let reading = SensorReading {
            id: SensorReadingId::new(self.store.next_id(Sequence::SensorReading)?),
            project: project.id,
            sensor_type: new.sensor_type,
            value: new.value,
            unit: new.unit.trim().to_string(),
            reading_date: new.reading_date,
            source: new.source,
            device_id: new.device_id,
            is_verified: false,
            verification_notes: None,
            created_at: Timestamp::now(),
        };
        self.store.put_sensor_reading(&reading)?;
        Ok(reading)
    }

    /// Staff see every reading; farmers see those of their own projects.
    pub fn sensor_readings(&self, requester: &Requester) -> Result<Vec<SensorReading>, CarbonError> {
        let all = self.store.list_sensor_readings()?;
        if requester.is_staff() {
            return Ok(all);
        }
        let own: Vec<ProjectId> = self.projects(requester)?.into_iter().map(|p| p.id).collect();
        Ok(all.into_iter().filter(|r| own.contains(&r.project)).collect())
    }

    fn load_project(&self, id: ProjectId) -> Result<CarbonCreditProject, CarbonError> {
        self.store.get_project(id).map_err(|e| match e {
            StoreError::NotFound(_) => CarbonError::ProjectNotFound(id),
            other => CarbonError::Store(other),
        })
    }

    fn load_issuance(&self, id: IssuanceId) -> Result<CarbonCreditIssuance, CarbonError> {
        self.store.get_issuance(id).map_err(|e| match e {
            StoreError::NotFound(_) => CarbonError::IssuanceNotFound(id),
            other => CarbonError::Store(other),
        })
    }

    fn load_practice_verification(
        &self,
        id: PracticeVerificationId,
    ) -> Result<PracticeVerification, CarbonError> {
        self.store.get_practice_verification(id).map_err(|e| match e {
            StoreError::NotFound(_) => CarbonError::PracticeVerificationNotFound(id),
            other => CarbonError::Store(other),
        })
    }

    fn save_issuance(
        &self,
        mut issuance: CarbonCreditIssuance,
    ) -> Result<CarbonCreditIssuance, CarbonError> {
        issuance.updated_at = Timestamp::now();
        self.store.update_issuance(&issuance)?;
        info!(issuance_id = %issuance.id, status = %issuance.status, "issuance updated");
        Ok(issuance)
    }
}

fn check_range(field: &'static str, value: Option<f64>, limit: f64) -> Result<(), CarbonError> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > limit => Err(CarbonError::invalid(
            field,
            format!("{v} is outside -{limit}..{limit}"),
        )),
        _ => Ok(()),
    }
}
