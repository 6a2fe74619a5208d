//! Caller-supplied fields for new carbon records. Ids, owners, statuses and
//! timestamps are assigned by [`CarbonRegistry`](crate::CarbonRegistry).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shamba_types::{
    CarbonStandard, Co2eTonnes, EvidenceKind, IssuanceStatus, Methodology, ParcelId,
    PracticeStatus, PracticeVerificationId, PracticeVerificationType, ProjectId, SensorSource,
    SensorType, Timestamp,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub parcel: ParcelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub methodology: Methodology,
    pub start_date: NaiveDate,
    pub expected_credits_per_year: Co2eTonnes,
    pub standard: CarbonStandard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssuance {
    pub project: ProjectId,
    pub issuance_date: NaiveDate,
    pub amount: Co2eTonnes,
    pub batch_number: String,
    pub verification_report: String,
    pub verification_body: String,
    pub verification_date: NaiveDate,
}

impl NewIssuance {
    pub(crate) const INITIAL_STATUS: IssuanceStatus = IssuanceStatus::Pending;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPracticeVerification {
    pub project: ProjectId,
    pub verification_date: NaiveDate,
    pub verification_type: PracticeVerificationType,
    #[serde(default = "default_practice_status")]
    pub status: PracticeStatus,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub is_compliant: bool,
    #[serde(default)]
    pub compliance_score: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub next_verification_date: Option<NaiveDate>,
}

fn default_practice_status() -> PracticeStatus {
    PracticeStatus::Pending
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEvidence {
    pub verification: PracticeVerificationId,
    pub file: String,
    pub file_type: EvidenceKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewSensorReading {
    pub project: ProjectId,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    pub reading_date: Timestamp,
    pub source: SensorSource,
    #[serde(default)]
    pub device_id: Option<String>,
}
