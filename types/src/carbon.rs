//! Carbon-credit persistence shapes.
//!
//! Projects tie a methodology to a verified parcel; issuances, practice
//! verifications, evidence and sensor readings form the supporting trail.
//! Lifecycle rules live in `shamba-carbon`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::area::parse_hundredths;
use crate::{
    EvidenceId, FarmerId, IssuanceId, ParcelId, PracticeVerificationId, ProjectId,
    SensorReadingId, ShambaError, Timestamp, UserId,
};

/// Declares a snake_case string enum with `as_str`, `Display` and `FromStr`.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ShambaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ShambaError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

choice_enum!(
    /// Review lifecycle of a carbon-credit project.
    ProjectStatus, "project status" {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
        Suspended => "suspended",
    }
);

choice_enum!(
    Methodology, "methodology" {
        Agroforestry => "agroforestry",
        ConservationAg => "conservation_ag",
        Organic => "organic",
        Reforestation => "reforestation",
        Biochar => "biochar",
        Livestock => "livestock",
    }
);

choice_enum!(
    /// Certification standard the project is verified against.
    CarbonStandard, "verification standard" {
        Verra => "verra",
        GoldStandard => "gold_standard",
        Acr => "acr",
        Custom => "custom",
    }
);

choice_enum!(
    IssuanceStatus, "issuance status" {
        Pending => "pending",
        Issued => "issued",
        Rejected => "rejected",
        Retired => "retired",
    }
);

choice_enum!(
    SensorType, "sensor type" {
        SoilMoisture => "soil_moisture",
        Temperature => "temperature",
        Rainfall => "rainfall",
        Ndvi => "ndvi",
        SoilCarbon => "soil_carbon",
        Ph => "ph",
    }
);

choice_enum!(
    SensorSource, "sensor source" {
        IotDevice => "iot_device",
        Satellite => "satellite",
        Manual => "manual",
        Drone => "drone",
    }
);

choice_enum!(
    PracticeVerificationType, "practice verification type" {
        Remote => "remote",
        FieldVisit => "field_visit",
        FarmerReport => "farmer_report",
        Community => "community",
        Drone => "drone",
        Satellite => "satellite",
    }
);

choice_enum!(
    PracticeStatus, "practice verification status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        RequiresFollowup => "requires_followup",
    }
);

choice_enum!(
    EvidenceKind, "evidence type" {
        Photo => "photo",
        Video => "video",
        Document => "document",
        Audio => "audio",
        Geojson => "geojson",
    }
);

/// Tonnes of CO2-equivalent with two decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Co2eTonnes(u64);

impl Co2eTonnes {
    pub const ZERO: Self = Self(0);

    pub const fn from_centi(centi: u64) -> Self {
        Self(centi)
    }

    pub fn centi(&self) -> u64 {
        self.0
    }
}

impl FromStr for Co2eTonnes {
    type Err = ShambaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s)
            .map(Self)
            .ok_or_else(|| ShambaError::InvalidField {
                field: "amount",
                reason: format!("not a decimal tonnage: {s}"),
            })
    }
}

impl fmt::Display for Co2eTonnes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} tCO2e", self.0 / 100, self.0 % 100)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonCreditProject {
    pub id: ProjectId,
    pub farmer: FarmerId,
    pub parcel: ParcelId,
    pub name: String,
    pub description: String,
    pub methodology: Methodology,
    pub start_date: NaiveDate,
    pub expected_credits_per_year: Co2eTonnes,
    pub standard: CarbonStandard,
    pub status: ProjectStatus,
    pub is_approved: bool,
    pub approved_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonCreditIssuance {
    pub id: IssuanceId,
    pub project: ProjectId,
    pub issuance_date: NaiveDate,
    pub amount: Co2eTonnes,
    pub status: IssuanceStatus,
    /// Unique across all issuances.
    pub batch_number: String,
    /// Reference to the stored verification report.
    pub verification_report: String,
    pub verification_body: String,
    pub verification_date: NaiveDate,
    pub token_id: Option<String>,
    pub transaction_id: Option<String>,
    pub retired_at: Option<Timestamp>,
    pub retirement_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CarbonCreditIssuance {
    pub fn is_retired(&self) -> bool {
        self.status == IssuanceStatus::Retired
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: SensorReadingId,
    pub project: ProjectId,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    pub reading_date: Timestamp,
    pub source: SensorSource,
    pub device_id: Option<String>,
    pub is_verified: bool,
    pub verification_notes: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeVerification {
    pub id: PracticeVerificationId,
    pub project: ProjectId,
    pub verification_date: NaiveDate,
    pub verification_type: PracticeVerificationType,
    pub verified_by: Option<UserId>,
    pub status: PracticeStatus,
    pub findings: String,
    pub is_compliant: bool,
    /// 0–100 when present.
    pub compliance_score: Option<u8>,
    pub notes: Option<String>,
    pub next_verification_date: Option<NaiveDate>,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationEvidence {
    pub id: EvidenceId,
    pub verification: PracticeVerificationId,
    /// Reference to the stored file.
    pub file: String,
    pub file_type: EvidenceKind,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub recorded_at: Timestamp,
}
