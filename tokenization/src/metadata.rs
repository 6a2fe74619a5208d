use serde::{Deserialize, Serialize};
use shamba_types::LandParcel;

/// The snapshot burned into the minted unit.
///
/// Only immutable facts about the parcel go in. The polygon and the live
/// verification status are left out because the metadata can never be
/// updated after the mint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub title: String,
    pub deed_number: Option<String>,
    pub area_ha: f64,
    pub parcel_id: u64,
}

impl TokenMetadata {
    pub fn for_parcel(parcel: &LandParcel) -> Self {
        Self {
            title: format!("Land Parcel #{}", parcel.id),
            deed_number: parcel.title_deed_number.clone(),
            area_ha: parcel.total_area.as_f64(),
            parcel_id: parcel.id.get(),
        }
    }

    /// Compact JSON, as carried by the mint.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_types::{FarmerId, Hectares, ParcelId, Timestamp, VerificationStatus};

    #[test]
    fn snapshot_excludes_live_fields() {
        let parcel = LandParcel {
            id: ParcelId::new(42),
            farmer: FarmerId::new(3),
            title_deed_number: Some("KSM/77".into()),
            total_area: Hectares::from_centi(1250),
            gps_coordinates: "[[0,0],[0,1],[1,1]]".into(),
            address: "Plot 1".into(),
            country: "Kenya".into(),
            region: "Kisumu".into(),
            verification_status: VerificationStatus::Verified,
            verification_method: None,
            verified_by: None,
            verification_date: None,
            document_hash: None,
            created_at: Timestamp::EPOCH,
            updated_at: Timestamp::EPOCH,
        };
        let json = TokenMetadata::for_parcel(&parcel).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"title":"Land Parcel #42","deed_number":"KSM/77","area_ha":12.5,"parcel_id":42}"#
        );
        assert!(!json.contains("verified"));
        assert!(!json.contains("[["));
    }
}
