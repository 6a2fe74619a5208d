use proptest::prelude::*;

use shamba_types::{
    Co2eTonnes, FarmerId, Hectares, LandParcel, ParcelId, StatusTransition, Timestamp, UserId,
    VerificationMethod, VerificationStatus,
};

fn status() -> impl Strategy<Value = VerificationStatus> {
    prop_oneof![
        Just(VerificationStatus::Unverified),
        Just(VerificationStatus::Pending),
        Just(VerificationStatus::Verified),
        Just(VerificationStatus::Rejected),
    ]
}

fn transition() -> impl Strategy<Value = StatusTransition> {
    prop_oneof![
        Just(StatusTransition::Pending),
        Just(StatusTransition::Rejected),
        status().prop_map(StatusTransition::Restore),
        (1u64..1_000).prop_map(|at| StatusTransition::Verified {
            method: VerificationMethod::Survey,
            verifier: UserId::new(3),
            at: Timestamp::new(at),
        }),
    ]
}

fn parcel() -> LandParcel {
    LandParcel {
        id: ParcelId::new(1),
        farmer: FarmerId::new(3),
        title_deed_number: None,
        total_area: Hectares::from_centi(250),
        gps_coordinates: "[[0,0],[0,0.01],[0.01,0.01]]".into(),
        address: String::new(),
        country: "Kenya".into(),
        region: String::new(),
        verification_status: VerificationStatus::Unverified,
        verification_method: None,
        verified_by: None,
        verification_date: None,
        document_hash: None,
        created_at: Timestamp::new(0),
        updated_at: Timestamp::new(0),
    }
}

proptest! {
    /// Display output always parses back to the same area.
    #[test]
    fn area_text_is_lossless(centi in 0u64..u64::MAX / 100) {
        let area = Hectares::from_centi(centi);
        prop_assert_eq!(area.to_string().parse::<Hectares>().unwrap(), area);
    }

    /// Areas and tonnages share the same decimal grammar.
    #[test]
    fn tonnage_and_area_parse_alike(whole in 0u64..1_000_000, frac in 0u64..100) {
        let text = format!("{whole}.{frac:02}");
        let area = text.parse::<Hectares>().unwrap();
        let tonnes = text.parse::<Co2eTonnes>().unwrap();
        prop_assert_eq!(area.centi(), tonnes.centi());
    }

    /// A third decimal place is never silently truncated.
    #[test]
    fn three_decimals_rejected(whole in 0u64..1_000, frac in 0u64..1_000) {
        let text = format!("{whole}.{frac:03}");
        prop_assert!(text.parse::<Hectares>().is_err());
    }

    /// Once verified, no sequence of transitions moves a parcel, and the
    /// method, verifier and date are set exactly when it is verified.
    #[test]
    fn verification_is_terminal(steps in prop::collection::vec(transition(), 1..12)) {
        let mut p = parcel();
        let mut verified_at = None;
        for (i, step) in steps.iter().enumerate() {
            step.apply(&mut p, Timestamp::new(2_000 + i as u64));
            if p.is_verified() && verified_at.is_none() {
                verified_at = p.verification_date;
            }
            prop_assert_eq!(p.is_verified(), p.verification_method.is_some());
            prop_assert_eq!(p.is_verified(), p.verified_by.is_some());
            prop_assert_eq!(p.is_verified(), p.verification_date.is_some());
        }
        if verified_at.is_some() {
            prop_assert_eq!(p.verification_status, VerificationStatus::Verified);
            prop_assert_eq!(p.verification_date, verified_at);
        }
    }
}
