use std::sync::Arc;

use shamba_geometry::GeometryAreaCalculator;
use shamba_imagery::{ImageryCredentials, LandAnalysis};
use shamba_nullables::{NullImagery, NullStore};
use shamba_store::{ParcelStore, VerificationRequestStore};
use shamba_types::{
    FarmerId, Hectares, LandParcel, ParcelId, RequestStatus, Requester, Timestamp, UserId,
    VerificationMethod, VerificationStatus,
};
use shamba_verification::{
    Evidence, GpsStrategy, SatelliteStrategy, StrategySet, SurveyStrategy,
    VerificationCoordinator, VerificationError, VerificationPolicy,
};

const SQUARE: &str = "[[36.8,-1.3],[36.81,-1.3],[36.81,-1.29],[36.8,-1.29]]";

struct Harness {
    store: Arc<NullStore>,
    imagery: Arc<NullImagery>,
    coordinator: VerificationCoordinator<NullStore>,
}

fn harness(policy: VerificationPolicy) -> Harness {
    let store = Arc::new(NullStore::new());
    let imagery = Arc::new(NullImagery::new());
    let strategies = StrategySet {
        satellite: SatelliteStrategy::new(imagery.clone(), ImageryCredentials::default(), 10),
        gps: GpsStrategy::new(policy.gps_tolerance),
        survey: SurveyStrategy,
    };
    let coordinator = VerificationCoordinator::new(store.clone(), strategies, policy);
    Harness {
        store,
        imagery,
        coordinator,
    }
}

fn square_area() -> f64 {
    GeometryAreaCalculator::wgs84().area_hectares(SQUARE).unwrap()
}

fn add_parcel(store: &NullStore, farmer: u64, declared: f64) -> ParcelId {
    let id = store.next_parcel_id().unwrap();
    store
        .put_parcel(&LandParcel {
            id,
            farmer: FarmerId::new(farmer),
            title_deed_number: Some(format!("NRB/{}", id)),
            total_area: Hectares::from_f64(declared).unwrap(),
            gps_coordinates: SQUARE.into(),
            address: "Plot 9".into(),
            country: "Kenya".into(),
            region: "Nairobi".into(),
            verification_status: VerificationStatus::Unverified,
            verification_method: None,
            verified_by: None,
            verification_date: None,
            document_hash: None,
            created_at: Timestamp::new(1_700_000_000),
            updated_at: Timestamp::new(1_700_000_000),
        })
        .unwrap();
    id
}

#[tokio::test]
async fn gps_success_verifies_parcel_and_records_completed_request() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());
    let farmer = Requester::farmer(FarmerId::new(1));

    let report = h
        .coordinator
        .request_verification(parcel, &farmer, VerificationMethod::Gps, &Evidence::default())
        .await
        .unwrap();

    assert!(report.outcome.is_accepted());
    assert_eq!(report.request.status, RequestStatus::Completed);
    assert!(report.parcel.is_verified());

    let stored = h.store.get_parcel(parcel).unwrap();
    assert_eq!(stored.verification_method, Some(VerificationMethod::Gps));
    assert_eq!(stored.verified_by, Some(UserId::new(1)));
    assert_eq!(stored.verification_date, report.request.completed_at);

    let trail = h.store.requests_for_parcel(parcel).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].outcome().unwrap(), report.outcome);
}

#[tokio::test]
async fn failed_commit_persists_neither_status_nor_audit_record() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());
    h.store.fail_next_verification_commit();

    let err = h
        .coordinator
        .request_verification(
            parcel,
            &Requester::farmer(FarmerId::new(1)),
            VerificationMethod::Gps,
            &Evidence::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::Store(_)));
    assert!(h.store.requests_for_parcel(parcel).unwrap().is_empty());
    let stored = h.store.get_parcel(parcel).unwrap();
    assert!(!stored.is_verified());
    assert_eq!(stored.verified_by, None);
}

#[tokio::test]
async fn failed_commit_does_not_strand_parcel_in_pending() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());
    let farmer = Requester::farmer(FarmerId::new(1));
    h.store.fail_next_verification_commit();

    h.coordinator
        .request_verification(parcel, &farmer, VerificationMethod::Gps, &Evidence::default())
        .await
        .unwrap_err();
    assert_eq!(
        h.store.get_parcel(parcel).unwrap().verification_status,
        VerificationStatus::Unverified
    );

    // An errored follow-up restores to the status before the failed commit.
    let report = h
        .coordinator
        .request_verification(parcel, &farmer, VerificationMethod::Survey, &Evidence::default())
        .await
        .unwrap();
    assert!(report.outcome.has_error());
    assert_eq!(report.parcel.verification_status, VerificationStatus::Unverified);

    let report = h
        .coordinator
        .request_verification(parcel, &farmer, VerificationMethod::Gps, &Evidence::default())
        .await
        .unwrap();
    assert!(report.parcel.is_verified());
}

#[tokio::test]
async fn manual_method_is_rejected_before_any_work() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());

    let err = h
        .coordinator
        .request_verification(
            parcel,
            &Requester::staff(UserId::new(50)),
            VerificationMethod::Manual,
            &Evidence::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::UnsupportedMethod(m) if m == "manual"));
    assert_eq!(
        h.store.get_parcel(parcel).unwrap().verification_status,
        VerificationStatus::Unverified
    );
    assert!(h.store.requests_for_parcel(parcel).unwrap().is_empty());
    assert_eq!(h.imagery.token_calls(), 0);
}

#[tokio::test]
async fn unknown_parcel_and_foreign_requester_are_refused() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());

    let missing = h
        .coordinator
        .request_verification(
            ParcelId::new(404),
            &Requester::farmer(FarmerId::new(1)),
            VerificationMethod::Gps,
            &Evidence::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(missing, VerificationError::ParcelNotFound(id) if id == ParcelId::new(404)));

    let foreign = h
        .coordinator
        .request_verification(
            parcel,
            &Requester::farmer(FarmerId::new(2)),
            VerificationMethod::Gps,
            &Evidence::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(foreign, VerificationError::NotAuthorized(_)));
    assert!(h.store.requests_for_parcel(parcel).unwrap().is_empty());
}

#[tokio::test]
async fn staff_may_verify_any_parcel_and_verified_is_terminal() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());
    let staff = Requester::staff(UserId::new(77));

    let report = h
        .coordinator
        .request_verification(parcel, &staff, VerificationMethod::Gps, &Evidence::default())
        .await
        .unwrap();
    assert_eq!(report.parcel.verified_by, Some(UserId::new(77)));

    let again = h
        .coordinator
        .request_verification(parcel, &staff, VerificationMethod::Gps, &Evidence::default())
        .await
        .unwrap_err();
    assert!(matches!(again, VerificationError::AlreadyVerified(_)));
    assert_eq!(h.store.requests_for_parcel(parcel).unwrap().len(), 1);
}

#[tokio::test]
async fn area_mismatch_rejects_and_allows_retry() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area() * 2.0);
    let farmer = Requester::farmer(FarmerId::new(1));

    let report = h
        .coordinator
        .request_verification(parcel, &farmer, VerificationMethod::Gps, &Evidence::default())
        .await
        .unwrap();
    assert!(!report.outcome.valid);
    assert!(!report.outcome.has_error());
    assert_eq!(report.request.status, RequestStatus::Failed);
    assert_eq!(report.parcel.verification_status, VerificationStatus::Rejected);
    assert_eq!(report.parcel.verification_method, None);

    // A rejected parcel may try again with other evidence.
    let report = h
        .coordinator
        .request_verification(
            parcel,
            &farmer,
            VerificationMethod::Survey,
            &Evidence::with_survey("survey-2024-118.pdf"),
        )
        .await
        .unwrap();
    assert!(report.parcel.is_verified());
    assert_eq!(report.parcel.verification_method, Some(VerificationMethod::Survey));
    assert_eq!(h.store.requests_for_parcel(parcel).unwrap().len(), 2);
}

#[tokio::test]
async fn errored_attempt_restores_previous_status() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());

    let report = h
        .coordinator
        .request_verification(
            parcel,
            &Requester::farmer(FarmerId::new(1)),
            VerificationMethod::Survey,
            &Evidence::default(),
        )
        .await
        .unwrap();

    assert_eq!(report.outcome.error.as_deref(), Some("No survey report provided"));
    assert_eq!(report.request.status, RequestStatus::Failed);
    assert_eq!(
        h.store.get_parcel(parcel).unwrap().verification_status,
        VerificationStatus::Unverified
    );
}

#[tokio::test]
async fn satellite_provider_error_is_recorded_not_raised() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());
    h.imagery.push_analysis(Ok(LandAnalysis {
        http_status: 503,
        area: None,
        match_percentage: None,
    }));

    let report = h
        .coordinator
        .request_verification(
            parcel,
            &Requester::farmer(FarmerId::new(1)),
            VerificationMethod::Satellite,
            &Evidence::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.outcome.error.as_deref(),
        Some("Satellite verification failed: 503")
    );
    assert!(!report.parcel.is_verified());
    let trail = h.store.requests_for_parcel(parcel).unwrap();
    assert_eq!(trail[0].status, RequestStatus::Failed);
    assert!(trail[0].notes.contains("503"));
}

#[tokio::test]
async fn satellite_threshold_gates_low_matches() {
    let h = harness(VerificationPolicy {
        min_satellite_match: Some(90.0),
        ..Default::default()
    });
    let low = add_parcel(&h.store, 1, square_area());
    let high = add_parcel(&h.store, 1, square_area());
    let farmer = Requester::farmer(FarmerId::new(1));

    h.imagery.push_analysis(Ok(LandAnalysis {
        http_status: 200,
        area: Some(square_area()),
        match_percentage: Some(60.0),
    }));
    h.imagery.push_analysis(Ok(LandAnalysis {
        http_status: 200,
        area: Some(square_area()),
        match_percentage: Some(97.0),
    }));

    let first = h
        .coordinator
        .request_verification(low, &farmer, VerificationMethod::Satellite, &Evidence::default())
        .await
        .unwrap();
    assert!(!first.outcome.has_error());
    assert_eq!(first.request.status, RequestStatus::Failed);
    assert_eq!(first.parcel.verification_status, VerificationStatus::Rejected);
    assert!(first.outcome.note.as_deref().unwrap().contains("60.0%"));
    assert!(h.store.requests_for_parcel(low).unwrap()[0]
        .notes
        .contains("below the required 90.0%"));

    let second = h
        .coordinator
        .request_verification(high, &farmer, VerificationMethod::Satellite, &Evidence::default())
        .await
        .unwrap();
    assert!(second.parcel.is_verified());
    assert_eq!(second.outcome.match_percentage, Some(97.0));
}

#[tokio::test]
async fn audit_trail_is_owner_scoped() {
    let h = harness(VerificationPolicy::default());
    let parcel = add_parcel(&h.store, 1, square_area());
    h.coordinator
        .request_verification(
            parcel,
            &Requester::farmer(FarmerId::new(1)),
            VerificationMethod::Gps,
            &Evidence::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        h.coordinator
            .requests_for_parcel(parcel, &Requester::farmer(FarmerId::new(1)))
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(
        h.coordinator
            .requests_for_parcel(parcel, &Requester::farmer(FarmerId::new(3))),
        Err(VerificationError::NotAuthorized(_))
    ));
}
