use std::sync::Arc;

use shamba_ledger::{LedgerError, TokenType};
use shamba_nullables::ledger::NULL_OPERATOR_ACCOUNT;
use shamba_nullables::{NullLedger, NullStore};
use shamba_store::{LandTokenStore, ParcelStore};
use shamba_tokenization::{TokenMetadata, TokenizationError, TokenizationService};
use shamba_types::{
    FarmerId, Hectares, LandParcel, ParcelId, Requester, Timestamp, UserId, VerificationMethod,
    VerificationStatus,
};

fn setup() -> (Arc<NullStore>, Arc<NullLedger>, TokenizationService<NullStore>) {
    let store = Arc::new(NullStore::new());
    let ledger = Arc::new(NullLedger::new());
    let service = TokenizationService::new(store.clone(), ledger.clone());
    (store, ledger, service)
}

fn add_parcel(store: &NullStore, status: VerificationStatus) -> ParcelId {
    let id = store.next_parcel_id().unwrap();
    let verified = status == VerificationStatus::Verified;
    store
        .put_parcel(&LandParcel {
            id,
            farmer: FarmerId::new(5),
            title_deed_number: Some("NKR/2231".into()),
            total_area: Hectares::from_centi(1_200_000),
            gps_coordinates: "[[0,0],[0,0.1],[0.1,0.1],[0.1,0]]".into(),
            address: "Njoro".into(),
            country: "Kenya".into(),
            region: "Nakuru".into(),
            verification_status: status,
            verification_method: verified.then_some(VerificationMethod::Gps),
            verified_by: verified.then_some(UserId::new(5)),
            verification_date: verified.then_some(Timestamp::new(1_700_000_500)),
            document_hash: None,
            created_at: Timestamp::new(1_700_000_000),
            updated_at: Timestamp::new(1_700_000_500),
        })
        .unwrap();
    id
}

fn owner() -> Requester {
    Requester::farmer(FarmerId::new(5))
}

#[tokio::test]
async fn verified_parcel_is_minted_with_operator_authority() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);

    let result = service.tokenize_land(parcel, &owner()).await.unwrap();
    assert!(!result.token_id.is_empty());
    assert!(!result.transaction_id.is_empty());
    assert_eq!(result.serial_number, 1);
    assert_eq!(result.metadata.title, "Land Parcel #1");
    assert_eq!(result.metadata.area_ha, 12_000.0);

    let created = ledger.created_tokens();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "LAND-1");
    assert_eq!(created[0].symbol, "LAND");
    assert_eq!(created[0].token_type, TokenType::NonFungibleUnique);
    assert_eq!(created[0].decimals, 0);
    assert_eq!(created[0].initial_supply, 0);
    assert_eq!(created[0].treasury_account, NULL_OPERATOR_ACCOUNT);

    let minted = ledger.minted();
    let metadata: TokenMetadata = serde_json::from_slice(&minted[0].1).unwrap();
    assert_eq!(metadata, result.metadata);

    let stored = store.get_land_token(parcel).unwrap().unwrap();
    assert_eq!(stored.token_id, result.token_id);
    assert_eq!(stored.mint_transaction_id, result.transaction_id);
    assert!(stored.is_active);
}

#[tokio::test]
async fn second_tokenize_fails_and_mints_once() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);

    service.tokenize_land(parcel, &owner()).await.unwrap();
    let err = service.tokenize_land(parcel, &owner()).await.unwrap_err();

    assert!(matches!(err, TokenizationError::AlreadyTokenized(id) if id == parcel));
    assert_eq!(ledger.mint_calls(), 1);
    assert_eq!(ledger.create_token_calls(), 1);
}

#[tokio::test]
async fn concurrent_requests_mint_once() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.tokenize_land(parcel, &owner()).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(TokenizationError::AlreadyTokenized(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(ledger.mint_calls(), 1);
}

#[tokio::test]
async fn unverified_and_rejected_parcels_never_reach_the_ledger() {
    let (store, ledger, service) = setup();
    for status in [
        VerificationStatus::Unverified,
        VerificationStatus::Pending,
        VerificationStatus::Rejected,
    ] {
        let parcel = add_parcel(&store, status);
        let err = service.tokenize_land(parcel, &owner()).await.unwrap_err();
        assert!(matches!(err, TokenizationError::NotVerified { status: s, .. } if s == status));
    }
    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn foreign_farmer_is_refused_but_staff_may_tokenize() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);

    let err = service
        .tokenize_land(parcel, &Requester::farmer(FarmerId::new(6)))
        .await
        .unwrap_err();
    assert!(matches!(err, TokenizationError::NotAuthorized(_)));
    assert_eq!(ledger.total_calls(), 0);

    service
        .tokenize_land(parcel, &Requester::staff(UserId::new(900)))
        .await
        .unwrap();

    let missing = service
        .tokenize_land(ParcelId::new(77), &owner())
        .await
        .unwrap_err();
    assert!(matches!(missing, TokenizationError::ParcelNotFound(_)));
}

#[tokio::test]
async fn failed_receipt_persists_nothing_and_allows_retry() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);
    ledger.fail_mint_with("INSUFFICIENT_PAYER_BALANCE");

    let err = service.tokenize_land(parcel, &owner()).await.unwrap_err();
    match err {
        TokenizationError::Ledger(LedgerError::Receipt { operation, status }) => {
            assert_eq!(operation, "mint");
            assert_eq!(status.0, "INSUFFICIENT_PAYER_BALANCE");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.get_land_token(parcel).unwrap(), None);

    // The reservation was released, so the slot can be claimed again.
    store.reserve_token(parcel).unwrap();
}

#[tokio::test]
async fn provider_error_on_token_creation_is_surfaced() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);
    ledger.fail_create_token(LedgerError::Provider {
        status: 503,
        message: "relay unavailable".into(),
    });

    let err = service.tokenize_land(parcel, &owner()).await.unwrap_err();
    assert!(matches!(
        err,
        TokenizationError::Ledger(LedgerError::Provider { status: 503, .. })
    ));
    assert_eq!(ledger.mint_calls(), 0);
    assert_eq!(store.get_land_token(parcel).unwrap(), None);
}

#[tokio::test]
async fn failed_store_write_after_mint_is_retried() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);
    store.fail_token_completions(1);

    let result = service.tokenize_land(parcel, &owner()).await.unwrap();
    let stored = service.land_token(parcel).unwrap().unwrap();
    assert_eq!(stored.token_id, result.token_id);
    assert_eq!(ledger.mint_calls(), 1);
}

#[tokio::test]
async fn unrecorded_mint_hands_back_its_identity() {
    let (store, ledger, service) = setup();
    let parcel = add_parcel(&store, VerificationStatus::Verified);
    store.fail_token_completions(2);

    let err = service.tokenize_land(parcel, &owner()).await.unwrap_err();
    let (token_id, transaction_id) = match err {
        TokenizationError::Unrecorded {
            parcel: p,
            token_id,
            transaction_id,
            serial_number,
            ..
        } => {
            assert_eq!(p, parcel);
            assert_eq!(serial_number, 1);
            (token_id, transaction_id)
        }
        other => panic!("unexpected error: {other}"),
    };
    assert!(!token_id.is_empty());
    assert!(!transaction_id.is_empty());
    assert_eq!(ledger.mint_calls(), 1);

    // The slot stays claimed so the parcel is never minted twice.
    let again = service.tokenize_land(parcel, &owner()).await.unwrap_err();
    assert!(matches!(again, TokenizationError::AlreadyTokenized(_)));
    assert_eq!(ledger.mint_calls(), 1);
}
