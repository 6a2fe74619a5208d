use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shamba_crypto::KeyVault;
use shamba_imagery::ImageryCredentials;
use shamba_node::{LandRegistry, RegistrySettings, ShutdownController};
use shamba_nullables::{NullImagery, NullLedger, NullStore};
use shamba_rpc::{router, AppState, RpcServer};
use shamba_types::Tinybars;
use shamba_verification::VerificationPolicy;
use tower::ServiceExt;

const STAFF: u64 = 900;

fn registry() -> (Arc<LandRegistry>, Arc<NullLedger>) {
    let ledger = Arc::new(NullLedger::new());
    let registry = LandRegistry::new(
        Arc::new(NullStore::new()),
        ledger.clone(),
        Arc::new(NullImagery::new()),
        RegistrySettings {
            policy: VerificationPolicy::default(),
            imagery_credentials: ImageryCredentials::default(),
            resolution_meters: 10,
            vault: KeyVault::new([5u8; 32]),
            network: "testnet".into(),
            initial_account_balance: Tinybars::from_hbar(1),
        },
    )
    .unwrap();
    (Arc::new(registry), ledger)
}

fn app_with(metrics_enabled: bool) -> (Router, Arc<NullLedger>) {
    let (registry, ledger) = registry();
    let state = AppState {
        registry,
        metrics_enabled,
    };
    (router(state), ledger)
}

fn app() -> Router {
    app_with(true).0
}

struct As {
    user: u64,
    role: &'static str,
}

fn farmer(id: u64) -> As {
    As { user: id, role: "farmer" }
}

fn staff() -> As {
    As {
        user: STAFF,
        role: "staff",
    }
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    who: Option<As>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(who) = who {
        builder = builder
            .header("x-user-id", who.user.to_string())
            .header("x-user-role", who.role);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn onboard(app: &Router, email: &str) -> u64 {
    let (status, body) = call(
        app,
        "POST",
        "/farmers",
        None,
        Some(json!({
            "email": email,
            "first_name": "Wanjiru",
            "last_name": "Kamau",
            "country": "Kenya",
            "region": "Nyeri",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["farmer"]["id"].as_u64().unwrap()
}

async fn register(app: &Router, owner: u64, area: Value) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        "/parcels",
        Some(farmer(owner)),
        Some(json!({
            "title_deed_number": "NYERI/MUKURWE-INI/331",
            "total_area": area,
            "gps_coordinates": [[0, 0], [0, 0.1], [0.1, 0.1], [0.1, 0]],
            "address": "Mukurwe-ini",
            "country": "Kenya",
            "region": "Nyeri",
        })),
    )
    .await
}

#[tokio::test]
async fn health_and_metrics() {
    let app = app();
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    onboard(&app, "wanjiru@example.ke").await;
    let (status, body) = call(&app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("shamba_onboardings_total 1"));

    let (disabled, _) = app_with(false);
    let (status, _) = call(&disabled, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn onboarding_hides_the_sealed_key() {
    let app = app();
    let (status, body) = call(
        &app,
        "POST",
        "/farmers",
        None,
        Some(json!({
            "email": "njeri@example.ke",
            "first_name": "Njeri",
            "last_name": "Mwangi",
            "country": "Kenya",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["account"].get("sealed_private_key").is_none());
    assert_eq!(body["account"]["did_document"]["type"], "FarmerIdentity");

    let id = body["farmer"]["id"].as_u64().unwrap();
    let (status, account) = call(&app, "GET", &format!("/farmers/{id}/account"), Some(farmer(id)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["did"], body["account"]["did"]);

    let (status, _) = call(
        &app,
        "POST",
        "/farmers",
        None,
        Some(json!({
            "email": "NJERI@example.ke",
            "first_name": "Njeri",
            "last_name": "Mwangi",
            "country": "Kenya",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn identity_headers_are_required() {
    let app = app();
    let (status, _) = call(&app, "GET", "/parcels/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        "GET",
        "/parcels/1",
        Some(As {
            user: 1,
            role: "auditor",
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_then_tokenize_over_http() {
    let (app, ledger) = app_with(true);
    let owner = onboard(&app, "wanjiru@example.ke").await;

    let (status, parcel) = register(&app, owner, json!("12000")).await;
    assert_eq!(status, StatusCode::CREATED, "{parcel}");
    assert_eq!(parcel["total_area"], "12000.00");
    assert_eq!(parcel["verification_status"], "unverified");
    let id = parcel["id"].as_u64().unwrap();

    let calls = ledger.total_calls();
    let (status, _) = call(&app, "POST", &format!("/parcels/{id}/tokenize"), Some(farmer(owner)), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(ledger.total_calls(), calls);

    let (status, report) = call(
        &app,
        "POST",
        &format!("/parcels/{id}/verifications"),
        Some(farmer(owner)),
        Some(json!({ "method": "gps" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{report}");
    assert_eq!(report["outcome"]["valid"], true);
    assert_eq!(report["request"]["status"], "completed");
    assert_eq!(report["parcel"]["verification_status"], "verified");
    assert_eq!(report["parcel"]["verification_method"], "gps");

    let (status, token) = call(&app, "POST", &format!("/parcels/{id}/tokenize"), Some(farmer(owner)), None).await;
    assert_eq!(status, StatusCode::CREATED, "{token}");
    assert_eq!(token["serial_number"], 1);

    let (status, _) = call(&app, "POST", &format!("/parcels/{id}/tokenize"), Some(farmer(owner)), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(ledger.mint_calls(), 1);

    let (status, stored) = call(&app, "GET", &format!("/parcels/{id}/token"), Some(farmer(owner)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["token_id"], token["token_id"]);

    let (status, trail) = call(&app, "GET", &format!("/parcels/{id}/verifications"), Some(staff()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trail.as_array().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/parcels/{id}/verifications"),
        Some(farmer(owner)),
        Some(json!({ "method": "gps" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn failed_attempts_are_reported_not_raised() {
    let app = app();
    let owner = onboard(&app, "wanjiru@example.ke").await;
    let (_, parcel) = register(&app, owner, json!(12000)).await;
    let id = parcel["id"].as_u64().unwrap();

    let (status, report) = call(
        &app,
        "POST",
        &format!("/parcels/{id}/verifications"),
        Some(farmer(owner)),
        Some(json!({ "method": "survey" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["request"]["status"], "failed");
    assert!(report["outcome"]["error"].is_string());
    assert_eq!(report["parcel"]["verification_status"], "unverified");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/parcels/{id}/verifications"),
        Some(farmer(owner)),
        Some(json!({ "method": "drone" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn parcels_are_owner_scoped_and_validated() {
    let app = app();
    let owner = onboard(&app, "wanjiru@example.ke").await;
    let other = onboard(&app, "otieno@example.ke").await;

    let (status, _) = register(&app, owner, json!("-4")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = register(&app, owner, json!("0")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, parcel) = register(&app, owner, json!("12000.5")).await;
    assert_eq!(parcel["total_area"], "12000.50");
    let id = parcel["id"].as_u64().unwrap();

    let (status, _) = call(&app, "GET", &format!("/parcels/{id}"), Some(farmer(other)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "GET", &format!("/parcels/{id}"), Some(staff()), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", "/parcels/999", Some(staff()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = call(&app, "GET", &format!("/farmers/{owner}/parcels"), Some(farmer(owner)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn carbon_project_and_issuance_flow() {
    let app = app();
    let owner = onboard(&app, "wanjiru@example.ke").await;
    let (_, parcel) = register(&app, owner, json!("12000")).await;

    let (status, project) = call(
        &app,
        "POST",
        "/carbon/projects",
        Some(farmer(owner)),
        Some(json!({
            "parcel": parcel["id"],
            "name": "Nyeri agroforestry",
            "methodology": "agroforestry",
            "start_date": "2026-03-01",
            "expected_credits_per_year": "12.5",
            "standard": "verra",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{project}");
    assert_eq!(project["status"], "draft");
    assert_eq!(project["expected_credits_per_year"], "12.50");
    let transitions = format!("/carbon/projects/{}/transitions", project["id"]);

    let (status, submitted) = call(&app, "POST", &transitions, Some(farmer(owner)), Some(json!({ "action": "submit" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "submitted");

    let (status, body) = call(&app, "POST", &transitions, Some(farmer(owner)), Some(json!({ "action": "submit" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "carbon registry error: Project already submitted");

    let (status, _) = call(&app, "POST", &transitions, Some(farmer(owner)), Some(json!({ "action": "start_review" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for action in ["start_review", "approve"] {
        let (status, _) = call(&app, "POST", &transitions, Some(staff()), Some(json!({ "action": action }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let issuance = json!({
        "project": project["id"],
        "issuance_date": "2026-09-30",
        "amount": "3.25",
        "batch_number": "SHB-2026-0001",
        "verification_report": "reports/2026-0001.pdf",
        "verification_body": "Verra",
        "verification_date": "2026-09-15",
    });
    let (status, created) = call(&app, "POST", "/carbon/issuances", Some(staff()), Some(issuance.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["amount"], "3.25");
    assert_eq!(created["status"], "pending");

    let (status, _) = call(&app, "POST", "/carbon/issuances", Some(staff()), Some(issuance)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let issue = format!("/carbon/issuances/{}/transitions", created["id"]);
    let (status, _) = call(&app, "POST", &issue, Some(staff()), Some(json!({ "action": "issue" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, issued) = call(
        &app,
        "POST",
        &issue,
        Some(staff()),
        Some(json!({ "action": "issue", "token_id": "0.0.7001", "transaction_id": "0.0.2@1700000000.1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(issued["status"], "issued");

    let (status, mine) = call(&app, "GET", "/carbon/issuances", Some(farmer(owner)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn server_drains_on_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = RpcServer::new(0, registry().0, false);
    let controller = ShutdownController::new();
    let stopped = controller.stopped();
    let task = tokio::spawn(async move { server.serve(listener, stopped).await });

    controller.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
