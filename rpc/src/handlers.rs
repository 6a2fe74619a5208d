//! RPC request bodies, response views and handlers.
//!
//! Areas and tonnages travel as decimal strings (`"12.50"`); request bodies
//! accept either a string or a JSON number for them.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shamba_carbon::{
    NewEvidence, NewIssuance, NewPracticeVerification, NewProject, NewSensorReading, ProjectAction,
};
use shamba_node::{NewFarmer, NewParcel, NodeError};
use shamba_tokenization::TokenResult;
use shamba_types::{
    CarbonCreditIssuance, CarbonCreditProject, CarbonStandard, Co2eTonnes, FarmerId, FarmerProfile,
    Hectares, IssuanceId, LandParcel, LandToken, LedgerAccountRecord, Methodology, ParcelId,
    PracticeVerification, PracticeVerificationId, ProjectId, SensorReading, ShambaError,
    Timestamp, Tinybars, VerificationEvidence, VerificationRequest,
};
use shamba_verification::Evidence;

use crate::{AppState, Identity, RpcError};

type JsonResult<T> = Result<Json<T>, RpcError>;
type Created<T> = Result<(StatusCode, Json<T>), RpcError>;

fn created<T>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

/// A decimal given either as text or as a JSON number.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Decimal {
    Text(String),
    Number(serde_json::Number),
}

impl Decimal {
    fn parse<T>(&self) -> Result<T, RpcError>
    where
        T: std::str::FromStr<Err = ShambaError>,
    {
        let text = match self {
            Decimal::Text(s) => s.clone(),
            Decimal::Number(n) => n.to_string(),
        };
        Ok(text.parse::<T>()?)
    }
}

fn hundredths(centi: u64) -> String {
    format!("{}.{:02}", centi / 100, centi % 100)
}

/// Serialize `record`, replacing hundredth-count fields with decimal text.
fn render<T: Serialize>(record: &T, decimals: &[(&str, u64)]) -> Result<Value, RpcError> {
    let mut value = serde_json::to_value(record).map_err(|e| RpcError::Server(e.to_string()))?;
    if let Value::Object(fields) = &mut value {
        for (name, centi) in decimals {
            fields.insert((*name).to_string(), Value::String(hundredths(*centi)));
        }
    }
    Ok(value)
}

fn parcel_view(parcel: &LandParcel) -> Result<Value, RpcError> {
    render(parcel, &[("total_area", parcel.total_area.centi())])
}

fn project_view(project: &CarbonCreditProject) -> Result<Value, RpcError> {
    render(
        project,
        &[("expected_credits_per_year", project.expected_credits_per_year.centi())],
    )
}

fn issuance_view(issuance: &CarbonCreditIssuance) -> Result<Value, RpcError> {
    render(issuance, &[("amount", issuance.amount.centi())])
}

fn views<T>(
    records: &[T],
    view: fn(&T) -> Result<Value, RpcError>,
) -> Result<Json<Vec<Value>>, RpcError> {
    records.iter().map(view).collect::<Result<_, _>>().map(Json)
}

// ── Service ──────────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, RpcError> {
    if !state.metrics_enabled {
        return Err(RpcError::MetricsDisabled);
    }
    let text = state
        .registry
        .metrics()
        .encode()
        .map_err(NodeError::from)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

// ── Farmers ──────────────────────────────────────────────────────────────

/// A ledger account without its sealed key.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub farmer: FarmerId,
    pub account_id: String,
    pub public_key: String,
    pub did: String,
    pub did_document: Value,
    pub balance: Tinybars,
    pub last_balance_check: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<LedgerAccountRecord> for AccountView {
    fn from(record: LedgerAccountRecord) -> Self {
        let did_document =
            serde_json::from_str(&record.did_document).unwrap_or(Value::String(record.did_document));
        Self {
            farmer: record.farmer,
            account_id: record.account_id,
            public_key: record.public_key,
            did: record.did,
            did_document,
            balance: record.balance,
            last_balance_check: record.last_balance_check,
            is_active: record.is_active,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OnboardedFarmer {
    pub farmer: FarmerProfile,
    pub account: AccountView,
}

pub async fn onboard_farmer(
    State(state): State<AppState>,
    Json(body): Json<NewFarmer>,
) -> Created<OnboardedFarmer> {
    let (farmer, account) = state.registry.onboard_farmer(body).await?;
    Ok(created(OnboardedFarmer {
        farmer,
        account: account.into(),
    }))
}

pub async fn farmer(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<FarmerId>,
) -> JsonResult<FarmerProfile> {
    Ok(Json(state.registry.farmer(id, &requester)?))
}

pub async fn ledger_account(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<FarmerId>,
) -> JsonResult<AccountView> {
    Ok(Json(state.registry.ledger_account(id, &requester)?.into()))
}

pub async fn refresh_balance(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<FarmerId>,
) -> JsonResult<AccountView> {
    Ok(Json(state.registry.refresh_balance(id, &requester).await?.into()))
}

// ── Parcels ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterParcelRequest {
    #[serde(default)]
    pub farmer: Option<FarmerId>,
    #[serde(default)]
    pub title_deed_number: Option<String>,
    pub total_area: Decimal,
    /// Either the JSON array itself or its text.
    pub gps_coordinates: Value,
    #[serde(default)]
    pub address: String,
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub document_hash: Option<String>,
}

impl RegisterParcelRequest {
    fn into_new_parcel(self) -> Result<NewParcel, RpcError> {
        let gps_coordinates = match self.gps_coordinates {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(NewParcel {
            farmer: self.farmer,
            title_deed_number: self.title_deed_number,
            total_area: self.total_area.parse::<Hectares>()?,
            gps_coordinates,
            address: self.address,
            country: self.country,
            region: self.region,
            document_hash: self.document_hash,
        })
    }
}

pub async fn register_parcel(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Json(body): Json<RegisterParcelRequest>,
) -> Created<Value> {
    let parcel = state
        .registry
        .register_parcel(&requester, body.into_new_parcel()?)?;
    Ok(created(parcel_view(&parcel)?))
}

pub async fn parcel(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ParcelId>,
) -> JsonResult<Value> {
    Ok(Json(parcel_view(&state.registry.parcel(id, &requester)?)?))
}

pub async fn farmer_parcels(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<FarmerId>,
) -> JsonResult<Vec<Value>> {
    views(&state.registry.parcels_for_farmer(id, &requester)?, parcel_view)
}

// ── Verification ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerificationRequestBody {
    pub method: String,
    #[serde(flatten)]
    pub evidence: Evidence,
}

/// A failed attempt is still a recorded attempt: the outcome travels in a
/// 201 body rather than as an error status.
pub async fn request_verification(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ParcelId>,
    Json(body): Json<VerificationRequestBody>,
) -> Created<Value> {
    let report = state
        .registry
        .request_verification(id, &requester, &body.method, &body.evidence)
        .await?;
    Ok(created(json!({
        "request": report.request,
        "outcome": report.outcome,
        "parcel": parcel_view(&report.parcel)?,
    })))
}

pub async fn verification_requests(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ParcelId>,
) -> JsonResult<Vec<VerificationRequest>> {
    Ok(Json(state.registry.verification_requests(id, &requester)?))
}

// ── Tokens ───────────────────────────────────────────────────────────────

pub async fn tokenize(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ParcelId>,
) -> Created<TokenResult> {
    Ok(created(state.registry.tokenize_land(id, &requester).await?))
}

pub async fn land_token(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ParcelId>,
) -> JsonResult<LandToken> {
    state
        .registry
        .land_token(id, &requester)?
        .map(Json)
        .ok_or_else(|| RpcError::NotFound(format!("land token for parcel {id}")))
}

// ── Carbon projects ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewProjectRequest {
    pub parcel: ParcelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub methodology: Methodology,
    pub start_date: NaiveDate,
    pub expected_credits_per_year: Decimal,
    pub standard: CarbonStandard,
}

pub async fn create_project(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Json(body): Json<NewProjectRequest>,
) -> Created<Value> {
    let new = NewProject {
        parcel: body.parcel,
        name: body.name,
        description: body.description,
        methodology: body.methodology,
        start_date: body.start_date,
        expected_credits_per_year: body.expected_credits_per_year.parse::<Co2eTonnes>()?,
        standard: body.standard,
    };
    let project = state.registry.carbon().create_project(&requester, new)?;
    Ok(created(project_view(&project)?))
}

pub async fn projects(
    State(state): State<AppState>,
    Identity(requester): Identity,
) -> JsonResult<Vec<Value>> {
    views(&state.registry.carbon().projects(&requester)?, project_view)
}

pub async fn project(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ProjectId>,
) -> JsonResult<Value> {
    Ok(Json(project_view(
        &state.registry.carbon().project(id, &requester)?,
    )?))
}

pub async fn parcel_projects(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ParcelId>,
) -> JsonResult<Vec<Value>> {
    views(
        &state.registry.carbon().parcel_projects(id, &requester)?,
        project_view,
    )
}

#[derive(Debug, Deserialize)]
pub struct ProjectTransitionRequest {
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
}

fn project_action(name: &str) -> Result<ProjectAction, RpcError> {
    match name {
        "submit" => Ok(ProjectAction::Submit),
        "start_review" => Ok(ProjectAction::StartReview),
        "approve" => Ok(ProjectAction::Approve),
        "reject" => Ok(ProjectAction::Reject),
        "suspend" => Ok(ProjectAction::Suspend),
        "reinstate" => Ok(ProjectAction::Reinstate),
        other => Err(RpcError::InvalidRequest(format!(
            "unknown project action: {other}"
        ))),
    }
}

pub async fn transition_project(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ProjectId>,
    Json(body): Json<ProjectTransitionRequest>,
) -> JsonResult<Value> {
    let action = project_action(body.action.trim())?;
    let project = state
        .registry
        .carbon()
        .transition_project(id, &requester, action, body.reason)?;
    Ok(Json(project_view(&project)?))
}

// ── Carbon issuances ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewIssuanceRequest {
    pub project: ProjectId,
    pub issuance_date: NaiveDate,
    pub amount: Decimal,
    pub batch_number: String,
    pub verification_report: String,
    pub verification_body: String,
    pub verification_date: NaiveDate,
}

pub async fn create_issuance(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Json(body): Json<NewIssuanceRequest>,
) -> Created<Value> {
    let new = NewIssuance {
        project: body.project,
        issuance_date: body.issuance_date,
        amount: body.amount.parse::<Co2eTonnes>()?,
        batch_number: body.batch_number,
        verification_report: body.verification_report,
        verification_body: body.verification_body,
        verification_date: body.verification_date,
    };
    let issuance = state.registry.carbon().create_issuance(&requester, new)?;
    Ok(created(issuance_view(&issuance)?))
}

pub async fn issuances(
    State(state): State<AppState>,
    Identity(requester): Identity,
) -> JsonResult<Vec<Value>> {
    views(&state.registry.carbon().issuances(&requester)?, issuance_view)
}

#[derive(Debug, Deserialize)]
pub struct IssuanceTransitionRequest {
    pub action: IssuanceActionName,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceActionName {
    Issue,
    Reject,
    Retire,
}

fn required(value: Option<String>, field: &str) -> Result<String, RpcError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RpcError::InvalidRequest(format!("{field} is required")))
}

pub async fn transition_issuance(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<IssuanceId>,
    Json(body): Json<IssuanceTransitionRequest>,
) -> JsonResult<Value> {
    let carbon = state.registry.carbon();
    let issuance = match body.action {
        IssuanceActionName::Issue => carbon.issue(
            id,
            &requester,
            required(body.token_id, "token_id")?,
            required(body.transaction_id, "transaction_id")?,
        )?,
        IssuanceActionName::Reject => carbon.reject_issuance(id, &requester)?,
        IssuanceActionName::Retire => carbon.retire(id, &requester, required(body.reason, "reason")?)?,
    };
    Ok(Json(issuance_view(&issuance)?))
}

// ── Practice verifications, evidence, sensors ────────────────────────────

pub async fn record_practice_verification(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Json(body): Json<NewPracticeVerification>,
) -> Created<PracticeVerification> {
    Ok(created(
        state
            .registry
            .carbon()
            .record_practice_verification(&requester, body)?,
    ))
}

pub async fn practice_verifications(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<ProjectId>,
) -> JsonResult<Vec<PracticeVerification>> {
    Ok(Json(
        state
            .registry
            .carbon()
            .practice_verifications(id, &requester)?,
    ))
}

pub async fn attach_evidence(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Json(body): Json<NewEvidence>,
) -> Created<VerificationEvidence> {
    Ok(created(
        state.registry.carbon().attach_evidence(&requester, body)?,
    ))
}

pub async fn evidence(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(id): Path<PracticeVerificationId>,
) -> JsonResult<Vec<VerificationEvidence>> {
    Ok(Json(state.registry.carbon().evidence(id, &requester)?))
}

pub async fn record_sensor_reading(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Json(body): Json<NewSensorReading>,
) -> Created<SensorReading> {
    Ok(created(
        state
            .registry
            .carbon()
            .record_sensor_reading(&requester, body)?,
    ))
}

pub async fn sensor_readings(
    State(state): State<AppState>,
    Identity(requester): Identity,
) -> JsonResult<Vec<SensorReading>> {
    Ok(Json(state.registry.carbon().sensor_readings(&requester)?))
}
