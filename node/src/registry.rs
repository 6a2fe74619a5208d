//! The registry facade used by the RPC layer.
//!
//! [`LandRegistry`] owns one instance of every service, wired to the same
//! store and gateways, and adds the per-request bookkeeping (metrics,
//! parcel registration) that does not belong to any single service.

use std::sync::Arc;

use shamba_carbon::CarbonRegistry;
use shamba_crypto::KeyVault;
use shamba_geometry::parse_polygon_json;
use shamba_imagery::{ImageryCredentials, ImageryProvider};
use shamba_ledger::LedgerGateway;
use shamba_store::{RegistryStore, StoreError};
use shamba_tokenization::{TokenResult, TokenizationError, TokenizationService};
use shamba_types::{
    FarmerId, FarmerProfile, Hectares, LandParcel, LandToken, LedgerAccountRecord, ParcelId,
    Requester, ShambaError, Timestamp, Tinybars, VerificationRequest, VerificationStatus,
};
use shamba_verification::{
    Evidence, GpsStrategy, SatelliteStrategy, StrategySet, SurveyStrategy,
    VerificationCoordinator, VerificationPolicy, VerificationReport,
};
use tracing::info;

use crate::metered::MeteredLedger;
use crate::onboarding::{NewFarmer, OnboardingService};
use crate::{NodeConfig, NodeError, RegistryMetrics};

/// Everything a [`LandRegistry`] needs besides its store and gateways.
pub struct RegistrySettings {
    pub policy: VerificationPolicy,
    pub imagery_credentials: ImageryCredentials,
    pub resolution_meters: u32,
    pub vault: KeyVault,
    pub network: String,
    pub initial_account_balance: Tinybars,
}

impl RegistrySettings {
    pub fn from_config(config: &NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        Ok(Self {
            policy: config.verification_policy(),
            imagery_credentials: config.imagery_credentials(),
            resolution_meters: config.imagery.resolution_meters,
            vault: config.key_vault()?,
            network: config.ledger.network.clone(),
            initial_account_balance: config.initial_account_balance(),
        })
    }
}

/// A parcel claim as submitted by a farmer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewParcel {
    /// Staff registering on a farmer's behalf name the farmer here;
    /// farmers always register for themselves.
    pub farmer: Option<FarmerId>,
    pub title_deed_number: Option<String>,
    pub total_area: Hectares,
    /// JSON array of `[longitude, latitude]` pairs.
    pub gps_coordinates: String,
    pub address: String,
    pub country: String,
    pub region: String,
    pub document_hash: Option<String>,
}

pub struct LandRegistry {
    store: Arc<dyn RegistryStore>,
    verification: VerificationCoordinator<dyn RegistryStore>,
    tokenization: TokenizationService<dyn RegistryStore>,
    onboarding: OnboardingService<dyn RegistryStore>,
    carbon: CarbonRegistry<dyn RegistryStore>,
    metrics: Arc<RegistryMetrics>,
}

impl LandRegistry {
    pub fn new(
        store: Arc<dyn RegistryStore>,
        ledger: Arc<dyn LedgerGateway>,
        imagery: Arc<dyn ImageryProvider>,
        settings: RegistrySettings,
    ) -> Result<Self, NodeError> {
        let metrics = Arc::new(RegistryMetrics::new()?);
        let ledger: Arc<dyn LedgerGateway> = Arc::new(MeteredLedger::new(
            ledger,
            metrics.ledger_call_seconds.clone(),
        ));

        let strategies = StrategySet {
            satellite: SatelliteStrategy::new(
                imagery,
                settings.imagery_credentials,
                settings.resolution_meters,
            ),
            gps: GpsStrategy::new(settings.policy.gps_tolerance),
            survey: SurveyStrategy,
        };

        Ok(Self {
            verification: VerificationCoordinator::new(store.clone(), strategies, settings.policy),
            tokenization: TokenizationService::new(store.clone(), ledger.clone()),
            onboarding: OnboardingService::new(
                store.clone(),
                ledger,
                settings.vault,
                settings.network,
                settings.initial_account_balance,
            ),
            carbon: CarbonRegistry::new(store.clone()),
            store,
            metrics,
        })
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    pub fn carbon(&self) -> &CarbonRegistry<dyn RegistryStore> {
        &self.carbon
    }

    pub fn policy(&self) -> &VerificationPolicy {
        self.verification.policy()
    }

    // Farmers

    pub async fn onboard_farmer(
        &self,
        new: NewFarmer,
    ) -> Result<(FarmerProfile, LedgerAccountRecord), NodeError> {
        let onboarded = self.onboarding.onboard(new).await?;
        self.metrics.onboardings.inc();
        Ok(onboarded)
    }

    pub fn farmer(&self, id: FarmerId, requester: &Requester) -> Result<FarmerProfile, NodeError> {
        self.onboarding.farmer(id, requester)
    }

    pub fn ledger_account(
        &self,
        farmer: FarmerId,
        requester: &Requester,
    ) -> Result<LedgerAccountRecord, NodeError> {
        self.onboarding.ledger_account(farmer, requester)
    }

    pub async fn refresh_balance(
        &self,
        farmer: FarmerId,
        requester: &Requester,
    ) -> Result<LedgerAccountRecord, NodeError> {
        self.onboarding.refresh_balance(farmer, requester).await
    }

    // Parcels

    /// Record a new parcel claim. Verification fields always start empty.
    pub fn register_parcel(
        &self,
        requester: &Requester,
        new: NewParcel,
    ) -> Result<LandParcel, NodeError> {
        let farmer = match (requester.is_staff(), new.farmer) {
            (true, Some(farmer)) => farmer,
            (true, None) => {
                return Err(ShambaError::InvalidField {
                    field: "farmer",
                    reason: "staff must name the farmer the parcel belongs to".into(),
                }
                .into())
            }
            (false, _) => FarmerId::new(requester.user.get()),
        };
        if !requester.may_act_for(farmer) {
            return Err(NodeError::NotAuthorized("register parcels for this farmer"));
        }
        self.store.get_farmer(farmer).map_err(|e| match e {
            StoreError::NotFound(_) => NodeError::NotFound(format!("farmer {farmer}")),
            other => other.into(),
        })?;

        if new.total_area.is_zero() {
            return Err(ShambaError::InvalidArea("declared area must be positive".into()).into());
        }
        parse_polygon_json(&new.gps_coordinates)?;
        if new.country.trim().is_empty() {
            return Err(ShambaError::InvalidField {
                field: "country",
                reason: "must not be empty".into(),
            }
            .into());
        }

        let now = Timestamp::now();
        let parcel = LandParcel {
            id: self.store.next_parcel_id()?,
            farmer,
            title_deed_number: new
                .title_deed_number
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            total_area: new.total_area,
            gps_coordinates: new.gps_coordinates,
            address: new.address,
            country: new.country.trim().to_string(),
            region: new.region.trim().to_string(),
            verification_status: VerificationStatus::Unverified,
            verification_method: None,
            verified_by: None,
            verification_date: None,
            document_hash: new.document_hash,
            created_at: now,
            updated_at: now,
        };
        self.store.put_parcel(&parcel)?;
        info!(parcel_id = %parcel.id, farmer_id = %farmer, area = %parcel.total_area, "parcel registered");
        Ok(parcel)
    }

    pub fn parcel(&self, id: ParcelId, requester: &Requester) -> Result<LandParcel, NodeError> {
        let parcel = self.store.get_parcel(id).map_err(|e| match e {
            StoreError::NotFound(_) => NodeError::NotFound(format!("parcel {id}")),
            other => other.into(),
        })?;
        if !requester.may_act_for(parcel.farmer) {
            return Err(NodeError::NotAuthorized("view this parcel"));
        }
        Ok(parcel)
    }

    pub fn parcels_for_farmer(
        &self,
        farmer: FarmerId,
        requester: &Requester,
    ) -> Result<Vec<LandParcel>, NodeError> {
        if !requester.may_act_for(farmer) {
            return Err(NodeError::NotAuthorized("list this farmer's parcels"));
        }
        Ok(self.store.parcels_for_farmer(farmer)?)
    }

    // Verification

    /// Parse `method` and run one verification attempt.
    pub async fn request_verification(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
        method: &str,
        evidence: &Evidence,
    ) -> Result<VerificationReport, NodeError> {
        let parsed = shamba_verification::parse_method(method);
        let result = match parsed {
            Ok(method) => {
                self.verification
                    .request_verification(parcel_id, requester, method, evidence)
                    .await
            }
            Err(e) => Err(e),
        };
        let status = match &result {
            Ok(report) => report.request.status.as_str(),
            Err(_) => "error",
        };
        let method_label = match &result {
            Ok(report) => report.request.method.as_str(),
            Err(_) => "unknown",
        };
        self.metrics
            .verification_attempts
            .with_label_values(&[method_label, status])
            .inc();
        Ok(result?)
    }

    pub fn verification_requests(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
    ) -> Result<Vec<VerificationRequest>, NodeError> {
        Ok(self.verification.requests_for_parcel(parcel_id, requester)?)
    }

    // Tokenization

    pub async fn tokenize_land(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
    ) -> Result<TokenResult, NodeError> {
        let result = self.tokenization.tokenize_land(parcel_id, requester).await;
        let label = match &result {
            Ok(_) => "minted",
            Err(TokenizationError::AlreadyTokenized(_)) => "already_tokenized",
            Err(TokenizationError::NotVerified { .. }) => "not_verified",
            Err(TokenizationError::Ledger(_)) => "ledger_error",
            Err(TokenizationError::Unrecorded { .. }) => "unrecorded",
            Err(_) => "error",
        };
        self.metrics.tokenizations.with_label_values(&[label]).inc();
        Ok(result?)
    }

    pub fn land_token(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
    ) -> Result<Option<LandToken>, NodeError> {
        self.parcel(parcel_id, requester)?;
        Ok(self.tokenization.land_token(parcel_id)?)
    }
}
