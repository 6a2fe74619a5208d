//! Farmer onboarding: profile validation, a funded ledger account, a DID
//! and the account key sealed at rest.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shamba_crypto::{generate_keypair, KeyVault};
use shamba_ledger::LedgerGateway;
use shamba_store::{FarmerStore, StoreError};
use shamba_types::{
    FarmerId, FarmerProfile, LedgerAccountRecord, Requester, ShambaError, Timestamp, Tinybars,
};
use tracing::{info, warn};

use crate::NodeError;

/// Profile fields supplied by a farmer signing up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFarmer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub government_id_number: Option<String>,
    #[serde(default)]
    pub physical_address: String,
    pub country: String,
    #[serde(default)]
    pub region: String,
}

impl NewFarmer {
    fn validate(&self) -> Result<(), ShambaError> {
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
            .unwrap_or(false);
        if !valid_email {
            return Err(invalid("email", format!("{email:?} is not an email address")));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(invalid("name", "first and last name are required"));
        }
        if self.country.trim().is_empty() {
            return Err(invalid("country", "must not be empty"));
        }
        if let Some(id) = &self.government_id_number {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("government_id_number", "must be alphanumeric"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ShambaError {
    ShambaError::InvalidField {
        field,
        reason: reason.into(),
    }
}

/// `did:hedera:<network>:<account>`.
pub fn farmer_did(network: &str, account_id: &str) -> String {
    format!("did:hedera:{network}:{account_id}")
}

pub struct OnboardingService<S: ?Sized> {
    store: Arc<S>,
    ledger: Arc<dyn LedgerGateway>,
    vault: KeyVault,
    network: String,
    initial_balance: Tinybars,
}

impl<S> OnboardingService<S>
where
    S: FarmerStore + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        ledger: Arc<dyn LedgerGateway>,
        vault: KeyVault,
        network: impl Into<String>,
        initial_balance: Tinybars,
    ) -> Self {
        Self {
            store,
            ledger,
            vault,
            network: network.into(),
            initial_balance,
        }
    }

    /// Register a farmer together with a freshly funded ledger account.
    ///
    /// The email is checked before the ledger is called so a duplicate
    /// signup never creates an orphaned account.
    pub async fn onboard(
        &self,
        new: NewFarmer,
    ) -> Result<(FarmerProfile, LedgerAccountRecord), NodeError> {
        new.validate()?;
        let email = new.email.trim().to_lowercase();
        if self.store.find_farmer_by_email(&email)?.is_some() {
            return Err(NodeError::AlreadyExists(format!("email {email}")));
        }

        let keys = generate_keypair();
        let account_id = self
            .ledger
            .create_account(&keys.public, self.initial_balance)
            .await?;
        let sealed_private_key = self.vault.seal_private_key(&keys.private)?;

        let now = Timestamp::now();
        let did = farmer_did(&self.network, &account_id);
        let did_document = json!({
            "id": did,
            "type": "FarmerIdentity",
            "owner": account_id,
            "created": now.to_rfc3339(),
        })
        .to_string();

        let farmer = FarmerProfile {
            id: self.store.next_farmer_id()?,
            email,
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            phone_number: new.phone_number.trim().to_string(),
            date_of_birth: new.date_of_birth,
            government_id_number: new.government_id_number,
            physical_address: new.physical_address,
            country: new.country.trim().to_string(),
            region: new.region.trim().to_string(),
            is_verified: false,
            created_at: now,
        };
        let account = LedgerAccountRecord {
            farmer: farmer.id,
            account_id,
            public_key: keys.public.to_hex(),
            sealed_private_key,
            did,
            did_document,
            balance: self.initial_balance,
            last_balance_check: Some(now),
            is_active: true,
            created_at: now,
        };

        if let Err(e) = self.store.put_farmer_with_account(&farmer, &account) {
            warn!(
                account_id = %account.account_id,
                error = %e,
                "ledger account created but farmer could not be stored"
            );
            return Err(match e {
                StoreError::Duplicate(_) => NodeError::AlreadyExists(format!("email {}", farmer.email)),
                other => other.into(),
            });
        }

        info!(farmer_id = %farmer.id, account_id = %account.account_id, "farmer onboarded");
        Ok((farmer, account))
    }

    pub fn farmer(&self, id: FarmerId, requester: &Requester) -> Result<FarmerProfile, NodeError> {
        if !requester.may_act_for(id) {
            return Err(NodeError::NotAuthorized("view this farmer"));
        }
        self.store.get_farmer(id).map_err(|e| match e {
            StoreError::NotFound(_) => NodeError::NotFound(format!("farmer {id}")),
            other => other.into(),
        })
    }

    pub fn ledger_account(
        &self,
        farmer: FarmerId,
        requester: &Requester,
    ) -> Result<LedgerAccountRecord, NodeError> {
        if !requester.may_act_for(farmer) {
            return Err(NodeError::NotAuthorized("view this ledger account"));
        }
        self.store
            .get_ledger_account(farmer)?
            .ok_or_else(|| NodeError::NotFound(format!("ledger account of farmer {farmer}")))
    }

    /// Query the ledger for the account balance and store it.
    pub async fn refresh_balance(
        &self,
        farmer: FarmerId,
        requester: &Requester,
    ) -> Result<LedgerAccountRecord, NodeError> {
        let mut account = self.ledger_account(farmer, requester)?;
        account.balance = self.ledger.get_balance(&account.account_id).await?;
        account.last_balance_check = Some(Timestamp::now());
        self.store.put_ledger_account(&account)?;
        Ok(account)
    }
}
