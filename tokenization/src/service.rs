use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shamba_ledger::{
    LedgerError, LedgerGateway, TokenCreateRequest, TokenSupplyType, TokenType,
};
use shamba_store::{LandTokenStore, ParcelStore, StoreError};
use shamba_types::{LandParcel, LandToken, ParcelId, Requester, Timestamp};
use tracing::{error, info, warn};

use crate::{TokenMetadata, TokenizationError};

pub const TOKEN_SYMBOL: &str = "LAND";

/// Identifiers of a completed mint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResult {
    pub token_id: String,
    pub transaction_id: String,
    pub serial_number: u64,
    pub metadata: TokenMetadata,
}

pub struct TokenizationService<S: ?Sized> {
    store: Arc<S>,
    ledger: Arc<dyn LedgerGateway>,
}

impl<S> TokenizationService<S>
where
    S: ParcelStore + LandTokenStore + ?Sized,
{
    pub fn new(store: Arc<S>, ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { store, ledger }
    }

    /// Mint the parcel's land token.
    ///
    /// Preconditions are checked before any ledger call. The token slot is
    /// then reserved; a failed ledger step releases it again so the parcel
    /// can be retried, and a successful mint replaces it with the stored
    /// [`LandToken`].
    pub async fn tokenize_land(
        &self,
        parcel_id: ParcelId,
        requester: &Requester,
    ) -> Result<TokenResult, TokenizationError> {
        let parcel = self.store.get_parcel(parcel_id).map_err(|e| match e {
            StoreError::NotFound(_) => TokenizationError::ParcelNotFound(parcel_id),
            other => TokenizationError::Store(other),
        })?;
        if !requester.may_act_for(parcel.farmer) {
            return Err(TokenizationError::NotAuthorized(parcel_id));
        }
        if !parcel.is_verified() {
            return Err(TokenizationError::NotVerified {
                parcel: parcel_id,
                status: parcel.verification_status,
            });
        }
        if self.store.get_land_token(parcel_id)?.is_some() {
            return Err(TokenizationError::AlreadyTokenized(parcel_id));
        }

        let metadata = TokenMetadata::for_parcel(&parcel);
        let metadata_json = metadata.to_json()?;

        self.store.reserve_token(parcel_id).map_err(|e| match e {
            StoreError::Duplicate(_) => TokenizationError::AlreadyTokenized(parcel_id),
            other => TokenizationError::Store(other),
        })?;

        match self.mint(&parcel, &metadata_json).await {
            Ok(token) => {
                self.record(&token)?;
                info!(
                    parcel_id = %parcel_id,
                    token_id = %token.token_id,
                    serial = token.serial_number,
                    "land parcel tokenized"
                );
                Ok(TokenResult {
                    token_id: token.token_id,
                    transaction_id: token.mint_transaction_id,
                    serial_number: token.serial_number,
                    metadata,
                })
            }
            Err(e) => {
                warn!(parcel_id = %parcel_id, error = %e, "tokenization failed, releasing reservation");
                if let Err(release) = self.store.release_token_reservation(parcel_id) {
                    warn!(parcel_id = %parcel_id, error = %release, "could not release token reservation");
                }
                Err(e.into())
            }
        }
    }

    /// Store a minted token, retrying the write once. The token exists on
    /// the ledger by now, so a write that still fails hands its identity
    /// back to the caller instead of dropping it.
    fn record(&self, token: &LandToken) -> Result<(), TokenizationError> {
        let Err(first) = self.store.complete_token(token) else {
            return Ok(());
        };
        error!(
            parcel_id = %token.parcel,
            token_id = %token.token_id,
            transaction_id = %token.mint_transaction_id,
            serial = token.serial_number,
            error = %first,
            "minted land token could not be stored, retrying"
        );
        self.store.complete_token(token).map_err(|source| {
            error!(
                parcel_id = %token.parcel,
                token_id = %token.token_id,
                transaction_id = %token.mint_transaction_id,
                serial = token.serial_number,
                error = %source,
                "minted land token is not recorded"
            );
            TokenizationError::Unrecorded {
                parcel: token.parcel,
                token_id: token.token_id.clone(),
                transaction_id: token.mint_transaction_id.clone(),
                serial_number: token.serial_number,
                source,
            }
        })
    }

    pub fn land_token(&self, parcel_id: ParcelId) -> Result<Option<LandToken>, TokenizationError> {
        Ok(self.store.get_land_token(parcel_id)?)
    }

    async fn mint(&self, parcel: &LandParcel, metadata_json: &str) -> Result<LandToken, LedgerError> {
        let operator_key = self.ledger.operator_public_key();
        let request = TokenCreateRequest {
            name: format!("LAND-{}", parcel.id),
            symbol: TOKEN_SYMBOL.to_string(),
            token_type: TokenType::NonFungibleUnique,
            supply_type: TokenSupplyType::Infinite,
            decimals: 0,
            initial_supply: 0,
            treasury_account: self.ledger.operator_account().to_string(),
            admin_key: operator_key.clone(),
            supply_key: operator_key,
        };
        let token_id = self.ledger.create_token(&request).await?;

        let receipt = self.ledger.mint(&token_id, metadata_json.as_bytes()).await?;
        if !receipt.status.is_success() {
            return Err(LedgerError::Receipt {
                operation: "mint",
                status: receipt.status,
            });
        }

        Ok(LandToken {
            parcel: parcel.id,
            token_id,
            serial_number: receipt.serials.first().copied().unwrap_or(1),
            metadata: metadata_json.to_string(),
            mint_transaction_id: receipt.transaction_id,
            minted_at: Timestamp::now(),
            is_active: true,
        })
    }
}
