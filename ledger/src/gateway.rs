//! The ledger seam and its request/receipt shapes.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shamba_crypto::PublicKey;
use shamba_types::Tinybars;

use crate::LedgerError;

/// Receipt status as reported by the ledger, e.g. `SUCCESS` or
/// `INSUFFICIENT_PAYER_BALANCE`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptStatus(pub String);

impl ReceiptStatus {
    pub fn success() -> Self {
        Self("SUCCESS".to_string())
    }

    pub fn is_success(&self) -> bool {
        self.0 == "SUCCESS"
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenSupplyType {
    Infinite,
    Finite,
}

/// A token-class creation request. Keys are hex Ed25519 public keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCreateRequest {
    pub name: String,
    pub symbol: String,
    pub token_type: TokenType,
    pub supply_type: TokenSupplyType,
    pub decimals: u32,
    pub initial_supply: u64,
    pub treasury_account: String,
    pub admin_key: String,
    pub supply_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub transaction_id: String,
    pub status: ReceiptStatus,
    /// Serial numbers assigned to the minted units.
    #[serde(default)]
    pub serials: Vec<u64>,
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Account that holds treasury, admin and supply authority for every
    /// token class the registry creates.
    fn operator_account(&self) -> &str;

    /// Hex public key of the operator, used as admin and supply key.
    fn operator_public_key(&self) -> String;

    /// Create an account owned by `public_key`, funded from the operator.
    async fn create_account(
        &self,
        public_key: &PublicKey,
        initial_balance: Tinybars,
    ) -> Result<String, LedgerError>;

    /// Create a token class, returning its id.
    async fn create_token(&self, request: &TokenCreateRequest) -> Result<String, LedgerError>;

    /// Mint one unit carrying `metadata`. A receipt is returned whatever its
    /// status; callers decide what a non-success receipt means.
    async fn mint(&self, token_id: &str, metadata: &[u8]) -> Result<MintReceipt, LedgerError>;

    async fn get_balance(&self, account_id: &str) -> Result<Tinybars, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_status_success() {
        assert!(ReceiptStatus::success().is_success());
        assert!(!ReceiptStatus("INVALID_SIGNATURE".into()).is_success());
    }

    #[test]
    fn token_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokenType::NonFungibleUnique).unwrap(),
            "\"NON_FUNGIBLE_UNIQUE\""
        );
    }
}
