//! Nullable ledger: deterministic ids, call counters, injectable failures.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use shamba_crypto::PublicKey;
use shamba_ledger::{
    LedgerError, LedgerGateway, MintReceipt, ReceiptStatus, TokenCreateRequest,
};
use shamba_types::Tinybars;

pub const NULL_OPERATOR_ACCOUNT: &str = "0.0.2";

#[derive(Default)]
struct State {
    next_entity: u64,
    balances: HashMap<String, Tinybars>,
    tokens: Vec<TokenCreateRequest>,
    minted: Vec<(String, Vec<u8>)>,
    create_account_calls: usize,
    create_token_calls: usize,
    mint_calls: usize,
    balance_calls: usize,
    mint_receipt_status: Option<ReceiptStatus>,
    create_token_failure: Option<LedgerError>,
    create_account_failure: Option<LedgerError>,
}

impl State {
    fn next_entity_id(&mut self) -> String {
        self.next_entity += 1;
        format!("0.0.{}", 1000 + self.next_entity)
    }
}

/// An in-memory ledger.
///
/// Accounts start with their requested balance, token ids are `0.0.1001`,
/// `0.0.1002`, ... and each mint of a token gets the next serial.
#[derive(Default)]
pub struct NullLedger {
    state: Mutex<State>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every mint return a receipt with `status` instead of SUCCESS.
    pub fn fail_mint_with(&self, status: &str) {
        self.state.lock().unwrap().mint_receipt_status = Some(ReceiptStatus(status.to_string()));
    }

    pub fn fail_create_token(&self, error: LedgerError) {
        self.state.lock().unwrap().create_token_failure = Some(error);
    }

    pub fn fail_create_account(&self, error: LedgerError) {
        self.state.lock().unwrap().create_account_failure = Some(error);
    }

    pub fn set_balance(&self, account_id: &str, balance: Tinybars) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(account_id.to_string(), balance);
    }

    pub fn create_account_calls(&self) -> usize {
        self.state.lock().unwrap().create_account_calls
    }

    pub fn create_token_calls(&self) -> usize {
        self.state.lock().unwrap().create_token_calls
    }

    pub fn mint_calls(&self) -> usize {
        self.state.lock().unwrap().mint_calls
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.create_account_calls + state.create_token_calls + state.mint_calls + state.balance_calls
    }

    pub fn created_tokens(&self) -> Vec<TokenCreateRequest> {
        self.state.lock().unwrap().tokens.clone()
    }

    /// `(token_id, metadata)` of every successful mint.
    pub fn minted(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().unwrap().minted.clone()
    }
}

#[async_trait]
impl LedgerGateway for NullLedger {
    fn operator_account(&self) -> &str {
        NULL_OPERATOR_ACCOUNT
    }

    fn operator_public_key(&self) -> String {
        "00".repeat(32)
    }

    async fn create_account(
        &self,
        _public_key: &PublicKey,
        initial_balance: Tinybars,
    ) -> Result<String, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.create_account_calls += 1;
        if let Some(e) = &state.create_account_failure {
            return Err(e.clone());
        }
        let id = state.next_entity_id();
        state.balances.insert(id.clone(), initial_balance);
        Ok(id)
    }

    async fn create_token(&self, request: &TokenCreateRequest) -> Result<String, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.create_token_calls += 1;
        if let Some(e) = &state.create_token_failure {
            return Err(e.clone());
        }
        state.tokens.push(request.clone());
        Ok(state.next_entity_id())
    }

    async fn mint(&self, token_id: &str, metadata: &[u8]) -> Result<MintReceipt, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.mint_calls += 1;
        let transaction_id = format!("{NULL_OPERATOR_ACCOUNT}@1700000000.{:09}", state.mint_calls);
        if let Some(status) = state.mint_receipt_status.clone() {
            return Ok(MintReceipt {
                transaction_id,
                status,
                serials: Vec::new(),
            });
        }
        state.minted.push((token_id.to_string(), metadata.to_vec()));
        let serial = state.minted.iter().filter(|(t, _)| t == token_id).count() as u64;
        Ok(MintReceipt {
            transaction_id,
            status: ReceiptStatus::success(),
            serials: vec![serial],
        })
    }

    async fn get_balance(&self, account_id: &str) -> Result<Tinybars, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.balance_calls += 1;
        state
            .balances
            .get(account_id)
            .copied()
            .ok_or_else(|| LedgerError::Provider {
                status: 404,
                message: format!("account {account_id} not found"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_crypto::keypair_from_seed;

    #[tokio::test]
    async fn mints_get_sequential_serials() {
        let ledger = NullLedger::new();
        let a = ledger.mint("0.0.1001", b"a").await.unwrap();
        let b = ledger.mint("0.0.1001", b"b").await.unwrap();
        assert_eq!((a.serials, b.serials), (vec![1], vec![2]));
        assert_eq!(ledger.mint_calls(), 2);
    }

    #[tokio::test]
    async fn accounts_hold_initial_balance() {
        let ledger = NullLedger::new();
        let key = keypair_from_seed(&[1u8; 32]).public;
        let id = ledger.create_account(&key, Tinybars::from_hbar(1)).await.unwrap();
        assert_eq!(ledger.get_balance(&id).await.unwrap(), Tinybars::from_hbar(1));
        assert!(ledger.get_balance("0.0.9").await.is_err());
    }
}
