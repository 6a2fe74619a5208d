//! Ledger gateway wrapper that records call latency.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use prometheus::HistogramVec;
use shamba_crypto::PublicKey;
use shamba_ledger::{LedgerError, LedgerGateway, MintReceipt, TokenCreateRequest};
use shamba_types::Tinybars;

pub struct MeteredLedger {
    inner: Arc<dyn LedgerGateway>,
    latency: HistogramVec,
}

impl MeteredLedger {
    pub fn new(inner: Arc<dyn LedgerGateway>, latency: HistogramVec) -> Self {
        Self { inner, latency }
    }

    fn observe(&self, operation: &str, started: Instant) {
        self.latency
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());
    }
}

#[async_trait]
impl LedgerGateway for MeteredLedger {
    fn operator_account(&self) -> &str {
        self.inner.operator_account()
    }

    fn operator_public_key(&self) -> String {
        self.inner.operator_public_key()
    }

    async fn create_account(
        &self,
        public_key: &PublicKey,
        initial_balance: Tinybars,
    ) -> Result<String, LedgerError> {
        let started = Instant::now();
        let result = self.inner.create_account(public_key, initial_balance).await;
        self.observe("create_account", started);
        result
    }

    async fn create_token(&self, request: &TokenCreateRequest) -> Result<String, LedgerError> {
        let started = Instant::now();
        let result = self.inner.create_token(request).await;
        self.observe("create_token", started);
        result
    }

    async fn mint(&self, token_id: &str, metadata: &[u8]) -> Result<MintReceipt, LedgerError> {
        let started = Instant::now();
        let result = self.inner.mint(token_id, metadata).await;
        self.observe("mint", started);
        result
    }

    async fn get_balance(&self, account_id: &str) -> Result<Tinybars, LedgerError> {
        let started = Instant::now();
        let result = self.inner.get_balance(account_id).await;
        self.observe("get_balance", started);
        result
    }
}
