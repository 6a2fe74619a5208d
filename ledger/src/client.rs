//! HTTP client for an operator-authenticated ledger relay.
//!
//! Every request carries `x-operator-id` and `x-operator-signature`, the
//! latter being the hex Ed25519 signature over `METHOD path\nbody`.
//!
//! - `POST /accounts` `{public_key, initial_balance}` → `{account_id, status}`
//! - `POST /tokens` [`TokenCreateRequest`] → `{token_id, status}`
//! - `POST /tokens/{id}/mint` `{metadata: hex}` → [`MintReceipt`]
//! - `GET /accounts/{id}/balance` → `{balance}` in tinybars

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shamba_crypto::{sign_message, KeyPair, PublicKey};
use shamba_types::Tinybars;
use tracing::{debug, warn};

use crate::{LedgerError, LedgerGateway, MintReceipt, ReceiptStatus, TokenCreateRequest};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LedgerClientConfig {
    pub relay_url: String,
    pub operator_id: String,
    pub operator_key: KeyPair,
    pub timeout: Duration,
}

pub struct HttpLedgerClient {
    relay_url: String,
    operator_id: String,
    operator_key: KeyPair,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AccountCreated {
    account_id: String,
    status: ReceiptStatus,
}

#[derive(Debug, Deserialize)]
struct TokenCreated {
    token_id: String,
    status: ReceiptStatus,
}

#[derive(Debug, Deserialize)]
struct Balance {
    balance: u64,
}

#[derive(Serialize)]
struct MintBody {
    metadata: String,
}

fn transport_error(e: reqwest::Error) -> LedgerError {
    if e.is_timeout() {
        LedgerError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        LedgerError::Transport(format!("connection failed: {e}"))
    } else {
        LedgerError::Transport(e.to_string())
    }
}

/// Bytes the operator signs for a request.
pub(crate) fn signing_payload(method: &str, path: &str, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(method.len() + path.len() + body.len() + 2);
    payload.extend_from_slice(method.as_bytes());
    payload.push(b' ');
    payload.extend_from_slice(path.as_bytes());
    payload.push(b'\n');
    payload.extend_from_slice(body);
    payload
}

impl HttpLedgerClient {
    pub fn new(config: LedgerClientConfig) -> Result<Self, LedgerError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            relay_url: config.relay_url.trim_end_matches('/').to_string(),
            operator_id: config.operator_id,
            operator_key: config.operator_key,
            http_client,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, LedgerError> {
        let bytes = match &body {
            Some(value) => serde_json::to_vec(value)
                .map_err(|e| LedgerError::Decode(format!("failed to encode request: {e}")))?,
            None => Vec::new(),
        };
        let signature = sign_message(
            &signing_payload(method.as_str(), path, &bytes),
            &self.operator_key.private,
        );

        let url = format!("{}{}", self.relay_url, path);
        let mut request = self
            .http_client
            .request(method, &url)
            .header("x-operator-id", &self.operator_id)
            .header("x-operator-signature", signature.to_hex());
        if body.is_some() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), path, "ledger relay rejected request");
            return Err(LedgerError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(format!("failed to parse {path} response: {e}")))
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerClient {
    fn operator_account(&self) -> &str {
        &self.operator_id
    }

    fn operator_public_key(&self) -> String {
        self.operator_key.public.to_hex()
    }

    async fn create_account(
        &self,
        public_key: &PublicKey,
        initial_balance: Tinybars,
    ) -> Result<String, LedgerError> {
        let created: AccountCreated = self
            .send(
                reqwest::Method::POST,
                "/accounts",
                Some(json!({
                    "public_key": public_key.to_hex(),
                    "initial_balance": initial_balance.raw(),
                })),
            )
            .await?;
        if !created.status.is_success() {
            return Err(LedgerError::Receipt {
                operation: "create_account",
                status: created.status,
            });
        }
        debug!(account_id = %created.account_id, "ledger account created");
        Ok(created.account_id)
    }

    async fn create_token(&self, request: &TokenCreateRequest) -> Result<String, LedgerError> {
        let body = serde_json::to_value(request)
            .map_err(|e| LedgerError::Decode(format!("failed to encode token request: {e}")))?;
        let created: TokenCreated = self.send(reqwest::Method::POST, "/tokens", Some(body)).await?;
        if !created.status.is_success() {
            return Err(LedgerError::Receipt {
                operation: "create_token",
                status: created.status,
            });
        }
        Ok(created.token_id)
    }

    async fn mint(&self, token_id: &str, metadata: &[u8]) -> Result<MintReceipt, LedgerError> {
        let body = serde_json::to_value(MintBody {
            metadata: hex::encode(metadata),
        })
        .map_err(|e| LedgerError::Decode(format!("failed to encode mint request: {e}")))?;
        self.send(
            reqwest::Method::POST,
            &format!("/tokens/{token_id}/mint"),
            Some(body),
        )
        .await
    }

    async fn get_balance(&self, account_id: &str) -> Result<Tinybars, LedgerError> {
        let balance: Balance = self
            .send(
                reqwest::Method::GET,
                &format!("/accounts/{account_id}/balance"),
                None,
            )
            .await?;
        Ok(Tinybars::new(balance.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shamba_crypto::{keypair_from_seed, verify_signature, Signature};

    fn client(url: &str) -> HttpLedgerClient {
        HttpLedgerClient::new(LedgerClientConfig {
            relay_url: url.into(),
            operator_id: "0.0.2".into(),
            operator_key: keypair_from_seed(&[5u8; 32]),
            timeout: Duration::from_millis(500),
        })
        .unwrap()
    }

    #[test]
    fn signing_payload_layout() {
        assert_eq!(signing_payload("POST", "/tokens", b"{}"), b"POST /tokens\n{}".to_vec());
        let kp = keypair_from_seed(&[5u8; 32]);
        let sig: Signature = sign_message(&signing_payload("GET", "/x", b""), &kp.private);
        assert!(verify_signature(b"GET /x\n", &sig, &kp.public));
    }

    #[test]
    fn operator_identity() {
        let c = client("http://relay.local/");
        assert_eq!(c.operator_account(), "0.0.2");
        assert_eq!(c.operator_public_key(), keypair_from_seed(&[5u8; 32]).public.to_hex());
        assert_eq!(c.relay_url, "http://relay.local");
    }

    #[tokio::test]
    async fn unreachable_relay_is_transport_error() {
        let err = client("http://127.0.0.1:9").get_balance("0.0.5").await.unwrap_err();
        assert!(matches!(err, LedgerError::Transport(_)));
    }

    #[tokio::test]
    async fn silent_relay_is_bounded_by_the_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let held = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            client(&format!("http://{addr}")).get_balance("0.0.5"),
        )
        .await
        .expect("relay call outlived the client timeout")
        .unwrap_err();
        assert!(matches!(&err, LedgerError::Transport(m) if m.contains("timed out")));
        held.abort();
    }

    #[test]
    fn mint_receipt_defaults_serials() {
        let receipt: MintReceipt =
            serde_json::from_str(r#"{"transaction_id":"0.0.2@1.2","status":"SUCCESS"}"#).unwrap();
        assert!(receipt.status.is_success());
        assert!(receipt.serials.is_empty());
    }
}
