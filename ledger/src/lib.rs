//! Distributed-ledger gateway.
//!
//! The registry needs four things from the ledger: create a funded account
//! for a new farmer, create a token class for a parcel, mint one unit of it
//! carrying metadata, and read balances. [`LedgerGateway`] is that seam;
//! [`HttpLedgerClient`] speaks to an operator-authenticated ledger relay.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{HttpLedgerClient, LedgerClientConfig};
pub use error::LedgerError;
pub use gateway::{
    LedgerGateway, MintReceipt, ReceiptStatus, TokenCreateRequest, TokenSupplyType, TokenType,
};
