//! Farmers, their ledger accounts, and the identity of whoever is acting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{FarmerId, ShambaError, Timestamp, Tinybars, UserId};

/// A registered farmer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub id: FarmerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub government_id_number: Option<String>,
    pub physical_address: String,
    pub country: String,
    pub region: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

impl FarmerProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The ledger account created for a farmer at onboarding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccountRecord {
    pub farmer: FarmerId,
    /// Ledger account identifier, e.g. `0.0.5005`.
    pub account_id: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    /// Hex-encoded sealed private key (nonce followed by ciphertext).
    pub sealed_private_key: String,
    pub did: String,
    /// JSON DID document.
    pub did_document: String,
    pub balance: Tinybars,
    pub last_balance_check: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// Role of the acting user, as asserted by the upstream auth gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    /// Elevated role: reviewers and platform operators.
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ShambaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Self::Farmer),
            "staff" => Ok(Self::Staff),
            _ => Err(ShambaError::UnknownVariant {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

/// Who is performing an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user: UserId,
    pub role: Role,
}

impl Requester {
    pub fn farmer(id: FarmerId) -> Self {
        Self {
            user: id.into(),
            role: Role::Farmer,
        }
    }

    pub fn staff(user: UserId) -> Self {
        Self {
            user,
            role: Role::Staff,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Owners act on their own records; staff act on anyone's.
    pub fn may_act_for(&self, owner: FarmerId) -> bool {
        self.is_staff() || self.user == UserId::from(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_and_staff_override() {
        let owner = FarmerId::new(4);
        assert!(Requester::farmer(owner).may_act_for(owner));
        assert!(!Requester::farmer(FarmerId::new(5)).may_act_for(owner));
        assert!(Requester::staff(UserId::new(99)).may_act_for(owner));
    }
}
