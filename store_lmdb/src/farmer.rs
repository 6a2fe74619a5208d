//! LMDB implementation of FarmerStore.

use shamba_store::{FarmerStore, StoreError};
use shamba_types::{FarmerId, FarmerProfile, LedgerAccountRecord};

use crate::codec::{get_record, read_u64};
use crate::{LmdbEnvironment, LmdbError};

fn email_key(email: &str) -> Vec<u8> {
    email.trim().to_lowercase().into_bytes()
}

impl FarmerStore for LmdbEnvironment {
    fn put_farmer_with_account(
        &self,
        farmer: &FarmerProfile,
        account: &LedgerAccountRecord,
    ) -> Result<(), StoreError> {
        let email = email_key(&farmer.email);
        let mut batch = self.write_batch()?;
        if batch.contains(self.farmer_emails_db, &email)? {
            return Err(StoreError::Duplicate(format!("farmer email {}", farmer.email)));
        }
        if batch.contains(self.farmers_db, &farmer.id.to_key())? {
            return Err(StoreError::Duplicate(format!("farmer {}", farmer.id)));
        }
        batch.put(self.farmers_db, &farmer.id.to_key(), farmer)?;
        batch.put_raw(self.farmer_emails_db, &email, &farmer.id.to_key())?;
        batch.put(self.ledger_accounts_db, &account.farmer.to_key(), account)?;
        batch.commit()?;
        Ok(())
    }

    fn get_farmer(&self, id: FarmerId) -> Result<FarmerProfile, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        get_record(&self.farmers_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(format!("farmer {id}")))
    }

    fn find_farmer_by_email(&self, email: &str) -> Result<Option<FarmerProfile>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let Some(id) = self
            .farmer_emails_db
            .get(&rtxn, &email_key(email))
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let id = read_u64(id)?;
        Ok(get_record(&self.farmers_db, &rtxn, &id.to_be_bytes())?)
    }

    fn get_ledger_account(
        &self,
        farmer: FarmerId,
    ) -> Result<Option<LedgerAccountRecord>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(get_record(&self.ledger_accounts_db, &rtxn, &farmer.to_key())?)
    }

    fn put_ledger_account(&self, account: &LedgerAccountRecord) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        if !batch.contains(self.farmers_db, &account.farmer.to_key())? {
            return Err(StoreError::NotFound(format!("farmer {}", account.farmer)));
        }
        batch.put(self.ledger_accounts_db, &account.farmer.to_key(), account)?;
        batch.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::temp_env;
    use shamba_types::{Timestamp, Tinybars};

    fn farmer(id: u64, email: &str) -> FarmerProfile {
        FarmerProfile {
            id: FarmerId::new(id),
            email: email.into(),
            first_name: "Wanjiru".into(),
            last_name: "Kamau".into(),
            phone_number: "+254700000000".into(),
            date_of_birth: None,
            government_id_number: Some("A1234567".into()),
            physical_address: "Limuru".into(),
            country: "Kenya".into(),
            region: "Kiambu".into(),
            is_verified: false,
            created_at: Timestamp::new(1_700_000_000),
        }
    }

    fn account(farmer: u64) -> LedgerAccountRecord {
        LedgerAccountRecord {
            farmer: FarmerId::new(farmer),
            account_id: format!("0.0.{}", 5000 + farmer),
            public_key: "ab".repeat(32),
            sealed_private_key: "cd".repeat(60),
            did: format!("did:hedera:testnet:0.0.{}", 5000 + farmer),
            did_document: "{}".into(),
            balance: Tinybars::new(100_000_000),
            last_balance_check: None,
            is_active: true,
            created_at: Timestamp::new(1_700_000_000),
        }
    }

    #[test]
    fn farmer_and_account_are_stored_together() {
        let (_dir, env) = temp_env();
        env.put_farmer_with_account(&farmer(1, "w@example.com"), &account(1))
            .unwrap();

        assert_eq!(env.get_farmer(FarmerId::new(1)).unwrap().email, "w@example.com");
        assert_eq!(
            env.find_farmer_by_email("W@Example.com").unwrap().map(|f| f.id),
            Some(FarmerId::new(1))
        );
        assert_eq!(
            env.get_ledger_account(FarmerId::new(1)).unwrap().unwrap().account_id,
            "0.0.5001"
        );
    }

    #[test]
    fn duplicate_email_writes_nothing() {
        let (_dir, env) = temp_env();
        env.put_farmer_with_account(&farmer(1, "w@example.com"), &account(1))
            .unwrap();
        let err = env
            .put_farmer_with_account(&farmer(2, "w@example.com"), &account(2))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert!(env.get_farmer(FarmerId::new(2)).unwrap_err().is_not_found());
        assert!(env.get_ledger_account(FarmerId::new(2)).unwrap().is_none());
    }

    #[test]
    fn balance_refresh_overwrites_account() {
        let (_dir, env) = temp_env();
        env.put_farmer_with_account(&farmer(1, "w@example.com"), &account(1))
            .unwrap();
        let mut updated = account(1);
        updated.balance = Tinybars::new(42);
        updated.last_balance_check = Some(Timestamp::new(1_700_000_500));
        env.put_ledger_account(&updated).unwrap();
        assert_eq!(
            env.get_ledger_account(FarmerId::new(1)).unwrap().unwrap().balance,
            Tinybars::new(42)
        );
        assert!(env.put_ledger_account(&account(3)).unwrap_err().is_not_found());
    }
}
