//! LMDB implementation of LandTokenStore.
//!
//! One slot per parcel. LMDB serialises writers, so reading the slot and
//! writing the reservation inside one write transaction is a true
//! compare-and-set.

use shamba_store::{LandTokenStore, StoreError, TokenSlot};
use shamba_types::{LandToken, ParcelId};

use crate::codec::get_record;
use crate::{LmdbEnvironment, LmdbError};

impl LandTokenStore for LmdbEnvironment {
    fn reserve_token(&self, parcel: ParcelId) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        if batch.contains(self.tokens_db, &parcel.to_key())? {
            return Err(StoreError::Duplicate(format!("land token for parcel {parcel}")));
        }
        batch.put(self.tokens_db, &parcel.to_key(), &TokenSlot::Reserved)?;
        batch.commit()?;
        Ok(())
    }

    fn complete_token(&self, token: &LandToken) -> Result<(), StoreError> {
        let key = token.parcel.to_key();
        let mut batch = self.write_batch()?;
        match batch.get::<TokenSlot>(self.tokens_db, &key)? {
            Some(TokenSlot::Reserved) => {}
            Some(TokenSlot::Minted(_)) => {
                return Err(StoreError::Duplicate(format!(
                    "land token for parcel {}",
                    token.parcel
                )))
            }
            None => {
                return Err(StoreError::NotFound(format!(
                    "token reservation for parcel {}",
                    token.parcel
                )))
            }
        }
        batch.put(self.tokens_db, &key, &TokenSlot::Minted(token.clone()))?;
        batch.commit()?;
        Ok(())
    }

    fn release_token_reservation(&self, parcel: ParcelId) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        if let Some(TokenSlot::Reserved) = batch.get::<TokenSlot>(self.tokens_db, &parcel.to_key())? {
            batch.delete(self.tokens_db, &parcel.to_key())?;
            batch.commit()?;
        }
        Ok(())
    }

    fn get_land_token(&self, parcel: ParcelId) -> Result<Option<LandToken>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(
            match get_record::<TokenSlot>(&self.tokens_db, &rtxn, &parcel.to_key())? {
                Some(TokenSlot::Minted(token)) => Some(token),
                _ => None,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::temp_env;
    use shamba_types::Timestamp;

    fn token(parcel: u64) -> LandToken {
        LandToken {
            parcel: ParcelId::new(parcel),
            token_id: "0.0.9001".into(),
            serial_number: 1,
            metadata: r#"{"title":"Land Parcel #1"}"#.into(),
            mint_transaction_id: "0.0.2@1700000000.000000001".into(),
            minted_at: Timestamp::new(1_700_000_000),
            is_active: true,
        }
    }

    #[test]
    fn reservation_is_exclusive() {
        let (_dir, env) = temp_env();
        let parcel = ParcelId::new(1);
        env.reserve_token(parcel).unwrap();
        assert!(env.reserve_token(parcel).unwrap_err().is_duplicate());
        assert!(env.get_land_token(parcel).unwrap().is_none());

        env.complete_token(&token(1)).unwrap();
        assert_eq!(env.get_land_token(parcel).unwrap(), Some(token(1)));
        assert!(env.reserve_token(parcel).unwrap_err().is_duplicate());
        assert!(env.complete_token(&token(1)).unwrap_err().is_duplicate());
    }

    #[test]
    fn release_frees_only_reservations() {
        let (_dir, env) = temp_env();
        env.reserve_token(ParcelId::new(1)).unwrap();
        env.release_token_reservation(ParcelId::new(1)).unwrap();
        env.reserve_token(ParcelId::new(1)).unwrap();
        env.complete_token(&token(1)).unwrap();

        env.release_token_reservation(ParcelId::new(1)).unwrap();
        assert!(env.get_land_token(ParcelId::new(1)).unwrap().is_some());
    }

    #[test]
    fn complete_without_reservation_fails() {
        let (_dir, env) = temp_env();
        assert!(env.complete_token(&token(2)).unwrap_err().is_not_found());
    }
}
