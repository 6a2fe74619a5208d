//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::{LmdbError, WriteBatch};

/// Number of named databases opened below.
const MAX_DBS: u32 = 20;

/// Wraps the LMDB environment and all database handles.
///
/// Every `shamba-store` trait is implemented directly on this type. Database
/// handles are `Copy`; the environment is reference-counted by heed, so
/// cloning is cheap.
#[derive(Clone)]
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) parcels_db: Database<Bytes, Bytes>,
    /// `farmer ++ parcel` → empty
    pub(crate) farmer_parcels_db: Database<Bytes, Bytes>,
    /// `parcel ++ request` → VerificationRequest
    pub(crate) requests_db: Database<Bytes, Bytes>,
    /// parcel → TokenSlot
    pub(crate) tokens_db: Database<Bytes, Bytes>,
    pub(crate) farmers_db: Database<Bytes, Bytes>,
    /// lowercased email → farmer id
    pub(crate) farmer_emails_db: Database<Bytes, Bytes>,
    pub(crate) ledger_accounts_db: Database<Bytes, Bytes>,
    pub(crate) projects_db: Database<Bytes, Bytes>,
    pub(crate) issuances_db: Database<Bytes, Bytes>,
    /// batch number → issuance id
    pub(crate) issuance_batches_db: Database<Bytes, Bytes>,
    pub(crate) practice_db: Database<Bytes, Bytes>,
    /// `project ++ practice verification` → empty
    pub(crate) project_practice_db: Database<Bytes, Bytes>,
    /// `practice verification ++ evidence` → VerificationEvidence
    pub(crate) evidence_db: Database<Bytes, Bytes>,
    pub(crate) sensor_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // never from a second `Env` handle concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let mut create = |name: &str| env.create_database::<Bytes, Bytes>(&mut wtxn, Some(name));
        let meta_db = create("meta")?;
        let parcels_db = create("parcels")?;
        let farmer_parcels_db = create("farmer_parcels")?;
        let requests_db = create("verification_requests")?;
        let tokens_db = create("land_tokens")?;
        let farmers_db = create("farmers")?;
        let farmer_emails_db = create("farmer_emails")?;
        let ledger_accounts_db = create("ledger_accounts")?;
        let projects_db = create("carbon_projects")?;
        let issuances_db = create("carbon_issuances")?;
        let issuance_batches_db = create("carbon_issuance_batches")?;
        let practice_db = create("practice_verifications")?;
        let project_practice_db = create("project_practice_verifications")?;
        let evidence_db = create("verification_evidence")?;
        let sensor_db = create("sensor_readings")?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env,
            meta_db,
            parcels_db,
            farmer_parcels_db,
            requests_db,
            tokens_db,
            farmers_db,
            farmer_emails_db,
            ledger_accounts_db,
            projects_db,
            issuances_db,
            issuance_batches_db,
            practice_db,
            project_practice_db,
            evidence_db,
            sensor_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Begin a write batch. Dropping it without `commit` rolls back.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, LmdbError> {
        WriteBatch::new(self)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Helper: open a temporary LMDB environment.
    pub(crate) fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("failed to open env");
        (dir, env)
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
            let mut batch = env.write_batch().unwrap();
            batch.put_raw(env.meta_db, b"schema_version", b"1").unwrap();
            batch.commit().unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let rtxn = env.env().read_txn().unwrap();
        assert_eq!(env.meta_db.get(&rtxn, b"schema_version").unwrap(), Some(&b"1"[..]));
    }
}
