use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("verification error: {0}")]
    Verification(#[from] shamba_verification::VerificationError),

    #[error("tokenization error: {0}")]
    Tokenization(#[from] shamba_tokenization::TokenizationError),

    #[error("carbon registry error: {0}")]
    Carbon(#[from] shamba_carbon::CarbonError),

    #[error("ledger error: {0}")]
    Ledger(#[from] shamba_ledger::LedgerError),

    #[error("imagery error: {0}")]
    Imagery(#[from] shamba_imagery::ImageryError),

    #[error("store error: {0}")]
    Store(#[from] shamba_store::StoreError),

    #[error("storage backend error: {0}")]
    Lmdb(#[from] shamba_store_lmdb::LmdbError),

    #[error("key handling error: {0}")]
    Crypto(#[from] shamba_crypto::CryptoError),

    #[error("{0}")]
    Invalid(#[from] shamba_types::ShambaError),

    #[error("invalid geometry: {0}")]
    Geometry(#[from] shamba_geometry::GeometryError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("requester is not allowed to {0}")]
    NotAuthorized(&'static str),

    #[error("{0} is already registered")]
    AlreadyExists(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
