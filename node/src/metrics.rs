//! Prometheus metrics for the registry.
//!
//! [`RegistryMetrics`] owns a dedicated [`Registry`] that the RPC
//! `/metrics` endpoint encodes into the Prometheus text format.

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RegistryMetrics {
    pub registry: Registry,

    /// Verification attempts by method and resulting request status.
    pub verification_attempts: IntCounterVec,
    /// Tokenization calls by result (`minted` or an error kind).
    pub tokenizations: IntCounterVec,
    pub onboardings: IntCounter,
    /// Ledger round-trip time by operation.
    pub ledger_call_seconds: HistogramVec,
}

impl RegistryMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let verification_attempts = register_int_counter_vec_with_registry!(
            Opts::new(
                "shamba_verification_attempts_total",
                "Verification attempts by method and outcome"
            ),
            &["method", "status"],
            registry
        )?;

        let tokenizations = register_int_counter_vec_with_registry!(
            Opts::new("shamba_tokenizations_total", "Tokenization requests by result"),
            &["result"],
            registry
        )?;

        let onboardings = register_int_counter_with_registry!(
            Opts::new("shamba_onboardings_total", "Farmers onboarded"),
            registry
        )?;

        // 5 ms to ~20 s.
        let ledger_call_seconds = register_histogram_vec_with_registry!(
            HistogramOpts::new("shamba_ledger_call_seconds", "Ledger call latency in seconds")
                .buckets(prometheus::exponential_buckets(0.005, 2.0, 12)?),
            &["operation"],
            registry
        )?;

        Ok(Self {
            registry,
            verification_attempts,
            tokenizations,
            onboardings,
            ledger_call_seconds,
        })
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
