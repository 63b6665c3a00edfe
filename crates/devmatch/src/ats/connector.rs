//! Vendor connectors.
//!
//! Real vendor APIs are not called; the simulated connector accepts any
//! plausible key and reports a random batch of candidates on sync.

use rand::Rng;

use super::models::{AtsProvider, ExportRequest, Integration};

/// Minimum key length the simulated vendors accept.
pub const MIN_API_KEY_LEN: usize = 8;

pub trait AtsConnector: Send + Sync {
    /// Verify credentials. `Err` carries a human-readable reason.
    fn test_connection(&self, integration: &Integration) -> Result<(), String>;

    /// Pull candidates from the vendor, returning how many were synced.
    fn sync_candidates(&self, integration: &Integration, max_batch: u64) -> u64;

    /// Push a candidate's result. Returns whether the vendor accepted it.
    fn export_result(&self, integration: &Integration, request: &ExportRequest) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedConnector;

impl AtsConnector for SimulatedConnector {
    fn test_connection(&self, integration: &Integration) -> Result<(), String> {
        if integration.api_key.chars().count() < MIN_API_KEY_LEN {
            return Err(format!(
                "{} rejected the API key",
                integration.provider
            ));
        }
        if integration.provider == AtsProvider::Custom
            && !integration
                .base_url
                .as_deref()
                .is_some_and(|url| url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err("custom integrations need an http(s) base URL".to_string());
        }
        Ok(())
    }

    fn sync_candidates(&self, _integration: &Integration, max_batch: u64) -> u64 {
        rand::rng().random_range(0..=max_batch)
    }

    fn export_result(&self, _integration: &Integration, _request: &ExportRequest) -> bool {
        true
    }
}
