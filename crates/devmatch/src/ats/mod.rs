//! ATS integration module.
//!
//! Configured connections to applicant tracking systems, connection tests,
//! candidate sync and result export through an [`AtsConnector`].

mod connector;
mod error;
mod models;
mod service;

pub use connector::{AtsConnector, MIN_API_KEY_LEN, SimulatedConnector};
pub use error::{AtsError, AtsResult};
pub use models::{
    AtsProvider, ConnectionTestResult, CreateIntegrationRequest, ExportRecord, ExportRequest,
    ExportStatus, Integration, IntegrationListQuery, IntegrationStatus, SyncResult,
    UpdateIntegrationRequest, key_hint,
};
pub use service::{AtsService, AtsServiceConfig};
