//! ATS integration service.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::connector::{AtsConnector, SimulatedConnector};
use super::error::{AtsError, AtsResult};
use super::models::{
    AtsProvider, ConnectionTestResult, CreateIntegrationRequest, ExportRecord, ExportRequest,
    ExportStatus, Integration, IntegrationListQuery, IntegrationStatus, SyncResult,
    UpdateIntegrationRequest, key_hint,
};

#[derive(Debug, Clone)]
pub struct AtsServiceConfig {
    /// Upper bound on candidates pulled by one sync.
    pub max_sync_batch: u64,
}

impl Default for AtsServiceConfig {
    fn default() -> Self {
        Self { max_sync_batch: 25 }
    }
}

#[derive(Clone)]
pub struct AtsService {
    integrations: Arc<DashMap<String, Integration>>,
    connector: Arc<dyn AtsConnector>,
    config: AtsServiceConfig,
}

impl AtsService {
    pub fn new(config: AtsServiceConfig) -> Self {
        Self::with_connector(Arc::new(SimulatedConnector), config)
    }

    pub fn with_connector(connector: Arc<dyn AtsConnector>, config: AtsServiceConfig) -> Self {
        Self {
            integrations: Arc::new(DashMap::new()),
            connector,
            config,
        }
    }

    #[instrument(skip(self, request), fields(provider = %request.provider))]
    pub fn create_integration(&self, request: CreateIntegrationRequest) -> AtsResult<Integration> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AtsError::Validation("name must not be empty".to_string()));
        }
        let api_key = request.api_key.trim();
        if api_key.is_empty() {
            return Err(AtsError::Validation("apiKey must not be empty".to_string()));
        }
        let base_url = request.base_url.filter(|u| !u.trim().is_empty());
        if request.provider == AtsProvider::Custom && base_url.is_none() {
            return Err(AtsError::Validation(
                "custom integrations require a baseUrl".to_string(),
            ));
        }

        let now = Utc::now();
        let integration = Integration {
            id: Uuid::new_v4().to_string(),
            provider: request.provider,
            name: name.to_string(),
            api_key: api_key.to_string(),
            api_key_hint: key_hint(api_key),
            base_url,
            status: IntegrationStatus::Disconnected,
            auto_sync: request.auto_sync,
            last_sync_at: None,
            last_tested_at: None,
            synced_candidates: 0,
            exports: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.integrations
            .insert(integration.id.clone(), integration.clone());
        info!(integration_id = %integration.id, "Created ATS integration");
        Ok(integration)
    }

    pub fn list_integrations(&self, query: &IntegrationListQuery) -> Vec<Integration> {
        let mut integrations: Vec<Integration> = self
            .integrations
            .iter()
            .filter(|e| query.provider.is_none_or(|p| e.value().provider == p))
            .map(|e| e.value().clone())
            .collect();
        integrations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        integrations
    }

    pub fn get_integration(&self, id: &str) -> AtsResult<Integration> {
        self.integrations
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| AtsError::NotFound(id.to_string()))
    }

    /// Apply changes. A new key or URL drops the integration back to
    /// `disconnected` until it is tested again.
    #[instrument(skip(self, request))]
    pub fn update_integration(
        &self,
        id: &str,
        request: UpdateIntegrationRequest,
    ) -> AtsResult<Integration> {
        if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AtsError::Validation("name must not be empty".to_string()));
        }
        if request
            .api_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            return Err(AtsError::Validation("apiKey must not be empty".to_string()));
        }

        self.mutate(id, |integration| {
            if integration.provider == AtsProvider::Custom
                && request.base_url.as_deref().is_some_and(|u| u.trim().is_empty())
            {
                return Err(AtsError::Validation(
                    "custom integrations require a baseUrl".to_string(),
                ));
            }
            if let Some(name) = request.name {
                integration.name = name.trim().to_string();
            }
            let mut credentials_changed = false;
            if let Some(key) = request.api_key {
                let key = key.trim().to_string();
                integration.api_key_hint = key_hint(&key);
                integration.api_key = key;
                credentials_changed = true;
            }
            if let Some(url) = request.base_url {
                integration.base_url = Some(url).filter(|u| !u.trim().is_empty());
                credentials_changed = true;
            }
            if let Some(auto_sync) = request.auto_sync {
                integration.auto_sync = auto_sync;
            }
            if credentials_changed {
                integration.status = IntegrationStatus::Disconnected;
            }
            integration.updated_at = Utc::now();
            Ok(integration.clone())
        })
    }

    #[instrument(skip(self))]
    pub fn delete_integration(&self, id: &str) -> AtsResult<()> {
        self.integrations
            .remove(id)
            .ok_or_else(|| AtsError::NotFound(id.to_string()))?;
        info!(integration_id = %id, "Deleted ATS integration");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn test_connection(&self, id: &str) -> AtsResult<ConnectionTestResult> {
        self.mutate(id, |integration| {
            let now = Utc::now();
            let outcome = self.connector.test_connection(integration);
            integration.last_tested_at = Some(now);
            integration.updated_at = now;
            let result = match outcome {
                Ok(()) => {
                    integration.status = IntegrationStatus::Connected;
                    info!(integration_id = %integration.id, "ATS connection verified");
                    ConnectionTestResult {
                        success: true,
                        message: format!("Connected to {}", integration.provider),
                        status: integration.status,
                    }
                }
                Err(reason) => {
                    integration.status = IntegrationStatus::Error;
                    warn!(integration_id = %integration.id, %reason, "ATS connection failed");
                    ConnectionTestResult {
                        success: false,
                        message: reason,
                        status: integration.status,
                    }
                }
            };
            Ok(result)
        })
    }

    #[instrument(skip(self))]
    pub fn sync(&self, id: &str) -> AtsResult<SyncResult> {
        self.mutate(id, |integration| {
            ensure_connected(integration)?;
            let synced = self
                .connector
                .sync_candidates(integration, self.config.max_sync_batch);
            let now = Utc::now();
            integration.synced_candidates += synced;
            integration.last_sync_at = Some(now);
            integration.updated_at = now;
            info!(integration_id = %integration.id, synced, "Synced candidates from ATS");
            Ok(SyncResult {
                integration_id: integration.id.clone(),
                synced_candidates: synced,
                total_synced: integration.synced_candidates,
                synced_at: now,
            })
        })
    }

    #[instrument(skip(self, request), fields(candidate_id = %request.candidate_id))]
    pub fn export_result(&self, id: &str, request: ExportRequest) -> AtsResult<ExportRecord> {
        if request.candidate_id.trim().is_empty() {
            return Err(AtsError::Validation(
                "candidateId must not be empty".to_string(),
            ));
        }
        self.mutate(id, |integration| {
            ensure_connected(integration)?;
            let delivered = self.connector.export_result(integration, &request);
            let now = Utc::now();
            let record = ExportRecord {
                id: Uuid::new_v4().to_string(),
                candidate_id: request.candidate_id,
                submission_id: request.submission_id,
                status: if delivered {
                    ExportStatus::Delivered
                } else {
                    ExportStatus::Failed
                },
                exported_at: now,
            };
            integration.exports.push(record.clone());
            integration.updated_at = now;
            Ok(record)
        })
    }

    pub fn list_exports(&self, id: &str) -> AtsResult<Vec<ExportRecord>> {
        Ok(self.get_integration(id)?.exports)
    }

    fn mutate<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Integration) -> AtsResult<T>,
    ) -> AtsResult<T> {
        match self.integrations.get_mut(id) {
            Some(mut entry) => f(entry.value_mut()),
            None => Err(AtsError::NotFound(id.to_string())),
        }
    }
}

fn ensure_connected(integration: &Integration) -> AtsResult<()> {
    if integration.status == IntegrationStatus::Connected {
        Ok(())
    } else {
        Err(AtsError::NotConnected(integration.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connector with fixed answers.
    struct StubConnector {
        accept: bool,
        batch: u64,
    }

    impl AtsConnector for StubConnector {
        fn test_connection(&self, _integration: &Integration) -> Result<(), String> {
            if self.accept {
                Ok(())
            } else {
                Err("bad credentials".to_string())
            }
        }

        fn sync_candidates(&self, _integration: &Integration, max_batch: u64) -> u64 {
            self.batch.min(max_batch)
        }

        fn export_result(&self, _integration: &Integration, _request: &ExportRequest) -> bool {
            self.accept
        }
    }

    fn create(svc: &AtsService, provider: AtsProvider, key: &str) -> Integration {
        svc.create_integration(CreateIntegrationRequest {
            provider,
            name: "Main ATS".to_string(),
            api_key: key.to_string(),
            base_url: None,
            auto_sync: false,
        })
        .unwrap()
    }

    #[test]
    fn test_api_key_never_serialized() {
        let svc = AtsService::new(AtsServiceConfig::default());
        let integration = create(&svc, AtsProvider::Greenhouse, "secret-key-9876");
        let json = serde_json::to_string(&integration).unwrap();
        assert!(!json.contains("secret-key-9876"));
        assert!(json.contains("****9876"));
    }

    #[test]
    fn test_custom_requires_base_url() {
        let svc = AtsService::new(AtsServiceConfig::default());
        let err = svc
            .create_integration(CreateIntegrationRequest {
                provider: AtsProvider::Custom,
                name: "In-house".to_string(),
                api_key: "0123456789".to_string(),
                base_url: None,
                auto_sync: false,
            })
            .unwrap_err();
        assert!(matches!(err, AtsError::Validation(_)));
    }

    #[test]
    fn test_custom_base_url_cannot_be_cleared() {
        let svc = AtsService::new(AtsServiceConfig::default());
        let integration = svc
            .create_integration(CreateIntegrationRequest {
                provider: AtsProvider::Custom,
                name: "In-house".to_string(),
                api_key: "0123456789".to_string(),
                base_url: Some("https://ats.internal.example".to_string()),
                auto_sync: false,
            })
            .unwrap();

        let err = svc
            .update_integration(
                &integration.id,
                UpdateIntegrationRequest {
                    base_url: Some("  ".to_string()),
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AtsError::Validation(_)));
        let current = svc.get_integration(&integration.id).unwrap();
        assert_eq!(
            current.base_url.as_deref(),
            Some("https://ats.internal.example")
        );
        assert_eq!(current.name, "In-house");

        let greenhouse = create(&svc, AtsProvider::Greenhouse, "secret-key-9876");
        let cleared = svc
            .update_integration(
                &greenhouse.id,
                UpdateIntegrationRequest {
                    base_url: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(cleared.base_url.is_none());
    }

    #[test]
    fn test_simulated_connection_checks_key_length() {
        let svc = AtsService::new(AtsServiceConfig::default());
        let short = create(&svc, AtsProvider::Lever, "short");
        let result = svc.test_connection(&short.id).unwrap();
        assert!(!result.success);
        assert_eq!(result.status, IntegrationStatus::Error);

        let good = create(&svc, AtsProvider::Lever, "long-enough-key");
        let result = svc.test_connection(&good.id).unwrap();
        assert!(result.success);
        assert_eq!(
            svc.get_integration(&good.id).unwrap().status,
            IntegrationStatus::Connected
        );
    }

    #[test]
    fn test_sync_requires_connection_and_accumulates() {
        let svc = AtsService::with_connector(
            Arc::new(StubConnector {
                accept: true,
                batch: 7,
            }),
            AtsServiceConfig::default(),
        );
        let integration = create(&svc, AtsProvider::Workday, "whatever-key");
        assert!(matches!(
            svc.sync(&integration.id).unwrap_err(),
            AtsError::NotConnected(_)
        ));

        svc.test_connection(&integration.id).unwrap();
        svc.sync(&integration.id).unwrap();
        let second = svc.sync(&integration.id).unwrap();
        assert_eq!(second.synced_candidates, 7);
        assert_eq!(second.total_synced, 14);
        assert!(svc.get_integration(&integration.id).unwrap().last_sync_at.is_some());
    }

    #[test]
    fn test_export_records_history() {
        let svc = AtsService::with_connector(
            Arc::new(StubConnector {
                accept: true,
                batch: 0,
            }),
            AtsServiceConfig::default(),
        );
        let integration = create(&svc, AtsProvider::Bamboohr, "whatever-key");
        svc.test_connection(&integration.id).unwrap();
        let record = svc
            .export_result(
                &integration.id,
                ExportRequest {
                    candidate_id: "cand-9".to_string(),
                    submission_id: Some("sub-1".to_string()),
                },
            )
            .unwrap();
        assert_eq!(record.status, ExportStatus::Delivered);
        let exports = svc.list_exports(&integration.id).unwrap();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].candidate_id, "cand-9");
    }

    #[test]
    fn test_key_change_requires_retest() {
        let svc = AtsService::with_connector(
            Arc::new(StubConnector {
                accept: true,
                batch: 0,
            }),
            AtsServiceConfig::default(),
        );
        let integration = create(&svc, AtsProvider::Greenhouse, "whatever-key");
        svc.test_connection(&integration.id).unwrap();
        let updated = svc
            .update_integration(
                &integration.id,
                UpdateIntegrationRequest {
                    api_key: Some("rotated-key-0001".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, IntegrationStatus::Disconnected);
        assert_eq!(updated.api_key_hint, "****0001");
    }

    #[test]
    fn test_delete_and_list() {
        let svc = AtsService::new(AtsServiceConfig::default());
        let a = create(&svc, AtsProvider::Greenhouse, "key-aaaaaaaa");
        create(&svc, AtsProvider::Lever, "key-bbbbbbbb");
        assert_eq!(
            svc.list_integrations(&IntegrationListQuery {
                provider: Some(AtsProvider::Lever)
            })
            .len(),
            1
        );
        svc.delete_integration(&a.id).unwrap();
        assert!(svc.get_integration(&a.id).is_err());
        assert_eq!(svc.list_integrations(&IntegrationListQuery::default()).len(), 1);
    }
}
