use crate::error::{Result, ServiceError};
use crate::forms::{CertUpdate, EndpointUpdatePayload};
use crate::models::{Endpoint, EndpointId, Group, UNASSIGNED_GROUP_ID};
use crate::services::{EndpointService, GroupService, ProgressSink};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TLS_CA_CERT_FILE: &str = "ca.pem";
const TLS_CERT_FILE: &str = "cert.pem";
const TLS_KEY_FILE: &str = "key.pem";

#[derive(Debug, Default, Serialize, Deserialize)]
struct EndpointsFile {
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GroupsFile {
    #[serde(default)]
    groups: Vec<Group>,
}

/// TOML-backed endpoint and group store. Certificate material uploaded
/// through an update is additionally materialized as PEM files under
/// `tls/<endpoint-id>/` so external tooling can point at them.
#[derive(Debug)]
pub struct EndpointStore {
    #[allow(dead_code)]
    data_dir: PathBuf,
    endpoints_file: PathBuf,
    groups_file: PathBuf,
    tls_dir: PathBuf,
}

impl EndpointStore {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or_else(|| {
                    ServiceError::Validation("could not determine config directory".to_string())
                })?
                .join("endr"),
        };

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)?;
        }

        let endpoints_file = data_dir.join("endpoints.toml");
        let groups_file = data_dir.join("groups.toml");
        let tls_dir = data_dir.join("tls");

        Ok(Self {
            data_dir,
            endpoints_file,
            groups_file,
            tls_dir,
        })
    }

    pub fn endpoints_path(&self) -> &Path {
        &self.endpoints_file
    }

    async fn load_endpoints(&self) -> Result<Vec<Endpoint>> {
        if !self.endpoints_file.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.endpoints_file).await?;
        let file: EndpointsFile =
            toml::from_str(&content).map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(file.endpoints)
    }

    async fn save_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<()> {
        let file = EndpointsFile { endpoints };
        let content =
            toml::to_string_pretty(&file).map_err(|e| ServiceError::Parse(e.to_string()))?;
        tokio::fs::write(&self.endpoints_file, content).await?;
        Ok(())
    }

    /// Write the replaced certificate material as PEM files, reporting one
    /// progress fraction per file written.
    async fn write_tls_files(
        &self,
        id: EndpointId,
        payload: &EndpointUpdatePayload,
        progress: &ProgressSink,
    ) -> Result<()> {
        let replacements: Vec<(&str, &String)> = [
            (TLS_CA_CERT_FILE, &payload.ca_cert),
            (TLS_CERT_FILE, &payload.cert),
            (TLS_KEY_FILE, &payload.key),
        ]
        .into_iter()
        .filter_map(|(name, update)| match update {
            CertUpdate::Replace(value) => Some((name, value)),
            CertUpdate::Keep => None,
        })
        .collect();

        if replacements.is_empty() {
            return Ok(());
        }

        let endpoint_dir = self.tls_dir.join(id.to_string());
        tokio::fs::create_dir_all(&endpoint_dir).await?;

        let total = replacements.len();
        for (written, (name, value)) in replacements.into_iter().enumerate() {
            tokio::fs::write(endpoint_dir.join(name), value).await?;
            progress((written + 1) as f32 / total as f32);
        }
        tracing::debug!("Wrote {} TLS file(s) for endpoint {}", total, id);
        Ok(())
    }

    async fn remove_tls_files(&self, id: EndpointId) {
        let endpoint_dir = self.tls_dir.join(id.to_string());
        if endpoint_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&endpoint_dir).await {
                tracing::warn!("Failed to remove TLS files for endpoint {}: {}", id, e);
            }
        }
    }
}

#[async_trait]
impl EndpointService for EndpointStore {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        self.load_endpoints().await
    }

    async fn endpoint(&self, id: EndpointId) -> Result<Endpoint> {
        self.load_endpoints()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(ServiceError::NotFound(id))
    }

    async fn update_endpoint(
        &self,
        id: EndpointId,
        payload: &EndpointUpdatePayload,
        progress: &ProgressSink,
    ) -> Result<Endpoint> {
        if payload.name.trim().is_empty() {
            return Err(ServiceError::Validation("name must not be empty".to_string()));
        }
        if payload.url.trim().is_empty() {
            return Err(ServiceError::Validation("URL must not be empty".to_string()));
        }

        let mut endpoints = self.load_endpoints().await?;
        let endpoint = endpoints
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ServiceError::NotFound(id))?;

        endpoint.name = payload.name.clone();
        endpoint.url = payload.url.clone();
        endpoint.public_url = payload.public_url.clone();
        endpoint.group_id = payload.group_id;
        endpoint.tls_config.tls = payload.tls;
        endpoint.tls_config.tls_skip_verify = payload.tls_skip_verify;
        endpoint.tls_config.tls_skip_client_verify = payload.tls_skip_client_verify;

        if let CertUpdate::Replace(value) = &payload.ca_cert {
            endpoint.tls_config.ca_cert = Some(value.clone());
        }
        if let CertUpdate::Replace(value) = &payload.cert {
            endpoint.tls_config.cert = Some(value.clone());
        }
        if let CertUpdate::Replace(value) = &payload.key {
            endpoint.tls_config.key = Some(value.clone());
        }

        let updated = endpoint.clone();

        if payload.tls {
            self.write_tls_files(id, payload, progress).await?;
        } else {
            self.remove_tls_files(id).await;
        }

        self.save_endpoints(endpoints).await?;
        tracing::info!("Updated endpoint {} ({})", id, updated.name);
        Ok(updated)
    }
}

#[async_trait]
impl GroupService for EndpointStore {
    async fn groups(&self) -> Result<Vec<Group>> {
        if !self.groups_file.exists() {
            // Seed the default group so the selector is never empty.
            let file = GroupsFile {
                groups: vec![Group {
                    id: UNASSIGNED_GROUP_ID,
                    name: "Unassigned".to_string(),
                }],
            };
            let content =
                toml::to_string_pretty(&file).map_err(|e| ServiceError::Parse(e.to_string()))?;
            tokio::fs::write(&self.groups_file, content).await?;
            return Ok(file.groups);
        }

        let content = tokio::fs::read_to_string(&self.groups_file).await?;
        let file: GroupsFile =
            toml::from_str(&content).map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(file.groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{SecurityFormData, TlsMode};
    use crate::models::EndpointKind;
    use std::sync::{Arc, Mutex};

    fn seed_store(dir: &Path) -> EndpointStore {
        let toml = r#"
[[endpoints]]
id = 1
name = "staging"
url = "https://10.0.0.5:2376"
public_url = "10.0.0.5"
group_id = 1

[endpoints.tls_config]
tls = true
tls_skip_verify = false
tls_skip_client_verify = false
ca_cert = "CA PEM"
cert = "CERT PEM"
key = "KEY PEM"
"#;
        std::fs::write(dir.join("endpoints.toml"), toml).unwrap();
        EndpointStore::new(Some(dir.to_path_buf())).unwrap()
    }

    fn payload_for(endpoint: &Endpoint, form: &SecurityFormData) -> EndpointUpdatePayload {
        form.build_payload(endpoint, endpoint.kind())
    }

    #[tokio::test]
    async fn fetches_seeded_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(dir.path());

        let endpoint = store.endpoint(1).await.unwrap();
        assert_eq!(endpoint.name, "staging");
        assert_eq!(endpoint.kind(), EndpointKind::Remote);
    }

    #[tokio::test]
    async fn missing_endpoint_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(dir.path());

        match store.endpoint(42).await {
            Err(ServiceError::NotFound(42)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|e| e.name)),
        }
    }

    #[tokio::test]
    async fn groups_are_seeded_with_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = EndpointStore::new(Some(dir.path().to_path_buf())).unwrap();

        let groups = store.groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, UNASSIGNED_GROUP_ID);
    }

    #[tokio::test]
    async fn update_replaces_changed_material_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(dir.path());
        let endpoint = store.endpoint(1).await.unwrap();

        let mut form = SecurityFormData::from_tls_config(&endpoint.tls_config);
        form.mode = TlsMode::Mutual;
        form.cert = "NEW CERT".to_string();
        form.key = "NEW KEY".to_string();

        let fractions = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let fractions = Arc::clone(&fractions);
            move |f: f32| fractions.lock().unwrap().push(f)
        };
        let updated = store
            .update_endpoint(1, &payload_for(&endpoint, &form), &sink)
            .await
            .unwrap();

        assert_eq!(updated.tls_config.cert.as_deref(), Some("NEW CERT"));
        // Unchanged CA material survives as stored.
        assert_eq!(updated.tls_config.ca_cert.as_deref(), Some("CA PEM"));

        assert_eq!(*fractions.lock().unwrap(), vec![0.5, 1.0]);

        let cert_path = dir.path().join("tls").join("1").join("cert.pem");
        assert_eq!(std::fs::read_to_string(cert_path).unwrap(), "NEW CERT");
        assert!(!dir.path().join("tls").join("1").join("ca.pem").exists());

        // The change is persisted, not just returned.
        let reloaded = store.endpoint(1).await.unwrap();
        assert_eq!(reloaded.tls_config.key.as_deref(), Some("NEW KEY"));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(dir.path());
        let mut endpoint = store.endpoint(1).await.unwrap();
        endpoint.name = String::new();

        let form = SecurityFormData::from_tls_config(&endpoint.tls_config);
        let result = store
            .update_endpoint(1, &payload_for(&endpoint, &form), &|_| {})
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        // Nothing was applied.
        assert_eq!(store.endpoint(1).await.unwrap().name, "staging");
    }

    #[tokio::test]
    async fn disabling_tls_removes_materialized_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(dir.path());
        let endpoint = store.endpoint(1).await.unwrap();

        // First upload something so the tls dir exists.
        let mut form = SecurityFormData::from_tls_config(&endpoint.tls_config);
        form.ca_cert = "NEW CA".to_string();
        store
            .update_endpoint(1, &payload_for(&endpoint, &form), &|_| {})
            .await
            .unwrap();
        assert!(dir.path().join("tls").join("1").exists());

        let endpoint = store.endpoint(1).await.unwrap();
        let mut form = SecurityFormData::from_tls_config(&endpoint.tls_config);
        form.tls = false;
        store
            .update_endpoint(1, &payload_for(&endpoint, &form), &|_| {})
            .await
            .unwrap();

        assert!(!dir.path().join("tls").join("1").exists());
        assert!(!store.endpoint(1).await.unwrap().tls_config.tls);
    }
}
