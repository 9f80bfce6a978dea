//! [`ControlSurface`] over the daemon's REST API.

use super::api::{
    Connections, DeviceEntry, DeviceStats, FolderEntry, FolderStatus, PendingDevice, SystemStatus,
};
use super::ControlSurface;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Default base URL of the local daemon's REST API.
pub const DEFAULT_API_URL: &str = "http://localhost:8384";

/// REST client for the local daemon.
#[derive(Debug, Clone)]
pub struct RestControl {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestControl {
    /// Client for `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ControlSurface for RestControl {
    async fn system_status(&self) -> Result<SystemStatus> {
        self.get("/rest/system/status", &[]).await
    }

    async fn device_configs(&self) -> Result<Vec<DeviceEntry>> {
        self.get("/rest/config/devices", &[]).await
    }

    async fn folder_configs(&self) -> Result<Vec<FolderEntry>> {
        self.get("/rest/config/folders", &[]).await
    }

    async fn connections(&self) -> Result<Connections> {
        self.get("/rest/system/connections", &[]).await
    }

    async fn device_stats(&self) -> Result<HashMap<String, DeviceStats>> {
        self.get("/rest/stats/device", &[]).await
    }

    async fn pending_devices(&self) -> Result<HashMap<String, PendingDevice>> {
        self.get("/rest/cluster/pending/devices", &[]).await
    }

    async fn folder_status(&self, folder_id: &str) -> Result<FolderStatus> {
        self.get("/rest/db/status", &[("folder", folder_id)]).await
    }
}
