//! [`DaemonConfig`] over the `syncthing cli` command.

use super::DaemonConfig;
use crate::command::Program;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use std::path::Path;

/// The daemon's command-line interface.
#[derive(Debug, Clone)]
pub struct SyncthingCli {
    program: Program,
}

impl SyncthingCli {
    /// Use the given `syncthing` binary.
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    async fn cli(&self, args: &[&str]) -> Result<Vec<String>> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("cli");
        full.extend_from_slice(args);
        Ok(self.program.exec_ok(&full).await?.lines())
    }

    /// The GUI API key from the daemon's own configuration.
    pub async fn api_key(&self) -> Result<String> {
        self.cli(&["config", "gui", "apikey", "get"])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::InvalidResponse("empty API key".to_string()))
    }
}

#[async_trait]
impl DaemonConfig for SyncthingCli {
    async fn local_device_id(&self) -> Result<String> {
        // Newer releases use a subcommand, older ones a flag.
        let output = match self.program.exec_ok(&["device-id"]).await {
            Ok(out) => out,
            Err(_) => self.program.exec_ok(&["--device-id"]).await?,
        };
        output
            .lines()
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::InvalidResponse("empty device id".to_string()))
    }

    async fn list_devices(&self) -> Result<Vec<String>> {
        self.cli(&["config", "devices", "list"]).await
    }

    async fn add_device(&self, device_id: &str, name: Option<&str>) -> Result<()> {
        let mut args = vec!["config", "devices", "add", "--device-id", device_id];
        if let Some(name) = name {
            args.extend(["--name", name]);
        }
        self.cli(&args).await.map(|_| ())
    }

    async fn set_device_address(&self, device_id: &str, address: &str) -> Result<()> {
        self.cli(&["config", "devices", device_id, "addresses", "set", address])
            .await
            .map(|_| ())
    }

    async fn list_folders(&self) -> Result<Vec<String>> {
        self.cli(&["config", "folders", "list"]).await
    }

    async fn folder_devices(&self, folder_id: &str) -> Result<Vec<String>> {
        self.cli(&["config", "folders", folder_id, "devices", "list"])
            .await
    }

    async fn add_device_to_folder(&self, folder_id: &str, device_id: &str) -> Result<()> {
        self.cli(&[
            "config",
            "folders",
            folder_id,
            "devices",
            "add",
            "--device-id",
            device_id,
        ])
        .await
        .map(|_| ())
    }

    async fn add_folder(&self, folder_id: &str, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.cli(&["config", "folders", "add", "--id", folder_id, "--path", &path])
            .await?;
        self.cli(&["config", "folders", folder_id, "type", "set", "sendreceive"])
            .await
            .map(|_| ())
    }
}
