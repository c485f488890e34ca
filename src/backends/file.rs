//! File-backed configuration source and dashboard store

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::ResourceConfig;
use crate::config::read_resources_file;
use crate::dashboard::DashboardWidget;
use crate::error::{MonitorError, MonitorResult};

use super::backend::{ConfigSource, DashboardBackend};

/// Reads the resource list from a JSON document on every load
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> MonitorResult<Vec<ResourceConfig>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_resources_file(&path))
            .await
            .map_err(|e| MonitorError::ConfigUnavailable(format!("loader task failed: {e}")))?
    }
}

/// Writes each dashboard as `{dir}/{name}.json`
#[derive(Debug, Clone)]
pub struct FileDashboardBackend {
    dir: PathBuf,
}

impl FileDashboardBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn layout_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl DashboardBackend for FileDashboardBackend {
    #[instrument(skip(self, widgets), fields(widgets = widgets.len()))]
    async fn put_layout(&self, name: &str, widgets: &[DashboardWidget]) -> MonitorResult<()> {
        let body = serde_json::to_vec_pretty(&serde_json::json!({ "widgets": widgets }))?;
        let path = self.layout_path(name);

        let write = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, body).await?;
            Ok::<_, std::io::Error>(())
        };
        write
            .await
            .map_err(|e| MonitorError::backend("dashboard", format!("{}: {e}", path.display())))?;

        debug!("wrote dashboard layout to {}", path.display());
        Ok(())
    }
}
