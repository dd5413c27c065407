//! Failure diagnostics
//!
//! When a page action fails, a full-page screenshot and a small JSON record
//! (URL, title, error, timestamp, image hash) are written to the screenshot
//! directory under the name of the failing action. Capturing never changes
//! the outcome of the action being diagnosed.

use crate::error::{E2eError, Result};
use crate::ui::UiHandle;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Name of the failing action, also the file stem.
    pub context: String,
    pub error: String,
    pub url: Option<String>,
    pub title: Option<String>,
    /// RFC 3339 capture time.
    pub timestamp: String,
    pub screenshot_path: Option<String>,
    /// SHA-256 of the screenshot bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    dir: PathBuf,
}

impl Diagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn screenshot_path(&self, context: &str) -> PathBuf {
        self.dir.join(format!("{}.png", sanitize(context)))
    }

    pub fn record_path(&self, context: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(context)))
    }

    /// Save a screenshot named after `context`.
    pub async fn screenshot<U: UiHandle>(&self, ui: &U, context: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.screenshot_path(context);
        ui.screenshot(&path).await?;
        log::info!("Screenshot saved to: {}", path.display());
        Ok(path)
    }

    /// Progress screenshot that never fails the caller.
    pub async fn checkpoint<U: UiHandle>(&self, ui: &U, context: &str) -> Option<PathBuf> {
        match self.screenshot(ui, context).await {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Could not save {} screenshot: {}", context, e);
                None
            }
        }
    }

    /// Screenshot plus failure record. Errors are logged and swallowed.
    pub async fn capture_failure<U: UiHandle>(
        &self,
        ui: &U,
        context: &str,
        error: &E2eError,
    ) -> FailureRecord {
        log::error!("{} failed: {}", context, error);

        let (screenshot_path, screenshot_hash) = match self.screenshot(ui, context).await {
            Ok(path) => {
                let hash = match compute_file_hash(&path).await {
                    Ok(hash) => Some(hash),
                    Err(e) => {
                        log::warn!("Could not hash {}: {}", path.display(), e);
                        None
                    }
                };
                (Some(path.to_string_lossy().to_string()), hash)
            }
            Err(e) => {
                log::warn!("Could not save screenshot for {}: {}", context, e);
                (None, None)
            }
        };

        let record = FailureRecord {
            context: context.to_string(),
            error: error.to_string(),
            url: ui.current_url().await.ok(),
            title: ui.title().await.ok(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            screenshot_path,
            screenshot_hash,
        };

        if let Err(e) = self.write_record(&record).await {
            log::warn!("Could not write failure record for {}: {}", context, e);
        }
        record
    }

    /// Run `action`; on error capture diagnostics, then return the error
    /// untouched.
    pub async fn guard<U, T, F>(&self, ui: &U, context: &str, action: F) -> Result<T>
    where
        U: UiHandle,
        F: Future<Output = Result<T>>,
    {
        match action.await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.capture_failure(ui, context, &e).await;
                Err(e)
            }
        }
    }

    async fn write_record(&self, record: &FailureRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| E2eError::Other(format!("Failed to serialize failure record: {}", e)))?;
        tokio::fs::write(self.record_path(&record.context), json).await?;
        Ok(())
    }
}

fn sanitize(context: &str) -> String {
    context
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn compute_file_hash(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};

    let contents = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(format!("{:x}", hasher.finalize()))
}
