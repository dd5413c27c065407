// spider_chrome re-exports chromiumoxide API
use super::page::ChromePage;
use crate::config::Settings;
use crate::error::{E2eError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide_fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};

const CHROME_NOT_FOUND_HELP: &str = "Chrome not found. You can:\n\
     - Install Chrome: https://www.google.com/chrome/\n\
     - Ubuntu/Debian: sudo apt install chromium-browser\n\
     - Fedora: sudo dnf install chromium\n\
     - macOS: brew install --cask google-chrome\n\
     - Or specify path: CHROME_PATH=/path/to/chrome\n\
     - Linux sandbox issue? Run with CI=true to add --no-sandbox";

pub struct ChromeDriver {
    browser: Browser,
    temp_dir: Option<PathBuf>,
}

/// Connection mode for Chrome browser
pub enum ConnectionMode {
    /// Sandboxed mode - launches Chrome using system installation
    Sandboxed {
        chrome_path: Option<String>,
        no_sandbox: bool,
        headless: bool,
    },
    /// Advanced mode - connects to existing Chrome on debug port
    DebugPort(u16),
}

impl ConnectionMode {
    /// Launch mode described by the run settings.
    pub fn from_settings(settings: &Settings) -> Self {
        ConnectionMode::Sandboxed {
            chrome_path: settings.chrome_path.clone(),
            no_sandbox: settings.no_sandbox,
            headless: settings.headless,
        }
    }
}

impl ChromeDriver {
    /// Launch Chrome according to the run settings
    pub async fn launch(settings: &Settings) -> Result<Self> {
        Self::new(ConnectionMode::from_settings(settings)).await
    }

    /// Launch headless Chrome with no-sandbox, the way the test suite runs it
    pub async fn launch_headless() -> Result<Self> {
        Self::new(ConnectionMode::Sandboxed {
            chrome_path: None,
            no_sandbox: true,
            headless: true,
        })
        .await
    }

    /// Create new ChromeDriver with specified connection mode
    pub async fn new(mode: ConnectionMode) -> Result<Self> {
        let (browser, temp_dir) = match mode {
            ConnectionMode::Sandboxed {
                chrome_path,
                no_sandbox,
                headless,
            } => {
                // Unique profile per browser so parallel scenarios never share state
                let unique_id = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos();
                let temp_dir = std::env::temp_dir().join(format!("siriusxm-e2e-{}", unique_id));
                std::fs::create_dir_all(&temp_dir).map_err(|e| {
                    E2eError::LaunchFailed(format!("Failed to create temp directory: {}", e))
                })?;

                let mut config = if headless {
                    BrowserConfig::builder()
                } else {
                    BrowserConfig::builder().with_head()
                };

                config = config
                    .user_data_dir(&temp_dir)
                    .window_size(1440, 900)
                    .arg("--autoplay-policy=no-user-gesture-required");

                if no_sandbox {
                    config = config.arg("--no-sandbox");
                }

                if let Some(path) = chrome_path {
                    config = config.chrome_executable(path);
                } else {
                    match Self::ensure_chrome_installed().await {
                        Ok(path) => {
                            config = config.chrome_executable(path);
                        }
                        Err(e) => {
                            // Let chromiumoxide look for a system Chrome instead
                            log::warn!("Auto-download failed ({}), trying system Chrome...", e);
                        }
                    }
                }

                let config = config
                    .build()
                    .map_err(|e| E2eError::LaunchFailed(format!("{}. \n\n{}", e, CHROME_NOT_FOUND_HELP)))?;

                let (browser, mut handler) = Browser::launch(config)
                    .await
                    .map_err(|e| E2eError::LaunchFailed(format!("{}. \n\n{}", e, CHROME_NOT_FOUND_HELP)))?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Handle browser events
                    }
                });

                log::info!(
                    "Chrome launched ({})",
                    if headless { "headless" } else { "headed" }
                );
                (browser, Some(temp_dir))
            }
            ConnectionMode::DebugPort(port) => {
                let url = format!("http://localhost:{}", port);
                let (browser, mut handler) = Browser::connect(&url).await.map_err(|e| {
                    E2eError::ConnectionFailed(format!(
                        "Failed to connect to Chrome on port {}. \
                             Make sure Chrome is running with --remote-debugging-port={}: {}",
                        port, port, e
                    ))
                })?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Handle browser events
                    }
                });

                log::info!("Connected to Chrome on port {}", port);
                (browser, None)
            }
        };

        Ok(Self { browser, temp_dir })
    }

    /// A fresh tab, for scenarios that must not inherit another's state.
    pub async fn new_page(&self) -> Result<ChromePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::Other(format!("Failed to create page: {}", e)))?;
        Ok(ChromePage::new(page))
    }

    /// Check if the browser is still alive and responsive
    pub async fn is_alive(&self) -> bool {
        match self.browser.pages().await {
            Ok(pages) => {
                if let Some(page) = pages.first() {
                    matches!(
                        tokio::time::timeout(tokio::time::Duration::from_secs(2), page.url()).await,
                        Ok(Ok(_))
                    )
                } else {
                    true
                }
            }
            Err(_) => false,
        }
    }

    /// Close the browser connection
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| E2eError::Other(e.to_string()))?;
        Ok(())
    }

    /// Ensure Chrome is installed, downloading if necessary
    async fn ensure_chrome_installed() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| E2eError::Other("Cannot determine cache directory".to_string()))?
            .join("siriusxm-e2e")
            .join("chrome");

        tokio::fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| E2eError::Other(format!("Failed to create cache dir: {}", e)))?;

        let revision_info_path = cache_dir.join(".downloaded");
        if revision_info_path.exists() {
            if let Some(executable) = Self::find_chrome_in_cache(&cache_dir).await {
                return Ok(executable);
            }
        }

        log::info!("Downloading Chrome for Testing (first time only, ~150MB)...");
        let fetcher = BrowserFetcher::new(
            BrowserFetcherOptions::builder()
                .with_path(&cache_dir)
                .build()
                .map_err(|e| E2eError::Other(format!("Fetcher config failed: {}", e)))?,
        );

        let info = fetcher
            .fetch()
            .await
            .map_err(|e| E2eError::Other(format!("Chrome download failed: {}", e)))?;

        tokio::fs::write(&revision_info_path, "downloaded")
            .await
            .map_err(|e| E2eError::Other(format!("Failed to write marker: {}", e)))?;

        log::info!("Chrome downloaded to {}", info.executable_path.display());

        Ok(info.executable_path)
    }

    /// Find Chrome executable in cache directory
    async fn find_chrome_in_cache(cache_dir: &Path) -> Option<PathBuf> {
        let possible_paths = [
            cache_dir.join("chrome"),
            cache_dir.join("chrome.exe"),
            cache_dir.join("Google Chrome.app/Contents/MacOS/Google Chrome"),
            cache_dir.join("chrome-linux/chrome"),
            cache_dir.join("chrome-mac/Chromium.app/Contents/MacOS/Chromium"),
            cache_dir.join("chrome-win/chrome.exe"),
        ];

        possible_paths.into_iter().find(|path| path.exists())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.exists() {
                let _ = std::fs::remove_dir_all(temp_dir);
            }
        }
    }
}
