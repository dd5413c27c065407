//! Run configuration resolved from the environment.
//!
//! A `.env` file in the working directory is honoured outside CI, so local
//! runs can keep credentials out of the shell history.

use crate::error::{E2eError, Result};
use std::path::PathBuf;

pub const USERNAME_VAR: &str = "SIRIUSXM_USERNAME";
pub const PASSWORD_VAR: &str = "SIRIUSXM_PASSWORD";
pub const HEADLESS_VAR: &str = "SIRIUSXM_HEADLESS";
pub const BASE_URL_VAR: &str = "SIRIUSXM_BASE_URL";
pub const SCREENSHOT_DIR_VAR: &str = "SIRIUSXM_SCREENSHOT_DIR";
pub const CHROME_PATH_VAR: &str = "CHROME_PATH";

pub const DEFAULT_BASE_URL: &str = "https://www.siriusxm.com";
pub const DEFAULT_SCREENSHOT_DIR: &str = "debug_screenshots";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Option<Credentials>,
    pub headless: bool,
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub chrome_path: Option<String>,
    /// CI runners typically need `--no-sandbox`.
    pub no_sandbox: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: None,
            headless: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            chrome_path: None,
            no_sandbox: false,
        }
    }
}

impl Settings {
    /// Load `.env` (unless `CI=true`) and read settings from the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        if std::env::var("CI").as_deref() != Ok("true") {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = match (var(USERNAME_VAR), var(PASSWORD_VAR)) {
            (Some(user), Some(pass)) => Some(Credentials::new(user, pass)),
            _ => None,
        };

        let headless = match var(HEADLESS_VAR) {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                E2eError::Config(format!("{} must be true or false, got '{}'", HEADLESS_VAR, v))
            })?,
            None => true,
        };

        let base_url = var(BASE_URL_VAR)
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let is_ci = ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "JENKINS_HOME", "CIRCLECI"]
            .iter()
            .any(|k| lookup(k).is_some());

        Ok(Self {
            credentials,
            headless,
            base_url,
            screenshot_dir: var(SCREENSHOT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCREENSHOT_DIR)),
            chrome_path: var(CHROME_PATH_VAR),
            no_sandbox: is_ci,
        })
    }

    /// Credentials, or a configuration error naming the missing variable.
    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            E2eError::Config(format!(
                "Missing env var: {} and {} must both be set",
                USERNAME_VAR, PASSWORD_VAR
            ))
        })
    }

    /// Absolute URL for a player path such as `/player/login`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
