//! Login flow: email, auth-method modal, password.

use crate::config::{Credentials, Settings};
use crate::diagnostics::Diagnostics;
use crate::error::{E2eError, Result};
use crate::routes;
use crate::selectors;
use crate::ui::{UiElement, UiHandle};
use crate::wait::{wait_for_selector, wait_for_url, wait_visible, ElementState, Poller, Probe};
use std::time::Duration;

/// What the site showed after the email was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameOutcome {
    AuthMethodModal,
    InvalidUsername,
}

pub struct LoginPage<'a, U: UiHandle> {
    ui: &'a U,
    settings: &'a Settings,
    diagnostics: &'a Diagnostics,
}

impl<'a, U: UiHandle> LoginPage<'a, U> {
    pub fn new(ui: &'a U, settings: &'a Settings, diagnostics: &'a Diagnostics) -> Self {
        Self {
            ui,
            settings,
            diagnostics,
        }
    }

    pub async fn goto(&self) -> Result<()> {
        self.ui.navigate(&self.settings.url(routes::LOGIN_PATH)).await
    }

    /// Enter the email and continue. Accepts the cookie banner if it covers
    /// the form, then waits for either the auth-method modal or the
    /// invalid-username message.
    pub async fn submit_username(&self, username: &str) -> Result<UsernameOutcome> {
        self.diagnostics
            .guard(self.ui, "username_input_failure", async {
                let field = wait_visible(self.ui, selectors::EMAIL_FIELD, Duration::from_secs(10)).await?;
                field.fill(username).await?;
                log::info!("Filled username: {}", username);

                self.ui.find(selectors::SUBMIT_EMAIL).await?.click().await?;
                log::info!("Clicked continue after entering username...");

                // Modals and the cookie banner render a moment after the click
                tokio::time::sleep(Duration::from_secs(2)).await;

                if self.ui.is_visible(selectors::COOKIE_ACCEPT).await? {
                    log::info!("Cookie banner detected. Accepting cookies...");
                    self.ui.find(selectors::COOKIE_ACCEPT).await?.click().await?;
                    tokio::time::sleep(Duration::from_secs(1)).await;

                    // Accepting cookies swallows the first continue
                    log::info!("Re-clicking username continue to reopen modal...");
                    self.ui.find(selectors::SUBMIT_EMAIL).await?.click().await?;
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }

                let outcome = Poller::default()
                    .with_timeout(Duration::from_secs(5))
                    .poll("auth modal or username error", move || self.username_outcome())
                    .await?;
                outcome.matched().ok_or_else(|| {
                    E2eError::Assertion(
                        "Neither modal nor error message appeared after submitting username."
                            .to_string(),
                    )
                })
            })
            .await
    }

    async fn username_outcome(&self) -> Result<Probe<UsernameOutcome>> {
        if self.ui.is_visible(selectors::AUTH_METHOD_MODAL).await? {
            log::info!("Auth method modal is visible.");
            return Ok(Probe::Ready(UsernameOutcome::AuthMethodModal));
        }
        if self.is_invalid_username().await {
            log::info!("Invalid username error is shown.");
            return Ok(Probe::Ready(UsernameOutcome::InvalidUsername));
        }
        Ok(Probe::pending("no auth modal, no error message"))
    }

    /// Whether the "We can't find a match" message is on screen.
    pub async fn is_invalid_username(&self) -> bool {
        let needle = serde_json::Value::String(selectors::INVALID_USERNAME_TEXT.to_string());
        let script = format!(
            "!!document.body && document.body.innerText.includes({})",
            needle
        );
        self.ui.evaluate_bool(&script).await.unwrap_or(false)
    }

    /// Pick "Sign in with password" in the auth-method modal and continue to
    /// the password form.
    pub async fn choose_password_method(&self) -> Result<()> {
        self.diagnostics
            .guard(self.ui, "auth_modal_continue_failure", async {
                log::info!("Waiting for auth method modal...");
                wait_visible(self.ui, selectors::AUTH_METHOD_MODAL, Duration::from_secs(15)).await?;

                log::info!("Selecting password authentication option...");
                let option =
                    wait_visible(self.ui, selectors::PASSWORD_AUTH_OPTION, Duration::from_secs(5))
                        .await?;
                option.scroll_into_view().await?;
                option.force_click().await?;

                log::info!("Clicking Continue to confirm auth method...");
                let continue_button =
                    wait_visible(self.ui, selectors::SUBMIT_AUTH_OPTION, Duration::from_secs(5))
                        .await?;
                continue_button.force_click().await?;

                log::info!("Waiting for password entry modal...");
                wait_for_selector(
                    self.ui,
                    selectors::PASSWORD_AUTH_FORM,
                    ElementState::Attached,
                    Duration::from_secs(10),
                )
                .await
                .map(|_| ())
            })
            .await
    }

    pub async fn enter_password_and_submit(&self, password: &str) -> Result<()> {
        self.diagnostics
            .guard(self.ui, "password_failure", async {
                let field =
                    wait_visible(self.ui, selectors::PASSWORD_FIELD, Duration::from_secs(7)).await?;
                field.fill(password).await?;
                self.ui.find(selectors::SIGN_IN).await?.click().await
            })
            .await
    }

    /// Full login ending on `/player/home`; returns the landing URL.
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        self.goto().await?;
        if self.submit_username(&credentials.username).await? == UsernameOutcome::InvalidUsername {
            return Err(E2eError::Assertion("Username is not recognized.".to_string()));
        }
        self.choose_password_method().await?;
        self.enter_password_and_submit(credentials.password()).await?;

        self.diagnostics
            .guard(
                self.ui,
                "post_login_redirect_failure",
                wait_for_url(
                    self.ui,
                    "on /player/home",
                    |url| routes::is_on_path(url, routes::HOME_PATH),
                    Duration::from_secs(10),
                ),
            )
            .await
    }
}
