//! Marketing homepage.

use crate::config::Settings;
use crate::error::{E2eError, Result};
use crate::selectors;
use crate::ui::{UiElement, UiHandle};
use crate::wait::{wait_for_selector, ElementState, Poller, Probe};
use std::time::Duration;

const NAV_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HomePage<'a, U: UiHandle> {
    ui: &'a U,
    settings: &'a Settings,
}

impl<'a, U: UiHandle> HomePage<'a, U> {
    pub fn new(ui: &'a U, settings: &'a Settings) -> Self {
        Self { ui, settings }
    }

    pub async fn goto(&self) -> Result<()> {
        self.ui.navigate(&self.settings.url("/")).await
    }

    pub async fn is_nav_visible(&self) -> Result<bool> {
        match wait_for_selector(self.ui, selectors::GLOBAL_NAV, ElementState::Visible, NAV_TIMEOUT)
            .await
        {
            Ok(_) => Ok(true),
            Err(E2eError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Click the "Start Listening" call to action.
    pub async fn click_start_listening(&self) -> Result<()> {
        let link = Poller::default()
            .with_timeout(NAV_TIMEOUT)
            .until("Start Listening link", move || self.find_start_listening())
            .await?;
        link.scroll_into_view().await?;
        link.click().await
    }

    async fn find_start_listening(&self) -> Result<Probe<U::Element>> {
        let links = self.ui.find_all(selectors::LINK).await?;
        let total = links.len();
        for link in links {
            let text = link.text().await.ok().flatten().unwrap_or_default();
            if text.contains(selectors::START_LISTENING_TEXT) && link.is_visible().await? {
                return Ok(Probe::Ready(link));
            }
        }
        Ok(Probe::pending(format!(
            "{} link(s), none visible with text '{}'",
            total,
            selectors::START_LISTENING_TEXT
        )))
    }
}
