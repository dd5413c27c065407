//! Best-effort dismissal of the overlay that sometimes follows playback.

use super::poller::{PollResult, Poller, Probe};
use crate::error::Result;
use crate::selectors;
use crate::ui::{UiElement, UiHandle};
use std::time::Duration;

/// Upper bound on how long detection may block a caller.
pub const MAX_DETECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DETECT_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    NotPresent,
    Dismissed,
    CouldNotDismiss(String),
}

impl ModalOutcome {
    pub fn is_dismissed(&self) -> bool {
        matches!(self, ModalOutcome::Dismissed)
    }
}

#[derive(Debug, Clone)]
pub struct ModalDismisser {
    detect_timeout: Duration,
}

impl Default for ModalDismisser {
    fn default() -> Self {
        Self {
            detect_timeout: MAX_DETECT_TIMEOUT,
        }
    }
}

impl ModalDismisser {
    /// Detection window, clamped to [`MAX_DETECT_TIMEOUT`].
    pub fn with_detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout = timeout.min(MAX_DETECT_TIMEOUT);
        self
    }

    pub fn detect_timeout(&self) -> Duration {
        self.detect_timeout
    }

    /// Look for the overlay and close it if it shows up. Never fails: every
    /// error ends up as `NotPresent` or `CouldNotDismiss`.
    pub async fn dismiss<U: UiHandle>(&self, ui: &U) -> ModalOutcome {
        match self.detect(ui).await {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("No overlay within {:?}", self.detect_timeout);
                return ModalOutcome::NotPresent;
            }
            Err(e) => {
                log::debug!("Overlay detection failed: {}", e);
                return ModalOutcome::NotPresent;
            }
        }

        log::info!("Overlay detected, dismissing...");
        match self.close(ui).await {
            Ok(()) => {
                log::info!("Overlay dismissed");
                ModalOutcome::Dismissed
            }
            Err(e) => {
                log::warn!("Could not dismiss overlay: {}", e);
                ModalOutcome::CouldNotDismiss(e.to_string())
            }
        }
    }

    /// Run [`ModalDismisser::dismiss`] up to `attempts` times, `delay` apart,
    /// stopping at the first successful dismissal.
    pub async fn dismiss_with_retries<U: UiHandle>(
        &self,
        ui: &U,
        attempts: usize,
        delay: Duration,
    ) -> ModalOutcome {
        let mut outcome = ModalOutcome::NotPresent;
        for attempt in 1..=attempts {
            outcome = self.dismiss(ui).await;
            log::debug!("Overlay attempt {}/{}: {:?}", attempt, attempts, outcome);
            if outcome.is_dismissed() {
                break;
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }
        outcome
    }

    async fn detect<U: UiHandle>(&self, ui: &U) -> Result<bool> {
        let selector = selectors::PLAYBACK_MODAL;
        let result = Poller::new(self.detect_timeout, DETECT_INTERVAL)
            .poll("playback overlay", move || async move {
                let Some(overlay) = ui.find_all(selector).await?.into_iter().next() else {
                    return Ok(Probe::pending("no overlay"));
                };
                Ok(if overlay.is_visible().await? {
                    Probe::Ready(())
                } else {
                    Probe::pending("overlay hidden")
                })
            })
            .await?;
        Ok(matches!(result, PollResult::Matched(())))
    }

    async fn close<U: UiHandle>(&self, ui: &U) -> Result<()> {
        let button = ui.find(selectors::PLAYBACK_MODAL_CLOSE).await?;
        button.scroll_into_view().await?;
        button.force_click().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::fake::FakeUi;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_never_appearing_overlay_is_not_present() {
        let ui = FakeUi::new().with_modal(None, true);
        let dismisser = ModalDismisser::default();
        let start = Instant::now();

        let outcome = dismisser.dismiss(&ui).await;

        assert_eq!(outcome, ModalOutcome::NotPresent);
        assert!(start.elapsed() <= dismisser.detect_timeout() + DETECT_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_modal_markup_at_all_is_not_present() {
        let ui = FakeUi::new();
        assert_eq!(ModalDismisser::default().dismiss(&ui).await, ModalOutcome::NotPresent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_appearing_overlay_is_dismissed() {
        let ui = FakeUi::new().with_modal(Some(2), true);

        let outcome = ModalDismisser::default().dismiss(&ui).await;

        assert_eq!(outcome, ModalOutcome::Dismissed);
        let modal = ui.modal().unwrap();
        assert!(!modal.is_present());
        assert!(!ui.is_visible(selectors::PLAYBACK_MODAL).await.unwrap());
        assert_eq!(ui.entries("dismiss"), vec!["dismiss"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unclickable_close_is_reported_not_raised() {
        let ui = FakeUi::new().with_modal(Some(0), false);

        let outcome = ModalDismisser::default().dismiss(&ui).await;

        match outcome {
            ModalOutcome::CouldNotDismiss(reason) => assert!(reason.contains("covered")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(ui.modal().unwrap().is_present());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_stop_after_dismissal() {
        let ui = FakeUi::new().with_modal(Some(20), true);
        let dismisser = ModalDismisser::default().with_detect_timeout(Duration::from_secs(2));

        let outcome = dismisser
            .dismiss_with_retries(&ui, DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY)
            .await;

        assert_eq!(outcome, ModalOutcome::Dismissed);
        assert_eq!(ui.entries("dismiss").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhaust_to_not_present() {
        let ui = FakeUi::new().with_modal(None, true);
        let start = Instant::now();

        let outcome = ModalDismisser::default()
            .with_detect_timeout(Duration::from_secs(1))
            .dismiss_with_retries(&ui, 3, Duration::from_millis(500))
            .await;

        assert_eq!(outcome, ModalOutcome::NotPresent);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_detect_timeout_is_clamped() {
        let dismisser = ModalDismisser::default().with_detect_timeout(Duration::from_secs(30));
        assert_eq!(dismisser.detect_timeout(), MAX_DETECT_TIMEOUT);
    }
}
