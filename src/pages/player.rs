//! Transport controls on a channel page.

use crate::diagnostics::Diagnostics;
use crate::error::{E2eError, Result};
use crate::selectors;
use crate::ui::{UiElement, UiHandle};
use crate::wait::{modal, wait_visible, ModalDismisser, Poller, Probe};
use std::time::Duration;

const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// What the stream is doing, read off the transport button: a button
/// labelled "Pause…" means audio is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn from_label(label: &str) -> Option<Self> {
        if label.starts_with(selectors::PAUSE_LABEL_PREFIX) {
            Some(PlaybackState::Playing)
        } else if label.starts_with(selectors::PLAY_LABEL_PREFIX) {
            Some(PlaybackState::Paused)
        } else {
            None
        }
    }

    fn toggled(self) -> Self {
        match self {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

pub struct PlayerPage<'a, U: UiHandle> {
    ui: &'a U,
    diagnostics: &'a Diagnostics,
    dismisser: ModalDismisser,
}

impl<'a, U: UiHandle> PlayerPage<'a, U> {
    pub fn new(ui: &'a U, diagnostics: &'a Diagnostics) -> Self {
        Self {
            ui,
            diagnostics,
            dismisser: ModalDismisser::default(),
        }
    }

    pub fn with_dismisser(mut self, dismisser: ModalDismisser) -> Self {
        self.dismisser = dismisser;
        self
    }

    pub async fn playback_state(&self) -> Result<PlaybackState> {
        let button = wait_visible(self.ui, selectors::TRANSPORT_BUTTON, TRANSPORT_TIMEOUT).await?;
        let label = button.attribute("aria-label").await?.unwrap_or_default();
        PlaybackState::from_label(&label).ok_or_else(|| {
            E2eError::Assertion(format!("Unrecognised transport label '{}'", label))
        })
    }

    /// Press the transport button, clear any overlay it brings up, and wait
    /// for the label to flip. Returns the new state.
    pub async fn toggle_playback(&self) -> Result<PlaybackState> {
        self.diagnostics
            .guard(self.ui, "playback_toggle_failure", async {
                let before = self.playback_state().await?;
                let target = before.toggled();
                log::info!("Transport shows {}, toggling to {}", before, target);

                self.ui.find(selectors::TRANSPORT_BUTTON).await?.click().await?;

                let overlay = self
                    .dismisser
                    .dismiss_with_retries(self.ui, modal::DEFAULT_ATTEMPTS, modal::DEFAULT_RETRY_DELAY)
                    .await;
                log::debug!("Overlay after transport click: {:?}", overlay);

                let description = format!("transport to show {}", target);
                Poller::default()
                    .with_timeout(TRANSPORT_TIMEOUT)
                    .until(&description, move || self.state_probe(target))
                    .await
            })
            .await
    }

    pub async fn play(&self) -> Result<()> {
        self.ensure(PlaybackState::Playing).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.ensure(PlaybackState::Paused).await
    }

    async fn ensure(&self, wanted: PlaybackState) -> Result<()> {
        if self.playback_state().await? == wanted {
            log::debug!("Already {}", wanted);
            return Ok(());
        }
        self.toggle_playback().await.map(|_| ())
    }

    async fn state_probe(&self, target: PlaybackState) -> Result<Probe<PlaybackState>> {
        let button = self.ui.find(selectors::TRANSPORT_BUTTON).await?;
        let label = button.attribute("aria-label").await?.unwrap_or_default();
        Ok(match PlaybackState::from_label(&label) {
            Some(state) if state == target => Probe::Ready(state),
            _ => Probe::Pending(format!("aria-label='{}'", label)),
        })
    }
}
