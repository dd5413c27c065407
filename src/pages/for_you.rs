//! For You section of the player: nav routing and channel carousels.

use crate::diagnostics::Diagnostics;
use crate::error::{E2eError, Result};
use crate::routes::{self, HrefMatcher};
use crate::selectors;
use crate::ui::{UiElement, UiHandle};
use crate::wait::{
    wait_for_attribute, wait_for_script, wait_for_url, wait_visible, CarouselScanner, Poller,
    ScanOutcome,
};
use std::time::Duration;

const NAV_TIMEOUT: Duration = Duration::from_secs(10);
const CHANNELS_TIMEOUT: Duration = Duration::from_secs(15);
const CHANNEL_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Channel picked by [`ForYouPage::select_preferred_channel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelChoice {
    /// One of the preferred slugs.
    Preferred(String),
    /// None of them was on the page; this is the href of the first playable
    /// tile instead.
    Fallback(String),
}

pub struct ForYouPage<'a, U: UiHandle> {
    ui: &'a U,
    diagnostics: &'a Diagnostics,
    scanner: CarouselScanner,
}

impl<'a, U: UiHandle> ForYouPage<'a, U> {
    pub fn new(ui: &'a U, diagnostics: &'a Diagnostics) -> Self {
        Self {
            ui,
            diagnostics,
            scanner: CarouselScanner::default(),
        }
    }

    pub fn with_scanner(mut self, scanner: CarouselScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Click Music then For You, and wait until the For You link carries the
    /// session's UUID route. Returns that href.
    pub async fn click_for_you_nav(&self) -> Result<String> {
        self.diagnostics
            .guard(self.ui, "for_you_nav_failure", async {
                log::info!("Clicking Music nav item to reset selection...");
                let music = wait_visible(self.ui, selectors::MUSIC_NAV, NAV_TIMEOUT).await?;
                music.force_click().await?;
                tokio::time::sleep(Duration::from_secs(1)).await;

                log::info!("Clicking For You nav item...");
                let for_you = wait_visible(self.ui, selectors::FOR_YOU_NAV, NAV_TIMEOUT).await?;
                for_you.force_click().await?;

                let href = wait_for_attribute(
                    self.ui,
                    selectors::FOR_YOU_NAV,
                    "href",
                    routes::for_you_regex(),
                    Poller::default().with_timeout(NAV_TIMEOUT),
                )
                .await?;
                log::info!("For You nav href updated: {}", href);
                Ok(href)
            })
            .await
    }

    /// Wait until at least one channel link is rendered and visible.
    pub async fn wait_for_channels(&self) -> Result<()> {
        wait_for_script(
            self.ui,
            "visible channel-linear links",
            selectors::VISIBLE_CHANNEL_LINKS_SCRIPT,
            CHANNELS_TIMEOUT,
        )
        .await
    }

    /// Scan the carousels for `slug` and click it. `false` when no carousel
    /// has it.
    pub async fn click_channel_by_href(&self, slug: &str) -> Result<bool> {
        Ok(self.scan(&HrefMatcher::slug(slug)).await?.is_activated())
    }

    /// Click the first playable tile in any carousel; returns its href.
    pub async fn click_any_channel(&self) -> Result<String> {
        match self.scan(&HrefMatcher::AnyPlayerRoute).await? {
            ScanOutcome::Activated { href, .. } => Ok(href),
            ScanOutcome::NotFound { summary } => Err(E2eError::NoContent(format!(
                "no playable tile in {} carousel(s), {} item(s) inspected",
                summary.containers_exhausted, summary.visited
            ))),
        }
    }

    /// Try each preferred slug in order, falling back to any playable tile.
    ///
    /// A scan that paged through carousels leaves them scrolled, so the page
    /// is reloaded before the next attempt.
    pub async fn select_preferred_channel(&self, preferred: &[&str]) -> Result<ChannelChoice> {
        let mut scrolled = false;
        for slug in preferred {
            if scrolled {
                self.reload().await?;
            }
            let outcome = self.scan(&HrefMatcher::slug(*slug)).await?;
            if outcome.is_activated() {
                log::info!("Selected preferred channel {}", slug);
                return Ok(ChannelChoice::Preferred(slug.to_string()));
            }
            log::info!("Preferred channel {} not found", slug);
            scrolled = outcome.summary().advances.iter().any(|&n| n > 0);
        }

        if scrolled {
            self.reload().await?;
        }
        log::info!("No preferred channel available, falling back to any player route");
        self.click_any_channel().await.map(ChannelChoice::Fallback)
    }

    /// Wait for the channel-linear page of `slug`; returns its URL.
    pub async fn wait_for_channel_page(&self, slug: &str) -> Result<String> {
        let description = format!("on channel {}", slug);
        wait_for_url(
            self.ui,
            &description,
            |url| routes::channel_slug(url) == Some(slug),
            CHANNEL_PAGE_TIMEOUT,
        )
        .await
    }

    async fn scan(&self, matcher: &HrefMatcher) -> Result<ScanOutcome> {
        let containers = self.ui.find_all(selectors::CAROUSEL).await?;
        log::debug!("Scanning {} carousel(s) for {}", containers.len(), matcher);
        let outcome = self.scanner.scan(&containers, matcher).await?;
        if !outcome.is_activated() {
            log::debug!("{} not found: {:?}", matcher, outcome.summary());
        }
        Ok(outcome)
    }

    async fn reload(&self) -> Result<()> {
        let url = self.ui.current_url().await?;
        log::debug!("Reloading {} to reset carousels", url);
        self.ui.navigate(&url).await?;
        self.wait_for_channels().await
    }
}
