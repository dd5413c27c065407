//! End-to-end scenarios.
//!
//! Each scenario drives one fresh page from start to finish. They are
//! generic over [`UiHandle`] so the CLI and the integration tests share them.

use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::error::{E2eError, Result};
use crate::pages::{ChannelChoice, ForYouPage, HomePage, LoginPage, PlaybackState, PlayerPage};
use crate::routes;
use crate::ui::UiHandle;
use crate::wait::wait_for_url;
use std::future::Future;
use std::time::Duration;

/// Channels tried, in order, before falling back to any playable tile.
pub const PREFERRED_CHANNELS: &[&str] = &["siriusxm-hits-1", "pop2K"];

/// Channel the For You scenario expects to find.
pub const FOR_YOU_CHANNEL: &str = "siriusxm-hits-1";

/// Everything a scenario needs besides the page itself.
pub struct ScenarioContext<'a, U: UiHandle> {
    pub ui: &'a U,
    pub settings: &'a Settings,
    pub diagnostics: &'a Diagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    HomepageTitle,
    HomepageStartListening,
    Login,
    ForYouChannel,
    PreferredChannelPlayback,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::HomepageTitle,
        Scenario::HomepageStartListening,
        Scenario::Login,
        Scenario::ForYouChannel,
        Scenario::PreferredChannelPlayback,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::HomepageTitle => "homepage-title",
            Scenario::HomepageStartListening => "homepage-start-listening",
            Scenario::Login => "login",
            Scenario::ForYouChannel => "for-you-channel",
            Scenario::PreferredChannelPlayback => "preferred-channel-playback",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::HomepageTitle => "homepage title mentions SiriusXM",
            Scenario::HomepageStartListening => "global nav is visible and Start Listening leads to the player",
            Scenario::Login => "email + password login lands on /player/home",
            Scenario::ForYouChannel => "For You routes to its UUID and a channel can be opened from the carousels",
            Scenario::PreferredChannelPlayback => "first available preferred channel plays and pauses",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn needs_credentials(self) -> bool {
        matches!(
            self,
            Scenario::Login | Scenario::ForYouChannel | Scenario::PreferredChannelPlayback
        )
    }

    /// Run the scenario on `ctx.ui`. Any failure leaves a screenshot and a
    /// record named after the scenario.
    pub async fn run<U: UiHandle>(self, ctx: &ScenarioContext<'_, U>) -> Result<()> {
        log::info!("Running scenario {}", self.name());
        ctx.diagnostics
            .guard(ctx.ui, self.name(), async {
                match self {
                    Scenario::HomepageTitle => homepage_title(ctx).await,
                    Scenario::HomepageStartListening => homepage_start_listening(ctx).await,
                    Scenario::Login => login(ctx).await.map(|_| ()),
                    Scenario::ForYouChannel => for_you_channel(ctx).await,
                    Scenario::PreferredChannelPlayback => preferred_channel_playback(ctx).await,
                }
            })
            .await
    }

    /// Open a tab with `open_tab` and run the scenario in it. A tab that
    /// cannot be opened fails this scenario only.
    pub async fn run_in_new_tab<U, F, Fut>(
        self,
        open_tab: F,
        settings: &Settings,
        diagnostics: &Diagnostics,
    ) -> Result<()>
    where
        U: UiHandle,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<U>>,
    {
        let ui = open_tab().await.map_err(|e| {
            log::error!("Could not open a tab for {}: {}", self.name(), e);
            e
        })?;
        self.run(&ScenarioContext {
            ui: &ui,
            settings,
            diagnostics,
        })
        .await
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

async fn homepage_title<U: UiHandle>(ctx: &ScenarioContext<'_, U>) -> Result<()> {
    HomePage::new(ctx.ui, ctx.settings).goto().await?;
    let title = ctx.ui.title().await?;
    ensure(
        title.contains("SiriusXM"),
        format!("Homepage title '{}' does not mention SiriusXM", title),
    )
}

async fn homepage_start_listening<U: UiHandle>(ctx: &ScenarioContext<'_, U>) -> Result<()> {
    let home = HomePage::new(ctx.ui, ctx.settings);
    home.goto().await?;
    ensure(home.is_nav_visible().await?, "Global nav is not visible")?;

    ctx.diagnostics
        .guard(ctx.ui, "start_listening_failure", async {
            home.click_start_listening().await?;
            wait_for_url(
                ctx.ui,
                "mentioning player or siriusxm",
                |url| {
                    let url = url.to_lowercase();
                    url.contains("player") || url.contains("siriusxm")
                },
                Duration::from_secs(10),
            )
            .await
        })
        .await
        .map(|_| ())
}

async fn login<U: UiHandle>(ctx: &ScenarioContext<'_, U>) -> Result<String> {
    let credentials = ctx.settings.require_credentials()?;
    let url = LoginPage::new(ctx.ui, ctx.settings, ctx.diagnostics)
        .login(credentials)
        .await?;
    ensure(
        url.starts_with(&ctx.settings.url(routes::HOME_PATH)),
        format!("Expected to land on {} but got {}", routes::HOME_PATH, url),
    )?;
    Ok(url)
}

async fn for_you_channel<U: UiHandle>(ctx: &ScenarioContext<'_, U>) -> Result<()> {
    login(ctx).await?;

    let for_you = ForYouPage::new(ctx.ui, ctx.diagnostics);
    let href = for_you.click_for_you_nav().await?;
    ensure(
        routes::is_for_you_route(&href),
        format!("For You href '{}' carries no UUID", href),
    )?;

    // Second click settles the section before the carousels are read
    for_you.click_for_you_nav().await?;
    ctx.diagnostics.checkpoint(ctx.ui, "after_nav_click").await;
    for_you.wait_for_channels().await?;

    if !for_you.click_channel_by_href(FOR_YOU_CHANNEL).await? {
        let err = E2eError::Assertion(format!(
            "Channel {} not found in any carousel",
            FOR_YOU_CHANNEL
        ));
        ctx.diagnostics
            .capture_failure(ctx.ui, "channel_not_found", &err)
            .await;
        return Err(err);
    }
    let url = for_you.wait_for_channel_page(FOR_YOU_CHANNEL).await?;
    log::info!("Current URL after click: {}", url);
    Ok(())
}

async fn preferred_channel_playback<U: UiHandle>(ctx: &ScenarioContext<'_, U>) -> Result<()> {
    login(ctx).await?;

    let for_you = ForYouPage::new(ctx.ui, ctx.diagnostics);
    for_you.click_for_you_nav().await?;
    for_you.wait_for_channels().await?;

    match for_you.select_preferred_channel(PREFERRED_CHANNELS).await? {
        ChannelChoice::Preferred(slug) => {
            for_you.wait_for_channel_page(&slug).await?;
        }
        ChannelChoice::Fallback(href) => {
            log::info!("Playing fallback tile {}", href);
            wait_for_url(
                ctx.ui,
                "on a player route",
                |url| routes::HrefMatcher::AnyPlayerRoute.matches(url),
                Duration::from_secs(10),
            )
            .await?;
        }
    }

    let player = PlayerPage::new(ctx.ui, ctx.diagnostics);
    player.play().await?;
    ensure(
        player.playback_state().await? == PlaybackState::Playing,
        "Stream did not start playing",
    )?;
    player.pause().await?;
    ensure(
        player.playback_state().await? == PlaybackState::Paused,
        "Stream did not pause",
    )
}

fn ensure(condition: bool, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::Assertion(message.into()))
    }
}
