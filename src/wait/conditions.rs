//! Common waits over a [`UiHandle`], all expressed as poller conditions.

use super::poller::{Poller, Probe};
use crate::error::Result;
use crate::ui::{UiElement, UiHandle};
use regex::Regex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Present in the DOM, visible or not.
    Attached,
    Visible,
    /// Absent, or present but not visible.
    Hidden,
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementState::Attached => write!(f, "attached"),
            ElementState::Visible => write!(f, "visible"),
            ElementState::Hidden => write!(f, "hidden"),
        }
    }
}

/// Wait until the first element matching `selector` reaches `state`.
///
/// Returns the element for `Attached`/`Visible`, `None` for `Hidden`.
pub async fn wait_for_selector<U: UiHandle>(
    ui: &U,
    selector: &str,
    state: ElementState,
    timeout: Duration,
) -> Result<Option<U::Element>> {
    let what = format!("{} to be {}", selector, state);
    Poller::default()
        .with_timeout(timeout)
        .until(&what, move || async move {
            let first = ui.find_all(selector).await?.into_iter().next();
            Ok(match (state, first) {
                (ElementState::Attached, Some(el)) => Probe::Ready(Some(el)),
                (ElementState::Attached, None) => Probe::pending("not in DOM"),
                (ElementState::Visible, Some(el)) => {
                    if el.is_visible().await? {
                        Probe::Ready(Some(el))
                    } else {
                        Probe::pending("in DOM but hidden")
                    }
                }
                (ElementState::Visible, None) => Probe::pending("not in DOM"),
                (ElementState::Hidden, None) => Probe::Ready(None),
                (ElementState::Hidden, Some(el)) => {
                    if el.is_visible().await? {
                        Probe::pending("still visible")
                    } else {
                        Probe::Ready(None)
                    }
                }
            })
        })
        .await
}

/// Wait for a visible element and hand it back.
pub async fn wait_visible<U: UiHandle>(
    ui: &U,
    selector: &str,
    timeout: Duration,
) -> Result<U::Element> {
    wait_for_selector(ui, selector, ElementState::Visible, timeout)
        .await?
        .ok_or_else(|| crate::error::E2eError::ElementNotFound(selector.to_string()))
}

/// Wait until the current URL satisfies `predicate`; returns that URL.
pub async fn wait_for_url<U, P>(
    ui: &U,
    description: &str,
    predicate: P,
    timeout: Duration,
) -> Result<String>
where
    U: UiHandle,
    P: Fn(&str) -> bool,
{
    let what = format!("URL {}", description);
    let predicate = &predicate;
    Poller::default()
        .with_timeout(timeout)
        .until(&what, move || async move {
            let url = ui.current_url().await?;
            Ok(if predicate(&url) {
                Probe::Ready(url)
            } else {
                Probe::Pending(url)
            })
        })
        .await
}

/// Wait until `attribute` of the first element matching `selector` matches
/// `pattern`; returns the attribute value.
pub async fn wait_for_attribute<U: UiHandle>(
    ui: &U,
    selector: &str,
    attribute: &str,
    pattern: &Regex,
    poller: Poller,
) -> Result<String> {
    let what = format!("{} [{}] to match {}", selector, attribute, pattern);
    poller
        .until(&what, move || async move {
            let element = ui.find(selector).await?;
            let value = element.attribute(attribute).await?;
            Ok(match value {
                Some(v) if pattern.is_match(&v) => Probe::Ready(v),
                Some(v) => Probe::Pending(format!("{}={}", attribute, v)),
                None => Probe::pending(format!("no {} attribute", attribute)),
            })
        })
        .await
}

/// Wait until a JavaScript expression evaluates truthy.
pub async fn wait_for_script<U: UiHandle>(
    ui: &U,
    description: &str,
    script: &str,
    timeout: Duration,
) -> Result<()> {
    Poller::default()
        .with_timeout(timeout)
        .until(description, move || async move {
            Ok(if ui.evaluate_bool(script).await? {
                Probe::Ready(())
            } else {
                Probe::pending("script returned false")
            })
        })
        .await
}
