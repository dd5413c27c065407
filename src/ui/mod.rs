//! UI handle seam
//!
//! Page objects and the wait primitives are written against these traits
//! rather than against chromiumoxide directly. The Chrome implementation lives
//! in [`crate::browser::chrome`]; unit tests use an in-memory fake.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use std::path::Path;

#[cfg(test)]
pub(crate) mod fake;

/// A live document a scenario drives.
pub trait UiHandle {
    type Element: UiElement;

    /// Navigate to `url` and wait for the load to settle.
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// All elements currently matching `selector`, in document order.
    /// An empty vector is not an error.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Evaluate a JavaScript expression and coerce the result to a boolean.
    async fn evaluate_bool(&self, script: &str) -> Result<bool>;

    /// Write a full-page PNG screenshot to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// First element matching `selector`.
    async fn find(&self, selector: &str) -> Result<Self::Element> {
        self.find_all(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::E2eError::ElementNotFound(selector.to_string()))
    }

    /// Whether the first element matching `selector` exists and is visible.
    async fn is_visible(&self, selector: &str) -> Result<bool> {
        match self.find_all(selector).await?.first() {
            Some(element) => element.is_visible().await,
            None => Ok(false),
        }
    }
}

/// A single element inside a [`UiHandle`].
pub trait UiElement: Sized {
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    async fn text(&self) -> Result<Option<String>>;

    async fn is_visible(&self) -> Result<bool>;

    /// Visible controls can still be disabled (`disabled` or `aria-disabled`).
    async fn is_enabled(&self) -> Result<bool>;

    /// Descendants matching `selector`.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>>;

    async fn scroll_into_view(&self) -> Result<()>;

    /// Regular pointer click at the element's centre.
    async fn click(&self) -> Result<()>;

    /// Programmatic `element.click()`, bypassing hit-testing. Used where the
    /// layout renders targets outside the viewport or under overlays.
    async fn force_click(&self) -> Result<()>;

    /// Replace the element's value with `value`.
    async fn fill(&self, value: &str) -> Result<()>;
}
