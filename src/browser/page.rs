//! chromiumoxide-backed [`UiHandle`] / [`UiElement`].

use crate::error::{E2eError, Result};
use crate::ui::{UiElement, UiHandle};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use std::path::Path;
use std::time::Duration;

/// Delay after a navigation for client-side rendering to start.
const NAVIGATION_SETTLE: Duration = Duration::from_millis(500);

const IS_VISIBLE_FN: &str = r#"function() {
    const style = window.getComputedStyle(this);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

const IS_ENABLED_FN: &str = r#"function() {
    return !this.disabled && this.getAttribute('aria-disabled') !== 'true';
}"#;

const FORCE_CLICK_FN: &str = "function() { this.click(); }";

const CLEAR_FN: &str = r#"function() {
    this.focus();
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// One Chrome tab.
#[derive(Clone)]
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

impl UiHandle for ChromePage {
    type Element = ChromeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        log::info!("Navigating to {}", url);
        self.page.goto(url).await.map_err(|e| {
            let error_str = e.to_string();
            // "oneshot canceled" means the browser connection is gone
            if error_str.contains("oneshot canceled") {
                E2eError::NavigationFailed(
                    "Browser connection lost. The browser may have been closed or crashed."
                        .to_string(),
                )
            } else {
                E2eError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e))
            }
        })?;
        tokio::time::sleep(NAVIGATION_SETTLE).await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.page.url().await?.ok_or(E2eError::NoPage)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>> {
        // No match is an empty Vec; errors are a node vanishing mid-render or a lost connection
        let elements = self.page.find_elements(selector).await.map_err(interaction)?;
        Ok(elements.into_iter().map(ChromeElement::new).collect())
    }

    async fn evaluate_bool(&self, script: &str) -> Result<bool> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| E2eError::Other(format!("Script execution failed: {}", e)))?;
        Ok(result
            .into_value::<serde_json::Value>()
            .map(|v| truthy(&v))
            .unwrap_or(false))
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let bytes = self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| E2eError::Other(format!("Failed to take screenshot: {}", e)))?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

/// One DOM element on a [`ChromePage`].
pub struct ChromeElement {
    element: Element,
}

impl ChromeElement {
    fn new(element: Element) -> Self {
        Self { element }
    }

    async fn call_bool(&self, function: &str) -> Result<bool> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(interaction)?;
        Ok(returns.result.value.as_ref().map(truthy).unwrap_or(false))
    }
}

impl UiElement for ChromeElement {
    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element.attribute(name).await.map_err(interaction)
    }

    async fn text(&self) -> Result<Option<String>> {
        self.element.inner_text().await.map_err(interaction)
    }

    async fn is_visible(&self) -> Result<bool> {
        self.call_bool(IS_VISIBLE_FN).await
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.call_bool(IS_ENABLED_FN).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let elements = self.element.find_elements(selector).await.map_err(interaction)?;
        Ok(elements.into_iter().map(ChromeElement::new).collect())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        self.element
            .scroll_into_view()
            .await
            .map(|_| ())
            .map_err(interaction)
    }

    async fn click(&self) -> Result<()> {
        self.element.click().await.map(|_| ()).map_err(interaction)
    }

    async fn force_click(&self) -> Result<()> {
        self.element
            .call_js_fn(FORCE_CLICK_FN, false)
            .await
            .map(|_| ())
            .map_err(interaction)
    }

    async fn fill(&self, value: &str) -> Result<()> {
        self.element
            .call_js_fn(CLEAR_FN, false)
            .await
            .map_err(interaction)?;
        self.element
            .type_str(value)
            .await
            .map(|_| ())
            .map_err(interaction)
    }
}

/// Element-level CDP failures (detached node, zero-size box, ...) are the
/// transient kind callers may retry past. A broken browser connection is not.
fn interaction(e: CdpError) -> E2eError {
    if is_connection_error(&e) {
        E2eError::CdpError(e)
    } else {
        E2eError::Interaction(e.to_string())
    }
}

fn is_connection_error(e: &CdpError) -> bool {
    matches!(
        e,
        CdpError::Ws(_)
            | CdpError::Io(_)
            | CdpError::NoResponse
            | CdpError::UnexpectedWsMessage(_)
            | CdpError::ChannelSendError(_)
            | CdpError::Timeout
    )
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
