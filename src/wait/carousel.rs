//! Carousel scanner
//!
//! The For You and Music pages lay channels out in horizontally paginated
//! carousels that only render the visible page of tiles. Finding a channel
//! means walking every carousel, page by page, until a tile's href matches.

use crate::error::Result;
use crate::routes::HrefMatcher;
use crate::selectors;
use crate::ui::UiElement;
use std::time::Duration;

pub const DEFAULT_MAX_SCROLLS: usize = 5;
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(600);

/// Position reached within the container sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCursor {
    /// Index of the container being scanned.
    pub container: usize,
    /// Pagination advances made in that container.
    pub page: usize,
    /// Items inspected so far, across all containers.
    pub visited: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub containers_exhausted: usize,
    /// Pagination advances per container, in scan order.
    pub advances: Vec<usize>,
    pub visited: usize,
    pub skipped: usize,
    pub activations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Activated {
        href: String,
        cursor: ScanCursor,
        summary: ScanSummary,
    },
    NotFound {
        summary: ScanSummary,
    },
}

impl ScanOutcome {
    pub fn is_activated(&self) -> bool {
        matches!(self, ScanOutcome::Activated { .. })
    }

    pub fn summary(&self) -> &ScanSummary {
        match self {
            ScanOutcome::Activated { summary, .. } | ScanOutcome::NotFound { summary } => summary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CarouselScanner {
    max_scrolls: usize,
    settle: Duration,
}

impl Default for CarouselScanner {
    fn default() -> Self {
        Self {
            max_scrolls: DEFAULT_MAX_SCROLLS,
            settle: DEFAULT_SETTLE,
        }
    }
}

enum ItemCheck {
    Activated(String),
    Miss,
    Skipped,
}

impl CarouselScanner {
    pub fn with_max_scrolls(mut self, max_scrolls: usize) -> Self {
        self.max_scrolls = max_scrolls;
        self
    }

    pub fn max_scrolls(&self) -> usize {
        self.max_scrolls
    }

    /// Scan `containers` in order and activate the first item whose href
    /// satisfies `matcher`.
    ///
    /// Exhausting every container is `NotFound`, not an error; callers decide
    /// whether that is fatal.
    pub async fn scan<E: UiElement>(
        &self,
        containers: &[E],
        matcher: &HrefMatcher,
    ) -> Result<ScanOutcome> {
        let mut cursor = ScanCursor::default();
        let mut summary = ScanSummary::default();

        for (index, container) in containers.iter().enumerate() {
            cursor.container = index;
            cursor.page = 0;

            loop {
                let items = match container.find_all(selectors::CAROUSEL_ITEM).await {
                    Ok(items) => items,
                    Err(e) if e.is_transient() => {
                        log::warn!("Carousel {}: could not list items: {}", index, e);
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                };
                log::debug!(
                    "Carousel {} page {}: {} item(s)",
                    index,
                    cursor.page,
                    items.len()
                );

                for item in &items {
                    cursor.visited += 1;
                    summary.visited += 1;
                    match self.check_item(item, matcher, &mut summary).await? {
                        ItemCheck::Activated(href) => {
                            log::info!(
                                "Activated {} in carousel {} after {} advance(s)",
                                href,
                                index,
                                cursor.page
                            );
                            summary.advances.push(cursor.page);
                            return Ok(ScanOutcome::Activated {
                                href,
                                cursor,
                                summary,
                            });
                        }
                        ItemCheck::Miss => {}
                        ItemCheck::Skipped => summary.skipped += 1,
                    }
                }

                if cursor.page >= self.max_scrolls || !self.advance(container, index).await? {
                    break;
                }
                cursor.page += 1;
                tokio::time::sleep(self.settle).await;
            }

            summary.advances.push(cursor.page);
            summary.containers_exhausted += 1;
        }

        log::info!(
            "No item matching {} in {} carousel(s) ({} item(s) visited)",
            matcher,
            containers.len(),
            summary.visited
        );
        Ok(ScanOutcome::NotFound { summary })
    }

    async fn check_item<E: UiElement>(
        &self,
        item: &E,
        matcher: &HrefMatcher,
        summary: &mut ScanSummary,
    ) -> Result<ItemCheck> {
        let href = match item.attribute("href").await {
            Ok(Some(href)) => href,
            Ok(None) => return Ok(ItemCheck::Miss),
            Err(e) if e.is_transient() => {
                log::warn!("Skipping unreadable carousel item: {}", e);
                return Ok(ItemCheck::Skipped);
            }
            Err(e) => return Err(e),
        };

        if !matcher.matches(&href) {
            return Ok(ItemCheck::Miss);
        }

        summary.activations += 1;
        let activation = async {
            item.scroll_into_view().await?;
            item.force_click().await
        };
        match activation.await {
            Ok(()) => Ok(ItemCheck::Activated(href)),
            Err(e) if e.is_transient() => {
                log::warn!("Skipping {}: activation failed: {}", href, e);
                Ok(ItemCheck::Skipped)
            }
            Err(e) => Err(e),
        }
    }

    /// Click the container's next control. `false` when it is missing,
    /// disabled, or the click did not land.
    async fn advance<E: UiElement>(&self, container: &E, index: usize) -> Result<bool> {
        let next = match container.find_all(selectors::CAROUSEL_NEXT).await {
            Ok(controls) => controls.into_iter().next(),
            Err(e) if e.is_transient() => None,
            Err(e) => return Err(e),
        };
        let Some(next) = next else {
            log::debug!("Carousel {}: no next control", index);
            return Ok(false);
        };

        match next.is_enabled().await {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("Carousel {}: next control disabled", index);
                return Ok(false);
            }
            Err(e) if e.is_transient() => return Ok(false),
            Err(e) => return Err(e),
        }

        match next.force_click().await {
            Ok(()) => Ok(true),
            Err(e) if e.is_transient() => {
                log::warn!("Carousel {}: advancing failed: {}", index, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
