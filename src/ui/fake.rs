//! In-memory UI used by unit tests.
//!
//! Carousels, the playback overlay and a handful of static nodes are modelled
//! directly; every interaction is appended to a shared log so tests can assert
//! on the exact sequence of advances and activations.

use super::{UiElement, UiHandle};
use crate::error::{E2eError, Result};
use crate::selectors;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone)]
pub(crate) struct FakeTile {
    pub href: Option<String>,
    pub broken: bool,
}

impl FakeTile {
    pub fn href(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            broken: false,
        }
    }

    pub fn broken() -> Self {
        Self {
            href: None,
            broken: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NextControl {
    Absent,
    Disabled,
    Enabled,
}

pub(crate) struct FakeCarousel {
    name: String,
    pages: Vec<Vec<FakeTile>>,
    page: Cell<usize>,
    next: NextControl,
    log: Log,
}

impl FakeCarousel {
    pub fn advances(&self) -> usize {
        self.page.get()
    }
}

pub(crate) struct FakeModal {
    /// Number of overlay lookups that report nothing before it shows up.
    appear_after: Cell<Option<usize>>,
    lookups: Cell<usize>,
    present: Cell<bool>,
    dismissable: bool,
    log: Log,
}

impl FakeModal {
    pub fn is_present(&self) -> bool {
        self.present.get()
    }

    fn lookup(&self) -> bool {
        let n = self.lookups.get();
        self.lookups.set(n + 1);
        if let Some(after) = self.appear_after.get() {
            if n >= after {
                self.present.set(true);
                self.appear_after.set(None);
            }
        }
        self.present.get()
    }
}

pub(crate) type ClickHook = Box<dyn Fn(&FakeNode)>;

pub(crate) struct FakeNode {
    attrs: RefCell<HashMap<String, String>>,
    text: Option<String>,
    visible: Cell<bool>,
    on_click: Option<ClickHook>,
    log: Log,
}

impl FakeNode {
    pub fn set_attr(&self, name: &str, value: &str) {
        self.attrs
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

#[derive(Clone)]
pub(crate) enum FakeElement {
    Carousel(Rc<FakeCarousel>),
    Tile(FakeTile, Log),
    Next(Rc<FakeCarousel>),
    Overlay(Rc<FakeModal>),
    Dismiss(Rc<FakeModal>),
    Node(Rc<FakeNode>),
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FakeElement::Carousel(c) => write!(f, "Carousel({})", c.name),
            FakeElement::Tile(tile, _) => write!(f, "Tile({:?})", tile.href),
            FakeElement::Next(c) => write!(f, "Next({})", c.name),
            FakeElement::Overlay(_) => f.write_str("Overlay"),
            FakeElement::Dismiss(_) => f.write_str("Dismiss"),
            FakeElement::Node(node) => write!(f, "Node({:?})", node.text),
        }
    }
}

impl UiElement for FakeElement {
    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        match self {
            FakeElement::Tile(tile, _) if tile.broken => {
                Err(E2eError::Interaction("stale element reference".to_string()))
            }
            FakeElement::Tile(tile, _) if name == "href" => Ok(tile.href.clone()),
            FakeElement::Node(node) => Ok(node.attr(name)),
            _ => Ok(None),
        }
    }

    async fn text(&self) -> Result<Option<String>> {
        match self {
            FakeElement::Node(node) => Ok(node.text.clone()),
            _ => Ok(None),
        }
    }

    async fn is_visible(&self) -> Result<bool> {
        match self {
            FakeElement::Overlay(modal) | FakeElement::Dismiss(modal) => Ok(modal.is_present()),
            FakeElement::Node(node) => Ok(node.visible.get()),
            _ => Ok(true),
        }
    }

    async fn is_enabled(&self) -> Result<bool> {
        match self {
            FakeElement::Next(carousel) => Ok(carousel.next == NextControl::Enabled
                && carousel.page.get() + 1 < carousel.pages.len()),
            _ => Ok(true),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let FakeElement::Carousel(carousel) = self else {
            return Ok(Vec::new());
        };
        match selector {
            selectors::CAROUSEL_ITEM => Ok(carousel
                .pages
                .get(carousel.page.get())
                .map(|tiles| {
                    tiles
                        .iter()
                        .cloned()
                        .map(|t| FakeElement::Tile(t, carousel.log.clone()))
                        .collect()
                })
                .unwrap_or_default()),
            selectors::CAROUSEL_NEXT if carousel.next != NextControl::Absent => {
                Ok(vec![FakeElement::Next(carousel.clone())])
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn scroll_into_view(&self) -> Result<()> {
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        self.force_click().await
    }

    async fn force_click(&self) -> Result<()> {
        match self {
            FakeElement::Tile(tile, _) if tile.broken => {
                Err(E2eError::Interaction("element is not attached".to_string()))
            }
            FakeElement::Tile(tile, log) => {
                let href = tile.href.clone().unwrap_or_default();
                log.borrow_mut().push(format!("activate:{}", href));
                Ok(())
            }
            FakeElement::Next(carousel) => {
                let page = carousel.page.get();
                if page + 1 >= carousel.pages.len() {
                    return Err(E2eError::Interaction("next control is disabled".to_string()));
                }
                carousel.page.set(page + 1);
                carousel
                    .log
                    .borrow_mut()
                    .push(format!("advance:{}", carousel.name));
                Ok(())
            }
            FakeElement::Dismiss(modal) => {
                if !modal.dismissable {
                    return Err(E2eError::Interaction(
                        "close button is covered by another element".to_string(),
                    ));
                }
                modal.present.set(false);
                modal.log.borrow_mut().push("dismiss".to_string());
                Ok(())
            }
            FakeElement::Node(node) => {
                if let Some(hook) = &node.on_click {
                    hook(node);
                }
                Ok(())
            }
            FakeElement::Carousel(_) | FakeElement::Overlay(_) => Ok(()),
        }
    }

    async fn fill(&self, value: &str) -> Result<()> {
        match self {
            FakeElement::Node(node) => {
                node.set_attr("value", value);
                node.log.borrow_mut().push("fill".to_string());
                Ok(())
            }
            _ => Err(E2eError::Interaction("element is not editable".to_string())),
        }
    }
}

/// Fake page: carousels, an optional overlay and static nodes by selector.
pub(crate) struct FakeUi {
    url: RefCell<String>,
    carousels: Vec<Rc<FakeCarousel>>,
    modal: Option<Rc<FakeModal>>,
    nodes: HashMap<String, Vec<Rc<FakeNode>>>,
    disconnected: Option<String>,
    pub log: Log,
}

impl FakeUi {
    pub fn new() -> Self {
        Self {
            url: RefCell::new("about:blank".to_string()),
            carousels: Vec::new(),
            modal: None,
            nodes: HashMap::new(),
            disconnected: None,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Add a carousel whose tiles are split into `pages`.
    pub fn with_carousel(mut self, name: &str, pages: Vec<Vec<FakeTile>>, next: NextControl) -> Self {
        self.carousels.push(Rc::new(FakeCarousel {
            name: name.to_string(),
            pages,
            page: Cell::new(0),
            next,
            log: self.log.clone(),
        }));
        self
    }

    /// Add the playback overlay. `appear_after` is the number of lookups that
    /// miss before it shows; `None` means it never shows.
    pub fn with_modal(mut self, appear_after: Option<usize>, dismissable: bool) -> Self {
        self.modal = Some(Rc::new(FakeModal {
            appear_after: Cell::new(appear_after),
            lookups: Cell::new(0),
            present: Cell::new(false),
            dismissable,
            log: self.log.clone(),
        }));
        self
    }

    pub fn with_node(
        mut self,
        selector: &str,
        attrs: &[(&str, &str)],
        text: Option<&str>,
        on_click: Option<ClickHook>,
    ) -> Self {
        let node = Rc::new(FakeNode {
            attrs: RefCell::new(
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            text: text.map(str::to_string),
            visible: Cell::new(true),
            on_click,
            log: self.log.clone(),
        });
        self.nodes.entry(selector.to_string()).or_default().push(node);
        self
    }

    /// Lookups of `selector` fail the way a dropped browser connection does.
    pub fn with_disconnected_selector(mut self, selector: &str) -> Self {
        self.disconnected = Some(selector.to_string());
        self
    }

    pub fn carousel(&self, index: usize) -> Rc<FakeCarousel> {
        self.carousels[index].clone()
    }

    pub fn modal(&self) -> Option<Rc<FakeModal>> {
        self.modal.clone()
    }

    pub fn set_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
    }

    pub fn entries(&self, prefix: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl UiHandle for FakeUi {
    type Element = FakeElement;

    /// Navigating re-renders every carousel on its first page.
    async fn navigate(&self, url: &str) -> Result<()> {
        self.set_url(url);
        for carousel in &self.carousels {
            carousel.page.set(0);
        }
        self.log.borrow_mut().push(format!("navigate:{}", url));
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.borrow().clone())
    }

    async fn title(&self) -> Result<String> {
        Ok("Fake Player".to_string())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        if self.disconnected.as_deref() == Some(selector) {
            self.log.borrow_mut().push(format!("find:{}", selector));
            return Err(E2eError::ConnectionFailed("websocket closed".to_string()));
        }
        if selector == selectors::CAROUSEL {
            return Ok(self
                .carousels
                .iter()
                .cloned()
                .map(FakeElement::Carousel)
                .collect());
        }
        if let Some(modal) = &self.modal {
            if selector == selectors::PLAYBACK_MODAL {
                return Ok(if modal.lookup() {
                    vec![FakeElement::Overlay(modal.clone())]
                } else {
                    Vec::new()
                });
            }
            if selector == selectors::PLAYBACK_MODAL_CLOSE {
                return Ok(if modal.is_present() {
                    vec![FakeElement::Dismiss(modal.clone())]
                } else {
                    Vec::new()
                });
            }
        }
        Ok(self
            .nodes
            .get(selector)
            .map(|nodes| nodes.iter().cloned().map(FakeElement::Node).collect())
            .unwrap_or_default())
    }

    async fn evaluate_bool(&self, _script: &str) -> Result<bool> {
        Ok(!self.carousels.is_empty())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG fake")?;
        self.log
            .borrow_mut()
            .push(format!("screenshot:{}", path.display()));
        Ok(())
    }
}
