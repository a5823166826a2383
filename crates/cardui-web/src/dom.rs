#![forbid(unsafe_code)]

//! `web-sys` implementation of [`LayoutHost`].
//!
//! Elements are discovered with `querySelectorAll` and kept in registries
//! indexed by the ids handed to the engine. [`WebSysHost::rescan`] rebuilds
//! the registries; callers only do that while chaos mode is idle, because
//! the chaos snapshots are keyed by those ids.
//!
//! Only compiled on `wasm32` targets.

use cardui_core::Rect;
use cardui_layout::{CardId, GridId, HandId, HandSide, LayoutHost, NodeRef, StyleProp};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CssStyleDeclaration, Document, Element, EventTarget, HtmlElement, HtmlImageElement, Window,
};

use crate::date_badge::{self, DOW_SELECTOR, LEGACY_TARGET_ID, TARGET_SELECTOR};
use crate::error::HostError;
use crate::logo::{self, FALLBACK_SELECTOR, LOGO_ID, VISIBLE_CLASS};

pub const GRID_SELECTOR: &str = ".grid";
pub const CARD_SELECTOR: &str = ".card";
pub const HAND_SELECTOR: &str = ".js-hand";
pub const TOGGLE_ID: &str = "hate-html-toggle";

pub(crate) fn js_error(value: JsValue) -> HostError {
    HostError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn same_element(known: &HtmlElement, other: &Element) -> bool {
    let known: &JsValue = known.as_ref();
    let other: &JsValue = other.as_ref();
    known == other
}

/// Elements matching `selector` under `root`, in document order.
pub(crate) fn query_all<T: JsCast>(root: &JsValue, selector: &str) -> Vec<T> {
    let list = if let Some(document) = root.dyn_ref::<Document>() {
        document.query_selector_all(selector)
    } else if let Some(element) = root.dyn_ref::<Element>() {
        element.query_selector_all(selector)
    } else {
        return Vec::new();
    };
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// Show or hide the logo fallback block.
pub fn set_fallback_visible(fallback: &HtmlElement, visible: bool) {
    let _ = fallback
        .style()
        .set_property("display", logo::fallback_display(visible));
    let _ = fallback
        .class_list()
        .toggle_with_force(VISIBLE_CLASS, visible);
}

/// Browser document seen through the engine's host seam.
pub struct WebSysHost {
    window: Window,
    document: Document,
    body: HtmlElement,
    root: Element,
    toggle: Option<HtmlElement>,
    grids: Vec<HtmlElement>,
    grid_cards: Vec<Vec<CardId>>,
    cards: Vec<HtmlElement>,
    hands: Vec<(HtmlElement, HandSide)>,
}

impl WebSysHost {
    /// Bind to the global document and discover its elements.
    pub fn discover() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::MissingWindow)?;
        let document = window.document().ok_or(HostError::MissingDocument)?;
        let body = document.body().ok_or(HostError::MissingBody)?;
        let root = document
            .document_element()
            .ok_or(HostError::MissingDocument)?;
        let mut host = Self {
            window,
            document,
            body,
            root,
            toggle: None,
            grids: Vec::new(),
            grid_cards: Vec::new(),
            cards: Vec::new(),
            hands: Vec::new(),
        };
        host.rescan();
        Ok(host)
    }

    /// Rebuild the element registries from the live document.
    pub fn rescan(&mut self) {
        let document: &JsValue = self.document.as_ref();
        self.toggle = self
            .document
            .get_element_by_id(TOGGLE_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        self.grids = query_all(document, GRID_SELECTOR);
        self.cards.clear();
        self.grid_cards.clear();
        for grid in &self.grids {
            let mut members = Vec::new();
            for card in query_all::<HtmlElement>(grid.as_ref(), CARD_SELECTOR) {
                let id = match self.cards.iter().position(|known| same_element(known, &card)) {
                    Some(index) => index,
                    None => {
                        self.cards.push(card);
                        self.cards.len() - 1
                    }
                };
                members.push(CardId(id as u32));
            }
            self.grid_cards.push(members);
        }
        self.hands = query_all::<HtmlElement>(document, HAND_SELECTOR)
            .into_iter()
            .map(|hand| {
                let side = hand
                    .get_attribute("data-side")
                    .map(|v| HandSide::from_attr(&v))
                    .unwrap_or_default();
                (hand, side)
            })
            .collect();
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn grid_elements(&self) -> &[HtmlElement] {
        &self.grids
    }

    /// Grids not nested inside another grid. A `pointerdown` bubbles
    /// through every enclosing grid, so listeners go on these only.
    #[must_use]
    pub fn outermost_grid_elements(&self) -> Vec<HtmlElement> {
        self.grids
            .iter()
            .filter(|grid| {
                grid.parent_element()
                    .and_then(|parent| parent.closest(GRID_SELECTOR).ok().flatten())
                    .is_none()
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn toggle_element(&self) -> Option<&HtmlElement> {
        self.toggle.as_ref()
    }

    /// The registered card containing an event target (`closest('.card')`).
    #[must_use]
    pub fn card_for_target(&self, target: Option<EventTarget>) -> Option<CardId> {
        let element = target?.dyn_into::<Element>().ok()?;
        let card = element.closest(CARD_SELECTOR).ok()??;
        self.cards
            .iter()
            .position(|known| same_element(known, &card))
            .map(|index| CardId(index as u32))
    }

    /// Write `(Wkd)` into the `.dow` of every date target. Returns how many
    /// labels were written.
    pub fn apply_date_badges(&self) -> usize {
        let mut targets: Vec<Element> = self
            .document
            .get_element_by_id(LEGACY_TARGET_ID)
            .into_iter()
            .collect();
        let document: &JsValue = self.document.as_ref();
        for target in query_all::<Element>(document, TARGET_SELECTOR) {
            let seen: &JsValue = target.as_ref();
            if !targets.iter().any(|known| AsRef::<JsValue>::as_ref(known) == seen) {
                targets.push(target);
            }
        }

        let mut written = 0;
        for target in targets {
            let is_time = target.tag_name().eq_ignore_ascii_case("time");
            let data_date = target.get_attribute("data-date");
            let datetime = target.get_attribute("datetime");
            let Some(text) =
                date_badge::badge_for(data_date.as_deref(), datetime.as_deref(), is_time)
            else {
                continue;
            };
            if let Ok(Some(dow)) = target.query_selector(DOW_SELECTOR) {
                dow.set_text_content(Some(&text));
                written += 1;
            }
        }
        written
    }

    /// The logo image and its fallback block, when both exist.
    #[must_use]
    pub fn logo_elements(&self) -> Option<(HtmlImageElement, HtmlElement)> {
        let image = self
            .document
            .get_element_by_id(LOGO_ID)?
            .dyn_into::<HtmlImageElement>()
            .ok()?;
        let fallback = self
            .document
            .query_selector(FALLBACK_SELECTOR)
            .ok()??
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some((image, fallback))
    }

    fn element(&self, node: NodeRef) -> Option<&HtmlElement> {
        match node {
            NodeRef::Body => Some(&self.body),
            NodeRef::Grid(grid) => self.grids.get(grid.0 as usize),
            NodeRef::Card(card) => self.cards.get(card.0 as usize),
            NodeRef::Hand(hand) => self.hands.get(hand.0 as usize).map(|(el, _)| el),
        }
    }

    fn inline_style(&self, node: NodeRef) -> Option<CssStyleDeclaration> {
        self.element(node).map(HtmlElement::style)
    }
}

impl LayoutHost for WebSysHost {
    fn grids(&self) -> Vec<GridId> {
        (0..self.grids.len()).map(|i| GridId(i as u32)).collect()
    }

    fn cards(&self, grid: GridId) -> Vec<CardId> {
        self.grid_cards
            .get(grid.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn hands(&self) -> Vec<(HandId, HandSide)> {
        self.hands
            .iter()
            .enumerate()
            .map(|(i, (_, side))| (HandId(i as u32), *side))
            .collect()
    }

    fn card_offset_top(&self, card: CardId) -> i32 {
        self.cards.get(card.0 as usize).map_or(0, HtmlElement::offset_top)
    }

    fn bounding_rect(&self, node: NodeRef) -> Rect {
        self.element(node).map_or_else(Rect::default, |el| {
            let rect = el.get_bounding_client_rect();
            Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
        })
    }

    fn offset_height(&self, node: NodeRef) -> f64 {
        self.element(node)
            .map_or(0.0, |el| f64::from(el.offset_height()))
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn root_custom_property(&self, name: &str) -> String {
        self.window
            .get_computed_style(&self.root)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(name).ok())
            .unwrap_or_default()
    }

    fn style(&self, node: NodeRef, prop: StyleProp) -> String {
        self.inline_style(node)
            .and_then(|style| style.get_property_value(prop.css_name()).ok())
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: NodeRef, prop: StyleProp, value: &str) {
        let Some(style) = self.inline_style(node) else {
            return;
        };
        if value.is_empty() {
            let _ = style.remove_property(prop.css_name());
        } else {
            let _ = style.set_property(prop.css_name(), value);
        }
    }

    fn set_custom_property(&mut self, node: NodeRef, name: &str, value: &str) {
        if let Some(style) = self.inline_style(node) {
            let _ = style.set_property(name, value);
        }
    }

    fn set_class(&mut self, node: NodeRef, class: &str, enabled: bool) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().toggle_with_force(class, enabled);
        }
    }

    fn set_pointer_capture(&mut self, card: CardId, pointer_id: i32) {
        if let Some(el) = self.cards.get(card.0 as usize) {
            let _ = el.set_pointer_capture(pointer_id);
        }
    }

    fn release_pointer_capture(&mut self, card: CardId, pointer_id: i32) {
        // Throws NotFoundError when the capture is already gone.
        if let Some(el) = self.cards.get(card.0 as usize) {
            let _ = el.release_pointer_capture(pointer_id);
        }
    }

    fn set_toggle_state(&mut self, pressed: bool, label: &str) {
        let Some(toggle) = &self.toggle else {
            return;
        };
        let _ = toggle.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
        toggle.set_text_content(Some(label));
    }
}
