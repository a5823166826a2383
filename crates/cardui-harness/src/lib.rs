#![forbid(unsafe_code)]

//! Test harness for cardui.
//!
//! [`MockPage`] is an in-memory document implementing
//! [`LayoutHost`](cardui_layout::LayoutHost). Layout is fixed at build time
//! (bounding rects and offsets do not reflow when styles change), which is
//! all the engine needs: it measures once on enter and otherwise reads back
//! its own inline styles.
//!
//! ```
//! use cardui_core::Rect;
//! use cardui_harness::MockPage;
//!
//! let mut page = MockPage::new(1024.0);
//! let grid = page.add_grid(Rect::new(0.0, 100.0, 800.0, 400.0));
//! let card = page.add_card(grid, Rect::new(0.0, 100.0, 380.0, 180.0));
//! assert_eq!(page.cards_of(grid), vec![card]);
//! ```

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use cardui_core::Rect;
use cardui_layout::{CardId, GridId, HandId, HandSide, LayoutHost, NodeRef, StyleProp};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct MockGrid {
    id: GridId,
    rect: Rect,
    offset_height: f64,
    cards: Vec<CardId>,
}

#[derive(Debug, Clone)]
struct MockCard {
    rect: Rect,
    offset_top: i32,
}

#[derive(Debug, Clone)]
struct MockHand {
    id: HandId,
    side: HandSide,
    rect: Rect,
}

#[derive(Debug, Clone, Default)]
struct MockElement {
    styles: BTreeMap<&'static str, String>,
    custom: BTreeMap<String, String>,
    classes: BTreeSet<String>,
}

/// A pointer-capture call observed by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCall {
    Set { card: CardId, pointer_id: i32 },
    Release { card: CardId, pointer_id: i32 },
}

/// In-memory page host.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    viewport_width: f64,
    grids: Vec<MockGrid>,
    cards: BTreeMap<CardId, MockCard>,
    hands: Vec<MockHand>,
    elements: FxHashMap<NodeRef, MockElement>,
    root_properties: BTreeMap<String, String>,
    captures: BTreeMap<i32, CardId>,
    capture_log: Vec<CaptureCall>,
    toggle_pressed: bool,
    toggle_label: String,
    style_writes: usize,
    root_reads: Cell<usize>,
}

impl MockPage {
    /// Empty page with the given `innerWidth`.
    #[must_use]
    pub fn new(viewport_width: f64) -> Self {
        Self {
            viewport_width,
            ..Self::default()
        }
    }

    /// Add a grid. `offsetHeight` defaults to the rect height.
    pub fn add_grid(&mut self, rect: Rect) -> GridId {
        let id = GridId(self.grids.len() as u32);
        self.grids.push(MockGrid {
            id,
            rect,
            offset_height: rect.height,
            cards: Vec::new(),
        });
        id
    }

    /// Add a card laid out at `rect` (viewport coordinates). `offsetTop` is
    /// derived from the grid origin.
    pub fn add_card(&mut self, grid: GridId, rect: Rect) -> CardId {
        let id = CardId(self.cards.len() as u32);
        let offset_top = self
            .grid(grid)
            .map_or(0.0, |g| rect.y - g.rect.y)
            .round() as i32;
        self.cards.insert(id, MockCard { rect, offset_top });
        if let Some(g) = self.grids.iter_mut().find(|g| g.id == grid) {
            g.cards.push(id);
        }
        id
    }

    /// Also list an existing card under a second grid (nested grids).
    pub fn adopt_card(&mut self, grid: GridId, card: CardId) {
        if let Some(g) = self.grids.iter_mut().find(|g| g.id == grid) {
            g.cards.push(card);
        }
    }

    /// Add a decorative hand.
    pub fn add_hand(&mut self, side: HandSide, rect: Rect) -> HandId {
        let id = HandId(self.hands.len() as u32);
        self.hands.push(MockHand { id, side, rect });
        id
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    pub fn set_grid_offset_height(&mut self, grid: GridId, height: f64) {
        if let Some(g) = self.grids.iter_mut().find(|g| g.id == grid) {
            g.offset_height = height;
        }
    }

    /// Override a card's measured `offsetTop`.
    pub fn set_card_offset_top(&mut self, card: CardId, offset_top: i32) {
        if let Some(c) = self.cards.get_mut(&card) {
            c.offset_top = offset_top;
        }
    }

    /// Set a computed custom property on the root element.
    pub fn set_root_property(&mut self, name: &str, value: &str) {
        self.root_properties
            .insert(name.to_owned(), value.to_owned());
    }

    /// Seed an inline style without counting it as an engine write.
    pub fn with_style(&mut self, node: NodeRef, prop: StyleProp, value: &str) -> &mut Self {
        self.elements
            .entry(node)
            .or_default()
            .styles
            .insert(prop.css_name(), value.to_owned());
        self
    }

    /// Seed a class without counting it as an engine write.
    pub fn with_class(&mut self, node: NodeRef, class: &str) -> &mut Self {
        self.elements
            .entry(node)
            .or_default()
            .classes
            .insert(class.to_owned());
        self
    }

    #[must_use]
    pub fn cards_of(&self, grid: GridId) -> Vec<CardId> {
        self.grid(grid).map(|g| g.cards.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn has_class(&self, node: NodeRef, class: &str) -> bool {
        self.elements
            .get(&node)
            .is_some_and(|e| e.classes.contains(class))
    }

    #[must_use]
    pub fn custom_property(&self, node: NodeRef, name: &str) -> Option<&str> {
        self.elements
            .get(&node)
            .and_then(|e| e.custom.get(name))
            .map(String::as_str)
    }

    /// All inline styles of a node, keyed by CSS name.
    #[must_use]
    pub fn inline_styles(&self, node: NodeRef) -> BTreeMap<&'static str, String> {
        self.elements
            .get(&node)
            .map(|e| e.styles.clone())
            .unwrap_or_default()
    }

    /// Pointer ids currently captured, ascending.
    #[must_use]
    pub fn captured_pointers(&self) -> Vec<i32> {
        self.captures.keys().copied().collect()
    }

    #[must_use]
    pub fn capture_log(&self) -> &[CaptureCall] {
        &self.capture_log
    }

    #[must_use]
    pub fn toggle_state(&self) -> (bool, &str) {
        (self.toggle_pressed, &self.toggle_label)
    }

    /// Number of inline style writes issued through the host trait.
    #[must_use]
    pub const fn style_writes(&self) -> usize {
        self.style_writes
    }

    /// Number of root custom-property reads (`getComputedStyle` on the
    /// document element in the browser).
    #[must_use]
    pub fn root_reads(&self) -> usize {
        self.root_reads.get()
    }

    fn grid(&self, grid: GridId) -> Option<&MockGrid> {
        self.grids.iter().find(|g| g.id == grid)
    }
}

impl LayoutHost for MockPage {
    fn grids(&self) -> Vec<GridId> {
        self.grids.iter().map(|g| g.id).collect()
    }

    fn cards(&self, grid: GridId) -> Vec<CardId> {
        self.cards_of(grid)
    }

    fn hands(&self) -> Vec<(HandId, HandSide)> {
        self.hands.iter().map(|h| (h.id, h.side)).collect()
    }

    fn card_offset_top(&self, card: CardId) -> i32 {
        self.cards.get(&card).map_or(0, |c| c.offset_top)
    }

    fn bounding_rect(&self, node: NodeRef) -> Rect {
        match node {
            NodeRef::Body => Rect::new(0.0, 0.0, self.viewport_width, 0.0),
            NodeRef::Grid(grid) => self.grid(grid).map(|g| g.rect).unwrap_or_default(),
            NodeRef::Card(card) => self.cards.get(&card).map(|c| c.rect).unwrap_or_default(),
            NodeRef::Hand(hand) => self
                .hands
                .iter()
                .find(|h| h.id == hand)
                .map(|h| h.rect)
                .unwrap_or_default(),
        }
    }

    fn offset_height(&self, node: NodeRef) -> f64 {
        match node {
            NodeRef::Grid(grid) => self.grid(grid).map_or(0.0, |g| g.offset_height),
            other => self.bounding_rect(other).height,
        }
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn root_custom_property(&self, name: &str) -> String {
        self.root_reads.set(self.root_reads.get() + 1);
        self.root_properties.get(name).cloned().unwrap_or_default()
    }

    fn style(&self, node: NodeRef, prop: StyleProp) -> String {
        self.elements
            .get(&node)
            .and_then(|e| e.styles.get(prop.css_name()))
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: NodeRef, prop: StyleProp, value: &str) {
        self.style_writes += 1;
        let styles = &mut self.elements.entry(node).or_default().styles;
        if value.is_empty() {
            styles.remove(prop.css_name());
        } else {
            styles.insert(prop.css_name(), value.to_owned());
        }
    }

    fn set_custom_property(&mut self, node: NodeRef, name: &str, value: &str) {
        self.elements
            .entry(node)
            .or_default()
            .custom
            .insert(name.to_owned(), value.to_owned());
    }

    fn set_class(&mut self, node: NodeRef, class: &str, enabled: bool) {
        let classes = &mut self.elements.entry(node).or_default().classes;
        if enabled {
            classes.insert(class.to_owned());
        } else {
            classes.remove(class);
        }
    }

    fn set_pointer_capture(&mut self, card: CardId, pointer_id: i32) {
        self.captures.insert(pointer_id, card);
        self.capture_log.push(CaptureCall::Set { card, pointer_id });
    }

    fn release_pointer_capture(&mut self, card: CardId, pointer_id: i32) {
        if self.captures.get(&pointer_id) == Some(&card) {
            self.captures.remove(&pointer_id);
        }
        self.capture_log
            .push(CaptureCall::Release { card, pointer_id });
    }

    fn set_toggle_state(&mut self, pressed: bool, label: &str) {
        self.toggle_pressed = pressed;
        self.toggle_label = label.to_owned();
    }
}

/// A 1024px-wide page with one two-column grid of three cards:
/// A and B share the first row, C sits alone on the second.
#[must_use]
pub fn three_card_page() -> (MockPage, GridId, [CardId; 3]) {
    let mut page = MockPage::new(1024.0);
    let grid = page.add_grid(Rect::new(40.0, 100.0, 800.0, 300.0));
    let a = page.add_card(grid, Rect::new(40.0, 100.0, 390.0, 110.0));
    let b = page.add_card(grid, Rect::new(450.0, 100.0, 390.0, 110.0));
    let c = page.add_card(grid, Rect::new(40.0, 220.0, 390.0, 140.0));
    (page, grid, [a, b, c])
}
