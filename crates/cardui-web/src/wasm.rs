#![forbid(unsafe_code)]

//! Browser entry point and `wasm-bindgen` exports.
//!
//! The module mounts itself on `DOMContentLoaded` unless the root element
//! carries `data-cardui-manual`; in that case the embedding page constructs
//! a [`CardPage`] with an explicit JSON config. Either way exactly one page
//! is mounted per document.
//!
//! Listeners live for the lifetime of the page, so their closures are
//! leaked with `Closure::forget`. Controller state sits behind one
//! `Rc<RefCell<_>>`; every callback borrows it for the duration of a single
//! handler and releases it before registering frames.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use cardui_core::{PageConfig, PointerButton, PointerInput};
use js_sys::Reflect;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, EventTarget, HtmlImageElement, PointerEvent, ResizeObserver, Window,
};

use crate::controller::PageController;
use crate::dom::{WebSysHost, js_error, query_all, set_fallback_visible};
use crate::error::HostError;
use crate::logo::{self, LogoEvent};

/// Root attribute that disables auto-mounting.
const MANUAL_ATTRIBUTE: &str = "data-cardui-manual";
/// Optional inline JSON config read by the auto-mount.
const CONFIG_ELEMENT_ID: &str = "cardui-config";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

struct Page {
    host: WebSysHost,
    controller: PageController,
}

type SharedPage = Rc<RefCell<Page>>;

thread_local! {
    static MOUNTED: RefCell<Option<SharedPage>> = const { RefCell::new(None) };
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "cardui panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("cardui panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn install_tracing() {
    // Fails only if the embedding page already installed a subscriber.
    let _ = tracing_wasm::try_set_as_global_default();
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64
}

/// Module start: install diagnostics and auto-mount.
#[wasm_bindgen(start)]
pub fn start() {
    install_panic_hook();
    install_tracing();
    if let Err(err) = auto_mount() {
        warn!(%err, "cardui auto-mount failed; page stays static");
    }
}

fn auto_mount() -> Result<(), HostError> {
    let window = web_sys::window().ok_or(HostError::MissingWindow)?;
    let document = window.document().ok_or(HostError::MissingDocument)?;
    if document
        .document_element()
        .is_some_and(|root| root.has_attribute(MANUAL_ATTRIBUTE))
    {
        debug!("auto-mount disabled by {MANUAL_ATTRIBUTE}");
        return Ok(());
    }

    let loading = Reflect::get(document.as_ref(), &"readyState".into())
        .ok()
        .and_then(|v| v.as_string())
        .is_some_and(|state| state == "loading");
    if !loading {
        return mount(inline_config()).map(|_| ());
    }

    let on_ready = Closure::<dyn FnMut()>::new(|| {
        if let Err(err) = mount(inline_config()) {
            warn!(%err, "cardui mount failed; page stays static");
        }
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    document
        .add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(js_error)?;
    on_ready.forget();
    Ok(())
}

/// Config from `<script type="application/json" id="cardui-config">`, or the
/// defaults when it is absent or invalid.
fn inline_config() -> PageConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    let Some(text) = text else {
        return PageConfig::default();
    };
    PageConfig::from_json_str(&text).unwrap_or_else(|err| {
        warn!(%err, "ignoring inline cardui config");
        PageConfig::default()
    })
}

fn reduced_motion_preferred(window: &Window) -> bool {
    window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .is_some_and(|mql| mql.matches())
}

fn mount(config: PageConfig) -> Result<SharedPage, HostError> {
    if MOUNTED.with(|m| m.borrow().is_some()) {
        return Err(HostError::AlreadyMounted);
    }
    let host = WebSysHost::discover()?;
    let reduced = reduced_motion_preferred(host.window());
    let badges = host.apply_date_badges();
    debug!(badges, "date badges written");
    wire_logo_fallback(&host)?;

    let page = Rc::new(RefCell::new(Page {
        controller: PageController::new(config, random_seed(), reduced),
        host,
    }));
    wire_layout_triggers(&page)?;
    wire_chaos(&page)?;
    wire_hands(&page)?;

    // Two frames so the first measurement sees settled layout.
    let boot_page = Rc::clone(&page);
    request_frame_callback(move || {
        request_frame_callback(move || {
            with_page(&boot_page, |page| page.controller.boot());
        });
    });

    MOUNTED.with(|m| *m.borrow_mut() = Some(Rc::clone(&page)));
    debug!("cardui mounted");
    Ok(page)
}

/// Run `f` on the page, then register a frame if the controller asked for
/// one. Returns `None` for a re-entrant dispatch while the page is borrowed.
fn with_page<R>(page: &SharedPage, f: impl FnOnce(&mut Page) -> R) -> Option<R> {
    let result = {
        let Ok(mut guard) = page.try_borrow_mut() else {
            debug!("re-entrant page dispatch dropped");
            return None;
        };
        f(&mut guard)
    };
    flush_frames(page);
    Some(result)
}

fn flush_frames(page: &SharedPage) {
    let requested = page
        .try_borrow_mut()
        .is_ok_and(|mut guard| guard.controller.take_frame_request());
    if !requested {
        return;
    }
    let frame_page = Rc::clone(page);
    request_frame_callback(move || run_frame(&frame_page));
}

fn run_frame(page: &SharedPage) {
    with_page(page, |page| {
        if page.controller.layout_pending() && !page.controller.chaos().is_active() {
            page.host.rescan();
        }
        let Page { host, controller } = page;
        controller.run_frame(host);
    });
}

fn request_frame_callback(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(f);
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        warn!(err = ?err, "requestAnimationFrame failed");
    }
}

fn listen<T, E>(
    target: &T,
    event: &str,
    mut handler: impl FnMut(E) + 'static,
) -> Result<(), HostError>
where
    T: AsRef<EventTarget>,
    E: JsCast + 'static,
{
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    target
        .as_ref()
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(js_error)?;
    closure.forget();
    Ok(())
}

fn pointer_input(event: &PointerEvent) -> PointerInput {
    PointerInput::new(
        event.pointer_id(),
        f64::from(event.client_x()),
        f64::from(event.client_y()),
        PointerButton::from_dom(event.button()),
    )
}

fn wire_logo_fallback(host: &WebSysHost) -> Result<(), HostError> {
    let Some((image, fallback)) = host.logo_elements() else {
        return Ok(());
    };
    for event in [LogoEvent::Error, LogoEvent::Load] {
        let name = match event {
            LogoEvent::Error => "error",
            LogoEvent::Load => "load",
        };
        let fallback = fallback.clone();
        listen(&image, name, move |_: web_sys::Event| {
            set_fallback_visible(&fallback, event.fallback_visible());
        })?;
    }
    if let Some(visible) = logo::initial_fallback(image.complete(), image.natural_width()) {
        set_fallback_visible(&fallback, visible);
    }
    Ok(())
}

fn wire_layout_triggers(page: &SharedPage) -> Result<(), HostError> {
    let (window, grids) = {
        let guard = page.borrow();
        (guard.host.window().clone(), guard.host.grid_elements().to_vec())
    };

    let observed = Rc::clone(page);
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        with_page(&observed, |page| page.controller.schedule_layout());
    });
    match ResizeObserver::new(on_resize.as_ref().unchecked_ref()) {
        Ok(observer) => {
            for grid in &grids {
                observer.observe(grid);
            }
            on_resize.forget();
        }
        Err(err) => debug!(err = ?err, "ResizeObserver unavailable"),
    }

    let options = AddEventListenerOptions::new();
    options.set_once(true);
    for grid in &grids {
        for image in query_all::<HtmlImageElement>(grid.as_ref(), "img") {
            if image.complete() {
                continue;
            }
            let loaded = Rc::clone(page);
            let on_load = Closure::<dyn FnMut()>::new(move || {
                with_page(&loaded, |page| page.controller.schedule_layout());
            });
            image
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "load",
                    on_load.as_ref().unchecked_ref(),
                    &options,
                )
                .map_err(js_error)?;
            on_load.forget();
        }
    }

    let loaded = Rc::clone(page);
    listen(&window, "load", move |_: web_sys::Event| {
        with_page(&loaded, |page| page.controller.schedule_layout());
    })?;
    for name in ["resize", "orientationchange"] {
        let resized = Rc::clone(page);
        listen(&window, name, move |_: web_sys::Event| {
            with_page(&resized, |page| page.controller.viewport_changed());
        })?;
    }
    Ok(())
}

fn wire_chaos(page: &SharedPage) -> Result<(), HostError> {
    let (document, toggle, grids) = {
        let guard = page.borrow();
        (
            guard.host.document().clone(),
            guard.host.toggle_element().cloned(),
            guard.host.outermost_grid_elements(),
        )
    };
    // Chaos mode needs both the toggle and a grid.
    let Some(toggle) = toggle else {
        return Ok(());
    };
    if grids.is_empty() {
        return Ok(());
    }

    let clicked = Rc::clone(page);
    listen(&toggle, "click", move |_: web_sys::Event| {
        with_page(&clicked, |page| {
            if !page.controller.chaos().is_active() {
                page.host.rescan();
            }
            let Page { host, controller } = page;
            controller.toggle(host);
        });
    })?;

    for grid in &grids {
        let pressed = Rc::clone(page);
        listen(grid, "pointerdown", move |event: PointerEvent| {
            let dispatch = with_page(&pressed, |page| {
                let target = page.host.card_for_target(event.target());
                let Page { host, controller } = page;
                controller.pointer_down(host, target, pointer_input(&event))
            });
            if dispatch.is_some_and(|d| d.prevent_default()) {
                event.prevent_default();
            }
        })?;
    }

    let released = Rc::clone(page);
    listen(&document, "pointerup", move |event: PointerEvent| {
        with_page(&released, |page| {
            let Page { host, controller } = page;
            controller.pointer_up(host, pointer_input(&event));
        });
    })?;
    let cancelled = Rc::clone(page);
    listen(&document, "pointercancel", move |event: PointerEvent| {
        with_page(&cancelled, |page| {
            let Page { host, controller } = page;
            controller.pointer_cancel(host, event.pointer_id());
        });
    })?;
    let lost = Rc::clone(page);
    listen(&document, "lostpointercapture", move |event: PointerEvent| {
        with_page(&lost, |page| {
            let target = page.host.card_for_target(event.target());
            let Page { host, controller } = page;
            controller.lost_pointer_capture(host, event.pointer_id(), target);
        });
    })?;
    Ok(())
}

fn wire_hands(page: &SharedPage) -> Result<(), HostError> {
    let (window, document) = {
        let guard = page.borrow();
        (guard.host.window().clone(), guard.host.document().clone())
    };

    // One document listener drives both drags and hands.
    let moved = Rc::clone(page);
    listen(&document, "pointermove", move |event: PointerEvent| {
        with_page(&moved, |page| {
            let Page { host, controller } = page;
            controller.pointer_move(host, pointer_input(&event));
        });
    })?;

    let root = document.document_element();

    if let Some(root) = root {
        let left = Rc::clone(page);
        listen(&root, "pointerleave", move |_: web_sys::Event| {
            with_page(&left, |page| page.controller.pointer_left());
        })?;
    }

    if let Ok(Some(query)) = window.match_media(REDUCED_MOTION_QUERY) {
        let changed = Rc::clone(page);
        let watched = query.clone();
        listen(&query, "change", move |_: web_sys::Event| {
            let reduced = watched.matches();
            with_page(&changed, |page| page.controller.set_reduced_motion(reduced));
        })?;
    }
    Ok(())
}

/// Handle to the mounted card page.
#[wasm_bindgen]
pub struct CardPage {
    page: SharedPage,
}

#[wasm_bindgen]
impl CardPage {
    /// Mount on the current document with a JSON [`PageConfig`].
    ///
    /// Throws if the config is invalid or a page is already mounted.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<CardPage, JsValue> {
        install_panic_hook();
        install_tracing();
        let config = if config_json.trim().is_empty() {
            PageConfig::default()
        } else {
            PageConfig::from_json_str(config_json)
                .map_err(|err| JsValue::from_str(&err.to_string()))?
        };
        let page = mount(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self { page })
    }

    /// Handle to the page mounted by the module start, if any.
    pub fn attached() -> Option<CardPage> {
        MOUNTED.with(|m| m.borrow().clone()).map(|page| Self { page })
    }

    /// Toggle chaos mode. Returns whether it is active afterwards.
    #[wasm_bindgen(js_name = toggleChaos)]
    pub fn toggle_chaos(&self) -> bool {
        with_page(&self.page, |page| {
            if !page.controller.chaos().is_active() {
                page.host.rescan();
            }
            let Page { host, controller } = page;
            controller.toggle(host);
            controller.chaos().is_active()
        })
        .unwrap_or_else(|| self.is_chaos_active())
    }

    #[wasm_bindgen(js_name = exitChaos)]
    pub fn exit_chaos(&self) {
        with_page(&self.page, |page| {
            let Page { host, controller } = page;
            controller.exit_chaos(host);
        });
    }

    #[wasm_bindgen(js_name = isChaosActive)]
    pub fn is_chaos_active(&self) -> bool {
        self.page
            .try_borrow()
            .is_ok_and(|page| page.controller.chaos().is_active())
    }

    /// Request a row classification on the next frame.
    #[wasm_bindgen(js_name = scheduleLayout)]
    pub fn schedule_layout(&self) {
        with_page(&self.page, |page| {
            page.controller.schedule_layout();
        });
    }

    /// Controller state as JSON (see `ControllerSnapshot`).
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let snapshot = self
            .page
            .try_borrow()
            .map_err(|_| JsValue::from_str("card page is busy"))?
            .controller
            .snapshot();
        serde_json::to_string(&snapshot).map_err(|err| JsValue::from_str(&err.to_string()))
    }
}
