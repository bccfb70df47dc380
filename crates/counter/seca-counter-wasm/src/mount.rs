//! Page wiring: finds counter elements, observes them, runs the frame loop.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use seca_counter_core::{CounterBoard, DisplaySurface, SinkSource, VisibilityTrigger};

use crate::config_from_js;

const STAT_SELECTOR: &str = ".stat-number";
const MAGNITUDE_SELECTOR: &str = ".counter-number[data-count]";
/// Attribute carrying the sink handle assigned at mount.
pub const HANDLE_ATTR: &str = "data-seca-counter";

#[derive(Default)]
struct Elements(HashMap<String, Element>);

impl DisplaySurface for Elements {
    fn write_text(&mut self, sink: &str, text: &str) {
        if let Some(el) = self.0.get(sink) {
            el.set_text_content(Some(text));
        }
    }
}

struct ObserverTrigger<'a> {
    observer: &'a IntersectionObserver,
    elements: &'a Elements,
}

impl VisibilityTrigger for ObserverTrigger<'_> {
    // The threshold is fixed when the observer is created.
    fn observe(&mut self, sink: &str, _threshold: f32) {
        if let Some(el) = self.elements.0.get(sink) {
            self.observer.observe(el);
        }
    }

    fn unobserve(&mut self, sink: &str) {
        if let Some(el) = self.elements.0.get(sink) {
            self.observer.unobserve(el);
        }
    }
}

struct Shared {
    board: CounterBoard,
    elements: Elements,
    // Self-referencing requestAnimationFrame callback.
    frame: Option<Closure<dyn FnMut(f64)>>,
    frame_request: Option<i32>,
}

fn request_frame(shared: &mut Shared) {
    if shared.frame_request.is_some() || shared.board.is_idle() {
        return;
    }
    let (Some(window), Some(frame)) = (web_sys::window(), shared.frame.as_ref()) else {
        return;
    };
    match window.request_animation_frame(frame.as_ref().unchecked_ref()) {
        Ok(id) => shared.frame_request = Some(id),
        Err(e) => log::warn!("requestAnimationFrame failed: {e:?}"),
    }
}

fn js_err(context: &str, e: JsValue) -> JsError {
    JsError::new(&format!("{context}: {e:?}"))
}

fn collect(
    document: &Document,
    selector: &str,
    prefix: &str,
    read: impl Fn(&Element) -> Option<SinkSource>,
    board: &mut CounterBoard,
    elements: &mut Elements,
) -> Result<(), JsError> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(|e| js_err("mount query error", e))?;
    let mut next = 0;
    for i in 0..nodes.length() {
        let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        // Already bound, by an earlier selector or a live mount.
        if el.has_attribute(HANDLE_ATTR) {
            continue;
        }
        let Some(source) = read(&el) else {
            continue;
        };
        let handle = format!("{prefix}-{next}");
        next += 1;
        el.set_attribute(HANDLE_ATTR, &handle)
            .map_err(|e| js_err("mount attribute error", e))?;
        if board.register(&handle, source) {
            elements.0.insert(handle, el);
        }
    }
    Ok(())
}

/// Live page binding returned by `mount`. Counters animate only while this
/// handle is alive: dropping or freeing it disconnects the observer, cancels
/// any pending frame and releases the elements.
#[wasm_bindgen]
pub struct CounterMount {
    shared: Rc<RefCell<Shared>>,
    observer: IntersectionObserver,
    _on_intersect: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

#[wasm_bindgen]
impl CounterMount {
    /// Number of counter elements found on the page.
    #[wasm_bindgen(js_name = sink_count)]
    pub fn sink_count(&self) -> usize {
        self.shared.borrow().elements.0.len()
    }

    #[wasm_bindgen(js_name = is_idle)]
    pub fn is_idle(&self) -> bool {
        self.shared.borrow().board.is_idle()
    }

    /// Stop observing; runs already in flight finish normally.
    #[wasm_bindgen]
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for CounterMount {
    fn drop(&mut self) {
        self.observer.disconnect();
        let frame = {
            let mut guard = self.shared.borrow_mut();
            let shared = &mut *guard;
            if let (Some(id), Some(window)) = (shared.frame_request.take(), web_sys::window()) {
                if let Err(e) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {e:?}");
                }
            }
            for el in shared.elements.0.values() {
                let _ = el.remove_attribute(HANDLE_ATTR);
            }
            // The frame closure holds the last other reference to `shared`.
            shared.frame.take()
        };
        drop(frame);
    }
}

/// Bind every `.stat-number` and `.counter-number[data-count]` element on the
/// page. Each animates once, the first time it is half visible.
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<CounterMount, JsError> {
    console_error_panic_hook::set_once();
    let cfg = config_from_js(config)?;
    let window = web_sys::window().ok_or_else(|| JsError::new("mount: no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsError::new("mount: no document"))?;

    let threshold = f64::from(cfg.visibility_threshold);
    let mut board = CounterBoard::new(cfg);
    let mut elements = Elements::default();
    collect(
        &document,
        STAT_SELECTOR,
        "stat",
        |el| {
            Some(SinkSource::Stat {
                label: el.text_content().unwrap_or_default(),
            })
        },
        &mut board,
        &mut elements,
    )?;
    collect(
        &document,
        MAGNITUDE_SELECTOR,
        "count",
        |el| {
            el.get_attribute("data-count")
                .map(|count| SinkSource::Magnitude { count })
        },
        &mut board,
        &mut elements,
    )?;
    log::debug!("mounted {} counter sinks", elements.0.len());

    let shared = Rc::new(RefCell::new(Shared {
        board,
        elements,
        frame: None,
        frame_request: None,
    }));

    let frame_shared = shared.clone();
    let frame = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
        let mut guard = frame_shared.borrow_mut();
        let shared = &mut *guard;
        shared.frame_request = None;
        let out = shared.board.update(now);
        out.apply(&mut shared.elements);
        request_frame(shared);
    });
    shared.borrow_mut().frame = Some(frame);

    let intersect_shared = shared.clone();
    let on_intersect = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            let mut guard = intersect_shared.borrow_mut();
            let shared = &mut *guard;
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let Some(handle) = entry.target().get_attribute(HANDLE_ATTR) else {
                    continue;
                };
                let mut trigger = ObserverTrigger {
                    observer: &observer,
                    elements: &shared.elements,
                };
                shared.board.on_visible(&handle, &mut trigger);
            }
            request_frame(shared);
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init)
            .map_err(|e| js_err("mount observer error", e))?;

    {
        let mut guard = shared.borrow_mut();
        let shared = &mut *guard;
        let mut trigger = ObserverTrigger {
            observer: &observer,
            elements: &shared.elements,
        };
        shared.board.attach(&mut trigger);
    }

    Ok(CounterMount {
        shared,
        observer,
        _on_intersect: on_intersect,
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn dropping_the_mount_releases_page_state() {
        let document = web_sys::window().unwrap().document().unwrap();
        let body = document.body().unwrap();
        let stat = document.create_element("div").unwrap();
        stat.set_class_name("stat-number");
        stat.set_text_content(Some("85%"));
        body.append_child(&stat).unwrap();

        let mounted = mount(JsValue::NULL).unwrap();
        assert_eq!(stat.get_attribute(HANDLE_ATTR).as_deref(), Some("stat-0"));
        let weak = Rc::downgrade(&mounted.shared);
        drop(mounted);

        // No closure or observer callback can reach the state any more.
        assert!(weak.upgrade().is_none());
        assert_eq!(stat.get_attribute(HANDLE_ATTR), None);
        assert_eq!(stat.text_content().as_deref(), Some("85%"));
        stat.remove();
    }
}
