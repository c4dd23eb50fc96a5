//! Thought Void entry point
//!
//! Wires the controller to the page on the web and runs a headless demo natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_void {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement,
        HtmlTextAreaElement,
    };

    use thought_void::persistence::LocalStorage;
    use thought_void::platform::SystemClock;
    use thought_void::platform::web::{DomAnchors, prefers_reduced_motion};
    use thought_void::renderer::CanvasRenderer;
    use thought_void::store::JsStore;
    use thought_void::{UiState, VoidApp};

    const VISIBLE: &str = "is-visible";

    /// Page instance: controller plus everything bound to the DOM
    struct Page {
        app: Rc<VoidApp>,
        renderer: CanvasRenderer,
        canvas: HtmlCanvasElement,
        document: Document,
        /// Last state pushed to the DOM
        shown: Option<UiState>,
    }

    impl Page {
        fn render(&mut self) {
            self.app.frame();
            if let Err(e) = self.renderer.render(&self.app.draw_list()) {
                log::error!("Render failed: {:?}", e);
            }
            self.sync_ui();
        }

        /// Copy controller state into the DOM when it changed
        fn sync_ui(&mut self) {
            let ui = self.app.ui();
            if self.shown.as_ref() == Some(&ui) {
                return;
            }
            let doc = &self.document;

            if let Some(button) = button(doc, "release-button") {
                button.set_text_content(Some(&ui.release_label));
                button.set_disabled(ui.release_disabled);
            }
            if let Some(button) = button(doc, "listen-button") {
                button.set_text_content(Some(&ui.listen_label));
                button.set_disabled(ui.listen_disabled);
            }
            if let Some(button) = button(doc, "compose-button") {
                button.set_disabled(!ui.compose_enabled);
            }
            if let Ok(Some(el)) = doc.query_selector(".modal-text") {
                if let Some(text) = &ui.modal_text {
                    el.set_text_content(Some(text));
                }
            }
            if let Some(el) = doc.get_element_by_id("feedback-message") {
                let text = ui.feedback.as_ref().map(|f| f.text.as_str()).unwrap_or("");
                el.set_text_content(Some(text));
            }
            if let Some(title) = &ui.title {
                if let Ok(Some(el)) = doc.query_selector(".main-title") {
                    el.set_text_content(Some(title));
                }
            }
            if let Some(button) = button(doc, "animation-toggle") {
                button.set_text_content(Some(if ui.animation_enabled {
                    "Pause the Void"
                } else {
                    "Animate the Void"
                }));
            }
            if let Some(button) = button(doc, "quality-toggle") {
                button.set_text_content(Some(&format!("Quality: {}", ui.quality.as_str())));
            }

            self.shown = Some(ui);
        }

        fn resize(&mut self) {
            let (w, h) = viewport_size();
            self.canvas.set_width(w as u32);
            self.canvas.set_height(h as u32);
            self.app.on_resize(w, h);
        }
    }

    fn button(doc: &Document, id: &str) -> Option<HtmlButtonElement> {
        doc.get_element_by_id(id)?.dyn_into().ok()
    }

    fn viewport_size() -> (f32, f32) {
        let window = web_sys::window().expect("no window");
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        (w as f32, h as f32)
    }

    fn set_visible(doc: &Document, id: &str, visible: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if visible {
                classes.add_1(VISIBLE)
            } else {
                classes.remove_1(VISIBLE)
            };
        }
    }

    fn on_click(doc: &Document, id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        if let Some(el) = doc.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Thought Void starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("blackhole-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let (width, height) = viewport_size();
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("context lookup failed")
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");
        let renderer = CanvasRenderer::new(ctx).expect("Failed to create gradients");

        let seed = js_sys::Date::now() as u64;
        let store = Rc::new(JsStore::new(seed));
        let app = Rc::new(VoidApp::new(
            store.clone(),
            Rc::new(LocalStorage),
            Rc::new(SystemClock),
            Rc::new(DomAnchors),
            width,
            height,
            seed,
        ));
        app.set_reduced_motion_preference(prefers_reduced_motion());
        log::info!("Void initialized with seed: {}", seed);

        let page = Rc::new(RefCell::new(Page {
            app: app.clone(),
            renderer,
            canvas,
            document: document.clone(),
            shown: None,
        }));

        // Identity notifications may repeat; the controller tolerates that
        {
            let app = app.clone();
            store.subscribe_identity(move |identity| {
                let app = app.clone();
                spawn_local(async move {
                    if let Err(e) = app.handle_identity_change(identity).await {
                        log::error!("Identity handling failed: {}", e);
                    }
                });
            });
        }

        setup_compose(&document, app.clone());
        setup_listen(&document, app.clone());
        setup_window_handlers(page.clone(), app.clone());

        request_animation_frame(page);

        log::info!("Thought Void running!");
    }

    fn setup_compose(doc: &Document, app: Rc<VoidApp>) {
        {
            let doc2 = doc.clone();
            on_click(doc, "compose-button", move |_| {
                set_visible(&doc2, "compose-modal", true);
                if let Some(el) = doc2.get_element_by_id("post-content") {
                    if let Ok(area) = el.dyn_into::<web_sys::HtmlElement>() {
                        let _ = area.focus();
                    }
                }
            });
        }
        {
            let doc2 = doc.clone();
            on_click(doc, "compose-close-button", move |_| {
                set_visible(&doc2, "compose-modal", false);
            });
        }
        {
            let doc2 = doc.clone();
            let modal = doc.get_element_by_id("compose-modal").map(JsValue::from);
            on_click(doc, "compose-modal", move |event| {
                if event.target().map(JsValue::from) == modal {
                    set_visible(&doc2, "compose-modal", false);
                }
            });
        }
        {
            let doc2 = doc.clone();
            on_click(doc, "release-button", move |_| {
                let Some(area) = doc2
                    .get_element_by_id("post-content")
                    .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
                else {
                    return;
                };
                let content = area.value();
                let app = app.clone();
                let doc3 = doc2.clone();
                spawn_local(async move {
                    if app.release_thought(&content).await.is_ok() {
                        area.set_value("");
                        set_visible(&doc3, "compose-modal", false);
                    }
                });
            });
        }
    }

    fn setup_listen(doc: &Document, app: Rc<VoidApp>) {
        {
            let doc2 = doc.clone();
            let app = app.clone();
            on_click(doc, "listen-button", move |_| {
                set_visible(&doc2, "post-modal", true);
                let app = app.clone();
                spawn_local(async move {
                    if let Err(e) = app.listen_to_void().await {
                        log::warn!("Listen failed: {}", e);
                    }
                });
            });
        }
        {
            let doc2 = doc.clone();
            let app = app.clone();
            on_click(doc, "modal-close-button", move |_| {
                set_visible(&doc2, "post-modal", false);
                app.dismiss_modal();
            });
        }
        {
            let doc2 = doc.clone();
            let modal = doc.get_element_by_id("post-modal").map(JsValue::from);
            on_click(doc, "post-modal", move |event| {
                if event.target().map(JsValue::from) == modal {
                    set_visible(&doc2, "post-modal", false);
                    app.dismiss_modal();
                }
            });
        }
    }

    fn setup_window_handlers(page: Rc<RefCell<Page>>, app: Rc<VoidApp>) {
        let window = web_sys::window().expect("no window");
        let document = page.borrow().document.clone();

        // Escape closes both modals
        {
            let doc = document.clone();
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Escape" {
                    set_visible(&doc, "compose-modal", false);
                    set_visible(&doc, "post-modal", false);
                    app.dismiss_modal();
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                page.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Optional animation and quality toggles
        {
            let app = app.clone();
            on_click(&document, "animation-toggle", move |_| {
                app.set_animation_enabled(!app.animation_enabled());
            });
        }
        on_click(&document, "quality-toggle", move |_| {
            app.cycle_quality();
        });
    }

    fn request_animation_frame(page: Rc<RefCell<Page>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            frame_loop(page);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(page: Rc<RefCell<Page>>) {
        page.borrow_mut().render();
        request_animation_frame(page);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_void::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Thought Void (native) starting...");
    log::info!("The page needs a browser - run with `trunk serve` for the web version");

    println!("\nRunning headless void...");
    headless_void();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Release and listen against the in-memory backend, printing what happens
#[cfg(not(target_arch = "wasm32"))]
fn headless_void() {
    use std::rc::Rc;
    use thought_void::persistence::MemoryKv;
    use thought_void::platform::{FixedAnchors, ManualClock};
    use thought_void::store::{AuthorId, MemoryStore};
    use thought_void::{ListenOutcome, VoidApp};

    let clock = Rc::new(ManualClock::new(0.0));
    let store = Rc::new(MemoryStore::new(clock.clone(), 7));
    for (author, text) in [
        ("stranger-1", "the stars feel closer tonight"),
        ("stranger-2", "i hope someone reads this"),
        ("stranger-3", "letting go"),
    ] {
        store.insert(&AuthorId::new(author), text);
    }

    let app = VoidApp::new(
        store.clone(),
        Rc::new(MemoryKv::new()),
        clock.clone(),
        Rc::new(FixedAnchors::new()),
        1280.0,
        720.0,
        7,
    );

    if let Err(e) = pollster::block_on(app.handle_identity_change(None)) {
        println!("✗ {}", e.user_message());
        return;
    }

    match pollster::block_on(app.release_thought("hello void")) {
        Ok(id) => println!("✓ Released thought {} ({})", id, app.ui().release_label),
        Err(e) => println!("✗ {}", e.user_message()),
    }

    for _ in 0..300 {
        clock.advance(16.0);
        app.frame();
    }
    let (thoughts, transitions) = app.thought_counts();
    println!(
        "✓ After 300 frames: {} thought(s) orbiting, {} in transit",
        thoughts, transitions
    );

    for _ in 0..3 {
        match pollster::block_on(app.listen_to_void()) {
            Ok(ListenOutcome::Heard(post)) => println!("♪ Heard: {}", post.content),
            Ok(ListenOutcome::Silent) => println!("… {}", thought_void::app::SILENT_MODAL),
            Err(e) => println!("✗ {}", e.user_message()),
        }
    }
}
