// Driftchat Widget — DOM adapter
//
// Owns the mounted DOM and drives the driftchat-core state machine from
// browser events. The state machine is the single source of truth: every
// handler feeds an event in, then mirrors the resulting state back out
// through the sync_* functions. No behavior rules live here.

use crate::dom;
use crate::listeners::ListenerGuard;
use driftchat_core::{
    ChatRequest, ChatResponse, Point, SendOutcome, Size, SurfaceId, WidgetOptions, WidgetState,
    WidgetTheme,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent};

const STYLE_ID: &str = "driftchat-style";
const TRIGGER_ID: &str = "driftchat-trigger";
/// Pointer travel below this still counts as a click on the trigger.
const DRAG_SLOP_PX: f64 = 4.0;

// One widget per page. The Rc parked here keeps every listener alive.
thread_local! {
    static MOUNTED: RefCell<Option<Rc<Shared>>> = RefCell::new(None);
}

struct Dom {
    document: Document,
    trigger: HtmlElement,
    panel: HtmlElement,
    header: HtmlElement,
    close: HtmlElement,
    messages: HtmlElement,
    input: HtmlInputElement,
    send: HtmlButtonElement,
}

struct Shared {
    state: RefCell<WidgetState>,
    dom: Dom,
    endpoint: String,
    theme: WidgetTheme,
    /// Monotonic send id; a landing response with a stale id is dropped.
    send_seq: Cell<u64>,
    /// Set while a trigger drag actually moved, so the click that the
    /// browser fires on release does not also toggle the panel.
    trigger_dragged: Cell<bool>,
    /// Document-level mousemove/mouseup guards, held only mid-drag.
    drag: RefCell<Option<DragGuards>>,
    /// Widget-lifetime listeners.
    permanent: RefCell<Vec<ListenerGuard>>,
}

struct DragGuards {
    _move: ListenerGuard,
    _up: ListenerGuard,
}

// ── Mount ──────────────────────────────────────────────────────────────

pub(crate) fn mount(options: WidgetOptions) -> Result<(), JsValue> {
    if MOUNTED.with(|m| m.borrow().is_some()) {
        log::warn!("[widget] already mounted, ignoring second mount");
        return Ok(());
    }

    let window = dom::window()?;
    let document = dom::document(&window)?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    inject_stylesheet(&document)?;
    let WidgetOptions { endpoint, theme } = options;
    let built = build_dom(&document, &theme)?;
    body.append_child(&built.trigger)?;
    body.append_child(&built.panel)?;

    let mut state = WidgetState::new(dom::viewport_size(&window));
    // Adopt the rendered trigger box in case host CSS resized it.
    let rect = built.trigger.get_bounding_client_rect();
    if rect.width() > 0.0 {
        state.set_surface_size(SurfaceId::Trigger, Size::new(rect.width(), rect.height()));
    }

    let shared = Rc::new(Shared {
        state: RefCell::new(state),
        dom: built,
        endpoint,
        theme,
        send_seq: Cell::new(0),
        trigger_dragged: Cell::new(false),
        drag: RefCell::new(None),
        permanent: RefCell::new(Vec::new()),
    });

    wire(&shared)?;
    sync_positions(&shared);
    sync_messages(&shared);
    sync_input(&shared);

    log::info!("[widget] mounted (endpoint {})", shared.endpoint);
    MOUNTED.with(|m| *m.borrow_mut() = Some(shared));
    Ok(())
}

fn inject_stylesheet(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(STYLESHEET));
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("document has no head"))?;
    head.append_child(&style)?;
    Ok(())
}

fn build_dom(document: &Document, theme: &WidgetTheme) -> Result<Dom, JsValue> {
    let trigger = dom::create(document, "button", "dc-trigger")?;
    trigger.set_id(TRIGGER_ID);
    trigger.set_inner_text("💬");
    trigger.set_attribute("type", "button")?;
    trigger.set_attribute("aria-label", "Open chat")?;
    dom::set_style(&trigger, "background", &theme.button_color);

    let panel = dom::create(document, "div", "dc-panel")?;

    let header = dom::create(document, "div", "dc-header")?;
    dom::set_style(&header, "background", &theme.header_gradient);
    let title = dom::create(document, "span", "dc-title")?;
    title.set_inner_text(&theme.title);
    let close = dom::create(document, "button", "dc-close")?;
    close.set_inner_text("\u{00d7}");
    close.set_attribute("type", "button")?;
    close.set_attribute("aria-label", "Close chat")?;
    header.append_child(&title)?;
    header.append_child(&close)?;

    let messages = dom::create(document, "div", "dc-messages")?;

    let input_row = dom::create(document, "div", "dc-inputrow")?;
    let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    input.set_class_name("dc-input");
    input.set_type("text");
    input.set_placeholder(&theme.input_placeholder);
    let send: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
    send.set_class_name("dc-send");
    send.set_type("button");
    send.set_inner_text("Send");
    dom::set_style(&send, "background", &theme.button_color);
    input_row.append_child(&input)?;
    input_row.append_child(&send)?;

    panel.append_child(&header)?;
    panel.append_child(&messages)?;
    panel.append_child(&input_row)?;

    Ok(Dom {
        document: document.clone(),
        trigger,
        panel,
        header,
        close,
        messages,
        input,
        send,
    })
}

// ── Event wiring ───────────────────────────────────────────────────────

fn wire(shared: &Rc<Shared>) -> Result<(), JsValue> {
    let window = dom::window()?;
    let mut guards = Vec::new();

    let s = shared.clone();
    guards.push(ListenerGuard::attach(
        &shared.dom.trigger,
        "mousedown",
        move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else { return };
            event.prevent_default();
            s.trigger_dragged.set(false);
            if let Err(e) = begin_drag_session(&s, SurfaceId::Trigger, mouse) {
                log::warn!("[widget] drag wiring failed: {e:?}");
            }
        },
    )?);

    // The browser fires click on release; a real drag swallows it.
    let s = shared.clone();
    guards.push(ListenerGuard::attach(&shared.dom.trigger, "click", move |_event| {
        if s.trigger_dragged.replace(false) {
            return;
        }
        toggle_panel(&s);
    })?);

    let s = shared.clone();
    guards.push(ListenerGuard::attach(
        &shared.dom.header,
        "mousedown",
        move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else { return };
            event.prevent_default();
            if let Err(e) = begin_drag_session(&s, SurfaceId::Panel, mouse) {
                log::warn!("[widget] drag wiring failed: {e:?}");
            }
        },
    )?);

    let s = shared.clone();
    guards.push(ListenerGuard::attach(&shared.dom.close, "click", move |event| {
        event.stop_propagation();
        toggle_panel(&s);
    })?);
    // Keep the close button from starting a header drag.
    guards.push(ListenerGuard::attach(&shared.dom.close, "mousedown", |event| {
        event.stop_propagation();
    })?);

    let s = shared.clone();
    guards.push(ListenerGuard::attach(&shared.dom.send, "click", move |_event| {
        submit(&s);
    })?);

    let s = shared.clone();
    guards.push(ListenerGuard::attach(&shared.dom.input, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
        if key.key() == "Enter" {
            event.prevent_default();
            submit(&s);
        }
    })?);

    let s = shared.clone();
    guards.push(ListenerGuard::attach(&shared.dom.input, "input", move |_event| {
        let value = s.dom.input.value();
        s.state.borrow_mut().set_draft(&value);
    })?);

    let s = shared.clone();
    let win = window.clone();
    guards.push(ListenerGuard::attach(&window, "resize", move |_event| {
        s.state.borrow_mut().resize_viewport(dom::viewport_size(&win));
        sync_positions(&s);
    })?);

    *shared.permanent.borrow_mut() = guards;
    Ok(())
}

/// Start a drag: feed the grab point to the state machine and hold
/// document-level move/up listeners until release. Dropping the guards on
/// mouseup is what detaches them.
fn begin_drag_session(
    shared: &Rc<Shared>,
    surface: SurfaceId,
    mouse: &MouseEvent,
) -> Result<(), JsValue> {
    let origin = pointer_of(mouse);
    shared.state.borrow_mut().begin_drag(surface, origin);

    let s = shared.clone();
    let on_move = move |event: web_sys::Event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else { return };
        let at = pointer_of(mouse);
        if surface == SurfaceId::Trigger
            && (at.x - origin.x).hypot(at.y - origin.y) > DRAG_SLOP_PX
        {
            s.trigger_dragged.set(true);
        }
        if s.state.borrow_mut().pointer_move(at) {
            sync_positions(&s);
        }
    };

    let s = shared.clone();
    let on_up = move |_event: web_sys::Event| {
        s.state.borrow_mut().end_drag(surface);
        // Session over: detach both document listeners.
        s.drag.borrow_mut().take();
    };

    let document: &web_sys::EventTarget = shared.dom.document.as_ref();
    let guards = DragGuards {
        _move: ListenerGuard::attach(document, "mousemove", on_move)?,
        _up: ListenerGuard::attach(document, "mouseup", on_up)?,
    };
    *shared.drag.borrow_mut() = Some(guards);
    Ok(())
}

// ── Submit ─────────────────────────────────────────────────────────────

fn submit(shared: &Rc<Shared>) {
    let Some(message) = shared.state.borrow_mut().begin_submit() else {
        return;
    };
    let seq = shared.send_seq.get().wrapping_add(1);
    shared.send_seq.set(seq);
    sync_messages(shared);
    sync_input(shared);

    let (page_path, page_title, page_url) = page_context();
    let request = ChatRequest { message, page_path, page_title, page_url };
    let body = match serde_json::to_vec(&request) {
        Ok(body) => body,
        Err(e) => {
            log::warn!("[widget] request encode failed: {e}");
            land(shared, SendOutcome::Failed);
            return;
        }
    };

    let mut http_request = ehttp::Request::post(&shared.endpoint, body);
    http_request.headers =
        ehttp::Headers::new(&[("Accept", "*/*"), ("Content-Type", "application/json")]);

    let s = shared.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = ehttp::fetch_async(http_request).await;
        if s.send_seq.get() != seq {
            log::debug!("[widget] dropping stale reply");
            return;
        }
        let outcome = match result {
            Ok(response) => response_outcome(&response.bytes),
            Err(e) => {
                log::warn!("[widget] send failed: {e}");
                SendOutcome::Failed
            }
        };
        land(&s, outcome);
        let _ = s.dom.input.focus();
    });
}

fn land(shared: &Rc<Shared>, outcome: SendOutcome) {
    shared.state.borrow_mut().finish_submit(outcome);
    sync_messages(shared);
    sync_input(shared);
}

/// Any status with a parsable `{reply}` body renders that reply verbatim.
/// The gateway keeps the shape on failures too, so its apologies surface as
/// ordinary bot turns; only an unusable body falls back locally.
fn response_outcome(bytes: &[u8]) -> SendOutcome {
    match serde_json::from_slice::<ChatResponse>(bytes) {
        Ok(parsed) => SendOutcome::Reply(parsed.reply),
        Err(_) => SendOutcome::Failed,
    }
}

fn page_context() -> (Option<String>, Option<String>, Option<String>) {
    let Ok(window) = dom::window() else {
        return (None, None, None);
    };
    let location = window.location();
    let path = location.pathname().ok();
    let url = location.href().ok();
    let title = window.document().map(|d| d.title()).filter(|t| !t.is_empty());
    (path, title, url)
}

fn pointer_of(mouse: &MouseEvent) -> Point {
    Point::new(mouse.client_x() as f64, mouse.client_y() as f64)
}

// ── State → DOM sync ───────────────────────────────────────────────────

fn sync_positions(shared: &Shared) {
    let state = shared.state.borrow();
    let trigger = state.position(SurfaceId::Trigger);
    dom::set_style(&shared.dom.trigger, "left", &dom::px(trigger.x));
    dom::set_style(&shared.dom.trigger, "top", &dom::px(trigger.y));
    let panel = state.position(SurfaceId::Panel);
    dom::set_style(&shared.dom.panel, "left", &dom::px(panel.x));
    dom::set_style(&shared.dom.panel, "top", &dom::px(panel.y));
}

fn toggle_panel(shared: &Shared) {
    shared.state.borrow_mut().toggle_open();
    let open = shared.state.borrow().is_open();
    dom::set_style(&shared.dom.panel, "display", if open { "flex" } else { "none" });
    if open {
        // Measure the now-rendered panel; host CSS may have resized it.
        let rect = shared.dom.panel.get_bounding_client_rect();
        if rect.width() > 0.0 {
            shared
                .state
                .borrow_mut()
                .set_surface_size(SurfaceId::Panel, Size::new(rect.width(), rect.height()));
        }
        sync_messages(shared);
        let _ = shared.dom.input.focus();
    }
    sync_positions(shared);
}

fn sync_messages(shared: &Shared) {
    if let Err(e) = render_messages(shared) {
        log::warn!("[widget] message render failed: {e:?}");
    }
}

fn render_messages(shared: &Shared) -> Result<(), JsValue> {
    let document = &shared.dom.document;
    let messages = &shared.dom.messages;
    messages.set_inner_html("");

    let user_color = shared.theme.button_color.as_str();
    let state = shared.state.borrow();
    append_bubble(document, messages, "dc-bubble dc-bot", None, &shared.theme.welcome_message)?;
    for entry in state.history() {
        append_bubble(document, messages, "dc-bubble dc-user", Some(user_color), &entry.user)?;
        append_bubble(document, messages, "dc-bubble dc-bot", None, &entry.bot)?;
    }
    if let Some(pending) = state.pending_message() {
        append_bubble(document, messages, "dc-bubble dc-user", Some(user_color), pending)?;
        append_typing(document, messages)?;
    }
    drop(state);

    // Stick to the newest message.
    messages.set_scroll_top(messages.scroll_height());
    Ok(())
}

fn append_bubble(
    document: &Document,
    parent: &HtmlElement,
    classes: &str,
    background: Option<&str>,
    text: &str,
) -> Result<(), JsValue> {
    let bubble = dom::create(document, "div", classes)?;
    if let Some(background) = background {
        dom::set_style(&bubble, "background", background);
    }
    // inner_text, so reply content is never interpreted as markup.
    bubble.set_inner_text(text);
    parent.append_child(&bubble)?;
    Ok(())
}

fn append_typing(document: &Document, parent: &HtmlElement) -> Result<(), JsValue> {
    let bubble = dom::create(document, "div", "dc-bubble dc-bot dc-typing")?;
    for _ in 0..3 {
        let dot = document.create_element("span")?;
        bubble.append_child(&dot)?;
    }
    parent.append_child(&bubble)?;
    Ok(())
}

fn sync_input(shared: &Shared) {
    let state = shared.state.borrow();
    let input = &shared.dom.input;
    if input.value() != state.draft() {
        input.set_value(state.draft());
    }
    input.set_disabled(state.is_sending());
    shared.dom.send.set_disabled(state.is_sending());
}

// ── Stylesheet ─────────────────────────────────────────────────────────

// Layout and motion only; theme colors are applied inline per element.
const STYLESHEET: &str = r#"
.dc-trigger { position: fixed; width: 60px; height: 60px; border: none; border-radius: 50%;
  display: flex; align-items: center; justify-content: center; cursor: grab;
  box-shadow: 0 4px 12px rgba(0,0,0,.25); z-index: 999999; user-select: none;
  color: #fff; font-size: 26px; padding: 0; }
.dc-trigger:active { cursor: grabbing; }
.dc-panel { position: fixed; width: 384px; height: 500px; background: #fff; border-radius: 12px;
  box-shadow: 0 12px 40px rgba(0,0,0,.3); display: none; flex-direction: column;
  overflow: hidden; z-index: 999999; font-family: system-ui, sans-serif; }
.dc-header { padding: 14px 16px; color: #fff; font-weight: 600; display: flex;
  justify-content: space-between; align-items: center; cursor: move; user-select: none; }
.dc-close { cursor: pointer; background: none; border: none; color: #fff; font-size: 18px;
  line-height: 1; padding: 0 2px; }
.dc-messages { flex: 1; overflow-y: auto; padding: 12px; background: #f8fafc; }
.dc-bubble { max-width: 80%; margin: 6px 0; padding: 8px 12px; border-radius: 12px;
  font-size: 14px; line-height: 1.4; white-space: pre-wrap; overflow-wrap: break-word; }
.dc-user { margin-left: auto; color: #fff; border-bottom-right-radius: 4px; }
.dc-bot { margin-right: auto; background: #fff; color: #111; border: 1px solid #e2e8f0;
  border-bottom-left-radius: 4px; }
.dc-typing span { display: inline-block; width: 6px; height: 6px; margin: 0 2px;
  background: #94a3b8; border-radius: 50%; animation: dc-blink 1.2s infinite; }
.dc-typing span:nth-child(2) { animation-delay: .2s; }
.dc-typing span:nth-child(3) { animation-delay: .4s; }
@keyframes dc-blink { 0%, 80%, 100% { opacity: .25; } 40% { opacity: 1; } }
.dc-inputrow { display: flex; gap: 8px; padding: 10px; border-top: 1px solid #e2e8f0;
  background: #fff; }
.dc-input { flex: 1; border: 1px solid #cbd5e1; border-radius: 8px; padding: 8px 10px;
  font-size: 14px; outline: none; }
.dc-send { border: none; border-radius: 8px; color: #fff; padding: 8px 14px; font-size: 14px;
  cursor: pointer; }
.dc-send:disabled { opacity: .5; cursor: default; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use driftchat_core::FALLBACK_REPLY;

    #[test]
    fn parsable_reply_bodies_render_verbatim() {
        // The gateway sends this shape on 500s too; the widget must show it.
        let apology = br#"{"reply":"Sorry, I'm having trouble connecting to the AI service right now. Please try again later."}"#;
        match response_outcome(apology) {
            SendOutcome::Reply(text) => assert!(text.starts_with("Sorry, I'm having trouble")),
            other => panic!("expected verbatim reply, got {other:?}"),
        }
        assert_eq!(
            response_outcome(br#"{"reply":"hi"}"#),
            SendOutcome::Reply("hi".into())
        );
    }

    #[test]
    fn unusable_bodies_fall_back_locally() {
        for body in [
            &b""[..],
            &b"<html>502 Bad Gateway</html>"[..],
            &br#"{"error":"nope"}"#[..],
            &b"null"[..],
        ] {
            assert_eq!(response_outcome(body), SendOutcome::Failed, "body {body:?}");
        }
        // And the fallback the state machine will render for that outcome:
        assert_eq!(FALLBACK_REPLY, "Sorry, something went wrong. Please try again.");
    }

    #[test]
    fn stylesheet_covers_every_class_the_adapter_uses() {
        for class in [
            ".dc-trigger", ".dc-panel", ".dc-header", ".dc-close", ".dc-messages",
            ".dc-bubble", ".dc-user", ".dc-bot", ".dc-typing", ".dc-inputrow",
            ".dc-input", ".dc-send",
        ] {
            assert!(STYLESHEET.contains(class), "missing {class}");
        }
        assert!(STYLESHEET.contains("@keyframes dc-blink"));
    }
}
