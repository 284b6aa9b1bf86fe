// Driftchat Widget — Scoped event listeners
//
// Every DOM listener is held as a guard that detaches on drop. Long-lived
// listeners sit in the mounted widget for the page's lifetime; the
// document-level drag listeners live only from mousedown to mouseup, so a
// finished drag leaves nothing behind on the host page.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::EventTarget;

pub(crate) struct ListenerGuard {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl ListenerGuard {
    /// Attach `handler` to `event` on `target`, detaching again when the
    /// returned guard drops. Handlers take the plain `Event`; callers
    /// downcast to `MouseEvent`/`KeyboardEvent` where they need to.
    pub fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(ListenerGuard { target: target.clone(), event, callback })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}
