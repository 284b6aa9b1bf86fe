// Driftchat Core — Widget State Machine
//
// The full behavior of the floating chat widget, minus the DOM: two
// independently draggable surfaces (trigger button and chat panel) with the
// panel anchored to the trigger, an append-only conversation history, and
// the single-flight submit lifecycle Idle -> Sending -> Idle.
//
// The browser adapter drives this machine and mirrors its state into
// elements; nothing here touches I/O, so every rule is testable natively.

use crate::drag::DragState;
use crate::geometry::{clamp_position, Point, Size};

/// Trigger button bounding box (a round 60px launcher).
pub const TRIGGER_SIZE: Size = Size { w: 60.0, h: 60.0 };
/// Chat panel bounding box.
pub const PANEL_SIZE: Size = Size { w: 384.0, h: 500.0 };
/// Horizontal gap between panel and trigger when anchored.
pub const PANEL_GAP: f64 = 16.0;
/// Initial trigger offset from the top-right viewport corner.
const INITIAL_INSET_X: f64 = 100.0;
const INITIAL_Y: f64 = 50.0;

/// Shown as the bot turn when the request failed outright or the reply body
/// was unusable. Mirrors the gateway's own apology register.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// One completed conversation turn. Immutable once appended; insertion
/// order is display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub user: String,
    pub bot: String,
}

/// The two draggable surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceId {
    Trigger,
    Panel,
}

/// How an in-flight send ended, as seen by the adapter: either a parsed
/// `{reply}` body (any HTTP status) or nothing usable at all.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Reply(String),
    Failed,
}

#[derive(Debug, Clone)]
pub struct WidgetState {
    viewport: Size,
    trigger: DragState,
    panel: DragState,
    trigger_size: Size,
    panel_size: Size,
    open: bool,
    sending: bool,
    draft: String,
    /// User text of the in-flight send, consumed when the outcome lands.
    pending: Option<String>,
    history: Vec<ConversationEntry>,
}

impl WidgetState {
    /// Fresh widget for the given viewport: trigger tucked near the
    /// top-right corner, panel pre-anchored beside it, panel closed.
    pub fn new(viewport: Size) -> Self {
        let trigger_pos = clamp_position(
            Point::new(viewport.w - INITIAL_INSET_X, INITIAL_Y),
            TRIGGER_SIZE,
            viewport,
        );
        let mut state = WidgetState {
            viewport,
            trigger: DragState::at(trigger_pos),
            panel: DragState::at(Point::ZERO),
            trigger_size: TRIGGER_SIZE,
            panel_size: PANEL_SIZE,
            open: false,
            sending: false,
            draft: String::new(),
            pending: None,
            history: Vec::new(),
        };
        state.panel.position = state.anchored_panel_position();
        state
    }

    // ── Read surface ─────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }

    /// User text of the send in flight, shown as a provisional bubble until
    /// the outcome lands in the history.
    pub fn pending_message(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn position(&self, id: SurfaceId) -> Point {
        match id {
            SurfaceId::Trigger => self.trigger.position,
            SurfaceId::Panel => self.panel.position,
        }
    }

    pub fn is_dragging(&self, id: SurfaceId) -> bool {
        match id {
            SurfaceId::Trigger => self.trigger.dragging,
            SurfaceId::Panel => self.panel.dragging,
        }
    }

    pub fn any_dragging(&self) -> bool {
        self.trigger.dragging || self.panel.dragging
    }

    // ── Input / submit lifecycle ─────────────────────────────────

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Try to start a send. Returns the message to put on the wire, or None
    /// when the draft trims to nothing or a send is already in flight; both
    /// no-ops leave every piece of state untouched.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.sending {
            return None;
        }
        let message = self.draft.trim();
        if message.is_empty() {
            return None;
        }
        let message = message.to_string();
        self.sending = true;
        self.pending = Some(message.clone());
        Some(message)
    }

    /// Land the outcome of the in-flight send. Appends exactly one entry
    /// per begin_submit and returns to Idle. A parsed reply clears the
    /// draft; a failure preserves it so the visitor can retry. Stray calls
    /// with no send in flight are ignored.
    pub fn finish_submit(&mut self, outcome: SendOutcome) {
        let Some(user) = self.pending.take() else {
            return;
        };
        let bot = match outcome {
            SendOutcome::Reply(reply) => {
                self.draft.clear();
                reply
            }
            SendOutcome::Failed => FALLBACK_REPLY.to_string(),
        };
        self.history.push(ConversationEntry { user, bot });
        self.sending = false;
    }

    // ── Open / close ─────────────────────────────────────────────

    /// Flip panel visibility. Opening re-anchors the panel to the trigger's
    /// current position so it never appears at a stale spot.
    pub fn toggle_open(&mut self) {
        self.open = !self.open;
        if self.open {
            self.panel.position = self.anchored_panel_position();
        } else {
            // A drag can't outlive the surface it is dragging.
            self.panel.end();
        }
    }

    // ── Drag lifecycle ───────────────────────────────────────────

    /// Start dragging one surface. The other surface's drag state is
    /// untouched.
    pub fn begin_drag(&mut self, id: SurfaceId, pointer: Point) {
        match id {
            SurfaceId::Trigger => self.trigger.begin(pointer),
            SurfaceId::Panel => self.panel.begin(pointer),
        }
    }

    /// Route a pointer move to whichever surface is dragging. While the
    /// panel is closed, a trigger drag also carries the panel anchor along
    /// so a later open lands beside the trigger without a jump; while the
    /// panel is open it keeps its own position. Returns true if anything
    /// moved (the adapter repaints only then).
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        let mut changed = false;
        if self
            .trigger
            .move_to(pointer, self.trigger_size, self.viewport)
        {
            changed = true;
            if !self.open {
                self.panel.position = self.anchored_panel_position();
            }
        }
        if self.panel.move_to(pointer, self.panel_size, self.viewport) {
            changed = true;
        }
        changed
    }

    pub fn end_drag(&mut self, id: SurfaceId) {
        match id {
            SurfaceId::Trigger => self.trigger.end(),
            SurfaceId::Panel => self.panel.end(),
        }
    }

    // ── Viewport ─────────────────────────────────────────────────

    /// Adopt new viewport bounds and re-clamp both surfaces. Without this a
    /// shrink can strand the widget outside the reachable page.
    pub fn resize_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.trigger.reclamp(self.trigger_size, viewport);
        self.panel.reclamp(self.panel_size, viewport);
    }

    /// Adopt measured bounding boxes from the adapter (CSS may disagree
    /// with the defaults) and re-clamp with the real sizes.
    pub fn set_surface_size(&mut self, id: SurfaceId, size: Size) {
        match id {
            SurfaceId::Trigger => {
                self.trigger_size = size;
                self.trigger.reclamp(size, self.viewport);
            }
            SurfaceId::Panel => {
                self.panel_size = size;
                self.panel.reclamp(size, self.viewport);
            }
        }
    }

    fn anchored_panel_position(&self) -> Point {
        let raw = Point::new(
            self.trigger.position.x - self.panel_size.w - PANEL_GAP,
            self.trigger.position.y,
        );
        clamp_position(raw, self.panel_size, self.viewport)
    }
}
