//! Events, listener registration and disposable subscriptions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::page::{Page, TimerId};

/// Kinds of events dispatched on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    KeyPress,
    Scroll,
    Resize,
    TouchStart,
    TouchEnd,
}

/// Where a listener is attached or an event originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Window,
    Document,
    Node(NodeId),
}

/// An event travelling from its target up to the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// Where the event originated
    pub target: Target,
    /// Where the listener currently running is attached
    pub current_target: Target,
    /// Key name for keyboard events (`"Enter"`, `" "`, `"Escape"`)
    pub key: Option<String>,
    /// Vertical screen position for touch events
    pub screen_y: f64,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: Target) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            key: None,
            screen_y: 0.0,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn click(node: NodeId) -> Self {
        Self::new(EventKind::Click, Target::Node(node))
    }

    pub fn key(kind: EventKind, target: Target, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new(kind, target)
        }
    }

    pub fn touch(kind: EventKind, node: NodeId, screen_y: f64) -> Self {
        Self {
            screen_y,
            ..Self::new(kind, Target::Node(node))
        }
    }

    /// The originating node, if the event started on one.
    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            Target::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop the event after the listeners on the current target have run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Handle of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub(crate) type Handler = Rc<RefCell<dyn FnMut(&mut Page, &mut Event)>>;

struct Listener {
    target: Target,
    kind: EventKind,
    handler: Handler,
}

/// Registered listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: BTreeMap<ListenerId, Listener>,
}

impl Listeners {
    pub(crate) fn add(&mut self, target: Target, kind: EventKind, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Listener {
                target,
                kind,
                handler,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn count_for(&self, target: Target, kind: EventKind) -> usize {
        self.entries
            .values()
            .filter(|l| l.target == target && l.kind == kind)
            .count()
    }

    /// Snapshot of the handlers for a target, so handlers may register or
    /// remove listeners while the event is being dispatched.
    pub(crate) fn matching(&self, target: Target, kind: EventKind) -> Vec<(ListenerId, Handler)> {
        self.entries
            .iter()
            .filter(|(_, l)| l.target == target && l.kind == kind)
            .map(|(id, l)| (*id, Rc::clone(&l.handler)))
            .collect()
    }
}

/// Everything one enhancement stage attached to a page.
///
/// Disposing removes the listeners, cancels the timers, detaches the
/// generated nodes and runs cleanup callbacks.
#[derive(Default)]
pub struct Subscription {
    listeners: Vec<ListenerId>,
    timers: Vec<TimerId>,
    nodes: Vec<NodeId>,
    cleanups: Vec<Box<dyn FnOnce(&mut Page)>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("listeners", &self.listeners)
            .field("timers", &self.timers)
            .field("nodes", &self.nodes)
            .field("cleanups", &self.cleanups.len())
            .finish()
    }
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, id: ListenerId) {
        self.listeners.push(id);
    }

    pub fn add_timer(&mut self, id: TimerId) {
        self.timers.push(id);
    }

    /// Take ownership of a generated node.
    pub fn own_node(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub fn on_dispose(&mut self, cleanup: impl FnOnce(&mut Page) + 'static) {
        self.cleanups.push(Box::new(cleanup));
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Whether the stage attached anything at all.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
            && self.timers.is_empty()
            && self.nodes.is_empty()
            && self.cleanups.is_empty()
    }

    pub fn dispose(self, page: &mut Page) {
        for cleanup in self.cleanups.into_iter().rev() {
            cleanup(page);
        }
        for id in self.listeners {
            page.unlisten(id);
        }
        for id in self.timers {
            page.clear_timeout(id);
        }
        for node in self.nodes {
            page.dom.remove(node);
        }
    }
}
