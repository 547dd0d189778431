//! Smooth scrolling for in-page anchor links.

use crate::dom::NodeId;
use crate::events::{EventKind, Subscription, Target};
use crate::page::{FocusOptions, Page, ScrollBehavior};

/// Space left above a scrolled-to target for the fixed header.
pub const HEADER_OFFSET: f64 = 80.0;

pub fn attach(page: &mut Page, container: NodeId) -> Subscription {
    let mut sub = Subscription::new();

    let id = page.listen(Target::Node(container), EventKind::Click, move |page, event| {
        let Some(clicked) = event.target_node() else {
            return;
        };
        let Some(link) = page.dom.closest(clicked, "a") else {
            return;
        };
        if !page.dom.contains(container, link) {
            return;
        }

        let Some(fragment) = page.dom.attr(link, "href").and_then(|h| h.strip_prefix('#')) else {
            return;
        };
        let Some(target) = page.dom.get_element_by_id(fragment) else {
            return;
        };

        event.prevent_default();
        let top = page.bounding_top(target) + page.viewport().scroll_y - HEADER_OFFSET;
        page.scroll_to(top, ScrollBehavior::Smooth);
        page.focus(target, FocusOptions { prevent_scroll: true });
    });
    sub.add_listener(id);

    sub
}
