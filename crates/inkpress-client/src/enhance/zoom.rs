//! Click-to-zoom overlay for article images.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::set_icon;
use crate::dom::NodeId;
use crate::events::{EventKind, ListenerId, Subscription, Target};
use crate::page::{FocusOptions, Page};

pub const OVERLAY_CLASS: &str = "image-zoom-overlay";
pub const ZOOMED_CLASS: &str = "zoomed-image";
pub const CLOSE_CLASS: &str = "zoom-close-btn";

/// Downward swipe distance that dismisses the overlay on touch screens.
pub const SWIPE_DISMISS_DISTANCE: f64 = 50.0;

struct OpenOverlay {
    overlay: NodeId,
    listeners: Vec<ListenerId>,
    /// Body overflow to put back, when it was changed on open
    restore_overflow: Option<Option<String>>,
}

type OverlayState = Rc<RefCell<Option<OpenOverlay>>>;

/// Make every image outside a link zoomable.
pub fn attach(page: &mut Page, container: NodeId) -> Subscription {
    let mut sub = Subscription::new();
    let state: OverlayState = Rc::default();
    let mobile = page.is_mobile();

    for img in page.dom.elements_by_tag(container, &["img"]) {
        if page.dom.closest(img, "a").is_some() {
            continue;
        }

        let label = match page.dom.attr(img, "alt") {
            Some(alt) if !alt.is_empty() => format!("Click to zoom: {}", alt),
            _ => "Click to zoom: image".to_string(),
        };
        page.dom.set_style(img, "cursor", "zoom-in");
        page.dom.set_attr(img, "tabindex", "0");
        page.dom.set_attr(img, "role", "button");
        page.dom.set_attr(img, "aria-label", &label);
        if mobile {
            page.dom.set_style(img, "touch-action", "manipulation");
        }

        let on_click = Rc::clone(&state);
        sub.add_listener(page.listen(Target::Node(img), EventKind::Click, move |page, _| {
            open(page, img, &on_click);
        }));

        let on_key = Rc::clone(&state);
        sub.add_listener(page.listen(Target::Node(img), EventKind::KeyPress, move |page, event| {
            if matches!(event.key.as_deref(), Some("Enter" | " ")) {
                event.prevent_default();
                open(page, img, &on_key);
            }
        }));
    }

    sub.on_dispose(move |page| close(page, &state));

    sub
}

fn open(page: &mut Page, img: NodeId, state: &OverlayState) {
    if state.borrow().is_some() {
        return;
    }
    let Some(zoomed) = page.dom.clone_node(img) else {
        return;
    };
    let mobile = page.is_mobile();
    let body = page.dom.body();

    let overlay = page.dom.create_element("div");
    page.dom.add_class(overlay, OVERLAY_CLASS);
    page.dom.set_attr(overlay, "role", "dialog");
    page.dom.set_attr(overlay, "aria-modal", "true");
    page.dom.set_attr(overlay, "aria-label", "Zoomed image view");

    let alt = match page.dom.attr(img, "alt") {
        Some(alt) if !alt.is_empty() => alt.to_string(),
        _ => "Zoomed image".to_string(),
    };
    page.dom.set_attr(zoomed, "class", ZOOMED_CLASS);
    page.dom.set_attr(zoomed, "alt", &alt);

    let close_button = page.dom.create_element("button");
    page.dom.add_class(close_button, CLOSE_CLASS);
    page.dom.set_attr(close_button, "aria-label", "Close zoomed image");
    set_icon(&mut page.dom, close_button, "fa-times");

    page.dom.append_child(overlay, zoomed);
    page.dom.append_child(overlay, close_button);
    page.dom.append_child(body, overlay);

    let restore_overflow = mobile.then(|| {
        let previous = page.dom.style(body, "overflow").map(String::from);
        page.dom.set_style(body, "overflow", "hidden");
        previous
    });

    let mut listeners = Vec::new();

    let s = Rc::clone(state);
    listeners.push(page.listen(Target::Node(close_button), EventKind::Click, move |page, _| {
        close(page, &s);
    }));

    let s = Rc::clone(state);
    listeners.push(page.listen(Target::Node(overlay), EventKind::Click, move |page, event| {
        if event.target == Target::Node(overlay) {
            close(page, &s);
        }
    }));

    let s = Rc::clone(state);
    listeners.push(page.listen(Target::Document, EventKind::KeyDown, move |page, event| {
        if event.key.as_deref() == Some("Escape") {
            close(page, &s);
        }
    }));

    if mobile {
        let touch_start = Rc::new(Cell::new(0.0));

        let start = Rc::clone(&touch_start);
        listeners.push(page.listen(Target::Node(overlay), EventKind::TouchStart, move |_, event| {
            start.set(event.screen_y);
        }));

        let s = Rc::clone(state);
        listeners.push(page.listen(Target::Node(overlay), EventKind::TouchEnd, move |page, event| {
            if event.screen_y - touch_start.get() > SWIPE_DISMISS_DISTANCE {
                close(page, &s);
            }
        }));
    }

    *state.borrow_mut() = Some(OpenOverlay {
        overlay,
        listeners,
        restore_overflow,
    });

    page.focus(close_button, FocusOptions::default());
}

fn close(page: &mut Page, state: &OverlayState) {
    let Some(open) = state.borrow_mut().take() else {
        return;
    };

    page.dom.remove(open.overlay);
    for id in open.listeners {
        page.unlisten(id);
    }

    if let Some(previous) = open.restore_overflow {
        let body = page.dom.body();
        page.dom.set_style(body, "overflow", previous.as_deref().unwrap_or(""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::dom::Document;
    use pretty_assertions::assert_eq;

    const IMAGES: &str = "![A cat](cat.png)\n\n[![Linked](dog.png)](https://example.com)\n";

    fn setup() -> (Page, NodeId, NodeId) {
        let (dom, container) = Document::from_markdown(IMAGES);
        let mut page = Page::new(dom, MemoryClipboard::new());
        let img = page.dom.elements_by_tag(container, &["img"])[0];
        attach(&mut page, container);
        (page, container, img)
    }

    fn overlays(page: &Page) -> Vec<NodeId> {
        page.dom.elements_by_class(page.dom.body(), OVERLAY_CLASS)
    }

    #[test]
    fn prepares_unlinked_images_only() {
        let (page, container, img) = setup();

        assert_eq!(page.dom.attr(img, "role"), Some("button"));
        assert_eq!(page.dom.attr(img, "aria-label"), Some("Click to zoom: A cat"));
        assert_eq!(page.dom.style(img, "cursor"), Some("zoom-in"));

        let linked = page.dom.elements_by_tag(container, &["img"])[1];
        assert_eq!(page.dom.attr(linked, "role"), None);
    }

    #[test]
    fn click_opens_single_overlay() {
        let (mut page, _, img) = setup();

        page.click(img);
        page.click(img);

        let open = overlays(&page);
        assert_eq!(open.len(), 1);
        let zoomed = page.dom.first_by_class(open[0], ZOOMED_CLASS).unwrap();
        assert_eq!(page.dom.attr(zoomed, "src"), Some("cat.png"));
        let close_button = page.dom.first_by_class(open[0], CLOSE_CLASS).unwrap();
        assert_eq!(page.focused(), Some(close_button));
    }

    #[test]
    fn escape_closes_and_releases_listeners() {
        let (mut page, _, img) = setup();
        let before = page.listener_count();

        page.click(img);
        assert!(page.listener_count() > before);

        page.key_down("Escape");

        assert!(overlays(&page).is_empty());
        assert_eq!(page.listener_count(), before);
    }

    #[test]
    fn reopening_after_escape_starts_clean() {
        let (mut page, _, img) = setup();
        let before = page.listener_count();

        for _ in 0..2 {
            page.click(img);
            assert_eq!(overlays(&page).len(), 1);

            page.key_down("Escape");
            assert!(overlays(&page).is_empty());
            assert_eq!(page.listener_count(), before);
        }
    }

    #[test]
    fn backdrop_click_closes_but_image_click_does_not() {
        let (mut page, _, img) = setup();
        page.click(img);
        let overlay = overlays(&page)[0];
        let zoomed = page.dom.first_by_class(overlay, ZOOMED_CLASS).unwrap();

        page.click(zoomed);
        assert_eq!(overlays(&page).len(), 1);

        page.click(overlay);
        assert!(overlays(&page).is_empty());
    }

    #[test]
    fn close_button_closes() {
        let (mut page, _, img) = setup();
        page.click(img);
        let close_button = page.dom.first_by_class(overlays(&page)[0], CLOSE_CLASS).unwrap();

        page.click(close_button);

        assert!(overlays(&page).is_empty());
    }

    #[test]
    fn keyboard_activation() {
        let (mut page, _, img) = setup();

        page.key_press(img, "a");
        assert!(overlays(&page).is_empty());

        let event = page.key_press(img, "Enter");
        assert!(event.default_prevented());
        assert_eq!(overlays(&page).len(), 1);
    }

    #[test]
    fn mobile_locks_scroll_and_swipe_closes() {
        let (mut page, _, img) = setup();
        page.resize(390.0, 844.0);
        let body = page.dom.body();

        page.click(img);
        assert_eq!(page.dom.style(body, "overflow"), Some("hidden"));
        let overlay = overlays(&page)[0];

        page.swipe(overlay, 300.0, 330.0);
        assert_eq!(overlays(&page).len(), 1);

        page.swipe(overlay, 300.0, 400.0);
        assert!(overlays(&page).is_empty());
        assert_eq!(page.dom.style(body, "overflow"), None);
    }

    #[test]
    fn dispose_closes_open_overlay() {
        let (dom, container) = Document::from_markdown(IMAGES);
        let mut page = Page::new(dom, MemoryClipboard::new());
        let img = page.dom.elements_by_tag(container, &["img"])[0];
        let sub = attach(&mut page, container);
        page.click(img);

        sub.dispose(&mut page);

        assert!(overlays(&page).is_empty());
        assert_eq!(page.listener_count(), 0);
    }
}
