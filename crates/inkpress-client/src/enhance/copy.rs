//! Copy-to-clipboard buttons on code blocks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::set_icon;
use crate::dom::NodeId;
use crate::events::{EventKind, Subscription, Target};
use crate::page::{FocusOptions, Page, TimerId};

pub const BUTTON_CLASS: &str = "copy-code-btn";
pub const COPIED_CLASS: &str = "copied";

/// How long the button shows the copied state.
pub const COPIED_DURATION: Duration = Duration::from_millis(2000);

const COPY_ICON: &str = "fa-copy";
const CHECK_ICON: &str = "fa-check";

/// Pending revert timers. Each timer drops its own id when it fires.
type Timers = Rc<RefCell<Vec<TimerId>>>;

/// Attach a copy button to every `pre` in the container.
pub fn attach(page: &mut Page, container: NodeId) -> Subscription {
    let mut sub = Subscription::new();
    let mobile = page.is_mobile();
    let timers: Timers = Rc::default();

    for pre in page.dom.elements_by_tag(container, &["pre"]) {
        for existing in page.dom.elements_by_class(pre, BUTTON_CLASS) {
            page.dom.remove(existing);
        }

        let button = page.dom.create_element("button");
        page.dom.add_class(button, BUTTON_CLASS);
        page.dom.set_attr(button, "title", "Copy code");
        page.dom.set_attr(button, "aria-label", "Copy code to clipboard");
        set_icon(&mut page.dom, button, COPY_ICON);

        if mobile {
            page.dom.set_style(button, "min-width", "44px");
            page.dom.set_style(button, "min-height", "44px");
            page.dom.set_style(button, "touch-action", "manipulation");
        }

        page.dom.set_style(pre, "position", "relative");
        page.dom.append_child(pre, button);
        sub.own_node(button);

        let triggers: &[EventKind] = if mobile {
            &[EventKind::Click, EventKind::TouchEnd]
        } else {
            &[EventKind::Click]
        };
        for kind in triggers {
            let timers = Rc::clone(&timers);
            let id = page.listen(Target::Node(button), *kind, move |page, event| {
                event.stop_propagation();
                event.prevent_default();
                copy_code(page, pre, button, &timers);
            });
            sub.add_listener(id);
        }
    }

    sub.on_dispose(move |page| {
        for id in timers.borrow_mut().drain(..) {
            page.clear_timeout(id);
        }
    });

    sub
}

fn copy_code(page: &mut Page, pre: NodeId, button: NodeId, timers: &Timers) {
    let source = page
        .dom
        .elements_by_tag(pre, &["code"])
        .first()
        .copied()
        .unwrap_or(pre);
    let text = page.dom.text_content(source);

    match page.write_clipboard(&text) {
        Ok(()) => show_copied(page, button, timers),
        Err(e) => {
            tracing::error!("Failed to copy code: {}", e);
            if legacy_copy(page, &text) {
                show_copied(page, button, timers);
            }
        }
    }
}

/// Copy through a hidden textarea and the legacy copy command.
fn legacy_copy(page: &mut Page, text: &str) -> bool {
    let body = page.dom.body();
    let textarea = page.dom.create_element("textarea");
    page.dom.set_attr(textarea, "value", text);
    for (property, value) in [("position", "fixed"), ("top", "0"), ("left", "0"), ("opacity", "0")] {
        page.dom.set_style(textarea, property, value);
    }
    page.dom.append_child(body, textarea);

    page.focus(textarea, FocusOptions::default());
    page.select(textarea);
    let result = page.exec_copy();

    page.clear_selection();
    page.dom.remove(textarea);

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Fallback copy failed: {}", e);
            false
        }
    }
}

fn show_copied(page: &mut Page, button: NodeId, timers: &Timers) {
    set_icon(&mut page.dom, button, CHECK_ICON);
    page.dom.add_class(button, COPIED_CLASS);

    let slot: Rc<Cell<Option<TimerId>>> = Rc::default();
    let own_id = Rc::clone(&slot);
    let pending = Rc::clone(timers);
    let id = page.set_timeout(COPIED_DURATION, move |page| {
        set_icon(&mut page.dom, button, COPY_ICON);
        page.dom.remove_class(button, COPIED_CLASS);
        if let Some(id) = own_id.get() {
            pending.borrow_mut().retain(|t| *t != id);
        }
    });
    slot.set(Some(id));
    timers.borrow_mut().push(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::dom::Document;
    use crate::enhance::icon_of;
    use pretty_assertions::assert_eq;

    const CODE: &str = "Intro\n\n```rust\nfn main() {}\n```\n\n```\nplain\n```\n";

    fn setup(clipboard: MemoryClipboard) -> (Page, NodeId) {
        let (dom, container) = Document::from_markdown(CODE);
        (Page::new(dom, clipboard), container)
    }

    fn first_button(page: &Page, container: NodeId) -> NodeId {
        page.dom.elements_by_class(container, BUTTON_CLASS)[0]
    }

    #[test]
    fn one_button_per_block() {
        let (mut page, container) = setup(MemoryClipboard::new());

        attach(&mut page, container);
        attach(&mut page, container);

        assert_eq!(page.dom.elements_by_class(container, BUTTON_CLASS).len(), 2);
        for pre in page.dom.elements_by_tag(container, &["pre"]) {
            assert_eq!(page.dom.elements_by_class(pre, BUTTON_CLASS).len(), 1);
        }
    }

    #[test]
    fn click_copies_code_and_reverts() {
        let clipboard = MemoryClipboard::new();
        let (mut page, container) = setup(clipboard.clone());
        attach(&mut page, container);
        let button = first_button(&page, container);

        let event = page.click(button);

        assert!(event.default_prevented());
        assert_eq!(clipboard.contents().as_deref(), Some("fn main() {}\n"));
        assert!(page.dom.has_class(button, COPIED_CLASS));
        assert_eq!(icon_of(&page.dom, button).as_deref(), Some(CHECK_ICON));

        page.advance(Duration::from_millis(1999));
        assert!(page.dom.has_class(button, COPIED_CLASS));

        page.advance(Duration::from_millis(1));
        assert!(!page.dom.has_class(button, COPIED_CLASS));
        assert_eq!(icon_of(&page.dom, button).as_deref(), Some(COPY_ICON));
    }

    #[test]
    fn fired_timers_are_forgotten() {
        let (mut page, container) = setup(MemoryClipboard::new());
        attach(&mut page, container);
        let button = first_button(&page, container);
        let timers: Timers = Rc::default();

        for _ in 0..3 {
            show_copied(&mut page, button, &timers);
            assert_eq!(timers.borrow().len(), 1);
            page.advance(COPIED_DURATION);
            assert!(timers.borrow().is_empty());
        }

        show_copied(&mut page, button, &timers);
        show_copied(&mut page, button, &timers);
        assert_eq!(timers.borrow().len(), 2);
        page.advance(COPIED_DURATION);
        assert!(timers.borrow().is_empty());
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn denied_clipboard_falls_back_to_legacy_copy() {
        let clipboard = MemoryClipboard::legacy_only();
        let (mut page, container) = setup(clipboard.clone());
        attach(&mut page, container);
        let button = first_button(&page, container);
        let body = page.dom.body();

        page.click(button);

        assert_eq!(clipboard.legacy_copies(), 1);
        assert_eq!(clipboard.contents().as_deref(), Some("fn main() {}\n"));
        assert!(page.dom.has_class(button, COPIED_CLASS));
        assert!(page.dom.elements_by_tag(body, &["textarea"]).is_empty());
    }

    #[test]
    fn total_failure_leaves_button_alone() {
        let (mut page, container) = setup(MemoryClipboard::unavailable());
        attach(&mut page, container);
        let button = first_button(&page, container);
        let body = page.dom.body();

        page.click(button);

        assert!(!page.dom.has_class(button, COPIED_CLASS));
        assert!(page.dom.elements_by_tag(body, &["textarea"]).is_empty());
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn click_does_not_bubble() {
        let (mut page, container) = setup(MemoryClipboard::new());
        attach(&mut page, container);
        let button = first_button(&page, container);
        let bubbled = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = Rc::clone(&bubbled);
        page.listen(Target::Node(container), EventKind::Click, move |_, _| flag.set(true));

        page.click(button);

        assert!(!bubbled.get());
    }

    #[test]
    fn mobile_buttons_also_copy_on_touch() {
        let clipboard = MemoryClipboard::new();
        let (mut page, container) = setup(clipboard.clone());
        page.resize(375.0, 667.0);
        let sub = attach(&mut page, container);
        let button = first_button(&page, container);

        assert_eq!(sub.listeners().len(), 4);
        assert_eq!(page.dom.style(button, "min-width"), Some("44px"));

        page.dispatch(crate::events::Event::touch(EventKind::TouchEnd, button, 0.0));
        assert!(clipboard.contents().is_some());
    }
}
