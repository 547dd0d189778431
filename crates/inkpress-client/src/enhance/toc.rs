//! Generated table of contents.

use std::collections::HashSet;

use super::set_icon;
use crate::dom::NodeId;
use crate::events::{EventKind, Subscription, Target};
use crate::page::Page;

pub const TOC_CLASS: &str = "table-of-contents";
pub const TOGGLE_CLASS: &str = "toc-toggle";
pub const COLLAPSED_CLASS: &str = "collapsed";

/// Fewer headings than this produce no table of contents.
pub const MIN_HEADINGS: usize = 3;

const TITLE: &str = "📑 Table of Contents";
const EXPANDED_ICON: &str = "fa-chevron-up";
const COLLAPSED_ICON: &str = "fa-chevron-down";
const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Remove leading emoji (and the whitespace after them) from a heading.
pub fn strip_emoji_prefix(text: &str) -> &str {
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start_matches(is_emoji);
        if trimmed.len() == rest.len() {
            return rest;
        }
        rest = trimmed.trim_start();
    }
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0xFE0F | 0x200D | 0x20E3
    )
}

/// Headings in the container, skipping any inside a generated table of contents.
pub fn headings(page: &Page, container: NodeId) -> Vec<NodeId> {
    page.dom
        .elements_by_tag(container, &HEADINGS)
        .into_iter()
        .filter(|h| page.dom.closest_class(*h, TOC_CLASS).is_none())
        .collect()
}

/// Assign missing ids and describe the entries.
///
/// Generated ids are `heading-{index}`, suffixed with `-1`, `-2`, ... when
/// an element in the document or another heading already uses that id.
pub fn collect_entries(page: &mut Page, headings: &[NodeId]) -> Vec<TocEntry> {
    let mut taken: HashSet<String> = headings
        .iter()
        .filter_map(|h| page.dom.attr(*h, "id"))
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();

    headings
        .iter()
        .copied()
        .enumerate()
        .map(|(index, heading)| {
            let existing = page
                .dom
                .attr(heading, "id")
                .filter(|id| !id.is_empty())
                .map(String::from);
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = free_id(page, &taken, &format!("heading-{}", index));
                    page.dom.set_attr(heading, "id", &id);
                    taken.insert(id.clone());
                    id
                }
            };
            let level = page
                .dom
                .tag(heading)
                .and_then(|t| t.strip_prefix('h'))
                .and_then(|n| n.parse().ok())
                .unwrap_or(2);
            let text = page.dom.text_content(heading);

            TocEntry {
                level,
                text: strip_emoji_prefix(&text).to_string(),
                id,
            }
        })
        .collect()
}

fn free_id(page: &Page, taken: &HashSet<String>, base: &str) -> String {
    let in_use = |id: &str| taken.contains(id) || page.dom.get_element_by_id(id).is_some();
    if !in_use(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !in_use(id))
        .unwrap_or_else(|| base.to_string())
}

/// Build the table of contents at the top of the container.
pub fn attach(page: &mut Page, container: NodeId) -> Subscription {
    let mut sub = Subscription::new();

    for existing in page.dom.elements_by_class(container, TOC_CLASS) {
        page.dom.remove(existing);
    }

    let headings = headings(page, container);
    if headings.len() < MIN_HEADINGS {
        return sub;
    }

    let entries = collect_entries(page, &headings);
    let dom = &mut page.dom;

    let toc = dom.create_element("nav");
    dom.add_class(toc, TOC_CLASS);
    dom.set_attr(toc, "role", "navigation");
    dom.set_attr(toc, "aria-label", "Table of Contents");

    let header = dom.create_element("div");
    dom.add_class(header, "toc-header");
    dom.set_style(header, "cursor", "pointer");
    let title = dom.create_element("h3");
    dom.set_text(title, TITLE);
    dom.set_style(title, "cursor", "pointer");
    dom.append_child(header, title);

    let toggle = dom.create_element("button");
    dom.add_class(toggle, TOGGLE_CLASS);
    dom.set_attr(toggle, "aria-label", "Toggle table of contents");
    set_icon(dom, toggle, EXPANDED_ICON);
    dom.append_child(header, toggle);
    dom.append_child(toc, header);

    let list = dom.create_element("ul");
    for entry in &entries {
        let item = dom.create_element("li");
        dom.add_class(item, &format!("toc-h{}", entry.level));
        let link = dom.create_element("a");
        dom.set_attr(link, "href", &format!("#{}", entry.id));
        dom.set_text(link, &entry.text);
        dom.append_child(item, link);
        dom.append_child(list, item);
    }
    dom.append_child(toc, list);

    if page.is_mobile() {
        page.dom.add_class(toc, COLLAPSED_CLASS);
        set_icon(&mut page.dom, toggle, COLLAPSED_ICON);
    }

    let first = page.dom.first_child(container);
    page.dom.insert_before(container, toc, first);
    sub.own_node(toc);

    // Clicks on the toggle button bubble here; it has no listener of its own
    let id = page.listen(Target::Node(header), EventKind::Click, move |page, event| {
        let Some(target) = event.target_node() else {
            return;
        };
        let on_toggle = page.dom.closest_class(target, TOGGLE_CLASS).is_some();
        if target == header || target == title || on_toggle {
            let collapsed = page.dom.toggle_class(toc, COLLAPSED_CLASS);
            let icon = if collapsed { COLLAPSED_ICON } else { EXPANDED_ICON };
            set_icon(&mut page.dom, toggle, icon);
        }
    });
    sub.add_listener(id);

    sub
}
