//! Reading progress indicator.

use crate::dom::NodeId;
use crate::events::{EventKind, Subscription, Target};
use crate::page::Page;

/// Custom property on the root element holding the progress percentage.
pub const PROGRESS_PROPERTY: &str = "--scroll-progress";

/// Percentage of the article scrolled past, clamped to `0..=100`.
pub fn scroll_progress(scroll_top: f64, article_top: f64, article_height: f64, viewport_height: f64) -> f64 {
    let scrolled = (scroll_top - article_top).max(0.0);
    let scrollable = (article_height - viewport_height).max(1.0);
    (scrolled / scrollable * 100.0).clamp(0.0, 100.0)
}

/// Track reading progress through the page's first `article`.
pub fn attach(page: &mut Page) -> Subscription {
    let mut sub = Subscription::new();
    let root = page.dom.root();
    let Some(article) = page.dom.elements_by_tag(root, &["article"]).first().copied() else {
        return sub;
    };

    for kind in [EventKind::Scroll, EventKind::Resize] {
        let id = page.listen(Target::Window, kind, move |page, _| update(page, article));
        sub.add_listener(id);
    }
    update(page, article);

    sub
}

fn update(page: &mut Page, article: NodeId) {
    let viewport = page.viewport();
    let rect = page.layout(article);
    let percent = scroll_progress(viewport.scroll_y, rect.top, rect.height, viewport.height);

    let root = page.dom.root();
    page.dom.set_style(root, PROGRESS_PROPERTY, &format!("{}%", percent));
}
