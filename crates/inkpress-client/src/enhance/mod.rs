//! Progressive enhancement of a rendered article.
//!
//! Each stage takes the page and the content container, attaches whatever it
//! needs and hands back a [`Subscription`] that undoes it. Stages never fail;
//! a stage whose preconditions are missing attaches nothing.

pub mod copy;
pub mod progress;
pub mod scroll;
pub mod toc;
pub mod zoom;

use crate::builder::CONTENT_CLASS;
use crate::dom::{Document, NodeId};
use crate::events::Subscription;
use crate::page::Page;

/// Syntax highlighter run over the container after every other stage.
pub trait Highlighter {
    fn highlight_all_under(&self, dom: &mut Document, container: NodeId);
}

/// Enhancement stages in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CopyButtons,
    ReadingProgress,
    TableOfContents,
    SmoothScroll,
    ImageZoom,
    Highlight,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::CopyButtons,
        Stage::ReadingProgress,
        Stage::TableOfContents,
        Stage::SmoothScroll,
        Stage::ImageZoom,
        Stage::Highlight,
    ];
}

/// The result of one enhancement pass.
#[derive(Debug)]
pub struct Enhancement {
    container: NodeId,
    stages: Vec<(Stage, Subscription)>,
}

impl Enhancement {
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Stages that ran, in order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.iter().map(|(stage, _)| *stage)
    }

    pub fn subscription(&self, stage: Stage) -> Option<&Subscription> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, sub)| sub)
    }

    /// Undo every stage, last stage first.
    pub fn dispose(self, page: &mut Page) {
        for (stage, sub) in self.stages.into_iter().rev() {
            tracing::trace!("Disposing {:?}", stage);
            sub.dispose(page);
        }
    }
}

/// Runs the enhancement pipeline and remembers the last pass so a re-run
/// replaces it instead of stacking handlers.
#[derive(Default)]
pub struct Enhancer {
    highlighter: Option<Box<dyn Highlighter>>,
    disabled: Vec<Stage>,
    current: Option<Enhancement>,
}

impl Enhancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// Skip a stage on every pass.
    pub fn without(mut self, stage: Stage) -> Self {
        if !self.disabled.contains(&stage) {
            self.disabled.push(stage);
        }
        self
    }

    /// Enhance `container`, tearing down the previous pass first.
    pub fn enhance(&mut self, page: &mut Page, container: NodeId) -> &Enhancement {
        self.teardown(page);

        let mut stages = Vec::new();
        for stage in Stage::ALL {
            if self.disabled.contains(&stage) {
                continue;
            }

            let sub = match stage {
                Stage::CopyButtons => copy::attach(page, container),
                Stage::ReadingProgress => progress::attach(page),
                Stage::TableOfContents => toc::attach(page, container),
                Stage::SmoothScroll => scroll::attach(page, container),
                Stage::ImageZoom => zoom::attach(page, container),
                Stage::Highlight => {
                    let Some(highlighter) = &self.highlighter else {
                        continue;
                    };
                    highlighter.highlight_all_under(&mut page.dom, container);
                    Subscription::new()
                }
            };
            stages.push((stage, sub));
        }

        tracing::debug!("Enhanced content with {} stages", stages.len());

        self.current.insert(Enhancement { container, stages })
    }

    pub fn current(&self) -> Option<&Enhancement> {
        self.current.as_ref()
    }

    /// Dispose the current pass, if any.
    pub fn teardown(&mut self, page: &mut Page) {
        if let Some(previous) = self.current.take() {
            previous.dispose(page);
        }
    }
}

/// Enhance the page's `.markdown-content` container, if it has one.
pub fn initialize(page: &mut Page, enhancer: &mut Enhancer) -> Option<NodeId> {
    let root = page.dom.root();
    let container = page.dom.first_by_class(root, CONTENT_CLASS)?;
    enhancer.enhance(page, container);
    Some(container)
}

/// Replace a node's content with a Font Awesome icon.
pub(crate) fn set_icon(dom: &mut Document, host: NodeId, icon: &str) {
    let class = format!("fas {}", icon);
    // Toggles swap icons often; reuse the existing node
    if let [only] = dom.children(host) {
        let only = *only;
        if dom.is_tag(only, "i") {
            dom.set_attr(only, "class", &class);
            return;
        }
    }
    dom.clear_children(host);
    let i = dom.create_element("i");
    dom.set_attr(i, "class", &class);
    dom.append_child(host, i);
}

/// Class of the icon currently shown by a node.
pub(crate) fn icon_of(dom: &Document, host: NodeId) -> Option<String> {
    let i = dom.first_child(host)?;
    dom.classes(i)
        .into_iter()
        .find(|c| c.starts_with("fa-"))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    const ARTICLE: &str = "# One\n\n## Two\n\n### Three\n\n```sh\nls\n```\n\n![cat](cat.png)\n";

    struct CountingHighlighter(Rc<Cell<usize>>);

    impl Highlighter for CountingHighlighter {
        fn highlight_all_under(&self, dom: &mut Document, container: NodeId) {
            self.0.set(self.0.get() + 1);
            for code in dom.elements_by_tag(container, &["code"]) {
                dom.add_class(code, "highlighted");
            }
        }
    }

    fn page_from(markdown: &str) -> (Page, NodeId) {
        let (dom, container) = Document::from_markdown(markdown);
        (Page::new(dom, crate::clipboard::MemoryClipboard::new()), container)
    }

    #[test]
    fn initialize_without_container_is_noop() {
        let mut page = Page::default();
        let mut enhancer = Enhancer::new();

        assert_eq!(initialize(&mut page, &mut enhancer), None);
        assert!(enhancer.current().is_none());
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn rerun_replaces_previous_pass() {
        let (mut page, container) = page_from(ARTICLE);
        let mut enhancer = Enhancer::new();

        enhancer.enhance(&mut page, container);
        let listeners = page.listener_count();
        enhancer.enhance(&mut page, container);

        assert_eq!(page.listener_count(), listeners);
        assert_eq!(page.dom.elements_by_class(container, copy::BUTTON_CLASS).len(), 1);
        assert_eq!(page.dom.elements_by_class(container, toc::TOC_CLASS).len(), 1);
    }

    #[test]
    fn teardown_removes_everything() {
        let (mut page, container) = page_from(ARTICLE);
        let mut enhancer = Enhancer::new();

        enhancer.enhance(&mut page, container);
        enhancer.teardown(&mut page);

        assert_eq!(page.listener_count(), 0);
        assert!(page.dom.first_by_class(container, copy::BUTTON_CLASS).is_none());
        assert!(page.dom.first_by_class(container, toc::TOC_CLASS).is_none());
    }

    #[test]
    fn highlighter_runs_last() {
        let (mut page, container) = page_from(ARTICLE);
        let calls = Rc::new(Cell::new(0));
        let mut enhancer = Enhancer::new().with_highlighter(CountingHighlighter(Rc::clone(&calls)));

        let stages: Vec<Stage> = enhancer.enhance(&mut page, container).stages().collect();

        assert_eq!(calls.get(), 1);
        assert_eq!(stages.last(), Some(&Stage::Highlight));
        let code = page.dom.elements_by_tag(container, &["code"])[0];
        assert!(page.dom.has_class(code, "highlighted"));
    }

    #[test]
    fn disabled_stage_is_skipped() {
        let (mut page, container) = page_from(ARTICLE);
        let mut enhancer = Enhancer::new().without(Stage::TableOfContents);

        let enhancement = enhancer.enhance(&mut page, container);

        assert!(enhancement.subscription(Stage::TableOfContents).is_none());
        assert!(page.dom.first_by_class(container, toc::TOC_CLASS).is_none());
    }

    #[test]
    fn swapping_icons_reuses_the_node() {
        let mut dom = Document::new();
        let button = dom.create_element("button");
        set_icon(&mut dom, button, "fa-copy");
        let icon = dom.first_child(button).unwrap();
        let allocated = dom.node_count();

        for name in ["fa-check", "fa-copy", "fa-check"] {
            set_icon(&mut dom, button, name);
        }

        assert_eq!(dom.node_count(), allocated);
        assert_eq!(dom.children(button), &[icon]);
        assert_eq!(icon_of(&dom, button).as_deref(), Some("fa-check"));
    }
}
