//! Build a document from Markdown.
//!
//! Parsing uses the same extensions as the server. Headings only carry the
//! ids written in the source (`## Setup {#setup}`); the server's generated
//! slug ids are left out so pages can exercise the enhancer's own id fallback.

use inkpress_markdown::markdown_options;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

use crate::dom::{Document, NodeId};

/// Class of the element that holds an article's rendered body.
pub const CONTENT_CLASS: &str = "markdown-content";

impl Document {
    /// Build `body > article > div.markdown-content` from Markdown.
    ///
    /// Returns the document and the content container.
    pub fn from_markdown(markdown: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let article = doc.create_element("article");
        doc.append_child(doc.body(), article);
        let container = doc.create_element("div");
        doc.add_class(container, CONTENT_CLASS);
        doc.append_child(article, container);

        doc.append_markdown(container, markdown);

        (doc, container)
    }

    /// Render Markdown into nodes appended to `parent`.
    pub fn append_markdown(&mut self, parent: NodeId, markdown: &str) {
        let mut stack = vec![parent];

        for event in Parser::new_ext(markdown, markdown_options()) {
            let top = *stack.last().unwrap_or(&parent);
            // Inline markup inside an image only contributes to its alt text
            let image = stack.iter().rev().find(|n| self.is_tag(**n, "img")).copied();

            match event {
                Event::Start(_) if image.is_some() => {
                    stack.push(top);
                }

                Event::Start(tag) => {
                    let node = self.open_tag(top, tag);
                    stack.push(node);
                }

                Event::End(_) => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }

                Event::Text(text) | Event::Code(text) if image.is_some() => {
                    if let Some(img) = image {
                        let alt = format!("{}{}", self.attr(img, "alt").unwrap_or(""), text);
                        self.set_attr(img, "alt", &alt);
                    }
                }

                Event::Text(text) => {
                    let node = self.create_text(&text);
                    self.append_child(top, node);
                }

                Event::Code(text) => {
                    let code = self.create_element("code");
                    self.set_text(code, &text);
                    self.append_child(top, code);
                }

                Event::SoftBreak => {
                    let node = self.create_text("\n");
                    self.append_child(top, node);
                }

                Event::HardBreak => {
                    let br = self.create_element("br");
                    self.append_child(top, br);
                }

                Event::Rule => {
                    let hr = self.create_element("hr");
                    self.append_child(top, hr);
                }

                Event::TaskListMarker(checked) => {
                    let input = self.create_element("input");
                    self.set_attr(input, "type", "checkbox");
                    self.set_attr(input, "disabled", "");
                    if checked {
                        self.set_attr(input, "checked", "");
                    }
                    self.append_child(top, input);
                }

                _ => {}
            }
        }
    }

    /// Create and attach the element for an opening tag. Returns the node
    /// that receives the tag's children.
    fn open_tag(&mut self, parent: NodeId, tag: Tag<'_>) -> NodeId {
        let node = match tag {
            Tag::Heading { level, id, .. } => {
                let h = self.create_element(&format!("h{}", level as u8));
                if let Some(id) = id {
                    self.set_attr(h, "id", &id);
                }
                h
            }

            Tag::CodeBlock(kind) => {
                let pre = self.create_element("pre");
                let code = self.create_element("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    if let Some(lang) = info.split_whitespace().next() {
                        self.add_class(code, &format!("language-{}", lang));
                    }
                }
                self.append_child(pre, code);
                self.append_child(parent, pre);
                return code;
            }

            Tag::Link { dest_url, title, .. } => {
                let a = self.create_element("a");
                self.set_attr(a, "href", &dest_url);
                if !title.is_empty() {
                    self.set_attr(a, "title", &title);
                }
                a
            }

            Tag::Image {
                dest_url, title, ..
            } => {
                let img = self.create_element("img");
                self.set_attr(img, "src", &dest_url);
                self.set_attr(img, "alt", "");
                if !title.is_empty() {
                    self.set_attr(img, "title", &title);
                }
                img
            }

            Tag::List(Some(start)) => {
                let ol = self.create_element("ol");
                if start != 1 {
                    self.set_attr(ol, "start", &start.to_string());
                }
                ol
            }

            Tag::FootnoteDefinition(label) => {
                let div = self.create_element("div");
                self.add_class(div, "footnote-definition");
                self.set_attr(div, "id", &label);
                div
            }

            other => {
                let name = match other {
                    Tag::Paragraph => "p",
                    Tag::BlockQuote(_) => "blockquote",
                    Tag::List(None) => "ul",
                    Tag::Item => "li",
                    Tag::Emphasis => "em",
                    Tag::Strong => "strong",
                    Tag::Strikethrough => "del",
                    Tag::Table(_) => "table",
                    Tag::TableHead => "thead",
                    Tag::TableRow => "tr",
                    Tag::TableCell => "td",
                    _ => "div",
                };
                self.create_element(name)
            }
        };

        self.append_child(parent, node);
        node
    }
}
