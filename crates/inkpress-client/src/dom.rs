//! Arena-backed document tree.
//!
//! Nodes live in a single vector and refer to each other by [`NodeId`].
//! Removing a node only detaches it; ids stay valid for the lifetime of the
//! document, which lets event handlers hold on to nodes they created.
//!
//! Nothing is ever freed, so every `create_element`, `create_text` or
//! `clone_node` grows the arena until the document is dropped. Code that runs
//! repeatedly on a long-lived page should update existing nodes in place
//! rather than rebuilding them.

/// Identifier of a node within a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Element with tag name, attributes and inline styles.
    Element(Element),
    /// Text content.
    Text(String),
}

/// An element's own data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<(String, String)>,
    /// Inline style properties in insertion order
    pub styles: Vec<(String, String)>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A document: an `html` root holding a `body`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.body);
        doc
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The `html` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Node payload.
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    /// Element payload, `None` for text nodes.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.node_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Check whether a node is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Detach a node from its parent. The node and its subtree stay usable.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` before `reference`, or append when `reference` is `None`
    /// or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if parent == child || self.contains(child, parent) || self.node(parent).is_none() {
            return;
        }

        self.remove(child);

        let Some(p) = self.node_mut(parent) else {
            return;
        };
        let position = reference.and_then(|r| p.children.iter().position(|c| *c == r));
        match position {
            Some(pos) => p.children.insert(pos, child),
            None => p.children.push(child),
        }

        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
        }
    }

    /// Detach every child of a node.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    /// Replace a node's children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let text_node = self.create_text(text);
        self.append_child(id, text_node);
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(_)) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Descendants of a node in document order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements whose tag is one of `tags`, in document order.
    pub fn elements_by_tag(&self, scope: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| {
                self.tag(*id)
                    .is_some_and(|t| tags.iter().any(|want| t.eq_ignore_ascii_case(want)))
            })
            .collect()
    }

    /// Descendant elements carrying `class`, in document order.
    pub fn elements_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// First descendant element carrying `class`.
    pub fn first_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors_inclusive(id).find(|n| self.is_tag(*n, tag))
    }

    /// Nearest inclusive ancestor carrying `class`.
    pub fn closest_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.ancestors_inclusive(id).find(|n| self.has_class(*n, class))
    }

    /// The node followed by each of its ancestors.
    pub fn ancestors_inclusive(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).map(|_| id), move |n| self.parent(*n))
    }

    /// Check whether `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|n| n == ancestor)
    }

    /// Check whether a node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Find an attached element by its `id` attribute.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        if element_id.is_empty() {
            return None;
        }
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(element_id))
    }

    /// Copy an element without its children. The copy is detached.
    pub fn clone_node(&mut self, id: NodeId) -> Option<NodeId> {
        let data = self.data(id)?.clone();
        Some(self.alloc(data))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    /// Class list of an element.
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.element(id).is_none() || self.has_class(id, class) {
            return;
        }
        let mut classes: Vec<String> = self.classes(id).into_iter().map(String::from).collect();
        classes.push(class.to_string());
        self.set_attr(id, "class", &classes.join(" "));
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let classes: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(String::from)
            .collect();
        self.set_attr(id, "class", &classes.join(" "));
    }

    /// Flip a class, returning whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?
            .styles
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline style property. An empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_style(id, property);
            return;
        }
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.styles.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => el.styles.push((property.to_string(), value.to_string())),
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let Some(el) = self.element_mut(id) {
            el.styles.retain(|(k, _)| k != property);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph(doc: &mut Document, text: &str) -> NodeId {
        let p = doc.create_element("p");
        doc.set_text(p, text);
        p
    }

    #[test]
    fn builds_and_walks_tree() {
        let mut doc = Document::new();
        let article = doc.create_element("article");
        doc.append_child(doc.body(), article);
        let first = paragraph(&mut doc, "one");
        let second = paragraph(&mut doc, "two");
        doc.append_child(article, second);
        doc.insert_before(article, first, Some(second));

        assert_eq!(doc.children(article), &[first, second]);
        assert_eq!(doc.text_content(article), "onetwo");
        assert_eq!(doc.elements_by_tag(doc.root(), &["p"]), vec![first, second]);
        assert!(doc.is_attached(first));
    }

    #[test]
    fn remove_detaches_subtree() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attr(div, "id", "box");
        doc.append_child(doc.body(), div);
        assert_eq!(doc.get_element_by_id("box"), Some(div));

        doc.remove(div);

        assert!(!doc.is_attached(div));
        assert_eq!(doc.get_element_by_id("box"), None);
        assert_eq!(doc.parent(div), None);
    }

    #[test]
    fn refuses_to_create_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner);

        doc.append_child(inner, outer);

        assert_eq!(doc.parent(outer), None);
        assert_eq!(doc.parent(inner), Some(outer));
    }

    #[test]
    fn class_list_operations() {
        let mut doc = Document::new();
        let nav = doc.create_element("nav");

        doc.add_class(nav, "toc");
        doc.add_class(nav, "toc");
        assert_eq!(doc.attr(nav, "class"), Some("toc"));

        assert!(doc.toggle_class(nav, "collapsed"));
        assert_eq!(doc.classes(nav), vec!["toc", "collapsed"]);
        assert!(!doc.toggle_class(nav, "collapsed"));
        assert!(!doc.has_class(nav, "collapsed"));
    }

    #[test]
    fn closest_is_inclusive() {
        let mut doc = Document::new();
        let link = doc.create_element("a");
        let img = doc.create_element("img");
        doc.append_child(link, img);

        assert_eq!(doc.closest(img, "a"), Some(link));
        assert_eq!(doc.closest(link, "a"), Some(link));
        assert_eq!(doc.closest(img, "pre"), None);
    }

    #[test]
    fn empty_style_value_removes_property() {
        let mut doc = Document::new();
        let body = doc.body();

        doc.set_style(body, "overflow", "hidden");
        assert_eq!(doc.style(body, "overflow"), Some("hidden"));

        doc.set_style(body, "overflow", "");
        assert_eq!(doc.style(body, "overflow"), None);
    }

    #[test]
    fn removed_nodes_stay_allocated() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.body(), div);
        let before = doc.node_count();

        doc.remove(div);
        doc.set_text(doc.body(), "x");
        doc.set_text(doc.body(), "y");

        assert_eq!(doc.node_count(), before + 2);
        assert_eq!(doc.tag(div), Some("div"));
    }

    #[test]
    fn clone_is_shallow_and_detached() {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        doc.set_attr(img, "src", "cat.png");
        doc.append_child(doc.body(), img);
        let caption = doc.create_text("ignored");
        doc.append_child(img, caption);

        let copy = doc.clone_node(img).unwrap();

        assert_eq!(doc.attr(copy, "src"), Some("cat.png"));
        assert!(doc.children(copy).is_empty());
        assert!(!doc.is_attached(copy));
    }
}
