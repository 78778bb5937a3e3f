//! DOM tree data structures.
//!
//! Nodes live in an arena owned by [`Document`]. Parent links are plain indices, so
//! they never own the node they point at.

use dd_core::DrillError;
use dd_core::DrillResult;
use std::collections::HashMap;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

/// Structural role of an element inside a drill-down diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// `<g>` container representing a nested visual grouping.
    Group,
    /// `<a>` element that may obscure content beneath it.
    OverlayLink,
    Other,
}

impl ElementRole {
    /// Classifies a tag by its local name; an XML prefix (`svg:g`) is ignored.
    pub fn from_tag(tag: &str) -> Self {
        let local = tag.rsplit_once(':').map_or(tag, |(_, local)| local);
        match local {
            "g" => Self::Group,
            "a" => Self::OverlayLink,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Display {
    #[default]
    Visible,
    Hidden,
}

/// Element payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub role: ElementRole,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Raw attributes in source order, `id` and `class` included.
    pub attributes: Vec<(String, String)>,
    pub display: Display,
}

impl Element {
    pub fn new(tag: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        let tag = tag.into();
        let role = ElementRole::from_tag(&tag);
        let id = attribute_value(&attributes, "id")
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        let classes = attribute_value(&attributes, "class")
            .map(|value| value.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();

        Self {
            tag,
            role,
            id,
            classes,
            attributes,
            display: Display::Visible,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        attribute_value(&self.attributes, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    pub fn is_hidden(&self) -> bool {
        self.display == Display::Hidden
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Arena-backed document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// Document node id; always present and never has a parent.
    pub const ROOT: NodeId = 0;

    pub fn empty() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            ids: HashMap::new(),
        }
    }

    /// Number of nodes in the arena, the document node included. An empty document has
    /// length 1.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing hangs below the document node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// First element child of the document node, typically `<svg>`.
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[Self::ROOT]
            .children
            .iter()
            .copied()
            .find(|child| self.element(*child).is_some())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id).and_then(Node::as_element)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Lazily walks parent links upward, excluding `start` itself.
    pub fn ancestors(&self, start: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(start),
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.ids.get(id).copied()
    }

    pub fn append_element(&mut self, parent: NodeId, element: Element) -> DrillResult<NodeId> {
        self.ensure_container(parent)?;

        if let Some(id) = element.id.as_deref() {
            if self.ids.contains_key(id) {
                return Err(DrillError::new(
                    "dom.duplicate_id",
                    format!("element id `{id}` is already in use"),
                ));
            }
        }

        let node_id = self.nodes.len();
        if let Some(id) = element.id.clone() {
            self.ids.insert(id, node_id);
        }
        self.push_child(parent, node_id, NodeKind::Element(element));
        Ok(node_id)
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> DrillResult<NodeId> {
        self.ensure_container(parent)?;
        let node_id = self.nodes.len();
        self.push_child(parent, node_id, NodeKind::Text(text.into()));
        Ok(node_id)
    }

    /// Sets the display state of an element. Returns true when the state changed.
    pub fn set_display(&mut self, id: NodeId, display: Display) -> bool {
        match self.nodes.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) if element.display != display => {
                element.display = display;
                true
            }
            _ => false,
        }
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(Element::is_hidden)
    }

    /// Hidden elements in arena (document) order.
    pub fn hidden_elements(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|id| self.is_hidden(*id))
            .collect()
    }

    fn ensure_container(&self, parent: NodeId) -> DrillResult<()> {
        match self.nodes.get(parent).map(|node| &node.kind) {
            Some(NodeKind::Document | NodeKind::Element(_)) => Ok(()),
            Some(NodeKind::Text(_)) => Err(DrillError::new(
                "dom.invalid_parent",
                format!("node {parent} is a text node and cannot have children"),
            )),
            None => Err(DrillError::new(
                "dom.unknown_node",
                format!("node {parent} does not exist"),
            )),
        }
    }

    fn push_child(&mut self, parent: NodeId, node_id: NodeId, kind: NodeKind) {
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent].children.push(node_id);
    }
}

/// Iterator over the ancestors of a node, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

fn attribute_value<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
