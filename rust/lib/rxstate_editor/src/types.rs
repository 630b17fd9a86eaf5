use std::collections::BTreeMap;
use std::fmt;

use rxstate::StatePaths;
use serde::{Deserialize, Serialize};

/// Element or text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Text,
}

/// One node of a parsed HTML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HtmlNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Id of the parent node. Filled in by [`Document::from_root`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl HtmlNode {
    pub fn element(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Element,
            tag_name: Some(tag.into()),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text_content: None,
            parent: None,
        }
    }

    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Text,
            tag_name: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text_content: Some(content.into()),
            parent: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: HtmlNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A document tree plus an id index over all of its nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StatePaths)]
pub struct Document {
    pub root: HtmlNode,
    pub nodes: BTreeMap<String, HtmlNode>,
}

impl Document {
    /// Index `root` and its descendants by id, recording each node's parent.
    pub fn from_root(mut root: HtmlNode) -> Self {
        link_parents(&mut root, None);
        let mut nodes = BTreeMap::new();
        index(&root, &mut nodes);
        Self { root, nodes }
    }

    /// A document holding a single empty `div`.
    pub fn empty() -> Self {
        Self::from_root(HtmlNode::element("root", "div"))
    }

    pub fn get(&self, id: &str) -> Option<&HtmlNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

fn link_parents(node: &mut HtmlNode, parent: Option<&str>) {
    node.parent = parent.map(str::to_string);
    let id = node.id.clone();
    for child in &mut node.children {
        link_parents(child, Some(&id));
    }
}

fn index(node: &HtmlNode, nodes: &mut BTreeMap<String, HtmlNode>) {
    nodes.insert(node.id.clone(), node.clone());
    for child in &node.children {
        index(child, nodes);
    }
}

/// Interaction mode of the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    View,
    #[default]
    Select,
    Edit,
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorMode::View => write!(f, "view"),
            EditorMode::Select => write!(f, "select"),
            EditorMode::Edit => write!(f, "edit"),
        }
    }
}

/// Bounding rectangle of a rendered node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Node id plus its on-screen rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRect {
    pub id: String,
    pub rect: Rect,
}

impl NodeRect {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> HtmlNode {
        HtmlNode::element("n0", "section")
            .with_attr("class", "hero")
            .with_child(HtmlNode::element("n1", "h1").with_child(HtmlNode::text("n2", "Hello")))
            .with_child(HtmlNode::element("n3", "img").with_attr("src", "a.png"))
    }

    // ========================================================================
    // Document
    // ========================================================================

    #[test]
    fn from_root_indexes_every_node() {
        let doc = Document::from_root(sample());
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.get("n2").unwrap().text_content.as_deref(), Some("Hello"));
    }

    #[test]
    fn from_root_links_parents() {
        let doc = Document::from_root(sample());
        assert_eq!(doc.get("n0").unwrap().parent, None);
        assert_eq!(doc.get("n1").unwrap().parent.as_deref(), Some("n0"));
        assert_eq!(doc.get("n2").unwrap().parent.as_deref(), Some("n1"));
        assert_eq!(doc.root.children[0].children[0].parent.as_deref(), Some("n1"));
    }

    #[test]
    fn empty_document_has_root_div() {
        let doc = Document::empty();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.root.tag_name.as_deref(), Some("div"));
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    #[test]
    fn node_serializes_with_type_field() {
        let v = serde_json::to_value(HtmlNode::text("t", "hi")).unwrap();
        assert_eq!(v, json!({"id": "t", "type": "text", "textContent": "hi"}));
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_value(EditorMode::Edit).unwrap(), json!("edit"));
        assert_eq!(EditorMode::default(), EditorMode::Select);
        assert_eq!(EditorMode::View.to_string(), "view");
    }
}
