//! Structural queries over Sketch JSON trees.
//!
//! Sketch nodes are open-ended JSON objects. Rather than a closed enum of
//! layer classes, a [`Node`] is a borrowed view with a few accessor
//! capabilities: identifier (`do_objectID`), discriminator (`_class`) and
//! child containers.
//!
//! # Containers
//!
//! ```text
//! layers:            [ node, node, ... ]              bare
//! artboards:         { "objects": [ node, ... ] }     wrapped
//! pages:             { "objects": [ node, ... ] }     wrapped
//! ```
//!
//! Each container is a [`ContainerKind`], resolved against a node once. A node
//! with none of them, or with a container of the wrong shape, is a leaf.
//!
//! All traversals are depth-first pre-order: the node itself, then its
//! containers in [`ContainerKind::ALL`] order, each container's elements in
//! sequence order.

use serde::Serialize;
use serde_json::Value;

use crate::sketch::error::{SketchError, SketchResult};

/// Field holding a node's identifier.
pub const ID_FIELD: &str = "do_objectID";

/// Field holding a node's class discriminator.
pub const CLASS_FIELD: &str = "_class";

/// Field holding a node's display name.
pub const NAME_FIELD: &str = "name";

/// Field holding a node's frame rectangle.
pub const FRAME_FIELD: &str = "frame";

/// Class of reusable symbol (component) definitions.
pub const SYMBOL_MASTER_CLASS: &str = "symbolMaster";

/// `type` reported for every [`Component`].
pub const COMPONENT_TYPE: &str = "component";

/// How a container field holds its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerShape {
    /// The field is an array of nodes.
    Bare,
    /// The field is an object whose `objects` member is an array of nodes.
    Wrapped,
}

/// The child containers a node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `layers: [...]`
    Layers,
    /// `artboards: { objects: [...] }`
    Artboards,
    /// `pages: { objects: [...] }`
    Pages,
}

impl ContainerKind {
    /// Every container kind, in traversal order.
    pub const ALL: [Self; 3] = [Self::Layers, Self::Artboards, Self::Pages];

    /// The JSON field this container lives in.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Layers => "layers",
            Self::Artboards => "artboards",
            Self::Pages => "pages",
        }
    }

    /// How this container holds its children.
    #[must_use]
    pub const fn shape(self) -> ContainerShape {
        match self {
            Self::Layers => ContainerShape::Bare,
            Self::Artboards | Self::Pages => ContainerShape::Wrapped,
        }
    }

    /// Returns the container's elements on `node`, if it has a well-formed one.
    #[must_use]
    pub fn resolve(self, node: &Value) -> Option<&[Value]> {
        let field = node.get(self.field())?;
        let items = match self.shape() {
            ContainerShape::Bare => field,
            ContainerShape::Wrapped => field.get("objects")?,
        };
        items.as_array().map(Vec::as_slice)
    }
}

/// A borrowed view of a JSON object in a Sketch tree.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(&'a Value);

impl<'a> Node<'a> {
    /// Views `value` as a node. Returns `None` for non-objects.
    #[must_use]
    pub fn new(value: &'a Value) -> Option<Self> {
        value.is_object().then_some(Self(value))
    }

    /// The underlying JSON value.
    #[must_use]
    pub const fn value(self) -> &'a Value {
        self.0
    }

    /// The node's `do_objectID`, if it is a string.
    #[must_use]
    pub fn id(self) -> Option<&'a str> {
        self.str_field(ID_FIELD)
    }

    /// The node's `_class`, if it is a string.
    #[must_use]
    pub fn class(self) -> Option<&'a str> {
        self.str_field(CLASS_FIELD)
    }

    /// The node's `name`, if it is a string.
    #[must_use]
    pub fn name(self) -> Option<&'a str> {
        self.str_field(NAME_FIELD)
    }

    /// The node's `frame`, if present.
    #[must_use]
    pub fn frame(self) -> Option<&'a Value> {
        self.0.get(FRAME_FIELD)
    }

    /// Whether this node defines a reusable symbol.
    #[must_use]
    pub fn is_component(self) -> bool {
        self.class() == Some(SYMBOL_MASTER_CLASS)
    }

    /// Object children across all containers, in traversal order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = Node<'a>> {
        let value = self.0;
        ContainerKind::ALL
            .into_iter()
            .filter_map(move |kind| kind.resolve(value))
            .flatten()
            .filter_map(Node::new)
    }

    fn str_field(self, field: &str) -> Option<&'a str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

/// Depth-first pre-order iterator over every node reachable from a root.
///
/// Uses an explicit stack, so nesting depth is bounded by memory rather than
/// the call stack.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<Node<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().rev());
        Some(node)
    }
}

/// Walks `root` and everything under it. Non-object roots yield nothing.
#[must_use]
pub fn descendants(root: &Value) -> Descendants<'_> {
    Descendants {
        stack: Node::new(root).into_iter().collect(),
    }
}

/// Finds the first node whose identifier equals `id`.
#[must_use]
pub fn find_node_by_id<'a>(root: &'a Value, id: &str) -> Option<&'a Value> {
    descendants(root)
        .find(|node| node.id() == Some(id))
        .map(Node::value)
}

/// A symbol master, as reported by `list_components`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// The symbol's `do_objectID`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The symbol's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `"component"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// The symbol's frame rectangle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Value>,
}

impl Component {
    fn from_node(node: Node<'_>) -> Self {
        Self {
            id: node.id().map(str::to_string),
            name: node.name().map(str::to_string),
            kind: COMPONENT_TYPE,
            frame: node.frame().cloned(),
        }
    }
}

/// Collects every symbol master under `root`, outermost first.
///
/// Symbols nested inside other symbols are reported too.
#[must_use]
pub fn find_components(root: &Value) -> Vec<Component> {
    descendants(root)
        .filter(|node| node.is_component())
        .map(Component::from_node)
        .collect()
}

/// Identifying fields of an [`EnrichedNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMetadata {
    /// The node's `do_objectID`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The node's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The node's `_class`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// A node wrapped with a normalised metadata envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedNode {
    /// The node, unchanged.
    pub node: Value,
    /// The node's `_class`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Identifying fields pulled out of the node.
    pub metadata: NodeMetadata,
}

/// Wraps `node` with its metadata.
///
/// # Errors
///
/// Returns [`SketchError::InvalidNode`] if `node` is `None`.
pub fn enrich(node: Option<&Value>) -> SketchResult<EnrichedNode> {
    let value = node.ok_or(SketchError::InvalidNode)?;
    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

    Ok(EnrichedNode {
        node: value.clone(),
        kind: field(CLASS_FIELD),
        metadata: NodeMetadata {
            id: field(ID_FIELD),
            name: field(NAME_FIELD),
            class: field(CLASS_FIELD),
        },
    })
}
