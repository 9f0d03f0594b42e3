//! Schema model and the flattened schema index.
//!
//! A form schema is a tree of [`SchemaNode`]s. The engine never walks the
//! tree directly while dispatching; it reads the [`FlattenedSchemaIndex`],
//! which maps every node's value path to the node.

use form_watch_path::{parse_value_path, Segment, ValuePath};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::void::VoidContainerSet;

/// Data binding declared on a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Bind {
    Flag(bool),
    Key(String),
    Keys(Vec<String>),
}

impl Bind {
    /// Whether the binding is active. `false` and `""` bind nothing.
    pub fn is_bound(&self) -> bool {
        match self {
            Bind::Flag(flag) => *flag,
            Bind::Key(key) => !key.is_empty(),
            Bind::Keys(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object { properties: IndexMap<String, SchemaNode> },
    Array { items: Box<SchemaNode> },
    /// Layout-only node. Its children are rendered in place and its key
    /// normally carries no data of its own.
    Void { properties: IndexMap<String, SchemaNode> },
    Leaf { ty: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub widget: Option<String>,
    pub bind: Option<Bind>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSchema {
    #[serde(rename = "type")]
    ty: Option<String>,
    widget: Option<String>,
    bind: Option<Bind>,
    properties: Option<IndexMap<String, RawSchema>>,
    items: Option<Box<RawSchema>>,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self { kind, widget: None, bind: None }
    }

    pub fn leaf(ty: &str) -> Self {
        Self::new(SchemaKind::Leaf { ty: Some(ty.to_string()) })
    }

    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, SchemaNode)>) -> Self {
        Self::new(SchemaKind::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn void<K: Into<String>>(properties: impl IntoIterator<Item = (K, SchemaNode)>) -> Self {
        Self::new(SchemaKind::Void {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::new(SchemaKind::Array { items: Box::new(items) })
    }

    pub fn with_widget(mut self, widget: &str) -> Self {
        self.widget = Some(widget.to_string());
        self
    }

    pub fn with_bind(mut self, bind: Bind) -> Self {
        self.bind = Some(bind);
        self
    }

    /// Parse a JSON schema document.
    ///
    /// An array node without `items` (a multi-select such as `checkboxes`)
    /// holds plain values and becomes a leaf.
    ///
    /// # Errors
    ///
    /// Fails when the document does not have the shape of a schema.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        let raw = RawSchema::deserialize(value)?;
        Ok(build(raw))
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(json)?;
        Ok(build(raw))
    }

    /// Named children, for object and void nodes.
    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match &self.kind {
            SchemaKind::Object { properties } | SchemaKind::Void { properties } => Some(properties),
            _ => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.properties()?.get(key)
    }

    pub fn items(&self) -> Option<&SchemaNode> {
        match &self.kind {
            SchemaKind::Array { items } => Some(items),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, SchemaKind::Void { .. })
    }

    pub fn has_binding(&self) -> bool {
        self.bind.as_ref().is_some_and(Bind::is_bound)
    }
}

fn build(raw: RawSchema) -> SchemaNode {
    let RawSchema { ty, widget, bind, properties, items } = raw;
    let kind = match (ty.as_deref(), properties, items) {
        (Some("object"), properties, _) | (None, properties @ Some(_), _) => SchemaKind::Object {
            properties: build_children(properties.unwrap_or_default()),
        },
        (Some("void"), properties, _) => SchemaKind::Void {
            properties: build_children(properties.unwrap_or_default()),
        },
        (Some("array"), _, Some(items)) | (None, None, Some(items)) => SchemaKind::Array {
            items: Box::new(build(*items)),
        },
        (ty, _, _) => SchemaKind::Leaf { ty: ty.map(str::to_string) },
    };
    SchemaNode { kind, widget, bind }
}

fn build_children(raw: IndexMap<String, RawSchema>) -> IndexMap<String, SchemaNode> {
    raw.into_iter().map(|(key, child)| (key, build(child))).collect()
}

/// Every schema node keyed by its value path.
///
/// The root is stored under the empty path (`#`), object and void children
/// under `parent.key`, an array's item schema under `parent[]`. Paths are
/// unique and kept in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedSchemaIndex {
    entries: IndexMap<ValuePath, SchemaNode>,
}

impl FlattenedSchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_schema(root: &SchemaNode) -> Self {
        let mut index = Self::new();
        index.walk(root, ValuePath::root());
        index
    }

    fn walk(&mut self, node: &SchemaNode, path: ValuePath) {
        self.entries.insert(path.clone(), node.clone());
        match &node.kind {
            SchemaKind::Object { properties } | SchemaKind::Void { properties } => {
                for (key, child) in properties {
                    self.walk(child, path.join_key(key.as_str()));
                }
            }
            SchemaKind::Array { items } => self.walk(items, path.join_array()),
            SchemaKind::Leaf { .. } => {}
        }
    }

    pub fn insert(&mut self, path: ValuePath, node: SchemaNode) -> Option<SchemaNode> {
        self.entries.insert(path, node)
    }

    pub fn get(&self, path: &ValuePath) -> Option<&SchemaNode> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &ValuePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ValuePath, &SchemaNode)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ValuePath, SchemaNode)> for FlattenedSchemaIndex {
    fn from_iter<T: IntoIterator<Item = (ValuePath, SchemaNode)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// A schema together with everything derived from it.
///
/// Rebuilt whenever the schema changes; read-only during dispatch.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    pub root: SchemaNode,
    pub index: FlattenedSchemaIndex,
    pub voids: VoidContainerSet,
}

impl SchemaContext {
    pub fn new(root: SchemaNode) -> Self {
        let index = FlattenedSchemaIndex::from_schema(&root);
        let voids = VoidContainerSet::from_index(&index);
        Self { root, index, voids }
    }
}

/// Expand a data path into the key of the node inside the raw schema
/// document, inserting `properties` and `items` along the way.
///
/// `properties` follows a segment only when that node has named children
/// and more segments remain, which includes void containers. An array
/// marker always expands to `items`, also on a single-segment path, so
/// `list[]` gives `properties.list.items` rather than `properties.list[]`.
/// Segments that do not exist in the schema are still appended verbatim.
///
/// ```
/// use form_watch::{resolve_schema_path, SchemaNode};
/// use serde_json::json;
///
/// let schema = SchemaNode::from_json(&json!({
///     "type": "object",
///     "properties": {
///         "list": {
///             "type": "array",
///             "items": { "type": "object", "properties": { "name": { "type": "string" } } }
///         }
///     }
/// }))
/// .unwrap();
/// assert_eq!(resolve_schema_path("list[].name", &schema), "properties.list.items.properties.name");
/// assert_eq!(resolve_schema_path("list", &schema), "properties.list");
/// ```
pub fn resolve_schema_path(data_path: &str, root: &SchemaNode) -> String {
    let path = parse_value_path(data_path);
    let mut out = vec!["properties"];
    // Node whose scope the next segment is looked up in, and whether that
    // scope is its `properties` map (true) or the node itself (false).
    let mut scope = Some(root);
    let mut in_properties = true;
    let last = path.len().saturating_sub(1);

    for (i, segment) in path.segments().iter().enumerate() {
        let child = match segment {
            Segment::Key(key) => {
                out.push(key.as_str());
                if in_properties {
                    scope.and_then(|node| node.property(key))
                } else {
                    None
                }
            }
            Segment::Array => {
                out.push("items");
                if in_properties {
                    None
                } else {
                    scope.and_then(SchemaNode::items)
                }
            }
        };
        in_properties = child.and_then(SchemaNode::properties).is_some() && i != last;
        if in_properties {
            out.push("properties");
        }
        scope = child;
    }
    out.join(".")
}
