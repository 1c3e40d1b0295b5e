use core::fmt;

use serde_json::Value;

/// Source position of a node in the schema document. Lines and columns are
/// 1-based; trees built programmatically carry `0:0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

/// Shape of one parsed node.
///
/// Mappings keep their entries in document order; key nodes are retained so
/// diagnostics can point at the key rather than the value.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Null,
    Scalar(String),
    Sequence(Vec<SchemaNode>),
    Mapping(Vec<(SchemaNode, SchemaNode)>),
}

/// One node of a parsed schema document.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    kind: NodeKind,
    pos: Pos,
}

impl SchemaNode {
    pub fn new(kind: NodeKind, pos: Pos) -> Self {
        Self { kind, pos }
    }

    pub fn null_at(pos: Pos) -> Self {
        Self::new(NodeKind::Null, pos)
    }

    pub fn scalar_at(text: impl Into<String>, pos: Pos) -> Self {
        Self::new(NodeKind::Scalar(text.into()), pos)
    }

    pub fn sequence_at(items: Vec<SchemaNode>, pos: Pos) -> Self {
        Self::new(NodeKind::Sequence(items), pos)
    }

    pub fn mapping_at(entries: Vec<(SchemaNode, SchemaNode)>, pos: Pos) -> Self {
        Self::new(NodeKind::Mapping(entries), pos)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn line(&self) -> u32 {
        self.pos.line
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    /// Scalar text, if this node is a scalar.
    pub fn scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Mapping lookup by key text.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        match &self.kind {
            NodeKind::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k.scalar() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Mapping entries in document order; empty for other shapes.
    pub fn entries(&self) -> &[(SchemaNode, SchemaNode)] {
        match &self.kind {
            NodeKind::Mapping(entries) => entries,
            _ => &[],
        }
    }

    /// Sequence items; empty for other shapes.
    pub fn items(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Sequence(items) => items,
            _ => &[],
        }
    }

    /// Number of children (mapping entries or sequence items).
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Sequence(items) => items.len(),
            NodeKind::Mapping(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a tree from a JSON value. Booleans and numbers become scalar
    /// text; positions are zeroed.
    pub fn from_json(value: &Value) -> Self {
        let pos = Pos::default();
        let kind = match value {
            Value::Null => NodeKind::Null,
            Value::Bool(b) => NodeKind::Scalar(b.to_string()),
            Value::Number(n) => NodeKind::Scalar(n.to_string()),
            Value::String(s) => NodeKind::Scalar(s.clone()),
            Value::Array(items) => {
                NodeKind::Sequence(items.iter().map(SchemaNode::from_json).collect())
            }
            Value::Object(map) => NodeKind::Mapping(
                map.iter()
                    .map(|(k, v)| (SchemaNode::scalar_at(k.clone(), pos), SchemaNode::from_json(v)))
                    .collect(),
            ),
        };
        Self::new(kind, pos)
    }

    /// Serializes the node as single-line flow YAML, suitable for embedding
    /// in generated code and reloading with any YAML parser.
    pub fn to_flow_yaml(&self) -> String {
        let mut out = String::new();
        self.write_flow(&mut out);
        out
    }

    fn write_flow(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Null => out.push('~'),
            NodeKind::Scalar(text) => write_flow_scalar(text, out),
            NodeKind::Sequence(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    item.write_flow(out);
                }
                out.push(']');
            }
            NodeKind::Mapping(entries) => {
                out.push('{');
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    key.write_flow(out);
                    out.push_str(": ");
                    value.write_flow(out);
                }
                out.push('}');
            }
        }
    }
}

fn write_flow_scalar(text: &str, out: &mut String) {
    if !needs_quoting(text) {
        out.push_str(text);
        return;
    }
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn needs_quoting(text: &str) -> bool {
    // Null spellings must be quoted or they would reload as null nodes.
    text.is_empty()
        || matches!(text, "~" | "null" | "Null" | "NULL")
        || text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.chars().any(|c| {
            matches!(
                c,
                ',' | '[' | ']' | '{' | '}' | ':' | '#' | '"' | '\'' | '\\' | '\n'
            )
        })
}

/// Structural equality: positions are ignored and mapping entries compare
/// without regard to order, the same relation the generated validators use
/// for `enum` constants.
impl PartialEq for SchemaNode {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Null, NodeKind::Null) => true,
            (NodeKind::Scalar(a), NodeKind::Scalar(b)) => a == b,
            (NodeKind::Sequence(a), NodeKind::Sequence(b)) => a == b,
            (NodeKind::Mapping(a), NodeKind::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            _ => false,
        }
    }
}

impl Eq for SchemaNode {}
