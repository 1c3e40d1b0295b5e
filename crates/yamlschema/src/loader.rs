//! Marked YAML/JSON parsing.
//!
//! Builds [`SchemaNode`] trees from parser events so every node carries the
//! line and column it came from. JSON documents parse as well, being a flow
//! subset of YAML.

use ahash::AHashMap;
use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

use crate::node::{Pos, SchemaNode};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("loading failed: {0}")]
    Scan(#[from] ScanError),
    #[error("no document found in input")]
    Empty,
}

/// Parses the first document in `text` into a marked node tree.
pub fn load_str(text: &str) -> Result<SchemaNode, LoadError> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new_from_str(text);
    parser.load(&mut builder, false)?;
    builder.root.ok_or(LoadError::Empty)
}

enum Frame {
    Sequence {
        items: Vec<SchemaNode>,
        pos: Pos,
        anchor: usize,
    },
    Mapping {
        entries: Vec<(SchemaNode, SchemaNode)>,
        pending_key: Option<SchemaNode>,
        pos: Pos,
        anchor: usize,
    },
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    anchors: AHashMap<usize, SchemaNode>,
    root: Option<SchemaNode>,
}

impl TreeBuilder {
    fn push_node(&mut self, node: SchemaNode) {
        match self.stack.last_mut() {
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => *pending_key = Some(node),
            },
            // First completed top-level node wins; later documents are not
            // consumed because `load` is invoked in single-document mode.
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }

    fn remember(&mut self, anchor: usize, node: &SchemaNode) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
    }
}

fn pos_of(mark: Marker) -> Pos {
    Pos::new(mark.line() as u32, mark.col() as u32 + 1)
}

fn is_null_scalar(style: TScalarStyle, text: &str) -> bool {
    style == TScalarStyle::Plain && matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        match ev {
            Event::Scalar(value, style, anchor, _) => {
                let pos = pos_of(mark);
                let node = if is_null_scalar(style, &value) {
                    SchemaNode::null_at(pos)
                } else {
                    SchemaNode::scalar_at(value, pos)
                };
                self.remember(anchor, &node);
                self.push_node(node);
            }
            Event::SequenceStart(anchor, _) => {
                self.stack.push(Frame::Sequence {
                    items: Vec::new(),
                    pos: pos_of(mark),
                    anchor,
                });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { items, pos, anchor }) = self.stack.pop() {
                    let node = SchemaNode::sequence_at(items, pos);
                    self.remember(anchor, &node);
                    self.push_node(node);
                }
            }
            Event::MappingStart(anchor, _) => {
                self.stack.push(Frame::Mapping {
                    entries: Vec::new(),
                    pending_key: None,
                    pos: pos_of(mark),
                    anchor,
                });
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping {
                    entries,
                    pos,
                    anchor,
                    ..
                }) = self.stack.pop()
                {
                    let node = SchemaNode::mapping_at(entries, pos);
                    self.remember(anchor, &node);
                    self.push_node(node);
                }
            }
            Event::Alias(anchor) => {
                let node = self
                    .anchors
                    .get(&anchor)
                    .cloned()
                    .unwrap_or_else(|| SchemaNode::null_at(pos_of(mark)));
                self.push_node(node);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_line_accurate() {
        let root = load_str("type: object\nrequired:\n  - name\n").unwrap();
        assert!(root.is_mapping());
        assert_eq!(root.get("type").unwrap().line(), 1);
        let required = root.get("required").unwrap();
        assert_eq!(required.line(), 3);
        assert_eq!(required.items()[0].scalar(), Some("name"));
    }

    #[test]
    fn json_is_accepted() {
        let root = load_str(r#"{"type": "string", "enum": ["a", "b"]}"#).unwrap();
        assert_eq!(root.get("type").and_then(SchemaNode::scalar), Some("string"));
        assert_eq!(root.get("enum").unwrap().len(), 2);
    }

    #[test]
    fn plain_null_spellings_become_null_nodes() {
        let root = load_str("a: ~\nb: null\nc: \"null\"\n").unwrap();
        assert!(root.get("a").unwrap().is_null());
        assert!(root.get("b").unwrap().is_null());
        assert_eq!(root.get("c").and_then(SchemaNode::scalar), Some("null"));
    }

    #[test]
    fn anchors_resolve_to_shared_values() {
        let root = load_str("base: &b {type: string}\nother: *b\n").unwrap();
        assert_eq!(root.get("base").unwrap(), root.get("other").unwrap());
    }

    #[test]
    fn malformed_input_reports_scan_error() {
        assert!(matches!(load_str("a: [unclosed"), Err(LoadError::Scan(_))));
    }
}
