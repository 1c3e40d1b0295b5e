//! Reference resolution.
//!
//! Canonical references look like `#/definitions/port`: a leading `#` for
//! the schema root followed by `/`-delimited mapping keys. Resolution is
//! pure; it never emits code and only constructs diagnostics.

use crate::errata::{Errata, Rv};
use crate::node::SchemaNode;

/// Derives the generated validator function identifier for a reference:
/// the path with non-alphanumerics replaced by `_`, prefixed with `v_`.
/// The prefix keeps the result outside the keyword space; distinct
/// references that collapse to the same identifier do not occur with
/// canonical `#/` paths over distinct key sequences.
pub fn definition_name(reference: &str) -> String {
    let path = reference.strip_prefix("#/").unwrap_or(reference);
    let mut name = String::with_capacity(path.len() + 2);
    name.push_str("v_");
    for c in path.chars() {
        name.push(if c.is_ascii_alphanumeric() { c } else { '_' });
    }
    name
}

/// Resolves `path` against the schema root, descending through mapping
/// keys. A `#` component (or an empty one) resets to the root.
pub fn locate<'s>(root: &'s SchemaNode, path: &str) -> Rv<Option<&'s SchemaNode>> {
    let mut errata = Errata::new();
    let mut node = root;
    let mut end = 0usize;
    for elt in path.split('/') {
        if end != 0 {
            end += 1;
        }
        end += elt.len();
        if elt.is_empty() || elt == "#" {
            node = root;
            continue;
        }
        if !node.is_mapping() {
            errata.error(format!("\"{}\" is not a map.", &path[..end]));
            return Rv::with(None, errata);
        }
        match node.get(elt) {
            Some(child) => node = child,
            None => {
                errata.error(format!(
                    "\"{}\" is not in the map {} at {}.",
                    elt,
                    &path[..end],
                    node.pos()
                ));
                return Rv::with(None, errata);
            }
        }
    }
    Rv::with(Some(node), errata)
}
