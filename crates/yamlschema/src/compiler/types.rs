use super::{src_out, CodeGenerator};
use crate::catalog::{SchemaType, VALID_TYPE_NAMES};
use crate::errata::{Errata, Rv};
use crate::node::SchemaNode;

/// Reads a `type` value: a single type name or a sequence of names.
///
/// Returns the named types in schema order with duplicates removed;
/// emission follows this order. Unknown spellings are errors, duplicates
/// warn, an empty sequence warns and yields nothing.
pub(super) fn process(value: &SchemaNode) -> Rv<Vec<SchemaType>> {
    let mut notes = Errata::new();
    let mut order: Vec<SchemaType> = Vec::new();

    let mut check = |node: &SchemaNode, notes: &mut Errata| {
        // A plain `null` parses as a null node; it still names the type.
        let name = if node.is_null() {
            "null"
        } else {
            node.scalar().unwrap_or_default()
        };
        match name.parse::<SchemaType>() {
            Ok(primitive) => {
                if order.contains(&primitive) {
                    notes.warn(format!(
                        "Type value '{}' at line {} has already been specified.",
                        name,
                        node.line()
                    ));
                } else {
                    order.push(primitive);
                }
            }
            Err(()) => {
                notes.error(format!(
                    "Type value '{}' at line {} is not a valid type. It must be one of {}.",
                    name,
                    node.line(),
                    &*VALID_TYPE_NAMES
                ));
            }
        }
    };

    if value.is_sequence() {
        if value.is_empty() {
            notes.warn(format!(
                "'type' value at line {} has no items - ignored.",
                value.line()
            ));
        }
        for node in value.items() {
            check(node, &mut notes);
        }
    } else if value.is_mapping() {
        notes.error(format!(
            "Type value at line {} must be a string or array of strings but is not.",
            value.line()
        ));
    } else {
        check(value, &mut notes);
    }

    Rv::with(order, notes)
}

/// Emits the runtime type assertion: a direct negated helper call for a
/// single type, a disjunction in schema order otherwise.
pub(super) fn emit_check(gen: &mut CodeGenerator<'_>, order: &[SchemaType], var: &str) {
    src_out!(gen, "// validate value type\n");
    src_out!(gen, "if (! ");
    if let [single] = order {
        src_out!(
            gen,
            "{}({})) {{ erratum.error(\"'{{}}' value at line {{}} was not {}\", name, {}.Mark().line); return false; }}\n",
            single.check_fn(),
            var,
            single,
            var
        );
        return;
    }
    src_out!(gen, "(");
    let mut delimiter = "";
    for ty in order {
        src_out!(gen, "{}{}({})", delimiter, ty.check_fn(), var);
        delimiter = " || ";
    }
    src_out!(gen, ")) {{\n");
    gen.src.indent();
    src_out!(gen, "erratum.error(\"value at line {{}} was not one of the required types ");
    let mut delimiter = "";
    for ty in order {
        src_out!(gen, "{}'{}'", delimiter, ty);
        delimiter = ", ";
    }
    src_out!(gen, "\", {}.Mark().line);\nreturn false;\n", var);
    gen.src.exdent();
    src_out!(gen, "}}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errata::Severity;
    use serde_json::json;

    #[test]
    fn single_name_yields_one_type() {
        let value = SchemaNode::from_json(&json!("string"));
        let (order, errata) = process(&value).into_parts();
        assert_eq!(order, [SchemaType::String]);
        assert!(errata.is_empty());
    }

    #[test]
    fn sequence_preserves_schema_order() {
        let value = SchemaNode::from_json(&json!(["string", "integer", "null"]));
        let (order, errata) = process(&value).into_parts();
        assert_eq!(
            order,
            [SchemaType::String, SchemaType::Integer, SchemaType::Null]
        );
        assert!(errata.is_empty());
    }

    #[test]
    fn duplicates_warn_but_survive() {
        let value = SchemaNode::from_json(&json!(["string", "string"]));
        let (order, errata) = process(&value).into_parts();
        assert_eq!(order, [SchemaType::String]);
        assert_eq!(errata.severity(), Severity::Warn);
    }

    #[test]
    fn unknown_spelling_is_an_error() {
        let value = SchemaNode::from_json(&json!("str"));
        let (order, errata) = process(&value).into_parts();
        assert!(order.is_empty());
        assert_eq!(errata.severity(), Severity::Error);
        let text = errata.iter().next().unwrap().text().to_string();
        assert!(text.contains("'str'"));
        assert!(text.contains("'integer'"));
    }

    #[test]
    fn mapping_shape_is_an_error() {
        let value = SchemaNode::from_json(&json!({"not": "a type"}));
        let (_, errata) = process(&value).into_parts();
        assert_eq!(errata.severity(), Severity::Error);
    }
}
