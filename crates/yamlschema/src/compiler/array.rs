use super::{src_out, CodeGenerator};
use crate::catalog::{Property, PropertySet, SchemaType, TypeSet, ARRAY_GROUP};
use crate::errata::{Errata, Severity};
use crate::node::SchemaNode;

/// Handles the array property group: `minItems`, `maxItems` and `items`,
/// guarded by `is_array_type` when the type set is not a singleton.
pub(super) fn process<'s>(
    gen: &mut CodeGenerator<'s>,
    node: &'s SchemaNode,
    var: &str,
    types: TypeSet,
    present: PropertySet,
) -> Errata {
    let guarded = types.count() > 1 && present.intersects(ARRAY_GROUP);
    if guarded {
        src_out!(gen, "if ({}({})) {{\n", SchemaType::Array.check_fn(), var);
        gen.src.indent();
    }
    let notes = process_inner(gen, node, var);
    if guarded {
        gen.src.exdent();
        src_out!(gen, "}}\n");
    }
    notes
}

fn process_inner<'s>(gen: &mut CodeGenerator<'s>, node: &'s SchemaNode, var: &str) -> Errata {
    let mut notes = Errata::new();
    let mut min_items: u64 = 0;
    let mut max_items: u64 = u64::MAX;

    let min_node = node.get(Property::MinItems.as_str());
    if let Some(n) = min_node {
        match parse_limit(n) {
            Some(limit) => {
                min_items = limit;
                emit_min_items_check(gen, var, limit);
            }
            None => {
                notes.note(limit_error(Property::MinItems, n, node));
                return notes;
            }
        }
    }

    let max_node = node.get(Property::MaxItems.as_str());
    if let Some(n) = max_node {
        match parse_limit(n) {
            Some(limit) => {
                max_items = limit;
                emit_max_items_check(gen, var, limit);
            }
            None => {
                notes.note(limit_error(Property::MaxItems, n, node));
                return notes;
            }
        }
    }

    if min_items > max_items {
        notes.error(format!(
            "For '{}' value at line {}, the '{}' value at line {} is larger than the '{}' value at line {}.",
            SchemaType::Array,
            node.line(),
            Property::MinItems,
            min_node.map(SchemaNode::line).unwrap_or_default(),
            Property::MaxItems,
            max_node.map(SchemaNode::line).unwrap_or_default()
        ));
        return notes;
    }

    if let Some(items) = node.get(Property::Items.as_str()) {
        if items.is_mapping() {
            // One schema for every element.
            let nvar = gen.var_name();
            src_out!(gen, "for ( auto && {} : {} ) {{\n", nvar, var);
            gen.src.indent();
            let r = gen.validate_node(items, &nvar);
            let failed = r.severity() >= Severity::Error;
            notes.note(r);
            gen.src.exdent();
            src_out!(gen, "}}\n");
            if failed {
                let severity = notes.severity();
                notes.annotate(
                    severity,
                    format!(
                        "Failed processing '{}' value at line {}.",
                        Property::Items,
                        items.line()
                    ),
                );
                return notes;
            }
        } else if items.is_sequence() {
            if emit_tuple_items(
                gen, &mut notes, items, var, min_items, max_items, max_node, node,
            ) {
                return notes;
            }
        } else {
            notes.error(format!(
                "Invalid value for '{}' at line {}: must be a {} or {}.",
                Property::Items,
                items.line(),
                SchemaType::Array,
                SchemaType::Object
            ));
            return notes;
        }
    }

    notes
}

/// Tuple form: one schema per position. Returns true when a fatal problem
/// was recorded.
#[allow(clippy::too_many_arguments)]
fn emit_tuple_items<'s>(
    gen: &mut CodeGenerator<'s>,
    notes: &mut Errata,
    items: &'s SchemaNode,
    var: &str,
    min_items: u64,
    max_items: u64,
    max_node: Option<&SchemaNode>,
    node: &SchemaNode,
) -> bool {
    let mut limit = items.len() as u64;
    if limit > max_items {
        notes.warn(format!(
            "'{}' at line {} has schemas for {} items at line {} but was specified to have at most {} items by line {}. Extra schemas ignored.",
            SchemaType::Array,
            node.line(),
            limit,
            items.line(),
            max_items,
            max_node.map(SchemaNode::line).unwrap_or_default()
        ));
        limit = max_items;
    }
    let limit = limit as usize;
    let schemas = &items.items()[..limit];

    if limit as u64 <= min_items {
        // Every position is guaranteed present; no dispatch on size needed.
        for (idx, schema) in schemas.iter().enumerate() {
            let nvar = gen.var_name();
            src_out!(gen, "auto {} = {}[{}];\n", nvar, var, idx);
            let r = gen.validate_node(schema, &nvar);
            if r.severity() >= Severity::Error {
                notes.note(r);
                let severity = notes.severity();
                notes.annotate(
                    severity,
                    format!(
                        "Failed to process item {} in '{}' at line {}.",
                        idx,
                        Property::Items,
                        items.line()
                    ),
                );
                return true;
            }
            notes.note(r);
        }
    } else {
        // Dispatch on the actual size. Cases are emitted largest first and
        // fall through, so entering at size s validates elements s-1 .. 0
        // exactly once. Size 0 has nothing to validate and must stay out
        // of the fall-through chain; `default:` catches anything longer
        // than the tuple.
        let nvar = gen.var_name();
        src_out!(gen, "switch ({}.size()) {{\n", var);
        src_out!(gen, "case 0: break;\n");
        let mut fatal = false;
        for idx in (0..limit).rev() {
            if idx + 1 == limit {
                src_out!(gen, "default:\n");
            }
            src_out!(gen, "case {}: {{\n", idx + 1);
            gen.src.indent();
            src_out!(gen, "auto {} = {}[{}];\n", nvar, var, idx);
            let r = gen.validate_node(&schemas[idx], &nvar);
            if r.severity() >= Severity::Error {
                notes.note(r);
                let severity = notes.severity();
                notes.annotate(
                    severity,
                    format!(
                        "Failed to process value {} at line {} for '{}'.",
                        idx,
                        items.line(),
                        Property::Items
                    ),
                );
                fatal = true;
            } else {
                notes.note(r);
            }
            gen.src.exdent();
            src_out!(gen, "}}\n");
            if fatal {
                break;
            }
        }
        src_out!(gen, "}}\n");
        if fatal {
            return true;
        }
    }
    false
}

/// Limit values are trimmed scalar text parsed as a non-negative integer.
fn parse_limit(node: &SchemaNode) -> Option<u64> {
    node.scalar()?.trim().parse().ok()
}

fn limit_error(prop: Property, value: &SchemaNode, node: &SchemaNode) -> Errata {
    let mut errata = Errata::new();
    errata.error(format!(
        "{} value '{}' at line {} for type {} at line {} is invalid - it must be a positive integer.",
        prop,
        value.scalar().unwrap_or_default().trim(),
        value.line(),
        SchemaType::Array,
        node.line()
    ));
    errata
}

fn emit_min_items_check(gen: &mut CodeGenerator<'_>, var: &str, limit: u64) {
    src_out!(
        gen,
        "if ({}.size() < {}) {{ erratum.error(\"Array at line {{}} has only {{}} items instead of the required {} items\", {}.Mark().line, {}.size()); return false; }}\n",
        var,
        limit,
        limit,
        var,
        var
    );
}

fn emit_max_items_check(gen: &mut CodeGenerator<'_>, var: &str, limit: u64) {
    src_out!(
        gen,
        "if ({}.size() > {}) {{ erratum.error(\"Array at line {{}} has {{}} items instead of the maximum {} items\", {}.Mark().line, {}.size()); return false; }}\n",
        var,
        limit,
        limit,
        var,
        var
    );
}
