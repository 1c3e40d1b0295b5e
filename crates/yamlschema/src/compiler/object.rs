use super::{src_out, CodeGenerator};
use crate::catalog::{Property, PropertySet, SchemaType, TypeSet, OBJECT_GROUP};
use crate::errata::Errata;
use crate::node::SchemaNode;

/// Handles the object property group: `required` and `properties`.
///
/// When the type set is not a singleton the emitted checks are wrapped in
/// an `is_object_type` conditional so they only fire when the runtime value
/// actually is an object.
pub(super) fn process<'s>(
    gen: &mut CodeGenerator<'s>,
    node: &'s SchemaNode,
    var: &str,
    types: TypeSet,
    present: PropertySet,
) -> Errata {
    let guarded = types.count() > 1 && present.intersects(OBJECT_GROUP);
    if guarded {
        src_out!(gen, "if ({}({})) {{\n", SchemaType::Object.check_fn(), var);
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

    if let Some(required) = node.get(Property::Required.as_str()) {
        if !required.is_sequence() {
            notes.error(format!(
                "'{}' value at line {} is not type {}.",
                Property::Required,
                required.line(),
                SchemaType::Array
            ));
            return notes;
        }
        emit_required_check(gen, required, var);
    }

    if let Some(properties) = node.get(Property::Properties.as_str()) {
        if !properties.is_mapping() {
            notes.error(format!(
                "'{}' value at line {} is not type {}.",
                Property::Properties,
                properties.line(),
                SchemaType::Object
            ));
            return notes;
        }
        for (key, subschema) in properties.entries() {
            let Some(tag) = key.scalar() else {
                notes.warn(format!(
                    "Ignoring non-scalar property key at line {}.",
                    key.line()
                ));
                continue;
            };
            let nvar = gen.var_name();
            src_out!(gen, "if ({}[\"{}\"]) {{\n", var, tag);
            gen.src.indent();
            src_out!(gen, "auto {} = {}[\"{}\"];\n", nvar, var, tag);
            notes.note(gen.validate_node(subschema, &nvar));
            gen.src.exdent();
            src_out!(gen, "}}\n");
        }
    }

    notes
}

/// Missing required keys fail the validated document. Tags are checked in
/// schema source order.
fn emit_required_check(gen: &mut CodeGenerator<'_>, node: &SchemaNode, var: &str) {
    src_out!(gen, "// check for required tags\nfor ( auto && tag : {{ ");
    let mut delimiter = "";
    for item in node.items() {
        src_out!(gen, "{}\"{}\"", delimiter, item.scalar().unwrap_or_default());
        delimiter = ", ";
    }
    src_out!(gen, " }} ) {{\n");
    gen.src.indent();
    src_out!(gen, "if (!{}[tag]) {{\n", var);
    gen.src.indent();
    src_out!(
        gen,
        "erratum.error(\"Required tag '{{}}' at line {{}} was not found.\", tag, {}.Mark().line);\nreturn false;\n",
        var
    );
    gen.src.exdent();
    src_out!(gen, "}}\n");
    gen.src.exdent();
    src_out!(gen, "}}\n");
}
