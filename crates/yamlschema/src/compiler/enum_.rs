use super::{src_out, CodeGenerator};
use crate::catalog::{Property, SchemaType};
use crate::errata::Errata;
use crate::node::SchemaNode;

/// `enum`: the value must be structurally equal to one of the listed
/// constants.
///
/// Constants can be any shape, so each is re-serialized as flow YAML and
/// embedded in the generated code as a raw string literal; the validator
/// reloads them and compares with the runtime `equal` helper.
pub(super) fn process<'s>(gen: &mut CodeGenerator<'s>, node: &'s SchemaNode, var: &str) -> Errata {
    let mut notes = Errata::new();
    if !node.is_sequence() {
        notes.error(format!(
            "'{}' value at line {} is invalid - it must be {} type.",
            Property::Enum,
            node.line(),
            SchemaType::Array
        ));
        return notes;
    }
    if node.is_empty() {
        notes.warn(format!(
            "'{}' value at line {} has no items - ignored.",
            Property::Enum,
            node.line()
        ));
        return notes;
    }

    let mut usage = String::new();
    src_out!(gen, "bool enum_match_p = false;\nfor ( auto && vn : {{ ");
    let mut delimiter = "";
    for item in node.items() {
        let serialized = item.to_flow_yaml();
        src_out!(gen, "{}YAML::Load(R\"yml({})yml\")", delimiter, serialized);
        if !usage.is_empty() {
            usage.push_str(", ");
        }
        usage.push_str(&serialized);
        delimiter = ", ";
    }
    src_out!(gen, " }} ) {{\n");
    gen.src.indent();
    src_out!(gen, "if ( equal(vn, {}) ) {{\n", var);
    gen.src.indent();
    src_out!(gen, "enum_match_p = true;\nbreak;\n");
    gen.src.exdent();
    src_out!(gen, "}}\n");
    gen.src.exdent();
    src_out!(gen, "}}\n");
    src_out!(gen, "if (!enum_match_p) {{\n");
    gen.src.indent();
    src_out!(
        gen,
        "YAML::Emitter yem;\nyem << {};\nerratum.error(\"'{{}}' value '{{}}' at line {{}} is invalid - it must be one of {{}}.\", name, yem.c_str(), {}.Mark().line, R\"yml({})yml\");\nreturn false;\n",
        var,
        var,
        usage
    );
    gen.src.exdent();
    src_out!(gen, "}}\n");
    notes
}
