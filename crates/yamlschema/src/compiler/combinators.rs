use super::{src_out, CodeGenerator};
use crate::catalog::{Property, SchemaType};
use crate::errata::{Errata, Severity};
use crate::node::SchemaNode;

/// `anyOf`: at least one alternative must accept the value. Failure attaches
/// every alternative's notes before reporting.
pub(super) fn process_any_of<'s>(
    gen: &mut CodeGenerator<'s>,
    node: &'s SchemaNode,
    var: &str,
) -> Errata {
    let mut notes = Errata::new();
    if !check_shape(&mut notes, node, Property::AnyOf) {
        return notes;
    }
    notes.note(emit_closure_table(gen, node, "any_of", Property::AnyOf));
    if notes.severity() >= Severity::Error {
        return notes;
    }
    src_out!(
        gen,
        "if (! std::any_of(any_of_verify.begin(), any_of_verify.end(), [&] (Validator const& vf) {{ return vf({}); }})) {{\n",
        var
    );
    gen.src.indent();
    src_out!(
        gen,
        "erratum.note(any_of_err);\nerratum.error(\"Node at line {{}} was not valid for any of these schemas.\", {}.Mark().line);\nreturn false;\n",
        var
    );
    gen.src.exdent();
    src_out!(gen, "}}\n");
    notes
}

/// `oneOf`: exactly one alternative must accept the value.
pub(super) fn process_one_of<'s>(
    gen: &mut CodeGenerator<'s>,
    node: &'s SchemaNode,
    var: &str,
) -> Errata {
    let mut notes = Errata::new();
    if !check_shape(&mut notes, node, Property::OneOf) {
        return notes;
    }
    notes.note(emit_closure_table(gen, node, "one_of", Property::OneOf));
    if notes.severity() >= Severity::Error {
        return notes;
    }
    src_out!(gen, "unsigned one_of_count = 0;\nfor ( auto && vf : one_of_verify ) {{\n");
    gen.src.indent();
    src_out!(gen, "if (vf({}) && ++one_of_count > 1) {{\n", var);
    gen.src.indent();
    src_out!(
        gen,
        "erratum.error(\"Node at line {{}} was valid for more than one schema.\", {}.Mark().line);\nreturn false;\n",
        var
    );
    gen.src.exdent();
    src_out!(gen, "}}\n");
    gen.src.exdent();
    src_out!(gen, "}}\n");
    src_out!(gen, "if (one_of_count != 1) {{\n");
    gen.src.indent();
    src_out!(
        gen,
        "erratum.note(one_of_err);\nerratum.error(\"'{{}}' value at line {{}} was not valid for exactly one of these schemas.\", name, {}.Mark().line);\nreturn false;\n",
        var
    );
    gen.src.exdent();
    src_out!(gen, "}}\n");
    notes
}

/// Both combinators take a non-empty sequence of sub-schemas. An empty
/// sequence warns and suppresses emission.
fn check_shape(notes: &mut Errata, node: &SchemaNode, prop: Property) -> bool {
    if !node.is_sequence() {
        notes.error(format!(
            "'{}' value at line {} is invalid - it must be {} type.",
            prop,
            node.line(),
            SchemaType::Array
        ));
        return false;
    }
    if node.is_empty() {
        notes.warn(format!(
            "'{}' value at line {} has no items - ignored.",
            prop,
            node.line()
        ));
        return false;
    }
    true
}

/// Emits the shared preamble: a local errata the alternatives report into
/// and an array of validator closures, one per alternative.
fn emit_closure_table<'s>(
    gen: &mut CodeGenerator<'s>,
    node: &'s SchemaNode,
    prefix: &str,
    prop: Property,
) -> Errata {
    let mut notes = Errata::new();
    src_out!(
        gen,
        "// {}\nswoc::Errata {}_err;\nstd::array<Validator, {}> {}_verify = {{\n",
        prop,
        prefix,
        node.len(),
        prefix
    );
    gen.src.indent();
    for schema in node.items() {
        src_out!(
            gen,
            "[&erratum = {}_err, name, this] (YAML::Node const& node) -> bool {{\n",
            prefix
        );
        gen.src.indent();
        let r = gen.validate_node(schema, "node");
        if !r.is_empty() {
            let severity = r.severity();
            notes.note(r);
            notes.annotate(
                severity,
                format!("Processing '{}' value at line {}.", prop, node.line()),
            );
        }
        src_out!(gen, "return true;\n");
        gen.src.exdent();
        src_out!(gen, "}},\n");
        if notes.severity() >= Severity::Error {
            break;
        }
    }
    gen.src.exdent();
    src_out!(gen, "}};\n");
    notes
}
